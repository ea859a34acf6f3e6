//! Contents endpoint client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, header};
use url::Url;

use crate::error::FetchError;
use crate::live::EventStream;
use crate::query::RangeQuery;
use crate::reorder::ReorderRequest;
use crate::response::RowBatch;

/// Where a [`RemoteModel`](crate::model::RemoteModel) gets its rows from.
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Fetches the rows of `query`.
    async fn fetch_rows(&self, query: &RangeQuery) -> Result<RowBatch, FetchError>;

    /// Moves rows. The answer carries the current window and a flash
    /// message.
    async fn reorder(&self, request: &ReorderRequest) -> Result<RowBatch, FetchError>;
}

/// HTTP client for a folder's contents endpoint.
///
/// Cheap to clone.
///
/// # Example
///
/// ```ignore
/// let client = ContentsClient::builder()
///     .url("http://localhost:6543/@@contents.json")
///     .timeout(Duration::from_secs(30))
///     .build()?;
///
/// let batch = client.fetch_rows(&RangeQuery::new(0, 100, &config)).await?;
/// ```
#[derive(Clone)]
pub struct ContentsClient {
    inner: Arc<ContentsClientInner>,
}

struct ContentsClientInner {
    url: Url,
    events_url: Option<Url>,
    http_client: Client,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for ContentsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentsClient")
            .field("url", &self.inner.url.as_str())
            .field("timeout", &self.inner.timeout)
            .finish_non_exhaustive()
    }
}

impl ContentsClient {
    /// Creates a new builder for constructing a client.
    pub fn builder() -> ContentsClientBuilder<Missing> {
        ContentsClientBuilder::new()
    }

    /// Returns the contents endpoint.
    pub fn url(&self) -> &Url {
        &self.inner.url
    }

    /// Opens the live update stream.
    pub async fn events(&self) -> Result<EventStream, FetchError> {
        let url = self
            .inner
            .events_url
            .clone()
            .ok_or_else(|| FetchError::InvalidUrl("no event source configured".to_string()))?;

        let request = self
            .inner
            .http_client
            .get(url)
            .header(header::ACCEPT, "text/event-stream");
        // no per-request timeout, the stream stays open
        let response = request.send().await.map_err(FetchError::from)?;
        if response.status().is_success() {
            Ok(EventStream::new(response))
        } else {
            Err(error_response(response).await)
        }
    }

    fn with_timeout(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.inner.timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<RowBatch, FetchError> {
        let response = self.with_timeout(request).send().await.map_err(|err| {
            match (err.is_timeout(), self.inner.timeout) {
                (true, Some(timeout)) => FetchError::Timeout(timeout),
                _ => FetchError::from(err),
            }
        })?;

        if !response.status().is_success() {
            return Err(error_response(response).await);
        }

        let body = response.text().await.map_err(FetchError::from)?;
        let batch: RowBatch = serde_json::from_str(&body)
            .map_err(|err| FetchError::parse_with_body(err.to_string(), body))?;
        batch.validate()?;
        Ok(batch)
    }
}

async fn error_response(response: Response) -> FetchError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = if body.is_empty() {
        status.canonical_reason().unwrap_or_default().to_string()
    } else {
        body
    };
    FetchError::http(status.as_u16(), message)
}

#[async_trait]
impl RowSource for ContentsClient {
    async fn fetch_rows(&self, query: &RangeQuery) -> Result<RowBatch, FetchError> {
        let url = query.to_url(&self.inner.url);
        log::debug!("GET {url}");
        self.send(self.inner.http_client.get(url)).await
    }

    async fn reorder(&self, request: &ReorderRequest) -> Result<RowBatch, FetchError> {
        log::debug!(
            "POST reorder of {} item(s) before {:?}",
            request.item_ids.len(),
            request.insert_before
        );
        let form = request.form();
        self.send(self.inner.http_client.post(self.inner.url.clone()).form(&form))
            .await
    }
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing a [`ContentsClient`].
///
/// The contents URL is required and checked at compile time.
pub struct ContentsClientBuilder<U> {
    url: U,
    events_url: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    http_client: Option<Client>,
}

impl ContentsClientBuilder<Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            url: Missing,
            events_url: None,
            timeout: None,
            connect_timeout: None,
            http_client: None,
        }
    }

    /// Sets the contents endpoint.
    pub fn url(self, url: impl Into<String>) -> ContentsClientBuilder<Set<String>> {
        ContentsClientBuilder {
            url: Set(url.into()),
            events_url: self.events_url,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
        }
    }
}

impl Default for ContentsClientBuilder<Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> ContentsClientBuilder<U> {
    /// Sets the server-sent events endpoint for live updates.
    pub fn events_url(mut self, url: impl Into<String>) -> Self {
        self.events_url = Some(url.into());
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    ///
    /// This is applied when building the HTTP client.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl ContentsClientBuilder<Set<String>> {
    /// Builds the [`ContentsClient`].
    pub fn build(self) -> Result<ContentsClient, FetchError> {
        let url = Url::parse(&self.url.0).map_err(|err| FetchError::InvalidUrl(err.to_string()))?;
        let events_url = self
            .events_url
            .map(|raw| url.join(&raw))
            .transpose()
            .map_err(|err| FetchError::InvalidUrl(err.to_string()))?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder.build()?
            }
        };

        Ok(ContentsClient {
            inner: Arc::new(ContentsClientInner {
                url,
                events_url,
                http_client,
                timeout: self.timeout,
            }),
        })
    }
}
