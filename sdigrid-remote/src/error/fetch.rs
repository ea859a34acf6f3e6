//! Fetch error types

use std::time::Duration;

/// Marker the CMS puts in its login page.
const NOT_LOGGED_IN: &str = "Not logged in";

/// Errors that can occur while talking to the contents endpoint.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Non-success HTTP response.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// Network error during the request.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Request timed out.
    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse the response.
    #[error("Response parse error: {message}")]
    Parse {
        /// Description of the parse error.
        message: String,
        /// Raw response body, if available.
        body: Option<String>,
    },

    /// The response contradicts the range it answers.
    #[error("Inconsistent response: {0}")]
    Inconsistent(String),

    /// The request was superseded or cancelled.
    #[error("Request aborted")]
    Aborted,
}

impl FetchError {
    /// Creates a new HTTP error.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Creates a new parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: None,
        }
    }

    /// Creates a new parse error with the raw response body.
    pub fn parse_with_body(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: Some(body.into()),
        }
    }

    /// Returns the HTTP status code if this is an HTTP error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Network(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` for superseded or cancelled requests.
    ///
    /// These are expected and never reported.
    pub fn is_abort(&self) -> bool {
        matches!(self, Self::Aborted)
    }

    /// Returns `true` when the server answered with its login page
    /// instead of JSON.
    pub fn is_session_expired(&self) -> bool {
        match self {
            Self::Parse { body: Some(body), .. } => body.contains(NOT_LOGGED_IN),
            _ => false,
        }
    }

    /// Returns `true` when the server could not be reached or refused the
    /// request for a reason other than an internal server error.
    pub fn is_connection_problem(&self) -> bool {
        match self {
            Self::Http { status, .. } => *status != 500,
            Self::Network(err) => !err.is_decode(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_expired_needs_marker_in_body() {
        let login = FetchError::parse_with_body("expected value", "<p>Not logged in</p>");
        assert!(login.is_session_expired());
        assert!(!FetchError::parse("expected value").is_session_expired());
        assert!(!FetchError::parse_with_body("expected value", "<html/>").is_session_expired());
    }

    #[test]
    fn test_internal_server_error_is_not_a_connection_problem() {
        assert!(!FetchError::http(500, "Internal Server Error").is_connection_problem());
        assert!(FetchError::http(502, "Bad Gateway").is_connection_problem());
        assert!(!FetchError::Aborted.is_connection_problem());
        assert!(!FetchError::Timeout(Duration::from_secs(1)).is_connection_problem());
    }

    #[test]
    fn test_abort_detection() {
        assert!(FetchError::Aborted.is_abort());
        assert!(!FetchError::http(404, "Not Found").is_abort());
    }
}
