//! Integration tests against a running CMS.
//!
//! These tests need a live contents endpoint and are ignored by default.
//! To run them, create a `.env` file in the sdigrid-remote directory with:
//!
//! ```env
//! SDIGRID_CONTENTS_URL=http://localhost:6543/@@contents.json
//! # optional, enables the live update test
//! SDIGRID_EVENTS_URL=http://localhost:6543/@@events
//! ```
//!
//! Then run: `cargo test -p sdigrid-remote -- --ignored`

use std::env;
use std::time::Duration;

use sdigrid_remote::config::RemoteModelConfig;
use sdigrid_remote::query::RangeQuery;
use sdigrid_remote::{ContentsClient, RowSource};

fn load_env() -> Option<(String, Option<String>)> {
    let _ = dotenvy::dotenv();

    let url = env::var("SDIGRID_CONTENTS_URL").ok()?;
    let events = env::var("SDIGRID_EVENTS_URL").ok();
    Some((url, events))
}

fn client(url: &str, events: Option<String>) -> ContentsClient {
    let mut builder = ContentsClient::builder()
        .url(url)
        .timeout(Duration::from_secs(10));
    if let Some(events) = events {
        builder = builder.events_url(events);
    }
    builder.build().expect("Failed to build client")
}

#[tokio::test]
#[ignore = "requires a running CMS"]
async fn test_fetch_first_rows() {
    let Some((url, events)) = load_env() else {
        println!("Skipping: SDIGRID_CONTENTS_URL not set");
        return;
    };

    let client = client(&url, events);
    let config = RemoteModelConfig::new(&url);
    let batch = client
        .fetch_rows(&RangeQuery::new(0, 20, &config))
        .await
        .expect("Fetch failed");

    println!("Loaded {} of {} rows", batch.records.len(), batch.total);
    assert_eq!(batch.from, 0);
    assert!(batch.records.len() <= 20);
    assert!(batch.records.iter().all(|record| record.id().is_some()));
}

#[tokio::test]
#[ignore = "requires a running CMS"]
async fn test_event_stream_connects() {
    let Some((url, Some(events))) = load_env() else {
        println!("Skipping: SDIGRID_EVENTS_URL not set");
        return;
    };

    let client = client(&url, Some(events));
    let mut stream = client.events().await.expect("Connect failed");
    // the server may stay quiet, so only wait briefly
    let next = tokio::time::timeout(Duration::from_secs(2), stream.next_event()).await;
    println!("First event: {next:?}");
}
