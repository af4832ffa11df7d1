//! Framework-free client for the dashboard API: typed fetch helpers, a
//! local cache, and a long-lived event-stream subscription that reconciles
//! pushed updates into that cache. Nothing here depends on a renderer; a UI
//! layer reads the cache and re-renders however it likes.

pub mod api;
pub mod cache;
pub mod sse;
pub mod subscription;

pub use api::ApiClient;
pub use cache::DashboardCache;
pub use subscription::{DashboardStream, Subscription};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("invalid payload: {0}")]
    Payload(#[from] serde_json::Error),
}
