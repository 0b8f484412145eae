//! Error types for the search client.

use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// A newer query superseded this request. Expected, never user-visible.
    #[error("request superseded by a newer query")]
    Cancelled,
    #[error("search request timed out after {0:?}")]
    Timeout(Duration),
    #[error("search endpoint returned status {status} for {url}")]
    Status { status: u16, url: String },
    #[error("failed to decode search response")]
    Decode {
        status: u16,
        url: String,
        #[source]
        source: anyhow::Error,
    },
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

impl SearchError {
    /// Cancellation is expected control flow, not a failure to surface.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, SearchError::Cancelled)
    }
}
