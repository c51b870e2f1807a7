//! Error types shared by the catalog, ledger, forecast client and pipeline.

use thiserror::Error;

/// A shop record that cannot be turned into a catalog entry.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid shop record #{record}: field `{field}` {reason}")]
pub struct ValidationError {
    /// 1-based position of the record in the input list.
    pub record: usize,
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(record: usize, field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            record,
            field,
            reason: reason.into(),
        }
    }
}

/// Failure talking to the forecast provider.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Non-success HTTP status. `body` keeps the raw response for diagnostics.
    #[error("forecast request failed with status {status}: {}", truncate_body(.body))]
    Status { status: u16, body: String },

    #[error("failed to reach forecast provider: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to parse forecast response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("forecast response contained no forecast buckets")]
    EmptyForecast,
}

impl FetchError {
    /// Raw provider response body, when the provider answered at all.
    pub fn body(&self) -> Option<&str> {
        match self {
            FetchError::Status { body, .. } => Some(body),
            _ => None,
        }
    }

    /// HTTP status of a non-success provider response.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Top-level error for catalog, ledger and pipeline operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("fetching forecast for shop {shop_id} failed: {source}")]
    Fetch {
        shop_id: i64,
        #[source]
        source: FetchError,
    },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("failed to read shop list: {0}")]
    Source(#[from] csv::Error),
}

/// Shorten a provider body so it fits on a log line.
pub fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
