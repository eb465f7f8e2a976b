//! Error types for status fetching.

use thiserror::Error;

/// Why a status fetch produced no usable status.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    UnexpectedStatus(u16),

    #[error("malformed status body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("origin {0} cannot carry a path")]
    InvalidOrigin(String),
}
