//! Error types for get-analysis-id

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures that can occur while resolving an external ID against the apps
/// service. Every variant is terminal for the request that produced it; the
/// HTTP layer reports the `Display` text to the caller.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid upstream URL {url:?}: {reason}")]
    InvalidUpstreamUrl { url: String, reason: String },

    #[error("apps service unreachable: {0}")]
    UpstreamUnreachable(#[source] reqwest::Error),

    #[error("failed to read apps service response: {0}")]
    UpstreamRead(#[source] reqwest::Error),

    #[error("failed to decode apps service response: {0}")]
    UpstreamDecode(#[from] serde_json::Error),

    #[error("no analyses found")]
    NotFound,
}
