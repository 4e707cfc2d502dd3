//! Remote package directory: the package/tracking HTTP API behind the gateway.
//!
//! Three lookups (find by id, track by number, list a user's packages). Every failure is
//! converted into a [`ToolOutcome`](crate::tools::ToolOutcome) at this boundary.

mod client;
mod record;

pub use client::{DirectoryClient, LookupStrategy, DEFAULT_TIMEOUT};
pub use record::PackageRecord;

/// Why one outbound lookup failed.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("not found")]
    NotFound,
    #[error("authentication required")]
    Unauthorized,
    #[error("service returned status: {0}")]
    Status(u16),
    #[error("request timed out")]
    Timeout,
    #[error("unable to connect: {0}")]
    Connect(String),
    /// Request or body transfer failed after connecting.
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("{0}")]
    Other(String),
}

impl LookupError {
    /// Transport and status failures let the next lookup strategy run; anything else
    /// (e.g. an undecodable 200 body) stops the chain.
    pub fn falls_through(&self) -> bool {
        !matches!(self, LookupError::Decode(_) | LookupError::Other(_))
    }

    pub(crate) fn is_transport(&self) -> bool {
        matches!(
            self,
            LookupError::Timeout | LookupError::Connect(_) | LookupError::Transport(_)
        )
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LookupError::Timeout
        } else if e.is_connect() {
            LookupError::Connect(e.to_string())
        } else if e.is_decode() {
            LookupError::Decode(e.to_string())
        } else if e.is_request() || e.is_body() {
            LookupError::Transport(e.to_string())
        } else {
            LookupError::Other(e.to_string())
        }
    }
}
