//! HTTP client for the assistant backend.
//!
//! All communication with the backend goes through [`ApiClient`], which
//! authenticates with a bearer token. The trait seams ([`AuthApi`],
//! [`MailApi`], [`AssistantApi`]) exist so services can be tested
//! without a live backend.

mod client;
mod traits;
mod types;

pub use client::ApiClient;
pub use traits::{AssistantApi, AuthApi, MailApi};
pub use types::{AskEnvelope, AskRequest, EmailListEnvelope, IdentityEnvelope};

#[cfg(test)]
pub use traits::{MockAssistantApi, MockMailApi};

use thiserror::Error;

/// Errors that can occur while talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("http transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend rejected the presented credential.
    #[error("credential rejected (HTTP {status})")]
    Rejected { status: u16 },

    /// The backend answered with a non-success status.
    #[error("api error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The response body could not be interpreted.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// A request URL could not be built.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// Returns true if the error proves the credential itself is invalid.
    ///
    /// Only an explicit 401 or 403 counts. Transport failures, server
    /// errors, and malformed responses are inconclusive and must not
    /// cause a stored token to be discarded.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, ApiError::Rejected { .. })
    }

    /// Returns the HTTP status, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status } | ApiError::Api { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type for backend operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
