//! Trait seams over the backend API.
//!
//! Services depend on these traits rather than on [`ApiClient`]
//! directly, so tests can substitute programmable fakes.

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::types::{AskRequest, IdentityEnvelope};
use super::ApiResult;
use crate::domain::{AskAnswer, EmailMessage};

/// Authentication endpoints and bearer credential management.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Sets or clears the bearer token attached to subsequent requests.
    fn set_bearer(&self, token: Option<&str>);

    /// Asks the backend who the presented credential belongs to.
    async fn fetch_identity(&self) -> ApiResult<IdentityEnvelope>;

    /// Invalidates the session on the backend.
    async fn logout(&self) -> ApiResult<()>;
}

/// Email list endpoint.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MailApi: Send + Sync {
    /// Fetches the most recent email messages, newest first.
    async fn recent_messages(&self, limit: u32) -> ApiResult<Vec<EmailMessage>>;
}

/// Ask-the-assistant endpoint.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AssistantApi: Send + Sync {
    /// Sends a question to the assistant and returns its answer.
    async fn ask(&self, request: AskRequest) -> ApiResult<AskAnswer>;
}
