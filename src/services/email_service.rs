//! Email listing.
//!
//! The backend owns mailbox state; this service is a thin, typed veneer
//! over its list endpoint. There is no local cache and no sync engine.
//! A failed fetch is an error the caller can retry, never a reason to
//! touch the session.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::api::{ApiError, MailApi};
use crate::domain::EmailMessage;

/// Errors that can occur while listing emails.
#[derive(Debug, Error)]
pub enum EmailError {
    /// The backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Result type for email operations.
pub type EmailResult<T> = Result<T, EmailError>;

/// Fetches email message summaries from the backend.
pub struct EmailService {
    api: Arc<dyn MailApi>,
}

impl EmailService {
    /// Number of messages fetched when the caller does not specify one.
    pub const DEFAULT_LIMIT: u32 = 20;

    /// Largest list the backend will be asked for in one request.
    pub const MAX_LIMIT: u32 = 100;

    /// Creates an email service over the given API seam.
    pub fn new(api: Arc<dyn MailApi>) -> Self {
        Self { api }
    }

    /// Fetches the most recent messages, newest first.
    ///
    /// The limit is clamped to `1..=MAX_LIMIT`.
    pub async fn recent(&self, limit: u32) -> EmailResult<Vec<EmailMessage>> {
        let limit = limit.clamp(1, Self::MAX_LIMIT);
        let messages = self.api.recent_messages(limit).await?;
        debug!(count = messages.len(), "fetched recent messages");
        Ok(messages)
    }

    /// Fetches the default-sized recent message list.
    pub async fn inbox(&self) -> EmailResult<Vec<EmailMessage>> {
        self.recent(Self::DEFAULT_LIMIT).await
    }
}
