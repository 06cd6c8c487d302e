//! Request and response formats for the assistant backend.
//!
//! Every JSON endpoint wraps its payload in an envelope carrying a
//! `success` flag; the payload field is present only on success.

use serde::{Deserialize, Serialize};

use crate::domain::{EmailMessage, ModelBackend, UserIdentity};

/// Response envelope for the identity endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityEnvelope {
    /// Whether the backend accepted the credential and resolved a user.
    pub success: bool,
    /// The verified identity. Absent when `success` is false.
    #[serde(default)]
    pub user: Option<UserIdentity>,
}

impl IdentityEnvelope {
    /// Extracts the identity from a successful envelope.
    pub fn into_user(self) -> Option<UserIdentity> {
        if self.success {
            self.user
        } else {
            None
        }
    }
}

/// Response envelope for the email list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailListEnvelope {
    pub success: bool,
    #[serde(default)]
    pub emails: Vec<EmailMessage>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Request body for the ask endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct AskRequest {
    /// Question text.
    pub question: String,
    /// Backend that should answer.
    pub model: ModelBackend,
}

impl AskRequest {
    /// Creates an ask request.
    pub fn new(question: impl Into<String>, model: ModelBackend) -> Self {
        Self {
            question: question.into(),
            model,
        }
    }
}

/// Response envelope for the ask endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AskEnvelope {
    pub success: bool,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
