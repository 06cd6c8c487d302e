//! Email domain types.
//!
//! Represents email messages as returned by the backend's list endpoint.
//! The assistant backend does the heavy lifting (threading, parsing,
//! classification); the client only renders what it is given.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::MessageId;

/// A single email message summary from the inbox feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    /// Backend-assigned identifier for this message.
    pub id: MessageId,
    /// Sender address.
    pub from: Address,
    /// Email subject line.
    #[serde(default)]
    pub subject: Option<String>,
    /// Short preview of the email content.
    #[serde(default)]
    pub snippet: String,
    /// Date and time the email was received.
    pub received_at: DateTime<Utc>,
    /// Whether the email has been read.
    #[serde(default)]
    pub is_read: bool,
}

impl EmailMessage {
    /// Returns the subject, or a placeholder when the message has none.
    pub fn subject_or_default(&self) -> &str {
        self.subject.as_deref().unwrap_or("(no subject)")
    }
}

/// An email address with optional display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Email address.
    pub email: String,
    /// Display name (e.g., "John Doe").
    #[serde(default)]
    pub name: Option<String>,
}

impl Address {
    /// Creates an address without a display name.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
        }
    }

    /// Creates an address with a display name.
    pub fn with_name(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: Some(name.into()),
        }
    }

    /// Formats the address for display.
    ///
    /// Returns "Name <email>" if a name is present, otherwise just the email.
    pub fn display(&self) -> String {
        match &self.name {
            Some(name) => format!("{} <{}>", name, self.email),
            None => self.email.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_display_with_name() {
        let addr = Address::with_name("john@example.com", "John Doe");
        assert_eq!(addr.display(), "John Doe <john@example.com>");
    }

    #[test]
    fn address_display_without_name() {
        let addr = Address::new("john@example.com");
        assert_eq!(addr.display(), "john@example.com");
    }

    #[test]
    fn message_deserializes_from_list_payload() {
        let json = r#"{
            "id": "msg-1",
            "from": {"email": "boss@example.com", "name": "The Boss"},
            "subject": "Quarterly numbers",
            "snippet": "Please review before Friday",
            "received_at": "2025-03-01T09:30:00Z",
            "is_read": false
        }"#;

        let message: EmailMessage = serde_json::from_str(json).unwrap();
        assert_eq!(message.id, MessageId::from("msg-1"));
        assert_eq!(message.from.display(), "The Boss <boss@example.com>");
        assert_eq!(message.subject_or_default(), "Quarterly numbers");
        assert!(!message.is_read);
    }

    #[test]
    fn message_tolerates_missing_subject() {
        let json = r#"{
            "id": "msg-2",
            "from": {"email": "noreply@example.com"},
            "received_at": "2025-03-01T09:30:00Z"
        }"#;

        let message: EmailMessage = serde_json::from_str(json).unwrap();
        assert_eq!(message.subject_or_default(), "(no subject)");
        assert_eq!(message.snippet, "");
    }
}
