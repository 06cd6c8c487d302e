//! User identity types.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::UserId;

/// Identity of the signed-in user as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Backend-assigned user identifier.
    pub id: UserId,
    /// Primary email address of the account.
    pub email: String,
    /// Provider the user signed in through.
    pub provider: AuthProvider,
    /// Display name, if the identity provider supplied one.
    #[serde(default)]
    pub name: Option<String>,
    /// Avatar URL, if the identity provider supplied one.
    #[serde(default)]
    pub picture: Option<String>,
    /// Provider access token the backend uses for mail fetches.
    ///
    /// Opaque pass-through; the client never calls the provider itself.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Provider refresh token, when the backend shares one.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl UserIdentity {
    /// Returns the name to show in the UI, falling back to the email address.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}

/// Identity provider used to sign in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    /// Google OAuth sign-in.
    Google,
    /// Microsoft OAuth sign-in.
    Microsoft,
}

impl AuthProvider {
    /// Path segment used by the backend's login endpoints.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthProvider::Google => "google",
            AuthProvider::Microsoft => "microsoft",
        }
    }
}

impl fmt::Display for AuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
