//! Session state and routing types.
//!
//! A session is always in exactly one of three states. `Unknown` covers
//! startup and any window where a restoration attempt is still in flight
//! or has failed for reasons that do not prove the credential invalid.

use std::fmt;

use super::UserIdentity;

/// Authentication state of the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Not yet determined. The UI should show a loading indicator,
    /// never the login screen.
    Unknown,
    /// The backend verified the stored credential and returned an identity.
    Authenticated(UserIdentity),
    /// No credential exists, or the backend rejected it.
    Unauthenticated,
}

impl SessionState {
    /// Returns the screen this state maps to.
    pub fn route(&self) -> Route {
        match self {
            SessionState::Unknown => Route::Loading,
            SessionState::Authenticated(_) => Route::Dashboard,
            SessionState::Unauthenticated => Route::Login,
        }
    }

    /// Returns true if the session holds a verified identity.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    /// Returns the verified identity, if any.
    pub fn user(&self) -> Option<&UserIdentity> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Unknown
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Unknown => write!(f, "unknown"),
            SessionState::Authenticated(user) => write!(f, "authenticated({})", user.email),
            SessionState::Unauthenticated => write!(f, "unauthenticated"),
        }
    }
}

/// Top-level screen the application should display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Session state is still being determined.
    Loading,
    /// Main application screen for a signed-in user.
    Dashboard,
    /// Sign-in screen.
    Login,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Loading => write!(f, "loading"),
            Route::Dashboard => write!(f, "dashboard"),
            Route::Login => write!(f, "login"),
        }
    }
}
