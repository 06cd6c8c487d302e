//! Login redirect completion.
//!
//! After the browser-based OAuth dance, the backend redirects into the
//! app with a session token in the query string. The [`CallbackService`]
//! takes that URL and drives it to a navigation decision: pull out the
//! token, hand it to the session service, confirm the durable write
//! actually stuck, and pick the screen to land on.
//!
//! The confirmation wait is bounded. If the canonical store never
//! reflects the token within the window, one recovery attempt rewrites
//! it from the backup copy; only when that also fails does the user get
//! bounced back to login with an error.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

use super::session_service::SessionService;
use crate::domain::{Route, SessionState};
use crate::storage::CredentialStore;

/// Default bound on the write-confirmation wait.
const DEFAULT_CONFIRM_TIMEOUT: Duration = Duration::from_millis(500);

/// Default interval between confirmation read-backs.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Base used to interpret redirect URLs given as bare paths.
const RELATIVE_BASE: &str = "mailmind://app/";

/// Where a handled redirect should take the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// Token persisted and confirmed; proceed into the app.
    Dashboard,
    /// The redirect carried no usable token.
    Login,
    /// The token could not be persisted; sign in again.
    LoginWithError(String),
}

impl CallbackOutcome {
    /// Returns the screen this outcome maps to.
    pub fn route(&self) -> Route {
        match self {
            CallbackOutcome::Dashboard => Route::Dashboard,
            CallbackOutcome::Login | CallbackOutcome::LoginWithError(_) => Route::Login,
        }
    }

    /// Returns the error message to surface on the login screen, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            CallbackOutcome::LoginWithError(error) => Some(error),
            _ => None,
        }
    }
}

/// Handles login redirect URLs.
pub struct CallbackService<C, B> {
    session: Arc<SessionService<C, B>>,
    confirm_timeout: Duration,
    poll_interval: Duration,
}

impl<C: CredentialStore, B: CredentialStore> CallbackService<C, B> {
    /// Creates a callback service with default confirmation timing.
    pub fn new(session: Arc<SessionService<C, B>>) -> Self {
        Self {
            session,
            confirm_timeout: DEFAULT_CONFIRM_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Overrides how long to wait for write confirmation and how often
    /// to poll for it.
    pub fn with_timing(mut self, confirm_timeout: Duration, poll_interval: Duration) -> Self {
        self.confirm_timeout = confirm_timeout;
        self.poll_interval = poll_interval;
        self
    }

    /// Processes a login redirect URL and decides where to navigate.
    ///
    /// A redirect without a token means the login did not complete;
    /// nothing is written and the user returns to the login screen. With
    /// a token, the flow is persist, confirm, and only then navigate
    /// into the app, so a restart immediately after landing still finds
    /// the session on disk.
    pub async fn handle(&self, url: &str) -> CallbackOutcome {
        let Some(token) = extract_token(url) else {
            debug!("login redirect carried no token");
            return CallbackOutcome::Login;
        };

        match self.session.set_token(&token).await {
            Ok(true) => {
                // The set already ran a verification. An unauthenticated
                // conclusion here means the backend rejected the token and
                // it has been discarded; that is a failed login, not a
                // persistence failure, so skip the confirm/recovery path.
                if self.session.state().await == SessionState::Unauthenticated {
                    info!("redirect token was rejected by the backend");
                    return CallbackOutcome::Login;
                }
            }
            Ok(false) => return CallbackOutcome::Login,
            // The write failed outright. The confirmation wait below
            // gives a recovering store a chance before giving up.
            Err(e) => warn!("session token persistence failed: {e}"),
        }

        if self.confirm_persisted(&token).await {
            return CallbackOutcome::Dashboard;
        }

        warn!("token write could not be confirmed; attempting recovery from backup");
        if self.session.tokens().recover_from_backup().await {
            info!("session token recovered from backup copy");
            self.session.restore().await;
            return CallbackOutcome::Dashboard;
        }

        CallbackOutcome::LoginWithError(
            "Your session could not be saved. Please sign in again.".to_string(),
        )
    }

    /// Polls the canonical store until it reads back `expected`, up to
    /// the configured bound. Always checks at least once.
    async fn confirm_persisted(&self, expected: &str) -> bool {
        let deadline = Instant::now() + self.confirm_timeout;
        loop {
            if self.session.tokens().confirm(expected).await {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

/// Pulls the session token out of a redirect URL.
///
/// Checks the `token` query parameter first, then the `emergencyToken`
/// fallback some login paths use. Empty values count as absent. For
/// repeated parameters the first occurrence wins.
fn extract_token(url: &str) -> Option<String> {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = Url::parse(RELATIVE_BASE).ok()?;
            base.join(url).ok()?
        }
        Err(e) => {
            debug!("unparseable redirect url: {e}");
            return None;
        }
    };

    let mut token = None;
    let mut emergency = None;
    for (key, value) in parsed.query_pairs() {
        match key.as_ref() {
            "token" if !value.is_empty() && token.is_none() => {
                token = Some(value.into_owned());
            }
            "emergencyToken" if !value.is_empty() && emergency.is_none() => {
                emergency = Some(value.into_owned());
            }
            _ => {}
        }
    }
    token.or(emergency)
}
