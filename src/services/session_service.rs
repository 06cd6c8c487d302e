//! Session lifecycle management.
//!
//! The [`SessionService`] owns the stored session token and the current
//! [`SessionState`]. Its central operation is [`SessionService::restore`],
//! which turns whatever is persisted on disk into a verified session:
//! look up the token (promoting the backup copy if needed), attach it to
//! the HTTP layer, and ask the backend who it belongs to.
//!
//! Restoration runs are numbered. Any operation that changes the token
//! starts a new generation, and a conclusion is applied only if its
//! generation is still the latest. A slow verification that loses the
//! race cannot overwrite a newer session or discard a newer token.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use crate::api::AuthApi;
use crate::domain::{Route, SessionState, UserIdentity};
use crate::storage::{CredentialStore, StorageError, TokenStore};

/// Errors that can occur during session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Token persistence failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Event emitted when the session changes.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A restoration attempt began.
    RestoreStarted,
    /// The backend verified the stored token.
    Authenticated(UserIdentity),
    /// No session exists; either no token was stored or it was rejected.
    Unauthenticated,
    /// Verification failed for a reason that does not prove the token
    /// invalid. The token is retained and the state stays unknown.
    RestoreFailed { error: String },
}

/// How a restoration attempt ended.
enum Conclusion {
    Authenticated(UserIdentity),
    Unauthenticated,
    Failed(String),
}

/// Service owning the session token and authentication state.
///
/// # Concurrency
///
/// All operations take `&self`; the service is designed to be shared
/// behind an `Arc`. State transitions are serialized through a lock and
/// guarded by a generation counter, so overlapping restorations resolve
/// to the most recently started one.
pub struct SessionService<C, B> {
    tokens: TokenStore<C, B>,
    api: Arc<dyn AuthApi>,
    state: RwLock<SessionState>,
    last_error: RwLock<Option<String>>,
    generation: AtomicU64,
    event_sender: broadcast::Sender<SessionEvent>,
}

impl<C: CredentialStore, B: CredentialStore> SessionService<C, B> {
    /// Creates a session service over the given token store and API.
    pub fn new(tokens: TokenStore<C, B>, api: Arc<dyn AuthApi>) -> Self {
        let (event_sender, _) = broadcast::channel(100);
        Self {
            tokens,
            api,
            state: RwLock::new(SessionState::Unknown),
            last_error: RwLock::new(None),
            generation: AtomicU64::new(0),
            event_sender,
        }
    }

    /// Subscribes to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_sender.subscribe()
    }

    /// Returns the current session state.
    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    /// Returns the screen the current state maps to.
    pub async fn route(&self) -> Route {
        self.state.read().await.route()
    }

    /// Returns the most recent inconclusive-verification error, if the
    /// latest restoration attempt failed without settling the session.
    pub async fn last_error(&self) -> Option<String> {
        self.last_error.read().await.clone()
    }

    /// Returns the underlying token store.
    pub fn tokens(&self) -> &TokenStore<C, B> {
        &self.tokens
    }

    /// Persists a freshly received session token and restores from it.
    ///
    /// Empty tokens are ignored and supersede nothing; the return value
    /// reports whether the token was accepted. A nonempty token claims a
    /// new generation before its storage write begins, so a conclusion
    /// still in flight for the previous token is stale from the moment
    /// the new one arrives and can never discard it. On success the
    /// persisted write has completed before the identity verification
    /// starts, so the backend never sees a credential that is not yet
    /// durable.
    pub async fn set_token(&self, token: &str) -> SessionResult<bool> {
        if token.is_empty() {
            debug!("ignoring empty session token");
            return Ok(false);
        }

        let generation = self.next_generation();
        if !self.tokens.set(token).await? {
            return Ok(false);
        }
        self.restore_generation(generation).await;
        Ok(true)
    }

    /// Removes the stored token and detaches the credential from the
    /// HTTP layer, without calling the backend.
    ///
    /// The session always concludes unauthenticated, even when the
    /// storage deletion reports a failure.
    pub async fn clear_token(&self) -> SessionResult<()> {
        let generation = self.next_generation();
        let result = self.tokens.clear().await;
        self.api.set_bearer(None);
        self.apply(generation, Conclusion::Unauthenticated).await;
        result.map_err(SessionError::from)
    }

    /// Signs out: invalidates the session on the backend, then clears
    /// the local credential.
    ///
    /// Both steps are best-effort; a failing backend call never blocks
    /// the local sign-out.
    pub async fn logout(&self) {
        if let Err(e) = self.api.logout().await {
            warn!("backend logout failed: {e}");
        }
        if let Err(e) = self.clear_token().await {
            warn!("failed to clear session token: {e}");
        }
    }

    /// Determines the session state from whatever token is persisted.
    ///
    /// With no token anywhere, concludes unauthenticated without any
    /// network traffic. With a token, performs exactly one identity
    /// fetch and concludes from its outcome:
    ///
    /// - verified identity: authenticated
    /// - 401 or 403: the token is dead; discard it and conclude
    ///   unauthenticated
    /// - anything else: inconclusive; retain the token and leave the
    ///   state unknown
    ///
    /// Calling this again with an unchanged valid token reaches the same
    /// conclusion; the state never passes through unauthenticated on the
    /// way. A call that is superseded mid-flight leaves no trace.
    pub async fn restore(&self) -> SessionState {
        let generation = self.next_generation();
        self.restore_generation(generation).await
    }

    /// Runs a restoration under an already-claimed generation.
    async fn restore_generation(&self, generation: u64) -> SessionState {
        let _ = self.event_sender.send(SessionEvent::RestoreStarted);

        let token = match self.tokens.current_or_promoted().await {
            Ok(token) => token,
            Err(e) => {
                warn!("token lookup failed: {e}");
                return self
                    .apply(generation, Conclusion::Failed(format!("token lookup failed: {e}")))
                    .await;
            }
        };

        let Some(token) = token else {
            debug!("no stored session token; skipping identity fetch");
            return self.apply(generation, Conclusion::Unauthenticated).await;
        };

        self.api.set_bearer(Some(&token));

        match self.api.fetch_identity().await {
            Ok(envelope) => match envelope.into_user() {
                Some(user) => {
                    info!(email = %user.email, "session restored");
                    self.apply(generation, Conclusion::Authenticated(user)).await
                }
                None => {
                    // Reachable backend, 2xx answer, but no user. The
                    // credential is not proven dead, so keep it.
                    warn!("identity endpoint answered without a user");
                    self.apply(
                        generation,
                        Conclusion::Failed("identity endpoint answered without a user".to_string()),
                    )
                    .await
                }
            },
            Err(e) if e.is_auth_rejection() => {
                info!("stored session token was rejected; discarding it");
                if self.is_current(generation) {
                    if let Err(e) = self.tokens.clear().await {
                        warn!("failed to discard rejected token: {e}");
                    }
                    self.api.set_bearer(None);
                }
                self.apply(generation, Conclusion::Unauthenticated).await
            }
            Err(e) => {
                warn!("identity verification failed: {e}");
                self.apply(generation, Conclusion::Failed(e.to_string())).await
            }
        }
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Applies a conclusion if its generation is still the latest,
    /// otherwise returns the state the newer run produced.
    async fn apply(&self, generation: u64, conclusion: Conclusion) -> SessionState {
        let new_state = match &conclusion {
            Conclusion::Authenticated(user) => SessionState::Authenticated(user.clone()),
            Conclusion::Unauthenticated => SessionState::Unauthenticated,
            Conclusion::Failed(_) => SessionState::Unknown,
        };

        {
            let mut state = self.state.write().await;
            if !self.is_current(generation) {
                debug!("discarding superseded session conclusion");
                return state.clone();
            }
            *state = new_state.clone();
        }

        {
            let mut last_error = self.last_error.write().await;
            *last_error = match &conclusion {
                Conclusion::Failed(error) => Some(error.clone()),
                _ => None,
            };
        }

        let event = match conclusion {
            Conclusion::Authenticated(user) => SessionEvent::Authenticated(user),
            Conclusion::Unauthenticated => SessionEvent::Unauthenticated,
            Conclusion::Failed(error) => SessionEvent::RestoreFailed { error },
        };
        let _ = self.event_sender.send(event);

        new_state
    }
}
