//! Two-tier persistence for the session token.
//!
//! The token lives in two places: a canonical store (the OS keychain in
//! production) and a backup store (a JSON file in the data directory).
//! Reads trust the canonical copy; the backup exists only to reseed it.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::{CredentialStore, StorageResult};

/// Storage key for the session token.
pub const TOKEN_KEY: &str = "session.token";

/// Storage key for the RFC 3339 timestamp recorded when the token was stored.
pub const TOKEN_ISSUED_AT_KEY: &str = "session.token_issued_at";

/// Coordinates the canonical and backup copies of the session token.
///
/// Only two operations write the canonical copy: [`TokenStore::set`] and
/// the promotion performed by [`TokenStore::current_or_promoted`] (or its
/// recovery twin [`TokenStore::recover_from_backup`]). Everything else
/// reads or deletes.
pub struct TokenStore<C, B> {
    canonical: C,
    backup: B,
}

impl<C: CredentialStore, B: CredentialStore> TokenStore<C, B> {
    /// Creates a token store over the given canonical and backup stores.
    pub fn new(canonical: C, backup: B) -> Self {
        Self { canonical, backup }
    }

    /// Persists a session token to both stores.
    ///
    /// An empty token is ignored and leaves existing values untouched;
    /// the return value tells the caller whether the token was accepted.
    /// The backup copy is written first so that a recovery source exists
    /// even when the canonical write fails. A backup failure alone does
    /// not fail the operation.
    pub async fn set(&self, token: &str) -> StorageResult<bool> {
        if token.is_empty() {
            debug!("ignoring empty session token");
            return Ok(false);
        }

        let issued_at = Utc::now().to_rfc3339();

        if let Err(e) = self.backup.store(TOKEN_KEY, token).await {
            warn!("backup token write failed: {e}");
        }
        if let Err(e) = self.backup.store(TOKEN_ISSUED_AT_KEY, &issued_at).await {
            warn!("backup token timestamp write failed: {e}");
        }

        self.canonical.store(TOKEN_KEY, token).await?;
        self.canonical.store(TOKEN_ISSUED_AT_KEY, &issued_at).await?;
        Ok(true)
    }

    /// Returns the canonical token, if one is stored.
    pub async fn get(&self) -> StorageResult<Option<String>> {
        self.canonical.retrieve(TOKEN_KEY).await
    }

    /// Returns when the current token was stored, if known.
    pub async fn issued_at(&self) -> StorageResult<Option<DateTime<Utc>>> {
        let Some(raw) = self.canonical.retrieve(TOKEN_ISSUED_AT_KEY).await? else {
            return Ok(None);
        };
        Ok(DateTime::parse_from_rfc3339(&raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)))
    }

    /// Removes the token from both stores.
    ///
    /// Backup failures are logged and swallowed; the canonical deletion
    /// decides the outcome.
    pub async fn clear(&self) -> StorageResult<()> {
        if let Err(e) = self.backup.delete(TOKEN_KEY).await {
            warn!("backup token delete failed: {e}");
        }
        if let Err(e) = self.backup.delete(TOKEN_ISSUED_AT_KEY).await {
            warn!("backup token timestamp delete failed: {e}");
        }

        self.canonical.delete(TOKEN_KEY).await?;
        self.canonical.delete(TOKEN_ISSUED_AT_KEY).await?;
        Ok(())
    }

    /// Reads back the canonical copy and compares it to `expected`.
    ///
    /// Any read failure counts as unconfirmed.
    pub async fn confirm(&self, expected: &str) -> bool {
        match self.canonical.retrieve(TOKEN_KEY).await {
            Ok(Some(stored)) => stored == expected,
            Ok(None) => false,
            Err(e) => {
                debug!("token read-back failed: {e}");
                false
            }
        }
    }

    /// Returns the current token, promoting the backup copy if the
    /// canonical store is empty.
    ///
    /// The backup is consulted only when the canonical copy is absent;
    /// it never overrides an existing canonical value. A failed
    /// promotion write is logged but does not discard the token.
    pub async fn current_or_promoted(&self) -> StorageResult<Option<String>> {
        if let Some(token) = self.canonical.retrieve(TOKEN_KEY).await? {
            return Ok(Some(token));
        }

        let backed_up = match self.backup.retrieve(TOKEN_KEY).await {
            Ok(value) => value,
            Err(e) => {
                warn!("backup token read failed: {e}");
                None
            }
        };
        let Some(token) = backed_up else {
            return Ok(None);
        };

        info!("promoting backed-up session token to canonical storage");
        match self.canonical.store(TOKEN_KEY, &token).await {
            Ok(()) => {
                if let Ok(Some(issued_at)) = self.backup.retrieve(TOKEN_ISSUED_AT_KEY).await {
                    let _ = self.canonical.store(TOKEN_ISSUED_AT_KEY, &issued_at).await;
                }
            }
            Err(e) => warn!("token promotion write failed: {e}"),
        }
        Ok(Some(token))
    }

    /// Rewrites the canonical copy from the backup and confirms it stuck.
    ///
    /// Used after a canonical write could not be confirmed. Returns true
    /// only when the canonical store reads back the backup value.
    pub async fn recover_from_backup(&self) -> bool {
        let token = match self.backup.retrieve(TOKEN_KEY).await {
            Ok(Some(token)) => token,
            Ok(None) => {
                debug!("no backup token available for recovery");
                return false;
            }
            Err(e) => {
                warn!("backup token read failed during recovery: {e}");
                return false;
            }
        };

        if let Err(e) = self.canonical.store(TOKEN_KEY, &token).await {
            warn!("canonical token rewrite failed during recovery: {e}");
            return false;
        }
        if let Ok(Some(issued_at)) = self.backup.retrieve(TOKEN_ISSUED_AT_KEY).await {
            let _ = self.canonical.store(TOKEN_ISSUED_AT_KEY, &issued_at).await;
        }

        self.confirm(&token).await
    }
}
