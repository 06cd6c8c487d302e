//! Durable storage for session credentials.
//!
//! This module provides the storage layer for Mailmind, including:
//!
//! - OS keychain integration for the canonical session token copy
//! - A JSON file in the application data directory as the backup copy
//! - The [`TokenStore`] that coordinates the two copies

mod keychain;
mod token_file;
mod token_store;

pub use keychain::KeychainAccess;
pub use token_file::FileTokenStore;
pub use token_store::{TokenStore, TOKEN_ISSUED_AT_KEY, TOKEN_KEY};

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("keychain error: {0}")]
    Keychain(#[from] keyring::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to spawn blocking task: {0}")]
    TaskFailed(String),

    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Durable key-value storage for credentials.
///
/// Implementations must treat `store` as an overwrite and `delete` of a
/// missing key as a no-op, so callers can clear credentials without first
/// checking for their existence.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Stores a credential, overwriting any existing value.
    async fn store(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Retrieves a credential, or `None` if no value exists for the key.
    async fn retrieve(&self, key: &str) -> StorageResult<Option<String>>;

    /// Deletes a credential. Missing keys are not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;
}
