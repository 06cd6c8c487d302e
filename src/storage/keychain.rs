//! Keychain access for secure credential storage.
//!
//! Wraps the keyring crate to provide OS-native credential storage.
//! This is the canonical home of the session token.

use async_trait::async_trait;

use super::{CredentialStore, StorageError, StorageResult};

/// Provides access to the OS keychain for credential storage.
///
/// Credentials are stored using the service name as a namespace,
/// allowing multiple credentials to be stored per application.
#[derive(Debug, Clone)]
pub struct KeychainAccess {
    service_name: String,
}

impl KeychainAccess {
    /// Default service name for Mailmind credentials.
    pub const DEFAULT_SERVICE: &'static str = "io.mailmind.app";

    /// Creates a new KeychainAccess with the default service name.
    pub fn new() -> Self {
        Self {
            service_name: Self::DEFAULT_SERVICE.to_string(),
        }
    }

    /// Creates a new KeychainAccess with a custom service name.
    ///
    /// Useful for testing to avoid interfering with real credentials.
    pub fn with_service(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    /// Checks if a credential exists in the keychain.
    pub async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.retrieve(key).await?.is_some())
    }

    /// Returns the service name used for this keychain access.
    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

impl Default for KeychainAccess {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for KeychainAccess {
    /// Stores a credential in the keychain.
    ///
    /// If a credential with the same key already exists, it is overwritten.
    async fn store(&self, key: &str, value: &str) -> StorageResult<()> {
        let service = self.service_name.clone();
        let key = key.to_string();
        let value = value.to_string();

        tokio::task::spawn_blocking(move || {
            let entry = keyring::Entry::new(&service, &key)?;
            entry.set_password(&value)?;
            Ok(())
        })
        .await
        .map_err(|e| StorageError::TaskFailed(e.to_string()))?
    }

    /// Retrieves a credential from the keychain.
    ///
    /// Returns `None` if no credential exists for the key.
    async fn retrieve(&self, key: &str) -> StorageResult<Option<String>> {
        let service = self.service_name.clone();
        let key = key.to_string();

        tokio::task::spawn_blocking(move || {
            let entry = keyring::Entry::new(&service, &key)?;
            match entry.get_password() {
                Ok(password) => Ok(Some(password)),
                Err(keyring::Error::NoEntry) => Ok(None),
                Err(e) => Err(StorageError::Keychain(e)),
            }
        })
        .await
        .map_err(|e| StorageError::TaskFailed(e.to_string()))?
    }

    /// Deletes a credential from the keychain.
    ///
    /// Deleting a credential that does not exist is a no-op.
    async fn delete(&self, key: &str) -> StorageResult<()> {
        let service = self.service_name.clone();
        let key = key.to_string();

        tokio::task::spawn_blocking(move || {
            let entry = keyring::Entry::new(&service, &key)?;
            match entry.delete_credential() {
                Ok(()) => Ok(()),
                Err(keyring::Error::NoEntry) => Ok(()),
                Err(e) => Err(StorageError::Keychain(e)),
            }
        })
        .await
        .map_err(|e| StorageError::TaskFailed(e.to_string()))?
    }
}
