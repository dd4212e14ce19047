//! OS keychain storage backend
//!
//! Stores each key as a separate credential under one service name using the
//! platform keychain (Windows Credential Manager, macOS Keychain, Linux
//! Secret Service) via the keyring crate.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use keyring::credential::CredentialBuilder;
use keyring::Entry;

use super::storage::{Storage, StorageError};

/// Keychain-backed [`Storage`]
///
/// One keyring entry is opened per key and reused for the lifetime of the
/// store.
///
/// # Example
///
/// ```no_run
/// use askdr_client::auth::{KeyringStorage, Storage};
///
/// let storage = KeyringStorage::new();
/// storage.set("accessToken", "A1").unwrap();
/// assert_eq!(storage.get("accessToken").unwrap(), Some("A1".to_string()));
/// storage.remove("accessToken").unwrap();
/// ```
pub struct KeyringStorage {
    service: String,
    builder: Option<Box<CredentialBuilder>>,
    entries: Mutex<HashMap<String, Arc<Entry>>>,
}

impl KeyringStorage {
    /// Creates a store under the default service name
    pub fn new() -> Self {
        Self::with_service("AskDr")
    }

    /// Creates a store under a custom service name
    ///
    /// Separate service names keep separate sessions (tests, profiles).
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            builder: None,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a store whose credentials come from a specific keyring backend
    /// instead of the platform default
    pub fn with_builder(service: impl Into<String>, builder: Box<CredentialBuilder>) -> Self {
        Self {
            builder: Some(builder),
            ..Self::with_service(service)
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    fn entry(&self, key: &str) -> Result<Arc<Entry>, StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        if let Some(entry) = entries.get(key) {
            return Ok(entry.clone());
        }

        let entry = match &self.builder {
            Some(builder) => Entry::new_with_credential(builder.build(None, &self.service, key)?),
            None => Entry::new(&self.service, key)?,
        };
        let entry = Arc::new(entry);
        entries.insert(key.to_string(), entry.clone());
        Ok(entry)
    }
}

impl Default for KeyringStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for KeyringStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyringStorage")
            .field("service", &self.service)
            .field("custom_backend", &self.builder.is_some())
            .finish_non_exhaustive()
    }
}

impl Storage for KeyringStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(StorageError::Keyring(e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entry(key)?.set_password(value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(StorageError::Keyring(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{CredentialStore, TokenPair};

    fn mock_storage() -> KeyringStorage {
        KeyringStorage::with_builder("AskDr-Test", keyring::mock::default_credential_builder())
    }

    fn platform_storage() -> KeyringStorage {
        KeyringStorage::with_service("AskDr-Test")
    }

    #[test]
    fn test_service_names() {
        assert_eq!(KeyringStorage::new().service(), "AskDr");
        assert_eq!(KeyringStorage::with_service("Custom").service(), "Custom");
    }

    #[test]
    fn test_set_get_remove_round_trip() {
        let storage = mock_storage();
        assert_eq!(storage.get("accessToken").unwrap(), None);

        storage.set("accessToken", "A1").unwrap();
        assert_eq!(storage.get("accessToken").unwrap(), Some("A1".to_string()));

        storage.set("accessToken", "A2").unwrap();
        assert_eq!(storage.get("accessToken").unwrap(), Some("A2".to_string()));

        storage.remove("accessToken").unwrap();
        assert_eq!(storage.get("accessToken").unwrap(), None);
    }

    #[test]
    fn test_remove_absent_is_ok() {
        let storage = mock_storage();
        assert!(storage.remove("refreshToken").is_ok());
    }

    #[test]
    fn test_keys_are_separate_credentials() {
        let storage = Arc::new(mock_storage());
        let credentials = CredentialStore::new(storage.clone());

        credentials.set_pair(&TokenPair::new("A1", "R1")).unwrap();
        assert_eq!(credentials.access_token().unwrap().unwrap(), "A1");
        assert_eq!(credentials.refresh_token().unwrap().unwrap(), "R1");

        credentials.clear().unwrap();
        assert!(!credentials.has_session().unwrap());
        assert_eq!(storage.get("refreshToken").unwrap(), None);
    }

    #[test]
    #[ignore = "requires a platform keychain"]
    fn test_platform_set_get_remove() {
        let storage = platform_storage();
        let key = "test-access-token";
        let _ = storage.remove(key);

        storage.set(key, "A1").unwrap();
        // A fresh store reads what the first one wrote
        assert_eq!(platform_storage().get(key).unwrap(), Some("A1".to_string()));

        storage.remove(key).unwrap();
        assert_eq!(platform_storage().get(key).unwrap(), None);
    }
}
