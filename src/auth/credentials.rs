//! Session credential pair
//!
//! The access and refresh tokens live in [`Storage`] under fixed keys. A
//! session exists while the access token is stored.

use std::sync::Arc;

use serde::Deserialize;

use super::storage::{Storage, StorageError};
use crate::security::{Sanitizer, SecretString};

/// Storage key of the bearer token
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Storage key of the refresh credential
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Token pair issued by the sign-in endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenPair {
    #[serde(rename = "access")]
    pub access_token: SecretString,
    #[serde(rename = "refresh")]
    pub refresh_token: SecretString,
}

impl TokenPair {
    pub fn new(
        access_token: impl Into<SecretString>,
        refresh_token: impl Into<SecretString>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

/// Reads and writes the credential pair in an injected [`Storage`]
#[derive(Clone)]
pub struct CredentialStore {
    storage: Arc<dyn Storage>,
}

impl CredentialStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// The underlying storage, shared with other consumers such as usage counters
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Stored access token, if a session is active
    pub fn access_token(&self) -> Result<Option<SecretString>, StorageError> {
        Ok(self.storage.get(ACCESS_TOKEN_KEY)?.map(SecretString::new))
    }

    /// Stored refresh token, if a session is active
    pub fn refresh_token(&self) -> Result<Option<SecretString>, StorageError> {
        Ok(self.storage.get(REFRESH_TOKEN_KEY)?.map(SecretString::new))
    }

    /// Replaces the access token only; the refresh token is left as-is
    pub fn set_access_token(&self, token: &SecretString) -> Result<(), StorageError> {
        tracing::debug!("Storing access token {}", Sanitizer::sanitize_token(token));
        self.storage.set(ACCESS_TOKEN_KEY, token.expose())
    }

    /// Stores a freshly issued pair, overwriting both values
    pub fn set_pair(&self, pair: &TokenPair) -> Result<(), StorageError> {
        tracing::debug!(
            "Storing credential pair (access {})",
            Sanitizer::sanitize_token(&pair.access_token)
        );
        self.storage.set(ACCESS_TOKEN_KEY, pair.access_token.expose())?;
        self.storage.set(REFRESH_TOKEN_KEY, pair.refresh_token.expose())
    }

    /// Deletes both tokens
    ///
    /// Both removals are attempted even if the first fails; the first error
    /// is returned.
    pub fn clear(&self) -> Result<(), StorageError> {
        let access = self.storage.remove(ACCESS_TOKEN_KEY);
        let refresh = self.storage.remove(REFRESH_TOKEN_KEY);
        access.and(refresh)
    }

    /// Returns true if an access token is stored
    pub fn has_session(&self) -> Result<bool, StorageError> {
        Ok(self.storage.get(ACCESS_TOKEN_KEY)?.is_some())
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}
