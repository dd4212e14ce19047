//! Authentication state - storage, credentials and sign-in routing
//!
//! - [`Storage`] backends: in-memory, JSON file, OS keychain (via keyring)
//! - [`CredentialStore`] for the access/refresh token pair
//! - [`Navigator`] and [`SessionGuard`] for session termination and gating

mod credentials;
mod keyring_store;
mod session;
mod storage;

pub use credentials::{CredentialStore, TokenPair, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
pub use keyring_store::KeyringStorage;
pub use session::{Access, BrowserNavigator, LogNavigator, Navigator, SessionGuard, AUTH_PAGE_ROUTE};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};

#[cfg(test)]
pub use session::MockNavigator;
