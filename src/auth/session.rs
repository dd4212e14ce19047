//! Session termination and sign-in routing
//!
//! When a session cannot be recovered the client clears the credential pair
//! and hands the sign-in route to a [`Navigator`]. The same store backs
//! [`SessionGuard`], which decides whether an authenticated surface may be
//! entered at all.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Url;

use super::credentials::CredentialStore;
use super::storage::StorageError;

/// Moves the user agent to another route
#[cfg_attr(test, mockall::automock)]
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str) + Send + Sync,
{
    fn navigate(&self, route: &str) {
        self(route)
    }
}

/// Navigator for headless use: records the redirect in the log only
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, route: &str) {
        tracing::info!("Session ended, sign-in required at {}", route);
    }
}

/// Opens routes of the web front end in the system browser
#[derive(Debug, Clone)]
pub struct BrowserNavigator {
    origin: Url,
}

impl BrowserNavigator {
    /// `origin` is the front end's root, e.g. `https://askdr.ai/`
    pub fn new(origin: Url) -> Self {
        Self { origin }
    }

    /// Absolute URL a route resolves to
    pub fn resolve(&self, route: &str) -> Option<Url> {
        self.origin.join(route).ok()
    }
}

impl Navigator for BrowserNavigator {
    fn navigate(&self, route: &str) {
        let Some(target) = self.resolve(route) else {
            tracing::warn!("Cannot resolve sign-in route {} against {}", route, self.origin);
            return;
        };

        if let Err(e) = opener::open(target.as_str()) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }
}

/// Outcome of a [`SessionGuard`] check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// A session is active
    Granted,
    /// No session; navigate to this route, which carries the `from` parameter
    Redirect(String),
}

impl Access {
    pub fn is_granted(&self) -> bool {
        matches!(self, Access::Granted)
    }
}

/// Characters left unescaped in a URI component: `A-Z a-z 0-9 - _ . ! ~ * ' ( )`
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Default route of the sign-in/sign-up page used by the guard
pub const AUTH_PAGE_ROUTE: &str = "/auth";

/// Gate in front of authenticated surfaces
#[derive(Debug, Clone)]
pub struct SessionGuard {
    credentials: CredentialStore,
    auth_route: String,
}

impl SessionGuard {
    pub fn new(credentials: CredentialStore) -> Self {
        Self::with_auth_route(credentials, AUTH_PAGE_ROUTE)
    }

    pub fn with_auth_route(credentials: CredentialStore, auth_route: impl Into<String>) -> Self {
        Self {
            credentials,
            auth_route: auth_route.into(),
        }
    }

    /// Allows entry when an access token is stored
    ///
    /// Otherwise returns the redirect to the auth page, remembering
    /// `current_path` so the user can be sent back after signing in.
    pub fn require_session(&self, current_path: &str) -> Result<Access, StorageError> {
        if self.credentials.has_session()? {
            return Ok(Access::Granted);
        }

        let from = utf8_percent_encode(current_path, URI_COMPONENT);
        let target = format!("{}?from={}", self.auth_route, from);
        tracing::debug!("No session, redirecting to {}", self.auth_route);
        Ok(Access::Redirect(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{MemoryStorage, ACCESS_TOKEN_KEY};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_guard_allows_active_session() {
        let storage = Arc::new(MemoryStorage::with_entries([(ACCESS_TOKEN_KEY, "A1")]));
        let guard = SessionGuard::new(CredentialStore::new(storage));

        assert!(guard.require_session("/dashboard").unwrap().is_granted());
    }

    #[test]
    fn test_guard_redirects_with_encoded_origin() {
        let guard = SessionGuard::new(CredentialStore::new(Arc::new(MemoryStorage::new())));

        assert_eq!(
            guard.require_session("/settings/account").unwrap(),
            Access::Redirect("/auth?from=%2Fsettings%2Faccount".to_string())
        );
    }

    #[test]
    fn test_guard_encodes_space_and_query_as_uri_component() {
        let guard = SessionGuard::new(CredentialStore::new(Arc::new(MemoryStorage::new())));

        assert_eq!(
            guard.require_session("/search results?q=a&b=(c)").unwrap(),
            Access::Redirect("/auth?from=%2Fsearch%20results%3Fq%3Da%26b%3D(c)".to_string())
        );
        assert_eq!(
            guard.require_session("/notes/caf\u{e9}~1").unwrap(),
            Access::Redirect("/auth?from=%2Fnotes%2Fcaf%C3%A9~1".to_string())
        );
    }

    #[test]
    fn test_guard_custom_route() {
        let guard = SessionGuard::with_auth_route(
            CredentialStore::new(Arc::new(MemoryStorage::new())),
            "/login",
        );

        assert_eq!(
            guard.require_session("/chat").unwrap(),
            Access::Redirect("/login?from=%2Fchat".to_string())
        );
    }

    #[test]
    fn test_closure_navigator() {
        let visited = Arc::new(Mutex::new(Vec::new()));
        let sink = visited.clone();
        let navigator = move |route: &str| sink.lock().unwrap().push(route.to_string());

        navigator.navigate("/login");
        assert_eq!(*visited.lock().unwrap(), vec!["/login".to_string()]);
    }

    #[test]
    fn test_browser_navigator_resolves_route() {
        let navigator = BrowserNavigator::new("https://askdr.ai/app/".parse().unwrap());
        assert_eq!(
            navigator.resolve("/login").unwrap().as_str(),
            "https://askdr.ai/login"
        );
    }
}
