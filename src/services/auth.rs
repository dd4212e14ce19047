//! Sign-in, registration and profile endpoints

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize, Serializer};

use crate::auth::TokenPair;
use crate::client::{ApiClient, ApiError};
use crate::security::{Sanitizer, SecretString};

const LOGIN_PATH: &str = "token/";
const REGISTER_PATH: &str = "users/register/";
const CURRENT_USER_PATH: &str = "users/me/";

fn expose_secret<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose())
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// New account details
///
/// The web front end registers with the email address as username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    #[serde(serialize_with = "expose_secret")]
    pub password: SecretString,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

impl RegisterRequest {
    /// Registration keyed by email address
    pub fn with_email(email: impl Into<String>, password: impl Into<SecretString>) -> Self {
        let email = email.into();
        Self {
            username: email.clone(),
            email,
            password: password.into(),
            full_name: None,
        }
    }

    #[must_use]
    pub fn full_name(mut self, name: impl Into<String>) -> Self {
        self.full_name = Some(name.into());
        self
    }
}

/// The signed-in user as returned by `users/me/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    /// Subscription plan, e.g. "free" or "premium"
    #[serde(default)]
    pub plan: Option<String>,
    /// Fields this crate does not model
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Account operations
#[derive(Debug, Clone)]
pub struct AuthService {
    api: Arc<ApiClient>,
}

impl AuthService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Exchanges username and password for a token pair and stores it
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<TokenPair, ApiError> {
        tracing::info!("Signing in as {}", Sanitizer::sanitize_username(username));

        let pair: TokenPair = self
            .api
            .post_json(
                LOGIN_PATH,
                &LoginRequest {
                    username,
                    password: password.expose(),
                },
            )
            .await?;
        self.api.credentials().set_pair(&pair)?;

        tracing::debug!("Session started");
        Ok(pair)
    }

    /// Creates an account; the caller signs in separately
    ///
    /// Field-level validation errors arrive as [`ApiError::Status`] with the
    /// backend's JSON error map in the body.
    pub async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError> {
        tracing::info!("Registering {}", Sanitizer::sanitize_username(&request.username));
        self.api.post(REGISTER_PATH, request).await?;
        Ok(())
    }

    pub async fn current_user(&self) -> Result<UserProfile, ApiError> {
        self.api.get_json(CURRENT_USER_PATH).await
    }

    /// Forgets the stored session
    ///
    /// Free-tier usage counters are left in place.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.api.credentials().clear()?;
        tracing::info!("Signed out");
        Ok(())
    }
}
