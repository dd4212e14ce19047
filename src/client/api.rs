//! Authenticated API client
//!
//! Every request carries the stored access token as a bearer token. A 401 on
//! the first send of a request triggers one exchange of the refresh token for
//! a new access token followed by one replay. When that exchange is impossible
//! or fails, the session is cleared, the navigator is sent to the sign-in
//! route, and the caller still receives the original 401.

use std::sync::Arc;

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::base::{ApiError, ApiRequest, ApiResponse, Attempt};
use crate::auth::{CredentialStore, Navigator, Storage};
use crate::config::{ClientConfig, ConfigError};
use crate::security::{Sanitizer, SecretString};

/// Path of the token refresh endpoint, relative to the base URL
pub const REFRESH_PATH: &str = "token/refresh/";

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: SecretString,
}

/// Result of handling a 401 on an initial send
enum Recovery {
    /// Replay with this token
    Replay(SecretString),
    /// The session is over; return the original response
    Terminated,
}

/// HTTP client bound to the product's REST API
pub struct ApiClient {
    http: Client,
    base_url: String,
    sign_in_route: String,
    credentials: CredentialStore,
    navigator: Arc<dyn Navigator>,
    refresh_lock: Option<Mutex<()>>,
}

impl ApiClient {
    /// Creates a client over the given storage and navigator
    pub fn new(
        config: ClientConfig,
        storage: Arc<dyn Storage>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            sign_in_route: config.sign_in_route,
            credentials: CredentialStore::new(storage),
            navigator,
            refresh_lock: config.coalesce_refresh.then(|| Mutex::new(())),
        })
    }

    /// Uses a custom HTTP client (connection pool reuse, proxies)
    #[must_use]
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The credential store this client reads tokens from
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Joins a request path to the base URL
    ///
    /// Leading slashes of the path and trailing slashes of the base collapse
    /// into one. Absolute `http(s)` URLs are used unchanged.
    pub fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.is_empty() {
            return self.base_url.clone();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Sends a request, recovering once from an expired access token
    ///
    /// 2xx responses are returned as-is; any other status is returned as
    /// [`ApiError::Status`].
    pub async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        self.execute(request, Attempt::Initial).await
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.send(&ApiRequest::get(path)).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.send(&ApiRequest::delete(path)).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse, ApiError> {
        self.send(&ApiRequest::post(path).with_json(serde_json::to_value(body)?))
            .await
    }

    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse, ApiError> {
        self.send(&ApiRequest::put(path).with_json(serde_json::to_value(body)?))
            .await
    }

    pub async fn patch<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse, ApiError> {
        self.send(&ApiRequest::patch(path).with_json(serde_json::to_value(body)?))
            .await
    }

    /// GET and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.get(path).await?.json()
    }

    /// POST a JSON body and decode the JSON response
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.post(path, body).await?.json()
    }

    /// Runs the send / refresh / replay sequence for one logical request
    pub(crate) async fn execute(
        &self,
        request: &ApiRequest,
        mut attempt: Attempt,
    ) -> Result<ApiResponse, ApiError> {
        loop {
            let token = match &attempt {
                Attempt::Initial => self.credentials.access_token()?,
                Attempt::Replay(token) => Some(token.clone()),
            };

            let response = self.dispatch(request, token.as_ref()).await?;
            let status = response.status();

            if status.is_success() {
                return Ok(response);
            }
            if status != StatusCode::UNAUTHORIZED || attempt.is_replay() {
                if attempt.is_replay() {
                    tracing::debug!(
                        "Replay of {} {} failed with {}",
                        request.method(),
                        request.path(),
                        status
                    );
                }
                return Err(ApiError::Status(response));
            }

            tracing::debug!(
                "Access token rejected for {} {}",
                request.method(),
                request.path()
            );
            match self.recover(token.as_ref()).await {
                Recovery::Replay(fresh) => attempt = Attempt::Replay(fresh),
                Recovery::Terminated => return Err(ApiError::Status(response)),
            }
        }
    }

    /// Obtains a token to replay with, or terminates the session
    async fn recover(&self, rejected: Option<&SecretString>) -> Recovery {
        let _guard = match &self.refresh_lock {
            Some(lock) => Some(lock.lock().await),
            None => None,
        };

        if self.refresh_lock.is_some() {
            // Another request may have renewed the token while we waited
            if let Ok(Some(current)) = self.credentials.access_token() {
                if rejected != Some(&current) {
                    tracing::debug!("Access token already renewed, replaying");
                    return Recovery::Replay(current);
                }
            }
        }

        let refresh_token = match self.credentials.refresh_token() {
            Ok(Some(token)) => token,
            Ok(None) => {
                tracing::warn!("No refresh token stored");
                self.terminate_session();
                return Recovery::Terminated;
            }
            Err(e) => {
                tracing::error!("Failed to read refresh token: {}", e);
                self.terminate_session();
                return Recovery::Terminated;
            }
        };

        match self.exchange_refresh_token(&refresh_token).await {
            Ok(access) => {
                if let Err(e) = self.credentials.set_access_token(&access) {
                    tracing::error!("Failed to store refreshed access token: {}", e);
                }
                tracing::info!("Access token refreshed ({})", Sanitizer::sanitize_token(&access));
                Recovery::Replay(access)
            }
            Err(reason) => {
                tracing::warn!("Token refresh failed: {}", reason);
                self.terminate_session();
                Recovery::Terminated
            }
        }
    }

    /// Calls the refresh endpoint without a bearer token
    async fn exchange_refresh_token(&self, refresh: &SecretString) -> Result<SecretString, String> {
        let url = self.resolve(REFRESH_PATH);
        tracing::debug!("Refreshing access token at {}", Sanitizer::sanitize_url(&url));

        let response = self
            .http
            .post(&url)
            .json(&RefreshRequest {
                refresh: refresh.expose(),
            })
            .send()
            .await
            .map_err(|e| format!("network error: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {}", status));
        }

        let body: RefreshResponse = response
            .json()
            .await
            .map_err(|e| format!("unexpected response body: {}", e))?;
        Ok(body.access)
    }

    /// Clears the credential pair and sends the navigator to the sign-in route
    fn terminate_session(&self) {
        if let Err(e) = self.credentials.clear() {
            tracing::error!("Failed to clear credentials: {}", e);
        }
        tracing::warn!("Session terminated, redirecting to {}", self.sign_in_route);
        self.navigator.navigate(&self.sign_in_route);
    }

    /// Performs one HTTP exchange
    async fn dispatch(
        &self,
        request: &ApiRequest,
        token: Option<&SecretString>,
    ) -> Result<ApiResponse, ApiError> {
        let url = self.resolve(request.path());
        reqwest::Url::parse(&url).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", url, e)))?;

        let mut headers = request.headers().clone();
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&token.bearer()).map_err(|_| {
                ApiError::InvalidHeader("access token is not a valid header value".into())
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = self.http.request(request.method().clone(), &url).headers(headers);
        if !request.query().is_empty() {
            builder = builder.query(request.query());
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        tracing::debug!("{} {}", request.method(), Sanitizer::sanitize_url(&url));
        let response = builder.send().await?;
        let response = ApiResponse::read(response).await?;
        tracing::debug!("Response status: {}", response.status());
        Ok(response)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("sign_in_route", &self.sign_in_route)
            .field("coalesce_refresh", &self.refresh_lock.is_some())
            .finish_non_exhaustive()
    }
}
