//! Request, response and error types of the API client

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::auth::StorageError;
use crate::security::SecretString;

/// Description of one outbound call
///
/// The descriptor is never mutated by the client; a replay after a token
/// refresh re-sends it unchanged with a new bearer token.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: Option<serde_json::Value>,
}

impl ApiRequest {
    /// Creates a request for a path relative to the base URL
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Sets the JSON body
    #[must_use]
    pub fn with_json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Adds a header; an `Authorization` header is replaced when a token is stored
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Appends a query parameter
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }
}

/// Which send of a logical request is being performed
///
/// Only an `Initial` send may trigger a token refresh. A `Replay` carries the
/// token obtained by that refresh and is never refreshed again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt {
    Initial,
    Replay(SecretString),
}

impl Attempt {
    pub fn is_replay(&self) -> bool {
        matches!(self, Attempt::Replay(_))
    }
}

/// A fully read HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Reads the whole body of a transport response
    pub(crate) async fn read(response: reqwest::Response) -> Result<Self, reqwest::Error> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();
        Ok(Self::new(status, headers, body))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body as text, with invalid UTF-8 replaced
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decodes the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| ApiError::Decode(format!("{} (HTTP {})", e, self.status)))
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Errors surfaced to callers of the API client
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was received
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-2xx status
    ///
    /// After a session-terminal failure this is the original 401.
    #[error("HTTP {}: {}", .0.status(), .0.text())]
    Status(ApiResponse),

    /// The credential store could not be read or written
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The request path could not be turned into a URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A header value (usually the bearer token) is not valid in HTTP
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// The request body could not be serialized
    #[error("Encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// A 2xx body did not have the expected shape
    #[error("Decode error: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP status of a `Status` error
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status(response) => Some(response.status()),
            ApiError::Network(e) => e.status(),
            _ => None,
        }
    }

    /// The error response, for callers that render field-level errors
    pub fn response(&self) -> Option<&ApiResponse> {
        match self {
            ApiError::Status(response) => Some(response),
            _ => None,
        }
    }

    /// True for a 401 that the refresh protocol could not absorb
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}
