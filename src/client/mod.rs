//! Authenticated HTTP client
//!
//! [`ApiClient`] attaches the stored bearer token to every request and
//! recovers once from an expired access token by refreshing it.

mod api;
mod base;

pub use api::{ApiClient, REFRESH_PATH};
pub use base::{ApiError, ApiRequest, ApiResponse, Attempt};
