//! AskDr client - authenticated access to the AskDr health-information API
//!
//! The backend does the substantive work (symptom analysis, medication Q&A,
//! chat, billing). This crate is the client side of it: it keeps the session
//! tokens, attaches them to every request, and recovers once from an expired
//! access token before forcing the user to sign in again.
//!
//! ## Features
//!
//! - Bearer-token HTTP client with a single refresh-and-replay on 401
//! - Pluggable token storage (memory, JSON file, OS keychain)
//! - Sign-in navigation and a route guard for authenticated surfaces
//! - Typed wrappers for sign-in, profile, feature access, billing, mood
//!   tracking, reminders and clinic lookup
//! - Free-tier usage counters for anonymous visitors
//!
//! ## Architecture
//!
//! - **Client**: request/response types and the refresh protocol
//! - **Auth**: storage backends, the credential pair, navigation
//! - **Services**: endpoint wrappers on top of the client
//! - **Usage**: locally metered features
//! - **Security**: secret token values and log sanitization
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use askdr_client::auth::{KeyringStorage, LogNavigator};
//! use askdr_client::services::AuthService;
//! use askdr_client::{ApiClient, ClientConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::from_env()?;
//! let api = Arc::new(ApiClient::new(
//!     config,
//!     Arc::new(KeyringStorage::new()),
//!     Arc::new(LogNavigator),
//! )?);
//!
//! let user = AuthService::new(api.clone()).current_user().await?;
//! println!("Signed in as {}", user.username);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod security;
pub mod services;
pub mod usage;

pub use client::{ApiClient, ApiError, ApiRequest, ApiResponse};
pub use config::{ClientConfig, ConfigError};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "askdr_client=debug,info";

/// Installs a `tracing` subscriber for binaries embedding the client
///
/// A set `RUST_LOG` is used as-is. Without it this crate logs at debug and
/// everything else at info. Fails if a global subscriber is already set or
/// `RUST_LOG` does not parse.
pub fn init_tracing() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref())?)
        .try_init()
}

fn log_filter(
    rust_log: Option<&str>,
) -> Result<tracing_subscriber::EnvFilter, tracing_subscriber::filter::ParseError> {
    match rust_log.map(str::trim).filter(|v| !v.is_empty()) {
        Some(directives) => tracing_subscriber::EnvFilter::try_new(directives),
        None => tracing_subscriber::EnvFilter::try_new(DEFAULT_LOG_FILTER),
    }
}
