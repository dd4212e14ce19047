//! Security primitives for credential handling
//!
//! - Secret token values that zero their memory on drop and never print
//! - Sanitizers applied before tokens, URLs or account names reach the log

mod sanitizer;
mod secret;

pub use sanitizer::Sanitizer;
pub use secret::SecretString;
