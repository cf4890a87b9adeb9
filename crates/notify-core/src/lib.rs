//! # notify-core
//!
//! Core types shared by every notify-rs crate.
//!
//! - [`SendFailure`]: the only error a delivery attempt may produce, tagged
//!   retryable or permanent
//! - [`ConfigError`]: configuration problems, raised when configuration is built
//! - [`config::AppConfig`]: environment-driven channel settings

pub mod config;
pub mod error;

pub use config::AppConfig;
pub use error::*;
