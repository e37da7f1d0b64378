//! Taxa Common Library
//!
//! Shared error handling, logging and connection configuration for the taxa
//! workspace members.

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::DatabaseConfig;
pub use error::{GraftError, Result, TaxaError};
