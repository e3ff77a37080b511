//! Common types and utilities shared across sift crates.
//!
//! Kept lightweight so every crate in the workspace can depend on it without
//! pulling heavy transitive costs.
//!
//! # Overview
//!
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`SiftError`] and [`Result`]: shared error handling
//!
//! # Examples
//!
//! ```rust
//! use sift_common::{Result, SiftError};
//!
//! fn require_limit(limit: u32) -> Result<u32> {
//!     if limit == 0 {
//!         return Err(SiftError::Config("search.limit must be positive".into()));
//!     }
//!     Ok(limit)
//! }
//!
//! assert!(require_limit(0).is_err());
//! assert_eq!(require_limit(10).unwrap(), 10);
//! ```

pub mod observability;

/// Error types used across the sift workspace.
#[derive(thiserror::Error, Debug)]
pub enum SiftError {
    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A query could not be dispatched (blank after trimming).
    #[error("Invalid query: {0:?}")]
    InvalidQuery(String),
}

/// Convenient alias for results that use [`SiftError`].
pub type Result<T> = std::result::Result<T, SiftError>;
