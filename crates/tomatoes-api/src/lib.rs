//! Client library for the Rotten Tomatoes public API (v1.0).
//!
//! Builds request URLs from typed parameters, throttles and retries
//! requests, and maps JSON responses onto typed models.

/// Typed errors.
pub mod error;

/// Rotten Tomatoes API client.
pub mod rottentomatoes;

pub use error::{Error, ErrorKind, Result};
