//! Error types for vicinity operations.

use thiserror::Error;

/// Convenience alias for results produced by this crate.
pub type Result<T> = std::result::Result<T, VicinityError>;

/// Errors surfaced while constructing an index.
///
/// Queries themselves are infallible: a query that cannot find enough
/// matching points simply returns fewer results.
#[derive(Debug, Error)]
pub enum VicinityError {
    /// A configuration value was rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
