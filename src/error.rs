// Engine error types

use thiserror::Error;

/// Errors raised by the map engine
///
/// Construction is the only fallible step. Bad coordinates are not errors:
/// they project to degenerate geometry instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArcMapError {
    /// The host surface could not resolve the requested container
    #[error("container not found: {container}")]
    ContainerNotFound { container: String },
}

pub type Result<T> = std::result::Result<T, ArcMapError>;
