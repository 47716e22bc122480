//! Error types for berth-types.

use thiserror::Error;

/// Errors arising from operator-supplied configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A datastore name pattern failed to compile.
    #[error("invalid datastore pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
