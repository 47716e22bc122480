//! Error types for berth-telemetry.

use thiserror::Error;

/// Errors surfaced by a telemetry source.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The underlying transport failed (connection, session, RPC).
    #[error("telemetry transport failed: {0}")]
    Transport(String),

    /// A required property was missing from the platform's response.
    #[error("entity '{entity}' is missing property '{property}'")]
    MissingProperty { entity: String, property: String },

    /// A performance-counter series could not be parsed.
    #[error("malformed counter samples: '{raw}'")]
    MalformedSamples { raw: String },
}

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
