//! Error types for the port risk pipeline.

use thiserror::Error;

/// Result type for port risk operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while ingesting, aggregating, or scoring
#[derive(Error, Debug)]
pub enum Error {
    /// Required columns are absent from the raw AIS input
    #[error("Missing columns: {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    /// No port contributed a single time bin
    #[error("No port time series generated. Check your AIS coordinates and port radius.")]
    NoData,

    /// Latitude/longitude is not finite or out of range
    #[error("Invalid coordinate: lat={lat}, lon={lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },

    /// Port radius is not a positive finite number
    #[error("Invalid radius for port '{port}': {radius_km}")]
    InvalidRadius { port: String, radius_km: f64 },

    /// The same port name appears twice in the port definitions
    #[error("Duplicate port: {0}")]
    DuplicatePort(String),

    /// Bin width must be a positive whole number of milliseconds
    #[error("Invalid bin width: {0}")]
    InvalidBinWidth(String),

    /// A model payload was trained on a different feature set
    #[error("Feature mismatch: expected {expected:?}, got {actual:?}")]
    FeatureMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    /// A per-port aggregation worker panicked or was cancelled
    #[error("Worker task failed: {0}")]
    Worker(String),

    /// CSV read/write error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
