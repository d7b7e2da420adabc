use thiserror::Error;

/// Reasons a raw event cannot become a telemetry record
///
/// All of these are detected before any storage call is made.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    #[error("Malformed payload field '{field}': {reason}")]
    MalformedPayload { field: String, reason: String },

    #[error("Invalid device id: {0}")]
    InvalidDeviceId(String),

    #[error("Invalid delivery timestamp: {0}")]
    InvalidTimestamp(String),
}

impl NormalizeError {
    pub fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        NormalizeError::MalformedPayload {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Stable machine-readable code for log triage
    pub fn error_code(&self) -> &'static str {
        match self {
            NormalizeError::MalformedPayload { .. } => error_codes::MALFORMED_PAYLOAD,
            NormalizeError::InvalidDeviceId(_) => error_codes::INVALID_DEVICE_ID,
            NormalizeError::InvalidTimestamp(_) => error_codes::INVALID_TIMESTAMP,
        }
    }
}

/// Error codes attached to every failure log line
pub mod error_codes {
    // Normalization errors
    pub const MALFORMED_PAYLOAD: &str = "MALFORMED_PAYLOAD";
    pub const INVALID_DEVICE_ID: &str = "INVALID_DEVICE_ID";
    pub const INVALID_TIMESTAMP: &str = "INVALID_TIMESTAMP";

    // Storage errors
    pub const WRITE_FAILED: &str = "WRITE_FAILED";
}
