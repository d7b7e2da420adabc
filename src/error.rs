use thiserror::Error;

use soil_telemetry::error_codes;
use soil_telemetry::NormalizeError;

/// Failure of one telemetry invocation
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Normalization failed: {0}")]
    Normalize(#[from] NormalizeError),

    #[error("Write failed: {0}")]
    WriteFailed(#[from] DatabaseError),
}

impl IngestError {
    /// Pipeline stage that produced the error
    pub fn stage(&self) -> &'static str {
        match self {
            IngestError::Normalize(_) => "normalize",
            IngestError::WriteFailed(_) => "record",
        }
    }

    /// Stable machine-readable code for log triage
    pub fn error_code(&self) -> &'static str {
        match self {
            IngestError::Normalize(e) => e.error_code(),
            IngestError::WriteFailed(_) => error_codes::WRITE_FAILED,
        }
    }
}

/// Database-specific errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("DynamoDB error: {0}")]
    DynamoDb(String),

    #[error("Conditional check failed")]
    ConditionalCheckFailed,
}

impl<E> From<aws_sdk_dynamodb::error::SdkError<E>> for DatabaseError
where
    E: std::fmt::Debug,
{
    fn from(err: aws_sdk_dynamodb::error::SdkError<E>) -> Self {
        DatabaseError::DynamoDb(format!("{:?}", err))
    }
}
