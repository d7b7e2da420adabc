use aws_sdk_dynamodb::Client as DynamoDbClient;
use std::time::Duration;

/// Process-scoped configuration for the ingest Lambda
///
/// Built once at cold start and shared by every invocation.
#[derive(Debug, Clone)]
pub struct Config {
    /// DynamoDB client
    pub dynamodb_client: DynamoDbClient,
    /// Device telemetry table name
    pub telemetry_table: String,
}

impl Config {
    /// Create a new Config instance from environment variables
    pub async fn from_env() -> Result<Self, ConfigError> {
        let telemetry_table = std::env::var("TELEMETRY_TABLE")
            .map_err(|_| ConfigError::MissingEnvVar("TELEMETRY_TABLE".to_string()))?;

        // Load AWS configuration with behavior version
        let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .load()
            .await;

        // Create DynamoDB client with appropriate timeouts
        let dynamodb_config = aws_sdk_dynamodb::config::Builder::from(&aws_config)
            .timeout_config(
                aws_sdk_dynamodb::config::timeout::TimeoutConfig::builder()
                    .operation_timeout(Duration::from_secs(25)) // Leave 5s buffer for Lambda timeout
                    .operation_attempt_timeout(Duration::from_secs(10))
                    .build(),
            )
            .build();

        Ok(Config {
            dynamodb_client: DynamoDbClient::from_conf(dynamodb_config),
            telemetry_table,
        })
    }

    /// Create a test configuration pointing at DynamoDB Local
    #[cfg(test)]
    pub fn for_test(endpoint_url: &str, telemetry_table: String) -> Self {
        use aws_sdk_dynamodb::config::{Credentials, Region};

        let credentials =
            Credentials::new("test_access_key", "test_secret_key", None, None, "test");

        let dynamodb_config = aws_sdk_dynamodb::config::Builder::new()
            .behavior_version(aws_sdk_dynamodb::config::BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(credentials)
            .endpoint_url(endpoint_url)
            .timeout_config(
                aws_sdk_dynamodb::config::timeout::TimeoutConfig::builder()
                    .operation_timeout(Duration::from_secs(10))
                    .operation_attempt_timeout(Duration::from_secs(5))
                    .build(),
            )
            .build();

        Config {
            dynamodb_client: DynamoDbClient::from_conf(dynamodb_config),
            telemetry_table,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),
}
