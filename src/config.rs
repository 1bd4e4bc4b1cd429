//! Emitter configuration module
//!
//! Handles loading configuration from environment variables. The config is
//! immutable input: built once by the host, read-only to everything else.

use crate::error::EmitterError;
use std::env;
use std::time::Duration;

/// Emitter configuration
#[derive(Debug, Clone)]
pub struct EmitterConfig {
    /// Access key, or one of the reserved credential tokens
    pub access_key: String,

    /// Secret key, or the matching reserved credential token
    pub secret_key: String,

    /// AWS region for the stream service
    pub region: String,

    /// Optional endpoint URL override (localstack, VPC endpoint)
    pub endpoint: Option<String>,

    /// Target stream name
    pub stream_name: String,

    /// Shard count requested when the stream has to be created
    pub shard_count: u32,

    /// Number of publish worker tasks
    pub pool_size: usize,

    /// Deadline for a single service call (describe/create)
    pub request_timeout: Duration,

    /// Overall deadline for stream creation + readiness wait
    pub activation_timeout: Duration,

    /// Interval between readiness polls
    pub poll_interval: Duration,
}

impl EmitterConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, EmitterError> {
        dotenvy::dotenv().ok();

        let access_key = env::var("KINESIS_ACCESS_KEY")
            .map_err(|_| EmitterError::Config("KINESIS_ACCESS_KEY must be set".to_string()))?;

        let secret_key = env::var("KINESIS_SECRET_KEY")
            .map_err(|_| EmitterError::Config("KINESIS_SECRET_KEY must be set".to_string()))?;

        let stream_name = env::var("KINESIS_STREAM_NAME")
            .map_err(|_| EmitterError::Config("KINESIS_STREAM_NAME must be set".to_string()))?;

        let region = env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string());

        let endpoint = env::var("KINESIS_ENDPOINT").ok();

        let shard_count = env::var("KINESIS_SHARD_COUNT")
            .unwrap_or_else(|_| "1".to_string())
            .parse()
            .map_err(|e| {
                EmitterError::Config(format!("KINESIS_SHARD_COUNT must be a valid number: {e}"))
            })?;

        let pool_size = env::var("KINESIS_PUBLISH_POOL_SIZE")
            .unwrap_or_else(|_| "4".to_string())
            .parse()
            .map_err(|e| {
                EmitterError::Config(format!(
                    "KINESIS_PUBLISH_POOL_SIZE must be a valid number: {e}"
                ))
            })?;
        if pool_size == 0 {
            return Err(EmitterError::Config(
                "KINESIS_PUBLISH_POOL_SIZE must be at least 1".to_string(),
            ));
        }

        let request_timeout = parse_secs("KINESIS_REQUEST_TIMEOUT_SECS", "10")?;
        let activation_timeout = parse_secs("KINESIS_ACTIVATION_TIMEOUT_SECS", "60")?;

        let poll_interval = env::var("KINESIS_POLL_INTERVAL_MS")
            .unwrap_or_else(|_| "1000".to_string())
            .parse()
            .map(Duration::from_millis)
            .map_err(|e| {
                EmitterError::Config(format!("KINESIS_POLL_INTERVAL_MS must be a valid number: {e}"))
            })?;

        Ok(Self {
            access_key,
            secret_key,
            region,
            endpoint,
            stream_name,
            shard_count,
            pool_size,
            request_timeout,
            activation_timeout,
            poll_interval,
        })
    }
}

fn parse_secs(var: &str, default: &str) -> Result<Duration, EmitterError> {
    env::var(var)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map(Duration::from_secs)
        .map_err(|e| EmitterError::Config(format!("{var} must be a valid number: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_secs_uses_default_when_unset() {
        // Variable name chosen to never exist in the test environment
        let d = parse_secs("KINESIS_TEST_UNSET_TIMEOUT_SECS", "10").unwrap();
        assert_eq!(d, Duration::from_secs(10));
    }

    #[test]
    fn parse_secs_rejects_garbage_default() {
        assert!(parse_secs("KINESIS_TEST_UNSET_TIMEOUT_SECS", "not-a-number").is_err());
    }
}
