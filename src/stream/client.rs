//! Stream service client
//!
//! [`StreamApi`] is the narrow seam between this crate and the vendor
//! client: three operations, with the service's "not found" and "already
//! exists" answers mapped to values here so callers never match on vendor
//! error types. [`StreamClient`] is the Kinesis-backed implementation.

use crate::config::EmitterConfig;
use crate::credentials::CredentialMode;
use crate::error::EmitterError;
use async_trait::async_trait;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_kinesis::primitives::Blob;
use aws_sdk_kinesis::types::StreamStatus;
use bytes::Bytes;
use tracing::{debug, info};

/// Service-reported stream state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Creating,
    Active,
    Updating,
    Deleting,
    /// Any state outside the documented four (the service enum is open)
    Other,
}

impl StreamState {
    pub fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl From<&StreamStatus> for StreamState {
    fn from(status: &StreamStatus) -> Self {
        match status {
            StreamStatus::Creating => Self::Creating,
            StreamStatus::Active => Self::Active,
            StreamStatus::Updating => Self::Updating,
            StreamStatus::Deleting => Self::Deleting,
            _ => Self::Other,
        }
    }
}

/// Acknowledgement for one published record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutAck {
    /// Shard the record was routed to
    pub shard_id: String,
    /// Sequence number assigned by the service
    pub sequence_number: String,
}

/// Narrow interface to the stream service
///
/// Implemented by [`StreamClient`] for the real service and by scripted
/// mocks in tests.
#[async_trait]
pub trait StreamApi: Send + Sync {
    /// Describe the stream. `Ok(None)` when the service reports it absent —
    /// absence is a value, not an error.
    async fn describe(&self, stream: &str) -> Result<Option<StreamState>, EmitterError>;

    /// Request creation of the stream with the given shard count. A stream
    /// that already exists (resource-in-use) is success.
    async fn create(&self, stream: &str, shard_count: u32) -> Result<(), EmitterError>;

    /// Append one record, routed by partition key.
    async fn put_record(
        &self,
        stream: &str,
        partition_key: &str,
        payload: Bytes,
    ) -> Result<PutAck, EmitterError>;
}

/// Kinesis-backed stream client bound to one endpoint
pub struct StreamClient {
    client: aws_sdk_kinesis::Client,
    endpoint: Option<String>,
}

impl StreamClient {
    /// Resolve credentials and build the service client.
    ///
    /// Fails fast with a configuration error on inconsistent credential
    /// tokens — before any network call.
    pub async fn connect(config: &EmitterConfig) -> Result<Self, EmitterError> {
        let mode = CredentialMode::resolve(&config.access_key, &config.secret_key)?;
        debug!(mode = mode.label(), region = %config.region, "Resolved credential mode");

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(mode.provider())
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(config.request_timeout)
                    .build(),
            );

        if let Some(ref endpoint) = config.endpoint {
            loader = loader.endpoint_url(endpoint.clone());
        }

        let sdk_config = loader.load().await;

        info!(
            region = %config.region,
            endpoint = config.endpoint.as_deref().unwrap_or("default"),
            "Kinesis client configured"
        );

        Ok(Self {
            client: aws_sdk_kinesis::Client::new(&sdk_config),
            endpoint: config.endpoint.clone(),
        })
    }

    /// Endpoint override this client was built with, if any
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }
}

fn service_error(
    stream: &str,
    operation: &'static str,
    source: impl std::error::Error + Send + Sync + 'static,
) -> EmitterError {
    EmitterError::Service {
        stream: stream.to_string(),
        operation,
        source: Box::new(source),
    }
}

#[async_trait]
impl StreamApi for StreamClient {
    async fn describe(&self, stream: &str) -> Result<Option<StreamState>, EmitterError> {
        match self
            .client
            .describe_stream_summary()
            .stream_name(stream)
            .send()
            .await
        {
            Ok(output) => {
                let status = output
                    .stream_description_summary()
                    .map(|summary| summary.stream_status())
                    .ok_or_else(|| EmitterError::Service {
                        stream: stream.to_string(),
                        operation: "describe",
                        source: "describe response missing stream description".into(),
                    })?;
                Ok(Some(StreamState::from(status)))
            }
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_resource_not_found_exception()) =>
            {
                Ok(None)
            }
            Err(err) => Err(service_error(stream, "describe", err)),
        }
    }

    async fn create(&self, stream: &str, shard_count: u32) -> Result<(), EmitterError> {
        match self
            .client
            .create_stream()
            .stream_name(stream)
            .shard_count(shard_count as i32)
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_resource_in_use_exception()) =>
            {
                debug!(stream, "Stream already exists");
                Ok(())
            }
            Err(err) => Err(service_error(stream, "create", err)),
        }
    }

    async fn put_record(
        &self,
        stream: &str,
        partition_key: &str,
        payload: Bytes,
    ) -> Result<PutAck, EmitterError> {
        let output = self
            .client
            .put_record()
            .stream_name(stream)
            .partition_key(partition_key)
            .data(Blob::new(payload))
            .send()
            .await
            .map_err(|err| service_error(stream, "put_record", err))?;

        Ok(PutAck {
            shard_id: output.shard_id().to_string(),
            sequence_number: output.sequence_number().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_state_maps_service_statuses() {
        assert_eq!(StreamState::from(&StreamStatus::Active), StreamState::Active);
        assert_eq!(
            StreamState::from(&StreamStatus::Creating),
            StreamState::Creating
        );
        assert_eq!(
            StreamState::from(&StreamStatus::Deleting),
            StreamState::Deleting
        );
    }

    #[test]
    fn only_active_counts_as_active() {
        assert!(StreamState::Active.is_active());
        assert!(!StreamState::Creating.is_active());
        assert!(!StreamState::Updating.is_active());
        assert!(!StreamState::Deleting.is_active());
        assert!(!StreamState::Other.is_active());
    }
}
