//! Publish messages and interpret the stream API's answer.
//!
//! # Responsibilities
//! - Call the stream client exactly once per message
//! - Turn non-2xx answers into `PublishError::Status` carrying the body text
//! - Extract the `message` field from successful answers
//! - Log every failure with the target application name

use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;

use crate::observability::metrics;
use crate::stream::client::StreamClient;
use crate::stream::error::PublishError;

/// A message accepted by the stream API.
#[derive(Debug, Clone, PartialEq)]
pub struct Published {
    /// Status the stream API answered with.
    pub status: StatusCode,
    /// The `message` field of the response body (`null` when absent).
    pub message: Value,
}

/// Publishing front-end over [`StreamClient`].
#[derive(Clone, Debug)]
pub struct PublishService {
    client: StreamClient,
}

impl PublishService {
    pub fn new(client: StreamClient) -> Self {
        Self { client }
    }

    /// Publish `payload` to `stream_name` of `app_name`.
    pub async fn publish_message_to_stream<T>(
        &self,
        app_name: &str,
        stream_name: &str,
        authorization: &str,
        payload: &T,
    ) -> Result<Published, PublishError>
    where
        T: Serialize + ?Sized,
    {
        let result = self
            .try_publish(app_name, stream_name, authorization, payload)
            .await;

        if let Err(e) = &result {
            tracing::error!(
                app_name = %app_name,
                status = ?e.response_status().map(|s| s.as_u16()),
                error = %e,
                "Failed to publish to stream"
            );
            metrics::record_downstream_failure(e.kind());
        }

        result
    }

    async fn try_publish<T>(
        &self,
        app_name: &str,
        stream_name: &str,
        authorization: &str,
        payload: &T,
    ) -> Result<Published, PublishError>
    where
        T: Serialize + ?Sized,
    {
        let response = self
            .client
            .publish_message_to_stream(app_name, stream_name, authorization, payload)
            .await
            .map_err(|source| PublishError::Transport { status: None, source })?;

        let status = response.status();
        let read_failed = |source| PublishError::Transport {
            status: Some(status),
            source,
        };

        if !status.is_success() {
            let body = response.text().await.map_err(read_failed)?;
            return Err(PublishError::Status { status, body });
        }

        let bytes = response.bytes().await.map_err(read_failed)?;
        let body: Value = serde_json::from_slice(&bytes)
            .map_err(|source| PublishError::Decode { status, source })?;

        Ok(Published {
            status,
            message: body.get("message").cloned().unwrap_or(Value::Null),
        })
    }
}
