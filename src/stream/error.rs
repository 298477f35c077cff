//! Stream publishing errors.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur while publishing a message to a stream.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The request could not be sent, or the response body could not be read.
    #[error("{source}")]
    Transport {
        /// Status of the response, when one arrived before the failure.
        status: Option<StatusCode>,
        #[source]
        source: reqwest::Error,
    },

    /// The stream API answered with a non-2xx status. `body` is the raw
    /// response text.
    #[error("{body}")]
    Status { status: StatusCode, body: String },

    /// A 2xx response whose body was not valid JSON.
    #[error("invalid stream response: {source}")]
    Decode {
        status: StatusCode,
        #[source]
        source: serde_json::Error,
    },
}

impl PublishError {
    /// HTTP status to relay to the caller: any non-2xx status the stream
    /// API answered with, even when its body could not be read.
    pub fn http_status(&self) -> Option<StatusCode> {
        match self {
            PublishError::Status { status, .. } => Some(*status),
            PublishError::Transport {
                status: Some(status),
                ..
            } if !status.is_success() => Some(*status),
            _ => None,
        }
    }

    /// Status of the last response seen, if any.
    pub fn response_status(&self) -> Option<StatusCode> {
        match self {
            PublishError::Transport { status, .. } => *status,
            PublishError::Status { status, .. } | PublishError::Decode { status, .. } => {
                Some(*status)
            }
        }
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            PublishError::Transport { .. } => "transport",
            PublishError::Status { .. } => "status",
            PublishError::Decode { .. } => "decode",
        }
    }
}
