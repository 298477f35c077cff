//! Error bodies for failed publishes.

use axum::http::StatusCode;
use serde_json::{Map, Value};

use crate::handler::body::is_truthy;
use crate::stream::PublishError;

/// Message used when nothing better is available.
pub const DEFAULT_ERROR_MESSAGE: &str = "Something went wrong";

/// Body sent to the caller when publishing failed.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorEnvelope {
    /// The stream API rejected the message. Fields come from its JSON error
    /// body; absent fields are left out of the serialized envelope.
    Api {
        error_code: Option<Value>,
        error_message: Value,
        error_num: Option<Value>,
    },
    /// Any other failure.
    Message(String),
}

impl ErrorEnvelope {
    /// Shape `error` into an envelope and pick the status to answer with.
    pub fn from_error(error: &PublishError) -> (StatusCode, Self) {
        match (error, error.http_status()) {
            (PublishError::Status { body, .. }, Some(status)) => {
                (status, Self::from_api_body(body))
            }
            (_, Some(status)) => (status, Self::from_api_body("")),
            (_, None) => {
                let text = error.to_string();
                let message = if text.is_empty() {
                    DEFAULT_ERROR_MESSAGE.to_string()
                } else {
                    text
                };
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorEnvelope::Message(message))
            }
        }
    }

    /// Pull `code`, `errorMessage` and `errorNum` out of a stream API error
    /// body. Bodies that are not a JSON object only get the default message.
    pub fn from_api_body(body: &str) -> Self {
        let fields = match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };

        let error_message = fields
            .get("errorMessage")
            .filter(|v| is_truthy(v))
            .cloned()
            .unwrap_or_else(|| Value::from(DEFAULT_ERROR_MESSAGE));

        ErrorEnvelope::Api {
            error_code: fields.get("code").cloned(),
            error_message,
            error_num: fields.get("errorNum").cloned(),
        }
    }
}

impl From<ErrorEnvelope> for Value {
    fn from(envelope: ErrorEnvelope) -> Self {
        let mut map = Map::new();
        match envelope {
            ErrorEnvelope::Api {
                error_code,
                error_message,
                error_num,
            } => {
                if let Some(code) = error_code {
                    map.insert("errorCode".into(), code);
                }
                map.insert("errorMessage".into(), error_message);
                if let Some(num) = error_num {
                    map.insert("errorNum".into(), num);
                }
            }
            ErrorEnvelope::Message(message) => {
                map.insert("errorMessage".into(), Value::String(message));
            }
        }
        Value::Object(map)
    }
}
