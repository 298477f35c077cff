//! Request handling for SMS auth events.
//!
//! # Data Flow
//! ```text
//! inbound body
//!     → body.rs (parse, field checks)
//!     → digest (user_id_sha)
//!     → stream::PublishService (POST to stream application)
//!     → envelope.rs (error shaping on failure)
//!     → HandlerResponse (status + JSON body + content headers)
//! ```
//!
//! Every request yields a response; publish failures never escape as errors.

pub mod body;
pub mod envelope;
pub mod variables;

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::{json, Value};

use crate::config::{PublisherConfig, StreamConfig};
use crate::digest::{generate_digest, DigestAlgorithm};
use crate::stream::{PublishService, StreamClient};

pub use body::{parse_body, sms_user_id, VALIDATION_ERROR};
pub use envelope::{ErrorEnvelope, DEFAULT_ERROR_MESSAGE};
pub use variables::{authorization_header, HeaderVariables, RequestVariables, API_KEY_VARIABLE};

/// Key added to the payload before publishing.
pub const USER_ID_SHA_FIELD: &str = "user_id_sha";

/// How a request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Body failed validation; nothing was published.
    Rejected,
    /// The stream accepted the message.
    Published,
    /// The stream call failed.
    Failed,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Rejected => "rejected",
            Outcome::Published => "published",
            Outcome::Failed => "failed",
        }
    }
}

/// Status and JSON body produced for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResponse {
    pub status: StatusCode,
    pub body: Value,
    pub outcome: Outcome,
}

impl IntoResponse for HandlerResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [
                (header::CONTENT_TYPE, HeaderValue::from_static("application/json")),
                (header::CONTENT_LANGUAGE, HeaderValue::from_static("en-US")),
            ],
            self.body.to_string(),
        )
            .into_response()
    }
}

/// Validates SMS auth events and publishes them to the configured stream.
#[derive(Clone, Debug)]
pub struct SmsEventHandler {
    publisher: PublishService,
    app_name: String,
    stream_name: String,
}

impl SmsEventHandler {
    pub fn new(publisher: PublishService, stream: &StreamConfig) -> Self {
        Self {
            publisher,
            app_name: stream.app_name.clone(),
            stream_name: stream.stream_name.clone(),
        }
    }

    /// Build the handler and its stream client from configuration.
    pub fn from_config(config: &PublisherConfig) -> Result<Self, reqwest::Error> {
        let stream = std::sync::Arc::new(config.stream.clone());
        let client = StreamClient::new(stream, &config.timeouts)?;
        Ok(Self::new(PublishService::new(client), &config.stream))
    }

    /// Handle one request body.
    ///
    /// The authorization value is derived from `variables` on every call.
    pub async fn handle<V>(&self, variables: &V, raw_body: &[u8]) -> HandlerResponse
    where
        V: RequestVariables + ?Sized,
    {
        let authorization = authorization_header(variables);
        let mut body = parse_body(raw_body);

        let Some(user_id) = sms_user_id(&body) else {
            tracing::debug!("Rejected request body");
            return HandlerResponse {
                status: StatusCode::OK,
                body: json!({ "error": VALIDATION_ERROR }),
                outcome: Outcome::Rejected,
            };
        };

        body.insert(
            USER_ID_SHA_FIELD.to_string(),
            Value::String(generate_digest(DigestAlgorithm::Sha256, &user_id)),
        );

        match self
            .publisher
            .publish_message_to_stream(&self.app_name, &self.stream_name, &authorization, &body)
            .await
        {
            Ok(published) => HandlerResponse {
                status: StatusCode::OK,
                body: published.message,
                outcome: Outcome::Published,
            },
            Err(e) => {
                let (status, envelope) = ErrorEnvelope::from_error(&e);
                HandlerResponse {
                    status,
                    body: envelope.into(),
                    outcome: Outcome::Failed,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::sha256_hex;
    use std::collections::HashMap;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn handler_for(c8_url: &str) -> SmsEventHandler {
        let mut config = PublisherConfig::default();
        config.stream.c8_url = c8_url.to_string();
        config.stream.fabric = "edge".into();
        config.stream.app_name = "app".into();
        config.stream.stream_name = "events".into();
        SmsEventHandler::from_config(&config).unwrap()
    }

    fn vars(key: &str) -> HashMap<String, String> {
        HashMap::from([(API_KEY_VARIABLE.to_string(), key.to_string())])
    }

    /// Serve one request with a 503 whose body ends short of its
    /// Content-Length, then hang up.
    async fn truncated_upstream() -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request).to_ascii_lowercase();
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text[..end]
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if n == 0 || request.len() >= end + 4 + length {
                        break;
                    }
                } else if n == 0 {
                    break;
                }
            }
            socket
                .write_all(
                    b"HTTP/1.1 503 Service Unavailable\r\nContent-Length: 100\r\nConnection: close\r\n\r\n{\"code\"",
                )
                .await
                .unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_rejected_bodies_never_reach_stream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let handler = handler_for(&server.uri());
        for raw in [
            "",
            "not json",
            r#"{"user_id":"u1","auth_type":"email","url_path":"/x"}"#,
            r#"{"user_id":"u1","auth_type":"sms"}"#,
        ] {
            let response = handler.handle(&vars("k"), raw.as_bytes()).await;
            assert_eq!(response.status, StatusCode::OK);
            assert_eq!(response.body, json!({"error": VALIDATION_ERROR}));
            assert_eq!(response.outcome, Outcome::Rejected);
        }
    }

    #[tokio::test]
    async fn test_publishes_enriched_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/_fabric/edge/_api/streamapps/http/app/events"))
            .and(header("authorization", "apikey secret"))
            .and(body_partial_json(json!({
                "user_id": "u1",
                "auth_type": "SMS",
                "url_path": "/x",
                "user_id_sha": sha256_hex("u1"),
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "queued"})))
            .expect(1)
            .mount(&server)
            .await;

        let response = handler_for(&server.uri())
            .handle(
                &vars("secret"),
                br#"{"user_id":"u1","auth_type":"SMS","url_path":"/x"}"#,
            )
            .await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, json!("queued"));
        assert_eq!(response.outcome, Outcome::Published);
    }

    #[tokio::test]
    async fn test_downstream_error_is_relayed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(503).set_body_string(r#"{"code":"C1","errorNum":7}"#),
            )
            .mount(&server)
            .await;

        let response = handler_for(&server.uri())
            .handle(&vars("k"), br#"{"user_id":"u1","auth_type":"sms","url_path":"/x"}"#)
            .await;

        assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            response.body,
            json!({"errorCode": "C1", "errorMessage": "Something went wrong", "errorNum": 7})
        );
        assert_eq!(response.outcome, Outcome::Failed);
    }

    #[tokio::test]
    async fn test_network_error_is_internal() {
        let response = handler_for("http://127.0.0.1:1")
            .handle(&vars("k"), br#"{"user_id":"u1","auth_type":"sms","url_path":"/x"}"#)
            .await;

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        let message = response.body["errorMessage"].as_str().unwrap();
        assert!(!message.is_empty());
        assert_eq!(response.body.as_object().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_truncated_error_body_relays_status() {
        let upstream = truncated_upstream().await;
        let response = handler_for(&upstream)
            .handle(&vars("k"), br#"{"user_id":"u1","auth_type":"sms","url_path":"/x"}"#)
            .await;

        assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.body, json!({"errorMessage": "Something went wrong"}));
        assert_eq!(response.outcome, Outcome::Failed);
    }

    #[test]
    fn test_into_response_sets_headers() {
        let response = HandlerResponse {
            status: StatusCode::OK,
            body: json!({"error": VALIDATION_ERROR}),
            outcome: Outcome::Rejected,
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[axum::http::header::CONTENT_TYPE], "application/json");
        assert_eq!(headers[axum::http::header::CONTENT_LANGUAGE], "en-US");
    }
}
