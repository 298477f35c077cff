//! HTTP client for the stream application API.
//!
//! # Responsibilities
//! - Build the stream application endpoint from configuration
//! - Attach the authorization and origin headers
//! - Send the JSON payload and hand back the raw response

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::config::{StreamConfig, TimeoutConfig};

/// Header identifying this publisher to the stream platform.
pub const ORIGIN_HEADER: &str = "Macrometa-Origin";

/// Thin wrapper around `reqwest::Client` bound to one GDN endpoint.
#[derive(Clone)]
pub struct StreamClient {
    http: reqwest::Client,
    config: Arc<StreamConfig>,
}

impl StreamClient {
    /// Create a client using the given stream settings and timeouts.
    pub fn new(config: Arc<StreamConfig>, timeouts: &TimeoutConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(Duration::from_secs(timeouts.upstream_secs))
            .build()?;
        Ok(Self::with_http_client(http, config))
    }

    /// Create a client around an existing `reqwest::Client`.
    pub fn with_http_client(http: reqwest::Client, config: Arc<StreamConfig>) -> Self {
        Self { http, config }
    }

    /// Full URL of a stream inside a stream application.
    pub fn endpoint(&self, app_name: &str, stream_name: &str) -> String {
        format!(
            "{}/_fabric/{}/_api/streamapps/http/{}/{}",
            self.config.c8_url.trim_end_matches('/'),
            self.config.fabric,
            app_name,
            stream_name
        )
    }

    /// POST `payload` to the stream. The response is returned as-is,
    /// whatever its status.
    pub async fn publish_message_to_stream<T>(
        &self,
        app_name: &str,
        stream_name: &str,
        authorization: &str,
        payload: &T,
    ) -> Result<reqwest::Response, reqwest::Error>
    where
        T: Serialize + ?Sized,
    {
        let url = self.endpoint(app_name, stream_name);
        tracing::debug!(url = %url, "Publishing message to stream");

        self.http
            .post(url)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .header(ORIGIN_HEADER, self.config.origin_name.as_str())
            .json(payload)
            .send()
            .await
    }
}

impl std::fmt::Debug for StreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamClient")
            .field("c8_url", &self.config.c8_url)
            .field("fabric", &self.config.fabric)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn stream_config(c8_url: &str) -> Arc<StreamConfig> {
        Arc::new(StreamConfig {
            c8_url: c8_url.to_string(),
            fabric: "edge".into(),
            origin_name: "test-origin".into(),
            app_name: "app".into(),
            stream_name: "stream".into(),
        })
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = StreamClient::new(
            stream_config("https://gdn.example.com/"),
            &TimeoutConfig::default(),
        )
        .unwrap();
        assert_eq!(
            client.endpoint("app", "stream"),
            "https://gdn.example.com/_fabric/edge/_api/streamapps/http/app/stream"
        );
    }

    #[tokio::test]
    async fn test_sends_headers_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/_fabric/edge/_api/streamapps/http/app/stream"))
            .and(header("authorization", "apikey k1"))
            .and(header("Macrometa-Origin", "test-origin"))
            .and(body_json(serde_json::json!({"hello": "world"})))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let client = StreamClient::new(stream_config(&server.uri()), &TimeoutConfig::default()).unwrap();
        let response = client
            .publish_message_to_stream("app", "stream", "apikey k1", &serde_json::json!({"hello": "world"}))
            .await
            .unwrap();

        assert_eq!(response.status(), 202);
    }

    #[tokio::test]
    async fn test_error_status_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = StreamClient::new(stream_config(&server.uri()), &TimeoutConfig::default()).unwrap();
        let response = client
            .publish_message_to_stream("app", "stream", "apikey k1", &serde_json::json!({}))
            .await
            .unwrap();

        assert_eq!(response.status(), 500);
        assert_eq!(response.text().await.unwrap(), "boom");
    }
}
