//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the publisher.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the stream publisher.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PublisherConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Downstream stream application settings.
    pub stream: StreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Where per-request variables are read from.
    pub variables: VariablesConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Downstream streaming-ingest endpoint.
///
/// Messages are posted to
/// `{c8_url}/_fabric/{fabric}/_api/streamapps/http/{app_name}/{stream_name}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Base URL of the GDN API (e.g., "https://api-play.paas.macrometa.io").
    pub c8_url: String,

    /// Fabric the stream application is registered under.
    pub fabric: String,

    /// Value sent in the `Macrometa-Origin` header.
    pub origin_name: String,

    /// Stream application name.
    pub app_name: String,

    /// Stream name inside the application.
    pub stream_name: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            c8_url: "https://api-play.paas.macrometa.io".to_string(),
            fabric: "_system".to_string(),
            origin_name: "akamai-edgeworker".to_string(),
            app_name: "sms-auth-events".to_string(),
            stream_name: "sms_auth_stream".to_string(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Inbound request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Downstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Downstream request timeout in seconds.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            connect_secs: 5,
            upstream_secs: 20,
        }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum inbound body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 128 * 1024, // edge non-streaming limit
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Per-request variable sources.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VariablesConfig {
    /// Inbound header carrying `PMUSER_MM_APIKEY`.
    pub api_key_header: String,
}

impl Default for VariablesConfig {
    fn default() -> Self {
        Self {
            api_key_header: "pmuser-mm-apikey".to_string(),
        }
    }
}
