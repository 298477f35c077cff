//! Configuration validation.
//!
//! Serde handles syntax; this module checks values. Every problem is
//! collected so an operator sees the full list in one pass.

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::PublisherConfig;

/// A single semantic problem in a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid URL '{value}': {reason}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{field}: '{value}' must not contain '/'")]
    PathSegment { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{field}: invalid socket address '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field}: invalid header name '{value}'")]
    InvalidHeader { field: &'static str, value: String },
}

/// Validate a configuration, returning all errors found.
pub fn validate_config(config: &PublisherConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.stream.c8_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::InvalidUrl {
            field: "stream.c8_url",
            value: config.stream.c8_url.clone(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError::InvalidUrl {
            field: "stream.c8_url",
            value: config.stream.c8_url.clone(),
            reason: e.to_string(),
        }),
    }

    for (field, value) in [
        ("stream.fabric", &config.stream.fabric),
        ("stream.app_name", &config.stream.app_name),
        ("stream.stream_name", &config.stream.stream_name),
    ] {
        check_segment(field, value, &mut errors);
    }

    if config.stream.origin_name.trim().is_empty() {
        errors.push(ValidationError::Empty("stream.origin_name"));
    }

    for (field, value) in [
        ("timeouts.request_secs", config.timeouts.request_secs),
        ("timeouts.connect_secs", config.timeouts.connect_secs),
        ("timeouts.upstream_secs", config.timeouts.upstream_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::Zero(field));
        }
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::Zero("security.max_body_size"));
    }

    check_address("listener.bind_address", &config.listener.bind_address, &mut errors);
    if config.observability.metrics_enabled {
        check_address(
            "observability.metrics_address",
            &config.observability.metrics_address,
            &mut errors,
        );
    }

    if axum::http::HeaderName::from_bytes(config.variables.api_key_header.as_bytes()).is_err() {
        errors.push(ValidationError::InvalidHeader {
            field: "variables.api_key_header",
            value: config.variables.api_key_header.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_segment(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.trim().is_empty() {
        errors.push(ValidationError::Empty(field));
    } else if value.contains('/') {
        errors.push(ValidationError::PathSegment {
            field,
            value: value.to_string(),
        });
    }
}

fn check_address(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
