//! Per-request variables supplied by the hosting platform.
//!
//! The edge platform exposes property variables (`PMUSER_*`) to each
//! invocation. Handlers read them through [`RequestVariables`] so the source
//! can be swapped: inbound headers when self-hosted, a map in tests.

use std::collections::HashMap;

use axum::http::HeaderMap;

/// Variable holding the raw stream API key.
pub const API_KEY_VARIABLE: &str = "PMUSER_MM_APIKEY";

/// Lookup of per-request variables by name.
pub trait RequestVariables {
    fn get_variable(&self, name: &str) -> Option<String>;
}

impl RequestVariables for HashMap<String, String> {
    fn get_variable(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Variables carried as inbound request headers.
///
/// Only [`API_KEY_VARIABLE`] is mapped; its header name comes from
/// configuration.
pub struct HeaderVariables<'a> {
    headers: &'a HeaderMap,
    api_key_header: &'a str,
}

impl<'a> HeaderVariables<'a> {
    pub fn new(headers: &'a HeaderMap, api_key_header: &'a str) -> Self {
        Self {
            headers,
            api_key_header,
        }
    }
}

impl RequestVariables for HeaderVariables<'_> {
    fn get_variable(&self, name: &str) -> Option<String> {
        if name != API_KEY_VARIABLE {
            return None;
        }
        self.headers
            .get(self.api_key_header)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}

/// Build the `authorization` value for the stream API: `apikey {key}`.
///
/// A missing variable yields an empty key; the stream API rejects it and
/// that rejection is relayed to the caller.
pub fn authorization_header<V>(variables: &V) -> String
where
    V: RequestVariables + ?Sized,
{
    let key = variables.get_variable(API_KEY_VARIABLE).unwrap_or_else(|| {
        tracing::warn!(variable = API_KEY_VARIABLE, "Request variable not set");
        String::new()
    });
    format!("apikey {key}")
}
