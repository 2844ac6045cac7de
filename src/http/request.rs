//! Canonical request model.
//!
//! # Responsibilities
//! - Hold the one request shape every envelope converts into
//! - Build case-insensitive header maps from envelope string maps
//! - Render the request target (path + query) for the inner router
//!
//! # Design Decisions
//! - Headers use `HeaderMap`, so lookups ignore case
//! - Query parameters keep the last value seen for a repeated key
//! - The body is stored decoded; `is_base64_encoded` records the wire form

use std::collections::BTreeMap;

use axum::http::{HeaderMap, HeaderName, HeaderValue, Method};

/// Host used only to give `url` an absolute base when rendering targets.
const TARGET_BASE: &str = "http://lambda.local";

/// The single request representation the inner handler understands.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRequest {
    pub method: Method,
    pub path: String,
    pub query: BTreeMap<String, String>,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    /// Whether the envelope carried the body base64-encoded.
    pub is_base64_encoded: bool,
}

impl CanonicalRequest {
    /// Create a body-less request with no headers or query parameters.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: BTreeMap::new(),
            headers: HeaderMap::new(),
            body: Vec::new(),
            is_base64_encoded: false,
        }
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Query parameters re-encoded as `application/x-www-form-urlencoded`.
    pub fn query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter())
            .finish()
    }

    /// Origin-form request target: percent-encoded path plus query string.
    pub fn target(&self) -> String {
        let Ok(mut url) = url::Url::parse(TARGET_BASE) else {
            return self.path.clone();
        };
        url.set_path(&self.path);
        if !self.query.is_empty() {
            url.set_query(Some(&self.query_string()));
        }
        url[url::Position::BeforePath..].to_string()
    }
}

/// Parse `key=value&...` pairs, keeping the last value for repeated keys.
pub fn parse_query(raw: &str) -> BTreeMap<String, String> {
    url::form_urlencoded::parse(raw.trim_start_matches('?').as_bytes())
        .into_owned()
        .collect()
}

/// Insert `name: value`, replacing any earlier value. Invalid pairs are skipped.
pub(crate) fn insert_header(headers: &mut HeaderMap, name: &str, value: &str) {
    if let Some((name, value)) = header_pair(name, value) {
        headers.insert(name, value);
    }
}

/// Append `name: value` alongside earlier values. Invalid pairs are skipped.
pub(crate) fn append_header(headers: &mut HeaderMap, name: &str, value: &str) {
    if let Some((name, value)) = header_pair(name, value) {
        headers.append(name, value);
    }
}

fn header_pair(name: &str, value: &str) -> Option<(HeaderName, HeaderValue)> {
    let parsed = HeaderName::from_bytes(name.as_bytes())
        .ok()
        .zip(HeaderValue::from_str(value).ok());
    if parsed.is_none() {
        tracing::debug!(header = %name, "Dropping header that is not valid HTTP");
    }
    parsed
}
