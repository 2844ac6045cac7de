//! Canonical response model.
//!
//! # Responsibilities
//! - Hold the one response shape the inner handler produces
//! - Flatten headers into the singular and multi-value maps envelopes carry
//!
//! # Design Decisions
//! - Header names come out lowercase, as `HeaderMap` stores them
//! - Non-UTF-8 header values are decoded lossily rather than dropped

use std::collections::HashMap;

use axum::http::{HeaderMap, StatusCode};

/// The single response representation the inner handler returns.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
    /// Set when `body` holds base64 of binary content.
    pub is_base64_encoded: bool,
}

impl CanonicalResponse {
    /// A text response with no headers.
    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
            is_base64_encoded: false,
        }
    }

    /// Every header with all of its values, in insertion order.
    pub fn multi_value_headers(&self) -> HashMap<String, Vec<String>> {
        let mut out: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in &self.headers {
            out.entry(name.as_str().to_string())
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }
        out
    }

    /// Every header with its values joined by `", "`, skipping `exclude`.
    pub fn joined_headers(&self, exclude: &[&str]) -> HashMap<String, String> {
        self.multi_value_headers()
            .into_iter()
            .filter(|(name, _)| !exclude.iter().any(|e| e.eq_ignore_ascii_case(name)))
            .map(|(name, values)| (name, values.join(", ")))
            .collect()
    }

    /// All values of one header.
    pub fn header_values(&self, name: &str) -> Vec<String> {
        self.headers
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect()
    }
}
