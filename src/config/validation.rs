//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (length windows, timeouts > 0, addresses parse)
//! - Make sure the fallback route is dispatchable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderValue;

use crate::config::schema::GatewayConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration, collecting every problem.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "server.bind_address",
            format!("'{}' is not a socket address", config.server.bind_address),
        ));
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::new("server.request_timeout_secs", "must be > 0"));
    }
    if config.server.max_body_size == 0 {
        errors.push(ValidationError::new("server.max_body_size", "must be > 0"));
    }

    if !config.gateway.default_route.starts_with('/') {
        errors.push(ValidationError::new(
            "gateway.default_route",
            "must be an absolute path starting with '/'",
        ));
    }
    if config.gateway.fallback_content_type.trim().is_empty() {
        errors.push(ValidationError::new("gateway.fallback_content_type", "must not be empty"));
    } else if HeaderValue::from_str(&config.gateway.fallback_content_type).is_err() {
        errors.push(ValidationError::new(
            "gateway.fallback_content_type",
            "is not a valid header value",
        ));
    }
    if config.gateway.max_response_body == 0 {
        errors.push(ValidationError::new("gateway.max_response_body", "must be > 0"));
    }

    let generator = &config.generator;
    if generator.min_length == 0 {
        errors.push(ValidationError::new("generator.min_length", "must be >= 1"));
    }
    if generator.min_length > generator.max_length {
        errors.push(ValidationError::new(
            "generator.min_length",
            "must not exceed generator.max_length",
        ));
    }
    if generator.random_min_length > generator.random_max_length {
        errors.push(ValidationError::new(
            "generator.random_min_length",
            "must not exceed generator.random_max_length",
        ));
    }
    if generator.alphabet.is_empty() || !generator.alphabet.is_ascii() {
        errors.push(ValidationError::new(
            "generator.alphabet",
            "must be a non-empty ASCII string",
        ));
    }
    if !generator.special_chars.is_ascii() {
        errors.push(ValidationError::new("generator.special_chars", "must be ASCII"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
