//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Local HTTP server settings (`serve` mode).
    pub server: ServerConfig,

    /// Envelope dispatch settings.
    pub gateway: DispatchConfig,

    /// Random string generation settings.
    pub generator: GeneratorConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Local server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Dispatcher configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Route the final fallback sends unrecognized payloads to.
    pub default_route: String,

    /// Content type attached to the synthetic fallback request.
    pub fallback_content_type: String,

    /// Upper bound on a buffered inner-handler response body, in bytes.
    pub max_response_body: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            default_route: "/json".to_string(),
            fallback_content_type: "application/json".to_string(),
            max_response_body: 6 * 1024 * 1024, // Lambda sync payload limit
        }
    }
}

/// Random string generator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Lower bound of the random length used when a length is not requested.
    pub random_min_length: usize,

    /// Upper bound (inclusive) of the random length used when a length is not requested.
    pub random_max_length: usize,

    /// Smallest length a caller may request.
    pub min_length: usize,

    /// Largest length a caller may request.
    pub max_length: usize,

    /// Alphabet for alphanumeric strings.
    pub alphabet: String,

    /// Characters spliced into printable strings.
    pub special_chars: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            random_min_length: 12,
            random_max_length: 30,
            min_length: 1,
            max_length: 99,
            alphabet: "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789".to_string(),
            special_chars: "!#$%*+-=?@^_".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable, for local runs.
    #[default]
    Pretty,
    /// One JSON object per line, for CloudWatch.
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint (local server only).
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: GatewayConfig = toml::from_str("").unwrap();
        assert_eq!(config.gateway.default_route, "/json");
        assert_eq!(config.generator.max_length, 99);
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [gateway]
            default_route = "/"

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.gateway.default_route, "/");
        assert_eq!(config.gateway.fallback_content_type, "application/json");
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.server.bind_address, "0.0.0.0:8080");
    }
}
