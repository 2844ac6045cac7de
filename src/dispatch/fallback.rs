//! Final fallback for payloads no classifier accepts.
//!
//! The raw payload becomes the body of a synthetic `GET` to the configured
//! default route, answered in the REST-proxy shape. Non-UTF-8 bytes are
//! replaced lossily: this is a deliberate leniency for console and test
//! invocations, not validation.
//!
//! Building the request cannot fail, whatever the configuration says.

use axum::http::{header::CONTENT_TYPE, HeaderValue, Method};

use crate::config::DispatchConfig;
use crate::http::CanonicalRequest;

pub const FALLBACK_METHOD: Method = Method::GET;
pub const FALLBACK_CONTENT_TYPE: &str = "application/json";

/// Build the synthetic request that carries an unrecognized payload.
pub fn synthesize(payload: &[u8], config: &DispatchConfig) -> CanonicalRequest {
    let mut request = CanonicalRequest::new(FALLBACK_METHOD, route(&config.default_route));
    request.headers.insert(CONTENT_TYPE, content_type(&config.fallback_content_type));
    request.body = String::from_utf8_lossy(payload).into_owned().into_bytes();
    request
}

/// The default route as an absolute path.
fn route(configured: &str) -> String {
    let trimmed = configured.trim();
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

fn content_type(configured: &str) -> HeaderValue {
    match HeaderValue::from_str(configured.trim()) {
        Ok(value) if !value.is_empty() => value,
        _ => {
            tracing::warn!(
                configured = %configured.escape_debug(),
                "Unusable fallback content type; sending {FALLBACK_CONTENT_TYPE}"
            );
            HeaderValue::from_static(FALLBACK_CONTENT_TYPE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_becomes_body() {
        let request = synthesize(br#"{"foo":"bar"}"#, &DispatchConfig::default());
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.path, "/json");
        assert_eq!(request.body, br#"{"foo":"bar"}"#);
        assert_eq!(request.header("Content-Type"), Some("application/json"));
        assert!(!request.is_base64_encoded);
    }

    #[test]
    fn test_non_utf8_payload_is_lossy() {
        let request = synthesize(&[b'o', b'k', 0xff], &DispatchConfig::default());
        assert_eq!(request.body, "ok\u{fffd}".as_bytes());
    }

    #[test]
    fn test_route_is_made_absolute() {
        assert_eq!(route(""), "/");
        assert_eq!(route("json"), "/json");
        assert_eq!(route(" /strings "), "/strings");
    }

    #[test]
    fn test_bad_content_type_is_replaced() {
        let mut config = DispatchConfig::default();
        for configured in ["application/json\n", "", "   "] {
            config.fallback_content_type = configured.into();
            let request = synthesize(b"x", &config);
            assert_eq!(request.header("content-type"), Some(FALLBACK_CONTENT_TYPE));
        }

        config.fallback_content_type = "text/plain; charset=utf-8".into();
        let request = synthesize(b"x", &config);
        assert_eq!(request.header("content-type"), Some("text/plain; charset=utf-8"));
    }
}
