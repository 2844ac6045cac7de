//! Axum router adapter.
//!
//! # Responsibilities
//! - Turn a canonical request into an `http::Request` and drive the router
//! - Buffer the response body and decide whether it travels as text or base64
//! - Enforce the invocation deadline, if any
//!
//! # Design Decisions
//! - The router is built once at startup and cloned per call (cheap, Arc inside)
//! - The invocation context rides along as a request extension

use std::future::Future;

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Request},
    Router,
};
use base64::Engine as _;
use tower::ServiceExt;

use crate::handler::{HandlerError, InnerHandler, InvocationContext};
use crate::http::{CanonicalRequest, CanonicalResponse};

/// Serves canonical requests with an axum [`Router`].
#[derive(Debug, Clone)]
pub struct RouterHandler {
    router: Router,
    max_body: usize,
}

impl RouterHandler {
    pub fn new(router: Router, max_body: usize) -> Self {
        Self { router, max_body }
    }

    async fn call(
        &self,
        request: CanonicalRequest,
        ctx: InvocationContext,
    ) -> Result<CanonicalResponse, HandlerError> {
        let mut builder = Request::builder()
            .method(request.method.clone())
            .uri(request.target())
            .extension(ctx);
        if let Some(headers) = builder.headers_mut() {
            *headers = request.headers;
        }
        let http_request = builder.body(Body::from(request.body))?;

        let response = self
            .router
            .clone()
            .oneshot(http_request)
            .await
            .unwrap_or_else(|never| match never {});

        let (parts, body) = response.into_parts();
        let bytes = axum::body::to_bytes(body, self.max_body).await?;
        let content_type = parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        let (body, is_base64_encoded) = encode_body(content_type, bytes.to_vec());

        Ok(CanonicalResponse {
            status: parts.status,
            headers: parts.headers,
            body,
            is_base64_encoded,
        })
    }
}

impl InnerHandler for RouterHandler {
    fn handle(
        &self,
        request: CanonicalRequest,
        ctx: &InvocationContext,
    ) -> impl Future<Output = Result<CanonicalResponse, HandlerError>> + Send {
        let ctx = ctx.clone();
        async move {
            match ctx.deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, self.call(request, ctx))
                    .await
                    .map_err(|_| HandlerError::Timeout)?,
                None => self.call(request, ctx).await,
            }
        }
    }
}

fn is_binary_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/octet-stream"
        || essence == "application/zip"
        || essence == "application/pdf"
        || ["image/", "audio/", "video/", "font/"]
            .iter()
            .any(|prefix| essence.starts_with(prefix) && essence != "image/svg+xml")
}

/// Text bodies pass through; binary or non-UTF-8 bodies are base64-encoded.
fn encode_body(content_type: &str, bytes: Vec<u8>) -> (String, bool) {
    if !is_binary_content_type(content_type) {
        if let Ok(text) = String::from_utf8(bytes.clone()) {
            return (text, false);
        }
    }
    (base64::engine::general_purpose::STANDARD.encode(bytes), true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::Extension,
        http::{HeaderMap, Method, StatusCode},
        routing::{get, post},
    };
    use std::time::Duration;

    fn router() -> Router {
        Router::new()
            .route(
                "/echo",
                post(|headers: HeaderMap, body: String| async move {
                    let ua = headers
                        .get("user-agent")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("none")
                        .to_string();
                    ([("x-seen-ua", ua)], body)
                }),
            )
            .route(
                "/binary",
                get(|| async { ([(CONTENT_TYPE, "image/png")], vec![0x89u8, 0x50, 0x4e, 0x47]) }),
            )
            .route(
                "/ctx",
                get(|Extension(ctx): Extension<InvocationContext>| async move { ctx.request_id }),
            )
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "late"
                }),
            )
    }

    #[tokio::test]
    async fn test_round_trip_through_router() {
        let handler = RouterHandler::new(router(), 1024);
        let mut request = CanonicalRequest::new(Method::POST, "/echo");
        request.headers.insert("user-agent", "curl/8.0".parse().unwrap());
        request.body = b"hello".to_vec();

        let response = handler
            .handle(request, &InvocationContext::new("r1"))
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, "hello");
        assert!(!response.is_base64_encoded);
        assert_eq!(response.headers["x-seen-ua"], "curl/8.0");
    }

    #[tokio::test]
    async fn test_binary_body_is_base64() {
        let handler = RouterHandler::new(router(), 1024);
        let response = handler
            .handle(
                CanonicalRequest::new(Method::GET, "/binary"),
                &InvocationContext::new("r2"),
            )
            .await
            .unwrap();
        assert!(response.is_base64_encoded);
        assert_eq!(response.body, "iVBORw==");
    }

    #[tokio::test]
    async fn test_context_reaches_router() {
        let handler = RouterHandler::new(router(), 1024);
        let response = handler
            .handle(
                CanonicalRequest::new(Method::GET, "/ctx"),
                &InvocationContext::new("req-42"),
            )
            .await
            .unwrap();
        assert_eq!(response.body, "req-42");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404_not_error() {
        let handler = RouterHandler::new(router(), 1024);
        let response = handler
            .handle(
                CanonicalRequest::new(Method::GET, "/nope"),
                &InvocationContext::new("r3"),
            )
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_is_enforced() {
        let handler = RouterHandler::new(router(), 1024);
        let ctx = InvocationContext::new("r4")
            .with_deadline(tokio::time::Instant::now() + Duration::from_millis(100));
        let err = handler
            .handle(CanonicalRequest::new(Method::GET, "/slow"), &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, HandlerError::Timeout));
    }

    #[test]
    fn test_encode_body_text_and_binary() {
        assert_eq!(
            encode_body("application/json", b"{}".to_vec()),
            ("{}".to_string(), false)
        );
        assert_eq!(
            encode_body("text/plain", vec![0xff, 0xfe]),
            ("//4=".to_string(), true)
        );
        assert!(encode_body("application/octet-stream", b"abc".to_vec()).1);
        assert!(!encode_body("image/svg+xml", b"<svg/>".to_vec()).1);
    }
}
