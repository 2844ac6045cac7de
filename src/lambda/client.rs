//! Runtime API client.
//!
//! Speaks the three calls a custom runtime needs: fetch the next event,
//! post its result, or post an error. Plain HTTP/1.1 to the endpoint named
//! by `AWS_LAMBDA_RUNTIME_API`.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::body::{Body, Bytes};
use axum::http::{header::CONTENT_TYPE, HeaderMap, Method, Request};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use serde::Serialize;
use tokio::time::Instant;

use crate::handler::InvocationContext;
use crate::lambda::RuntimeError;

pub const RUNTIME_API_VERSION: &str = "2018-06-01";
pub const RUNTIME_API_ENV: &str = "AWS_LAMBDA_RUNTIME_API";

pub const REQUEST_ID_HEADER: &str = "lambda-runtime-aws-request-id";
pub const DEADLINE_HEADER: &str = "lambda-runtime-deadline-ms";
pub const TRACE_ID_HEADER: &str = "lambda-runtime-trace-id";
const ERROR_TYPE_HEADER: &str = "lambda-runtime-function-error-type";

/// Event payloads are capped at 6 MB synchronous, 256 KB async.
const MAX_EVENT_SIZE: usize = 6 * 1024 * 1024;

/// One event handed out by the Runtime API.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub request_id: String,
    pub deadline: Option<Instant>,
    pub trace_id: Option<String>,
    pub payload: Bytes,
}

impl Invocation {
    fn from_parts(headers: &HeaderMap, payload: Bytes) -> Result<Self, RuntimeError> {
        let request_id = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .ok_or(RuntimeError::MissingHeader(REQUEST_ID_HEADER))?
            .to_string();

        let deadline = headers
            .get(DEADLINE_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .map(deadline_from_epoch_ms);

        let trace_id = headers
            .get(TRACE_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Ok(Self {
            request_id,
            deadline,
            trace_id,
            payload,
        })
    }

    pub fn context(&self) -> InvocationContext {
        let ctx = InvocationContext::new(self.request_id.clone());
        match self.deadline {
            Some(deadline) => ctx.with_deadline(deadline),
            None => ctx,
        }
    }
}

/// Convert a wall-clock deadline into a monotonic one.
fn deadline_from_epoch_ms(deadline_ms: u64) -> Instant {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    Instant::now() + Duration::from_millis(deadline_ms.saturating_sub(now_ms))
}

/// Body of `/invocation/{id}/error` and `/init/error`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub error_message: String,
    pub error_type: String,
}

impl ErrorReport {
    pub fn new(error_type: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            error_message: error_message.into(),
            error_type: error_type.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeClient {
    client: Client<HttpConnector, Body>,
    endpoint: String,
}

impl RuntimeClient {
    /// `endpoint` is `host:port`, as found in `AWS_LAMBDA_RUNTIME_API`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn from_env() -> Result<Self, RuntimeError> {
        let endpoint = std::env::var(RUNTIME_API_ENV)
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or(RuntimeError::MissingEndpoint)?;
        Ok(Self::new(endpoint))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}/{}/runtime/{}", self.endpoint, RUNTIME_API_VERSION, path)
    }

    /// Long-poll for the next event.
    pub async fn next_invocation(&self) -> Result<Invocation, RuntimeError> {
        let path = "invocation/next";
        let request = Request::builder()
            .method(Method::GET)
            .uri(self.url(path))
            .body(Body::empty())?;

        let (headers, body) = self.send(path, request).await?;
        Invocation::from_parts(&headers, body)
    }

    pub async fn send_response(&self, request_id: &str, body: Vec<u8>) -> Result<(), RuntimeError> {
        let path = format!("invocation/{request_id}/response");
        let request = Request::builder()
            .method(Method::POST)
            .uri(self.url(&path))
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body))?;

        self.send(&path, request).await?;
        Ok(())
    }

    pub async fn send_error(&self, request_id: &str, report: &ErrorReport) -> Result<(), RuntimeError> {
        let path = format!("invocation/{request_id}/error");
        self.post_error(&path, report).await
    }

    /// Report a failure that happened before the first poll.
    pub async fn send_init_error(&self, report: &ErrorReport) -> Result<(), RuntimeError> {
        self.post_error("init/error", report).await
    }

    async fn post_error(&self, path: &str, report: &ErrorReport) -> Result<(), RuntimeError> {
        let request = Request::builder()
            .method(Method::POST)
            .uri(self.url(path))
            .header(CONTENT_TYPE, "application/json")
            .header(ERROR_TYPE_HEADER, report.error_type.as_str())
            .body(Body::from(serde_json::to_vec(report)?))?;

        self.send(path, request).await?;
        Ok(())
    }

    async fn send(&self, path: &str, request: Request<Body>) -> Result<(HeaderMap, Bytes), RuntimeError> {
        let response: axum::http::Response<hyper::body::Incoming> =
            self.client.request(request).await?;
        let (parts, body) = response.into_parts();
        let body = axum::body::to_bytes(Body::new(body), MAX_EVENT_SIZE).await?;

        if !parts.status.is_success() {
            return Err(RuntimeError::Status {
                status: parts.status,
                path: path.to_string(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        Ok((parts.headers, body))
    }
}
