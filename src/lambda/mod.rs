//! Lambda custom runtime.
//!
//! # Data Flow
//! ```text
//! GET  /runtime/invocation/next        → Invocation (payload, request id, deadline)
//!      Dispatcher::dispatch            → response envelope bytes
//! POST /runtime/invocation/{id}/response   on success
//! POST /runtime/invocation/{id}/error      when the dispatch surfaces an error
//! ```

pub mod client;
pub mod runtime;

use axum::http::StatusCode;

pub use client::{ErrorReport, Invocation, RuntimeClient};
pub use runtime::LambdaRuntime;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("AWS_LAMBDA_RUNTIME_API is not set")]
    MissingEndpoint,
    #[error("runtime API response is missing the {0} header")]
    MissingHeader(&'static str),
    #[error("invalid runtime API request: {0}")]
    Request(#[from] axum::http::Error),
    #[error("runtime API unreachable: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),
    #[error("could not read runtime API response: {0}")]
    Body(#[from] axum::Error),
    #[error("could not encode error report: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("runtime API returned {status} for {path}: {body}")]
    Status {
        status: StatusCode,
        path: String,
        body: String,
    },
}

impl RuntimeError {
    /// True when the Runtime API refused the request itself.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            RuntimeError::Status { status, .. }
                if status.is_client_error() && *status != StatusCode::TOO_MANY_REQUESTS
        )
    }
}
