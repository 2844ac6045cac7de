//! Inner handler boundary.
//!
//! The dispatcher knows the inner handler only through [`InnerHandler`]:
//! a canonical request goes in, a canonical response (or an error) comes
//! out. The [`InvocationContext`] is handed through untouched; deadlines
//! are for the handler to enforce.

pub mod router;

use std::future::Future;
use std::sync::Arc;

use tokio::time::Instant;

use crate::http::{CanonicalRequest, CanonicalResponse};

pub use router::RouterHandler;

/// Per-invocation data passed from the caller through to the handler.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    pub request_id: String,
    /// Point in time after which the caller no longer wants an answer.
    pub deadline: Option<Instant>,
}

impl InvocationContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            deadline: None,
        }
    }

    /// A context with a fresh random request id.
    pub fn generate() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Failures inside the inner handler. These are the only errors a dispatch surfaces.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("handler did not finish before the invocation deadline")]
    Timeout,
    #[error("could not build request for the inner router: {0}")]
    Request(#[from] axum::http::Error),
    #[error("could not read inner router response body: {0}")]
    Body(#[from] axum::Error),
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

/// Processes one canonical request.
pub trait InnerHandler: Send + Sync {
    fn handle(
        &self,
        request: CanonicalRequest,
        ctx: &InvocationContext,
    ) -> impl Future<Output = Result<CanonicalResponse, HandlerError>> + Send;
}

impl<H: InnerHandler> InnerHandler for Arc<H> {
    fn handle(
        &self,
        request: CanonicalRequest,
        ctx: &InvocationContext,
    ) -> impl Future<Output = Result<CanonicalResponse, HandlerError>> + Send {
        (**self).handle(request, ctx)
    }
}
