//! The invocation loop.

use tokio::sync::broadcast;
use tracing::Instrument;

use crate::dispatch::{DispatchError, Dispatcher};
use crate::handler::InnerHandler;
use crate::lambda::client::{ErrorReport, Invocation, RuntimeClient};
use crate::lambda::RuntimeError;
use crate::resilience::Backoff;

const POLL_BACKOFF_BASE_MS: u64 = 100;
const POLL_BACKOFF_MAX_MS: u64 = 5_000;

/// Polls the Runtime API and feeds every event through a [`Dispatcher`].
pub struct LambdaRuntime<H> {
    client: RuntimeClient,
    dispatcher: Dispatcher<H>,
}

impl<H: InnerHandler> LambdaRuntime<H> {
    pub fn new(client: RuntimeClient, dispatcher: Dispatcher<H>) -> Self {
        Self { client, dispatcher }
    }

    /// Serve invocations until shutdown.
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(endpoint = %self.client.endpoint(), "Lambda runtime starting");
        let mut backoff = Backoff::new(POLL_BACKOFF_BASE_MS, POLL_BACKOFF_MAX_MS);

        loop {
            let next = tokio::select! {
                next = self.client.next_invocation() => next,
                _ = shutdown.recv() => break,
            };

            match next {
                Ok(invocation) => {
                    backoff.reset();
                    if let Err(e) = self.process(invocation).await {
                        tracing::error!(error = %e, "Failed to report invocation result");
                    }
                }
                Err(e) => {
                    let delay = backoff.next_delay();
                    tracing::warn!(
                        error = %e,
                        attempt = backoff.attempts(),
                        delay_ms = delay.as_millis() as u64,
                        "Polling the runtime API failed"
                    );
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = shutdown.recv() => break,
                    }
                }
            }
        }

        tracing::info!("Lambda runtime stopped");
    }

    /// Dispatch one event and report its outcome.
    pub async fn process(&self, invocation: Invocation) -> Result<(), RuntimeError> {
        let ctx = invocation.context();
        let span = tracing::info_span!(
            "invocation",
            request_id = %invocation.request_id,
            trace_id = invocation.trace_id.as_deref().unwrap_or("")
        );

        let result = self
            .dispatcher
            .dispatch(&invocation.payload, &ctx)
            .instrument(span)
            .await;

        match result {
            Ok(body) => match self.client.send_response(&invocation.request_id, body).await {
                // Usually an oversized payload; the invocation still needs an answer.
                Err(e) if e.is_rejection() => {
                    tracing::warn!(request_id = %invocation.request_id, error = %e, "Response rejected");
                    let report = ErrorReport::new("ResponseRejected", e.to_string());
                    self.client.send_error(&invocation.request_id, &report).await
                }
                other => other,
            },
            Err(e) => {
                let report = error_report(&e);
                self.client.send_error(&invocation.request_id, &report).await
            }
        }
    }
}

/// What the Runtime API is told about a failed dispatch.
pub fn error_report(error: &DispatchError) -> ErrorReport {
    let error_type = match error {
        DispatchError::Handler { .. } => "HandlerError",
        DispatchError::Encode(_) => "EncodeError",
    };
    ErrorReport::new(error_type, error.to_string())
}
