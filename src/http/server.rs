//! Local HTTP server setup.
//!
//! # Responsibilities
//! - Wrap the application router with middleware (tracing, request ID, limits)
//! - Bind to a listener and serve until shutdown
//!
//! Under Lambda the same application router is driven by the dispatcher
//! instead; this server is for running outside AWS.

use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::app;
use crate::config::GatewayConfig;
use crate::generator::Generator;

/// HTTP server for local runs.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Self {
        let router = Self::build_router(&config, app::router(Generator::new(&config.generator)));
        Self { router }
    }

    /// Wrap the application with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, app: Router) -> Router {
        app.layer(RequestBodyLimitLayer::new(config.server.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.server.request_timeout_secs,
            )))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
