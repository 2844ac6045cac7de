//! Lambda event gateway for the random string service.
//!
//! Accepts whatever event shape the invoking service produces (HTTP API
//! v2, Function URL, REST API proxy, or loosely shaped JSON), turns it into
//! a canonical HTTP request for the application router and returns the
//! response in the shape the caller expects.

// Core pipeline
pub mod dispatch;
pub mod envelope;
pub mod handler;
pub mod http;
pub mod routing;

// Application
pub mod app;
pub mod generator;

// Hosting
pub mod lambda;
pub mod lifecycle;

// Cross-cutting concerns
pub mod config;
pub mod observability;
pub mod resilience;

pub use config::GatewayConfig;
pub use dispatch::{DispatchError, Dispatcher};
pub use handler::{InnerHandler, InvocationContext, RouterHandler};
pub use http::{CanonicalRequest, CanonicalResponse, HttpServer};
pub use lifecycle::Shutdown;
