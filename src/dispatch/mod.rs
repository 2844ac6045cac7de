//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! payload bytes + InvocationContext
//!     → routing::ClassifierChain (HTTP-API → Function-URL → REST → Generic)
//!     → first converted envelope, or fallback.rs (synthetic GET to default route)
//!     → InnerHandler (exactly once)
//!     → ResponseShape::render → Sanitize → serde_json
//! ```
//!
//! # Design Decisions
//! - Stateless per call; the only shared state is read-only config
//! - No retries: the chain is one deterministic pass
//! - Only inner handler errors cross the boundary

pub mod dispatcher;
pub mod fallback;

pub use dispatcher::{DispatchError, Dispatcher, Outcome, Route};
