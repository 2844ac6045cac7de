//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Lambda envelope                     Local TCP connection
//!     → envelope converters               → server.rs (Axum setup, layers)
//!     → request.rs (CanonicalRequest)     │
//!     → handler::RouterHandler ──────────►│ app router
//!     → response.rs (CanonicalResponse)   ▼
//!     → envelope converters           Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{parse_query, CanonicalRequest};
pub use response::CanonicalResponse;
pub use server::HttpServer;
