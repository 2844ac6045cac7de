//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! dispatcher, app, runtime
//!     → logging.rs (structured log events, request_id on every line)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → CloudWatch (JSON lines under Lambda)
//!     → Prometheus scrape (local serve mode only)
//! ```

pub mod logging;
pub mod metrics;
