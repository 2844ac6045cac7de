//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     broadcast → local server stops accepting / runtime loop stops polling
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
