//! Resilience helpers.
//!
//! The Lambda Runtime API is local to the execution environment but can
//! still refuse connections while the sandbox thaws; polling failures are
//! retried with jittered exponential backoff instead of crashing the loop.

pub mod backoff;

pub use backoff::Backoff;
