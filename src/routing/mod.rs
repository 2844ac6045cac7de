//! Envelope classification subsystem.
//!
//! # Data Flow
//! ```text
//! Payload bytes
//!     → router.rs (ordered classifier chain)
//!     → matcher.rs (parse candidate shape, probe marker fields)
//!     → Return: typed Envelope or Miss
//! ```
//!
//! # Design Decisions
//! - Chain built once, immutable at runtime
//! - Deterministic: same payload always lands on the same format
//! - First match wins (ordered by precedence)

pub mod matcher;
pub mod router;

pub use matcher::Classifier;
pub use router::ClassifierChain;
