//! Unified error types for the odf2latex crate.
//!
//! Only I/O, package, XML and configuration problems surface as errors.
//! Structural anomalies inside a document are recovered by the converters.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, Result};
