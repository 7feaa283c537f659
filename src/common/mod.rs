//! Common types and utilities shared by the document reader and the converter.
//!
//! This module provides the unified error type, length and color value types
//! and small XML helpers used across the crate.

// Submodule declarations
pub mod error;
pub mod metadata;
pub mod style;
pub mod xml;

// Re-exports for convenience
pub use error::{Error, Result};
pub use metadata::Metadata;
pub use style::{Length, LengthUnit, RGBColor};
