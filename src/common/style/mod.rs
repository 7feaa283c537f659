//! Common style value types.
//!
//! This module provides the typed values found in ODF style property bags.

// Submodule declarations
pub mod color;
pub mod len;
pub mod text;

// Re-exports
pub use color::RGBColor;
pub use len::{Length, LengthUnit};
pub use text::VerticalPosition;
