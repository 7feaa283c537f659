//! XML text helpers.

pub mod escape;

pub use escape::{resolve_entity, unescape_xml};
