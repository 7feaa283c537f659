//! OpenDocument text reader.
//!
//! Parses the XML parts of an ODF text package into a read-only element tree
//! and exposes the style lookups the LaTeX converter needs.

pub mod constants;
pub mod document;
pub mod element;
pub mod node;
pub mod package;
pub mod parser;
pub mod style;

pub use document::OdfDocument;
pub use element::{Element, ElementBase, Node};
pub use node::NodeKind;
pub use style::{PropertyGroup, PropertyValue, Style, StyleFamily, StyleRegistry};
