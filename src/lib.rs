//! odf2latex - Convert OpenDocument text documents to LaTeX
//!
//! This library reads ODF text documents (`.odt` packages and flat `.fodt`
//! files) and converts them to LaTeX source, resolving the document's
//! cascading styles (named and automatic styles, inheritance, user style
//! maps) into markup.
//!
//! # Features
//!
//! - **ODF reader**: element tree, style registry and metadata of a document
//! - **Style resolution**: character, paragraph, list and page styles with
//!   configurable formatting levels
//! - **Structure**: headings, lists, tables, sections, footnotes and
//!   endnotes, fields and references, indexes, bibliography and citations
//! - **Drawings**: images, text boxes, formulas and custom shapes (TikZ)
//! - **Artifacts**: the `.tex` file plus extracted images and a `.bib` database
//!
//! # Example - Converting a document
//!
//! ```no_run
//! use odf2latex::OdfDocument;
//! use odf2latex::latex::ToLatex;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let doc = OdfDocument::open("document.odt")?;
//! let latex = doc.to_latex()?;
//! println!("{}", latex);
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Writing every artifact
//!
//! ```no_run
//! use odf2latex::latex::{LatexConfig, LatexConverter};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = LatexConfig::from_yaml_file("odf2latex.yaml")?;
//! let converter = LatexConverter::new(config)?;
//! let result = converter.convert_file("document.odt")?;
//! result.write_all("out")?;
//! # Ok(())
//! # }
//! ```

/// Common types shared across the crate
///
/// Contains the unified error type, length and color values, document
/// metadata and XML helpers.
pub mod common;

/// OpenDocument reader
///
/// Parses the XML parts of an ODF package into an element tree and exposes
/// the style registry.
pub mod odf;

/// LaTeX conversion
pub mod latex;

// Re-export commonly used types for convenience
pub use common::{Error, Result};
pub use latex::{LatexConfig, LatexConverter, ToLatex};
pub use odf::OdfDocument;
