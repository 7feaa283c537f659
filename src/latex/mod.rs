//! LaTeX conversion of OpenDocument text documents.
//!
//! The converter walks the document tree depth first. Block content
//! (paragraphs, headings, lists, tables, sections, drawings, indexes) and
//! inline content (spans, fields, notes, marks) are converted against a
//! formatting [`Context`] that is cloned at every nesting boundary, while
//! styles are resolved through the document's style registry and the
//! user's style maps.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use odf2latex::{OdfDocument, latex::ToLatex};
//!
//! # fn main() -> Result<(), odf2latex::Error> {
//! let doc = OdfDocument::open("thesis.odt")?;
//! let latex = doc.to_latex()?;
//! println!("{}", latex);
//! # Ok(())
//! # }
//! ```
//!
//! ## With Custom Options and Artifacts
//!
//! ```rust,no_run
//! use odf2latex::latex::{FormattingLevel, LatexConfig, LatexConverter};
//!
//! # fn main() -> Result<(), odf2latex::Error> {
//! let config = LatexConfig::new()
//!     .with_document_class("book")
//!     .with_formatting(FormattingLevel::ConvertMost);
//! let converter = LatexConverter::new(config)?;
//!
//! // the .tex file, extracted images and the .bib database
//! let result = converter.convert_file("thesis.odt")?;
//! result.write_all("build")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`LatexConverter`] / [`ToLatex`]: public entry points
//! - [`LatexConfig`]: options, loadable from YAML, with [`StyleMaps`]
//! - `palette`: one conversion session holding every cache and queue
//! - `block`, `inline`, `heading`, `list`, `table`, `section`, `draw`,
//!   `field`, `note`, `citation`, `index`: the structural converters
//! - `style`, `i18n`, `unicode`: formatting and character substitution
//! - [`DocumentPortion`]: the output tree with package requirements

// Module declarations
mod bib;
mod block;
mod citation;
mod config;
mod context;
mod converter;
mod draw;
pub mod field;
mod heading;
mod i18n;
mod image;
mod index;
mod inline;
mod list;
mod math;
mod names;
mod note;
mod output;
mod pacman;
mod palette;
mod portion;
mod section;
mod style;
mod style_map;
mod table;
mod traits;
mod unicode;

// Re-export public API
pub use bib::{BibDatabase, BibEntry};
pub use citation::{Citation, parse_jabref, parse_zotero};
pub use config::{
    Backend, ContentPolicy, FormattingLevel, InputEncoding, LatexConfig, NewlineStyle, PageFormatting,
};
pub use context::{Context, ContextFlags};
pub use converter::LatexConverter;
pub use draw::{ShapeEnvironment, ShapePaint, shape_to_tikz};
pub use field::CounterOp;
pub use image::{ImageConverter, ImageFormat, NoImageConverter, default_image_converter};
#[cfg(feature = "imgconv")]
pub use image::RasterImageConverter;
pub use math::{EMPTY_FORMULA, MathConverter, MathMlConverter};
pub use names::ExportNameCollection;
pub use note::NoteClass;
pub use output::{BIBTEX_MIME, ConverterResult, LATEX_MIME, OutputFile};
pub use portion::{DocumentPortion, PackageRequest};
pub use style_map::{BreakAfter, StyleMap, StyleMapEntry, StyleMaps};
pub use traits::ToLatex;
pub use unicode::{Encodings, SubstitutionTable};
