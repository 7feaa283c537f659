//! Configuration types for LaTeX conversion.
//!
//! [`LatexConfig`] is loaded once (from YAML or built in code), validated, and
//! then treated as immutable for the whole conversion.
//!
//! # Examples
//!
//! ```rust
//! use odf2latex::latex::{FormattingLevel, LatexConfig};
//!
//! let config = LatexConfig::new()
//!     .with_document_class("report")
//!     .with_formatting(FormattingLevel::ConvertAll)
//!     .with_wrap_lines_after(0);
//! assert!(config.validate().is_ok());
//! ```

use super::style_map::StyleMaps;
use crate::common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// TeX engine the output targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    #[default]
    Pdftex,
    Xetex,
}

/// Input encoding of the generated source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputEncoding {
    Ascii,
    Latin1,
    #[default]
    Utf8,
}

impl InputEncoding {
    /// Option for `\usepackage[...]{inputenc}`
    pub fn inputenc_option(&self) -> &'static str {
        match self {
            InputEncoding::Ascii => "ascii",
            InputEncoding::Latin1 => "latin1",
            InputEncoding::Utf8 => "utf8",
        }
    }
}

/// How much character and paragraph formatting is converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormattingLevel {
    /// No formatting at all
    IgnoreAll,
    /// Only emphasis-like formatting (bold, italic)
    IgnoreMost,
    /// Font attributes, alignment and color
    #[default]
    ConvertBasic,
    /// Plus named text styles as macro definitions
    ConvertMost,
    /// Plus named paragraph styles as environments and font families
    ConvertAll,
}

/// How much page formatting is converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageFormatting {
    IgnoreAll,
    #[default]
    ConvertGeometry,
    /// Geometry plus headers and footers
    ConvertAll,
}

/// What to do with content that cannot be converted (e.g. an image in an
/// unsupported format).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentPolicy {
    Ignore,
    #[default]
    Warn,
    Error,
}

/// Line terminator used when serializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewlineStyle {
    #[default]
    Lf,
    Crlf,
}

impl NewlineStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            NewlineStyle::Lf => "\n",
            NewlineStyle::Crlf => "\r\n",
        }
    }
}

/// Configuration options for LaTeX conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatexConfig {
    pub document_class: String,
    pub global_options: String,
    pub backend: Backend,
    pub inputencoding: InputEncoding,
    pub formatting: FormattingLevel,
    pub page_formatting: PageFormatting,
    /// Emit nothing for empty paragraphs instead of a vertical space
    pub ignore_empty_paragraphs: bool,
    pub ignore_hard_page_breaks: bool,
    pub ignore_hard_line_breaks: bool,
    pub use_hyperref: bool,
    pub use_ulem: bool,
    pub use_color: bool,
    pub use_multicol: bool,
    pub use_multirow: bool,
    pub use_longtable: bool,
    pub use_endnotes: bool,
    pub use_tikz: bool,
    pub use_lastpage: bool,
    pub use_bibtex: bool,
    pub bibtex_style: String,
    /// Base name of the generated BibTeX database
    pub bibliography_name: String,
    pub zotero_citations: bool,
    pub jabref_citations: bool,
    /// Keep the rendered text of a recognised citation as a comment
    pub include_original_citations: bool,
    /// Sequence names whose captions make a figure
    pub figure_sequence_names: Vec<String>,
    /// Sequence names whose captions make a table
    pub table_sequence_names: Vec<String>,
    /// Display name of the text style that marks inline math
    pub math_span_style: String,
    pub image_policy: ContentPolicy,
    /// Maximum line width of the output (0 disables wrapping)
    pub wrap_lines_after: usize,
    pub newline: NewlineStyle,
    /// Block nesting beyond this depth is flattened to plain text
    pub max_depth: usize,
    /// Sectioning commands by outline level; empty selects the class default
    pub heading_commands: Vec<String>,
    pub style_maps: StyleMaps,
    pub custom_preamble: String,
    /// Emit `\title`, `\author` and `\date` from document metadata
    pub metadata: bool,
}

impl Default for LatexConfig {
    fn default() -> Self {
        Self {
            document_class: "article".to_string(),
            global_options: String::new(),
            backend: Backend::default(),
            inputencoding: InputEncoding::default(),
            formatting: FormattingLevel::default(),
            page_formatting: PageFormatting::default(),
            ignore_empty_paragraphs: false,
            ignore_hard_page_breaks: false,
            ignore_hard_line_breaks: false,
            use_hyperref: true,
            use_ulem: true,
            use_color: true,
            use_multicol: true,
            use_multirow: true,
            use_longtable: false,
            use_endnotes: false,
            use_tikz: false,
            use_lastpage: true,
            use_bibtex: true,
            bibtex_style: "plain".to_string(),
            bibliography_name: "references".to_string(),
            zotero_citations: true,
            jabref_citations: true,
            include_original_citations: false,
            figure_sequence_names: vec![
                "Illustration".to_string(),
                "Figure".to_string(),
                "Drawing".to_string(),
            ],
            table_sequence_names: vec!["Table".to_string()],
            math_span_style: "LaTeX Math".to_string(),
            image_policy: ContentPolicy::default(),
            wrap_lines_after: 72,
            newline: NewlineStyle::default(),
            max_depth: 256,
            heading_commands: Vec::new(),
            style_maps: StyleMaps::default(),
            custom_preamble: String::new(),
            metadata: true,
        }
    }
}

const CLASS_HEADINGS: &[&str] = &["section", "subsection", "subsubsection", "paragraph", "subparagraph"];
const BOOK_HEADINGS: &[&str] = &[
    "chapter",
    "section",
    "subsection",
    "subsubsection",
    "paragraph",
    "subparagraph",
];

impl LatexConfig {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a YAML configuration.
    ///
    /// ```rust
    /// use odf2latex::latex::LatexConfig;
    ///
    /// let config = LatexConfig::from_yaml_str("document_class: book\nwrap_lines_after: 0\n").unwrap();
    /// assert_eq!(config.document_class, "book");
    /// assert_eq!(config.heading_command(1), Some("chapter"));
    /// ```
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: LatexConfig =
            serde_saphyr::from_str(yaml).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML configuration file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let yaml = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&yaml)
    }

    /// Serialize to YAML.
    pub fn to_yaml_string(&self) -> Result<String> {
        serde_saphyr::to_string(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Reject configurations the converter cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.document_class.is_empty()
            || !self
                .document_class
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(Error::Config(format!(
                "invalid document class '{}'",
                self.document_class
            )));
        }
        if self.wrap_lines_after != 0 && self.wrap_lines_after < 20 {
            return Err(Error::Config(format!(
                "wrap_lines_after must be 0 or at least 20, got {}",
                self.wrap_lines_after
            )));
        }
        if self.max_depth == 0 {
            return Err(Error::Config("max_depth must be positive".to_string()));
        }
        if self.bibtex_style.trim().is_empty() || self.bibliography_name.trim().is_empty() {
            return Err(Error::Config("bibliography settings must not be empty".to_string()));
        }
        if self.math_span_style.is_empty() {
            return Err(Error::Config("math_span_style must not be empty".to_string()));
        }
        for command in &self.heading_commands {
            if command.is_empty() || !command.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(Error::Config(format!("invalid heading command '{}'", command)));
            }
        }
        for (family, map) in self.style_maps.families() {
            for (name, entry) in map.iter() {
                if name.is_empty() {
                    return Err(Error::Config(format!("empty style name in {} map", family)));
                }
                if entry.next.iter().any(String::is_empty) {
                    return Err(Error::Config(format!(
                        "empty 'next' style in {} map entry '{}'",
                        family, name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Sectioning command for a 1-based outline level
    pub fn heading_command(&self, level: u8) -> Option<&str> {
        if level == 0 {
            return None;
        }
        let index = level as usize - 1;
        if !self.heading_commands.is_empty() {
            return self.heading_commands.get(index).map(String::as_str);
        }
        let defaults = match self.document_class.as_str() {
            "book" | "report" | "scrbook" | "scrreprt" | "memoir" => BOOK_HEADINGS,
            _ => CLASS_HEADINGS,
        };
        defaults.get(index).copied()
    }

    pub fn is_figure_sequence(&self, name: &str) -> bool {
        self.figure_sequence_names.iter().any(|n| n == name)
    }

    pub fn is_table_sequence(&self, name: &str) -> bool {
        self.table_sequence_names.iter().any(|n| n == name)
    }

    #[inline]
    pub fn with_document_class(mut self, class: &str) -> Self {
        self.document_class = class.to_string();
        self
    }

    #[inline]
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    #[inline]
    pub fn with_inputencoding(mut self, encoding: InputEncoding) -> Self {
        self.inputencoding = encoding;
        self
    }

    #[inline]
    pub fn with_formatting(mut self, formatting: FormattingLevel) -> Self {
        self.formatting = formatting;
        self
    }

    #[inline]
    pub fn with_page_formatting(mut self, page_formatting: PageFormatting) -> Self {
        self.page_formatting = page_formatting;
        self
    }

    #[inline]
    pub fn with_ignore_empty_paragraphs(mut self, ignore: bool) -> Self {
        self.ignore_empty_paragraphs = ignore;
        self
    }

    #[inline]
    pub fn with_tikz(mut self, use_tikz: bool) -> Self {
        self.use_tikz = use_tikz;
        self
    }

    #[inline]
    pub fn with_include_original_citations(mut self, include: bool) -> Self {
        self.include_original_citations = include;
        self
    }

    #[inline]
    pub fn with_image_policy(mut self, policy: ContentPolicy) -> Self {
        self.image_policy = policy;
        self
    }

    #[inline]
    pub fn with_wrap_lines_after(mut self, width: usize) -> Self {
        self.wrap_lines_after = width;
        self
    }

    #[inline]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    #[inline]
    pub fn with_style_maps(mut self, style_maps: StyleMaps) -> Self {
        self.style_maps = style_maps;
        self
    }

    #[inline]
    pub fn with_metadata(mut self, metadata: bool) -> Self {
        self.metadata = metadata;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::latex::style_map::{StyleMap, StyleMapEntry};

    #[test]
    fn test_config_defaults() {
        let config = LatexConfig::default();
        assert_eq!(config.document_class, "article");
        assert_eq!(config.wrap_lines_after, 72);
        assert_eq!(config.max_depth, 256);
        assert_eq!(config.heading_command(1), Some("section"));
        assert_eq!(config.heading_command(6), None);
        assert!(config.is_figure_sequence("Illustration"));
        assert!(config.is_table_sequence("Table"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = LatexConfig::new()
            .with_document_class("book")
            .with_formatting(FormattingLevel::IgnoreMost)
            .with_max_depth(8);
        assert_eq!(config.heading_command(1), Some("chapter"));
        assert!(config.formatting < FormattingLevel::ConvertBasic);
        assert_eq!(config.max_depth, 8);
    }

    #[test]
    fn test_validation_errors() {
        assert!(LatexConfig::new().with_wrap_lines_after(5).validate().is_err());
        assert!(LatexConfig::new().with_document_class("bad class").validate().is_err());
        assert!(LatexConfig::new().with_max_depth(0).validate().is_err());
        let maps = StyleMaps {
            paragraph: StyleMap::new().with("", StyleMapEntry::new("a", "b")),
            ..StyleMaps::default()
        };
        assert!(matches!(
            LatexConfig::new().with_style_maps(maps).validate(),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_yaml_style_maps() {
        let yaml = r#"
formatting: convert_all
style_maps:
  paragraph_block:
    Quotations:
      before: "\\begin{quote}"
      after: "\\end{quote}"
      next: [Quotations]
  text:
    Code:
      before: "\\texttt{"
      after: "}"
      verbatim: true
"#;
        let config = LatexConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.formatting, FormattingLevel::ConvertAll);
        let block = config.style_maps.paragraph_block.get("Quotations").unwrap();
        assert!(block.permits_next("Quotations"));
        assert!(config.style_maps.text.get("Code").unwrap().verbatim);
    }

    #[test]
    fn test_yaml_errors_are_config_errors() {
        assert!(matches!(
            LatexConfig::from_yaml_str("wrap_lines_after: [1, 2]"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            LatexConfig::from_yaml_str("wrap_lines_after: 3"),
            Err(Error::Config(_))
        ));
    }
}
