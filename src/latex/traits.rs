//! Core trait for LaTeX conversion.
//!
//! This module defines the `ToLatex` trait that lets a loaded document be
//! converted to LaTeX source in one call.

use super::config::LatexConfig;
use super::converter::LatexConverter;
use crate::common::Result;
use crate::odf::document::OdfDocument;

/// Types that can be converted to LaTeX source.
///
/// Only the main `.tex` text is returned; use [`LatexConverter`] to get the
/// image and bibliography artifacts as well.
///
/// # Examples
///
/// ```rust,no_run
/// use odf2latex::{OdfDocument, latex::ToLatex};
///
/// # fn main() -> Result<(), odf2latex::Error> {
/// let doc = OdfDocument::open("document.odt")?;
/// let latex = doc.to_latex()?;
/// println!("{}", latex);
/// # Ok(())
/// # }
/// ```
pub trait ToLatex {
    /// Convert with the default configuration.
    fn to_latex(&self) -> Result<String> {
        self.to_latex_with_config(&LatexConfig::default())
    }

    /// Convert with a custom configuration.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use odf2latex::{OdfDocument, latex::{LatexConfig, ToLatex}};
    ///
    /// # fn main() -> Result<(), odf2latex::Error> {
    /// let doc = OdfDocument::open("document.odt")?;
    /// let config = LatexConfig::new().with_document_class("book");
    /// let latex = doc.to_latex_with_config(&config)?;
    /// # Ok(())
    /// # }
    /// ```
    fn to_latex_with_config(&self, config: &LatexConfig) -> Result<String>;
}

impl ToLatex for OdfDocument {
    fn to_latex_with_config(&self, config: &LatexConfig) -> Result<String> {
        let converter = LatexConverter::new(config.clone())?;
        Ok(converter.convert(self, "document")?.master_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_latex_wraps_document() {
        let doc = OdfDocument::from_parts(
            r#"<office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0"><office:body><office:text><text:p>Body</text:p></office:text></office:body></office:document-content>"#,
            None,
        )
        .unwrap();
        let latex = doc.to_latex().unwrap();
        assert!(latex.starts_with("\\documentclass"));
        assert!(latex.contains("\\begin{document}"));
        assert!(latex.contains("Body"));
        assert!(latex.trim_end().ends_with("\\end{document}"));
    }
}
