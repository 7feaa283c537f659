//! Public entry point of the LaTeX conversion.

use super::config::LatexConfig;
use super::image::{ImageConverter, default_image_converter};
use super::math::{MathConverter, MathMlConverter};
use super::output::ConverterResult;
use super::palette::ConverterPalette;
use crate::common::Result;
use crate::odf::document::OdfDocument;
use std::path::Path;

/// Converter from ODF text documents to LaTeX.
///
/// A converter holds only configuration and the pluggable math and image
/// converters. Every call to [`convert`](Self::convert) builds a fresh
/// conversion session, so one converter can be reused for many documents.
///
/// # Examples
///
/// ```rust,no_run
/// use odf2latex::latex::{LatexConfig, LatexConverter};
///
/// # fn main() -> Result<(), odf2latex::Error> {
/// let converter = LatexConverter::new(LatexConfig::default())?;
/// let result = converter.convert_file("report.odt")?;
/// result.write_all("out")?;
/// # Ok(())
/// # }
/// ```
pub struct LatexConverter {
    config: LatexConfig,
    math: Box<dyn MathConverter>,
    images: Box<dyn ImageConverter>,
}

impl LatexConverter {
    /// Create a converter; the configuration is validated first.
    pub fn new(config: LatexConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            math: Box::new(MathMlConverter),
            images: default_image_converter(),
        })
    }

    pub fn with_math_converter(mut self, math: Box<dyn MathConverter>) -> Self {
        self.math = math;
        self
    }

    pub fn with_image_converter(mut self, images: Box<dyn ImageConverter>) -> Self {
        self.images = images;
        self
    }

    pub fn config(&self) -> &LatexConfig {
        &self.config
    }

    /// Convert a loaded document. Artifacts are named after `base_name`.
    pub fn convert(&self, doc: &OdfDocument, base_name: &str) -> Result<ConverterResult> {
        log::debug!("Converting '{}'", base_name);
        let palette = ConverterPalette::new(doc, &self.config, self.math.as_ref(), self.images.as_ref(), base_name);
        Ok(palette.convert())
    }

    /// Open and convert a document file. Artifacts are named after the file stem.
    pub fn convert_file<P: AsRef<Path>>(&self, path: P) -> Result<ConverterResult> {
        let path = path.as_ref();
        let doc = OdfDocument::open(path)?;
        let base_name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        self.convert(&doc, &base_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Error;
    use crate::latex::output::LATEX_MIME;

    const CONTENT: &str = r#"<office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0">
<office:body><office:text><text:p>Hello</text:p></office:text></office:body>
</office:document-content>"#;

    #[test]
    fn test_rejects_invalid_config() {
        let config = LatexConfig::default().with_max_depth(0);
        assert!(matches!(LatexConverter::new(config), Err(Error::Config(_))));
    }

    #[test]
    fn test_convert_names_artifacts() {
        let doc = OdfDocument::from_parts(CONTENT, None).unwrap();
        let converter = LatexConverter::new(LatexConfig::default()).unwrap();
        let result = converter.convert(&doc, "hello").unwrap();
        let master = result.master().unwrap();
        assert_eq!(master.name(), "hello.tex");
        assert_eq!(master.mime_type(), LATEX_MIME);
        assert!(master.text().contains("Hello"));
    }

    #[test]
    fn test_converter_is_reusable() {
        let doc = OdfDocument::from_parts(CONTENT, None).unwrap();
        let converter = LatexConverter::new(LatexConfig::default()).unwrap();
        let first = converter.convert(&doc, "a").unwrap().master_text();
        let second = converter.convert(&doc, "a").unwrap().master_text();
        assert_eq!(first, second);
    }

    #[test]
    fn test_convert_missing_file() {
        let converter = LatexConverter::new(LatexConfig::default()).unwrap();
        assert!(matches!(converter.convert_file("/nonexistent/missing.odt"), Err(Error::Io(_))));
    }
}
