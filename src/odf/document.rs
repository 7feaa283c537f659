//! An opened ODF text document: body tree, style registry, metadata and
//! embedded parts.

use super::constants::{CONTENT_XML, META_XML, STYLES_XML};
use super::element::{Element, ElementBase};
use super::node::NodeKind;
use super::package::Package;
use super::parser::parse_xml;
use super::style::StyleRegistry;
use crate::common::{Error, Metadata, Result};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

/// A parsed ODF text document.
///
/// Construct it from a package on disk, from package bytes, or from the raw
/// XML parts (a flat `.fodt` document works as `content_xml` on its own).
#[derive(Debug, Clone)]
pub struct OdfDocument {
    root: Element,
    registry: StyleRegistry,
    metadata: Metadata,
    parts: HashMap<String, Vec<u8>>,
}

impl OdfDocument {
    /// Open a document from a file path (`.odt` package or flat `.fodt`).
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        if bytes.starts_with(b"PK") {
            Self::from_bytes(bytes)
        } else {
            let xml = String::from_utf8(bytes)
                .map_err(|_| Error::InvalidFormat("Document is not UTF-8 XML".to_string()))?;
            Self::from_parts(&xml, None)
        }
    }

    /// Load a document from the bytes of an ODF package.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let package = Package::from_reader(Cursor::new(bytes))?;
        let content = package.read(CONTENT_XML)?;
        let styles = package.read_optional(STYLES_XML)?;
        let meta = package.read_optional(META_XML)?;

        let mut parts = HashMap::new();
        for name in package.entry_names() {
            if matches!(name.as_str(), CONTENT_XML | STYLES_XML | META_XML | "settings.xml" | "mimetype")
                || name.starts_with("META-INF/")
            {
                continue;
            }
            let data = package.read(&name)?;
            parts.insert(name, data);
        }

        let mut document = Self::from_xml(&content, styles.as_deref(), meta.as_deref())?;
        document.parts = parts;
        Ok(document)
    }

    /// Build a document from XML parts.
    pub fn from_parts(content_xml: &str, styles_xml: Option<&str>) -> Result<Self> {
        Self::from_xml(content_xml.as_bytes(), styles_xml.map(str::as_bytes), None)
    }

    fn from_xml(content: &[u8], styles: Option<&[u8]>, meta: Option<&[u8]>) -> Result<Self> {
        let root = parse_xml(content)?;
        let mut registry = StyleRegistry::new();
        // content.xml wins over styles.xml for automatic style names
        if let Some(styles) = styles {
            registry.load_part(&parse_xml(styles)?);
        }
        registry.load_part(&root);

        let metadata = match meta {
            Some(meta) => read_metadata(&parse_xml(meta)?),
            None => read_metadata(&root),
        };

        Ok(Self {
            root,
            registry,
            metadata,
            parts: HashMap::new(),
        })
    }

    /// Builder: attach an embedded part (picture or object file)
    pub fn with_part(mut self, path: &str, data: Vec<u8>) -> Self {
        self.parts.insert(path.to_string(), data);
        self
    }

    /// Builder: replace the metadata
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Root element of the content part
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// The `office:text` element holding the document body
    pub fn body(&self) -> Option<&Element> {
        if self.root.kind() == NodeKind::OfficeText {
            return Some(&self.root);
        }
        self.root
            .first_child(NodeKind::Body)
            .and_then(|b| b.first_child(NodeKind::OfficeText))
    }

    pub fn registry(&self) -> &StyleRegistry {
        &self.registry
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Embedded part by package path (`Pictures/x.png` or `./Pictures/x.png`)
    pub fn part(&self, path: &str) -> Option<&[u8]> {
        self.parts.get(normalize_href(path)).map(Vec::as_slice)
    }

    /// Parse the content of an embedded object (`Object 1`).
    ///
    /// Objects are parsed on demand; the document keeps only the raw bytes.
    pub fn object(&self, href: &str) -> Option<Element> {
        let base = normalize_href(href).trim_end_matches('/');
        let data = self.parts.get(&format!("{}/{}", base, CONTENT_XML))?;
        match parse_xml(data) {
            Ok(root) => Some(root),
            Err(e) => {
                log::warn!("Embedded object '{}' is not well-formed: {}", base, e);
                None
            },
        }
    }

    /// Remove an embedded part, returning its bytes
    pub fn take_part(&mut self, path: &str) -> Option<Vec<u8>> {
        self.parts.remove(normalize_href(path))
    }
}

fn normalize_href(href: &str) -> &str {
    href.trim_start_matches("./")
}

/// Read Dublin Core metadata from a `meta.xml` root or a flat document.
fn read_metadata(root: &Element) -> Metadata {
    let mut metadata = Metadata::default();
    let Some(meta) = root.first_child(NodeKind::OfficeMeta) else {
        return metadata;
    };
    let mut keywords: Vec<String> = Vec::new();
    for field in meta.child_elements() {
        let value = field.text_content().trim().to_string();
        if value.is_empty() {
            continue;
        }
        match field.tag_name() {
            "dc:title" => metadata.title = Some(value),
            "dc:subject" => metadata.subject = Some(value),
            "dc:creator" => metadata.author = Some(value),
            "meta:initial-creator" => {
                if metadata.author.is_none() {
                    metadata.author = Some(value);
                }
            },
            "meta:keyword" => keywords.push(value),
            "dc:description" => metadata.description = Some(value),
            "dc:date" => metadata.date = Some(value),
            "dc:language" => metadata.language = Some(value),
            _ => {},
        }
    }
    if !keywords.is_empty() {
        metadata.keywords = Some(keywords.join(", "));
    }
    metadata
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::odf::style::StyleFamily;

    const FLAT: &str = r#"<office:document office:mimetype="application/vnd.oasis.opendocument.text">
<office:meta><dc:title>Report</dc:title><meta:initial-creator>Ada</meta:initial-creator><meta:keyword>a</meta:keyword><meta:keyword>b</meta:keyword></office:meta>
<office:styles><style:style style:name="Standard" style:family="paragraph"/></office:styles>
<office:body><office:text><text:p text:style-name="Standard">Hello</text:p></office:text></office:body>
</office:document>"#;

    #[test]
    fn test_flat_document() {
        let doc = OdfDocument::from_parts(FLAT, None).unwrap();
        assert_eq!(doc.body().unwrap().child_elements().count(), 1);
        assert_eq!(doc.metadata().title.as_deref(), Some("Report"));
        assert_eq!(doc.metadata().author.as_deref(), Some("Ada"));
        assert_eq!(doc.metadata().keywords.as_deref(), Some("a, b"));
        assert!(doc.registry().get_style("Standard", StyleFamily::Paragraph).is_some());
    }

    #[test]
    fn test_parts_and_objects() {
        let doc = OdfDocument::from_parts(FLAT, None)
            .unwrap()
            .with_part("Pictures/a.png", vec![1, 2, 3])
            .with_part("Object 1/content.xml", b"<math:math><math:mi>x</math:mi></math:math>".to_vec());
        assert_eq!(doc.part("./Pictures/a.png"), Some(&[1u8, 2, 3][..]));
        assert_eq!(doc.object("./Object 1").unwrap().kind(), NodeKind::Math);
        assert!(doc.object("Object 2").is_none());
    }

    #[test]
    fn test_not_a_package() {
        assert!(OdfDocument::from_bytes(b"PK\x03\x04garbage".to_vec()).is_err());
    }
}
