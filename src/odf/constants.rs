//! ODF constants: MIME types and standard part paths.

use phf::{Map, phf_map};

/// MIME type for OpenDocument Text (.odt)
pub const ODF_TEXT: &str = "application/vnd.oasis.opendocument.text";

/// MIME type for OpenDocument Text Template (.ott)
pub const ODF_TEXT_TEMPLATE: &str = "application/vnd.oasis.opendocument.text-template";

/// MIME type for OpenDocument Master (.odm)
pub const ODF_MASTER: &str = "application/vnd.oasis.opendocument.text-master";

/// MIME type for OpenDocument Web (.oth)
pub const ODF_WEB: &str = "application/vnd.oasis.opendocument.text-web";

/// Standard part holding the document body and automatic styles
pub const CONTENT_XML: &str = "content.xml";

/// Standard part holding common, automatic and master styles
pub const STYLES_XML: &str = "styles.xml";

/// Standard part holding document metadata
pub const META_XML: &str = "meta.xml";

/// Standard part holding the MIME type
pub const MIMETYPE: &str = "mimetype";

/// Directory prefix for embedded pictures
pub const PICTURES_DIR: &str = "Pictures/";

/// MIME types this converter accepts, mapped to a short format label
pub static TEXT_MIME_TYPES: Map<&'static str, &'static str> = phf_map! {
    "application/vnd.oasis.opendocument.text" => "odt",
    "application/vnd.oasis.opendocument.text-template" => "ott",
    "application/vnd.oasis.opendocument.text-master" => "odm",
    "application/vnd.oasis.opendocument.text-web" => "oth",
};

/// Is `mimetype` a text document flavour?
#[inline]
pub fn is_text_mime_type(mimetype: &str) -> bool {
    TEXT_MIME_TYPES.contains_key(mimetype)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_mime_types() {
        assert!(is_text_mime_type(ODF_TEXT));
        assert!(is_text_mime_type(ODF_MASTER));
        assert!(!is_text_mime_type("application/vnd.oasis.opendocument.spreadsheet"));
    }
}
