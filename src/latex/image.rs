//! Image format detection and the image conversion contract.
//!
//! pdfTeX and XeTeX include PNG, JPEG and PDF directly. Anything else has to
//! go through an [`ImageConverter`]; with the `imgconv` feature the
//! [`RasterImageConverter`] re-encodes raster formats to PNG using the
//! `image` crate.

/// Image formats found in ODF packages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
    Svg,
    Wmf,
    Emf,
    Pdf,
    Eps,
    Unknown,
}

impl ImageFormat {
    /// Detect the format from the leading bytes of the data.
    pub fn detect(data: &[u8]) -> Self {
        match data {
            [0x89, b'P', b'N', b'G', ..] => ImageFormat::Png,
            [0xFF, 0xD8, 0xFF, ..] => ImageFormat::Jpeg,
            [b'G', b'I', b'F', b'8', ..] => ImageFormat::Gif,
            [b'B', b'M', ..] => ImageFormat::Bmp,
            [b'I', b'I', 0x2A, 0x00, ..] | [b'M', b'M', 0x00, 0x2A, ..] => ImageFormat::Tiff,
            [b'%', b'P', b'D', b'F', ..] => ImageFormat::Pdf,
            [b'%', b'!', b'P', b'S', ..] => ImageFormat::Eps,
            [0xD7, 0xCD, 0xC6, 0x9A, ..] | [0x01, 0x00, 0x09, 0x00, ..] => ImageFormat::Wmf,
            [0x01, 0x00, 0x00, 0x00, ..] if data.len() > 44 && &data[40..44] == b" EMF" => ImageFormat::Emf,
            _ => {
                let head = &data[..data.len().min(256)];
                if memchr::memmem::find(head, b"<svg").is_some() {
                    ImageFormat::Svg
                } else {
                    ImageFormat::Unknown
                }
            },
        }
    }

    /// Format from a file extension (case-insensitive, without dot)
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "png" => ImageFormat::Png,
            "jpg" | "jpeg" => ImageFormat::Jpeg,
            "gif" => ImageFormat::Gif,
            "bmp" => ImageFormat::Bmp,
            "tif" | "tiff" => ImageFormat::Tiff,
            "svg" => ImageFormat::Svg,
            "wmf" => ImageFormat::Wmf,
            "emf" => ImageFormat::Emf,
            "pdf" => ImageFormat::Pdf,
            "eps" | "ps" => ImageFormat::Eps,
            _ => ImageFormat::Unknown,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Gif => "gif",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Tiff => "tif",
            ImageFormat::Svg => "svg",
            ImageFormat::Wmf => "wmf",
            ImageFormat::Emf => "emf",
            ImageFormat::Pdf => "pdf",
            ImageFormat::Eps => "eps",
            ImageFormat::Unknown => "bin",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Tiff => "image/tiff",
            ImageFormat::Svg => "image/svg+xml",
            ImageFormat::Wmf => "image/x-wmf",
            ImageFormat::Emf => "image/x-emf",
            ImageFormat::Pdf => "application/pdf",
            ImageFormat::Eps => "application/postscript",
            ImageFormat::Unknown => "application/octet-stream",
        }
    }

    /// Can `\includegraphics` use this format without conversion?
    pub fn is_latex_native(&self) -> bool {
        matches!(self, ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Pdf)
    }
}

/// Image conversion contract.
///
/// Conversion is a pure function: failure returns `None` and never panics.
pub trait ImageConverter {
    fn supports_conversion(&self, source: ImageFormat, target: ImageFormat) -> bool;

    fn convert(&self, data: &[u8], source: ImageFormat, target: ImageFormat) -> Option<Vec<u8>>;
}

/// Converter that converts nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoImageConverter;

impl ImageConverter for NoImageConverter {
    fn supports_conversion(&self, _source: ImageFormat, _target: ImageFormat) -> bool {
        false
    }

    fn convert(&self, _data: &[u8], _source: ImageFormat, _target: ImageFormat) -> Option<Vec<u8>> {
        None
    }
}

/// Raster re-encoding through the `image` crate
#[cfg(feature = "imgconv")]
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterImageConverter;

#[cfg(feature = "imgconv")]
impl RasterImageConverter {
    fn raster_format(format: ImageFormat) -> Option<image::ImageFormat> {
        match format {
            ImageFormat::Png => Some(image::ImageFormat::Png),
            ImageFormat::Jpeg => Some(image::ImageFormat::Jpeg),
            ImageFormat::Gif => Some(image::ImageFormat::Gif),
            ImageFormat::Bmp => Some(image::ImageFormat::Bmp),
            ImageFormat::Tiff => Some(image::ImageFormat::Tiff),
            _ => None,
        }
    }
}

#[cfg(feature = "imgconv")]
impl ImageConverter for RasterImageConverter {
    fn supports_conversion(&self, source: ImageFormat, target: ImageFormat) -> bool {
        Self::raster_format(source).is_some() && matches!(target, ImageFormat::Png | ImageFormat::Jpeg)
    }

    fn convert(&self, data: &[u8], source: ImageFormat, target: ImageFormat) -> Option<Vec<u8>> {
        if !self.supports_conversion(source, target) {
            return None;
        }
        let img = image::load_from_memory_with_format(data, Self::raster_format(source)?)
            .map_err(|e| log::warn!("Failed to load {:?} image: {}", source, e))
            .ok()?;
        let mut buffer = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buffer, Self::raster_format(target)?)
            .map_err(|e| log::warn!("Failed to encode image: {}", e))
            .ok()?;
        Some(buffer.into_inner())
    }
}

/// The best converter available in this build
pub fn default_image_converter() -> Box<dyn ImageConverter> {
    #[cfg(feature = "imgconv")]
    {
        Box::new(RasterImageConverter)
    }
    #[cfg(not(feature = "imgconv"))]
    {
        Box::new(NoImageConverter)
    }
}
