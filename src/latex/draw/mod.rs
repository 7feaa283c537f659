//! Frames and drawings.
//!
//! A `draw:frame` offers one or more representations of its content (an
//! embedded formula object, an image, a replacement image, a text box);
//! the first one that converts wins. Images are written as separate output
//! artifacts and included with `\includegraphics`.

mod shape;

pub use shape::{ShapeEnvironment, ShapePaint, shape_to_tikz};

use super::config::ContentPolicy;
use super::context::Context;
use super::image::ImageFormat;
use super::math::{EMPTY_FORMULA, find_formula};
use super::output::OutputFile;
use super::palette::ConverterPalette;
use super::portion::DocumentPortion;
use super::style::color_expression;
use crate::common::Length;
use crate::odf::element::{Element, ElementBase};
use crate::odf::node::NodeKind;
use crate::odf::style::{PropertyGroup, PropertyValue, StyleFamily};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Image artifacts of one conversion
#[derive(Debug, Default)]
pub struct DrawState {
    counter: usize,
    outputs: Vec<OutputFile>,
}

impl DrawState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_outputs(&mut self) -> Vec<OutputFile> {
        std::mem::take(&mut self.outputs)
    }
}

/// Decode `office:binary-data` content.
pub fn decode_binary_data(text: &str) -> Option<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| log::warn!("Malformed embedded image data: {}", e))
        .ok()
}

fn length_attribute(node: &Element, name: &str) -> Option<Length> {
    node.get_attribute(name).and_then(Length::parse)
}

impl<'a> ConverterPalette<'a> {
    /// Formula held by a frame, converted to math-mode markup.
    ///
    /// Returns `None` if the frame holds no formula; an empty formula yields
    /// [`EMPTY_FORMULA`].
    pub(crate) fn frame_formula(&self, frame: &Element) -> Option<String> {
        let object = frame.first_child(NodeKind::Object)?;
        if let Some(math) = object.first_child(NodeKind::Math) {
            return Some(self.math.convert(math));
        }
        let href = object.get_attribute("xlink:href")?;
        let root = self.doc.object(href)?;
        let formula = find_formula(&root)?;
        Some(self.math.convert(formula))
    }

    /// `draw:frame`
    pub(crate) fn handle_frame(&mut self, node: &'a Element, out: &mut DocumentPortion, ctx: &Context) {
        if let Some(formula) = self.frame_formula(node) {
            if formula != EMPTY_FORMULA {
                out.require_package("amsmath");
                if ctx.math_mode() {
                    out.append(&formula);
                } else {
                    out.append(&format!("${}$", formula));
                }
            }
            return;
        }
        for child in node.child_elements() {
            let done = match child.kind() {
                NodeKind::Image => self.handle_image(node, child, out),
                NodeKind::TextBox => {
                    self.handle_text_box(node, child, out, ctx);
                    true
                },
                // objects other than formulas are shown by their replacement image
                NodeKind::Object | NodeKind::ObjectOle => false,
                NodeKind::SvgTitle | NodeKind::SvgDesc => false,
                _ => {
                    log::debug!("Skipping '{}' in frame", child.tag_name());
                    false
                },
            };
            if done {
                return;
            }
        }
        self.content_omitted("Image", out);
    }

    /// Write the placeholder for content the image policy rejects.
    fn content_omitted(&mut self, what: &str, out: &mut DocumentPortion) {
        match self.config.image_policy {
            ContentPolicy::Ignore => {},
            ContentPolicy::Warn => {
                log::warn!("{} omitted", what);
                out.ensure_newline();
                out.append(&format!("% {} omitted", what)).newline();
            },
            ContentPolicy::Error => {
                log::error!("{} omitted", what);
                out.append(&format!("\\fbox{{{} omitted}}", what));
            },
        }
    }

    /// `draw:image`; false if the image cannot be used.
    fn handle_image(&mut self, frame: &Element, image: &Element, out: &mut DocumentPortion) -> bool {
        let data = match image.get_attribute("xlink:href") {
            Some(href) if !href.is_empty() => match self.doc.part(href) {
                Some(data) => data.to_vec(),
                None => {
                    log::debug!("Linked image '{}' is not embedded", href);
                    return false;
                },
            },
            _ => match image.first_child(NodeKind::BinaryData) {
                Some(binary) => match decode_binary_data(&binary.text_content()) {
                    Some(data) => data,
                    None => return false,
                },
                None => return false,
            },
        };

        let source = ImageFormat::detect(&data);
        let (data, format) = if source.is_latex_native() {
            (data, source)
        } else if self.images.supports_conversion(source, ImageFormat::Png) {
            match self.images.convert(&data, source, ImageFormat::Png) {
                Some(converted) => (converted, ImageFormat::Png),
                None => return false,
            }
        } else {
            log::debug!("No conversion for {:?} image", source);
            return false;
        };

        self.draw.counter += 1;
        let name = format!("{}-img{}.{}", self.base_name, self.draw.counter, format.extension());
        self.draw
            .outputs
            .push(OutputFile::new(&name, format.mime_type(), data));

        let mut options = Vec::new();
        if let Some(width) = length_attribute(frame, "svg:width") {
            options.push(format!("width={}", width.to_latex()));
        }
        if let Some(height) = length_attribute(frame, "svg:height") {
            options.push(format!("height={}", height.to_latex()));
        }
        let options = if options.is_empty() {
            String::new()
        } else {
            format!("[{}]", options.join(","))
        };
        out.append(&format!("\\includegraphics{}{{{}}}", options, name))
            .require_package("graphicx");
        true
    }

    /// `draw:text-box`: a figure float when it holds a figure caption,
    /// otherwise a minipage.
    fn handle_text_box(&mut self, frame: &Element, text_box: &'a Element, out: &mut DocumentPortion, ctx: &Context) {
        let config = self.config;
        let has_caption = text_box
            .find_descendant(|e| {
                e.kind() == NodeKind::Sequence
                    && e.get_attribute("text:name")
                        .is_some_and(|n| config.is_figure_sequence(n))
            })
            .is_some();
        let inner = ctx.deeper().with_in_frame(true);
        if has_caption && ctx.floats_allowed() {
            out.ensure_newline();
            out.append("\\begin{figure}[htbp]").newline();
            out.append("\\centering").newline();
            self.traverse_block_nodes(text_box.children(), out, &inner.with_in_float(true));
            out.ensure_newline();
            out.append("\\end{figure}");
            out.ensure_blank_line();
            return;
        }
        let width = length_attribute(frame, "svg:width")
            .map(|w| w.to_latex())
            .unwrap_or_else(|| "\\linewidth".to_string());
        out.append(&format!("\\begin{{minipage}}{{{}}}", width)).newline();
        self.traverse_block_nodes(text_box.children(), out, &inner);
        out.ensure_newline();
        out.append("\\end{minipage}");
    }

    /// `draw:custom-shape`
    pub(crate) fn handle_custom_shape(&mut self, node: &'a Element, out: &mut DocumentPortion, ctx: &Context) {
        if self.config.use_tikz
            && let Some(tikz) = self.shape_picture(node)
        {
            out.ensure_newline();
            for line in tikz.lines() {
                out.append(line).newline();
            }
            out.require_package("tikz");
            return;
        }
        // the shape's own text is all that survives without TikZ
        let paragraphs: Vec<&'a Element> = node
            .child_elements()
            .filter(|e| matches!(e.kind(), NodeKind::Paragraph | NodeKind::List))
            .collect();
        for paragraph in paragraphs {
            if paragraph.kind() == NodeKind::Paragraph {
                self.traverse_inline_nodes(paragraph.children(), out, ctx);
                out.append(" ");
            } else {
                self.handle_list(paragraph, out, ctx);
            }
        }
    }

    fn shape_picture(&self, node: &Element) -> Option<String> {
        let geometry = node.first_child(NodeKind::EnhancedGeometry)?;
        let width = length_attribute(node, "svg:width")?;
        let height = length_attribute(node, "svg:height")?;
        let registry = self.registry;
        let property = |id: &str| {
            node.get_attribute("draw:style-name").and_then(|name| {
                registry.resolve_property(name, StyleFamily::Graphic, PropertyGroup::Graphic, id, true)
            })
        };
        let fill = match property("draw:fill").and_then(PropertyValue::as_str) {
            Some("none") => None,
            _ => Some(
                property("draw:fill-color")
                    .and_then(PropertyValue::as_color)
                    .map(color_expression)
                    .unwrap_or_else(|| "gray".to_string()),
            ),
        };
        let stroke = property("draw:stroke").and_then(PropertyValue::as_str) != Some("none");
        shape_to_tikz(geometry, width, height, &ShapePaint { fill, stroke })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_binary_data_ignores_line_breaks() {
        assert_eq!(decode_binary_data("aGVs\n bG8=\n").unwrap(), b"hello");
        assert!(decode_binary_data("not base64!").is_none());
    }

    #[test]
    fn test_draw_state_outputs() {
        let mut state = DrawState::new();
        state.outputs.push(OutputFile::new("a-img1.png", "image/png", vec![1]));
        assert_eq!(state.take_outputs().len(), 1);
        assert!(state.take_outputs().is_empty());
    }
}
