//! Headings and section numbering depth.

use super::context::Context;
use super::inline::collapse_whitespace;
use super::palette::ConverterPalette;
use super::portion::DocumentPortion;
use crate::odf::element::{Element, ElementBase};
use crate::odf::style::StyleFamily;

/// `secnumdepth` value of a sectioning command
pub fn sectioning_depth(command: &str) -> Option<i32> {
    Some(match command {
        "part" => -1,
        "chapter" => 0,
        "section" => 1,
        "subsection" => 2,
        "subsubsection" => 3,
        "paragraph" => 4,
        "subparagraph" => 5,
        _ => return None,
    })
}

impl<'a> ConverterPalette<'a> {
    /// `text:h`
    pub(crate) fn handle_heading(&mut self, node: &'a Element, out: &mut DocumentPortion, ctx: &Context) {
        let config = self.config;
        let registry = self.registry;
        let level = node
            .get_int_attribute("text:outline-level")
            .map(|l| l.clamp(1, 10) as u8)
            .unwrap_or(1);
        let command = match config.heading_command(level) {
            Some(command) if !(ctx.in_table() || ctx.in_frame() || ctx.in_footnote()) => command,
            _ => {
                self.traverse_block_text(node, out, ctx);
                return;
            },
        };
        let style_name = node.get_attribute("text:style-name");
        if style_name.is_some_and(|n| self.pars.page_breaks(n).before) {
            out.ensure_newline();
            out.append("\\clearpage").newline();
        }

        let mut inner = ctx.deeper().with_in_heading(true).with_no_line_breaks(true);
        if let Some(style) = style_name.and_then(|n| registry.get_style(n, StyleFamily::Paragraph)) {
            inner = inner.updated_from_style(registry, style);
        }
        let mut content = DocumentPortion::new();
        self.traverse_inline_nodes(node.children(), &mut content, &inner);
        let formatted = content.into_text(out);
        let formatted = formatted.trim();

        out.ensure_newline();
        let display = style_name.map(|n| registry.display_name(n, StyleFamily::Paragraph));
        if let Some(entry) = display.as_deref().and_then(|d| config.style_maps.heading.get(d)) {
            out.append(&entry.before).append(formatted).append(&entry.after);
        } else if node.get_bool_attribute("text:is-list-header") == Some(true) {
            out.append(&format!("\\{}*{{{}}}", command, formatted));
        } else {
            // the optional argument keeps footnote marks and formatting out
            // of the table of contents and running heads
            let plain = self.i18n.escape(collapse_whitespace(&node.text_content()).trim());
            if plain != formatted && !plain.is_empty() {
                out.append(&format!("\\{}[{}]{{{}}}", command, plain, formatted));
            } else {
                out.append(&format!("\\{}{{{}}}", command, formatted));
            }
        }
        out.newline();
        self.flush_queues(out, ctx);
        out.ensure_blank_line();
    }

    /// `secnumdepth` matching the deepest numbered outline level, or `None`
    /// without an outline style.
    pub(crate) fn secnumdepth(&self) -> Option<i32> {
        let outline = self.registry.outline_style()?;
        let deepest = outline
            .list_levels()
            .iter()
            .filter(|l| l.is_numbered())
            .map(|l| l.level)
            .max();
        Some(match deepest {
            Some(level) => self
                .config
                .heading_command(level)
                .and_then(sectioning_depth)
                .unwrap_or(i32::from(level)),
            None => -2,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sectioning_depths() {
        assert_eq!(sectioning_depth("part"), Some(-1));
        assert_eq!(sectioning_depth("chapter"), Some(0));
        assert_eq!(sectioning_depth("subsubsection"), Some(3));
        assert_eq!(sectioning_depth("mysection"), None);
    }
}
