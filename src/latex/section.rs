//! Sections.
//!
//! A section is transparent unless its style asks for several columns, in
//! which case it becomes a `multicols` environment.

use super::context::Context;
use super::palette::ConverterPalette;
use super::portion::DocumentPortion;
use crate::odf::element::{Element, ElementBase};
use crate::odf::style::{PropertyGroup, PropertyValue, StyleFamily};

impl<'a> ConverterPalette<'a> {
    /// Column count declared by a section's style
    fn section_columns(&self, node: &Element) -> u32 {
        node.get_attribute("text:style-name")
            .and_then(|name| {
                self.registry
                    .resolve_property(name, StyleFamily::Section, PropertyGroup::Section, "fo:column-count", true)
            })
            .and_then(PropertyValue::as_number)
            .map(|n| n.max(1.0) as u32)
            .unwrap_or(1)
    }

    /// `text:section`
    pub(crate) fn handle_section(&mut self, node: &'a Element, out: &mut DocumentPortion, ctx: &Context) {
        if node.get_attribute("text:display") == Some("none") {
            log::debug!("Skipping hidden section");
            return;
        }
        let inner = ctx.deeper().with_in_section(true);
        let columns = self.section_columns(node);
        if columns > 1 && self.config.use_multicol && !ctx.in_multicols() && !ctx.in_table() {
            out.ensure_newline();
            out.append(&format!("\\begin{{multicols}}{{{}}}", columns)).newline();
            out.require_package("multicol");
            self.traverse_block_nodes(node.children(), out, &inner.with_in_multicols(true));
            out.ensure_newline();
            out.append("\\end{multicols}");
            out.ensure_blank_line();
        } else {
            self.traverse_block_nodes(node.children(), out, &inner);
        }
    }
}
