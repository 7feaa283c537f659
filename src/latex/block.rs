//! Block traversal: paragraphs, captions and paragraph block wrappers.
//!
//! Consecutive paragraphs whose style has a `paragraph_block` map entry are
//! wrapped in the entry's markup. Wrappers stack: a paragraph closes every
//! wrapper that does not list its style as a continuation, and other block
//! kinds close the wrappers that do not accept them as contents.

use super::context::Context;
use super::inline::collapse_whitespace;
use super::math::EMPTY_FORMULA;
use super::palette::ConverterPalette;
use super::portion::DocumentPortion;
use super::style_map::{BreakAfter, StyleMapEntry};
use crate::odf::element::{Element, ElementBase, Node};
use crate::odf::node::NodeKind;
use crate::odf::style::StyleFamily;
use smallvec::SmallVec;

/// Where a table caption goes relative to the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionPlacement {
    Above,
    Below,
}

type Wrappers<'a> = SmallVec<[(String, &'a StyleMapEntry); 4]>;

/// Next element sibling after `index`, skipping character data.
fn next_element(nodes: &[Node], index: usize) -> Option<(usize, &Element)> {
    nodes
        .iter()
        .enumerate()
        .skip(index + 1)
        .find_map(|(i, node)| node.as_element().map(|e| (i, e)))
}

fn close_wrappers<F>(wrappers: &mut Wrappers<'_>, out: &mut DocumentPortion, close: F)
where
    F: Fn(&StyleMapEntry) -> bool,
{
    while let Some((_, top)) = wrappers.last() {
        if !close(top) {
            break;
        }
        out.ensure_newline();
        out.append(&top.after);
        out.ensure_newline();
        wrappers.pop();
    }
}

/// Block kind name used by style map `contents` lists
fn contents_kind(kind: NodeKind) -> Option<&'static str> {
    match kind {
        NodeKind::List => Some("list"),
        NodeKind::Table => Some("table"),
        NodeKind::Section => Some("section"),
        NodeKind::Frame | NodeKind::CustomShape => Some("drawing"),
        k if k.is_index() => Some("index"),
        _ => None,
    }
}

impl<'a> ConverterPalette<'a> {
    pub(crate) fn traverse_block_nodes(&mut self, nodes: &'a [Node], out: &mut DocumentPortion, ctx: &Context) {
        let config = self.config;
        let registry = self.registry;
        let mut wrappers: Wrappers<'a> = SmallVec::new();
        let mut i = 0;
        while i < nodes.len() {
            let Node::Element(e) = &nodes[i] else {
                i += 1;
                continue;
            };
            let kind = e.kind();
            if kind.is_block() && ctx.depth() >= config.max_depth {
                log::warn!("Content nested deeper than {} levels converted as plain text", config.max_depth);
                close_wrappers(&mut wrappers, out, |_| true);
                let text = self.i18n.escape(collapse_whitespace(&e.text_content()).trim());
                out.append(&text);
                out.ensure_blank_line();
                i += 1;
                continue;
            }
            match kind {
                NodeKind::Paragraph => {
                    let display = e
                        .get_attribute("text:style-name")
                        .map(|n| registry.display_name(n, StyleFamily::Paragraph))
                        .unwrap_or_default();
                    close_wrappers(&mut wrappers, out, |w| !w.permits_next(&display));
                    if let Some(entry) = config.style_maps.paragraph_block.get(&display)
                        && wrappers.last().is_none_or(|(name, _)| *name != display)
                    {
                        if wrappers.last().is_some_and(|(_, top)| !top.allows_nesting) {
                            close_wrappers(&mut wrappers, out, |_| true);
                        }
                        out.ensure_newline();
                        out.append(&entry.before);
                        out.ensure_newline();
                        wrappers.push((display, entry));
                    }

                    match self.caption_sequence(e) {
                        Some((index, sequence)) => {
                            let name = sequence.get_attribute("text:name").unwrap_or("");
                            if config.is_table_sequence(name)
                                && let Some((j, table)) = next_element(nodes, i)
                                && table.kind() == NodeKind::Table
                            {
                                self.handle_table(table, Some((e, CaptionPlacement::Above)), out, ctx);
                                i = j + 1;
                                continue;
                            }
                            let float = if config.is_table_sequence(name) { "table" } else { "figure" };
                            self.write_caption(e, index, sequence, float, out, ctx);
                            out.ensure_blank_line();
                        },
                        None => self.traverse_block_text(e, out, ctx),
                    }
                },
                NodeKind::Heading => {
                    close_wrappers(&mut wrappers, out, |_| true);
                    self.handle_heading(e, out, ctx);
                },
                NodeKind::Table => {
                    close_wrappers(&mut wrappers, out, |w| !w.permits_contents("table"));
                    if let Some((j, next)) = next_element(nodes, i)
                        && next.kind() == NodeKind::Paragraph
                        && self
                            .caption_sequence(next)
                            .and_then(|(_, s)| s.get_attribute("text:name"))
                            .is_some_and(|n| config.is_table_sequence(n))
                    {
                        self.handle_table(e, Some((next, CaptionPlacement::Below)), out, ctx);
                        i = j + 1;
                        continue;
                    }
                    self.handle_table(e, None, out, ctx);
                },
                NodeKind::List
                | NodeKind::Section
                | NodeKind::Frame
                | NodeKind::CustomShape
                | NodeKind::TableOfContent
                | NodeKind::IllustrationIndex
                | NodeKind::TableIndex
                | NodeKind::AlphabeticalIndex
                | NodeKind::UserIndex
                | NodeKind::ObjectIndex
                | NodeKind::Bibliography => {
                    if let Some(contents) = contents_kind(kind) {
                        close_wrappers(&mut wrappers, out, |w| !w.permits_contents(contents));
                    }
                    match kind {
                        NodeKind::List => self.handle_list(e, out, ctx),
                        NodeKind::Section => self.handle_section(e, out, ctx),
                        NodeKind::Frame => {
                            out.ensure_newline();
                            self.handle_frame(e, out, ctx);
                            out.ensure_blank_line();
                        },
                        NodeKind::CustomShape => {
                            self.handle_custom_shape(e, out, ctx);
                            out.ensure_blank_line();
                        },
                        _ => self.handle_index(e, out, ctx),
                    }
                },
                NodeKind::SequenceDecls
                | NodeKind::VariableDecls
                | NodeKind::UserFieldDecls
                | NodeKind::TrackedChanges
                | NodeKind::SoftPageBreak => {},
                _ => log::debug!("Skipping block '{}'", e.tag_name()),
            }
            i += 1;
        }
        close_wrappers(&mut wrappers, out, |_| true);
        self.flush_queues(out, ctx);
    }

    /// Sequence making a paragraph a figure or table caption, with the index
    /// of the child holding it. Frames are not searched: a caption inside a
    /// frame belongs to the frame.
    pub(crate) fn caption_sequence(&self, paragraph: &'a Element) -> Option<(usize, &'a Element)> {
        let config = self.config;
        let is_caption = |e: &Element| {
            e.kind() == NodeKind::Sequence
                && e.get_attribute("text:name")
                    .is_some_and(|n| config.is_figure_sequence(n) || config.is_table_sequence(n))
        };
        paragraph
            .children()
            .iter()
            .enumerate()
            .find_map(|(i, node)| {
                let child = node.as_element()?;
                if is_caption(child) {
                    return Some((i, child));
                }
                if child.kind() == NodeKind::Frame {
                    return None;
                }
                child.find_descendant(|e| is_caption(e)).map(|s| (i, s))
            })
    }

    /// `\caption` (inside a float) or `\captionof`, then the label of the
    /// sequence. Frames before the sequence are written first.
    pub(crate) fn write_caption(
        &mut self,
        paragraph: &'a Element,
        index: usize,
        sequence: &'a Element,
        float: &str,
        out: &mut DocumentPortion,
        ctx: &Context,
    ) {
        let children = paragraph.children();
        for node in &children[..index] {
            if let Node::Element(frame) = node
                && frame.kind() == NodeKind::Frame
            {
                out.ensure_newline();
                self.handle_frame(frame, out, ctx);
                out.ensure_newline();
            }
        }
        let inner = ctx.deeper().with_in_caption(true).with_no_line_breaks(true);
        let mut text = DocumentPortion::new();
        self.traverse_inline_nodes(&children[index + 1..], &mut text, &inner);
        let text = text.into_text(out);
        let text = text
            .trim_start_matches(|c: char| c.is_whitespace() || matches!(c, ':' | '.' | '-' | '–' | '—'))
            .trim_end();
        out.ensure_newline();
        if ctx.in_float() {
            out.append(&format!("\\caption{{{}}}", text));
        } else {
            out.append(&format!("\\captionof{{{}}}{{{}}}", float, text))
                .require_package("capt-of");
        }
        if sequence.has_attribute("text:ref-name") {
            self.handle_label(sequence, out, ctx);
        }
        self.flush_queues(out, ctx);
        out.ensure_newline();
    }

    /// Formula of a paragraph that holds nothing but one formula frame.
    pub(crate) fn display_formula(&self, paragraph: &Element) -> Option<String> {
        let mut frame = None;
        for node in paragraph.children() {
            match node {
                Node::Text(t) if t.trim().is_empty() => {},
                Node::Element(e) if e.kind() == NodeKind::Frame && frame.is_none() => frame = Some(e),
                Node::Element(e) if e.kind() == NodeKind::SoftPageBreak => {},
                _ => return None,
            }
        }
        self.frame_formula(frame?)
    }

    /// `text:p`
    pub(crate) fn traverse_block_text(&mut self, paragraph: &'a Element, out: &mut DocumentPortion, ctx: &Context) {
        let config = self.config;
        let registry = self.registry;
        let style_name = paragraph.get_attribute("text:style-name");
        let breaks = style_name.map(|n| self.pars.page_breaks(n)).unwrap_or_default();
        let can_break = !(ctx.in_table() || ctx.in_frame() || ctx.in_footnote() || ctx.in_header_footer());
        if breaks.before && can_break {
            out.ensure_newline();
            out.append("\\clearpage").newline();
        }

        if paragraph.is_whitespace_only() {
            for child in paragraph.child_elements() {
                if matches!(child.kind(), NodeKind::Bookmark | NodeKind::BookmarkStart) {
                    self.handle_label(child, out, ctx);
                }
            }
            if !ctx.in_table() && !config.ignore_empty_paragraphs {
                out.ensure_newline();
                out.append("\\bigskip");
                out.ensure_blank_line();
            }
        } else if let Some(formula) = self.display_formula(paragraph) {
            if formula != EMPTY_FORMULA {
                out.ensure_newline();
                out.append(&format!("\\[{}\\]", formula)).require_package("amsmath");
                out.ensure_blank_line();
            }
        } else {
            let mut inner = ctx.deeper();
            if let Some(style) = style_name.and_then(|n| registry.get_style(n, StyleFamily::Paragraph)) {
                inner = inner.updated_from_style(registry, style);
            }
            let display = style_name.map(|n| registry.display_name(n, StyleFamily::Paragraph));
            match display.as_deref().and_then(|d| config.style_maps.paragraph.get(d)) {
                Some(entry) => {
                    if !entry.line_break {
                        inner = inner.with_no_line_breaks(true);
                    }
                    if entry.verbatim {
                        inner = inner.with_verbatim(true);
                    }
                    out.append(&entry.before);
                    self.traverse_inline_nodes(paragraph.children(), out, &inner);
                    out.append(&entry.after);
                    match entry.break_after {
                        BreakAfter::None => {},
                        BreakAfter::Line => {
                            out.newline();
                        },
                        BreakAfter::Paragraph => {
                            out.ensure_blank_line();
                        },
                    }
                },
                None => {
                    let markup = match style_name {
                        Some(name) => self.pars.apply_par_style(name, ctx, &mut self.chars),
                        None => Default::default(),
                    };
                    out.append(markup.before());
                    self.traverse_inline_nodes(paragraph.children(), out, &inner);
                    out.append(markup.after());
                    if !ctx.in_table() {
                        out.ensure_blank_line();
                    }
                },
            }
        }

        self.flush_queues(out, ctx);
        if breaks.after && can_break {
            out.ensure_newline();
            out.append("\\clearpage");
            out.ensure_blank_line();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_element_skips_whitespace() {
        let parent = Element::new("office:text")
            .with_child(Element::new("text:p"))
            .with_text("\n  ")
            .with_child(Element::new("table:table"));
        let (index, next) = next_element(parent.children(), 0).unwrap();
        assert_eq!(index, 2);
        assert_eq!(next.kind(), NodeKind::Table);
        assert!(next_element(parent.children(), 2).is_none());
    }

    #[test]
    fn test_close_wrappers_stops_at_permitting_entry() {
        let outer = StyleMapEntry::new("\\begin{quote}", "\\end{quote}").with_contents(&["list"]);
        let inner = StyleMapEntry::new("\\begin{small}", "\\end{small}");
        let mut wrappers: Wrappers<'_> = SmallVec::new();
        wrappers.push(("Quote".to_string(), &outer));
        wrappers.push(("Small".to_string(), &inner));
        let mut out = DocumentPortion::new();
        close_wrappers(&mut wrappers, &mut out, |w| !w.permits_contents("list"));
        assert_eq!(wrappers.len(), 1);
        assert_eq!(out.to_string(), "\\end{small}\n");
    }

    #[test]
    fn test_contents_kinds() {
        assert_eq!(contents_kind(NodeKind::List), Some("list"));
        assert_eq!(contents_kind(NodeKind::TableOfContent), Some("index"));
        assert_eq!(contents_kind(NodeKind::Frame), Some("drawing"));
        assert_eq!(contents_kind(NodeKind::Paragraph), None);
    }
}
