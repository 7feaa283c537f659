//! Inline traversal: text, spans, breaks, fields, marks and inline objects.

use super::context::Context;
use super::i18n::comment_text;
use super::index::mark_range_text;
use super::math::EMPTY_FORMULA;
use super::palette::ConverterPalette;
use super::portion::DocumentPortion;
use super::style::BeforeAfter;
use crate::odf::element::{Element, ElementBase, Node};
use crate::odf::node::NodeKind;
use crate::odf::style::StyleFamily;

/// Collapse runs of white space to one space, as ODF requires for character data.
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

/// Inline content permitted in headers and footers
fn allowed_in_header_footer(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Span
            | NodeKind::Meta
            | NodeKind::Space
            | NodeKind::Tab
            | NodeKind::LineBreak
            | NodeKind::PageNumber
            | NodeKind::PageCount
            | NodeKind::Chapter
            | NodeKind::Date
            | NodeKind::Time
            | NodeKind::Title
            | NodeKind::Subject
            | NodeKind::AuthorName
            | NodeKind::InitialCreator
            | NodeKind::FileName
            | NodeKind::VariableGet
            | NodeKind::UserFieldGet
            | NodeKind::Link
    )
}

impl<'a> ConverterPalette<'a> {
    pub(crate) fn traverse_inline_nodes(&mut self, nodes: &'a [Node], out: &mut DocumentPortion, ctx: &Context) {
        let mut i = 0;
        while i < nodes.len() {
            let e = match &nodes[i] {
                Node::Text(text) => {
                    self.inline_text(text, out, ctx);
                    i += 1;
                    continue;
                },
                Node::Element(e) => e,
            };
            if ctx.in_header_footer() && !allowed_in_header_footer(e.kind()) {
                log::debug!("Skipping '{}' in header or footer", e.tag_name());
                i += 1;
                continue;
            }
            i = match e.kind() {
                NodeKind::Span => self.handle_span_run(nodes, i, out, ctx),
                NodeKind::ReferenceMark | NodeKind::ReferenceMarkStart => {
                    self.handle_reference_mark(nodes, i, out, ctx)
                },
                NodeKind::AlphabeticalIndexMarkStart => {
                    let text = e
                        .get_attribute("text:id")
                        .map(|id| mark_range_text(nodes, i, id))
                        .unwrap_or_default();
                    self.handle_index_mark(e, &text, out, ctx);
                    i + 1
                },
                _ => {
                    self.inline_element(e, out, ctx);
                    i + 1
                },
            };
        }
    }

    fn inline_text(&mut self, text: &str, out: &mut DocumentPortion, ctx: &Context) {
        let text = collapse_whitespace(text);
        if ctx.in_citation_text() {
            if let Some(buffer) = self.fields.citation_text.as_mut() {
                buffer.push_str(&text);
            }
            return;
        }
        let converted = self.i18n.convert(&text, ctx);
        if ctx.verbatim() {
            out.append_verbatim(&converted);
        } else {
            out.append(&converted);
        }
    }

    fn inline_element(&mut self, e: &'a Element, out: &mut DocumentPortion, ctx: &Context) {
        match e.kind() {
            NodeKind::Space => {
                let count = e.space_count();
                if ctx.in_citation_text() {
                    if let Some(buffer) = self.fields.citation_text.as_mut() {
                        buffer.push(' ');
                    }
                } else if ctx.verbatim() {
                    out.append_verbatim(&" ".repeat(count));
                } else {
                    out.append(" ");
                    for _ in 1..count {
                        out.append("\\ ");
                    }
                }
            },
            NodeKind::Tab => {
                out.append(" ");
            },
            NodeKind::LineBreak => {
                if ctx.verbatim() {
                    out.newline();
                } else if ctx.no_line_breaks() || self.config.ignore_hard_line_breaks {
                    out.append(" ");
                } else {
                    out.append("\\newline").newline();
                }
            },
            NodeKind::Link => self.handle_link(e, out, ctx),
            NodeKind::Note => self.handle_note(e, out, ctx),
            NodeKind::Sequence => self.handle_sequence(e, out, ctx),
            NodeKind::SequenceRef | NodeKind::ReferenceRef | NodeKind::BookmarkRef | NodeKind::NoteRef => {
                self.handle_reference(e, out, ctx)
            },
            NodeKind::Bookmark | NodeKind::BookmarkStart => self.handle_label(e, out, ctx),
            NodeKind::BibliographyMark => self.handle_bibliography_mark(e, out, ctx),
            NodeKind::AlphabeticalIndexMark => self.handle_index_mark(e, "", out, ctx),
            NodeKind::PageNumber
            | NodeKind::PageCount
            | NodeKind::Chapter
            | NodeKind::Date
            | NodeKind::Time
            | NodeKind::Title
            | NodeKind::Subject
            | NodeKind::AuthorName
            | NodeKind::InitialCreator
            | NodeKind::FileName
            | NodeKind::VariableGet
            | NodeKind::VariableSet
            | NodeKind::UserFieldGet => self.handle_field(e, out, ctx),
            NodeKind::Annotation => {
                let text: Vec<String> = e
                    .child_elements()
                    .filter(|p| p.kind() == NodeKind::Paragraph)
                    .map(|p| comment_text(&p.text_content()))
                    .collect();
                let text = text.join(" ");
                if !text.is_empty() {
                    out.append(&format!("%{}", text)).newline();
                }
            },
            NodeKind::Meta => self.traverse_inline_nodes(e.children(), out, ctx),
            NodeKind::Frame => self.handle_frame(e, out, ctx),
            NodeKind::CustomShape => self.handle_custom_shape(e, out, ctx),
            NodeKind::Math => {
                let formula = self.math.convert(e);
                if formula != EMPTY_FORMULA {
                    out.require_package("amsmath");
                    if ctx.math_mode() {
                        out.append(&formula);
                    } else {
                        out.append(&format!("${}$", formula));
                    }
                }
            },
            NodeKind::BookmarkEnd
            | NodeKind::ReferenceMarkEnd
            | NodeKind::AlphabeticalIndexMarkEnd
            | NodeKind::TocMark
            | NodeKind::ChangeMark
            | NodeKind::SoftPageBreak
            | NodeKind::NoteCitation => {},
            _ => log::debug!("Skipping inline '{}'", e.tag_name()),
        }
    }

    fn is_math_span(&self, span: &Element) -> bool {
        span.get_attribute("text:style-name")
            .is_some_and(|name| self.registry.display_name(name, StyleFamily::Text) == self.config.math_span_style)
    }

    /// Markup of a span's style and the context inside it.
    fn span_style(&mut self, span: &Element, ctx: &Context) -> (BeforeAfter, Context) {
        let registry = self.registry;
        let Some(name) = span.get_attribute("text:style-name") else {
            return (BeforeAfter::default(), ctx.clone());
        };
        let inner = match registry.get_style(name, StyleFamily::Text) {
            Some(style) => ctx.updated_from_style(registry, style),
            None => ctx.clone(),
        };
        let mut markup = BeforeAfter::default();
        if let Some((before, after)) = self.i18n.language_switch(ctx.lang(), inner.lang()) {
            markup.add(&before, &after);
        }
        markup.add_pair(&self.chars.apply_text_style(name, ctx));
        (markup, inner)
    }

    /// Consecutive sibling spans starting at `start`; returns the index
    /// after the run.
    ///
    /// In verbatim or math context spans are transparent. Otherwise
    /// neighbours with equal markup share one pair of commands.
    fn handle_span_run(&mut self, nodes: &'a [Node], start: usize, out: &mut DocumentPortion, ctx: &Context) -> usize {
        let mut end = start;
        while matches!(nodes.get(end), Some(Node::Element(e)) if e.kind() == NodeKind::Span) {
            end += 1;
        }
        let spans: Vec<&'a Element> = nodes[start..end].iter().filter_map(Node::as_element).collect();
        if ctx.verbatim() || ctx.math_mode() {
            for span in spans {
                self.traverse_inline_nodes(span.children(), out, ctx);
            }
            return end;
        }

        let styles: Vec<Option<(BeforeAfter, Context)>> = spans
            .iter()
            .map(|span| {
                if self.is_math_span(span) {
                    None
                } else {
                    Some(self.span_style(span, ctx))
                }
            })
            .collect();

        let mut k = 0;
        while k < spans.len() {
            let Some((markup, _)) = &styles[k] else {
                let mut m = k;
                while m < spans.len() && styles[m].is_none() {
                    m += 1;
                }
                self.math_run(&spans[k..m], out, ctx);
                k = m;
                continue;
            };
            let mut m = k + 1;
            while m < spans.len() && styles[m].as_ref().is_some_and(|(next, _)| next == markup) {
                m += 1;
            }
            out.append(markup.before());
            for (span, style) in spans[k..m].iter().zip(&styles[k..m]) {
                if let Some((_, inner)) = style {
                    self.span_content(span, out, inner);
                }
            }
            out.append(markup.after());
            k = m;
        }
        end
    }

    /// A run of math spans, wrapped in one pair of `$`.
    fn math_run(&mut self, spans: &[&'a Element], out: &mut DocumentPortion, ctx: &Context) {
        let inner = ctx.with_math_mode(true);
        let mut formula = DocumentPortion::new();
        for span in spans {
            self.traverse_inline_nodes(span.children(), &mut formula, &inner);
        }
        let formula = formula.into_text(out);
        let formula = formula.trim();
        if !formula.is_empty() {
            out.append("$").append(formula).append("$");
        }
    }

    fn span_content(&mut self, span: &'a Element, out: &mut DocumentPortion, inner: &Context) {
        let family = inner.font_name().map(|name| match self.registry.font_face(name) {
            Some(face) => face.family.clone(),
            None => name.to_string(),
        });
        self.i18n.push_special_table(family.as_deref());
        self.traverse_inline_nodes(span.children(), out, inner);
        self.i18n.pop_special_table();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("a  b\n\tc"), "a b c");
        assert_eq!(collapse_whitespace("  lead"), " lead");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn test_header_footer_subset() {
        assert!(allowed_in_header_footer(NodeKind::PageNumber));
        assert!(!allowed_in_header_footer(NodeKind::Note));
        assert!(!allowed_in_header_footer(NodeKind::Frame));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_collapse_is_idempotent(text in "[ a-z\t\n]{0,40}") {
            let once = collapse_whitespace(&text);
            prop_assert_eq!(collapse_whitespace(&once), once.clone());
            prop_assert!(!once.contains("  "));
        }
    }
}
