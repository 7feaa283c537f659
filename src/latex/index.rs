//! Index marks and generated indexes.
//!
//! Alphabetical index marks become `\index` entries for makeindex. Like
//! labels they cannot be written inside moving arguments, so they are
//! rendered at once and queued until the next flush point.

use super::context::Context;
use super::i18n::{I18n, comment_text};
use super::palette::ConverterPalette;
use super::portion::DocumentPortion;
use crate::odf::element::{Element, ElementBase, Node};
use crate::odf::node::NodeKind;

/// `\index` command for an entry with up to two keys.
///
/// Text is escaped first; makeindex's own specials (`!`, `@`, `|`) are then
/// quoted with `"`.
pub fn index_command(i18n: &mut I18n, keys: &[&str], text: &str) -> String {
    let mut parts: Vec<String> = keys
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .map(|k| quote_index(&i18n.escape(k)))
        .collect();
    parts.push(quote_index(&i18n.escape(text.trim())));
    format!("\\index{{{}}}", parts.join("!"))
}

fn quote_index(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '!' | '@' | '|') {
            out.push('"');
        }
        out.push(ch);
    }
    out
}

/// Text between an index mark start and the end with the same id.
pub fn mark_range_text(nodes: &[Node], start: usize, id: &str) -> String {
    let mut text = String::new();
    for node in nodes.iter().skip(start + 1) {
        match node {
            Node::Text(t) => text.push_str(t),
            Node::Element(e) => {
                if e.kind() == NodeKind::AlphabeticalIndexMarkEnd && e.get_attribute("text:id") == Some(id) {
                    break;
                }
                text.push_str(&e.text_content());
            },
        }
    }
    text
}

/// Postponed index entries and makeidx usage
#[derive(Debug, Default)]
pub struct IndexState {
    pending: Vec<String>,
    uses_makeidx: bool,
}

impl IndexState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Does the preamble need `makeidx` and `\makeindex`?
    pub fn uses_makeidx(&self) -> bool {
        self.uses_makeidx
    }
}

impl<'a> ConverterPalette<'a> {
    /// Alphabetical index mark with its entry text.
    pub(crate) fn handle_index_mark(&mut self, node: &'a Element, text: &str, out: &mut DocumentPortion, ctx: &Context) {
        let text = match node.get_attribute("text:string-value") {
            Some(value) => value,
            None => text,
        };
        if text.trim().is_empty() {
            log::debug!("Skipping index mark without text");
            return;
        }
        let keys: Vec<&str> = ["text:key1", "text:key2"]
            .iter()
            .filter_map(|k| node.get_attribute(k))
            .collect();
        let command = index_command(&mut self.i18n, &keys, text);
        self.index.uses_makeidx = true;
        if ctx.labels_allowed() {
            out.append(&command);
        } else {
            self.index.pending.push(command);
        }
    }

    /// Write postponed index entries if the context allows it.
    pub(crate) fn flush_index_marks(&mut self, out: &mut DocumentPortion, ctx: &Context) {
        if self.index.is_empty() || !ctx.labels_allowed() {
            return;
        }
        for command in std::mem::take(&mut self.index.pending) {
            out.append(&command);
        }
    }

    /// Generated indexes: the body is never traversed except for a static
    /// bibliography.
    pub(crate) fn handle_index(&mut self, node: &'a Element, out: &mut DocumentPortion, ctx: &Context) {
        out.ensure_newline();
        match node.kind() {
            NodeKind::TableOfContent => {
                out.append("\\tableofcontents");
            },
            NodeKind::IllustrationIndex => {
                out.append("\\listoffigures");
            },
            NodeKind::TableIndex => {
                out.append("\\listoftables");
            },
            NodeKind::AlphabeticalIndex => {
                self.index.uses_makeidx = true;
                out.append("\\printindex");
            },
            NodeKind::Bibliography => {
                if self.config.use_bibtex {
                    let name = self.bibliography_base();
                    out.append(&format!("\\bibliographystyle{{{}}}", self.config.bibtex_style))
                        .newline()
                        .append(&format!("\\bibliography{{{}}}", name));
                } else if let Some(body) = node.first_child(NodeKind::IndexBody) {
                    self.traverse_block_nodes(body.children(), out, &ctx.deeper());
                }
            },
            _ => {
                let title = node
                    .first_child(NodeKind::IndexBody)
                    .and_then(|b| b.first_child(NodeKind::IndexTitle))
                    .map(|t| comment_text(&t.text_content()))
                    .unwrap_or_default();
                log::debug!("Index '{}' is not converted", node.tag_name());
                let line = format!("% Index not converted: {}", title);
                out.append(line.trim_end());
            },
        }
        out.ensure_blank_line();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::latex::config::LatexConfig;

    #[test]
    fn test_index_command_quotes_specials() {
        let mut i18n = I18n::new(&LatexConfig::default());
        assert_eq!(index_command(&mut i18n, &[], "Apple"), "\\index{Apple}");
        assert_eq!(index_command(&mut i18n, &["Fruit", ""], "Apple"), "\\index{Fruit!Apple}");
        assert_eq!(index_command(&mut i18n, &[], "a@b!c"), "\\index{a\"@b\"!c}");
        assert_eq!(index_command(&mut i18n, &[], "50%"), "\\index{50\\%}");
    }

    #[test]
    fn test_mark_range_text() {
        let paragraph = Element::new("text:p")
            .with_text("see ")
            .with_child(Element::new("text:alphabetical-index-mark-start").with_attribute("text:id", "m1"))
            .with_text("the ")
            .with_child(Element::new("text:span").with_text("index"))
            .with_child(Element::new("text:alphabetical-index-mark-end").with_attribute("text:id", "m1"))
            .with_text(" here");
        assert_eq!(mark_range_text(paragraph.children(), 1, "m1"), "the index");
    }
}
