//! Footnotes and endnotes.
//!
//! Where `\footnote` cannot be used (headings, captions, table cells) the
//! marker is written at once with `\footnotemark` and the body is queued.
//! Flushing N queued bodies moves the counter back N−1 steps and then steps
//! it once per body, so every `\footnotetext` gets the number of its mark.

use super::context::Context;
use super::palette::ConverterPalette;
use super::portion::DocumentPortion;
use crate::odf::element::{Element, ElementBase};
use crate::odf::node::NodeKind;

/// Note classes with their LaTeX vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteClass {
    Footnote,
    Endnote,
}

impl NoteClass {
    fn counter(self) -> &'static str {
        match self {
            NoteClass::Footnote => "footnote",
            NoteClass::Endnote => "endnote",
        }
    }

    fn command(self) -> &'static str {
        match self {
            NoteClass::Footnote => "\\footnote",
            NoteClass::Endnote => "\\endnote",
        }
    }

    fn mark(self) -> &'static str {
        match self {
            NoteClass::Footnote => "\\footnotemark{}",
            NoteClass::Endnote => "\\endnotemark{}",
        }
    }

    fn text(self) -> &'static str {
        match self {
            NoteClass::Footnote => "\\footnotetext",
            NoteClass::Endnote => "\\endnotetext",
        }
    }
}

/// Commands for N postponed note bodies of one class, in queue order.
pub fn flush_commands(class: NoteClass, bodies: &[String]) -> Vec<String> {
    let mut commands = Vec::with_capacity(bodies.len() + 1);
    if bodies.len() > 1 {
        commands.push(format!(
            "\\addtocounter{{{}}}{{-{}}}",
            class.counter(),
            bodies.len() - 1
        ));
    }
    for (i, body) in bodies.iter().enumerate() {
        let step = if i > 0 {
            format!("\\stepcounter{{{}}}", class.counter())
        } else {
            String::new()
        };
        commands.push(format!("{}{}{{{}}}", step, class.text(), body));
    }
    commands
}

/// Postponed notes of one conversion
#[derive(Debug, Default)]
pub struct NoteState<'a> {
    queue: Vec<&'a Element>,
    endnotes_used: bool,
}

impl<'a> NoteState<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Were endnotes written (so `\theendnotes` is needed)?
    pub fn endnotes_used(&self) -> bool {
        self.endnotes_used
    }
}

impl<'a> ConverterPalette<'a> {
    fn note_class(&self, node: &Element) -> NoteClass {
        if self.config.use_endnotes && node.get_attribute("text:note-class") == Some("endnote") {
            NoteClass::Endnote
        } else {
            NoteClass::Footnote
        }
    }

    /// `text:note`
    pub(crate) fn handle_note(&mut self, node: &'a Element, out: &mut DocumentPortion, ctx: &Context) {
        let class = self.note_class(node);
        if class == NoteClass::Endnote {
            self.notes.endnotes_used = true;
            out.require_package("endnotes");
        }
        if ctx.footnotes_allowed() {
            let body = self.note_body(node, out, ctx);
            out.append(&format!("{}{{{}}}", class.command(), body));
        } else {
            out.append(class.mark());
            self.notes.queue.push(node);
        }
    }

    /// Converted body of a note, prefixed with its label.
    fn note_body(&mut self, node: &'a Element, carrier: &mut DocumentPortion, ctx: &Context) -> String {
        let mut body = DocumentPortion::new();
        if let Some(id) = node.get_attribute("text:id") {
            let label = self.fields.note_label(id);
            body.append(&format!("\\label{{{}}}", label));
        }
        if let Some(content) = node.first_child(NodeKind::NoteBody) {
            let inner = ctx.deeper().with_in_footnote(true).with_no_footnotes(true);
            self.traverse_block_nodes(content.children(), &mut body, &inner);
        }
        body.into_text(carrier).trim_end().to_string()
    }

    /// Write postponed note bodies if the context allows it.
    ///
    /// Notes inside a written body are queued again, so this repeats until
    /// the queue is empty.
    pub(crate) fn flush_notes(&mut self, out: &mut DocumentPortion, ctx: &Context) {
        while !self.notes.is_empty() && ctx.footnotes_allowed() {
            let queue = std::mem::take(&mut self.notes.queue);
            for class in [NoteClass::Footnote, NoteClass::Endnote] {
                let nodes: Vec<&'a Element> = queue.iter().copied().filter(|n| self.note_class(n) == class).collect();
                if nodes.is_empty() {
                    continue;
                }
                let bodies: Vec<String> = nodes.into_iter().map(|n| self.note_body(n, out, ctx)).collect();
                for command in flush_commands(class, &bodies) {
                    out.ensure_newline();
                    out.append(&command);
                }
                out.newline();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bodies(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("note {}", i)).collect()
    }

    #[test]
    fn test_flush_single_note() {
        assert_eq!(flush_commands(NoteClass::Footnote, &bodies(1)), ["\\footnotetext{note 1}"]);
    }

    #[test]
    fn test_flush_two_notes() {
        assert_eq!(
            flush_commands(NoteClass::Footnote, &bodies(2)),
            [
                "\\addtocounter{footnote}{-1}",
                "\\footnotetext{note 1}",
                "\\stepcounter{footnote}\\footnotetext{note 2}",
            ]
        );
    }

    #[test]
    fn test_flush_three_notes() {
        assert_eq!(
            flush_commands(NoteClass::Footnote, &bodies(3)),
            [
                "\\addtocounter{footnote}{-2}",
                "\\footnotetext{note 1}",
                "\\stepcounter{footnote}\\footnotetext{note 2}",
                "\\stepcounter{footnote}\\footnotetext{note 3}",
            ]
        );
    }

    #[test]
    fn test_endnote_vocabulary() {
        let commands = flush_commands(NoteClass::Endnote, &bodies(2));
        assert_eq!(commands[0], "\\addtocounter{endnote}{-1}");
        assert_eq!(commands[2], "\\stepcounter{endnote}\\endnotetext{note 2}");
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_counter_returns_to_last_mark(n in 1usize..20) {
            // net counter movement over the flush is zero
            let commands = flush_commands(NoteClass::Footnote, &vec![String::new(); n]);
            let back = if n > 1 { n as i64 - 1 } else { 0 };
            let steps = commands.iter().filter(|c| c.starts_with("\\stepcounter")).count() as i64;
            prop_assert_eq!(steps - back, 0);
            prop_assert_eq!(commands.iter().filter(|c| c.contains("\\footnotetext")).count(), n);
        }
    }
}
