//! Fields, sequences, cross references and hyperlinks.
//!
//! Source identifiers (reference mark names, bookmark names, sequence
//! ref-names, note ids) go through [`ExportNameCollection`]s so labels are
//! always valid LaTeX keys. Labels that cannot be written in the current
//! context (heading and caption arguments) are queued and written at the next
//! flush point.

use super::context::Context;
use super::i18n::escape_url;
use super::names::ExportNameCollection;
use super::palette::ConverterPalette;
use super::portion::DocumentPortion;
use crate::odf::element::{Element, ElementBase};
use crate::odf::node::NodeKind;

/// Largest magnitude a TeX counter can hold.
pub const COUNTER_LIMIT: i64 = i32::MAX as i64;

/// Clamp a document-supplied number into the range of a TeX counter.
pub fn clamp_counter(value: i64) -> i64 {
    value.clamp(-COUNTER_LIMIT, COUNTER_LIMIT)
}

/// A counter change requested by a sequence formula or a list start value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterOp {
    /// The next number shown is exactly this value
    Set(i64),
    /// The next number shown is the current value plus this amount
    Add(i64),
    /// Ordinary step by one
    Step,
}

impl CounterOp {
    /// Parse an ODF sequence formula (`ooow:Figure+1`, `ooow:42`).
    ///
    /// Returns `None` for formulas that are not a constant or a linear
    /// offset of the sequence itself.
    ///
    /// ```
    /// use odf2latex::latex::field::CounterOp;
    ///
    /// assert_eq!(CounterOp::parse("ooow:42", "Figure"), Some(CounterOp::Set(42)));
    /// assert_eq!(CounterOp::parse("ooow:Figure+1", "Figure"), Some(CounterOp::Step));
    /// assert_eq!(CounterOp::parse("ooow:Figure+3", "Figure"), Some(CounterOp::Add(3)));
    /// assert_eq!(CounterOp::parse("ooow:Figure*2", "Figure"), None);
    /// ```
    pub fn parse(formula: &str, sequence: &str) -> Option<Self> {
        let body = match formula.split_once(':') {
            Some((namespace, rest)) if matches!(namespace, "ooow" | "oooc" | "of") => rest,
            _ => formula,
        };
        let body: String = body.chars().filter(|c| !c.is_whitespace()).collect();
        if body.is_empty() {
            return None;
        }
        if let Ok(value) = body.parse::<i64>() {
            return Some(CounterOp::Set(clamp_counter(value)));
        }
        let rest = body.strip_prefix(sequence)?;
        if rest.is_empty() {
            return Some(CounterOp::Add(0));
        }
        let (sign, digits) = if let Some(digits) = rest.strip_prefix('+') {
            (1, digits)
        } else if let Some(digits) = rest.strip_prefix('-') {
            (-1, digits)
        } else {
            return None;
        };
        let amount: i64 = digits.parse().ok()?;
        match clamp_counter(sign * amount) {
            1 => Some(CounterOp::Step),
            n => Some(CounterOp::Add(n)),
        }
    }

    /// Commands that prepare `counter` so the following step shows the
    /// requested value.
    pub fn preset(&self, counter: &str) -> String {
        match self {
            CounterOp::Set(n) => format!("\\setcounter{{{}}}{{{}}}", counter, n.saturating_sub(1)),
            CounterOp::Add(n) => format!("\\addtocounter{{{}}}{{{}}}", counter, n.saturating_sub(1)),
            CounterOp::Step => String::new(),
        }
    }

    /// Preset followed by `\refstepcounter`.
    pub fn refstep(&self, counter: &str) -> String {
        format!("{}\\refstepcounter{{{}}}", self.preset(counter), counter)
    }
}

/// Counter display command for a `style:num-format`
pub fn counter_display(num_format: Option<&str>, counter: &str) -> String {
    let command = match num_format {
        Some("1") => "arabic",
        Some("a") => "alph",
        Some("A") => "Alph",
        Some("i") => "roman",
        Some("I") => "Roman",
        _ => return format!("\\the{}{{}}", counter),
    };
    format!("\\{}{{{}}}", command, counter)
}

/// Export names and postponed labels of one conversion.
#[derive(Debug, Default)]
pub struct FieldState<'a> {
    /// Sequence ref-names and note ids
    targets: ExportNameCollection,
    /// Reference mark names
    ref_names: ExportNameCollection,
    bookmarks: ExportNameCollection,
    /// Counters for sequences that are neither figures nor tables
    counters: ExportNameCollection,
    declared: Vec<String>,
    pending: Vec<&'a Element>,
    /// Rendered text of the citation zone being skipped
    pub(crate) citation_text: Option<String>,
}

impl<'a> FieldState<'a> {
    pub fn new() -> Self {
        Self {
            targets: ExportNameCollection::new(false),
            ref_names: ExportNameCollection::new(false),
            bookmarks: ExportNameCollection::new(false),
            counters: ExportNameCollection::new(true),
            ..Self::default()
        }
    }

    pub fn sequence_label(&mut self, ref_name: &str) -> String {
        format!("seq:{}", self.targets.get_export_name(ref_name))
    }

    pub fn note_label(&mut self, id: &str) -> String {
        format!("note:{}", self.targets.get_export_name(id))
    }

    pub fn reference_label(&mut self, name: &str) -> String {
        format!("ref:{}", self.ref_names.get_export_name(name))
    }

    pub fn bookmark_label(&mut self, name: &str) -> String {
        format!("bkm:{}", self.bookmarks.get_export_name(name))
    }

    /// LaTeX counter for a sequence that has no standard counter
    pub fn sequence_counter(&mut self, sequence: &str) -> String {
        let name = format!("seq{}", self.counters.get_export_name(sequence));
        if !self.declared.contains(&name) {
            self.declared.push(name.clone());
        }
        name
    }

    /// `\newcounter` declarations for the preamble
    pub fn counter_declarations(&self) -> impl Iterator<Item = String> + '_ {
        self.declared.iter().map(|c| format!("\\newcounter{{{}}}", c))
    }

    /// `\label` for a reference mark, bookmark or sequence element.
    pub fn label_for(&mut self, node: &Element) -> Option<String> {
        let label = match node.kind() {
            NodeKind::ReferenceMark | NodeKind::ReferenceMarkStart => {
                self.reference_label(node.get_attribute("text:name")?)
            },
            NodeKind::Bookmark | NodeKind::BookmarkStart => self.bookmark_label(node.get_attribute("text:name")?),
            NodeKind::Sequence => self.sequence_label(node.get_attribute("text:ref-name")?),
            _ => return None,
        };
        Some(format!("\\label{{{}}}", label))
    }

    pub fn queue_label(&mut self, node: &'a Element) {
        self.pending.push(node);
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn take_pending(&mut self) -> Vec<&'a Element> {
        std::mem::take(&mut self.pending)
    }
}

impl<'a> ConverterPalette<'a> {
    /// Write a label now, or queue it if the context forbids labels.
    pub(crate) fn handle_label(&mut self, node: &'a Element, out: &mut DocumentPortion, ctx: &Context) {
        if ctx.labels_allowed() {
            if let Some(label) = self.fields.label_for(node) {
                out.append(&label);
            }
        } else {
            self.fields.queue_label(node);
        }
    }

    /// Write postponed labels if the context allows it.
    pub(crate) fn flush_labels(&mut self, out: &mut DocumentPortion, ctx: &Context) {
        if !ctx.labels_allowed() || !self.fields.has_pending() {
            return;
        }
        for node in self.fields.take_pending() {
            if let Some(label) = self.fields.label_for(node) {
                out.append(&label);
            }
        }
    }

    /// `text:sequence`: step the counter and show its value.
    pub(crate) fn handle_sequence(&mut self, node: &'a Element, out: &mut DocumentPortion, ctx: &Context) {
        if ctx.in_caption() {
            // \caption numbers itself; the label follows the caption
            return;
        }
        let name = node.get_attribute("text:name").unwrap_or("");
        let counter = if self.config.is_figure_sequence(name) {
            "figure".to_string()
        } else if self.config.is_table_sequence(name) {
            "table".to_string()
        } else {
            self.fields.sequence_counter(name)
        };
        let op = node
            .get_attribute("text:formula")
            .and_then(|f| CounterOp::parse(f, name))
            .unwrap_or(CounterOp::Step);
        out.append(&op.refstep(&counter));
        out.append(&counter_display(node.get_attribute("style:num-format"), &counter));
        if node.has_attribute("text:ref-name") {
            self.handle_label(node, out, ctx);
        }
    }

    /// Sequence, reference, bookmark and note references.
    pub(crate) fn handle_reference(&mut self, node: &'a Element, out: &mut DocumentPortion, _ctx: &Context) {
        let label = match node.kind() {
            NodeKind::SequenceRef => node.get_attribute("text:ref-name").map(|n| self.fields.sequence_label(n)),
            NodeKind::ReferenceRef => node.get_attribute("text:ref-name").map(|n| self.fields.reference_label(n)),
            NodeKind::BookmarkRef => node.get_attribute("text:ref-name").map(|n| self.fields.bookmark_label(n)),
            NodeKind::NoteRef => node.get_attribute("text:ref-name").map(|n| self.fields.note_label(n)),
            _ => None,
        };
        let text = node.text_content();
        let Some(label) = label else {
            out.append(&self.i18n.escape(&text));
            return;
        };
        match node.get_attribute("text:reference-format").unwrap_or("") {
            "page" => {
                out.append(&format!("\\pageref{{{}}}", label));
            },
            "text" | "caption" | "chapter" | "direction" => {
                out.append(&self.i18n.escape(&text));
            },
            "category-and-value" => {
                let category = text.trim_end_matches(|c: char| c.is_ascii_digit() || c.is_whitespace());
                let category = self.i18n.escape(category);
                out.append(&format!("{}~\\ref{{{}}}", category, label));
            },
            _ => {
                out.append(&format!("\\ref{{{}}}", label));
            },
        }
    }

    /// `text:a`: internal links to bookmarks and external URLs.
    pub(crate) fn handle_link(&mut self, node: &'a Element, out: &mut DocumentPortion, ctx: &Context) {
        let mut content = DocumentPortion::new();
        self.traverse_inline_nodes(node.children(), &mut content, ctx);
        let content = content.into_text(out);
        let href = node.get_attribute("xlink:href").unwrap_or("");
        if !self.config.use_hyperref || href.is_empty() {
            out.append(&content);
            return;
        }
        if let Some(target) = href.strip_prefix('#') {
            if target.contains('|') {
                // outline, table and frame targets have no bookmark label
                out.append(&content);
                return;
            }
            let label = self.fields.bookmark_label(target);
            out.append(&format!("\\hyperref[{}]{{{}}}", label, content));
        } else {
            out.append(&format!("\\href{{{}}}{{{}}}", escape_url(href), content));
        }
        out.require_package("hyperref");
    }

    /// Page numbers, chapter fields, document info and variables.
    pub(crate) fn handle_field(&mut self, node: &'a Element, out: &mut DocumentPortion, _ctx: &Context) {
        match node.kind() {
            NodeKind::PageNumber => {
                out.append("\\thepage{}");
            },
            NodeKind::PageCount => {
                if self.config.use_lastpage {
                    out.append("\\pageref{LastPage}").require_package("lastpage");
                } else {
                    let text = self.i18n.escape(&node.text_content());
                    out.append(&text);
                }
            },
            NodeKind::Chapter => {
                let level = node
                    .get_int_attribute("text:outline-level")
                    .map(|l| l.clamp(1, 10) as u8)
                    .unwrap_or(1);
                match (node.get_attribute("text:display"), self.config.heading_command(level)) {
                    (Some("number"), Some(command)) => {
                        out.append(&format!("\\the{}{{}}", command));
                    },
                    _ => {
                        let text = self.i18n.escape(&node.text_content());
                        out.append(&text);
                    },
                }
            },
            NodeKind::VariableSet if node.get_attribute("text:display") == Some("none") => {},
            _ => {
                let text = self.i18n.escape(&node.text_content());
                out.append(&text);
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_formulas() {
        let op = CounterOp::parse("ooow:42", "figure").unwrap();
        assert_eq!(op.refstep("figure"), "\\setcounter{figure}{41}\\refstepcounter{figure}");
        let op = CounterOp::parse("ooow:figure+1", "figure").unwrap();
        assert_eq!(op.refstep("figure"), "\\refstepcounter{figure}");
        let op = CounterOp::parse("ooow:figure+3", "figure").unwrap();
        assert_eq!(op.refstep("figure"), "\\addtocounter{figure}{2}\\refstepcounter{figure}");
        let op = CounterOp::parse("ooow:figure", "figure").unwrap();
        assert_eq!(op.refstep("figure"), "\\addtocounter{figure}{-1}\\refstepcounter{figure}");
        assert_eq!(CounterOp::parse("ooow:figure - 2", "figure"), Some(CounterOp::Add(-2)));
        assert_eq!(CounterOp::parse("ooow:other+1", "figure"), None);
        assert_eq!(CounterOp::parse("", "figure"), None);
    }

    #[test]
    fn test_extreme_counter_values_are_clamped() {
        let op = CounterOp::parse("ooow:-9223372036854775808", "figure").unwrap();
        assert_eq!(op, CounterOp::Set(-COUNTER_LIMIT));
        assert_eq!(op.preset("figure"), "\\setcounter{figure}{-2147483648}");
        let op = CounterOp::parse("ooow:figure+9223372036854775807", "figure").unwrap();
        assert_eq!(op, CounterOp::Add(COUNTER_LIMIT));
        assert_eq!(CounterOp::Set(i64::MIN).preset("c"), format!("\\setcounter{{c}}{{{}}}", i64::MIN));
    }

    #[test]
    fn test_counter_display() {
        assert_eq!(counter_display(Some("A"), "seqX"), "\\Alph{seqX}");
        assert_eq!(counter_display(None, "figure"), "\\thefigure{}");
    }

    #[test]
    fn test_labels_are_stable_and_prefixed() {
        let mut fields = FieldState::new();
        let mark = Element::new("text:reference-mark").with_attribute("text:name", "my mark");
        let first = fields.label_for(&mark).unwrap();
        assert_eq!(first, fields.label_for(&mark).unwrap());
        assert!(first.starts_with("\\label{ref:"));
        let bookmark = Element::new("text:bookmark").with_attribute("text:name", "my mark");
        assert!(fields.label_for(&bookmark).unwrap().starts_with("\\label{bkm:"));
        assert!(fields.label_for(&Element::new("text:span")).is_none());
    }

    #[test]
    fn test_sequence_counters_declared_once() {
        let mut fields = FieldState::new();
        let a = fields.sequence_counter("Equation");
        let b = fields.sequence_counter("Equation");
        assert_eq!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphabetic()));
        assert_eq!(fields.counter_declarations().count(), 1);
    }
}
