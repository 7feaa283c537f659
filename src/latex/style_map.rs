//! User style maps: literal markup that replaces generated formatting.
//!
//! Maps are keyed by a style's display name and loaded from configuration.
//! They are immutable during conversion.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What follows the `after` markup of a mapped paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakAfter {
    None,
    Line,
    #[default]
    Paragraph,
}

/// One style map entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleMapEntry {
    /// Markup emitted before the content
    pub before: String,
    /// Markup emitted after the content
    pub after: String,
    /// Block wrappers: display names of paragraph styles that continue the block
    pub next: Vec<String>,
    /// Block wrappers: block kinds that may appear inside without closing it
    /// (`list`, `table`, `section`, `index`, `drawing`)
    pub contents: Vec<String>,
    /// Content is emitted without escaping
    pub verbatim: bool,
    /// Hard line breaks inside the content are kept as line breaks
    pub line_break: bool,
    /// Block wrappers: a nested wrapper may open inside this one
    pub allows_nesting: bool,
    /// Block wrappers: `next` lists the styles that end the block instead of
    /// the ones that continue it
    pub negative: bool,
    pub break_after: BreakAfter,
}

impl Default for StyleMapEntry {
    fn default() -> Self {
        Self {
            before: String::new(),
            after: String::new(),
            next: Vec::new(),
            contents: Vec::new(),
            verbatim: false,
            line_break: true,
            allows_nesting: false,
            negative: false,
            break_after: BreakAfter::Paragraph,
        }
    }
}

impl StyleMapEntry {
    pub fn new(before: &str, after: &str) -> Self {
        Self {
            before: before.to_string(),
            after: after.to_string(),
            ..Self::default()
        }
    }

    pub fn with_next(mut self, next: &[&str]) -> Self {
        self.next = next.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_contents(mut self, contents: &[&str]) -> Self {
        self.contents = contents.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_verbatim(mut self, verbatim: bool) -> Self {
        self.verbatim = verbatim;
        self
    }

    pub fn with_negative(mut self, negative: bool) -> Self {
        self.negative = negative;
        self
    }

    pub fn with_allows_nesting(mut self, allows_nesting: bool) -> Self {
        self.allows_nesting = allows_nesting;
        self
    }

    pub fn with_line_break(mut self, line_break: bool) -> Self {
        self.line_break = line_break;
        self
    }

    pub fn with_break_after(mut self, break_after: BreakAfter) -> Self {
        self.break_after = break_after;
        self
    }

    /// May a paragraph of style `display_name` continue this block?
    pub fn permits_next(&self, display_name: &str) -> bool {
        self.next.iter().any(|n| n == display_name) != self.negative
    }

    /// May a block of `kind` appear inside this block?
    pub fn permits_contents(&self, kind: &str) -> bool {
        self.contents.iter().any(|c| c == kind)
    }
}

/// A style map for one family, keyed by display name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleMap {
    entries: BTreeMap<String, StyleMapEntry>,
}

impl StyleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, display_name: &str, entry: StyleMapEntry) {
        self.entries.insert(display_name.to_string(), entry);
    }

    /// Builder form of [`StyleMap::insert`]
    pub fn with(mut self, display_name: &str, entry: StyleMapEntry) -> Self {
        self.insert(display_name, entry);
        self
    }

    pub fn get(&self, display_name: &str) -> Option<&StyleMapEntry> {
        self.entries.get(display_name)
    }

    pub fn contains(&self, display_name: &str) -> bool {
        self.entries.contains_key(display_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &StyleMapEntry)> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// All user style maps, one per family.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleMaps {
    /// Paragraph styles: markup around each paragraph
    pub paragraph: StyleMap,
    /// Paragraph styles: markup around a run of consecutive paragraphs
    pub paragraph_block: StyleMap,
    /// Text styles
    pub text: StyleMap,
    /// List styles: markup around the whole list
    pub list: StyleMap,
    /// List styles: markup replacing the item label
    pub list_item: StyleMap,
    /// Paragraph styles of headings
    pub heading: StyleMap,
}

impl StyleMaps {
    /// Every map with its family label, for validation and diagnostics
    pub fn families(&self) -> [(&'static str, &StyleMap); 6] {
        [
            ("paragraph", &self.paragraph),
            ("paragraph_block", &self.paragraph_block),
            ("text", &self.text),
            ("list", &self.list),
            ("list_item", &self.list_item),
            ("heading", &self.heading),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_entry_permissions() {
        let entry = StyleMapEntry::new("\\begin{quote}", "\\end{quote}")
            .with_next(&["Quotations"])
            .with_contents(&["list"]);
        assert!(entry.permits_next("Quotations"));
        assert!(!entry.permits_next("Text body"));
        assert!(entry.permits_contents("list"));
        assert!(!entry.permits_contents("table"));
    }

    #[test]
    fn test_negative_next_list() {
        let entry = StyleMapEntry::new("\\begin{multicols}{2}", "\\end{multicols}")
            .with_next(&["Heading break"])
            .with_negative(true);
        assert!(entry.permits_next("Text body"));
        assert!(!entry.permits_next("Heading break"));
    }

    #[test]
    fn test_map_lookup() {
        let map = StyleMap::new().with("Code", StyleMapEntry::new("\\texttt{", "}").with_verbatim(true));
        assert!(map.contains("Code"));
        assert!(map.get("Code").unwrap().verbatim);
        assert!(map.get("Other").is_none());
    }
}
