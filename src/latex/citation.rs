//! Citations carried in reference mark names.
//!
//! Reference managers store a citation as a reference mark whose name holds
//! the payload: Zotero writes `ZOTERO_ITEM CSL_CITATION {json} RND…`, JabRef
//! writes `JR_cite<n>_<key>,<key>`. A payload that cannot be read is not a
//! citation and the mark converts as a plain label.

use super::bib::{BibDatabase, BibEntry, csl_key};
use super::config::LatexConfig;
use super::context::Context;
use super::i18n::comment_text;
use super::palette::ConverterPalette;
use super::portion::DocumentPortion;
use crate::odf::element::{Element, ElementBase, Node};
use crate::odf::node::NodeKind;
use serde_json::Value;

const ZOTERO_PREFIX: &str = "ZOTERO_ITEM";
const JABREF_PREFIX: &str = "JR_cite";

/// A recognised citation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Citation {
    pub keys: Vec<String>,
    pub prefix: Option<String>,
    pub locator: Option<String>,
}

impl Citation {
    /// `\cite` command; prefix and locator are already escaped.
    ///
    /// Only a single-item citation keeps its prefix and locator, using the
    /// natbib two-optional-argument form when a prefix is present.
    pub fn to_latex(&self) -> String {
        let keys = self.keys.join(",");
        if self.keys.len() == 1 {
            match (&self.prefix, &self.locator) {
                (Some(prefix), locator) => {
                    return format!(
                        "\\cite[{}][{}]{{{}}}",
                        prefix,
                        locator.as_deref().unwrap_or(""),
                        keys
                    );
                },
                (None, Some(locator)) => return format!("\\cite[{}]{{{}}}", locator, keys),
                (None, None) => {},
            }
        }
        format!("\\cite{{{}}}", keys)
    }

    /// Does the command need natbib?
    pub fn needs_natbib(&self) -> bool {
        self.keys.len() == 1 && self.prefix.is_some()
    }
}

/// Recognise a citation payload in a reference mark name.
///
/// Zotero items are added to `bib` so they end up in the BibTeX artifact.
pub fn recognize(name: &str, config: &LatexConfig, bib: &mut BibDatabase) -> Option<Citation> {
    if config.zotero_citations && name.starts_with(ZOTERO_PREFIX) {
        let citation = parse_zotero(name, bib);
        if citation.is_none() {
            log::warn!("Malformed Zotero citation payload in reference mark");
        }
        return citation;
    }
    if config.jabref_citations && name.starts_with(JABREF_PREFIX) {
        let citation = parse_jabref(name);
        if citation.is_none() {
            log::warn!("Malformed JabRef citation mark '{}'", name);
        }
        return citation;
    }
    None
}

/// Parse a Zotero payload: the JSON object between the first `{` and the
/// last `}` of the name.
pub fn parse_zotero(name: &str, bib: &mut BibDatabase) -> Option<Citation> {
    let start = name.find('{')?;
    let end = name.rfind('}')?;
    if end <= start {
        return None;
    }
    let payload: Value = serde_json::from_str(&name[start..=end])
        .map_err(|e| log::debug!("Zotero payload is not JSON: {}", e))
        .ok()?;
    let items = payload.get("citationItems")?.as_array()?;
    let mut citation = Citation::default();
    for item in items {
        let Some(data) = item.get("itemData") else {
            continue;
        };
        let Some(key) = csl_key(data) else {
            continue;
        };
        if let Some(entry) = BibEntry::from_csl(data) {
            bib.add(entry);
        }
        if items.len() == 1 {
            citation.prefix = non_empty(item.get("prefix"));
            citation.locator = non_empty(item.get("locator"));
        }
        citation.keys.push(key);
    }
    if citation.keys.is_empty() {
        return None;
    }
    Some(citation)
}

fn non_empty(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if text.is_empty() { None } else { Some(text) }
}

/// Parse a JabRef mark name: `JR_cite<n>_<k1>,<k2>` (the underscore after
/// `cite` is optional).
pub fn parse_jabref(name: &str) -> Option<Citation> {
    let rest = name.strip_prefix(JABREF_PREFIX)?;
    let rest = rest.strip_prefix('_').unwrap_or(rest);
    let digits = rest.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let keys = rest[digits..].strip_prefix('_')?;
    let keys: Vec<String> = keys
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect();
    if keys.is_empty() {
        return None;
    }
    Some(Citation {
        keys,
        ..Citation::default()
    })
}

/// Index of the reference mark end matching the start at `start`.
fn matching_end(nodes: &[Node], start: usize, name: &str) -> Option<usize> {
    nodes.iter().enumerate().skip(start + 1).find_map(|(i, node)| {
        let e = node.as_element()?;
        (e.kind() == NodeKind::ReferenceMarkEnd && e.get_attribute("text:name") == Some(name)).then_some(i)
    })
}

impl<'a> ConverterPalette<'a> {
    /// Reference mark at `nodes[index]`; returns the index of the next node
    /// to convert.
    ///
    /// A recognised citation replaces the text it spans, which the reference
    /// manager rendered and which is dropped (or kept as a comment).
    pub(crate) fn handle_reference_mark(
        &mut self,
        nodes: &'a [Node],
        index: usize,
        out: &mut DocumentPortion,
        ctx: &Context,
    ) -> usize {
        let Some(mark) = nodes[index].as_element() else {
            return index + 1;
        };
        let name = mark.get_attribute("text:name").unwrap_or("");
        let Some(mut citation) = recognize(name, self.config, &mut self.bib) else {
            self.handle_label(mark, out, ctx);
            return index + 1;
        };
        citation.prefix = citation.prefix.map(|p| self.i18n.escape(&p));
        citation.locator = citation.locator.map(|l| self.i18n.escape(&l));
        out.append(&citation.to_latex());
        if citation.needs_natbib() {
            out.require_package("natbib");
        }
        if mark.kind() != NodeKind::ReferenceMarkStart {
            return index + 1;
        }
        let Some(end) = matching_end(nodes, index, name) else {
            log::debug!("Citation mark without end");
            return index + 1;
        };
        let previous = self.fields.citation_text.replace(String::new());
        let mut scratch = DocumentPortion::new();
        self.traverse_inline_nodes(&nodes[index + 1..end], &mut scratch, &ctx.with_in_citation_text(true));
        let text = std::mem::replace(&mut self.fields.citation_text, previous).unwrap_or_default();
        if self.config.include_original_citations {
            let text = comment_text(&text);
            if !text.is_empty() {
                out.append(&format!("% {}", text)).newline();
            }
        }
        end + 1
    }

    /// `text:bibliography-mark`
    pub(crate) fn handle_bibliography_mark(&mut self, node: &'a Element, out: &mut DocumentPortion, _ctx: &Context) {
        let Some(entry) = BibEntry::from_mark(node) else {
            let text = self.i18n.escape(&node.text_content());
            out.append(&text);
            return;
        };
        if self.config.use_bibtex {
            out.append(&format!("\\cite{{{}}}", entry.key));
            self.bib.add(entry);
        } else {
            let text = self.i18n.escape(&format!("[{}]", entry.key));
            out.append(&text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZOTERO: &str = r#"ZOTERO_ITEM CSL_CITATION {"citationID":"a1","citationItems":[{"id":3,"locator":"12","prefix":"see","itemData":{"id":3,"type":"book","title":"Signs","author":[{"family":"Eco","given":"Umberto"}],"issued":{"date-parts":[[1976]]}}}]} RND8sd0"#;

    #[test]
    fn test_zotero_single_item() {
        let mut bib = BibDatabase::new();
        let citation = recognize(ZOTERO, &LatexConfig::default(), &mut bib).unwrap();
        assert_eq!(citation.keys, ["eco1976"]);
        assert_eq!(citation.to_latex(), "\\cite[see][12]{eco1976}");
        assert!(citation.needs_natbib());
        assert_eq!(bib.get("eco1976").unwrap().entry_type, "book");
    }

    #[test]
    fn test_malformed_zotero_payload() {
        let mut bib = BibDatabase::new();
        assert!(recognize("ZOTERO_ITEM CSL_CITATION {broken RND1", &LatexConfig::default(), &mut bib).is_none());
        assert!(recognize("ZOTERO_ITEM {\"citationItems\":[]}", &LatexConfig::default(), &mut bib).is_none());
        assert!(bib.is_empty());
    }

    #[test]
    fn test_jabref_marks() {
        let citation = parse_jabref("JR_cite1_knuth84,lamport94").unwrap();
        assert_eq!(citation.to_latex(), "\\cite{knuth84,lamport94}");
        assert_eq!(parse_jabref("JR_cite_2_x").unwrap().keys, ["x"]);
        assert!(parse_jabref("JR_cite_x").is_none());
        assert!(parse_jabref("JR_cite3_").is_none());
    }

    #[test]
    fn test_disabled_recognition() {
        let config = LatexConfig {
            jabref_citations: false,
            ..LatexConfig::default()
        };
        let mut bib = BibDatabase::new();
        assert!(recognize("JR_cite1_a", &config, &mut bib).is_none());
        assert!(recognize("plain mark", &LatexConfig::default(), &mut bib).is_none());
    }

    #[test]
    fn test_matching_end() {
        let paragraph = Element::new("text:p")
            .with_child(Element::new("text:reference-mark-start").with_attribute("text:name", "a"))
            .with_text("x")
            .with_child(Element::new("text:reference-mark-end").with_attribute("text:name", "b"))
            .with_child(Element::new("text:reference-mark-end").with_attribute("text:name", "a"));
        assert_eq!(matching_end(paragraph.children(), 0, "a"), Some(3));
        assert_eq!(matching_end(paragraph.children(), 0, "c"), None);
    }

    #[test]
    fn test_locator_only() {
        let citation = Citation {
            keys: vec!["k".to_string()],
            prefix: None,
            locator: Some("p. 4".to_string()),
        };
        assert_eq!(citation.to_latex(), "\\cite[p. 4]{k}");
    }
}
