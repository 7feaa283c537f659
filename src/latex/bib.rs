//! BibTeX database collected from bibliography marks and citation payloads.

use crate::odf::element::{Element, ElementBase};
use serde_json::Value;
use std::collections::BTreeMap;

/// ODF bibliography attributes and the BibTeX fields they fill
const MARK_FIELDS: &[(&str, &str)] = &[
    ("text:author", "author"),
    ("text:editor", "editor"),
    ("text:title", "title"),
    ("text:booktitle", "booktitle"),
    ("text:journal", "journal"),
    ("text:year", "year"),
    ("text:month", "month"),
    ("text:volume", "volume"),
    ("text:number", "number"),
    ("text:pages", "pages"),
    ("text:chapter", "chapter"),
    ("text:edition", "edition"),
    ("text:series", "series"),
    ("text:publisher", "publisher"),
    ("text:address", "address"),
    ("text:institution", "institution"),
    ("text:organizations", "organization"),
    ("text:school", "school"),
    ("text:howpublished", "howpublished"),
    ("text:report-type", "type"),
    ("text:isbn", "isbn"),
    ("text:issn", "issn"),
    ("text:url", "url"),
    ("text:note", "note"),
    ("text:annote", "annote"),
];

/// One BibTeX entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibEntry {
    pub key: String,
    pub entry_type: String,
    pub fields: BTreeMap<String, String>,
}

impl BibEntry {
    pub fn new(key: &str, entry_type: &str) -> Self {
        Self {
            key: key.to_string(),
            entry_type: entry_type.to_string(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: &str, value: &str) -> Self {
        self.set_field(name, value);
        self
    }

    pub fn set_field(&mut self, name: &str, value: &str) {
        let value = value.trim();
        if !value.is_empty() {
            self.fields.insert(name.to_string(), value.to_string());
        }
    }

    /// Entry from a `text:bibliography-mark`; `None` without an identifier.
    pub fn from_mark(mark: &Element) -> Option<Self> {
        let key = mark.get_attribute("text:identifier").filter(|k| !k.trim().is_empty())?;
        let entry_type = match mark.get_attribute("text:bibliography-type").unwrap_or("misc") {
            "journal" => "article",
            "conference" => "inproceedings",
            t @ ("article" | "book" | "booklet" | "inbook" | "incollection" | "inproceedings" | "manual"
            | "mastersthesis" | "phdthesis" | "proceedings" | "techreport" | "unpublished") => t,
            _ => "misc",
        };
        let mut entry = BibEntry::new(key.trim(), entry_type);
        for (attribute, field) in MARK_FIELDS {
            if let Some(value) = mark.get_attribute(attribute) {
                let value = if matches!(*field, "author" | "editor") {
                    join_names(value.split(';'))
                } else {
                    value.to_string()
                };
                entry.set_field(field, &value);
            }
        }
        Some(entry)
    }

    /// Entry from a CSL-JSON item (as embedded in Zotero citations).
    pub fn from_csl(item: &Value) -> Option<Self> {
        let key = csl_key(item)?;
        let entry_type = match item.get("type").and_then(Value::as_str).unwrap_or("") {
            "article-journal" | "article-magazine" | "article-newspaper" | "article" => "article",
            "book" => "book",
            "chapter" => "incollection",
            "paper-conference" => "inproceedings",
            "thesis" => "phdthesis",
            "report" => "techreport",
            "manuscript" => "unpublished",
            _ => "misc",
        };
        let mut entry = BibEntry::new(&key, entry_type);
        let text = |name: &str| item.get(name).and_then(csl_text);
        if let Some(title) = text("title") {
            entry.set_field("title", &title);
        }
        if let Some(container) = text("container-title") {
            let field = if entry_type == "article" { "journal" } else { "booktitle" };
            entry.set_field(field, &container);
        }
        for (csl, field) in [
            ("publisher", "publisher"),
            ("publisher-place", "address"),
            ("page", "pages"),
            ("volume", "volume"),
            ("issue", "number"),
            ("edition", "edition"),
            ("DOI", "doi"),
            ("URL", "url"),
            ("ISBN", "isbn"),
            ("ISSN", "issn"),
            ("note", "note"),
        ] {
            if let Some(value) = text(csl) {
                entry.set_field(field, &value);
            }
        }
        for (csl, field) in [("author", "author"), ("editor", "editor")] {
            if let Some(Value::Array(names)) = item.get(csl) {
                let names: Vec<String> = names.iter().filter_map(csl_name).collect();
                entry.set_field(field, &join_names(names.iter().map(String::as_str)));
            }
        }
        if let Some(year) = csl_year(item) {
            entry.set_field("year", &year.to_string());
        }
        Some(entry)
    }

    /// BibTeX source of the entry
    pub fn to_bibtex(&self) -> String {
        let mut out = format!("@{}{{{},\n", self.entry_type, self.key);
        for (name, value) in &self.fields {
            out.push_str("  ");
            out.push_str(name);
            out.push_str(" = {");
            out.push_str(&escape_value(value));
            out.push_str("},\n");
        }
        out.push_str("}\n");
        out
    }
}

/// Citation key for a CSL item: first author's family name plus year,
/// falling back to the item id.
pub fn csl_key(item: &Value) -> Option<String> {
    let family = item
        .get("author")
        .and_then(Value::as_array)
        .and_then(|authors| authors.first())
        .and_then(|a| a.get("family").or_else(|| a.get("literal")))
        .and_then(Value::as_str)
        .map(|f| f.chars().filter(char::is_ascii_alphanumeric).collect::<String>().to_lowercase())
        .filter(|f| !f.is_empty());
    let year = csl_year(item);
    match (family, year) {
        (Some(family), Some(year)) => Some(format!("{}{}", family, year)),
        (Some(family), None) => Some(family),
        _ => {
            let id = item.get("id")?;
            let id = match id {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            let id: String = id.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
            if id.is_empty() { None } else { Some(format!("item{}", id)) }
        },
    }
}

fn csl_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn csl_name(name: &Value) -> Option<String> {
    if let Some(literal) = name.get("literal").and_then(Value::as_str) {
        return Some(literal.to_string());
    }
    let family = name.get("family").and_then(Value::as_str)?;
    match name.get("given").and_then(Value::as_str) {
        Some(given) => Some(format!("{}, {}", family, given)),
        None => Some(family.to_string()),
    }
}

fn csl_year(item: &Value) -> Option<i64> {
    let issued = item.get("issued")?;
    let first = issued.get("date-parts")?.get(0)?.get(0)?;
    match first {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn join_names<'s>(names: impl Iterator<Item = &'s str>) -> String {
    names
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .collect::<Vec<_>>()
        .join(" and ")
}

fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' | '%' | '$' | '#' | '_' => {
                out.push('\\');
                out.push(ch);
            },
            '{' | '}' | '\\' => {},
            c if c.is_control() => out.push(' '),
            c => out.push(c),
        }
    }
    out
}

/// All entries cited in one document, keyed by citation key.
#[derive(Debug, Clone, Default)]
pub struct BibDatabase {
    entries: BTreeMap<String, BibEntry>,
}

impl BibDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry; the first entry for a key wins.
    pub fn add(&mut self, entry: BibEntry) {
        self.entries.entry(entry.key.clone()).or_insert(entry);
    }

    pub fn get(&self, key: &str) -> Option<&BibEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_bibtex(&self) -> String {
        self.entries
            .values()
            .map(BibEntry::to_bibtex)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_from_mark() {
        let mark = Element::new("text:bibliography-mark")
            .with_attribute("text:identifier", "Knuth84")
            .with_attribute("text:bibliography-type", "book")
            .with_attribute("text:author", "Knuth, Donald; Bibby, Duane")
            .with_attribute("text:title", "The TeXbook")
            .with_attribute("text:year", "1984");
        let entry = BibEntry::from_mark(&mark).unwrap();
        assert_eq!(entry.entry_type, "book");
        assert_eq!(entry.fields["author"], "Knuth, Donald and Bibby, Duane");
        assert_eq!(
            entry.to_bibtex(),
            "@book{Knuth84,\n  author = {Knuth, Donald and Bibby, Duane},\n  title = {The TeXbook},\n  year = {1984},\n}\n"
        );
        assert!(BibEntry::from_mark(&Element::new("text:bibliography-mark")).is_none());
    }

    #[test]
    fn test_entry_from_csl() {
        let item: Value = serde_json::from_str(
            r#"{"id": 7, "type": "article-journal", "title": "On Things & Stuff",
                "container-title": "Journal", "author": [{"family": "O'Neil", "given": "Ann"}],
                "issued": {"date-parts": [["2019", 3]]}}"#,
        )
        .unwrap();
        assert_eq!(csl_key(&item).as_deref(), Some("oneil2019"));
        let entry = BibEntry::from_csl(&item).unwrap();
        assert_eq!(entry.entry_type, "article");
        assert_eq!(entry.fields["journal"], "Journal");
        assert_eq!(entry.fields["author"], "O'Neil, Ann");
        assert!(entry.to_bibtex().contains("title = {On Things \\& Stuff}"));
    }

    #[test]
    fn test_csl_key_falls_back_to_id() {
        let item: Value = serde_json::from_str(r#"{"id": "http://x/42", "title": "Anonymous"}"#).unwrap();
        assert_eq!(csl_key(&item).as_deref(), Some("itemhttpx42"));
    }

    #[test]
    fn test_database_first_entry_wins() {
        let mut db = BibDatabase::new();
        db.add(BibEntry::new("a", "misc").with_field("title", "First"));
        db.add(BibEntry::new("a", "misc").with_field("title", "Second"));
        db.add(BibEntry::new("b", "book"));
        assert_eq!(db.len(), 2);
        assert_eq!(db.get("a").unwrap().fields["title"], "First");
        assert!(db.to_bibtex().starts_with("@misc{a,"));
    }
}
