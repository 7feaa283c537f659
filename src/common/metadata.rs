//! Document metadata from `meta.xml`.
//!
//! Only the Dublin Core fields the converter emits into the preamble are kept.
use serde::{Deserialize, Serialize};

/// Unified document metadata structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Metadata {
    /// Document title (`dc:title`)
    pub title: Option<String>,
    /// Document subject (`dc:subject`)
    pub subject: Option<String>,
    /// Document author (`dc:creator` or `meta:initial-creator`)
    pub author: Option<String>,
    /// Keywords (`meta:keyword`, joined with commas)
    pub keywords: Option<String>,
    /// Description (`dc:description`)
    pub description: Option<String>,
    /// Date as written in the document (`dc:date`), ISO 8601
    pub date: Option<String>,
    /// Document language (`dc:language`)
    pub language: Option<String>,
}

impl Metadata {
    /// Check if the metadata contains any actual data.
    pub fn has_data(&self) -> bool {
        self.title.is_some()
            || self.subject.is_some()
            || self.author.is_some()
            || self.keywords.is_some()
            || self.description.is_some()
            || self.date.is_some()
            || self.language.is_some()
    }

    /// Date part (`YYYY-MM-DD`) of the document date, if present.
    pub fn date_only(&self) -> Option<&str> {
        self.date.as_deref().map(|d| d.split('T').next().unwrap_or(d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_only_strips_time() {
        let meta = Metadata {
            date: Some("2024-05-01T10:20:30".to_string()),
            ..Default::default()
        };
        assert!(meta.has_data());
        assert_eq!(meta.date_only(), Some("2024-05-01"));
    }
}
