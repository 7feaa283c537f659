//! Export name collections.
//!
//! Source identifiers (style names, bookmark names, reference marks) may
//! contain characters that are illegal in LaTeX labels or command names. An
//! [`ExportNameCollection`] maps each source identifier to a sanitized name,
//! stable for the whole conversion and never shared by two identifiers.

use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct ExportNameCollection {
    names: HashMap<String, String>,
    used: HashSet<String>,
    letters_only: bool,
}

impl ExportNameCollection {
    /// `letters_only` produces names usable in control sequences
    /// (`\textstyleEmphasis`); otherwise names may also contain digits and
    /// `-:.` as allowed in `\label` keys.
    pub fn new(letters_only: bool) -> Self {
        Self {
            letters_only,
            ..Self::default()
        }
    }

    /// Sanitized name for `source`, allocating one on first use.
    pub fn get_export_name(&mut self, source: &str) -> String {
        if let Some(name) = self.names.get(source) {
            return name.clone();
        }
        let base = self.sanitize(source);
        let mut candidate = base.clone();
        let mut counter: u32 = 1;
        while self.used.contains(&candidate) {
            counter += 1;
            candidate = format!("{}{}", base, self.suffix(counter));
        }
        self.used.insert(candidate.clone());
        self.names.insert(source.to_string(), candidate.clone());
        candidate
    }

    /// Has `source` been assigned a name?
    pub fn contains(&self, source: &str) -> bool {
        self.names.contains_key(source)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn sanitize(&self, source: &str) -> String {
        let mut out = String::with_capacity(source.len());
        let mut upper_next = false;
        for ch in source.chars() {
            if ch.is_ascii_alphabetic() {
                if upper_next {
                    out.push(ch.to_ascii_uppercase());
                } else {
                    out.push(ch);
                }
                upper_next = false;
            } else if ch.is_ascii_digit() {
                if self.letters_only {
                    out.push((b'A' + (ch as u8 - b'0')) as char);
                } else {
                    out.push(ch);
                }
                upper_next = false;
            } else if !self.letters_only && matches!(ch, '-' | ':' | '.') {
                out.push(ch);
            } else {
                upper_next = self.letters_only;
                if !self.letters_only && !out.ends_with('-') && !out.is_empty() {
                    out.push('-');
                }
            }
        }
        if !self.letters_only {
            while out.ends_with('-') {
                out.pop();
            }
        }
        if out.is_empty() {
            out.push('x');
        }
        out
    }

    /// Disambiguating suffix; letters only if the collection requires it.
    fn suffix(&self, counter: u32) -> String {
        if !self.letters_only {
            let mut buf = itoa::Buffer::new();
            return format!("-{}", buf.format(counter));
        }
        let mut n = counter;
        let mut letters = Vec::new();
        while n > 0 {
            let rem = ((n - 1) % 26) as u8;
            letters.push((b'a' + rem) as char);
            n = (n - 1) / 26;
        }
        letters.iter().rev().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_letters_only() {
        let mut names = ExportNameCollection::new(true);
        assert_eq!(names.get_export_name("Text body"), "TextBody");
        assert_eq!(names.get_export_name("Heading 1"), "HeadingB");
        assert_eq!(names.get_export_name("Text body"), "TextBody");
        assert_eq!(names.get_export_name("Text  body"), "TextBodyb");
    }

    #[test]
    fn test_sanitize_labels() {
        let mut names = ExportNameCollection::new(false);
        assert_eq!(names.get_export_name("ref 1/a"), "ref-1-a");
        assert_eq!(names.get_export_name("ref 1 a"), "ref-1-a-2");
        assert_eq!(names.get_export_name("__"), "x");
        assert_eq!(names.len(), 3);
    }
}
