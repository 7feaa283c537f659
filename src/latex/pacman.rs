//! Package accumulator for the preamble.
//!
//! Package loads without options are batched and written as one
//! `\usepackage{a,b,c}` statement. The batch is flushed before any other
//! text is appended, so a package is always declared before the preamble
//! code that depends on it.

use super::portion::{DocumentPortion, PackageRequest};
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct Pacman {
    portion: DocumentPortion,
    batch: Vec<String>,
    loaded: HashSet<String>,
}

impl Pacman {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a package without options.
    pub fn use_package(&mut self, name: &str) -> &mut Self {
        if self.loaded.insert(name.to_string()) {
            self.batch.push(name.to_string());
        }
        self
    }

    /// Request a package with options; written immediately.
    ///
    /// A package already loaded is not loaded again, options included.
    pub fn use_package_with(&mut self, name: &str, options: &str) -> &mut Self {
        if options.is_empty() {
            return self.use_package(name);
        }
        if self.loaded.insert(name.to_string()) {
            self.flush();
            self.portion
                .append("\\usepackage[")
                .append(options)
                .append("]{")
                .append(name)
                .append("}")
                .newline();
        }
        self
    }

    /// Request every package in `requests`, in order.
    pub fn use_requests(&mut self, requests: &[PackageRequest]) -> &mut Self {
        for request in requests {
            match &request.options {
                Some(options) => self.use_package_with(&request.name, options),
                None => self.use_package(&request.name),
            };
        }
        self
    }

    /// Append literal preamble text after flushing the batch.
    pub fn append(&mut self, text: &str) -> &mut Self {
        self.flush();
        self.portion.append(text);
        self
    }

    /// Append a portion after flushing the batch.
    pub fn append_portion(&mut self, portion: DocumentPortion) -> &mut Self {
        self.flush();
        self.portion.append_portion(portion);
        self
    }

    pub fn newline(&mut self) -> &mut Self {
        self.flush();
        self.portion.ensure_newline();
        self
    }

    /// Write the pending batch as one statement.
    pub fn flush(&mut self) {
        if self.batch.is_empty() {
            return;
        }
        self.portion.ensure_newline();
        self.portion
            .append("\\usepackage{")
            .append(&self.batch.join(","))
            .append("}")
            .newline();
        self.batch.clear();
    }

    pub fn into_portion(mut self) -> DocumentPortion {
        self.flush();
        self.portion
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batches_plain_packages() {
        let mut pacman = Pacman::new();
        pacman.use_package("amsmath").use_package("graphicx").use_package("amsmath");
        pacman.append("\\newcommand\\x{1}").newline();
        let out = pacman.into_portion().to_string();
        assert_eq!(out, "\\usepackage{amsmath,graphicx}\n\\newcommand\\x{1}\n");
    }

    #[test]
    fn test_options_flush_batch_first() {
        let mut pacman = Pacman::new();
        pacman.use_package("ulem");
        pacman.use_package_with("geometry", "a4paper");
        pacman.use_package_with("geometry", "letterpaper");
        let out = pacman.into_portion().to_string();
        assert_eq!(out, "\\usepackage{ulem}\n\\usepackage[a4paper]{geometry}\n");
    }

    #[test]
    fn test_declarations_precede_text() {
        let mut pacman = Pacman::new();
        pacman.append("% start").newline();
        pacman.use_package("xcolor");
        pacman.append("\\definecolor{c}{rgb}{1,0,0}");
        let out = pacman.into_portion().to_string();
        let pkg = out.find("\\usepackage{xcolor}").unwrap();
        let def = out.find("\\definecolor").unwrap();
        assert!(pkg < def);
    }
}
