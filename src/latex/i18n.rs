//! Languages, encodings and text escaping.
//!
//! [`I18n`] owns the substitution table for the configured encoding profile,
//! a stack of font-specific tables pushed around styled runs, and the set of
//! languages seen in the document (written as `babel` options).

use super::config::{Backend, InputEncoding, LatexConfig};
use super::context::Context;
use super::pacman::Pacman;
use super::unicode::{Encodings, SubstitutionTable, TEXT_SUBSTITUTIONS, symbol_font_char};
use phf::{Map, phf_map};
use std::collections::BTreeSet;

/// ISO 639 language code → babel language name.
static BABEL_LANGUAGES: Map<&'static str, &'static str> = phf_map! {
    "en" => "english",
    "de" => "ngerman",
    "fr" => "french",
    "es" => "spanish",
    "it" => "italian",
    "pt" => "portuguese",
    "nl" => "dutch",
    "da" => "danish",
    "sv" => "swedish",
    "nb" => "norsk",
    "no" => "norsk",
    "nn" => "nynorsk",
    "fi" => "finnish",
    "is" => "icelandic",
    "pl" => "polish",
    "cs" => "czech",
    "sk" => "slovak",
    "sl" => "slovene",
    "hr" => "croatian",
    "hu" => "magyar",
    "ro" => "romanian",
    "tr" => "turkish",
    "ca" => "catalan",
    "gl" => "galician",
    "eu" => "basque",
    "et" => "estonian",
    "lt" => "lithuanian",
    "lv" => "latvian",
    "ga" => "irish",
    "cy" => "welsh",
    "la" => "latin",
    "eo" => "esperanto",
    "el" => "greek",
    "ru" => "russian",
    "uk" => "ukrainian",
};

/// Region-specific babel names that override the language default.
static BABEL_REGIONS: Map<&'static str, &'static str> = phf_map! {
    "en-US" => "american",
    "en-GB" => "british",
    "en-AU" => "australian",
    "en-CA" => "canadian",
    "de-AT" => "naustrian",
    "de-CH" => "nswissgerman",
    "pt-BR" => "brazil",
    "fr-CA" => "canadien",
};

/// Babel name for a language tag such as `de` or `en-US`.
pub fn babel_language(tag: &str) -> Option<&'static str> {
    if let Some(name) = BABEL_REGIONS.get(tag) {
        return Some(name);
    }
    let language = tag.split(['-', '_']).next().unwrap_or(tag);
    BABEL_LANGUAGES.get(language.to_ascii_lowercase().as_str()).copied()
}

/// Font family names whose code points are symbols, not letters.
pub fn is_symbol_font(family: &str) -> bool {
    matches!(
        family.to_ascii_lowercase().as_str(),
        "symbol" | "opensymbol" | "starsymbol" | "standard symbols l" | "standard symbols ps"
    )
}

/// Encoding capabilities for a configuration.
pub fn encodings_for(config: &LatexConfig) -> Encodings {
    let mut caps = Encodings::ASCII | Encodings::T1 | Encodings::TEXTCOMP;
    match config.backend {
        Backend::Xetex => caps |= Encodings::UNICODE | Encodings::UTF8,
        Backend::Pdftex => match config.inputencoding {
            InputEncoding::Utf8 => caps |= Encodings::UTF8,
            InputEncoding::Latin1 => caps |= Encodings::LATIN1,
            InputEncoding::Ascii => {},
        },
    }
    caps
}

#[derive(Debug, Clone)]
pub struct I18n {
    table: SubstitutionTable,
    font_stack: Vec<bool>,
    languages: BTreeSet<&'static str>,
    default_language: Option<&'static str>,
    packages: Vec<&'static str>,
    backend: Backend,
    inputencoding: InputEncoding,
}

impl I18n {
    pub fn new(config: &LatexConfig) -> Self {
        Self {
            table: SubstitutionTable::new(TEXT_SUBSTITUTIONS, encodings_for(config)),
            font_stack: Vec::new(),
            languages: BTreeSet::new(),
            default_language: None,
            packages: Vec::new(),
            backend: config.backend,
            inputencoding: config.inputencoding,
        }
    }

    /// Convert text for the given context.
    ///
    /// Verbatim and math contexts pass text through unchanged.
    pub fn convert(&mut self, text: &str, ctx: &Context) -> String {
        if ctx.verbatim() || ctx.math_mode() {
            return text.to_string();
        }
        if self.font_stack.last().copied().unwrap_or(false) {
            let mut out = String::with_capacity(text.len());
            let mut buf = [0u8; 4];
            for ch in text.chars() {
                match symbol_font_char(ch) {
                    Some(latex) => out.push_str(latex),
                    None => out.push_str(&self.table.convert(ch.encode_utf8(&mut buf), &mut self.packages)),
                }
            }
            return out;
        }
        self.table.convert(text, &mut self.packages)
    }

    /// Escape text in ordinary context (labels, captions, plain fields)
    pub fn escape(&mut self, text: &str) -> String {
        self.table.convert(text, &mut self.packages)
    }

    /// Select the special table for a run set in `family` (None keeps the
    /// current table active).
    pub fn push_special_table(&mut self, family: Option<&str>) {
        let symbol = match family {
            Some(family) => is_symbol_font(family),
            None => self.font_stack.last().copied().unwrap_or(false),
        };
        self.font_stack.push(symbol);
    }

    pub fn pop_special_table(&mut self) {
        self.font_stack.pop();
    }

    /// Record a language used in the document; returns its babel name.
    pub fn use_language(&mut self, tag: &str) -> Option<&'static str> {
        let name = babel_language(tag)?;
        self.languages.insert(name);
        Some(name)
    }

    /// Main document language (written last in the babel options)
    pub fn set_default_language(&mut self, tag: &str) {
        self.default_language = self.use_language(tag);
    }

    /// Markup switching from `current` to `requested` language, if needed.
    pub fn language_switch(&mut self, current: Option<&str>, requested: Option<&str>) -> Option<(String, String)> {
        let requested = requested?;
        let new_name = self.use_language(requested)?;
        let current_name = current
            .and_then(babel_language)
            .or(self.default_language);
        if current_name == Some(new_name) {
            return None;
        }
        Some((format!("\\foreignlanguage{{{}}}{{", new_name), "}".to_string()))
    }

    /// Write encoding and language packages.
    pub fn write_preamble(&self, pacman: &mut Pacman) {
        match self.backend {
            Backend::Pdftex => {
                pacman.use_package_with("fontenc", "T1");
                if self.inputencoding != InputEncoding::Ascii {
                    pacman.use_package_with("inputenc", self.inputencoding.inputenc_option());
                }
                pacman.use_package("textcomp");
            },
            Backend::Xetex => {
                pacman.use_package("fontspec");
            },
        }
        if !self.languages.is_empty() {
            let mut options: Vec<&str> = self
                .languages
                .iter()
                .copied()
                .filter(|l| Some(*l) != self.default_language)
                .collect();
            if let Some(main) = self.default_language {
                options.push(main);
            }
            pacman.use_package_with("babel", &options.join(","));
        }
        for package in &self.packages {
            pacman.use_package(package);
        }
    }
}

/// Escape a URL for `\href` and `\url`.
pub fn escape_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for ch in url.chars() {
        match ch {
            '%' | '#' | '{' | '}' => {
                out.push('\\');
                out.push(ch);
            },
            '\\' => out.push('/'),
            _ => out.push(ch),
        }
    }
    out
}

/// Text safe to put after a `%` comment marker.
pub fn comment_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_babel_names() {
        assert_eq!(babel_language("de"), Some("ngerman"));
        assert_eq!(babel_language("en-US"), Some("american"));
        assert_eq!(babel_language("en-IE"), Some("english"));
        assert_eq!(babel_language("xx"), None);
    }

    #[test]
    fn test_symbol_table_stack() {
        let mut i18n = I18n::new(&LatexConfig::default());
        let ctx = Context::new();
        i18n.push_special_table(Some("OpenSymbol"));
        assert_eq!(i18n.convert("a&", &ctx), "\\ensuremath{\\alpha}\\&");
        i18n.push_special_table(None);
        assert_eq!(i18n.convert("b", &ctx), "\\ensuremath{\\beta}");
        i18n.pop_special_table();
        i18n.pop_special_table();
        assert_eq!(i18n.convert("a&", &ctx), "a\\&");
        assert_eq!(i18n.convert("a&", &ctx.with_verbatim(true)), "a&");
    }

    #[test]
    fn test_language_switch_and_preamble() {
        let mut i18n = I18n::new(&LatexConfig::default());
        i18n.set_default_language("en-US");
        assert!(i18n.language_switch(None, Some("en-US")).is_none());
        let (before, after) = i18n.language_switch(Some("en-US"), Some("de")).unwrap();
        assert_eq!(before, "\\foreignlanguage{ngerman}{");
        assert_eq!(after, "}");
        let mut pacman = Pacman::new();
        i18n.write_preamble(&mut pacman);
        let out = pacman.into_portion().to_string();
        assert!(out.contains("\\usepackage[T1]{fontenc}"));
        assert!(out.contains("\\usepackage[utf8]{inputenc}"));
        assert!(out.contains("\\usepackage[ngerman,american]{babel}"));
    }

    #[test]
    fn test_escape_url() {
        assert_eq!(escape_url("http://x.org/a%20b#c"), "http://x.org/a\\%20b\\#c");
    }
}
