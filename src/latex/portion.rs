//! Append-only markup buffer.
//!
//! A [`DocumentPortion`] holds lines of LaTeX source together with the
//! packages the content needs. Portions compose: appending one portion to
//! another joins the first line of the appended portion to the current line
//! and merges the package requests.

use std::fmt;

/// A package needed by some content, with optional load options.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageRequest {
    pub name: String,
    pub options: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Line {
    text: String,
    wrap: bool,
}

impl Line {
    fn new() -> Self {
        Self {
            text: String::new(),
            wrap: true,
        }
    }
}

/// An ordered buffer of LaTeX source lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPortion {
    lines: Vec<Line>,
    packages: Vec<PackageRequest>,
}

impl Default for DocumentPortion {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentPortion {
    pub fn new() -> Self {
        Self {
            lines: vec![Line::new()],
            packages: Vec::new(),
        }
    }

    fn current(&mut self) -> &mut Line {
        if self.lines.is_empty() {
            self.lines.push(Line::new());
        }
        let last = self.lines.len() - 1;
        &mut self.lines[last]
    }

    /// Append text; embedded newlines start new lines.
    pub fn append(&mut self, text: &str) -> &mut Self {
        let mut parts = text.split('\n');
        if let Some(first) = parts.next() {
            self.current().text.push_str(first);
        }
        for part in parts {
            self.lines.push(Line::new());
            self.current().text.push_str(part);
        }
        self
    }

    /// Append text whose lines must never be re-wrapped (verbatim content).
    pub fn append_verbatim(&mut self, text: &str) -> &mut Self {
        let mut parts = text.split('\n');
        if let Some(first) = parts.next() {
            let line = self.current();
            line.text.push_str(first);
            line.wrap = false;
        }
        for part in parts {
            self.lines.push(Line {
                text: part.to_string(),
                wrap: false,
            });
        }
        self
    }

    /// Append another portion, including its package requests.
    pub fn append_portion(&mut self, other: DocumentPortion) -> &mut Self {
        for request in other.packages {
            self.push_request(request);
        }
        let mut lines = other.lines.into_iter();
        if let Some(first) = lines.next() {
            let line = self.current();
            line.text.push_str(&first.text);
            line.wrap &= first.wrap;
        }
        self.lines.extend(lines);
        self
    }

    /// End the current line.
    pub fn newline(&mut self) -> &mut Self {
        self.lines.push(Line::new());
        self
    }

    /// End the current line unless it is already empty.
    pub fn ensure_newline(&mut self) -> &mut Self {
        if !self.current().text.is_empty() {
            self.newline();
        }
        self
    }

    /// Ensure the output ends with an empty line (a paragraph break).
    pub fn ensure_blank_line(&mut self) -> &mut Self {
        self.ensure_newline();
        let n = self.lines.len();
        if n >= 2 && !self.lines[n - 2].text.is_empty() {
            self.newline();
        }
        self
    }

    /// Record that the content needs a package.
    pub fn require_package(&mut self, name: &str) -> &mut Self {
        self.push_request(PackageRequest {
            name: name.to_string(),
            options: None,
        });
        self
    }

    /// Record that the content needs a package loaded with options.
    pub fn require_package_with(&mut self, name: &str, options: &str) -> &mut Self {
        self.push_request(PackageRequest {
            name: name.to_string(),
            options: Some(options.to_string()),
        });
        self
    }

    fn push_request(&mut self, request: PackageRequest) {
        if !self.packages.contains(&request) {
            self.packages.push(request);
        }
    }

    /// Packages required by the content, in first-request order
    pub fn packages(&self) -> &[PackageRequest] {
        &self.packages
    }

    /// Take the package requests out of the portion
    pub fn take_packages(&mut self) -> Vec<PackageRequest> {
        std::mem::take(&mut self.packages)
    }

    /// Consume a scratch portion: its package requests move to `carrier`
    /// and its text is returned.
    pub fn into_text(mut self, carrier: &mut DocumentPortion) -> String {
        for request in self.take_packages() {
            carrier.push_request(request);
        }
        self.to_string()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| l.text.is_empty())
    }

    /// Does the current line hold any text?
    pub fn at_line_start(&self) -> bool {
        self.lines.last().is_none_or(|l| l.text.is_empty())
    }

    /// Serialize, wrapping long lines at unescaped spaces.
    ///
    /// Lines holding verbatim text, comments or control spaces are never
    /// wrapped; `width == 0` disables wrapping altogether.
    pub fn serialize(&self, width: usize, newline: &str) -> String {
        let mut out = String::new();
        for (i, line) in self.lines.iter().enumerate() {
            let last = i + 1 == self.lines.len();
            if last && line.text.is_empty() {
                break;
            }
            if line.wrap && width > 0 && line.text.chars().count() > width && can_wrap(&line.text) {
                wrap_line(&line.text, width, newline, &mut out);
            } else {
                out.push_str(&line.text);
            }
            out.push_str(newline);
        }
        out
    }
}

impl fmt::Display for DocumentPortion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            f.write_str(&line.text)?;
        }
        Ok(())
    }
}

/// Is the byte at `pos` preceded by an odd number of backslashes?
fn is_escaped(bytes: &[u8], pos: usize) -> bool {
    bytes[..pos].iter().rev().take_while(|b| **b == b'\\').count() % 2 == 1
}

fn can_wrap(text: &str) -> bool {
    let bytes = text.as_bytes();
    for pos in memchr::memchr2_iter(b'%', b' ', bytes) {
        if is_escaped(bytes, pos) {
            if bytes[pos] == b' ' {
                return false;
            }
        } else if bytes[pos] == b'%' {
            return false;
        }
    }
    true
}

fn wrap_line(text: &str, width: usize, newline: &str, out: &mut String) {
    let bytes = text.as_bytes();
    let mut line_start = 0;
    let mut last_break: Option<usize> = None;
    let mut column = 0;
    for (pos, ch) in text.char_indices() {
        if ch == ' ' && pos > line_start && !is_escaped(bytes, pos) {
            if column > width
                && let Some(brk) = last_break
            {
                out.push_str(&text[line_start..brk]);
                out.push_str(newline);
                line_start = brk + 1;
                column = text[line_start..pos].chars().count();
            }
            last_break = Some(pos);
        }
        column += 1;
    }
    if column > width
        && let Some(brk) = last_break
        && brk >= line_start
    {
        out.push_str(&text[line_start..brk]);
        out.push_str(newline);
        line_start = brk + 1;
    }
    out.push_str(&text[line_start..]);
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn portion(parts: &[String]) -> DocumentPortion {
        let mut p = DocumentPortion::new();
        for part in parts {
            p.append(part);
        }
        p
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_concatenation_is_associative(
            a in proptest::collection::vec("[a-z \n]{0,8}", 0..4),
            b in proptest::collection::vec("[a-z \n]{0,8}", 0..4),
            c in proptest::collection::vec("[a-z \n]{0,8}", 0..4),
        ) {
            let mut left = portion(&a);
            let mut ab = portion(&b);
            left.append_portion(ab.clone());
            left.append_portion(portion(&c));

            let mut right = portion(&a);
            ab.append_portion(portion(&c));
            right.append_portion(ab);

            prop_assert_eq!(left.to_string(), right.to_string());
        }

        #[test]
        fn prop_wrapping_preserves_words(words in proptest::collection::vec("[a-z]{1,10}", 1..30)) {
            let text = words.join(" ");
            let mut p = DocumentPortion::new();
            p.append(&text);
            let out = p.serialize(25, "\n");
            let rejoined: Vec<&str> = out.split_whitespace().collect();
            prop_assert_eq!(rejoined, words.iter().map(String::as_str).collect::<Vec<_>>());
        }
    }
}
