//! Style converters.
//!
//! Text and paragraph styles become pairs of markup strings wrapped around
//! the styled content. Named styles are converted once per document and
//! memoized; automatic styles are hard formatting and are always resolved
//! against the current [`Context`](super::context::Context).

mod char;
mod color;
mod page;
mod par;

pub use self::char::CharStyleConverter;
pub use color::color_expression;
pub use page::{geometry_options, header_footer_position};
pub use par::ParStyleConverter;

use super::portion::PackageRequest;

/// Markup surrounding a piece of styled content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BeforeAfter {
    before: String,
    after: String,
}

impl BeforeAfter {
    pub fn new(before: &str, after: &str) -> Self {
        Self {
            before: before.to_string(),
            after: after.to_string(),
        }
    }

    /// Nest another pair inside the current one.
    pub fn add(&mut self, before: &str, after: &str) {
        self.before.push_str(before);
        self.after.insert_str(0, after);
    }

    /// Nest a whole pair inside the current one.
    pub fn add_pair(&mut self, inner: &BeforeAfter) {
        self.add(&inner.before, &inner.after);
    }

    #[inline]
    pub fn before(&self) -> &str {
        &self.before
    }

    #[inline]
    pub fn after(&self) -> &str {
        &self.after
    }

    pub fn is_empty(&self) -> bool {
        self.before.is_empty() && self.after.is_empty()
    }

    /// Content wrapped in the markup
    pub fn wrap(&self, content: &str) -> String {
        let mut out = String::with_capacity(self.before.len() + content.len() + self.after.len());
        out.push_str(&self.before);
        out.push_str(content);
        out.push_str(&self.after);
        out
    }
}

/// Record a package request once.
pub(crate) fn request(packages: &mut Vec<PackageRequest>, name: &str, options: Option<&str>) {
    let request = PackageRequest {
        name: name.to_string(),
        options: options.map(str::to_string),
    };
    if !packages.contains(&request) {
        packages.push(request);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_before_after_nesting() {
        let mut ba = BeforeAfter::new("\\textbf{", "}");
        ba.add("\\textit{", "}");
        ba.add("", "");
        assert_eq!(ba.wrap("x"), "\\textbf{\\textit{x}}");
        assert!(!ba.is_empty());
        assert!(BeforeAfter::default().is_empty());
    }

    #[test]
    fn test_request_dedup() {
        let mut packages = Vec::new();
        request(&mut packages, "ulem", Some("normalem"));
        request(&mut packages, "ulem", Some("normalem"));
        request(&mut packages, "xcolor", None);
        assert_eq!(packages.len(), 2);
    }
}
