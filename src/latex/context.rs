//! Formatting context threaded through the traversal.
//!
//! [`Context`] is a value type. Every change goes through a `with_*` method
//! that returns a modified copy, so a nested scope can never leak state into
//! its parent or siblings.

use crate::common::RGBColor;
use crate::odf::style::{PropertyGroup, PropertyValue, Style, StyleRegistry};
use bitflags::bitflags;

bitflags! {
    /// Nesting flags of the current scope.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ContextFlags: u32 {
        const IN_TABLE = 1 << 0;
        const IN_LIST = 1 << 1;
        const IN_SECTION = 1 << 2;
        const IN_FOOTNOTE = 1 << 3;
        const IN_CAPTION = 1 << 4;
        const IN_HEADER_FOOTER = 1 << 5;
        const IN_HEADING = 1 << 6;
        const MATH_MODE = 1 << 7;
        const VERBATIM = 1 << 8;
        const IN_MULTICOLS = 1 << 9;
        /// `\footnote` cannot be used here; bodies are postponed
        const NO_FOOTNOTES = 1 << 10;
        /// `\\` is not allowed (moving arguments, simple table cells)
        const NO_LINE_BREAKS = 1 << 11;
        const IN_FRAME = 1 << 12;
        /// Rendered text of a recognised citation
        const IN_CITATION_TEXT = 1 << 13;
        const IN_LONGTABLE = 1 << 14;
        /// Labels and index marks must be postponed
        const NO_LABELS = 1 << 15;
        /// Inside a figure or table float
        const IN_FLOAT = 1 << 16;
    }
}

/// The current formatting context.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Context {
    flags: ContextFlags,
    lang: Option<String>,
    font_name: Option<String>,
    font_size: Option<f64>,
    bold: bool,
    italic: bool,
    small_caps: bool,
    color: Option<RGBColor>,
    list_style_name: Option<String>,
    list_level: u8,
    depth: usize,
}

macro_rules! context_flags {
    ($($getter:ident, $builder:ident => $flag:ident;)*) => {
        impl Context {
            $(
                #[inline]
                pub fn $getter(&self) -> bool {
                    self.flags.contains(ContextFlags::$flag)
                }

                #[inline]
                #[must_use]
                pub fn $builder(&self, on: bool) -> Self {
                    let mut next = self.clone();
                    next.flags.set(ContextFlags::$flag, on);
                    next
                }
            )*
        }
    };
}

context_flags! {
    in_table, with_in_table => IN_TABLE;
    in_list, with_in_list => IN_LIST;
    in_section, with_in_section => IN_SECTION;
    in_footnote, with_in_footnote => IN_FOOTNOTE;
    in_caption, with_in_caption => IN_CAPTION;
    in_header_footer, with_in_header_footer => IN_HEADER_FOOTER;
    in_heading, with_in_heading => IN_HEADING;
    math_mode, with_math_mode => MATH_MODE;
    verbatim, with_verbatim => VERBATIM;
    in_multicols, with_in_multicols => IN_MULTICOLS;
    no_footnotes, with_no_footnotes => NO_FOOTNOTES;
    no_line_breaks, with_no_line_breaks => NO_LINE_BREAKS;
    in_frame, with_in_frame => IN_FRAME;
    in_citation_text, with_in_citation_text => IN_CITATION_TEXT;
    in_longtable, with_in_longtable => IN_LONGTABLE;
    no_labels, with_no_labels => NO_LABELS;
    in_float, with_in_float => IN_FLOAT;
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Root context seeded from the default paragraph style.
    pub fn root(registry: &StyleRegistry) -> Self {
        let root = Self::new();
        match registry.default_style(crate::odf::style::StyleFamily::Paragraph) {
            Some(style) => root.updated_from_style(registry, style),
            None => root,
        }
    }

    pub fn flags(&self) -> ContextFlags {
        self.flags
    }

    /// Are postponed footnote bodies allowed to be written here?
    pub fn footnotes_allowed(&self) -> bool {
        !self.flags.intersects(
            ContextFlags::NO_FOOTNOTES
                | ContextFlags::IN_HEADING
                | ContextFlags::IN_CAPTION
                | ContextFlags::IN_HEADER_FOOTER
                | ContextFlags::VERBATIM
                | ContextFlags::MATH_MODE,
        )
    }

    /// May labels and index entries be written here?
    pub fn labels_allowed(&self) -> bool {
        !self.flags.intersects(
            ContextFlags::NO_LABELS
                | ContextFlags::IN_HEADING
                | ContextFlags::IN_CAPTION
                | ContextFlags::VERBATIM
                | ContextFlags::MATH_MODE,
        )
    }

    /// May a float (`figure`, `table`) be opened here?
    pub fn floats_allowed(&self) -> bool {
        !self.flags.intersects(
            ContextFlags::IN_TABLE
                | ContextFlags::IN_FOOTNOTE
                | ContextFlags::IN_FRAME
                | ContextFlags::IN_FLOAT
                | ContextFlags::IN_MULTICOLS
                | ContextFlags::IN_HEADER_FOOTER,
        )
    }

    pub fn lang(&self) -> Option<&str> {
        self.lang.as_deref()
    }

    pub fn font_name(&self) -> Option<&str> {
        self.font_name.as_deref()
    }

    /// Font size in points
    pub fn font_size(&self) -> Option<f64> {
        self.font_size
    }

    pub fn is_bold(&self) -> bool {
        self.bold
    }

    pub fn is_italic(&self) -> bool {
        self.italic
    }

    pub fn is_small_caps(&self) -> bool {
        self.small_caps
    }

    pub fn color(&self) -> Option<RGBColor> {
        self.color
    }

    pub fn list_style_name(&self) -> Option<&str> {
        self.list_style_name.as_deref()
    }

    pub fn list_level(&self) -> u8 {
        self.list_level
    }

    /// Block nesting depth
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[must_use]
    pub fn with_lang(&self, lang: Option<&str>) -> Self {
        Self {
            lang: lang.map(str::to_string),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_font_name(&self, font_name: Option<&str>) -> Self {
        Self {
            font_name: font_name.map(str::to_string),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_font_size(&self, font_size: Option<f64>) -> Self {
        Self {
            font_size,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_bold(&self, bold: bool) -> Self {
        Self { bold, ..self.clone() }
    }

    #[must_use]
    pub fn with_italic(&self, italic: bool) -> Self {
        Self {
            italic,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_color(&self, color: Option<RGBColor>) -> Self {
        Self {
            color,
            ..self.clone()
        }
    }

    /// Enter a list level of the given list style.
    #[must_use]
    pub fn with_list(&self, style_name: Option<&str>) -> Self {
        let mut next = self.with_in_list(true);
        if let Some(name) = style_name {
            next.list_style_name = Some(name.to_string());
        }
        next.list_level = self.list_level.saturating_add(1);
        next
    }

    /// One block level deeper
    #[must_use]
    pub fn deeper(&self) -> Self {
        Self {
            depth: self.depth + 1,
            ..self.clone()
        }
    }

    /// Copy reflecting a style's resolved text properties.
    ///
    /// Only properties the style (or its ancestors) actually defines are
    /// changed; everything else is inherited from `self`.
    #[must_use]
    pub fn updated_from_style(&self, registry: &StyleRegistry, style: &Style) -> Self {
        let mut next = self.clone();
        let get = |id: &str| registry.get_property(style, PropertyGroup::Text, id, true);

        if let Some(name) = get("style:font-name").and_then(PropertyValue::as_str) {
            next.font_name = Some(name.to_string());
        }
        if let Some(size) = get("fo:font-size") {
            match size {
                PropertyValue::Length(l) => next.font_size = Some(l.points()),
                PropertyValue::Percent(p) => {
                    if let Some(current) = next.font_size {
                        next.font_size = Some(current * p / 100.0);
                    }
                },
                _ => {},
            }
        }
        if let Some(weight) = get("fo:font-weight") {
            next.bold = is_bold_weight(weight);
        }
        if let Some(shape) = get("fo:font-style").and_then(PropertyValue::as_str) {
            next.italic = matches!(shape, "italic" | "oblique");
        }
        if let Some(variant) = get("fo:font-variant").and_then(PropertyValue::as_str) {
            next.small_caps = variant == "small-caps";
        }
        if let Some(color) = get("fo:color").and_then(PropertyValue::as_color) {
            next.color = Some(color);
        }
        if let Some(lang) = get("fo:language").and_then(PropertyValue::as_str)
            && lang != "none"
            && lang != "zxx"
        {
            next.lang = match get("fo:country").and_then(PropertyValue::as_str) {
                Some(country) if country != "none" => Some(format!("{}-{}", lang, country)),
                _ => Some(lang.to_string()),
            };
        }
        next
    }
}

/// Does an `fo:font-weight` value denote a bold face?
pub fn is_bold_weight(value: &PropertyValue) -> bool {
    match value {
        PropertyValue::Text(s) => s == "bold" || s == "bolder",
        PropertyValue::Number(n) => *n >= 600.0,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::odf::style::StyleFamily;

    #[test]
    fn test_flag_builders_copy() {
        let root = Context::new();
        let table = root.with_in_table(true);
        assert!(table.in_table());
        assert!(!root.in_table());
        assert!(!table.with_in_table(false).in_table());
    }

    #[test]
    fn test_footnote_permission() {
        let ctx = Context::new();
        assert!(ctx.footnotes_allowed());
        assert!(!ctx.with_in_heading(true).footnotes_allowed());
        assert!(!ctx.with_no_footnotes(true).footnotes_allowed());
        assert!(ctx.with_in_table(true).footnotes_allowed());
    }

    #[test]
    fn test_float_permission() {
        let ctx = Context::new();
        assert!(ctx.floats_allowed());
        assert!(!ctx.with_in_table(true).floats_allowed());
        assert!(!ctx.with_in_float(true).floats_allowed());
        assert!(ctx.with_in_list(true).floats_allowed());
    }

    #[test]
    fn test_update_from_style() {
        let mut registry = StyleRegistry::new();
        registry.add_style(
            Style::new("Strong", StyleFamily::Text)
                .with_property(PropertyGroup::Text, "fo:font-weight", "bold")
                .with_property(PropertyGroup::Text, "fo:font-size", "14pt")
                .with_property(PropertyGroup::Text, "fo:language", "de"),
        );
        registry.add_style(
            Style::new("T1", StyleFamily::Text)
                .automatic()
                .with_parent("Strong")
                .with_property(PropertyGroup::Text, "fo:font-size", "50%"),
        );
        let style = registry.get_style("T1", StyleFamily::Text).unwrap();
        let ctx = Context::new().updated_from_style(&registry, style);
        assert!(ctx.is_bold());
        assert_eq!(ctx.lang(), Some("de"));
        // percentage of an unknown size leaves the size unknown
        assert_eq!(ctx.font_size(), None);
        let sized = Context::new().with_font_size(Some(10.0)).updated_from_style(&registry, style);
        assert_eq!(sized.font_size(), Some(5.0));
    }

    #[test]
    fn test_list_levels() {
        let ctx = Context::new().with_list(Some("L1")).with_list(None);
        assert_eq!(ctx.list_level(), 2);
        assert_eq!(ctx.list_style_name(), Some("L1"));
        assert!(ctx.in_list());
    }
}
