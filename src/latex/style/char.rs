//! Text (character) style converter.

use super::color::{background_box, color_declaration, text_color};
use super::{BeforeAfter, request};
use crate::common::style::len::format_number;
use crate::common::style::VerticalPosition;
use crate::latex::config::{FormattingLevel, LatexConfig};
use crate::latex::context::{Context, is_bold_weight};
use crate::latex::names::ExportNameCollection;
use crate::latex::portion::PackageRequest;
use crate::odf::style::{PropertyBag, PropertyGroup, PropertyValue, Style, StyleFamily, StyleRegistry};
use std::collections::HashMap;

/// Font family switch derived from a font face declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FamilySwitch {
    Roman,
    Sans,
    Mono,
}

impl FamilySwitch {
    fn command(self) -> &'static str {
        match self {
            FamilySwitch::Roman => "\\textrm{",
            FamilySwitch::Sans => "\\textsf{",
            FamilySwitch::Mono => "\\texttt{",
        }
    }

    fn declaration(self) -> &'static str {
        match self {
            FamilySwitch::Roman => "\\rmfamily",
            FamilySwitch::Sans => "\\sffamily",
            FamilySwitch::Mono => "\\ttfamily",
        }
    }
}

/// Converts text styles and text property bags to markup.
///
/// Named styles are memoized per style name. At `convert_most` and above a
/// named style becomes a `\textstyle…` macro defined once in the preamble.
#[derive(Debug)]
pub struct CharStyleConverter<'a> {
    registry: &'a StyleRegistry,
    config: &'a LatexConfig,
    base: Context,
    memo: HashMap<String, BeforeAfter>,
    names: ExportNameCollection,
    definitions: Vec<String>,
    packages: Vec<PackageRequest>,
}

impl<'a> CharStyleConverter<'a> {
    pub fn new(registry: &'a StyleRegistry, config: &'a LatexConfig) -> Self {
        Self {
            registry,
            config,
            base: Context::root(registry),
            memo: HashMap::new(),
            names: ExportNameCollection::new(true),
            definitions: Vec::new(),
            packages: Vec::new(),
        }
    }

    /// Markup for a text style applied in `ctx`.
    ///
    /// A style map entry for the style's display name wins over generated
    /// formatting. Unknown styles yield empty markup.
    pub fn apply_text_style(&mut self, name: &str, ctx: &Context) -> BeforeAfter {
        let registry = self.registry;
        let Some(style) = registry.get_style(name, StyleFamily::Text) else {
            log::debug!("Unknown text style '{}'", name);
            return BeforeAfter::default();
        };
        let display = registry.display_name(name, StyleFamily::Text);
        if let Some(entry) = self.config.style_maps.text.get(&display) {
            return BeforeAfter::new(&entry.before, &entry.after);
        }
        if style.is_automatic() {
            return self.automatic_style(style, ctx);
        }
        if let Some(cached) = self.memo.get(name) {
            return cached.clone();
        }
        let converted = self.named_style(style, &display);
        self.memo.insert(name.to_string(), converted.clone());
        converted
    }

    fn named_style(&mut self, style: &Style, display: &str) -> BeforeAfter {
        let props = self.registry.flattened(style, PropertyGroup::Text);
        let base = self.base.clone();
        let commands = self.inline_commands(&props, &base);
        if self.config.formatting < FormattingLevel::ConvertMost {
            return commands;
        }
        let macro_name = format!("textstyle{}", self.names.get_export_name(display));
        self.definitions.push(format!(
            "\\newcommand\\{}[1]{{{}}}",
            macro_name,
            commands.wrap("#1")
        ));
        BeforeAfter::new(&format!("\\{}{{", macro_name), "}")
    }

    fn automatic_style(&mut self, style: &Style, ctx: &Context) -> BeforeAfter {
        let registry = self.registry;
        if self.config.formatting >= FormattingLevel::ConvertMost
            && let Some(base) = registry.named_base(style)
        {
            let mut markup = self.apply_text_style(base.name(), ctx);
            let inner_ctx = ctx.updated_from_style(registry, base);
            let own = own_properties(registry, style);
            let hard = self.inline_commands(&own, &inner_ctx);
            markup.add_pair(&hard);
            return markup;
        }
        let props = registry.flattened(style, PropertyGroup::Text);
        self.inline_commands(&props, ctx)
    }

    /// Inline commands (`\textbf{…}`) for a property bag, relative to `ctx`.
    pub fn inline_commands(&mut self, props: &PropertyBag, ctx: &Context) -> BeforeAfter {
        let level = self.config.formatting;
        let mut ba = BeforeAfter::default();
        if level == FormattingLevel::IgnoreAll {
            return ba;
        }
        let basic = level >= FormattingLevel::ConvertBasic;

        if basic {
            if let Some(size) = self.requested_size(props, ctx) {
                ba.add(&format!("{{{} ", size_declaration(size)), "}");
            }
            if let Some(family) = self.requested_family(props, ctx) {
                ba.add(family.command(), "}");
            }
        }
        if let Some(bold) = props.get("fo:font-weight").map(is_bold_weight)
            && bold != ctx.is_bold()
        {
            ba.add(if bold { "\\textbf{" } else { "\\textmd{" }, "}");
        }
        if let Some(shape) = props.get("fo:font-style").and_then(PropertyValue::as_str) {
            match shape {
                "italic" if !ctx.is_italic() => ba.add("\\textit{", "}"),
                "oblique" if !ctx.is_italic() => ba.add("\\textsl{", "}"),
                "normal" if ctx.is_italic() => ba.add("\\textup{", "}"),
                _ => {},
            }
        }
        if basic {
            if props.get("fo:font-variant").and_then(PropertyValue::as_str) == Some("small-caps")
                && !ctx.is_small_caps()
            {
                ba.add("\\textsc{", "}");
            }
            if props.get("fo:text-transform").and_then(PropertyValue::as_str) == Some("uppercase") {
                ba.add("\\MakeUppercase{", "}");
            }
            if is_line_style(props, "style:text-underline-style") {
                if self.config.use_ulem {
                    request(&mut self.packages, "ulem", Some("normalem"));
                    ba.add("\\uline{", "}");
                } else {
                    ba.add("\\underline{", "}");
                }
            }
            if is_line_style(props, "style:text-line-through-style") && self.config.use_ulem {
                request(&mut self.packages, "ulem", Some("normalem"));
                ba.add("\\sout{", "}");
            }
            if self.config.use_color {
                if let Some(color) = props.get("fo:color").and_then(PropertyValue::as_color)
                    && ctx.color() != Some(color)
                {
                    request(&mut self.packages, "xcolor", None);
                    let (before, after) = text_color(color);
                    ba.add(&before, &after);
                }
                if let Some(color) = props.get("fo:background-color").and_then(PropertyValue::as_color) {
                    request(&mut self.packages, "xcolor", None);
                    let (before, after) = background_box(color);
                    ba.add(&before, &after);
                }
            }
        }
        if let Some(position) = props.get("style:text-position") {
            match VerticalPosition::parse(&position.to_string()) {
                VerticalPosition::Superscript => ba.add("\\textsuperscript{", "}"),
                VerticalPosition::Subscript => ba.add("\\textsubscript{", "}"),
                VerticalPosition::Normal => {},
            }
        }
        ba
    }

    /// Declarations (`\bfseries`) for a property bag, relative to `ctx`.
    ///
    /// Used where the formatting applies to a whole paragraph group.
    pub fn declarations(&mut self, props: &PropertyBag, ctx: &Context) -> String {
        let level = self.config.formatting;
        let mut out = String::new();
        if level < FormattingLevel::ConvertBasic {
            return out;
        }
        if let Some(size) = self.requested_size(props, ctx) {
            out.push_str(&size_declaration(size));
        }
        if let Some(family) = self.requested_family(props, ctx) {
            out.push_str(family.declaration());
        }
        if let Some(bold) = props.get("fo:font-weight").map(is_bold_weight)
            && bold != ctx.is_bold()
        {
            out.push_str(if bold { "\\bfseries" } else { "\\mdseries" });
        }
        match props.get("fo:font-style").and_then(PropertyValue::as_str) {
            Some("italic") if !ctx.is_italic() => out.push_str("\\itshape"),
            Some("oblique") if !ctx.is_italic() => out.push_str("\\slshape"),
            Some("normal") if ctx.is_italic() => out.push_str("\\upshape"),
            _ => {},
        }
        if props.get("fo:font-variant").and_then(PropertyValue::as_str) == Some("small-caps")
            && !ctx.is_small_caps()
        {
            out.push_str("\\scshape");
        }
        if self.config.use_color
            && let Some(color) = props.get("fo:color").and_then(PropertyValue::as_color)
            && ctx.color() != Some(color)
        {
            request(&mut self.packages, "xcolor", None);
            out.push_str(&color_declaration(color));
        }
        out
    }

    /// Font size in points, if it differs from the context
    fn requested_size(&self, props: &PropertyBag, ctx: &Context) -> Option<f64> {
        let size = match props.get("fo:font-size")? {
            PropertyValue::Percent(p) => ctx.font_size().map(|current| current * p / 100.0)?,
            other => other.as_length()?.points(),
        };
        match ctx.font_size() {
            Some(current) if (current - size).abs() < 0.01 => None,
            _ if size <= 0.0 => None,
            _ => Some(size),
        }
    }

    fn requested_family(&self, props: &PropertyBag, ctx: &Context) -> Option<FamilySwitch> {
        let name = props.get("style:font-name").and_then(PropertyValue::as_str)?;
        if ctx.font_name() == Some(name) {
            return None;
        }
        let face = self.registry.font_face(name)?;
        if face.is_monospace() {
            return Some(FamilySwitch::Mono);
        }
        match face.generic.as_deref() {
            Some("swiss") => Some(FamilySwitch::Sans),
            Some("roman") => Some(FamilySwitch::Roman),
            _ => None,
        }
    }

    /// `\newcommand` definitions for the named styles used so far
    pub fn definitions(&self) -> &[String] {
        &self.definitions
    }

    /// Packages needed by the generated markup
    pub fn packages(&self) -> &[PackageRequest] {
        &self.packages
    }
}

/// Properties set by the automatic part of a style chain (hard formatting).
fn own_properties(registry: &StyleRegistry, style: &Style) -> PropertyBag {
    let mut bag = PropertyBag::new();
    let chain = registry.ancestry(style);
    for s in chain.into_iter().take_while(|s| s.is_automatic()).collect::<Vec<_>>().into_iter().rev() {
        if let Some(own) = s.properties(PropertyGroup::Text) {
            for (k, v) in own {
                bag.insert(k.clone(), v.clone());
            }
        }
    }
    bag
}

fn is_line_style(props: &PropertyBag, id: &str) -> bool {
    props
        .get(id)
        .and_then(PropertyValue::as_str)
        .is_some_and(|s| s != "none")
}

/// `\fontsize{X}{Y}\selectfont` with 120% leading
fn size_declaration(points: f64) -> String {
    format!(
        "\\fontsize{{{}pt}}{{{}pt}}\\selectfont",
        format_number(points),
        format_number(points * 1.2)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::latex::style_map::{StyleMap, StyleMapEntry, StyleMaps};

    fn registry() -> StyleRegistry {
        let mut registry = StyleRegistry::new();
        registry.add_style(
            Style::new("Emphasis", StyleFamily::Text)
                .with_property(PropertyGroup::Text, "fo:font-style", "italic"),
        );
        registry.add_style(
            Style::new("Strong_20_Emphasis", StyleFamily::Text)
                .with_display_name("Strong Emphasis")
                .with_property(PropertyGroup::Text, "fo:font-weight", "bold"),
        );
        registry.add_style(
            Style::new("T1", StyleFamily::Text)
                .automatic()
                .with_property(PropertyGroup::Text, "fo:font-weight", "bold"),
        );
        registry.add_style(
            Style::new("T2", StyleFamily::Text)
                .automatic()
                .with_parent("Emphasis")
                .with_property(PropertyGroup::Text, "fo:font-weight", "bold"),
        );
        registry
    }

    #[test]
    fn test_automatic_style_is_relative_to_context() {
        let registry = registry();
        let config = LatexConfig::default();
        let mut chars = CharStyleConverter::new(&registry, &config);
        let plain = Context::new();
        assert_eq!(chars.apply_text_style("T1", &plain).wrap("x"), "\\textbf{x}");
        let bold = plain.with_bold(true);
        assert!(chars.apply_text_style("T1", &bold).is_empty());
    }

    #[test]
    fn test_named_style_becomes_macro_at_convert_most() {
        let registry = registry();
        let config = LatexConfig::default().with_formatting(FormattingLevel::ConvertMost);
        let mut chars = CharStyleConverter::new(&registry, &config);
        let ba = chars.apply_text_style("Strong_20_Emphasis", &Context::new());
        assert_eq!(ba.wrap("x"), "\\textstyleStrongEmphasis{x}");
        assert_eq!(chars.definitions(), ["\\newcommand\\textstyleStrongEmphasis[1]{\\textbf{#1}}"]);
        let hard = chars.apply_text_style("T2", &Context::new());
        assert_eq!(hard.wrap("x"), "\\textstyleEmphasis{\\textbf{x}}");
        // Repeated use does not define the macro again
        chars.apply_text_style("Strong_20_Emphasis", &Context::new());
        assert_eq!(chars.definitions().len(), 2);
    }

    #[test]
    fn test_style_map_wins() {
        let registry = registry();
        let maps = StyleMaps {
            text: StyleMap::new().with("Emphasis", StyleMapEntry::new("\\emph{", "}")),
            ..StyleMaps::default()
        };
        let config = LatexConfig::default().with_style_maps(maps);
        let mut chars = CharStyleConverter::new(&registry, &config);
        assert_eq!(chars.apply_text_style("Emphasis", &Context::new()).wrap("x"), "\\emph{x}");
        // Hard formatting on top of a mapped style reports the mapped display name
        assert_eq!(chars.apply_text_style("T2", &Context::new()).wrap("x"), "\\emph{x}");
    }

    #[test]
    fn test_ignore_all_and_unknown() {
        let registry = registry();
        let config = LatexConfig::default().with_formatting(FormattingLevel::IgnoreAll);
        let mut chars = CharStyleConverter::new(&registry, &config);
        assert!(chars.apply_text_style("T1", &Context::new()).is_empty());
        assert!(chars.apply_text_style("Nope", &Context::new()).is_empty());
    }

    #[test]
    fn test_properties_to_commands() {
        let registry = StyleRegistry::new();
        let config = LatexConfig::default();
        let mut chars = CharStyleConverter::new(&registry, &config);
        let style = Style::new("x", StyleFamily::Text)
            .with_property(PropertyGroup::Text, "style:text-underline-style", "solid")
            .with_property(PropertyGroup::Text, "style:text-position", "super 58%")
            .with_property(PropertyGroup::Text, "fo:font-size", "14pt");
        let props = style.properties(PropertyGroup::Text).cloned().unwrap_or_default();
        let ba = chars.inline_commands(&props, &Context::new().with_font_size(Some(12.0)));
        assert_eq!(
            ba.wrap("x"),
            "{\\fontsize{14pt}{16.8pt}\\selectfont \\uline{\\textsuperscript{x}}}"
        );
        assert!(chars.packages().iter().any(|p| p.name == "ulem"));
        let same_size = chars.inline_commands(&props, &Context::new().with_font_size(Some(14.0)));
        assert!(!same_size.before().contains("fontsize"));
    }

    #[test]
    fn test_declarations() {
        let registry = StyleRegistry::new();
        let config = LatexConfig::default();
        let mut chars = CharStyleConverter::new(&registry, &config);
        let style = Style::new("x", StyleFamily::Paragraph)
            .with_property(PropertyGroup::Text, "fo:font-weight", "bold")
            .with_property(PropertyGroup::Text, "fo:font-style", "italic");
        let props = style.properties(PropertyGroup::Text).cloned().unwrap_or_default();
        assert_eq!(chars.declarations(&props, &Context::new()), "\\bfseries\\itshape");
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Converting a named style twice yields identical markup.
        #[test]
        fn prop_named_style_memo_is_idempotent(
            bold in any::<bool>(),
            italic in any::<bool>(),
            size in 6u32..40,
            level in 0usize..5,
        ) {
            let levels = [
                FormattingLevel::IgnoreAll,
                FormattingLevel::IgnoreMost,
                FormattingLevel::ConvertBasic,
                FormattingLevel::ConvertMost,
                FormattingLevel::ConvertAll,
            ];
            let mut style = Style::new("Named", StyleFamily::Text)
                .with_property(PropertyGroup::Text, "fo:font-size", &format!("{}pt", size));
            if bold {
                style = style.with_property(PropertyGroup::Text, "fo:font-weight", "bold");
            }
            if italic {
                style = style.with_property(PropertyGroup::Text, "fo:font-style", "italic");
            }
            let mut registry = StyleRegistry::new();
            registry.add_style(style);
            let config = LatexConfig::default().with_formatting(levels[level]);
            let mut chars = CharStyleConverter::new(&registry, &config);
            let first = chars.apply_text_style("Named", &Context::new());
            let second = chars.apply_text_style("Named", &Context::new().with_bold(true));
            prop_assert_eq!(first, second);
        }
    }
}
