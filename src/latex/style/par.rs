//! Paragraph style converter.

use super::BeforeAfter;
use super::char::CharStyleConverter;
use crate::latex::config::{FormattingLevel, LatexConfig};
use crate::latex::context::Context;
use crate::latex::names::ExportNameCollection;
use crate::odf::style::{PropertyGroup, PropertyValue, Style, StyleFamily, StyleRegistry};
use std::collections::HashMap;

/// Hard breaks requested by a paragraph style
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageBreaks {
    pub before: bool,
    pub after: bool,
}

/// Converts paragraph styles to a group of declarations around the paragraph.
///
/// At `convert_all` named paragraph styles become environments
/// (`\begin{parstyleX}`) defined once in the preamble.
#[derive(Debug)]
pub struct ParStyleConverter<'a> {
    registry: &'a StyleRegistry,
    config: &'a LatexConfig,
    base: Context,
    memo: HashMap<String, BeforeAfter>,
    names: ExportNameCollection,
    definitions: Vec<String>,
}

impl<'a> ParStyleConverter<'a> {
    pub fn new(registry: &'a StyleRegistry, config: &'a LatexConfig) -> Self {
        Self {
            registry,
            config,
            base: Context::root(registry),
            memo: HashMap::new(),
            names: ExportNameCollection::new(true),
            definitions: Vec::new(),
        }
    }

    /// Markup around a paragraph of style `name` in `ctx`.
    pub fn apply_par_style(&mut self, name: &str, ctx: &Context, chars: &mut CharStyleConverter<'_>) -> BeforeAfter {
        let registry = self.registry;
        let Some(style) = registry.get_style(name, StyleFamily::Paragraph) else {
            return BeforeAfter::default();
        };
        if self.config.formatting == FormattingLevel::IgnoreAll {
            return BeforeAfter::default();
        }
        if style.is_automatic() {
            if self.config.formatting == FormattingLevel::ConvertAll
                && let Some(base) = registry.named_base(style)
            {
                let mut markup = self.apply_par_style(base.name(), ctx, chars);
                let inner = ctx.updated_from_style(registry, base);
                markup.add_pair(&self.group(style, &inner, chars, true));
                return markup;
            }
            return self.group(style, ctx, chars, false);
        }
        if let Some(cached) = self.memo.get(name) {
            return cached.clone();
        }
        let base = self.base.clone();
        let converted = if self.config.formatting == FormattingLevel::ConvertAll {
            let display = registry.display_name(name, StyleFamily::Paragraph);
            let env = format!("parstyle{}", self.names.get_export_name(&display));
            let group = self.group(style, &base, chars, false);
            let declarations = group
                .before()
                .trim_start_matches('{')
                .trim_end()
                .to_string();
            self.definitions
                .push(format!("\\newenvironment{{{}}}{{{}}}{{}}", env, declarations));
            BeforeAfter::new(&format!("\\begin{{{}}}\n", env), &format!("\n\\end{{{}}}", env))
        } else {
            self.group(style, &base, chars, false)
        };
        self.memo.insert(name.to_string(), converted.clone());
        converted
    }

    /// Declaration group for alignment and text properties.
    ///
    /// With `own_only` only the style's own properties count (hard formatting
    /// on top of an environment that already applies the named base).
    fn group(&self, style: &Style, ctx: &Context, chars: &mut CharStyleConverter<'_>, own_only: bool) -> BeforeAfter {
        let registry = self.registry;
        let mut declarations = String::new();
        if self.config.formatting >= FormattingLevel::ConvertBasic {
            let align = registry
                .get_property(style, PropertyGroup::Paragraph, "fo:text-align", !own_only)
                .and_then(PropertyValue::as_str);
            match align {
                Some("center") => declarations.push_str("\\centering"),
                Some("end") | Some("right") => declarations.push_str("\\raggedleft"),
                _ => {},
            }
        }
        let text = if own_only {
            style.properties(PropertyGroup::Text).cloned().unwrap_or_default()
        } else {
            registry.flattened(style, PropertyGroup::Text)
        };
        declarations.push_str(&chars.declarations(&text, ctx));
        if declarations.is_empty() {
            return BeforeAfter::default();
        }
        BeforeAfter::new(&format!("{{{} ", declarations), "\\par}")
    }

    /// Hard page breaks before and after a paragraph of this style.
    pub fn page_breaks(&self, name: &str) -> PageBreaks {
        if self.config.ignore_hard_page_breaks {
            return PageBreaks::default();
        }
        let Some(style) = self.registry.get_style(name, StyleFamily::Paragraph) else {
            return PageBreaks::default();
        };
        let is_page = |id: &str| {
            self.registry
                .get_property(style, PropertyGroup::Paragraph, id, true)
                .and_then(PropertyValue::as_str)
                == Some("page")
        };
        PageBreaks {
            before: is_page("fo:break-before"),
            after: is_page("fo:break-after"),
        }
    }

    /// `\newenvironment` definitions for the named styles used so far
    pub fn definitions(&self) -> &[String] {
        &self.definitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> StyleRegistry {
        let mut registry = StyleRegistry::new();
        registry.add_style(
            Style::new("Title", StyleFamily::Paragraph)
                .with_property(PropertyGroup::Paragraph, "fo:text-align", "center")
                .with_property(PropertyGroup::Text, "fo:font-weight", "bold"),
        );
        registry.add_style(
            Style::new("P1", StyleFamily::Paragraph)
                .automatic()
                .with_parent("Title")
                .with_property(PropertyGroup::Paragraph, "fo:break-before", "page")
                .with_property(PropertyGroup::Text, "fo:font-style", "italic"),
        );
        registry
    }

    #[test]
    fn test_named_paragraph_group() {
        let registry = registry();
        let config = LatexConfig::default();
        let mut chars = CharStyleConverter::new(&registry, &config);
        let mut pars = ParStyleConverter::new(&registry, &config);
        let ba = pars.apply_par_style("Title", &Context::new(), &mut chars);
        assert_eq!(ba.wrap("x"), "{\\centering\\bfseries x\\par}");
        assert_eq!(pars.apply_par_style("Title", &Context::new(), &mut chars), ba);
    }

    #[test]
    fn test_automatic_paragraph_and_breaks() {
        let registry = registry();
        let config = LatexConfig::default();
        let mut chars = CharStyleConverter::new(&registry, &config);
        let mut pars = ParStyleConverter::new(&registry, &config);
        let ctx = Context::new().with_bold(true);
        let ba = pars.apply_par_style("P1", &ctx, &mut chars);
        assert_eq!(ba.wrap("x"), "{\\centering\\itshape x\\par}");
        assert!(pars.page_breaks("P1").before);
        assert!(!pars.page_breaks("Title").before);

        let ignoring = LatexConfig {
            ignore_hard_page_breaks: true,
            ..LatexConfig::default()
        };
        let pars = ParStyleConverter::new(&registry, &ignoring);
        assert!(!pars.page_breaks("P1").before);
    }

    #[test]
    fn test_environments_at_convert_all() {
        let registry = registry();
        let config = LatexConfig::default().with_formatting(FormattingLevel::ConvertAll);
        let mut chars = CharStyleConverter::new(&registry, &config);
        let mut pars = ParStyleConverter::new(&registry, &config);
        let ba = pars.apply_par_style("P1", &Context::new(), &mut chars);
        assert!(ba.before().starts_with("\\begin{parstyleTitle}\n{\\itshape "));
        assert_eq!(pars.definitions(), ["\\newenvironment{parstyleTitle}{\\centering\\bfseries}{}"]);
    }
}
