//! Style elements for ODF documents.
//!
//! This module provides the style oracle used by the converters: style
//! definitions grouped by family, typed property bags, inheritance-aware
//! property resolution, list styles, font faces and master pages.

use super::element::{Element, ElementBase};
use super::node::NodeKind;
use crate::common::{Length, RGBColor};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

/// Parent chains longer than this are treated as cyclic.
pub const MAX_INHERITANCE_DEPTH: usize = 32;

/// Style family types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleFamily {
    /// Paragraph styles
    Paragraph,
    /// Text/character styles
    Text,
    /// List styles (`text:list-style`)
    List,
    /// Table styles
    Table,
    /// Table column styles
    TableColumn,
    /// Table row styles
    TableRow,
    /// Table cell styles
    TableCell,
    /// Section styles
    Section,
    /// Graphic (frame) styles
    Graphic,
    /// Page layout styles
    PageLayout,
    /// Master page styles
    MasterPage,
}

impl StyleFamily {
    /// Parse style family from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "paragraph" => Some(Self::Paragraph),
            "text" => Some(Self::Text),
            "list" => Some(Self::List),
            "table" => Some(Self::Table),
            "table-column" => Some(Self::TableColumn),
            "table-row" => Some(Self::TableRow),
            "table-cell" => Some(Self::TableCell),
            "section" => Some(Self::Section),
            "graphic" => Some(Self::Graphic),
            "page-layout" => Some(Self::PageLayout),
            "master-page" => Some(Self::MasterPage),
            _ => None,
        }
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paragraph => "paragraph",
            Self::Text => "text",
            Self::List => "list",
            Self::Table => "table",
            Self::TableColumn => "table-column",
            Self::TableRow => "table-row",
            Self::TableCell => "table-cell",
            Self::Section => "section",
            Self::Graphic => "graphic",
            Self::PageLayout => "page-layout",
            Self::MasterPage => "master-page",
        }
    }
}

/// The `*-properties` element a property was declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyGroup {
    Text,
    Paragraph,
    Table,
    TableColumn,
    TableRow,
    TableCell,
    Section,
    Graphic,
    PageLayout,
    Header,
    Footer,
}

impl PropertyGroup {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "style:text-properties" => Some(Self::Text),
            "style:paragraph-properties" => Some(Self::Paragraph),
            "style:table-properties" => Some(Self::Table),
            "style:table-column-properties" => Some(Self::TableColumn),
            "style:table-row-properties" => Some(Self::TableRow),
            "style:table-cell-properties" => Some(Self::TableCell),
            "style:section-properties" => Some(Self::Section),
            "style:graphic-properties" => Some(Self::Graphic),
            "style:page-layout-properties" => Some(Self::PageLayout),
            _ => None,
        }
    }
}

/// A typed style property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Length(Length),
    Percent(f64),
    Color(RGBColor),
    Number(f64),
    Bool(bool),
    Text(String),
}

impl PropertyValue {
    /// Classify a raw attribute value.
    ///
    /// ```
    /// use odf2latex::odf::style::PropertyValue;
    ///
    /// assert!(matches!(PropertyValue::parse("12pt"), PropertyValue::Length(_)));
    /// assert!(matches!(PropertyValue::parse("#ff0000"), PropertyValue::Color(_)));
    /// assert_eq!(PropertyValue::parse("150%"), PropertyValue::Percent(150.0));
    /// assert_eq!(PropertyValue::parse("bold"), PropertyValue::Text("bold".into()));
    /// ```
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with('#')
            && let Some(color) = RGBColor::from_hex(trimmed)
        {
            return PropertyValue::Color(color);
        }
        if let Some(number) = trimmed.strip_suffix('%')
            && let Ok(value) = fast_float2::parse::<f64, _>(number.trim())
        {
            return PropertyValue::Percent(value);
        }
        match trimmed {
            "true" => return PropertyValue::Bool(true),
            "false" => return PropertyValue::Bool(false),
            _ => {},
        }
        if let Ok(value) = fast_float2::parse::<f64, _>(trimmed) {
            return PropertyValue::Number(value);
        }
        if trimmed.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '.')
            && let Some(length) = Length::parse(trimmed)
        {
            return PropertyValue::Length(length);
        }
        PropertyValue::Text(trimmed.to_string())
    }

    pub fn as_length(&self) -> Option<Length> {
        match self {
            PropertyValue::Length(l) => Some(*l),
            PropertyValue::Number(n) if *n == 0.0 => Some(Length::from_points(0.0)),
            _ => None,
        }
    }

    pub fn as_percent(&self) -> Option<f64> {
        match self {
            PropertyValue::Percent(p) => Some(*p),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<RGBColor> {
        match self {
            PropertyValue::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Keyword value (`bold`, `center`, `none`, ...)
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Length(l) => write!(f, "{}", l),
            PropertyValue::Percent(p) => write!(f, "{}%", p),
            PropertyValue::Color(c) => write!(f, "{}", c),
            PropertyValue::Number(n) => write!(f, "{}", n),
            PropertyValue::Bool(b) => write!(f, "{}", b),
            PropertyValue::Text(s) => f.write_str(s),
        }
    }
}

/// Property identifier → value, for one property group.
pub type PropertyBag = BTreeMap<String, PropertyValue>;

/// Numbering or bullet definition for one list level.
#[derive(Debug, Clone, PartialEq)]
pub struct ListLevel {
    /// 1-based level
    pub level: u8,
    pub kind: ListLevelKind,
    /// `style:num-format` (`1`, `a`, `A`, `i`, `I`, or empty)
    pub num_format: String,
    pub num_prefix: String,
    pub num_suffix: String,
    pub bullet_char: Option<char>,
    pub start_value: u32,
    pub display_levels: u8,
    /// Text style applied to the label
    pub text_style: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListLevelKind {
    Number,
    Bullet,
    Image,
}

impl ListLevel {
    fn from_element(e: &Element) -> Option<Self> {
        let kind = match e.tag_name() {
            "text:list-level-style-number" | "text:outline-level-style" => ListLevelKind::Number,
            "text:list-level-style-bullet" => ListLevelKind::Bullet,
            "text:list-level-style-image" => ListLevelKind::Image,
            _ => return None,
        };
        let level = e.get_int_attribute("text:level")?.clamp(1, 10) as u8;
        Some(Self {
            level,
            kind,
            num_format: e.get_attribute("style:num-format").unwrap_or("").to_string(),
            num_prefix: e.get_attribute("style:num-prefix").unwrap_or("").to_string(),
            num_suffix: e.get_attribute("style:num-suffix").unwrap_or("").to_string(),
            bullet_char: e.get_attribute("text:bullet-char").and_then(|s| s.chars().next()),
            start_value: e
                .get_int_attribute("text:start-value")
                .map(|v| v.max(0) as u32)
                .unwrap_or(1),
            display_levels: e
                .get_int_attribute("text:display-levels")
                .map(|v| v.clamp(1, 10) as u8)
                .unwrap_or(1),
            text_style: e.get_attribute("text:style-name").map(str::to_string),
        })
    }

    /// Is this level numbered (as opposed to bulleted or unnumbered)?
    pub fn is_numbered(&self) -> bool {
        self.kind == ListLevelKind::Number && !self.num_format.is_empty()
    }
}

/// A `style:font-face` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontFace {
    pub name: String,
    /// `svg:font-family` with quotes removed
    pub family: String,
    /// `style:font-family-generic`: roman, swiss, modern, decorative, script, system
    pub generic: Option<String>,
    /// `style:font-pitch`: fixed or variable
    pub pitch: Option<String>,
}

impl FontFace {
    fn from_element(e: &Element) -> Option<Self> {
        let name = e.get_attribute("style:name")?.to_string();
        let family = e
            .get_attribute("svg:font-family")
            .unwrap_or(&name)
            .trim_matches(|c| c == '\'' || c == '"')
            .to_string();
        Some(Self {
            name,
            family,
            generic: e.get_attribute("style:font-family-generic").map(str::to_string),
            pitch: e.get_attribute("style:font-pitch").map(str::to_string),
        })
    }

    pub fn is_monospace(&self) -> bool {
        self.pitch.as_deref() == Some("fixed") || self.generic.as_deref() == Some("modern")
    }
}

/// One style definition
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    name: String,
    family: StyleFamily,
    parent: Option<String>,
    display_name: Option<String>,
    automatic: bool,
    attributes: HashMap<String, String>,
    properties: HashMap<PropertyGroup, PropertyBag>,
    list_levels: Vec<ListLevel>,
    content: Option<Element>,
}

impl Style {
    /// Create an empty style
    pub fn new(name: &str, family: StyleFamily) -> Self {
        Self {
            name: name.to_string(),
            family,
            parent: None,
            display_name: None,
            automatic: false,
            attributes: HashMap::new(),
            properties: HashMap::new(),
            list_levels: Vec::new(),
            content: None,
        }
    }

    /// Builder: set the parent style
    pub fn with_parent(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_string());
        self
    }

    /// Builder: mark as automatic
    pub fn automatic(mut self) -> Self {
        self.automatic = true;
        self
    }

    /// Builder: set the display name
    pub fn with_display_name(mut self, display_name: &str) -> Self {
        self.display_name = Some(display_name.to_string());
        self
    }

    /// Builder: set a property
    pub fn with_property(mut self, group: PropertyGroup, id: &str, raw: &str) -> Self {
        self.properties
            .entry(group)
            .or_default()
            .insert(id.to_string(), PropertyValue::parse(raw));
        self
    }

    /// Builder: set a style attribute
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    /// Build a style from its XML definition.
    ///
    /// Handles `style:style`, `style:default-style`, `text:list-style`,
    /// `text:outline-style`, `style:page-layout` and `style:master-page`.
    pub fn from_element(element: &Element, automatic: bool) -> Option<Self> {
        let family = match element.tag_name() {
            "style:style" | "style:default-style" => {
                StyleFamily::from_str(element.get_attribute("style:family")?)?
            },
            "text:list-style" | "text:outline-style" => StyleFamily::List,
            "style:page-layout" => StyleFamily::PageLayout,
            "style:master-page" => StyleFamily::MasterPage,
            _ => return None,
        };
        let name = element.get_attribute("style:name").unwrap_or("").to_string();
        let mut style = Style::new(&name, family);
        style.automatic = automatic;
        style.parent = element
            .get_attribute("style:parent-style-name")
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        style.display_name = element.get_attribute("style:display-name").map(str::to_string);
        for (k, v) in element.attributes() {
            style.attributes.insert(k.clone(), v.clone());
        }

        for child in element.child_elements() {
            if let Some(group) = PropertyGroup::from_tag(child.tag_name()) {
                style.read_properties(group, child);
                continue;
            }
            match child.tag_name() {
                "style:header-style" | "style:footer-style" => {
                    let group = if child.tag_name() == "style:header-style" {
                        PropertyGroup::Header
                    } else {
                        PropertyGroup::Footer
                    };
                    if let Some(props) = child.first_child_by_tag("style:header-footer-properties") {
                        style.read_properties(group, props);
                    }
                },
                _ => {
                    if let Some(level) = ListLevel::from_element(child) {
                        style.list_levels.push(level);
                    }
                },
            }
        }
        style.list_levels.sort_by_key(|l| l.level);

        if family == StyleFamily::MasterPage {
            style.content = Some(element.clone());
        }
        Some(style)
    }

    fn read_properties(&mut self, group: PropertyGroup, element: &Element) {
        let bag = self.properties.entry(group).or_default();
        for (k, v) in element.attributes() {
            bag.insert(k.clone(), PropertyValue::parse(v));
        }
        if group == PropertyGroup::Section
            && let Some(columns) = element.first_child_by_tag("style:columns")
            && let Some(count) = columns.get_attribute("fo:column-count")
        {
            bag.insert("fo:column-count".to_string(), PropertyValue::parse(count));
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn family(&self) -> StyleFamily {
        self.family
    }

    pub fn parent_style_name(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn is_automatic(&self) -> bool {
        self.automatic
    }

    /// Own `style:display-name`, without fallback
    pub fn own_display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Style element attribute (e.g. `style:list-style-name`)
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Explicit property, no inheritance
    pub fn property(&self, group: PropertyGroup, id: &str) -> Option<&PropertyValue> {
        self.properties.get(&group).and_then(|bag| bag.get(id))
    }

    /// All explicit properties of a group
    pub fn properties(&self, group: PropertyGroup) -> Option<&PropertyBag> {
        self.properties.get(&group)
    }

    /// Level definitions of a list style, sorted by level
    pub fn list_levels(&self) -> &[ListLevel] {
        &self.list_levels
    }

    /// Level definition for a 1-based level
    pub fn list_level(&self, level: u8) -> Option<&ListLevel> {
        self.list_levels.iter().find(|l| l.level == level)
    }

    /// Source element of a master page (header and footer content)
    pub fn content(&self) -> Option<&Element> {
        self.content.as_ref()
    }
}

/// Decode ODF's `_XX_` hex escapes in internal style names.
///
/// ```
/// use odf2latex::odf::style::decode_style_name;
///
/// assert_eq!(decode_style_name("Text_20_body"), "Text body");
/// assert_eq!(decode_style_name("Plain"), "Plain");
/// ```
pub fn decode_style_name(name: &str) -> String {
    if !name.contains('_') {
        return name.to_string();
    }
    let bytes = name.as_bytes();
    let mut out = String::with_capacity(name.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'_' {
            let end = bytes[i + 1..].iter().position(|b| *b == b'_').map(|p| p + i + 1);
            if let Some(end) = end {
                let hex = &name[i + 1..end];
                if (2..=4).contains(&hex.len())
                    && let Ok(code) = u32::from_str_radix(hex, 16)
                    && let Some(ch) = char::from_u32(code)
                {
                    out.push(ch);
                    i = end + 1;
                    continue;
                }
            }
        }
        let ch = name[i..].chars().next().unwrap_or('_');
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}

/// Style registry: the read-only style oracle for one document
#[derive(Debug, Clone, Default)]
pub struct StyleRegistry {
    styles: HashMap<StyleFamily, HashMap<String, Style>>,
    defaults: HashMap<StyleFamily, Style>,
    font_faces: HashMap<String, FontFace>,
    outline: Option<Style>,
    master_order: Vec<String>,
}

impl StyleRegistry {
    /// Create a new style registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a style to the registry, replacing one of the same name and family
    pub fn add_style(&mut self, style: Style) {
        if style.family == StyleFamily::MasterPage && !self.master_order.contains(&style.name) {
            self.master_order.push(style.name.clone());
        }
        self.styles
            .entry(style.family)
            .or_default()
            .insert(style.name.clone(), style);
    }

    /// Set the default style of a family
    pub fn set_default_style(&mut self, style: Style) {
        self.defaults.insert(style.family, style);
    }

    /// Read style declarations from the root of `styles.xml`, `content.xml`
    /// or a flat `office:document`.
    pub fn load_part(&mut self, root: &Element) {
        for section in root.child_elements() {
            match section.kind() {
                NodeKind::FontFaceDecls => {
                    for face in section.child_elements().filter_map(FontFace::from_element) {
                        self.font_faces.insert(face.name.clone(), face);
                    }
                },
                NodeKind::Styles | NodeKind::AutomaticStyles | NodeKind::MasterStyles => {
                    let automatic = section.kind() == NodeKind::AutomaticStyles;
                    for child in section.child_elements() {
                        let Some(style) = Style::from_element(child, automatic) else {
                            continue;
                        };
                        match child.tag_name() {
                            "style:default-style" => self.set_default_style(style),
                            "text:outline-style" => self.outline = Some(style),
                            _ => self.add_style(style),
                        }
                    }
                },
                _ => {},
            }
        }
    }

    /// Get a style by name and family
    pub fn get_style(&self, name: &str, family: StyleFamily) -> Option<&Style> {
        self.styles.get(&family).and_then(|m| m.get(name))
    }

    /// Default style of a family
    pub fn default_style(&self, family: StyleFamily) -> Option<&Style> {
        self.defaults.get(&family)
    }

    /// The style and its ancestors, nearest first.
    ///
    /// Dangling parents end the chain; revisiting a style or exceeding
    /// [`MAX_INHERITANCE_DEPTH`] also ends it.
    pub fn ancestry<'a>(&'a self, style: &'a Style) -> Vec<&'a Style> {
        let mut chain = vec![style];
        let mut seen: HashSet<&str> = HashSet::new();
        seen.insert(style.name.as_str());
        let mut current = style;
        while let Some(parent_name) = current.parent.as_deref() {
            if chain.len() >= MAX_INHERITANCE_DEPTH || !seen.insert(parent_name) {
                log::warn!("Style inheritance cycle at '{}'", parent_name);
                break;
            }
            match self.get_style(parent_name, style.family) {
                Some(parent) => {
                    chain.push(parent);
                    current = parent;
                },
                None => break,
            }
        }
        chain
    }

    /// Resolve a property of a style.
    ///
    /// With `inherit`, parents are searched nearest first and finally the
    /// family's default style; without it only the style's own value counts.
    pub fn get_property<'a>(
        &'a self,
        style: &'a Style,
        group: PropertyGroup,
        id: &str,
        inherit: bool,
    ) -> Option<&'a PropertyValue> {
        if !inherit {
            return style.property(group, id);
        }
        self.ancestry(style)
            .into_iter()
            .find_map(|s| s.property(group, id))
            .or_else(|| {
                self.default_style(style.family)
                    .and_then(|d| d.property(group, id))
            })
    }

    /// Resolve a property by style name; unknown styles yield `None`.
    pub fn resolve_property(
        &self,
        name: &str,
        family: StyleFamily,
        group: PropertyGroup,
        id: &str,
        inherit: bool,
    ) -> Option<&PropertyValue> {
        let style = self.get_style(name, family)?;
        self.get_property(style, group, id, inherit)
    }

    /// Inheritance-flattened property bag (defaults, then ancestors, then own).
    pub fn flattened(&self, style: &Style, group: PropertyGroup) -> PropertyBag {
        let mut bag = self
            .default_style(style.family)
            .and_then(|d| d.properties(group))
            .cloned()
            .unwrap_or_default();
        for s in self.ancestry(style).into_iter().rev() {
            if let Some(own) = s.properties(group) {
                for (k, v) in own {
                    bag.insert(k.clone(), v.clone());
                }
            }
        }
        bag
    }

    /// Is the named style automatic? Unknown styles are not.
    pub fn is_automatic(&self, name: &str, family: StyleFamily) -> bool {
        self.get_style(name, family).is_some_and(Style::is_automatic)
    }

    /// User-facing name used as the key for style maps.
    ///
    /// Automatic styles report their nearest named ancestor; unknown styles
    /// report the decoded raw name.
    pub fn display_name(&self, name: &str, family: StyleFamily) -> String {
        let Some(style) = self.get_style(name, family) else {
            return decode_style_name(name);
        };
        for s in self.ancestry(style) {
            if s.automatic {
                continue;
            }
            return match &s.display_name {
                Some(d) => d.clone(),
                None => decode_style_name(&s.name),
            };
        }
        match style.parent.as_deref() {
            Some(parent) => decode_style_name(parent),
            None => decode_style_name(name),
        }
    }

    /// Nearest non-automatic style in the chain (the named base of hard formatting)
    pub fn named_base<'a>(&'a self, style: &'a Style) -> Option<&'a Style> {
        self.ancestry(style).into_iter().find(|s| !s.automatic)
    }

    /// All styles of a family
    pub fn styles_of(&self, family: StyleFamily) -> impl Iterator<Item = &Style> {
        self.styles.get(&family).into_iter().flat_map(|m| m.values())
    }

    pub fn font_face(&self, name: &str) -> Option<&FontFace> {
        self.font_faces.get(name)
    }

    pub fn list_style(&self, name: &str) -> Option<&Style> {
        self.get_style(name, StyleFamily::List)
    }

    /// `text:outline-style`, numbering definition for headings
    pub fn outline_style(&self) -> Option<&Style> {
        self.outline.as_ref()
    }

    pub fn master_page(&self, name: &str) -> Option<&Style> {
        self.get_style(name, StyleFamily::MasterPage)
    }

    /// The first declared master page (used for the document's page setup)
    pub fn first_master_page(&self) -> Option<&Style> {
        self.master_order.first().and_then(|n| self.master_page(n))
    }

    /// Page layout referenced by a master page
    pub fn page_layout_for(&self, master: &Style) -> Option<&Style> {
        let layout = master.attribute("style:page-layout-name")?;
        self.get_style(layout, StyleFamily::PageLayout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::odf::parser::parse_xml;

    fn registry() -> StyleRegistry {
        let xml = r#"<office:document-styles>
<office:font-face-decls>
  <style:font-face style:name="Courier" svg:font-family="'Courier New'" style:font-pitch="fixed"/>
</office:font-face-decls>
<office:styles>
  <style:default-style style:family="paragraph"><style:text-properties fo:font-size="12pt"/></style:default-style>
  <style:style style:name="Standard" style:family="paragraph"/>
  <style:style style:name="Text_20_body" style:display-name="Text body" style:family="paragraph" style:parent-style-name="Standard">
    <style:paragraph-properties fo:margin-bottom="0.21cm" fo:text-align="justify"/>
  </style:style>
  <style:style style:name="Quote" style:family="paragraph" style:parent-style-name="Text_20_body">
    <style:text-properties fo:font-style="italic"/>
  </style:style>
  <text:list-style style:name="L1">
    <text:list-level-style-number text:level="1" style:num-format="1" style:num-suffix="."/>
    <text:list-level-style-bullet text:level="2" text:bullet-char="•"/>
  </text:list-style>
</office:styles>
<office:automatic-styles>
  <style:style style:name="P1" style:family="paragraph" style:parent-style-name="Quote">
    <style:text-properties fo:font-weight="bold"/>
  </style:style>
  <style:page-layout style:name="pm1"><style:page-layout-properties fo:page-width="21cm"/></style:page-layout>
</office:automatic-styles>
<office:master-styles>
  <style:master-page style:name="Standard" style:page-layout-name="pm1"/>
</office:master-styles>
</office:document-styles>"#;
        let mut registry = StyleRegistry::new();
        registry.load_part(&parse_xml(xml.as_bytes()).unwrap());
        registry
    }

    #[test]
    fn test_property_inheritance() {
        let r = registry();
        let p1 = r.get_style("P1", StyleFamily::Paragraph).unwrap();
        let italic = r.get_property(p1, PropertyGroup::Text, "fo:font-style", true);
        assert_eq!(italic.and_then(PropertyValue::as_str), Some("italic"));
        assert!(r.get_property(p1, PropertyGroup::Text, "fo:font-style", false).is_none());
        let size = r.get_property(p1, PropertyGroup::Text, "fo:font-size", true);
        assert_eq!(size.and_then(PropertyValue::as_length).map(|l| l.points()), Some(12.0));
    }

    #[test]
    fn test_display_name_of_automatic_style() {
        let r = registry();
        assert!(r.is_automatic("P1", StyleFamily::Paragraph));
        assert!(!r.is_automatic("Quote", StyleFamily::Paragraph));
        assert_eq!(r.display_name("P1", StyleFamily::Paragraph), "Quote");
        assert_eq!(r.display_name("Text_20_body", StyleFamily::Paragraph), "Text body");
        assert_eq!(r.display_name("Missing_20_One", StyleFamily::Paragraph), "Missing One");
    }

    #[test]
    fn test_inheritance_cycle_terminates() {
        let mut r = StyleRegistry::new();
        r.add_style(Style::new("A", StyleFamily::Text).with_parent("B"));
        r.add_style(
            Style::new("B", StyleFamily::Text)
                .with_parent("A")
                .with_property(PropertyGroup::Text, "fo:color", "#00ff00"),
        );
        let a = r.get_style("A", StyleFamily::Text).unwrap();
        assert_eq!(r.ancestry(a).len(), 2);
        assert!(r.get_property(a, PropertyGroup::Text, "fo:color", true).is_some());
        assert!(r.get_property(a, PropertyGroup::Text, "fo:font-size", true).is_none());
    }

    #[test]
    fn test_list_levels_and_pages() {
        let r = registry();
        let list = r.list_style("L1").unwrap();
        assert!(list.list_level(1).unwrap().is_numbered());
        assert_eq!(list.list_level(2).unwrap().bullet_char, Some('•'));
        let master = r.first_master_page().unwrap();
        let layout = r.page_layout_for(master).unwrap();
        let width = layout.property(PropertyGroup::PageLayout, "fo:page-width");
        assert!(width.and_then(PropertyValue::as_length).is_some());
        assert!(r.font_face("Courier").unwrap().is_monospace());
    }

    #[test]
    fn test_flattened_bag() {
        let r = registry();
        let p1 = r.get_style("P1", StyleFamily::Paragraph).unwrap();
        let bag = r.flattened(p1, PropertyGroup::Text);
        assert_eq!(bag.len(), 3);
        assert!(bag.contains_key("fo:font-weight"));
    }
}
