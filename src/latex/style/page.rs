//! Page layout to `geometry` options.

use crate::latex::config::{LatexConfig, PageFormatting};
use crate::odf::style::{PropertyGroup, PropertyValue, StyleFamily, StyleRegistry};

/// `geometry` options for the first master page's layout.
///
/// Returns `None` when page formatting is ignored or the document declares
/// no usable page layout.
pub fn geometry_options(registry: &StyleRegistry, config: &LatexConfig) -> Option<String> {
    if config.page_formatting == PageFormatting::IgnoreAll {
        return None;
    }
    let master = registry.first_master_page()?;
    let layout = registry.page_layout_for(master)?;
    let length = |id: &str| {
        layout
            .property(PropertyGroup::PageLayout, id)
            .and_then(PropertyValue::as_length)
    };

    let mut options = Vec::new();
    for (id, key) in [("fo:page-width", "paperwidth"), ("fo:page-height", "paperheight")] {
        if let Some(l) = length(id)
            && !l.is_zero()
        {
            options.push(format!("{}={}", key, l.to_latex()));
        }
    }
    for (id, key) in [
        ("fo:margin-top", "top"),
        ("fo:margin-bottom", "bottom"),
        ("fo:margin-left", "left"),
        ("fo:margin-right", "right"),
    ] {
        if let Some(l) = length(id) {
            options.push(format!("{}={}", key, l.to_latex()));
        }
    }
    if let Some(height) = layout
        .property(PropertyGroup::Header, "fo:min-height")
        .and_then(PropertyValue::as_length)
        && !height.is_zero()
    {
        options.push(format!("headheight={}", height.to_latex()));
        options.push("includehead".to_string());
    }
    if layout
        .property(PropertyGroup::Footer, "fo:min-height")
        .and_then(PropertyValue::as_length)
        .is_some_and(|h| !h.is_zero())
    {
        options.push("includefoot".to_string());
    }
    if options.is_empty() {
        None
    } else {
        Some(options.join(","))
    }
}

/// fancyhdr position (`L`, `C`, `R`) for a header/footer paragraph style.
pub fn header_footer_position(registry: &StyleRegistry, style_name: Option<&str>) -> &'static str {
    let align = style_name
        .and_then(|name| {
            registry.resolve_property(
                name,
                StyleFamily::Paragraph,
                PropertyGroup::Paragraph,
                "fo:text-align",
                true,
            )
        })
        .and_then(PropertyValue::as_str);
    match align {
        Some("center") => "C",
        Some("end") | Some("right") => "R",
        _ => "L",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::odf::parser::parse_xml;

    fn registry() -> StyleRegistry {
        let xml = br#"<office:document-styles>
<office:automatic-styles>
  <style:page-layout style:name="pm1">
    <style:page-layout-properties fo:page-width="21cm" fo:page-height="29.7cm"
      fo:margin-top="2cm" fo:margin-bottom="2cm" fo:margin-left="2.5cm" fo:margin-right="2.5cm"/>
    <style:header-style><style:header-footer-properties fo:min-height="0.5cm"/></style:header-style>
  </style:page-layout>
  <style:style style:name="MP1" style:family="paragraph">
    <style:paragraph-properties fo:text-align="center"/>
  </style:style>
</office:automatic-styles>
<office:master-styles>
  <style:master-page style:name="Standard" style:page-layout-name="pm1"/>
</office:master-styles>
</office:document-styles>"#;
        let mut registry = StyleRegistry::new();
        registry.load_part(&parse_xml(xml).unwrap());
        registry
    }

    #[test]
    fn test_geometry_from_layout() {
        let registry = registry();
        let options = geometry_options(&registry, &LatexConfig::default()).unwrap();
        assert_eq!(
            options,
            "paperwidth=21cm,paperheight=29.7cm,top=2cm,bottom=2cm,left=2.5cm,right=2.5cm,headheight=0.5cm,includehead"
        );
        let ignoring = LatexConfig::default().with_page_formatting(PageFormatting::IgnoreAll);
        assert!(geometry_options(&registry, &ignoring).is_none());
    }

    #[test]
    fn test_header_position() {
        let registry = registry();
        assert_eq!(header_footer_position(&registry, Some("MP1")), "C");
        assert_eq!(header_footer_position(&registry, None), "L");
    }
}
