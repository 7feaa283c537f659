//! Color markup for the `xcolor` package.

use crate::common::RGBColor;
use crate::common::style::len::format_number;
use phf::{Map, phf_map};

/// Colors predefined by xcolor, keyed by upper-case hex value
static NAMED_COLORS: Map<&'static str, &'static str> = phf_map! {
    "000000" => "black",
    "FFFFFF" => "white",
    "FF0000" => "red",
    "00FF00" => "green",
    "0000FF" => "blue",
    "00FFFF" => "cyan",
    "FF00FF" => "magenta",
    "FFFF00" => "yellow",
    "808080" => "gray",
    "BFBFBF" => "lightgray",
    "404040" => "darkgray",
};

/// Color specification usable after a color command: `{red}` or `[rgb]{1,0.5,0}`.
pub fn color_spec(color: RGBColor) -> String {
    if let Some(name) = NAMED_COLORS.get(color.to_hex().as_str()) {
        return format!("{{{}}}", name);
    }
    let (r, g, b) = color.unit_components();
    format!(
        "[rgb]{{{},{},{}}}",
        format_number(r),
        format_number(g),
        format_number(b)
    )
}

/// Color as an option value (`fill=red`, `fill={rgb,255:red,255;green,128;blue,0}`)
pub fn color_expression(color: RGBColor) -> String {
    if let Some(name) = NAMED_COLORS.get(color.to_hex().as_str()) {
        return (*name).to_string();
    }
    format!("{{rgb,255:red,{};green,{};blue,{}}}", color.r, color.g, color.b)
}

/// `\textcolor` pair for inline content
pub fn text_color(color: RGBColor) -> (String, String) {
    (format!("\\textcolor{}{{", color_spec(color)), "}".to_string())
}

/// `\color` declaration for paragraph content
pub fn color_declaration(color: RGBColor) -> String {
    format!("\\color{}", color_spec(color))
}

/// `\colorbox` pair for a background color
pub fn background_box(color: RGBColor) -> (String, String) {
    (format!("\\colorbox{}{{", color_spec(color)), "}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_and_rgb_specs() {
        assert_eq!(color_spec(RGBColor::new(255, 0, 0)), "{red}");
        assert_eq!(color_spec(RGBColor::new(255, 128, 0)), "[rgb]{1,0.502,0}");
    }

    #[test]
    fn test_commands() {
        let (before, after) = text_color(RGBColor::new(0, 0, 255));
        assert_eq!(format!("{}x{}", before, after), "\\textcolor{blue}{x}");
        assert_eq!(color_declaration(RGBColor::BLACK), "\\color{black}");
        assert_eq!(color_expression(RGBColor::new(0, 255, 0)), "green");
        assert_eq!(
            color_expression(RGBColor::new(255, 128, 0)),
            "{rgb,255:red,255;green,128;blue,0}"
        );
    }
}
