use std::fmt;

/// Physical units that may appear in ODF length attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LengthUnit {
    Point,
    Pica,
    Inch,
    Centimeter,
    Millimeter,
    Pixel,
}

impl LengthUnit {
    /// Suffix as written in both ODF and LaTeX (`px` has no LaTeX counterpart
    /// and is written in points by [`Length::to_latex`]).
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Point => "pt",
            Self::Pica => "pc",
            Self::Inch => "in",
            Self::Centimeter => "cm",
            Self::Millimeter => "mm",
            Self::Pixel => "px",
        }
    }

    fn points_per_unit(&self) -> f64 {
        match self {
            Self::Point => 1.0,
            Self::Pica => 12.0,
            Self::Inch => 72.0,
            Self::Centimeter => 72.0 / 2.54,
            Self::Millimeter => 72.0 / 25.4,
            Self::Pixel => 0.75,
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "pt" => Some(Self::Point),
            "pc" => Some(Self::Pica),
            "in" | "inch" => Some(Self::Inch),
            "cm" => Some(Self::Centimeter),
            "mm" => Some(Self::Millimeter),
            "px" => Some(Self::Pixel),
            _ => None,
        }
    }
}

/// Length measurement with units.
///
/// Keeps the unit the document was written in, so converted output stays
/// recognisable, while still allowing comparisons in points.
///
/// # Examples
///
/// ```rust
/// use odf2latex::common::Length;
///
/// let length = Length::parse("2.54cm").unwrap();
/// assert!((length.points() - 72.0).abs() < 1e-9);
/// assert_eq!(length.to_latex(), "2.54cm");
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    value: f64,
    unit: LengthUnit,
}

impl Length {
    #[inline]
    pub const fn new(value: f64, unit: LengthUnit) -> Self {
        Self { value, unit }
    }

    #[inline]
    pub const fn from_points(points: f64) -> Self {
        Self::new(points, LengthUnit::Point)
    }

    /// Parse an ODF length such as `1.5cm`, `12pt` or `-0.25in`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let split = text
            .find(|c: char| c.is_ascii_alphabetic())
            .unwrap_or(text.len());
        let (number, suffix) = text.split_at(split);
        let unit = if suffix.is_empty() {
            LengthUnit::Point
        } else {
            LengthUnit::from_suffix(suffix)?
        };
        let value: f64 = fast_float2::parse(number.trim()).ok()?;
        Some(Self::new(value, unit))
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[inline]
    pub fn unit(&self) -> LengthUnit {
        self.unit
    }

    /// Convert to points (1/72 inch).
    #[inline]
    pub fn points(&self) -> f64 {
        self.value * self.unit.points_per_unit()
    }

    /// Scale by a factor, keeping the unit.
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.value * factor, self.unit)
    }

    pub fn is_zero(&self) -> bool {
        self.value.abs() < 1e-9
    }

    /// LaTeX form of the length.
    pub fn to_latex(&self) -> String {
        match self.unit {
            LengthUnit::Pixel => format!("{}pt", format_number(self.points())),
            unit => format!("{}{}", format_number(self.value), unit.suffix()),
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_latex())
    }
}

/// Format a number with at most three decimals and no trailing zeros.
pub fn format_number(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded.fract() == 0.0 && rounded.abs() < 1e15 {
        let mut buf = itoa::Buffer::new();
        return buf.format(rounded as i64).to_string();
    }
    let mut buf = ryu::Buffer::new();
    buf.format(rounded).to_string()
}
