//! Text position values.

/// Vertical text position (superscript/subscript).
///
/// ODF writes this as `style:text-position`, e.g. `super 58%`, `sub 58%`
/// or a signed percentage such as `33% 58%`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerticalPosition {
    /// Normal position
    #[default]
    Normal,
    /// Superscript
    Superscript,
    /// Subscript
    Subscript,
}

impl VerticalPosition {
    /// Parse an ODF `style:text-position` value.
    pub fn parse(value: &str) -> Self {
        let first = value.split_whitespace().next().unwrap_or("");
        match first {
            "super" => Self::Superscript,
            "sub" => Self::Subscript,
            _ => {
                let number = first.trim_end_matches('%');
                match fast_float2::parse::<f64, _>(number) {
                    Ok(v) if v > 0.0 => Self::Superscript,
                    Ok(v) if v < 0.0 => Self::Subscript,
                    _ => Self::Normal,
                }
            },
        }
    }

    /// Check if this is a normal (non-superscript, non-subscript) position.
    #[inline]
    pub fn is_normal(&self) -> bool {
        matches!(self, VerticalPosition::Normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positions() {
        assert_eq!(VerticalPosition::parse("super 58%"), VerticalPosition::Superscript);
        assert_eq!(VerticalPosition::parse("sub 58%"), VerticalPosition::Subscript);
        assert_eq!(VerticalPosition::parse("-33% 58%"), VerticalPosition::Subscript);
        assert_eq!(VerticalPosition::parse("0% 100%"), VerticalPosition::Normal);
    }
}
