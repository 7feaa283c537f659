//! Custom shapes to TikZ.
//!
//! A `draw:custom-shape` carries its outline as an enhanced path in view box
//! coordinates. Path parameters may reference modifiers (`$n`) and named
//! equations (`?fN`), which are small arithmetic formulas evaluated here.
//! Only the line and Bézier commands are drawn; a path using any other
//! command is not converted.

use crate::common::Length;
use crate::common::style::len::format_number;
use crate::odf::element::{Element, ElementBase};
use crate::odf::node::NodeKind;
use std::f64::consts::PI;

/// Bound on nested equation references
const MAX_EQUATION_DEPTH: usize = 64;

/// Values formulas can refer to.
#[derive(Debug, Clone, Default)]
pub struct ShapeEnvironment {
    pub modifiers: Vec<f64>,
    /// Equation formulas in `draw:equation` order (`?f0`, `?f1`, ...)
    pub equations: Vec<String>,
    /// View box left, top, width, height
    pub view_box: [f64; 4],
    /// Shape size in 1/100 mm
    pub logical_size: (f64, f64),
}

impl ShapeEnvironment {
    /// Environment of an `draw:enhanced-geometry` element.
    pub fn from_geometry(geometry: &Element, width: Option<Length>, height: Option<Length>) -> Self {
        let modifiers = geometry
            .get_attribute("draw:modifiers")
            .map(|m| m.split_whitespace().filter_map(|v| fast_float2::parse(v).ok()).collect())
            .unwrap_or_default();
        let equations = geometry
            .child_elements()
            .filter(|e| e.kind() == NodeKind::Equation)
            .map(|e| e.get_attribute("draw:formula").unwrap_or("0").to_string())
            .collect();
        let view_box = geometry
            .get_attribute("svg:viewBox")
            .map(parse_view_box)
            .unwrap_or([0.0, 0.0, 21600.0, 21600.0]);
        // 1pt = 35.2778 hundredths of a millimetre
        let logical = |l: Option<Length>| l.map(|l| l.points() * 2540.0 / 72.0).unwrap_or(0.0);
        Self {
            modifiers,
            equations,
            view_box,
            logical_size: (logical(width), logical(height)),
        }
    }

    /// Evaluate a formula; `None` when it is malformed or cyclic.
    pub fn evaluate(&self, formula: &str) -> Option<f64> {
        let mut visiting = Vec::new();
        self.evaluate_nested(formula, &mut visiting)
    }

    fn evaluate_nested(&self, formula: &str, visiting: &mut Vec<usize>) -> Option<f64> {
        if visiting.len() > MAX_EQUATION_DEPTH {
            return None;
        }
        let mut parser = FormulaParser {
            chars: formula.chars().collect(),
            pos: 0,
            env: self,
            visiting,
        };
        let value = parser.expression()?;
        parser.skip_whitespace();
        if parser.pos != parser.chars.len() {
            return None;
        }
        Some(value)
    }

    fn equation(&self, index: usize, visiting: &mut Vec<usize>) -> Option<f64> {
        if visiting.contains(&index) {
            log::warn!("Cyclic custom shape equation ?f{}", index);
            return None;
        }
        let formula = self.equations.get(index)?;
        visiting.push(index);
        let value = self.evaluate_nested(formula, visiting);
        visiting.pop();
        value
    }

    fn constant(&self, name: &str) -> Option<f64> {
        let [left, top, width, height] = self.view_box;
        Some(match name {
            "pi" => PI,
            "left" => left,
            "top" => top,
            "right" => left + width,
            "bottom" => top + height,
            "width" => width,
            "height" => height,
            "xstretch" | "ystretch" => 0.0,
            "hasstroke" | "hasfill" => 1.0,
            "logwidth" => self.logical_size.0,
            "logheight" => self.logical_size.1,
            _ => return None,
        })
    }

    /// Value of a path parameter: number, `$n` or `?fN`.
    pub fn parameter(&self, token: &str) -> Option<f64> {
        self.evaluate(token)
    }
}

fn parse_view_box(text: &str) -> [f64; 4] {
    let values: Vec<f64> = text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .filter_map(|v| fast_float2::parse(v).ok())
        .collect();
    match values.as_slice() {
        [x, y, w, h] if *w > 0.0 && *h > 0.0 => [*x, *y, *w, *h],
        _ => [0.0, 0.0, 21600.0, 21600.0],
    }
}

/// Recursive descent over `expr := term (('+'|'-') term)*`,
/// `term := unary (('*'|'/') unary)*`, `unary := '-' unary | primary`.
struct FormulaParser<'e, 'v> {
    chars: Vec<char>,
    pos: usize,
    env: &'e ShapeEnvironment,
    visiting: &'v mut Vec<usize>,
}

impl FormulaParser<'_, '_> {
    fn skip_whitespace(&mut self) {
        while self.chars.get(self.pos).is_some_and(|c| c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_whitespace();
        self.chars.get(self.pos).copied()
    }

    fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expression(&mut self) -> Option<f64> {
        let mut value = self.term()?;
        loop {
            if self.eat('+') {
                value += self.term()?;
            } else if self.eat('-') {
                value -= self.term()?;
            } else {
                return Some(value);
            }
        }
    }

    fn term(&mut self) -> Option<f64> {
        let mut value = self.unary()?;
        loop {
            if self.eat('*') {
                value *= self.unary()?;
            } else if self.eat('/') {
                let divisor = self.unary()?;
                value = if divisor == 0.0 { 0.0 } else { value / divisor };
            } else {
                return Some(value);
            }
        }
    }

    fn unary(&mut self) -> Option<f64> {
        if self.eat('-') {
            return Some(-self.unary()?);
        }
        if self.eat('+') {
            return self.unary();
        }
        self.primary()
    }

    fn primary(&mut self) -> Option<f64> {
        match self.peek()? {
            '(' => {
                self.pos += 1;
                let value = self.expression()?;
                self.eat(')').then_some(value)
            },
            '$' => {
                self.pos += 1;
                let index = self.integer()?;
                Some(self.env.modifiers.get(index).copied().unwrap_or(0.0))
            },
            '?' => {
                self.pos += 1;
                if !self.eat('f') {
                    return None;
                }
                let index = self.integer()?;
                self.env.equation(index, self.visiting)
            },
            c if c.is_ascii_digit() || c == '.' => self.number(),
            c if c.is_ascii_alphabetic() => {
                let name = self.identifier();
                if self.peek() == Some('(') {
                    self.pos += 1;
                    self.function(&name)
                } else {
                    self.env.constant(&name)
                }
            },
            _ => None,
        }
    }

    fn integer(&mut self) -> Option<usize> {
        let start = self.pos;
        while self.chars.get(self.pos).is_some_and(char::is_ascii_digit) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect::<String>().parse().ok()
    }

    fn number(&mut self) -> Option<f64> {
        let start = self.pos;
        while self
            .chars
            .get(self.pos)
            .is_some_and(|c| c.is_ascii_digit() || *c == '.' || *c == 'e' || *c == 'E')
        {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        fast_float2::parse(&text).ok()
    }

    fn identifier(&mut self) -> String {
        let start = self.pos;
        while self.chars.get(self.pos).is_some_and(char::is_ascii_alphanumeric) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn arguments(&mut self) -> Option<Vec<f64>> {
        let mut args = Vec::new();
        if self.eat(')') {
            return Some(args);
        }
        loop {
            args.push(self.expression()?);
            if self.eat(',') {
                continue;
            }
            return self.eat(')').then_some(args);
        }
    }

    fn function(&mut self, name: &str) -> Option<f64> {
        let args = self.arguments()?;
        let value = match (name, args.as_slice()) {
            ("sin", [a]) => a.sin(),
            ("cos", [a]) => a.cos(),
            ("tan", [a]) => a.tan(),
            ("atan", [a]) => a.atan(),
            // producers write atan2(y, x)
            ("atan2", [a, b]) => a.atan2(*b),
            ("sqrt", [a]) => a.max(0.0).sqrt(),
            ("abs", [a]) => a.abs(),
            ("min", [a, b]) => a.min(*b),
            ("max", [a, b]) => a.max(*b),
            ("if", [c, a, b]) => {
                if *c > 0.0 {
                    *a
                } else {
                    *b
                }
            },
            _ => {
                log::debug!("Unsupported shape function '{}' with {} arguments", name, args.len());
                return None;
            },
        };
        Some(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Segment {
    Move(f64, f64),
    Line(f64, f64),
    Curve([f64; 6]),
    Close,
}

/// One subpath with its paint flags
#[derive(Debug, Clone, PartialEq)]
struct SubPath {
    segments: Vec<Segment>,
    fill: bool,
    stroke: bool,
}

fn tokenize_path(path: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for ch in path.chars() {
        if ch.is_whitespace() || ch == ',' {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
        } else if ch.is_ascii_alphabetic() && current.is_empty() {
            tokens.push(ch.to_string());
        } else {
            current.push(ch);
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn parse_path(path: &str, env: &ShapeEnvironment) -> Option<Vec<SubPath>> {
    let tokens = tokenize_path(path);
    let mut paths = Vec::new();
    let mut current = SubPath {
        segments: Vec::new(),
        fill: true,
        stroke: true,
    };
    let mut command = 'M';
    let mut i = 0;
    let take = |i: &mut usize, n: usize| -> Option<Vec<f64>> {
        let values = tokens.get(*i..*i + n)?.iter().map(|t| env.parameter(t)).collect::<Option<Vec<f64>>>()?;
        *i += n;
        Some(values)
    };
    while i < tokens.len() {
        let token = &tokens[i];
        let first = token.chars().next().unwrap_or(' ');
        if token.len() == 1 && first.is_ascii_alphabetic() {
            command = first;
            i += 1;
            match command {
                'Z' => current.segments.push(Segment::Close),
                'N' => {
                    let done = std::mem::replace(
                        &mut current,
                        SubPath {
                            segments: Vec::new(),
                            fill: true,
                            stroke: true,
                        },
                    );
                    if !done.segments.is_empty() {
                        paths.push(done);
                    }
                },
                'F' => current.fill = false,
                'S' => current.stroke = false,
                'M' | 'L' | 'C' => {},
                other => {
                    log::debug!("Unsupported custom shape path command '{}'", other);
                    return None;
                },
            }
            continue;
        }
        match command {
            'M' => {
                let v = take(&mut i, 2)?;
                current.segments.push(Segment::Move(v[0], v[1]));
                // further pairs after a moveto are linetos
                command = 'L';
            },
            'L' => {
                let v = take(&mut i, 2)?;
                current.segments.push(Segment::Line(v[0], v[1]));
            },
            'C' => {
                let v = take(&mut i, 6)?;
                current.segments.push(Segment::Curve([v[0], v[1], v[2], v[3], v[4], v[5]]));
            },
            _ => return None,
        }
    }
    if !current.segments.is_empty() {
        paths.push(current);
    }
    Some(paths)
}

/// Paint of a shape from its graphic style
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapePaint {
    /// `fill=` option value, or `None` for no fill
    pub fill: Option<String>,
    pub stroke: bool,
}

/// TikZ picture for a custom shape, or `None` if the path cannot be drawn.
pub fn shape_to_tikz(geometry: &Element, width: Length, height: Length, paint: &ShapePaint) -> Option<String> {
    let env = ShapeEnvironment::from_geometry(geometry, Some(width), Some(height));
    let path = geometry.get_attribute("draw:enhanced-path")?;
    let paths = parse_path(path, &env)?;
    if paths.is_empty() {
        return None;
    }
    let [left, top, vw, vh] = env.view_box;
    // TikZ works in cm; y grows upwards
    let w = width.points() * 2.54 / 72.0;
    let h = height.points() * 2.54 / 72.0;
    let point = |x: f64, y: f64| {
        let px = (x - left) / vw * w;
        let py = h - (y - top) / vh * h;
        format!("({},{})", format_number(px), format_number(py))
    };

    let mut out = String::from("\\begin{tikzpicture}\n");
    for sub in &paths {
        let fill = paint.fill.as_deref().filter(|_| sub.fill);
        let stroke = paint.stroke && sub.stroke;
        let command = match (fill, stroke) {
            (Some(color), true) => format!("\\filldraw[fill={}]", color),
            (Some(color), false) => format!("\\fill[fill={}]", color),
            (None, true) => "\\draw".to_string(),
            (None, false) => continue,
        };
        out.push_str(&command);
        for (k, segment) in sub.segments.iter().enumerate() {
            match *segment {
                Segment::Move(x, y) => {
                    out.push(' ');
                    out.push_str(&point(x, y));
                },
                Segment::Line(x, y) => {
                    if k > 0 {
                        out.push_str(" --");
                    }
                    out.push(' ');
                    out.push_str(&point(x, y));
                },
                Segment::Curve([x1, y1, x2, y2, x, y]) => {
                    out.push_str(&format!(
                        " .. controls {} and {} .. {}",
                        point(x1, y1),
                        point(x2, y2),
                        point(x, y)
                    ));
                },
                Segment::Close => out.push_str(" -- cycle"),
            }
        }
        out.push_str(";\n");
    }
    out.push_str("\\end{tikzpicture}");
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> ShapeEnvironment {
        ShapeEnvironment {
            modifiers: vec![5400.0, 2.0],
            equations: vec!["$0 * 2".to_string(), "?f0 + width / 2".to_string(), "?f3".to_string(), "?f2".to_string()],
            view_box: [0.0, 0.0, 21600.0, 21600.0],
            logical_size: (1000.0, 500.0),
        }
    }

    #[test]
    fn test_arithmetic_and_references() {
        let env = env();
        assert_eq!(env.evaluate("1 + 2 * 3"), Some(7.0));
        assert_eq!(env.evaluate("(1 + 2) * 3"), Some(9.0));
        assert_eq!(env.evaluate("-$1 - 1"), Some(-3.0));
        assert_eq!(env.evaluate("?f1"), Some(21600.0));
        assert_eq!(env.evaluate("logwidth / 4"), Some(250.0));
        assert_eq!(env.evaluate("1 +"), None);
    }

    #[test]
    fn test_functions() {
        let env = env();
        assert_eq!(env.evaluate("max(3, min(10, 4))"), Some(4.0));
        assert_eq!(env.evaluate("if(0, 1, 2)"), Some(2.0));
        assert_eq!(env.evaluate("if($0, 1, 2)"), Some(1.0));
        let angle = env.evaluate("atan2(1, 0)").unwrap();
        assert!((angle - PI / 2.0).abs() < 1e-12);
        assert!((env.evaluate("sin(pi / 2)").unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(env.evaluate("sqrt(16) + abs(-1)"), Some(5.0));
        assert_eq!(env.evaluate("unknown(1)"), None);
    }

    #[test]
    fn test_cyclic_equations() {
        assert_eq!(env().evaluate("?f2"), None);
    }

    #[test]
    fn test_rectangle_to_tikz() {
        let geometry = Element::new("draw:enhanced-geometry")
            .with_attribute("svg:viewBox", "0 0 100 100")
            .with_attribute("draw:enhanced-path", "M 0 0 L 100 0 100 100 0 100 Z N");
        let tikz = shape_to_tikz(
            &geometry,
            Length::parse("2cm").unwrap(),
            Length::parse("1cm").unwrap(),
            &ShapePaint {
                fill: None,
                stroke: true,
            },
        )
        .unwrap();
        assert_eq!(
            tikz,
            "\\begin{tikzpicture}\n\\draw (0,1) -- (2,1) -- (2,0) -- (0,0) -- cycle;\n\\end{tikzpicture}"
        );
    }

    #[test]
    fn test_unsupported_command() {
        let geometry = Element::new("draw:enhanced-geometry")
            .with_attribute("draw:enhanced-path", "U 10800 10800 10800 10800 0 360 Z N");
        let size = Length::parse("1cm").unwrap();
        assert!(shape_to_tikz(&geometry, size, size, &ShapePaint::default()).is_none());
    }
}
