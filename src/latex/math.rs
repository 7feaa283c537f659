//! Math formula conversion.
//!
//! Formulas arrive as MathML trees, either embedded objects
//! (`Object 1/content.xml`) or inline `math:math` elements. The
//! [`MathConverter`] contract returns LaTeX math-mode markup; a single space
//! is the sentinel for "empty formula, suppress output".

use crate::odf::element::{Element, ElementBase, Node};
use phf::{Map, Set, phf_map, phf_set};

/// Returned for formulas that produce no output
pub const EMPTY_FORMULA: &str = " ";

/// Math formula conversion contract
pub trait MathConverter {
    /// Convert a `math:math` element to math-mode LaTeX
    fn convert(&self, formula: &Element) -> String;
}

/// Unicode characters with a math-mode command
static MATH_SYMBOLS: Map<char, &'static str> = phf_map! {
    'α' => "\\alpha",
    'β' => "\\beta",
    'γ' => "\\gamma",
    'δ' => "\\delta",
    'ε' => "\\varepsilon",
    'ϵ' => "\\epsilon",
    'ζ' => "\\zeta",
    'η' => "\\eta",
    'θ' => "\\theta",
    'ϑ' => "\\vartheta",
    'ι' => "\\iota",
    'κ' => "\\kappa",
    'λ' => "\\lambda",
    'μ' => "\\mu",
    'ν' => "\\nu",
    'ξ' => "\\xi",
    'π' => "\\pi",
    'ρ' => "\\rho",
    'σ' => "\\sigma",
    'ς' => "\\varsigma",
    'τ' => "\\tau",
    'υ' => "\\upsilon",
    'φ' => "\\varphi",
    'ϕ' => "\\phi",
    'χ' => "\\chi",
    'ψ' => "\\psi",
    'ω' => "\\omega",
    'Γ' => "\\Gamma",
    'Δ' => "\\Delta",
    'Θ' => "\\Theta",
    'Λ' => "\\Lambda",
    'Ξ' => "\\Xi",
    'Π' => "\\Pi",
    'Σ' => "\\Sigma",
    'Υ' => "\\Upsilon",
    'Φ' => "\\Phi",
    'Ψ' => "\\Psi",
    'Ω' => "\\Omega",

    '∑' => "\\sum",
    '∏' => "\\prod",
    '∐' => "\\coprod",
    '∫' => "\\int",
    '∬' => "\\iint",
    '∮' => "\\oint",
    '∂' => "\\partial",
    '∇' => "\\nabla",
    '∞' => "\\infty",
    '∅' => "\\emptyset",
    '∀' => "\\forall",
    '∃' => "\\exists",
    '¬' => "\\neg",
    '∧' => "\\wedge",
    '∨' => "\\vee",
    '∩' => "\\cap",
    '∪' => "\\cup",
    '⊂' => "\\subset",
    '⊃' => "\\supset",
    '⊆' => "\\subseteq",
    '⊇' => "\\supseteq",
    '∈' => "\\in",
    '∉' => "\\notin",
    '∋' => "\\ni",
    '≠' => "\\neq",
    '≤' => "\\leq",
    '≥' => "\\geq",
    '≪' => "\\ll",
    '≫' => "\\gg",
    '≈' => "\\approx",
    '≡' => "\\equiv",
    '≅' => "\\cong",
    '∼' => "\\sim",
    '≃' => "\\simeq",
    '∝' => "\\propto",
    '±' => "\\pm",
    '∓' => "\\mp",
    '×' => "\\times",
    '÷' => "\\div",
    '·' => "\\cdot",
    '⋅' => "\\cdot",
    '∘' => "\\circ",
    '∗' => "\\ast",
    '−' => "-",
    '′' => "'",
    '″' => "''",
    '…' => "\\ldots",
    '⋯' => "\\cdots",
    '⋮' => "\\vdots",
    '⋱' => "\\ddots",
    '→' => "\\rightarrow",
    '←' => "\\leftarrow",
    '↔' => "\\leftrightarrow",
    '⇒' => "\\Rightarrow",
    '⇐' => "\\Leftarrow",
    '⇔' => "\\Leftrightarrow",
    '↦' => "\\mapsto",
    '⊥' => "\\perp",
    '∥' => "\\parallel",
    '∠' => "\\angle",
    '⟨' => "\\langle",
    '⟩' => "\\rangle",
    '⌈' => "\\lceil",
    '⌉' => "\\rceil",
    '⌊' => "\\lfloor",
    '⌋' => "\\rfloor",
    'ℏ' => "\\hbar",
    'ℓ' => "\\ell",
    'ℵ' => "\\aleph",
    '{' => "\\{",
    '}' => "\\}",
    '%' => "\\%",
    '#' => "\\#",
    '&' => "\\&",
    '$' => "\\$",
    '_' => "\\_",
    '\\' => "\\backslash",
};

/// Identifiers typeset as upright operator names
static FUNCTION_NAMES: Set<&'static str> = phf_set! {
    "sin", "cos", "tan", "cot", "sec", "csc",
    "arcsin", "arccos", "arctan",
    "sinh", "cosh", "tanh", "coth",
    "exp", "log", "ln", "lg",
    "lim", "liminf", "limsup", "sup", "inf", "max", "min",
    "det", "dim", "ker", "deg", "gcd", "arg", "Pr", "hom",
};

/// Accents written with `mover`
static ACCENTS: Map<&'static str, &'static str> = phf_map! {
    "^" => "\\hat",
    "ˆ" => "\\hat",
    "~" => "\\tilde",
    "˜" => "\\tilde",
    "¯" => "\\overline",
    "‾" => "\\overline",
    "→" => "\\vec",
    "⃗" => "\\vec",
    "˙" => "\\dot",
    "¨" => "\\ddot",
    "˘" => "\\breve",
    "ˇ" => "\\check",
};

/// MathML to LaTeX for the presentation-markup subset office suites write.
#[derive(Debug, Clone, Copy, Default)]
pub struct MathMlConverter;

impl MathConverter for MathMlConverter {
    fn convert(&self, formula: &Element) -> String {
        let mut out = String::new();
        convert_node(formula, &mut out);
        let trimmed = out.trim();
        if trimmed.is_empty() {
            EMPTY_FORMULA.to_string()
        } else {
            trimmed.to_string()
        }
    }
}

/// Locate the `math:math` element of a formula object.
pub fn find_formula(root: &Element) -> Option<&Element> {
    if root.local_name() == "math" {
        return Some(root);
    }
    root.find_descendant(|e| e.local_name() == "math")
}

fn convert_node(e: &Element, out: &mut String) {
    let children: Vec<&Element> = e.child_elements().collect();
    match e.local_name() {
        "math" | "mrow" | "mstyle" | "mpadded" | "merror" | "mtd" => {
            for child in children {
                convert_node(child, out);
            }
        },
        "semantics" => {
            if let Some(first) = children.first() {
                convert_node(first, out);
            }
        },
        "annotation" | "annotation-xml" | "mphantom" => {},
        "mi" => convert_identifier(e, out),
        "mn" => push_symbols(&text_of(e), out),
        "mo" => {
            let text = text_of(e);
            match text.as_str() {
                "(" | ")" | "[" | "]" | "|" => out.push_str(&text),
                _ => push_symbols(&text, out),
            }
        },
        "mtext" => {
            let text = text_of(e);
            if !text.trim().is_empty() {
                out.push_str("\\mbox{");
                out.push_str(&escape_text(&text));
                out.push('}');
            }
        },
        "ms" => {
            out.push_str("\\mbox{``");
            out.push_str(&escape_text(&text_of(e)));
            out.push_str("''}");
        },
        "mspace" => out.push_str("\\,"),
        "msup" => script(&children, &["^"], out),
        "msub" => script(&children, &["_"], out),
        "msubsup" => script(&children, &["_", "^"], out),
        "munder" => script(&children, &["_"], out),
        "munderover" => script(&children, &["_", "^"], out),
        "mover" => {
            let accent = children
                .get(1)
                .filter(|c| c.local_name() == "mo")
                .and_then(|c| ACCENTS.get(text_of(c).as_str()));
            match (accent, children.first()) {
                (Some(command), Some(base)) => {
                    out.push_str(command);
                    out.push_str(&group(base));
                },
                _ => script(&children, &["^"], out),
            }
        },
        "mfrac" => {
            if let [num, den, ..] = children.as_slice() {
                let command = if e.get_attribute("linethickness") == Some("0") {
                    "\\genfrac{}{}{0pt}{}"
                } else {
                    "\\frac"
                };
                out.push_str(command);
                out.push_str(&group(num));
                out.push_str(&group(den));
            }
        },
        "msqrt" => {
            out.push_str("\\sqrt{");
            for child in children {
                convert_node(child, out);
            }
            out.push('}');
        },
        "mroot" => {
            if let [base, index, ..] = children.as_slice() {
                out.push_str("\\sqrt[");
                convert_node(index, out);
                out.push(']');
                out.push_str(&group(base));
            }
        },
        "mfenced" => {
            let open = e.get_attribute("open").unwrap_or("(");
            let close = e.get_attribute("close").unwrap_or(")");
            let separator = e.get_attribute("separators").unwrap_or(",");
            out.push_str("\\left");
            out.push_str(fence(open));
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    out.push_str(separator.trim());
                }
                convert_node(child, out);
            }
            out.push_str("\\right");
            out.push_str(fence(close));
        },
        "mtable" => {
            let columns = children
                .iter()
                .map(|row| row.child_elements().count())
                .max()
                .unwrap_or(1)
                .max(1);
            out.push_str("\\begin{array}{");
            out.push_str(&"c".repeat(columns));
            out.push('}');
            for (i, row) in children.iter().enumerate() {
                if i > 0 {
                    out.push_str("\\\\");
                }
                for (j, cell) in row.child_elements().enumerate() {
                    if j > 0 {
                        out.push('&');
                    }
                    convert_node(cell, out);
                }
            }
            out.push_str("\\end{array}");
        },
        other => {
            log::debug!("Unsupported MathML element '{}'", other);
            for child in children {
                convert_node(child, out);
            }
        },
    }
}

fn convert_identifier(e: &Element, out: &mut String) {
    let text = text_of(e);
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    if FUNCTION_NAMES.contains(text) {
        out.push('\\');
        out.push_str(text);
        out.push(' ');
        return;
    }
    let single = text.chars().count() == 1;
    let upright = e.get_attribute("mathvariant") == Some("normal");
    if single && !upright {
        push_symbols(text, out);
    } else if single {
        out.push_str("\\mathrm{");
        push_symbols(text, out);
        out.push('}');
    } else {
        out.push_str("\\mathit{");
        push_symbols(text, out);
        out.push('}');
    }
}

fn script(children: &[&Element], operators: &[&str], out: &mut String) {
    let Some((base, scripts)) = children.split_first() else {
        return;
    };
    out.push_str(&group(base));
    for (op, script) in operators.iter().zip(scripts) {
        out.push_str(op);
        out.push_str(&group(script));
    }
}

fn group(e: &Element) -> String {
    let mut inner = String::new();
    convert_node(e, &mut inner);
    format!("{{{}}}", inner.trim())
}

fn fence(delimiter: &str) -> &str {
    match delimiter {
        "" => ".",
        "{" => "\\{",
        "}" => "\\}",
        "⟨" => "\\langle",
        "⟩" => "\\rangle",
        "‖" => "\\|",
        other => other,
    }
}

fn push_symbols(text: &str, out: &mut String) {
    for ch in text.chars() {
        match MATH_SYMBOLS.get(&ch) {
            Some(command) => {
                out.push_str(command);
                if command.ends_with(|c: char| c.is_ascii_alphabetic()) {
                    out.push(' ');
                }
            },
            None if ch.is_whitespace() => {},
            None => out.push(ch),
        }
    }
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\textbackslash{}"),
            '{' | '}' | '%' | '#' | '&' | '$' | '_' => {
                out.push('\\');
                out.push(ch);
            },
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            _ => out.push(ch),
        }
    }
    out
}

fn text_of(e: &Element) -> String {
    let mut text = String::new();
    for child in e.children() {
        match child {
            Node::Text(t) => text.push_str(t),
            Node::Element(inner) => text.push_str(&text_of(inner)),
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::odf::parser::parse_xml;

    fn convert(xml: &str) -> String {
        let root = parse_xml(xml.as_bytes()).unwrap();
        MathMlConverter.convert(find_formula(&root).unwrap())
    }

    #[test]
    fn test_fraction_and_scripts() {
        let xml = r#"<math:math><math:semantics><math:mrow>
<math:mfrac><math:mi>a</math:mi><math:mn>2</math:mn></math:mfrac>
<math:mo>+</math:mo>
<math:msup><math:mi>x</math:mi><math:mn>2</math:mn></math:msup>
</math:mrow><math:annotation encoding="StarMath 5.0">a over 2 + x^2</math:annotation>
</math:semantics></math:math>"#;
        assert_eq!(convert(xml), "\\frac{a}{2}+{x}^{2}");
    }

    #[test]
    fn test_symbols_and_functions() {
        let xml = r#"<math><mrow><mi>sin</mi><mi>α</mi><mo>≤</mo><msqrt><mi>π</mi></msqrt></mrow></math>"#;
        assert_eq!(convert(xml), "\\sin \\alpha \\leq \\sqrt{\\pi }");
    }

    #[test]
    fn test_empty_formula_sentinel() {
        let xml = r#"<math:math><math:semantics><math:annotation>x</math:annotation></math:semantics></math:math>"#;
        assert_eq!(convert(xml), EMPTY_FORMULA);
    }

    #[test]
    fn test_fenced_and_accent() {
        let xml = r#"<math><mfenced><mi>a</mi><mi>b</mi></mfenced><mover><mi>v</mi><mo>→</mo></mover></math>"#;
        assert_eq!(convert(xml), "\\left(a,b\\right)\\vec{v}");
    }
}
