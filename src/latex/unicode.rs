//! Character substitution tables.
//!
//! Text is converted with a leftmost-longest automaton over a table of
//! patterns. Each entry names the encoding capabilities its replacement
//! needs; a table built for a profile only contains entries the profile
//! supports, with the first supported entry winning for a pattern.

use aho_corasick::{AhoCorasick, MatchKind};
use bitflags::bitflags;
use phf::{Map, phf_map};
use std::collections::HashSet;

bitflags! {
    /// What the output encoding profile can represent.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Encodings: u16 {
        /// Printable ASCII can be written directly
        const ASCII = 1 << 0;
        /// Latin-1 characters can be written directly (`inputenc` latin1)
        const LATIN1 = 1 << 1;
        /// Latin-1 and Latin Extended-A can be written directly (`inputenc` utf8)
        const UTF8 = 1 << 2;
        /// T1 font encoding glyphs (guillemets, eth, thorn, ogonek)
        const T1 = 1 << 3;
        /// `textcomp` symbols
        const TEXTCOMP = 1 << 4;
        /// Every character can be written directly (XeTeX)
        const UNICODE = 1 << 5;
    }
}

/// One table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Substitution {
    pub pattern: &'static str,
    pub latex: &'static str,
    pub requires: Encodings,
    pub package: Option<&'static str>,
}

const fn sub(pattern: &'static str, latex: &'static str) -> Substitution {
    Substitution {
        pattern,
        latex,
        requires: Encodings::empty(),
        package: None,
    }
}

const fn sub_if(pattern: &'static str, latex: &'static str, requires: Encodings) -> Substitution {
    Substitution {
        pattern,
        latex,
        requires,
        package: None,
    }
}

const fn sub_pkg(pattern: &'static str, latex: &'static str, package: &'static str) -> Substitution {
    Substitution {
        pattern,
        latex,
        requires: Encodings::empty(),
        package: Some(package),
    }
}

const T1: Encodings = Encodings::T1;
const TC: Encodings = Encodings::TEXTCOMP;

/// Substitutions for ordinary text.
pub static TEXT_SUBSTITUTIONS: &[Substitution] = &[
    // LaTeX special characters
    sub("\\", "\\textbackslash{}"),
    sub("{", "\\{"),
    sub("}", "\\}"),
    sub("$", "\\$"),
    sub("%", "\\%"),
    sub("&", "\\&"),
    sub("#", "\\#"),
    sub("_", "\\_"),
    sub("~", "\\textasciitilde{}"),
    sub("^", "\\textasciicircum{}"),
    sub_if("<", "\\textless{}", T1),
    sub("<", "\\ensuremath{<}"),
    sub_if(">", "\\textgreater{}", T1),
    sub(">", "\\ensuremath{>}"),
    sub_if("|", "\\textbar{}", T1),
    sub("|", "\\ensuremath{|}"),
    sub_if("\"", "\\textquotedbl{}", T1),
    sub("\"", "{''}"),
    // ligature breakers
    sub("--", "-{}-"),
    sub("!`", "!{}`"),
    sub("?`", "?{}`"),
    sub(",,", ",{},"),
    // spaces and hyphens
    sub("\u{a0}", "~"),
    sub("\u{ad}", "\\-"),
    sub("\u{2002}", "\\enspace{}"),
    sub("\u{2003}", "\\quad{}"),
    sub("\u{2009}", "\\,"),
    sub("\u{200b}", "\\hspace{0pt}"),
    sub("\u{2010}", "-"),
    sub("\u{2011}", "\\mbox{-}"),
    // punctuation
    sub("\u{2013}", "--"),
    sub("\u{2014}", "---"),
    sub("\u{2018}", "`"),
    sub("\u{2019}", "'"),
    sub("\u{201c}", "``"),
    sub("\u{201d}", "''"),
    sub_if("\u{201a}", "\\quotesinglbase{}", T1),
    sub("\u{201a}", ","),
    sub_if("\u{201e}", "\\quotedblbase{}", T1),
    sub("\u{201e}", ",,"),
    sub_if("«", "\\guillemotleft{}", T1),
    sub("«", "\\ensuremath{\\ll}"),
    sub_if("»", "\\guillemotright{}", T1),
    sub("»", "\\ensuremath{\\gg}"),
    sub_if("\u{2039}", "\\guilsinglleft{}", T1),
    sub("\u{2039}", "\\ensuremath{<}"),
    sub_if("\u{203a}", "\\guilsinglright{}", T1),
    sub("\u{203a}", "\\ensuremath{>}"),
    sub("\u{2026}", "\\dots{}"),
    sub_if("\u{2022}", "\\textbullet{}", TC),
    sub("\u{2022}", "\\ensuremath{\\bullet}"),
    sub("†", "\\dag{}"),
    sub("‡", "\\ddag{}"),
    sub("§", "\\S{}"),
    sub("¶", "\\P{}"),
    sub("¡", "!`"),
    sub("¿", "?`"),
    // symbols
    sub("©", "\\copyright{}"),
    sub("®", "\\textregistered{}"),
    sub("™", "\\texttrademark{}"),
    sub_if("°", "\\textdegree{}", TC),
    sub("°", "\\ensuremath{^\\circ}"),
    sub_if("€", "\\texteuro{}", TC),
    sub("€", "EUR"),
    sub("£", "\\pounds{}"),
    sub_if("¥", "\\textyen{}", TC),
    sub_if("¢", "\\textcent{}", TC),
    sub_if("¤", "\\textcurrency{}", TC),
    sub_if("×", "\\texttimes{}", TC),
    sub("×", "\\ensuremath{\\times}"),
    sub_if("÷", "\\textdiv{}", TC),
    sub("÷", "\\ensuremath{\\div}"),
    sub_if("±", "\\textpm{}", TC),
    sub("±", "\\ensuremath{\\pm}"),
    sub_if("µ", "\\textmu{}", TC),
    sub("µ", "\\ensuremath{\\mu}"),
    sub_if("¹", "\\textonesuperior{}", TC),
    sub("¹", "\\ensuremath{^1}"),
    sub_if("²", "\\texttwosuperior{}", TC),
    sub("²", "\\ensuremath{^2}"),
    sub_if("³", "\\textthreesuperior{}", TC),
    sub("³", "\\ensuremath{^3}"),
    sub_if("¼", "\\textonequarter{}", TC),
    sub_if("½", "\\textonehalf{}", TC),
    sub_if("¾", "\\textthreequarters{}", TC),
    sub_if("¬", "\\textlnot{}", TC),
    sub("¬", "\\ensuremath{\\neg}"),
    sub_if("¦", "\\textbrokenbar{}", TC),
    sub_if("·", "\\textperiodcentered{}", TC),
    sub("·", "\\ensuremath{\\cdot}"),
    sub("ª", "\\textordfeminine{}"),
    sub("º", "\\textordmasculine{}"),
    sub_if("‰", "\\textperthousand{}", TC),
    sub_if("№", "\\textnumero{}", TC),
    sub_pkg("✓", "\\checkmark{}", "amssymb"),
    // Latin-1 letters
    sub("À", "\\`A"),
    sub("Á", "\\'A"),
    sub("Â", "\\^A"),
    sub("Ã", "\\~A"),
    sub("Ä", "\\\"A"),
    sub("Å", "\\AA{}"),
    sub("Æ", "\\AE{}"),
    sub("Ç", "\\c{C}"),
    sub("È", "\\`E"),
    sub("É", "\\'E"),
    sub("Ê", "\\^E"),
    sub("Ë", "\\\"E"),
    sub("Ì", "\\`I"),
    sub("Í", "\\'I"),
    sub("Î", "\\^I"),
    sub("Ï", "\\\"I"),
    sub_if("Ð", "\\DH{}", T1),
    sub("Ñ", "\\~N"),
    sub("Ò", "\\`O"),
    sub("Ó", "\\'O"),
    sub("Ô", "\\^O"),
    sub("Õ", "\\~O"),
    sub("Ö", "\\\"O"),
    sub("Ø", "\\O{}"),
    sub("Ù", "\\`U"),
    sub("Ú", "\\'U"),
    sub("Û", "\\^U"),
    sub("Ü", "\\\"U"),
    sub("Ý", "\\'Y"),
    sub_if("Þ", "\\TH{}", T1),
    sub("ß", "\\ss{}"),
    sub("à", "\\`a"),
    sub("á", "\\'a"),
    sub("â", "\\^a"),
    sub("ã", "\\~a"),
    sub("ä", "\\\"a"),
    sub("å", "\\aa{}"),
    sub("æ", "\\ae{}"),
    sub("ç", "\\c{c}"),
    sub("è", "\\`e"),
    sub("é", "\\'e"),
    sub("ê", "\\^e"),
    sub("ë", "\\\"e"),
    sub("ì", "\\`\\i{}"),
    sub("í", "\\'\\i{}"),
    sub("î", "\\^\\i{}"),
    sub("ï", "\\\"\\i{}"),
    sub_if("ð", "\\dh{}", T1),
    sub("ñ", "\\~n"),
    sub("ò", "\\`o"),
    sub("ó", "\\'o"),
    sub("ô", "\\^o"),
    sub("õ", "\\~o"),
    sub("ö", "\\\"o"),
    sub("ø", "\\o{}"),
    sub("ù", "\\`u"),
    sub("ú", "\\'u"),
    sub("û", "\\^u"),
    sub("ü", "\\\"u"),
    sub("ý", "\\'y"),
    sub_if("þ", "\\th{}", T1),
    sub("ÿ", "\\\"y"),
    // Latin Extended-A
    sub("Œ", "\\OE{}"),
    sub("œ", "\\oe{}"),
    sub("Š", "\\v{S}"),
    sub("š", "\\v{s}"),
    sub("Ž", "\\v{Z}"),
    sub("ž", "\\v{z}"),
    sub("Č", "\\v{C}"),
    sub("č", "\\v{c}"),
    sub("Ř", "\\v{R}"),
    sub("ř", "\\v{r}"),
    sub("Ě", "\\v{E}"),
    sub("ě", "\\v{e}"),
    sub("Ł", "\\L{}"),
    sub("ł", "\\l{}"),
    sub("ı", "\\i{}"),
    sub("Ő", "\\H{O}"),
    sub("ő", "\\H{o}"),
    sub("Ű", "\\H{U}"),
    sub("ű", "\\H{u}"),
    sub_if("Ą", "\\k{A}", T1),
    sub_if("ą", "\\k{a}", T1),
    sub_if("Ę", "\\k{E}", T1),
    sub_if("ę", "\\k{e}", T1),
    sub("Ć", "\\'C"),
    sub("ć", "\\'c"),
    sub("Ń", "\\'N"),
    sub("ń", "\\'n"),
    sub("Ś", "\\'S"),
    sub("ś", "\\'s"),
    sub("Ź", "\\'Z"),
    sub("ź", "\\'z"),
    sub("Ż", "\\.Z"),
    sub("ż", "\\.z"),
    sub("Ğ", "\\u{G}"),
    sub("ğ", "\\u{g}"),
    sub("Ş", "\\c{S}"),
    sub("ş", "\\c{s}"),
    sub("İ", "\\.I"),
    // Greek letters
    sub("α", "\\ensuremath{\\alpha}"),
    sub("β", "\\ensuremath{\\beta}"),
    sub("γ", "\\ensuremath{\\gamma}"),
    sub("δ", "\\ensuremath{\\delta}"),
    sub("ε", "\\ensuremath{\\epsilon}"),
    sub("ζ", "\\ensuremath{\\zeta}"),
    sub("η", "\\ensuremath{\\eta}"),
    sub("θ", "\\ensuremath{\\theta}"),
    sub("ι", "\\ensuremath{\\iota}"),
    sub("κ", "\\ensuremath{\\kappa}"),
    sub("λ", "\\ensuremath{\\lambda}"),
    sub("μ", "\\ensuremath{\\mu}"),
    sub("ν", "\\ensuremath{\\nu}"),
    sub("ξ", "\\ensuremath{\\xi}"),
    sub("π", "\\ensuremath{\\pi}"),
    sub("ρ", "\\ensuremath{\\rho}"),
    sub("σ", "\\ensuremath{\\sigma}"),
    sub("ς", "\\ensuremath{\\varsigma}"),
    sub("τ", "\\ensuremath{\\tau}"),
    sub("υ", "\\ensuremath{\\upsilon}"),
    sub("φ", "\\ensuremath{\\phi}"),
    sub("χ", "\\ensuremath{\\chi}"),
    sub("ψ", "\\ensuremath{\\psi}"),
    sub("ω", "\\ensuremath{\\omega}"),
    sub("Γ", "\\ensuremath{\\Gamma}"),
    sub("Δ", "\\ensuremath{\\Delta}"),
    sub("Θ", "\\ensuremath{\\Theta}"),
    sub("Λ", "\\ensuremath{\\Lambda}"),
    sub("Ξ", "\\ensuremath{\\Xi}"),
    sub("Π", "\\ensuremath{\\Pi}"),
    sub("Σ", "\\ensuremath{\\Sigma}"),
    sub("Υ", "\\ensuremath{\\Upsilon}"),
    sub("Φ", "\\ensuremath{\\Phi}"),
    sub("Ψ", "\\ensuremath{\\Psi}"),
    sub("Ω", "\\ensuremath{\\Omega}"),
    // mathematical symbols
    sub("\u{2212}", "\\ensuremath{-}"),
    sub("′", "\\ensuremath{'}"),
    sub("″", "\\ensuremath{''}"),
    sub("≤", "\\ensuremath{\\leq}"),
    sub("≥", "\\ensuremath{\\geq}"),
    sub("≠", "\\ensuremath{\\neq}"),
    sub("≈", "\\ensuremath{\\approx}"),
    sub("≡", "\\ensuremath{\\equiv}"),
    sub("∞", "\\ensuremath{\\infty}"),
    sub("→", "\\ensuremath{\\rightarrow}"),
    sub("←", "\\ensuremath{\\leftarrow}"),
    sub("↑", "\\ensuremath{\\uparrow}"),
    sub("↓", "\\ensuremath{\\downarrow}"),
    sub("↔", "\\ensuremath{\\leftrightarrow}"),
    sub("⇒", "\\ensuremath{\\Rightarrow}"),
    sub("⇐", "\\ensuremath{\\Leftarrow}"),
    sub("⇔", "\\ensuremath{\\Leftrightarrow}"),
    sub("∑", "\\ensuremath{\\sum}"),
    sub("∏", "\\ensuremath{\\prod}"),
    sub("√", "\\ensuremath{\\surd}"),
    sub("∂", "\\ensuremath{\\partial}"),
    sub("∫", "\\ensuremath{\\int}"),
    sub("∈", "\\ensuremath{\\in}"),
    sub("∉", "\\ensuremath{\\notin}"),
    sub("∀", "\\ensuremath{\\forall}"),
    sub("∃", "\\ensuremath{\\exists}"),
    sub("∅", "\\ensuremath{\\emptyset}"),
    sub("∩", "\\ensuremath{\\cap}"),
    sub("∪", "\\ensuremath{\\cup}"),
    sub("⊂", "\\ensuremath{\\subset}"),
    sub("⊆", "\\ensuremath{\\subseteq}"),
    sub("∧", "\\ensuremath{\\wedge}"),
    sub("∨", "\\ensuremath{\\vee}"),
    sub("∇", "\\ensuremath{\\nabla}"),
    sub("∝", "\\ensuremath{\\propto}"),
];

/// Symbol font code points (and their Private Use Area aliases) mapped to
/// LaTeX. Used when a run is set in Symbol or OpenSymbol.
pub static SYMBOL_FONT: Map<char, &'static str> = phf_map! {
    'a' => "\\ensuremath{\\alpha}",
    'b' => "\\ensuremath{\\beta}",
    'c' => "\\ensuremath{\\chi}",
    'd' => "\\ensuremath{\\delta}",
    'e' => "\\ensuremath{\\epsilon}",
    'f' => "\\ensuremath{\\phi}",
    'g' => "\\ensuremath{\\gamma}",
    'h' => "\\ensuremath{\\eta}",
    'i' => "\\ensuremath{\\iota}",
    'j' => "\\ensuremath{\\varphi}",
    'k' => "\\ensuremath{\\kappa}",
    'l' => "\\ensuremath{\\lambda}",
    'm' => "\\ensuremath{\\mu}",
    'n' => "\\ensuremath{\\nu}",
    'o' => "o",
    'p' => "\\ensuremath{\\pi}",
    'q' => "\\ensuremath{\\theta}",
    'r' => "\\ensuremath{\\rho}",
    's' => "\\ensuremath{\\sigma}",
    't' => "\\ensuremath{\\tau}",
    'u' => "\\ensuremath{\\upsilon}",
    'v' => "\\ensuremath{\\varpi}",
    'w' => "\\ensuremath{\\omega}",
    'x' => "\\ensuremath{\\xi}",
    'y' => "\\ensuremath{\\psi}",
    'z' => "\\ensuremath{\\zeta}",
    'D' => "\\ensuremath{\\Delta}",
    'F' => "\\ensuremath{\\Phi}",
    'G' => "\\ensuremath{\\Gamma}",
    'L' => "\\ensuremath{\\Lambda}",
    'P' => "\\ensuremath{\\Pi}",
    'Q' => "\\ensuremath{\\Theta}",
    'S' => "\\ensuremath{\\Sigma}",
    'U' => "\\ensuremath{\\Upsilon}",
    'W' => "\\ensuremath{\\Omega}",
    'X' => "\\ensuremath{\\Xi}",
    'Y' => "\\ensuremath{\\Psi}",
    '\u{a3}' => "\\ensuremath{\\leq}",
    '\u{b3}' => "\\ensuremath{\\geq}",
    '\u{b9}' => "\\ensuremath{\\neq}",
    '\u{a5}' => "\\ensuremath{\\infty}",
    '\u{ae}' => "\\ensuremath{\\rightarrow}",
    '\u{ac}' => "\\ensuremath{\\leftarrow}",
    '\u{b1}' => "\\ensuremath{\\pm}",
    '\u{b4}' => "\\ensuremath{\\times}",
    '\u{b8}' => "\\ensuremath{\\div}",
    '\u{b7}' => "\\ensuremath{\\bullet}",
    '\u{d6}' => "\\ensuremath{\\surd}",
    '\u{e5}' => "\\ensuremath{\\sum}",
};

/// Look up a Symbol font character, folding the Private Use Area alias.
pub fn symbol_font_char(ch: char) -> Option<&'static str> {
    let code = ch as u32;
    let folded = if (0xF020..=0xF0FF).contains(&code) {
        char::from_u32(code - 0xF000).unwrap_or(ch)
    } else {
        ch
    };
    SYMBOL_FONT.get(&folded).copied()
}

/// Can `ch` be written without substitution under `caps`?
pub fn is_direct(ch: char, caps: Encodings) -> bool {
    let code = ch as u32;
    if ch.is_ascii() {
        return !ch.is_ascii_control() && !"\\{}$%&#_~^<>|\"".contains(ch);
    }
    if code == 0xA0 || code == 0xAD {
        return false;
    }
    if caps.contains(Encodings::UNICODE) {
        return true;
    }
    if caps.contains(Encodings::UTF8) && (0xA1..=0x17F).contains(&code) {
        return true;
    }
    caps.contains(Encodings::LATIN1) && (0xA1..=0xFF).contains(&code)
}

/// A substitution table specialised for one encoding profile.
#[derive(Debug, Clone)]
pub struct SubstitutionTable {
    automaton: Option<AhoCorasick>,
    entries: Vec<Substitution>,
    caps: Encodings,
}

impl SubstitutionTable {
    /// Keep, for every pattern, the first entry whose requirements `caps`
    /// satisfies; single characters written directly under `caps` are
    /// dropped.
    pub fn new(table: &[Substitution], caps: Encodings) -> Self {
        let mut seen: HashSet<&'static str> = HashSet::new();
        let mut entries = Vec::new();
        for entry in table {
            if !caps.contains(entry.requires) || seen.contains(entry.pattern) {
                continue;
            }
            let mut chars = entry.pattern.chars();
            if let (Some(ch), None) = (chars.next(), chars.next())
                && is_direct(ch, caps)
            {
                continue;
            }
            seen.insert(entry.pattern);
            entries.push(*entry);
        }
        let automaton = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .build(entries.iter().map(|e| e.pattern))
            .map_err(|e| log::warn!("Substitution table unavailable: {}", e))
            .ok();
        Self {
            automaton,
            entries,
            caps,
        }
    }

    pub fn capabilities(&self) -> Encodings {
        self.caps
    }

    /// Convert `text`, recording packages needed by the replacements.
    pub fn convert(&self, text: &str, packages: &mut Vec<&'static str>) -> String {
        let mut out = String::with_capacity(text.len() + text.len() / 8);
        let Some(automaton) = &self.automaton else {
            self.push_plain(text, &mut out);
            return out;
        };
        let mut last = 0;
        for m in automaton.find_iter(text) {
            self.push_plain(&text[last..m.start()], &mut out);
            let entry = &self.entries[m.pattern().as_usize()];
            out.push_str(entry.latex);
            if let Some(package) = entry.package
                && !packages.contains(&package)
            {
                packages.push(package);
            }
            last = m.end();
        }
        self.push_plain(&text[last..], &mut out);
        out
    }

    fn push_plain(&self, text: &str, out: &mut String) {
        for ch in text.chars() {
            if is_direct(ch, self.caps) {
                out.push(ch);
            } else if ch.is_whitespace() || ch.is_control() {
                out.push(' ');
            } else {
                match ch {
                    '\\' => out.push_str("\\textbackslash{}"),
                    '{' | '}' | '$' | '%' | '&' | '#' | '_' => {
                        out.push('\\');
                        out.push(ch);
                    },
                    '~' => out.push_str("\\textasciitilde{}"),
                    '^' => out.push_str("\\textasciicircum{}"),
                    '<' | '>' | '|' => {
                        out.push_str("\\ensuremath{");
                        out.push(ch);
                        out.push('}');
                    },
                    '"' => out.push_str("{''}"),
                    _ => {
                        log::debug!("No LaTeX substitution for U+{:04X}", ch as u32);
                        out.push('?');
                    },
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdftex() -> Encodings {
        Encodings::ASCII | Encodings::T1 | Encodings::TEXTCOMP
    }

    #[test]
    fn test_specials_and_ligatures() {
        let table = SubstitutionTable::new(TEXT_SUBSTITUTIONS, pdftex());
        let mut packages = Vec::new();
        assert_eq!(table.convert("50% & $5 -- #1_a", &mut packages), "50\\% \\& \\$5 -{}- \\#1\\_a");
        assert_eq!(table.convert("a\\b{c}", &mut packages), "a\\textbackslash{}b\\{c\\}");
        assert_eq!(table.convert("x---y", &mut packages), "x-{}--y");
    }

    #[test]
    fn test_capability_selection() {
        let mut packages = Vec::new();
        let ascii = SubstitutionTable::new(TEXT_SUBSTITUTIONS, Encodings::ASCII);
        assert_eq!(ascii.convert("«°»", &mut packages), "\\ensuremath{\\ll}\\ensuremath{^\\circ}\\ensuremath{\\gg}");
        let t1 = SubstitutionTable::new(TEXT_SUBSTITUTIONS, pdftex());
        assert_eq!(t1.convert("«°»", &mut packages), "\\guillemotleft{}\\textdegree{}\\guillemotright{}");
        assert_eq!(t1.convert("café", &mut packages), "caf\\'e");
        let utf8 = SubstitutionTable::new(TEXT_SUBSTITUTIONS, pdftex() | Encodings::UTF8);
        assert_eq!(utf8.convert("café\u{a0}ok", &mut packages), "café~ok");
    }

    #[test]
    fn test_packages_and_fallback() {
        let table = SubstitutionTable::new(TEXT_SUBSTITUTIONS, pdftex());
        let mut packages = Vec::new();
        assert_eq!(table.convert("✓", &mut packages), "\\checkmark{}");
        assert_eq!(packages, vec!["amssymb"]);
        assert_eq!(table.convert("\u{4e2d}", &mut packages), "?");
        let xetex = SubstitutionTable::new(TEXT_SUBSTITUTIONS, pdftex() | Encodings::UNICODE);
        assert_eq!(xetex.convert("\u{4e2d}&", &mut packages), "\u{4e2d}\\&");
    }

    #[test]
    fn test_symbol_font() {
        assert_eq!(symbol_font_char('a'), Some("\\ensuremath{\\alpha}"));
        assert_eq!(symbol_font_char('\u{f061}'), Some("\\ensuremath{\\alpha}"));
        assert_eq!(symbol_font_char('1'), None);
    }
}
