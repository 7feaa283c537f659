//! End-to-end conversions of small documents.

use odf2latex::OdfDocument;
use odf2latex::latex::{LatexConfig, LatexConverter};
use std::io::Write;

const NAMESPACES: &str = concat!(
    r#"xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" "#,
    r#"xmlns:style="urn:oasis:names:tc:opendocument:xmlns:style:1.0" "#,
    r#"xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0" "#,
    r#"xmlns:table="urn:oasis:names:tc:opendocument:xmlns:table:1.0" "#,
    r#"xmlns:draw="urn:oasis:names:tc:opendocument:xmlns:drawing:1.0" "#,
    r#"xmlns:fo="urn:oasis:names:tc:opendocument:xmlns:xsl-fo-compatible:1.0" "#,
    r#"xmlns:xlink="http://www.w3.org/1999/xlink" "#,
    r#"xmlns:dc="http://purl.org/dc/elements/1.1/" "#,
    r#"xmlns:meta="urn:oasis:names:tc:opendocument:xmlns:meta:1.0" "#,
    r#"xmlns:svg="urn:oasis:names:tc:opendocument:xmlns:svg-compatible:1.0" "#,
    r#"xmlns:math="http://www.w3.org/1998/Math/MathML""#,
);

fn content(automatic_styles: &str, body: &str) -> String {
    format!(
        r#"<office:document-content {}><office:automatic-styles>{}</office:automatic-styles><office:body><office:text>{}</office:text></office:body></office:document-content>"#,
        NAMESPACES, automatic_styles, body
    )
}

fn convert_with(config: LatexConfig, body: &str) -> String {
    convert_styled(config, "", body)
}

fn convert_styled(config: LatexConfig, automatic_styles: &str, body: &str) -> String {
    let doc = OdfDocument::from_parts(&content(automatic_styles, body), None).unwrap();
    let converter = LatexConverter::new(config.with_wrap_lines_after(0)).unwrap();
    converter.convert(&doc, "test").unwrap().master_text()
}

fn convert(body: &str) -> String {
    convert_with(LatexConfig::default(), body)
}

fn note(text: &str) -> String {
    format!(
        r#"<text:note text:note-class="footnote"><text:note-citation>1</text:note-citation><text:note-body><text:p>{}</text:p></text:note-body></text:note>"#,
        text
    )
}

fn position(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("'{}' not found in:\n{}", needle, haystack))
}

#[test]
fn test_document_skeleton() {
    let latex = convert("<text:p>Hello world</text:p>");
    assert!(latex.starts_with("\\documentclass"));
    let begin = position(&latex, "\\begin{document}");
    let text = position(&latex, "Hello world");
    let end = position(&latex, "\\end{document}");
    assert!(begin < text && text < end);
}

#[test]
fn test_inline_footnote() {
    let latex = convert(&format!("<text:p>Text{}</text:p>", note("Body")));
    assert!(latex.contains("Text\\footnote{Body}"));
}

#[test]
fn test_one_postponed_footnote() {
    let latex = convert(&format!(r#"<text:h text:outline-level="1">Intro{}</text:h>"#, note("First")));
    assert!(latex.contains("\\section[Intro]{Intro\\footnotemark{}}"));
    assert!(latex.contains("\\footnotetext{First}"));
    assert!(!latex.contains("\\addtocounter{footnote}"));
    assert!(position(&latex, "\\section[") < position(&latex, "\\footnotetext{First}"));
}

#[test]
fn test_two_postponed_footnotes() {
    let latex = convert(&format!(
        r#"<text:h text:outline-level="1">Intro{}{}</text:h>"#,
        note("A"),
        note("B")
    ));
    let back = position(&latex, "\\addtocounter{footnote}{-1}");
    let first = position(&latex, "\\footnotetext{A}");
    let second = position(&latex, "\\stepcounter{footnote}\\footnotetext{B}");
    assert!(back < first && first < second);
}

#[test]
fn test_three_postponed_footnotes() {
    let latex = convert(&format!(
        r#"<text:h text:outline-level="2">Part{}{}{}</text:h>"#,
        note("A"),
        note("B"),
        note("C")
    ));
    assert!(latex.contains("\\subsection[Part]"));
    assert!(latex.contains("\\addtocounter{footnote}{-2}"));
    assert_eq!(latex.matches("\\stepcounter{footnote}\\footnotetext").count(), 2);
    assert_eq!(latex.matches("\\footnotemark{}").count(), 3);
}

#[test]
fn test_table_cell_footnote_is_postponed() {
    let latex = convert(&format!(
        r#"<table:table><table:table-row><table:table-cell><text:p>cell{}</text:p></table:table-cell></table:table-row></table:table>"#,
        note("In cell")
    ));
    assert!(latex.contains("cell\\footnotemark{}"));
    assert!(position(&latex, "\\end{tabular}") < position(&latex, "\\footnotetext{In cell}"));
}

#[test]
fn test_sequence_counter_formulas() {
    let latex = convert(concat!(
        r#"<text:p>A <text:sequence text:name="Equation" text:formula="ooow:Equation+1" style:num-format="1">1</text:sequence></text:p>"#,
        r#"<text:p>B <text:sequence text:name="Equation" text:formula="ooow:7" style:num-format="1">7</text:sequence></text:p>"#,
        r#"<text:p>C <text:sequence text:name="Equation" text:formula="ooow:Equation+3" style:num-format="1">10</text:sequence></text:p>"#,
        r#"<text:p>D <text:sequence text:name="Equation" text:formula="ooow:Equation" style:num-format="1">10</text:sequence></text:p>"#,
    ));
    assert!(latex.contains("A \\refstepcounter{seqEquation}\\arabic{seqEquation}"));
    assert!(latex.contains("B \\setcounter{seqEquation}{6}\\refstepcounter{seqEquation}"));
    assert!(latex.contains("C \\addtocounter{seqEquation}{2}\\refstepcounter{seqEquation}"));
    assert!(latex.contains("D \\addtocounter{seqEquation}{-1}\\refstepcounter{seqEquation}"));
    assert_eq!(latex.matches("\\newcounter{seqEquation}").count(), 1);
    assert!(position(&latex, "\\newcounter{seqEquation}") < position(&latex, "\\begin{document}"));
}

#[test]
fn test_sequence_reference() {
    let latex = convert(concat!(
        r#"<text:p>See <text:sequence-ref text:ref-name="refEquation0" text:reference-format="value">1</text:sequence-ref>.</text:p>"#,
        r#"<text:p><text:sequence text:name="Equation" text:ref-name="refEquation0" text:formula="ooow:Equation+1">1</text:sequence></text:p>"#,
    ));
    assert!(latex.contains("See \\ref{seq:refEquation0}."));
    assert!(latex.contains("\\label{seq:refEquation0}"));
}

#[test]
fn test_list_with_heading_is_flattened() {
    let latex = convert(concat!(
        "<text:list>",
        r#"<text:list-item><text:h text:outline-level="1">Chapter</text:h></text:list-item>"#,
        "<text:list-item><text:p>Item text</text:p></text:list-item>",
        "</text:list>",
    ));
    assert!(latex.contains("\\section{Chapter}"));
    assert!(latex.contains("Item text"));
    assert!(!latex.contains("\\begin{itemize}"));
    assert!(!latex.contains("\\item"));
}

#[test]
fn test_plain_list() {
    let latex = convert(concat!(
        "<text:list>",
        "<text:list-item><text:p>One</text:p></text:list-item>",
        "<text:list-item><text:p>Two</text:p></text:list-item>",
        "</text:list>",
    ));
    let begin = position(&latex, "\\begin{itemize}");
    let one = position(&latex, "\\item One");
    let two = position(&latex, "\\item Two");
    let end = position(&latex, "\\end{itemize}");
    assert!(begin < one && one < two && two < end);
}

const TABLE: &str = concat!(
    "<table:table>",
    r#"<table:table-column table:number-columns-repeated="2"/>"#,
    "<table:table-row>",
    "<table:table-cell><text:p>a</text:p></table:table-cell>",
    "<table:table-cell><text:p>b</text:p></table:table-cell>",
    "</table:table-row>",
    "</table:table>",
);

const TABLE_CAPTION: &str = concat!(
    r#"<text:p>Table <text:sequence text:name="Table" text:ref-name="refTable0" text:formula="ooow:Table+1" style:num-format="1">1</text:sequence>: Results</text:p>"#,
);

#[test]
fn test_table_caption_above() {
    let latex = convert(&format!("{}{}", TABLE_CAPTION, TABLE));
    let float = position(&latex, "\\begin{table}[htbp]");
    let caption = position(&latex, "\\caption{Results}");
    let label = position(&latex, "\\label{seq:refTable0}");
    let tabular = position(&latex, "\\begin{tabular}{ll}");
    let end = position(&latex, "\\end{table}");
    assert!(float < caption && caption < label && label < tabular && tabular < end);
    assert!(latex.contains("a & b \\\\"));
    assert!(!latex.contains("\\captionof"));
}

#[test]
fn test_table_caption_below() {
    let latex = convert(&format!("{}{}", TABLE, TABLE_CAPTION));
    let tabular = position(&latex, "\\end{tabular}");
    let caption = position(&latex, "\\caption{Results}");
    assert!(tabular < caption);
    assert!(latex.contains("\\begin{table}[htbp]"));
}

#[test]
fn test_lonely_table_caption() {
    let latex = convert(&format!("{}<text:p>Just text</text:p>", TABLE_CAPTION));
    assert!(latex.contains("\\captionof{table}{Results}"));
    assert!(latex.contains("capt-of"));
    assert!(!latex.contains("\\begin{table}"));
    assert!(!latex.contains("tabular"));
}

#[test]
fn test_spanned_cells() {
    let latex = convert(concat!(
        "<table:table>",
        "<table:table-row>",
        r#"<table:table-cell table:number-columns-spanned="2"><text:p>wide</text:p></table:table-cell>"#,
        "<table:covered-table-cell/>",
        "</table:table-row>",
        "<table:table-row>",
        "<table:table-cell><text:p>x</text:p></table:table-cell>",
        "<table:table-cell><text:p>y</text:p></table:table-cell>",
        "</table:table-row>",
        "</table:table>",
    ));
    assert!(latex.contains("\\multicolumn{2}{l}{wide} \\\\"));
    assert!(latex.contains("x & y \\\\"));
}

#[test]
fn test_equation_table() {
    let latex = convert(concat!(
        "<table:table><table:table-row>",
        "<table:table-cell><text:p><draw:frame><draw:object>",
        "<math:math><math:mi>x</math:mi></math:math>",
        "</draw:object></draw:frame></text:p></table:table-cell>",
        r#"<table:table-cell><text:p>(<text:sequence text:name="Equation" text:ref-name="refEq0" text:formula="ooow:Equation+1">1</text:sequence>)</text:p></table:table-cell>"#,
        "</table:table-row></table:table>",
    ));
    let begin = position(&latex, "\\begin{equation}");
    let label = position(&latex, "\\label{seq:refEq0}");
    let end = position(&latex, "\\end{equation}");
    assert!(begin < label && label < end);
    assert!(!latex.contains("tabular"));
}

#[test]
fn test_equation_table_with_empty_formula_stays_a_table() {
    let latex = convert(concat!(
        "<table:table><table:table-row>",
        "<table:table-cell><text:p><draw:frame><draw:object>",
        "<math:math/>",
        "</draw:object></draw:frame></text:p></table:table-cell>",
        r#"<table:table-cell><text:p>(<text:sequence text:name="Equation" text:ref-name="refEq0" text:formula="ooow:Equation+1">1</text:sequence>)</text:p></table:table-cell>"#,
        "</table:table-row></table:table>",
    ));
    assert!(!latex.contains("\\begin{equation}"));
    assert!(latex.contains("\\begin{tabular}"));
}

#[test]
fn test_empty_paragraph_spacer() {
    let latex = convert("<text:p>Before</text:p><text:p/><text:p>After</text:p>");
    assert!(latex.contains("\\bigskip"));
    let ignored = convert_with(
        LatexConfig::default().with_ignore_empty_paragraphs(true),
        "<text:p>Before</text:p><text:p/><text:p>After</text:p>",
    );
    assert!(!ignored.contains("\\bigskip"));
    assert!(ignored.contains("Before\n\nAfter"));
}

#[test]
fn test_empty_paragraph_in_table_is_dropped() {
    let latex = convert(
        "<table:table><table:table-row><table:table-cell><text:p/></table:table-cell></table:table-row></table:table>",
    );
    assert!(!latex.contains("\\bigskip"));
}

#[test]
fn test_heading_label_is_drained_after_heading() {
    let latex = convert(r#"<text:h text:outline-level="1"><text:bookmark text:name="intro"/>Intro</text:h><text:p>Body</text:p>"#);
    let heading = position(&latex, "\\section{Intro}");
    let label = position(&latex, "\\label{bkm:intro}");
    let body = position(&latex, "Body");
    assert!(heading < label && label < body);
}

#[test]
fn test_equal_spans_share_markup() {
    let styles = r#"<style:style style:name="T1" style:family="text"><style:text-properties fo:font-weight="bold"/></style:style>"#;
    let latex = convert_styled(
        LatexConfig::default(),
        styles,
        r#"<text:p><text:span text:style-name="T1">A</text:span><text:span text:style-name="T1">B</text:span></text:p>"#,
    );
    assert!(latex.contains("\\textbf{AB}"));
}

#[test]
fn test_two_column_section() {
    let styles = r#"<style:style style:name="Sect1" style:family="section"><style:section-properties><style:columns fo:column-count="2"/></style:section-properties></style:style>"#;
    let body = r#"<text:section text:name="S" text:style-name="Sect1"><text:p>Inside</text:p></text:section><text:section text:name="T"><text:p>Plain</text:p></text:section>"#;
    let latex = convert_styled(LatexConfig::default(), styles, body);
    let begin = position(&latex, "\\begin{multicols}{2}");
    let inside = position(&latex, "Inside");
    let end = position(&latex, "\\end{multicols}");
    assert!(begin < inside && inside < end);
    assert!(position(&latex, "multicol") < position(&latex, "\\begin{document}"));
    assert_eq!(latex.matches("\\begin{multicols}").count(), 1);
    assert!(end < position(&latex, "Plain"));
}

#[test]
fn test_special_characters_are_escaped() {
    let latex = convert("<text:p>50% &amp; $5 #1</text:p>");
    assert!(latex.contains("50\\% \\& \\$5 \\#1"));
}

#[test]
fn test_image_artifact_from_package() {
    let png = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR".to_vec();
    let body = r#"<text:p><draw:frame svg:width="2cm" svg:height="1cm"><draw:image xlink:href="Pictures/pic.png"/></draw:frame></text:p>"#;
    let doc = OdfDocument::from_parts(&content("", body), None)
        .unwrap()
        .with_part("Pictures/pic.png", png.clone());
    let converter = LatexConverter::new(LatexConfig::default()).unwrap();
    let result = converter.convert(&doc, "paper").unwrap();
    assert!(result.master_text().contains("\\includegraphics[width=2cm,height=1cm]{paper-img1.png}"));
    let image = result.get("paper-img1.png").unwrap();
    assert_eq!(image.data(), png.as_slice());
}

#[test]
fn test_flat_document_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flat.fodt");
    let xml = format!(
        r#"<office:document {} office:mimetype="application/vnd.oasis.opendocument.text"><office:meta><dc:title>Flat Title</dc:title></office:meta><office:body><office:text><text:p>Flat body</text:p></office:text></office:body></office:document>"#,
        NAMESPACES
    );
    std::fs::write(&path, xml).unwrap();

    let converter = LatexConverter::new(LatexConfig::default()).unwrap();
    let result = converter.convert_file(&path).unwrap();
    let latex = result.master_text();
    assert_eq!(result.master().unwrap().name(), "flat.tex");
    assert!(latex.contains("\\title{Flat Title}"));
    assert!(latex.contains("\\maketitle"));
    assert!(latex.contains("Flat body"));
}

#[test]
fn test_packaged_document_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("packaged.odt");
    {
        let file = std::fs::File::create(&path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        zip.start_file("mimetype", options).unwrap();
        zip.write_all(b"application/vnd.oasis.opendocument.text").unwrap();
        zip.start_file("content.xml", options).unwrap();
        zip.write_all(content("", "<text:p>Zipped body</text:p>").as_bytes()).unwrap();
        zip.start_file("meta.xml", options).unwrap();
        zip.write_all(
            format!(
                r#"<office:document-meta {}><office:meta><dc:title>Zipped</dc:title></office:meta></office:document-meta>"#,
                NAMESPACES
            )
            .as_bytes(),
        )
        .unwrap();
        zip.finish().unwrap();
    }

    let converter = LatexConverter::new(LatexConfig::default()).unwrap();
    let result = converter.convert_file(&path).unwrap();
    assert!(result.master_text().contains("Zipped body"));
    assert!(result.master_text().contains("\\title{Zipped}"));

    let out = dir.path().join("out");
    result.write_all(&out).unwrap();
    let written = std::fs::read_to_string(out.join("packaged.tex")).unwrap();
    assert_eq!(written, result.master_text());
}

#[test]
fn test_yaml_config_drives_conversion() {
    let config = LatexConfig::from_yaml_str("document_class: book\n").unwrap();
    let latex = convert_with(config, r#"<text:h text:outline-level="1">Start</text:h>"#);
    assert!(latex.contains("{book}"));
    assert!(latex.contains("\\chapter{Start}"));
}

#[test]
fn test_paragraph_block_groups_consecutive_paragraphs() {
    let yaml = r#"
style_maps:
  paragraph_block:
    Quotations:
      before: "\\begin{quote}"
      after: "\\end{quote}"
      next: [Quotations]
"#;
    let latex = convert_with(
        LatexConfig::from_yaml_str(yaml).unwrap(),
        concat!(
            r#"<text:p text:style-name="Quotations">One</text:p>"#,
            r#"<text:p text:style-name="Quotations">Two</text:p>"#,
            "<text:p>Three</text:p>",
        ),
    );
    assert_eq!(latex.matches("\\begin{quote}").count(), 1);
    assert_eq!(latex.matches("\\end{quote}").count(), 1);
    let begin = position(&latex, "\\begin{quote}");
    let one = position(&latex, "One");
    let two = position(&latex, "Two");
    let end = position(&latex, "\\end{quote}");
    let three = position(&latex, "Three");
    assert!(begin < one && one < two && two < end && end < three);
}

#[test]
fn test_verbatim_paragraph_ignores_span_formatting() {
    let yaml = r#"
style_maps:
  paragraph:
    Code:
      before: "\\begin{verbatim}"
      after: "\\end{verbatim}"
      verbatim: true
"#;
    let styles = r#"<style:style style:name="T1" style:family="text"><style:text-properties fo:font-weight="bold"/></style:style>"#;
    let latex = convert_styled(
        LatexConfig::from_yaml_str(yaml).unwrap(),
        styles,
        r#"<text:p text:style-name="Code">x = <text:span text:style-name="T1">a&amp;b</text:span> y <text:span text:style-name="LaTeX_20_Math">x^2</text:span></text:p>"#,
    );
    assert!(latex.contains("x = a&b y x^2"));
    assert!(!latex.contains("\\textbf{a"));
    assert!(!latex.contains("$x^2$"));
}

#[test]
fn test_math_span_run_is_one_formula() {
    let latex = convert(concat!(
        r#"<text:p>Let <text:span text:style-name="LaTeX_20_Math">x^2 </text:span>"#,
        r#"<text:span text:style-name="LaTeX_20_Math">+ y</text:span> hold</text:p>"#,
    ));
    assert!(latex.contains("Let $x^2 + y$ hold"));
}

#[test]
fn test_index_mark_in_heading_follows_heading() {
    let latex = convert(concat!(
        r#"<text:h text:outline-level="1">Intro<text:alphabetical-index-mark text:string-value="intro"/></text:h>"#,
        "<text:p>Body</text:p>",
    ));
    let heading = position(&latex, "\\section{Intro}");
    let entry = position(&latex, "\\index{intro}");
    let body = position(&latex, "Body");
    assert!(heading < entry && entry < body);
}

#[test]
fn test_nested_notes_in_last_heading_are_all_written() {
    let innermost = note("n4");
    let third = note(&format!("n3{}", innermost));
    let second = note(&format!("n2{}", third));
    let first = note(&format!("n1{}", second));
    let latex = convert(&format!(r#"<text:h text:outline-level="1">Title{}</text:h>"#, first));
    let marks = latex.matches("\\footnotemark").count();
    assert_eq!(marks, 4);
    assert_eq!(latex.matches("\\footnotetext").count(), marks);
    for body in ["n1", "n2", "n3", "n4"] {
        assert!(latex.contains(&format!("\\footnotetext{{{}", body)), "missing {}", body);
    }
    assert!(position(&latex, "\\footnotetext{n4") < position(&latex, "\\end{document}"));
}

#[test]
fn test_extreme_list_start_value() {
    let styles = r#"<text:list-style style:name="L1"><text:list-level-style-number text:level="1" style:num-format="1"/></text:list-style>"#;
    let latex = convert_styled(
        LatexConfig::default(),
        styles,
        concat!(
            r#"<text:list text:style-name="L1">"#,
            r#"<text:list-item text:start-value="-9223372036854775808"><text:p>x</text:p></text:list-item>"#,
            "<text:list-item><text:p>y</text:p></text:list-item>",
            "</text:list>",
        ),
    );
    assert!(latex.contains("\\setcounter{enumi}{-2147483648}"));
    assert!(position(&latex, "\\item x") < position(&latex, "\\item y"));
}

#[test]
fn test_extreme_sequence_formula() {
    let latex = convert(
        r#"<text:p>A <text:sequence text:name="Equation" text:formula="ooow:-9223372036854775808" style:num-format="1">1</text:sequence></text:p>"#,
    );
    assert!(latex.contains("\\setcounter{seqEquation}{-2147483648}\\refstepcounter{seqEquation}"));
}

#[test]
fn test_space_run_is_capped() {
    let latex = convert(r#"<text:p>a<text:s text:c="4000000000"/>b</text:p>"#);
    assert!(latex.contains(&format!("a {}b", "\\ ".repeat(99))));
    assert!(!latex.contains(&format!("a {}", "\\ ".repeat(100))));
}
