//! Tables.
//!
//! A `table:table` is first flattened into a rectangular [`TableGrid`]
//! (repetitions expanded, spans recorded, covered cells kept as placeholders)
//! and then written as `tabular` or `longtable`. Each cell's block content is
//! converted in a table context with footnotes postponed.

use super::block::CaptionPlacement;
use super::context::Context;
use super::math::EMPTY_FORMULA;
use super::palette::ConverterPalette;
use super::portion::DocumentPortion;
use crate::common::Length;
use crate::odf::element::{Element, ElementBase, Node};
use crate::odf::node::NodeKind;
use crate::odf::style::{PropertyGroup, PropertyValue, StyleFamily, StyleRegistry};

/// Upper bound for `table:number-*-repeated`; trailing empty rows in
/// spreadsheet-like tables are often repeated thousands of times.
const MAX_REPEAT: i64 = 100;

const BORDER_PROPERTIES: [&str; 5] = ["fo:border", "fo:border-top", "fo:border-bottom", "fo:border-left", "fo:border-right"];

/// One slot of the grid.
#[derive(Debug, Clone, Copy)]
pub enum GridCell<'a> {
    Cell {
        element: &'a Element,
        columns: usize,
        rows: usize,
    },
    /// Hidden by a spanning cell
    Covered,
}

impl<'a> GridCell<'a> {
    pub fn element(&self) -> Option<&'a Element> {
        match self {
            GridCell::Cell { element, .. } => Some(element),
            GridCell::Covered => None,
        }
    }
}

/// Rectangular view of a table.
#[derive(Debug, Default)]
pub struct TableGrid<'a> {
    /// Declared column widths, one entry per column
    pub columns: Vec<Option<Length>>,
    pub rows: Vec<Vec<GridCell<'a>>>,
    /// Rows from `table:table-header-rows`; they lead `rows`
    pub header_rows: usize,
}

fn repeat_count(element: &Element, attribute: &str) -> usize {
    element.get_int_attribute(attribute).unwrap_or(1).clamp(1, MAX_REPEAT) as usize
}

fn span_count(element: &Element, attribute: &str) -> usize {
    element.get_int_attribute(attribute).unwrap_or(1).max(1) as usize
}

impl<'a> TableGrid<'a> {
    pub fn build(table: &'a Element, registry: &StyleRegistry) -> Self {
        let mut grid = Self::default();
        grid.collect(table, registry, false);
        grid
    }

    fn collect(&mut self, parent: &'a Element, registry: &StyleRegistry, header: bool) {
        for child in parent.child_elements() {
            match child.kind() {
                NodeKind::TableColumn => {
                    let width = child
                        .get_attribute("table:style-name")
                        .and_then(|name| {
                            registry.resolve_property(
                                name,
                                StyleFamily::TableColumn,
                                PropertyGroup::TableColumn,
                                "style:column-width",
                                true,
                            )
                        })
                        .and_then(PropertyValue::as_length);
                    let count = repeat_count(child, "table:number-columns-repeated");
                    self.columns.extend(std::iter::repeat_n(width, count));
                },
                NodeKind::TableColumns | NodeKind::TableHeaderColumns | NodeKind::TableRows | NodeKind::TableRowGroup => {
                    self.collect(child, registry, header)
                },
                NodeKind::TableHeaderRows => self.collect(child, registry, true),
                NodeKind::TableRow => {
                    let row = Self::row(child);
                    for _ in 0..repeat_count(child, "table:number-rows-repeated") {
                        self.rows.push(row.clone());
                        if header {
                            self.header_rows += 1;
                        }
                    }
                },
                _ => {},
            }
        }
    }

    fn row(row: &'a Element) -> Vec<GridCell<'a>> {
        let mut cells = Vec::new();
        for cell in row.child_elements() {
            let slot = match cell.kind() {
                NodeKind::TableCell => GridCell::Cell {
                    element: cell,
                    columns: span_count(cell, "table:number-columns-spanned"),
                    rows: span_count(cell, "table:number-rows-spanned"),
                },
                NodeKind::CoveredTableCell => GridCell::Covered,
                _ => continue,
            };
            cells.extend(std::iter::repeat_n(slot, repeat_count(cell, "table:number-columns-repeated")));
        }
        cells
    }

    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0).max(self.columns.len())
    }

    /// Column widths when every column declares one.
    pub fn fixed_widths(&self) -> Option<Vec<Length>> {
        if self.columns.is_empty() || self.columns.len() < self.column_count() {
            return None;
        }
        self.columns.iter().copied().collect()
    }
}

/// The only paragraph of a cell.
fn single_paragraph(cell: &Element) -> Option<&Element> {
    let mut blocks = cell.child_elements().filter(|e| e.kind() != NodeKind::SoftPageBreak);
    let paragraph = blocks.next()?;
    (blocks.next().is_none() && paragraph.kind() == NodeKind::Paragraph).then_some(paragraph)
}

/// Column specification such as `|l|l|` or `p{2cm}p{3cm}`.
fn column_spec(widths: Option<&[Length]>, columns: usize, rules: bool) -> String {
    let separator = if rules { "|" } else { "" };
    let specs: Vec<String> = match widths {
        Some(widths) => widths.iter().map(|w| format!("p{{{}}}", w.to_latex())).collect(),
        None => vec!["l".to_string(); columns],
    };
    format!("{}{}{}", separator, specs.join(separator), separator)
}

impl<'a> ConverterPalette<'a> {
    /// Formula and sequence of a one-row table laid out as a numbered
    /// display equation: the formula in the left cell, the number in the right.
    /// An empty formula leaves the table an ordinary one.
    fn equation_parts(&self, grid: &TableGrid<'a>) -> Option<(String, &'a Element)> {
        let [row] = grid.rows.as_slice() else {
            return None;
        };
        let cells: Vec<&'a Element> = row.iter().filter_map(GridCell::element).collect();
        let &[left, right] = cells.as_slice() else {
            return None;
        };
        let formula = self.display_formula(single_paragraph(left)?)?;
        if formula == EMPTY_FORMULA {
            return None;
        }
        let number = single_paragraph(right)?;
        let mut sequences = number.children().iter().filter_map(Node::as_element).filter(|e| e.kind() == NodeKind::Sequence);
        let sequence = sequences.next()?;
        sequences.next().is_none().then_some((formula, sequence))
    }

    fn cell_has_border(&self, cell: &Element) -> bool {
        let Some(name) = cell.get_attribute("table:style-name") else {
            return false;
        };
        BORDER_PROPERTIES.iter().any(|id| {
            self.registry
                .resolve_property(name, StyleFamily::TableCell, PropertyGroup::TableCell, id, true)
                .is_some_and(|v| v.as_str() != Some("none"))
        })
    }

    /// Block children of a cell, converted one by one and joined.
    fn cell_text(&mut self, cell: &'a Element, separator: &str, out: &mut DocumentPortion, ctx: &Context) -> String {
        let children = cell.children();
        let mut parts = Vec::new();
        for i in 0..children.len() {
            if children[i].as_element().is_none() {
                continue;
            }
            let mut portion = DocumentPortion::new();
            self.traverse_block_nodes(&children[i..=i], &mut portion, ctx);
            let text = portion.into_text(out);
            let text = text.trim();
            if !text.is_empty() {
                parts.push(text.to_string());
            }
        }
        parts.join(separator)
    }

    /// `table:table`, with the caption paragraph bound to it if any.
    pub(crate) fn handle_table(
        &mut self,
        table: &'a Element,
        caption: Option<(&'a Element, CaptionPlacement)>,
        out: &mut DocumentPortion,
        ctx: &Context,
    ) {
        let config = self.config;
        let grid = TableGrid::build(table, self.registry);

        if let Some((formula, sequence)) = self.equation_parts(&grid) {
            out.ensure_newline();
            out.append("\\begin{equation}").newline();
            out.append(&formula).newline();
            self.handle_label(sequence, out, ctx);
            out.ensure_newline();
            out.append("\\end{equation}").require_package("amsmath");
            out.ensure_blank_line();
            self.flush_queues(out, ctx);
            return;
        }

        let columns = grid.column_count();
        if columns == 0 {
            log::debug!("Skipping empty table");
            return;
        }
        let widths = grid.fixed_widths();
        let rules = grid
            .rows
            .iter()
            .flatten()
            .filter_map(GridCell::element)
            .any(|cell| self.cell_has_border(cell));
        let longtable = config.use_longtable
            && !(ctx.in_table() || ctx.in_frame() || ctx.in_footnote() || ctx.in_float() || ctx.in_multicols());
        let caption = caption.and_then(|(paragraph, placement)| {
            self.caption_sequence(paragraph)
                .map(|(index, sequence)| (paragraph, index, sequence, placement))
        });
        let float = caption.is_some() && !longtable && ctx.floats_allowed();
        let outer = if float { ctx.with_in_float(true) } else { ctx.clone() };

        out.ensure_newline();
        if float {
            out.append("\\begin{table}[htbp]").newline();
            out.append("\\centering").newline();
        }
        if let Some((paragraph, index, sequence, placement)) = caption
            && (placement == CaptionPlacement::Above || longtable)
        {
            if longtable {
                self.write_caption(paragraph, index, sequence, "table", out, &ctx.with_in_float(true));
            } else {
                self.write_caption(paragraph, index, sequence, "table", out, &outer);
            }
        }

        let environment = if longtable { "longtable" } else { "tabular" };
        out.ensure_newline();
        out.append(&format!(
            "\\begin{{{}}}{{{}}}",
            environment,
            column_spec(widths.as_deref(), columns, rules)
        ));
        out.newline();
        if longtable {
            out.require_package("longtable");
            if caption.is_some() {
                out.append("\\\\").newline();
            }
        }
        if rules {
            out.append("\\hline").newline();
        }

        let mut cell_ctx = ctx.deeper().with_in_table(true).with_no_footnotes(true).with_in_longtable(longtable);
        if widths.is_none() {
            cell_ctx = cell_ctx.with_no_line_breaks(true);
        }
        let joiner = if widths.is_some() { "\\par " } else { " " };
        let separator = if rules { "|" } else { "" };
        for (r, row) in grid.rows.iter().enumerate() {
            let mut cells = Vec::new();
            let mut c = 0;
            while c < row.len() {
                match row[c] {
                    GridCell::Cell { element, columns: span, rows: row_span } => {
                        let mut text = self.cell_text(element, joiner, out, &cell_ctx);
                        if row_span > 1 && config.use_multirow {
                            text = format!("\\multirow{{{}}}{{*}}{{{}}}", row_span, text);
                            out.require_package("multirow");
                        }
                        let span = span.min(row.len() - c);
                        if span > 1 {
                            let spec = match &widths {
                                Some(widths) => {
                                    let points: f64 = widths[c..(c + span).min(widths.len())].iter().map(Length::points).sum();
                                    format!("p{{{}}}", Length::from_points(points).to_latex())
                                },
                                None => "l".to_string(),
                            };
                            let lead = if c == 0 { separator } else { "" };
                            text = format!("\\multicolumn{{{}}}{{{}{}{}}}{{{}}}", span, lead, spec, separator, text);
                        }
                        cells.push(text);
                        c += span;
                    },
                    GridCell::Covered => {
                        // left behind by a row span
                        cells.push(String::new());
                        c += 1;
                    },
                }
            }
            out.append(&cells.join(" & ")).append(" \\\\").newline();
            if rules {
                out.append("\\hline").newline();
            }
            if longtable && grid.header_rows > 0 && r + 1 == grid.header_rows {
                out.append("\\endhead").newline();
            }
        }
        out.append(&format!("\\end{{{}}}", environment));
        out.newline();

        if let Some((paragraph, index, sequence, CaptionPlacement::Below)) = caption
            && !longtable
        {
            self.write_caption(paragraph, index, sequence, "table", out, &outer);
        }
        if float {
            out.ensure_newline();
            out.append("\\end{table}");
        }
        out.ensure_blank_line();
        self.flush_queues(out, ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(text: &str) -> Element {
        Element::new("table:table-cell").with_child(Element::new("text:p").with_text(text))
    }

    #[test]
    fn test_grid_expands_repetitions() {
        let table = Element::new("table:table")
            .with_child(Element::new("table:table-column").with_attribute("table:number-columns-repeated", "2"))
            .with_child(
                Element::new("table:table-header-rows")
                    .with_child(Element::new("table:table-row").with_child(cell("a")).with_child(cell("b"))),
            )
            .with_child(
                Element::new("table:table-row")
                    .with_attribute("table:number-rows-repeated", "3")
                    .with_child(cell("c").with_attribute("table:number-columns-repeated", "2")),
            );
        let registry = StyleRegistry::new();
        let grid = TableGrid::build(&table, &registry);
        assert_eq!(grid.columns.len(), 2);
        assert_eq!(grid.rows.len(), 4);
        assert_eq!(grid.header_rows, 1);
        assert_eq!(grid.column_count(), 2);
        assert!(grid.fixed_widths().is_none());
    }

    #[test]
    fn test_repetition_is_capped() {
        let table = Element::new("table:table").with_child(
            Element::new("table:table-row")
                .with_attribute("table:number-rows-repeated", "1048576")
                .with_child(cell("")),
        );
        let registry = StyleRegistry::new();
        let grid = TableGrid::build(&table, &registry);
        assert_eq!(grid.rows.len(), MAX_REPEAT as usize);
    }

    #[test]
    fn test_spans_and_covered_cells() {
        let table = Element::new("table:table").with_child(
            Element::new("table:table-row")
                .with_child(cell("wide").with_attribute("table:number-columns-spanned", "2"))
                .with_child(Element::new("table:covered-table-cell")),
        );
        let registry = StyleRegistry::new();
        let grid = TableGrid::build(&table, &registry);
        assert!(matches!(grid.rows[0][0], GridCell::Cell { columns: 2, rows: 1, .. }));
        assert!(matches!(grid.rows[0][1], GridCell::Covered));
    }

    #[test]
    fn test_column_spec() {
        assert_eq!(column_spec(None, 3, false), "lll");
        assert_eq!(column_spec(None, 2, true), "|l|l|");
        let widths = [Length::parse("2cm").unwrap(), Length::parse("1.5cm").unwrap()];
        assert_eq!(column_spec(Some(&widths), 2, false), "p{2cm}p{1.5cm}");
    }

    #[test]
    fn test_single_paragraph() {
        let one = cell("x");
        assert!(single_paragraph(&one).is_some());
        let two = cell("x").with_child(Element::new("text:p"));
        assert!(single_paragraph(&two).is_none());
    }
}
