//! Flattens a wiki table, merged cells and all, into a rectangular grid of
//! text cells. Every downstream extractor relies on the rectangular
//! invariant: each row has exactly the header-derived column count.

use crate::dom::Node;
use crate::extract::{cell_text, fields::parse_span};

/// Row 0 is the header row; all rows share its width.
pub type TableMatrix = Vec<Vec<String>>;

/// Span attributes above this are corrupted markup, not real spans.
const SPAN_HARD_CAP: u32 = 50;

/// Normalize a table node into a rectangular matrix. Returns an empty matrix
/// when no row contains a header cell.
pub fn normalize_table(table: &Node) -> TableMatrix {
    let rows = table.find_all("tr");

    let Some((header_idx, header_tr)) = rows
        .iter()
        .enumerate()
        .find(|(_, tr)| tr.find_first("th").is_some())
    else {
        return Vec::new();
    };

    // Column count is fixed by the header row's summed colspans.
    let header_cells = header_tr.find_all("th");
    let width: usize = header_cells
        .iter()
        .map(|th| parse_span(th.attr("colspan"), SPAN_HARD_CAP) as usize)
        .sum();
    if width == 0 {
        return Vec::new();
    }

    let mut matrix: TableMatrix = Vec::new();

    let mut header_row: Vec<String> = Vec::with_capacity(width);
    for th in &header_cells {
        let text = cell_text(th);
        let span = parse_span(th.attr("colspan"), SPAN_HARD_CAP) as usize;
        for _ in 0..span {
            header_row.push(text.clone());
        }
    }
    fit_width(&mut header_row, width);
    matrix.push(header_row);

    // Per-column obligations left behind by rowspans: (text, remaining rows).
    let mut pending: Vec<Option<(String, u32)>> = vec![None; width];

    for tr in &rows[header_idx + 1..] {
        let cells: Vec<&Node> = tr
            .descendants()
            .filter(|n| n.tag == "td" || n.tag == "th")
            .collect();
        if cells.is_empty() || tr.has_class("sortbottom") {
            continue;
        }
        matrix.push(build_row(&cells, width, &mut pending));
    }

    matrix
}

fn build_row(cells: &[&Node], width: usize, pending: &mut [Option<(String, u32)>]) -> Vec<String> {
    let mut row: Vec<String> = Vec::with_capacity(width);
    let mut input = cells.iter();
    let mut col = 0;

    while col < width {
        if let Some((val, remaining)) = pending[col].take() {
            row.push(val.clone());
            if remaining > 1 {
                pending[col] = Some((val, remaining - 1));
            }
            col += 1;
            continue;
        }
        let Some(cell) = input.next() else {
            row.resize(width, String::new());
            break;
        };
        let text = cell_text(cell);
        let rowspan = parse_span(cell.attr("rowspan"), SPAN_HARD_CAP);
        let colspan = parse_span(cell.attr("colspan"), SPAN_HARD_CAP) as usize;
        for _ in 0..colspan.min(width - col) {
            row.push(text.clone());
            if rowspan > 1 {
                pending[col] = Some((text.clone(), rowspan - 1));
            }
            col += 1;
        }
    }

    fit_width(&mut row, width);
    row
}

fn fit_width(row: &mut Vec<String>, width: usize) {
    if row.len() < width {
        row.resize(width, String::new());
    } else {
        row.truncate(width);
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::DocumentTree;

    fn matrix_of(html: &str) -> TableMatrix {
        let doc = DocumentTree::parse(html);
        let table = doc.find_first("table").unwrap();
        normalize_table(table)
    }

    #[test]
    fn rectangular_with_ragged_rows() {
        let m = matrix_of(
            "<table>
               <tr><th>A</th><th>B</th><th>C</th></tr>
               <tr><td>1</td></tr>
               <tr><td>1</td><td>2</td><td>3</td><td>4</td></tr>
             </table>",
        );
        assert_eq!(m.len(), 3);
        assert!(m.iter().all(|r| r.len() == 3));
        assert_eq!(m[1], vec!["1", "", ""]);
        assert_eq!(m[2], vec!["1", "2", "3"]);
    }

    #[test]
    fn header_colspan_expands() {
        let m = matrix_of(
            r#"<table><tr><th colspan="2">Pair</th><th>C</th></tr><tr><td>a</td><td>b</td><td>c</td></tr></table>"#,
        );
        assert_eq!(m[0], vec!["Pair", "Pair", "C"]);
    }

    #[test]
    fn rowspan_propagates_down() {
        let m = matrix_of(
            r#"<table>
               <tr><th>S</th><th>T</th></tr>
               <tr><td rowspan="3">1</td><td>a</td></tr>
               <tr><td>b</td></tr>
               <tr><td>c</td></tr>
             </table>"#,
        );
        assert_eq!(m[1], vec!["1", "a"]);
        assert_eq!(m[2], vec!["1", "b"]);
        assert_eq!(m[3], vec!["1", "c"]);
    }

    #[test]
    fn colspan_with_rowspan_records_all_columns() {
        let m = matrix_of(
            r#"<table>
               <tr><th>A</th><th>B</th><th>C</th></tr>
               <tr><td colspan="2" rowspan="2">x</td><td>c1</td></tr>
               <tr><td>c2</td></tr>
             </table>"#,
        );
        assert_eq!(m[1], vec!["x", "x", "c1"]);
        assert_eq!(m[2], vec!["x", "x", "c2"]);
    }

    #[test]
    fn corrupted_span_treated_as_one() {
        let m = matrix_of(
            r#"<table><tr><th colspan="999">A</th><th>B</th></tr><tr><td>1</td><td>2</td></tr></table>"#,
        );
        assert_eq!(m[0], vec!["A", "B"]);
        assert!(m.iter().all(|r| r.len() == 2));
    }

    #[test]
    fn skips_empty_and_sortbottom_rows() {
        let m = matrix_of(
            r#"<table>
               <tr><th>A</th></tr>
               <tr></tr>
               <tr class="sortbottom"><td>footer</td></tr>
               <tr><td>real</td></tr>
             </table>"#,
        );
        assert_eq!(m.len(), 2);
        assert_eq!(m[1], vec!["real"]);
    }

    #[test]
    fn no_header_row_is_empty() {
        let m = matrix_of("<table><tr><td>a</td></tr></table>");
        assert!(m.is_empty());
    }
}
