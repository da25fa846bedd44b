//! Table reconstruction from a section's record tree.
//!
//! Tables are not stored as a grid. A table control (`CTRL_HEADER` with id
//! `tbl `) owns one `TABLE` record giving the dimensions, followed by a
//! `LIST_HEADER` per cell. Each list header announces how many of its
//! following siblings are the cell's paragraphs and where the cell sits.
//! Walking the tree in document order and bucketing cells by row recovers
//! the table.

use super::consts::{HwpTag, TABLE_CTRL_ID};
use super::record::{RecordId, RecordTree};
use super::text::decode_para_text;
use crate::common::binary::read_u16_le;
use crate::common::{Error, Result};
use tracing::trace;

/// One table cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Row the cell starts in
    pub row: u16,
    /// Column the cell starts in
    pub col: u16,
    pub row_span: u16,
    pub col_span: u16,
    /// Trimmed text lines of the cell's paragraphs, in order
    pub lines: Vec<String>,
}

impl Cell {
    /// Cell text with lines joined by `\n`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// A table rebuilt from its cell definitions.
///
/// Rows are buckets indexed by each cell's starting row. A cell spanning
/// several rows appears only in its first row, and a row may hold fewer
/// cells than the column count when spans cover it.
///
/// # Example
///
/// ```rust,ignore
/// for table in package.tables()? {
///     println!("Table with {} rows", table.row_count());
///     for row in table.rows() {
///         for cell in row {
///             println!("Cell ({}, {}): {}", cell.row, cell.col, cell.text());
///         }
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    rows: Vec<Vec<Cell>>,
    column_count: usize,
}

impl Table {
    /// Create a table with `row_count` empty rows.
    pub fn new(row_count: usize, column_count: usize) -> Self {
        Self {
            rows: vec![Vec::new(); row_count],
            column_count,
        }
    }

    /// Number of rows declared by the table record.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns declared by the table record.
    pub fn column_count(&self) -> usize {
        self.column_count
    }

    /// All rows, each holding the cells that start in it.
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Cells of row `index`, or `None` when out of range.
    pub fn row(&self, index: usize) -> Option<&[Cell]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Every cell in row order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.rows.iter().flatten()
    }

    /// Whether no cell was attached to any row.
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(Vec::is_empty)
    }

    /// Append `cell` to the bucket of its starting row.
    fn push_cell(&mut self, cell: Cell) -> Result<()> {
        let row_count = self.rows.len();
        let bucket = self.rows.get_mut(usize::from(cell.row)).ok_or_else(|| {
            Error::Structural(format!(
                "cell row {} outside table with {row_count} rows",
                cell.row
            ))
        })?;
        bucket.push(cell);
        Ok(())
    }
}

/// Traversal state for table reconstruction.
///
/// Feed every record of a tree in document order to
/// [`TableBuilder::visit`], then take the tables with
/// [`TableBuilder::finish`]. The most recently opened table is the one
/// cells are attached to.
#[derive(Debug, Default)]
pub struct TableBuilder {
    tables: Vec<Table>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the transition for record `id`, if it has one.
    pub fn visit(&mut self, tree: &RecordTree, id: RecordId) -> Result<()> {
        let record = tree.get(id);
        match record.tag() {
            HwpTag::Table => {
                let row_count = read_u16_le(&record.payload, 4)?;
                let column_count = read_u16_le(&record.payload, 6)?;
                trace!(row_count, column_count, "table");
                self.tables
                    .push(Table::new(row_count.into(), column_count.into()));
            },
            HwpTag::ListHeader if is_table_cell(tree, id) => {
                let cell = read_cell(tree, id)?;
                trace!(row = cell.row, col = cell.col, lines = cell.lines.len(), "cell");
                let table = self.tables.last_mut().ok_or_else(|| {
                    Error::Structural("table cell found before any table record".to_string())
                })?;
                table.push_cell(cell)?;
            },
            _ => {},
        }
        Ok(())
    }

    /// Tables opened so far, in document order.
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn finish(self) -> Vec<Table> {
        self.tables
    }
}

/// Whether `id` is a list header directly under a table control.
fn is_table_cell(tree: &RecordTree, id: RecordId) -> bool {
    let Some(parent) = tree.parent(id) else {
        return false;
    };
    let parent = tree.get(parent);
    if parent.tag() != HwpTag::CtrlHeader {
        return false;
    }
    match parent.payload.get(..4) {
        Some(&[a, b, c, d]) => [d, c, b, a] == TABLE_CTRL_ID,
        _ => false,
    }
}

/// Parse a cell list header and gather the text of its paragraphs.
fn read_cell(tree: &RecordTree, id: RecordId) -> Result<Cell> {
    let payload = &tree.get(id).payload;
    let paragraph_count = read_u16_le(payload, 0)?;
    let col = read_u16_le(payload, 8)?;
    let row = read_u16_le(payload, 10)?;
    let col_span = read_u16_le(payload, 12)?;
    let row_span = read_u16_le(payload, 14)?;

    let mut lines = Vec::new();
    for &paragraph in tree.next_siblings(id, paragraph_count.into()) {
        if let Some(text) = tree.first_child_with_tag(paragraph, HwpTag::ParaText) {
            let decoded = decode_para_text(&tree.get(text).payload)?;
            lines.extend(split_lines(decoded.trim()).map(|line| line.trim().to_string()));
        }
    }

    Ok(Cell {
        row,
        col,
        row_span,
        col_span,
        lines,
    })
}

/// Line boundaries recognised inside paragraph text.
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0B' | '\x0C' | '\x1C' | '\x1D' | '\x1E' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Split `text` at every line boundary, treating `\r\n` as one.
///
/// A trailing boundary does not produce an empty last line.
fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let Some(at) = rest.find(is_line_break) else {
            return Some(std::mem::take(&mut rest));
        };
        let line = &rest[..at];
        let tail = &rest[at..];
        let width = if tail.starts_with("\r\n") {
            2
        } else {
            tail.chars().next().map_or(1, char::len_utf8)
        };
        rest = &tail[width..];
        Some(line)
    })
}

/// Rebuild every table in `tree`, in document order.
///
/// The walk is iterative, so nesting depth is bounded only by memory.
pub fn extract_tables(tree: &RecordTree) -> Result<Vec<Table>> {
    let mut builder = TableBuilder::new();
    for id in tree.descendants(tree.root()) {
        builder.visit(tree, id)?;
    }
    Ok(builder.finish())
}


#[cfg(test)]
mod tests {
    use super::fixture::*;
    use super::*;
    use crate::hwp::record::encode_record;
    use crate::hwp::text::encode_utf16;

    fn tables_of(stream: &[u8]) -> Result<Vec<Table>> {
        extract_tables(&RecordTree::from_reader(stream)?)
    }

    #[test]
    fn test_spanning_cell_occupies_its_first_row() {
        let stream = table_stream(
            0,
            2,
            2,
            &[(0, 0, 1, 1, "a"), (0, 1, 1, 1, "b"), (1, 0, 1, 2, "wide")],
        );
        let tables = tables_of(&stream).unwrap();
        assert_eq!(tables.len(), 1);

        let table = &tables[0];
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.rows()[0].len(), 2);
        assert_eq!(table.rows()[1].len(), 1);
        assert_eq!(table.rows()[1][0].col_span, 2);
        assert_eq!(table.rows()[1][0].lines, vec!["wide"]);
        assert_eq!(table.rows()[0][1].col, 1);
    }

    #[test]
    fn test_cells_are_bucketed_in_stream_order() {
        let stream = table_stream(
            0,
            2,
            2,
            &[(0, 0, 1, 1, "a"), (0, 1, 1, 1, "b"), (1, 0, 1, 2, "c"), (1, 1, 1, 1, "d")],
        );
        let table = &tables_of(&stream).unwrap()[0];
        let row1: Vec<_> = table.rows()[1].iter().map(Cell::text).collect();
        assert_eq!(row1, vec!["c", "d"]);
        assert_eq!(table.cells().count(), 4);
    }

    #[test]
    fn test_repeated_cell_definition_is_kept() {
        let stream = table_stream(0, 1, 1, &[(0, 0, 1, 1, "x"), (0, 0, 1, 1, "x")]);
        let table = &tables_of(&stream).unwrap()[0];
        assert_eq!(table.rows()[0].len(), 2);
    }

    #[test]
    fn test_cell_lines_are_trimmed() {
        let stream = table_stream(0, 1, 1, &[(0, 0, 1, 1, "  first \n   second  \n")]);
        let table = &tables_of(&stream).unwrap()[0];
        assert_eq!(table.rows()[0][0].lines, vec!["first", "second"]);
    }

    #[test]
    fn test_split_lines_on_every_boundary() {
        let lines: Vec<_> = split_lines("top\u{2028}middle\u{85}low\r\nend\r\rx\u{2029}").collect();
        assert_eq!(lines, vec!["top", "middle", "low", "end", "", "x"]);
        assert_eq!(split_lines("").count(), 0);
        assert_eq!(split_lines("one").collect::<Vec<_>>(), vec!["one"]);
    }

    #[test]
    fn test_cell_lines_split_on_unicode_separators() {
        let stream = table_stream(0, 1, 1, &[(0, 0, 1, 1, "head\u{2029} body \u{2028}foot")]);
        let table = &tables_of(&stream).unwrap()[0];
        assert_eq!(table.rows()[0][0].lines, vec!["head", "body", "foot"]);
    }

    #[test]
    fn test_cell_with_several_paragraphs() {
        let mut stream = encode_record(PARA_HEADER, 0, &[]);
        stream.extend(encode_record(CTRL_HEADER, 1, &ctrl_payload(b"tbl ")));
        stream.extend(encode_record(TABLE, 2, &table_payload(1, 1)));
        stream.extend(encode_record(LIST_HEADER, 2, &cell_payload(3, 0, 0, 1, 1)));
        stream.extend(encode_record(PARA_HEADER, 2, &[]));
        stream.extend(encode_record(PARA_TEXT, 3, &encode_utf16("one")));
        // Empty paragraph: no PARA_TEXT child
        stream.extend(encode_record(PARA_HEADER, 2, &[]));
        stream.extend(encode_record(PARA_HEADER, 2, &[]));
        stream.extend(encode_record(PARA_TEXT, 3, &encode_utf16("two")));
        // Not part of the cell
        stream.extend(encode_record(PARA_HEADER, 2, &[]));
        stream.extend(encode_record(PARA_TEXT, 3, &encode_utf16("three")));

        let table = &tables_of(&stream).unwrap()[0];
        assert_eq!(table.rows()[0][0].lines, vec!["one", "two"]);
    }

    #[test]
    fn test_nested_table_follows_document_order() {
        let mut stream = table_stream(0, 1, 1, &[(0, 0, 1, 1, "outer")]);
        // Inner table hangs under the outer cell's paragraph
        stream.extend(table_stream(3, 2, 1, &[(0, 0, 1, 1, "in0"), (1, 0, 1, 1, "in1")]));
        let tables = tables_of(&stream).unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].cells().count(), 1);
        assert_eq!(tables[1].row_count(), 2);
        assert_eq!(tables[1].rows()[1][0].text(), "in1");
    }

    #[test]
    fn test_list_header_outside_table_control_is_inert() {
        // Header/footer style control owning a list header
        let mut stream = encode_record(PARA_HEADER, 0, &[]);
        stream.extend(encode_record(CTRL_HEADER, 1, &ctrl_payload(b"head")));
        stream.extend(encode_record(LIST_HEADER, 2, &cell_payload(1, 0, 0, 1, 1)));
        stream.extend(encode_record(PARA_HEADER, 2, &[]));
        assert!(tables_of(&stream).unwrap().is_empty());
    }

    #[test]
    fn test_cell_before_table_is_structural_error() {
        let mut stream = encode_record(PARA_HEADER, 0, &[]);
        stream.extend(encode_record(CTRL_HEADER, 1, &ctrl_payload(b"tbl ")));
        stream.extend(encode_record(LIST_HEADER, 2, &cell_payload(0, 0, 0, 1, 1)));
        assert!(matches!(tables_of(&stream), Err(Error::Structural(_))));
    }

    #[test]
    fn test_row_out_of_range_is_structural_error() {
        let stream = table_stream(0, 1, 1, &[(1, 0, 1, 1, "x")]);
        assert!(matches!(tables_of(&stream), Err(Error::Structural(_))));
    }

    #[test]
    fn test_short_payloads_are_format_errors() {
        let mut stream = encode_record(TABLE, 0, &[0u8; 6]);
        assert!(matches!(tables_of(&stream), Err(Error::Format(_))));

        stream = encode_record(PARA_HEADER, 0, &[]);
        stream.extend(encode_record(CTRL_HEADER, 1, &ctrl_payload(b"tbl ")));
        stream.extend(encode_record(TABLE, 2, &table_payload(1, 1)));
        stream.extend(encode_record(LIST_HEADER, 2, &[1, 0, 0, 0]));
        assert!(matches!(tables_of(&stream), Err(Error::Format(_))));
    }
}
