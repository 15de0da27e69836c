//! Uniform rectangular view over row-oriented sources.
//!
//! Both a native worksheet cell grid ([`SheetRows`]) and decoded delimited
//! text ([`TableRows`]) are exposed through [`RowSource`], so the schema
//! readers never see where the rows came from. Every row handed out is padded
//! with empty strings to the source width; no validation happens here.

use calamine::{DataType, Range};

/// Rectangular row sequence accessor.
pub trait RowSource {
    /// Number of columns every row is padded to.
    fn width(&self) -> usize;

    /// Number of rows, header included.
    fn height(&self) -> usize;

    /// Returns the row at zero-based `index`, padded to [`RowSource::width`].
    fn row(&self, index: usize) -> Option<Vec<String>>;

    /// Iterates rows from `min_row` up to (excluding) `max_row`, or to the end
    /// when no maximum is given.
    fn rows(&self, min_row: usize, max_row: Option<usize>) -> Box<dyn Iterator<Item = Vec<String>> + '_> {
        let stop = max_row.map_or(self.height(), |max| max.min(self.height()));
        Box::new((min_row..stop).filter_map(move |index| self.row(index)))
    }

    /// Returns the header row, or an empty row for an empty source.
    fn header(&self) -> Vec<String> {
        self.row(0).unwrap_or_default()
    }
}

/// Worksheet cell grid read from a workbook.
///
/// Rows are anchored at cell `A1`: blank rows and columns before the first
/// used cell are kept, so the header stays at index 0 only when it sits on
/// the first sheet row.
#[derive(Debug, Clone)]
pub struct SheetRows {
    rows: Vec<Vec<String>>,
    width: usize,
}

impl SheetRows {
    pub fn new(range: Range<DataType>) -> Self {
        let Some((start_row, start_col)) = range.start() else {
            return Self {
                rows: Vec::new(),
                width: 0,
            };
        };
        let (start_row, start_col) = (start_row as usize, start_col as usize);
        let width = start_col + range.width();

        let mut rows = vec![vec![String::new(); width]; start_row];
        rows.extend(range.rows().map(|cells| {
            let mut row = vec![String::new(); start_col];
            row.extend(cells.iter().map(|cell| cell_to_string(Some(cell))));
            row.resize(width, String::new());
            row
        }));
        Self { rows, width }
    }
}

impl RowSource for SheetRows {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.rows.len()
    }

    fn row(&self, index: usize) -> Option<Vec<String>> {
        self.rows.get(index).cloned()
    }
}

/// Rows decoded from delimited text, possibly ragged at the source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRows {
    rows: Vec<Vec<String>>,
    width: usize,
}

impl TableRows {
    /// Pads every row on the right to the widest observed row.
    pub fn new(mut rows: Vec<Vec<String>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, String::new());
        }
        Self { rows, width }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the padded rows.
    pub fn as_rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}

impl RowSource for TableRows {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.rows.len()
    }

    fn row(&self, index: usize) -> Option<Vec<String>> {
        self.rows.get(index).cloned()
    }
}

/// Renders a worksheet cell as text the way it would appear in a CSV export.
pub(crate) fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
