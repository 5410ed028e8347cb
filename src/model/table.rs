//! Table types.

use serde::{Deserialize, Serialize};

/// Structured table attached to a TABLE block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    /// Deterministic table ID
    pub table_id: String,

    /// Number of rows
    pub rows: usize,

    /// Number of columns (widest row)
    pub columns: usize,

    /// Column headers, if detected
    #[serde(default)]
    pub headers: Option<Vec<String>>,

    /// Table data as a list of rows, kept exactly as extracted
    pub data: Vec<Vec<String>>,

    /// Plain-text fallback
    pub raw_text: String,

    /// Cell spanning metadata
    #[serde(default)]
    pub cell_spans: Option<Vec<CellSpan>>,
}

impl TableData {
    /// Create table data from extracted rows.
    ///
    /// Ragged rows are kept as given; `columns` is the width of the widest row.
    pub fn new(table_id: impl Into<String>, data: Vec<Vec<String>>, raw_text: impl Into<String>) -> Self {
        let columns = data.iter().map(Vec::len).max().unwrap_or(0);
        Self {
            table_id: table_id.into(),
            rows: data.len(),
            columns,
            headers: None,
            data,
            raw_text: raw_text.into(),
            cell_spans: None,
        }
    }

    /// Set headers and return self.
    pub fn with_headers(mut self, headers: Vec<String>) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Set cell spans and return self.
    pub fn with_cell_spans(mut self, spans: Vec<CellSpan>) -> Self {
        self.cell_spans = Some(spans);
        self
    }

    /// Cell text at `(row, col)`. Missing cells of ragged rows read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.data
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Check if any row is shorter than the widest row.
    pub fn is_ragged(&self) -> bool {
        self.data.iter().any(|r| r.len() != self.columns)
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Check if the table has merged cells.
    pub fn has_merged_cells(&self) -> bool {
        self.cell_spans
            .as_ref()
            .is_some_and(|spans| spans.iter().any(CellSpan::is_merged))
    }
}

/// Row/column span of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSpan {
    /// Row index
    pub row: usize,
    /// Column index
    pub col: usize,
    /// Number of rows spanned
    #[serde(default = "default_span")]
    pub rowspan: usize,
    /// Number of columns spanned
    #[serde(default = "default_span")]
    pub colspan: usize,
}

fn default_span() -> usize {
    1
}

impl CellSpan {
    /// Create a span.
    pub fn new(row: usize, col: usize, rowspan: usize, colspan: usize) -> Self {
        Self {
            row,
            col,
            rowspan,
            colspan,
        }
    }

    /// Check if this cell covers more than one grid position.
    pub fn is_merged(&self) -> bool {
        self.rowspan > 1 || self.colspan > 1
    }
}
