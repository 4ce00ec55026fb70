//! Result types for table reconstruction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// How the grid of a page was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// Cells were found from ruling lines; every row has the same length.
    Structured,
    /// No grid was found; rows are whitespace-split lines of the page text.
    Fallback,
    /// Page processing failed; the grid is empty.
    Failed,
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionMode::Structured => write!(f, "structured"),
            ExtractionMode::Fallback => write!(f, "fallback"),
            ExtractionMode::Failed => write!(f, "failed"),
        }
    }
}

/// Rows of cell texts for one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableGrid {
    rows: Vec<Vec<String>>,
}

impl TableGrid {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Length of the longest row.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// True when every row has the same length.
    pub fn is_rectangular(&self) -> bool {
        let columns = self.column_count();
        self.rows.iter().all(|row| row.len() == columns)
    }

    /// Pads every row with empty strings up to the longest row.
    pub(crate) fn pad_to_rectangle(&mut self) {
        let columns = self.column_count();
        for row in &mut self.rows {
            row.resize(columns, String::new());
        }
    }

    /// Removes rows whose cells are all blank after trimming.
    pub(crate) fn drop_blank_rows(&mut self) {
        self.rows
            .retain(|row| row.iter().any(|cell| !cell.trim().is_empty()));
    }
}

impl From<Vec<Vec<String>>> for TableGrid {
    fn from(rows: Vec<Vec<String>>) -> Self {
        Self::new(rows)
    }
}

/// The grid recovered from one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    /// 1-based page number in rasterization order.
    #[serde(rename = "page")]
    pub page_index: usize,
    pub mode: ExtractionMode,
    #[serde(rename = "rows")]
    pub grid: TableGrid,
    /// Error message for failed pages.
    pub error: Option<String>,
}

impl PageResult {
    pub fn new(page_index: usize, grid: TableGrid, mode: ExtractionMode) -> Self {
        Self {
            page_index,
            mode,
            grid,
            error: None,
        }
    }

    /// An empty page recording why processing failed.
    pub fn failed(page_index: usize, error: impl fmt::Display) -> Self {
        Self {
            page_index,
            mode: ExtractionMode::Failed,
            grid: TableGrid::empty(),
            error: Some(error.to_string()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.mode == ExtractionMode::Failed
    }
}

/// Results for every page of a document, in page order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentResult {
    pub pages: Vec<PageResult>,
    /// Wall time spent processing pages.
    #[serde(skip)]
    pub elapsed: Duration,
}

impl DocumentResult {
    pub fn new(pages: Vec<PageResult>, elapsed: Duration) -> Self {
        Self { pages, elapsed }
    }

    /// Counts of pages per extraction mode and total rows.
    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary {
            pages: self.pages.len(),
            elapsed: self.elapsed,
            ..Default::default()
        };
        for page in &self.pages {
            match page.mode {
                ExtractionMode::Structured => summary.structured += 1,
                ExtractionMode::Fallback => summary.fallback += 1,
                ExtractionMode::Failed => summary.failed += 1,
            }
            summary.rows += page.grid.row_count();
        }
        summary
    }
}

/// Aggregate statistics of a document run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub pages: usize,
    pub structured: usize,
    pub fallback: usize,
    pub failed: usize,
    pub rows: usize,
    pub elapsed: Duration,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pages processed: {}", self.pages)?;
        writeln!(
            f,
            "  structured: {}, fallback: {}, failed: {}",
            self.structured, self.fallback, self.failed
        )?;
        writeln!(f, "Rows extracted: {}", self.rows)?;
        write!(f, "Processing time: {:.2}s", self.elapsed.as_secs_f64())
    }
}
