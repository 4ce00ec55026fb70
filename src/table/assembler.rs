//! Per-page table assembly.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{GrayImage, RgbImage};
use rayon::prelude::*;

use super::result::{ExtractionMode, PageResult, TableGrid};
use crate::core::{ParallelPolicy, TableOcrConfig, TableOcrError, TableOcrResult};
use crate::processors::{
    CellLayout, ImageBinarizer, LineGridDetector, Rect, RectMerger, RowGrouper,
};
use crate::recognition::{CellTextExtractor, RecognitionError, TextRecognizer};

/// Cell geometry of a page, ready for recognition.
#[derive(Debug, Clone, PartialEq)]
pub enum PageLayout {
    /// Cells grouped into rows, top-to-bottom and left-to-right.
    Rows(Vec<Vec<Rect>>),
    /// No grid was found; the rectangle covers the whole page.
    WholePage(Rect),
}

/// Turns one page image into a [`TableGrid`].
///
/// Pages are independent: an assembler holds no per-page state and can be shared
/// across threads.
#[derive(Debug, Clone)]
pub struct TablePageAssembler {
    binarizer: ImageBinarizer,
    detector: LineGridDetector,
    merger: RectMerger,
    grouper: RowGrouper,
    extractor: CellTextExtractor,
    parallel: ParallelPolicy,
    debug_dir: Option<PathBuf>,
}

impl TablePageAssembler {
    /// Builds the page pipeline after validating `config`.
    pub fn new(
        config: &TableOcrConfig,
        recognizer: Arc<dyn TextRecognizer>,
    ) -> TableOcrResult<Self> {
        config.validate()?;
        Ok(Self {
            binarizer: ImageBinarizer::new(config.binarize.clone()),
            detector: LineGridDetector::new(config.grid.clone()),
            merger: RectMerger::new(config.merge.clone()),
            grouper: RowGrouper::new(config.rows.clone()),
            extractor: CellTextExtractor::new(recognizer, config.cell_ocr.clone()),
            parallel: config.parallel.clone(),
            debug_dir: None,
        })
    }

    /// Writes each page's ink mask and grid mask as PNG files into `dir`.
    pub fn with_debug_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.debug_dir = dir;
        self
    }

    /// Processes one page, turning any failure into an empty failed result.
    ///
    /// `page_index` is 1-based and only used for logging and the result.
    pub fn process_page(&self, page: &RgbImage, page_index: usize) -> PageResult {
        match self.assemble(page, page_index) {
            Ok((grid, mode)) => {
                tracing::info!(
                    target: "table",
                    page = page_index,
                    rows = grid.row_count(),
                    columns = grid.column_count(),
                    %mode,
                    "Detected rows"
                );
                PageResult::new(page_index, grid, mode)
            }
            Err(err) => {
                tracing::error!(
                    target: "table",
                    page = page_index,
                    error = %err,
                    "Failed page"
                );
                PageResult::failed(page_index, err)
            }
        }
    }

    /// Detects the page layout and recognizes its text.
    pub fn assemble(
        &self,
        page: &RgbImage,
        page_index: usize,
    ) -> TableOcrResult<(TableGrid, ExtractionMode)> {
        let layout = self.layout(page, page_index)?;
        self.assemble_layout(page, page_index, &layout)
    }

    /// Binarizes the page, detects cells and groups them into rows.
    pub fn layout(&self, page: &RgbImage, page_index: usize) -> TableOcrResult<PageLayout> {
        let mask = self.binarizer.binarize(page)?;
        let (layout, grid_mask) = self.detector.detect_with_grid(&mask);

        if let Some(dir) = &self.debug_dir {
            write_debug_masks(dir, page_index, &mask, &grid_mask);
        }

        Ok(match layout {
            CellLayout::WholePage(rect) => {
                tracing::info!(
                    target: "table",
                    page = page_index,
                    "No table grid found, falling back to whole-page text"
                );
                PageLayout::WholePage(rect)
            }
            CellLayout::Candidates(candidates) => {
                let merged = self.merger.merge(&candidates);
                PageLayout::Rows(self.grouper.group(&merged))
            }
        })
    }

    /// Recognizes the text of an already detected layout.
    pub fn assemble_layout(
        &self,
        page: &RgbImage,
        page_index: usize,
        layout: &PageLayout,
    ) -> TableOcrResult<(TableGrid, ExtractionMode)> {
        let (mut grid, mode) = match layout {
            PageLayout::Rows(rows) => {
                let mut grid = self.read_cells(page, page_index, rows);
                grid.pad_to_rectangle();
                (grid, ExtractionMode::Structured)
            }
            PageLayout::WholePage(rect) => {
                let text = self.extractor.extract(page, rect)?;
                (split_free_text(&text), ExtractionMode::Fallback)
            }
        };
        grid.drop_blank_rows();
        Ok((grid, mode))
    }

    fn read_cells(&self, page: &RgbImage, page_index: usize, rows: &[Vec<Rect>]) -> TableGrid {
        let cells: Vec<(usize, usize, Rect)> = rows
            .iter()
            .enumerate()
            .flat_map(|(r, row)| row.iter().enumerate().map(move |(c, rect)| (r, c, *rect)))
            .collect();

        let read = |&(row, column, rect): &(usize, usize, Rect)| {
            self.read_cell(page, page_index, row, column, &rect)
        };
        let texts: Vec<String> = if self.parallel.should_parallelize_cells(cells.len()) {
            cells.par_iter().map(read).collect()
        } else {
            cells.iter().map(read).collect()
        };

        let mut texts = texts.into_iter();
        TableGrid::new(
            rows.iter()
                .map(|row| texts.by_ref().take(row.len()).collect())
                .collect(),
        )
    }

    /// Recognizes one cell; failures leave the cell empty.
    fn read_cell(
        &self,
        page: &RgbImage,
        page_index: usize,
        row: usize,
        column: usize,
        rect: &Rect,
    ) -> String {
        match self.extractor.extract(page, rect) {
            Ok(text) => text,
            Err(TableOcrError::Recognition(RecognitionError::Timeout { seconds })) => {
                tracing::warn!(
                    target: "ocr",
                    page = page_index,
                    row,
                    column,
                    seconds,
                    "Cell OCR timed out; leaving it empty"
                );
                String::new()
            }
            Err(err) => {
                tracing::warn!(
                    target: "ocr",
                    page = page_index,
                    row,
                    column,
                    error = %err,
                    "Cell OCR failed; leaving it empty"
                );
                String::new()
            }
        }
    }
}

/// Splits unstructured page text into rows of whitespace-separated tokens.
fn split_free_text(text: &str) -> TableGrid {
    TableGrid::new(
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| line.split_whitespace().map(str::to_string).collect())
            .collect(),
    )
}

fn write_debug_masks(dir: &Path, page_index: usize, mask: &GrayImage, grid: &GrayImage) {
    for (name, image) in [("mask", mask), ("grid", grid)] {
        let path = dir.join(format!("page_{page_index}_{name}.png"));
        if let Err(err) = image.save(&path) {
            tracing::warn!(
                target: "table",
                path = %path.display(),
                error = %err,
                "Failed to write debug image"
            );
        }
    }
}
