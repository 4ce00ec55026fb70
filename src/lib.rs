//! # pdf-table-ocr
//!
//! Reconstructs gridded tables from scanned PDF pages.
//!
//! Each page is rasterized, binarized, and searched for the long horizontal and
//! vertical rules of a table. The closed regions between the rules become cells,
//! which are grouped into rows and recognized one by one with an OCR engine. The
//! result is a rectangular grid of strings per page, written to a spreadsheet (one
//! sheet per page) or a JSON document. Pages without a detectable grid fall back to
//! whole-page text split into lines and words.
//!
//! ## Modules
//!
//! - [`processors`] - Binarization, grid detection, rectangle merging, row grouping
//! - [`recognition`] - The [`TextRecognizer`](recognition::TextRecognizer) trait,
//!   the tesseract adapter and per-cell text extraction
//! - [`table`] - Page assembly and whole-document processing
//! - [`raster`] - PDF rasterization
//! - [`export`] - Spreadsheet and JSON writers
//! - [`core`] - Configuration and error types
//! - [`utils`] - Cropping, OCR preprocessing and logging setup
//!
//! ## External tools
//!
//! The default collaborators shell out to poppler's `pdftoppm` and to `tesseract`;
//! both must be installed (or pointed to explicitly). Enable the `pdfium` feature to
//! render PDFs in-process with PDFium instead.

pub mod core;
pub mod export;
pub mod processors;
pub mod raster;
pub mod recognition;
pub mod table;
pub mod utils;

/// Commonly used items.
pub mod prelude {
    pub use crate::core::{ParallelPolicy, TableOcrConfig, TableOcrError, TableOcrResult};
    pub use crate::export::{preflight, write_results};
    pub use crate::raster::{PageRasterizer, PopplerRasterizer};
    pub use crate::recognition::{SegmentationMode, TesseractCli, TextRecognizer};
    pub use crate::table::{DocumentProcessor, DocumentResult, ExtractionMode, PageResult, TableGrid};
}
