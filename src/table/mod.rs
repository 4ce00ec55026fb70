//! Table reconstruction pipeline.
//!
//! [`TablePageAssembler`] turns one page image into a [`TableGrid`];
//! [`DocumentProcessor`] runs it over every page of a document and collects the
//! [`PageResult`]s in page order.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use pdf_table_ocr::core::TableOcrConfig;
//! use pdf_table_ocr::raster::PopplerRasterizer;
//! use pdf_table_ocr::recognition::TesseractCli;
//! use pdf_table_ocr::table::DocumentProcessor;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TableOcrConfig::default();
//! let recognizer = Arc::new(TesseractCli::new().with_timeout(config.cell_ocr.timeout()));
//! let processor = DocumentProcessor::new(&config, recognizer)?;
//! let result = processor.process_document(&PopplerRasterizer::new(), Path::new("tables.pdf"), 300)?;
//! for page in &result.pages {
//!     println!("page {}: {} rows", page.page_index, page.grid.row_count());
//! }
//! # Ok(())
//! # }
//! ```

mod assembler;
mod document;
mod result;

pub use assembler::{PageLayout, TablePageAssembler};
pub use document::DocumentProcessor;
pub use result::{DocumentResult, ExtractionMode, PageResult, RunSummary, TableGrid};
