//! Run configuration assembled from command line arguments.

use std::path::PathBuf;

use pdf_table_ocr::core::{TableOcrConfig, TableOcrError};

use crate::Args;

/// Which rasterizer renders the PDF.
#[cfg(feature = "pdfium")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RasterizerKind {
    Poppler,
    Pdfium,
}

/// Everything needed for one conversion.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub pdf: PathBuf,
    pub output: PathBuf,
    pub dpi: u32,
    pub poppler_path: Option<PathBuf>,
    pub tesseract: Option<PathBuf>,
    pub debug_dir: Option<PathBuf>,
    pub pipeline: TableOcrConfig,
    #[cfg(feature = "pdfium")]
    pub rasterizer: RasterizerKind,
    #[cfg(feature = "pdfium")]
    pub pdfium_lib: Option<PathBuf>,
}

impl RunConfig {
    /// Loads the optional settings file, then applies command line overrides.
    pub fn from_args(args: Args) -> Result<Self, TableOcrError> {
        let mut pipeline = match &args.config {
            Some(path) => TableOcrConfig::from_json_file(path)?,
            None => TableOcrConfig::default(),
        };

        if let Some(lang) = args.lang {
            let lang = lang.trim().to_string();
            pipeline.cell_ocr.language = (!lang.is_empty()).then_some(lang);
        }
        if let Some(seconds) = args.cell_timeout {
            pipeline.cell_ocr.timeout_secs = seconds;
        }
        if args.threads.is_some() {
            pipeline.parallel.max_threads = args.threads;
        }
        if args.dpi == 0 {
            return Err(TableOcrError::invalid_field("dpi", "a positive integer", "0"));
        }
        pipeline.validate()?;

        Ok(Self {
            pdf: args.pdf,
            output: args.output,
            dpi: args.dpi,
            poppler_path: args.poppler_path,
            tesseract: args.tesseract,
            debug_dir: args.debug_dir,
            pipeline,
            #[cfg(feature = "pdfium")]
            rasterizer: args.rasterizer,
            #[cfg(feature = "pdfium")]
            pdfium_lib: args.pdfium_lib,
        })
    }
}
