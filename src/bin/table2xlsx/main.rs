//! table2xlsx
//!
//! Converts a PDF whose pages are images of gridded tables into a spreadsheet with
//! one sheet per page.
//!
//! # Usage
//!
//! ```bash
//! table2xlsx input.pdf output.xlsx --dpi 300 --lang vie
//! table2xlsx input.pdf output.json --poppler-path /opt/poppler/bin --tesseract /usr/bin/tesseract
//! ```

mod cli;
mod config;

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "table2xlsx")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract gridded tables from image-based PDF pages into a spreadsheet", long_about = None)]
pub struct Args {
    /// Input PDF path
    pub pdf: PathBuf,

    /// Output path (.xlsx, or .json for a JSON document)
    pub output: PathBuf,

    /// DPI for PDF to image conversion
    #[arg(long, default_value_t = 300, env = "TABLE_OCR_DPI")]
    pub dpi: u32,

    /// Tesseract language (default 'vie'; use 'eng' if 'vie' is not installed)
    #[arg(long, env = "TABLE_OCR_LANG")]
    pub lang: Option<String>,

    /// Path to pdftoppm or to the poppler bin directory that contains it
    #[arg(long = "poppler-path", env = "TABLE_OCR_POPPLER_PATH")]
    pub poppler_path: Option<PathBuf>,

    /// Path to the tesseract executable (looked up on PATH otherwise)
    #[arg(long, env = "TABLE_OCR_TESSERACT")]
    pub tesseract: Option<PathBuf>,

    /// Number of worker threads (defaults to number of CPUs)
    #[arg(long, env = "TABLE_OCR_THREADS")]
    pub threads: Option<usize>,

    /// Seconds allowed for a single OCR call (default 60)
    #[arg(long = "cell-timeout", env = "TABLE_OCR_CELL_TIMEOUT")]
    pub cell_timeout: Option<u64>,

    /// JSON file with pipeline settings; command line flags take precedence
    #[arg(long, env = "TABLE_OCR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory for per-page binary and grid masks
    #[arg(long = "debug-dir")]
    pub debug_dir: Option<PathBuf>,

    /// Rasterizer backend
    #[cfg(feature = "pdfium")]
    #[arg(long, value_enum, default_value = "poppler", env = "TABLE_OCR_RASTERIZER")]
    pub rasterizer: config::RasterizerKind,

    /// Directory containing the PDFium shared library
    #[cfg(feature = "pdfium")]
    #[arg(long = "pdfium-lib", env = "TABLE_OCR_PDFIUM_LIB")]
    pub pdfium_lib: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    pdf_table_ocr::utils::init_tracing();

    let args = Args::parse();
    let config = match config::RunConfig::from_args(args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = cli::run(&config) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }

    Ok(())
}
