//! The conversion run.

use std::sync::Arc;
use std::time::Instant;

use pdf_table_ocr::export::{preflight, write_results};
use pdf_table_ocr::raster::{PageRasterizer, PopplerRasterizer};
use pdf_table_ocr::recognition::TesseractCli;
use pdf_table_ocr::table::DocumentProcessor;
use tracing::{info, warn};

use crate::config::RunConfig;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Converts `config.pdf` into `config.output` and prints a summary.
pub fn run(config: &RunConfig) -> Result<(), BoxError> {
    let start = Instant::now();

    preflight(&config.pdf, &config.output)?;
    if let Some(dir) = &config.debug_dir {
        std::fs::create_dir_all(dir)?;
    }

    let mut tesseract = TesseractCli::new().with_timeout(config.pipeline.cell_ocr.timeout());
    if let Some(path) = &config.tesseract {
        tesseract = tesseract.with_binary(path);
    }
    if !tesseract.is_available() {
        return Err(format!(
            "tesseract not found at '{}'; install it or pass --tesseract",
            tesseract.binary().display()
        )
        .into());
    }

    let rasterizer = build_rasterizer(config)?;

    match config.pipeline.parallel.install_global_thread_pool() {
        Ok(true) => info!("Using {:?} worker threads", config.pipeline.parallel.max_threads),
        Ok(false) => {}
        Err(err) => warn!("Could not configure the thread pool: {}", err),
    }

    info!("Converting PDF pages to images (dpi={})...", config.dpi);
    let render_start = Instant::now();
    let pages = rasterizer.rasterize(&config.pdf, config.dpi)?;
    info!(
        "Rendered {} pages in {:.2}ms",
        pages.len(),
        render_start.elapsed().as_secs_f64() * 1000.0
    );

    let processor = DocumentProcessor::new(&config.pipeline, Arc::new(tesseract))?
        .with_debug_dir(config.debug_dir.clone());
    let result = processor.process_pages(&pages);

    write_results(&config.output, &result.pages)?;

    println!("\n=== Table extraction ===");
    println!("Output: {}", config.output.display());
    println!("{}", result.summary());
    for page in result.pages.iter().filter(|p| p.is_failed()) {
        println!(
            "  page {} failed: {}",
            page.page_index,
            page.error.as_deref().unwrap_or("unknown error")
        );
    }
    println!("Total time: {:.2}s", start.elapsed().as_secs_f64());

    Ok(())
}

fn build_rasterizer(config: &RunConfig) -> Result<Box<dyn PageRasterizer>, BoxError> {
    #[cfg(feature = "pdfium")]
    if config.rasterizer == crate::config::RasterizerKind::Pdfium {
        let mut pdfium = pdf_table_ocr::raster::PdfiumRasterizer::new();
        if let Some(dir) = &config.pdfium_lib {
            pdfium = pdfium.with_library_dir(dir);
        }
        return Ok(Box::new(pdfium));
    }

    let mut poppler = PopplerRasterizer::new();
    if let Some(path) = &config.poppler_path {
        poppler = poppler.with_poppler_path(path);
    }
    if !poppler.is_available() {
        return Err(format!(
            "pdftoppm not found at '{}'; install poppler or pass --poppler-path",
            poppler.binary().display()
        )
        .into());
    }
    Ok(Box::new(poppler))
}
