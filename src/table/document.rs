//! Whole-document processing.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use image::RgbImage;
use rayon::prelude::*;

use super::assembler::TablePageAssembler;
use super::result::{DocumentResult, PageResult};
use crate::core::{ParallelPolicy, TableOcrConfig, TableOcrResult};
use crate::raster::PageRasterizer;
use crate::recognition::TextRecognizer;

/// Runs the page pipeline over every page of a document.
///
/// Pages are processed independently, in parallel unless disabled by the
/// [`ParallelPolicy`], and the results are always returned in page order. A page
/// that fails yields an empty failed [`PageResult`]; it never aborts the run.
#[derive(Debug, Clone)]
pub struct DocumentProcessor {
    assembler: TablePageAssembler,
    parallel: ParallelPolicy,
}

impl DocumentProcessor {
    /// Fails when `config` does not validate.
    pub fn new(
        config: &TableOcrConfig,
        recognizer: Arc<dyn TextRecognizer>,
    ) -> TableOcrResult<Self> {
        Ok(Self {
            assembler: TablePageAssembler::new(config, recognizer)?,
            parallel: config.parallel.clone(),
        })
    }

    /// Writes per-page debug masks into `dir`.
    pub fn with_debug_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.assembler = self.assembler.with_debug_dir(dir);
        self
    }

    pub fn assembler(&self) -> &TablePageAssembler {
        &self.assembler
    }

    /// Processes already rasterized pages. Page numbers start at 1.
    pub fn process_pages(&self, pages: &[RgbImage]) -> DocumentResult {
        let total = pages.len();
        let started = Instant::now();

        let process = |(index, page): (usize, &RgbImage)| -> PageResult {
            tracing::info!(target: "table", "Processing page {}/{}", index + 1, total);
            self.assembler.process_page(page, index + 1)
        };
        let results: Vec<PageResult> = if self.parallel.parallel_pages {
            pages.par_iter().enumerate().map(&process).collect()
        } else {
            pages.iter().enumerate().map(&process).collect()
        };

        let elapsed = started.elapsed();
        tracing::info!(
            target: "table",
            pages = total,
            failed = results.iter().filter(|p| p.is_failed()).count(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Document processed"
        );
        DocumentResult::new(results, elapsed)
    }

    /// Rasterizes `pdf` at `dpi` and processes every page.
    ///
    /// Rasterization failures are fatal and returned as errors.
    pub fn process_document(
        &self,
        rasterizer: &dyn PageRasterizer,
        pdf: &Path,
        dpi: u32,
    ) -> TableOcrResult<DocumentResult> {
        tracing::info!(target: "raster", dpi, "Converting PDF pages to images");
        let pages = rasterizer.rasterize(pdf, dpi)?;
        tracing::info!(target: "raster", pages = pages.len(), "Rasterized document");
        Ok(self.process_pages(&pages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::RasterError;
    use crate::recognition::testing::ScriptedRecognizer;
    use crate::table::ExtractionMode;
    use image::Rgb;

    struct StaticRasterizer(Vec<RgbImage>);

    impl PageRasterizer for StaticRasterizer {
        fn rasterize(&self, _pdf: &Path, _dpi: u32) -> Result<Vec<RgbImage>, RasterError> {
            Ok(self.0.clone())
        }
    }

    struct BrokenRasterizer;

    impl PageRasterizer for BrokenRasterizer {
        fn rasterize(&self, _pdf: &Path, _dpi: u32) -> Result<Vec<RgbImage>, RasterError> {
            Err(RasterError::EmptyDocument)
        }
    }

    /// Pages of different widths so the recognizer can tell them apart.
    fn pages() -> Vec<RgbImage> {
        vec![
            RgbImage::from_pixel(110, 100, Rgb([255, 255, 255])),
            RgbImage::new(0, 0),
            RgbImage::from_pixel(130, 100, Rgb([255, 255, 255])),
            RgbImage::from_pixel(140, 100, Rgb([255, 255, 255])),
        ]
    }

    fn processor(parallel_pages: bool) -> DocumentProcessor {
        let recognizer = Arc::new(ScriptedRecognizer::new(|image, _| {
            // Whole-page fallback crops are upscaled 2x.
            Ok(format!("width {}", image.width() / 2))
        }));
        let config = TableOcrConfig::default()
            .with_parallel(ParallelPolicy::new().with_parallel_pages(parallel_pages));
        DocumentProcessor::new(&config, recognizer).unwrap()
    }

    #[test]
    fn test_results_follow_page_order() {
        for parallel in [true, false] {
            let result = processor(parallel).process_pages(&pages());
            let indices: Vec<usize> = result.pages.iter().map(|p| p.page_index).collect();
            assert_eq!(indices, vec![1, 2, 3, 4]);
            assert_eq!(result.pages[0].grid.rows()[0], vec!["width", "110"]);
            assert_eq!(result.pages[2].grid.rows()[0], vec!["width", "130"]);
            assert_eq!(result.pages[3].grid.rows()[0], vec!["width", "140"]);
        }
    }

    #[test]
    fn test_failed_page_does_not_stop_the_run() {
        let result = processor(true).process_pages(&pages());
        assert_eq!(result.pages[1].mode, ExtractionMode::Failed);
        assert!(result.pages[1].grid.is_empty());
        let summary = result.summary();
        assert_eq!(summary.pages, 4);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.fallback, 3);
    }

    #[test]
    fn test_process_document_uses_rasterizer() {
        let rasterizer = StaticRasterizer(vec![RgbImage::from_pixel(
            120,
            100,
            Rgb([255, 255, 255]),
        )]);
        let result = processor(true)
            .process_document(&rasterizer, Path::new("in.pdf"), 300)
            .unwrap();
        assert_eq!(result.pages.len(), 1);
        assert_eq!(result.pages[0].grid.rows()[0], vec!["width", "120"]);
    }

    #[test]
    fn test_rasterizer_failure_is_fatal() {
        let err = processor(true)
            .process_document(&BrokenRasterizer, Path::new("in.pdf"), 300)
            .unwrap_err();
        assert_eq!(
            err.stage(),
            Some(crate::core::ProcessingStage::Rasterization)
        );
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = TableOcrConfig::default()
            .with_parallel(ParallelPolicy::new().with_max_threads(Some(0)));
        let recognizer = Arc::new(ScriptedRecognizer::constant("x"));
        assert!(DocumentProcessor::new(&config, recognizer).is_err());
    }

    #[test]
    fn test_empty_document_has_no_pages() {
        let result = processor(true).process_pages(&[]);
        assert!(result.pages.is_empty());
        assert_eq!(result.summary().rows, 0);
    }
}
