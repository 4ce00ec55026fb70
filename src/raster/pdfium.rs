//! In-process rasterization through PDFium.

use std::path::{Path, PathBuf};

use image::RgbImage;
use pdfium_render::prelude::*;

use super::{PageRasterizer, RasterError};

/// Directories searched for the PDFium shared library, after any explicit one.
const LIBRARY_DIRS: [&str; 4] = ["./", "/usr/lib", "/usr/local/lib", "/opt/homebrew/lib"];

/// Renders pages with PDFium.
///
/// The library is bound on every call so the rasterizer itself stays `Send + Sync`.
#[derive(Debug, Clone)]
pub struct PdfiumRasterizer {
    library_dir: Option<PathBuf>,
    /// Rendered pages are scaled down so neither side exceeds this. Default: 10000
    max_dimension: u32,
}

impl Default for PdfiumRasterizer {
    fn default() -> Self {
        Self {
            library_dir: None,
            max_dimension: 10_000,
        }
    }
}

impl PdfiumRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks for the PDFium library in `dir` first.
    pub fn with_library_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.library_dir = Some(dir.into());
        self
    }

    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension;
        self
    }

    fn bind(&self) -> Result<Pdfium, RasterError> {
        let explicit = self
            .library_dir
            .iter()
            .map(|dir| dir.to_string_lossy().into_owned());
        let candidates: Vec<String> = explicit
            .chain(LIBRARY_DIRS.iter().map(|dir| dir.to_string()))
            .collect();

        for dir in &candidates {
            if let Ok(bindings) =
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
            {
                return Ok(Pdfium::new(bindings));
            }
        }
        Pdfium::bind_to_system_library()
            .map(Pdfium::new)
            .map_err(|e| RasterError::Init(format!("could not find PDFium library: {e}")))
    }

    /// Target pixel size of a page at `dpi`, capped at `max_dimension`.
    fn target_size(&self, width_points: f32, height_points: f32, dpi: u32) -> (u32, u32) {
        // 72 points per inch
        let mut width_px = (width_points * dpi as f32 / 72.0) as u32;
        let mut height_px = (height_points * dpi as f32 / 72.0) as u32;

        let longest = width_px.max(height_px);
        if longest > self.max_dimension {
            let max = u64::from(self.max_dimension);
            width_px = (u64::from(width_px) * max / u64::from(longest)) as u32;
            height_px = (u64::from(height_px) * max / u64::from(longest)) as u32;
        }
        (width_px.max(1), height_px.max(1))
    }

    fn render_page(&self, page: &PdfPage, dpi: u32, number: usize) -> Result<RgbImage, RasterError> {
        let (width_px, height_px) = self.target_size(page.width().value, page.height().value, dpi);

        let render_config = PdfRenderConfig::new()
            .set_target_width(width_px as i32)
            .set_target_height(height_px as i32)
            .render_form_data(true)
            .render_annotations(true);

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| RasterError::Render {
                page: number,
                message: e.to_string(),
            })?;

        Ok(bitmap.as_image().to_rgb8())
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn rasterize(&self, pdf: &Path, dpi: u32) -> Result<Vec<RgbImage>, RasterError> {
        let pdfium = self.bind()?;
        let document = pdfium
            .load_pdf_from_file(pdf, None)
            .map_err(|e| RasterError::Load(e.to_string()))?;

        let page_count = document.pages().len() as usize;
        if page_count == 0 {
            return Err(RasterError::EmptyDocument);
        }

        let mut images = Vec::with_capacity(page_count);
        for (index, page) in document.pages().iter().enumerate() {
            let image = self.render_page(&page, dpi, index + 1)?;
            tracing::debug!(
                target: "raster",
                page = index + 1,
                width = image.width(),
                height = image.height(),
                "Rendered page"
            );
            images.push(image);
        }
        Ok(images)
    }
}
