//! PDF page rasterization.
//!
//! Rendering PDF pages is delegated to an external tool behind the
//! [`PageRasterizer`] trait. [`PopplerRasterizer`] shells out to `pdftoppm`; with the
//! `pdfium` feature, `PdfiumRasterizer` renders in-process.

#[cfg(feature = "pdfium")]
mod pdfium;
mod poppler;

#[cfg(feature = "pdfium")]
pub use pdfium::PdfiumRasterizer;
pub use poppler::PopplerRasterizer;

use std::path::Path;

use image::RgbImage;
use thiserror::Error;

/// Errors raised while rendering a document. All of them are fatal for a run.
#[derive(Error, Debug)]
pub enum RasterError {
    #[error("failed to initialize renderer: {0}")]
    Init(String),

    #[error("failed to load PDF: {0}")]
    Load(String),

    #[error("failed to render page {page}: {message}")]
    Render { page: usize, message: String },

    #[error("{tool} exited with {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("PDF has no pages")]
    EmptyDocument,

    #[error("failed to decode rendered page")]
    Image(#[from] image::ImageError),

    #[error("io")]
    Io(#[from] std::io::Error),
}

/// Renders every page of a PDF to an RGB image.
pub trait PageRasterizer: Send + Sync {
    /// Returns the pages of `pdf` rendered at `dpi`, in document order.
    fn rasterize(&self, pdf: &Path, dpi: u32) -> Result<Vec<RgbImage>, RasterError>;
}

/// Checks if bytes represent a PDF file (magic bytes: %PDF).
pub fn is_pdf_bytes(bytes: &[u8]) -> bool {
    bytes.starts_with(b"%PDF")
}

/// Checks if a file path has a PDF extension.
pub fn is_pdf_path(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_detection() {
        assert!(is_pdf_bytes(b"%PDF-1.7\n"));
        assert!(!is_pdf_bytes(b"\x89PNG"));
        assert!(is_pdf_path(Path::new("scan.PDF")));
        assert!(!is_pdf_path(Path::new("scan.png")));
        assert!(!is_pdf_path(Path::new("scan")));
    }
}
