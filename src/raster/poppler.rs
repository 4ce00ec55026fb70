//! `pdftoppm` command line adapter.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use image::RgbImage;

use super::{PageRasterizer, RasterError};

const TOOL: &str = "pdftoppm";

/// Renders pages with poppler's `pdftoppm` into a scratch directory and loads
/// the resulting PNG files.
#[derive(Debug, Clone)]
pub struct PopplerRasterizer {
    binary: PathBuf,
}

impl Default for PopplerRasterizer {
    fn default() -> Self {
        Self {
            binary: PathBuf::from(TOOL),
        }
    }
}

impl PopplerRasterizer {
    /// Uses `pdftoppm` from `PATH`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a specific poppler installation.
    ///
    /// `path` may be the `pdftoppm` executable itself or the `bin` directory that
    /// contains it.
    pub fn with_poppler_path(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        self.binary = if path.is_dir() {
            path.join(format!("{TOOL}{}", std::env::consts::EXE_SUFFIX))
        } else {
            path.to_path_buf()
        };
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// True when `pdftoppm -v` runs successfully.
    pub fn is_available(&self) -> bool {
        let available = Command::new(&self.binary)
            .arg("-v")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false);
        if !available {
            tracing::debug!(target: "raster", binary = %self.binary.display(), "pdftoppm not available");
        }
        available
    }
}

/// Page number encoded in a `pdftoppm` output name such as `page-07.png`.
fn page_number(path: &Path) -> Option<usize> {
    let stem = path.file_stem()?.to_str()?;
    let (_, number) = stem.rsplit_once('-')?;
    number.parse().ok()
}

impl PageRasterizer for PopplerRasterizer {
    fn rasterize(&self, pdf: &Path, dpi: u32) -> Result<Vec<RgbImage>, RasterError> {
        let scratch = tempfile::tempdir()?;
        let prefix = scratch.path().join("page");

        let output = Command::new(&self.binary)
            .arg("-r")
            .arg(dpi.to_string())
            .arg("-png")
            .arg(pdf)
            .arg(&prefix)
            .stdin(Stdio::null())
            .output()?;
        if !output.status.success() {
            return Err(RasterError::ToolFailed {
                tool: TOOL.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let mut files: Vec<(usize, PathBuf)> = fs::read_dir(scratch.path())?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "png"))
            .filter_map(|path| page_number(&path).map(|n| (n, path)))
            .collect();
        files.sort_by_key(|(number, _)| *number);

        if files.is_empty() {
            return Err(RasterError::EmptyDocument);
        }

        let mut pages = Vec::with_capacity(files.len());
        for (number, path) in files {
            let page = image::open(&path)?.to_rgb8();
            tracing::debug!(
                target: "raster",
                page = number,
                width = page.width(),
                height = page.height(),
                "Loaded rendered page"
            );
            pages.push(page);
        }
        Ok(pages)
    }
}
