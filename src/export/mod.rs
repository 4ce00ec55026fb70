//! Writing page results to disk.
//!
//! The destination's extension picks the format: `.json` writes a JSON document,
//! anything else a spreadsheet with one sheet per page.

mod json;
mod xlsx;

pub use json::write_json;
pub use xlsx::{sheet_name, write_xlsx};

use std::fs::File;
use std::io::Read;
use std::path::Path;

use thiserror::Error;

use crate::core::{TableOcrError, TableOcrResult};
use crate::raster::{is_pdf_bytes, is_pdf_path};
use crate::table::PageResult;

/// Errors raised by the output writers.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("spreadsheet")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("json")]
    Json(#[from] serde_json::Error),

    #[error("io")]
    Io(#[from] std::io::Error),
}

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Xlsx,
    Json,
}

impl OutputFormat {
    /// Format implied by the extension of `path`.
    pub fn from_path(path: &Path) -> Self {
        match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("json") => OutputFormat::Json,
            _ => OutputFormat::Xlsx,
        }
    }
}

/// Writes `pages` to `path` in the format selected by its extension.
pub fn write_results(path: &Path, pages: &[PageResult]) -> Result<(), ExportError> {
    let format = OutputFormat::from_path(path);
    tracing::info!(
        target: "export",
        path = %path.display(),
        ?format,
        pages = pages.len(),
        "Saving results"
    );
    match format {
        OutputFormat::Xlsx => write_xlsx(path, pages),
        OutputFormat::Json => write_json(path, pages),
    }
}

/// Checks that `input` is an existing file and that `output` can be created.
///
/// Runs before any page work so that a bad invocation fails fast.
pub fn preflight(input: &Path, output: &Path) -> TableOcrResult<()> {
    if !input.is_file() {
        return Err(TableOcrError::invalid_input(format!(
            "Input PDF not found: {}",
            input.display()
        )));
    }
    let mut magic = [0u8; 4];
    let has_pdf_header = File::open(input)
        .and_then(|mut file| file.read_exact(&mut magic))
        .map(|_| is_pdf_bytes(&magic))
        .unwrap_or(false);
    if !has_pdf_header || !is_pdf_path(input) {
        tracing::warn!(
            target: "export",
            path = %input.display(),
            has_pdf_header,
            "Input does not look like a PDF; rasterization may fail"
        );
    }

    if output.is_dir() {
        return Err(TableOcrError::invalid_input(format!(
            "Output path is a directory: {}",
            output.display()
        )));
    }
    let parent = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !parent.is_dir() {
        return Err(TableOcrError::invalid_input(format!(
            "Output directory does not exist: {}",
            parent.display()
        )));
    }
    if let Ok(metadata) = output.metadata()
        && metadata.permissions().readonly()
    {
        return Err(TableOcrError::invalid_input(format!(
            "Output file is read-only: {}",
            output.display()
        )));
    }
    // Check with a throwaway file; removed again when dropped.
    if let Err(err) = tempfile::NamedTempFile::new_in(parent) {
        return Err(TableOcrError::invalid_input(format!(
            "Output directory is not writable: {} ({err})",
            parent.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("out.xlsx")), OutputFormat::Xlsx);
        assert_eq!(OutputFormat::from_path(Path::new("out.JSON")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_path(Path::new("out")), OutputFormat::Xlsx);
    }

    #[test]
    fn test_preflight_requires_existing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = preflight(&dir.path().join("missing.pdf"), &dir.path().join("out.xlsx"))
            .unwrap_err();
        assert!(err.to_string().contains("Input PDF not found"));
    }

    #[test]
    fn test_preflight_checks_output_location() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        std::fs::write(&input, b"%PDF-1.4").unwrap();

        assert!(preflight(&input, &dir.path().join("out.xlsx")).is_ok());
        assert!(preflight(&input, dir.path()).is_err());
        assert!(preflight(&input, &dir.path().join("missing/out.xlsx")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_preflight_rejects_read_only_directory() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        std::fs::write(&input, b"%PDF-1.4").unwrap();
        let locked = dir.path().join("locked");
        std::fs::create_dir(&locked).unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o555)).unwrap();

        // Privileged users ignore mode bits; nothing to check then.
        let privileged = tempfile::NamedTempFile::new_in(&locked).is_ok();
        let result = preflight(&input, &locked.join("out.xlsx"));
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
        if privileged {
            return;
        }

        let err = result.unwrap_err();
        assert!(err.to_string().contains("not writable"));
        assert!(!locked.join("out.xlsx").exists());
    }

    #[test]
    fn test_preflight_leaves_no_files_behind() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        std::fs::write(&input, b"%PDF-1.4").unwrap();
        preflight(&input, &dir.path().join("out.xlsx")).unwrap();
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_write_results_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();
        let pages = vec![PageResult::failed(1, "boom")];

        let json = dir.path().join("out.json");
        write_results(&json, &pages).unwrap();
        assert!(std::fs::read_to_string(&json).unwrap().starts_with('{'));

        let xlsx = dir.path().join("out.xlsx");
        write_results(&xlsx, &pages).unwrap();
        assert!(std::fs::read(&xlsx).unwrap().starts_with(b"PK"));
    }
}
