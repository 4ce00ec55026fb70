//! Spreadsheet output.

use std::path::Path;

use rust_xlsxwriter::Workbook;

use super::ExportError;
use crate::table::PageResult;

/// Longest sheet name Excel accepts.
const MAX_SHEET_NAME_CHARS: usize = 31;

/// Sheet name for a 1-based page number.
pub fn sheet_name(page_index: usize) -> String {
    format!("Page_{page_index}")
        .chars()
        .take(MAX_SHEET_NAME_CHARS)
        .collect()
}

/// Writes one sheet per page, cells as plain strings, without a header row.
///
/// Failed and empty pages still get their (empty) sheet so sheet numbers line up
/// with page numbers.
pub fn write_xlsx(path: &Path, pages: &[PageResult]) -> Result<(), ExportError> {
    let mut workbook = Workbook::new();

    for page in pages {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet_name(page.page_index))?;
        for (row, cells) in page.grid.rows().iter().enumerate() {
            for (column, text) in cells.iter().enumerate() {
                if !text.is_empty() {
                    worksheet.write_string(row as u32, column as u16, text)?;
                }
            }
        }
    }
    if pages.is_empty() {
        // A workbook needs at least one sheet.
        workbook.add_worksheet();
    }

    workbook.save(path)?;
    tracing::debug!(target: "export", path = %path.display(), sheets = pages.len(), "Wrote workbook");
    Ok(())
}
