//! JSON output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use super::ExportError;
use crate::table::PageResult;

#[derive(Serialize)]
struct JsonDocument<'a> {
    pages: &'a [PageResult],
}

/// Writes `{ "pages": [...] }` with one entry per page.
pub fn write_json(path: &Path, pages: &[PageResult]) -> Result<(), ExportError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &JsonDocument { pages })?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
