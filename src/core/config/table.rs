//! Top-level pipeline configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ParallelPolicy;
use crate::core::TableOcrError;
use crate::processors::{BinarizeConfig, GridDetectionConfig, MergeConfig, RowGroupingConfig};
use crate::recognition::CellOcrConfig;

/// Configuration for every stage of page processing.
///
/// Missing sections and fields take their defaults when deserializing, so a
/// configuration file only needs to name the values it changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableOcrConfig {
    #[serde(default)]
    pub binarize: BinarizeConfig,
    #[serde(default)]
    pub grid: GridDetectionConfig,
    #[serde(default)]
    pub merge: MergeConfig,
    #[serde(default)]
    pub rows: RowGroupingConfig,
    #[serde(default)]
    pub cell_ocr: CellOcrConfig,
    #[serde(default)]
    pub parallel: ParallelPolicy,
}

impl TableOcrConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a JSON configuration file.
    pub fn from_json_file(path: &Path) -> Result<Self, TableOcrError> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|e| TableOcrError::ConfigError {
            message: format!("failed to parse {}: {e}", path.display()),
        })
    }

    pub fn with_binarize(mut self, binarize: BinarizeConfig) -> Self {
        self.binarize = binarize;
        self
    }

    pub fn with_grid(mut self, grid: GridDetectionConfig) -> Self {
        self.grid = grid;
        self
    }

    pub fn with_merge(mut self, merge: MergeConfig) -> Self {
        self.merge = merge;
        self
    }

    pub fn with_rows(mut self, rows: RowGroupingConfig) -> Self {
        self.rows = rows;
        self
    }

    pub fn with_cell_ocr(mut self, cell_ocr: CellOcrConfig) -> Self {
        self.cell_ocr = cell_ocr;
        self
    }

    pub fn with_parallel(mut self, parallel: ParallelPolicy) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), TableOcrError> {
        self.binarize.validate()?;
        self.grid.validate()?;
        self.merge.validate()?;
        self.rows.validate()?;
        self.cell_ocr.validate()?;
        self.parallel.validate()?;
        Ok(())
    }
}
