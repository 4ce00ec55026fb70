//! Grouping of cell rectangles into table rows.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use crate::core::TableOcrError;

/// Parameters for [`RowGrouper`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowGroupingConfig {
    /// Fraction of the taller of two cells allowed as vertical offset. Default: 0.5
    #[serde(default = "RowGroupingConfig::default_tolerance_ratio")]
    pub tolerance_ratio: f64,
    /// Constant slack in pixels added to the tolerance. Default: 5
    #[serde(default = "RowGroupingConfig::default_tolerance_px")]
    pub tolerance_px: u32,
}

impl RowGroupingConfig {
    fn default_tolerance_ratio() -> f64 {
        0.5
    }

    fn default_tolerance_px() -> u32 {
        5
    }

    /// Largest `|dy|` for which a cell of height `height` joins a row whose first
    /// cell has height `representative_height`.
    pub fn tolerance(&self, height: u32, representative_height: u32) -> u32 {
        (f64::from(height.max(representative_height)) * self.tolerance_ratio) as u32
            + self.tolerance_px
    }

    pub fn validate(&self) -> Result<(), TableOcrError> {
        if !(self.tolerance_ratio >= 0.0) {
            return Err(TableOcrError::invalid_field(
                "tolerance_ratio",
                "a non-negative number",
                self.tolerance_ratio.to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RowGroupingConfig {
    fn default() -> Self {
        Self {
            tolerance_ratio: Self::default_tolerance_ratio(),
            tolerance_px: Self::default_tolerance_px(),
        }
    }
}

/// Clusters cells into rows in reading order.
#[derive(Debug, Clone, Default)]
pub struct RowGrouper {
    config: RowGroupingConfig,
}

impl RowGrouper {
    pub fn new(config: RowGroupingConfig) -> Self {
        Self { config }
    }

    /// Groups `rects` into rows, top-to-bottom, each row ordered left-to-right.
    ///
    /// Rects are visited in `(y, x)` order. A rect joins the first row whose
    /// representative (its first rect) lies within the vertical tolerance, otherwise
    /// it opens a new row. The result does not depend on the order of `rects`.
    pub fn group(&self, rects: &[Rect]) -> Vec<Vec<Rect>> {
        let mut rows: Vec<Vec<Rect>> = Vec::new();

        for rect in rects
            .iter()
            .copied()
            .sorted_by_key(|r| (r.y, r.x, r.width, r.height))
        {
            let slot = rows.iter_mut().find(|row| {
                let representative = row[0];
                rect.y.abs_diff(representative.y)
                    <= self.config.tolerance(rect.height, representative.height)
            });
            match slot {
                Some(row) => row.push(rect),
                None => rows.push(vec![rect]),
            }
        }

        for row in &mut rows {
            row.sort_by_key(|r| (r.x, r.y));
        }

        tracing::debug!(
            target: "table",
            cells = rects.len(),
            rows = rows.len(),
            "grouped cells into rows"
        );

        rows
    }
}
