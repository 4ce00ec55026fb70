//! Merging of overlapping cell candidates.
//!
//! Contour tracing can report a cell more than once (for instance when a ruling
//! line is broken and the region is traced in fragments). [`RectMerger`] collapses
//! such fragments into their bounding union.

use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use crate::core::TableOcrError;

/// Parameters for [`RectMerger`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Two rectangles merge when their intersection exceeds this fraction of the
    /// accumulating rectangle's area. Default: 0.3
    #[serde(default = "MergeConfig::default_overlap_threshold")]
    pub overlap_threshold: f64,
}

impl MergeConfig {
    fn default_overlap_threshold() -> f64 {
        0.3
    }

    pub fn validate(&self) -> Result<(), TableOcrError> {
        if !(0.0..=1.0).contains(&self.overlap_threshold) {
            return Err(TableOcrError::invalid_field(
                "overlap_threshold",
                "a fraction in [0, 1]",
                self.overlap_threshold.to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            overlap_threshold: Self::default_overlap_threshold(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Record {
    rect: Rect,
    consumed: bool,
}

/// Greedy fixed-point merger over an arena of rectangles.
#[derive(Debug, Clone, Default)]
pub struct RectMerger {
    config: MergeConfig,
}

impl RectMerger {
    pub fn new(config: MergeConfig) -> Self {
        Self { config }
    }

    /// Merges overlapping rectangles until no ordered pair `(a, b)` of the result has
    /// `intersection(a, b) / area(a)` above the threshold.
    ///
    /// Each surviving record takes a turn as the accumulator, in input order, and
    /// absorbs every other surviving record that overlaps its current union enough.
    /// Full passes repeat until one pass merges nothing. The outcome depends on
    /// input order; running the merger on its own output returns it unchanged.
    pub fn merge(&self, rects: &[Rect]) -> Vec<Rect> {
        let mut arena: Vec<Record> = rects
            .iter()
            .map(|&rect| Record {
                rect,
                consumed: false,
            })
            .collect();

        let mut passes = 0usize;
        loop {
            passes += 1;
            let mut changed = false;

            for i in 0..arena.len() {
                if arena[i].consumed {
                    continue;
                }
                let mut accumulated = arena[i].rect;
                for j in 0..arena.len() {
                    if j == i || arena[j].consumed {
                        continue;
                    }
                    if accumulated.overlap_fraction(&arena[j].rect) > self.config.overlap_threshold
                    {
                        accumulated = accumulated.union(&arena[j].rect);
                        arena[j].consumed = true;
                        changed = true;
                    }
                }
                arena[i].rect = accumulated;
            }

            if !changed {
                break;
            }
        }

        let merged: Vec<Rect> = arena
            .into_iter()
            .filter(|record| !record.consumed)
            .map(|record| record.rect)
            .collect();

        tracing::debug!(
            target: "table",
            input = rects.len(),
            output = merged.len(),
            passes,
            "merged cell candidates"
        );

        merged
    }
}
