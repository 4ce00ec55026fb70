//! Table grid detection.
//!
//! Isolates long horizontal and vertical ruling lines from an ink mask, traces the
//! closed regions they form and reports each region's bounding rectangle as a cell
//! candidate. When nothing survives filtering the whole page is returned instead
//! and the caller switches to unstructured extraction.

use image::GrayImage;
use imageproc::contours::{BorderType, find_contours};
use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use super::morphology::{LineAxis, open_with_line, union};
use crate::core::TableOcrError;

/// Parameters for [`LineGridDetector`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridDetectionConfig {
    /// Lower bound for the structuring element length. Default: 10
    #[serde(default = "GridDetectionConfig::default_min_line_length")]
    pub min_line_length: u32,
    /// The element length is `dimension / line_length_divisor`. Default: 30
    #[serde(default = "GridDetectionConfig::default_line_length_divisor")]
    pub line_length_divisor: u32,
    /// Candidates smaller than this fraction of the page area are dropped. Default: 0.0005
    #[serde(default = "GridDetectionConfig::default_min_area_ratio")]
    pub min_area_ratio: f64,
    /// Minimum candidate width in pixels. Default: 20
    #[serde(default = "GridDetectionConfig::default_min_cell_width")]
    pub min_cell_width: u32,
    /// Minimum candidate height in pixels. Default: 10
    #[serde(default = "GridDetectionConfig::default_min_cell_height")]
    pub min_cell_height: u32,
}

impl GridDetectionConfig {
    fn default_min_line_length() -> u32 {
        10
    }

    fn default_line_length_divisor() -> u32 {
        30
    }

    fn default_min_area_ratio() -> f64 {
        0.0005
    }

    fn default_min_cell_width() -> u32 {
        20
    }

    fn default_min_cell_height() -> u32 {
        10
    }

    /// Length of the line element for a page dimension.
    pub fn line_length(&self, dimension: u32) -> u32 {
        self.min_line_length
            .max(dimension / self.line_length_divisor.max(1))
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), TableOcrError> {
        if self.line_length_divisor == 0 {
            return Err(TableOcrError::invalid_field(
                "line_length_divisor",
                "a positive integer",
                "0",
            ));
        }
        if !(0.0..1.0).contains(&self.min_area_ratio) {
            return Err(TableOcrError::invalid_field(
                "min_area_ratio",
                "a fraction in [0, 1)",
                self.min_area_ratio.to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for GridDetectionConfig {
    fn default() -> Self {
        Self {
            min_line_length: Self::default_min_line_length(),
            line_length_divisor: Self::default_line_length_divisor(),
            min_area_ratio: Self::default_min_area_ratio(),
            min_cell_width: Self::default_min_cell_width(),
            min_cell_height: Self::default_min_cell_height(),
        }
    }
}

/// Outcome of grid detection on one page.
#[derive(Debug, Clone, PartialEq)]
pub enum CellLayout {
    /// Cell candidates in trace order, before merging.
    Candidates(Vec<Rect>),
    /// No grid found; the rectangle spans the whole page.
    WholePage(Rect),
}

impl CellLayout {
    /// True when no grid was found and extraction must fall back to free text.
    pub fn is_fallback(&self) -> bool {
        matches!(self, CellLayout::WholePage(_))
    }
}

/// Detects table cells from the ruling lines of a binary ink mask.
#[derive(Debug, Clone, Default)]
pub struct LineGridDetector {
    config: GridDetectionConfig,
}

impl LineGridDetector {
    pub fn new(config: GridDetectionConfig) -> Self {
        Self { config }
    }

    /// Keeps only long horizontal and vertical strokes of `mask`.
    pub fn grid_mask(&self, mask: &GrayImage) -> GrayImage {
        let (width, height) = mask.dimensions();
        let horizontal = open_with_line(
            mask,
            self.config.line_length(width),
            LineAxis::Horizontal,
        );
        let vertical = open_with_line(mask, self.config.line_length(height), LineAxis::Vertical);
        union(&horizontal, &vertical)
    }

    /// Traces the grid mask and returns the filtered cell candidates.
    ///
    /// Hole borders enclose cells. An outer border that encloses other borders is
    /// the frame of the whole table and is skipped; childless outer borders are kept
    /// so that isolated boxes still count.
    pub fn candidates(&self, grid_mask: &GrayImage) -> Vec<Rect> {
        let (width, height) = grid_mask.dimensions();
        let contours = find_contours::<u32>(grid_mask);

        let mut has_children = vec![false; contours.len()];
        for contour in &contours {
            if let Some(parent) = contour.parent {
                has_children[parent] = true;
            }
        }

        let min_area = u64::from(width) as f64 * u64::from(height) as f64 * self.config.min_area_ratio;

        contours
            .iter()
            .enumerate()
            .filter(|(idx, contour)| {
                contour.border_type == BorderType::Hole || !has_children[*idx]
            })
            .filter_map(|(_, contour)| Rect::from_contour(contour))
            .filter(|rect| {
                (rect.area() as f64) >= min_area
                    && rect.width >= self.config.min_cell_width
                    && rect.height >= self.config.min_cell_height
            })
            .collect()
    }

    /// Runs line isolation and contour tracing on `mask`.
    pub fn detect(&self, mask: &GrayImage) -> CellLayout {
        self.detect_with_grid(mask).0
    }

    /// Like [`detect`](Self::detect) but also returns the grid mask.
    pub fn detect_with_grid(&self, mask: &GrayImage) -> (CellLayout, GrayImage) {
        let grid = self.grid_mask(mask);
        let candidates = self.candidates(&grid);

        tracing::debug!(
            target: "table",
            candidates = candidates.len(),
            horizontal_element = self.config.line_length(mask.width()),
            vertical_element = self.config.line_length(mask.height()),
            "grid detection finished"
        );

        let layout = if candidates.is_empty() {
            CellLayout::WholePage(Rect::full_page(mask.width(), mask.height()))
        } else {
            CellLayout::Candidates(candidates)
        };
        (layout, grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    /// Draws a 2px ruling grid with lines at the given x and y offsets.
    fn grid_mask_image(width: u32, height: u32, xs: &[u32], ys: &[u32]) -> GrayImage {
        let x_range = (*xs.first().unwrap(), *xs.last().unwrap() + 2);
        let y_range = (*ys.first().unwrap(), *ys.last().unwrap() + 2);
        GrayImage::from_fn(width, height, |x, y| {
            let on_vertical = xs.iter().any(|&lx| x >= lx && x < lx + 2)
                && y >= y_range.0
                && y < y_range.1;
            let on_horizontal = ys.iter().any(|&ly| y >= ly && y < ly + 2)
                && x >= x_range.0
                && x < x_range.1;
            if on_vertical || on_horizontal {
                Luma([255])
            } else {
                Luma([0])
            }
        })
    }

    #[test]
    fn test_line_length_has_floor() {
        let config = GridDetectionConfig::default();
        assert_eq!(config.line_length(100), 10);
        assert_eq!(config.line_length(400), 13);
        assert_eq!(config.line_length(3000), 100);
    }

    #[test]
    fn test_two_by_two_grid_yields_four_cells() {
        let mask = grid_mask_image(400, 300, &[19, 199, 379], &[19, 149, 279]);
        let detector = LineGridDetector::default();
        let CellLayout::Candidates(mut cells) = detector.detect(&mask) else {
            panic!("expected candidates");
        };
        cells.sort_by_key(|r| (r.y, r.x));
        assert_eq!(
            cells,
            vec![
                Rect::new(20, 20, 180, 130),
                Rect::new(200, 20, 180, 130),
                Rect::new(20, 150, 180, 130),
                Rect::new(200, 150, 180, 130),
            ]
        );
    }

    #[test]
    fn test_empty_mask_falls_back_to_whole_page() {
        let mask = GrayImage::new(100, 100);
        let layout = LineGridDetector::default().detect(&mask);
        assert!(layout.is_fallback());
        assert_eq!(layout, CellLayout::WholePage(Rect::new(0, 0, 100, 100)));
    }

    #[test]
    fn test_text_strokes_are_not_lines() {
        // Short blobs (like glyphs) never survive the line opening.
        let mask = GrayImage::from_fn(300, 300, |x, y| {
            if (x % 20) < 6 && (y % 20) < 6 {
                Luma([255])
            } else {
                Luma([0])
            }
        });
        let layout = LineGridDetector::default().detect(&mask);
        assert!(layout.is_fallback());
    }

    #[test]
    fn test_small_boxes_are_filtered() {
        // A single closed box that is too short to be a cell.
        let mask = grid_mask_image(400, 300, &[100, 200], &[100, 106]);
        let detector = LineGridDetector::default();
        assert!(detector.detect(&mask).is_fallback());
    }
}
