//! Image processors for table structure recovery.
//!
//! Each processor is a small, deterministic step of the page pipeline:
//!
//! - [`ImageBinarizer`] turns a page into an ink mask
//! - [`LineGridDetector`] finds cell candidates from the ruling lines of that mask
//! - [`RectMerger`] collapses fragmented candidates
//! - [`RowGrouper`] orders cells into rows

pub mod binarize;
pub mod geometry;
pub mod grid;
pub mod merge;
pub mod morphology;
pub mod rows;

pub use binarize::{BinarizeConfig, ImageBinarizer};
pub use geometry::{Rect, Span};
pub use grid::{CellLayout, GridDetectionConfig, LineGridDetector};
pub use merge::{MergeConfig, RectMerger};
pub use morphology::LineAxis;
pub use rows::{RowGrouper, RowGroupingConfig};
