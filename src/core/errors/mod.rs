//! Error handling for the table reconstruction pipeline.

mod types;

pub use types::{ImageProcessError, ProcessingStage, TableOcrError, TableOcrResult};
