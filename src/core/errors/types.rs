//! Core error types for the table reconstruction pipeline.
//!
//! This module defines the crate-wide [`TableOcrError`] and the [`ProcessingStage`]
//! enum used to tag which pipeline stage a failure came from. Errors raised by the
//! external collaborators (OCR engine, rasterizer, writers) live next to their
//! traits and convert into [`TableOcrError`] via `From`.

use thiserror::Error;

use crate::export::ExportError;
use crate::raster::RasterError;
use crate::recognition::RecognitionError;

/// Errors that can occur while validating or cropping image regions.
#[derive(Debug, Error)]
pub enum ImageProcessError {
    /// The crop size is invalid (e.g., zero dimensions).
    #[error("Invalid crop size")]
    InvalidCropSize,
    /// The crop coordinates are out of bounds.
    #[error(
        "Crop ({x}, {y}, {width}x{height}) is out of bounds for image {image_width}x{image_height}"
    )]
    CropOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        image_width: u32,
        image_height: u32,
    },
    /// The image has no pixels.
    #[error("Image is empty")]
    EmptyImage,
}

/// Stage of the page pipeline where an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Grayscale conversion and adaptive thresholding.
    Binarization,
    /// Cropping and preparing a region for recognition.
    CellPreparation,
    /// Text recognition of a cell or of the whole page.
    Recognition,
    /// Rendering PDF pages to images.
    Rasterization,
    /// Writing results to disk.
    Export,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::Binarization => write!(f, "binarization"),
            ProcessingStage::CellPreparation => write!(f, "cell preparation"),
            ProcessingStage::Recognition => write!(f, "recognition"),
            ProcessingStage::Rasterization => write!(f, "rasterization"),
            ProcessingStage::Export => write!(f, "export"),
        }
    }
}

/// Errors produced by the table reconstruction pipeline.
#[derive(Error, Debug)]
pub enum TableOcrError {
    /// A pipeline stage failed.
    #[error("{kind} failed: {context}")]
    Processing {
        /// The stage where the error occurred.
        kind: ProcessingStage,
        /// Additional context about the error.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The OCR engine failed.
    #[error("recognition failed: {0}")]
    Recognition(#[from] RecognitionError),

    /// The rasterizer failed; no pages can be processed.
    #[error("rasterization failed: {0}")]
    Raster(#[from] RasterError),

    /// Writing the output failed.
    #[error("export failed: {0}")]
    Export(#[from] ExportError),

    /// Invalid input (missing file, bad path, ...).
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Invalid configuration value.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used across the crate.
pub type TableOcrResult<T> = Result<T, TableOcrError>;

impl From<ImageProcessError> for TableOcrError {
    fn from(error: ImageProcessError) -> Self {
        Self::Processing {
            kind: ProcessingStage::CellPreparation,
            context: "image region processing failed".to_string(),
            source: Box::new(error),
        }
    }
}

impl TableOcrError {
    /// Wraps an error raised while running a pipeline stage.
    pub fn processing(
        kind: ProcessingStage,
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind,
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Creates an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a configuration error for invalid field values.
    ///
    /// # Arguments
    ///
    /// * `field` - The name of the field with an invalid value
    /// * `expected` - Description of what was expected
    /// * `actual` - Description of what was actually provided
    pub fn invalid_field(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::ConfigError {
            message: format!(
                "invalid value for field '{}': expected {}, got {}",
                field.into(),
                expected.into(),
                actual.into()
            ),
        }
    }

    /// Returns the pipeline stage this error is attributed to, if any.
    pub fn stage(&self) -> Option<ProcessingStage> {
        match self {
            Self::Processing { kind, .. } => Some(*kind),
            Self::Recognition(_) => Some(ProcessingStage::Recognition),
            Self::Raster(_) => Some(ProcessingStage::Rasterization),
            Self::Export(_) => Some(ProcessingStage::Export),
            _ => None,
        }
    }
}
