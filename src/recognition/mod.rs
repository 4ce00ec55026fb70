//! Text recognition.
//!
//! The OCR engine is an external collaborator behind the [`TextRecognizer`] trait.
//! [`TesseractCli`] drives the `tesseract` command line tool; tests substitute an
//! in-memory implementation. [`CellTextExtractor`] prepares a cell crop and turns the
//! engine output into clean cell text.

mod cell;
mod tesseract;

pub use cell::{CellOcrConfig, CellTextExtractor, clean_ocr_text};
pub use tesseract::{DEFAULT_TIMEOUT, TesseractCli, is_language_error};

use image::GrayImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Page segmentation strategy requested from the OCR engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentationMode {
    /// Treat the image as a single uniform block of text.
    #[default]
    SingleBlock,
    /// Fully automatic page segmentation.
    Auto,
    /// Treat the image as a single text line.
    SingleLine,
}

impl SegmentationMode {
    /// Tesseract `--psm` value for this mode.
    pub fn psm(self) -> u8 {
        match self {
            SegmentationMode::Auto => 3,
            SegmentationMode::SingleBlock => 6,
            SegmentationMode::SingleLine => 7,
        }
    }
}

/// Errors reported by a [`TextRecognizer`].
#[derive(Debug, Error)]
pub enum RecognitionError {
    /// The requested language data is not installed.
    #[error("language '{language}' is not available")]
    LanguageUnavailable { language: String },

    /// The engine did not answer before its deadline.
    #[error("recognition timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// The engine ran but reported a failure.
    #[error("engine error: {message}")]
    Engine { message: String },

    /// The input image could not be handed to the engine.
    #[error("failed to encode input image")]
    Image(#[from] image::ImageError),

    /// The engine could not be started or its output could not be read.
    #[error("io")]
    Io(#[from] std::io::Error),
}

/// Recognizes the text of a grayscale image.
///
/// Implementations must be callable from several threads at once; cells of a page
/// are recognized in parallel.
pub trait TextRecognizer: Send + Sync {
    /// Returns the raw text recognized in `image`.
    ///
    /// `language` is the engine language code (`None` lets the engine use its
    /// default).
    fn recognize(
        &self,
        image: &GrayImage,
        language: Option<&str>,
        mode: SegmentationMode,
    ) -> Result<String, RecognitionError>;
}

impl<T: TextRecognizer + ?Sized> TextRecognizer for std::sync::Arc<T> {
    fn recognize(
        &self,
        image: &GrayImage,
        language: Option<&str>,
        mode: SegmentationMode,
    ) -> Result<String, RecognitionError> {
        (**self).recognize(image, language, mode)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted recognizer shared by the pipeline tests.

    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Responder = dyn Fn(&GrayImage, Option<&str>) -> Result<String, RecognitionError> + Send + Sync;

    /// Recognizer whose answers are produced by a closure or a queue.
    pub struct ScriptedRecognizer {
        responder: Box<Responder>,
        calls: AtomicUsize,
        languages: Mutex<Vec<Option<String>>>,
    }

    impl ScriptedRecognizer {
        pub fn new(
            responder: impl Fn(&GrayImage, Option<&str>) -> Result<String, RecognitionError>
            + Send
            + Sync
            + 'static,
        ) -> Self {
            Self {
                responder: Box::new(responder),
                calls: AtomicUsize::new(0),
                languages: Mutex::new(Vec::new()),
            }
        }

        /// Always answers `text`.
        pub fn constant(text: &str) -> Self {
            let text = text.to_string();
            Self::new(move |_, _| Ok(text.clone()))
        }

        /// Answers with the queued texts in call order, then with "".
        pub fn queue(texts: &[&str]) -> Self {
            let queue: Mutex<VecDeque<String>> =
                Mutex::new(texts.iter().map(|t| t.to_string()).collect());
            Self::new(move |_, _| Ok(queue.lock().unwrap().pop_front().unwrap_or_default()))
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn languages(&self) -> Vec<Option<String>> {
            self.languages.lock().unwrap().clone()
        }
    }

    impl TextRecognizer for ScriptedRecognizer {
        fn recognize(
            &self,
            image: &GrayImage,
            language: Option<&str>,
            _mode: SegmentationMode,
        ) -> Result<String, RecognitionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.languages
                .lock()
                .unwrap()
                .push(language.map(str::to_string));
            (self.responder)(image, language)
        }
    }
}
