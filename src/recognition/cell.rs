//! Per-cell text extraction.

use std::sync::Arc;
use std::time::Duration;

use image::{GrayImage, RgbImage, imageops};
use serde::{Deserialize, Serialize};

use super::{RecognitionError, SegmentationMode, TextRecognizer};
use crate::core::{TableOcrError, TableOcrResult};
use crate::processors::Rect;
use crate::utils::{BBoxCrop, otsu_binarize, upscale_if_small};

/// Parameters for [`CellTextExtractor`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellOcrConfig {
    /// OCR language code; `None` uses the engine default. Default: "vie"
    #[serde(default = "CellOcrConfig::default_language")]
    pub language: Option<String>,
    /// Crops whose longer side is below this are upscaled before recognition.
    /// Default: 300
    #[serde(default = "CellOcrConfig::default_upscale_below")]
    pub upscale_below: u32,
    /// Upscaling factor for small crops. Default: 2
    #[serde(default = "CellOcrConfig::default_upscale_factor")]
    pub upscale_factor: u32,
    /// Segmentation mode requested from the engine. Default: single block
    #[serde(default)]
    pub segmentation: SegmentationMode,
    /// Deadline for a single engine call, in seconds. Default: 60
    #[serde(default = "CellOcrConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl CellOcrConfig {
    fn default_language() -> Option<String> {
        Some("vie".to_string())
    }

    fn default_upscale_below() -> u32 {
        300
    }

    fn default_upscale_factor() -> u32 {
        2
    }

    fn default_timeout_secs() -> u64 {
        60
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Deadline for a single engine call.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), TableOcrError> {
        if self.upscale_factor == 0 {
            return Err(TableOcrError::invalid_field(
                "upscale_factor",
                "a positive integer",
                "0",
            ));
        }
        if self.timeout_secs == 0 {
            return Err(TableOcrError::invalid_field(
                "timeout_secs",
                "a positive number of seconds",
                "0",
            ));
        }
        if let Some(language) = &self.language {
            if language.trim().is_empty() {
                return Err(TableOcrError::invalid_field(
                    "language",
                    "a non-empty language code",
                    "\"\"",
                ));
            }
        }
        Ok(())
    }
}

impl Default for CellOcrConfig {
    fn default() -> Self {
        Self {
            language: Self::default_language(),
            upscale_below: Self::default_upscale_below(),
            upscale_factor: Self::default_upscale_factor(),
            segmentation: SegmentationMode::default(),
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

/// Removes form feeds from raw engine output and trims surrounding whitespace.
pub fn clean_ocr_text(raw: &str) -> String {
    raw.replace('\x0c', "").trim().to_string()
}

/// Recognizes the text inside one rectangle of a page.
#[derive(Clone)]
pub struct CellTextExtractor {
    recognizer: Arc<dyn TextRecognizer>,
    config: CellOcrConfig,
}

impl std::fmt::Debug for CellTextExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CellTextExtractor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CellTextExtractor {
    pub fn new(recognizer: Arc<dyn TextRecognizer>, config: CellOcrConfig) -> Self {
        Self { recognizer, config }
    }

    pub fn config(&self) -> &CellOcrConfig {
        &self.config
    }

    /// Crops `rect` out of `page` and returns its cleaned text.
    pub fn extract(&self, page: &RgbImage, rect: &Rect) -> TableOcrResult<String> {
        let crop = BBoxCrop::crop_rect(page, rect)?;
        let prepared = self.prepare(&crop);
        self.recognize_prepared(&prepared)
    }

    /// Grayscale, upscale small crops, then global Otsu binarization.
    pub fn prepare(&self, crop: &RgbImage) -> GrayImage {
        let gray = imageops::grayscale(crop);
        let scaled = upscale_if_small(gray, self.config.upscale_below, self.config.upscale_factor);
        otsu_binarize(&scaled)
    }

    /// Runs the engine on an already prepared image.
    ///
    /// When the configured language is not installed the call is repeated once
    /// with the engine's default language.
    pub fn recognize_prepared(&self, image: &GrayImage) -> TableOcrResult<String> {
        let mode = self.config.segmentation;
        let raw = match self
            .recognizer
            .recognize(image, self.config.language.as_deref(), mode)
        {
            Err(RecognitionError::LanguageUnavailable { language }) => {
                tracing::warn!(
                    target: "ocr",
                    %language,
                    "language data unavailable, retrying with the engine default"
                );
                self.recognizer.recognize(image, None, mode)?
            }
            result => result?,
        };
        Ok(clean_ocr_text(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognition::testing::ScriptedRecognizer;
    use image::Rgb;

    fn page() -> RgbImage {
        RgbImage::from_pixel(400, 300, Rgb([255, 255, 255]))
    }

    #[test]
    fn test_clean_strips_form_feed_and_whitespace() {
        assert_eq!(clean_ocr_text("Hello\x0cWorld  \n"), "HelloWorld");
        assert_eq!(clean_ocr_text("  \x0c\n"), "");
        assert_eq!(clean_ocr_text("a\nb\n\x0c"), "a\nb");
    }

    #[test]
    fn test_extract_returns_cleaned_text() {
        let recognizer = Arc::new(ScriptedRecognizer::constant("Hello\x0cWorld  \n"));
        let extractor = CellTextExtractor::new(recognizer.clone(), CellOcrConfig::default());
        let text = extractor.extract(&page(), &Rect::new(20, 20, 180, 130)).unwrap();
        assert_eq!(text, "HelloWorld");
        assert_eq!(recognizer.languages(), vec![Some("vie".to_string())]);
    }

    #[test]
    fn test_small_crop_is_upscaled_before_recognition() {
        let recognizer = Arc::new(ScriptedRecognizer::new(|image, _| {
            Ok(format!("{}x{}", image.width(), image.height()))
        }));
        let extractor = CellTextExtractor::new(recognizer, CellOcrConfig::default());
        let small = extractor.extract(&page(), &Rect::new(20, 20, 180, 130)).unwrap();
        let large = extractor.extract(&page(), &Rect::new(0, 0, 350, 100)).unwrap();
        assert_eq!(small, "360x260");
        assert_eq!(large, "350x100");
    }

    #[test]
    fn test_missing_language_retries_without_language() {
        let recognizer = Arc::new(ScriptedRecognizer::new(|_, language| match language {
            Some(language) => Err(RecognitionError::LanguageUnavailable {
                language: language.to_string(),
            }),
            None => Ok("fallback text\n".to_string()),
        }));
        let extractor = CellTextExtractor::new(recognizer.clone(), CellOcrConfig::default());
        let text = extractor.extract(&page(), &Rect::new(0, 0, 50, 50)).unwrap();
        assert_eq!(text, "fallback text");
        assert_eq!(recognizer.languages(), vec![Some("vie".to_string()), None]);
    }

    #[test]
    fn test_other_errors_propagate_without_retry() {
        let recognizer = Arc::new(ScriptedRecognizer::new(|_, _| {
            Err(RecognitionError::Engine {
                message: "boom".to_string(),
            })
        }));
        let extractor = CellTextExtractor::new(recognizer.clone(), CellOcrConfig::default());
        let err = extractor
            .extract(&page(), &Rect::new(0, 0, 50, 50))
            .unwrap_err();
        assert!(matches!(err, TableOcrError::Recognition(RecognitionError::Engine { .. })));
        assert_eq!(recognizer.calls(), 1);
    }

    #[test]
    fn test_out_of_page_rect_is_a_preparation_error() {
        let recognizer = Arc::new(ScriptedRecognizer::constant("x"));
        let extractor = CellTextExtractor::new(recognizer.clone(), CellOcrConfig::default());
        let err = extractor
            .extract(&page(), &Rect::new(390, 0, 50, 50))
            .unwrap_err();
        assert_eq!(err.stage(), Some(crate::core::ProcessingStage::CellPreparation));
        assert_eq!(recognizer.calls(), 0);
    }

    #[test]
    fn test_config_validation() {
        assert!(CellOcrConfig::default().validate().is_ok());
        assert!(
            CellOcrConfig::default()
                .with_timeout_secs(0)
                .validate()
                .is_err()
        );
        assert!(
            CellOcrConfig::default()
                .with_language(Some(" ".to_string()))
                .validate()
                .is_err()
        );
    }
}
