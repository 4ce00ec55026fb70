//! Utility functions for the table pipeline.
//!
//! Cropping helpers, grayscale preprocessing for OCR input, and logging setup.

pub mod bbox_crop;
pub mod preprocess;

pub use bbox_crop::BBoxCrop;
pub use preprocess::{otsu_binarize, upscale_if_small};

use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// The filter is read from `RUST_LOG` and defaults to `info`. Calling this more than
/// once is harmless; later calls leave the first subscriber in place.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
