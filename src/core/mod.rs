//! The core module of the table pipeline.
//!
//! This module contains the pieces shared by every stage:
//! - Configuration management
//! - Error handling

pub mod config;
pub mod errors;

pub use config::{ParallelPolicy, TableOcrConfig};
pub use errors::{ImageProcessError, ProcessingStage, TableOcrError, TableOcrResult};
