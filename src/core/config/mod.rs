//! Configuration management for the table pipeline.
//!
//! Stage-specific configuration types live next to their processors; this module
//! holds the cross-cutting ones and the aggregate [`TableOcrConfig`].

pub mod parallel;
pub mod table;

pub use parallel::ParallelPolicy;
pub use table::TableOcrConfig;
