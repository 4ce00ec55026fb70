//! Shared parallel processing configuration types.

use serde::{Deserialize, Serialize};

use crate::core::TableOcrError;

/// Configuration for parallel processing across pages and cells.
///
/// Pages never share state, so they run on the rayon pool. Cells within a page are
/// independent as well, but spawning OCR processes in parallel only pays off when a
/// page has enough of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallelPolicy {
    /// Maximum number of threads to use for parallel processing.
    /// If None, rayon will use the default thread pool size (typically number of CPU cores).
    #[serde(default)]
    pub max_threads: Option<usize>,

    /// Pages with more cells than this recognize them in parallel (<= this uses sequential).
    /// Default: 4
    #[serde(default = "ParallelPolicy::default_cell_parallel_threshold")]
    pub cell_parallel_threshold: usize,

    /// Whether pages are processed in parallel. Default: true
    #[serde(default = "ParallelPolicy::default_parallel_pages")]
    pub parallel_pages: bool,
}

impl ParallelPolicy {
    /// Create a new ParallelPolicy with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of threads.
    pub fn with_max_threads(mut self, max_threads: Option<usize>) -> Self {
        self.max_threads = max_threads;
        self
    }

    /// Set the cell count above which cells are recognized in parallel.
    pub fn with_cell_parallel_threshold(mut self, threshold: usize) -> Self {
        self.cell_parallel_threshold = threshold;
        self
    }

    /// Enable or disable page-level parallelism.
    pub fn with_parallel_pages(mut self, parallel_pages: bool) -> Self {
        self.parallel_pages = parallel_pages;
        self
    }

    /// Returns true when a page with `cell_count` cells should fan out its OCR calls.
    pub fn should_parallelize_cells(&self, cell_count: usize) -> bool {
        cell_count > self.cell_parallel_threshold
    }

    pub fn validate(&self) -> Result<(), TableOcrError> {
        if self.max_threads == Some(0) {
            return Err(TableOcrError::invalid_field(
                "max_threads",
                "a positive thread count",
                "0",
            ));
        }
        Ok(())
    }

    /// Install the global rayon thread pool with the configured number of threads.
    ///
    /// Call once at startup before any parallel processing occurs. If `max_threads`
    /// is None this does nothing and rayon keeps its default pool size.
    ///
    /// # Returns
    ///
    /// - `Ok(true)` if the thread pool was successfully configured
    /// - `Ok(false)` if `max_threads` is None (no configuration needed)
    /// - `Err` if the thread pool has already been initialized
    pub fn install_global_thread_pool(&self) -> Result<bool, rayon::ThreadPoolBuildError> {
        if let Some(num_threads) = self.max_threads {
            rayon::ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build_global()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn default_cell_parallel_threshold() -> usize {
        4
    }

    fn default_parallel_pages() -> bool {
        true
    }
}

impl Default for ParallelPolicy {
    fn default() -> Self {
        Self {
            max_threads: None,
            cell_parallel_threshold: Self::default_cell_parallel_threshold(),
            parallel_pages: Self::default_parallel_pages(),
        }
    }
}
