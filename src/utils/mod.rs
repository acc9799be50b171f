//! Utility functions and helpers.
//!
//! - [`paths`]: lexical normalization, tilde expansion, file identity and
//!   symlink value computation
//! - [`thread_pool`]: the rayon worker pool used by the executor

/// Path manipulation and file identity helpers
pub mod paths;
/// Worker pool configuration for parallel phases
pub mod thread_pool;

pub use paths::{links_to, normalize, same_file};

/// Split `items` into contiguous batches, roughly one per worker.
///
/// Always returns at least one element per batch and never an empty batch.
#[must_use]
pub fn batch_size(len: usize, workers: usize) -> usize {
    let workers = workers.max(1);
    len.div_ceil(workers).max(1)
}
