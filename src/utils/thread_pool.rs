use crate::error::Result;
use once_cell::sync::OnceCell;
use rayon::ThreadPoolBuilder;
use std::sync::Arc;

static THREAD_POOL: OnceCell<Arc<rayon::ThreadPool>> = OnceCell::new();

/// Build a worker pool with `num_threads` workers (0 means one per CPU)
///
/// # Errors
///
/// Returns an error if the thread pool cannot be created
pub fn build_thread_pool(num_threads: usize) -> Result<Arc<rayon::ThreadPool>> {
    let num_threads = if num_threads == 0 {
        num_cpus::get()
    } else {
        num_threads
    };
    let pool = ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .thread_name(|i| format!("nzmstow-worker-{i}"))
        .build()?;
    Ok(Arc::new(pool))
}

/// Get the shared worker pool, or a dedicated one when `num_threads` is set.
///
/// The shared pool is created on first use with one worker per CPU.
///
/// # Errors
///
/// Returns an error if the thread pool cannot be created
pub fn get_thread_pool(num_threads: usize) -> Result<Arc<rayon::ThreadPool>> {
    if num_threads > 0 {
        return build_thread_pool(num_threads);
    }
    THREAD_POOL
        .get_or_try_init(|| build_thread_pool(0))
        .map(Arc::clone)
}

mod num_cpus {
    use std::sync::LazyLock;

    static NUM_CPUS: LazyLock<usize> = LazyLock::new(|| {
        std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(1)
    });

    pub fn get() -> usize {
        *NUM_CPUS
    }
}
