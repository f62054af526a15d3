/// Worker pool setup for the include scanner.

use anyhow::Result;

/// Default worker count: half the cores, at least one.
pub fn default_workers() -> usize {
    std::cmp::max(1, num_cpus::get() / 2)
}

/// Initialize the global rayon thread pool used for parallel file reads.
pub fn init_thread_pool(jobs: Option<usize>) -> Result<usize> {
    let workers = jobs.filter(|j| *j > 0).unwrap_or_else(default_workers);

    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build_global()?;

    log::debug!(
        "initialized thread pool: {} workers (system has {} cores)",
        workers,
        num_cpus::get()
    );

    Ok(workers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_workers_is_positive() {
        assert!(default_workers() >= 1);
    }

    #[test]
    fn test_pool_builder_honours_worker_count() {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(default_workers())
            .build()
            .unwrap();
        assert_eq!(pool.current_num_threads(), default_workers());
    }
}
