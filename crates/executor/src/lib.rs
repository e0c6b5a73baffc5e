//! Executors for running Tessera evaluation partitions.
//!
//! ## Available Executors
//!
//! - [`SyncExecutor`]: sequential execution on the calling thread
//! - [`RayonExecutor`]: work-stealing thread pool (feature: `rayon`)
//!
//! ## Usage
//!
//! ```ignore
//! use tessera_executor::{Executor, ExecutorImpl};
//!
//! let executor = ExecutorImpl::default();
//! let sizes = executor.execute_all(partitions, |tuples: Vec<Vec<u8>>| tuples.len());
//! ```

mod executor;
#[cfg(feature = "rayon")]
mod rayon_executor;

pub use executor::{Executor, ExecutorError, SyncExecutor};
#[cfg(feature = "rayon")]
pub use rayon_executor::RayonExecutor;

/// A type-erased executor that wraps the concrete implementations.
///
/// `Executor` has generic methods and cannot be used as `dyn Executor`; this
/// enum delegates to the executor it holds instead.
#[derive(Clone, Debug)]
pub enum ExecutorImpl {
    Sync(SyncExecutor),

    #[cfg(feature = "rayon")]
    Rayon(RayonExecutor),
}

impl ExecutorImpl {
    /// Picks an executor for `threads` workers: one thread runs
    /// synchronously, more use a dedicated rayon pool when available.
    pub fn with_threads(threads: usize) -> Result<Self, ExecutorError> {
        if threads <= 1 {
            return Ok(ExecutorImpl::Sync(SyncExecutor::new()));
        }
        #[cfg(feature = "rayon")]
        {
            RayonExecutor::with_threads(threads).map(ExecutorImpl::Rayon)
        }
        #[cfg(not(feature = "rayon"))]
        {
            log::debug!("Parallel execution unavailable; running {threads} workers sequentially");
            Ok(ExecutorImpl::Sync(SyncExecutor::new()))
        }
    }
}

impl Executor for ExecutorImpl {
    fn execute_all<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + Clone + 'static,
    {
        match self {
            ExecutorImpl::Sync(exec) => exec.execute_all(items, f),
            #[cfg(feature = "rayon")]
            ExecutorImpl::Rayon(exec) => exec.execute_all(items, f),
        }
    }

    fn execute_all_fallible<T, R, E, F>(&self, items: Vec<T>, f: F) -> Vec<Result<R, E>>
    where
        T: Send + 'static,
        R: Send + 'static,
        E: Send + 'static,
        F: Fn(T) -> Result<R, E> + Send + Sync + Clone + 'static,
    {
        match self {
            ExecutorImpl::Sync(exec) => exec.execute_all_fallible(items, f),
            #[cfg(feature = "rayon")]
            ExecutorImpl::Rayon(exec) => exec.execute_all_fallible(items, f),
        }
    }

    fn parallelism(&self) -> usize {
        match self {
            ExecutorImpl::Sync(exec) => exec.parallelism(),
            #[cfg(feature = "rayon")]
            ExecutorImpl::Rayon(exec) => exec.parallelism(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ExecutorImpl::Sync(exec) => exec.name(),
            #[cfg(feature = "rayon")]
            ExecutorImpl::Rayon(exec) => exec.name(),
        }
    }
}

impl Default for ExecutorImpl {
    fn default() -> Self {
        #[cfg(feature = "rayon")]
        {
            ExecutorImpl::Rayon(RayonExecutor::new())
        }
        #[cfg(not(feature = "rayon"))]
        {
            ExecutorImpl::Sync(SyncExecutor::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_thread_is_sync() {
        let executor = ExecutorImpl::with_threads(1).unwrap();
        assert_eq!(executor.name(), "SyncExecutor");
        assert_eq!(executor.parallelism(), 1);
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn test_multiple_threads_use_rayon() {
        let executor = ExecutorImpl::with_threads(3).unwrap();
        assert_eq!(executor.name(), "RayonExecutor");
        assert_eq!(executor.parallelism(), 3);
        assert_eq!(executor.execute_all(vec![1, 2, 3], |x: i32| x + 1), vec![2, 3, 4]);
    }
}
