//! The executor abstraction partitions are run through.
//!
//! Evaluators are not `Send`, so work items never carry them: each item is
//! plain data and the closure builds whatever per-thread state it needs from
//! shared, `Sync` factories.

use std::fmt::Debug;
use tessera_types::SystemError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutorError {
    #[error("Partition {partition} failed: {source}")]
    Partition {
        partition: usize,
        #[source]
        source: SystemError,
    },

    #[error("Thread pool could not be built: {0}")]
    ThreadPool(String),
}

impl ExecutorError {
    pub fn partition(partition: usize, source: SystemError) -> Self {
        Self::Partition { partition, source }
    }

    /// The evaluation failure behind this error, if any.
    pub fn system_error(&self) -> Option<&SystemError> {
        match self {
            Self::Partition { source, .. } => Some(source),
            Self::ThreadPool(_) => None,
        }
    }
}

/// Runs a batch of independent work items.
///
/// Results always come back in input order, whatever the degree of
/// parallelism.
pub trait Executor: Send + Sync + Debug {
    fn execute_all<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + Clone + 'static;

    /// Like [`execute_all`](Executor::execute_all), for work that may fail.
    /// A failing item does not stop the others.
    fn execute_all_fallible<T, R, E, F>(&self, items: Vec<T>, f: F) -> Vec<Result<R, E>>
    where
        T: Send + 'static,
        R: Send + 'static,
        E: Send + 'static,
        F: Fn(T) -> Result<R, E> + Send + Sync + Clone + 'static;

    /// Number of items that may run at once; 1 for sequential executors.
    fn parallelism(&self) -> usize;

    fn name(&self) -> &'static str;
}

/// Runs every item on the calling thread, in order.
#[derive(Debug, Clone, Default)]
pub struct SyncExecutor;

impl SyncExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Executor for SyncExecutor {
    fn execute_all<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + Clone + 'static,
    {
        items.into_iter().map(f).collect()
    }

    fn execute_all_fallible<T, R, E, F>(&self, items: Vec<T>, f: F) -> Vec<Result<R, E>>
    where
        T: Send + 'static,
        R: Send + 'static,
        E: Send + 'static,
        F: Fn(T) -> Result<R, E> + Send + Sync + Clone + 'static,
    {
        items.into_iter().map(f).collect()
    }

    fn parallelism(&self) -> usize {
        1
    }

    fn name(&self) -> &'static str {
        "SyncExecutor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_types::ErrorCode;

    #[test]
    fn test_sync_executor_keeps_order() {
        let executor = SyncExecutor::new();
        let partitions = vec![vec![3, 1], vec![2], vec![]];
        let sizes = executor.execute_all(partitions, |p: Vec<i32>| p.len());
        assert_eq!(sizes, vec![2, 1, 0]);
    }

    #[test]
    fn test_sync_executor_isolates_failures() {
        let executor = SyncExecutor::new();
        let results = executor.execute_all_fallible(vec![4, 0, 2], |x: i64| {
            8_i64
                .checked_div(x)
                .ok_or_else(|| ExecutorError::partition(1, SystemError::DivisionByZero))
        });
        assert_eq!(results[0], Ok(2));
        assert!(results[1].is_err());
        assert_eq!(results[2], Ok(4));
    }

    #[test]
    fn test_sync_executor_identity() {
        let executor = SyncExecutor::new();
        assert_eq!(executor.parallelism(), 1);
        assert_eq!(executor.name(), "SyncExecutor");
    }

    #[test]
    fn test_executor_error_display_and_code() {
        let err = ExecutorError::partition(2, SystemError::overflow("integer multiply"));
        assert!(err.to_string().starts_with("Partition 2 failed: "));
        assert_eq!(err.system_error().map(SystemError::code), Some(ErrorCode::FOAR0002));

        let err = ExecutorError::ThreadPool("no threads".to_string());
        assert_eq!(err.to_string(), "Thread pool could not be built: no threads");
        assert!(err.system_error().is_none());
    }
}
