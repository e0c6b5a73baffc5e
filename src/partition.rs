//! Runs evaluator factories over partitions of encoded tuples.

use std::sync::Arc;
use tessera_datamodel::{TaggedValue, ValueStorage};
use tessera_executor::{Executor, ExecutorError};
use tessera_runtime::{AggregateEvaluatorFactory, DynamicContext, ScalarEvaluatorFactory};
use tessera_types::Result;

/// One input tuple: each field holds exactly one encoded value.
pub type Tuple = Vec<ValueStorage>;

/// Drives factories over partitions with an [`Executor`].
///
/// Evaluators are created inside the worker closure, one per partition,
/// because they cannot cross threads. Results come back in partition order.
#[derive(Debug, Clone, Copy, Default)]
pub struct PartitionRunner;

impl PartitionRunner {
    /// Evaluates `factory` for every tuple; returns one result per tuple,
    /// grouped by partition. The first failing partition is reported.
    pub fn run<E: Executor>(
        executor: &E,
        factory: Arc<dyn ScalarEvaluatorFactory>,
        ctx: &DynamicContext,
        partitions: Vec<Vec<Tuple>>,
    ) -> std::result::Result<Vec<Vec<ValueStorage>>, ExecutorError> {
        log::debug!(
            "Running '{}' over {} partitions on {}",
            factory.name(),
            partitions.len(),
            executor.name()
        );
        let ctx = ctx.clone();
        let items: Vec<(usize, Vec<Tuple>)> = partitions.into_iter().enumerate().collect();
        executor
            .execute_all_fallible(items, move |(index, tuples)| {
                evaluate_partition(factory.as_ref(), &ctx, &tuples)
                    .map_err(|e| ExecutorError::partition(index, e))
            })
            .into_iter()
            .collect()
    }

    /// Folds each partition into a single value with `factory`.
    pub fn run_aggregate<E: Executor>(
        executor: &E,
        factory: Arc<dyn AggregateEvaluatorFactory>,
        ctx: &DynamicContext,
        partitions: Vec<Vec<Tuple>>,
    ) -> std::result::Result<Vec<ValueStorage>, ExecutorError> {
        log::debug!(
            "Aggregating '{}' over {} partitions on {}",
            factory.name(),
            partitions.len(),
            executor.name()
        );
        let ctx = ctx.clone();
        let items: Vec<(usize, Vec<Tuple>)> = partitions.into_iter().enumerate().collect();
        executor
            .execute_all_fallible(items, move |(index, tuples)| {
                aggregate_partition(factory.as_ref(), &ctx, &tuples)
                    .map_err(|e| ExecutorError::partition(index, e))
            })
            .into_iter()
            .collect()
    }
}

fn fields(tuple: &Tuple) -> Result<Vec<TaggedValue<'_>>> {
    tuple.iter().map(ValueStorage::tagged).collect()
}

fn evaluate_partition(
    factory: &dyn ScalarEvaluatorFactory,
    ctx: &DynamicContext,
    tuples: &[Tuple],
) -> Result<Vec<ValueStorage>> {
    let mut evaluator = factory.create_evaluator(ctx)?;
    let mut out = ValueStorage::with_limit(ctx.max_value_bytes());
    let mut results = Vec::with_capacity(tuples.len());
    for tuple in tuples {
        out.reset();
        evaluator.evaluate(&fields(tuple)?, &mut out)?;
        results.push(out.clone());
    }
    log::debug!("Partition produced {} results", results.len());
    Ok(results)
}

fn aggregate_partition(
    factory: &dyn AggregateEvaluatorFactory,
    ctx: &DynamicContext,
    tuples: &[Tuple],
) -> Result<ValueStorage> {
    let mut evaluator = factory.create_aggregate_evaluator(ctx)?;
    evaluator.init()?;
    for tuple in tuples {
        evaluator.step(&fields(tuple)?)?;
    }
    let mut out = ValueStorage::with_limit(ctx.max_value_bytes());
    evaluator.finish(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_datamodel::codec;
    use tessera_datamodel::pointable::IntegerPointable;
    use tessera_executor::SyncExecutor;
    use tessera_runtime::functions::{FieldAccessFactory, SumAggregateFactory};
    use tessera_types::{ErrorCode, ValueTag};

    fn tuple(values: &[i64]) -> Tuple {
        values
            .iter()
            .map(|&v| {
                let mut out = ValueStorage::new();
                codec::write_integer(&mut out, ValueTag::Integer, v).unwrap();
                out
            })
            .collect()
    }

    #[test]
    fn test_run_keeps_partition_order() {
        let factory: Arc<dyn ScalarEvaluatorFactory> = Arc::new(FieldAccessFactory::new(1));
        let partitions = vec![
            vec![tuple(&[1, 10]), tuple(&[2, 20])],
            vec![],
            vec![tuple(&[3, 30])],
        ];
        let results = PartitionRunner::run(
            &SyncExecutor::new(),
            factory,
            &DynamicContext::default(),
            partitions,
        )
        .unwrap();
        let values: Vec<Vec<i64>> = results
            .iter()
            .map(|partition| {
                partition
                    .iter()
                    .map(|v| v.tagged().unwrap().get::<IntegerPointable>().unwrap().as_i64())
                    .collect()
            })
            .collect();
        assert_eq!(values, vec![vec![10, 20], vec![], vec![30]]);
    }

    #[test]
    fn test_run_reports_failing_partition() {
        let factory: Arc<dyn ScalarEvaluatorFactory> = Arc::new(FieldAccessFactory::new(1));
        let partitions = vec![vec![tuple(&[1, 2])], vec![tuple(&[1])]];
        let err = PartitionRunner::run(
            &SyncExecutor::new(),
            factory,
            &DynamicContext::default(),
            partitions,
        )
        .unwrap_err();
        match err {
            ExecutorError::Partition { partition, source } => {
                assert_eq!(partition, 1);
                assert_eq!(source.code(), ErrorCode::SYSE0001);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_run_aggregate_sums_each_partition() {
        let factory: Arc<dyn AggregateEvaluatorFactory> =
            Arc::new(SumAggregateFactory::new(Box::new(FieldAccessFactory::new(0))));
        let partitions = vec![vec![tuple(&[1]), tuple(&[2])], vec![]];
        let sums = PartitionRunner::run_aggregate(
            &SyncExecutor::new(),
            factory,
            &DynamicContext::default(),
            partitions,
        )
        .unwrap();
        let sums: Vec<i64> = sums
            .iter()
            .map(|v| v.tagged().unwrap().get::<IntegerPointable>().unwrap().as_i64())
            .collect();
        assert_eq!(sums, vec![3, 0]);
    }
}
