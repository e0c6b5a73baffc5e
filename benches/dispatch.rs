//! Operator dispatch throughput benchmarks
//!
//! Measures:
//! - Value comparison across numeric promotion paths
//! - Arithmetic kernels, including the mirrored integer × decimal pair
//! - Partition throughput with the sync and rayon executors
//!
//! Run benchmarks: `cargo bench --bench dispatch`

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;
use tessera::datamodel::{XsDecimal, codec};
use tessera::runtime::functions::{FieldAccessFactory, ValueComparisonFactory};
use tessera::runtime::{
    ArithmeticOperator, ComparisonOperator, ScalarEvaluatorFactory, apply_arithmetic,
    compare_tagged_values,
};
use tessera::{DynamicContext, ExecutorImpl, PartitionRunner, Tuple, ValueStorage, ValueTag};

fn integer(value: i64) -> ValueStorage {
    let mut out = ValueStorage::new();
    codec::write_integer(&mut out, ValueTag::Integer, value).expect("integer encodes");
    out
}

fn decimal(mantissa: i64, scale: i8) -> ValueStorage {
    let mut out = ValueStorage::new();
    codec::write_decimal(&mut out, XsDecimal::new(mantissa, scale)).expect("decimal encodes");
    out
}

fn double(value: f64) -> ValueStorage {
    let mut out = ValueStorage::new();
    codec::write_double(&mut out, value).expect("double encodes");
    out
}

fn benchmark_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("comparison");
    let ctx = DynamicContext::default();
    let cases = [
        ("integer_integer", integer(41), integer(42)),
        ("integer_decimal", integer(41), decimal(4150, 2)),
        ("decimal_double", decimal(4150, 2), double(41.5)),
    ];

    for (name, left, right) in &cases {
        let (left, right) = (left.tagged().unwrap(), right.tagged().unwrap());
        group.bench_function(*name, |b| {
            b.iter(|| {
                let (left, right) = (black_box(left), black_box(right));
                compare_tagged_values(ComparisonOperator::Lt, left, right, &ctx)
            })
        });
    }

    group.finish();
}

fn benchmark_arithmetic(c: &mut Criterion) {
    let mut group = c.benchmark_group("arithmetic");
    let ctx = DynamicContext::default();
    let six = integer(6);
    let two = decimal(2, 0);
    let (six, two) = (six.tagged().unwrap(), two.tagged().unwrap());
    let mut out = ValueStorage::new();

    for op in ArithmeticOperator::ALL {
        group.bench_with_input(BenchmarkId::new("integer_decimal", op.name()), &op, |b, &op| {
            b.iter(|| {
                out.reset();
                apply_arithmetic(op, black_box(six), black_box(two), &ctx, &mut out)
            })
        });
    }
    group.bench_function("mirrored_multiply", |b| {
        b.iter(|| {
            out.reset();
            apply_arithmetic(ArithmeticOperator::Multiply, two, six, &ctx, &mut out)
        })
    });

    group.finish();
}

fn benchmark_partitions(c: &mut Criterion) {
    let mut group = c.benchmark_group("partitions");
    let ctx = DynamicContext::default();
    let factory: Arc<dyn ScalarEvaluatorFactory> = Arc::new(ValueComparisonFactory::new(
        ComparisonOperator::Lt,
        Box::new(FieldAccessFactory::new(0)),
        Box::new(FieldAccessFactory::new(1)),
    ));

    for tuples in [100usize, 10_000] {
        let partitions: Vec<Vec<Tuple>> = (0..8)
            .map(|p| {
                (0..tuples / 8)
                    .map(|i| vec![integer((p * i) as i64), integer(i as i64)])
                    .collect()
            })
            .collect();
        group.throughput(Throughput::Elements(tuples as u64));

        for (name, executor) in [
            ("sync", ExecutorImpl::with_threads(1).expect("sync executor")),
            ("parallel", ExecutorImpl::default()),
        ] {
            group.bench_with_input(BenchmarkId::new(name, tuples), &partitions, |b, partitions| {
                b.iter(|| {
                    PartitionRunner::run(&executor, factory.clone(), &ctx, partitions.clone())
                        .expect("partitions evaluate")
                })
            });
        }
    }

    group.finish();
}

criterion_group!(benches, benchmark_comparison, benchmark_arithmetic, benchmark_partitions);
criterion_main!(benches);
