use crate::arithmetic::{ArithmeticOperator, apply_arithmetic};
use crate::cast::cast_tagged_value;
use crate::context::DynamicContext;
use crate::evaluator::{
    AggregateEvaluator, AggregateEvaluatorFactory, NotSend, ScalarEvaluator,
    ScalarEvaluatorFactory, evaluate_into, for_each_item,
};
use std::marker::PhantomData;
use std::mem;
use tessera_datamodel::pointable::SequencePointable;
use tessera_datamodel::{TaggedValue, ValueStorage, codec};
use tessera_types::{CanonicalType, Result, SystemError, ValueTag, base_type_for_arithmetic};

/// Number of items in a value: a sequence counts its members, anything else is
/// a single item.
fn item_count(value: TaggedValue<'_>) -> Result<i64> {
    let count = if value.tag() == ValueTag::Sequence {
        value.get::<SequencePointable>()?.len()
    } else {
        1
    };
    i64::try_from(count).map_err(|_| SystemError::overflow("item count exceeds xs:integer"))
}

/// `fn:count($arg)`.
#[derive(Debug)]
pub struct CountFactory {
    arg: Box<dyn ScalarEvaluatorFactory>,
}

impl CountFactory {
    pub fn new(arg: Box<dyn ScalarEvaluatorFactory>) -> Self {
        Self { arg }
    }
}

impl ScalarEvaluatorFactory for CountFactory {
    fn name(&self) -> &'static str {
        "count"
    }

    fn create_evaluator(&self, ctx: &DynamicContext) -> Result<Box<dyn ScalarEvaluator>> {
        log::debug!("Creating count evaluator");
        Ok(Box::new(CountEvaluator {
            arg: self.arg.create_evaluator(ctx)?,
            value: ValueStorage::with_limit(ctx.max_value_bytes()),
            _marker: PhantomData,
        }))
    }
}

struct CountEvaluator {
    arg: Box<dyn ScalarEvaluator>,
    value: ValueStorage,
    _marker: NotSend,
}

impl ScalarEvaluator for CountEvaluator {
    fn evaluate(&mut self, args: &[TaggedValue<'_>], result: &mut ValueStorage) -> Result<()> {
        let value = evaluate_into(self.arg.as_mut(), args, &mut self.value)?;
        codec::write_integer(result, ValueTag::Integer, item_count(value)?)
    }
}

/// `count` over a group of tuples.
#[derive(Debug)]
pub struct CountAggregateFactory {
    arg: Box<dyn ScalarEvaluatorFactory>,
}

impl CountAggregateFactory {
    pub fn new(arg: Box<dyn ScalarEvaluatorFactory>) -> Self {
        Self { arg }
    }
}

impl AggregateEvaluatorFactory for CountAggregateFactory {
    fn name(&self) -> &'static str {
        "count"
    }

    fn create_aggregate_evaluator(
        &self,
        ctx: &DynamicContext,
    ) -> Result<Box<dyn AggregateEvaluator>> {
        log::debug!("Creating count aggregate evaluator");
        Ok(Box::new(CountAggregateEvaluator {
            arg: self.arg.create_evaluator(ctx)?,
            value: ValueStorage::with_limit(ctx.max_value_bytes()),
            count: 0,
            _marker: PhantomData,
        }))
    }
}

struct CountAggregateEvaluator {
    arg: Box<dyn ScalarEvaluator>,
    value: ValueStorage,
    count: i64,
    _marker: NotSend,
}

impl AggregateEvaluator for CountAggregateEvaluator {
    fn init(&mut self) -> Result<()> {
        self.count = 0;
        Ok(())
    }

    fn step(&mut self, args: &[TaggedValue<'_>]) -> Result<()> {
        let value = evaluate_into(self.arg.as_mut(), args, &mut self.value)?;
        self.count = self
            .count
            .checked_add(item_count(value)?)
            .ok_or_else(|| SystemError::overflow("count exceeds xs:integer"))?;
        Ok(())
    }

    fn finish(&mut self, result: &mut ValueStorage) -> Result<()> {
        codec::write_integer(result, ValueTag::Integer, self.count)
    }
}

/// `sum` over a group of tuples. Items are folded with `+`; untyped items
/// are read as `xs:double`. An empty group sums to the integer `0`.
#[derive(Debug)]
pub struct SumAggregateFactory {
    arg: Box<dyn ScalarEvaluatorFactory>,
}

impl SumAggregateFactory {
    pub fn new(arg: Box<dyn ScalarEvaluatorFactory>) -> Self {
        Self { arg }
    }
}

impl AggregateEvaluatorFactory for SumAggregateFactory {
    fn name(&self) -> &'static str {
        "sum"
    }

    fn create_aggregate_evaluator(
        &self,
        ctx: &DynamicContext,
    ) -> Result<Box<dyn AggregateEvaluator>> {
        log::debug!("Creating sum aggregate evaluator");
        let limit = ctx.max_value_bytes();
        Ok(Box::new(SumAggregateEvaluator {
            arg: self.arg.create_evaluator(ctx)?,
            value: ValueStorage::with_limit(limit),
            total: ValueStorage::with_limit(limit),
            next: ValueStorage::with_limit(limit),
            ctx: ctx.clone(),
            _marker: PhantomData,
        }))
    }
}

struct SumAggregateEvaluator {
    arg: Box<dyn ScalarEvaluator>,
    value: ValueStorage,
    // Running total; empty until the first item arrives.
    total: ValueStorage,
    next: ValueStorage,
    ctx: DynamicContext,
    _marker: NotSend,
}

impl SumAggregateEvaluator {
    fn accumulate(
        total: &mut ValueStorage,
        next: &mut ValueStorage,
        item: TaggedValue<'_>,
        ctx: &DynamicContext,
    ) -> Result<()> {
        if total.is_empty() {
            if item.tag() == ValueTag::UntypedAtomic {
                return cast_tagged_value(item, ValueTag::Double, ctx, total);
            }
            let kind = base_type_for_arithmetic(item.tag())?;
            if !kind.is_numeric()
                && !matches!(
                    kind,
                    CanonicalType::DayTimeDuration | CanonicalType::YearMonthDuration
                )
            {
                return Err(SystemError::type_error(format!(
                    "fn:sum cannot add values of type {}",
                    item.tag().name()
                )));
            }
            return total.write_bytes(item.bytes());
        }
        next.reset();
        apply_arithmetic(ArithmeticOperator::Add, total.tagged()?, item, ctx, next)?;
        mem::swap(total, next);
        Ok(())
    }
}

impl AggregateEvaluator for SumAggregateEvaluator {
    fn init(&mut self) -> Result<()> {
        self.total.reset();
        Ok(())
    }

    fn step(&mut self, args: &[TaggedValue<'_>]) -> Result<()> {
        let value = evaluate_into(self.arg.as_mut(), args, &mut self.value)?;
        let (total, next, ctx) = (&mut self.total, &mut self.next, &self.ctx);
        for_each_item(value, |item| Self::accumulate(total, next, item, ctx))
    }

    fn finish(&mut self, result: &mut ValueStorage) -> Result<()> {
        if self.total.is_empty() {
            codec::write_integer(result, ValueTag::Integer, 0)
        } else {
            result.write_bytes(self.total.as_bytes())
        }
    }
}
