use crate::arithmetic::{ArithmeticOperator, apply_arithmetic};
use crate::cast::cast_tagged_value;
use crate::comparison::{
    ComparisonOperator, GeneralComparisonScratch, compare_general, compare_tagged_values,
};
use crate::context::DynamicContext;
use crate::evaluator::{
    NotSend, ScalarEvaluator, ScalarEvaluatorFactory, evaluate_into, optional_item,
    write_empty_sequence,
};
use std::marker::PhantomData;
use tessera_datamodel::{TaggedValue, ValueStorage, codec};
use tessera_types::{Result, ValueTag};

/// Two child evaluators with a private buffer each.
struct Operands {
    left: Box<dyn ScalarEvaluator>,
    right: Box<dyn ScalarEvaluator>,
    left_value: ValueStorage,
    right_value: ValueStorage,
}

impl Operands {
    fn create(
        left: &dyn ScalarEvaluatorFactory,
        right: &dyn ScalarEvaluatorFactory,
        ctx: &DynamicContext,
    ) -> Result<Self> {
        Ok(Self {
            left: left.create_evaluator(ctx)?,
            right: right.create_evaluator(ctx)?,
            left_value: ValueStorage::with_limit(ctx.max_value_bytes()),
            right_value: ValueStorage::with_limit(ctx.max_value_bytes()),
        })
    }

    fn evaluate(
        &mut self,
        args: &[TaggedValue<'_>],
    ) -> Result<(TaggedValue<'_>, TaggedValue<'_>)> {
        let left = evaluate_into(self.left.as_mut(), args, &mut self.left_value)?;
        let right = evaluate_into(self.right.as_mut(), args, &mut self.right_value)?;
        Ok((left, right))
    }
}

/// `eq`, `ne`, `lt`, `le`, `gt`, `ge`.
///
/// An empty operand makes the result the empty sequence.
#[derive(Debug)]
pub struct ValueComparisonFactory {
    op: ComparisonOperator,
    left: Box<dyn ScalarEvaluatorFactory>,
    right: Box<dyn ScalarEvaluatorFactory>,
}

impl ValueComparisonFactory {
    pub fn new(
        op: ComparisonOperator,
        left: Box<dyn ScalarEvaluatorFactory>,
        right: Box<dyn ScalarEvaluatorFactory>,
    ) -> Self {
        Self { op, left, right }
    }
}

impl ScalarEvaluatorFactory for ValueComparisonFactory {
    fn name(&self) -> &'static str {
        "value-comparison"
    }

    fn create_evaluator(&self, ctx: &DynamicContext) -> Result<Box<dyn ScalarEvaluator>> {
        log::debug!("Creating value comparison evaluator for '{}'", self.op.name());
        Ok(Box::new(ValueComparisonEvaluator {
            op: self.op,
            operands: Operands::create(self.left.as_ref(), self.right.as_ref(), ctx)?,
            ctx: ctx.clone(),
            _marker: PhantomData,
        }))
    }
}

struct ValueComparisonEvaluator {
    op: ComparisonOperator,
    operands: Operands,
    ctx: DynamicContext,
    _marker: NotSend,
}

impl ScalarEvaluator for ValueComparisonEvaluator {
    fn evaluate(&mut self, args: &[TaggedValue<'_>], result: &mut ValueStorage) -> Result<()> {
        let (left, right) = self.operands.evaluate(args)?;
        match (optional_item(left)?, optional_item(right)?) {
            (Some(left), Some(right)) => {
                let outcome = compare_tagged_values(self.op, left, right, &self.ctx)?;
                codec::write_boolean(result, outcome)
            }
            _ => write_empty_sequence(result),
        }
    }
}

/// `=`, `!=`, `<`, `<=`, `>`, `>=` over sequences.
#[derive(Debug)]
pub struct GeneralComparisonFactory {
    op: ComparisonOperator,
    left: Box<dyn ScalarEvaluatorFactory>,
    right: Box<dyn ScalarEvaluatorFactory>,
}

impl GeneralComparisonFactory {
    pub fn new(
        op: ComparisonOperator,
        left: Box<dyn ScalarEvaluatorFactory>,
        right: Box<dyn ScalarEvaluatorFactory>,
    ) -> Self {
        Self { op, left, right }
    }
}

impl ScalarEvaluatorFactory for GeneralComparisonFactory {
    fn name(&self) -> &'static str {
        "general-comparison"
    }

    fn create_evaluator(&self, ctx: &DynamicContext) -> Result<Box<dyn ScalarEvaluator>> {
        log::debug!("Creating general comparison evaluator for '{}'", self.op.name());
        Ok(Box::new(GeneralComparisonEvaluator {
            op: self.op,
            operands: Operands::create(self.left.as_ref(), self.right.as_ref(), ctx)?,
            scratch: GeneralComparisonScratch::with_limit(ctx.max_value_bytes()),
            ctx: ctx.clone(),
            _marker: PhantomData,
        }))
    }
}

struct GeneralComparisonEvaluator {
    op: ComparisonOperator,
    operands: Operands,
    scratch: GeneralComparisonScratch,
    ctx: DynamicContext,
    _marker: NotSend,
}

impl ScalarEvaluator for GeneralComparisonEvaluator {
    fn evaluate(&mut self, args: &[TaggedValue<'_>], result: &mut ValueStorage) -> Result<()> {
        let (left, right) = self.operands.evaluate(args)?;
        let outcome = compare_general(self.op, left, right, &self.ctx, &mut self.scratch)?;
        codec::write_boolean(result, outcome)
    }
}

/// `+`, `-`, `*`, `div`, `idiv`, `mod`.
///
/// An empty operand makes the result the empty sequence.
#[derive(Debug)]
pub struct ArithmeticFactory {
    op: ArithmeticOperator,
    left: Box<dyn ScalarEvaluatorFactory>,
    right: Box<dyn ScalarEvaluatorFactory>,
}

impl ArithmeticFactory {
    pub fn new(
        op: ArithmeticOperator,
        left: Box<dyn ScalarEvaluatorFactory>,
        right: Box<dyn ScalarEvaluatorFactory>,
    ) -> Self {
        Self { op, left, right }
    }
}

impl ScalarEvaluatorFactory for ArithmeticFactory {
    fn name(&self) -> &'static str {
        "arithmetic"
    }

    fn create_evaluator(&self, ctx: &DynamicContext) -> Result<Box<dyn ScalarEvaluator>> {
        log::debug!("Creating arithmetic evaluator for '{}'", self.op.name());
        Ok(Box::new(ArithmeticEvaluator {
            op: self.op,
            operands: Operands::create(self.left.as_ref(), self.right.as_ref(), ctx)?,
            ctx: ctx.clone(),
            _marker: PhantomData,
        }))
    }
}

struct ArithmeticEvaluator {
    op: ArithmeticOperator,
    operands: Operands,
    ctx: DynamicContext,
    _marker: NotSend,
}

impl ScalarEvaluator for ArithmeticEvaluator {
    fn evaluate(&mut self, args: &[TaggedValue<'_>], result: &mut ValueStorage) -> Result<()> {
        let (left, right) = self.operands.evaluate(args)?;
        match (optional_item(left)?, optional_item(right)?) {
            (Some(left), Some(right)) => apply_arithmetic(self.op, left, right, &self.ctx, result),
            _ => write_empty_sequence(result),
        }
    }
}

/// `$arg cast as T?`.
#[derive(Debug)]
pub struct CastFactory {
    target: ValueTag,
    arg: Box<dyn ScalarEvaluatorFactory>,
}

impl CastFactory {
    pub fn new(target: ValueTag, arg: Box<dyn ScalarEvaluatorFactory>) -> Self {
        Self { target, arg }
    }
}

impl ScalarEvaluatorFactory for CastFactory {
    fn name(&self) -> &'static str {
        "cast"
    }

    fn create_evaluator(&self, ctx: &DynamicContext) -> Result<Box<dyn ScalarEvaluator>> {
        log::debug!("Creating cast evaluator to {}", self.target);
        Ok(Box::new(CastEvaluator {
            target: self.target,
            arg: self.arg.create_evaluator(ctx)?,
            value: ValueStorage::with_limit(ctx.max_value_bytes()),
            ctx: ctx.clone(),
            _marker: PhantomData,
        }))
    }
}

struct CastEvaluator {
    target: ValueTag,
    arg: Box<dyn ScalarEvaluator>,
    value: ValueStorage,
    ctx: DynamicContext,
    _marker: NotSend,
}

impl ScalarEvaluator for CastEvaluator {
    fn evaluate(&mut self, args: &[TaggedValue<'_>], result: &mut ValueStorage) -> Result<()> {
        let value = evaluate_into(self.arg.as_mut(), args, &mut self.value)?;
        match optional_item(value)? {
            Some(item) => cast_tagged_value(item, self.target, &self.ctx, result),
            None => write_empty_sequence(result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::{ConstantFactory, FieldAccessFactory};
    use tessera_datamodel::pointable::{BooleanPointable, DoublePointable, SequencePointable};
    use tessera_types::ErrorCode;

    fn integer(value: i64) -> Box<dyn ScalarEvaluatorFactory> {
        Box::new(
            ConstantFactory::encode_with(|s| codec::write_integer(s, ValueTag::Integer, value))
                .unwrap(),
        )
    }

    fn empty() -> Box<dyn ScalarEvaluatorFactory> {
        Box::new(ConstantFactory::encode_with(write_empty_sequence).unwrap())
    }

    fn run(factory: &dyn ScalarEvaluatorFactory, args: &[TaggedValue<'_>]) -> Result<ValueStorage> {
        let mut evaluator = factory.create_evaluator(&DynamicContext::default())?;
        let mut out = ValueStorage::new();
        evaluator.evaluate(args, &mut out)?;
        Ok(out)
    }

    #[test]
    fn test_value_comparison_over_fields() {
        let mut a = ValueStorage::new();
        codec::write_integer(&mut a, ValueTag::Integer, 3).unwrap();
        let mut b = ValueStorage::new();
        codec::write_integer(&mut b, ValueTag::Integer, 1).unwrap();
        let tuple = [a.tagged().unwrap(), b.tagged().unwrap()];

        let factory = ValueComparisonFactory::new(
            ComparisonOperator::Lt,
            Box::new(FieldAccessFactory::new(0)),
            Box::new(FieldAccessFactory::new(1)),
        );
        let mut evaluator = factory.create_evaluator(&DynamicContext::default()).unwrap();
        let mut out = ValueStorage::new();
        evaluator.evaluate(&tuple, &mut out).unwrap();
        assert!(!out.tagged().unwrap().get::<BooleanPointable>().unwrap().get());

        let swapped = [tuple[1], tuple[0]];
        out.reset();
        evaluator.evaluate(&swapped, &mut out).unwrap();
        assert!(out.tagged().unwrap().get::<BooleanPointable>().unwrap().get());
    }

    #[test]
    fn test_empty_operand_yields_empty_sequence() {
        let factory = ValueComparisonFactory::new(ComparisonOperator::Eq, integer(1), empty());
        let out = run(&factory, &[]).unwrap();
        assert!(out.tagged().unwrap().get::<SequencePointable>().unwrap().is_empty());

        let factory = ArithmeticFactory::new(ArithmeticOperator::Add, empty(), integer(1));
        let out = run(&factory, &[]).unwrap();
        assert!(out.tagged().unwrap().get::<SequencePointable>().unwrap().is_empty());
    }

    #[test]
    fn test_general_comparison_of_empty_is_false() {
        let factory = GeneralComparisonFactory::new(ComparisonOperator::Eq, integer(1), empty());
        let out = run(&factory, &[]).unwrap();
        assert!(!out.tagged().unwrap().get::<BooleanPointable>().unwrap().get());
    }

    #[test]
    fn test_arithmetic_and_cast() {
        let untyped = Box::new(
            ConstantFactory::encode_with(|s| codec::write_string(s, ValueTag::UntypedAtomic, "2"))
                .unwrap(),
        );
        let factory = ArithmeticFactory::new(ArithmeticOperator::Add, untyped, integer(3));
        let out = run(&factory, &[]).unwrap();
        assert_eq!(out.tagged().unwrap().get::<DoublePointable>().unwrap().get(), 5.0);

        let cast = CastFactory::new(ValueTag::Double, integer(4));
        let out = run(&cast, &[]).unwrap();
        assert_eq!(out.tagged().unwrap().get::<DoublePointable>().unwrap().get(), 4.0);

        let cast = CastFactory::new(ValueTag::Date, integer(4));
        assert_eq!(run(&cast, &[]).unwrap_err().code(), ErrorCode::XPTY0004);
    }
}
