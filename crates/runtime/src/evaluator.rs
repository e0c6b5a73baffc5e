//! The evaluator contract between compiled expressions and the value core.
//!
//! A factory is built once per expression node, already holding the
//! factories of its arguments, and is shared across threads. Each execution
//! unit asks it for an evaluator, which owns its scratch buffers and is
//! reused for every tuple that unit processes. Evaluators are neither `Send`
//! nor `Sync`.

use crate::context::DynamicContext;
use std::fmt::Debug;
use std::marker::PhantomData;
use tessera_datamodel::builder::SequenceBuilder;
use tessera_datamodel::pointable::SequencePointable;
use tessera_datamodel::{TaggedValue, ValueStorage};
use tessera_types::{Result, SystemError, ValueTag};

/// Marker embedded in evaluators to keep them on the thread that made them.
pub(crate) type NotSend = PhantomData<*const ()>;

pub trait ScalarEvaluatorFactory: Send + Sync + Debug {
    fn name(&self) -> &'static str;

    fn create_evaluator(&self, ctx: &DynamicContext) -> Result<Box<dyn ScalarEvaluator>>;
}

/// Evaluates one expression for one input tuple.
pub trait ScalarEvaluator {
    /// Appends the value of the expression for the tuple `args` to `result`.
    fn evaluate(&mut self, args: &[TaggedValue<'_>], result: &mut ValueStorage) -> Result<()>;
}

pub trait AggregateEvaluatorFactory: Send + Sync + Debug {
    fn name(&self) -> &'static str;

    fn create_aggregate_evaluator(
        &self,
        ctx: &DynamicContext,
    ) -> Result<Box<dyn AggregateEvaluator>>;
}

/// Folds a group of tuples into one value.
pub trait AggregateEvaluator {
    /// Starts a new group, discarding any state from the previous one.
    fn init(&mut self) -> Result<()>;

    fn step(&mut self, args: &[TaggedValue<'_>]) -> Result<()>;

    fn finish(&mut self, result: &mut ValueStorage) -> Result<()>;
}

/// Evaluates a child into `scratch`, replacing its previous contents.
pub(crate) fn evaluate_into<'s>(
    child: &mut dyn ScalarEvaluator,
    args: &[TaggedValue<'_>],
    scratch: &'s mut ValueStorage,
) -> Result<TaggedValue<'s>> {
    scratch.reset();
    child.evaluate(args, scratch)?;
    scratch.tagged()
}

/// Unwraps a zero- or one-item operand.
///
/// The empty sequence yields `None`, a singleton sequence its item, and any
/// other sequence is a type error. Non-sequence values pass through.
pub(crate) fn optional_item(value: TaggedValue<'_>) -> Result<Option<TaggedValue<'_>>> {
    if value.tag() != ValueTag::Sequence {
        return Ok(Some(value));
    }
    let sequence = value.get::<SequencePointable>()?;
    match sequence.len() {
        0 => Ok(None),
        1 => sequence.get(0).map(Some),
        n => Err(SystemError::type_error(format!(
            "expected at most one item, found a sequence of {n}"
        ))),
    }
}

pub(crate) fn write_empty_sequence(out: &mut ValueStorage) -> Result<()> {
    let mut builder = SequenceBuilder::new();
    builder.reset(out)?.finish().map(|_| ())
}

/// Iterates over the items of `value`, which is either a sequence or a
/// single item.
pub(crate) fn for_each_item(
    value: TaggedValue<'_>,
    mut visit: impl FnMut(TaggedValue<'_>) -> Result<()>,
) -> Result<()> {
    if value.tag() == ValueTag::Sequence {
        for item in value.get::<SequencePointable>()?.iter() {
            visit(item?)?;
        }
        Ok(())
    } else {
        visit(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_datamodel::codec;
    use tessera_types::ErrorCode;

    fn sequence_of(values: &[i64]) -> ValueStorage {
        let mut out = ValueStorage::new();
        let mut builder = SequenceBuilder::new();
        let mut open = builder.reset(&mut out).unwrap();
        for &v in values {
            open.item_with(|s| codec::write_integer(s, ValueTag::Integer, v)).unwrap();
        }
        open.finish().unwrap();
        out
    }

    #[test]
    fn test_optional_item() {
        let empty = sequence_of(&[]);
        assert!(optional_item(empty.tagged().unwrap()).unwrap().is_none());

        let one = sequence_of(&[5]);
        let item = optional_item(one.tagged().unwrap()).unwrap().unwrap();
        assert_eq!(item.tag(), ValueTag::Integer);

        let two = sequence_of(&[5, 6]);
        let err = optional_item(two.tagged().unwrap()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::XPTY0004);
    }

    #[test]
    fn test_empty_sequence_encoding() {
        let mut out = ValueStorage::new();
        write_empty_sequence(&mut out).unwrap();
        assert_eq!(out.as_bytes(), sequence_of(&[]).as_bytes());
    }

    #[test]
    fn test_for_each_item_flattens_one_level() {
        let seq = sequence_of(&[1, 2, 3]);
        let mut count = 0;
        for_each_item(seq.tagged().unwrap(), |_| {
            count += 1;
            Ok(())
        })
        .unwrap();
        assert_eq!(count, 3);
    }
}
