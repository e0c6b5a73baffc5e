//! General comparison (`=`, `<`, ...): existential over both operands, with
//! nodes atomized and untypedAtomic items converted to the other side's type.

use super::{ComparisonOperator, compare_tagged_values};
use crate::cast::cast_tagged_value;
use crate::context::DynamicContext;
use std::mem;
use std::ops::Range;
use tessera_datamodel::pointable::{
    AttributeNodePointable, DocumentNodePointable, ElementNodePointable, NodeTreePointable,
    PINodePointable, SequencePointable, TextNodePointable,
};
use tessera_datamodel::{TaggedValue, ValueStorage, codec};
use tessera_types::{CanonicalType, Result, ValueTag, base_type_for_general_comparison};

/// Reusable buffers for [`compare_general`], owned by one evaluator.
#[derive(Debug, Default)]
pub struct GeneralComparisonScratch {
    left: Atomized,
    right: Atomized,
    cast: ValueStorage,
}

impl GeneralComparisonScratch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffers that refuse to grow past `max_bytes`.
    pub fn with_limit(max_bytes: usize) -> Self {
        Self {
            left: Atomized::with_limit(max_bytes),
            right: Atomized::with_limit(max_bytes),
            cast: ValueStorage::with_limit(max_bytes),
        }
    }
}

/// True when some item of `left` and some item of `right` satisfy `op`.
///
/// Either operand may be a sequence; an empty sequence on either side makes
/// the comparison false. `scratch` is reset on entry.
pub fn compare_general(
    op: ComparisonOperator,
    left: TaggedValue<'_>,
    right: TaggedValue<'_>,
    ctx: &DynamicContext,
    scratch: &mut GeneralComparisonScratch,
) -> Result<bool> {
    let GeneralComparisonScratch {
        left: left_items,
        right: right_items,
        cast,
    } = scratch;
    left_items.reset();
    left_items.push(left)?;
    right_items.reset();
    right_items.push(right)?;

    for l in 0..left_items.len() {
        let l = left_items.get(l)?;
        for r in 0..right_items.len() {
            if compare_atomic(op, l, right_items.get(r)?, ctx, cast)? {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

fn compare_atomic(
    op: ComparisonOperator,
    left: TaggedValue<'_>,
    right: TaggedValue<'_>,
    ctx: &DynamicContext,
    scratch: &mut ValueStorage,
) -> Result<bool> {
    use CanonicalType as T;

    let left_type = base_type_for_general_comparison(left.tag())?;
    let right_type = base_type_for_general_comparison(right.tag())?;
    match (left_type, right_type) {
        (T::UntypedAtomic, other) if !other.is_string_family() => {
            scratch.reset();
            cast_tagged_value(left, other.tag(), ctx, scratch)?;
            compare_tagged_values(op, scratch.tagged()?, right, ctx)
        }
        (other, T::UntypedAtomic) if !other.is_string_family() => {
            scratch.reset();
            cast_tagged_value(right, other.tag(), ctx, scratch)?;
            compare_tagged_values(op, left, scratch.tagged()?, ctx)
        }
        _ => compare_tagged_values(op, left, right, ctx),
    }
}

/// The atomized items of one operand, packed into a single buffer.
#[derive(Debug, Default)]
struct Atomized {
    storage: ValueStorage,
    items: Vec<Range<usize>>,
    text: String,
}

impl Atomized {
    fn with_limit(max_bytes: usize) -> Self {
        Self {
            storage: ValueStorage::with_limit(max_bytes),
            ..Self::default()
        }
    }

    fn reset(&mut self) {
        self.storage.reset();
        self.items.clear();
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn get(&self, index: usize) -> Result<TaggedValue<'_>> {
        self.storage.tagged_at(self.items[index].clone())
    }

    fn push(&mut self, value: TaggedValue<'_>) -> Result<()> {
        match value.tag() {
            ValueTag::Sequence => {
                for item in value.get::<SequencePointable>()?.iter() {
                    self.push(item?)?;
                }
                Ok(())
            }
            ValueTag::NodeTree => self.push(value.get::<NodeTreePointable>()?.root()),
            ValueTag::AttributeNode => self.push(value.get::<AttributeNodePointable>()?.value()),
            ValueTag::TextNode => {
                let text = value.get::<TextNodePointable>()?.value()?;
                self.push_string(ValueTag::UntypedAtomic, text)
            }
            ValueTag::CommentNode => {
                let text = value.get::<TextNodePointable>()?.value()?;
                self.push_string(ValueTag::String, text)
            }
            ValueTag::PiNode => {
                let content = value.get::<PINodePointable>()?.content()?;
                self.push_string(ValueTag::String, content)
            }
            ValueTag::ElementNode | ValueTag::DocumentNode => {
                let mut text = mem::take(&mut self.text);
                text.clear();
                let pushed = collect_text(value, &mut text)
                    .and_then(|()| self.push_string(ValueTag::UntypedAtomic, &text));
                self.text = text;
                pushed
            }
            _ => {
                let start = self.storage.len();
                self.storage.write_bytes(value.bytes())?;
                self.items.push(start..self.storage.len());
                Ok(())
            }
        }
    }

    fn push_string(&mut self, tag: ValueTag, text: &str) -> Result<()> {
        let start = self.storage.len();
        codec::write_string(&mut self.storage, tag, text)?;
        self.items.push(start..self.storage.len());
        Ok(())
    }
}

/// Concatenates the text node descendants of an element or document.
fn collect_text(node: TaggedValue<'_>, out: &mut String) -> Result<()> {
    match node.tag() {
        ValueTag::TextNode => out.push_str(node.get::<TextNodePointable>()?.value()?),
        ValueTag::ElementNode => {
            let element = node.get::<ElementNodePointable>()?;
            for i in 0..element.child_count() {
                collect_text(element.child(i)?, out)?;
            }
        }
        ValueTag::DocumentNode => {
            let document = node.get::<DocumentNodePointable>()?;
            for i in 0..document.child_count() {
                collect_text(document.child(i)?, out)?;
            }
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_datamodel::NodeName;
    use tessera_datamodel::builder::{ElementNodeBuilder, SequenceBuilder, write_text_node};
    use tessera_types::ErrorCode;

    fn integers(values: &[i64]) -> ValueStorage {
        let mut out = ValueStorage::new();
        let mut builder = SequenceBuilder::new();
        let mut open = builder.reset(&mut out).unwrap();
        for &v in values {
            open.item_with(|s| codec::write_integer(s, ValueTag::Integer, v)).unwrap();
        }
        open.finish().unwrap();
        out
    }

    fn untyped(text: &str) -> ValueStorage {
        let mut out = ValueStorage::new();
        codec::write_string(&mut out, ValueTag::UntypedAtomic, text).unwrap();
        out
    }

    fn general(op: ComparisonOperator, left: &ValueStorage, right: &ValueStorage) -> Result<bool> {
        let mut scratch = GeneralComparisonScratch::new();
        let ctx = DynamicContext::default();
        compare_general(op, left.tagged()?, right.tagged()?, &ctx, &mut scratch)
    }

    #[test]
    fn test_existential_over_sequences() {
        let left = integers(&[1, 2]);
        let right = integers(&[2, 3]);
        assert!(general(ComparisonOperator::Eq, &left, &right).unwrap());
        assert!(general(ComparisonOperator::Ne, &left, &right).unwrap());
        assert!(!general(ComparisonOperator::Gt, &left, &integers(&[5])).unwrap());
        assert!(!general(ComparisonOperator::Eq, &left, &integers(&[])).unwrap());
    }

    #[test]
    fn test_untyped_against_numeric_is_numeric() {
        let ten = untyped("10");
        let nine = integers(&[9]);
        assert!(general(ComparisonOperator::Gt, &ten, &nine).unwrap());
        assert!(general(ComparisonOperator::Lt, &nine, &ten).unwrap());

        let bad = untyped("ten");
        let err = general(ComparisonOperator::Eq, &bad, &nine).unwrap_err();
        assert_eq!(err.code(), ErrorCode::FORG0001);
    }

    #[test]
    fn test_untyped_against_string_is_textual() {
        let ten = untyped("10");
        let mut nine = ValueStorage::new();
        codec::write_string(&mut nine, ValueTag::String, "9").unwrap();
        assert!(general(ComparisonOperator::Lt, &ten, &nine).unwrap());
    }

    #[test]
    fn test_untyped_cast_to_other_type() {
        let text = untyped("2024-05-01");
        let mut date = ValueStorage::new();
        let value = tessera_datamodel::XsDate::new(2024, 5, 1, None);
        codec::write_date(&mut date, ValueTag::Date, &value).unwrap();
        assert!(general(ComparisonOperator::Eq, &text, &date).unwrap());
    }

    #[test]
    fn test_scratch_is_reset_between_calls() {
        let ctx = DynamicContext::default();
        let mut scratch = GeneralComparisonScratch::new();
        let (one_two, two) = (integers(&[1, 2]), integers(&[2]));
        let (three, empty) = (integers(&[3]), integers(&[]));
        let outcome = compare_general(
            ComparisonOperator::Eq,
            one_two.tagged().unwrap(),
            two.tagged().unwrap(),
            &ctx,
            &mut scratch,
        );
        assert!(outcome.unwrap());
        // Items left over from the previous call must not match.
        let outcome = compare_general(
            ComparisonOperator::Eq,
            three.tagged().unwrap(),
            empty.tagged().unwrap(),
            &ctx,
            &mut scratch,
        );
        assert!(!outcome.unwrap());
        assert_eq!(scratch.left.len(), 1);
        assert_eq!(scratch.right.len(), 0);
    }

    #[test]
    fn test_scratch_honours_the_value_limit() {
        let ctx = DynamicContext::default();
        let mut scratch = GeneralComparisonScratch::with_limit(16);
        let long = untyped(&"x".repeat(64));
        let short = untyped("x");
        let err = compare_general(
            ComparisonOperator::Eq,
            long.tagged().unwrap(),
            short.tagged().unwrap(),
            &ctx,
            &mut scratch,
        )
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::SYSE0001);
    }

    #[test]
    fn test_element_atomizes_to_text_content() {
        let mut element = ValueStorage::new();
        let mut builder = ElementNodeBuilder::new();
        let mut open = builder.reset(&mut element).unwrap();
        open.set_name(NodeName::new(NodeName::NONE, NodeName::NONE, 0));
        open.child_with(|s| write_text_node(s, 1, "4")).unwrap();
        open.child_with(|s| write_text_node(s, 2, "2")).unwrap();
        open.finish().unwrap();

        assert!(general(ComparisonOperator::Eq, &element, &integers(&[42])).unwrap());
        assert!(general(ComparisonOperator::Eq, &element, &untyped("42")).unwrap());
    }
}
