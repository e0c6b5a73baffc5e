use super::Claim;
use crate::pointable::SequencePointable;
use crate::slotted::SlottedArea;
use crate::storage::ValueStorage;
use crate::tagged::TaggedValue;
use std::ops::Range;
use tessera_types::{Result, ValueTag};

/// Builds `SEQUENCE` values. Nested sequences are flattened into their items.
#[derive(Debug, Default)]
pub struct SequenceBuilder {
    items: SlottedArea,
    pending: ValueStorage,
}

impl SequenceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset<'b>(&'b mut self, out: &'b mut ValueStorage) -> Result<OpenSequence<'b>> {
        self.items.clear(out.limit());
        self.pending.set_limit(out.limit());
        let claim = Claim::open(out, ValueTag::Sequence)?;
        Ok(OpenSequence {
            builder: self,
            claim,
        })
    }
}

#[derive(Debug)]
pub struct OpenSequence<'b> {
    builder: &'b mut SequenceBuilder,
    claim: Claim<'b>,
}

impl OpenSequence<'_> {
    pub fn len(&self) -> usize {
        self.builder.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn add_item(&mut self, value: TaggedValue<'_>) -> Result<()> {
        push_flattened(&mut self.builder.items, value)
    }

    /// Encodes one value through `fill` and appends it.
    pub fn item_with<F>(&mut self, fill: F) -> Result<()>
    where
        F: FnOnce(&mut ValueStorage) -> Result<()>,
    {
        let builder = &mut *self.builder;
        builder.pending.reset();
        fill(&mut builder.pending)?;
        let value = TaggedValue::new(builder.pending.as_bytes())?;
        push_flattened(&mut builder.items, value)
    }

    pub fn finish(mut self) -> Result<Range<usize>> {
        self.builder.items.write_to(self.claim.out())?;
        Ok(self.claim.finish())
    }
}

fn push_flattened(items: &mut SlottedArea, value: TaggedValue<'_>) -> Result<()> {
    if value.tag() != ValueTag::Sequence {
        return items.push_raw(value.bytes());
    }
    let nested = value.get::<SequencePointable>()?;
    for item in nested.iter() {
        items.push_raw(item?.bytes())?;
    }
    Ok(())
}

/// Builds JSON `ARRAY` values. Members are kept as given, including nested
/// sequences.
#[derive(Debug, Default)]
pub struct ArrayBuilder {
    members: SlottedArea,
}

impl ArrayBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset<'b>(&'b mut self, out: &'b mut ValueStorage) -> Result<OpenArray<'b>> {
        self.members.clear(out.limit());
        let claim = Claim::open(out, ValueTag::Array)?;
        Ok(OpenArray {
            builder: self,
            claim,
        })
    }
}

#[derive(Debug)]
pub struct OpenArray<'b> {
    builder: &'b mut ArrayBuilder,
    claim: Claim<'b>,
}

impl OpenArray<'_> {
    pub fn len(&self) -> usize {
        self.builder.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn add_item(&mut self, value: TaggedValue<'_>) -> Result<()> {
        self.builder.members.push_raw(value.bytes())
    }

    pub fn item_with<F>(&mut self, fill: F) -> Result<()>
    where
        F: FnOnce(&mut ValueStorage) -> Result<()>,
    {
        self.builder.members.push_with(fill, |_| true)
    }

    pub fn finish(mut self) -> Result<Range<usize>> {
        self.builder.members.write_to(self.claim.out())?;
        Ok(self.claim.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;

    #[test]
    fn test_sequence_slots_are_cumulative_end_offsets() {
        let mut out = ValueStorage::new();
        let mut builder = SequenceBuilder::new();
        let mut open = builder.reset(&mut out).unwrap();
        open.item_with(|out| codec::write_integer(out, ValueTag::Int, 1))
            .unwrap();
        open.item_with(|out| codec::write_string(out, ValueTag::String, "ab"))
            .unwrap();
        let range = open.finish().unwrap();

        let seq = out.tagged_at(range).unwrap().get::<SequencePointable>().unwrap();
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.slot(0).unwrap(), 5);
        assert_eq!(seq.slot(1).unwrap(), 10);
        assert_eq!(seq.get(1).unwrap().tag(), ValueTag::String);
    }

    #[test]
    fn test_nested_sequences_are_flattened() {
        let mut inner = ValueStorage::new();
        let mut builder = SequenceBuilder::new();
        let mut open = builder.reset(&mut inner).unwrap();
        open.item_with(|out| codec::write_boolean(out, true)).unwrap();
        open.item_with(|out| codec::write_boolean(out, false)).unwrap();
        open.finish().unwrap();

        let mut out = ValueStorage::new();
        let mut open = builder.reset(&mut out).unwrap();
        open.add_item(inner.tagged().unwrap()).unwrap();
        open.item_with(codec::write_null).unwrap();
        assert_eq!(open.len(), 3);
        open.finish().unwrap();

        let seq = out.tagged().unwrap().get::<SequencePointable>().unwrap();
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.get(2).unwrap().tag(), ValueTag::Null);
    }

    #[test]
    fn test_empty_sequence() {
        let mut out = ValueStorage::new();
        let mut builder = SequenceBuilder::new();
        let range = builder.reset(&mut out).unwrap().finish().unwrap();
        assert_eq!(range, 0..5);
        assert!(out.tagged().unwrap().get::<SequencePointable>().unwrap().is_empty());
    }

    #[test]
    fn test_array_keeps_nested_sequence() {
        let mut inner = ValueStorage::new();
        let mut seq = SequenceBuilder::new();
        seq.reset(&mut inner).unwrap().finish().unwrap();

        let mut out = ValueStorage::new();
        let mut builder = ArrayBuilder::new();
        let mut open = builder.reset(&mut out).unwrap();
        open.add_item(inner.tagged().unwrap()).unwrap();
        open.finish().unwrap();

        let array = out.tagged().unwrap().get::<SequencePointable>().unwrap();
        assert_eq!(array.tag(), ValueTag::Array);
        assert_eq!(array.get(0).unwrap().tag(), ValueTag::Sequence);
    }

    #[test]
    fn test_dropped_builder_truncates_output() {
        let mut out = ValueStorage::new();
        codec::write_boolean(&mut out, true).unwrap();
        let mut builder = SequenceBuilder::new();
        {
            let mut open = builder.reset(&mut out).unwrap();
            open.item_with(|out| codec::write_double(out, 1.0)).unwrap();
        }
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_limit_exceeded_in_finish_truncates() {
        let mut out = ValueStorage::with_limit(12);
        let mut builder = SequenceBuilder::new();
        let mut open = builder.reset(&mut out).unwrap();
        open.item_with(|out| codec::write_double(out, 1.0)).unwrap();
        assert!(open.finish().is_err());
        assert!(out.is_empty());
    }
}
