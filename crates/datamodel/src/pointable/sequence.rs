use super::{Pointable, StringPointable, expect_payload};
use crate::slotted::SlottedRegion;
use crate::tagged::TaggedValue;
use tessera_types::{Result, SystemError, ValueTag};

/// Accessor for `SEQUENCE` and `ARRAY` values.
#[derive(Debug, Clone, Copy)]
pub struct SequencePointable<'a> {
    tag: ValueTag,
    region: SlottedRegion<'a>,
}

impl<'a> SequencePointable<'a> {
    pub fn tag(&self) -> ValueTag {
        self.tag
    }

    pub fn len(&self) -> usize {
        self.region.len()
    }

    pub fn is_empty(&self) -> bool {
        self.region.is_empty()
    }

    /// End offset of item `index` within the data area.
    pub fn slot(&self, index: usize) -> Result<u32> {
        self.region.slot(index)
    }

    pub fn get(&self, index: usize) -> Result<TaggedValue<'a>> {
        self.region.item(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = Result<TaggedValue<'a>>> + '_ {
        self.region.iter()
    }
}

impl<'a> Pointable<'a> for SequencePointable<'a> {
    fn bind(value: TaggedValue<'a>) -> Result<Self> {
        let accepts = matches!(value.tag(), ValueTag::Sequence | ValueTag::Array);
        let payload = expect_payload(value, accepts, "a sequence or array", 4)?;
        let (region, _) = SlottedRegion::parse(payload, 0)?;
        Ok(Self {
            tag: value.tag(),
            region,
        })
    }
}

/// Accessor for JSON objects: each entry is a string key followed by a value.
#[derive(Debug, Clone, Copy)]
pub struct ObjectPointable<'a> {
    region: SlottedRegion<'a>,
}

impl<'a> ObjectPointable<'a> {
    pub fn len(&self) -> usize {
        self.region.len()
    }

    pub fn is_empty(&self) -> bool {
        self.region.is_empty()
    }

    pub fn entry(&self, index: usize) -> Result<(&'a str, TaggedValue<'a>)> {
        let bytes = self.region.item_bytes(index)?;
        let (key, rest) = TaggedValue::split_first(bytes)?;
        if key.tag() != ValueTag::String {
            return Err(SystemError::internal(format!(
                "object key encoded as {}",
                key.tag()
            )));
        }
        let key = key.get::<StringPointable>()?.as_str()?;
        Ok((key, TaggedValue::new(rest)?))
    }

    /// Looks a key up by linear scan.
    pub fn get(&self, key: &str) -> Result<Option<TaggedValue<'a>>> {
        for index in 0..self.len() {
            let (k, value) = self.entry(index)?;
            if k == key {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }
}

impl<'a> Pointable<'a> for ObjectPointable<'a> {
    fn bind(value: TaggedValue<'a>) -> Result<Self> {
        let payload = expect_payload(value, value.tag() == ValueTag::Object, "an object", 4)?;
        let (region, _) = SlottedRegion::parse(payload, 0)?;
        Ok(Self { region })
    }
}
