//! The slot-offset layout shared by sequences, arrays, objects and node
//! chunks: `count: u32`, `count` cumulative end offsets, then the items back
//! to back.

use crate::bytes::{read_u32, slice};
use crate::storage::ValueStorage;
use crate::tagged::TaggedValue;
use tessera_types::{Result, SystemError, ValueTag};

/// Read side of a slotted layout.
#[derive(Debug, Clone, Copy)]
pub struct SlottedRegion<'a> {
    count: usize,
    slots: &'a [u8],
    data: &'a [u8],
}

impl SlottedRegion<'static> {
    /// A region with no items, used for absent node chunks.
    pub const EMPTY: Self = Self {
        count: 0,
        slots: &[],
        data: &[],
    };
}

impl<'a> SlottedRegion<'a> {
    /// Parses the region starting at `at`, returning it and the offset just
    /// past its data area.
    pub fn parse(bytes: &'a [u8], at: usize) -> Result<(Self, usize)> {
        let count = read_u32(bytes, at)? as usize;
        let slots_len = count
            .checked_mul(4)
            .ok_or_else(|| SystemError::internal("slot table length overflows"))?;
        let slots = slice(bytes, at + 4, slots_len)?;
        let data_len = if count == 0 {
            0
        } else {
            read_u32(slots, slots_len - 4)? as usize
        };
        let data_at = at + 4 + slots_len;
        let data = slice(bytes, data_at, data_len)?;
        Ok((Self { count, slots, data }, data_at + data_len))
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// End offset of item `index`, relative to the start of the data area.
    pub fn slot(&self, index: usize) -> Result<u32> {
        self.check_index(index)?;
        read_u32(self.slots, index * 4)
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Raw bytes of item `index`.
    pub fn item_bytes(&self, index: usize) -> Result<&'a [u8]> {
        let end = self.slot(index)? as usize;
        let start = if index == 0 {
            0
        } else {
            self.slot(index - 1)? as usize
        };
        if start > end {
            return Err(SystemError::internal(format!(
                "slot {index} ends at {end} before it starts at {start}"
            )));
        }
        slice(self.data, start, end - start)
    }

    pub fn item(&self, index: usize) -> Result<TaggedValue<'a>> {
        TaggedValue::new(self.item_bytes(index)?)
    }

    pub fn iter(&self) -> impl Iterator<Item = Result<TaggedValue<'a>>> + '_ {
        (0..self.count).map(move |i| self.item(i))
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.count {
            Ok(())
        } else {
            Err(SystemError::internal(format!(
                "index {index} out of bounds for {} items",
                self.count
            )))
        }
    }
}

/// Write side of a slotted layout: a scratch data area plus its slot table,
/// emitted in one piece by [`SlottedArea::write_to`].
#[derive(Debug, Clone, Default)]
pub(crate) struct SlottedArea {
    data: ValueStorage,
    slots: Vec<u32>,
}

impl SlottedArea {
    pub(crate) fn clear(&mut self, limit: usize) {
        self.data.reset();
        self.data.set_limit(limit);
        self.slots.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn data(&self) -> &[u8] {
        self.data.as_bytes()
    }

    /// Appends raw bytes as one item. The caller guarantees they form a
    /// complete entry.
    pub(crate) fn push_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.data.write_bytes(bytes)?;
        self.close_item()
    }

    /// Runs `fill` against the data area and records everything it wrote as
    /// one item, which must be a single complete value accepted by `accepts`.
    pub(crate) fn push_with<F>(&mut self, fill: F, accepts: fn(ValueTag) -> bool) -> Result<()>
    where
        F: FnOnce(&mut ValueStorage) -> Result<()>,
    {
        let start = self.data.len();
        let checked = fill(&mut self.data).and_then(|()| {
            let value = TaggedValue::new(&self.data.as_bytes()[start..])?;
            if accepts(value.tag()) {
                Ok(())
            } else {
                Err(SystemError::type_error(format!(
                    "{} is not allowed here",
                    value.tag()
                )))
            }
        });
        if let Err(err) = checked {
            self.data.truncate(start);
            return Err(err);
        }
        self.close_item()
    }

    /// Runs `fill` against the data area and records what it wrote as one
    /// entry, without interpreting it.
    pub(crate) fn push_entry_with<F>(&mut self, fill: F) -> Result<()>
    where
        F: FnOnce(&mut ValueStorage) -> Result<()>,
    {
        let start = self.data.len();
        if let Err(err) = fill(&mut self.data) {
            self.data.truncate(start);
            return Err(err);
        }
        self.close_item()
    }

    fn close_item(&mut self) -> Result<()> {
        let end = u32::try_from(self.data.len())?;
        self.slots.push(end);
        Ok(())
    }

    pub(crate) fn write_to(&self, out: &mut ValueStorage) -> Result<()> {
        out.write_u32(u32::try_from(self.slots.len())?)?;
        for slot in &self.slots {
            out.write_u32(*slot)?;
        }
        out.write_bytes(self.data.as_bytes())
    }
}
