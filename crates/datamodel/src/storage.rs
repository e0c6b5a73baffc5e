use crate::tagged::TaggedValue;
use std::ops::Range;
use tessera_types::{Result, SystemError, ValueTag};

/// Default upper bound on the bytes a single [`ValueStorage`] may hold.
pub const DEFAULT_MAX_VALUE_BYTES: usize = 16 * 1024 * 1024;

macro_rules! write_be {
    ($($(#[$meta:meta])* $name:ident: $ty:ty),* $(,)?) => {
        $(
            $(#[$meta])*
            pub fn $name(&mut self, value: $ty) -> Result<()> {
                self.write_bytes(&value.to_be_bytes())
            }
        )*
    };
}

/// Growable, caller-owned output buffer that values are encoded into.
///
/// Writes are bounded by a byte limit; exceeding it fails with
/// [`SystemError::ValueTooLarge`] and leaves the buffer unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueStorage {
    data: Vec<u8>,
    limit: usize,
}

impl Default for ValueStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueStorage {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_MAX_VALUE_BYTES)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            data: Vec::new(),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
    }

    /// Clears the contents, keeping the allocation for reuse.
    pub fn reset(&mut self) {
        self.data.clear();
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn truncate(&mut self, len: usize) {
        self.data.truncate(len);
    }

    /// Views the whole buffer as one tagged value.
    pub fn tagged(&self) -> Result<TaggedValue<'_>> {
        TaggedValue::new(&self.data)
    }

    /// Views `range` as one tagged value, typically a range returned by a
    /// builder's `finish`.
    pub fn tagged_at(&self, range: Range<usize>) -> Result<TaggedValue<'_>> {
        let bytes = self
            .data
            .get(range.clone())
            .ok_or_else(|| SystemError::internal(format!("range {range:?} outside storage")))?;
        TaggedValue::new(bytes)
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let size = self.data.len() + bytes.len();
        if size > self.limit {
            return Err(SystemError::ValueTooLarge {
                size,
                max: self.limit,
            });
        }
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    pub fn write_tag(&mut self, tag: ValueTag) -> Result<()> {
        self.write_u8(tag.code())
    }

    write_be! {
        write_u8: u8,
        write_i8: i8,
        write_u16: u16,
        write_i16: i16,
        write_u32: u32,
        write_i32: i32,
        write_i64: i64,
        write_f32: f32,
        write_f64: f64,
    }

    /// Overwrites one previously written byte.
    pub fn patch_u8(&mut self, at: usize, value: u8) -> Result<()> {
        let slot = self
            .data
            .get_mut(at)
            .ok_or_else(|| SystemError::internal(format!("patch offset {at} out of bounds")))?;
        *slot = value;
        Ok(())
    }

    /// Overwrites four previously written bytes with a big-endian `u32`.
    pub fn patch_u32(&mut self, at: usize, value: u32) -> Result<()> {
        let slot = self
            .data
            .get_mut(at..at.saturating_add(4))
            .ok_or_else(|| SystemError::internal(format!("patch offset {at} out of bounds")))?;
        slot.copy_from_slice(&value.to_be_bytes());
        Ok(())
    }

    pub fn patch_i32(&mut self, at: usize, value: i32) -> Result<()> {
        self.patch_u32(at, u32::from_be_bytes(value.to_be_bytes()))
    }
}
