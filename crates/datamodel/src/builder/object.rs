use super::Claim;
use crate::codec;
use crate::slotted::SlottedArea;
use crate::storage::ValueStorage;
use crate::tagged::TaggedValue;
use indexmap::IndexSet;
use std::ops::Range;
use tessera_types::{Result, SystemError, ValueTag};

/// Builds JSON `OBJECT` values. Each entry is a string key followed by its
/// value; keys must be unique.
#[derive(Debug, Default)]
pub struct ObjectBuilder {
    entries: SlottedArea,
    keys: IndexSet<String>,
}

impl ObjectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset<'b>(&'b mut self, out: &'b mut ValueStorage) -> Result<OpenObject<'b>> {
        self.entries.clear(out.limit());
        self.keys.clear();
        let claim = Claim::open(out, ValueTag::Object)?;
        Ok(OpenObject {
            builder: self,
            claim,
        })
    }
}

#[derive(Debug)]
pub struct OpenObject<'b> {
    builder: &'b mut ObjectBuilder,
    claim: Claim<'b>,
}

impl OpenObject<'_> {
    pub fn len(&self) -> usize {
        self.builder.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.builder.keys.contains(key)
    }

    /// Adds one entry. A key already present fails with
    /// [`SystemError::DuplicateKey`].
    pub fn add_item(&mut self, key: &str, value: TaggedValue<'_>) -> Result<()> {
        self.entry_with(key, |out| out.write_bytes(value.bytes()))
    }

    pub fn entry_with<F>(&mut self, key: &str, fill: F) -> Result<()>
    where
        F: FnOnce(&mut ValueStorage) -> Result<()>,
    {
        if self.contains_key(key) {
            return Err(SystemError::DuplicateKey(key.to_string()));
        }
        self.builder.entries.push_entry_with(|out| {
            codec::write_string(out, ValueTag::String, key)?;
            let start = out.len();
            fill(out)?;
            TaggedValue::new(&out.as_bytes()[start..]).map(|_| ())
        })?;
        self.builder.keys.insert(key.to_string());
        Ok(())
    }

    pub fn finish(mut self) -> Result<Range<usize>> {
        self.builder.entries.write_to(self.claim.out())?;
        Ok(self.claim.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pointable::{IntegerPointable, ObjectPointable};

    #[test]
    fn test_object_entries_and_lookup() {
        let mut out = ValueStorage::new();
        let mut builder = ObjectBuilder::new();
        let mut open = builder.reset(&mut out).unwrap();
        open.entry_with("a", |out| codec::write_integer(out, ValueTag::Integer, 1))
            .unwrap();
        open.entry_with("b", codec::write_null).unwrap();
        open.finish().unwrap();

        let object = out.tagged().unwrap().get::<ObjectPointable>().unwrap();
        assert_eq!(object.len(), 2);
        let (key, value) = object.entry(1).unwrap();
        assert_eq!(key, "b");
        assert_eq!(value.tag(), ValueTag::Null);
        let a = object.get("a").unwrap().unwrap();
        assert_eq!(a.get::<IntegerPointable>().unwrap().as_i64(), 1);
        assert!(object.get("c").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_key_is_rejected() {
        let mut out = ValueStorage::new();
        let mut builder = ObjectBuilder::new();
        let mut open = builder.reset(&mut out).unwrap();
        open.entry_with("k", codec::write_null).unwrap();
        let err = open.entry_with("k", codec::write_null).unwrap_err();
        assert_eq!(err.code().as_str(), "JNDY0003");
        assert_eq!(open.len(), 1);
    }

    #[test]
    fn test_failed_entry_leaves_no_trace() {
        let mut out = ValueStorage::new();
        let mut builder = ObjectBuilder::new();
        let mut open = builder.reset(&mut out).unwrap();
        assert!(open.entry_with("x", |_| Ok(())).is_err());
        assert!(!open.contains_key("x"));
        open.entry_with("x", codec::write_null).unwrap();
        assert_eq!(open.len(), 1);
    }
}
