use super::Claim;
use crate::storage::ValueStorage;
use crate::tagged::{DICTIONARY_FLAG, TaggedValue};
use indexmap::IndexSet;
use std::ops::Range;
use tessera_types::{Result, SystemError, ValueTag};

/// Interns names and text into dense `i32` codes for a node tree.
#[derive(Debug, Clone, Default)]
pub struct StringDictionaryBuilder {
    strings: IndexSet<String>,
}

impl StringDictionaryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the code of `value`, adding it on first use.
    pub fn intern(&mut self, value: &str) -> Result<i32> {
        let index = match self.strings.get_index_of(value) {
            Some(index) => index,
            None => self.strings.insert_full(value.to_string()).0,
        };
        Ok(i32::try_from(index)?)
    }

    pub fn lookup(&self, code: i32) -> Option<&str> {
        let index = usize::try_from(code).ok()?;
        self.strings.get_index(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn clear(&mut self) {
        self.strings.clear();
    }

    /// Writes the dictionary block: its byte length, then count, cumulative
    /// end offsets and the UTF-8 strings.
    pub fn write_to(&self, out: &mut ValueStorage) -> Result<()> {
        let data_len: usize = self.strings.iter().map(String::len).sum();
        let block_len = 4 + 4 * self.strings.len() + data_len;
        out.write_u32(u32::try_from(block_len)?)?;
        out.write_u32(u32::try_from(self.strings.len())?)?;
        let mut end = 0usize;
        for value in &self.strings {
            end += value.len();
            out.write_u32(u32::try_from(end)?)?;
        }
        for value in &self.strings {
            out.write_bytes(value.as_bytes())?;
        }
        Ok(())
    }
}

/// Builds `NODE_TREE` values: an optional string dictionary and one root node.
#[derive(Debug, Default)]
pub struct NodeTreeBuilder {
    dictionary: ValueStorage,
    root: ValueStorage,
}

impl NodeTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset<'b>(&'b mut self, out: &'b mut ValueStorage) -> Result<OpenNodeTree<'b>> {
        self.dictionary.reset();
        self.dictionary.set_limit(out.limit());
        self.root.reset();
        self.root.set_limit(out.limit());
        let mut claim = Claim::open(out, ValueTag::NodeTree)?;
        claim.out().write_u8(0)?;
        Ok(OpenNodeTree {
            builder: self,
            claim,
        })
    }
}

#[derive(Debug)]
pub struct OpenNodeTree<'b> {
    builder: &'b mut NodeTreeBuilder,
    claim: Claim<'b>,
}

impl OpenNodeTree<'_> {
    pub fn set_dictionary(&mut self, dictionary: &StringDictionaryBuilder) -> Result<()> {
        let block = &mut self.builder.dictionary;
        block.reset();
        let written = dictionary.write_to(block);
        if written.is_err() {
            block.reset();
        }
        written
    }

    pub fn set_root(&mut self, root: TaggedValue<'_>) -> Result<()> {
        self.root_with(|out| out.write_bytes(root.bytes()))
    }

    /// Builds the root node in place through `fill`.
    pub fn root_with<F>(&mut self, fill: F) -> Result<()>
    where
        F: FnOnce(&mut ValueStorage) -> Result<()>,
    {
        let root = &mut self.builder.root;
        root.reset();
        let checked = fill(&mut *root).and_then(|()| {
            let tag = root.tagged()?.tag();
            if tag.is_node() && tag != ValueTag::NodeTree {
                Ok(())
            } else {
                Err(SystemError::type_error(format!(
                    "node tree root must be a node, found {tag}"
                )))
            }
        });
        if checked.is_err() {
            root.reset();
        }
        checked
    }

    pub fn finish(mut self) -> Result<Range<usize>> {
        let builder = &*self.builder;
        if builder.root.is_empty() {
            return Err(SystemError::internal("node tree finished without a root"));
        }
        let header_at = self.claim.payload_offset(0);
        let out = self.claim.out();
        let mut header = 0u8;
        if !builder.dictionary.is_empty() {
            header |= DICTIONARY_FLAG;
            out.write_bytes(builder.dictionary.as_bytes())?;
        }
        out.write_bytes(builder.root.as_bytes())?;
        out.patch_u8(header_at, header)?;
        Ok(self.claim.finish())
    }
}
