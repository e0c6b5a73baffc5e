use super::Claim;
use crate::storage::ValueStorage;
use crate::tagged::{NAME_AND_ID_LEN, TaggedValue};
use crate::values::NodeName;
use std::ops::Range;
use tessera_types::{Result, SystemError, ValueTag};

/// Builds `ATTRIBUTE_NODE` values: name codes, node id and one atomic value.
#[derive(Debug, Default)]
pub struct AttributeNodeBuilder {
    name: NodeName,
    local_node_id: i32,
    value: ValueStorage,
}

impl AttributeNodeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset<'b>(&'b mut self, out: &'b mut ValueStorage) -> Result<OpenAttribute<'b>> {
        self.name = NodeName::default();
        self.local_node_id = NodeName::NONE;
        self.value.reset();
        self.value.set_limit(out.limit());

        let mut claim = Claim::open(out, ValueTag::AttributeNode)?;
        claim.out().write_u8(0)?;
        claim.out().write_bytes(&[0xff; NAME_AND_ID_LEN])?;
        Ok(OpenAttribute {
            builder: self,
            claim,
        })
    }
}

#[derive(Debug)]
pub struct OpenAttribute<'b> {
    builder: &'b mut AttributeNodeBuilder,
    claim: Claim<'b>,
}

impl OpenAttribute<'_> {
    pub fn set_name(&mut self, name: NodeName) {
        self.builder.name = name;
    }

    pub fn set_local_node_id(&mut self, id: i32) {
        self.builder.local_node_id = id;
    }

    /// Sets the typed value, replacing any earlier one.
    pub fn set_value(&mut self, value: TaggedValue<'_>) -> Result<()> {
        self.value_with(|out| out.write_bytes(value.bytes()))
    }

    pub fn value_with<F>(&mut self, fill: F) -> Result<()>
    where
        F: FnOnce(&mut ValueStorage) -> Result<()>,
    {
        let value = &mut self.builder.value;
        value.reset();
        let checked = fill(&mut *value).and_then(|()| {
            let tag = value.tagged()?.tag();
            if tag.is_atomic() {
                Ok(())
            } else {
                Err(SystemError::type_error(format!(
                    "attribute value must be atomic, found {tag}"
                )))
            }
        });
        if checked.is_err() {
            value.reset();
        }
        checked
    }

    pub fn finish(mut self) -> Result<Range<usize>> {
        let builder = &*self.builder;
        if builder.value.is_empty() {
            return Err(SystemError::internal("attribute finished without a value"));
        }
        let at = self.claim.payload_offset(1);
        let out = self.claim.out();
        out.write_bytes(builder.value.as_bytes())?;
        out.patch_i32(at, builder.name.prefix)?;
        out.patch_i32(at + 4, builder.name.uri)?;
        out.patch_i32(at + 8, builder.name.local)?;
        out.patch_i32(at + 12, builder.local_node_id)?;
        Ok(self.claim.finish())
    }
}
