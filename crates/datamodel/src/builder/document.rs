use super::{Claim, is_child_node};
use crate::slotted::SlottedArea;
use crate::storage::ValueStorage;
use crate::tagged::TaggedValue;
use std::ops::Range;
use tessera_types::{Result, SystemError, ValueTag};

/// Builds `DOCUMENT_NODE` values. The children chunk is always present.
#[derive(Debug, Default)]
pub struct DocumentNodeBuilder {
    local_node_id: i32,
    children: SlottedArea,
}

impl DocumentNodeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset<'b>(&'b mut self, out: &'b mut ValueStorage) -> Result<OpenDocument<'b>> {
        self.local_node_id = -1;
        self.children.clear(out.limit());
        let mut claim = Claim::open(out, ValueTag::DocumentNode)?;
        claim.out().write_i32(-1)?;
        Ok(OpenDocument {
            builder: self,
            claim,
        })
    }
}

#[derive(Debug)]
pub struct OpenDocument<'b> {
    builder: &'b mut DocumentNodeBuilder,
    claim: Claim<'b>,
}

impl OpenDocument<'_> {
    pub fn set_local_node_id(&mut self, id: i32) {
        self.builder.local_node_id = id;
    }

    pub fn add_child(&mut self, child: TaggedValue<'_>) -> Result<()> {
        if !is_child_node(child.tag()) {
            return Err(SystemError::type_error(format!(
                "{} cannot be a document child",
                child.tag()
            )));
        }
        self.builder.children.push_raw(child.bytes())
    }

    pub fn child_with<F>(&mut self, fill: F) -> Result<()>
    where
        F: FnOnce(&mut ValueStorage) -> Result<()>,
    {
        self.builder.children.push_with(fill, is_child_node)
    }

    pub fn finish(mut self) -> Result<Range<usize>> {
        let builder = &*self.builder;
        let id_at = self.claim.payload_offset(0);
        let out = self.claim.out();
        builder.children.write_to(out)?;
        out.patch_i32(id_at, builder.local_node_id)?;
        Ok(self.claim.finish())
    }
}
