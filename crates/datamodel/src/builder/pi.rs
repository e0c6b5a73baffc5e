use super::Claim;
use crate::codec::{MAX_VARIABLE_LENGTH, write_length_prefixed};
use crate::storage::ValueStorage;
use std::ops::Range;
use tessera_types::{Result, SystemError, ValueTag};

/// Builds `PI_NODE` values.
#[derive(Debug, Default)]
pub struct PINodeBuilder {
    local_node_id: i32,
    target: String,
    content: String,
}

impl PINodeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset<'b>(&'b mut self, out: &'b mut ValueStorage) -> Result<OpenPI<'b>> {
        self.local_node_id = -1;
        self.target.clear();
        self.content.clear();
        let mut claim = Claim::open(out, ValueTag::PiNode)?;
        claim.out().write_i32(-1)?;
        Ok(OpenPI {
            builder: self,
            claim,
        })
    }
}

#[derive(Debug)]
pub struct OpenPI<'b> {
    builder: &'b mut PINodeBuilder,
    claim: Claim<'b>,
}

impl OpenPI<'_> {
    pub fn set_local_node_id(&mut self, id: i32) {
        self.builder.local_node_id = id;
    }

    pub fn set_target(&mut self, target: &str) -> Result<()> {
        check_length(target)?;
        self.builder.target.clear();
        self.builder.target.push_str(target);
        Ok(())
    }

    pub fn set_content(&mut self, content: &str) -> Result<()> {
        check_length(content)?;
        self.builder.content.clear();
        self.builder.content.push_str(content);
        Ok(())
    }

    pub fn finish(mut self) -> Result<Range<usize>> {
        let builder = &*self.builder;
        let id_at = self.claim.payload_offset(0);
        let out = self.claim.out();
        write_length_prefixed(out, builder.target.as_bytes())?;
        write_length_prefixed(out, builder.content.as_bytes())?;
        out.patch_i32(id_at, builder.local_node_id)?;
        Ok(self.claim.finish())
    }
}

fn check_length(value: &str) -> Result<()> {
    if value.len() > MAX_VARIABLE_LENGTH {
        return Err(SystemError::ValueTooLarge {
            size: value.len(),
            max: MAX_VARIABLE_LENGTH,
        });
    }
    Ok(())
}
