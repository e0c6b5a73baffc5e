//! Incremental writers for sequences, JSON containers and XML nodes.
//!
//! Every builder follows the same lifecycle: an idle `XBuilder` owns reusable
//! scratch areas, `reset` binds it to an output buffer and returns an `OpenX`
//! that holds that buffer exclusively, and `finish` emits the value and hands
//! back its byte range. Dropping an `OpenX` without finishing it, or failing
//! inside `finish`, truncates the output back to where `reset` started.
//!
//! # Example
//!
//! ```ignore
//! let mut out = ValueStorage::new();
//! let mut seq = SequenceBuilder::new();
//! let mut open = seq.reset(&mut out)?;
//! open.item_with(|out| codec::write_integer(out, ValueTag::Integer, 3))?;
//! let range = open.finish()?;
//! let value = out.tagged_at(range)?;
//! ```

mod attribute;
mod document;
mod element;
mod object;
mod pi;
mod sequence;
mod text;
mod tree;

pub use attribute::{AttributeNodeBuilder, OpenAttribute};
pub use document::{DocumentNodeBuilder, OpenDocument};
pub use element::{ElementNodeBuilder, OpenElement};
pub use object::{ObjectBuilder, OpenObject};
pub use pi::{OpenPI, PINodeBuilder};
pub use sequence::{ArrayBuilder, OpenArray, OpenSequence, SequenceBuilder};
pub use text::{write_comment_node, write_text_node};
pub use tree::{NodeTreeBuilder, OpenNodeTree, StringDictionaryBuilder};

use crate::storage::ValueStorage;
use std::ops::Range;
use tessera_types::{Result, ValueTag};

/// The part of an output buffer an open builder has claimed.
#[derive(Debug)]
pub(crate) struct Claim<'b> {
    out: &'b mut ValueStorage,
    start: usize,
    finished: bool,
}

impl<'b> Claim<'b> {
    pub(crate) fn open(out: &'b mut ValueStorage, tag: ValueTag) -> Result<Self> {
        let start = out.len();
        out.write_tag(tag)?;
        Ok(Self {
            out,
            start,
            finished: false,
        })
    }

    pub(crate) fn out(&mut self) -> &mut ValueStorage {
        self.out
    }

    /// Absolute offset of `offset` bytes past the tag.
    pub(crate) fn payload_offset(&self, offset: usize) -> usize {
        self.start + 1 + offset
    }

    pub(crate) fn finish(mut self) -> Range<usize> {
        self.finished = true;
        self.start..self.out.len()
    }
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.out.truncate(self.start);
        }
    }
}

/// Kinds allowed as children of elements and documents.
pub(crate) fn is_child_node(tag: ValueTag) -> bool {
    matches!(
        tag,
        ValueTag::ElementNode | ValueTag::TextNode | ValueTag::CommentNode | ValueTag::PiNode
    )
}
