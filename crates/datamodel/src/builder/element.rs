use super::{Claim, is_child_node};
use crate::slotted::SlottedArea;
use crate::storage::ValueStorage;
use crate::tagged::{
    ATTRIBUTES_CHUNK_FLAG, CHILDREN_CHUNK_FLAG, NAME_AND_ID_LEN, NS_CHUNK_FLAG, TaggedValue,
};
use crate::values::NodeName;
use std::ops::Range;
use tessera_types::{Result, SystemError, ValueTag};

/// Builds `ELEMENT_NODE` values.
///
/// Attributes and children are collected in scratch areas and merged into the
/// output at finish, after which the header flags are backpatched. A chunk is
/// only emitted, and its flag only set, when it has at least one entry.
#[derive(Debug, Default)]
pub struct ElementNodeBuilder {
    name: NodeName,
    local_node_id: i32,
    namespaces: Vec<(i32, i32)>,
    attributes: SlottedArea,
    children: SlottedArea,
}

impl ElementNodeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset<'b>(&'b mut self, out: &'b mut ValueStorage) -> Result<OpenElement<'b>> {
        self.name = NodeName::default();
        self.local_node_id = NodeName::NONE;
        self.namespaces.clear();
        self.attributes.clear(out.limit());
        self.children.clear(out.limit());

        let mut claim = Claim::open(out, ValueTag::ElementNode)?;
        claim.out().write_u8(0)?;
        claim.out().write_bytes(&[0xff; NAME_AND_ID_LEN])?;
        Ok(OpenElement {
            builder: self,
            claim,
        })
    }
}

#[derive(Debug)]
pub struct OpenElement<'b> {
    builder: &'b mut ElementNodeBuilder,
    claim: Claim<'b>,
}

impl OpenElement<'_> {
    pub fn set_name(&mut self, name: NodeName) {
        self.builder.name = name;
    }

    pub fn set_local_node_id(&mut self, id: i32) {
        self.builder.local_node_id = id;
    }

    pub fn add_namespace(&mut self, prefix: i32, uri: i32) {
        self.builder.namespaces.push((prefix, uri));
    }

    pub fn add_attribute(&mut self, attribute: TaggedValue<'_>) -> Result<()> {
        expect_kind(attribute.tag(), is_attribute, "an attribute node")?;
        self.builder.attributes.push_raw(attribute.bytes())
    }

    /// Builds an attribute in place, typically with an
    /// [`AttributeNodeBuilder`](super::AttributeNodeBuilder) bound to the
    /// scratch area passed to `fill`.
    pub fn attribute_with<F>(&mut self, fill: F) -> Result<()>
    where
        F: FnOnce(&mut ValueStorage) -> Result<()>,
    {
        self.builder.attributes.push_with(fill, is_attribute)
    }

    pub fn add_child(&mut self, child: TaggedValue<'_>) -> Result<()> {
        expect_kind(child.tag(), is_child_node, "a child node")?;
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
        let mut header = 0u8;
        let out = self.claim.out();
        if !builder.namespaces.is_empty() {
            header |= NS_CHUNK_FLAG;
            out.write_u32(u32::try_from(builder.namespaces.len())?)?;
            for &(prefix, uri) in &builder.namespaces {
                out.write_i32(prefix)?;
                out.write_i32(uri)?;
            }
        }
        if builder.attributes.len() > 0 {
            header |= ATTRIBUTES_CHUNK_FLAG;
            builder.attributes.write_to(out)?;
        }
        if builder.children.len() > 0 {
            header |= CHILDREN_CHUNK_FLAG;
            builder.children.write_to(out)?;
        }

        let header_at = self.claim.payload_offset(0);
        let out = self.claim.out();
        out.patch_u8(header_at, header)?;
        out.patch_i32(header_at + 1, builder.name.prefix)?;
        out.patch_i32(header_at + 5, builder.name.uri)?;
        out.patch_i32(header_at + 9, builder.name.local)?;
        out.patch_i32(header_at + 13, builder.local_node_id)?;
        Ok(self.claim.finish())
    }
}

fn is_attribute(tag: ValueTag) -> bool {
    tag == ValueTag::AttributeNode
}

fn expect_kind(tag: ValueTag, accepts: fn(ValueTag) -> bool, expected: &str) -> Result<()> {
    if accepts(tag) {
        Ok(())
    } else {
        Err(SystemError::type_error(format!(
            "expected {expected}, found {tag}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{AttributeNodeBuilder, write_text_node};
    use crate::codec;
    use crate::pointable::{ElementNodePointable, TextNodePointable};

    #[test]
    fn test_empty_element_has_no_chunks() {
        let mut out = ValueStorage::new();
        let mut builder = ElementNodeBuilder::new();
        let mut open = builder.reset(&mut out).unwrap();
        open.set_name(NodeName::new(-1, -1, 0));
        let range = open.finish().unwrap();
        assert_eq!(range.len(), 1 + 1 + NAME_AND_ID_LEN);

        let element = out.tagged().unwrap().get::<ElementNodePointable>().unwrap();
        assert_eq!(element.header(), 0);
        assert_eq!(element.name().local, 0);
        assert_eq!(element.local_node_id(), -1);
        assert_eq!(element.attribute_count(), 0);
        assert_eq!(element.child_count(), 0);
    }

    #[test]
    fn test_element_with_namespace_attribute_and_children() {
        let mut out = ValueStorage::new();
        let mut builder = ElementNodeBuilder::new();
        let mut attribute = AttributeNodeBuilder::new();
        let mut open = builder.reset(&mut out).unwrap();
        open.set_name(NodeName::new(0, 1, 2));
        open.set_local_node_id(7);
        open.add_namespace(0, 1);
        open.attribute_with(|scratch| {
            let mut attr = attribute.reset(scratch)?;
            attr.set_name(NodeName::new(-1, -1, 3));
            attr.value_with(|out| codec::write_string(out, ValueTag::UntypedAtomic, "v"))?;
            attr.finish().map(|_| ())
        })
        .unwrap();
        open.child_with(|scratch| write_text_node(scratch, 8, "hello"))
            .unwrap();
        open.child_with(|scratch| write_text_node(scratch, 9, "world"))
            .unwrap();
        open.finish().unwrap();

        let element = out.tagged().unwrap().get::<ElementNodePointable>().unwrap();
        assert_eq!(
            element.header(),
            NS_CHUNK_FLAG | ATTRIBUTES_CHUNK_FLAG | CHILDREN_CHUNK_FLAG
        );
        assert_eq!(element.name(), NodeName::new(0, 1, 2));
        assert_eq!(element.local_node_id(), 7);
        assert_eq!(element.namespace_count(), 1);
        assert_eq!(element.namespace(0).unwrap(), (0, 1));
        assert_eq!(element.attribute_count(), 1);
        assert_eq!(element.child_count(), 2);
        let text = element.child(1).unwrap().get::<TextNodePointable>().unwrap();
        assert_eq!(text.value().unwrap(), "world");
    }

    #[test]
    fn test_children_only_sets_children_flag() {
        let mut out = ValueStorage::new();
        let mut builder = ElementNodeBuilder::new();
        let mut open = builder.reset(&mut out).unwrap();
        open.child_with(|scratch| write_text_node(scratch, 1, "x"))
            .unwrap();
        open.finish().unwrap();
        let element = out.tagged().unwrap().get::<ElementNodePointable>().unwrap();
        assert_eq!(element.header(), CHILDREN_CHUNK_FLAG);
    }

    #[test]
    fn test_rejects_wrong_kinds() {
        let mut text = ValueStorage::new();
        write_text_node(&mut text, 1, "t").unwrap();

        let mut out = ValueStorage::new();
        let mut builder = ElementNodeBuilder::new();
        let mut open = builder.reset(&mut out).unwrap();
        let err = open.add_attribute(text.tagged().unwrap()).unwrap_err();
        assert_eq!(err.code().as_str(), "XPTY0004");
        assert!(open
            .child_with(|scratch| codec::write_boolean(scratch, true))
            .is_err());
        open.finish().unwrap();
        let element = out.tagged().unwrap().get::<ElementNodePointable>().unwrap();
        assert_eq!(element.header(), 0);
    }
}
