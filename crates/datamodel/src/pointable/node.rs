use super::{Pointable, expect_payload};
use crate::bytes::{read_i32, read_length_prefixed, read_u8, read_u32, slice};
use crate::slotted::SlottedRegion;
use crate::tagged::{
    ATTRIBUTES_CHUNK_FLAG, CHILDREN_CHUNK_FLAG, DICTIONARY_FLAG, NAME_AND_ID_LEN, NS_CHUNK_FLAG,
    TaggedValue,
};
use crate::values::NodeName;
use tessera_types::{Result, SystemError, ValueTag};

fn read_name(payload: &[u8], at: usize) -> Result<NodeName> {
    Ok(NodeName::new(
        read_i32(payload, at)?,
        read_i32(payload, at + 4)?,
        read_i32(payload, at + 8)?,
    ))
}

#[derive(Debug, Clone, Copy)]
pub struct ElementNodePointable<'a> {
    header: u8,
    name: NodeName,
    local_node_id: i32,
    namespaces: &'a [u8],
    attributes: SlottedRegion<'a>,
    children: SlottedRegion<'a>,
}

impl<'a> ElementNodePointable<'a> {
    pub fn header(&self) -> u8 {
        self.header
    }

    pub fn name(&self) -> NodeName {
        self.name
    }

    pub fn local_node_id(&self) -> i32 {
        self.local_node_id
    }

    pub fn namespace_count(&self) -> usize {
        self.namespaces.len() / 8
    }

    /// Prefix and uri codes of namespace binding `index`.
    pub fn namespace(&self, index: usize) -> Result<(i32, i32)> {
        let at = index * 8;
        Ok((
            read_i32(self.namespaces, at)?,
            read_i32(self.namespaces, at + 4)?,
        ))
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    pub fn attribute(&self, index: usize) -> Result<TaggedValue<'a>> {
        self.attributes.item(index)
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn child(&self, index: usize) -> Result<TaggedValue<'a>> {
        self.children.item(index)
    }

    pub fn children(&self) -> SlottedRegion<'a> {
        self.children
    }
}

impl<'a> Pointable<'a> for ElementNodePointable<'a> {
    fn bind(value: TaggedValue<'a>) -> Result<Self> {
        let payload = expect_payload(
            value,
            value.tag() == ValueTag::ElementNode,
            "an element node",
            1 + NAME_AND_ID_LEN,
        )?;
        let header = read_u8(payload, 0)?;
        let name = read_name(payload, 1)?;
        let local_node_id = read_i32(payload, 13)?;
        let mut at = 1 + NAME_AND_ID_LEN;

        let mut namespaces: &'a [u8] = &[];
        if header & NS_CHUNK_FLAG != 0 {
            let count = read_u32(payload, at)? as usize;
            namespaces = slice(payload, at + 4, count * 8)?;
            at += 4 + count * 8;
        }
        let mut attributes: SlottedRegion<'a> = SlottedRegion::EMPTY;
        if header & ATTRIBUTES_CHUNK_FLAG != 0 {
            let (region, end) = SlottedRegion::parse(payload, at)?;
            attributes = region;
            at = end;
        }
        let mut children: SlottedRegion<'a> = SlottedRegion::EMPTY;
        if header & CHILDREN_CHUNK_FLAG != 0 {
            children = SlottedRegion::parse(payload, at)?.0;
        }
        Ok(Self {
            header,
            name,
            local_node_id,
            namespaces,
            attributes,
            children,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AttributeNodePointable<'a> {
    name: NodeName,
    local_node_id: i32,
    value: TaggedValue<'a>,
}

impl<'a> AttributeNodePointable<'a> {
    pub fn name(&self) -> NodeName {
        self.name
    }

    pub fn local_node_id(&self) -> i32 {
        self.local_node_id
    }

    /// The typed value of the attribute.
    pub fn value(&self) -> TaggedValue<'a> {
        self.value
    }
}

impl<'a> Pointable<'a> for AttributeNodePointable<'a> {
    fn bind(value: TaggedValue<'a>) -> Result<Self> {
        let payload = expect_payload(
            value,
            value.tag() == ValueTag::AttributeNode,
            "an attribute node",
            1 + NAME_AND_ID_LEN,
        )?;
        Ok(Self {
            name: read_name(payload, 1)?,
            local_node_id: read_i32(payload, 13)?,
            value: TaggedValue::new(&payload[1 + NAME_AND_ID_LEN..])?,
        })
    }
}

/// Accessor for text and comment nodes.
#[derive(Debug, Clone, Copy)]
pub struct TextNodePointable<'a> {
    tag: ValueTag,
    local_node_id: i32,
    value: &'a [u8],
}

impl<'a> TextNodePointable<'a> {
    pub fn tag(&self) -> ValueTag {
        self.tag
    }

    pub fn local_node_id(&self) -> i32 {
        self.local_node_id
    }

    pub fn value(&self) -> Result<&'a str> {
        Ok(std::str::from_utf8(self.value)?)
    }
}

impl<'a> Pointable<'a> for TextNodePointable<'a> {
    fn bind(value: TaggedValue<'a>) -> Result<Self> {
        let accepts = matches!(value.tag(), ValueTag::TextNode | ValueTag::CommentNode);
        let payload = expect_payload(value, accepts, "a text or comment node", 6)?;
        Ok(Self {
            tag: value.tag(),
            local_node_id: read_i32(payload, 0)?,
            value: read_length_prefixed(payload, 4)?.0,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PINodePointable<'a> {
    local_node_id: i32,
    target: &'a [u8],
    content: &'a [u8],
}

impl<'a> PINodePointable<'a> {
    pub fn local_node_id(&self) -> i32 {
        self.local_node_id
    }

    pub fn target(&self) -> Result<&'a str> {
        Ok(std::str::from_utf8(self.target)?)
    }

    pub fn content(&self) -> Result<&'a str> {
        Ok(std::str::from_utf8(self.content)?)
    }
}

impl<'a> Pointable<'a> for PINodePointable<'a> {
    fn bind(value: TaggedValue<'a>) -> Result<Self> {
        let payload = expect_payload(
            value,
            value.tag() == ValueTag::PiNode,
            "a processing-instruction node",
            8,
        )?;
        let (target, at) = read_length_prefixed(payload, 4)?;
        let (content, _) = read_length_prefixed(payload, at)?;
        Ok(Self {
            local_node_id: read_i32(payload, 0)?,
            target,
            content,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DocumentNodePointable<'a> {
    local_node_id: i32,
    children: SlottedRegion<'a>,
}

impl<'a> DocumentNodePointable<'a> {
    pub fn local_node_id(&self) -> i32 {
        self.local_node_id
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn child(&self, index: usize) -> Result<TaggedValue<'a>> {
        self.children.item(index)
    }
}

impl<'a> Pointable<'a> for DocumentNodePointable<'a> {
    fn bind(value: TaggedValue<'a>) -> Result<Self> {
        let payload = expect_payload(
            value,
            value.tag() == ValueTag::DocumentNode,
            "a document node",
            8,
        )?;
        Ok(Self {
            local_node_id: read_i32(payload, 0)?,
            children: SlottedRegion::parse(payload, 4)?.0,
        })
    }
}

/// Accessor for the string dictionary of a node tree.
#[derive(Debug, Clone, Copy)]
pub struct DictionaryPointable<'a> {
    strings: SlottedRegion<'a>,
}

impl<'a> DictionaryPointable<'a> {
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn lookup(&self, code: i32) -> Result<&'a str> {
        let index = usize::try_from(code)
            .map_err(|_| SystemError::internal(format!("invalid dictionary code {code}")))?;
        Ok(std::str::from_utf8(self.strings.item_bytes(index)?)?)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NodeTreePointable<'a> {
    dictionary: Option<DictionaryPointable<'a>>,
    root: TaggedValue<'a>,
}

impl<'a> NodeTreePointable<'a> {
    pub fn dictionary(&self) -> Option<DictionaryPointable<'a>> {
        self.dictionary
    }

    pub fn root(&self) -> TaggedValue<'a> {
        self.root
    }
}

impl<'a> Pointable<'a> for NodeTreePointable<'a> {
    fn bind(value: TaggedValue<'a>) -> Result<Self> {
        let payload = expect_payload(value, value.tag() == ValueTag::NodeTree, "a node tree", 2)?;
        let header = read_u8(payload, 0)?;
        let mut at = 1;
        let mut dictionary = None;
        if header & DICTIONARY_FLAG != 0 {
            let len = read_u32(payload, at)? as usize;
            let block = slice(payload, at + 4, len)?;
            dictionary = Some(DictionaryPointable {
                strings: SlottedRegion::parse(block, 0)?.0,
            });
            at += 4 + len;
        }
        Ok(Self {
            dictionary,
            root: TaggedValue::new(&payload[at..])?,
        })
    }
}
