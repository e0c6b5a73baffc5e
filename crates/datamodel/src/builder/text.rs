use crate::codec::{MAX_VARIABLE_LENGTH, write_length_prefixed};
use crate::storage::ValueStorage;
use tessera_types::{Result, SystemError, ValueTag};

/// Writes a complete `TEXT_NODE` value.
pub fn write_text_node(out: &mut ValueStorage, local_node_id: i32, value: &str) -> Result<()> {
    write_leaf(out, ValueTag::TextNode, local_node_id, value)
}

/// Writes a complete `COMMENT_NODE` value.
pub fn write_comment_node(out: &mut ValueStorage, local_node_id: i32, value: &str) -> Result<()> {
    write_leaf(out, ValueTag::CommentNode, local_node_id, value)
}

fn write_leaf(
    out: &mut ValueStorage,
    tag: ValueTag,
    local_node_id: i32,
    value: &str,
) -> Result<()> {
    if value.len() > MAX_VARIABLE_LENGTH {
        return Err(SystemError::ValueTooLarge {
            size: value.len(),
            max: MAX_VARIABLE_LENGTH,
        });
    }
    let start = out.len();
    let written = out
        .write_tag(tag)
        .and_then(|()| out.write_i32(local_node_id))
        .and_then(|()| write_length_prefixed(out, value.as_bytes()));
    if let Err(err) = written {
        out.truncate(start);
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pointable::TextNodePointable;

    #[test]
    fn test_text_node_layout() {
        let mut out = ValueStorage::new();
        write_text_node(&mut out, 2, "hi").unwrap();
        assert_eq!(out.as_bytes(), &[105, 0, 0, 0, 2, 0, 2, b'h', b'i']);
        let text = out.tagged().unwrap().get::<TextNodePointable>().unwrap();
        assert_eq!(text.local_node_id(), 2);
        assert_eq!(text.tag(), ValueTag::TextNode);
    }

    #[test]
    fn test_partial_write_is_rolled_back() {
        let mut out = ValueStorage::with_limit(6);
        assert!(write_comment_node(&mut out, 0, "abc").is_err());
        assert!(out.is_empty());
    }
}
