use proptest::prelude::*;
use tessera_datamodel::builder::{ElementNodeBuilder, SequenceBuilder, write_text_node};
use tessera_datamodel::codec;
use tessera_datamodel::pointable::{ElementNodePointable, SequencePointable, StringPointable};
use tessera_datamodel::tagged::{ATTRIBUTES_CHUNK_FLAG, CHILDREN_CHUNK_FLAG, NS_CHUNK_FLAG};
use tessera_datamodel::{NodeName, ValueStorage, encoded_len};
use tessera_types::ValueTag;

proptest! {
    #[test]
    fn sequence_slots_delimit_each_item(items in prop::collection::vec(".{0,12}", 0..16)) {
        let mut out = ValueStorage::new();
        let mut builder = SequenceBuilder::new();
        let mut open = builder.reset(&mut out).unwrap();
        for item in &items {
            open.item_with(|out| codec::write_string(out, ValueTag::String, item)).unwrap();
        }
        open.finish().unwrap();

        prop_assert_eq!(encoded_len(out.as_bytes()).unwrap(), out.len());
        let seq = out.tagged().unwrap().get::<SequencePointable>().unwrap();
        prop_assert_eq!(seq.len(), items.len());
        let mut start = 0u32;
        for (i, item) in items.iter().enumerate() {
            let end = seq.slot(i).unwrap();
            prop_assert_eq!(end - start, 3 + item.len() as u32);
            let value = seq.get(i).unwrap().get::<StringPointable>().unwrap();
            prop_assert_eq!(value.as_str().unwrap(), item.as_str());
            start = end;
        }
    }

    #[test]
    fn element_chunk_flags_match_counts(
        namespaces in 0usize..3,
        attributes in 0usize..3,
        children in 0usize..3,
    ) {
        let mut out = ValueStorage::new();
        let mut builder = ElementNodeBuilder::new();
        let mut attribute = tessera_datamodel::builder::AttributeNodeBuilder::new();
        let mut open = builder.reset(&mut out).unwrap();
        open.set_name(NodeName::new(-1, -1, 0));
        for i in 0..namespaces {
            open.add_namespace(i as i32, i as i32 + 10);
        }
        for i in 0..attributes {
            open.attribute_with(|scratch| {
                let mut attr = attribute.reset(scratch)?;
                attr.set_name(NodeName::new(-1, -1, i as i32));
                attr.value_with(|out| codec::write_boolean(out, true))?;
                attr.finish().map(|_| ())
            }).unwrap();
        }
        for i in 0..children {
            open.child_with(|scratch| write_text_node(scratch, i as i32, "t")).unwrap();
        }
        open.finish().unwrap();

        prop_assert_eq!(encoded_len(out.as_bytes()).unwrap(), out.len());
        let element = out.tagged().unwrap().get::<ElementNodePointable>().unwrap();
        prop_assert_eq!(element.header() & NS_CHUNK_FLAG != 0, namespaces > 0);
        prop_assert_eq!(element.header() & ATTRIBUTES_CHUNK_FLAG != 0, attributes > 0);
        prop_assert_eq!(element.header() & CHILDREN_CHUNK_FLAG != 0, children > 0);
        prop_assert_eq!(element.namespace_count(), namespaces);
        prop_assert_eq!(element.attribute_count(), attributes);
        prop_assert_eq!(element.child_count(), children);
    }
}
