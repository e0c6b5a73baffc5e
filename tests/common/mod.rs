#![allow(dead_code)]

use std::sync::Once;
use tessera::datamodel::builder::SequenceBuilder;
use tessera::datamodel::codec;
use tessera::{Result, ValueStorage, ValueTag};

pub type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

static INIT: Once = Once::new();

/// Routes `log` output through the test harness; safe to call from every test.
pub fn init_logging() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

pub fn encode(fill: impl FnOnce(&mut ValueStorage) -> Result<()>) -> Result<ValueStorage> {
    let mut out = ValueStorage::new();
    fill(&mut out)?;
    Ok(out)
}

pub fn integer(value: i64) -> Result<ValueStorage> {
    encode(|out| codec::write_integer(out, ValueTag::Integer, value))
}

/// A sequence of `xs:integer` items.
pub fn integer_sequence(values: &[i64]) -> Result<ValueStorage> {
    encode(|out| {
        let mut builder = SequenceBuilder::new();
        let mut open = builder.reset(out)?;
        for &value in values {
            open.item_with(|item| codec::write_integer(item, ValueTag::Integer, value))?;
        }
        open.finish().map(|_| ())
    })
}
