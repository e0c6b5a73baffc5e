use crate::context::DynamicContext;
use crate::evaluator::{NotSend, ScalarEvaluator, ScalarEvaluatorFactory};
use std::marker::PhantomData;
use tessera_datamodel::{TaggedValue, ValueStorage};
use tessera_types::{Result, SystemError};

/// Reads one field of the input tuple.
#[derive(Debug, Clone)]
pub struct FieldAccessFactory {
    index: usize,
}

impl FieldAccessFactory {
    pub fn new(index: usize) -> Self {
        Self { index }
    }
}

impl ScalarEvaluatorFactory for FieldAccessFactory {
    fn name(&self) -> &'static str {
        "field-access"
    }

    fn create_evaluator(&self, _ctx: &DynamicContext) -> Result<Box<dyn ScalarEvaluator>> {
        log::debug!("Creating field access evaluator for field {}", self.index);
        Ok(Box::new(FieldAccessEvaluator {
            index: self.index,
            _marker: PhantomData,
        }))
    }
}

struct FieldAccessEvaluator {
    index: usize,
    _marker: NotSend,
}

impl ScalarEvaluator for FieldAccessEvaluator {
    fn evaluate(&mut self, args: &[TaggedValue<'_>], result: &mut ValueStorage) -> Result<()> {
        let field = args.get(self.index).ok_or_else(|| {
            SystemError::internal(format!(
                "tuple has {} fields, field {} requested",
                args.len(),
                self.index
            ))
        })?;
        result.write_bytes(field.bytes())
    }
}

/// A literal value, encoded once when the expression is compiled.
#[derive(Debug, Clone)]
pub struct ConstantFactory {
    bytes: Vec<u8>,
}

impl ConstantFactory {
    /// Wraps `bytes`, which must hold exactly one encoded value.
    pub fn new(bytes: Vec<u8>) -> Result<Self> {
        TaggedValue::new(&bytes)?;
        Ok(Self { bytes })
    }

    /// Encodes the constant with `fill`.
    pub fn encode_with<F>(fill: F) -> Result<Self>
    where
        F: FnOnce(&mut ValueStorage) -> Result<()>,
    {
        let mut storage = ValueStorage::new();
        fill(&mut storage)?;
        Self::new(storage.as_bytes().to_vec())
    }

    pub fn value(&self) -> Result<TaggedValue<'_>> {
        TaggedValue::new(&self.bytes)
    }
}

impl ScalarEvaluatorFactory for ConstantFactory {
    fn name(&self) -> &'static str {
        "constant"
    }

    fn create_evaluator(&self, _ctx: &DynamicContext) -> Result<Box<dyn ScalarEvaluator>> {
        log::debug!("Creating constant evaluator ({} bytes)", self.bytes.len());
        Ok(Box::new(ConstantEvaluator {
            bytes: self.bytes.clone(),
            _marker: PhantomData,
        }))
    }
}

struct ConstantEvaluator {
    bytes: Vec<u8>,
    _marker: NotSend,
}

impl ScalarEvaluator for ConstantEvaluator {
    fn evaluate(&mut self, _args: &[TaggedValue<'_>], result: &mut ValueStorage) -> Result<()> {
        result.write_bytes(&self.bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_datamodel::codec;
    use tessera_datamodel::pointable::IntegerPointable;
    use tessera_types::{ErrorCode, ValueTag};

    #[test]
    fn test_field_access() {
        let mut a = ValueStorage::new();
        codec::write_integer(&mut a, ValueTag::Integer, 10).unwrap();
        let mut b = ValueStorage::new();
        codec::write_boolean(&mut b, true).unwrap();
        let tuple = [a.tagged().unwrap(), b.tagged().unwrap()];

        let ctx = DynamicContext::default();
        let mut evaluator = FieldAccessFactory::new(1).create_evaluator(&ctx).unwrap();
        let mut out = ValueStorage::new();
        evaluator.evaluate(&tuple, &mut out).unwrap();
        assert_eq!(out.as_bytes(), b.as_bytes());

        let mut missing = FieldAccessFactory::new(2).create_evaluator(&ctx).unwrap();
        let err = missing.evaluate(&tuple, &mut ValueStorage::new()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::SYSE0001);
    }

    #[test]
    fn test_constant() {
        let factory =
            ConstantFactory::encode_with(|s| codec::write_integer(s, ValueTag::Long, 9)).unwrap();
        let mut evaluator = factory.create_evaluator(&DynamicContext::default()).unwrap();
        let mut out = ValueStorage::new();
        evaluator.evaluate(&[], &mut out).unwrap();
        assert_eq!(out.tagged().unwrap().get::<IntegerPointable>().unwrap().as_i64(), 9);

        assert!(ConstantFactory::new(vec![ValueTag::Integer.code()]).is_err());
    }
}
