use crate::cast::write_lexical_form;
use crate::context::DynamicContext;
use crate::evaluator::{
    NotSend, ScalarEvaluator, ScalarEvaluatorFactory, evaluate_into, for_each_item, optional_item,
};
use std::marker::PhantomData;
use tessera_datamodel::builder::{ObjectBuilder, PINodeBuilder};
use tessera_datamodel::pointable::{ObjectPointable, StringPointable};
use tessera_datamodel::{TaggedValue, ValueStorage};
use tessera_types::{Result, SystemError, ValueTag};

/// Computed processing-instruction constructor.
///
/// The target must be a single string-like item. Content items are rendered
/// in their lexical form and joined with single spaces; empty content gives
/// an empty PI body.
#[derive(Debug)]
pub struct PIConstructorFactory {
    target: Box<dyn ScalarEvaluatorFactory>,
    content: Box<dyn ScalarEvaluatorFactory>,
}

impl PIConstructorFactory {
    pub fn new(
        target: Box<dyn ScalarEvaluatorFactory>,
        content: Box<dyn ScalarEvaluatorFactory>,
    ) -> Self {
        Self { target, content }
    }
}

impl ScalarEvaluatorFactory for PIConstructorFactory {
    fn name(&self) -> &'static str {
        "pi-constructor"
    }

    fn create_evaluator(&self, ctx: &DynamicContext) -> Result<Box<dyn ScalarEvaluator>> {
        log::debug!("Creating processing-instruction constructor evaluator");
        let limit = ctx.max_value_bytes();
        Ok(Box::new(PIConstructorEvaluator {
            target: self.target.create_evaluator(ctx)?,
            content: self.content.create_evaluator(ctx)?,
            target_value: ValueStorage::with_limit(limit),
            content_value: ValueStorage::with_limit(limit),
            text: Vec::new(),
            builder: PINodeBuilder::new(),
            _marker: PhantomData,
        }))
    }
}

struct PIConstructorEvaluator {
    target: Box<dyn ScalarEvaluator>,
    content: Box<dyn ScalarEvaluator>,
    target_value: ValueStorage,
    content_value: ValueStorage,
    text: Vec<u8>,
    builder: PINodeBuilder,
    _marker: NotSend,
}

impl ScalarEvaluator for PIConstructorEvaluator {
    fn evaluate(&mut self, args: &[TaggedValue<'_>], result: &mut ValueStorage) -> Result<()> {
        let target = evaluate_into(self.target.as_mut(), args, &mut self.target_value)?;
        let target = match optional_item(target)? {
            Some(item) if item.tag().is_string_like() => item.get::<StringPointable>()?.as_str()?,
            Some(item) => {
                return Err(SystemError::type_error(format!(
                    "processing-instruction target must be a string, found {}",
                    item.tag()
                )));
            }
            None => {
                return Err(SystemError::type_error(
                    "processing-instruction target is the empty sequence",
                ));
            }
        };

        let content = evaluate_into(self.content.as_mut(), args, &mut self.content_value)?;
        let text = &mut self.text;
        text.clear();
        for_each_item(content, |item| {
            if !text.is_empty() {
                text.push(b' ');
            }
            write_lexical_form(item, text)
        })?;
        let content = std::str::from_utf8(text)?;

        let mut open = self.builder.reset(result)?;
        open.set_target(target.trim())?;
        open.set_content(content.trim_start())?;
        open.finish().map(|_| ())
    }
}

/// JSONiq object union: merges the objects produced by every argument into
/// one. Empty arguments are skipped; a key seen twice fails with
/// `JNDY0003`.
#[derive(Debug)]
pub struct ObjectUnionFactory {
    args: Vec<Box<dyn ScalarEvaluatorFactory>>,
}

impl ObjectUnionFactory {
    pub fn new(args: Vec<Box<dyn ScalarEvaluatorFactory>>) -> Self {
        Self { args }
    }
}

impl ScalarEvaluatorFactory for ObjectUnionFactory {
    fn name(&self) -> &'static str {
        "object-union"
    }

    fn create_evaluator(&self, ctx: &DynamicContext) -> Result<Box<dyn ScalarEvaluator>> {
        log::debug!("Creating object union evaluator over {} arguments", self.args.len());
        let children = self
            .args
            .iter()
            .map(|arg| arg.create_evaluator(ctx))
            .collect::<Result<Vec<_>>>()?;
        let values = (0..children.len())
            .map(|_| ValueStorage::with_limit(ctx.max_value_bytes()))
            .collect();
        Ok(Box::new(ObjectUnionEvaluator {
            children,
            values,
            builder: ObjectBuilder::new(),
            _marker: PhantomData,
        }))
    }
}

struct ObjectUnionEvaluator {
    children: Vec<Box<dyn ScalarEvaluator>>,
    values: Vec<ValueStorage>,
    builder: ObjectBuilder,
    _marker: NotSend,
}

impl ScalarEvaluator for ObjectUnionEvaluator {
    fn evaluate(&mut self, args: &[TaggedValue<'_>], result: &mut ValueStorage) -> Result<()> {
        for (child, value) in self.children.iter_mut().zip(self.values.iter_mut()) {
            evaluate_into(child.as_mut(), args, value)?;
        }

        let mut open = self.builder.reset(result)?;
        for value in &self.values {
            for_each_item(value.tagged()?, |item| {
                if item.tag() != ValueTag::Object {
                    return Err(SystemError::type_error(format!(
                        "object union expects objects, found {}",
                        item.tag()
                    )));
                }
                let object = item.get::<ObjectPointable>()?;
                for index in 0..object.len() {
                    let (key, entry) = object.entry(index)?;
                    open.add_item(key, entry)?;
                }
                Ok(())
            })?;
        }
        open.finish().map(|_| ())
    }
}
