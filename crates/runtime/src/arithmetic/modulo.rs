use super::ArithmeticOperation;
use crate::context::DynamicContext;
use tessera_datamodel::{ValueStorage, XsDecimal, codec};
use tessera_types::{Result, SystemError, ValueTag};

/// `mod`. The result takes the sign of the dividend.
#[derive(Debug, Clone, Copy, Default)]
pub struct Modulo;

impl ArithmeticOperation for Modulo {
    fn name(&self) -> &'static str {
        "mod"
    }

    fn integer_integer(
        &self,
        left: i64,
        right: i64,
        _ctx: &DynamicContext,
        out: &mut ValueStorage,
    ) -> Result<()> {
        if right == 0 {
            return Err(SystemError::DivisionByZero);
        }
        codec::write_integer(out, ValueTag::Integer, left.wrapping_rem(right))
    }

    fn decimal_decimal(
        &self,
        left: XsDecimal,
        right: XsDecimal,
        _ctx: &DynamicContext,
        out: &mut ValueStorage,
    ) -> Result<()> {
        if right.is_zero() {
            return Err(SystemError::DivisionByZero);
        }
        let remainder = left
            .to_decimal()?
            .checked_rem(right.to_decimal()?)
            .ok_or_else(|| SystemError::overflow("xs:decimal modulus"))?;
        codec::write_decimal(out, XsDecimal::from_decimal(remainder)?)
    }

    fn float_float(&self, left: f32, right: f32, out: &mut ValueStorage) -> Result<()> {
        codec::write_float(out, left % right)
    }

    fn double_double(&self, left: f64, right: f64, out: &mut ValueStorage) -> Result<()> {
        codec::write_double(out, left % right)
    }
}
