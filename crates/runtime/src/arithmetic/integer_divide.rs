use super::{ArithmeticOperation, write_checked_integer};
use crate::context::DynamicContext;
use rust_decimal::prelude::ToPrimitive;
use tessera_datamodel::{ValueStorage, XsDecimal};
use tessera_types::{Result, SystemError};

/// `idiv`: the quotient truncated toward zero, always an xs:integer.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerDivide;

fn truncate_float(left: f64, right: f64) -> Result<Option<i64>> {
    if right == 0.0 {
        return Err(SystemError::DivisionByZero);
    }
    if left.is_nan() || right.is_nan() || left.is_infinite() {
        return Err(SystemError::overflow(format!("{left} idiv {right}")));
    }
    let quotient = (left / right).trunc();
    if quotient < i64::MIN as f64 || quotient >= i64::MAX as f64 {
        return Ok(None);
    }
    Ok(Some(quotient as i64))
}

impl ArithmeticOperation for IntegerDivide {
    fn name(&self) -> &'static str {
        "integer-divide"
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
        write_checked_integer(out, left.checked_div(right))
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
        let quotient = left
            .to_decimal()?
            .checked_div(right.to_decimal()?)
            .and_then(|q| q.trunc().to_i64());
        write_checked_integer(out, quotient)
    }

    fn float_float(&self, left: f32, right: f32, out: &mut ValueStorage) -> Result<()> {
        write_checked_integer(out, truncate_float(left as f64, right as f64)?)
    }

    fn double_double(&self, left: f64, right: f64, out: &mut ValueStorage) -> Result<()> {
        write_checked_integer(out, truncate_float(left, right)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_datamodel::pointable::IntegerPointable;
    use tessera_types::ErrorCode;

    fn integer_result(out: &ValueStorage) -> i64 {
        out.tagged().unwrap().get::<IntegerPointable>().unwrap().as_i64()
    }

    #[test]
    fn test_truncates_toward_zero() {
        let ctx = DynamicContext::default();
        let mut out = ValueStorage::new();
        IntegerDivide.integer_integer(-7, 2, &ctx, &mut out).unwrap();
        assert_eq!(integer_result(&out), -3);

        let mut out = ValueStorage::new();
        IntegerDivide
            .decimal_decimal(XsDecimal::new(75, 1), XsDecimal::new(2, 0), &ctx, &mut out)
            .unwrap();
        assert_eq!(integer_result(&out), 3);

        let mut out = ValueStorage::new();
        IntegerDivide.double_double(5.0, f64::INFINITY, &mut out).unwrap();
        assert_eq!(integer_result(&out), 0);
    }

    #[test]
    fn test_error_codes() {
        let ctx = DynamicContext::default();
        let code = |r: Result<()>| r.unwrap_err().code();
        assert_eq!(
            code(IntegerDivide.integer_integer(1, 0, &ctx, &mut ValueStorage::new())),
            ErrorCode::FOAR0001
        );
        assert_eq!(
            code(IntegerDivide.integer_integer(i64::MIN, -1, &ctx, &mut ValueStorage::new())),
            ErrorCode::FOAR0002
        );
        assert_eq!(
            code(IntegerDivide.double_double(1.0, 0.0, &mut ValueStorage::new())),
            ErrorCode::FOAR0001
        );
        assert_eq!(
            code(IntegerDivide.double_double(f64::NAN, 2.0, &mut ValueStorage::new())),
            ErrorCode::FOAR0002
        );
        assert_eq!(
            code(IntegerDivide.float_float(f32::INFINITY, 2.0, &mut ValueStorage::new())),
            ErrorCode::FOAR0002
        );
        assert_eq!(
            code(IntegerDivide.double_double(1e300, 1e-10, &mut ValueStorage::new())),
            ErrorCode::FOAR0002
        );
    }
}
