use proptest::prelude::*;
use tessera_datamodel::{ValueStorage, XsDecimal, codec};
use tessera_runtime::format::{digit_count, write_padded_number};
use tessera_runtime::{
    ArithmeticOperator, ComparisonOperator, DynamicContext, apply_arithmetic,
    compare_tagged_values,
};
use tessera_types::ValueTag;

#[derive(Debug, Clone)]
enum Operand {
    Integer(i64),
    Decimal(i64, i8),
    Double(f64),
}

impl Operand {
    fn encode(&self) -> ValueStorage {
        let mut out = ValueStorage::new();
        match *self {
            Operand::Integer(v) => codec::write_integer(&mut out, ValueTag::Integer, v),
            Operand::Decimal(m, s) => codec::write_decimal(&mut out, XsDecimal::new(m, s)),
            Operand::Double(v) => codec::write_double(&mut out, v),
        }
        .unwrap();
        out
    }
}

fn operand() -> impl Strategy<Value = Operand> {
    prop_oneof![
        (-1_000_000i64..1_000_000).prop_map(Operand::Integer),
        ((-1_000_000i64..1_000_000), 0i8..6).prop_map(|(m, s)| Operand::Decimal(m, s)),
        prop_oneof![
            (-1.0e6f64..1.0e6).boxed(),
            Just(f64::NAN).boxed(),
            Just(f64::INFINITY).boxed(),
        ]
        .prop_map(Operand::Double),
    ]
}

fn compare(op: ComparisonOperator, a: &ValueStorage, b: &ValueStorage) -> bool {
    let ctx = DynamicContext::default();
    compare_tagged_values(op, a.tagged().unwrap(), b.tagged().unwrap(), &ctx).unwrap()
}

proptest! {
    #[test]
    fn comparison_is_symmetric(a in operand(), b in operand()) {
        let (a, b) = (a.encode(), b.encode());
        prop_assert_eq!(
            compare(ComparisonOperator::Lt, &a, &b),
            compare(ComparisonOperator::Gt, &b, &a)
        );
        prop_assert_eq!(
            compare(ComparisonOperator::Eq, &a, &b),
            compare(ComparisonOperator::Eq, &b, &a)
        );
        prop_assert_eq!(
            compare(ComparisonOperator::Le, &a, &b),
            compare(ComparisonOperator::Ge, &b, &a)
        );
    }

    #[test]
    fn ne_negates_eq(a in operand(), b in operand()) {
        let (a, b) = (a.encode(), b.encode());
        prop_assert_eq!(
            compare(ComparisonOperator::Ne, &a, &b),
            !compare(ComparisonOperator::Eq, &a, &b)
        );
    }

    #[test]
    fn commutative_operators_are_byte_identical_when_swapped(
        a in operand(),
        b in operand(),
        multiply in any::<bool>(),
    ) {
        let op = if multiply { ArithmeticOperator::Multiply } else { ArithmeticOperator::Add };
        let ctx = DynamicContext::default();
        let (a, b) = (a.encode(), b.encode());
        let mut forward = ValueStorage::new();
        let mut backward = ValueStorage::new();
        let (a, b) = (a.tagged().unwrap(), b.tagged().unwrap());
        let left = apply_arithmetic(op, a, b, &ctx, &mut forward);
        let right = apply_arithmetic(op, b, a, &ctx, &mut backward);
        prop_assert_eq!(left.is_ok(), right.is_ok());
        // NaN payloads compare unequal as floats but encode identically.
        prop_assert_eq!(forward.as_bytes(), backward.as_bytes());
    }

    #[test]
    fn padded_numbers_parse_back(value in any::<i64>(), min_digits in 0u32..25) {
        let mut out = Vec::new();
        write_padded_number(value, min_digits, &mut out);
        let text = String::from_utf8(out).unwrap();
        prop_assert_eq!(text.parse::<i64>().unwrap(), value);
        let digits = text.trim_start_matches('-');
        prop_assert!(digits.len() as u32 >= min_digits);
        prop_assert!(digits.len() as u32 >= digit_count(value.unsigned_abs()));
    }

    #[test]
    fn digit_count_matches_rendering(value in any::<u64>()) {
        prop_assert_eq!(digit_count(value) as usize, value.to_string().len());
    }
}
