//! `ne`, `gt`, `le` and `ge`, each expressed through [`ValueEq`] and
//! [`ValueLt`] so every operator sees the same pair semantics.

use super::{ValueComparison, ValueEq, ValueLt};
use crate::context::DynamicContext;
use tessera_datamodel::{XsDate, XsDateTime, XsDecimal, XsDuration, XsTime};
use tessera_types::Result;

/// Pair methods that combine the `eq` and `lt` answers for the same pair.
macro_rules! derived_pair_methods {
    (
        |$eq:ident, $lt:ident, $l:ident, $r:ident| $body:expr;
        plain: [$($method:ident($t:ty)),* $(,)?];
        contextual: [$($cmethod:ident($ct:ty)),* $(,)?] $(;)?
    ) => {
        $(
            fn $method(&self, left: $t, right: $t) -> Result<bool> {
                let $eq = |a: $t, b: $t| ValueEq.$method(a, b);
                let $lt = |a: $t, b: $t| ValueLt.$method(a, b);
                let ($l, $r) = (left, right);
                $body
            }
        )*
        $(
            fn $cmethod(&self, left: $ct, right: $ct, ctx: &DynamicContext) -> Result<bool> {
                let $eq = |a: $ct, b: $ct| ValueEq.$cmethod(a, b, ctx);
                let $lt = |a: $ct, b: $ct| ValueLt.$cmethod(a, b, ctx);
                let ($l, $r) = (left, right);
                $body
            }
        )*
    };
}

macro_rules! derived_comparison {
    (
        $(#[$meta:meta])*
        $ty:ident, $name:literal, |$eq:ident, $lt:ident, $l:ident, $r:ident| $body:expr
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $ty;

        impl ValueComparison for $ty {
            fn name(&self) -> &'static str {
                $name
            }

            derived_pair_methods!(
                |$eq, $lt, $l, $r| $body;
                plain: [
                    boolean_boolean(bool),
                    integer_integer(i64),
                    decimal_decimal(XsDecimal),
                    float_float(f32),
                    double_double(f64),
                    string_string(&[u8]),
                    any_uri_any_uri(&[u8]),
                    duration_duration(XsDuration),
                    day_time_duration_day_time_duration(i64),
                    year_month_duration_year_month_duration(i32),
                    hex_binary_hex_binary(&[u8]),
                    base64_binary_base64_binary(&[u8]),
                    qname_qname((&[u8], &[u8])),
                ];
                contextual: [
                    date_date(&XsDate),
                    datetime_datetime(&XsDateTime),
                    time_time(&XsTime),
                    gregorian_gregorian(&XsDate),
                ];
            );
        }
    };
}

derived_comparison!(
    /// `a ne b` is `not(a eq b)`; true when either side is NaN.
    ValueNe,
    "ne",
    |eq, _lt, l, r| Ok(!eq(l, r)?)
);

derived_comparison!(
    /// `a gt b` is `b lt a`.
    ValueGt,
    "gt",
    |_eq, lt, l, r| lt(r, l)
);

derived_comparison!(
    /// `a le b` is `a lt b or a eq b`.
    ValueLe,
    "le",
    |eq, lt, l, r| Ok(lt(l, r)? || eq(l, r)?)
);

derived_comparison!(
    /// `a ge b` is `b lt a or a eq b`.
    ValueGe,
    "ge",
    |eq, lt, l, r| Ok(lt(r, l)? || eq(l, r)?)
);
