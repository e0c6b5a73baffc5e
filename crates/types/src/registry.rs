//! Static atomic type hierarchy and canonical type normalization.
//!
//! Every atomic type has exactly one base type, rooted at `xs:anyAtomicType`.
//! Operator dispatch never looks at concrete types directly: both operands are
//! first walked up the hierarchy until they reach one of the small set of
//! [`CanonicalType`] groups the engines implement pair methods for.

use crate::error::{Result, SystemError};
use crate::tag::ValueTag;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Upper bound on base-type hops when normalizing a type.
pub const MAX_TYPE_DEPTH: usize = 64;

/// First id handed out to types registered through [`TypeRegistryBuilder`].
pub const FIRST_DERIVED_TYPE_ID: u16 = 1024;

/// Identifier of a type in a [`TypeRegistry`].
///
/// Builtin atomic types use their tag code as id, so every [`ValueTag`] has a
/// matching `TypeId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u16);

impl TypeId {
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u16 {
        self.0
    }

    /// The builtin tag this id stands for, if it is not a derived type.
    pub const fn as_builtin_tag(self) -> Option<ValueTag> {
        if self.0 <= u8::MAX as u16 {
            ValueTag::from_u8(self.0 as u8)
        } else {
            None
        }
    }
}

impl From<ValueTag> for TypeId {
    fn from(tag: ValueTag) -> Self {
        Self(tag.code() as u16)
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The dispatch groups the comparison and arithmetic engines operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalType {
    UntypedAtomic,
    String,
    NormalizedString,
    Token,
    Language,
    NmToken,
    Name,
    NcName,
    Id,
    IdRef,
    Entity,
    AnyUri,
    Decimal,
    Integer,
    Float,
    Double,
    Boolean,
    Duration,
    DayTimeDuration,
    YearMonthDuration,
    DateTime,
    Date,
    Time,
    GYearMonth,
    GYear,
    GMonthDay,
    GDay,
    GMonth,
    HexBinary,
    Base64Binary,
    QName,
}

impl CanonicalType {
    pub const ALL: &'static [CanonicalType] = &[
        CanonicalType::UntypedAtomic,
        CanonicalType::String,
        CanonicalType::NormalizedString,
        CanonicalType::Token,
        CanonicalType::Language,
        CanonicalType::NmToken,
        CanonicalType::Name,
        CanonicalType::NcName,
        CanonicalType::Id,
        CanonicalType::IdRef,
        CanonicalType::Entity,
        CanonicalType::AnyUri,
        CanonicalType::Decimal,
        CanonicalType::Integer,
        CanonicalType::Float,
        CanonicalType::Double,
        CanonicalType::Boolean,
        CanonicalType::Duration,
        CanonicalType::DayTimeDuration,
        CanonicalType::YearMonthDuration,
        CanonicalType::DateTime,
        CanonicalType::Date,
        CanonicalType::Time,
        CanonicalType::GYearMonth,
        CanonicalType::GYear,
        CanonicalType::GMonthDay,
        CanonicalType::GDay,
        CanonicalType::GMonth,
        CanonicalType::HexBinary,
        CanonicalType::Base64Binary,
        CanonicalType::QName,
    ];

    pub const fn tag(self) -> ValueTag {
        match self {
            CanonicalType::UntypedAtomic => ValueTag::UntypedAtomic,
            CanonicalType::String => ValueTag::String,
            CanonicalType::NormalizedString => ValueTag::NormalizedString,
            CanonicalType::Token => ValueTag::Token,
            CanonicalType::Language => ValueTag::Language,
            CanonicalType::NmToken => ValueTag::NmToken,
            CanonicalType::Name => ValueTag::Name,
            CanonicalType::NcName => ValueTag::NcName,
            CanonicalType::Id => ValueTag::Id,
            CanonicalType::IdRef => ValueTag::IdRef,
            CanonicalType::Entity => ValueTag::Entity,
            CanonicalType::AnyUri => ValueTag::AnyUri,
            CanonicalType::Decimal => ValueTag::Decimal,
            CanonicalType::Integer => ValueTag::Integer,
            CanonicalType::Float => ValueTag::Float,
            CanonicalType::Double => ValueTag::Double,
            CanonicalType::Boolean => ValueTag::Boolean,
            CanonicalType::Duration => ValueTag::Duration,
            CanonicalType::DayTimeDuration => ValueTag::DayTimeDuration,
            CanonicalType::YearMonthDuration => ValueTag::YearMonthDuration,
            CanonicalType::DateTime => ValueTag::DateTime,
            CanonicalType::Date => ValueTag::Date,
            CanonicalType::Time => ValueTag::Time,
            CanonicalType::GYearMonth => ValueTag::GYearMonth,
            CanonicalType::GYear => ValueTag::GYear,
            CanonicalType::GMonthDay => ValueTag::GMonthDay,
            CanonicalType::GDay => ValueTag::GDay,
            CanonicalType::GMonth => ValueTag::GMonth,
            CanonicalType::HexBinary => ValueTag::HexBinary,
            CanonicalType::Base64Binary => ValueTag::Base64Binary,
            CanonicalType::QName => ValueTag::QName,
        }
    }

    pub fn type_id(self) -> TypeId {
        TypeId::from(self.tag())
    }

    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            CanonicalType::Decimal
                | CanonicalType::Integer
                | CanonicalType::Float
                | CanonicalType::Double
        )
    }

    /// Members of the mutually comparable string family, including
    /// `xs:untypedAtomic` and `xs:anyURI`.
    pub const fn is_string_family(self) -> bool {
        matches!(
            self,
            CanonicalType::UntypedAtomic
                | CanonicalType::String
                | CanonicalType::NormalizedString
                | CanonicalType::Token
                | CanonicalType::Language
                | CanonicalType::NmToken
                | CanonicalType::Name
                | CanonicalType::NcName
                | CanonicalType::Id
                | CanonicalType::IdRef
                | CanonicalType::Entity
                | CanonicalType::AnyUri
        )
    }

    pub const fn is_duration(self) -> bool {
        matches!(
            self,
            CanonicalType::Duration
                | CanonicalType::DayTimeDuration
                | CanonicalType::YearMonthDuration
        )
    }

    pub const fn is_gregorian(self) -> bool {
        matches!(
            self,
            CanonicalType::GYearMonth
                | CanonicalType::GYear
                | CanonicalType::GMonthDay
                | CanonicalType::GDay
                | CanonicalType::GMonth
        )
    }

    fn for_arithmetic(tag: ValueTag) -> Option<Self> {
        use ValueTag as T;
        Some(match tag {
            T::String => CanonicalType::String,
            T::Decimal => CanonicalType::Decimal,
            T::Integer => CanonicalType::Integer,
            T::Float => CanonicalType::Float,
            T::Double => CanonicalType::Double,
            T::AnyUri => CanonicalType::AnyUri,
            T::Boolean => CanonicalType::Boolean,
            T::Date => CanonicalType::Date,
            T::DateTime => CanonicalType::DateTime,
            T::Time => CanonicalType::Time,
            T::DayTimeDuration => CanonicalType::DayTimeDuration,
            T::YearMonthDuration => CanonicalType::YearMonthDuration,
            T::Base64Binary => CanonicalType::Base64Binary,
            T::HexBinary => CanonicalType::HexBinary,
            T::QName => CanonicalType::QName,
            T::GDay => CanonicalType::GDay,
            T::GMonthDay => CanonicalType::GMonthDay,
            T::GMonth => CanonicalType::GMonth,
            T::GYearMonth => CanonicalType::GYearMonth,
            T::GYear => CanonicalType::GYear,
            T::UntypedAtomic => CanonicalType::UntypedAtomic,
            _ => return None,
        })
    }

    fn for_comparison(tag: ValueTag) -> Option<Self> {
        use ValueTag as T;
        if let Some(canonical) = Self::for_arithmetic(tag) {
            return Some(canonical);
        }
        Some(match tag {
            T::Duration => CanonicalType::Duration,
            T::NormalizedString => CanonicalType::NormalizedString,
            T::Token => CanonicalType::Token,
            T::Language => CanonicalType::Language,
            T::NmToken => CanonicalType::NmToken,
            T::Name => CanonicalType::Name,
            T::NcName => CanonicalType::NcName,
            T::Id => CanonicalType::Id,
            T::IdRef => CanonicalType::IdRef,
            T::Entity => CanonicalType::Entity,
            _ => return None,
        })
    }
}

impl fmt::Display for CanonicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag().name())
    }
}

#[derive(Debug, Clone)]
struct TypeEntry {
    name: String,
    base: Option<TypeId>,
}

/// Table of atomic types and their base type links.
///
/// The builtin table is built once per process; see [`TypeRegistry::builtin`].
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    entries: HashMap<TypeId, TypeEntry>,
    next_id: u16,
}

static BUILTIN_REGISTRY: LazyLock<TypeRegistry> = LazyLock::new(TypeRegistry::with_builtins);

fn builtin_base(tag: ValueTag) -> Option<ValueTag> {
    use ValueTag as T;
    let base = match tag {
        T::AnyAtomic => return None,
        T::NormalizedString => T::String,
        T::Token => T::NormalizedString,
        T::Language | T::NmToken | T::Name => T::Token,
        T::NcName => T::Name,
        T::Id | T::IdRef | T::Entity => T::NcName,
        T::Integer => T::Decimal,
        T::NonPositiveInteger | T::Long | T::NonNegativeInteger => T::Integer,
        T::NegativeInteger => T::NonPositiveInteger,
        T::Int => T::Long,
        T::Short => T::Int,
        T::Byte => T::Short,
        T::UnsignedLong | T::PositiveInteger => T::NonNegativeInteger,
        T::UnsignedInt => T::UnsignedLong,
        T::UnsignedShort => T::UnsignedInt,
        T::UnsignedByte => T::UnsignedShort,
        T::DayTimeDuration | T::YearMonthDuration => T::Duration,
        other if other.is_atomic() => T::AnyAtomic,
        _ => return None,
    };
    Some(base)
}

impl TypeRegistry {
    /// The process-wide registry of builtin types.
    pub fn builtin() -> &'static TypeRegistry {
        &BUILTIN_REGISTRY
    }

    /// Starts a registry seeded with the builtin types, for registering
    /// schema-derived types on top.
    pub fn builder() -> TypeRegistryBuilder {
        TypeRegistryBuilder {
            registry: Self::with_builtins(),
        }
    }

    fn with_builtins() -> Self {
        let entries = ValueTag::ALL
            .iter()
            .filter(|tag| tag.is_atomic())
            .map(|&tag| {
                let entry = TypeEntry {
                    name: tag.name().to_string(),
                    base: builtin_base(tag).map(TypeId::from),
                };
                (TypeId::from(tag), entry)
            })
            .collect();
        Self {
            entries,
            next_id: FIRST_DERIVED_TYPE_ID,
        }
    }

    pub fn contains(&self, id: TypeId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn name(&self, id: TypeId) -> Option<&str> {
        self.entries.get(&id).map(|e| e.name.as_str())
    }

    /// The immediate base type, or `None` for the root and unknown ids.
    pub fn base_type(&self, id: TypeId) -> Option<TypeId> {
        self.entries.get(&id).and_then(|e| e.base)
    }

    /// True if `ancestor` is `id` itself or reachable through base links.
    pub fn is_subtype_of(&self, id: TypeId, ancestor: TypeId) -> bool {
        let mut current = Some(id);
        for _ in 0..MAX_TYPE_DEPTH {
            match current {
                Some(c) if c == ancestor => return true,
                Some(c) => current = self.base_type(c),
                None => return false,
            }
        }
        false
    }

    /// Normalizes a type for the arithmetic engine.
    ///
    /// Restricted integer types collapse to `xs:integer`; `xs:anyAtomicType`
    /// and types outside the hierarchy are type errors.
    pub fn base_type_for_arithmetic(&self, id: TypeId) -> Result<CanonicalType> {
        self.normalize(id, CanonicalType::for_arithmetic)
    }

    /// Normalizes a type for value comparison. Like arithmetic, but keeps
    /// `xs:duration` and the string subtypes, and rejects sequences.
    pub fn base_type_for_comparison(&self, id: TypeId) -> Result<CanonicalType> {
        if id == TypeId::from(ValueTag::Sequence) {
            return Err(SystemError::type_error(
                "a sequence cannot be used as a comparison operand",
            ));
        }
        self.normalize(id, CanonicalType::for_comparison)
    }

    /// Normalizes a type for general comparison, where every numeric type
    /// is promoted to `xs:double`.
    pub fn base_type_for_general_comparison(&self, id: TypeId) -> Result<CanonicalType> {
        let canonical = self.base_type_for_comparison(id)?;
        if canonical.is_numeric() {
            Ok(CanonicalType::Double)
        } else {
            Ok(canonical)
        }
    }

    fn normalize(
        &self,
        id: TypeId,
        canonical: fn(ValueTag) -> Option<CanonicalType>,
    ) -> Result<CanonicalType> {
        let mut current = id;
        for _ in 0..MAX_TYPE_DEPTH {
            if let Some(tag) = current.as_builtin_tag() {
                if tag == ValueTag::AnyAtomic {
                    return Err(SystemError::type_error(format!(
                        "{} has no operator-specific base type",
                        self.describe(id)
                    )));
                }
                if tag.is_integer() {
                    return Ok(CanonicalType::Integer);
                }
                if let Some(found) = canonical(tag) {
                    return Ok(found);
                }
            }
            current = self.base_type(current).ok_or_else(|| {
                SystemError::type_error(format!(
                    "{} is not an operand type for this operator",
                    self.describe(id)
                ))
            })?;
        }
        Err(SystemError::internal(format!(
            "type hierarchy of {} exceeds {} levels",
            self.describe(id),
            MAX_TYPE_DEPTH
        )))
    }

    fn describe(&self, id: TypeId) -> String {
        match (self.name(id), id.as_builtin_tag()) {
            (Some(name), _) => name.to_string(),
            (None, Some(tag)) => tag.name().to_string(),
            (None, None) => id.to_string(),
        }
    }
}

/// Registers schema-derived types on top of the builtin table.
///
/// A derived type's base must already be registered, so the hierarchy stays
/// a tree.
#[derive(Debug)]
pub struct TypeRegistryBuilder {
    registry: TypeRegistry,
}

impl TypeRegistryBuilder {
    pub fn derive(&mut self, name: impl Into<String>, base: TypeId) -> Result<TypeId> {
        let name = name.into();
        if !self.registry.contains(base) {
            return Err(SystemError::internal(format!(
                "base type {base} of '{name}' is not registered"
            )));
        }
        let id = TypeId(self.registry.next_id);
        self.registry.next_id = self
            .registry
            .next_id
            .checked_add(1)
            .ok_or_else(|| SystemError::internal("type id space exhausted"))?;
        log::debug!("Registered derived type '{}' as {} (base {})", name, id, base);
        self.registry.entries.insert(
            id,
            TypeEntry {
                name,
                base: Some(base),
            },
        );
        Ok(id)
    }

    pub fn build(self) -> TypeRegistry {
        self.registry
    }
}

/// [`TypeRegistry::base_type_for_arithmetic`] on the builtin registry.
pub fn base_type_for_arithmetic(id: impl Into<TypeId>) -> Result<CanonicalType> {
    TypeRegistry::builtin().base_type_for_arithmetic(id.into())
}

/// [`TypeRegistry::base_type_for_comparison`] on the builtin registry.
pub fn base_type_for_comparison(id: impl Into<TypeId>) -> Result<CanonicalType> {
    TypeRegistry::builtin().base_type_for_comparison(id.into())
}

/// [`TypeRegistry::base_type_for_general_comparison`] on the builtin registry.
pub fn base_type_for_general_comparison(id: impl Into<TypeId>) -> Result<CanonicalType> {
    TypeRegistry::builtin().base_type_for_general_comparison(id.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCode;

    #[test]
    fn test_every_atomic_type_reaches_the_root() {
        let registry = TypeRegistry::builtin();
        for tag in ValueTag::ALL.iter().filter(|t| t.is_atomic()) {
            assert!(
                registry.is_subtype_of(TypeId::from(*tag), TypeId::from(ValueTag::AnyAtomic)),
                "{tag} is detached from the hierarchy"
            );
        }
        assert_eq!(registry.base_type(ValueTag::AnyAtomic.into()), None);
        assert!(!registry.contains(ValueTag::ElementNode.into()));
    }

    #[test]
    fn test_integer_subtypes_collapse_for_arithmetic() {
        for tag in [
            ValueTag::Long,
            ValueTag::Int,
            ValueTag::Short,
            ValueTag::Byte,
            ValueTag::UnsignedByte,
            ValueTag::PositiveInteger,
            ValueTag::NegativeInteger,
        ] {
            assert_eq!(base_type_for_arithmetic(tag), Ok(CanonicalType::Integer));
        }
        assert_eq!(
            base_type_for_arithmetic(ValueTag::Decimal),
            Ok(CanonicalType::Decimal)
        );
    }

    #[test]
    fn test_any_atomic_is_rejected() {
        let err = base_type_for_arithmetic(ValueTag::AnyAtomic).unwrap_err();
        assert_eq!(err.code(), ErrorCode::XPTY0004);
        let err = base_type_for_comparison(ValueTag::AnyAtomic).unwrap_err();
        assert_eq!(err.code(), ErrorCode::XPTY0004);
    }

    #[test]
    fn test_string_subtypes_walk_to_string_for_arithmetic_only() {
        assert_eq!(
            base_type_for_arithmetic(ValueTag::NcName),
            Ok(CanonicalType::String)
        );
        assert_eq!(
            base_type_for_comparison(ValueTag::NcName),
            Ok(CanonicalType::NcName)
        );
    }

    #[test]
    fn test_duration_is_canonical_for_comparison_only() {
        assert!(base_type_for_arithmetic(ValueTag::Duration).is_err());
        assert_eq!(
            base_type_for_comparison(ValueTag::Duration),
            Ok(CanonicalType::Duration)
        );
    }

    #[test]
    fn test_comparison_rejects_sequence() {
        let err = base_type_for_comparison(ValueTag::Sequence).unwrap_err();
        assert_eq!(err.code(), ErrorCode::XPTY0004);
    }

    #[test]
    fn test_general_comparison_promotes_numerics_to_double() {
        for tag in [
            ValueTag::Decimal,
            ValueTag::Integer,
            ValueTag::Float,
            ValueTag::UnsignedShort,
        ] {
            assert_eq!(
                base_type_for_general_comparison(tag),
                Ok(CanonicalType::Double)
            );
        }
        assert_eq!(
            base_type_for_general_comparison(ValueTag::Date),
            Ok(CanonicalType::Date)
        );
    }

    #[test]
    fn test_derived_types_resolve_through_their_base() {
        let mut builder = TypeRegistry::builder();
        let percent = builder
            .derive("my:percent", ValueTag::UnsignedByte.into())
            .unwrap();
        let code = builder.derive("my:code", ValueTag::Token.into()).unwrap();
        let registry = builder.build();

        assert_eq!(registry.name(percent), Some("my:percent"));
        assert_eq!(
            registry.base_type_for_arithmetic(percent),
            Ok(CanonicalType::Integer)
        );
        assert_eq!(
            registry.base_type_for_comparison(code),
            Ok(CanonicalType::Token)
        );
        assert_eq!(
            registry.base_type_for_arithmetic(code),
            Ok(CanonicalType::String)
        );
        assert!(registry.is_subtype_of(percent, ValueTag::Decimal.into()));
    }

    #[test]
    fn test_derive_requires_registered_base() {
        let mut builder = TypeRegistry::builder();
        let err = builder.derive("my:orphan", TypeId::new(4000)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::SYSE0001);
    }

    #[test]
    fn test_canonical_tags_map_back() {
        for canonical in CanonicalType::ALL {
            assert_eq!(
                base_type_for_comparison(canonical.type_id()),
                Ok(*canonical)
            );
        }
    }
}
