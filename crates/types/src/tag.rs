//! The one-byte discriminant that prefixes every encoded value.

use std::fmt;

macro_rules! value_tags {
    ($($variant:ident = $code:literal => $name:literal),* $(,)?) => {
        /// Discriminant byte of a tagged value.
        ///
        /// Codes are part of the wire format and must never be renumbered.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u8)]
        pub enum ValueTag {
            $($variant = $code),*
        }

        impl ValueTag {
            /// Every tag, in code order.
            pub const ALL: &'static [ValueTag] = &[$(ValueTag::$variant),*];

            /// The tag for a raw code byte, if the code is assigned.
            pub const fn from_u8(code: u8) -> Option<Self> {
                match code {
                    $($code => Some(ValueTag::$variant),)*
                    _ => None,
                }
            }

            /// The XDM name of the type or structure this tag identifies.
            pub const fn name(self) -> &'static str {
                match self {
                    $(ValueTag::$variant => $name),*
                }
            }
        }
    };
}

value_tags! {
    UntypedAtomic = 0 => "xs:untypedAtomic",
    AnyAtomic = 1 => "xs:anyAtomicType",
    String = 2 => "xs:string",
    NormalizedString = 3 => "xs:normalizedString",
    Token = 4 => "xs:token",
    Language = 5 => "xs:language",
    NmToken = 6 => "xs:NMTOKEN",
    Name = 7 => "xs:Name",
    NcName = 8 => "xs:NCName",
    Id = 9 => "xs:ID",
    IdRef = 10 => "xs:IDREF",
    Entity = 11 => "xs:ENTITY",
    Decimal = 12 => "xs:decimal",
    Integer = 13 => "xs:integer",
    NonPositiveInteger = 14 => "xs:nonPositiveInteger",
    NegativeInteger = 15 => "xs:negativeInteger",
    Long = 16 => "xs:long",
    Int = 17 => "xs:int",
    Short = 18 => "xs:short",
    Byte = 19 => "xs:byte",
    NonNegativeInteger = 20 => "xs:nonNegativeInteger",
    UnsignedLong = 21 => "xs:unsignedLong",
    UnsignedInt = 22 => "xs:unsignedInt",
    UnsignedShort = 23 => "xs:unsignedShort",
    UnsignedByte = 24 => "xs:unsignedByte",
    PositiveInteger = 25 => "xs:positiveInteger",
    Float = 26 => "xs:float",
    Double = 27 => "xs:double",
    Boolean = 28 => "xs:boolean",
    Duration = 29 => "xs:duration",
    DayTimeDuration = 30 => "xs:dayTimeDuration",
    YearMonthDuration = 31 => "xs:yearMonthDuration",
    DateTime = 32 => "xs:dateTime",
    Date = 33 => "xs:date",
    Time = 34 => "xs:time",
    GYearMonth = 35 => "xs:gYearMonth",
    GYear = 36 => "xs:gYear",
    GMonthDay = 37 => "xs:gMonthDay",
    GDay = 38 => "xs:gDay",
    GMonth = 39 => "xs:gMonth",
    HexBinary = 40 => "xs:hexBinary",
    Base64Binary = 41 => "xs:base64Binary",
    AnyUri = 42 => "xs:anyURI",
    QName = 43 => "xs:QName",
    Notation = 44 => "xs:NOTATION",
    Sequence = 100 => "sequence",
    NodeTree = 101 => "node-tree",
    DocumentNode = 102 => "document-node()",
    ElementNode = 103 => "element()",
    AttributeNode = 104 => "attribute()",
    TextNode = 105 => "text()",
    CommentNode = 106 => "comment()",
    PiNode = 107 => "processing-instruction()",
    Object = 108 => "object",
    Array = 109 => "array",
    Null = 110 => "null",
}

impl ValueTag {
    /// The raw code byte written on the wire.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// True for tags in the atomic type hierarchy.
    pub const fn is_atomic(self) -> bool {
        (self as u8) < ValueTag::Sequence as u8
    }

    pub const fn is_node(self) -> bool {
        matches!(
            self,
            ValueTag::NodeTree
                | ValueTag::DocumentNode
                | ValueTag::ElementNode
                | ValueTag::AttributeNode
                | ValueTag::TextNode
                | ValueTag::CommentNode
                | ValueTag::PiNode
        )
    }

    /// True for tags whose payload is a length-prefixed UTF-8 string.
    pub const fn is_string_like(self) -> bool {
        matches!(
            self,
            ValueTag::UntypedAtomic
                | ValueTag::String
                | ValueTag::NormalizedString
                | ValueTag::Token
                | ValueTag::Language
                | ValueTag::NmToken
                | ValueTag::Name
                | ValueTag::NcName
                | ValueTag::Id
                | ValueTag::IdRef
                | ValueTag::Entity
                | ValueTag::AnyUri
                | ValueTag::Notation
        )
    }

    /// True for `xs:integer` and every restriction of it.
    pub const fn is_integer(self) -> bool {
        let code = self as u8;
        code >= ValueTag::Integer as u8 && code <= ValueTag::PositiveInteger as u8
    }

    /// True for the gregorian fragment types (`xs:gYear`, `xs:gMonthDay`, ...).
    pub const fn is_gregorian(self) -> bool {
        let code = self as u8;
        code >= ValueTag::GYearMonth as u8 && code <= ValueTag::GMonth as u8
    }
}

impl TryFrom<u8> for ValueTag {
    type Error = crate::SystemError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        ValueTag::from_u8(code)
            .ok_or_else(|| crate::SystemError::internal(format!("unknown value tag {code}")))
    }
}

impl fmt::Display for ValueTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip_through_from_u8() {
        for tag in ValueTag::ALL {
            assert_eq!(ValueTag::from_u8(tag.code()), Some(*tag));
        }
    }

    #[test]
    fn test_unassigned_code_is_rejected() {
        assert_eq!(ValueTag::from_u8(45), None);
        assert_eq!(ValueTag::from_u8(255), None);
        assert!(ValueTag::try_from(99u8).is_err());
    }

    #[test]
    fn test_classification() {
        assert!(ValueTag::Byte.is_integer());
        assert!(ValueTag::Integer.is_integer());
        assert!(!ValueTag::Decimal.is_integer());
        assert!(ValueTag::AnyUri.is_string_like());
        assert!(ValueTag::GMonthDay.is_gregorian());
        assert!(!ValueTag::Null.is_node());
        assert!(!ValueTag::Sequence.is_atomic());
        assert!(ValueTag::Notation.is_atomic());
    }
}
