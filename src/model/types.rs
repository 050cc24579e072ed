//! Type descriptors for query values

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a [`QueryValue`](super::QueryValue), used by signatures and error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    /// 8-bit signed integer
    Byte,
    /// 16-bit signed integer
    Short,
    /// 32-bit signed integer
    Integer,
    /// 64-bit signed integer
    Long,
    /// 32-bit floating point
    Float,
    /// 64-bit floating point
    Double,
    /// Decimal value with fixed precision
    Decimal,
    /// String value
    String,
    /// Ordered sequence of values
    Collection,
    /// String-keyed mapping of values
    Map,

    /// Any numeric kind (used for parameter declarations)
    Number,
    /// Any kind (used for polymorphic parameters)
    Any,
}

impl ValueKind {
    /// Check if a value of kind `actual` may be passed where `self` is declared
    pub fn is_compatible_with(&self, actual: &ValueKind) -> bool {
        match (self, actual) {
            (ValueKind::Any, _) | (_, ValueKind::Any) => true,
            (ValueKind::Number, other) | (other, ValueKind::Number) => other.is_numeric(),
            _ => self == actual,
        }
    }

    /// Check if this kind is numeric
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ValueKind::Byte
                | ValueKind::Short
                | ValueKind::Integer
                | ValueKind::Long
                | ValueKind::Float
                | ValueKind::Double
                | ValueKind::Decimal
                | ValueKind::Number
        )
    }

    /// Check if this kind is an integral number
    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            ValueKind::Byte | ValueKind::Short | ValueKind::Integer | ValueKind::Long
        )
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Byte => "Byte",
            ValueKind::Short => "Short",
            ValueKind::Integer => "Integer",
            ValueKind::Long => "Long",
            ValueKind::Float => "Float",
            ValueKind::Double => "Double",
            ValueKind::Decimal => "Decimal",
            ValueKind::String => "String",
            ValueKind::Collection => "Collection",
            ValueKind::Map => "Map",
            ValueKind::Number => "Number",
            ValueKind::Any => "Any",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_accepts_every_numeric_kind() {
        for kind in [
            ValueKind::Byte,
            ValueKind::Short,
            ValueKind::Integer,
            ValueKind::Long,
            ValueKind::Float,
            ValueKind::Double,
            ValueKind::Decimal,
        ] {
            assert!(ValueKind::Number.is_compatible_with(&kind), "{kind}");
        }
        assert!(!ValueKind::Number.is_compatible_with(&ValueKind::String));
        assert!(!ValueKind::Number.is_compatible_with(&ValueKind::Collection));
    }

    #[test]
    fn test_exact_kinds() {
        assert!(ValueKind::String.is_compatible_with(&ValueKind::String));
        assert!(!ValueKind::String.is_compatible_with(&ValueKind::Long));
        assert!(ValueKind::Any.is_compatible_with(&ValueKind::Map));
    }
}
