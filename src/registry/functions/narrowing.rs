//! byteValue() through doubleValue() - truncating numeric conversions

use crate::model::{NumericWidth, QueryValue, narrow};
use crate::registry::function::{FunctionError, FunctionResult};

/// Narrow the single argument to `width`
pub fn narrow_value(
    name: &str,
    width: NumericWidth,
    args: &[QueryValue],
) -> FunctionResult<QueryValue> {
    let value = args.first().ok_or_else(|| FunctionError::InvalidArity {
        name: name.to_string(),
        min: 1,
        max: Some(1),
        actual: 0,
    })?;
    narrow(value, width).ok_or_else(|| FunctionError::type_mismatch(name, 0, "Number", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_then_double_wraps() {
        let byte = narrow_value("byteValue", NumericWidth::Byte, &[QueryValue::Integer(300)]).unwrap();
        assert_eq!(byte, QueryValue::Byte(44));
        assert_eq!(
            narrow_value("doubleValue", NumericWidth::Double, &[byte]).unwrap(),
            QueryValue::Double(44.0)
        );
    }

    #[test]
    fn test_non_numeric() {
        assert!(matches!(
            narrow_value("longValue", NumericWidth::Long, &[QueryValue::string("1")]),
            Err(FunctionError::InvalidArgumentType { index: 0, .. })
        ));
    }
}
