// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Truncating numeric conversions between value widths
//!
//! Integers keep their low-order bits. Floating point values are first converted
//! to a 32-bit integer (saturating, NaN becomes zero) before being cut down to a
//! byte or a short. Decimals drop their fraction and then keep the low-order bits
//! of the remaining integer.

use rust_decimal::prelude::*;

use super::value::QueryValue;

/// Target width of a narrowing conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericWidth {
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
}

/// Narrow a numeric value to the given width, returns `None` for non-numeric values
pub fn narrow(value: &QueryValue, width: NumericWidth) -> Option<QueryValue> {
    let result = match width {
        NumericWidth::Byte => QueryValue::Byte(int_value(value)? as i8),
        NumericWidth::Short => QueryValue::Short(int_value(value)? as i16),
        NumericWidth::Integer => QueryValue::Integer(int_value(value)?),
        NumericWidth::Long => QueryValue::Long(long_value(value)?),
        NumericWidth::Float => QueryValue::Float(float_value(value)?),
        NumericWidth::Double => QueryValue::Double(value.to_f64()?),
    };
    Some(result)
}

fn int_value(value: &QueryValue) -> Option<i32> {
    match value {
        QueryValue::Float(v) => Some(*v as i32),
        QueryValue::Double(v) => Some(*v as i32),
        QueryValue::Decimal(d) => Some(decimal_integer_bits(d) as i32),
        other => other.as_i64().map(|v| v as i32),
    }
}

fn long_value(value: &QueryValue) -> Option<i64> {
    match value {
        QueryValue::Float(v) => Some(*v as i64),
        QueryValue::Double(v) => Some(*v as i64),
        QueryValue::Decimal(d) => Some(decimal_integer_bits(d) as i64),
        other => other.as_i64(),
    }
}

fn float_value(value: &QueryValue) -> Option<f32> {
    match value {
        QueryValue::Float(v) => Some(*v),
        QueryValue::Decimal(d) => d.to_f32(),
        other => other.to_f64().map(|v| v as f32),
    }
}

/// Integer part of a decimal; the whole decimal range fits in an `i128`
fn decimal_integer_bits(value: &Decimal) -> i128 {
    value.trunc().to_i128().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_integers_wrap_to_low_order_bits() {
        assert_eq!(
            narrow(&QueryValue::Integer(300), NumericWidth::Byte),
            Some(QueryValue::Byte(44))
        );
        assert_eq!(
            narrow(&QueryValue::Long(70_000), NumericWidth::Short),
            Some(QueryValue::Short(4464))
        );
        assert_eq!(
            narrow(&QueryValue::Long(i64::from(i32::MAX) + 1), NumericWidth::Integer),
            Some(QueryValue::Integer(i32::MIN))
        );
        assert_eq!(
            narrow(&QueryValue::Byte(-1), NumericWidth::Long),
            Some(QueryValue::Long(-1))
        );
    }

    #[test]
    fn test_doubles_saturate_then_wrap() {
        assert_eq!(
            narrow(&QueryValue::Double(1e10), NumericWidth::Integer),
            Some(QueryValue::Integer(i32::MAX))
        );
        // i32::MAX keeps its low byte 0xFF
        assert_eq!(
            narrow(&QueryValue::Double(1e10), NumericWidth::Byte),
            Some(QueryValue::Byte(-1))
        );
        assert_eq!(
            narrow(&QueryValue::Double(-7.9), NumericWidth::Long),
            Some(QueryValue::Long(-7))
        );
        assert_eq!(
            narrow(&QueryValue::Double(f64::NAN), NumericWidth::Short),
            Some(QueryValue::Short(0))
        );
        assert_eq!(
            narrow(&QueryValue::Double(300.7), NumericWidth::Byte),
            Some(QueryValue::Byte(44))
        );
    }

    #[test]
    fn test_decimals_truncate() {
        let value = QueryValue::Decimal(Decimal::from_str("4294967297.75").unwrap());
        assert_eq!(
            narrow(&value, NumericWidth::Integer),
            Some(QueryValue::Integer(1))
        );
        assert_eq!(
            narrow(&value, NumericWidth::Long),
            Some(QueryValue::Long(4_294_967_297))
        );
        assert_eq!(
            narrow(&value, NumericWidth::Double),
            Some(QueryValue::Double(4294967297.75))
        );
    }

    #[test]
    fn test_float_precision_loss() {
        assert_eq!(
            narrow(&QueryValue::Long(16_777_217), NumericWidth::Float),
            Some(QueryValue::Float(16_777_216.0))
        );
    }

    #[test]
    fn test_non_numeric_is_rejected() {
        assert_eq!(narrow(&QueryValue::string("12"), NumericWidth::Integer), None);
        assert_eq!(
            narrow(&QueryValue::collection(vec![]), NumericWidth::Double),
            None
        );
    }
}
