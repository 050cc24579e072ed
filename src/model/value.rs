//! Core value type passed into and returned from math functions

use bigdecimal::{BigDecimal, ToPrimitive, Zero};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

use super::types::ValueKind;
use crate::registry::function::FunctionError;

/// Already-evaluated argument or result of a math function
///
/// The integer family, the two floating point widths and `Decimal` are the
/// numeric kinds. Strings carry patterns and sources for formatting functions,
/// collections are flattened by the accumulating functions.
#[derive(Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryValue {
    /// 8-bit signed integer
    Byte(i8),

    /// 16-bit signed integer
    Short(i16),

    /// 32-bit signed integer
    Integer(i32),

    /// 64-bit signed integer
    Long(i64),

    /// 32-bit floating point
    Float(f32),

    /// 64-bit floating point
    Double(f64),

    /// Decimal value used for exact accumulation
    Decimal(Decimal),

    /// String value
    String(String),

    /// Ordered sequence of values
    Collection(Collection),

    /// String-keyed mapping, insertion ordered
    Map(IndexMap<String, QueryValue>),
}

/// Collection type that wraps a vector of values
#[derive(Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Collection(Vec<QueryValue>);

impl Collection {
    /// Create a new empty collection
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Create a collection from a vector
    pub fn from_vec(values: Vec<QueryValue>) -> Self {
        Self(values)
    }

    /// Get the length of the collection
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the collection is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get an iterator over the values
    pub fn iter(&self) -> std::slice::Iter<'_, QueryValue> {
        self.0.iter()
    }

    /// Borrow the values as a slice
    pub fn as_slice(&self) -> &[QueryValue] {
        &self.0
    }
}

impl Default for Collection {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<QueryValue>> for Collection {
    fn from(values: Vec<QueryValue>) -> Self {
        Self(values)
    }
}

impl IntoIterator for Collection {
    type Item = QueryValue;
    type IntoIter = std::vec::IntoIter<QueryValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a QueryValue;
    type IntoIter = std::slice::Iter<'a, QueryValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

impl QueryValue {
    /// Create a collection value
    pub fn collection(values: Vec<QueryValue>) -> Self {
        QueryValue::Collection(Collection::from_vec(values))
    }

    /// Create a string value
    pub fn string(value: impl Into<String>) -> Self {
        QueryValue::String(value.into())
    }

    /// Get the kind of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            QueryValue::Byte(_) => ValueKind::Byte,
            QueryValue::Short(_) => ValueKind::Short,
            QueryValue::Integer(_) => ValueKind::Integer,
            QueryValue::Long(_) => ValueKind::Long,
            QueryValue::Float(_) => ValueKind::Float,
            QueryValue::Double(_) => ValueKind::Double,
            QueryValue::Decimal(_) => ValueKind::Decimal,
            QueryValue::String(_) => ValueKind::String,
            QueryValue::Collection(_) => ValueKind::Collection,
            QueryValue::Map(_) => ValueKind::Map,
        }
    }

    /// Check if this value is numeric
    pub fn is_numeric(&self) -> bool {
        self.kind().is_numeric()
    }

    /// Get the value as a string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            QueryValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as a 64-bit integer if it belongs to the integer family
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            QueryValue::Byte(v) => Some(i64::from(*v)),
            QueryValue::Short(v) => Some(i64::from(*v)),
            QueryValue::Integer(v) => Some(i64::from(*v)),
            QueryValue::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Convert a numeric value to a double, losing precision where needed
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            QueryValue::Float(v) => Some(f64::from(*v)),
            QueryValue::Double(v) => Some(*v),
            QueryValue::Decimal(d) => d.to_f64(),
            other => other.as_i64().map(|v| v as f64),
        }
    }

    /// Convert a numeric value to an arbitrary-precision decimal
    ///
    /// Floating point values go through their shortest round-trip text so that
    /// `0.1` becomes exactly `0.1`. Returns `None` for non-numeric values, NaN and
    /// infinities.
    pub fn to_big_decimal(&self) -> Option<BigDecimal> {
        match self {
            QueryValue::Decimal(d) => {
                Some(BigDecimal::new(d.mantissa().into(), i64::from(d.scale())))
            }
            QueryValue::Float(v) if v.is_finite() => v.to_string().parse().ok(),
            QueryValue::Double(v) if v.is_finite() => v.to_string().parse().ok(),
            QueryValue::Float(_) | QueryValue::Double(_) => None,
            other => other.as_i64().map(BigDecimal::from),
        }
    }

    /// Wrap an accumulated total
    ///
    /// The total stays a `Decimal` when it is exactly representable as one and
    /// becomes the nearest `Double` otherwise.
    pub fn from_big_decimal(value: &BigDecimal) -> Self {
        match exact_decimal(value).or_else(|| exact_decimal(&value.normalized())) {
            Some(decimal) => QueryValue::Decimal(decimal),
            None => QueryValue::Double(big_decimal_to_f64(value)),
        }
    }

    /// Compare two values in ascending natural order
    ///
    /// Numbers compare numerically across kinds and strings lexicographically.
    /// Any other pairing has no natural order.
    pub fn natural_cmp(&self, other: &QueryValue) -> Option<Ordering> {
        match (self, other) {
            (QueryValue::String(a), QueryValue::String(b)) => Some(a.cmp(b)),
            (a, b) if a.is_numeric() && b.is_numeric() => {
                if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
                    return Some(x.cmp(&y));
                }
                if let (Some(x), Some(y)) = (a.to_big_decimal(), b.to_big_decimal()) {
                    return Some(x.cmp(&y));
                }
                let (x, y) = (a.to_f64()?, b.to_f64()?);
                Some(x.total_cmp(&y))
            }
            _ => None,
        }
    }
}

fn exact_decimal(value: &BigDecimal) -> Option<Decimal> {
    let (digits, scale) = value.as_bigint_and_exponent();
    if scale < 0 {
        // 10^29 is already past Decimal::MAX
        if scale < -28 && !value.is_zero() {
            return None;
        }
        return exact_decimal(&value.with_scale(0));
    }
    let scale = u32::try_from(scale).ok()?;
    Decimal::try_from_i128_with_scale(digits.to_i128()?, scale).ok()
}

/// Nearest double, infinite when the magnitude is past `f64::MAX`
pub(crate) fn big_decimal_to_f64(value: &BigDecimal) -> f64 {
    value
        .to_string()
        .parse::<f64>()
        .ok()
        .or_else(|| value.to_f64())
        .unwrap_or(f64::NAN)
}

impl TryFrom<serde_json::Value> for QueryValue {
    type Error = FunctionError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value;

        match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(QueryValue::Long(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(QueryValue::Double(f))
                } else {
                    Err(conversion_error("Number", n.to_string()))
                }
            }
            Value::String(s) => Ok(QueryValue::String(s)),
            Value::Array(items) => items
                .into_iter()
                .map(QueryValue::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(QueryValue::collection),
            Value::Object(entries) => entries
                .into_iter()
                .map(|(key, value)| QueryValue::try_from(value).map(|v| (key, v)))
                .collect::<Result<IndexMap<_, _>, _>>()
                .map(QueryValue::Map),
            Value::Bool(b) => Err(conversion_error("Boolean", b.to_string())),
            Value::Null => Err(conversion_error("Null", "null".to_string())),
        }
    }
}

fn conversion_error(actual: &str, value: String) -> FunctionError {
    FunctionError::InvalidArgumentType {
        name: "json".to_string(),
        index: 0,
        expected: "Number, String, Array or Object".to_string(),
        actual: format!("{actual} ({value})"),
    }
}

impl From<i8> for QueryValue {
    fn from(value: i8) -> Self {
        QueryValue::Byte(value)
    }
}

impl From<i16> for QueryValue {
    fn from(value: i16) -> Self {
        QueryValue::Short(value)
    }
}

impl From<i32> for QueryValue {
    fn from(value: i32) -> Self {
        QueryValue::Integer(value)
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Long(value)
    }
}

impl From<f32> for QueryValue {
    fn from(value: f32) -> Self {
        QueryValue::Float(value)
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        QueryValue::Double(value)
    }
}

impl From<Decimal> for QueryValue {
    fn from(value: Decimal) -> Self {
        QueryValue::Decimal(value)
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::String(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::String(value)
    }
}

impl From<Vec<QueryValue>> for QueryValue {
    fn from(values: Vec<QueryValue>) -> Self {
        QueryValue::collection(values)
    }
}

impl fmt::Debug for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Byte(v) => write!(f, "Byte({v})"),
            QueryValue::Short(v) => write!(f, "Short({v})"),
            QueryValue::Integer(v) => write!(f, "Integer({v})"),
            QueryValue::Long(v) => write!(f, "Long({v})"),
            QueryValue::Float(v) => write!(f, "Float({v})"),
            QueryValue::Double(v) => write!(f, "Double({v})"),
            QueryValue::Decimal(v) => write!(f, "Decimal({v})"),
            QueryValue::String(v) => write!(f, "String({v:?})"),
            QueryValue::Collection(c) => write!(f, "Collection({c:?})"),
            QueryValue::Map(m) => f.debug_map().entries(m.iter()).finish(),
        }
    }
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Byte(v) => write!(f, "{v}"),
            QueryValue::Short(v) => write!(f, "{v}"),
            QueryValue::Integer(v) => write!(f, "{v}"),
            QueryValue::Long(v) => write!(f, "{v}"),
            QueryValue::Float(v) => write!(f, "{v}"),
            QueryValue::Double(v) => write!(f, "{v}"),
            QueryValue::Decimal(v) => write!(f, "{v}"),
            QueryValue::String(v) => write!(f, "{v}"),
            QueryValue::Collection(c) => {
                write!(f, "[")?;
                for (i, item) in c.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            QueryValue::Map(m) => {
                write!(f, "{{")?;
                for (i, (key, value)) in m.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}
