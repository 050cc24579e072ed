//! mean() function - arithmetic, geometric and harmonic means plus the median

use super::accumulate::{Accumulator, Combiner};
use crate::model::QueryValue;
use crate::model::value::big_decimal_to_f64;
use crate::registry::function::{FunctionError, FunctionResult};
use bigdecimal::{BigDecimal, One, Signed, Zero};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Variant selected by the optional second argument of mean()
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MeanKind {
    /// `total / count`
    #[default]
    Arithmetic,
    /// `count`-th root of the product
    Geometric,
    /// `count / sum of reciprocals`
    Harmonic,
    /// Upper median of the first argument
    Median,
}

impl MeanKind {
    /// Get the variant name
    pub fn name(&self) -> &'static str {
        match self {
            MeanKind::Arithmetic => "arithmetic",
            MeanKind::Geometric => "geometric",
            MeanKind::Harmonic => "harmonic",
            MeanKind::Median => "median",
        }
    }
}

impl FromStr for MeanKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "arithmetic" => Ok(MeanKind::Arithmetic),
            "geometric" => Ok(MeanKind::Geometric),
            "harmonic" => Ok(MeanKind::Harmonic),
            "median" => Ok(MeanKind::Median),
            other => Err(format!(
                "unknown mean variant '{other}', expected arithmetic, geometric, harmonic or median"
            )),
        }
    }
}

impl fmt::Display for MeanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// mean(values [, variant])
///
/// Only the first argument is accumulated. Empty input yields `Integer(0)`.
pub fn mean(name: &str, args: &[QueryValue]) -> FunctionResult<QueryValue> {
    let kind = match args.get(1) {
        None => MeanKind::default(),
        Some(QueryValue::String(variant)) => variant
            .parse()
            .map_err(|message: String| FunctionError::evaluation(name, message))?,
        Some(other) => return Err(FunctionError::type_mismatch(name, 1, "String", other)),
    };
    let Some(values) = args.first() else {
        return Ok(QueryValue::Integer(0));
    };

    let (initial, combiner) = match kind {
        MeanKind::Median => return median(name, values),
        MeanKind::Arithmetic => (BigDecimal::zero(), Combiner::Add),
        MeanKind::Geometric => (BigDecimal::one(), Combiner::Multiply),
        MeanKind::Harmonic => (BigDecimal::zero(), Combiner::AddReciprocal),
    };

    let mut accumulator = Accumulator::new(initial, combiner);
    accumulator.accumulate(name, 0, values)?;
    if accumulator.count() == 0 {
        return Ok(QueryValue::Integer(0));
    }

    let count = BigDecimal::from(accumulator.count() as u64);
    let total = accumulator.total();
    let result = match kind {
        MeanKind::Geometric => nth_root(total, accumulator.count()),
        MeanKind::Harmonic => {
            // reciprocals of mixed signs can cancel out
            if total.is_zero() {
                return Err(FunctionError::evaluation(name, "division by zero"));
            }
            big_decimal_to_f64(&(&count / total))
        }
        _ => big_decimal_to_f64(&(total / &count)),
    };
    Ok(QueryValue::Double(result))
}

/// `count`-th root of an exact product
///
/// Products outside the double range are rooted through their base-10
/// logarithm. Negative products give NaN, as a fractional power would.
fn nth_root(product: &BigDecimal, count: usize) -> f64 {
    if product.is_zero() {
        return 0.0;
    }
    if product.is_negative() {
        return f64::NAN;
    }
    let exponent = 1.0 / count as f64;
    let direct = big_decimal_to_f64(product);
    if direct.is_normal() {
        return direct.powf(exponent);
    }

    let (digits, scale) = product.as_bigint_and_exponent();
    let digits = digits.to_string();
    let leading = &digits[..digits.len().min(17)];
    let log10 = leading.parse::<f64>().unwrap_or(1.0).log10()
        + (digits.len() - leading.len()) as f64
        - scale as f64;
    10f64.powf(log10 * exponent)
}

/// Upper median: the element at `size / 2` after an ascending sort
fn median(name: &str, values: &QueryValue) -> FunctionResult<QueryValue> {
    let QueryValue::Collection(items) = values else {
        return Ok(values.clone());
    };
    match items.len() {
        0 => return Ok(QueryValue::Integer(0)),
        1 => return Ok(items.as_slice()[0].clone()),
        _ => {}
    }

    let mut sorted: Vec<&QueryValue> = items.iter().collect();
    let first = sorted[0];
    for item in &sorted[1..] {
        if first.natural_cmp(item).is_none() {
            return Err(FunctionError::type_mismatch(
                name,
                0,
                format!("collection of {}", first.kind()),
                item,
            ));
        }
    }
    sorted.sort_by(|a, b| a.natural_cmp(b).unwrap_or(Ordering::Equal));
    Ok(sorted[sorted.len() / 2].clone())
}
