//! sum() and product() - exact decimal accumulation over nested collections

use crate::config::ProductSemantics;
use crate::model::QueryValue;
use crate::registry::function::{FunctionError, FunctionResult};
use bigdecimal::{BigDecimal, One, Zero};

/// How each element is folded into the running total
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combiner {
    /// `total + x`
    Add,
    /// `total * x`
    Multiply,
    /// `total + 1 / x`
    AddReciprocal,
}

impl Combiner {
    fn combine(
        &self,
        name: &str,
        total: &BigDecimal,
        value: &BigDecimal,
    ) -> FunctionResult<BigDecimal> {
        let combined = match self {
            Combiner::Add => total + value,
            Combiner::Multiply => total * value,
            Combiner::AddReciprocal => {
                if value.is_zero() {
                    return Err(FunctionError::evaluation(name, "division by zero"));
                }
                // 100 significant digits, never rounds a nonzero reciprocal to zero
                total + &value.inverse()
            }
        };
        Ok(combined)
    }
}

/// Running `(count, total)` of one accumulation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accumulator {
    count: usize,
    total: BigDecimal,
    combiner: Combiner,
}

impl Accumulator {
    /// Start an accumulation at `initial`
    pub fn new(initial: BigDecimal, combiner: Combiner) -> Self {
        Self {
            count: 0,
            total: initial,
            combiner,
        }
    }

    /// Number of leaves folded so far
    pub fn count(&self) -> usize {
        self.count
    }

    /// Current total
    pub fn total(&self) -> &BigDecimal {
        &self.total
    }

    /// Fold `value` into the total, flattening collections at any depth
    ///
    /// `index` is the position of the argument `value` came from and is reported
    /// in type errors.
    pub fn accumulate(&mut self, name: &str, index: usize, value: &QueryValue) -> FunctionResult<()> {
        match value {
            QueryValue::Collection(items) => {
                for item in items {
                    self.accumulate(name, index, item)?;
                }
                Ok(())
            }
            leaf if leaf.is_numeric() => {
                let decimal = leaf.to_big_decimal().ok_or_else(|| {
                    FunctionError::evaluation(
                        name,
                        format!("{leaf} cannot be represented as a decimal"),
                    )
                })?;
                self.total = self.combiner.combine(name, &self.total, &decimal)?;
                self.count += 1;
                Ok(())
            }
            other => Err(FunctionError::type_mismatch(name, index, "Number", other)),
        }
    }

    /// Fold every argument in order
    pub fn accumulate_all(&mut self, name: &str, args: &[QueryValue]) -> FunctionResult<()> {
        for (index, arg) in args.iter().enumerate() {
            self.accumulate(name, index, arg)?;
        }
        Ok(())
    }
}

/// sum(): exact total of every numeric leaf
///
/// The total comes back as `Decimal` when it fits one exactly, as the nearest
/// `Double` otherwise.
pub fn sum(name: &str, args: &[QueryValue]) -> FunctionResult<QueryValue> {
    let mut accumulator = Accumulator::new(BigDecimal::zero(), Combiner::Add);
    accumulator.accumulate_all(name, args)?;
    Ok(QueryValue::from_big_decimal(accumulator.total()))
}

/// product(): exact product of every numeric leaf, starting from one
///
/// Under [`ProductSemantics::LegacyAdditive`] the leaves are added to the
/// starting one instead.
pub fn product(
    name: &str,
    args: &[QueryValue],
    semantics: ProductSemantics,
) -> FunctionResult<QueryValue> {
    let combiner = match semantics {
        ProductSemantics::Multiply => Combiner::Multiply,
        ProductSemantics::LegacyAdditive => Combiner::Add,
    };
    let mut accumulator = Accumulator::new(BigDecimal::one(), combiner);
    accumulator.accumulate_all(name, args)?;
    Ok(QueryValue::from_big_decimal(accumulator.total()))
}
