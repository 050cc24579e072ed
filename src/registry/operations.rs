//! Math operations invoked by name
//!
//! Names that are not built-ins fall through to a [`MathOperations`]
//! implementation. [`StandardMathOperations`] covers the operation set of a
//! conventional math library so the evaluator works without extra wiring.

use crate::model::QueryValue;
use crate::registry::function::{FunctionError, FunctionResult};
use rustc_hash::FxHashMap;
use std::sync::LazyLock;

/// Discoverable set of math operations
pub trait MathOperations: Send + Sync {
    /// Names of every operation this collaborator can invoke
    fn operation_names(&self) -> Vec<String>;

    /// Invoke an operation by name
    ///
    /// Unknown names and unsupported argument counts fail with
    /// [`FunctionError::UnknownFunction`].
    fn invoke(&self, name: &str, args: &[QueryValue]) -> FunctionResult<QueryValue>;
}

/// Operations of a conventional math library over doubles and longs
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardMathOperations;

#[derive(Clone, Copy)]
enum Operation {
    /// Double in, double out
    Unary(fn(f64) -> f64),
    /// Two doubles in, double out
    Binary(fn(f64, f64) -> f64),
    /// Overflow-checked integer arithmetic
    Exact(ExactOp),
    Abs,
    Round,
    Max,
    Min,
    FloorDiv,
    FloorMod,
    GetExponent,
    Scalb,
}

#[derive(Clone, Copy)]
enum ExactOp {
    Add,
    Subtract,
    Multiply,
    Negate,
}

impl ExactOp {
    fn apply(self, x: i64, y: i64) -> Option<i64> {
        match self {
            ExactOp::Add => x.checked_add(y),
            ExactOp::Subtract => x.checked_sub(y),
            ExactOp::Multiply => x.checked_mul(y),
            ExactOp::Negate => x.checked_neg(),
        }
    }
}

impl Operation {
    fn arity(&self) -> usize {
        match self {
            Operation::Unary(_)
            | Operation::Exact(ExactOp::Negate)
            | Operation::Abs
            | Operation::Round
            | Operation::GetExponent => 1,
            _ => 2,
        }
    }
}

static OPERATIONS: LazyLock<FxHashMap<&'static str, Operation>> = LazyLock::new(|| {
    let unary: [(&'static str, fn(f64) -> f64); 25] = [
        ("acos", f64::acos),
        ("asin", f64::asin),
        ("atan", f64::atan),
        ("cbrt", f64::cbrt),
        ("ceil", f64::ceil),
        ("cos", f64::cos),
        ("cosh", f64::cosh),
        ("exp", f64::exp),
        ("expm1", f64::exp_m1),
        ("floor", f64::floor),
        ("log", f64::ln),
        ("log10", f64::log10),
        ("log1p", f64::ln_1p),
        ("nextDown", next_down),
        ("nextUp", next_up),
        ("rint", f64::round_ties_even),
        ("signum", signum),
        ("sin", f64::sin),
        ("sinh", f64::sinh),
        ("sqrt", f64::sqrt),
        ("tan", f64::tan),
        ("tanh", f64::tanh),
        ("toDegrees", f64::to_degrees),
        ("toRadians", f64::to_radians),
        ("ulp", ulp),
    ];
    let binary: [(&'static str, fn(f64, f64) -> f64); 6] = [
        ("atan2", f64::atan2),
        ("copySign", f64::copysign),
        ("hypot", f64::hypot),
        ("nextAfter", next_after),
        ("pow", f64::powf),
        ("IEEEremainder", ieee_remainder),
    ];
    let checked = [
        ("addExact", ExactOp::Add),
        ("subtractExact", ExactOp::Subtract),
        ("multiplyExact", ExactOp::Multiply),
        ("negateExact", ExactOp::Negate),
    ];

    let mut operations = FxHashMap::default();
    for (name, f) in unary {
        operations.insert(name, Operation::Unary(f));
    }
    for (name, f) in binary {
        operations.insert(name, Operation::Binary(f));
    }
    for (name, op) in checked {
        operations.insert(name, Operation::Exact(op));
    }
    operations.insert("abs", Operation::Abs);
    operations.insert("round", Operation::Round);
    operations.insert("max", Operation::Max);
    operations.insert("min", Operation::Min);
    operations.insert("floorDiv", Operation::FloorDiv);
    operations.insert("floorMod", Operation::FloorMod);
    operations.insert("getExponent", Operation::GetExponent);
    operations.insert("scalb", Operation::Scalb);
    operations
});

impl MathOperations for StandardMathOperations {
    fn operation_names(&self) -> Vec<String> {
        OPERATIONS.keys().map(|name| name.to_string()).collect()
    }

    fn invoke(&self, name: &str, args: &[QueryValue]) -> FunctionResult<QueryValue> {
        let operation = OPERATIONS
            .get(name)
            .filter(|operation| operation.arity() == args.len())
            .ok_or_else(|| FunctionError::UnknownFunction {
                name: name.to_string(),
                arity: args.len(),
            })?;

        let result = match *operation {
            Operation::Unary(f) => QueryValue::Double(f(double_arg(name, args, 0)?)),
            Operation::Binary(f) => {
                QueryValue::Double(f(double_arg(name, args, 0)?, double_arg(name, args, 1)?))
            }
            Operation::Exact(op) => exact(name, op, args)?,
            Operation::Abs => abs(name, &args[0])?,
            Operation::Round => QueryValue::Long(round(double_arg(name, args, 0)?)),
            Operation::Max => extremum(name, args, std::cmp::Ordering::Greater)?,
            Operation::Min => extremum(name, args, std::cmp::Ordering::Less)?,
            Operation::FloorDiv => {
                let (x, y) = (long_arg(name, args, 0)?, divisor(name, args)?);
                QueryValue::Long(floor_div(x, y))
            }
            Operation::FloorMod => {
                let (x, y) = (long_arg(name, args, 0)?, divisor(name, args)?);
                QueryValue::Long(x.wrapping_sub(floor_div(x, y).wrapping_mul(y)))
            }
            Operation::GetExponent => {
                QueryValue::Integer(get_exponent(double_arg(name, args, 0)?))
            }
            Operation::Scalb => {
                QueryValue::Double(scalb(double_arg(name, args, 0)?, long_arg(name, args, 1)?))
            }
        };

        log::trace!("Invoked math operation '{name}' -> {result}");
        Ok(result)
    }
}

fn double_arg(name: &str, args: &[QueryValue], index: usize) -> FunctionResult<f64> {
    args[index]
        .to_f64()
        .ok_or_else(|| FunctionError::type_mismatch(name, index, "Number", &args[index]))
}

fn long_arg(name: &str, args: &[QueryValue], index: usize) -> FunctionResult<i64> {
    args[index]
        .as_i64()
        .ok_or_else(|| FunctionError::type_mismatch(name, index, "Long", &args[index]))
}

fn divisor(name: &str, args: &[QueryValue]) -> FunctionResult<i64> {
    match long_arg(name, args, 1)? {
        0 => Err(FunctionError::evaluation(name, "/ by zero")),
        y => Ok(y),
    }
}

/// Checked arithmetic in the width of the arguments
///
/// All-`Integer` (or narrower) arguments overflow at 32 bits and give an
/// `Integer`, anything else overflows at 64 bits and gives a `Long`.
fn exact(name: &str, op: ExactOp, args: &[QueryValue]) -> FunctionResult<QueryValue> {
    let x = long_arg(name, args, 0)?;
    let y = match args.get(1) {
        Some(_) => long_arg(name, args, 1)?,
        None => 0,
    };
    let narrow = args.iter().all(|arg| {
        matches!(
            arg,
            QueryValue::Byte(_) | QueryValue::Short(_) | QueryValue::Integer(_)
        )
    });

    let result = op.apply(x, y);
    if narrow {
        result
            .and_then(|value| i32::try_from(value).ok())
            .map(QueryValue::Integer)
            .ok_or_else(|| FunctionError::evaluation(name, "integer overflow"))
    } else {
        result
            .map(QueryValue::Long)
            .ok_or_else(|| FunctionError::evaluation(name, "long overflow"))
    }
}

fn abs(name: &str, value: &QueryValue) -> FunctionResult<QueryValue> {
    let result = match value {
        QueryValue::Byte(v) => QueryValue::Byte(v.wrapping_abs()),
        QueryValue::Short(v) => QueryValue::Short(v.wrapping_abs()),
        QueryValue::Integer(v) => QueryValue::Integer(v.wrapping_abs()),
        QueryValue::Long(v) => QueryValue::Long(v.wrapping_abs()),
        other => QueryValue::Double(
            other
                .to_f64()
                .ok_or_else(|| FunctionError::type_mismatch(name, 0, "Number", other))?
                .abs(),
        ),
    };
    Ok(result)
}

/// `max`/`min`: exact on integral arguments, NaN propagating on doubles
fn extremum(
    name: &str,
    args: &[QueryValue],
    wanted: std::cmp::Ordering,
) -> FunctionResult<QueryValue> {
    if let (Some(x), Some(y)) = (args[0].as_i64(), args[1].as_i64()) {
        let pick = if y.cmp(&x) == wanted { y } else { x };
        return Ok(QueryValue::Long(pick));
    }

    let (x, y) = (double_arg(name, args, 0)?, double_arg(name, args, 1)?);
    let pick = if x.is_nan() || y.is_nan() {
        f64::NAN
    } else if y.partial_cmp(&x) == Some(wanted) {
        y
    } else {
        x
    };
    Ok(QueryValue::Double(pick))
}

fn floor_div(x: i64, y: i64) -> i64 {
    let quotient = x.wrapping_div(y);
    if x.wrapping_rem(y) != 0 && ((x < 0) != (y < 0)) {
        quotient - 1
    } else {
        quotient
    }
}

/// Sign of `x`, keeping signed zeros and NaN as they are
fn signum(x: f64) -> f64 {
    if x == 0.0 || x.is_nan() { x } else { x.signum() }
}

/// Nearest `i64`, ties toward positive infinity; saturating, NaN becomes zero
fn round(x: f64) -> i64 {
    let floor = x.floor();
    // may round for negative x, but never across 0.5
    let fraction = x - floor;
    let rounded = if fraction >= 0.5 { floor + 1.0 } else { floor };
    rounded as i64
}

/// Remainder of `x / y` with the quotient rounded to the nearest even integer
///
/// Computed without forming `x / y`: `x % 2y` is exact and keeps the parity of
/// the quotient.
fn ieee_remainder(x: f64, y: f64) -> f64 {
    if x.is_infinite() || y == 0.0 || x.is_nan() || y.is_nan() {
        return f64::NAN;
    }
    if y.is_infinite() {
        return x;
    }

    let divisor = y.abs();
    // 2 * divisor may overflow to infinity, and then the remainder is x itself
    let mut remainder = (x % (2.0 * divisor)).abs();
    let odd = remainder >= divisor;
    if odd {
        remainder -= divisor;
    }
    let upper = divisor - remainder;
    if remainder > upper || (remainder == upper && odd) {
        remainder -= divisor;
    }
    if x.is_sign_negative() { -remainder } else { remainder }
}

fn next_up(x: f64) -> f64 {
    if x.is_nan() || x == f64::INFINITY {
        return x;
    }
    if x == 0.0 {
        return f64::from_bits(1);
    }
    let bits = x.to_bits();
    f64::from_bits(if x > 0.0 { bits + 1 } else { bits - 1 })
}

fn next_down(x: f64) -> f64 {
    -next_up(-x)
}

fn next_after(start: f64, direction: f64) -> f64 {
    if start.is_nan() || direction.is_nan() {
        f64::NAN
    } else if start == direction {
        direction
    } else if direction > start {
        next_up(start)
    } else {
        next_down(start)
    }
}

/// Distance to the next double of larger magnitude
fn ulp(x: f64) -> f64 {
    let x = x.abs();
    if x.is_nan() || x.is_infinite() {
        x
    } else if x == f64::MAX {
        x - next_down(x)
    } else {
        next_up(x) - x
    }
}

/// Unbiased binary exponent; 1024 for NaN and infinities, -1023 for zero and
/// subnormals
fn get_exponent(x: f64) -> i32 {
    ((x.to_bits() >> 52) & 0x7ff) as i32 - 1023
}

/// `x * 2^n` rounded once
fn scalb(x: f64, n: i64) -> f64 {
    const STEP: i64 = 1000;
    // past 2200 every finite input has already overflowed or vanished
    let mut n = n.clamp(-2200, 2200);
    // the partial step goes first so only the last multiplication can round
    let mut result = x * 2f64.powi((n % STEP) as i32);
    n -= n % STEP;
    while n != 0 {
        let step = n.signum() * STEP;
        result *= 2f64.powi(step as i32);
        n -= step;
    }
    result
}
