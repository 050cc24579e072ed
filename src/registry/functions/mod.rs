//! Built-in function implementations

pub mod accumulate;
pub mod format;
pub mod mean;
pub mod narrowing;

pub use accumulate::{Accumulator, Combiner, product, sum};
pub use format::{currency_format, number_format, parse_number, percent_format};
pub use mean::{MeanKind, mean};
pub use narrowing::narrow_value;
