//! Data model and value types for math function evaluation
//!
//! This module provides the closed value union passed between the query engine
//! and the math functions, its kind descriptors and the narrowing conversions.

pub mod narrowing;
pub mod types;
pub mod value;

pub use narrowing::{NumericWidth, narrow};
pub use types::ValueKind;
pub use value::{Collection, QueryValue};
