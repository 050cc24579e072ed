//! Math function group for query expression engines
//!
//! Evaluates named numeric functions (`sum`, `product`, `mean`, the narrowing
//! conversions and locale-aware number formatting) on already evaluated
//! arguments. Names that are not built-ins are delegated to a math operations
//! collaborator or to an expression evaluator.
//!
//! ```
//! use octofhir_query_math::{MathFunctionEvaluator, QueryValue};
//!
//! let evaluator = MathFunctionEvaluator::new();
//! let context = evaluator.default_context();
//! let values = QueryValue::collection(vec![QueryValue::Integer(1), QueryValue::Integer(4)]);
//! let mean = evaluator.evaluate("mean", &[values], &context).unwrap();
//! assert_eq!(mean, QueryValue::Double(2.5));
//! ```

pub mod config;
pub mod evaluator;
pub mod format;
pub mod model;
pub mod registry;

// Re-export main types
pub use config::{MathFunctionConfig, ProductSemantics};
pub use evaluator::MathFunctionEvaluator;
pub use format::{Locale, NumberFormatError, NumberFormatter};
pub use model::{Collection, QueryValue, ValueKind};
pub use registry::{
    BuiltinFunction, EvaluationContext, ExpressionEvaluator, FunctionError, FunctionKind,
    FunctionRegistry, FunctionResult, MathOperations, StandardMathOperations,
};
