//! Function registry for the math function group
//!
//! This module provides the name registry, the built-in function catalogue and
//! the collaborator traits that unregistered names are delegated to.

#![warn(missing_docs)]

pub mod expression;
pub mod function;
pub mod functions;
pub mod operations;
pub mod signature;

pub use expression::ExpressionEvaluator;
pub use function::{
    BuiltinFunction, EvaluationContext, FunctionError, FunctionKind, FunctionRegistry,
    FunctionResult,
};
pub use operations::{MathOperations, StandardMathOperations};
pub use signature::{FunctionSignature, ParameterInfo};
