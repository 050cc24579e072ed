//! Expression evaluation collaborator

use crate::model::QueryValue;
use crate::registry::function::FunctionResult;

/// Evaluates the configured expression function
///
/// The query engine supplies the implementation; arguments are passed through
/// unchanged.
pub trait ExpressionEvaluator: Send + Sync {
    /// Evaluate an expression call with already evaluated arguments
    fn evaluate_expression(&self, args: &[QueryValue]) -> FunctionResult<QueryValue>;
}

impl<F> ExpressionEvaluator for F
where
    F: Fn(&[QueryValue]) -> FunctionResult<QueryValue> + Send + Sync,
{
    fn evaluate_expression(&self, args: &[QueryValue]) -> FunctionResult<QueryValue> {
        self(args)
    }
}
