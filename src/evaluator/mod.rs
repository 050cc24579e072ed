//! Math function evaluator - the main entry point for the query engine
//!
//! Resolves a function name to a built-in algorithm, the expression evaluator
//! or the math operations collaborator, and runs it against already evaluated
//! arguments.

use crate::config::MathFunctionConfig;
use crate::model::{NumericWidth, QueryValue};
use crate::registry::functions;
use crate::registry::{
    BuiltinFunction, EvaluationContext, ExpressionEvaluator, FunctionError, FunctionKind,
    FunctionRegistry, FunctionResult, MathOperations, StandardMathOperations,
};
use std::fmt;
use std::sync::Arc;

/// Evaluator for one math function group
///
/// Immutable after construction and safe to share between threads.
#[derive(Clone)]
pub struct MathFunctionEvaluator {
    registry: FunctionRegistry,
    config: MathFunctionConfig,
    operations: Arc<dyn MathOperations>,
    expression_evaluator: Option<Arc<dyn ExpressionEvaluator>>,
}

impl Default for MathFunctionEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl MathFunctionEvaluator {
    /// Create an evaluator with the default configuration and standard operations
    pub fn new() -> Self {
        Self::with_config(MathFunctionConfig::default())
    }

    /// Create an evaluator with a custom configuration and standard operations
    pub fn with_config(config: MathFunctionConfig) -> Self {
        Self::with_operations(config, Arc::new(StandardMathOperations))
    }

    /// Create an evaluator with a custom math operations collaborator
    pub fn with_operations(config: MathFunctionConfig, operations: Arc<dyn MathOperations>) -> Self {
        let registry = FunctionRegistry::build(
            config.group_name.clone(),
            operations.as_ref(),
            &config.eval_expression_name,
        );
        Self {
            registry,
            config,
            operations,
            expression_evaluator: None,
        }
    }

    /// Attach the collaborator that handles the expression function
    pub fn with_expression_evaluator(mut self, evaluator: Arc<dyn ExpressionEvaluator>) -> Self {
        self.expression_evaluator = Some(evaluator);
        self
    }

    /// Get the function registry
    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    /// Get the configuration
    pub fn config(&self) -> &MathFunctionConfig {
        &self.config
    }

    /// Get all claimed function names, sorted
    pub fn function_names(&self) -> Vec<&str> {
        self.registry.function_names()
    }

    /// Get the function group name
    pub fn group_name(&self) -> &str {
        self.registry.group_name()
    }

    /// Context carrying the configured default locale
    pub fn default_context(&self) -> EvaluationContext {
        EvaluationContext::new(self.config.default_locale.clone())
    }

    /// Evaluate a function call
    pub fn evaluate(
        &self,
        name: &str,
        args: &[QueryValue],
        context: &EvaluationContext,
    ) -> FunctionResult<QueryValue> {
        if name.is_empty() {
            return Err(FunctionError::UnknownFunction {
                name: String::new(),
                arity: args.len(),
            });
        }

        match self.registry.resolve(name) {
            Some(FunctionKind::Builtin(builtin)) => {
                log::trace!("Dispatching '{name}' to built-in {builtin:?}");
                self.evaluate_builtin(builtin, args, context)
            }
            Some(FunctionKind::Expression) => {
                log::trace!("Dispatching '{name}' to the expression evaluator");
                let evaluator = self.expression_evaluator.as_ref().ok_or_else(|| {
                    FunctionError::evaluation(name, "no expression evaluator attached")
                })?;
                evaluator.evaluate_expression(args)
            }
            Some(FunctionKind::Operation) | None => {
                log::trace!("Dispatching '{name}' to math operations");
                self.operations.invoke(name, args)
            }
        }
    }

    fn evaluate_builtin(
        &self,
        builtin: BuiltinFunction,
        args: &[QueryValue],
        context: &EvaluationContext,
    ) -> FunctionResult<QueryValue> {
        builtin.validate_args(args)?;
        let name = builtin.name();

        match builtin {
            BuiltinFunction::Sum => functions::sum(name, args),
            BuiltinFunction::Product => {
                functions::product(name, args, self.config.product_semantics)
            }
            BuiltinFunction::Mean => functions::mean(name, args),
            BuiltinFunction::ByteValue => functions::narrow_value(name, NumericWidth::Byte, args),
            BuiltinFunction::ShortValue => {
                functions::narrow_value(name, NumericWidth::Short, args)
            }
            BuiltinFunction::IntegerValue => {
                functions::narrow_value(name, NumericWidth::Integer, args)
            }
            BuiltinFunction::LongValue => functions::narrow_value(name, NumericWidth::Long, args),
            BuiltinFunction::FloatValue => {
                functions::narrow_value(name, NumericWidth::Float, args)
            }
            BuiltinFunction::DoubleValue => {
                functions::narrow_value(name, NumericWidth::Double, args)
            }
            BuiltinFunction::NumberFormat => functions::number_format(name, args, context),
            BuiltinFunction::CurrencyFormat => functions::currency_format(name, args, context),
            BuiltinFunction::PercentFormat => functions::percent_format(name, args, context),
            BuiltinFunction::ParseNumber => functions::parse_number(name, args, context),
        }
    }
}

impl fmt::Debug for MathFunctionEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MathFunctionEvaluator")
            .field("group_name", &self.registry.group_name())
            .field("functions", &self.registry.len())
            .field("config", &self.config)
            .field("expression_evaluator", &self.expression_evaluator.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_evaluator_is_shareable() {
        assert_send_sync::<MathFunctionEvaluator>();
    }

    #[test]
    fn test_dispatch_paths() {
        let evaluator = MathFunctionEvaluator::new();
        let context = evaluator.default_context();

        assert_eq!(
            evaluator
                .evaluate("sum", &[QueryValue::Integer(1), QueryValue::Integer(2)], &context)
                .unwrap(),
            QueryValue::Decimal(Decimal::from(3))
        );
        assert_eq!(
            evaluator
                .evaluate("sqrt", &[QueryValue::Double(9.0)], &context)
                .unwrap(),
            QueryValue::Double(3.0)
        );
        assert!(matches!(
            evaluator.evaluate("evalExpression", &[], &context),
            Err(FunctionError::EvaluationError { .. })
        ));
        assert!(matches!(
            evaluator.evaluate("", &[], &context),
            Err(FunctionError::UnknownFunction { .. })
        ));
    }

    #[test]
    fn test_builtin_arity_is_checked() {
        let evaluator = MathFunctionEvaluator::new();
        let context = evaluator.default_context();
        assert!(matches!(
            evaluator.evaluate("byteValue", &[], &context),
            Err(FunctionError::InvalidArity { min: 1, .. })
        ));
        assert!(matches!(
            evaluator.evaluate("sum", &[], &context),
            Err(FunctionError::InvalidArity { .. })
        ));
    }
}
