//! Function registry, built-in function catalogue and evaluation errors

use crate::format::{Locale, NumberFormatError};
use crate::model::{QueryValue, ValueKind};
use crate::registry::operations::MathOperations;
use crate::registry::signature::{FunctionSignature, ParameterInfo};
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

/// Result type for function operations
pub type FunctionResult<T> = Result<T, FunctionError>;

/// Function evaluation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FunctionError {
    /// Invalid number of arguments
    #[error("Function '{name}' expects {min}-{} arguments, got {actual}", max.map_or("∞".to_string(), |n| n.to_string()))]
    InvalidArity {
        /// Function name
        name: String,
        /// Minimum arguments
        min: usize,
        /// Maximum arguments (None for unlimited)
        max: Option<usize>,
        /// Actual arguments provided
        actual: usize,
    },

    /// Invalid argument type
    #[error("Function '{name}' argument {index} expects {expected}, got {actual}")]
    InvalidArgumentType {
        /// Function name
        name: String,
        /// Argument index
        index: usize,
        /// Expected type
        expected: String,
        /// Actual type
        actual: String,
    },

    /// Malformed decimal pattern
    #[error("Malformed number pattern: {0}")]
    FormatPattern(#[from] NumberFormatError),

    /// Source text does not match the pattern
    #[error("Function '{name}' cannot parse its input: {source}")]
    Parse {
        /// Function name
        name: String,
        /// Underlying parse failure, carries the error position
        #[source]
        source: NumberFormatError,
    },

    /// Name not resolvable by any dispatch path
    #[error("Unknown function '{name}' with {arity} arguments")]
    UnknownFunction {
        /// Function name
        name: String,
        /// Number of arguments of the failed call
        arity: usize,
    },

    /// Runtime evaluation error
    #[error("Function '{name}' evaluation error: {message}")]
    EvaluationError {
        /// Function name
        name: String,
        /// Error message
        message: String,
    },
}

impl FunctionError {
    /// Create an evaluation error
    pub fn evaluation(name: impl Into<String>, message: impl Into<String>) -> Self {
        FunctionError::EvaluationError {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a type mismatch error for the argument at `index`
    pub fn type_mismatch(
        name: impl Into<String>,
        index: usize,
        expected: impl Into<String>,
        actual: &QueryValue,
    ) -> Self {
        FunctionError::InvalidArgumentType {
            name: name.into(),
            index,
            expected: expected.into(),
            actual: actual.kind().to_string(),
        }
    }
}

/// Context for function evaluation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationContext {
    /// Locale of the caller, drives number symbols and currency conventions
    pub locale: Locale,
}

impl EvaluationContext {
    /// Create a new evaluation context
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }
}

/// Built-in functions implemented by this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinFunction {
    /// Decimal total of all numeric arguments
    Sum,
    /// Decimal product of all numeric arguments
    Product,
    /// Statistical mean (arithmetic, geometric, harmonic or median)
    Mean,
    /// Narrow to an 8-bit integer
    ByteValue,
    /// Narrow to a 16-bit integer
    ShortValue,
    /// Narrow to a 32-bit integer
    IntegerValue,
    /// Narrow to a 64-bit integer
    LongValue,
    /// Narrow to a 32-bit float
    FloatValue,
    /// Convert to a 64-bit float
    DoubleValue,
    /// Format with an explicit decimal pattern
    NumberFormat,
    /// Format with the currency convention of the locale
    CurrencyFormat,
    /// Format with the percent convention of the locale
    PercentFormat,
    /// Parse text with an explicit decimal pattern
    ParseNumber,
}

static SIGNATURES: LazyLock<Vec<FunctionSignature>> = LazyLock::new(|| {
    BuiltinFunction::ALL
        .iter()
        .map(|builtin| builtin.build_signature())
        .collect()
});

impl BuiltinFunction {
    /// Every built-in, in catalogue order
    pub const ALL: [BuiltinFunction; 13] = [
        BuiltinFunction::Sum,
        BuiltinFunction::Product,
        BuiltinFunction::Mean,
        BuiltinFunction::ByteValue,
        BuiltinFunction::ShortValue,
        BuiltinFunction::IntegerValue,
        BuiltinFunction::LongValue,
        BuiltinFunction::FloatValue,
        BuiltinFunction::DoubleValue,
        BuiltinFunction::NumberFormat,
        BuiltinFunction::CurrencyFormat,
        BuiltinFunction::PercentFormat,
        BuiltinFunction::ParseNumber,
    ];

    /// Get the function name
    pub fn name(&self) -> &'static str {
        match self {
            BuiltinFunction::Sum => "sum",
            BuiltinFunction::Product => "product",
            BuiltinFunction::Mean => "mean",
            BuiltinFunction::ByteValue => "byteValue",
            BuiltinFunction::ShortValue => "shortValue",
            BuiltinFunction::IntegerValue => "integerValue",
            BuiltinFunction::LongValue => "longValue",
            BuiltinFunction::FloatValue => "floatValue",
            BuiltinFunction::DoubleValue => "doubleValue",
            BuiltinFunction::NumberFormat => "numberFormat",
            BuiltinFunction::CurrencyFormat => "currencyFormat",
            BuiltinFunction::PercentFormat => "percentFormat",
            BuiltinFunction::ParseNumber => "parseNumber",
        }
    }

    /// Look up a built-in by its case-sensitive name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|builtin| builtin.name() == name)
    }

    /// Get the function signature
    pub fn signature(&self) -> &'static FunctionSignature {
        &SIGNATURES[*self as usize]
    }

    /// Validate arguments against the signature
    pub fn validate_args(&self, args: &[QueryValue]) -> FunctionResult<()> {
        self.signature().validate_args(args)
    }

    fn build_signature(&self) -> FunctionSignature {
        let name = self.name();
        match self {
            BuiltinFunction::Sum | BuiltinFunction::Product => FunctionSignature::variadic(
                name,
                vec![ParameterInfo::required("values", ValueKind::Any)],
                ValueKind::Decimal,
            ),
            BuiltinFunction::Mean => FunctionSignature::new(
                name,
                vec![
                    ParameterInfo::required("values", ValueKind::Any),
                    ParameterInfo::optional("variant", ValueKind::String),
                ],
                ValueKind::Any,
            ),
            BuiltinFunction::ByteValue => narrowing_signature(name, ValueKind::Byte),
            BuiltinFunction::ShortValue => narrowing_signature(name, ValueKind::Short),
            BuiltinFunction::IntegerValue => narrowing_signature(name, ValueKind::Integer),
            BuiltinFunction::LongValue => narrowing_signature(name, ValueKind::Long),
            BuiltinFunction::FloatValue => narrowing_signature(name, ValueKind::Float),
            BuiltinFunction::DoubleValue => narrowing_signature(name, ValueKind::Double),
            BuiltinFunction::NumberFormat => FunctionSignature::new(
                name,
                vec![
                    ParameterInfo::required("pattern", ValueKind::String),
                    ParameterInfo::required("value", ValueKind::Number),
                ],
                ValueKind::String,
            ),
            BuiltinFunction::CurrencyFormat | BuiltinFunction::PercentFormat => {
                FunctionSignature::new(
                    name,
                    vec![ParameterInfo::required("value", ValueKind::Number)],
                    ValueKind::String,
                )
            }
            BuiltinFunction::ParseNumber => FunctionSignature::new(
                name,
                vec![
                    ParameterInfo::required("pattern", ValueKind::String),
                    ParameterInfo::required("source", ValueKind::String),
                ],
                ValueKind::Number,
            ),
        }
    }
}

fn narrowing_signature(name: &str, return_type: ValueKind) -> FunctionSignature {
    FunctionSignature::new(
        name,
        vec![ParameterInfo::required("value", ValueKind::Number)],
        return_type,
    )
}

impl fmt::Display for BuiltinFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a registered name is evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    /// Algorithm implemented by this crate
    Builtin(BuiltinFunction),
    /// Delegated to the attached [`ExpressionEvaluator`](crate::registry::ExpressionEvaluator)
    Expression,
    /// Delegated to the [`MathOperations`] collaborator
    Operation,
}

/// Registry of the names claimed by one evaluator
///
/// Built once and read-only afterwards. Later registrations replace earlier
/// ones, so the construction order gives built-ins precedence over the
/// expression name, which in turn wins over discovered operations.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    group_name: String,
    functions: FxHashMap<String, FunctionKind>,
}

impl FunctionRegistry {
    /// Create an empty registry for a function group
    pub fn new(group_name: impl Into<String>) -> Self {
        Self {
            group_name: group_name.into(),
            functions: FxHashMap::default(),
        }
    }

    /// Build the registry from discovered operations, the expression name and the built-ins
    pub fn build(
        group_name: impl Into<String>,
        operations: &dyn MathOperations,
        expression_name: &str,
    ) -> Self {
        let mut registry = Self::new(group_name);

        for name in operations.operation_names() {
            registry.register(name, FunctionKind::Operation);
        }

        if let Some(FunctionKind::Operation) =
            registry.register(expression_name, FunctionKind::Expression)
        {
            log::warn!(
                "Expression function name '{expression_name}' shadows a math operation of the same name"
            );
        }

        register_builtin_functions(&mut registry);

        log::debug!(
            "Built function registry for group '{}' with {} functions",
            registry.group_name,
            registry.len()
        );
        registry
    }

    /// Register a name, returning the kind it replaced
    pub fn register(&mut self, name: impl Into<String>, kind: FunctionKind) -> Option<FunctionKind> {
        self.functions.insert(name.into(), kind)
    }

    /// Resolve a name to the way it is evaluated
    pub fn resolve(&self, name: &str) -> Option<FunctionKind> {
        self.functions.get(name).copied()
    }

    /// Check if a name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Get all registered names, sorted
    pub fn function_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Get the number of registered names
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Get the function group name
    pub fn group_name(&self) -> &str {
        &self.group_name
    }
}

/// Register all built-in functions
pub fn register_builtin_functions(registry: &mut FunctionRegistry) {
    for builtin in BuiltinFunction::ALL {
        if let Some(FunctionKind::Expression) =
            registry.register(builtin.name(), FunctionKind::Builtin(builtin))
        {
            log::warn!(
                "Expression function name '{}' is taken by a built-in and will not reach the expression evaluator",
                builtin.name()
            );
        }
    }
}
