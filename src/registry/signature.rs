//! Function signatures for arity and argument kind checking

use crate::model::{QueryValue, ValueKind};
use crate::registry::function::{FunctionError, FunctionResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Function signature used to validate calls before evaluation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionSignature {
    /// Function name
    pub name: String,
    /// Parameter kinds
    pub parameters: Vec<ParameterInfo>,
    /// Return kind
    pub return_type: ValueKind,
    /// Minimum number of arguments
    pub min_arity: usize,
    /// Maximum number of arguments (None for variadic)
    pub max_arity: Option<usize>,
}

/// Parameter information for functions
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterInfo {
    /// Parameter name
    pub name: String,
    /// Parameter kind
    pub param_type: ValueKind,
    /// Whether this parameter is optional
    pub optional: bool,
}

impl FunctionSignature {
    /// Create a new function signature
    pub fn new(
        name: impl Into<String>,
        parameters: Vec<ParameterInfo>,
        return_type: ValueKind,
    ) -> Self {
        let required_params = parameters.iter().filter(|p| !p.optional).count();
        let max_arity = Some(parameters.len());

        Self {
            name: name.into(),
            parameters,
            return_type,
            min_arity: required_params,
            max_arity,
        }
    }

    /// Create a variadic function signature
    pub fn variadic(
        name: impl Into<String>,
        parameters: Vec<ParameterInfo>,
        return_type: ValueKind,
    ) -> Self {
        let required_params = parameters.iter().filter(|p| !p.optional).count();

        Self {
            name: name.into(),
            parameters,
            return_type,
            min_arity: required_params,
            max_arity: None,
        }
    }

    /// Validate arity and declared parameter kinds of a call
    ///
    /// Arguments past the declared parameters of a variadic signature are not
    /// kind-checked; the function itself validates them.
    pub fn validate_args(&self, args: &[QueryValue]) -> FunctionResult<()> {
        let arg_count = args.len();
        let too_many = self.max_arity.is_some_and(|max| arg_count > max);

        if arg_count < self.min_arity || too_many {
            return Err(FunctionError::InvalidArity {
                name: self.name.clone(),
                min: self.min_arity,
                max: self.max_arity,
                actual: arg_count,
            });
        }

        for (i, (arg, param)) in args.iter().zip(&self.parameters).enumerate() {
            let arg_type = arg.kind();
            if !param.param_type.is_compatible_with(&arg_type) {
                return Err(FunctionError::InvalidArgumentType {
                    name: self.name.clone(),
                    index: i,
                    expected: param.param_type.to_string(),
                    actual: arg_type.to_string(),
                });
            }
        }

        Ok(())
    }
}

impl ParameterInfo {
    /// Create a required parameter
    pub fn required(name: impl Into<String>, param_type: ValueKind) -> Self {
        Self {
            name: name.into(),
            param_type,
            optional: false,
        }
    }

    /// Create an optional parameter
    pub fn optional(name: impl Into<String>, param_type: ValueKind) -> Self {
        Self {
            name: name.into(),
            param_type,
            optional: true,
        }
    }
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", param.name, param.param_type)?;
            if param.optional {
                write!(f, "?")?;
            }
        }
        if self.max_arity.is_none() {
            write!(f, ", ...")?;
        }
        write!(f, ") -> {}", self.return_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_signature_validation() {
        let sig = FunctionSignature::new(
            "test",
            vec![
                ParameterInfo::required("x", ValueKind::Number),
                ParameterInfo::optional("y", ValueKind::String),
            ],
            ValueKind::Double,
        );

        assert!(sig.validate_args(&[QueryValue::Integer(1)]).is_ok());
        assert!(
            sig.validate_args(&[QueryValue::Double(1.0), QueryValue::string("a")])
                .is_ok()
        );
        assert!(matches!(
            sig.validate_args(&[]),
            Err(FunctionError::InvalidArity { min: 1, .. })
        ));
        assert!(matches!(
            sig.validate_args(&[QueryValue::string("1")]),
            Err(FunctionError::InvalidArgumentType { index: 0, .. })
        ));
    }

    #[test]
    fn test_variadic_signature() {
        let sig = FunctionSignature::variadic(
            "sum",
            vec![ParameterInfo::required("values", ValueKind::Any)],
            ValueKind::Decimal,
        );
        let args = vec![QueryValue::Integer(1); 10];
        assert!(sig.validate_args(&args).is_ok());
        assert_eq!(sig.to_string(), "sum(values: Any, ...) -> Decimal");
    }
}
