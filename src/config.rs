// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Math function group configuration options

use crate::format::Locale;
use serde::{Deserialize, Serialize};

/// Default name of the function group
pub const DEFAULT_GROUP_NAME: &str = "math";

/// Default name of the expression function
pub const DEFAULT_EVAL_EXPRESSION_NAME: &str = "evalExpression";

/// How `product` folds its arguments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSemantics {
    /// Multiply every element, starting from one
    #[default]
    Multiply,
    /// Add every element to a starting one
    LegacyAdditive,
}

/// Configuration for a math function evaluator, read once at construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MathFunctionConfig {
    /// Name of the function group registered with the query engine
    pub group_name: String,

    /// Name routed to the expression evaluator
    pub eval_expression_name: String,

    /// Locale used when the caller does not supply one
    pub default_locale: Locale,

    /// Behavior of the `product` function
    pub product_semantics: ProductSemantics,
}

impl MathFunctionConfig {
    /// Create a configuration with custom names
    pub fn new(group_name: impl Into<String>, eval_expression_name: impl Into<String>) -> Self {
        Self {
            group_name: group_name.into(),
            eval_expression_name: eval_expression_name.into(),
            ..Self::default()
        }
    }

    /// Create a configuration whose `product` adds instead of multiplying
    pub fn legacy() -> Self {
        Self {
            product_semantics: ProductSemantics::LegacyAdditive,
            ..Self::default()
        }
    }

    /// Set the default locale
    pub fn with_default_locale(mut self, locale: Locale) -> Self {
        self.default_locale = locale;
        self
    }

    /// Load a configuration from JSON, missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for MathFunctionConfig {
    fn default() -> Self {
        Self {
            group_name: DEFAULT_GROUP_NAME.to_string(),
            eval_expression_name: DEFAULT_EVAL_EXPRESSION_NAME.to_string(),
            default_locale: Locale::en_us(),
            product_semantics: ProductSemantics::Multiply,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MathFunctionConfig::default();
        assert_eq!(config.group_name, "math");
        assert_eq!(config.eval_expression_name, "evalExpression");
        assert_eq!(config.default_locale, Locale::en_us());
        assert_eq!(config.product_semantics, ProductSemantics::Multiply);
    }

    #[test]
    fn test_from_json() {
        let config = MathFunctionConfig::from_json_str(
            r#"{"default_locale": "de_DE", "product_semantics": "legacy_additive"}"#,
        )
        .unwrap();
        assert_eq!(config.group_name, "math");
        assert_eq!(config.default_locale, Locale::new("de", Some("DE")));
        assert_eq!(config.product_semantics, ProductSemantics::LegacyAdditive);

        assert!(MathFunctionConfig::from_json_str(r#"{"default_locale": ""}"#).is_err());
    }

    #[test]
    fn test_named_constructors() {
        let config = MathFunctionConfig::new("numbers", "eval");
        assert_eq!(config.group_name, "numbers");
        assert_eq!(config.eval_expression_name, "eval");
        assert_eq!(
            MathFunctionConfig::legacy().product_semantics,
            ProductSemantics::LegacyAdditive
        );
    }
}
