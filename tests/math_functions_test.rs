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

//! Integration tests for function dispatch and the accumulating functions

use octofhir_query_math::*;
use pretty_assertions::assert_eq;
use rstest::rstest;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn ints(values: &[i64]) -> QueryValue {
    QueryValue::collection(values.iter().copied().map(QueryValue::Long).collect())
}

fn dec(text: &str) -> QueryValue {
    QueryValue::Decimal(Decimal::from_str(text).unwrap())
}

fn eval(name: &str, args: &[QueryValue]) -> FunctionResult<QueryValue> {
    let evaluator = MathFunctionEvaluator::new();
    evaluator.evaluate(name, args, &evaluator.default_context())
}

#[rstest]
#[case::flat(vec![QueryValue::Integer(1), QueryValue::Integer(2), QueryValue::Integer(3)])]
#[case::one_collection(vec![ints(&[1, 2, 3])])]
#[case::nested(vec![QueryValue::collection(vec![ints(&[1]), ints(&[2, 3])])])]
#[case::mixed(vec![QueryValue::Byte(1), ints(&[2]), QueryValue::Decimal(Decimal::from(3))])]
fn sum_is_independent_of_nesting(#[case] args: Vec<QueryValue>) {
    assert_eq!(eval("sum", &args).unwrap(), dec("6"));
}

#[test]
fn sum_of_fractions_is_exact() {
    let args = [QueryValue::Double(0.1), QueryValue::Double(0.2), dec("0.7")];
    assert_eq!(eval("sum", &args).unwrap(), dec("1.0"));
}

#[test]
fn sum_rejects_strings() {
    let err = eval("sum", &[ints(&[1]), QueryValue::string("2")]).unwrap_err();
    assert_eq!(
        err,
        FunctionError::InvalidArgumentType {
            name: "sum".to_string(),
            index: 1,
            expected: "Number".to_string(),
            actual: "String".to_string(),
        }
    );
}

#[test]
fn product_multiplies_by_default() {
    assert_eq!(eval("product", &[ints(&[2, 3, 4])]).unwrap(), dec("24"));
}

#[test]
fn product_legacy_semantics_adds() {
    let evaluator = MathFunctionEvaluator::with_config(MathFunctionConfig::legacy());
    let result = evaluator
        .evaluate("product", &[ints(&[2, 3, 4])], &evaluator.default_context())
        .unwrap();
    assert_eq!(result, dec("10"));
}

#[rstest]
#[case::arithmetic("arithmetic", 2.5)]
#[case::geometric("geometric", 24f64.powf(0.25))]
#[case::harmonic("harmonic", 4.0 / (1.0 + 0.5 + 1.0 / 3.0 + 0.25))]
fn mean_variants(#[case] variant: &str, #[case] expected: f64) {
    let args = [ints(&[1, 2, 3, 4]), QueryValue::string(variant)];
    let QueryValue::Double(actual) = eval("mean", &args).unwrap() else {
        panic!("expected a double");
    };
    assert!((actual - expected).abs() < 1e-12, "{variant}: {actual} != {expected}");
}

fn doubles(values: &[f64]) -> QueryValue {
    QueryValue::collection(values.iter().copied().map(QueryValue::Double).collect())
}

#[rstest]
#[case::small_fractions(doubles(&[0.001; 10]), "geometric", 0.001)]
#[case::many_small_fractions(doubles(&[0.001; 200]), "geometric", 0.001)]
#[case::large_magnitudes(doubles(&[1e15, 1e15]), "geometric", 1e15)]
#[case::product_past_double_range(doubles(&[1e200, 1e200, 1e200]), "geometric", 1e200)]
#[case::mixed_magnitudes(doubles(&[1e-150, 1e150, 4.0]), "geometric", 4f64.cbrt())]
#[case::tiny_element(doubles(&[1e-29, 1.0]), "harmonic", 2e-29)]
#[case::tiny_elements(doubles(&[1e-300, 1e-300]), "harmonic", 1e-300)]
#[case::arithmetic_past_decimal_range(doubles(&[1e30, 3e30]), "arithmetic", 2e30)]
#[case::arithmetic_below_decimal_scale(doubles(&[1e-30, 3e-30]), "arithmetic", 2e-30)]
fn mean_over_wide_magnitudes(
    #[case] values: QueryValue,
    #[case] variant: &str,
    #[case] expected: f64,
) {
    let QueryValue::Double(actual) = eval("mean", &[values, QueryValue::string(variant)]).unwrap()
    else {
        panic!("expected a double");
    };
    assert!(
        ((actual - expected) / expected).abs() < 1e-12,
        "{variant}: {actual} != {expected}"
    );
}

#[rstest]
#[case::above_decimal_range(vec![QueryValue::Double(1e30)], QueryValue::Double(1e30))]
#[case::far_above_decimal_range(vec![doubles(&[1e300, 1e300])], QueryValue::Double(2e300))]
#[case::below_decimal_scale(vec![QueryValue::Double(1e-30)], QueryValue::Double(1e-30))]
#[case::tiny_total(vec![doubles(&[1e-29, 2e-29])], QueryValue::Double(3e-29))]
#[case::cancelling(vec![doubles(&[1e30, 0.5, -1e30])], dec("0.5"))]
#[case::decimal_max_plus_one(
    vec![QueryValue::Decimal(Decimal::MAX), QueryValue::Integer(1)],
    QueryValue::Double(2f64.powi(96))
)]
fn sum_beyond_decimal_range(#[case] args: Vec<QueryValue>, #[case] expected: QueryValue) {
    assert_eq!(eval("sum", &args).unwrap(), expected);
}

#[test]
fn mean_equals_sum_over_count() {
    let values = ints(&[3, 9, 27, 81]);
    let QueryValue::Decimal(total) = eval("sum", &[values.clone()]).unwrap() else {
        panic!("expected a decimal");
    };
    assert_eq!(
        eval("mean", &[values]).unwrap(),
        QueryValue::Double(total.to_f64().unwrap() / 4.0)
    );
}

#[rstest]
#[case::empty(ints(&[]), QueryValue::Integer(0))]
#[case::single(ints(&[42]), QueryValue::Long(42))]
#[case::even(ints(&[4, 1, 3, 2]), QueryValue::Long(3))]
#[case::odd(ints(&[9, 1, 5]), QueryValue::Long(5))]
#[case::scalar(QueryValue::Double(1.25), QueryValue::Double(1.25))]
fn median_is_the_upper_median(#[case] values: QueryValue, #[case] expected: QueryValue) {
    let args = [values, QueryValue::string("median")];
    assert_eq!(eval("mean", &args).unwrap(), expected);
}

#[test]
fn mean_of_empty_input_is_zero() {
    assert_eq!(eval("mean", &[ints(&[])]).unwrap(), QueryValue::Integer(0));
}

#[test]
fn mean_rejects_unknown_variant_and_bad_arity() {
    assert!(matches!(
        eval("mean", &[ints(&[1]), QueryValue::string("mode")]),
        Err(FunctionError::EvaluationError { .. })
    ));
    assert!(matches!(
        eval("mean", &[ints(&[1]), QueryValue::Integer(1)]),
        Err(FunctionError::InvalidArgumentType { index: 1, .. })
    ));
    assert!(matches!(
        eval(
            "mean",
            &[ints(&[1]), QueryValue::string("median"), QueryValue::Integer(1)]
        ),
        Err(FunctionError::InvalidArity { actual: 3, .. })
    ));
}

#[rstest]
#[case::byte("byteValue", QueryValue::Integer(300), QueryValue::Byte(44))]
#[case::byte_negative("byteValue", QueryValue::Integer(-129), QueryValue::Byte(127))]
#[case::short("shortValue", QueryValue::Long(65_537), QueryValue::Short(1))]
#[case::integer("integerValue", QueryValue::Long(4_294_967_297), QueryValue::Integer(1))]
#[case::integer_from_double("integerValue", QueryValue::Double(1e20), QueryValue::Integer(i32::MAX))]
#[case::integer_from_nan("integerValue", QueryValue::Double(f64::NAN), QueryValue::Integer(0))]
#[case::byte_from_double("byteValue", QueryValue::Double(300.7), QueryValue::Byte(44))]
#[case::long_from_decimal("longValue", QueryValue::Decimal(Decimal::new(-1234, 1)), QueryValue::Long(-123))]
#[case::float("floatValue", QueryValue::Double(0.5), QueryValue::Float(0.5))]
#[case::double("doubleValue", QueryValue::Short(7), QueryValue::Double(7.0))]
fn narrowing_conversions(
    #[case] name: &str,
    #[case] input: QueryValue,
    #[case] expected: QueryValue,
) {
    assert_eq!(eval(name, &[input]).unwrap(), expected);
}

#[test]
fn narrowing_then_widening_keeps_the_wrapped_value() {
    let byte = eval("byteValue", &[QueryValue::Integer(300)]).unwrap();
    assert_eq!(eval("doubleValue", &[byte]).unwrap(), QueryValue::Double(44.0));
}

#[test]
fn narrowing_rejects_non_numbers() {
    assert!(matches!(
        eval("longValue", &[QueryValue::string("12")]),
        Err(FunctionError::InvalidArgumentType { index: 0, .. })
    ));
}

#[test]
fn unregistered_names_fall_back_to_operations() {
    assert_eq!(
        eval("pow", &[QueryValue::Integer(2), QueryValue::Integer(10)]).unwrap(),
        QueryValue::Double(1024.0)
    );
    assert_eq!(
        eval("nosuchFunction", &[QueryValue::Integer(1)]),
        Err(FunctionError::UnknownFunction {
            name: "nosuchFunction".to_string(),
            arity: 1,
        })
    );
    assert!(matches!(
        eval("", &[]),
        Err(FunctionError::UnknownFunction { .. })
    ));
}

#[test]
fn expression_name_routes_to_the_attached_evaluator() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let expression = move |args: &[QueryValue]| -> FunctionResult<QueryValue> {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(QueryValue::Long(args.len() as i64))
    };

    let evaluator = MathFunctionEvaluator::with_config(MathFunctionConfig::new("math", "calc"))
        .with_expression_evaluator(Arc::new(expression));
    let context = evaluator.default_context();

    let result = evaluator
        .evaluate("calc", &[QueryValue::string("1 + 1"), QueryValue::Integer(3)], &context)
        .unwrap();
    assert_eq!(result, QueryValue::Long(2));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // the default expression name is no longer claimed
    assert!(matches!(
        evaluator.evaluate("evalExpression", &[], &context),
        Err(FunctionError::UnknownFunction { .. })
    ));
}

struct CountingOperations;

impl MathOperations for CountingOperations {
    fn operation_names(&self) -> Vec<String> {
        vec!["twice".to_string(), "sum".to_string()]
    }

    fn invoke(&self, name: &str, args: &[QueryValue]) -> FunctionResult<QueryValue> {
        match (name, args) {
            ("twice", [value]) => Ok(QueryValue::Double(value.to_f64().unwrap_or(0.0) * 2.0)),
            _ => Err(FunctionError::UnknownFunction {
                name: name.to_string(),
                arity: args.len(),
            }),
        }
    }
}

#[test]
fn custom_operations_are_discovered() {
    let evaluator =
        MathFunctionEvaluator::with_operations(MathFunctionConfig::default(), Arc::new(CountingOperations));
    let context = evaluator.default_context();

    assert_eq!(
        evaluator.registry().resolve("twice"),
        Some(FunctionKind::Operation)
    );
    // built-ins win over discovered names
    assert_eq!(
        evaluator.registry().resolve("sum"),
        Some(FunctionKind::Builtin(BuiltinFunction::Sum))
    );
    assert_eq!(
        evaluator
            .evaluate("twice", &[QueryValue::Integer(21)], &context)
            .unwrap(),
        QueryValue::Double(42.0)
    );
    assert!(matches!(
        evaluator.evaluate("sqrt", &[QueryValue::Integer(4)], &context),
        Err(FunctionError::UnknownFunction { .. })
    ));
}

#[test]
fn function_names_cover_every_builtin() {
    let evaluator = MathFunctionEvaluator::new();
    let names = evaluator.function_names();
    for builtin in BuiltinFunction::ALL {
        assert!(names.contains(&builtin.name()), "{builtin}");
    }
    assert!(names.contains(&"evalExpression"));
    assert!(names.contains(&"floorMod"));
    assert_eq!(evaluator.group_name(), "math");
}

#[test]
fn concurrent_evaluation_shares_one_evaluator() {
    let evaluator = Arc::new(MathFunctionEvaluator::new());

    std::thread::scope(|scope| {
        for i in 0..8i64 {
            let evaluator = Arc::clone(&evaluator);
            scope.spawn(move || {
                let context = EvaluationContext::default();
                for _ in 0..100 {
                    let result = evaluator
                        .evaluate("sum", &[ints(&[i, i, i])], &context)
                        .unwrap();
                    assert_eq!(result, QueryValue::Decimal(Decimal::from(3 * i)));
                }
            });
        }
    });
}

#[test]
fn json_arguments_are_accepted() {
    let values = QueryValue::try_from(serde_json::json!([1, [2, 3.5]])).unwrap();
    assert_eq!(eval("sum", &[values]).unwrap(), dec("6.5"));
}
