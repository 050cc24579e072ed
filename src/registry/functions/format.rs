//! numberFormat(), currencyFormat(), percentFormat() and parseNumber()

use crate::format::NumberFormatter;
use crate::model::QueryValue;
use crate::registry::function::{EvaluationContext, FunctionError, FunctionResult};

fn string_arg<'a>(name: &str, args: &'a [QueryValue], index: usize) -> FunctionResult<&'a str> {
    let value = &args[index];
    value
        .as_str()
        .ok_or_else(|| FunctionError::type_mismatch(name, index, "String", value))
}

fn double_arg(name: &str, args: &[QueryValue], index: usize) -> FunctionResult<f64> {
    let value = &args[index];
    value
        .to_f64()
        .ok_or_else(|| FunctionError::type_mismatch(name, index, "Number", value))
}

/// numberFormat(pattern, value)
pub fn number_format(
    name: &str,
    args: &[QueryValue],
    context: &EvaluationContext,
) -> FunctionResult<QueryValue> {
    let pattern = string_arg(name, args, 0)?;
    let formatter = NumberFormatter::new(pattern, &context.locale)?;
    let value = &args[1];
    formatter
        .format(value)
        .map(QueryValue::String)
        .ok_or_else(|| FunctionError::type_mismatch(name, 1, "Number", value))
}

/// currencyFormat(value)
pub fn currency_format(
    name: &str,
    args: &[QueryValue],
    context: &EvaluationContext,
) -> FunctionResult<QueryValue> {
    let value = double_arg(name, args, 0)?;
    let formatter = NumberFormatter::currency(&context.locale)?;
    Ok(QueryValue::String(formatter.format_f64(value)))
}

/// percentFormat(value)
pub fn percent_format(
    name: &str,
    args: &[QueryValue],
    context: &EvaluationContext,
) -> FunctionResult<QueryValue> {
    let value = double_arg(name, args, 0)?;
    let formatter = NumberFormatter::percent(&context.locale)?;
    Ok(QueryValue::String(formatter.format_f64(value)))
}

/// parseNumber(pattern, source)
pub fn parse_number(
    name: &str,
    args: &[QueryValue],
    context: &EvaluationContext,
) -> FunctionResult<QueryValue> {
    let pattern = string_arg(name, args, 0)?;
    let source = string_arg(name, args, 1)?;
    let formatter = NumberFormatter::new(pattern, &context.locale)?;
    formatter.parse(source).map_err(|source| FunctionError::Parse {
        name: name.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{Locale, NumberFormatError};

    fn context(tag: &str) -> EvaluationContext {
        EvaluationContext::new(tag.parse().unwrap())
    }

    #[test]
    fn test_number_format_uses_context_symbols() {
        let args = [QueryValue::string("#,##0.00"), QueryValue::Double(1234.5)];
        assert_eq!(
            number_format("numberFormat", &args, &EvaluationContext::default()).unwrap(),
            QueryValue::string("1,234.50")
        );
        assert_eq!(
            number_format("numberFormat", &args, &context("de-DE")).unwrap(),
            QueryValue::string("1.234,50")
        );
    }

    #[test]
    fn test_malformed_pattern() {
        let args = [QueryValue::string("0.0.0"), QueryValue::Integer(1)];
        assert!(matches!(
            number_format("numberFormat", &args, &EvaluationContext::default()),
            Err(FunctionError::FormatPattern(NumberFormatError::MalformedPattern { position: 3, .. }))
        ));
    }

    #[test]
    fn test_currency_and_percent() {
        let args = [QueryValue::Double(1234.5)];
        assert_eq!(
            currency_format("currencyFormat", &args, &context("en-US")).unwrap(),
            QueryValue::string("$1,234.50")
        );
        assert_eq!(
            percent_format("percentFormat", &[QueryValue::Double(0.5)], &context("en-US")).unwrap(),
            QueryValue::string("50%")
        );
        assert_eq!(
            EvaluationContext::default().locale,
            Locale::en_us()
        );
    }

    #[test]
    fn test_parse_number() {
        let args = [QueryValue::string("#,##0"), QueryValue::string("12,345")];
        assert_eq!(
            parse_number("parseNumber", &args, &EvaluationContext::default()).unwrap(),
            QueryValue::Long(12345)
        );

        let args = [QueryValue::string("#"), QueryValue::string("x1")];
        let err = parse_number("parseNumber", &args, &EvaluationContext::default()).unwrap_err();
        let FunctionError::Parse { source, .. } = err else {
            panic!("expected a parse error");
        };
        assert_eq!(source.position(), Some(0));
    }
}
