//! Locale-aware number formatting with decimal patterns
//!
//! Patterns use the conventional decimal-format grammar (`#,##0.00`, `0.###E0`,
//! `#%`, `¤#,##0.00;(¤#,##0.00)`). Symbols such as the decimal separator, the
//! grouping separator and the currency sign come from a [`Locale`].

mod digits;
pub mod error;
pub mod locale;
pub mod number_format;
pub mod pattern;

pub use error::{NumberFormatError, NumberFormatResult};
pub use locale::{Locale, LocaleConventions, NumberSymbols};
pub use number_format::NumberFormatter;
pub use pattern::DecimalPattern;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_patterns() {
        let cases = [
            ("", 0),
            ("0#", 1),
            ("#.##0", 4),
            ("0.0.0", 3),
            ("#.#,#", 3),
            ("0E", 2),
            ("#,", 2),
            ("'abc", 0),
            ("#;#;#", 3),
            ("#%%", 0),
            ("abc", 3),
            ("# pcs.", 5),
        ];
        for (pattern, position) in cases {
            let err = DecimalPattern::compile(pattern).unwrap_err();
            assert!(
                matches!(err, NumberFormatError::MalformedPattern { .. }),
                "{pattern}"
            );
            assert_eq!(err.position(), Some(position), "{pattern}");
        }
    }

    #[test]
    fn test_compiled_pattern_shape() {
        let pattern = DecimalPattern::compile("#,##0.00#").unwrap();
        assert_eq!(pattern.grouping_size, 3);
        assert_eq!(pattern.min_integer_digits, 1);
        assert_eq!(pattern.min_fraction_digits, 2);
        assert_eq!(pattern.max_fraction_digits, 3);
        assert_eq!(pattern.multiplier_exponent, 0);
        assert!(pattern.exponent.is_none());

        let percent = DecimalPattern::compile("0.0%").unwrap();
        assert_eq!(percent.multiplier_exponent, 2);
    }
}
