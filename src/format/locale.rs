//! Locales and their number formatting conventions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::NumberFormatError;

/// Language plus optional region, e.g. `en-US` or `de`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale {
    language: String,
    region: Option<String>,
}

/// Symbols substituted into patterns when formatting and expected when parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberSymbols {
    /// Decimal separator
    pub decimal_separator: char,
    /// Grouping separator
    pub grouping_separator: char,
    /// Minus sign
    pub minus_sign: char,
    /// Percent sign
    pub percent: char,
    /// Per mille sign
    pub per_mille: char,
    /// Exponent separator for scientific patterns
    pub exponent: &'static str,
    /// Rendering of infinity
    pub infinity: &'static str,
    /// Rendering of NaN
    pub nan: &'static str,
    /// Currency symbol substituted for `¤`
    pub currency_symbol: &'static str,
}

/// Everything a locale contributes to number formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocaleConventions {
    /// Number symbols
    pub symbols: NumberSymbols,
    /// Pattern for currency amounts
    pub currency_pattern: &'static str,
    /// Pattern for percentages
    pub percent_pattern: &'static str,
    /// Fraction digits of the region's currency
    pub currency_fraction_digits: usize,
}

const ROOT_SYMBOLS: NumberSymbols = NumberSymbols {
    decimal_separator: '.',
    grouping_separator: ',',
    minus_sign: '-',
    percent: '%',
    per_mille: '\u{2030}',
    exponent: "E",
    infinity: "\u{221e}",
    nan: "NaN",
    currency_symbol: "\u{a4}",
};

const COMMA_DECIMAL_SYMBOLS: NumberSymbols = NumberSymbols {
    decimal_separator: ',',
    grouping_separator: '.',
    ..ROOT_SYMBOLS
};

impl Locale {
    /// Create a locale from a language and an optional region
    pub fn new(language: &str, region: Option<&str>) -> Self {
        Self {
            language: language.to_ascii_lowercase(),
            region: region.map(|r| r.to_ascii_uppercase()),
        }
    }

    /// The `en-US` locale
    pub fn en_us() -> Self {
        Self::new("en", Some("US"))
    }

    /// Lowercase language code
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Uppercase region code, if any
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Resolve the number formatting conventions of this locale
    ///
    /// Symbols and patterns come from the language; the currency symbol and its
    /// fraction digits come from the region. Unknown languages use the root
    /// conventions and unknown regions the generic currency sign.
    pub fn conventions(&self) -> LocaleConventions {
        let (mut symbols, currency_pattern, percent_pattern) = match self.language.as_str() {
            "en" => (ROOT_SYMBOLS, "\u{a4}#,##0.00", "#,##0%"),
            "ja" => (ROOT_SYMBOLS, "\u{a4}#,##0.00", "#,##0%"),
            "de" => (
                COMMA_DECIMAL_SYMBOLS,
                "#,##0.00\u{a0}\u{a4}",
                "#,##0\u{a0}%",
            ),
            "es" => (
                COMMA_DECIMAL_SYMBOLS,
                "#,##0.00\u{a0}\u{a4}",
                "#,##0\u{a0}%",
            ),
            "fr" => (
                NumberSymbols {
                    grouping_separator: '\u{202f}',
                    ..COMMA_DECIMAL_SYMBOLS
                },
                "#,##0.00\u{a0}\u{a4}",
                "#,##0\u{a0}%",
            ),
            "it" => (COMMA_DECIMAL_SYMBOLS, "#,##0.00\u{a0}\u{a4}", "#,##0%"),
            "pt" => (COMMA_DECIMAL_SYMBOLS, "\u{a4}\u{a0}#,##0.00", "#,##0%"),
            "nl" => (
                COMMA_DECIMAL_SYMBOLS,
                "\u{a4}\u{a0}#,##0.00;\u{a4}\u{a0}-#,##0.00",
                "#,##0%",
            ),
            _ => (ROOT_SYMBOLS, "\u{a4}\u{a0}#,##0.00", "#,##0%"),
        };

        let (currency_symbol, currency_fraction_digits) = match self.region.as_deref() {
            Some("US" | "CA" | "AU" | "AR" | "MX" | "CO") => ("$", 2),
            Some("CL") => ("$", 0),
            Some("GB") => ("\u{a3}", 2),
            Some("DE" | "FR" | "ES" | "IT" | "NL" | "AT" | "BE" | "IE" | "PT") => ("\u{20ac}", 2),
            Some("BR") => ("R$", 2),
            Some("JP") => ("\u{ffe5}", 0),
            Some("CH") => ("CHF", 2),
            _ => ("\u{a4}", 2),
        };
        symbols.currency_symbol = currency_symbol;

        LocaleConventions {
            symbols,
            currency_pattern,
            percent_pattern,
            currency_fraction_digits,
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::en_us()
    }
}

impl FromStr for Locale {
    type Err = NumberFormatError;

    /// Parse `en-US`, `en_US` or `en`
    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let invalid = || NumberFormatError::InvalidLocale {
            tag: tag.to_string(),
        };

        let mut parts = tag.split(['-', '_']);
        let language = parts.next().filter(|l| is_alpha(l, 2..=3)).ok_or_else(invalid)?;
        let region = match parts.next() {
            Some(region) if is_alpha(region, 2..=2) || is_digits(region, 3) => Some(region),
            Some(_) => return Err(invalid()),
            None => None,
        };
        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Self::new(language, region))
    }
}

fn is_alpha(text: &str, len: std::ops::RangeInclusive<usize>) -> bool {
    len.contains(&text.len()) && text.chars().all(|c| c.is_ascii_alphabetic())
}

fn is_digits(text: &str, len: usize) -> bool {
    text.len() == len && text.chars().all(|c| c.is_ascii_digit())
}

impl TryFrom<String> for Locale {
    type Error = NumberFormatError;

    fn try_from(tag: String) -> Result<Self, Self::Error> {
        tag.parse()
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.to_string()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.region {
            Some(region) => write!(f, "{}-{}", self.language, region),
            None => f.write_str(&self.language),
        }
    }
}
