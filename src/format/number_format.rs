//! Formatting and parsing numbers with a compiled pattern and locale symbols

use super::digits::Digits;
use super::error::{NumberFormatError, NumberFormatResult};
use super::locale::{Locale, NumberSymbols};
use super::pattern::{DecimalPattern, ExponentFormat};
use crate::model::QueryValue;

/// A number ready for rendering
enum Formattable {
    Finite(Digits),
    Infinite { negative: bool },
    NaN,
}

impl Formattable {
    fn from_f64(value: f64) -> Option<Self> {
        if value.is_nan() {
            Some(Formattable::NaN)
        } else if value.is_infinite() {
            Some(Formattable::Infinite {
                negative: value < 0.0,
            })
        } else {
            Digits::from_f64(value).map(Formattable::Finite)
        }
    }
}

/// Pattern plus locale symbols
#[derive(Debug, Clone, PartialEq)]
pub struct NumberFormatter {
    pattern: DecimalPattern,
    symbols: NumberSymbols,
}

impl NumberFormatter {
    /// Create a formatter for an explicit pattern with the symbols of `locale`
    pub fn new(pattern: &str, locale: &Locale) -> NumberFormatResult<Self> {
        Ok(Self {
            pattern: DecimalPattern::compile(pattern)?,
            symbols: locale.conventions().symbols,
        })
    }

    /// Create the currency formatter of `locale`
    pub fn currency(locale: &Locale) -> NumberFormatResult<Self> {
        let conventions = locale.conventions();
        let mut pattern = DecimalPattern::compile(conventions.currency_pattern)?;
        pattern.set_fraction_digits(conventions.currency_fraction_digits);
        Ok(Self {
            pattern,
            symbols: conventions.symbols,
        })
    }

    /// Create the percent formatter of `locale`
    pub fn percent(locale: &Locale) -> NumberFormatResult<Self> {
        let conventions = locale.conventions();
        Ok(Self {
            pattern: DecimalPattern::compile(conventions.percent_pattern)?,
            symbols: conventions.symbols,
        })
    }

    /// The compiled pattern
    pub fn pattern(&self) -> &DecimalPattern {
        &self.pattern
    }

    /// The symbols in use
    pub fn symbols(&self) -> &NumberSymbols {
        &self.symbols
    }

    /// Format a numeric value, `None` for non-numeric values
    ///
    /// Floating point values are widened to `f64` and scaled by the pattern's
    /// multiplier in double arithmetic. Integers and decimals are scaled exactly.
    pub fn format(&self, value: &QueryValue) -> Option<String> {
        let exact = |text: String| {
            let mut digits = Digits::from_plain(&text)?;
            digits.shift(self.pattern.multiplier_exponent);
            Some(Formattable::Finite(digits))
        };
        let number = match value {
            QueryValue::Double(v) => self.scaled(*v)?,
            QueryValue::Float(v) => self.scaled(f64::from(*v))?,
            QueryValue::Decimal(d) => exact(d.to_string())?,
            other => exact(other.as_i64()?.to_string())?,
        };
        Some(self.render(number))
    }

    /// Format a double
    pub fn format_f64(&self, value: f64) -> String {
        match self.scaled(value) {
            Some(number) => self.render(number),
            None => self.symbols.nan.to_string(),
        }
    }

    fn scaled(&self, value: f64) -> Option<Formattable> {
        Formattable::from_f64(value * 10f64.powi(self.pattern.multiplier_exponent))
    }

    fn render(&self, number: Formattable) -> String {
        match number {
            Formattable::NaN => self.symbols.nan.to_string(),
            Formattable::Infinite { negative } => {
                self.with_affixes(negative, self.symbols.infinity.to_string())
            }
            Formattable::Finite(mut digits) => {
                let body = match self.pattern.exponent {
                    Some(exponent) => self.scientific(&mut digits, exponent),
                    None => {
                        digits.round_fraction(self.pattern.max_fraction_digits);
                        self.plain(&digits, true)
                    }
                };
                let negative = digits.is_negative() && !digits.is_zero();
                self.with_affixes(negative, body)
            }
        }
    }

    fn with_affixes(&self, negative: bool, body: String) -> String {
        let (prefix, suffix) = if negative {
            self.pattern.negative_affixes(&self.symbols)
        } else {
            self.pattern.positive_affixes(&self.symbols)
        };
        format!("{prefix}{body}{suffix}")
    }

    /// Render already rounded digits without sign or affixes
    fn plain(&self, digits: &Digits, grouping: bool) -> String {
        let mut integer = digits.integer_digits();
        if integer.len() < self.pattern.min_integer_digits {
            let padding = self.pattern.min_integer_digits - integer.len();
            let mut padded = vec![0; padding];
            padded.append(&mut integer);
            integer = padded;
        }
        let mut fraction = digits.fraction_digits();
        if fraction.len() < self.pattern.min_fraction_digits {
            fraction.resize(self.pattern.min_fraction_digits, 0);
        }
        if integer.is_empty() && fraction.is_empty() {
            integer.push(0);
        }

        let group = if grouping { self.pattern.grouping_size } else { 0 };
        let mut out = String::with_capacity(integer.len() + fraction.len() + 8);
        for (i, digit) in integer.iter().enumerate() {
            let remaining = integer.len() - i;
            if group > 0 && i > 0 && remaining % group == 0 {
                out.push(self.symbols.grouping_separator);
            }
            out.push(char::from(b'0' + digit));
        }
        if !fraction.is_empty() || self.pattern.decimal_separator_always_shown {
            out.push(self.symbols.decimal_separator);
            out.extend(fraction.iter().map(|d| char::from(b'0' + d)));
        }
        out
    }

    fn scientific(&self, digits: &mut Digits, format: ExponentFormat) -> String {
        let integer_digits = self.pattern.min_integer_digits.max(1) as i32;
        let mut exponent = 0;
        if !digits.is_zero() {
            exponent = digits.exponent() - integer_digits;
            digits.set_exponent(integer_digits);
            digits.round_fraction(self.pattern.max_fraction_digits);
            // rounding may carry into a new leading digit
            if digits.exponent() > integer_digits {
                exponent += digits.exponent() - integer_digits;
                digits.set_exponent(integer_digits);
            }
        }

        let mut out = self.plain(digits, false);
        out.push_str(self.symbols.exponent);
        if exponent < 0 {
            out.push(self.symbols.minus_sign);
        }
        let magnitude = exponent.unsigned_abs().to_string();
        for _ in magnitude.len()..format.min_digits {
            out.push('0');
        }
        out.push_str(&magnitude);
        out
    }

    /// Parse `text` against the pattern
    ///
    /// Integral results inside the `i64` range come back as `Long`, everything
    /// else as `Double`. Text after the suffix is ignored.
    pub fn parse(&self, text: &str) -> NumberFormatResult<QueryValue> {
        let symbols = &self.symbols;
        let unparseable = |byte_offset: usize| NumberFormatError::Unparseable {
            text: text.to_string(),
            position: text[..byte_offset].chars().count(),
        };

        if text.starts_with(symbols.nan) {
            return Ok(QueryValue::Double(f64::NAN));
        }

        let (positive_prefix, positive_suffix) = self.pattern.positive_affixes(symbols);
        let (negative_prefix, negative_suffix) = self.pattern.negative_affixes(symbols);
        let negative = match (
            text.starts_with(&positive_prefix),
            text.starts_with(&negative_prefix),
        ) {
            (true, true) => negative_prefix.len() > positive_prefix.len(),
            (true, false) => false,
            (false, true) => true,
            (false, false) => return Err(unparseable(0)),
        };
        let (prefix, suffix) = if negative {
            (negative_prefix, negative_suffix)
        } else {
            (positive_prefix, positive_suffix)
        };

        let mut position = prefix.len();
        let number = if text[position..].starts_with(symbols.infinity) {
            position += symbols.infinity.len();
            None
        } else {
            let (digits, consumed) = self
                .read_number(&text[position..], negative)
                .ok_or_else(|| unparseable(position))?;
            position += consumed;
            Some(digits)
        };

        if !text[position..].starts_with(&suffix) {
            return Err(unparseable(position));
        }

        let Some(mut digits) = number else {
            let infinity = if negative {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            };
            return Ok(QueryValue::Double(infinity));
        };

        digits.shift(-self.pattern.multiplier_exponent);
        let negative_zero = digits.is_negative() && digits.is_zero();
        match digits.to_i64() {
            Some(value) if !negative_zero => Ok(QueryValue::Long(value)),
            _ => Ok(QueryValue::Double(digits.to_f64())),
        }
    }

    /// Read digits, separators and an optional exponent; returns the number and
    /// the bytes consumed, or `None` when no digit was found
    fn read_number(&self, text: &str, negative: bool) -> Option<(Digits, usize)> {
        let symbols = &self.symbols;
        let mut all = Vec::new();
        let mut integer_len = None;
        let mut exponent = 0;
        let mut consumed = 0;

        for (i, c) in text.char_indices() {
            if let Some(digit) = c.to_digit(10) {
                all.push(digit as u8);
            } else if c == symbols.decimal_separator && integer_len.is_none() {
                integer_len = Some(all.len());
            } else if c == symbols.grouping_separator
                && self.pattern.grouping_size > 0
                && integer_len.is_none()
            {
                // grouping separators carry no value
            } else if !all.is_empty() && text[i..].starts_with(symbols.exponent) {
                let start = i + symbols.exponent.len();
                if let Some((value, length)) = read_exponent(&text[start..], symbols.minus_sign) {
                    exponent = value;
                    consumed = start + length;
                }
                break;
            } else {
                break;
            }
            consumed = i + c.len_utf8();
        }

        if all.is_empty() {
            return None;
        }
        let integer_len = integer_len.unwrap_or(all.len()) as i32;
        let mut digits = Digits::from_parts(negative, &all, integer_len);
        digits.shift(exponent);
        Some((digits, consumed))
    }
}

fn read_exponent(text: &str, minus_sign: char) -> Option<(i32, usize)> {
    let (negative, start) = match text.chars().next() {
        Some(c) if c == minus_sign => (true, c.len_utf8()),
        _ => (false, 0),
    };
    let digits: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return None;
    }
    let magnitude = digits.parse::<i32>().unwrap_or(i32::MAX / 2);
    let value = if negative { -magnitude } else { magnitude };
    Some((value, start + digits.len()))
}
