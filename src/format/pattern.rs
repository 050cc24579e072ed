//! Decimal pattern compilation
//!
//! Grammar: `subpattern (';' subpattern)?` where a subpattern is
//! `prefix integer ('.' fraction)? ('E' '0'+)? suffix`. Integer digits are `#`
//! (optional) followed by `0` (required) with `,` marking groups; fraction digits
//! are `0` followed by `#`. Prefix and suffix may hold literal text, quoted text
//! (`'...'`, with `''` for a quote) and the special characters `%`, `‰`, `¤`
//! and `-`. The negative subpattern only contributes its prefix and suffix.

use super::error::{NumberFormatError, NumberFormatResult};
use super::locale::NumberSymbols;

const QUOTE: char = '\'';
const PERCENT: char = '%';
const PER_MILLE: char = '\u{2030}';
const CURRENCY: char = '\u{a4}';
const MINUS: char = '-';

/// One piece of a prefix or suffix
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AffixPart {
    /// Literal text
    Literal(String),
    /// Localized percent sign
    Percent,
    /// Localized per mille sign
    PerMille,
    /// Currency symbol of the locale
    Currency,
    /// Localized minus sign
    Minus,
}

/// Prefix or suffix of a subpattern
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Affix(Vec<AffixPart>);

impl Affix {
    fn push_literal(&mut self, c: char) {
        if let Some(AffixPart::Literal(text)) = self.0.last_mut() {
            text.push(c);
        } else {
            self.0.push(AffixPart::Literal(c.to_string()));
        }
    }

    /// Render with localized symbols
    pub fn render(&self, symbols: &NumberSymbols) -> String {
        let mut out = String::new();
        for part in &self.0 {
            match part {
                AffixPart::Literal(text) => out.push_str(text),
                AffixPart::Percent => out.push(symbols.percent),
                AffixPart::PerMille => out.push(symbols.per_mille),
                AffixPart::Currency => out.push_str(symbols.currency_symbol),
                AffixPart::Minus => out.push(symbols.minus_sign),
            }
        }
        out
    }

    fn multiplier_parts(&self) -> impl Iterator<Item = &AffixPart> {
        self.0
            .iter()
            .filter(|p| matches!(p, AffixPart::Percent | AffixPart::PerMille))
    }
}

/// Scientific notation settings of a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExponentFormat {
    /// Minimum digits of the exponent
    pub min_digits: usize,
}

/// Compiled decimal pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecimalPattern {
    /// Source text of the pattern
    pub source: String,
    /// Prefix for positive numbers
    pub positive_prefix: Affix,
    /// Suffix for positive numbers
    pub positive_suffix: Affix,
    /// Explicit negative prefix and suffix, when the pattern has a `;` part
    pub negative: Option<(Affix, Affix)>,
    /// Minimum integer digits, zero padded
    pub min_integer_digits: usize,
    /// Count of integer digit characters, used for scientific mantissas
    pub max_integer_digits: usize,
    /// Minimum fraction digits, zero padded
    pub min_fraction_digits: usize,
    /// Maximum fraction digits, rounded half-even beyond this
    pub max_fraction_digits: usize,
    /// Digits per group, zero when grouping is off
    pub grouping_size: usize,
    /// Whether the decimal separator is shown for whole numbers
    pub decimal_separator_always_shown: bool,
    /// Scientific notation, if any
    pub exponent: Option<ExponentFormat>,
    /// Power of ten applied before formatting and removed after parsing
    pub multiplier_exponent: i32,
}

#[derive(Default)]
struct Subpattern {
    prefix: Affix,
    suffix: Affix,
    integer_zeros: usize,
    integer_hashes: usize,
    fraction_zeros: usize,
    fraction_hashes: usize,
    grouping: Option<usize>,
    has_decimal_point: bool,
    exponent_digits: Option<usize>,
}

#[derive(PartialEq)]
enum Phase {
    Prefix,
    Integer,
    Fraction,
    Exponent,
    Suffix,
}

impl DecimalPattern {
    /// Compile a pattern
    pub fn compile(pattern: &str) -> NumberFormatResult<Self> {
        let chars: Vec<char> = pattern.chars().collect();
        if chars.is_empty() {
            return Err(NumberFormatError::malformed(pattern, 0, "empty pattern"));
        }

        let (positive, end) = parse_subpattern(pattern, &chars, 0)?;
        let negative = if end < chars.len() {
            // `end` points at the separating ';'
            let (negative, negative_end) = parse_subpattern(pattern, &chars, end + 1)?;
            if negative_end < chars.len() {
                return Err(NumberFormatError::malformed(
                    pattern,
                    negative_end,
                    "more than one pattern separator",
                ));
            }
            Some((negative.prefix, negative.suffix))
        } else {
            None
        };

        let multiplier_exponent = {
            let mut multipliers = positive
                .prefix
                .multiplier_parts()
                .chain(positive.suffix.multiplier_parts());
            match (multipliers.next(), multipliers.next()) {
                (None, _) => 0,
                (Some(AffixPart::Percent), None) => 2,
                (Some(_), None) => 3,
                (Some(_), Some(_)) => {
                    return Err(NumberFormatError::malformed(
                        pattern,
                        0,
                        "too many percent or per mille characters",
                    ));
                }
            }
        };

        Ok(Self {
            source: pattern.to_string(),
            positive_prefix: positive.prefix,
            positive_suffix: positive.suffix,
            negative,
            min_integer_digits: positive.integer_zeros,
            max_integer_digits: positive.integer_zeros + positive.integer_hashes,
            min_fraction_digits: positive.fraction_zeros,
            max_fraction_digits: positive.fraction_zeros + positive.fraction_hashes,
            grouping_size: positive.grouping.unwrap_or(0),
            decimal_separator_always_shown: positive.has_decimal_point
                && positive.fraction_zeros + positive.fraction_hashes == 0,
            exponent: positive
                .exponent_digits
                .map(|min_digits| ExponentFormat { min_digits }),
            multiplier_exponent,
        })
    }

    /// Override the fraction digit range
    pub fn set_fraction_digits(&mut self, digits: usize) {
        self.min_fraction_digits = digits;
        self.max_fraction_digits = digits;
        self.decimal_separator_always_shown = false;
    }

    /// Prefix and suffix used for negative numbers
    pub(crate) fn negative_affixes(&self, symbols: &NumberSymbols) -> (String, String) {
        match &self.negative {
            Some((prefix, suffix)) => (prefix.render(symbols), suffix.render(symbols)),
            None => (
                format!(
                    "{}{}",
                    symbols.minus_sign,
                    self.positive_prefix.render(symbols)
                ),
                self.positive_suffix.render(symbols),
            ),
        }
    }

    /// Prefix and suffix used for positive numbers
    pub(crate) fn positive_affixes(&self, symbols: &NumberSymbols) -> (String, String) {
        (
            self.positive_prefix.render(symbols),
            self.positive_suffix.render(symbols),
        )
    }
}

/// Parse one subpattern starting at `start`; returns it with the index of the
/// terminating `;` or the end of input
fn parse_subpattern(
    pattern: &str,
    chars: &[char],
    start: usize,
) -> NumberFormatResult<(Subpattern, usize)> {
    let mut sub = Subpattern::default();
    let mut phase = Phase::Prefix;
    let mut digits_since_grouping: Option<usize> = None;
    let mut i = start;

    while i < chars.len() {
        let c = chars[i];
        match phase {
            Phase::Prefix | Phase::Suffix => {
                let in_prefix = phase == Phase::Prefix;
                let affix = if in_prefix {
                    &mut sub.prefix
                } else {
                    &mut sub.suffix
                };
                match c {
                    ';' => break,
                    QUOTE => {
                        i = read_quoted(pattern, chars, i, affix)?;
                        continue;
                    }
                    PERCENT => affix.0.push(AffixPart::Percent),
                    PER_MILLE => affix.0.push(AffixPart::PerMille),
                    CURRENCY => affix.0.push(AffixPart::Currency),
                    MINUS => affix.0.push(AffixPart::Minus),
                    '0' | '#' | ',' | '.' if in_prefix => {
                        phase = Phase::Integer;
                        continue;
                    }
                    '0' | '#' | ',' | '.' | 'E' if !in_prefix => {
                        return Err(NumberFormatError::malformed(
                            pattern,
                            i,
                            format!("unquoted special character '{c}' in suffix"),
                        ));
                    }
                    other => affix.push_literal(other),
                }
            }
            Phase::Integer => match c {
                '#' => {
                    if sub.integer_zeros > 0 {
                        return Err(NumberFormatError::malformed(
                            pattern,
                            i,
                            "'#' after '0' in integer part",
                        ));
                    }
                    sub.integer_hashes += 1;
                    digits_since_grouping = digits_since_grouping.map(|n| n + 1);
                }
                '0' => {
                    sub.integer_zeros += 1;
                    digits_since_grouping = digits_since_grouping.map(|n| n + 1);
                }
                ',' => digits_since_grouping = Some(0),
                '.' => {
                    sub.has_decimal_point = true;
                    phase = Phase::Fraction;
                }
                'E' => {
                    sub.exponent_digits = Some(0);
                    phase = Phase::Exponent;
                }
                _ => {
                    phase = Phase::Suffix;
                    continue;
                }
            },
            Phase::Fraction => match c {
                '0' => {
                    if sub.fraction_hashes > 0 {
                        return Err(NumberFormatError::malformed(
                            pattern,
                            i,
                            "'0' after '#' in fraction part",
                        ));
                    }
                    sub.fraction_zeros += 1;
                }
                '#' => sub.fraction_hashes += 1,
                '.' => {
                    return Err(NumberFormatError::malformed(
                        pattern,
                        i,
                        "multiple decimal separators",
                    ));
                }
                ',' => {
                    return Err(NumberFormatError::malformed(
                        pattern,
                        i,
                        "grouping separator in fraction part",
                    ));
                }
                'E' => {
                    sub.exponent_digits = Some(0);
                    phase = Phase::Exponent;
                }
                _ => {
                    phase = Phase::Suffix;
                    continue;
                }
            },
            Phase::Exponent => match c {
                '0' => sub.exponent_digits = sub.exponent_digits.map(|n| n + 1),
                _ => {
                    phase = Phase::Suffix;
                    continue;
                }
            },
        }
        i += 1;
    }

    validate(pattern, &sub, digits_since_grouping, i)?;
    sub.grouping = digits_since_grouping;
    Ok((sub, i))
}

fn validate(
    pattern: &str,
    sub: &Subpattern,
    grouping: Option<usize>,
    end: usize,
) -> NumberFormatResult<()> {
    if sub.integer_zeros + sub.integer_hashes + sub.fraction_zeros + sub.fraction_hashes == 0 {
        return Err(NumberFormatError::malformed(pattern, end, "missing digits"));
    }
    if grouping == Some(0) {
        return Err(NumberFormatError::malformed(
            pattern,
            end,
            "grouping separator without digits after it",
        ));
    }
    if sub.exponent_digits == Some(0) {
        return Err(NumberFormatError::malformed(
            pattern,
            end,
            "exponent without digits",
        ));
    }
    Ok(())
}

/// Read a quoted section starting at the opening quote; returns the index after it
fn read_quoted(
    pattern: &str,
    chars: &[char],
    open: usize,
    affix: &mut Affix,
) -> NumberFormatResult<usize> {
    if chars.get(open + 1) == Some(&QUOTE) {
        affix.push_literal(QUOTE);
        return Ok(open + 2);
    }

    let mut i = open + 1;
    while i < chars.len() {
        if chars[i] == QUOTE {
            if chars.get(i + 1) == Some(&QUOTE) {
                affix.push_literal(QUOTE);
                i += 2;
                continue;
            }
            return Ok(i + 1);
        }
        affix.push_literal(chars[i]);
        i += 1;
    }
    Err(NumberFormatError::malformed(pattern, open, "unterminated quote"))
}
