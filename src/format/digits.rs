//! Exact decimal digit sequences used for formatting and parsing
//!
//! Numbers are held as `0.d1 d2 ... dn * 10^exponent` with no leading or trailing
//! zero digits, so scaling by powers of ten is a change of exponent and rounding
//! never goes through binary floating point.

use bigdecimal::BigDecimal;
use std::cmp::Ordering;

/// Normalized decimal digits with a sign
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Digits {
    negative: bool,
    digits: Vec<u8>,
    exponent: i32,
    /// Magnitude of the exact source value compared to the digits, used to
    /// break rounding ties of shortest double text
    exact: Ordering,
}

impl Digits {
    /// Build from a plain decimal text such as `-123.4500`
    ///
    /// Exponent notation is not accepted; both `Decimal` and floating point
    /// `Display` implementations never produce it.
    pub(crate) fn from_plain(text: &str) -> Option<Self> {
        let (negative, unsigned) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let (integer, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        if integer.is_empty() && fraction.is_empty() {
            return None;
        }

        let mut all = Vec::with_capacity(integer.len() + fraction.len());
        for c in integer.chars().chain(fraction.chars()) {
            all.push(c.to_digit(10)? as u8);
        }
        Some(Self::from_parts(negative, &all, integer.len() as i32))
    }

    /// Build from the shortest round-trip text of a finite double
    ///
    /// The digits are the shortest text, but a rounding tie in them is decided
    /// by the exact binary value: `2.675` is stored just below `2.675` and rounds
    /// down to `2.67`.
    pub(crate) fn from_f64(value: f64) -> Option<Self> {
        let text = value.to_string();
        let mut digits = Self::from_plain(&text)?;
        let shortest: BigDecimal = text.trim_start_matches('-').parse().ok()?;
        digits.exact = exact_binary(value.abs()).cmp(&shortest);
        Some(digits)
    }

    /// Build from raw digits where the first `integer_len` digits precede the point
    pub(crate) fn from_parts(negative: bool, all: &[u8], integer_len: i32) -> Self {
        let leading = all.iter().take_while(|d| **d == 0).count();
        let trailing = all[leading..].iter().rev().take_while(|d| **d == 0).count();
        let digits = all[leading..all.len() - trailing].to_vec();
        let exponent = if digits.is_empty() {
            0
        } else {
            integer_len - leading as i32
        };
        Self {
            negative,
            digits,
            exponent,
            exact: Ordering::Equal,
        }
    }

    pub(crate) fn is_negative(&self) -> bool {
        self.negative
    }

    pub(crate) fn is_zero(&self) -> bool {
        self.digits.is_empty()
    }

    pub(crate) fn exponent(&self) -> i32 {
        self.exponent
    }

    /// Multiply by `10^places`
    pub(crate) fn shift(&mut self, places: i32) {
        if !self.is_zero() {
            self.exponent = self.exponent.saturating_add(places);
        }
    }

    /// Move the point so the number has exactly `exponent` integer digits
    pub(crate) fn set_exponent(&mut self, exponent: i32) {
        if !self.is_zero() {
            self.exponent = exponent;
        }
    }

    /// Round half-even so that at most `max_fraction` digits follow the point
    pub(crate) fn round_fraction(&mut self, max_fraction: usize) {
        let keep = self.exponent as i64 + max_fraction as i64;
        let len = self.digits.len() as i64;
        if keep >= len {
            return;
        }
        if keep < 0 {
            self.digits.clear();
            self.exponent = 0;
            return;
        }

        let keep = keep as usize;
        let first_dropped = self.digits[keep];
        let more_after = self.digits.len() > keep + 1;
        let previous_odd = keep > 0 && self.digits[keep - 1] % 2 == 1;
        let round_up = match (first_dropped.cmp(&5), more_after, self.exact) {
            (Ordering::Greater, _, _) | (Ordering::Equal, true, _) => true,
            (Ordering::Equal, false, Ordering::Equal) => previous_odd,
            (Ordering::Equal, false, exact) => exact == Ordering::Greater,
            (Ordering::Less, _, _) => false,
        };
        self.exact = Ordering::Equal;

        self.digits.truncate(keep);
        if round_up {
            self.increment_last();
        }
        self.trim();
    }

    fn increment_last(&mut self) {
        for digit in self.digits.iter_mut().rev() {
            if *digit == 9 {
                *digit = 0;
            } else {
                *digit += 1;
                return;
            }
        }
        // every kept digit was 9, or nothing was kept at all
        self.digits.insert(0, 1);
        self.exponent += 1;
    }

    fn trim(&mut self) {
        while self.digits.last() == Some(&0) {
            self.digits.pop();
        }
        if self.digits.is_empty() {
            self.exponent = 0;
        }
    }

    /// Digits before the point, without leading zeros
    pub(crate) fn integer_digits(&self) -> Vec<u8> {
        if self.exponent <= 0 {
            return Vec::new();
        }
        let exponent = self.exponent as usize;
        let mut out: Vec<u8> = self.digits.iter().copied().take(exponent).collect();
        out.resize(exponent, 0);
        out
    }

    /// Digits after the point, without trailing zeros
    pub(crate) fn fraction_digits(&self) -> Vec<u8> {
        if self.exponent >= 0 {
            return self.digits.iter().copied().skip(self.exponent as usize).collect();
        }
        let mut out = vec![0; (-self.exponent) as usize];
        out.extend_from_slice(&self.digits);
        out
    }

    /// Whole number value when the digits have no fraction and fit an `i64`
    pub(crate) fn to_i64(&self) -> Option<i64> {
        if self.is_zero() {
            return Some(0);
        }
        if self.exponent < self.digits.len() as i32 || self.exponent > 19 {
            return None;
        }
        let mut value: i128 = 0;
        for digit in self.integer_digits() {
            value = value * 10 + i128::from(digit);
        }
        if self.negative {
            value = -value;
        }
        i64::try_from(value).ok()
    }

    /// Nearest double
    pub(crate) fn to_f64(&self) -> f64 {
        let sign = if self.negative { "-" } else { "" };
        if self.is_zero() {
            return if self.negative { -0.0 } else { 0.0 };
        }
        let mantissa: String = self.digits.iter().map(|d| char::from(b'0' + d)).collect();
        format!("{sign}0.{mantissa}e{}", self.exponent)
            .parse()
            .unwrap_or(f64::NAN)
    }
}

/// Exact decimal expansion of a finite, non-negative double
fn exact_binary(value: f64) -> BigDecimal {
    let bits = value.to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i64;
    let fraction = bits & ((1 << 52) - 1);
    let (mantissa, exponent) = if biased == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1 << 52), biased - 1075)
    };

    let mantissa = BigDecimal::from(mantissa);
    if exponent >= 0 {
        mantissa * power(&BigDecimal::from(2u32), exponent.unsigned_abs())
    } else {
        // 2^-k == 0.5^k, which has exactly k fraction digits
        mantissa * power(&BigDecimal::new(5u32.into(), 1), exponent.unsigned_abs())
    }
}

fn power(base: &BigDecimal, mut exponent: u64) -> BigDecimal {
    let mut result = BigDecimal::from(1u32);
    let mut square = base.clone();
    while exponent > 0 {
        if exponent & 1 == 1 {
            result = &result * &square;
        }
        exponent >>= 1;
        if exponent > 0 {
            square = &square * &square;
        }
    }
    result
}
