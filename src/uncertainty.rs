//! Rounding of a measured value to the precision of its uncertainty.
//!
//! The uncertainty is rounded half-up to a requested number of significant
//! digits and the value is rounded half-up to the same decimal place, e.g.
//! `12.34567 ± 0.0234` becomes `12.35 ± 0.02`. Floats are converted through
//! their shortest decimal representation and all rounding happens on exact
//! decimal coefficients, so `0.05` is treated as five hundredths and not as
//! its binary neighbour.

use std::fmt;
use std::str::FromStr;

use crate::error::{OptifikError, Result};

// ---------------------------------------------------------------------------
// Exact decimal
// ---------------------------------------------------------------------------

/// `±coefficient × 10^exponent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Decimal {
    negative: bool,
    coefficient: u128,
    exponent: i32,
}

impl Decimal {
    /// Shortest decimal that reads back as `value`. `None` for NaN and
    /// infinities.
    fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let mut parsed: Decimal = format!("{:e}", value.abs()).parse().ok()?;
        parsed.negative = value.is_sign_negative() && value != 0.0;
        Some(parsed)
    }

    fn is_zero(&self) -> bool {
        self.coefficient == 0
    }

    /// Exponent of the leading significant digit.
    fn adjusted(&self) -> i32 {
        self.exponent + num_digits(self.coefficient) as i32 - 1
    }

    /// Same value without trailing zeros in the coefficient.
    fn normalize(mut self) -> Self {
        if self.coefficient == 0 {
            self.exponent = 0;
            return self;
        }
        while self.coefficient % 10 == 0 {
            self.coefficient /= 10;
            self.exponent += 1;
        }
        self
    }

    /// Round half away from zero to a multiple of `10^place`.
    fn round_at(self, place: i32) -> Self {
        if self.exponent >= place {
            return self;
        }
        let dropped = (place - self.exponent) as u32;
        let coefficient = match 10u128.checked_pow(dropped) {
            Some(scale) => {
                let (q, r) = (self.coefficient / scale, self.coefficient % scale);
                if r >= scale - r {
                    q + 1
                } else {
                    q
                }
            }
            // More digits dropped than any coefficient can hold.
            None => 0,
        };
        Decimal {
            negative: self.negative,
            coefficient,
            exponent: place,
        }
    }

    /// Plain notation with exactly `places` digits after the point.
    /// The value must already be a multiple of `10^-places`.
    fn to_fixed(self, places: u32) -> String {
        let shift = self.exponent + places as i32;
        debug_assert!(shift >= 0, "to_fixed would drop digits");
        let mut digits = self.coefficient.to_string();
        digits.extend(std::iter::repeat('0').take(shift.max(0) as usize));

        let places = places as usize;
        if places > 0 {
            if digits.len() <= places {
                let pad = places + 1 - digits.len();
                digits.insert_str(0, &"0".repeat(pad));
            }
            digits.insert(digits.len() - places, '.');
        }
        if self.negative && !self.is_zero() {
            digits.insert(0, '-');
        }
        digits
    }

    /// Digits after the point once trailing zeros are dropped.
    fn decimal_places(self) -> u32 {
        (-self.normalize().exponent).max(0) as u32
    }
}

impl FromStr for Decimal {
    type Err = ();

    /// Accepts `[+-]digits[.digits][(e|E)[+-]digits]`.
    fn from_str(s: &str) -> std::result::Result<Self, ()> {
        let s = s.trim();
        let (negative, body) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };
        let (mantissa, exp) = match body.find(['e', 'E']) {
            Some(pos) => (
                &body[..pos],
                body[pos + 1..].parse::<i32>().map_err(|_| ())?,
            ),
            None => (body, 0),
        };
        let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(());
        }
        if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(());
        }

        let all_digits = format!("{int_part}{frac_part}");
        let trimmed = all_digits.trim_start_matches('0');
        let coefficient = if trimmed.is_empty() {
            0
        } else {
            trimmed.parse::<u128>().map_err(|_| ())?
        };

        Ok(Decimal {
            negative: negative && coefficient != 0,
            coefficient,
            exponent: exp - frac_part.len() as i32,
        })
    }
}

fn num_digits(mut n: u128) -> u32 {
    let mut count = 1;
    while n >= 10 {
        n /= 10;
        count += 1;
    }
    count
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// A value and its uncertainty prepared for display.
#[derive(Debug, Clone, PartialEq)]
pub enum RoundedPair {
    /// Both numbers rounded and rendered as plain decimal strings.
    Rounded { value: String, uncertainty: String },
    /// Inputs handed back untouched: zero uncertainty, or a value that has
    /// no decimal form (NaN, infinity).
    Unchanged { value: f64, uncertainty: f64 },
}

impl RoundedPair {
    /// `(value, uncertainty)` as text.
    pub fn strings(&self) -> (String, String) {
        match self {
            RoundedPair::Rounded { value, uncertainty } => (value.clone(), uncertainty.clone()),
            RoundedPair::Unchanged { value, uncertainty } => {
                (value.to_string(), uncertainty.to_string())
            }
        }
    }
}

impl fmt::Display for RoundedPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (value, uncertainty) = self.strings();
        write!(f, "{value} ± {uncertainty}")
    }
}

/// Round `uncertainty` to `digits` significant digits (at least one) and
/// `value` to the decimal place of the last retained digit.
///
/// ```
/// use optifik::uncertainty::{round_to_uncertainty, RoundedPair};
///
/// let pair = round_to_uncertainty(12.34567, 0.0234, 1);
/// assert_eq!(pair.strings(), ("12.35".to_string(), "0.02".to_string()));
/// assert_eq!(
///     round_to_uncertainty(12.3456, 0.0, 1),
///     RoundedPair::Unchanged { value: 12.3456, uncertainty: 0.0 }
/// );
/// ```
pub fn round_to_uncertainty(value: f64, uncertainty: f64, digits: u32) -> RoundedPair {
    let unchanged = RoundedPair::Unchanged { value, uncertainty };
    if uncertainty == 0.0 {
        return unchanged;
    }
    match (Decimal::from_f64(value), Decimal::from_f64(uncertainty)) {
        (Some(v), Some(u)) => {
            let (value, uncertainty) = round_decimals(v, u, digits);
            RoundedPair::Rounded { value, uncertainty }
        }
        _ => unchanged,
    }
}

/// [`round_to_uncertainty`] on decimal strings, which are taken exactly as
/// written. A zero uncertainty returns both strings as given.
pub fn round_decimal_strings(value: &str, uncertainty: &str, digits: u32) -> Result<(String, String)> {
    let parse = |s: &str| {
        s.parse::<Decimal>()
            .map_err(|_| OptifikError::invalid(format!("'{s}' is not a decimal number")))
    };
    let v = parse(value)?;
    let u = parse(uncertainty)?;
    if u.is_zero() {
        return Ok((value.to_string(), uncertainty.to_string()));
    }
    Ok(round_decimals(v, u, digits))
}

fn round_decimals(value: Decimal, uncertainty: Decimal, digits: u32) -> (String, String) {
    let digits = digits.max(1) as i32;

    let (rounded, places) = if uncertainty.negative {
        // Nothing sensible to round to; keep it and borrow its precision.
        let places = uncertainty.decimal_places();
        (uncertainty.normalize(), places)
    } else {
        let leading = uncertainty.adjusted();
        let mut place = leading - digits + 1;
        let mut rounded = uncertainty.round_at(place);
        if rounded.adjusted() > leading {
            // Carried into a new digit (0.96 -> 1.0): keep `digits` digits.
            place += 1;
            rounded = rounded.round_at(place);
        }
        (rounded, (-place).max(0) as u32)
    };

    let value = value.round_at(-(places as i32)).to_fixed(places);
    let uncertainty = if rounded.exponent < -(places as i32) {
        rounded.round_at(-(places as i32)).to_fixed(places)
    } else {
        rounded.to_fixed(places)
    };
    (value, uncertainty)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rounded(value: f64, uncertainty: f64, digits: u32) -> (String, String) {
        match round_to_uncertainty(value, uncertainty, digits) {
            RoundedPair::Rounded { value, uncertainty } => (value, uncertainty),
            other => panic!("expected a rounded pair, got {other:?}"),
        }
    }

    fn pair(v: &str, u: &str) -> (String, String) {
        (v.to_string(), u.to_string())
    }

    #[test]
    fn parses_shortest_float_repr() {
        let d = Decimal::from_f64(0.05).unwrap();
        assert_eq!((d.coefficient, d.exponent), (5, -2));
        let d = Decimal::from_f64(-12.345).unwrap();
        assert_eq!((d.negative, d.coefficient, d.exponent), (true, 12345, -3));
        let d = Decimal::from_f64(100.0).unwrap();
        assert_eq!(d.to_fixed(0), "100");
    }

    #[test]
    fn fixed_notation_pads_small_numbers() {
        let d: Decimal = "2e-5".parse().unwrap();
        assert_eq!(d.to_fixed(5), "0.00002");
        let d: Decimal = "-3E+1".parse().unwrap();
        assert_eq!(d.to_fixed(0), "-30");
    }

    #[test]
    fn one_significant_digit() {
        assert_eq!(rounded(12.34567, 0.0234, 1), pair("12.35", "0.02"));
        assert_eq!(rounded(12.34567, 0.234, 1), pair("12.3", "0.2"));
        assert_eq!(rounded(12.34567, 2.34, 1), pair("12", "2"));
        assert_eq!(rounded(12.34567, 0.00234, 1), pair("12.346", "0.002"));
    }

    #[test]
    fn two_and_three_significant_digits() {
        assert_eq!(rounded(12.34567, 0.0234, 2), pair("12.346", "0.023"));
        assert_eq!(rounded(12.34567, 2.34, 2), pair("12.3", "2.3"));
        assert_eq!(rounded(12.34567, 0.00234, 2), pair("12.3457", "0.0023"));
        assert_eq!(rounded(12.34567, 0.234, 3), pair("12.346", "0.234"));
        assert_eq!(rounded(12.34567, 0.00234, 3), pair("12.34567", "0.00234"));
        assert_eq!(rounded(1.23456789, 0.000123, 2), pair("1.23457", "0.00012"));
    }

    #[test]
    fn halves_round_up() {
        assert_eq!(rounded(12.345, 0.05, 1), pair("12.35", "0.05"));
        assert_eq!(rounded(12.345, 0.056, 1), pair("12.35", "0.06"));
        assert_eq!(rounded(12.344, 0.054, 1), pair("12.34", "0.05"));
        assert_eq!(rounded(-12.345, 0.05, 1), pair("-12.35", "0.05"));
    }

    #[test]
    fn uncertainty_above_one() {
        assert_eq!(rounded(100.0, 5.67, 1), pair("100", "6"));
        assert_eq!(rounded(100.0, 25.0, 1), pair("100", "30"));
        assert_eq!(rounded(12.3456, 25.67, 1), pair("12", "30"));
        assert_eq!(rounded(1.234, 10.5, 1), pair("1", "10"));
    }

    #[test]
    fn carry_keeps_requested_digits() {
        assert_eq!(rounded(9.999, 0.0999, 1), pair("10.0", "0.1"));
        assert_eq!(rounded(3.14159, 0.0996, 2), pair("3.14", "0.10"));
    }

    #[test]
    fn zero_uncertainty_is_identity() {
        assert_eq!(
            round_to_uncertainty(12.3456, 0.0, 1),
            RoundedPair::Unchanged {
                value: 12.3456,
                uncertainty: 0.0
            }
        );
    }

    #[test]
    fn non_finite_values_are_left_alone() {
        assert!(matches!(
            round_to_uncertainty(f64::NAN, 1.0, 1),
            RoundedPair::Unchanged { .. }
        ));
    }

    #[test]
    fn string_inputs_are_exact() {
        assert_eq!(
            round_decimal_strings("12.3456", "0.0234", 1).unwrap(),
            pair("12.35", "0.02")
        );
        assert_eq!(round_decimal_strings("7.5", "0", 1).unwrap(), pair("7.5", "0"));
        assert!(round_decimal_strings("abc", "0.1", 1).is_err());
    }
}
