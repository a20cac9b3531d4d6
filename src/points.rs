//! Fixed-point score values
//!
//! Every score in the competition is carried as a whole number of
//! hundredths. This is also the integer the score store persists, so the
//! only conversion between display values and storage happens here.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::store::{MAX_POINTS, POINTS_SCALE};

/// A score with two decimal places of precision
///
/// Internally the value is the number of hundredths, so `Points(2750)`
/// displays as `27.50`.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Add,
    derive_more::AddAssign,
    derive_more::Sub,
    derive_more::SubAssign,
    derive_more::Neg,
    derive_more::Sum,
)]
#[serde(transparent)]
pub struct Points(i64);

/// Errors that can occur when parsing points from text
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// The input was empty after trimming
    #[error("score cannot be empty")]
    Empty,
    /// The input was not a decimal number
    #[error("score is not a number")]
    Invalid,
    /// The input had more than two decimal places
    #[error("score has more than two decimal places")]
    TooPrecise,
    /// The input is larger than [`Points::MAX`] in magnitude
    #[error("score is out of range")]
    Overflow,
}

impl Points {
    /// Zero points
    pub const ZERO: Self = Self(0);

    /// Largest magnitude an entered score may have
    pub const MAX: Self = Self(MAX_POINTS * POINTS_SCALE);

    /// Creates points from a count of hundredths (the stored integer form)
    pub const fn from_hundredths(hundredths: i64) -> Self {
        Self(hundredths)
    }

    /// Creates points from a whole number
    pub const fn whole(value: i64) -> Self {
        Self(value * POINTS_SCALE)
    }

    /// Returns the count of hundredths (the stored integer form)
    pub const fn hundredths(self) -> i64 {
        self.0
    }

    /// Multiplies by an integer weight
    #[must_use]
    pub const fn times(self, factor: i64) -> Self {
        Self(self.0 * factor)
    }

    /// Divides by an integer, rounding the result to the nearest hundredth
    ///
    /// Halves round away from zero. A zero divisor yields zero.
    #[must_use]
    pub const fn div_round(self, divisor: i64) -> Self {
        if divisor == 0 {
            return Self::ZERO;
        }
        let quotient = self.0 / divisor;
        let remainder = self.0 % divisor;
        if 2 * remainder.abs() >= divisor.abs() {
            let away = if (self.0 < 0) == (divisor < 0) { 1 } else { -1 };
            Self(quotient + away)
        } else {
            Self(quotient)
        }
    }

    /// Adds two scores, clamping at the bounds of the stored integer
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Whether the magnitude is at most [`Points::MAX`]
    pub const fn in_range(self) -> bool {
        self.0.unsigned_abs() <= Self::MAX.0.unsigned_abs()
    }

    /// Returns true when the value is exactly zero
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Display for Points {
    /// Formats the value with exactly two decimal places
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let scale = POINTS_SCALE.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / scale, abs % scale)
    }
}

impl FromStr for Points {
    type Err = ParseError;

    /// Parses a decimal with at most two fractional digits
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` describing why the text is not a valid score.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseError::Empty);
        }

        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };

        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
        if whole.is_empty() && fraction.is_empty() {
            return Err(ParseError::Invalid);
        }
        if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
            return Err(ParseError::Invalid);
        }
        if fraction.len() > 2 {
            return Err(ParseError::TooPrecise);
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| ParseError::Overflow)?
        };
        let fraction: i64 = format!("{fraction:0<2}")
            .parse()
            .map_err(|_| ParseError::Invalid)?;

        let hundredths = whole
            .checked_mul(POINTS_SCALE)
            .and_then(|w| w.checked_add(fraction))
            .ok_or(ParseError::Overflow)?;
        let points = Self(if negative { -hundredths } else { hundredths });
        if !points.in_range() {
            return Err(ParseError::Overflow);
        }

        Ok(points)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_display() {
        assert_eq!(Points::from_hundredths(2750).to_string(), "27.50");
        assert_eq!(Points::whole(21).to_string(), "21.00");
        assert_eq!(Points::from_hundredths(-5).to_string(), "-0.05");
        assert_eq!(Points::ZERO.to_string(), "0.00");
    }

    #[test]
    fn test_parse() {
        assert_eq!("7.5".parse(), Ok(Points::from_hundredths(750)));
        assert_eq!("20".parse(), Ok(Points::whole(20)));
        assert_eq!("-3.25".parse(), Ok(Points::from_hundredths(-325)));
        assert_eq!(".5".parse(), Ok(Points::from_hundredths(50)));
        assert_eq!(" 6.0 ".parse(), Ok(Points::whole(6)));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Points>(), Err(ParseError::Empty));
        assert_eq!("abc".parse::<Points>(), Err(ParseError::Invalid));
        assert_eq!(".".parse::<Points>(), Err(ParseError::Invalid));
        assert_eq!("1.234".parse::<Points>(), Err(ParseError::TooPrecise));
        assert_eq!(
            "99999999999999999999".parse::<Points>(),
            Err(ParseError::Overflow)
        );
    }

    #[test]
    fn test_parse_at_bound() {
        assert_eq!("1000000".parse(), Ok(Points::MAX));
        assert_eq!("-1000000.00".parse(), Ok(-Points::MAX));
        assert_eq!("1000000.01".parse::<Points>(), Err(ParseError::Overflow));
        assert_eq!("90000000000000000".parse::<Points>(), Err(ParseError::Overflow));
    }

    #[test]
    fn test_saturating_add() {
        let huge = Points::from_hundredths(i64::MAX - 1);
        assert_eq!(
            huge.saturating_add(Points::whole(1)),
            Points::from_hundredths(i64::MAX)
        );
        assert!(!huge.in_range());
        assert!(Points::MAX.in_range());
        assert!(Points::from_hundredths(i64::MIN).saturating_add(Points::ZERO) < -Points::MAX);
    }

    #[test]
    fn test_div_round() {
        assert_eq!(Points::whole(75).div_round(10), Points::from_hundredths(750));
        assert_eq!(Points::from_hundredths(5).div_round(10), Points::from_hundredths(1));
        assert_eq!(Points::from_hundredths(4).div_round(10), Points::ZERO);
        assert_eq!(Points::from_hundredths(-5).div_round(10), Points::from_hundredths(-1));
        assert_eq!(Points::from_hundredths(100).div_round(3), Points::from_hundredths(33));
        assert_eq!(Points::whole(1).div_round(0), Points::ZERO);
    }

    #[test]
    fn test_arithmetic() {
        let total: Points = [Points::whole(10), Points::whole(8), Points::whole(7)]
            .into_iter()
            .sum();
        assert_eq!(total, Points::whole(25));
        assert_eq!(Points::whole(3) - Points::whole(5), Points::whole(-2));
        assert_eq!(Points::from_hundredths(250).times(3), Points::from_hundredths(750));
    }

    proptest! {
        #[test]
        fn prop_display_parses_back(hundredths in -10_000_000i64..10_000_000) {
            let points = Points::from_hundredths(hundredths);
            prop_assert_eq!(points.to_string().parse::<Points>(), Ok(points));
        }

        #[test]
        fn prop_div_round_within_half(hundredths in -1_000_000i64..1_000_000, divisor in 1i64..50) {
            let rounded = Points::from_hundredths(hundredths).div_round(divisor);
            let error = (rounded.hundredths() * divisor - hundredths).abs();
            prop_assert!(2 * error <= divisor);
        }
    }
}
