//! Fixed-point US dollar amounts.

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::FormatError;

/// A dollar amount stored as an integer number of millionths of a dollar,
/// so summing prices never accumulates float error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Usd {
    dec: u64,
}

impl Usd {
    pub const DEC_PLACES: u32 = 6;
    pub const DOLLARS_SCALE: u64 = 10u64.pow(Self::DEC_PLACES);
    pub const CENTS_SCALE: u64 = 10u64.pow(Self::DEC_PLACES - 2);

    /// Saturates at the largest representable amount.
    pub const fn new(dollars: u64, cents: u64) -> Self {
        Self {
            dec: dollars
                .saturating_mul(Self::DOLLARS_SCALE)
                .saturating_add(cents.saturating_mul(Self::CENTS_SCALE)),
        }
    }

    /// `None` if the amount does not fit.
    pub fn checked_new(dollars: u64, cents: u64) -> Option<Self> {
        let dec = dollars
            .checked_mul(Self::DOLLARS_SCALE)?
            .checked_add(cents.checked_mul(Self::CENTS_SCALE)?)?;
        Some(Self { dec })
    }

    pub const fn raw(dec: u64) -> Self {
        Self { dec }
    }

    pub const fn dollars(self) -> u64 {
        self.dec / Self::DOLLARS_SCALE
    }

    /// Whole cents past the last whole dollar.
    pub const fn cents(self) -> u64 {
        self.dec % Self::DOLLARS_SCALE / Self::CENTS_SCALE
    }

    pub fn set_dollars(&mut self, dollars: u64) {
        self.dec = dollars
            .saturating_mul(Self::DOLLARS_SCALE)
            .saturating_add(self.dec % Self::DOLLARS_SCALE);
    }

    pub fn set_cents(&mut self, cents: u64) {
        self.dec = (self.dec / Self::DOLLARS_SCALE * Self::DOLLARS_SCALE)
            .saturating_add(cents.saturating_mul(Self::CENTS_SCALE));
    }

    pub fn as_f64(self) -> f64 {
        self.dec as f64 / Self::DOLLARS_SCALE as f64
    }
}

/// Saturates at the largest representable amount.
impl Add for Usd {
    type Output = Usd;

    fn add(self, rhs: Usd) -> Usd {
        Usd::raw(self.dec.saturating_add(rhs.dec))
    }
}

/// Saturates at $0.00.
impl Sub for Usd {
    type Output = Usd;

    fn sub(self, rhs: Usd) -> Usd {
        Usd::raw(self.dec.saturating_sub(rhs.dec))
    }
}

impl AddAssign for Usd {
    fn add_assign(&mut self, rhs: Usd) {
        *self = *self + rhs;
    }
}

impl SubAssign for Usd {
    fn sub_assign(&mut self, rhs: Usd) {
        *self = *self - rhs;
    }
}

/// Saturates at the largest representable amount.
impl Mul<u64> for Usd {
    type Output = Usd;

    fn mul(self, scale: u64) -> Usd {
        Usd::raw(self.dec.saturating_mul(scale))
    }
}

impl fmt::Display for Usd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.dollars(), self.cents())
    }
}

impl FromStr for Usd {
    type Err = FormatError;

    /// Accepts `"$5.99"`, `"5.99"`, `"40"` (dollars) and `"40c"` (cents).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = |reason| FormatError::BadCurrency {
            literal: s.to_string(),
            reason,
        };
        let parse = |digits: &str, reason| digits.parse::<u64>().map_err(|_| bad(reason));

        if s.is_empty() {
            return Err(bad("empty string"));
        }

        let has_dollar = s.starts_with('$');
        let body = s.strip_prefix('$').unwrap_or(s);
        let has_period = body.contains('.');

        if let Some(cents) = body.strip_suffix('c')
            && !has_period
        {
            if has_dollar {
                return Err(bad("begins with '$' and ends with 'c' without a decimal"));
            }
            let cents = parse(cents, "failed to convert cents to number")?;
            return Usd::checked_new(0, cents).ok_or_else(|| bad("amount too large"));
        }

        let (dollars, cents) = match body.split_once('.') {
            Some((dollars, cents)) => (
                parse(dollars, "failed to convert dollars to number")?,
                parse(cents, "failed to convert cents to number")?,
            ),
            None => (parse(body, "failed to convert dollars to number")?, 0),
        };
        Usd::checked_new(dollars, cents).ok_or_else(|| bad("amount too large"))
    }
}

impl Serialize for Usd {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Usd {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cents_carry_into_dollars() {
        let six = Usd::new(5, 100);
        assert_eq!(six, Usd::new(6, 0));
        assert_eq!(six * 2, Usd::new(12, 0));
    }

    #[test]
    fn parse_forms() {
        assert_eq!("$5.99".parse::<Usd>().unwrap(), Usd::new(5, 99));
        assert_eq!("40c".parse::<Usd>().unwrap(), Usd::new(0, 40));
        assert_eq!("40".parse::<Usd>().unwrap(), Usd::new(40, 0));
        assert!(matches!(
            "$40c".parse::<Usd>(),
            Err(FormatError::BadCurrency { literal, .. }) if literal == "$40c"
        ));
        assert!("".parse::<Usd>().is_err());
        assert!("$abc".parse::<Usd>().is_err());
    }

    #[test]
    fn subtraction_saturates() {
        assert_eq!(Usd::new(1, 0) - Usd::new(2, 0), Usd::default());
    }

    #[test]
    fn oversized_amounts_are_format_errors() {
        for literal in ["$18446744073709551615", "18446744073710.00", "99999999999999999c"] {
            assert!(matches!(
                literal.parse::<Usd>(),
                Err(FormatError::BadCurrency { literal: ref l, reason }) if l == literal && reason == "amount too large"
            ));
        }
        assert_eq!("18446744073709.55".parse::<Usd>().unwrap().dollars(), 18_446_744_073_709);
    }

    #[test]
    fn arithmetic_saturates_at_the_top() {
        let max = Usd::raw(u64::MAX);
        assert_eq!(max + Usd::new(1, 0), max);
        assert_eq!(max * 3, max);
        assert_eq!(Usd::new(u64::MAX, 0), max);
        let mut usd = Usd::new(1, 50);
        usd.set_dollars(u64::MAX);
        assert_eq!(usd, max);
    }

    #[test]
    fn display_pads_cents() {
        assert_eq!(Usd::new(3, 5).to_string(), "$3.05");
        assert_eq!(Usd::new(12, 50).to_string(), "$12.50");
    }
}
