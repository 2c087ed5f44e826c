//! Display-unit aware quantities.
//!
//! A [`Quantity`] keeps its value normalized to the family's default unit
//! (meters for length, grams for mass) and separately remembers the unit it
//! was written in, so `"5.3in"` is read and written back as inches.
//! Conversion factors are taken from `uom` rather than hand-entered.
//!
//! Text form is `<decimal><unit-suffix>`; whitespace around either part is
//! ignored, the suffix is case-insensitive and an empty suffix means the
//! default unit.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uom::si::f64::{Length as SiLength, Mass as SiMass};
use uom::si::{length, mass};

use crate::error::FormatError;
use crate::numeric::Real;

/// A family of interchangeable units with one default member.
pub trait Unit: Copy + Eq + fmt::Debug + 'static {
    /// Unit that normalized values are stored in.
    const DEFAULT: Self;
    /// Human name of the measured dimension, used in error messages.
    const DIMENSION: &'static str;

    /// How many of `self` make up one `DEFAULT` unit.
    fn factor(self) -> Real;

    /// Canonical suffix written after the number.
    fn suffix(self) -> &'static str;

    /// Match a lowercase, trimmed suffix (including long aliases).
    fn from_suffix(suffix: &str) -> Option<Self>;
}

/// Parse a unit suffix, treating an empty string as the default unit.
pub fn parse_unit<U: Unit>(raw: &str) -> Result<U, FormatError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(U::DEFAULT);
    }
    U::from_suffix(&trimmed.to_lowercase()).ok_or_else(|| FormatError::UnknownUnit {
        unit: trimmed.to_string(),
        dimension: U::DIMENSION,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LengthUnit {
    Millimeters,
    Centimeters,
    Meters,
    Inches,
    Feet,
}

impl Unit for LengthUnit {
    const DEFAULT: Self = LengthUnit::Meters;
    const DIMENSION: &'static str = "length";

    fn factor(self) -> Real {
        let one = SiLength::new::<length::meter>(1.0);
        match self {
            LengthUnit::Millimeters => one.get::<length::millimeter>(),
            LengthUnit::Centimeters => one.get::<length::centimeter>(),
            LengthUnit::Meters => 1.0,
            LengthUnit::Inches => one.get::<length::inch>(),
            LengthUnit::Feet => one.get::<length::foot>(),
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            LengthUnit::Millimeters => "mm",
            LengthUnit::Centimeters => "cm",
            LengthUnit::Meters => "m",
            LengthUnit::Inches => "in",
            LengthUnit::Feet => "ft",
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        Some(match suffix {
            "m" | "meter" | "meters" => LengthUnit::Meters,
            "cm" | "centimeter" | "centimeters" => LengthUnit::Centimeters,
            "mm" | "millimeter" | "millimeters" => LengthUnit::Millimeters,
            "in" | "inch" | "inches" => LengthUnit::Inches,
            "ft" | "foot" | "feet" => LengthUnit::Feet,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MassUnit {
    Grams,
    Milligrams,
    Kilograms,
    Pounds,
    Ounces,
}

impl Unit for MassUnit {
    const DEFAULT: Self = MassUnit::Grams;
    const DIMENSION: &'static str = "mass";

    fn factor(self) -> Real {
        let one = SiMass::new::<mass::gram>(1.0);
        match self {
            MassUnit::Grams => 1.0,
            MassUnit::Milligrams => one.get::<mass::milligram>(),
            MassUnit::Kilograms => one.get::<mass::kilogram>(),
            MassUnit::Pounds => one.get::<mass::pound>(),
            MassUnit::Ounces => one.get::<mass::ounce>(),
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            MassUnit::Grams => "g",
            MassUnit::Milligrams => "mg",
            MassUnit::Kilograms => "kg",
            MassUnit::Pounds => "lb",
            MassUnit::Ounces => "oz",
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        Some(match suffix {
            "g" | "gram" | "grams" => MassUnit::Grams,
            "mg" | "milligram" | "milligrams" => MassUnit::Milligrams,
            "kg" | "kilogram" | "kilograms" | "kilos" => MassUnit::Kilograms,
            "lb" | "lbs" | "pound" | "pounds" => MassUnit::Pounds,
            "oz" | "ounce" | "ounces" => MassUnit::Ounces,
            _ => return None,
        })
    }
}

macro_rules! unit_display {
    ($($ty:ty),*) => {$(
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.suffix())
            }
        }

        impl FromStr for $ty {
            type Err = FormatError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_unit(s)
            }
        }
    )*};
}

unit_display!(LengthUnit, MassUnit);

/// A scalar measurement in unit family `U`.
#[derive(Clone, Copy, Debug)]
pub struct Quantity<U: Unit> {
    unit: U,
    /// Value expressed in `U::DEFAULT`.
    val: Real,
}

pub type Length = Quantity<LengthUnit>;
pub type Mass = Quantity<MassUnit>;

impl<U: Unit> Quantity<U> {
    /// Create a quantity from a value expressed in `unit`.
    pub fn new(unit: U, value: Real) -> Self {
        Self {
            unit,
            val: value / unit.factor(),
        }
    }

    /// Create a quantity from a value already in the default unit.
    pub fn from_normalized(val: Real) -> Self {
        Self {
            unit: U::DEFAULT,
            val,
        }
    }

    /// Same measurement, displayed in `unit`.
    pub fn to(self, unit: U) -> Self {
        Self { unit, ..self }
    }

    /// Change the display unit in place.
    pub fn conv(&mut self, unit: U) {
        self.unit = unit;
    }

    /// Value in this quantity's display unit.
    pub fn value(self) -> Real {
        self.val * self.unit.factor()
    }

    /// Value in the default unit.
    pub fn normalized(self) -> Real {
        self.val
    }

    pub fn unit(self) -> U {
        self.unit
    }

    pub fn abs(self) -> Self {
        Self {
            val: self.val.abs(),
            ..self
        }
    }

    pub fn is_finite(self) -> bool {
        self.val.is_finite()
    }

    /// Componentwise helpers need the smaller/larger of two values while
    /// keeping the left-hand display unit.
    pub fn min(self, other: Self) -> Self {
        Self {
            val: self.val.min(other.val),
            ..self
        }
    }

    pub fn max(self, other: Self) -> Self {
        Self {
            val: self.val.max(other.val),
            ..self
        }
    }
}

impl<U: Unit> Default for Quantity<U> {
    fn default() -> Self {
        Self::from_normalized(0.0)
    }
}

impl<U: Unit> PartialEq for Quantity<U> {
    fn eq(&self, other: &Self) -> bool {
        self.val == other.val
    }
}

impl<U: Unit> PartialOrd for Quantity<U> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.val.partial_cmp(&other.val)
    }
}

impl<U: Unit> Add for Quantity<U> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            val: self.val + rhs.val,
            ..self
        }
    }
}

impl<U: Unit> Sub for Quantity<U> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            val: self.val - rhs.val,
            ..self
        }
    }
}

impl<U: Unit> Neg for Quantity<U> {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            val: -self.val,
            ..self
        }
    }
}

impl<U: Unit> Mul<Real> for Quantity<U> {
    type Output = Self;

    fn mul(self, scale: Real) -> Self {
        Self {
            val: self.val * scale,
            ..self
        }
    }
}

impl<U: Unit> Div<Real> for Quantity<U> {
    type Output = Self;

    fn div(self, scale: Real) -> Self {
        Self {
            val: self.val / scale,
            ..self
        }
    }
}

impl<U: Unit> AddAssign for Quantity<U> {
    fn add_assign(&mut self, rhs: Self) {
        self.val += rhs.val;
    }
}

impl<U: Unit> SubAssign for Quantity<U> {
    fn sub_assign(&mut self, rhs: Self) {
        self.val -= rhs.val;
    }
}

impl<U: Unit> MulAssign<Real> for Quantity<U> {
    fn mul_assign(&mut self, scale: Real) {
        self.val *= scale;
    }
}

impl<U: Unit> DivAssign<Real> for Quantity<U> {
    fn div_assign(&mut self, scale: Real) {
        self.val /= scale;
    }
}

impl<U: Unit> fmt::Display for Quantity<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value(), self.unit.suffix())
    }
}

impl<U: Unit> FromStr for Quantity<U> {
    type Err = FormatError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (value, unit) = split_value_and_unit(raw)?;
        let unit = parse_unit::<U>(unit)?;
        Ok(Self::new(unit, value))
    }
}

/// Split `"12.5 mm"` into `(12.5, "mm")`.
fn split_value_and_unit(raw: &str) -> Result<(Real, &str), FormatError> {
    let trimmed = raw.trim();
    let split_idx = trimmed
        .find(|c: char| !c.is_ascii_digit() && !matches!(c, '.' | '-' | '+' | 'e' | 'E'))
        .unwrap_or(trimmed.len());
    let (num_part, unit_part) = trimmed.split_at(split_idx);

    let bad = || FormatError::BadQuantity {
        literal: raw.to_string(),
    };
    let value: Real = num_part.trim().parse().map_err(|_| bad())?;
    if !value.is_finite() {
        return Err(bad());
    }
    Ok((value, unit_part))
}

impl<U: Unit> Serialize for Quantity<U> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de, U: Unit> Deserialize<'de> for Quantity<U> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct QuantityVisitor<U>(std::marker::PhantomData<U>);

        impl<U: Unit> Visitor<'_> for QuantityVisitor<U> {
            type Value = Quantity<U>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a {} string such as \"3.2{}\" or a number", U::DIMENSION, U::DEFAULT.suffix())
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Ok(Quantity::from_normalized(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(Quantity::from_normalized(v as Real))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(Quantity::from_normalized(v as Real))
            }
        }

        deserializer.deserialize_any(QuantityVisitor(std::marker::PhantomData))
    }
}

impl Length {
    pub fn as_si(self) -> SiLength {
        SiLength::new::<length::meter>(self.val)
    }

    pub fn from_si(si: SiLength) -> Self {
        Self::from_normalized(si.get::<length::meter>())
    }
}

impl Mass {
    pub fn as_si(self) -> SiMass {
        SiMass::new::<mass::gram>(self.val)
    }

    pub fn from_si(si: SiMass) -> Self {
        Self::from_normalized(si.get::<mass::gram>())
    }
}

#[inline]
pub fn m(v: Real) -> Length {
    Length::new(LengthUnit::Meters, v)
}

#[inline]
pub fn mm(v: Real) -> Length {
    Length::new(LengthUnit::Millimeters, v)
}

#[inline]
pub fn inches(v: Real) -> Length {
    Length::new(LengthUnit::Inches, v)
}

#[inline]
pub fn g(v: Real) -> Mass {
    Mass::new(MassUnit::Grams, v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::{Tolerances, nearly_equal};

    fn close(a: Real, b: Real) -> bool {
        nearly_equal(a, b, Tolerances::CONVERSION)
    }

    #[test]
    fn parse_inches_keeps_display_unit() {
        let l: Length = "5.3in".parse().unwrap();
        assert_eq!(l.unit(), LengthUnit::Inches);
        assert!(close(l.to(LengthUnit::Inches).value(), 5.3));
        assert!(close(l.normalized(), 5.3 * 0.0254));
    }

    #[test]
    fn bare_number_is_default_unit() {
        let l: Length = "13.213".parse().unwrap();
        assert_eq!(l.unit(), LengthUnit::Meters);
        assert!(close(l.normalized(), 13.213));
    }

    #[test]
    fn length_conversions() {
        let conv = Length::new(LengthUnit::Inches, 17.0);
        assert!(close(conv.normalized(), 0.4318));
        let sum = Length::new(LengthUnit::Feet, 1.0) + Length::new(LengthUnit::Inches, 5.0);
        assert!((conv - sum).abs() < m(0.001));
        assert_eq!(sum.unit(), LengthUnit::Feet);
    }

    #[test]
    fn mass_parse_trims_and_ignores_case() {
        let lbs: Mass = " 12.41 LBS".parse().unwrap();
        assert_eq!(lbs.unit(), MassUnit::Pounds);
        assert!(close(lbs.value(), 12.41));

        let grams: Mass = " 51g".parse().unwrap();
        assert!(close(grams.normalized(), Mass::new(MassUnit::Milligrams, 51_000.0).normalized()));
    }

    #[test]
    fn mass_conversions() {
        let conv = Mass::new(MassUnit::Ounces, 35.2);
        let max_err = g(1.0);
        assert!((conv - Mass::new(MassUnit::Kilograms, 0.997_903_2)).abs() < max_err);
        assert!((conv - Mass::new(MassUnit::Pounds, 2.2)).abs() < max_err);
    }

    #[test]
    fn unknown_unit_is_format_error() {
        let err = "3 parsecs".parse::<Length>().unwrap_err();
        assert_eq!(
            err,
            FormatError::UnknownUnit {
                unit: "parsecs".into(),
                dimension: "length"
            }
        );
        assert!(matches!(
            "abc".parse::<Mass>(),
            Err(FormatError::BadQuantity { .. })
        ));
    }

    #[test]
    fn display_uses_suffix() {
        assert_eq!(Length::new(LengthUnit::Millimeters, 2.5).to_string(), "2.5mm");
        assert_eq!(m(3.2).to_string(), "3.2m");
    }

    #[test]
    fn serde_accepts_numbers_and_strings() {
        let pt: Vec<Length> = serde_json::from_str(r#"[0, "2cm", 1.5]"#).unwrap();
        assert_eq!(pt[0], m(0.0));
        assert_eq!(pt[1].unit(), LengthUnit::Centimeters);
        assert!(close(pt[1].normalized(), 0.02));
        assert_eq!(pt[2], m(1.5));

        let json = serde_json::to_string(&pt[1]).unwrap();
        assert_eq!(json, "\"2cm\"");
    }

    #[test]
    fn uom_interop() {
        let l = inches(10.0);
        assert!(close(l.as_si().get::<length::centimeter>(), 25.4));
        assert_eq!(Length::from_si(l.as_si()), l);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::numeric::{Tolerances, nearly_equal};
    use proptest::prelude::*;

    fn length_unit() -> impl Strategy<Value = LengthUnit> {
        prop_oneof![
            Just(LengthUnit::Millimeters),
            Just(LengthUnit::Centimeters),
            Just(LengthUnit::Meters),
            Just(LengthUnit::Inches),
            Just(LengthUnit::Feet),
        ]
    }

    proptest! {
        #[test]
        fn display_then_parse_is_same_quantity(v in -1.0e6_f64..1.0e6, unit in length_unit()) {
            let q = Length::new(unit, v);
            let back: Length = q.to_string().parse().unwrap();
            prop_assert_eq!(back.unit(), unit);
            prop_assert!(nearly_equal(back.normalized(), q.normalized(), Tolerances::CONVERSION));
        }
    }
}
