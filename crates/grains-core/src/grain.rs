//! Exact rational grains backed by arbitrary precision integers.

use std::fmt::{self, Display};
use std::iter::Sum;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{FromPrimitive, One, Signed, ToPrimitive, Zero};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use crate::errors::{ErrorInfo, GrainsError};

/// Exact rational quantity. Always reduced with a positive denominator.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Grain(BigRational);

fn zero_denominator() -> GrainsError {
    GrainsError::Arithmetic(ErrorInfo::new(
        "zero-denominator",
        "grain denominator must be non-zero",
    ))
}

fn division_by_zero() -> GrainsError {
    GrainsError::Arithmetic(ErrorInfo::new("division-by-zero", "cannot divide by a zero grain"))
}

impl Grain {
    /// Builds `num / den`, reducing and moving the sign onto the numerator.
    pub fn new(num: impl Into<BigInt>, den: impl Into<BigInt>) -> Result<Self, GrainsError> {
        let den = den.into();
        if den.is_zero() {
            return Err(zero_denominator());
        }
        Ok(Self(BigRational::new(num.into(), den)))
    }

    /// Builds `num / den` from literal parts; a zero `den` is treated as one.
    pub fn ratio(num: i64, den: u64) -> Self {
        Self(BigRational::new(BigInt::from(num), BigInt::from(den.max(1))))
    }

    /// Builds an integral grain.
    pub fn from_integer(value: impl Into<BigInt>) -> Self {
        Self(BigRational::from_integer(value.into()))
    }

    /// The zero grain.
    pub fn zero() -> Self {
        Self(BigRational::zero())
    }

    /// The unit grain.
    pub fn one() -> Self {
        Self(BigRational::one())
    }

    /// Reduced numerator.
    pub fn numer(&self) -> &BigInt {
        self.0.numer()
    }

    /// Reduced, strictly positive denominator.
    pub fn denom(&self) -> &BigInt {
        self.0.denom()
    }

    /// Returns `true` for the zero grain.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns `true` when the grain is strictly negative.
    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    /// Returns `true` when the denominator is one.
    pub fn is_integer(&self) -> bool {
        self.0.is_integer()
    }

    /// Absolute value.
    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Exact division, failing on a zero divisor.
    pub fn checked_div(&self, rhs: &Grain) -> Result<Grain, GrainsError> {
        if rhs.is_zero() {
            return Err(division_by_zero());
        }
        Ok(Self(&self.0 / &rhs.0))
    }

    /// Multiplicative inverse.
    pub fn recip(&self) -> Result<Grain, GrainsError> {
        Grain::one().checked_div(self)
    }

    /// Smallest integer not below the grain.
    pub fn ceil_integer(&self) -> BigInt {
        self.0.ceil().to_integer()
    }

    /// Largest integer not above the grain.
    pub fn floor_integer(&self) -> BigInt {
        self.0.floor().to_integer()
    }

    /// Nearest integer, halves rounded away from zero.
    pub fn round_integer(&self) -> BigInt {
        self.0.round().to_integer()
    }

    /// Approximate decimal value. Display and reporting only.
    pub fn to_f64(&self) -> f64 {
        match self.0.to_f64() {
            Some(value) => value,
            None => {
                let num = self.numer().to_f64().unwrap_or(f64::NAN);
                let den = self.denom().to_f64().unwrap_or(f64::NAN);
                num / den
            }
        }
    }

    /// Encodes a decimal as `round(value * den) / den`.
    pub fn from_f64_rounded(value: f64, den: u64) -> Result<Self, GrainsError> {
        if den == 0 {
            return Err(zero_denominator());
        }
        let scaled = (value * den as f64).round();
        let num = BigInt::from_f64(scaled).ok_or_else(|| {
            GrainsError::Arithmetic(
                ErrorInfo::new("non-finite", "cannot encode a non-finite decimal as a grain")
                    .with_context("value", value.to_string()),
            )
        })?;
        Grain::new(num, den)
    }

    /// Borrow the underlying rational.
    pub fn as_ratio(&self) -> &BigRational {
        &self.0
    }
}

impl From<i64> for Grain {
    fn from(value: i64) -> Self {
        Grain::from_integer(value)
    }
}

impl From<BigRational> for Grain {
    fn from(value: BigRational) -> Self {
        Self(value)
    }
}

macro_rules! grain_binop {
    ($trait:ident, $method:ident) => {
        impl $trait<Grain> for Grain {
            type Output = Grain;

            fn $method(self, rhs: Grain) -> Grain {
                Grain(self.0.$method(rhs.0))
            }
        }

        impl<'a> $trait<&'a Grain> for Grain {
            type Output = Grain;

            fn $method(self, rhs: &'a Grain) -> Grain {
                Grain(self.0.$method(&rhs.0))
            }
        }

        impl<'a> $trait<Grain> for &'a Grain {
            type Output = Grain;

            fn $method(self, rhs: Grain) -> Grain {
                Grain((&self.0).$method(rhs.0))
            }
        }

        impl<'a, 'b> $trait<&'b Grain> for &'a Grain {
            type Output = Grain;

            fn $method(self, rhs: &'b Grain) -> Grain {
                Grain((&self.0).$method(&rhs.0))
            }
        }
    };
}

grain_binop!(Add, add);
grain_binop!(Sub, sub);
grain_binop!(Mul, mul);

impl Neg for Grain {
    type Output = Grain;

    fn neg(self) -> Grain {
        Grain(-self.0)
    }
}

impl<'a> Neg for &'a Grain {
    type Output = Grain;

    fn neg(self) -> Grain {
        Grain(-&self.0)
    }
}

impl Sum for Grain {
    fn sum<I: Iterator<Item = Grain>>(iter: I) -> Self {
        iter.fold(Grain::zero(), |acc, item| acc + item)
    }
}

impl<'a> Sum<&'a Grain> for Grain {
    fn sum<I: Iterator<Item = &'a Grain>>(iter: I) -> Self {
        iter.fold(Grain::zero(), |acc, item| acc + item)
    }
}

impl Display for Grain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numer(), self.denom())
    }
}

impl FromStr for Grain {
    type Err = GrainsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_int = |part: &str| {
            part.trim().parse::<BigInt>().map_err(|err| {
                GrainsError::Arithmetic(
                    ErrorInfo::new("parse", format!("invalid grain literal: {err}"))
                        .with_context("input", s)
                        .with_hint("expected `n` or `n/d` with integer parts"),
                )
            })
        };
        let trimmed = s.trim();
        match trimmed.split_once('/') {
            Some((num, den)) => Grain::new(parse_int(num)?, parse_int(den)?),
            None => Ok(Grain::from_integer(parse_int(trimmed)?)),
        }
    }
}

impl Serialize for Grain {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Grain {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}
