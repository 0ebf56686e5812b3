//! Fractions whose reduced denominator may never exceed a global bound Ω.

use std::fmt::{self, Display};

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, GrainsError};
use crate::grain::Grain;

/// Default global denominator bound.
pub const DEFAULT_OMEGA: i64 = 20_000;

/// Reduced fraction `num/den` with `0 < den <= omega`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawBounded")]
pub struct BoundedGrain {
    num: i64,
    den: i64,
    omega: i64,
}

#[derive(Deserialize)]
struct RawBounded {
    num: i64,
    den: i64,
    omega: i64,
}

impl TryFrom<RawBounded> for BoundedGrain {
    type Error = GrainsError;

    fn try_from(raw: RawBounded) -> Result<Self, Self::Error> {
        BoundedGrain::with_omega(raw.num, raw.den, raw.omega)
    }
}

fn omega_exceeded(den: i64, omega: i64) -> GrainsError {
    GrainsError::Capacity(
        ErrorInfo::new("omega-exceeded", "denominator exceeds the global bound")
            .with_context("denominator", den.to_string())
            .with_context("omega", omega.to_string()),
    )
}

impl BoundedGrain {
    /// Builds a fraction under [`DEFAULT_OMEGA`].
    pub fn new(num: i64, den: i64) -> Result<Self, GrainsError> {
        Self::with_omega(num, den, DEFAULT_OMEGA)
    }

    /// Builds a fraction under an explicit bound.
    pub fn with_omega(num: i64, den: i64, omega: i64) -> Result<Self, GrainsError> {
        if omega < 1 {
            return Err(GrainsError::config("omega", "omega must be positive"));
        }
        if den == 0 {
            return Err(GrainsError::Arithmetic(ErrorInfo::new(
                "zero-denominator",
                "bounded grain denominator must be non-zero",
            )));
        }
        // gcd and sign normalisation have no representable result at i64::MIN
        if num == i64::MIN || den == i64::MIN {
            return Err(GrainsError::overflow("normalise"));
        }
        let g = num.gcd(&den);
        let (mut num, mut den) = (num / g, den / g);
        if den < 0 {
            num = num.checked_neg().ok_or_else(|| GrainsError::overflow("normalise"))?;
            den = den.checked_neg().ok_or_else(|| GrainsError::overflow("normalise"))?;
        }
        if den > omega {
            return Err(omega_exceeded(den, omega));
        }
        Ok(Self { num, den, omega })
    }

    /// Integer value under the default bound.
    pub fn from_integer(value: i64) -> Self {
        Self {
            num: value,
            den: 1,
            omega: DEFAULT_OMEGA,
        }
    }

    /// Reduced numerator.
    pub fn numer(&self) -> i64 {
        self.num
    }

    /// Reduced denominator.
    pub fn denom(&self) -> i64 {
        self.den
    }

    /// Bound in force for this value.
    pub fn omega(&self) -> i64 {
        self.omega
    }

    /// Common denominator of both operands, bounded by the smaller Ω.
    pub fn unify(&self, other: &BoundedGrain) -> Result<i64, GrainsError> {
        let omega = self.omega.min(other.omega);
        let lcm = (self.den / self.den.gcd(&other.den))
            .checked_mul(other.den)
            .ok_or_else(|| GrainsError::overflow("unify"))?;
        if lcm > omega {
            return Err(omega_exceeded(lcm, omega));
        }
        Ok(lcm)
    }

    fn rescaled(&self, other: &BoundedGrain) -> Result<(i64, i64, i64), GrainsError> {
        let den = self.unify(other)?;
        let a = self
            .num
            .checked_mul(den / self.den)
            .ok_or_else(|| GrainsError::overflow("rescale"))?;
        let b = other
            .num
            .checked_mul(den / other.den)
            .ok_or_else(|| GrainsError::overflow("rescale"))?;
        Ok((a, b, den))
    }

    /// Sum on the unified denominator.
    pub fn add(&self, other: &BoundedGrain) -> Result<BoundedGrain, GrainsError> {
        let (a, b, den) = self.rescaled(other)?;
        let num = a.checked_add(b).ok_or_else(|| GrainsError::overflow("add"))?;
        Self::with_omega(num, den, self.omega.min(other.omega))
    }

    /// Difference on the unified denominator.
    pub fn sub(&self, other: &BoundedGrain) -> Result<BoundedGrain, GrainsError> {
        let (a, b, den) = self.rescaled(other)?;
        let num = a.checked_sub(b).ok_or_else(|| GrainsError::overflow("sub"))?;
        Self::with_omega(num, den, self.omega.min(other.omega))
    }

    /// Exact product, re-checked against Ω after reduction.
    pub fn mul(&self, other: &BoundedGrain) -> Result<BoundedGrain, GrainsError> {
        let num = self
            .num
            .checked_mul(other.num)
            .ok_or_else(|| GrainsError::overflow("mul"))?;
        let den = self
            .den
            .checked_mul(other.den)
            .ok_or_else(|| GrainsError::overflow("mul"))?;
        Self::with_omega(num, den, self.omega.min(other.omega))
    }

    /// Exact quotient, re-checked against Ω after reduction.
    pub fn div(&self, other: &BoundedGrain) -> Result<BoundedGrain, GrainsError> {
        if other.num == 0 {
            return Err(GrainsError::Arithmetic(ErrorInfo::new(
                "division-by-zero",
                "cannot divide by a zero bounded grain",
            )));
        }
        let num = self
            .num
            .checked_mul(other.den)
            .ok_or_else(|| GrainsError::overflow("div"))?;
        let den = self
            .den
            .checked_mul(other.num)
            .ok_or_else(|| GrainsError::overflow("div"))?;
        Self::with_omega(num, den, self.omega.min(other.omega))
    }

    /// Exact unbounded counterpart.
    pub fn to_grain(&self) -> Grain {
        Grain::from(BigRational::new(BigInt::from(self.num), BigInt::from(self.den)))
    }
}

impl Display for BoundedGrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}
