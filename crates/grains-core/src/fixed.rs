//! Fixed-capacity values `(k / ncap) * scale` with vanishing-increment refinement.

use std::fmt::{self, Display};

use num_integer::Integer;
use serde::{Deserialize, Serialize};

use crate::capacity::round_div;
use crate::errors::{ErrorInfo, GrainsError};

/// How far a product may refine its capacity to keep a non-zero increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefinePolicy {
    /// Capacity multiplier applied per refinement.
    pub factor: i64,
    /// Upper bound on refinements for a single operation.
    pub max_steps: u32,
}

impl Default for RefinePolicy {
    fn default() -> Self {
        Self {
            factor: 2,
            max_steps: 5,
        }
    }
}

/// A value encoded as `k` grains out of a capacity `ncap`, times `scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedGrain {
    /// Grain count.
    pub k: i64,
    /// Capacity (denominator).
    pub ncap: i64,
    /// Scale shared by every operand of an operation.
    pub scale: i64,
}

fn narrow(value: i128, operation: &str) -> Result<i64, GrainsError> {
    i64::try_from(value).map_err(|_| GrainsError::overflow(operation))
}

fn mul128(a: i128, b: i128, operation: &str) -> Result<i128, GrainsError> {
    a.checked_mul(b).ok_or_else(|| GrainsError::overflow(operation))
}

impl FixedGrain {
    /// Builds a value directly from its parts.
    pub fn new(k: i64, ncap: i64, scale: i64) -> Result<Self, GrainsError> {
        if ncap <= 0 {
            return Err(GrainsError::Capacity(
                ErrorInfo::new("invalid-capacity", "capacity must be positive")
                    .with_context("ncap", ncap.to_string()),
            ));
        }
        if scale == 0 {
            return Err(GrainsError::config("scale", "scale must be non-zero"));
        }
        Ok(Self { k, ncap, scale })
    }

    /// Encodes `real` as `round(real / scale * ncap)` grains.
    pub fn encode(real: f64, ncap: i64, scale: i64) -> Result<Self, GrainsError> {
        let probe = Self::new(0, ncap, scale)?;
        let k = (real / scale as f64 * ncap as f64).round();
        if !k.is_finite() || k.abs() >= i64::MAX as f64 {
            return Err(GrainsError::Arithmetic(
                ErrorInfo::new("non-finite", "value cannot be encoded at this capacity")
                    .with_context("value", real.to_string())
                    .with_context("ncap", ncap.to_string()),
            ));
        }
        Ok(Self { k: k as i64, ..probe })
    }

    /// Zero at the given capacity and scale.
    pub fn zero(ncap: i64, scale: i64) -> Result<Self, GrainsError> {
        Self::new(0, ncap, scale)
    }

    /// Decoded decimal value.
    pub fn to_f64(&self) -> f64 {
        self.k as f64 / self.ncap as f64 * self.scale as f64
    }

    /// `|k| / ncap`, how much of the grain range is used.
    pub fn usage_fraction(&self) -> f64 {
        self.k.unsigned_abs() as f64 / self.ncap as f64
    }

    /// Rescales both operands onto `max(ncap)`, flooring `k * new / old`.
    pub fn unify(a: &FixedGrain, b: &FixedGrain) -> Result<(FixedGrain, FixedGrain), GrainsError> {
        if a.scale != b.scale {
            return Err(GrainsError::Capacity(
                ErrorInfo::new("scale-mismatch", "operands use different scales")
                    .with_context("lhs", a.scale.to_string())
                    .with_context("rhs", b.scale.to_string()),
            ));
        }
        let ncap = a.ncap.max(b.ncap);
        Ok((a.rescaled_floor(ncap)?, b.rescaled_floor(ncap)?))
    }

    fn rescaled_floor(&self, ncap: i64) -> Result<FixedGrain, GrainsError> {
        if ncap == self.ncap {
            return Ok(*self);
        }
        let scaled = mul128(i128::from(self.k), i128::from(ncap), "unify")?;
        let k = narrow(scaled.div_floor(&i128::from(self.ncap)), "unify")?;
        Ok(FixedGrain { k, ncap, ..*self })
    }

    /// Sum on the unified capacity.
    pub fn add(&self, other: &FixedGrain) -> Result<FixedGrain, GrainsError> {
        let (a, b) = Self::unify(self, other)?;
        let k = a.k.checked_add(b.k).ok_or_else(|| GrainsError::overflow("add"))?;
        Ok(FixedGrain { k, ..a })
    }

    /// Difference on the unified capacity.
    pub fn sub(&self, other: &FixedGrain) -> Result<FixedGrain, GrainsError> {
        let (a, b) = Self::unify(self, other)?;
        let k = a.k.checked_sub(b.k).ok_or_else(|| GrainsError::overflow("sub"))?;
        Ok(FixedGrain { k, ..a })
    }

    /// Multiplies the capacity by `factor`, keeping the value.
    pub fn refine(&self, factor: i64) -> Result<FixedGrain, GrainsError> {
        if factor < 2 {
            return Err(GrainsError::config("factor", "refine factor must be at least 2"));
        }
        let ncap = self
            .ncap
            .checked_mul(factor)
            .ok_or_else(|| GrainsError::overflow("refine"))?;
        let k = self
            .k
            .checked_mul(factor)
            .ok_or_else(|| GrainsError::overflow("refine"))?;
        Ok(FixedGrain { k, ncap, ..*self })
    }

    /// Product at the unified capacity `n`: `k = round(ka * kb * scale / n)`.
    ///
    /// A non-zero exact product that would round to zero refines the
    /// capacity up to `policy.max_steps` times.
    pub fn mul(&self, other: &FixedGrain, policy: RefinePolicy) -> Result<FixedGrain, GrainsError> {
        let (a, b) = Self::unify(self, other)?;
        let mut numer = mul128(i128::from(a.k), i128::from(b.k), "mul")?;
        numer = mul128(numer, i128::from(a.scale), "mul")?;
        let mut ncap = a.ncap;
        let mut k = round_div(numer, i128::from(ncap))?;
        let mut steps = 0;
        while k == 0 && numer != 0 && steps < policy.max_steps {
            // refining n by f multiplies the exact grain count by f
            numer = mul128(numer, i128::from(policy.factor), "mul")?;
            ncap = ncap
                .checked_mul(policy.factor)
                .ok_or_else(|| GrainsError::overflow("mul"))?;
            k = round_div(numer, i128::from(a.ncap))?;
            steps += 1;
        }
        Ok(FixedGrain {
            k: narrow(k, "mul")?,
            ncap,
            scale: a.scale,
        })
    }

    /// Multiplies by a real scalar with the same vanishing-increment refinement.
    pub fn scale_by(&self, factor: f64, policy: RefinePolicy) -> Result<FixedGrain, GrainsError> {
        let value = self.to_f64() * factor;
        let mut out = Self::encode(value, self.ncap, self.scale)?;
        let mut steps = 0;
        while out.k == 0 && value.abs() > 1e-14 && steps < policy.max_steps {
            let ncap = out
                .ncap
                .checked_mul(policy.factor)
                .ok_or_else(|| GrainsError::overflow("scale_by"))?;
            out = Self::encode(value, ncap, self.scale)?;
            steps += 1;
        }
        Ok(out)
    }
}

impl Display for FixedGrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}x{}", self.k, self.ncap, self.scale)
    }
}
