//! Capacity expansion and rescaling rules shared by every search and solver.

use log::info;
use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, GrainsError};

/// Outcome of a single capacity refinement request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum CapacityStep {
    /// Capacity grew from `from` to `to`.
    Expanded {
        /// Capacity before the step.
        from: u64,
        /// Capacity after the step.
        to: u64,
    },
    /// The multiplied capacity would exceed the maximum; nothing changed.
    Capped {
        /// Unchanged capacity.
        at: u64,
    },
}

impl CapacityStep {
    /// Capacity in force after the step.
    pub fn capacity(&self) -> u64 {
        match *self {
            CapacityStep::Expanded { to, .. } => to,
            CapacityStep::Capped { at } => at,
        }
    }
}

fn check_factor(factor: u64) -> Result<(), GrainsError> {
    if factor < 2 {
        return Err(GrainsError::Config(
            ErrorInfo::new("invalid-factor", "expansion factor must be at least 2")
                .with_context("factor", factor.to_string()),
        ));
    }
    Ok(())
}

/// Multiplies `old` by `factor` unless that would exceed `max`.
pub fn refine_capacity(old: u64, factor: u64, max: u64) -> Result<CapacityStep, GrainsError> {
    check_factor(factor)?;
    match old.checked_mul(factor) {
        Some(new) if new <= max => {
            info!("capacity refined from {old} to {new}");
            Ok(CapacityStep::Expanded { from: old, to: new })
        }
        _ => Ok(CapacityStep::Capped { at: old }),
    }
}

/// Returns `min(old * factor, max)`, saturating on overflow.
pub fn expand_clamped(old: u64, factor: u64, max: u64) -> u64 {
    old.saturating_mul(factor).min(max)
}

/// Integer division rounding halves away from zero.
pub fn round_div(num: i128, den: i128) -> Result<i128, GrainsError> {
    if den == 0 {
        return Err(GrainsError::Arithmetic(ErrorInfo::new(
            "division-by-zero",
            "rounded division by zero",
        )));
    }
    let negative = (num < 0) != (den < 0);
    let n = num.checked_abs().ok_or_else(|| GrainsError::overflow("round_div"))?;
    let d = den.checked_abs().ok_or_else(|| GrainsError::overflow("round_div"))?;
    let q = n / d;
    let r = n % d;
    let q = if r >= d - r { q + 1 } else { q };
    Ok(if negative { -q } else { q })
}

/// Nearest integer to `k * to / from`.
pub fn rescale_round(k: i128, from: u64, to: u64) -> Result<i128, GrainsError> {
    let scaled = k
        .checked_mul(i128::from(to))
        .ok_or_else(|| GrainsError::overflow("rescale_round"))?;
    round_div(scaled, i128::from(from))
}
