use grains_core::capacity::rescale_round;
use grains_core::errors::GrainsError;

fn square(value: u64) -> u128 {
    u128::from(value) * u128::from(value)
}

/// `k + 1`, or an overflow error at `u64::MAX`.
pub(crate) fn step_up(k: u64) -> Result<u64, GrainsError> {
    k.checked_add(1).ok_or_else(|| GrainsError::overflow("step_up"))
}

/// Integer error `|k² − N·M²|` of the approximation `k / m` to `√N`.
pub fn grain_error(k: u64, m: u64, n: u64) -> Result<u128, GrainsError> {
    let rhs = u128::from(n)
        .checked_mul(square(m))
        .ok_or_else(|| GrainsError::overflow("grain_error"))?;
    Ok(square(k).abs_diff(rhs))
}

/// Error of `k / m` against `√(tn / td)` as `(|k²·td − tn·M²|, M²·td)`.
///
/// The real error is the quotient of the pair.
pub fn rational_error(k: u64, m: u64, tn: u64, td: u64) -> Result<(u128, u128), GrainsError> {
    let overflow = || GrainsError::overflow("rational_error");
    let lhs = square(k).checked_mul(u128::from(td)).ok_or_else(overflow)?;
    let rhs = u128::from(tn).checked_mul(square(m)).ok_or_else(overflow)?;
    let denom = square(m).checked_mul(u128::from(td)).ok_or_else(overflow)?;
    Ok((lhs.abs_diff(rhs), denom))
}

/// Expands `(k, m)` to `min(m·factor, max)`, rescaling `k` to the nearest grain.
///
/// Returns `None` once `m` has reached `max`.
pub fn expand(k: u64, m: u64, factor: u64, max: u64) -> Result<Option<(u64, u64)>, GrainsError> {
    if m >= max {
        return Ok(None);
    }
    let new_m = grains_core::expand_clamped(m, factor, max);
    let new_k = rescale_round(i128::from(k), m, new_m)?;
    let new_k = u64::try_from(new_k).map_err(|_| GrainsError::overflow("expand"))?;
    Ok(Some((new_k, new_m)))
}
