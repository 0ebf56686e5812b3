use grains_core::errors::{ErrorInfo, GrainsError};
use grains_core::Grain;

/// Trapezoid rule over `[a, b]` with `n` equal steps, evaluated exactly.
pub fn trapezoid<F>(f: F, a: &Grain, b: &Grain, n: u64) -> Result<Grain, GrainsError>
where
    F: Fn(&Grain) -> Grain,
{
    if n == 0 {
        return Err(GrainsError::config("steps", "at least one step is required"));
    }
    if b < a {
        return Err(GrainsError::Config(
            ErrorInfo::new("invalid-config", "integration bounds are reversed")
                .with_context("from", a.to_string())
                .with_context("to", b.to_string()),
        ));
    }
    let h = (b - a).checked_div(&Grain::from_integer(n))?;
    let two = Grain::from(2);
    let interior: Grain = (1..n)
        .map(|i| f(&(a + &h * Grain::from_integer(i))))
        .sum();
    let total = f(a) + f(b) + &two * interior;
    Ok(h.checked_div(&two)? * total)
}

/// Forward differences `(y[i+1] − y[i]) / dx`.
pub fn forward_difference(y: &[Grain], dx: &Grain) -> Result<Vec<Grain>, GrainsError> {
    if dx.is_zero() {
        return Err(GrainsError::Arithmetic(ErrorInfo::new(
            "division-by-zero",
            "forward difference step must be non-zero",
        )));
    }
    y.windows(2)
        .map(|pair| (&pair[1] - &pair[0]).checked_div(dx))
        .collect()
}
