use grains_core::errors::GrainsError;
use log::{debug, info};

use crate::config::RootConfig;
use crate::metric::{rational_error, step_up};
use crate::outcome::{RootOutcome, SearchState, StopReason};

/// Evaluates the current pair against the rational target.
struct EvalLayer {
    tn: u64,
    td: u64,
}

impl EvalLayer {
    fn forward(&self, k: u64, m: u64) -> Result<(u128, u128), GrainsError> {
        rational_error(k, m, self.tn, self.td)
    }
}

/// Tries `k + 1` then `k − 1`, keeping the best strict improvement.
fn update_layer(eval: &EvalLayer, k: u64, m: u64) -> Result<Option<(u64, u128)>, GrainsError> {
    let (current, _) = eval.forward(k, m)?;
    let mut best: Option<(u64, u128)> = None;
    let mut best_diff = current;

    let up = step_up(k)?;
    let (up_diff, _) = eval.forward(up, m)?;
    if up_diff < best_diff {
        best = Some((up, up_diff));
        best_diff = up_diff;
    }
    if k > 0 {
        let (down_diff, _) = eval.forward(k - 1, m)?;
        if down_diff < best_diff {
            best = Some((k - 1, down_diff));
        }
    }
    Ok(best)
}

/// Approximates `√(target / target_den)` until the error drops below
/// `1 / tolerance_den`.
pub fn layered_search(
    config: &RootConfig,
    target_den: u64,
    tolerance_den: u64,
) -> Result<RootOutcome, GrainsError> {
    config.validate()?;
    if target_den == 0 || tolerance_den == 0 {
        return Err(GrainsError::config(
            "layered",
            "target and tolerance denominators must be positive",
        ));
    }
    let eval = EvalLayer {
        tn: config.target,
        td: target_den,
    };
    let (initial, _) = eval.forward(config.initial_k, config.initial_m)?;
    let mut state = SearchState::new(config.initial_k, config.initial_m, initial);
    let tolerance = u128::from(tolerance_den);

    while state.iterations < config.allowed_iterations {
        state.iterations += 1;
        let (diff, denom) = eval.forward(state.k, state.m)?;
        if diff == 0 {
            info!("layered search exact at k={} m={}", state.k, state.m);
            return Ok(state.finish(StopReason::Exact));
        }
        let scaled = diff
            .checked_mul(tolerance)
            .ok_or_else(|| GrainsError::overflow("layered tolerance"))?;
        if scaled < denom {
            info!(
                "layered search converged at k={} m={} after {} iterations",
                state.k, state.m, state.iterations
            );
            return Ok(state.finish(StopReason::WithinTolerance));
        }

        if let Some((k, error)) = update_layer(&eval, state.k, state.m)? {
            state.step(k, error);
            debug!(
                "layered iter={} k={} m={} diff={}",
                state.iterations, state.k, state.m, error
            );
            continue;
        }

        let grown = state
            .m
            .checked_mul(config.expansion_factor)
            .filter(|m| *m <= config.max_capacity);
        let Some(m) = grown else {
            info!("layered search exhausted capacity at m={}", state.m);
            return Ok(state.finish(StopReason::CapacityExhausted));
        };
        let k = state
            .k
            .checked_mul(config.expansion_factor)
            .ok_or_else(|| GrainsError::overflow("layered expand"))?;
        let (error, _) = eval.forward(k, m)?;
        state.expand(k, m, error);
        info!("layered expanded capacity to m={m}, k={k}");
    }

    Ok(state.finish(StopReason::IterationLimit))
}
