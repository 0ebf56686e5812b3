use grains_core::errors::GrainsError;
use log::{debug, info};

use crate::config::RootConfig;
use crate::metric::{expand, grain_error, step_up};
use crate::outcome::{RootOutcome, SearchState, StopReason};

/// Moves to whichever of `k ± 1` strictly lowers the error, expanding the
/// capacity when neither does.
pub fn greedy_search(config: &RootConfig) -> Result<RootOutcome, GrainsError> {
    config.validate()?;
    let n = config.target;
    let mut state = SearchState::new(
        config.initial_k,
        config.initial_m,
        grain_error(config.initial_k, config.initial_m, n)?,
    );

    while state.iterations < config.allowed_iterations {
        if state.error == 0 {
            break;
        }
        state.iterations += 1;

        let mut best = (state.k, state.error);
        let plus = step_up(state.k)?;
        let plus_err = grain_error(plus, state.m, n)?;
        if plus_err < best.1 {
            best = (plus, plus_err);
        }
        if let Some(minus) = state.k.checked_sub(1) {
            let minus_err = grain_error(minus, state.m, n)?;
            if minus_err < best.1 {
                best = (minus, minus_err);
            }
        }

        if best.1 < state.error {
            state.step(best.0, best.1);
            debug!(
                "greedy iter={} k={} m={} err={}",
                state.iterations, state.k, state.m, state.error
            );
            continue;
        }

        match expand(state.k, state.m, config.expansion_factor, config.max_capacity)? {
            Some((k, m)) => {
                let error = grain_error(k, m, n)?;
                state.expand(k, m, error);
                info!("greedy expanded capacity to m={m}, k={k}, err={error}");
            }
            None => {
                info!(
                    "greedy stopped at max capacity m={} with err={}",
                    state.m, state.error
                );
                return Ok(state.finish(StopReason::CapacityExhausted));
            }
        }
    }

    let stop = if state.error == 0 {
        StopReason::Exact
    } else {
        StopReason::IterationLimit
    };
    info!("greedy finished {:?} at k={} m={}", stop, state.k, state.m);
    Ok(state.finish(stop))
}
