use grains_core::errors::GrainsError;
use log::{debug, info};

use crate::config::RootConfig;
use crate::metric::{expand, grain_error, step_up};
use crate::outcome::{RootOutcome, SearchState, StopReason};

/// Finite Newton search: the forward difference `E(k+1) − E(k)` picks the
/// direction of a single grain step.
pub fn slope_search(config: &RootConfig) -> Result<RootOutcome, GrainsError> {
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

        let plus = step_up(state.k)?;
        let rising = grain_error(plus, state.m, n)? > state.error;
        let candidate = if rising {
            state.k.checked_sub(1).unwrap_or(state.k)
        } else {
            plus
        };
        let candidate_err = grain_error(candidate, state.m, n)?;

        if candidate_err < state.error {
            state.step(candidate, candidate_err);
            debug!(
                "slope iter={} k={} m={} err={}",
                state.iterations, state.k, state.m, state.error
            );
            continue;
        }

        match expand(state.k, state.m, config.expansion_factor, config.max_capacity)? {
            Some((k, m)) => {
                let error = grain_error(k, m, n)?;
                state.expand(k, m, error);
                info!("slope expanded capacity to m={m}, k={k}, err={error}");
            }
            None => {
                info!(
                    "slope stopped at max capacity m={} with err={}",
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
    info!("slope finished {:?} at k={} m={}", stop, state.k, state.m);
    Ok(state.finish(stop))
}
