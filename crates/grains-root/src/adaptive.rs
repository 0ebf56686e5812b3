use grains_core::errors::GrainsError;
use grains_core::rng::RngHandle;
use log::{debug, info};

use crate::config::{ExpansionTrigger, RootConfig, SearchMethod};
use crate::metric::{expand, grain_error, step_up};
use crate::outcome::{RootOutcome, SearchState, StopReason};

const INITIAL_WEIGHT: u64 = 5;

/// Weights parameterising the adaptive search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdaptiveParams {
    /// Cap on a rewarded direction.
    pub reward_cap: u64,
    /// Floor on a penalised direction.
    pub penalty_floor: u64,
    /// Expansion trigger.
    pub trigger: ExpansionTrigger,
}

impl AdaptiveParams {
    /// Extracts the adaptive parameters from a search method, falling back to defaults.
    pub fn from_method(method: &SearchMethod) -> Self {
        match method {
            SearchMethod::Adaptive {
                reward_cap,
                penalty_floor,
                trigger,
            } => Self {
                reward_cap: *reward_cap,
                penalty_floor: *penalty_floor,
                trigger: *trigger,
            },
            _ => Self::from_method(&SearchMethod::adaptive()),
        }
    }
}

/// Two-direction step distribution `p(+1) = plus / (plus + minus)` held in grains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StepWeights {
    plus: u64,
    minus: u64,
}

impl StepWeights {
    fn reset() -> Self {
        Self {
            plus: INITIAL_WEIGHT,
            minus: INITIAL_WEIGHT,
        }
    }

    fn total(&self) -> u64 {
        self.plus + self.minus
    }

    fn draw_up(&mut self, rng: &mut RngHandle) -> bool {
        if self.total() == 0 {
            *self = Self::reset();
        }
        match rng.draw_below(self.total()) {
            Some(draw) => draw < self.plus,
            None => true,
        }
    }

    fn reward(&mut self, up: bool, cap: u64) {
        let slot = if up { &mut self.plus } else { &mut self.minus };
        *slot = (*slot + 1).min(cap);
    }

    fn penalise(&mut self, up: bool, floor: u64) {
        let slot = if up { &mut self.plus } else { &mut self.minus };
        if *slot > floor {
            *slot -= 1;
        }
    }
}

/// Random grain steps whose direction distribution is reinforced by success.
pub fn adaptive_search(
    config: &RootConfig,
    params: AdaptiveParams,
    rng: &mut RngHandle,
) -> Result<RootOutcome, GrainsError> {
    config.validate()?;
    let n = config.target;
    let mut state = SearchState::new(
        config.initial_k,
        config.initial_m,
        grain_error(config.initial_k, config.initial_m, n)?,
    );
    let mut weights = StepWeights::reset();
    let mut failures: u64 = 0;

    while state.iterations < config.allowed_iterations {
        if state.error == 0 {
            break;
        }
        state.iterations += 1;

        let up = weights.draw_up(rng);
        let candidate = if up {
            step_up(state.k)?
        } else {
            state.k.saturating_sub(1)
        };
        let candidate_err = grain_error(candidate, state.m, n)?;

        if candidate_err < state.error {
            state.step(candidate, candidate_err);
            weights.reward(up, params.reward_cap);
            failures = 0;
            debug!(
                "adaptive iter={} step={} k={} m={} err={}",
                state.iterations,
                if up { "+1" } else { "-1" },
                state.k,
                state.m,
                state.error
            );
            continue;
        }

        failures += 1;
        weights.penalise(up, params.penalty_floor);
        let triggered = match params.trigger {
            ExpansionTrigger::Stuck { threshold } => failures >= threshold,
            ExpansionTrigger::Collapse => weights.total() < 2,
        };
        if !triggered {
            continue;
        }

        match expand(state.k, state.m, config.expansion_factor, config.max_capacity)? {
            Some((k, m)) => {
                let error = grain_error(k, m, n)?;
                state.expand(k, m, error);
                weights = StepWeights::reset();
                failures = 0;
                info!("adaptive expanded capacity to m={m}, k={k}, err={error}");
            }
            None => {
                info!(
                    "adaptive stopped at max capacity m={} with err={}",
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
    info!("adaptive finished {:?} at k={} m={}", stop, state.k, state.m);
    Ok(state.finish(stop))
}
