#![deny(missing_docs)]
#![doc = "Finite square-root searches over integer grain pairs `k / M`."]

/// Random-step search with a reinforced direction distribution.
pub mod adaptive;
/// Search configuration.
pub mod config;
/// Neighbour-comparison search.
pub mod greedy;
/// Rational-target search with explicit tolerance.
pub mod layered;
/// Integer error metrics and capacity expansion.
pub mod metric;
/// Search results and traces.
pub mod outcome;
/// Forward-difference search.
pub mod slope;

use grains_core::errors::GrainsError;
use grains_core::rng::RngHandle;

pub use adaptive::{adaptive_search, AdaptiveParams};
pub use config::{ExpansionTrigger, RootConfig, SearchMethod};
pub use greedy::greedy_search;
pub use layered::layered_search;
pub use metric::{grain_error, rational_error};
pub use outcome::{RootOutcome, StopReason, TraceEvent};
pub use slope::slope_search;

/// Substream reserved for the adaptive search.
pub const ADAPTIVE_SUBSTREAM: u64 = 0x5157;

/// Runs the configured search. `seed` only affects the adaptive method.
pub fn search(config: &RootConfig, seed: u64) -> Result<RootOutcome, GrainsError> {
    match &config.method {
        SearchMethod::Greedy => greedy_search(config),
        SearchMethod::Slope => slope_search(config),
        method @ SearchMethod::Adaptive { .. } => {
            let mut rng = RngHandle::substream(seed, ADAPTIVE_SUBSTREAM);
            adaptive_search(config, AdaptiveParams::from_method(method), &mut rng)
        }
        SearchMethod::Layered {
            target_den,
            tolerance_den,
        } => layered_search(config, *target_den, *tolerance_den),
    }
}
