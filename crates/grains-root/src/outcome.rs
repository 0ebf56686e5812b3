use grains_core::Grain;
use serde::{Deserialize, Serialize};

/// Why a search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopReason {
    /// `k² = N·M²`.
    Exact,
    /// No improvement was possible and the capacity could not grow.
    CapacityExhausted,
    /// The iteration budget ran out.
    IterationLimit,
    /// The layered search reached its tolerance.
    WithinTolerance,
}

/// One recorded search event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum TraceEvent {
    /// The numerator moved at fixed capacity.
    Step {
        /// Iteration that produced the move.
        iteration: u64,
        /// Numerator after the move.
        k: u64,
        /// Capacity.
        m: u64,
        /// Error after the move.
        error: u128,
    },
    /// The capacity grew and the numerator was rescaled.
    Expand {
        /// Iteration that triggered the expansion.
        iteration: u64,
        /// Rescaled numerator.
        k: u64,
        /// New capacity.
        m: u64,
        /// Error at the new capacity.
        error: u128,
    },
}

/// Final state of a square-root search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootOutcome {
    /// Final numerator.
    pub k: u64,
    /// Final capacity.
    pub m: u64,
    /// Integer error of `(k, m)`.
    pub error: u128,
    /// Number of capacity expansions performed.
    pub expansions: u64,
    /// Number of iterations consumed.
    pub iterations: u64,
    /// Stop reason.
    pub stop: StopReason,
    /// Ordered step and expansion events.
    pub trace: Vec<TraceEvent>,
}

impl RootOutcome {
    /// Exact value `k / m`.
    pub fn approximation(&self) -> Grain {
        Grain::from_integer(self.k)
            .checked_div(&Grain::from_integer(self.m))
            .unwrap_or_else(|_| Grain::zero())
    }
}

/// Mutable search state shared by the strategies.
#[derive(Debug, Clone)]
pub(crate) struct SearchState {
    pub k: u64,
    pub m: u64,
    pub error: u128,
    pub expansions: u64,
    pub iterations: u64,
    pub trace: Vec<TraceEvent>,
}

impl SearchState {
    pub fn new(k: u64, m: u64, error: u128) -> Self {
        Self {
            k,
            m,
            error,
            expansions: 0,
            iterations: 0,
            trace: Vec::new(),
        }
    }

    pub fn step(&mut self, k: u64, error: u128) {
        self.k = k;
        self.error = error;
        self.trace.push(TraceEvent::Step {
            iteration: self.iterations,
            k,
            m: self.m,
            error,
        });
    }

    pub fn expand(&mut self, k: u64, m: u64, error: u128) {
        self.k = k;
        self.m = m;
        self.error = error;
        self.expansions += 1;
        self.trace.push(TraceEvent::Expand {
            iteration: self.iterations,
            k,
            m,
            error,
        });
    }

    pub fn finish(self, stop: StopReason) -> RootOutcome {
        RootOutcome {
            k: self.k,
            m: self.m,
            error: self.error,
            expansions: self.expansions,
            iterations: self.iterations,
            stop,
            trace: self.trace,
        }
    }
}
