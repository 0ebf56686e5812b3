use std::path::Path;

use grains_core::errors::{ErrorInfo, GrainsError};
use serde::{Deserialize, Serialize};

/// Parameters shared by every square-root search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootConfig {
    /// Integer `N` whose square root is approximated (numerator for the layered search).
    pub target: u64,
    /// Starting numerator.
    #[serde(default = "default_initial_k")]
    pub initial_k: u64,
    /// Starting capacity.
    #[serde(default = "default_initial_m")]
    pub initial_m: u64,
    /// Largest capacity a search may reach.
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
    /// Capacity multiplier applied on every expansion.
    #[serde(default = "default_expansion_factor")]
    pub expansion_factor: u64,
    /// Iteration budget.
    #[serde(default = "default_allowed_iterations")]
    pub allowed_iterations: u64,
    /// Search strategy.
    #[serde(default)]
    pub method: SearchMethod,
}

fn default_initial_k() -> u64 {
    14
}

fn default_initial_m() -> u64 {
    10
}

fn default_max_capacity() -> u64 {
    200_000
}

fn default_expansion_factor() -> u64 {
    10
}

fn default_allowed_iterations() -> u64 {
    1_000
}

impl RootConfig {
    /// Default configuration for `target`.
    pub fn for_target(target: u64) -> Self {
        Self {
            target,
            initial_k: default_initial_k(),
            initial_m: default_initial_m(),
            max_capacity: default_max_capacity(),
            expansion_factor: default_expansion_factor(),
            allowed_iterations: default_allowed_iterations(),
            method: SearchMethod::default(),
        }
    }

    /// Replaces the search strategy.
    pub fn with_method(mut self, method: SearchMethod) -> Self {
        self.method = method;
        self
    }

    /// Loads a configuration from a YAML file.
    pub fn from_yaml_path(path: &Path) -> Result<Self, GrainsError> {
        let data = std::fs::read(path).map_err(|err| {
            GrainsError::Serde(
                ErrorInfo::new("io", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        let config: RootConfig = grains_core::from_yaml_slice(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks capacity and iteration bounds.
    pub fn validate(&self) -> Result<(), GrainsError> {
        if self.initial_m == 0 {
            return Err(GrainsError::config("initial_m", "initial capacity must be at least 1"));
        }
        if self.expansion_factor < 2 {
            return Err(GrainsError::config(
                "expansion_factor",
                "expansion factor must be at least 2",
            ));
        }
        if self.max_capacity < self.initial_m {
            return Err(GrainsError::Config(
                ErrorInfo::new("invalid-config", "max capacity is below the initial capacity")
                    .with_context("field", "max_capacity")
                    .with_context("initial_m", self.initial_m.to_string())
                    .with_context("max_capacity", self.max_capacity.to_string()),
            ));
        }
        if self.allowed_iterations == 0 {
            return Err(GrainsError::config(
                "allowed_iterations",
                "at least one iteration is required",
            ));
        }
        self.method.validate()
    }
}

/// Supported search strategies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SearchMethod {
    /// Try both neighbours and keep the strictly better one.
    Greedy,
    /// Follow the sign of the forward difference of the error.
    Slope,
    /// Random steps drawn from a reinforced two-direction distribution.
    Adaptive {
        /// Largest weight either direction may accumulate.
        #[serde(default = "default_reward_cap")]
        reward_cap: u64,
        /// Smallest weight a penalised direction may fall to.
        #[serde(default = "default_penalty_floor")]
        penalty_floor: u64,
        /// When to give up on the current capacity.
        #[serde(default)]
        trigger: ExpansionTrigger,
    },
    /// Rational target with an explicit tolerance.
    Layered {
        /// Denominator of the target (`target / target_den`).
        #[serde(default = "default_target_den")]
        target_den: u64,
        /// Converged once the error is below `1 / tolerance_den`.
        #[serde(default = "default_tolerance_den")]
        tolerance_den: u64,
    },
}

fn default_reward_cap() -> u64 {
    100
}

fn default_penalty_floor() -> u64 {
    1
}

fn default_target_den() -> u64 {
    1
}

fn default_tolerance_den() -> u64 {
    1_000
}

impl Default for SearchMethod {
    fn default() -> Self {
        SearchMethod::Greedy
    }
}

impl SearchMethod {
    /// Adaptive search with its default weights.
    pub fn adaptive() -> Self {
        SearchMethod::Adaptive {
            reward_cap: default_reward_cap(),
            penalty_floor: default_penalty_floor(),
            trigger: ExpansionTrigger::default(),
        }
    }

    /// Layered search with the given target denominator and tolerance.
    pub fn layered(target_den: u64, tolerance_den: u64) -> Self {
        SearchMethod::Layered {
            target_den,
            tolerance_den,
        }
    }

    /// Short name used in logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            SearchMethod::Greedy => "greedy",
            SearchMethod::Slope => "slope",
            SearchMethod::Adaptive { .. } => "adaptive",
            SearchMethod::Layered { .. } => "layered",
        }
    }

    fn validate(&self) -> Result<(), GrainsError> {
        match self {
            SearchMethod::Adaptive {
                reward_cap,
                penalty_floor,
                trigger,
            } => {
                if *reward_cap < 5 {
                    return Err(GrainsError::config(
                        "reward_cap",
                        "reward cap must be at least the initial weight of 5",
                    ));
                }
                if penalty_floor > reward_cap {
                    return Err(GrainsError::config(
                        "penalty_floor",
                        "penalty floor must not exceed the reward cap",
                    ));
                }
                if let ExpansionTrigger::Stuck { threshold: 0 } = trigger {
                    return Err(GrainsError::config("threshold", "stuck threshold must be positive"));
                }
                Ok(())
            }
            SearchMethod::Layered {
                target_den,
                tolerance_den,
            } => {
                if *target_den == 0 {
                    return Err(GrainsError::config("target_den", "target denominator must be positive"));
                }
                if *tolerance_den == 0 {
                    return Err(GrainsError::config(
                        "tolerance_den",
                        "tolerance denominator must be positive",
                    ));
                }
                Ok(())
            }
            SearchMethod::Greedy | SearchMethod::Slope => Ok(()),
        }
    }
}

/// Condition that makes the adaptive search expand its capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ExpansionTrigger {
    /// A run of consecutive failed steps.
    Stuck {
        /// Failures tolerated before expanding.
        #[serde(default = "default_stuck_threshold")]
        threshold: u64,
    },
    /// The step distribution holds fewer than two grains.
    Collapse,
}

fn default_stuck_threshold() -> u64 {
    50
}

impl Default for ExpansionTrigger {
    fn default() -> Self {
        ExpansionTrigger::Stuck {
            threshold: default_stuck_threshold(),
        }
    }
}
