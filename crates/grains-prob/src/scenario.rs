//! Observer scenarios: seed a distribution, sample it, apply updates and
//! optionally move the observer to another environment.

use grains_core::errors::GrainsError;
use grains_core::{Grain, RngHandle};
use log::info;
use serde::{Deserialize, Serialize};

use crate::distribution::GrainDistribution;
use crate::signals::{SignalCatalog, TransitionReport};
use crate::store::{GrainEntry, GrainKey, GrainStore};

/// Initial grains of one pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternGrains {
    /// Pattern name.
    pub pattern: String,
    /// Grains assigned.
    pub grains: u64,
}

/// Signed change applied to one pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrainUpdate {
    /// Pattern name.
    pub pattern: String,
    /// Change in grains, clamped into `[0, capacity]`.
    pub delta: i64,
}

/// Scenario description, usually read from YAML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Observer name.
    #[serde(default = "default_observer")]
    pub observer: String,
    /// Starting environment.
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Capacity shared by all patterns.
    #[serde(default = "default_capacity")]
    pub capacity: u64,
    /// Initial pattern grains, in sampling order.
    #[serde(default = "default_patterns")]
    pub patterns: Vec<PatternGrains>,
    /// Samples drawn before and after the updates.
    #[serde(default = "default_draws")]
    pub draws: u32,
    /// Updates applied after the first round of draws.
    #[serde(default = "default_updates")]
    pub updates: Vec<GrainUpdate>,
    /// Environment to move to after the updates.
    #[serde(default)]
    pub transition: Option<String>,
    /// Signals used by the transition.
    #[serde(default)]
    pub signals: SignalCatalog,
}

fn default_observer() -> String {
    "obs1".to_string()
}

fn default_environment() -> String {
    "env1".to_string()
}

fn default_capacity() -> u64 {
    40
}

fn default_patterns() -> Vec<PatternGrains> {
    [("A", 5), ("B", 15), ("C", 5)]
        .into_iter()
        .map(|(pattern, grains)| PatternGrains {
            pattern: pattern.to_string(),
            grains,
        })
        .collect()
}

fn default_draws() -> u32 {
    5
}

fn default_updates() -> Vec<GrainUpdate> {
    vec![
        GrainUpdate {
            pattern: "B".to_string(),
            delta: 5,
        },
        GrainUpdate {
            pattern: "C".to_string(),
            delta: -3,
        },
    ]
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            observer: default_observer(),
            environment: default_environment(),
            capacity: default_capacity(),
            patterns: default_patterns(),
            draws: default_draws(),
            updates: default_updates(),
            transition: None,
            signals: SignalCatalog::default(),
        }
    }
}

/// Distribution snapshot inside a scenario report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionView {
    /// Environment of the distribution.
    pub environment: String,
    /// Total grains.
    pub total: u64,
    /// Exact probability per pattern.
    pub probabilities: Vec<(String, Grain)>,
    /// Patterns drawn.
    pub samples: Vec<String>,
}

/// Result of [`run_scenario`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Distribution before the updates.
    pub initial: DistributionView,
    /// Distribution after the updates.
    pub updated: DistributionView,
    /// Transition outcome, when one was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<TransitionReport>,
    /// Distribution in the new environment, when a transition was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moved: Option<DistributionView>,
    /// Store contents at the end.
    pub store: Vec<GrainEntry>,
}

fn view(
    distribution: &GrainDistribution,
    draws: u32,
    rng: &mut RngHandle,
) -> Result<DistributionView, GrainsError> {
    let samples = (0..draws)
        .filter_map(|_| distribution.sample(rng).map(str::to_string))
        .collect();
    Ok(DistributionView {
        environment: distribution.environment().to_string(),
        total: distribution.total(),
        probabilities: distribution.probabilities()?,
        samples,
    })
}

/// Runs the scenario against a fresh store.
pub fn run_scenario(
    config: &ScenarioConfig,
    rng: &mut RngHandle,
) -> Result<ScenarioReport, GrainsError> {
    if config.capacity == 0 {
        return Err(GrainsError::config("capacity", "capacity must be positive"));
    }
    let mut store = GrainStore::new();
    let entries: Vec<(String, u64)> = config
        .patterns
        .iter()
        .map(|entry| (entry.pattern.clone(), entry.grains))
        .collect();
    let patterns: Vec<String> = entries.iter().map(|(pattern, _)| pattern.clone()).collect();
    let distribution = GrainDistribution::new(
        &mut store,
        &config.observer,
        &config.environment,
        config.capacity,
        &entries,
    )?;
    let initial = view(&distribution, config.draws, rng)?;

    for update in &config.updates {
        let key = GrainKey::new(
            config.observer.as_str(),
            config.environment.as_str(),
            update.pattern.as_str(),
        );
        let grains = store.update(key, update.delta, config.capacity);
        info!("{}: {} -> {grains} grains", config.observer, update.pattern);
    }
    let distribution = GrainDistribution::from_store(
        &store,
        &config.observer,
        &config.environment,
        config.capacity,
        &patterns,
    )?;
    let updated = view(&distribution, config.draws, rng)?;

    let (transition, moved) = match &config.transition {
        Some(target) => {
            let report = config.signals.transition(
                &mut store,
                &config.observer,
                &config.environment,
                target,
                &patterns,
                config.capacity,
            )?;
            let distribution = GrainDistribution::from_store(
                &store,
                &config.observer,
                target,
                config.capacity,
                &patterns,
            )?;
            (Some(report), Some(view(&distribution, config.draws, rng)?))
        }
        None => (None, None),
    };

    Ok(ScenarioReport {
        initial,
        updated,
        transition,
        moved,
        store: store.entries(),
    })
}
