use std::collections::{BTreeMap, BTreeSet};

use grains_core::errors::GrainsError;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::store::{GrainKey, GrainStore};

/// Signals offered by environments and features required by patterns.
///
/// Unknown environments offer no signals and unknown patterns require no
/// features.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalCatalog {
    /// Environment name to the signals it carries.
    #[serde(default)]
    pub environments: BTreeMap<String, BTreeSet<String>>,
    /// Pattern name to the features it needs.
    #[serde(default)]
    pub patterns: BTreeMap<String, BTreeSet<String>>,
}

impl SignalCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an environment and its signals.
    pub fn with_environment<I, S>(mut self, name: impl Into<String>, signals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.environments
            .insert(name.into(), signals.into_iter().map(Into::into).collect());
        self
    }

    /// Registers a pattern and its required features.
    pub fn with_pattern<I, S>(mut self, name: impl Into<String>, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patterns
            .insert(name.into(), features.into_iter().map(Into::into).collect());
        self
    }

    /// `true` when every feature of `pattern` is a signal of `environment`.
    pub fn is_compatible(&self, pattern: &str, environment: &str) -> bool {
        let Some(features) = self.patterns.get(pattern) else {
            return true;
        };
        match self.environments.get(environment) {
            Some(signals) => features.is_subset(signals),
            None => features.is_empty(),
        }
    }

    /// Moves `observer` from `old_env` to `new_env`.
    ///
    /// Counts of compatible patterns are copied, the rest are stored as zero.
    pub fn transition(
        &self,
        store: &mut GrainStore,
        observer: &str,
        old_env: &str,
        new_env: &str,
        patterns: &[String],
        capacity: u64,
    ) -> Result<TransitionReport, GrainsError> {
        let mut report = TransitionReport::default();
        for pattern in patterns {
            let old = store.count(&GrainKey::new(observer, old_env, pattern.as_str()));
            let compatible = self.is_compatible(pattern, new_env);
            let grains = if compatible { old } else { 0 };
            store.set(GrainKey::new(observer, new_env, pattern.as_str()), grains, capacity)?;
            if !compatible {
                debug!("{observer}: pattern {pattern} incompatible with {new_env}, zeroed");
                report.zeroed.push(pattern.clone());
            }
            report.counts.push((pattern.clone(), grains));
        }
        Ok(report)
    }
}

/// Counts written by a transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionReport {
    /// Pattern counts in the new environment, in request order.
    pub counts: Vec<(String, u64)>,
    /// Patterns zeroed for lacking signals.
    pub zeroed: Vec<String>,
}
