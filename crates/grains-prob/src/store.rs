use std::collections::BTreeMap;

use grains_core::errors::{ErrorInfo, GrainsError};
use grains_core::Grain;
use serde::{Deserialize, Serialize};

/// Address of a grain count.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GrainKey {
    /// Observer owning the count.
    pub observer: String,
    /// Environment the observer sits in.
    pub environment: String,
    /// Pattern being counted.
    pub pattern: String,
}

impl GrainKey {
    /// Builds a key from its three parts.
    pub fn new(
        observer: impl Into<String>,
        environment: impl Into<String>,
        pattern: impl Into<String>,
    ) -> Self {
        Self {
            observer: observer.into(),
            environment: environment.into(),
            pattern: pattern.into(),
        }
    }
}

/// Stored count with its key, used for listings and serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrainEntry {
    /// Address of the count.
    #[serde(flatten)]
    pub key: GrainKey,
    /// Number of grains.
    pub grains: u64,
}

/// Grain counts per `(observer, environment, pattern)`.
///
/// Missing keys read as zero grains.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrainStore {
    counts: BTreeMap<GrainKey, u64>,
}

fn over_capacity(key: &GrainKey, grains: u64, capacity: u64) -> GrainsError {
    GrainsError::Probability(
        ErrorInfo::new("over-capacity", "grain count exceeds the capacity")
            .with_context("observer", key.observer.clone())
            .with_context("environment", key.environment.clone())
            .with_context("pattern", key.pattern.clone())
            .with_context("grains", grains.to_string())
            .with_context("capacity", capacity.to_string()),
    )
}

impl GrainStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `grains` under `key`, rejecting counts above `capacity`.
    pub fn set(&mut self, key: GrainKey, grains: u64, capacity: u64) -> Result<(), GrainsError> {
        if grains > capacity {
            return Err(over_capacity(&key, grains, capacity));
        }
        self.counts.insert(key, grains);
        Ok(())
    }

    /// Grains stored under `key`, zero when absent.
    pub fn count(&self, key: &GrainKey) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Exact probability `count / capacity`.
    pub fn probability(&self, key: &GrainKey, capacity: u64) -> Result<Grain, GrainsError> {
        if capacity == 0 {
            return Err(GrainsError::Arithmetic(
                ErrorInfo::new("zero-capacity", "probability needs a positive capacity")
                    .with_context("pattern", key.pattern.clone()),
            ));
        }
        Grain::new(self.count(key), capacity)
    }

    /// Shifts the count by `delta`, clamping to `[0, capacity]`, and returns the new count.
    pub fn update(&mut self, key: GrainKey, delta: i64, capacity: u64) -> u64 {
        let shifted = i128::from(self.count(&key)) + i128::from(delta);
        let clamped = shifted.clamp(0, i128::from(capacity));
        let grains = u64::try_from(clamped).unwrap_or(capacity);
        self.counts.insert(key, grains);
        grains
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Returns `true` when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// All entries in key order.
    pub fn entries(&self) -> Vec<GrainEntry> {
        self.counts
            .iter()
            .map(|(key, grains)| GrainEntry {
                key: key.clone(),
                grains: *grains,
            })
            .collect()
    }
}
