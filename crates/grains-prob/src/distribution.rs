use grains_core::errors::{ErrorInfo, GrainsError};
use grains_core::{Grain, RngHandle};
use serde::{Deserialize, Serialize};

use crate::store::{GrainKey, GrainStore};

/// Discrete distribution over patterns for one observer in one environment.
///
/// Counts are cumulated into partial sums so that a uniform draw in
/// `[0, total)` lands on the first pattern whose partial sum exceeds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrainDistribution {
    observer: String,
    environment: String,
    capacity: u64,
    patterns: Vec<String>,
    grains: Vec<u64>,
    partial_sums: Vec<u64>,
}

impl GrainDistribution {
    /// Builds the distribution over `entries` and writes them into `store`.
    ///
    /// Nothing is written when the entries are rejected.
    pub fn new(
        store: &mut GrainStore,
        observer: &str,
        environment: &str,
        capacity: u64,
        entries: &[(String, u64)],
    ) -> Result<Self, GrainsError> {
        let distribution = Self::build(observer, environment, capacity, entries.to_vec())?;
        // every count is at most the validated total, so no write can fail
        for (pattern, grains) in entries {
            store.set(GrainKey::new(observer, environment, pattern.as_str()), *grains, capacity)?;
        }
        Ok(distribution)
    }

    /// Rebuilds the distribution for `patterns` from the counts currently in `store`.
    pub fn from_store(
        store: &GrainStore,
        observer: &str,
        environment: &str,
        capacity: u64,
        patterns: &[String],
    ) -> Result<Self, GrainsError> {
        let entries = patterns
            .iter()
            .map(|pattern| {
                let key = GrainKey::new(observer, environment, pattern.as_str());
                (pattern.clone(), store.count(&key))
            })
            .collect();
        Self::build(observer, environment, capacity, entries)
    }

    fn build(
        observer: &str,
        environment: &str,
        capacity: u64,
        entries: Vec<(String, u64)>,
    ) -> Result<Self, GrainsError> {
        let mut patterns = Vec::with_capacity(entries.len());
        let mut grains = Vec::with_capacity(entries.len());
        let mut partial_sums = Vec::with_capacity(entries.len());
        let mut running = 0u64;
        for (pattern, count) in entries {
            if patterns.contains(&pattern) {
                return Err(GrainsError::Probability(
                    ErrorInfo::new("duplicate-pattern", "pattern listed twice in a distribution")
                        .with_context("pattern", pattern),
                ));
            }
            running = running
                .checked_add(count)
                .ok_or_else(|| GrainsError::overflow("distribution_total"))?;
            patterns.push(pattern);
            grains.push(count);
            partial_sums.push(running);
        }
        if running > capacity {
            return Err(GrainsError::Probability(
                ErrorInfo::new("over-capacity", "distribution total exceeds the capacity")
                    .with_context("observer", observer)
                    .with_context("environment", environment)
                    .with_context("total", running.to_string())
                    .with_context("capacity", capacity.to_string()),
            ));
        }
        Ok(Self {
            observer: observer.to_string(),
            environment: environment.to_string(),
            capacity,
            patterns,
            grains,
            partial_sums,
        })
    }

    /// Observer the distribution belongs to.
    pub fn observer(&self) -> &str {
        &self.observer
    }

    /// Environment the distribution belongs to.
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Capacity shared by every pattern.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Patterns in insertion order.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Grain counts aligned with [`Self::patterns`].
    pub fn grains(&self) -> &[u64] {
        &self.grains
    }

    /// Cumulative counts aligned with [`Self::patterns`].
    pub fn partial_sums(&self) -> &[u64] {
        &self.partial_sums
    }

    /// Total number of grains.
    pub fn total(&self) -> u64 {
        self.partial_sums.last().copied().unwrap_or(0)
    }

    /// Draws a pattern with probability proportional to its grains.
    ///
    /// Returns `None` when the distribution holds no grains.
    pub fn sample(&self, rng: &mut RngHandle) -> Option<&str> {
        let draw = rng.draw_below(self.total())?;
        let index = self.partial_sums.partition_point(|sum| *sum <= draw);
        self.patterns.get(index).map(String::as_str)
    }

    /// Exact `grains / capacity` per pattern.
    pub fn probabilities(&self) -> Result<Vec<(String, Grain)>, GrainsError> {
        if self.capacity == 0 {
            return Err(GrainsError::Arithmetic(
                ErrorInfo::new("zero-capacity", "probability needs a positive capacity")
                    .with_context("environment", self.environment.clone()),
            ));
        }
        self.patterns
            .iter()
            .zip(&self.grains)
            .map(|(pattern, grains)| Ok((pattern.clone(), Grain::new(*grains, self.capacity)?)))
            .collect()
    }
}
