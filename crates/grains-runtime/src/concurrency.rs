//! Batch execution whose parallelism grows in whole-number steps under load.

use grains_core::errors::{ErrorInfo, GrainsError};
use grains_core::{Grain, RngHandle};
use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Settings of a [`ConcurrencyManager`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcurrencyConfig {
    /// Tasks run side by side at the start.
    #[serde(default = "default_initial")]
    pub initial_concurrency: usize,
    /// Largest factor a single refinement may apply.
    #[serde(default = "default_max_refine_factor")]
    pub max_refine_factor: u64,
    /// Load fraction above which the concurrency is refined.
    #[serde(default = "default_refine_threshold")]
    pub refine_threshold: Grain,
    /// Grains in a full load.
    #[serde(default = "default_grains_n")]
    pub grains_n: u64,
    /// Hard ceiling on the concurrency.
    #[serde(default)]
    pub max_concurrency: Option<usize>,
    /// Worker threads per batch pool; the machine's available parallelism when unset.
    #[serde(default)]
    pub max_threads: Option<usize>,
}

fn default_initial() -> usize {
    3
}

fn default_max_refine_factor() -> u64 {
    5
}

fn default_refine_threshold() -> Grain {
    Grain::ratio(3, 5)
}

fn default_grains_n() -> u64 {
    20
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            initial_concurrency: default_initial(),
            max_refine_factor: default_max_refine_factor(),
            refine_threshold: default_refine_threshold(),
            grains_n: default_grains_n(),
            max_concurrency: None,
            max_threads: None,
        }
    }
}

impl ConcurrencyConfig {
    /// Checks that every bound is usable.
    pub fn validate(&self) -> Result<(), GrainsError> {
        if self.initial_concurrency == 0 {
            return Err(GrainsError::config(
                "initial_concurrency",
                "at least one task must run at a time",
            ));
        }
        if self.max_refine_factor < 2 {
            return Err(GrainsError::config(
                "max_refine_factor",
                "refine factor must be at least 2",
            ));
        }
        if self.refine_threshold.is_zero()
            || self.refine_threshold.is_negative()
            || self.refine_threshold > Grain::one()
        {
            return Err(GrainsError::config(
                "refine_threshold",
                "threshold must lie in (0, 1]",
            ));
        }
        if self.grains_n == 0 {
            return Err(GrainsError::config("grains_n", "load needs a positive grain count"));
        }
        if let Some(max) = self.max_concurrency {
            if max < self.initial_concurrency {
                return Err(GrainsError::config(
                    "max_concurrency",
                    "ceiling is below the initial concurrency",
                ));
            }
        }
        if self.max_threads == Some(0) {
            return Err(GrainsError::config("max_threads", "a pool needs at least one thread"));
        }
        Ok(())
    }
}

fn available_threads() -> usize {
    std::thread::available_parallelism().map_or(1, |threads| threads.get())
}

/// One change of concurrency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refinement {
    /// Concurrency before.
    pub from: usize,
    /// Concurrency after.
    pub to: usize,
    /// Factor chosen.
    pub factor: u64,
}

/// What happened around one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRecord {
    /// Batch number, starting at zero.
    pub index: usize,
    /// Position of the first task of the batch.
    pub start: usize,
    /// Tasks in the batch.
    pub len: usize,
    /// Concurrency the batch ran with.
    pub concurrency: usize,
    /// Worker threads in the batch pool.
    pub threads: usize,
    /// Load sampled after the batch.
    pub load: Grain,
    /// Load stored as grains out of `grains_n`.
    pub grains_load: u64,
    /// Refinement triggered by the load, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refinement: Option<Refinement>,
}

/// Outcome of [`ConcurrencyManager::run_batches`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcurrencyReport<R> {
    /// Per-batch records.
    pub batches: Vec<BatchRecord>,
    /// Refinements in order.
    pub refinements: Vec<Refinement>,
    /// Concurrency after the last batch.
    pub final_concurrency: usize,
    /// Task results in task order.
    pub results: Vec<R>,
}

/// Tracks load as grains out of `grains_n` and refines the concurrency by
/// integer factors when the load crosses the threshold.
#[derive(Debug, Clone)]
pub struct ConcurrencyManager {
    concurrency: usize,
    max_refine_factor: u64,
    refine_threshold: Grain,
    grains_n: u64,
    grains_load: u64,
    max_concurrency: Option<usize>,
    max_threads: usize,
}

impl ConcurrencyManager {
    /// Creates a manager with zero load.
    pub fn new(config: &ConcurrencyConfig) -> Result<Self, GrainsError> {
        config.validate()?;
        Ok(Self {
            concurrency: config.initial_concurrency,
            max_refine_factor: config.max_refine_factor,
            refine_threshold: config.refine_threshold.clone(),
            grains_n: config.grains_n,
            grains_load: 0,
            max_concurrency: config.max_concurrency,
            max_threads: config.max_threads.unwrap_or_else(available_threads),
        })
    }

    /// Current concurrency.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Current load in grains.
    pub fn grains_load(&self) -> u64 {
        self.grains_load
    }

    /// Current load as `grains_load / grains_n`.
    pub fn load_fraction(&self) -> Grain {
        Grain::from_integer(self.grains_load)
            .checked_div(&Grain::from_integer(self.grains_n))
            .unwrap_or_else(|_| Grain::zero())
    }

    /// Stores `round(fraction · grains_n)` clamped to `[0, grains_n]`.
    pub fn adjust_load(&mut self, fraction: &Grain) -> u64 {
        let scaled = fraction * Grain::from_integer(self.grains_n);
        self.grains_load = if scaled.is_negative() {
            0
        } else {
            u64::try_from(scaled.round_integer())
                .map_or(self.grains_n, |value| value.min(self.grains_n))
        };
        self.grains_load
    }

    /// Multiplies the concurrency when the load fraction exceeds the threshold.
    ///
    /// The factor is `⌈load / threshold⌉` clamped to `[2, max_refine_factor]`,
    /// and the result never passes `max_concurrency`.
    pub fn maybe_refine(&mut self) -> Result<Option<Refinement>, GrainsError> {
        let load = self.load_fraction();
        if load <= self.refine_threshold {
            return Ok(None);
        }
        let guess = load.checked_div(&self.refine_threshold)?.ceil_integer();
        let factor = u64::try_from(guess)
            .unwrap_or(self.max_refine_factor)
            .clamp(2, self.max_refine_factor);
        let mut target = usize::try_from(factor)
            .ok()
            .and_then(|f| self.concurrency.checked_mul(f))
            .ok_or_else(|| GrainsError::overflow("maybe_refine"))?;
        if let Some(max) = self.max_concurrency {
            target = target.min(max);
        }
        if target <= self.concurrency {
            debug!("concurrency already at ceiling {}", self.concurrency);
            return Ok(None);
        }
        let refinement = Refinement {
            from: self.concurrency,
            to: target,
            factor,
        };
        info!(
            "concurrency refined {} -> {} (factor {factor})",
            refinement.from, refinement.to
        );
        self.concurrency = target;
        Ok(Some(refinement))
    }

    /// Runs `tasks` in batches of the current concurrency.
    ///
    /// Each batch runs on a rayon pool with one thread per task, capped at
    /// the manager's thread limit. After a
    /// batch the load is sampled from `load_source` and the concurrency may
    /// be refined before the next batch is cut.
    pub fn run_batches<T, R, L, W>(
        &mut self,
        tasks: Vec<T>,
        mut load_source: L,
        work: W,
    ) -> Result<ConcurrencyReport<R>, GrainsError>
    where
        T: Send,
        R: Send,
        L: FnMut(&BatchRecord) -> Grain,
        W: Fn(T) -> R + Send + Sync,
    {
        let total = tasks.len();
        let mut remaining = tasks.into_iter();
        let mut results = Vec::with_capacity(total);
        let mut batches = Vec::new();
        let mut refinements = Vec::new();
        let mut start = 0;
        while start < total {
            let batch: Vec<T> = remaining.by_ref().take(self.concurrency).collect();
            let len = batch.len();
            let threads = len.min(self.max_threads).max(1);
            debug!(
                "batch {} tasks {start}..{} at concurrency {}",
                batches.len(),
                start + len,
                self.concurrency
            );
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|err| {
                    GrainsError::Capacity(ErrorInfo::new("thread-pool", err.to_string()))
                })?;
            let outputs: Vec<R> = pool.install(|| batch.into_par_iter().map(&work).collect());
            results.extend(outputs);

            let mut record = BatchRecord {
                index: batches.len(),
                start,
                len,
                concurrency: self.concurrency,
                threads,
                load: Grain::zero(),
                grains_load: 0,
                refinement: None,
            };
            record.load = load_source(&record);
            record.grains_load = self.adjust_load(&record.load);
            record.refinement = self.maybe_refine()?;
            refinements.extend(record.refinement);
            batches.push(record);
            start += len;
        }
        info!(
            "{total} tasks in {} batches, {} refinements",
            batches.len(),
            refinements.len()
        );
        Ok(ConcurrencyReport {
            batches,
            refinements,
            final_concurrency: self.concurrency,
            results,
        })
    }
}

/// Simulated load uniform over `[3/10, 4/5]` in steps of `1/1000`.
pub fn random_load(rng: &mut RngHandle) -> Grain {
    let offset = rng.draw_below(501).unwrap_or(0);
    Grain::ratio(300 + offset as i64, 1_000)
}
