use std::error::Error;
use std::path::Path;

use clap::Args;
use grains_core::{Grain, RngHandle};
use grains_root::{search, RootConfig};
use grains_runtime::{random_load, ConcurrencyConfig, ConcurrencyManager, ConcurrencyReport};
use serde::Serialize;

use super::boxed;
use crate::write_report;

const LOAD_SUBSTREAM: u64 = 0x6c6f_6164;

#[derive(Args, Debug)]
pub struct ConcurrencyArgs {
    /// Number of square-root tasks, targets 2, 3, ...
    #[arg(long, default_value_t = 25)]
    pub tasks: u64,
    /// Starting concurrency.
    #[arg(long, default_value_t = 3)]
    pub initial: usize,
    /// Largest factor a single refinement may apply.
    #[arg(long, default_value_t = 5)]
    pub max_factor: u64,
    /// Load fraction that triggers refinement.
    #[arg(long, default_value = "3/5")]
    pub threshold: Grain,
    /// Grains used to represent the load.
    #[arg(long, default_value_t = 20)]
    pub grains_n: u64,
    /// Hard ceiling on concurrency.
    #[arg(long)]
    pub max_concurrency: Option<usize>,
    /// Worker threads per batch pool; defaults to the available parallelism.
    #[arg(long)]
    pub max_threads: Option<usize>,
    /// Seed for the simulated load.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

#[derive(Debug, Serialize)]
struct TaskResult {
    target: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    approximation: Option<Grain>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct ConcurrencyInput<'a> {
    tasks: u64,
    config: &'a ConcurrencyConfig,
}

fn sqrt_task(target: u64) -> TaskResult {
    match search(&RootConfig::for_target(target), 0) {
        Ok(outcome) => TaskResult {
            target,
            approximation: Some(outcome.approximation()),
            error: None,
        },
        Err(err) => TaskResult {
            target,
            approximation: None,
            error: Some(err.to_string()),
        },
    }
}

pub fn run(args: &ConcurrencyArgs, out: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let config = ConcurrencyConfig {
        initial_concurrency: args.initial,
        max_refine_factor: args.max_factor,
        refine_threshold: args.threshold.clone(),
        grains_n: args.grains_n,
        max_concurrency: args.max_concurrency,
        max_threads: args.max_threads,
    };
    let mut manager = ConcurrencyManager::new(&config).map_err(boxed)?;
    let mut rng = RngHandle::substream(args.seed, LOAD_SUBSTREAM);
    let tasks: Vec<u64> = (2..args.tasks.saturating_add(2)).collect();
    let report: ConcurrencyReport<TaskResult> = manager
        .run_batches(tasks, |_| random_load(&mut rng), sqrt_task)
        .map_err(boxed)?;
    let input = ConcurrencyInput {
        tasks: args.tasks,
        config: &config,
    };
    write_report("concurrency", &input, args.seed, &report, out)
}
