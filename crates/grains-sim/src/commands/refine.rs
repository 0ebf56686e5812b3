use std::error::Error;
use std::path::Path;

use clap::Args;
use grains_runtime::{RefineSchedule, SystemMemoryProbe};

use super::boxed;
use crate::write_report;

#[derive(Args, Debug)]
pub struct RefineArgs {
    /// Starting capacity.
    #[arg(long, default_value_t = 50)]
    pub initial: u64,
    /// Factor applied each round.
    #[arg(long, default_value_t = 2)]
    pub factor: u64,
    /// Capacity that may not be exceeded.
    #[arg(long, default_value_t = 1_000)]
    pub max: u64,
    /// Rounds attempted.
    #[arg(long, default_value_t = 5)]
    pub rounds: u32,
    /// Memory usage percentage that triggers a warning.
    #[arg(long, default_value_t = 80.0)]
    pub warn_percent: f64,
}

pub fn run(args: &RefineArgs, out: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let schedule = RefineSchedule {
        initial_capacity: args.initial,
        factor: args.factor,
        max_capacity: args.max,
        rounds: args.rounds,
        warn_percent: args.warn_percent,
    };
    let mut probe = SystemMemoryProbe::new();
    let outcomes = schedule.run(&mut probe).map_err(boxed)?;
    write_report("refine", &schedule, 0, &outcomes, out)
}
