use std::error::Error;
use std::path::{Path, PathBuf};

use clap::Args;
use grains_core::RngHandle;
use grains_prob::{run_scenario, ScenarioConfig};

use super::boxed;
use crate::{load_input, write_report};

const SCENARIO_SUBSTREAM: u64 = 0x7072_6f62;

#[derive(Args, Debug)]
pub struct ProbabilityArgs {
    /// YAML scenario; the built-in scenario runs when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Samples drawn per distribution.
    #[arg(long)]
    pub draws: Option<u32>,
    /// Sampling seed.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

pub fn run(args: &ProbabilityArgs, out: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => load_input::<ScenarioConfig>(path).map_err(boxed)?,
        None => ScenarioConfig::default(),
    };
    if let Some(draws) = args.draws {
        config.draws = draws;
    }
    let mut rng = RngHandle::substream(args.seed, SCENARIO_SUBSTREAM);
    let report = run_scenario(&config, &mut rng).map_err(boxed)?;
    write_report("probability", &config, args.seed, &report, out)
}
