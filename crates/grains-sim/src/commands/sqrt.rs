use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use grains_core::Grain;
use grains_root::{search, RootConfig, RootOutcome, SearchMethod};
use serde::Serialize;

use super::boxed;
use crate::{load_input, write_report};

#[derive(Args, Debug)]
pub struct SqrtArgs {
    /// YAML search configuration.
    #[arg(long, conflicts_with = "target")]
    pub config: Option<PathBuf>,
    /// Integer whose square root is approximated.
    #[arg(long, required_unless_present = "config")]
    pub target: Option<u64>,
    /// Search strategy overriding the configuration.
    #[arg(long, value_enum)]
    pub method: Option<MethodArg>,
    /// Seed for the adaptive search.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum MethodArg {
    Greedy,
    Slope,
    Adaptive,
    Layered,
}

impl MethodArg {
    fn method(self) -> SearchMethod {
        match self {
            MethodArg::Greedy => SearchMethod::Greedy,
            MethodArg::Slope => SearchMethod::Slope,
            MethodArg::Adaptive => SearchMethod::adaptive(),
            MethodArg::Layered => SearchMethod::layered(1, 1_000),
        }
    }
}

#[derive(Debug, Serialize)]
struct SqrtReport<'a> {
    method: &'static str,
    approximation: Grain,
    decimal: f64,
    outcome: &'a RootOutcome,
}

pub fn run(args: &SqrtArgs, out: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let mut config = match (&args.config, args.target) {
        (Some(path), _) => load_input::<RootConfig>(path).map_err(boxed)?,
        (None, Some(target)) => RootConfig::for_target(target),
        (None, None) => return Err("either --config or --target is required".into()),
    };
    if let Some(method) = args.method {
        config = config.with_method(method.method());
    }
    config.validate().map_err(boxed)?;
    let outcome = search(&config, args.seed).map_err(boxed)?;
    let approximation = outcome.approximation();
    let report = SqrtReport {
        method: config.method.name(),
        decimal: approximation.to_f64(),
        approximation,
        outcome: &outcome,
    };
    write_report("sqrt", &config, args.seed, &report, out)
}
