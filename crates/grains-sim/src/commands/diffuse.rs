use std::error::Error;
use std::path::{Path, PathBuf};

use clap::Args;
use grains_calc::{run_diffusion, DiffusionConfig};
use log::info;

use super::boxed;
use crate::{load_input, write_report};

#[derive(Args, Debug)]
pub struct DiffuseArgs {
    /// YAML configuration tagged `exact`, `lumped` or `fixed`.
    #[arg(long)]
    pub config: PathBuf,
}

pub fn run(args: &DiffuseArgs, out: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let config: DiffusionConfig = load_input(&args.config).map_err(boxed)?;
    let report = run_diffusion(&config).map_err(boxed)?;
    info!("diffusion finished for {}", args.config.display());
    write_report("diffuse", &config, 0, &report, out)
}
