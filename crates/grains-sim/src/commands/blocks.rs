use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use grains_prob::{BlockFlowConfig, BlockTree};
use log::info;

use super::boxed;
use crate::{load_input, write_report};

#[derive(Args, Debug)]
pub struct BlocksArgs {
    /// YAML block flow configuration; defaults apply when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Write the final tree here as a bincode snapshot.
    #[arg(long)]
    pub snapshot: Option<PathBuf>,
}

pub fn run(args: &BlocksArgs, out: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let config = match &args.config {
        Some(path) => load_input::<BlockFlowConfig>(path).map_err(boxed)?,
        None => BlockFlowConfig::default(),
    };
    let report = BlockTree::run(&config).map_err(boxed)?;
    if let Some(path) = &args.snapshot {
        let bytes = report.tree.to_bytes().map_err(boxed)?;
        fs::write(path, &bytes)?;
        info!("snapshot of {} bytes written to {}", bytes.len(), path.display());
    }
    write_report("blocks", &config, 0, &report, out)
}
