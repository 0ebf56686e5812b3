use std::error::Error;
use std::path::{Path, PathBuf};

use clap::Args;
use grains_docs::{check_bundle, BundleStatus, DocsLayout};

use super::boxed;
use crate::write_report;

#[derive(Args, Debug)]
pub struct DocsCheckArgs {
    /// Root of the documentation bundle.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,
    /// YAML layout overriding the defaults.
    #[arg(long)]
    pub layout: Option<PathBuf>,
}

pub fn run(args: &DocsCheckArgs, out: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let layout = match &args.layout {
        Some(path) => DocsLayout::from_yaml_path(path).map_err(boxed)?,
        None => DocsLayout::default(),
    };
    let report = check_bundle(&args.root, &layout).map_err(boxed)?;
    write_report("docs-check", &layout, 0, &report, out)?;
    if report.status == BundleStatus::NeedsAttention {
        return Err("documentation bundle needs attention".into());
    }
    Ok(())
}
