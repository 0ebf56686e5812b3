use std::error::Error;
use std::path::{Path, PathBuf};

use clap::Args;
use grains_core::RngHandle;
use grains_prob::{pagerank, Graph, PageRankConfig};
use serde::Serialize;

use super::boxed;
use crate::{load_input, write_report};

const PAGERANK_SUBSTREAM: u64 = 0x7072;

#[derive(Args, Debug)]
pub struct PagerankArgs {
    /// JSON or YAML map from node to outlinks.
    #[arg(long)]
    pub graph: PathBuf,
    /// Walk steps.
    #[arg(long)]
    pub steps: Option<u64>,
    /// Grains spread over each node's outlinks.
    #[arg(long)]
    pub capacity: Option<u64>,
    /// Grains out of 100 that follow an outlink.
    #[arg(long)]
    pub damping: Option<u64>,
    /// Walk seed.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

#[derive(Serialize)]
struct PagerankInput<'a> {
    graph: &'a Graph,
    config: &'a PageRankConfig,
}

pub fn run(args: &PagerankArgs, out: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let graph: Graph = load_input(&args.graph).map_err(boxed)?;
    let mut config = PageRankConfig::default();
    if let Some(steps) = args.steps {
        config.steps = steps;
    }
    if let Some(capacity) = args.capacity {
        config.capacity = capacity;
    }
    if let Some(damping) = args.damping {
        config.damping_grains = damping;
        config.damping_total = 100;
    }
    let mut rng = RngHandle::substream(args.seed, PAGERANK_SUBSTREAM);
    let report = pagerank(&graph, &config, &mut rng).map_err(boxed)?;
    let input = PagerankInput {
        graph: &graph,
        config: &config,
    };
    write_report("pagerank", &input, args.seed, &report, out)
}
