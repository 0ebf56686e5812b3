#![deny(missing_docs)]
#![doc = "Grain-coded probabilities: count stores, distributions, signal transitions, PageRank walks and block quadtrees."]

/// Quadtree block aggregation.
pub mod blocks;
/// Sampled distributions over stored counts.
pub mod distribution;
/// Random-walk PageRank.
pub mod pagerank;
/// End-to-end observer scenarios.
pub mod scenario;
/// Environment signals and pattern compatibility.
pub mod signals;
/// Grain count storage.
pub mod store;

pub use blocks::{
    BlockFlowConfig, BlockFlowReport, BlockNode, BlockRect, BlockTree, Boundary, SplitMergeCounts,
    StepSummary,
};
pub use distribution::GrainDistribution;
pub use pagerank::{build_transitions, pagerank, Graph, PageRankConfig, PageRankReport, Transition};
pub use scenario::{
    run_scenario, DistributionView, GrainUpdate, PatternGrains, ScenarioConfig, ScenarioReport,
};
pub use signals::{SignalCatalog, TransitionReport};
pub use store::{GrainEntry, GrainKey, GrainStore};
