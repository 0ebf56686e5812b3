#![deny(missing_docs)]
#![doc = "Capacity-aware execution: batch concurrency refined in integer steps and memory-guarded capacity growth."]

/// Load-driven concurrency refinement.
pub mod concurrency;
/// Memory probes and guarded capacity refinement.
pub mod memory;

pub use concurrency::{
    random_load, BatchRecord, ConcurrencyConfig, ConcurrencyManager, ConcurrencyReport, Refinement,
};
pub use memory::{refine_with_probe, MemoryProbe, RefineOutcome, RefineSchedule, SystemMemoryProbe};
