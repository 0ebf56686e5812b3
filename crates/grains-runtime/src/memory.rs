//! Capacity refinement that watches system memory.

use std::time::Instant;

use grains_core::errors::{ErrorInfo, GrainsError};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use sysinfo::System;

/// Source of memory pressure readings.
pub trait MemoryProbe {
    /// Used memory as a percentage of the total.
    fn used_percent(&mut self) -> Result<f64, GrainsError>;
}

/// Reads memory usage from the operating system.
pub struct SystemMemoryProbe {
    system: System,
}

impl SystemMemoryProbe {
    /// Creates a probe with an empty system snapshot.
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }
}

impl Default for SystemMemoryProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProbe for SystemMemoryProbe {
    fn used_percent(&mut self) -> Result<f64, GrainsError> {
        self.system.refresh_memory();
        let total = self.system.total_memory();
        if total == 0 {
            return Err(GrainsError::Capacity(ErrorInfo::new(
                "memory-unavailable",
                "system reported zero total memory",
            )));
        }
        Ok(self.system.used_memory() as f64 * 100.0 / total as f64)
    }
}

/// Result of [`refine_with_probe`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefineOutcome {
    /// Capacity before.
    pub from: u64,
    /// Capacity after; equal to `from` when refinement was refused.
    pub to: u64,
    /// Memory usage seen before refining.
    pub memory_percent: f64,
    /// `true` when the usage was above the warning level.
    pub memory_warning: bool,
    /// Microseconds spent rescaling.
    pub elapsed_micros: u64,
}

impl RefineOutcome {
    /// `true` when the capacity changed.
    pub fn refined(&self) -> bool {
        self.to != self.from
    }
}

/// Multiplies `old` by `factor` unless the result would pass `max`.
///
/// Memory usage above `warn_percent` is logged but does not block the
/// refinement. `rescale` receives `(old, new)` and does the actual data
/// move; its duration is reported.
pub fn refine_with_probe<F>(
    old: u64,
    factor: u64,
    max: u64,
    probe: &mut dyn MemoryProbe,
    warn_percent: f64,
    rescale: F,
) -> Result<RefineOutcome, GrainsError>
where
    F: FnOnce(u64, u64) -> Result<(), GrainsError>,
{
    let memory_percent = probe.used_percent()?;
    let memory_warning = memory_percent > warn_percent;
    if memory_warning {
        warn!("memory usage {memory_percent:.1}% above {warn_percent}%, refinement may be risky");
    }
    let refused = |to| RefineOutcome {
        from: old,
        to,
        memory_percent,
        memory_warning,
        elapsed_micros: 0,
    };
    let Some(new) = old.checked_mul(factor).filter(|new| *new <= max) else {
        info!("capacity {old}·{factor} would exceed {max}, keeping {old}");
        return Ok(refused(old));
    };
    let started = Instant::now();
    rescale(old, new)?;
    let elapsed_micros = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    info!("capacity refined {old} -> {new} in {elapsed_micros}µs");
    Ok(RefineOutcome {
        to: new,
        elapsed_micros,
        ..refused(old)
    })
}

/// Repeated refinement from an initial capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefineSchedule {
    /// Starting capacity.
    #[serde(default = "default_initial_capacity")]
    pub initial_capacity: u64,
    /// Factor per round.
    #[serde(default = "default_factor")]
    pub factor: u64,
    /// Capacity that may not be exceeded.
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
    /// Rounds attempted.
    #[serde(default = "default_rounds")]
    pub rounds: u32,
    /// Memory usage percentage that triggers a warning.
    #[serde(default = "default_warn_percent")]
    pub warn_percent: f64,
}

fn default_initial_capacity() -> u64 {
    50
}

fn default_factor() -> u64 {
    2
}

fn default_max_capacity() -> u64 {
    1_000
}

fn default_rounds() -> u32 {
    5
}

fn default_warn_percent() -> f64 {
    80.0
}

impl Default for RefineSchedule {
    fn default() -> Self {
        Self {
            initial_capacity: default_initial_capacity(),
            factor: default_factor(),
            max_capacity: default_max_capacity(),
            rounds: default_rounds(),
            warn_percent: default_warn_percent(),
        }
    }
}

impl RefineSchedule {
    /// Runs the rounds, stopping early once the capacity stops changing or reaches the maximum.
    pub fn run(&self, probe: &mut dyn MemoryProbe) -> Result<Vec<RefineOutcome>, GrainsError> {
        if self.factor < 2 {
            return Err(GrainsError::config("factor", "refine factor must be at least 2"));
        }
        let mut capacity = self.initial_capacity;
        let mut outcomes = Vec::new();
        for _ in 0..self.rounds {
            let outcome = refine_with_probe(
                capacity,
                self.factor,
                self.max_capacity,
                probe,
                self.warn_percent,
                |_, _| Ok(()),
            )?;
            capacity = outcome.to;
            let stalled = !outcome.refined();
            outcomes.push(outcome);
            if stalled || capacity >= self.max_capacity {
                break;
            }
        }
        Ok(outcomes)
    }
}
