//! Heat equation on fixed-capacity cells that refine their capacity under pressure.

use grains_core::errors::GrainsError;
use grains_core::{FixedGrain, RefinePolicy};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Parameters of the fixed-capacity heat solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedHeatConfig {
    /// Grid points on `[0, 1]`, boundaries included.
    #[serde(default = "default_nx")]
    pub nx: usize,
    /// Diffusion coefficient.
    #[serde(default = "default_coefficient")]
    pub coefficient: f64,
    /// Time step.
    #[serde(default = "default_dt")]
    pub dt: f64,
    /// Total simulated time.
    #[serde(default = "default_total_time")]
    pub total_time: f64,
    /// Initial capacity of every cell.
    #[serde(default = "default_initial_ncap")]
    pub initial_ncap: i64,
    /// Scale shared by every cell.
    #[serde(default = "default_scale")]
    pub scale: i64,
    /// Capacity multiplier per refinement.
    #[serde(default = "default_refine_factor")]
    pub refine_factor: i64,
    /// Refinements allowed for a single vanishing product.
    #[serde(default = "default_refine_max_steps")]
    pub refine_max_steps: u32,
    /// Usage fraction above which the whole array is refined.
    #[serde(default = "default_usage_threshold")]
    pub usage_threshold: f64,
    /// Snapshot interval in steps.
    #[serde(default = "default_snapshot_every")]
    pub snapshot_every: usize,
}

fn default_nx() -> usize {
    21
}

fn default_coefficient() -> f64 {
    0.3
}

fn default_dt() -> f64 {
    0.002
}

fn default_total_time() -> f64 {
    0.02
}

fn default_initial_ncap() -> i64 {
    20
}

fn default_scale() -> i64 {
    2
}

fn default_refine_factor() -> i64 {
    2
}

fn default_refine_max_steps() -> u32 {
    5
}

fn default_usage_threshold() -> f64 {
    0.95
}

fn default_snapshot_every() -> usize {
    10
}

impl Default for FixedHeatConfig {
    fn default() -> Self {
        Self {
            nx: default_nx(),
            coefficient: default_coefficient(),
            dt: default_dt(),
            total_time: default_total_time(),
            initial_ncap: default_initial_ncap(),
            scale: default_scale(),
            refine_factor: default_refine_factor(),
            refine_max_steps: default_refine_max_steps(),
            usage_threshold: default_usage_threshold(),
            snapshot_every: default_snapshot_every(),
        }
    }
}

impl FixedHeatConfig {
    /// Number of steps covering `total_time`.
    pub fn steps(&self) -> usize {
        (self.total_time / self.dt).round() as usize
    }

    fn policy(&self) -> RefinePolicy {
        RefinePolicy {
            factor: self.refine_factor,
            max_steps: self.refine_max_steps,
        }
    }

    /// Checks grid, capacity and time parameters.
    pub fn validate(&self) -> Result<(), GrainsError> {
        if self.nx < 3 {
            return Err(GrainsError::config("nx", "at least three grid points are required"));
        }
        if self.initial_ncap <= 0 || self.scale == 0 {
            return Err(GrainsError::config(
                "initial_ncap",
                "capacity must be positive and scale non-zero",
            ));
        }
        if self.refine_factor < 2 {
            return Err(GrainsError::config("refine_factor", "refine factor must be at least 2"));
        }
        if !(self.dt > 0.0) || !(self.total_time >= 0.0) {
            return Err(GrainsError::config("dt", "time step must be positive"));
        }
        if !(self.usage_threshold > 0.0) {
            return Err(GrainsError::config("usage_threshold", "threshold must be positive"));
        }
        Ok(())
    }
}

/// Decoded state at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatSnapshot {
    /// Step index (0 for the initial state).
    pub step: usize,
    /// Simulated time.
    pub time: f64,
    /// Capacity of the first cell.
    pub ncap: i64,
    /// Decoded values.
    pub values: Vec<f64>,
}

/// Result of a fixed-capacity heat run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedHeatReport {
    /// Initial state, periodic snapshots and the final state.
    pub snapshots: Vec<HeatSnapshot>,
    /// Whole-array refinements performed.
    pub refinements: usize,
    /// Final cells.
    pub cells: Vec<FixedGrain>,
}

fn snapshot(step: usize, time: f64, cells: &[FixedGrain]) -> HeatSnapshot {
    HeatSnapshot {
        step,
        time,
        ncap: cells.first().map_or(0, |c| c.ncap),
        values: cells.iter().map(FixedGrain::to_f64).collect(),
    }
}

/// Refines every cell when the largest usage fraction exceeds `threshold`.
pub fn refine_if_saturated(
    cells: &mut [FixedGrain],
    threshold: f64,
    factor: i64,
) -> Result<bool, GrainsError> {
    let max_usage = cells
        .iter()
        .map(FixedGrain::usage_fraction)
        .fold(0.0, f64::max);
    if max_usage <= threshold {
        return Ok(false);
    }
    for cell in cells.iter_mut() {
        *cell = cell.refine(factor)?;
    }
    info!(
        "usage {max_usage:.3} above {threshold}, capacity refined to {}",
        cells.first().map_or(0, |c| c.ncap)
    );
    Ok(true)
}

/// One explicit step on fixed-capacity cells with zero boundaries.
pub fn fixed_heat_step(
    cells: &[FixedGrain],
    alpha: &FixedGrain,
    policy: RefinePolicy,
) -> Result<Vec<FixedGrain>, GrainsError> {
    let n = cells.len();
    let mut next = cells.to_vec();
    if n == 0 {
        return Ok(next);
    }
    let zero = FixedGrain::zero(cells[0].ncap, cells[0].scale)?;
    for j in 1..n.saturating_sub(1) {
        let two = FixedGrain::encode(2.0, cells[j].ncap, cells[j].scale)?;
        let centre = two.mul(&cells[j], policy)?;
        let laplacian = cells[j + 1].sub(&centre)?.add(&cells[j - 1])?;
        let delta = alpha.mul(&laplacian, policy)?;
        next[j] = cells[j].add(&delta)?;
    }
    next[0] = zero;
    next[n - 1] = zero;
    Ok(next)
}

/// Runs the solver on an initial Gaussian `exp(−((x − 0.5)/0.1)²)`.
pub fn run_fixed_heat(config: &FixedHeatConfig) -> Result<FixedHeatReport, GrainsError> {
    config.validate()?;
    let policy = config.policy();
    let dx = 1.0 / (config.nx - 1) as f64;
    let mut cells = (0..config.nx)
        .map(|i| {
            let x = i as f64 * dx;
            let value = (-((x - 0.5) / 0.1).powi(2)).exp();
            FixedGrain::encode(value, config.initial_ncap, config.scale)
        })
        .collect::<Result<Vec<_>, _>>()?;
    let zero = FixedGrain::zero(config.initial_ncap, config.scale)?;
    cells[0] = zero;
    cells[config.nx - 1] = zero;

    let raw_alpha = config.coefficient * config.dt / (dx * dx);
    let mut alpha = FixedGrain::encode(raw_alpha, config.initial_ncap, config.scale)?;

    let mut snapshots = vec![snapshot(0, 0.0, &cells)];
    let mut refinements = 0;
    let steps = config.steps();
    for step in 1..=steps {
        if refine_if_saturated(&mut cells, config.usage_threshold, config.refine_factor)? {
            refinements += 1;
        }
        if alpha.ncap != cells[0].ncap {
            alpha = FixedGrain::encode(alpha.to_f64(), cells[0].ncap, alpha.scale)?;
        }
        cells = fixed_heat_step(&cells, &alpha, policy)?;
        if refine_if_saturated(&mut cells, config.usage_threshold, config.refine_factor)? {
            refinements += 1;
        }
        let time = step as f64 * config.dt;
        debug!("fixed heat step {step} t={time:.4} ncap={}", cells[0].ncap);
        if config.snapshot_every > 0 && step % config.snapshot_every == 0 && step != steps {
            snapshots.push(snapshot(step, time, &cells));
        }
    }
    snapshots.push(snapshot(steps, steps as f64 * config.dt, &cells));

    Ok(FixedHeatReport {
        snapshots,
        refinements,
        cells,
    })
}
