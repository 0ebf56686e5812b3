//! Explicit heat and diffusion steppers on one-dimensional cell arrays.

use grains_core::errors::GrainsError;
use grains_core::Grain;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::fixed_heat::{run_fixed_heat, FixedHeatConfig, FixedHeatReport};

/// One explicit step `u[i] + α(u[i+1] − 2u[i] + u[i−1])` with both ends pinned to zero.
pub fn heat_step(u: &[Grain], alpha: &Grain) -> Vec<Grain> {
    let n = u.len();
    let two = Grain::from(2);
    let mut next = u.to_vec();
    for i in 1..n.saturating_sub(1) {
        let laplacian = &u[i + 1] - &two * &u[i] + &u[i - 1];
        next[i] = &u[i] + alpha * laplacian;
    }
    if let Some(first) = next.first_mut() {
        *first = Grain::zero();
    }
    if let Some(last) = next.last_mut() {
        *last = Grain::zero();
    }
    next
}

/// Exact diffusion on `[0, 1]` split into equal cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactDiffusionConfig {
    /// Number of cells.
    #[serde(default = "default_exact_cells")]
    pub n_cells: u64,
    /// Diffusion coefficient.
    #[serde(default = "default_exact_coefficient")]
    pub coefficient: Grain,
    /// Time step.
    #[serde(default = "default_exact_dt")]
    pub dt: Grain,
    /// Number of steps.
    #[serde(default = "default_exact_steps")]
    pub n_steps: u64,
    /// Initial value of the middle cell.
    #[serde(default = "default_exact_peak")]
    pub peak: Grain,
}

fn default_exact_cells() -> u64 {
    50
}

fn default_exact_coefficient() -> Grain {
    Grain::ratio(1, 100)
}

fn default_exact_dt() -> Grain {
    Grain::ratio(1, 2_000)
}

fn default_exact_steps() -> u64 {
    200
}

fn default_exact_peak() -> Grain {
    Grain::from(10)
}

impl Default for ExactDiffusionConfig {
    fn default() -> Self {
        Self {
            n_cells: default_exact_cells(),
            coefficient: default_exact_coefficient(),
            dt: default_exact_dt(),
            n_steps: default_exact_steps(),
            peak: default_exact_peak(),
        }
    }
}

impl ExactDiffusionConfig {
    /// Requires at least one cell and non-negative rates.
    pub fn validate(&self) -> Result<(), GrainsError> {
        if self.n_cells == 0 {
            return Err(GrainsError::config("n_cells", "at least one cell is required"));
        }
        if self.coefficient.is_negative() || self.dt.is_negative() {
            return Err(GrainsError::config(
                "coefficient",
                "diffusion coefficient and time step must be non-negative",
            ));
        }
        Ok(())
    }
}

/// Cell centres and values after an exact diffusion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactDiffusionReport {
    /// Cell centres `(i + 1/2) / n`.
    pub centres: Vec<Grain>,
    /// Final cell values.
    pub values: Vec<Grain>,
    /// Coefficient `D·dt/dx²` used for every step.
    pub factor: Grain,
}

/// Diffuses a single peak in the middle cell with zero boundaries.
pub fn exact_diffusion(config: &ExactDiffusionConfig) -> Result<ExactDiffusionReport, GrainsError> {
    config.validate()?;
    let n = config.n_cells;
    let cells = Grain::from_integer(n);
    let dx = Grain::one().checked_div(&cells)?;
    let half = Grain::ratio(1, 2);
    let centres = (0..n)
        .map(|i| (Grain::from_integer(i) + &half).checked_div(&cells))
        .collect::<Result<Vec<_>, _>>()?;

    let mut values = vec![Grain::zero(); centres.len()];
    values[centres.len() / 2] = config.peak.clone();

    let factor = &config.coefficient * config.dt.checked_div(&(&dx * &dx))?;
    info!("exact diffusion: {n} cells, factor {factor}, {} steps", config.n_steps);
    for step in 0..config.n_steps {
        values = heat_step(&values, &factor);
        debug!("exact diffusion step {}", step + 1);
    }
    Ok(ExactDiffusionReport {
        centres,
        values,
        factor,
    })
}

/// Cell-averaged diffusion of a Gaussian bump in floating point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LumpedDiffusionConfig {
    /// Number of cells.
    #[serde(default = "default_lumped_cells")]
    pub n_cells: usize,
    /// Diffusion coefficient.
    #[serde(default = "default_lumped_coefficient")]
    pub coefficient: f64,
    /// Time step.
    #[serde(default = "default_lumped_dt")]
    pub dt: f64,
    /// Final time.
    #[serde(default = "default_lumped_t_max")]
    pub t_max: f64,
}

fn default_lumped_cells() -> usize {
    60
}

fn default_lumped_coefficient() -> f64 {
    0.02
}

fn default_lumped_dt() -> f64 {
    0.0004
}

fn default_lumped_t_max() -> f64 {
    0.1
}

impl Default for LumpedDiffusionConfig {
    fn default() -> Self {
        Self {
            n_cells: default_lumped_cells(),
            coefficient: default_lumped_coefficient(),
            dt: default_lumped_dt(),
            t_max: default_lumped_t_max(),
        }
    }
}

impl LumpedDiffusionConfig {
    /// Number of whole steps that fit in `t_max`.
    pub fn steps(&self) -> usize {
        ((self.t_max / self.dt) + 1e-9).floor() as usize
    }

    /// Requires cells and a positive time step.
    pub fn validate(&self) -> Result<(), GrainsError> {
        if self.n_cells == 0 {
            return Err(GrainsError::config("n_cells", "at least one cell is required"));
        }
        if !(self.dt > 0.0) || !self.t_max.is_finite() || self.t_max < 0.0 {
            return Err(GrainsError::config("dt", "time step must be positive and t_max finite"));
        }
        Ok(())
    }
}

/// Cell centres and values of a lumped run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LumpedDiffusionReport {
    /// Cell centres.
    pub centres: Vec<f64>,
    /// Final values.
    pub values: Vec<f64>,
    /// Steps taken.
    pub steps: usize,
}

/// Runs the lumped scheme with mirrored neighbours at both walls.
///
/// Each cell moves by `dt/dx · (flux_left + flux_right)` with
/// `flux_left = −D(u[i] − u[iL])/dx` and `flux_right = −D(u[iR] − u[i])/dx`.
pub fn lumped_diffusion(config: &LumpedDiffusionConfig) -> Result<LumpedDiffusionReport, GrainsError> {
    config.validate()?;
    let n = config.n_cells;
    let dx = 1.0 / n as f64;
    let centres: Vec<f64> = (0..n).map(|i| (i as f64 + 0.5) * dx).collect();
    let mut u: Vec<f64> = centres
        .iter()
        .map(|x| (-50.0 * (x - 0.5).powi(2)).exp())
        .collect();

    let steps = config.steps();
    for _ in 0..steps {
        let mut next = u.clone();
        for i in 0..n {
            let left = if i > 0 { i - 1 } else { i };
            let right = if i + 1 < n { i + 1 } else { i };
            let flux_left = -config.coefficient * (u[i] - u[left]) / dx;
            let flux_right = -config.coefficient * (u[right] - u[i]) / dx;
            next[i] = u[i] + config.dt / dx * (flux_left + flux_right);
        }
        u = next;
    }
    Ok(LumpedDiffusionReport {
        centres,
        values: u,
        steps,
    })
}

/// Diffusion scheme selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum DiffusionConfig {
    /// Exact rational cells.
    Exact(ExactDiffusionConfig),
    /// Floating point cell averages.
    Lumped(LumpedDiffusionConfig),
    /// Fixed-capacity cells with refinement.
    Fixed(FixedHeatConfig),
}

/// Result of any diffusion scheme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum DiffusionReport {
    /// Exact run.
    Exact(ExactDiffusionReport),
    /// Lumped run.
    Lumped(LumpedDiffusionReport),
    /// Fixed-capacity run.
    Fixed(FixedHeatReport),
}

/// Dispatches to the configured scheme.
pub fn run_diffusion(config: &DiffusionConfig) -> Result<DiffusionReport, GrainsError> {
    match config {
        DiffusionConfig::Exact(cfg) => exact_diffusion(cfg).map(DiffusionReport::Exact),
        DiffusionConfig::Lumped(cfg) => lumped_diffusion(cfg).map(DiffusionReport::Lumped),
        DiffusionConfig::Fixed(cfg) => run_fixed_heat(cfg).map(DiffusionReport::Fixed),
    }
}
