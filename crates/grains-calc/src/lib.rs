#![deny(missing_docs)]
#![doc = "Exact numerics on grains: linear systems, quadrature, differences, diffusion, meshes and geometry."]

/// Fixed-capacity heat solver.
pub mod fixed_heat;
/// L1 geometry on exact points.
pub mod geometry;
/// Exact heat steps and diffusion schemes.
pub mod heat;
/// Trapezoid integration and forward differences.
pub mod integrate;
/// Gauss-Jordan elimination.
pub mod linalg;
/// Integer-coordinate meshes.
pub mod mesh;
/// Exact polynomials.
pub mod polynomial;

pub use fixed_heat::{
    fixed_heat_step, refine_if_saturated, run_fixed_heat, FixedHeatConfig, FixedHeatReport,
    HeatSnapshot,
};
pub use geometry::{
    circle_perimeter_naive, l1_distance, polygon_perimeter_l1, regular_polygon_perimeter, Point2D,
};
pub use heat::{
    exact_diffusion, heat_step, lumped_diffusion, run_diffusion, DiffusionConfig, DiffusionReport,
    ExactDiffusionConfig, ExactDiffusionReport, LumpedDiffusionConfig, LumpedDiffusionReport,
};
pub use integrate::{forward_difference, trapezoid};
pub use linalg::{solve, Matrix};
pub use mesh::{Connectivity, Mesh, MeshNode};
pub use polynomial::Polynomial;
