use grains_core::errors::GrainsError;
use grains_core::Grain;
use serde::{Deserialize, Serialize};

/// Point with exact coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point2D {
    /// Horizontal coordinate.
    pub x: Grain,
    /// Vertical coordinate.
    pub y: Grain,
}

impl Point2D {
    /// Builds a point.
    pub fn new(x: Grain, y: Grain) -> Self {
        Self { x, y }
    }
}

/// `|x₂ − x₁| + |y₂ − y₁|`.
pub fn l1_distance(a: &Point2D, b: &Point2D) -> Grain {
    (&b.x - &a.x).abs() + (&b.y - &a.y).abs()
}

/// L1 perimeter of the closed loop through `points`.
pub fn polygon_perimeter_l1(points: &[Point2D]) -> Grain {
    if points.len() < 2 {
        return Grain::zero();
    }
    points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| l1_distance(a, b))
        .sum()
}

/// Perimeter of a regular polygon with `n` sides of length `side`.
pub fn regular_polygon_perimeter(n: u64, side: &Grain) -> Grain {
    Grain::from_integer(n) * side
}

/// Polygon perimeter with `n` sides of length `2r / n`.
///
/// No chord geometry is involved, so the result is always `2r`.
pub fn circle_perimeter_naive(radius: &Grain, n: u64) -> Result<Grain, GrainsError> {
    if n == 0 {
        return Err(GrainsError::config("sides", "a polygon needs at least one side"));
    }
    let side = (Grain::from(2) * radius).checked_div(&Grain::from_integer(n))?;
    Ok(regular_polygon_perimeter(n, &side))
}
