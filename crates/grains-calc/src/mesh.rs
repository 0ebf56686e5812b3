use grains_core::Grain;
use serde::{Deserialize, Serialize};

/// Neighbourhood used when linking mesh nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Connectivity {
    /// Horizontal and vertical neighbours.
    Four,
    /// Horizontal, vertical and diagonal neighbours.
    Eight,
}

impl Connectivity {
    fn offsets(self) -> &'static [(i64, i64)] {
        const AXES: [(i64, i64); 8] = [
            (1, 0),
            (-1, 0),
            (0, 1),
            (0, -1),
            (1, 1),
            (1, -1),
            (-1, 1),
            (-1, -1),
        ];
        match self {
            Connectivity::Four => &AXES[..4],
            Connectivity::Eight => &AXES,
        }
    }
}

/// Mesh node at integer grain coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshNode {
    /// Horizontal coordinate.
    pub x: Grain,
    /// Vertical coordinate.
    pub y: Grain,
    /// Indices of in-bounds neighbours.
    pub neighbours: Vec<usize>,
}

/// Rectangular node grid stored row by row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mesh {
    /// Nodes per row.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
    /// Nodes, index `y * width + x`.
    pub nodes: Vec<MeshNode>,
}

impl Mesh {
    /// Builds a `width × height` grid and links neighbours.
    pub fn build(width: usize, height: usize, connectivity: Connectivity) -> Self {
        let mut nodes = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let neighbours = connectivity
                    .offsets()
                    .iter()
                    .filter_map(|&(dx, dy)| {
                        let nx = x as i64 + dx;
                        let ny = y as i64 + dy;
                        let inside = (0..width as i64).contains(&nx) && (0..height as i64).contains(&ny);
                        inside.then(|| ny as usize * width + nx as usize)
                    })
                    .collect();
                nodes.push(MeshNode {
                    x: Grain::from_integer(x as u64),
                    y: Grain::from_integer(y as u64),
                    neighbours,
                });
            }
        }
        Self {
            width,
            height,
            nodes,
        }
    }

    /// Node at `(x, y)`.
    pub fn node(&self, x: usize, y: usize) -> Option<&MeshNode> {
        if x < self.width && y < self.height {
            self.nodes.get(y * self.width + x)
        } else {
            None
        }
    }
}
