//! Raw building geometry consumed by the mesh generator

use serde::{Deserialize, Serialize};

/// One vertex of a slab boundary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlabVertex {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Slab thickness at this vertex
    pub thickness: f64,
}

impl SlabVertex {
    pub fn new(x: f64, y: f64, z: f64, thickness: f64) -> Self {
        Self { x, y, z, thickness }
    }
}

/// A slab level (mat, mezzanine, top...) described by its boundary polygon
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlabLevel {
    pub name: String,
    /// Ordered boundary vertices; the polygon closes implicitly
    pub vertices: Vec<SlabVertex>,
}

impl SlabLevel {
    pub fn new(name: &str, vertices: Vec<SlabVertex>) -> Self {
        Self {
            name: name.to_string(),
            vertices,
        }
    }

    /// Axis-aligned rectangular slab of uniform thickness
    pub fn rectangle(name: &str, x0: f64, y0: f64, x1: f64, y1: f64, z: f64, thickness: f64) -> Self {
        Self::new(
            name,
            vec![
                SlabVertex::new(x0, y0, z, thickness),
                SlabVertex::new(x1, y0, z, thickness),
                SlabVertex::new(x1, y1, z, thickness),
                SlabVertex::new(x0, y1, z, thickness),
            ],
        )
    }

    /// Elevation of the level, taken from its first vertex
    pub fn elevation(&self) -> Option<f64> {
        self.vertices.first().map(|v| v.z)
    }

    /// Mean of the positive vertex thicknesses
    pub fn thickness(&self) -> Option<f64> {
        let positive: Vec<f64> = self
            .vertices
            .iter()
            .map(|v| v.thickness)
            .filter(|t| *t > 0.0)
            .collect();
        if positive.is_empty() {
            None
        } else {
            Some(positive.iter().sum::<f64>() / positive.len() as f64)
        }
    }

    /// Plan outline with consecutive duplicate vertices dropped
    pub fn outline(&self) -> Vec<(f64, f64)> {
        let mut outline: Vec<(f64, f64)> = Vec::with_capacity(self.vertices.len());
        for v in &self.vertices {
            if !v.x.is_finite() || !v.y.is_finite() {
                continue;
            }
            if outline.last().map_or(true, |&(x, y)| x != v.x || y != v.y) {
                outline.push((v.x, v.y));
            }
        }
        if outline.len() > 1 && outline.first() == outline.last() {
            outline.pop();
        }
        outline
    }
}

/// Column between two elevations at a plan location
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub x: f64,
    pub y: f64,
    pub z_bottom: f64,
    pub z_top: f64,
    /// Section width (along global Y)
    #[serde(default)]
    pub width: f64,
    /// Section depth (along global X)
    #[serde(default)]
    pub depth: f64,
    /// Square size used when width or depth is zero
    #[serde(default)]
    pub size: f64,
}

impl ColumnSpec {
    pub fn new(x: f64, y: f64, z_bottom: f64, z_top: f64, width: f64, depth: f64) -> Self {
        Self {
            x,
            y,
            z_bottom,
            z_top,
            width,
            depth,
            size: 0.0,
        }
    }

    /// Square column given by a single size
    pub fn square(x: f64, y: f64, z_bottom: f64, z_top: f64, size: f64) -> Self {
        Self {
            x,
            y,
            z_bottom,
            z_top,
            width: 0.0,
            depth: 0.0,
            size,
        }
    }

    /// Section dimensions (width, depth) after the size fallback
    pub fn dimensions(&self) -> (f64, f64) {
        if self.width > 0.0 && self.depth > 0.0 {
            (self.width, self.depth)
        } else {
            (self.size, self.size)
        }
    }
}

/// Circular pile below a plan location
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PileSpec {
    pub x: f64,
    pub y: f64,
    pub top_z: f64,
    pub bottom_z: f64,
    pub diameter: f64,
}

impl PileSpec {
    pub fn new(x: f64, y: f64, top_z: f64, bottom_z: f64, diameter: f64) -> Self {
        Self {
            x,
            y,
            top_z,
            bottom_z,
            diameter,
        }
    }
}

/// Beam between two 3D points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamSpec {
    pub start: [f64; 3],
    pub end: [f64; 3],
    pub width: f64,
    pub depth: f64,
}

impl BeamSpec {
    pub fn new(start: [f64; 3], end: [f64; 3], width: f64, depth: f64) -> Self {
        Self {
            start,
            end,
            width,
            depth,
        }
    }
}

/// Complete building description
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildingInput {
    #[serde(default)]
    pub levels: Vec<SlabLevel>,
    #[serde(default)]
    pub piles: Vec<PileSpec>,
    #[serde(default)]
    pub columns: Vec<ColumnSpec>,
    #[serde(default)]
    pub beams: Vec<BeamSpec>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_properties() {
        let level = SlabLevel::new(
            "Mat",
            vec![
                SlabVertex::new(0.0, 0.0, 0.5, 2.0),
                SlabVertex::new(4.0, 0.0, 0.5, 0.0),
                SlabVertex::new(4.0, 4.0, 0.5, 3.0),
                SlabVertex::new(0.0, 0.0, 0.5, 2.0),
            ],
        );
        assert_eq!(level.elevation(), Some(0.5));
        assert_eq!(level.thickness(), Some(7.0 / 3.0));
        assert_eq!(level.outline().len(), 3);
    }

    #[test]
    fn test_column_size_fallback() {
        assert_eq!(ColumnSpec::new(0.0, 0.0, 0.0, 10.0, 1.0, 2.0).dimensions(), (1.0, 2.0));
        assert_eq!(ColumnSpec::new(0.0, 0.0, 0.0, 10.0, 0.0, 2.0).dimensions(), (0.0, 0.0));
        assert_eq!(ColumnSpec::square(0.0, 0.0, 0.0, 10.0, 1.5).dimensions(), (1.5, 1.5));
    }
}
