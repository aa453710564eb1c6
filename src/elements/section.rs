//! Section properties for frame elements

use serde::{Deserialize, Serialize};

/// Cross-section properties for beam-family elements
///
/// Width, depth and diameter are reporting metadata; only `diameter` feeds
/// the stiffness math (pile soil springs).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameSection {
    /// Cross-sectional area
    pub a: f64,
    /// Moment of inertia about local y-axis (strong axis)
    pub iy: f64,
    /// Moment of inertia about local z-axis (weak axis)
    pub iz: f64,
    /// Torsional constant
    pub j: f64,
    /// Section width
    pub width: f64,
    /// Section depth
    pub depth: f64,
    /// Diameter of circular sections
    pub diameter: Option<f64>,
}

impl FrameSection {
    /// Create a new section with basic properties
    pub fn new(a: f64, iy: f64, iz: f64, j: f64) -> Self {
        Self {
            a,
            iy,
            iz,
            j,
            width: 0.0,
            depth: 0.0,
            diameter: None,
        }
    }

    /// Create a rectangular section; `depth` is measured along local z
    pub fn rectangular(width: f64, depth: f64) -> Self {
        let a = width * depth;
        let iy = width * depth.powi(3) / 12.0;
        let iz = depth * width.powi(3) / 12.0;

        // Torsional constant for rectangle (approximate)
        let (a_dim, b_dim) = if width > depth { (width, depth) } else { (depth, width) };
        let j = a_dim * b_dim.powi(3) / 3.0 * (1.0 - 0.63 * b_dim / a_dim);

        Self {
            a,
            iy,
            iz,
            j,
            width,
            depth,
            diameter: None,
        }
    }

    /// Create a solid circular section
    pub fn circular(diameter: f64) -> Self {
        let r = diameter / 2.0;
        let a = std::f64::consts::PI * r.powi(2);
        let i = std::f64::consts::PI * r.powi(4) / 4.0;
        let j = std::f64::consts::PI * r.powi(4) / 2.0;

        Self {
            a,
            iy: i,
            iz: i,
            j,
            width: diameter,
            depth: diameter,
            diameter: Some(diameter),
        }
    }

    /// Artificially stiff section for rigid links between nodes
    pub fn rigid_link(value: f64) -> Self {
        Self::new(value, value, value, value)
    }
}

impl Default for FrameSection {
    fn default() -> Self {
        Self::rectangular(1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangular_section() {
        let section = FrameSection::rectangular(1.0, 2.0);
        assert!((section.a - 2.0).abs() < 1e-10);
        assert!((section.iy - 8.0 / 12.0).abs() < 1e-10);
        assert!((section.iz - 2.0 / 12.0).abs() < 1e-10);
        assert!(section.diameter.is_none());
    }

    #[test]
    fn test_circular_section() {
        let section = FrameSection::circular(2.0);
        assert!((section.a - std::f64::consts::PI).abs() < 1e-10);
        assert!((section.iy - std::f64::consts::PI / 4.0).abs() < 1e-10);
        assert!((section.j - 2.0 * section.iy).abs() < 1e-10);
        assert_eq!(section.diameter, Some(2.0));
    }
}
