//! Node loads - forces and moments applied directly to nodes

use serde::{Deserialize, Serialize};

/// A load applied directly to a node, in global axes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeLoad {
    /// Index of the loaded node
    pub node: usize,
    /// Force in X direction
    pub fx: f64,
    /// Force in Y direction
    pub fy: f64,
    /// Force in Z direction
    pub fz: f64,
    /// Moment about X axis
    #[serde(default)]
    pub mx: f64,
    /// Moment about Y axis
    #[serde(default)]
    pub my: f64,
    /// Moment about Z axis
    #[serde(default)]
    pub mz: f64,
}

impl NodeLoad {
    /// Create a new node load with all components
    pub fn new(node: usize, fx: f64, fy: f64, fz: f64, mx: f64, my: f64, mz: f64) -> Self {
        Self {
            node,
            fx,
            fy,
            fz,
            mx,
            my,
            mz,
        }
    }

    /// Create a force-only node load
    pub fn force(node: usize, fx: f64, fy: f64, fz: f64) -> Self {
        Self::new(node, fx, fy, fz, 0.0, 0.0, 0.0)
    }

    /// Create a moment-only node load
    pub fn moment(node: usize, mx: f64, my: f64, mz: f64) -> Self {
        Self::new(node, 0.0, 0.0, 0.0, mx, my, mz)
    }

    /// Get the load as an array [FX, FY, FZ, MX, MY, MZ]
    pub fn as_array(&self) -> [f64; 6] {
        [self.fx, self.fy, self.fz, self.mx, self.my, self.mz]
    }

    /// Scale the load by a factor
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            node: self.node,
            fx: self.fx * factor,
            fy: self.fy * factor,
            fz: self.fz * factor,
            mx: self.mx * factor,
            my: self.my * factor,
            mz: self.mz * factor,
        }
    }
}
