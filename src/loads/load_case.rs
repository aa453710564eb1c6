//! Load cases

use serde::{Deserialize, Serialize};

use super::NodeLoad;

/// A named, ordered list of nodal loads; entries targeting the same node add up
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadCase {
    /// Name of the load case
    pub name: String,
    /// Point loads in application order
    #[serde(default)]
    pub loads: Vec<NodeLoad>,
}

impl LoadCase {
    /// Create a new, empty load case
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            loads: Vec::new(),
        }
    }

    /// Append a load entry
    pub fn with_load(mut self, load: NodeLoad) -> Self {
        self.loads.push(load);
        self
    }

    pub fn add_load(&mut self, load: NodeLoad) {
        self.loads.push(load);
    }

    /// Sum of the applied forces [FX, FY, FZ]
    pub fn total_force(&self) -> [f64; 3] {
        self.loads.iter().fold([0.0; 3], |acc, l| {
            [acc[0] + l.fx, acc[1] + l.fy, acc[2] + l.fz]
        })
    }

    /// Check if every load entry is zero
    pub fn is_empty(&self) -> bool {
        self.loads
            .iter()
            .all(|l| l.as_array().iter().all(|v| *v == 0.0))
    }
}
