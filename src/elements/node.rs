//! Node - a point in 3D space identified by its index in the model's node list

use serde::{Deserialize, Serialize};

/// A 3D node in the finite element model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
    /// Z coordinate (elevation)
    pub z: f64,
}

impl Node {
    /// Create a new node at the given coordinates
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Get the coordinates as an array
    pub fn coords(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Calculate distance to another node
    pub fn distance_to(&self, other: &Node) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Distance to another node measured in plan (ignoring elevation)
    pub fn plan_distance_to(&self, other: &Node) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// First DOF index of this node in the global system
    pub fn base_dof(index: usize) -> usize {
        index * 6
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_creation() {
        let node = Node::new(1.0, 2.0, 3.0);
        assert_eq!(node.x, 1.0);
        assert_eq!(node.y, 2.0);
        assert_eq!(node.z, 3.0);
    }

    #[test]
    fn test_node_distance() {
        let n1 = Node::new(0.0, 0.0, 0.0);
        let n2 = Node::new(3.0, 4.0, 12.0);
        assert!((n1.distance_to(&n2) - 13.0).abs() < 1e-10);
        assert!((n1.plan_distance_to(&n2) - 5.0).abs() < 1e-10);
    }
}
