//! Result types for building analysis

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::elements::ElementKind;
use crate::solver::SolveStatus;

/// Displacement results at a node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeDisplacement {
    /// Displacement in X direction
    pub dx: f64,
    /// Displacement in Y direction
    pub dy: f64,
    /// Displacement in Z direction
    pub dz: f64,
    /// Rotation about X axis
    pub rx: f64,
    /// Rotation about Y axis
    pub ry: f64,
    /// Rotation about Z axis
    pub rz: f64,
}

impl NodeDisplacement {
    /// Create from array [DX, DY, DZ, RX, RY, RZ]
    pub fn from_array(arr: [f64; 6]) -> Self {
        Self {
            dx: arr[0],
            dy: arr[1],
            dz: arr[2],
            rx: arr[3],
            ry: arr[4],
            rz: arr[5],
        }
    }

    /// Get translation magnitude
    pub fn translation_magnitude(&self) -> f64 {
        (self.dx.powi(2) + self.dy.powi(2) + self.dz.powi(2)).sqrt()
    }
}

/// Reaction forces at a node (`K · d` over its six DOFs)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reactions {
    pub fx: f64,
    pub fy: f64,
    pub fz: f64,
    pub mx: f64,
    pub my: f64,
    pub mz: f64,
}

impl Reactions {
    /// Create from array [FX, FY, FZ, MX, MY, MZ]
    pub fn from_array(arr: [f64; 6]) -> Self {
        Self {
            fx: arr[0],
            fy: arr[1],
            fz: arr[2],
            mx: arr[3],
            my: arr[4],
            mz: arr[5],
        }
    }

    /// Get total force magnitude
    pub fn force_magnitude(&self) -> f64 {
        (self.fx.powi(2) + self.fy.powi(2) + self.fz.powi(2)).sqrt()
    }

    /// Get total moment magnitude
    pub fn moment_magnitude(&self) -> f64 {
        (self.mx.powi(2) + self.my.powi(2) + self.mz.powi(2)).sqrt()
    }
}

/// Internal forces at one end of a member, in local axes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EndForces {
    /// Axial force (positive = tension)
    pub axial: f64,
    /// Shear force in local y direction
    pub shear_y: f64,
    /// Shear force in local z direction
    pub shear_z: f64,
    pub torsion: f64,
    /// Bending moment about local y axis
    pub moment_y: f64,
    /// Bending moment about local z axis
    pub moment_z: f64,
}

impl EndForces {
    /// Create from local force array at i-node
    pub fn from_i_node_forces(forces: &[f64; 12]) -> Self {
        Self {
            axial: -forces[0],
            shear_y: forces[1],
            shear_z: forces[2],
            torsion: -forces[3],
            moment_y: forces[4],
            moment_z: forces[5],
        }
    }

    /// Create from local force array at j-node
    pub fn from_j_node_forces(forces: &[f64; 12]) -> Self {
        Self {
            axial: forces[6],
            shear_y: -forces[7],
            shear_z: -forces[8],
            torsion: forces[9],
            moment_y: forces[10],
            moment_z: forces[11],
        }
    }

    pub fn shear_resultant(&self) -> f64 {
        self.shear_y.hypot(self.shear_z)
    }

    pub fn moment_resultant(&self) -> f64 {
        self.moment_y.hypot(self.moment_z)
    }
}

/// Internal forces of a beam-family element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementForces {
    /// Index into the model's element list
    pub element: usize,
    pub kind: ElementKind,
    pub i_node: usize,
    pub j_node: usize,
    /// Local end forces `k_local · T · d` [i-end (6), j-end (6)]
    pub local: [f64; 12],
    pub shear_i: f64,
    pub moment_i: f64,
    pub shear_j: f64,
    pub moment_j: f64,
}

impl ElementForces {
    pub fn from_local(element: usize, kind: ElementKind, i_node: usize, j_node: usize, local: [f64; 12]) -> Self {
        let i_end = EndForces::from_i_node_forces(&local);
        let j_end = EndForces::from_j_node_forces(&local);
        Self {
            element,
            kind,
            i_node,
            j_node,
            local,
            shear_i: i_end.shear_resultant(),
            moment_i: i_end.moment_resultant(),
            shear_j: j_end.shear_resultant(),
            moment_j: j_end.moment_resultant(),
        }
    }

    pub fn i_end(&self) -> EndForces {
        EndForces::from_i_node_forces(&self.local)
    }

    pub fn j_end(&self) -> EndForces {
        EndForces::from_j_node_forces(&self.local)
    }

    /// Largest axial force magnitude of the two ends
    pub fn max_axial(&self) -> f64 {
        self.local[0].abs().max(self.local[6].abs())
    }

    pub fn max_shear(&self) -> f64 {
        self.shear_i.max(self.shear_j)
    }

    pub fn max_moment(&self) -> f64 {
        self.moment_i.max(self.moment_j)
    }
}

/// Forces meeting at a joint, in global axes
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct JointForces {
    /// Member end forces plus the node's reaction [FX, FY, FZ, MX, MY, MZ]
    pub forces: [f64; 6],
    pub force_resultant: f64,
    pub moment_resultant: f64,
    /// Largest end shear resultant of the members framing in
    pub max_shear: f64,
    /// Largest end moment resultant of the members framing in
    pub max_moment: f64,
    /// Number of member ends framing in
    pub members: usize,
}

/// Drift between two adjacent elevations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryDrift {
    /// 1-based story number, counted upward
    pub story: usize,
    pub lower_elevation: f64,
    pub upper_elevation: f64,
    /// Story height in displacement units
    pub height: f64,
    /// Difference of average horizontal displacement [DX, DY]
    pub relative_displacement: [f64; 2],
    pub drift_ratio: f64,
    pub limit: f64,
    pub passes: bool,
}

/// Headline numbers for one load case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    /// Maximum translation magnitude
    pub max_displacement: f64,
    pub max_displacement_node: Option<usize>,
    /// Maximum reaction force magnitude
    pub max_reaction: f64,
    pub max_reaction_node: Option<usize>,
    pub max_axial: f64,
    pub max_axial_element: Option<usize>,
    pub max_moment: f64,
    pub max_moment_element: Option<usize>,
    pub num_nodes: usize,
    pub num_elements: usize,
    pub total_dofs: usize,
    pub drift_checks: usize,
    pub drift_failures: usize,
    pub status: SolveStatus,
}

impl Default for AnalysisSummary {
    fn default() -> Self {
        Self {
            max_displacement: 0.0,
            max_displacement_node: None,
            max_reaction: 0.0,
            max_reaction_node: None,
            max_axial: 0.0,
            max_axial_element: None,
            max_moment: 0.0,
            max_moment_element: None,
            num_nodes: 0,
            num_elements: 0,
            total_dofs: 0,
            drift_checks: 0,
            drift_failures: 0,
            status: SolveStatus::Solved,
        }
    }
}

/// Complete results for one load case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub case: String,
    pub status: SolveStatus,
    /// Six DOFs per node
    pub displacements: Vec<f64>,
    /// `K · d`, six DOFs per node
    pub reactions: Vec<f64>,
    pub element_forces: Vec<ElementForces>,
    pub joint_forces: BTreeMap<usize, JointForces>,
    /// Keyed by "Story N"
    pub story_drifts: BTreeMap<String, StoryDrift>,
    pub summary: AnalysisSummary,
}

impl AnalysisResult {
    fn node_slice(values: &[f64], node: usize) -> Option<[f64; 6]> {
        let base = node.checked_mul(6)?;
        let slice = values.get(base..base + 6)?;
        let mut out = [0.0; 6];
        out.copy_from_slice(slice);
        Some(out)
    }

    pub fn node_displacement(&self, node: usize) -> Option<NodeDisplacement> {
        Self::node_slice(&self.displacements, node).map(NodeDisplacement::from_array)
    }

    pub fn node_reactions(&self, node: usize) -> Option<Reactions> {
        Self::node_slice(&self.reactions, node).map(Reactions::from_array)
    }

    /// Drift records ordered by story number
    pub fn drifts_in_order(&self) -> Vec<&StoryDrift> {
        let mut drifts: Vec<&StoryDrift> = self.story_drifts.values().collect();
        drifts.sort_by_key(|d| d.story);
        drifts
    }
}
