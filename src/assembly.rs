//! Global system assembly
//!
//! Element stiffness matrices are scattered straight into a COO triplet
//! builder, symmetrized and converted to CSR. DOFs that no element touches
//! get a unit diagonal so the system stays non-singular.

use log::{debug, warn};
use nalgebra::DVector;
use nalgebra_sparse::CsrMatrix;

use crate::analysis::AnalysisOptions;
use crate::elements::{Element, FrameElement, Material, Node, ShellElement};
use crate::loads::LoadCase;
use crate::math::{self, Mat12, Mat24, SparseMatrixBuilder, Vec12};

/// Assembled stiffness matrix and force vector for one load case
#[derive(Debug, Clone)]
pub struct GlobalSystem {
    /// Symmetrized stiffness including the disconnected-DOF guard
    pub stiffness: CsrMatrix<f64>,
    pub forces: DVector<f64>,
    /// DOFs that received the unit guard diagonal
    pub guarded_dofs: Vec<usize>,
}

impl GlobalSystem {
    pub fn dof_count(&self) -> usize {
        self.forces.len()
    }

    /// Dense copy of the stiffness matrix
    pub fn to_dense(&self) -> math::Mat {
        nalgebra_sparse::convert::serial::convert_csr_dense(&self.stiffness)
    }

    /// Largest |K - Kᵀ| entry
    pub fn asymmetry(&self) -> f64 {
        let transpose = self.stiffness.transpose();
        let mut worst: f64 = 0.0;
        for (row, col, &value) in self.stiffness.triplet_iter() {
            let mirrored = transpose
                .get_entry(row, col)
                .map(|e| e.into_value())
                .unwrap_or(0.0);
            worst = worst.max((value - mirrored).abs());
        }
        worst
    }
}

/// Local stiffness and transformation of a beam-family element
pub fn frame_local_stiffness(
    nodes: &[Node],
    frame: &FrameElement,
    material: &Material,
) -> (Mat12, Mat12) {
    let i = nodes[frame.i_node].coords();
    let j = nodes[frame.j_node].coords();
    let length = math::member_length(&i, &j);
    let s = &frame.section;
    let k_local = math::member_local_stiffness(material.e, material.g(), s.a, s.iy, s.iz, s.j, length);
    (k_local, math::member_transformation_matrix(&i, &j))
}

/// Global 12x12 stiffness of a beam-family element, soil springs included for piles
pub fn frame_global_stiffness(
    nodes: &[Node],
    element: &Element,
    frame: &FrameElement,
    options: &AnalysisOptions,
) -> Mat12 {
    let (k_local, t) = frame_local_stiffness(nodes, frame, &options.material);
    let mut k_global = t.transpose() * k_local * t;

    if let Element::Pile(pile) = element {
        let length = nodes[pile.i_node].distance_to(&nodes[pile.j_node]);
        let diameter = pile.section.diameter.unwrap_or(pile.section.width);
        let springs: Vec12 = math::pile_soil_springs(
            options.subgrade_vertical,
            options.subgrade_horizontal,
            diameter,
            options.soil_spring_factor,
            length,
        );
        for d in 0..12 {
            k_global[(d, d)] += springs[d];
        }
    }
    k_global
}

/// Corner coordinates of a shell
pub fn shell_corners(nodes: &[Node], shell: &ShellElement) -> [[f64; 3]; 4] {
    shell.nodes.map(|n| nodes[n].coords())
}

/// 24x24 shell stiffness
pub fn shell_global_stiffness(nodes: &[Node], shell: &ShellElement, options: &AnalysisOptions) -> Mat24 {
    math::shell_stiffness(
        options.material.e,
        options.material.nu,
        shell.thickness,
        &shell_corners(nodes, shell),
        options.shell_stiffness_factor,
    )
}

fn frame_dofs(frame: &FrameElement) -> [usize; 12] {
    let (bi, bj) = (Node::base_dof(frame.i_node), Node::base_dof(frame.j_node));
    let mut dofs = [0usize; 12];
    for d in 0..6 {
        dofs[d] = bi + d;
        dofs[d + 6] = bj + d;
    }
    dofs
}

/// Assemble the symmetrized global stiffness of every element
///
/// Returns the matrix and the DOFs that received the unit guard diagonal.
pub fn assemble_stiffness(
    nodes: &[Node],
    elements: &[Element],
    options: &AnalysisOptions,
) -> (CsrMatrix<f64>, Vec<usize>) {
    let n_dofs = nodes.len() * 6;
    let mut raw = SparseMatrixBuilder::new(n_dofs);

    for element in elements {
        match element {
            Element::Shell(shell) => {
                let k = shell_global_stiffness(nodes, shell, options);
                // A repeated triangle corner is scattered once
                for (a, &na) in shell.nodes.iter().enumerate() {
                    if shell.nodes[..a].contains(&na) {
                        continue;
                    }
                    for (b, &nb) in shell.nodes.iter().enumerate() {
                        if shell.nodes[..b].contains(&nb) {
                            continue;
                        }
                        for r in 0..6 {
                            for c in 0..6 {
                                raw.add(
                                    Node::base_dof(na) + r,
                                    Node::base_dof(nb) + c,
                                    k[(a * 6 + r, b * 6 + c)],
                                );
                            }
                        }
                    }
                }
            }
            other => {
                if let Some(frame) = other.as_frame() {
                    let k = frame_global_stiffness(nodes, other, frame, options);
                    raw.add_element_matrix(&frame_dofs(frame), &k);
                }
            }
        }
    }

    // K = (K + Kᵀ) / 2
    let mut symmetric = SparseMatrixBuilder::new(n_dofs);
    let mut touched = vec![false; n_dofs];
    for &(row, col, value) in raw.entries() {
        symmetric.add(row, col, 0.5 * value);
        symmetric.add(col, row, 0.5 * value);
        touched[row] = true;
        touched[col] = true;
    }

    let guarded: Vec<usize> = (0..n_dofs).filter(|&d| !touched[d]).collect();
    for &dof in &guarded {
        symmetric.add(dof, dof, 1.0);
    }

    let csr = symmetric.to_csr();
    debug!(
        "Assembled {} DOFs, {} stored entries, {} guarded DOFs",
        n_dofs,
        csr.nnz(),
        guarded.len()
    );
    (csr, guarded)
}

/// Scatter a load case into a global force vector
///
/// Entries with an out-of-range node or a non-finite component are skipped.
pub fn assemble_forces(node_count: usize, case: &LoadCase) -> DVector<f64> {
    let mut forces = DVector::zeros(node_count * 6);
    for (idx, load) in case.loads.iter().enumerate() {
        if load.node >= node_count {
            warn!(
                "Load case '{}': entry {} targets node {} but the model has {} nodes; skipped",
                case.name, idx, load.node, node_count
            );
            continue;
        }
        let values = load.as_array();
        if values.iter().any(|v| !v.is_finite()) {
            warn!(
                "Load case '{}': entry {} has non-finite components; skipped",
                case.name, idx
            );
            continue;
        }
        let base = Node::base_dof(load.node);
        for (d, value) in values.iter().enumerate() {
            forces[base + d] += value;
        }
    }
    forces
}

/// Assemble the full system for one load case
pub fn assemble(
    nodes: &[Node],
    elements: &[Element],
    case: &LoadCase,
    options: &AnalysisOptions,
) -> GlobalSystem {
    let (stiffness, guarded_dofs) = assemble_stiffness(nodes, elements, options);
    GlobalSystem {
        stiffness,
        forces: assemble_forces(nodes.len(), case),
        guarded_dofs,
    }
}
