//! Result recovery: reactions, member forces, joint sums and story drift

use std::collections::{BTreeMap, HashSet};

use nalgebra::DVector;

use crate::analysis::AnalysisOptions;
use crate::assembly::{frame_local_stiffness, GlobalSystem};
use crate::elements::{Element, ElementKind, Material, Node};
use crate::math::{self, Vec12};
use crate::model::StructuralModel;
use crate::results::{AnalysisResult, AnalysisSummary, ElementForces, JointForces, StoryDrift};
use crate::solver::Solution;

/// Reactions `K · d` with the assembled (pre-regularization) stiffness
pub fn reactions(system: &GlobalSystem, displacements: &DVector<f64>) -> DVector<f64> {
    math::sparse_matvec(&system.stiffness, displacements)
}

fn element_displacements(displacements: &DVector<f64>, i_node: usize, j_node: usize) -> Vec12 {
    let (bi, bj) = (Node::base_dof(i_node), Node::base_dof(j_node));
    Vec12::from_fn(|r, _| {
        if r < 6 {
            displacements[bi + r]
        } else {
            displacements[bj + r - 6]
        }
    })
}

/// Local end forces of every beam-family element
pub fn element_forces(
    nodes: &[Node],
    elements: &[Element],
    displacements: &DVector<f64>,
    material: &Material,
) -> Vec<ElementForces> {
    let mut forces = Vec::new();
    for (idx, element) in elements.iter().enumerate() {
        let Some(frame) = element.as_frame() else {
            continue;
        };
        let (k_local, t) = frame_local_stiffness(nodes, frame, material);
        let d_global = element_displacements(displacements, frame.i_node, frame.j_node);
        let f_local = k_local * (t * d_global);

        let mut local = [0.0; 12];
        local.copy_from_slice(f_local.as_slice());
        forces.push(ElementForces::from_local(
            idx,
            element.kind(),
            frame.i_node,
            frame.j_node,
            local,
        ));
    }
    forces
}

/// Member end forces rotated to global axes and summed per node, plus reactions
pub fn joint_forces(
    nodes: &[Node],
    forces: &[ElementForces],
    reactions: &DVector<f64>,
) -> BTreeMap<usize, JointForces> {
    let mut joints: BTreeMap<usize, JointForces> = BTreeMap::new();

    for member in forces {
        let t = math::member_transformation_matrix(
            &nodes[member.i_node].coords(),
            &nodes[member.j_node].coords(),
        );
        let f_global = t.transpose() * Vec12::from_column_slice(&member.local);

        let ends = [
            (member.i_node, 0, member.shear_i, member.moment_i),
            (member.j_node, 6, member.shear_j, member.moment_j),
        ];
        for (node, offset, shear, moment) in ends {
            let joint = joints.entry(node).or_default();
            for d in 0..6 {
                joint.forces[d] += f_global[offset + d];
            }
            joint.max_shear = joint.max_shear.max(shear);
            joint.max_moment = joint.max_moment.max(moment);
            joint.members += 1;
        }
    }

    for (&node, joint) in joints.iter_mut() {
        let base = Node::base_dof(node);
        for d in 0..6 {
            joint.forces[d] += reactions[base + d];
        }
        let f = &joint.forces;
        joint.force_resultant = (f[0].powi(2) + f[1].powi(2) + f[2].powi(2)).sqrt();
        joint.moment_resultant = (f[3].powi(2) + f[4].powi(2) + f[5].powi(2)).sqrt();
    }
    joints
}

/// Nodes used by at least one element
pub fn referenced_nodes(elements: &[Element]) -> HashSet<usize> {
    elements.iter().flat_map(|e| e.node_indices()).collect()
}

/// Story drift between every pair of adjacent distinct elevations
///
/// Nodes are grouped by exact elevation; nodes no element references are ignored.
pub fn story_drifts(
    nodes: &[Node],
    elements: &[Element],
    displacements: &DVector<f64>,
    options: &AnalysisOptions,
) -> BTreeMap<String, StoryDrift> {
    let referenced = referenced_nodes(elements);
    let mut samples: Vec<(f64, f64, f64)> = nodes
        .iter()
        .enumerate()
        .filter(|(idx, _)| referenced.contains(idx))
        .map(|(idx, node)| {
            let base = Node::base_dof(idx);
            (node.z, displacements[base], displacements[base + 1])
        })
        .collect();
    samples.sort_by(|a, b| a.0.total_cmp(&b.0));

    // (elevation, average DX, average DY)
    let mut floors: Vec<(f64, f64, f64)> = Vec::new();
    let mut start = 0;
    while start < samples.len() {
        let z = samples[start].0;
        let mut end = start;
        let (mut sx, mut sy) = (0.0, 0.0);
        while end < samples.len() && samples[end].0.total_cmp(&z).is_eq() {
            sx += samples[end].1;
            sy += samples[end].2;
            end += 1;
        }
        let count = (end - start) as f64;
        floors.push((z, sx / count, sy / count));
        start = end;
    }

    let mut drifts = BTreeMap::new();
    for (story, pair) in floors.windows(2).enumerate() {
        let (lower, upper) = (pair[0], pair[1]);
        let height = (upper.0 - lower.0) * options.story_height_factor;
        let relative = [upper.1 - lower.1, upper.2 - lower.2];
        let drift_ratio = relative[0].hypot(relative[1]) / height;
        let number = story + 1;
        drifts.insert(
            format!("Story {}", number),
            StoryDrift {
                story: number,
                lower_elevation: lower.0,
                upper_elevation: upper.0,
                height,
                relative_displacement: relative,
                drift_ratio,
                limit: options.drift_limit,
                passes: drift_ratio <= options.drift_limit,
            },
        );
    }
    drifts
}

/// Headline numbers; links are not physical members and are left out of the force maxima
pub fn summarize(model: &StructuralModel, result: &AnalysisResult) -> AnalysisSummary {
    let mut summary = AnalysisSummary {
        num_nodes: model.nodes.len(),
        num_elements: model.elements.len(),
        total_dofs: model.dof_count(),
        status: result.status,
        ..AnalysisSummary::default()
    };

    for node in 0..model.nodes.len() {
        if let Some(d) = result.node_displacement(node) {
            let magnitude = d.translation_magnitude();
            if magnitude > summary.max_displacement {
                summary.max_displacement = magnitude;
                summary.max_displacement_node = Some(node);
            }
        }
        if let Some(r) = result.node_reactions(node) {
            let magnitude = r.force_magnitude();
            if model.supports.contains_key(&node) && magnitude > summary.max_reaction {
                summary.max_reaction = magnitude;
                summary.max_reaction_node = Some(node);
            }
        }
    }

    for forces in result.element_forces.iter().filter(|f| f.kind != ElementKind::Link) {
        if forces.max_axial() > summary.max_axial {
            summary.max_axial = forces.max_axial();
            summary.max_axial_element = Some(forces.element);
        }
        if forces.max_moment() > summary.max_moment {
            summary.max_moment = forces.max_moment();
            summary.max_moment_element = Some(forces.element);
        }
    }

    summary.drift_checks = result.story_drifts.len();
    summary.drift_failures = result.story_drifts.values().filter(|d| !d.passes).count();
    summary
}

/// Build the full result record of one solved load case
pub fn process(
    model: &StructuralModel,
    case: &str,
    system: &GlobalSystem,
    solution: Solution,
    options: &AnalysisOptions,
) -> AnalysisResult {
    let d = solution.displacements;
    let r = reactions(system, &d);
    let forces = element_forces(&model.nodes, &model.elements, &d, &options.material);
    let joints = joint_forces(&model.nodes, &forces, &r);
    let drifts = story_drifts(&model.nodes, &model.elements, &d, options);

    let mut result = AnalysisResult {
        case: case.to_string(),
        status: solution.status,
        displacements: d.iter().copied().collect(),
        reactions: r.iter().copied().collect(),
        element_forces: forces,
        joint_forces: joints,
        story_drifts: drifts,
        summary: AnalysisSummary::default(),
    };
    result.summary = summarize(model, &result);
    result
}
