//! Structural model - mesh container and analysis driver

use std::collections::{BTreeMap, HashSet};

use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisOptions;
use crate::assembly::{self, shell_corners};
use crate::elements::{Element, ElementKind, Node, Support};
use crate::error::{FEAError, FEAResult};
use crate::loads::{LoadCase, LoadCombination, NodeLoad};
use crate::math;
use crate::mesh::{BuildingInput, LevelMesh, MeshGenerator};
use crate::postprocess;
use crate::results::AnalysisResult;
use crate::solver::{self, CancellationToken};

/// Nodes and elements of a meshed structure
///
/// Node ids are positions in `nodes`; the list is append-only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructuralModel {
    pub nodes: Vec<Node>,
    pub elements: Vec<Element>,
    /// Restraints keyed by node index
    #[serde(default)]
    pub supports: BTreeMap<usize, Support>,
    /// Per-level slab mesh summaries (empty for hand-built models)
    #[serde(default)]
    pub levels: Vec<LevelMesh>,
}

impl StructuralModel {
    /// Create a new empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Mesh a building description
    pub fn from_building(input: &BuildingInput, options: &AnalysisOptions) -> FEAResult<Self> {
        MeshGenerator::new(options).generate(input)
    }

    /// Append a node and return its index
    pub fn add_node(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Append an element; every node it references must already exist
    pub fn add_element(&mut self, element: Element) -> FEAResult<usize> {
        if let Some(&bad) = element.node_indices().iter().find(|&&n| n >= self.nodes.len()) {
            return Err(FEAError::NodeNotFound(bad));
        }
        self.elements.push(element);
        Ok(self.elements.len() - 1)
    }

    /// Add or replace the restraints of a node
    pub fn add_support(&mut self, node: usize, support: Support) -> FEAResult<()> {
        if node >= self.nodes.len() {
            return Err(FEAError::NodeNotFound(node));
        }
        self.supports.insert(node, support);
        Ok(())
    }

    /// Six DOFs per node
    pub fn dof_count(&self) -> usize {
        self.nodes.len() * 6
    }

    /// Number of elements of one kind
    pub fn count(&self, kind: ElementKind) -> usize {
        self.elements.iter().filter(|e| e.kind() == kind).count()
    }

    /// Check element connectivity and the analysis options
    pub fn validate(&self, options: &AnalysisOptions) -> FEAResult<()> {
        options.validate()?;
        let n = self.nodes.len();
        for (idx, element) in self.elements.iter().enumerate() {
            if let Some(bad) = element.node_indices().into_iter().find(|&node| node >= n) {
                return Err(FEAError::InvalidGeometry(format!(
                    "element {} references node {} but the model has {} nodes",
                    idx, bad, n
                )));
            }
            if let Element::Shell(shell) = element {
                if !(shell.thickness.is_finite() && shell.thickness > 0.0) {
                    return Err(FEAError::InvalidGeometry(format!(
                        "shell {} has thickness {}",
                        idx, shell.thickness
                    )));
                }
            }
        }
        for &node in self.supports.keys() {
            if node >= n {
                return Err(FEAError::NodeNotFound(node));
            }
        }
        Ok(())
    }

    /// Gravity load case from member and slab weights, acting in -Z
    ///
    /// Frame members put half of `A L ρ` on each end (links carry no weight);
    /// shells spread `t Area ρ` evenly over their distinct corners.
    pub fn self_weight(&self, options: &AnalysisOptions, name: &str) -> LoadCase {
        let density = options.material.density;
        let mut weights: BTreeMap<usize, f64> = BTreeMap::new();

        for element in &self.elements {
            match element {
                Element::Link(_) => {}
                Element::Shell(shell) => {
                    let area = math::quad_average_area(&shell_corners(&self.nodes, shell));
                    let corners = shell.distinct_nodes();
                    let share = shell.thickness * area * density / corners.len() as f64;
                    for node in corners {
                        *weights.entry(node).or_default() += share;
                    }
                }
                other => {
                    if let Some(frame) = other.as_frame() {
                        let length = self.nodes[frame.i_node].distance_to(&self.nodes[frame.j_node]);
                        let half = 0.5 * frame.section.a * length * density;
                        *weights.entry(frame.i_node).or_default() += half;
                        *weights.entry(frame.j_node).or_default() += half;
                    }
                }
            }
        }

        let mut case = LoadCase::new(name);
        for (node, weight) in weights {
            if weight != 0.0 {
                case.add_load(NodeLoad::force(node, 0.0, 0.0, -weight));
            }
        }
        case
    }

    /// Assemble, solve and post-process a single load case
    pub fn analyze_case(
        &self,
        case: &LoadCase,
        options: &AnalysisOptions,
        cancel: &CancellationToken,
    ) -> AnalysisResult {
        let system = assembly::assemble(&self.nodes, &self.elements, case, options);
        let solution = solver::solve(&system, &self.supports, options, cancel);
        let result = postprocess::process(self, &case.name, &system, solution, options);

        if result.status.is_degraded() {
            warn!(
                "Load case '{}' finished with status {:?}; displacements are zero",
                case.name, result.status
            );
        } else {
            info!(
                "Load case '{}' solved ({:?}): max displacement {:.4e} at node {:?}, {} of {} stories within drift limit",
                case.name,
                result.status,
                result.summary.max_displacement,
                result.summary.max_displacement_node,
                result.summary.drift_checks - result.summary.drift_failures,
                result.summary.drift_checks
            );
        }
        result
    }

    /// Analyze every load case; one failing case never stops the others
    pub fn analyze(
        &self,
        cases: &[LoadCase],
        options: &AnalysisOptions,
    ) -> FEAResult<BTreeMap<String, AnalysisResult>> {
        self.analyze_with_cancel(cases, options, &CancellationToken::new())
    }

    /// Analyze every load case, checking `cancel` before each case and in the dense fallback
    pub fn analyze_with_cancel(
        &self,
        cases: &[LoadCase],
        options: &AnalysisOptions,
        cancel: &CancellationToken,
    ) -> FEAResult<BTreeMap<String, AnalysisResult>> {
        self.validate(options)?;

        let mut names = HashSet::new();
        for case in cases {
            if !names.insert(case.name.as_str()) {
                return Err(FEAError::DuplicateName(case.name.clone()));
            }
        }

        info!(
            "Analyzing {} load case(s) on {} nodes / {} elements{}",
            cases.len(),
            self.nodes.len(),
            self.elements.len(),
            if options.parallel { " in parallel" } else { "" }
        );

        let run = |case: &LoadCase| (case.name.clone(), self.analyze_case(case, options, cancel));
        let results: Vec<(String, AnalysisResult)> = if options.parallel {
            cases.par_iter().map(run).collect()
        } else {
            cases.iter().map(run).collect()
        };

        Ok(results.into_iter().collect())
    }

    /// Combine load cases and analyze the combinations
    pub fn analyze_combinations(
        &self,
        cases: &[LoadCase],
        combinations: &[LoadCombination],
        options: &AnalysisOptions,
    ) -> FEAResult<BTreeMap<String, AnalysisResult>> {
        let combined = combinations
            .iter()
            .map(|combo| combo.combine(cases))
            .collect::<FEAResult<Vec<LoadCase>>>()?;
        self.analyze(&combined, options)
    }
}
