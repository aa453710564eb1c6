//! Mesh generation for building structures
//!
//! Turns slab boundaries, piles, columns and beams into a single node and
//! element list. Node indices are assigned in a fixed order (piles, columns,
//! beams, slabs, connectivity) so identical input always produces an
//! identical mesh.

mod connect;
pub mod grid;
pub mod input;
pub mod polygon;
pub mod triangulate;

use std::collections::BTreeMap;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisOptions;
use crate::elements::{Element, ElementKind, FrameElement, FrameSection, Node};
use crate::error::{FEAError, FEAResult};
use crate::model::StructuralModel;

pub use grid::{LevelMesh, SlabGrid};
pub use input::{BeamSpec, BuildingInput, ColumnSpec, PileSpec, SlabLevel, SlabVertex};

/// Thickness used when a slab gives no positive vertex thickness
pub const DEFAULT_SLAB_THICKNESS: f64 = 1.0;

/// What placed an attachment point on a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttachmentKind {
    Pile,
    Column,
    Beam,
    BeamCrossing,
}

/// A node of a vertical or beam element waiting to be coupled to a slab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub node: usize,
    pub level: usize,
    pub kind: AttachmentKind,
}

/// Builds a [`StructuralModel`] from a [`BuildingInput`]
#[derive(Debug, Clone)]
pub struct MeshGenerator {
    options: AnalysisOptions,
}

/// Mesh under construction
#[derive(Debug, Default)]
pub(crate) struct MeshState {
    pub nodes: Vec<Node>,
    pub elements: Vec<Element>,
    pub levels: Vec<LevelMesh>,
    pub attachments: Vec<Attachment>,
    /// (element index, i-node, j-node) of every input beam
    pub beams: Vec<(usize, usize, usize)>,
}

impl MeshState {
    pub fn push_node(&mut self, x: f64, y: f64, z: f64) -> usize {
        self.nodes.push(Node::new(x, y, z));
        self.nodes.len() - 1
    }
}

impl MeshGenerator {
    pub fn new(options: &AnalysisOptions) -> Self {
        Self {
            options: options.clone(),
        }
    }

    /// Generate the structural model for `input`
    pub fn generate(&self, input: &BuildingInput) -> FEAResult<StructuralModel> {
        self.options.validate()?;
        validate_input(input)?;

        let elevations: Vec<Option<f64>> = input.levels.iter().map(|l| l.elevation()).collect();
        let mut state = MeshState::default();

        self.add_piles(input, &elevations, &mut state);
        self.add_columns(input, &elevations, &mut state);
        self.add_beams(input, &elevations, &mut state);
        debug!(
            "Frame pass: {} nodes, {} elements, {} attachments",
            state.nodes.len(),
            state.elements.len(),
            state.attachments.len()
        );

        for level in &input.levels {
            let mesh = grid::mesh_slab(
                level,
                self.options.mesh_size,
                DEFAULT_SLAB_THICKNESS,
                &mut state.nodes,
                &mut state.elements,
            );
            state.levels.push(mesh);
        }

        connect::split_beams(&self.options, &mut state);
        let links = connect::connect_attachments(&self.options, &mut state);

        let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
        for element in &state.elements {
            let label = match element.kind() {
                ElementKind::Beam => "beams",
                ElementKind::Column => "columns",
                ElementKind::Pile => "piles",
                ElementKind::Link => "links",
                ElementKind::Shell => "shells",
            };
            *counts.entry(label).or_default() += 1;
        }
        info!(
            "Generated mesh: {} nodes, {} elements {:?} ({} links created)",
            state.nodes.len(),
            state.elements.len(),
            counts,
            links
        );

        Ok(StructuralModel {
            nodes: state.nodes,
            elements: state.elements,
            supports: BTreeMap::new(),
            levels: state.levels,
        })
    }

    /// Closest level to `z` within the level tolerance; ties go to the first level
    fn nearest_level(&self, elevations: &[Option<f64>], z: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, elevation) in elevations.iter().enumerate() {
            let Some(elevation) = elevation else {
                continue;
            };
            let gap = (elevation - z).abs();
            if gap > self.options.level_tolerance {
                continue;
            }
            if best.map_or(true, |(_, g)| gap < g) {
                best = Some((idx, gap));
            }
        }
        best.map(|(idx, _)| idx)
    }

    fn add_piles(&self, input: &BuildingInput, elevations: &[Option<f64>], state: &mut MeshState) {
        for pile in &input.piles {
            let top = state.push_node(pile.x, pile.y, pile.top_z);
            let bottom = state.push_node(pile.x, pile.y, pile.bottom_z);
            state.elements.push(Element::Pile(FrameElement::new(
                top,
                bottom,
                FrameSection::circular(pile.diameter),
            )));

            if let Some(level) = self.nearest_level(elevations, pile.top_z) {
                state.attachments.push(Attachment {
                    node: top,
                    level,
                    kind: AttachmentKind::Pile,
                });
            }
        }
    }

    fn add_columns(&self, input: &BuildingInput, elevations: &[Option<f64>], state: &mut MeshState) {
        let tol = self.options.coincidence_tolerance;

        for column in &input.columns {
            let (width, depth) = column.dimensions();
            let section = FrameSection::rectangular(width, depth);
            let (z0, z1) = if column.z_bottom <= column.z_top {
                (column.z_bottom, column.z_top)
            } else {
                (column.z_top, column.z_bottom)
            };

            let bottom = state.push_node(column.x, column.y, z0);
            let top = state.push_node(column.x, column.y, z1);
            let mut chain = vec![(z0, bottom), (z1, top)];

            for (level, elevation) in elevations.iter().enumerate() {
                let Some(elevation) = *elevation else {
                    continue;
                };
                if elevation < z0 - tol || elevation > z1 + tol {
                    continue;
                }
                let node = if (elevation - z0).abs() <= tol {
                    bottom
                } else if (elevation - z1).abs() <= tol {
                    top
                } else {
                    let node = state.push_node(column.x, column.y, elevation);
                    chain.push((elevation, node));
                    node
                };
                state.attachments.push(Attachment {
                    node,
                    level,
                    kind: AttachmentKind::Column,
                });
            }

            chain.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
            for pair in chain.windows(2) {
                state
                    .elements
                    .push(Element::Column(FrameElement::new(pair[0].1, pair[1].1, section)));
            }
        }
    }

    fn add_beams(&self, input: &BuildingInput, elevations: &[Option<f64>], state: &mut MeshState) {
        for beam in &input.beams {
            let [x0, y0, z0] = beam.start;
            let [x1, y1, z1] = beam.end;
            let i = state.push_node(x0, y0, z0);
            let j = state.push_node(x1, y1, z1);

            state.beams.push((state.elements.len(), i, j));
            state.elements.push(Element::Beam(FrameElement::new(
                i,
                j,
                FrameSection::rectangular(beam.width, beam.depth),
            )));

            for (node, z) in [(i, z0), (j, z1)] {
                if let Some(level) = self.nearest_level(elevations, z) {
                    state.attachments.push(Attachment {
                        node,
                        level,
                        kind: AttachmentKind::Beam,
                    });
                }
            }
        }
    }
}

fn validate_input(input: &BuildingInput) -> FEAResult<()> {
    let finite = |values: &[f64]| values.iter().all(|v| v.is_finite());

    for level in &input.levels {
        if let Some(idx) = level
            .vertices
            .iter()
            .position(|v| !finite(&[v.x, v.y, v.z, v.thickness]))
        {
            return Err(FEAError::InvalidGeometry(format!(
                "slab level '{}' vertex {} has non-finite values",
                level.name, idx
            )));
        }
    }
    for (idx, pile) in input.piles.iter().enumerate() {
        if !finite(&[pile.x, pile.y, pile.top_z, pile.bottom_z, pile.diameter]) {
            return Err(FEAError::InvalidGeometry(format!(
                "pile {} has non-finite coordinates",
                idx
            )));
        }
    }
    for (idx, column) in input.columns.iter().enumerate() {
        if !finite(&[column.x, column.y, column.z_bottom, column.z_top]) {
            return Err(FEAError::InvalidGeometry(format!(
                "column {} has non-finite coordinates",
                idx
            )));
        }
    }
    for (idx, beam) in input.beams.iter().enumerate() {
        if !finite(&beam.start) || !finite(&beam.end) {
            return Err(FEAError::InvalidGeometry(format!(
                "beam {} has non-finite coordinates",
                idx
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_level_building() -> BuildingInput {
        BuildingInput {
            levels: vec![
                SlabLevel::rectangle("Mat", 0.0, 0.0, 20.0, 20.0, 0.0, 2.0),
                SlabLevel::rectangle("Top", 0.0, 0.0, 20.0, 20.0, 12.0, 0.75),
            ],
            piles: vec![PileSpec::new(5.0, 5.0, 0.0, -30.0, 1.5)],
            columns: vec![
                ColumnSpec::new(1.0, 1.0, 0.0, 12.0, 1.5, 1.5),
                ColumnSpec::square(19.0, 19.0, 0.0, 12.0, 1.5),
            ],
            beams: vec![BeamSpec::new([1.0, 1.0, 12.0], [19.0, 1.0, 12.0], 1.0, 2.0)],
        }
    }

    #[test]
    fn test_slab_only_counts() {
        let input = BuildingInput {
            levels: vec![SlabLevel::rectangle("Mat", 0.0, 0.0, 20.0, 20.0, 0.0, 1.0)],
            ..Default::default()
        };
        let model = MeshGenerator::new(&AnalysisOptions::default()).generate(&input).unwrap();

        assert_eq!(model.nodes.len(), 121);
        assert_eq!(model.elements.len(), 100);
        assert_eq!(model.levels[0].quads, 100);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let generator = MeshGenerator::new(&AnalysisOptions::default());
        let a = generator.generate(&two_level_building()).unwrap();
        let b = generator.generate(&two_level_building()).unwrap();

        assert_eq!(a.nodes, b.nodes);
        assert_eq!(a.elements, b.elements);
    }

    #[test]
    fn test_pile_nodes_come_first() {
        let model = MeshGenerator::new(&AnalysisOptions::default())
            .generate(&two_level_building())
            .unwrap();

        assert_eq!(model.nodes[0], Node::new(5.0, 5.0, 0.0));
        assert_eq!(model.nodes[1], Node::new(5.0, 5.0, -30.0));
        let pile = model
            .elements
            .iter()
            .find(|e| e.kind() == ElementKind::Pile)
            .and_then(|e| e.as_frame())
            .unwrap();
        // Pile top sits on the (4, 4) / (6, 6) grid cell, off every grid node
        assert_eq!(pile.j_node, 1);
        assert_eq!(pile.section.diameter, Some(1.5));
    }

    #[test]
    fn test_column_spanning_levels_is_chained() {
        let input = BuildingInput {
            levels: vec![
                SlabLevel::rectangle("Mat", 0.0, 0.0, 10.0, 10.0, 0.0, 1.0),
                SlabLevel::rectangle("Mezz", 0.0, 0.0, 10.0, 10.0, 6.0, 0.5),
                SlabLevel::rectangle("Top", 0.0, 0.0, 10.0, 10.0, 12.0, 0.5),
            ],
            columns: vec![ColumnSpec::new(4.0, 4.0, 0.0, 12.0, 1.0, 1.0)],
            ..Default::default()
        };
        let model = MeshGenerator::new(&AnalysisOptions::default()).generate(&input).unwrap();

        let columns: Vec<&FrameElement> = model
            .elements
            .iter()
            .filter(|e| e.kind() == ElementKind::Column)
            .filter_map(|e| e.as_frame())
            .collect();
        assert_eq!(columns.len(), 2);

        // Every column end merges into a slab grid node at (4, 4)
        for column in &columns {
            for node in [column.i_node, column.j_node] {
                let n = model.nodes[node];
                assert_eq!((n.x, n.y), (4.0, 4.0));
                assert!(node > 2, "column end {} should be redirected to a slab node", node);
            }
        }
        let z: Vec<f64> = columns
            .iter()
            .flat_map(|c| [model.nodes[c.i_node].z, model.nodes[c.j_node].z])
            .collect();
        assert_eq!(z, vec![0.0, 6.0, 6.0, 12.0]);
        assert!(model.elements.iter().all(|e| e.kind() != ElementKind::Link));
    }

    #[test]
    fn test_off_grid_attachment_is_linked() {
        let model = MeshGenerator::new(&AnalysisOptions::default())
            .generate(&two_level_building())
            .unwrap();

        // Column at (1, 1) is 1.41 from the nearest grid node in plan
        let links: Vec<&FrameElement> = model
            .elements
            .iter()
            .filter(|e| e.kind() == ElementKind::Link)
            .filter_map(|e| e.as_frame())
            .collect();
        assert!(!links.is_empty());
        for link in &links {
            assert_ne!(link.i_node, link.j_node);
            assert!(link.i_node < model.nodes.len() && link.j_node < model.nodes.len());
        }
        let mut pairs: Vec<(usize, usize)> = links
            .iter()
            .map(|l| (l.i_node.min(l.j_node), l.i_node.max(l.j_node)))
            .collect();
        let before = pairs.len();
        pairs.sort_unstable();
        pairs.dedup();
        assert_eq!(pairs.len(), before, "duplicate links created");
    }

    #[test]
    fn test_beam_through_slab_is_split() {
        let input = BuildingInput {
            levels: vec![SlabLevel::rectangle("Mezz", 0.0, 0.0, 10.0, 10.0, 6.0, 0.5)],
            beams: vec![BeamSpec::new([4.0, 4.0, 0.0], [4.0, 4.0, 12.0], 1.0, 1.0)],
            ..Default::default()
        };
        let model = MeshGenerator::new(&AnalysisOptions::default()).generate(&input).unwrap();

        let beams: Vec<&FrameElement> = model
            .elements
            .iter()
            .filter(|e| e.kind() == ElementKind::Beam)
            .filter_map(|e| e.as_frame())
            .collect();
        assert_eq!(beams.len(), 2);
        assert_eq!(beams[0].i_node, 0);
        assert_eq!(beams[1].j_node, 1);
        // Crossing point coincides with slab node (4, 4, 6)
        let shared = model.nodes[beams[0].j_node];
        assert_eq!(shared, Node::new(4.0, 4.0, 6.0));
        assert_eq!(beams[0].j_node, beams[1].i_node);
    }

    #[test]
    fn test_rejects_non_finite_geometry() {
        let input = BuildingInput {
            piles: vec![PileSpec::new(f64::NAN, 0.0, 0.0, -10.0, 1.0)],
            ..Default::default()
        };
        assert!(MeshGenerator::new(&AnalysisOptions::default()).generate(&input).is_err());
    }

    #[test]
    fn test_non_finite_slab_vertex_is_rejected() {
        let mut level = SlabLevel::rectangle("Top", 0.0, 0.0, 10.0, 10.0, 12.0, 0.75);
        for vertex in level.vertices.iter_mut() {
            vertex.z = f64::NAN;
        }
        let input = BuildingInput {
            levels: vec![level],
            ..Default::default()
        };
        let result = MeshGenerator::new(&AnalysisOptions::default()).generate(&input);
        assert!(matches!(result, Err(FEAError::InvalidGeometry(_))));

        let mut level = SlabLevel::rectangle("Mat", 0.0, 0.0, 10.0, 10.0, 0.0, 2.0);
        level.vertices[2].thickness = f64::INFINITY;
        let input = BuildingInput {
            levels: vec![level],
            ..Default::default()
        };
        let result = MeshGenerator::new(&AnalysisOptions::default()).generate(&input);
        assert!(matches!(result, Err(FEAError::InvalidGeometry(_))));
    }
}
