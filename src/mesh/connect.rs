//! Coupling of piles, columns and beams to the slab meshes

use std::collections::{HashMap, HashSet};

use log::debug;

use super::{Attachment, AttachmentKind, MeshState};
use crate::analysis::AnalysisOptions;
use crate::elements::{Element, FrameElement};

/// Split every beam that passes through a meshed level away from its ends
///
/// The original beam is removed and its sub-elements are appended, ordered
/// from the i-node to the j-node. Each crossing node becomes an attachment.
pub(super) fn split_beams(options: &AnalysisOptions, state: &mut MeshState) {
    let tol = options.level_tolerance;
    let mut removed: HashSet<usize> = HashSet::new();
    let mut chains: Vec<Element> = Vec::new();

    let beams = std::mem::take(&mut state.beams);
    for &(element_idx, i, j) in &beams {
        let Some(section) = state.elements[element_idx].as_frame().map(|f| f.section) else {
            continue;
        };
        let (start, end) = (state.nodes[i], state.nodes[j]);
        let (lo, hi) = (start.z.min(end.z), start.z.max(end.z));

        let mut crossings: Vec<(f64, usize)> = Vec::new();
        for (level_idx, level) in state.levels.iter().enumerate() {
            if level.is_empty() {
                continue;
            }
            let z = level.elevation;
            if z <= lo + tol || z >= hi - tol {
                continue;
            }
            let t = (z - start.z) / (end.z - start.z);
            crossings.push((t, level_idx));
        }
        if crossings.is_empty() {
            continue;
        }
        crossings.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut previous = i;
        for &(t, level) in &crossings {
            let z = state.levels[level].elevation;
            let node = state.push_node(
                start.x + t * (end.x - start.x),
                start.y + t * (end.y - start.y),
                z,
            );
            chains.push(Element::Beam(FrameElement::new(previous, node, section)));
            state.attachments.push(Attachment {
                node,
                level,
                kind: AttachmentKind::BeamCrossing,
            });
            previous = node;
        }
        chains.push(Element::Beam(FrameElement::new(previous, j, section)));
        removed.insert(element_idx);

        debug!(
            "Beam {} split at {} level crossing(s)",
            element_idx,
            crossings.len()
        );
    }
    state.beams = beams;

    if removed.is_empty() {
        return;
    }
    let elements = std::mem::take(&mut state.elements);
    state.elements = elements
        .into_iter()
        .enumerate()
        .filter(|(idx, _)| !removed.contains(idx))
        .map(|(_, element)| element)
        .chain(chains)
        .collect();
}

/// Merge or link every attachment to its level's slab mesh
///
/// Returns the number of links created.
pub(super) fn connect_attachments(options: &AnalysisOptions, state: &mut MeshState) -> usize {
    let coincident = options.coincidence_tolerance;
    let mut redirect: HashMap<usize, usize> = HashMap::new();
    let mut linked: HashSet<(usize, usize)> = HashSet::new();
    // (attachment node, level) -> node created at slab elevation
    let mut level_nodes: HashMap<(usize, usize), usize> = HashMap::new();
    let mut links: Vec<Element> = Vec::new();

    let mut add_link = |a: usize, b: usize, links: &mut Vec<Element>| {
        let key = (a.min(b), a.max(b));
        if a != b && linked.insert(key) {
            links.push(Element::Link(FrameElement::new(a, b, options.link_section)));
        }
    };

    let attachments = state.attachments.clone();
    for attachment in &attachments {
        let node = *redirect.get(&attachment.node).unwrap_or(&attachment.node);
        let point = state.nodes[node];
        let level = &state.levels[attachment.level];
        if level.is_empty() {
            continue;
        }
        let elevation = level.elevation;
        let nearest = level
            .grid
            .nearest(&state.nodes, point.x, point.y, options.link_search_radius);

        if let Some((slab_node, _)) = nearest {
            if point.distance_to(&state.nodes[slab_node]) <= coincident {
                if node != slab_node {
                    redirect.insert(attachment.node, slab_node);
                }
                continue;
            }
        }

        // Off-level points reach the slab through a node at slab elevation
        let anchor = if (point.z - elevation).abs() > coincident {
            match nearest {
                Some((_, plan_distance)) if plan_distance <= coincident => node,
                _ => {
                    let level_node = match level_nodes.get(&(node, attachment.level)) {
                        Some(&existing) => existing,
                        None => {
                            let created = state.push_node(point.x, point.y, elevation);
                            level_nodes.insert((node, attachment.level), created);
                            created
                        }
                    };
                    add_link(node, level_node, &mut links);
                    level_node
                }
            }
        } else {
            node
        };

        match nearest {
            Some((slab_node, _)) => add_link(anchor, slab_node, &mut links),
            None => debug!(
                "{:?} attachment at node {} has no slab node on '{}' within {}",
                attachment.kind,
                node,
                state.levels[attachment.level].name,
                options.link_search_radius
            ),
        }
    }

    let created = links.len();
    state.elements.extend(links);

    if !redirect.is_empty() {
        for element in state.elements.iter_mut() {
            if let Some(frame) = element.as_frame_mut() {
                if let Some(&target) = redirect.get(&frame.i_node) {
                    frame.i_node = target;
                }
                if let Some(&target) = redirect.get(&frame.j_node) {
                    frame.j_node = target;
                }
            }
        }
        // Members collapsed onto a single slab node carry no stiffness
        state
            .elements
            .retain(|e| e.as_frame().map_or(true, |f| f.i_node != f.j_node));
        debug!("Merged {} attachment node(s) into slab nodes", redirect.len());
    }

    created
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::ElementKind;
    use crate::mesh::grid::mesh_slab;
    use crate::mesh::input::SlabLevel;

    // 10 x 10 slab at z = 12 on a 2.0 grid: nodes 0..36
    fn top_slab() -> MeshState {
        let mut state = MeshState::default();
        let level = SlabLevel::rectangle("Top", 0.0, 0.0, 10.0, 10.0, 12.0, 0.5);
        let mesh = mesh_slab(&level, 2.0, 1.0, &mut state.nodes, &mut state.elements);
        state.levels.push(mesh);
        state
    }

    fn attach(state: &mut MeshState, node: usize, kind: AttachmentKind) {
        state.attachments.push(Attachment { node, level: 0, kind });
    }

    fn links(state: &MeshState) -> Vec<(usize, usize)> {
        state
            .elements
            .iter()
            .filter(|e| e.kind() == ElementKind::Link)
            .filter_map(|e| e.as_frame())
            .map(|f| (f.i_node, f.j_node))
            .collect()
    }

    #[test]
    fn test_off_level_point_outside_slab_gets_level_node() {
        let mut state = top_slab();
        assert_eq!(state.nodes.len(), 36);
        let beam_end = state.push_node(30.0, 30.0, 12.5);
        attach(&mut state, beam_end, AttachmentKind::Beam);

        let created = connect_attachments(&AnalysisOptions::default(), &mut state);

        assert_eq!(created, 1);
        assert_eq!(state.nodes.len(), 38);
        let level_node = state.nodes[37];
        assert_eq!((level_node.x, level_node.y, level_node.z), (30.0, 30.0, 12.0));
        assert_eq!(links(&state), vec![(beam_end, 37)]);
    }

    #[test]
    fn test_on_level_point_outside_slab_is_left_alone() {
        let mut state = top_slab();
        let beam_end = state.push_node(30.0, 30.0, 12.0);
        attach(&mut state, beam_end, AttachmentKind::Beam);

        assert_eq!(connect_attachments(&AnalysisOptions::default(), &mut state), 0);
        assert_eq!(state.nodes.len(), 37);
    }

    #[test]
    fn test_repeated_attachment_links_once() {
        let mut state = top_slab();
        // 1.41 from the grid nodes at (0, 0) and (2, 2); the lower index wins
        let column_top = state.push_node(1.0, 1.0, 12.0);
        attach(&mut state, column_top, AttachmentKind::Column);
        attach(&mut state, column_top, AttachmentKind::Beam);

        let created = connect_attachments(&AnalysisOptions::default(), &mut state);

        assert_eq!(created, 1);
        assert_eq!(links(&state), vec![(column_top, 0)]);
    }

    #[test]
    fn test_repeated_off_level_attachment_reuses_level_node() {
        let mut state = top_slab();
        let pile_top = state.push_node(1.0, 1.0, 12.5);
        attach(&mut state, pile_top, AttachmentKind::Pile);
        attach(&mut state, pile_top, AttachmentKind::Column);

        let created = connect_attachments(&AnalysisOptions::default(), &mut state);

        // pile top -> level node -> slab node, each once
        assert_eq!(created, 2);
        assert_eq!(state.nodes.len(), 38);
        assert_eq!(links(&state), vec![(pile_top, 37), (37, 0)]);
    }

    #[test]
    fn test_coincident_attachment_is_merged() {
        let mut state = top_slab();
        let column_top = state.push_node(4.05, 4.0, 12.0);
        let column_bottom = state.push_node(4.05, 4.0, 0.0);
        state.elements.push(Element::Column(FrameElement::new(
            column_bottom,
            column_top,
            crate::elements::FrameSection::rectangular(1.0, 1.0),
        )));
        attach(&mut state, column_top, AttachmentKind::Column);

        assert_eq!(connect_attachments(&AnalysisOptions::default(), &mut state), 0);
        let column = state
            .elements
            .iter()
            .find(|e| e.kind() == ElementKind::Column)
            .and_then(|e| e.as_frame())
            .unwrap();
        // grid node (4, 4) is index 2 * 6 + 2
        assert_eq!((column.i_node, column.j_node), (column_bottom, 14));
    }
}
