//! Structured slab grid over a boundary polygon

use std::collections::HashMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::input::SlabLevel;
use super::polygon::{orient, point_in_polygon};
use super::triangulate;
use crate::elements::{Element, Node, ShellElement};

/// Quads with signed area at or below this are rejected
const MIN_QUAD_AREA: f64 = 1e-9;

/// Grid of slab nodes keyed by (i, j) intersection indices
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlabGrid {
    pub origin: (f64, f64),
    pub spacing: f64,
    pub elevation: f64,
    nodes: HashMap<(i64, i64), usize>,
}

impl SlabGrid {
    fn new(origin: (f64, f64), spacing: f64, elevation: f64) -> Self {
        Self {
            origin,
            spacing,
            elevation,
            nodes: HashMap::new(),
        }
    }

    /// Node index at grid intersection (i, j), if inside the slab
    pub fn node_at(&self, i: i64, j: i64) -> Option<usize> {
        self.nodes.get(&(i, j)).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nearest slab node to (x, y) in plan within `radius`
    ///
    /// Ties go to the lower node index.
    pub fn nearest(&self, nodes: &[Node], x: f64, y: f64, radius: f64) -> Option<(usize, f64)> {
        if self.nodes.is_empty() || self.spacing <= 0.0 {
            return None;
        }
        let ci = ((x - self.origin.0) / self.spacing).round() as i64;
        let cj = ((y - self.origin.1) / self.spacing).round() as i64;
        let reach = (radius / self.spacing).ceil() as i64 + 1;

        let target = Node::new(x, y, self.elevation);
        let mut best: Option<(usize, f64)> = None;
        for i in (ci - reach)..=(ci + reach) {
            for j in (cj - reach)..=(cj + reach) {
                let Some(idx) = self.node_at(i, j) else {
                    continue;
                };
                let dist = nodes[idx].plan_distance_to(&target);
                if dist > radius {
                    continue;
                }
                let better = match best {
                    None => true,
                    Some((b_idx, b_dist)) => dist < b_dist || (dist == b_dist && idx < b_idx),
                };
                if better {
                    best = Some((idx, dist));
                }
            }
        }
        best
    }
}

/// Mesh of one slab level
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelMesh {
    pub name: String,
    pub elevation: f64,
    pub thickness: f64,
    /// Slab node indices in creation order
    pub nodes: Vec<usize>,
    pub quads: usize,
    pub triangles: usize,
    /// Set when the quad grid failed and the fallback triangulation was used
    pub triangulated: bool,
    #[serde(skip)]
    pub grid: SlabGrid,
}

impl LevelMesh {
    /// Levels without any shell element contribute no slab stiffness
    pub fn is_empty(&self) -> bool {
        self.quads + self.triangles == 0
    }
}

/// Mesh one slab level, appending its nodes and shells
pub fn mesh_slab(
    level: &SlabLevel,
    spacing: f64,
    default_thickness: f64,
    nodes: &mut Vec<Node>,
    elements: &mut Vec<Element>,
) -> LevelMesh {
    let elevation = level.elevation().unwrap_or(0.0);
    let thickness = level.thickness().unwrap_or(default_thickness);
    let mut mesh = LevelMesh {
        name: level.name.clone(),
        elevation,
        thickness,
        ..LevelMesh::default()
    };

    let outline = level.outline();
    if outline.len() < 3 {
        warn!(
            "Slab level '{}' has {} usable vertices; no mesh generated",
            level.name,
            outline.len()
        );
        return mesh;
    }

    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for &(x, y) in &outline {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }

    // Bounds rounded outward to multiples of the spacing
    let x0 = (min_x / spacing).floor() * spacing;
    let y0 = (min_y / spacing).floor() * spacing;
    let nx = ((max_x / spacing).ceil() * spacing - x0) / spacing;
    let ny = ((max_y / spacing).ceil() * spacing - y0) / spacing;
    let (nx, ny) = (nx.round() as i64, ny.round() as i64);

    let mut grid = SlabGrid::new((x0, y0), spacing, elevation);
    for j in 0..=ny {
        for i in 0..=nx {
            let x = x0 + i as f64 * spacing;
            let y = y0 + j as f64 * spacing;
            if point_in_polygon((x, y), &outline) {
                let idx = nodes.len();
                nodes.push(Node::new(x, y, elevation));
                grid.nodes.insert((i, j), idx);
                mesh.nodes.push(idx);
            }
        }
    }

    if mesh.nodes.is_empty() {
        warn!("Slab level '{}' contains no grid points", level.name);
        mesh.grid = grid;
        return mesh;
    }

    for j in 0..ny {
        for i in 0..nx {
            let corners = [
                grid.node_at(i, j),
                grid.node_at(i + 1, j),
                grid.node_at(i + 1, j + 1),
                grid.node_at(i, j + 1),
            ];
            let [Some(a), Some(b), Some(c), Some(d)] = corners else {
                continue;
            };
            let pts: Vec<(f64, f64)> = [a, b, c, d].iter().map(|&n| (nodes[n].x, nodes[n].y)).collect();
            let area = 0.5 * (orient(pts[0], pts[1], pts[2]) + orient(pts[0], pts[2], pts[3]));
            if area > MIN_QUAD_AREA {
                elements.push(Element::Shell(ShellElement::new([a, b, c, d], thickness)));
                mesh.quads += 1;
            }
        }
    }

    if mesh.quads == 0 {
        let points: Vec<(f64, f64)> = mesh.nodes.iter().map(|&n| (nodes[n].x, nodes[n].y)).collect();
        let mut triangles = triangulate::delaunay(&points);
        if triangles.is_empty() {
            triangles = triangulate::fan(&points);
        }
        for t in &triangles {
            elements.push(Element::Shell(ShellElement::triangle(
                mesh.nodes[t[0]],
                mesh.nodes[t[1]],
                mesh.nodes[t[2]],
                thickness,
            )));
        }
        mesh.triangles = triangles.len();
        mesh.triangulated = true;
        if triangles.is_empty() {
            warn!(
                "Slab level '{}' produced no quads and no fallback triangles",
                level.name
            );
        } else {
            debug!(
                "Slab level '{}' fell back to {} triangles",
                level.name,
                triangles.len()
            );
        }
    }

    debug!(
        "Slab level '{}' at z={}: {} nodes, {} quads, {} triangles",
        level.name,
        elevation,
        mesh.nodes.len(),
        mesh.quads,
        mesh.triangles
    );

    mesh.grid = grid;
    mesh
}
