//! Element kinds of the building model

use serde::{Deserialize, Serialize};

use super::section::FrameSection;

/// Two-node beam-column element (beam, column, pile or rigid link)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameElement {
    /// Index of the i-node (start)
    pub i_node: usize,
    /// Index of the j-node (end)
    pub j_node: usize,
    /// Section properties
    pub section: FrameSection,
}

impl FrameElement {
    pub fn new(i_node: usize, j_node: usize, section: FrameSection) -> Self {
        Self {
            i_node,
            j_node,
            section,
        }
    }
}

/// Four-node shell element; triangles repeat their last corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShellElement {
    /// Corner node indices in counter-clockwise order
    pub nodes: [usize; 4],
    /// Shell thickness
    pub thickness: f64,
}

impl ShellElement {
    pub fn new(nodes: [usize; 4], thickness: f64) -> Self {
        Self { nodes, thickness }
    }

    /// Triangle stored as a quad with its last corner repeated
    pub fn triangle(a: usize, b: usize, c: usize, thickness: f64) -> Self {
        Self::new([a, b, c, c], thickness)
    }

    /// Corner indices without the repeated corner of a triangle
    pub fn distinct_nodes(&self) -> Vec<usize> {
        let mut nodes = Vec::with_capacity(4);
        for &n in &self.nodes {
            if !nodes.contains(&n) {
                nodes.push(n);
            }
        }
        nodes
    }
}

/// Discriminant of an [`Element`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Beam,
    Column,
    Pile,
    Link,
    Shell,
}

/// An element of the structural model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Element {
    Beam(FrameElement),
    Column(FrameElement),
    Pile(FrameElement),
    Link(FrameElement),
    Shell(ShellElement),
}

impl Element {
    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Beam(_) => ElementKind::Beam,
            Element::Column(_) => ElementKind::Column,
            Element::Pile(_) => ElementKind::Pile,
            Element::Link(_) => ElementKind::Link,
            Element::Shell(_) => ElementKind::Shell,
        }
    }

    /// Frame data for beam-family elements, `None` for shells
    pub fn as_frame(&self) -> Option<&FrameElement> {
        match self {
            Element::Beam(f) | Element::Column(f) | Element::Pile(f) | Element::Link(f) => Some(f),
            Element::Shell(_) => None,
        }
    }

    pub fn as_frame_mut(&mut self) -> Option<&mut FrameElement> {
        match self {
            Element::Beam(f) | Element::Column(f) | Element::Pile(f) | Element::Link(f) => Some(f),
            Element::Shell(_) => None,
        }
    }

    /// Node indices referenced by this element
    pub fn node_indices(&self) -> Vec<usize> {
        match self {
            Element::Shell(s) => s.nodes.to_vec(),
            other => other
                .as_frame()
                .map(|f| vec![f.i_node, f.j_node])
                .unwrap_or_default(),
        }
    }

    pub fn is_frame(&self) -> bool {
        self.as_frame().is_some()
    }
}
