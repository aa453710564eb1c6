//! Structural elements module

mod element;
mod material;
mod node;
mod section;
mod support;

pub use element::{Element, ElementKind, FrameElement, ShellElement};
pub use material::Material;
pub use node::Node;
pub use section::FrameSection;
pub use support::Support;
