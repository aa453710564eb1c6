//! Load types and load combinations

mod load_case;
mod load_combo;
mod node_load;

pub use load_case::LoadCase;
pub use load_combo::LoadCombination;
pub use node_load::NodeLoad;
