//! Building FEA - structural analysis of slab, column, beam and pile buildings
//!
//! The engine meshes slab boundaries together with piles, columns and beams,
//! assembles a sparse global stiffness system per load case and solves it
//! with regularization and a dense fallback. Results include reactions,
//! member end forces, joint force sums and story drift ratios.
//!
//! ## Example
//! ```rust
//! use building_fea::prelude::*;
//!
//! let options = AnalysisOptions::default();
//! let building = BuildingInput {
//!     levels: vec![
//!         SlabLevel::rectangle("Mat", 0.0, 0.0, 20.0, 20.0, 0.0, 2.0),
//!         SlabLevel::rectangle("Top", 0.0, 0.0, 20.0, 20.0, 12.0, 0.75),
//!     ],
//!     columns: vec![ColumnSpec::square(10.0, 10.0, 0.0, 12.0, 1.5)],
//!     piles: vec![PileSpec::new(10.0, 10.0, 0.0, -30.0, 1.5)],
//!     ..Default::default()
//! };
//!
//! let model = StructuralModel::from_building(&building, &options).unwrap();
//! let lateral = LoadCase::new("Seismic X").with_load(NodeLoad::force(0, 1.0, 0.0, 0.0));
//! let results = model.analyze(&[lateral], &options).unwrap();
//!
//! let result = &results["Seismic X"];
//! assert_eq!(result.displacements.len(), model.dof_count());
//! for drift in result.drifts_in_order() {
//!     println!("{}: {:.5} (pass: {})", drift.story, drift.drift_ratio, drift.passes);
//! }
//! ```

pub mod analysis;
pub mod assembly;
pub mod elements;
pub mod error;
pub mod loads;
pub mod math;
pub mod mesh;
pub mod model;
pub mod postprocess;
pub mod results;
pub mod solver;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::analysis::AnalysisOptions;
    pub use crate::elements::{
        Element, ElementKind, FrameElement, FrameSection, Material, Node, ShellElement, Support,
    };
    pub use crate::error::{FEAError, FEAResult};
    pub use crate::loads::{LoadCase, LoadCombination, NodeLoad};
    pub use crate::mesh::{
        BeamSpec, BuildingInput, ColumnSpec, LevelMesh, MeshGenerator, PileSpec, SlabLevel, SlabVertex,
    };
    pub use crate::model::StructuralModel;
    pub use crate::results::{
        AnalysisResult, AnalysisSummary, ElementForces, JointForces, NodeDisplacement, Reactions,
        StoryDrift,
    };
    pub use crate::solver::{CancellationToken, SolveStatus};
}
