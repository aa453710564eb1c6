//! Analysis configuration

use serde::{Deserialize, Serialize};

use crate::elements::{FrameSection, Material};
use crate::error::{FEAError, FEAResult};

/// Options for meshing and linear static analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Slab grid spacing
    pub mesh_size: f64,
    /// Material used by every element
    pub material: Material,
    /// Vertical soil subgrade modulus
    pub subgrade_vertical: f64,
    /// Horizontal soil subgrade modulus
    pub subgrade_horizontal: f64,
    /// Multiplier applied to the pile soil springs
    pub soil_spring_factor: f64,
    /// Constant in the shell diagonal stiffness `D * Area * constant`
    pub shell_stiffness_factor: f64,
    /// Section used for near-rigid links
    pub link_section: FrameSection,
    /// Elevation tolerance when snapping beam ends to slab levels
    pub level_tolerance: f64,
    /// Distance below which an attachment point coincides with a slab node
    pub coincidence_tolerance: f64,
    /// Plan radius searched for the nearest slab node of an attachment point
    pub link_search_radius: f64,
    /// Diagonal regularization as a fraction of the largest diagonal entry
    pub regularization_factor: f64,
    /// Allowable story drift ratio
    pub drift_limit: f64,
    /// Converts story heights into displacement units
    pub story_height_factor: f64,
    /// Largest system handed to the dense fallback solver
    pub dense_fallback_max_dofs: usize,
    /// Solve load cases on the rayon thread pool
    pub parallel: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            mesh_size: 2.0,
            material: Material::concrete(),
            subgrade_vertical: 100.0,
            subgrade_horizontal: 50.0,
            soil_spring_factor: 1.0,
            shell_stiffness_factor: 1e-3,
            link_section: FrameSection::rigid_link(1e3),
            level_tolerance: 1.0,
            coincidence_tolerance: 0.1,
            link_search_radius: 2.0,
            regularization_factor: 1e-6,
            drift_limit: 0.025,
            story_height_factor: 1.0,
            dense_fallback_max_dofs: 12_000,
            parallel: false,
        }
    }
}

impl AnalysisOptions {
    /// Set the slab mesh spacing
    pub fn with_mesh_size(mut self, size: f64) -> Self {
        self.mesh_size = size;
        self
    }

    /// Set the material
    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    /// Set the soil subgrade moduli and spring multiplier
    pub fn with_soil(mut self, vertical: f64, horizontal: f64, factor: f64) -> Self {
        self.subgrade_vertical = vertical;
        self.subgrade_horizontal = horizontal;
        self.soil_spring_factor = factor;
        self
    }

    /// Set the story drift limit
    pub fn with_drift_limit(mut self, limit: f64) -> Self {
        self.drift_limit = limit;
        self
    }

    /// Solve load cases in parallel
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Load options from a JSON document; missing fields take their defaults
    pub fn from_json(json: &str) -> FEAResult<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Check the options for values the engine cannot work with
    pub fn validate(&self) -> FEAResult<()> {
        self.material.validate()?;
        if !(self.mesh_size.is_finite() && self.mesh_size > 0.0) {
            return Err(FEAError::InvalidInput(format!(
                "mesh size must be positive, got {}",
                self.mesh_size
            )));
        }
        if self.story_height_factor <= 0.0 {
            return Err(FEAError::InvalidInput(
                "story height factor must be positive".to_string(),
            ));
        }
        if self.regularization_factor < 0.0 {
            return Err(FEAError::InvalidInput(
                "regularization factor must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let options = AnalysisOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.drift_limit, 0.025);
    }

    #[test]
    fn test_partial_json() {
        let options = AnalysisOptions::from_json(r#"{"mesh_size": 1.5, "parallel": true}"#).unwrap();
        assert_eq!(options.mesh_size, 1.5);
        assert!(options.parallel);
        assert_eq!(options.link_search_radius, 2.0);
    }

    #[test]
    fn test_rejects_bad_mesh_size() {
        assert!(AnalysisOptions::from_json(r#"{"mesh_size": 0.0}"#).is_err());
    }
}
