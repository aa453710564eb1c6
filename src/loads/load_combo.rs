//! Load combinations

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{LoadCase, NodeLoad};
use crate::error::{FEAError, FEAResult};

/// A load combination defines how load cases are factored into a new case
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadCombination {
    /// Name of the load combination
    pub name: String,
    /// Factors for each load case (case_name -> factor)
    pub factors: BTreeMap<String, f64>,
}

impl LoadCombination {
    /// Create a new load combination
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            factors: BTreeMap::new(),
        }
    }

    /// Add a load case with a factor
    pub fn with_case(mut self, case: &str, factor: f64) -> Self {
        self.factors.insert(case.to_string(), factor);
        self
    }

    /// Get the factor for a load case
    pub fn factor(&self, case: &str) -> f64 {
        *self.factors.get(case).unwrap_or(&0.0)
    }

    /// Build the factored load case from the named source cases
    pub fn combine(&self, cases: &[LoadCase]) -> FEAResult<LoadCase> {
        let mut combined = LoadCase::new(&self.name);
        for (case_name, &factor) in &self.factors {
            let case = cases
                .iter()
                .find(|c| &c.name == case_name)
                .ok_or_else(|| FEAError::LoadCaseNotFound(case_name.clone()))?;
            combined
                .loads
                .extend(case.loads.iter().map(|l: &NodeLoad| l.scaled(factor)));
        }
        Ok(combined)
    }

    /// 1.2D + 1.6L
    pub fn lrfd_dead_live(dead: &str, live: &str) -> Self {
        Self::new("1.2D + 1.6L")
            .with_case(dead, 1.2)
            .with_case(live, 1.6)
    }

    /// 1.2D + L + E
    pub fn lrfd_dead_live_seismic(dead: &str, live: &str, seismic: &str) -> Self {
        Self::new("1.2D + L + E")
            .with_case(dead, 1.2)
            .with_case(live, 1.0)
            .with_case(seismic, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_scales_loads() {
        let dead = LoadCase::new("Dead").with_load(NodeLoad::force(1, 0.0, 0.0, -10.0));
        let live = LoadCase::new("Live").with_load(NodeLoad::force(1, 0.0, 0.0, -5.0));
        let combo = LoadCombination::lrfd_dead_live("Dead", "Live");

        let case = combo.combine(&[dead, live]).unwrap();
        assert_eq!(case.name, "1.2D + 1.6L");
        assert!((case.total_force()[2] + 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_combine_unknown_case() {
        let combo = LoadCombination::new("C").with_case("Wind", 1.0);
        assert!(matches!(
            combo.combine(&[]),
            Err(FEAError::LoadCaseNotFound(name)) if name == "Wind"
        ));
    }
}
