//! Material properties

use serde::{Deserialize, Serialize};

use crate::error::{FEAError, FEAResult};

/// Linear-elastic isotropic material shared by every element in a model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Modulus of elasticity
    pub e: f64,
    /// Poisson's ratio
    pub nu: f64,
    /// Unit weight (force per unit volume), used for self-weight
    pub density: f64,
}

impl Material {
    /// Create a new material
    pub fn new(e: f64, nu: f64, density: f64) -> Self {
        Self { e, nu, density }
    }

    /// Shear modulus, G = E / (2 * (1 + nu))
    pub fn g(&self) -> f64 {
        self.e / (2.0 * (1.0 + self.nu))
    }

    /// Isotropic plate bending rigidity, D = E t³ / (12 (1 - nu²))
    pub fn plate_rigidity(&self, thickness: f64) -> f64 {
        self.e * thickness.powi(3) / (12.0 * (1.0 - self.nu * self.nu))
    }

    /// Normal-weight concrete in kip-ft units (f'c = 4 ksi)
    pub fn concrete() -> Self {
        // E = 57000 * sqrt(4000 psi) = 3605 ksi
        let e_ksi = 57.0 * 4000.0_f64.sqrt();
        Self {
            e: e_ksi * 144.0,
            nu: 0.2,
            density: 0.150,
        }
    }

    /// Check that the constants describe a usable linear-elastic material
    pub fn validate(&self) -> FEAResult<()> {
        if !(self.e.is_finite() && self.e > 0.0) {
            return Err(FEAError::InvalidInput(format!(
                "elastic modulus must be positive, got {}",
                self.e
            )));
        }
        if !(self.nu > -1.0 && self.nu < 0.5) {
            return Err(FEAError::InvalidInput(format!(
                "Poisson ratio must lie in (-1, 0.5), got {}",
                self.nu
            )));
        }
        if self.density < 0.0 {
            return Err(FEAError::InvalidInput(format!(
                "density must not be negative, got {}",
                self.density
            )));
        }
        Ok(())
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::concrete()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shear_modulus() {
        let mat = Material::new(200e9, 0.3, 7850.0);
        let expected_g = 200e9 / (2.0 * 1.3);
        assert!((mat.g() - expected_g).abs() < 1.0);
    }

    #[test]
    fn test_plate_rigidity() {
        let mat = Material::new(1200.0, 0.0, 0.0);
        assert!((mat.plate_rigidity(1.0) - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_validation() {
        assert!(Material::concrete().validate().is_ok());
        assert!(Material::new(0.0, 0.2, 0.1).validate().is_err());
        assert!(Material::new(1.0, 0.5, 0.1).validate().is_err());
    }
}
