//! Simplified shell stiffness
//!
//! Slabs are represented by a uniform diagonal stiffness rather than a plate
//! bending element: every one of the 24 DOFs receives `D * Area * constant`,
//! with `D = E t³ / (12 (1 - nu²))`. Result calibration depends on this exact
//! form, so it must not be replaced by an isoparametric formulation.

use super::Mat24;

/// Area of the triangle (a, b, c) projected onto any plane, from its 3D cross product
fn triangle_area(a: &[f64; 3], b: &[f64; 3], c: &[f64; 3]) -> f64 {
    let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
    let cross = [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ];
    0.5 * (cross[0].powi(2) + cross[1].powi(2) + cross[2].powi(2)).sqrt()
}

/// Average area of the two diagonal triangulations of a quad
///
/// A triangle stored with a repeated last corner yields its own area.
pub fn quad_average_area(corners: &[[f64; 3]; 4]) -> f64 {
    let [p0, p1, p2, p3] = corners;
    let split_02 = triangle_area(p0, p1, p2) + triangle_area(p0, p2, p3);
    let split_13 = triangle_area(p0, p1, p3) + triangle_area(p1, p2, p3);
    0.5 * (split_02 + split_13)
}

/// Shell element stiffness
///
/// # Arguments
/// * `e` - Modulus of elasticity
/// * `nu` - Poisson's ratio
/// * `thickness` - Shell thickness
/// * `corners` - Corner coordinates
/// * `factor` - Calibration constant
pub fn shell_stiffness(e: f64, nu: f64, thickness: f64, corners: &[[f64; 3]; 4], factor: f64) -> Mat24 {
    let d = e * thickness.powi(3) / (12.0 * (1.0 - nu * nu));
    let area = quad_average_area(corners);
    Mat24::from_diagonal_element(d * area * factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SQUARE: [[f64; 3]; 4] = [
        [0.0, 0.0, 0.0],
        [2.0, 0.0, 0.0],
        [2.0, 2.0, 0.0],
        [0.0, 2.0, 0.0],
    ];

    #[test]
    fn test_square_area() {
        assert_relative_eq!(quad_average_area(&SQUARE), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_triangle_area_with_repeated_corner() {
        let tri = [SQUARE[0], SQUARE[1], SQUARE[2], SQUARE[2]];
        assert_relative_eq!(quad_average_area(&tri), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_uniform_diagonal() {
        let k = shell_stiffness(1200.0, 0.0, 1.0, &SQUARE, 0.5);
        // D = 100, Area = 4
        for i in 0..24 {
            assert_relative_eq!(k[(i, i)], 200.0, epsilon = 1e-10);
        }
        assert_eq!(k[(0, 1)], 0.0);
    }
}
