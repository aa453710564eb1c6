//! Mathematical utilities and element stiffness library

pub mod shell;
pub mod sparse;

use nalgebra::{DMatrix, DVector, Matrix3, SMatrix, SVector, Vector3};

pub use shell::{quad_average_area, shell_stiffness};
pub use sparse::{reverse_cuthill_mckee, sparse_matvec, SparseCholeskySolver, SparseMatrixBuilder};

pub type Mat = DMatrix<f64>;
pub type Vec = DVector<f64>;
pub type Mat3 = Matrix3<f64>;
pub type Vec3 = Vector3<f64>;

/// 12x12 matrix for member stiffness
pub type Mat12 = SMatrix<f64, 12, 12>;
/// 12-element vector for member forces/displacements
pub type Vec12 = SVector<f64, 12>;
/// 24x24 matrix for shell stiffness
pub type Mat24 = SMatrix<f64, 24, 24>;

/// Lengths below this are treated as zero
pub const ZERO_LENGTH: f64 = 1e-10;

/// Euclidean distance between two points
pub fn member_length(i_node: &[f64; 3], j_node: &[f64; 3]) -> f64 {
    let dx = j_node[0] - i_node[0];
    let dy = j_node[1] - i_node[1];
    let dz = j_node[2] - i_node[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Compute the transformation matrix for a 3D frame element (Z up)
///
/// Local x runs from the i-node to the j-node. For non-vertical members local y
/// is `Z × x` (horizontal) and local z points upward; for vertical members local
/// y is global -Y when pointing up. Zero-length members get the identity.
pub fn member_transformation_matrix(i_node: &[f64; 3], j_node: &[f64; 3]) -> Mat12 {
    let length = member_length(i_node, j_node);
    if length < ZERO_LENGTH {
        return Mat12::identity();
    }

    let x = Vec3::new(
        (j_node[0] - i_node[0]) / length,
        (j_node[1] - i_node[1]) / length,
        (j_node[2] - i_node[2]) / length,
    );

    let vertical = x[0].abs() < 1e-10 && x[1].abs() < 1e-10;
    let reference = if vertical { Vec3::x() } else { Vec3::z() };

    let y = reference.cross(&x).normalize();
    let z = x.cross(&y);

    let r = Mat3::new(
        x[0], x[1], x[2],
        y[0], y[1], y[2],
        z[0], z[1], z[2],
    );

    let mut t = Mat12::zeros();
    for block in 0..4 {
        t.fixed_view_mut::<3, 3>(block * 3, block * 3).copy_from(&r);
    }
    t
}

/// Compute the local stiffness matrix for a 3D frame element
///
/// # Arguments
/// * `e` - Modulus of elasticity
/// * `g` - Shear modulus
/// * `a` - Cross-sectional area
/// * `iy` - Moment of inertia about local y-axis
/// * `iz` - Moment of inertia about local z-axis
/// * `j` - Torsional constant
/// * `length` - Member length
///
/// Zero-length members return an all-zero matrix.
pub fn member_local_stiffness(
    e: f64,
    g: f64,
    a: f64,
    iy: f64,
    iz: f64,
    j: f64,
    length: f64,
) -> Mat12 {
    if length < ZERO_LENGTH {
        return Mat12::zeros();
    }

    let l = length;
    let l2 = l * l;
    let l3 = l2 * l;

    let ea_l = e * a / l;
    let gj_l = g * j / l;

    let eiy_l3 = e * iy / l3;
    let eiy_l2 = e * iy / l2;
    let eiy_l = e * iy / l;

    let eiz_l3 = e * iz / l3;
    let eiz_l2 = e * iz / l2;
    let eiz_l = e * iz / l;

    #[rustfmt::skip]
    let data = [
        // Row 0: axial at i
        ea_l,      0.0,          0.0,           0.0,    0.0,           0.0,          -ea_l,     0.0,          0.0,           0.0,    0.0,           0.0,
        // Row 1: shear Fy at i
        0.0,       12.0*eiz_l3,  0.0,           0.0,    0.0,           6.0*eiz_l2,   0.0,       -12.0*eiz_l3, 0.0,           0.0,    0.0,           6.0*eiz_l2,
        // Row 2: shear Fz at i
        0.0,       0.0,          12.0*eiy_l3,   0.0,    -6.0*eiy_l2,   0.0,          0.0,       0.0,          -12.0*eiy_l3,  0.0,    -6.0*eiy_l2,   0.0,
        // Row 3: torsion at i
        0.0,       0.0,          0.0,           gj_l,   0.0,           0.0,          0.0,       0.0,          0.0,           -gj_l,  0.0,           0.0,
        // Row 4: moment My at i
        0.0,       0.0,          -6.0*eiy_l2,   0.0,    4.0*eiy_l,     0.0,          0.0,       0.0,          6.0*eiy_l2,    0.0,    2.0*eiy_l,     0.0,
        // Row 5: moment Mz at i
        0.0,       6.0*eiz_l2,   0.0,           0.0,    0.0,           4.0*eiz_l,    0.0,       -6.0*eiz_l2,  0.0,           0.0,    0.0,           2.0*eiz_l,
        // Row 6: axial at j
        -ea_l,     0.0,          0.0,           0.0,    0.0,           0.0,          ea_l,      0.0,          0.0,           0.0,    0.0,           0.0,
        // Row 7: shear Fy at j
        0.0,       -12.0*eiz_l3, 0.0,           0.0,    0.0,           -6.0*eiz_l2,  0.0,       12.0*eiz_l3,  0.0,           0.0,    0.0,           -6.0*eiz_l2,
        // Row 8: shear Fz at j
        0.0,       0.0,          -12.0*eiy_l3,  0.0,    6.0*eiy_l2,    0.0,          0.0,       0.0,          12.0*eiy_l3,   0.0,    6.0*eiy_l2,    0.0,
        // Row 9: torsion at j
        0.0,       0.0,          0.0,           -gj_l,  0.0,           0.0,          0.0,       0.0,          0.0,           gj_l,   0.0,           0.0,
        // Row 10: moment My at j
        0.0,       0.0,          -6.0*eiy_l2,   0.0,    2.0*eiy_l,     0.0,          0.0,       0.0,          6.0*eiy_l2,    0.0,    4.0*eiy_l,     0.0,
        // Row 11: moment Mz at j
        0.0,       6.0*eiz_l2,   0.0,           0.0,    0.0,           2.0*eiz_l,    0.0,       -6.0*eiz_l2,  0.0,           0.0,    0.0,           4.0*eiz_l,
    ];

    Mat12::from_row_slice(&data)
}

/// Diagonal Winkler springs for a pile, in global axes, for both ends
///
/// Translations get `k * D * factor * L / 2` (X/Y with the horizontal modulus,
/// Z with the vertical modulus); rotations get `k_h * D * factor * L³ / 12`.
pub fn pile_soil_springs(
    subgrade_vertical: f64,
    subgrade_horizontal: f64,
    diameter: f64,
    spring_factor: f64,
    length: f64,
) -> Vec12 {
    let lateral = subgrade_horizontal * diameter * spring_factor * (length / 2.0);
    let vertical = subgrade_vertical * diameter * spring_factor * (length / 2.0);
    let rotational = subgrade_horizontal * diameter * spring_factor * (length.powi(3) / 12.0);

    let mut springs = Vec12::zeros();
    for offset in [0, 6] {
        springs[offset] = lateral;
        springs[offset + 1] = lateral;
        springs[offset + 2] = vertical;
        springs[offset + 3] = rotational;
        springs[offset + 4] = rotational;
        springs[offset + 5] = rotational;
    }
    springs
}

/// Solve a linear system using LU decomposition
pub fn solve_linear_system(a: Mat, b: &Vec) -> Option<Vec> {
    a.lu().solve(b)
}
