//! Planar polygon predicates used by the slab mesher

/// Points closer than this to a boundary edge count as inside
const BOUNDARY_EPS: f64 = 1e-9;

/// Twice the signed area of the triangle (a, b, c); positive when counter-clockwise
pub fn orient(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0)
}

/// Signed area of a closed polygon (shoelace); positive when counter-clockwise
pub fn signed_area(points: &[(f64, f64)]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let (x0, y0) = points[i];
        let (x1, y1) = points[(i + 1) % n];
        sum += x0 * y1 - x1 * y0;
    }
    0.5 * sum
}

fn on_segment(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> bool {
    let len = (b.0 - a.0).hypot(b.1 - a.1);
    if len < BOUNDARY_EPS {
        return (p.0 - a.0).hypot(p.1 - a.1) <= BOUNDARY_EPS;
    }
    if (orient(a, b, p) / len).abs() > BOUNDARY_EPS {
        return false;
    }
    let dot = (p.0 - a.0) * (b.0 - a.0) + (p.1 - a.1) * (b.1 - a.1);
    dot >= -BOUNDARY_EPS * len && dot <= len * len + BOUNDARY_EPS * len
}

/// Even-odd ray casting; points on the boundary are inside
pub fn point_in_polygon(p: (f64, f64), polygon: &[(f64, f64)]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[j];
        if on_segment(p, a, b) {
            return true;
        }
        if (a.1 > p.1) != (b.1 > p.1) {
            let x_cross = a.0 + (p.1 - a.1) * (b.0 - a.0) / (b.1 - a.1);
            if p.0 < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}
