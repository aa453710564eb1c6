//! Fallback triangulation for slab levels that produce no quads

use super::polygon::orient;

/// Triangles with twice-area below this are discarded
const DEGENERATE_EPS: f64 = 1e-12;

/// Delaunay triangulation by Bowyer-Watson insertion
///
/// Returns counter-clockwise index triples into `points`. Collinear input
/// yields no triangles.
pub fn delaunay(points: &[(f64, f64)]) -> Vec<[usize; 3]> {
    let n = points.len();
    if n < 3 {
        return Vec::new();
    }

    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for &(x, y) in points {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    let span = (max_x - min_x).max(max_y - min_y).max(1.0);
    let (cx, cy) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);

    // Super triangle enclosing every point
    let mut verts: Vec<(f64, f64)> = points.to_vec();
    verts.push((cx - 20.0 * span, cy - 10.0 * span));
    verts.push((cx + 20.0 * span, cy - 10.0 * span));
    verts.push((cx, cy + 20.0 * span));

    let mut triangles: Vec<[usize; 3]> = vec![[n, n + 1, n + 2]];

    for p in 0..n {
        let point = verts[p];
        let (bad, good): (Vec<[usize; 3]>, Vec<[usize; 3]>) = triangles
            .into_iter()
            .partition(|t| in_circumcircle(verts[t[0]], verts[t[1]], verts[t[2]], point));
        triangles = good;

        // Cavity boundary: edges of bad triangles not shared with another bad triangle
        let mut edges: Vec<(usize, usize)> = Vec::new();
        for t in &bad {
            for &(a, b) in &[(t[0], t[1]), (t[1], t[2]), (t[2], t[0])] {
                let shared = bad.iter().any(|o| {
                    o != t && o.contains(&a) && o.contains(&b)
                });
                if !shared {
                    edges.push((a, b));
                }
            }
        }

        for (a, b) in edges {
            let tri = if orient(verts[a], verts[b], point) >= 0.0 {
                [a, b, p]
            } else {
                [b, a, p]
            };
            triangles.push(tri);
        }
    }

    triangles
        .into_iter()
        .filter(|t| t.iter().all(|&v| v < n))
        .filter(|t| orient(points[t[0]], points[t[1]], points[t[2]]) > DEGENERATE_EPS)
        .collect()
}

/// Sequential fan around the first point, keeping non-degenerate triangles
pub fn fan(points: &[(f64, f64)]) -> Vec<[usize; 3]> {
    let mut triangles = Vec::new();
    for i in 1..points.len().saturating_sub(1) {
        let area = orient(points[0], points[i], points[i + 1]);
        if area > DEGENERATE_EPS {
            triangles.push([0, i, i + 1]);
        } else if area < -DEGENERATE_EPS {
            triangles.push([0, i + 1, i]);
        }
    }
    triangles
}

/// True if `d` lies strictly inside the circumcircle of the counter-clockwise triangle (a, b, c)
fn in_circumcircle(a: (f64, f64), b: (f64, f64), c: (f64, f64), d: (f64, f64)) -> bool {
    let (adx, ady) = (a.0 - d.0, a.1 - d.1);
    let (bdx, bdy) = (b.0 - d.0, b.1 - d.1);
    let (cdx, cdy) = (c.0 - d.0, c.1 - d.1);

    let ad = adx * adx + ady * ady;
    let bd = bdx * bdx + bdy * bdy;
    let cd = cdx * cdx + cdy * cdy;

    let det = adx * (bdy * cd - bd * cdy) - ady * (bdx * cd - bd * cdx) + ad * (bdx * cdy - bdy * cdx);
    if orient(a, b, c) >= 0.0 {
        det > 0.0
    } else {
        det < 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_triangle() {
        let tris = delaunay(&[(0.0, 0.0), (2.0, 0.0), (0.0, 2.0)]);
        assert_eq!(tris.len(), 1);
        let t = tris[0];
        let pts = [(0.0, 0.0), (2.0, 0.0), (0.0, 2.0)];
        assert!(orient(pts[t[0]], pts[t[1]], pts[t[2]]) > 0.0);
    }

    #[test]
    fn test_convex_set_area_is_covered() {
        let pts = [(0.0, 0.0), (4.0, 0.0), (4.0, 3.0), (0.0, 3.0), (2.0, 1.0)];
        let tris = delaunay(&pts);
        let area: f64 = tris
            .iter()
            .map(|t| 0.5 * orient(pts[t[0]], pts[t[1]], pts[t[2]]))
            .sum();
        assert!((area - 12.0).abs() < 1e-9, "covered area {}", area);
    }

    #[test]
    fn test_collinear_points_yield_nothing() {
        let pts = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)];
        assert!(delaunay(&pts).is_empty());
        assert!(fan(&pts).is_empty());
    }

    #[test]
    fn test_fan_orients_counter_clockwise() {
        let pts = [(0.0, 0.0), (0.0, 2.0), (2.0, 0.0)];
        let tris = fan(&pts);
        assert_eq!(tris, vec![[0, 2, 1]]);
    }
}
