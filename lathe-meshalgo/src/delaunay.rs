use crate::triangulate::NO_NEIGHBOR;
use lathe_base::prelude::*;

/// The in-circumcircle determinant: positive when `d` lies inside the
/// circumcircle of the counter-clockwise triangle `(a, b, c)`.
pub fn in_circumcircle(a: Point2, b: Point2, c: Point2, d: Point2) -> f64 {
    let (ax, ay) = (a.x - d.x, a.y - d.y);
    let (bx, by) = (b.x - d.x, b.y - d.y);
    let (cx, cy) = (c.x - d.x, c.y - d.y);
    let a2 = ax * ax + ay * ay;
    let b2 = bx * bx + by * by;
    let c2 = cx * cx + cy * cy;
    ax * (by * c2 - b2 * cy) - ay * (bx * c2 - b2 * cx) + a2 * (bx * cy - by * cx)
}

fn test_triangle(a: Point2, b: Point2, c: Point2) -> bool {
    (b - a).perp_dot(c - a) > 0.0
}

/// Repairs the neighbor slots of the triangles adjacent to `tri` after its
/// corner array changed.
pub fn fix_back_pointers(tri: u32, triangles: &[u32], adjacencies: &mut [u32]) {
    let tri = tri as usize;
    let (a, b, c) = (triangles[tri], triangles[tri + 1], triangles[tri + 2]);
    for (k, (x, y)) in [(a, b), (b, c), (c, a)].into_iter().enumerate() {
        let neighbor = adjacencies[tri + k];
        if neighbor == NO_NEIGHBOR {
            continue;
        }
        let n = neighbor as usize;
        // the neighbor side holding both shared corners points back here
        for j in 0..3 {
            let (p, q) = (triangles[n + j], triangles[n + (j + 1) % 3]);
            if (p == y && q == x) || (p == x && q == y) {
                adjacencies[n + j] = tri as u32;
            }
        }
    }
}

/// Flips the diagonal between triangle `tri` and its neighbor across
/// `edge` when the in-circumcircle test demands it; ties near zero prefer
/// the shorter diagonal that keeps both triangles positively oriented.
/// Returns whether a flip happened.
pub fn flip_triangles(
    points: &[Point2],
    triangles: &mut [u32],
    adjacencies: &mut [u32],
    tri: u32,
    edge: u32,
) -> bool {
    let t = tri as usize;
    let (a, b, c) = (triangles[t], triangles[t + 1], triangles[t + 2]);
    let neighbor = adjacencies[t + edge as usize];
    if neighbor == NO_NEIGHBOR {
        return false;
    }
    let n = neighbor as usize;
    // the corner of the neighbor not shared with this triangle, and the
    // neighbor sides on either side of it
    let (d, e, f) = (triangles[n], triangles[n + 1], triangles[n + 2]);
    let (g, na, nb) = if d != a && d != b && d != c {
        (d, adjacencies[n + 2], adjacencies[n])
    } else if e != a && e != b && e != c {
        (e, adjacencies[n], adjacencies[n + 1])
    } else {
        (f, adjacencies[n + 1], adjacencies[n + 2])
    };
    let (pa, pb, pc, pg) = (
        points[a as usize],
        points[b as usize],
        points[c as usize],
        points[g as usize],
    );
    let det = in_circumcircle(pa, pb, pc, pg);
    let tol = TOLERANCE;
    let flip = if det > tol {
        true
    } else if det.abs() <= tol {
        // shorter-diagonal tie break keeping both triangles oriented
        match edge {
            0 => pg.distance(pc) + tol < pa.distance(pb)
                && test_triangle(pg, pc, pa)
                && test_triangle(pg, pb, pc),
            1 => pg.distance(pa) + tol < pc.distance(pb)
                && test_triangle(pg, pa, pb)
                && test_triangle(pg, pc, pa),
            _ => pg.distance(pb) + tol < pa.distance(pc)
                && test_triangle(pg, pa, pb)
                && test_triangle(pg, pb, pc),
        }
    } else {
        false
    };
    if !flip {
        return false;
    }
    let (t0, t1, t2) = (adjacencies[t], adjacencies[t + 1], adjacencies[t + 2]);
    match edge {
        0 => {
            triangles[t] = g;
            triangles[t + 1] = c;
            triangles[t + 2] = a;
            triangles[n] = g;
            triangles[n + 1] = b;
            triangles[n + 2] = c;
            adjacencies[t] = neighbor;
            adjacencies[t + 1] = t2;
            adjacencies[t + 2] = na;
            adjacencies[n] = nb;
            adjacencies[n + 1] = t1;
            adjacencies[n + 2] = tri;
        }
        1 => {
            triangles[t] = g;
            triangles[t + 1] = a;
            triangles[t + 2] = b;
            triangles[n] = g;
            triangles[n + 1] = c;
            triangles[n + 2] = a;
            adjacencies[t] = neighbor;
            adjacencies[t + 1] = t0;
            adjacencies[t + 2] = na;
            adjacencies[n] = nb;
            adjacencies[n + 1] = t2;
            adjacencies[n + 2] = tri;
        }
        _ => {
            triangles[t] = g;
            triangles[t + 1] = a;
            triangles[t + 2] = b;
            triangles[n] = g;
            triangles[n + 1] = b;
            triangles[n + 2] = c;
            adjacencies[t] = nb;
            adjacencies[t + 1] = t0;
            adjacencies[t + 2] = neighbor;
            adjacencies[n] = tri;
            adjacencies[n + 1] = t1;
            adjacencies[n + 2] = na;
        }
    }
    fix_back_pointers(neighbor, triangles, adjacencies);
    fix_back_pointers(tri, triangles, adjacencies);
    true
}

/// Flips non-boundary edges until a full pass over all triangles finds no
/// in-circumcircle violation.
pub fn delaunay_flips(points: &[Point2], triangles: &mut [u32], adjacencies: &mut [u32]) {
    let count = triangles.len();
    let mut flipped = true;
    let mut passes = 0;
    while flipped && passes < 100 {
        flipped = false;
        passes += 1;
        for tri in (0..count as u32).step_by(3) {
            for edge in 0..3 {
                if flip_triangles(points, triangles, adjacencies, tri, edge) {
                    flipped = true;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triangulate::{build_adjacencies, triangulate_polygon};

    #[test]
    fn incircle_sign() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        let c = Point2::new(0.0, 1.0);
        assert!(in_circumcircle(a, b, c, Point2::new(0.4, 0.4)) > 0.0);
        assert!(in_circumcircle(a, b, c, Point2::new(2.0, 2.0)) < 0.0);
    }

    #[test]
    fn flips_restore_delaunay() {
        // a flat quad triangulated with the bad diagonal 0-2
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 1.0),
            Point2::new(20.0, 0.0),
            Point2::new(10.0, -1.0),
        ];
        let mut triangles = vec![0, 2, 1, 0, 3, 2];
        let mut adjacencies = build_adjacencies(&triangles);
        delaunay_flips(&points, &mut triangles, &mut adjacencies);
        // after flipping, the diagonal is 1-3
        let has_diagonal = |a: u32, b: u32| {
            triangles
                .chunks_exact(3)
                .filter(|t| t.contains(&a) && t.contains(&b))
                .count()
                == 2
        };
        assert!(has_diagonal(1, 3));
        assert!(!has_diagonal(0, 2));
        // all triangles stay counter-clockwise
        for t in triangles.chunks_exact(3) {
            let (a, b, c) = (
                points[t[0] as usize],
                points[t[1] as usize],
                points[t[2] as usize],
            );
            assert!((b - a).perp_dot(c - a) > 0.0);
        }
    }
}
