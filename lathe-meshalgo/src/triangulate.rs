use crate::errors::{Error, Result};
use lathe_base::prelude::*;

/// sentinel for a triangle side on the boundary
pub const NO_NEIGHBOR: u32 = u32::MAX;

/// twice the signed area of a polygon of point indices
pub fn polygon_area2(points: &[Point2], polygon: &[u32]) -> f64 {
    polygon
        .iter()
        .zip(polygon.iter().cycle().skip(1))
        .map(|(&i, &j)| {
            let (p, q) = (points[i as usize], points[j as usize]);
            p.x * q.y - q.x * p.y
        })
        .sum()
}

#[inline]
fn cross2(o: Point2, a: Point2, b: Point2) -> f64 {
    (a - o).perp_dot(b - o)
}

fn point_in_triangle(p: Point2, a: Point2, b: Point2, c: Point2) -> bool {
    let eps = -ZERO;
    cross2(a, b, p) > eps && cross2(b, c, p) > eps && cross2(c, a, p) > eps
}

/// Triangulates one or more polygons over shared 2D points as outer loops
/// with holes. Outer loops are counter-clockwise, holes clockwise. Returns
/// flat triangle indices, counter-clockwise, and the triangle-to-triangle
/// adjacency array with [`NO_NEIGHBOR`] on boundary sides: entry `3t + k`
/// neighbors the side from corner `k` to corner `(k + 1) % 3`.
pub fn triangulate_polygon(
    points: &[Point2],
    polygons: &[Vec<u32>],
) -> Result<(Vec<u32>, Vec<u32>)> {
    for polygon in polygons {
        if polygon.len() < 3 {
            return Err(Error::InconsistentPolygons(format!(
                "a loop with {} points cannot bound area",
                polygon.len()
            )));
        }
    }
    let mut outers: Vec<Vec<u32>> = Vec::new();
    let mut holes: Vec<Vec<u32>> = Vec::new();
    for polygon in polygons {
        match polygon_area2(points, polygon) > 0.0 {
            true => outers.push(polygon.clone()),
            false => holes.push(polygon.clone()),
        }
    }
    if outers.is_empty() {
        return Err(Error::InconsistentPolygons(
            "no counter-clockwise outer loop".into(),
        ));
    }
    // assign each hole to the outer loop containing it
    let mut groups: Vec<(Vec<u32>, Vec<Vec<u32>>)> =
        outers.into_iter().map(|o| (o, Vec::new())).collect();
    for hole in holes {
        let sample = points[hole[0] as usize];
        let owner = groups
            .iter_mut()
            .find(|(outer, _)| winding_contains(points, outer, sample));
        match owner {
            Some((_, hole_list)) => hole_list.push(hole),
            None => {
                return Err(Error::InconsistentPolygons(
                    "a hole lies in no outer loop".into(),
                ))
            }
        }
    }
    let mut triangles = Vec::new();
    for (outer, hole_list) in groups {
        let merged = merge_holes(points, outer, hole_list)?;
        ear_clip(points, merged, &mut triangles)?;
    }
    let adjacencies = build_adjacencies(&triangles);
    Ok((triangles, adjacencies))
}

/// crossing-count containment for hole assignment
fn winding_contains(points: &[Point2], polygon: &[u32], sample: Point2) -> bool {
    let mut inside = false;
    let n = polygon.len();
    for i in 0..n {
        let p = points[polygon[i] as usize];
        let q = points[polygon[(i + 1) % n] as usize];
        if (p.y > sample.y) != (q.y > sample.y) {
            let x = p.x + (sample.y - p.y) / (q.y - p.y) * (q.x - p.x);
            if sample.x < x {
                inside = !inside;
            }
        }
    }
    inside
}

/// Splices every hole into the outer loop through a mutually visible
/// vertex pair, duplicating the two bridge vertices.
fn merge_holes(
    points: &[Point2],
    mut outer: Vec<u32>,
    mut holes: Vec<Vec<u32>>,
) -> Result<Vec<u32>> {
    // rightmost holes first so bridges cannot block one another
    holes.sort_by(|a, b| {
        let xa = a.iter().map(|&i| points[i as usize].x).fold(f64::NEG_INFINITY, f64::max);
        let xb = b.iter().map(|&i| points[i as usize].x).fold(f64::NEG_INFINITY, f64::max);
        xb.partial_cmp(&xa).unwrap()
    });
    for hole in holes {
        let (hole_idx, outer_idx) = find_bridge(points, &outer, &hole)?;
        // new loop: outer[..=outer_idx], hole[hole_idx..], hole[..=hole_idx],
        // outer[outer_idx..]
        let mut merged = Vec::with_capacity(outer.len() + hole.len() + 2);
        merged.extend_from_slice(&outer[..=outer_idx]);
        merged.extend(hole[hole_idx..].iter().copied());
        merged.extend(hole[..=hole_idx].iter().copied());
        merged.extend_from_slice(&outer[outer_idx..]);
        outer = merged;
    }
    Ok(outer)
}

/// The closest mutually visible (hole vertex, outer vertex) pair: the
/// bridge segment crosses no edge of either loop.
fn find_bridge(points: &[Point2], outer: &[u32], hole: &[u32]) -> Result<(usize, usize)> {
    let mut candidates: Vec<(f64, usize, usize)> = Vec::new();
    for (hi, &h) in hole.iter().enumerate() {
        for (oi, &o) in outer.iter().enumerate() {
            let d = points[h as usize].distance2(points[o as usize]);
            candidates.push((d, hi, oi));
        }
    }
    candidates.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
    let crosses_loop = |seg: &Segment2, polygon: &[u32]| -> bool {
        let n = polygon.len();
        (0..n).any(|i| {
            let p = points[polygon[i] as usize];
            let q = points[polygon[(i + 1) % n] as usize];
            seg.crosses(&Segment2::new(p, q))
        })
    };
    for (_, hi, oi) in candidates {
        let seg = Segment2::new(
            points[hole[hi] as usize],
            points[outer[oi] as usize],
        );
        if seg.length() < ZERO {
            return Ok((hi, oi));
        }
        if !crosses_loop(&seg, outer) && !crosses_loop(&seg, hole) {
            return Ok((hi, oi));
        }
    }
    Err(Error::InconsistentPolygons(
        "no visible bridge between a hole and its outer loop".into(),
    ))
}

/// Ear clipping of a counter-clockwise polygon, best ear first by the
/// smallest angle of the candidate triangle.
fn ear_clip(points: &[Point2], mut polygon: Vec<u32>, triangles: &mut Vec<u32>) -> Result<()> {
    let mut guard = polygon.len() * polygon.len() + 16;
    while polygon.len() > 3 {
        if guard == 0 {
            return Err(Error::InconsistentPolygons(
                "ear clipping does not terminate; a loop self-intersects".into(),
            ));
        }
        guard -= 1;
        let n = polygon.len();
        let mut best: Option<(f64, usize)> = None;
        for i in 0..n {
            let (ia, ib, ic) = (
                polygon[(i + n - 1) % n],
                polygon[i],
                polygon[(i + 1) % n],
            );
            let (a, b, c) = (
                points[ia as usize],
                points[ib as usize],
                points[ic as usize],
            );
            if cross2(a, b, c) <= ZERO {
                continue;
            }
            // no other vertex may lie inside the candidate ear
            let blocked = polygon.iter().any(|&j| {
                if j == ia || j == ib || j == ic {
                    return false;
                }
                point_in_triangle(points[j as usize], a, b, c)
            });
            if blocked {
                continue;
            }
            let quality = min_angle(a, b, c);
            if best.map(|(q, _)| quality > q).unwrap_or(true) {
                best = Some((quality, i));
            }
        }
        match best {
            Some((_, i)) => {
                let n = polygon.len();
                triangles.push(polygon[(i + n - 1) % n]);
                triangles.push(polygon[i]);
                triangles.push(polygon[(i + 1) % n]);
                polygon.remove(i);
            }
            None => {
                // only degenerate corners remain: drop a collinear vertex
                let n = polygon.len();
                let degenerate = (0..n).find(|&i| {
                    let a = points[polygon[(i + n - 1) % n] as usize];
                    let b = points[polygon[i] as usize];
                    let c = points[polygon[(i + 1) % n] as usize];
                    cross2(a, b, c).abs() <= ZERO
                });
                match degenerate {
                    Some(i) => {
                        polygon.remove(i);
                    }
                    None => {
                        return Err(Error::InconsistentPolygons(
                            "no ear found; a loop self-intersects".into(),
                        ))
                    }
                }
            }
        }
    }
    if polygon.len() == 3 {
        let (a, b, c) = (
            points[polygon[0] as usize],
            points[polygon[1] as usize],
            points[polygon[2] as usize],
        );
        if cross2(a, b, c) > ZERO {
            triangles.extend_from_slice(&polygon);
        }
    }
    Ok(())
}

fn min_angle(a: Point2, b: Point2, c: Point2) -> f64 {
    let la = b.distance(c);
    let lb = c.distance(a);
    let lc = a.distance(b);
    let angle = |opp: f64, s1: f64, s2: f64| -> f64 {
        f64::acos(f64::clamp((s1 * s1 + s2 * s2 - opp * opp) / (2.0 * s1 * s2), -1.0, 1.0))
    };
    angle(la, lb, lc).min(angle(lb, lc, la)).min(angle(lc, la, lb))
}

/// Builds the triangle-to-triangle adjacency array for flat triangles.
pub fn build_adjacencies(triangles: &[u32]) -> Vec<u32> {
    let mut map = std::collections::BTreeMap::<(u32, u32), u32>::new();
    for (t, tri) in triangles.chunks_exact(3).enumerate() {
        for k in 0..3 {
            map.insert((tri[k], tri[(k + 1) % 3]), (t * 3) as u32 + k as u32);
        }
    }
    let mut adjacencies = vec![NO_NEIGHBOR; triangles.len()];
    for (t, tri) in triangles.chunks_exact(3).enumerate() {
        for k in 0..3 {
            if let Some(&slot) = map.get(&(tri[(k + 1) % 3], tri[k])) {
                adjacencies[t * 3 + k] = slot - slot % 3;
            }
        }
    }
    adjacencies
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_points() -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(4.0, 4.0),
            Point2::new(0.0, 4.0),
            // hole, clockwise
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 3.0),
            Point2::new(3.0, 3.0),
            Point2::new(3.0, 1.0),
        ]
    }

    fn area_of(triangles: &[u32], points: &[Point2]) -> f64 {
        triangles
            .chunks_exact(3)
            .map(|t| {
                cross2(
                    points[t[0] as usize],
                    points[t[1] as usize],
                    points[t[2] as usize],
                ) * 0.5
            })
            .sum()
    }

    #[test]
    fn convex_polygon() {
        let points = square_points();
        let (triangles, adjacencies) =
            triangulate_polygon(&points, &[vec![0, 1, 2, 3]]).unwrap();
        assert_eq!(triangles.len(), 6);
        assert_eq!(adjacencies.len(), 6);
        assert!((area_of(&triangles, &points) - 16.0).abs() < 1.0e-12);
        // exactly one shared side
        let boundary = adjacencies.iter().filter(|&&a| a == NO_NEIGHBOR).count();
        assert_eq!(boundary, 4);
    }

    #[test]
    fn square_with_hole() {
        let points = square_points();
        let polygons = vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7]];
        let (triangles, _) = triangulate_polygon(&points, &polygons).unwrap();
        // area is outer minus hole
        assert!((area_of(&triangles, &points) - 12.0).abs() < 1.0e-9);
        // every triangle is counter-clockwise
        for t in triangles.chunks_exact(3) {
            assert!(
                cross2(
                    points[t[0] as usize],
                    points[t[1] as usize],
                    points[t[2] as usize]
                ) > 0.0
            );
        }
    }

    #[test]
    fn short_loop_is_rejected() {
        let points = square_points();
        assert!(matches!(
            triangulate_polygon(&points, &[vec![0, 1]]),
            Err(Error::InconsistentPolygons(_))
        ));
    }

    #[test]
    fn adjacency_is_symmetric() {
        let points = square_points();
        let (triangles, adjacencies) =
            triangulate_polygon(&points, &[vec![0, 1, 2, 3], vec![4, 5, 6, 7]]).unwrap();
        for (t, tri) in triangles.chunks_exact(3).enumerate() {
            for k in 0..3 {
                let n = adjacencies[t * 3 + k];
                if n == NO_NEIGHBOR {
                    continue;
                }
                let n = n as usize;
                // the neighbor must point back at this triangle
                let back = (0..3).any(|j| adjacencies[n + j] as usize == t * 3);
                assert!(back, "triangle {t} side {k} neighbor {n} has no back pointer");
                // and must share the two corners
                let (a, b) = (tri[k], tri[(k + 1) % 3]);
                let ntri = &triangles[n..n + 3];
                assert!(ntri.contains(&a) && ntri.contains(&b));
            }
        }
    }
}
