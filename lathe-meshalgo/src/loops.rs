use crate::errors::{Error, Result};
use crate::facet_edge::facet_edge;
use crate::options::FacetOptions;
use lathe_base::prelude::*;
use lathe_geometry::surfaces::Surface;
use lathe_topology::{EdgeSide, EntityId, FaceId, Thing};

/// one point of a facetted face boundary
#[derive(Clone, Copy, Debug)]
pub struct LoopNode {
    /// parameter-space position
    pub uv: Point2,
    /// space position
    pub pos: Point3,
    /// the face, edge, or vertex this point belongs to
    pub owner: EntityId,
}

/// Builds the closed boundary loops of a face in parameter space: edge
/// polylines mapped through the surface inverse with seam unwrapping,
/// open pieces closed along the domain boundary (crossing seams and
/// singular lines), and a synthesized whole-rectangle loop when the face
/// has no outer boundary.
pub fn facet_face_loops(
    thing: &Thing,
    face_id: FaceId,
    options: &FacetOptions,
) -> Result<Vec<Vec<LoopNode>>> {
    let face = thing.face(face_id)?;
    let surface_id = face.surface().ok_or_else(|| {
        lathe_topology::Error::TopologyCorrupt(format!("face {face_id:?} has no surface"))
    })?;
    let surface = thing.surface(surface_id)?;
    let domain = surface.domain();
    let effective = inset_domain(surface, options);

    let mut closed: Vec<Vec<LoopNode>> = Vec::new();
    let mut open: Vec<Vec<LoopNode>> = Vec::new();
    for cycle in thing.find_loops(face_id)? {
        let piece = assemble_piece(thing, surface, &cycle, options)?;
        if piece.len() < 2 {
            continue;
        }
        let mut piece = normalize_piece(piece, surface);
        let first = piece[0].uv;
        let last = piece[piece.len() - 1].uv;
        if first.distance(last) < 1.0e-3 {
            piece.pop();
            closed.push(piece);
        } else {
            open.push(piece);
        }
    }

    match open.len() {
        0 => {}
        1 => {
            let piece = open.pop().expect("one open piece");
            closed.push(close_single_piece(surface, face_id, piece, effective, options)?);
        }
        2 => {
            let piece1 = open.pop().expect("two open pieces");
            let piece0 = open.pop().expect("two open pieces");
            closed.push(connect_two_pieces(surface, face_id, piece0, piece1, options));
        }
        n => {
            return Err(Error::InconsistentPolygons(format!(
                "{n} boundary pieces stay open in parameter space"
            )))
        }
    }

    // without a counter-clockwise outer loop, the face covers the whole
    // parameter rectangle; synthesize that outer boundary
    if !closed.iter().any(|piece| loop_orientation(piece)) {
        if domain.u.is_bounded() && domain.v.is_bounded() {
            closed.push(rectangle_loop(surface, face_id, effective, options));
        } else if closed.is_empty() {
            return Err(Error::InconsistentPolygons(
                "no boundary loops on an unbounded surface".into(),
            ));
        }
    }
    Ok(closed)
}

/// The parameter rectangle with every singular side pulled in to a short
/// ring line: the artificial edge spanning the singular direction that
/// keeps the mesher from collapsing triangles onto the singularity. The
/// gap between ring and pole is closed afterwards by directly emitted
/// polar fan triangles.
pub fn inset_domain(surface: &Surface, options: &FacetOptions) -> Interval2D {
    let domain = surface.domain();
    let (mut u, mut v) = (domain.u, domain.v);
    let inset = |span: f64| f64::min(options.edge_angle_tol, span * 0.1);
    if surface.singular_low_u() {
        u.min += inset(u.length());
    }
    if surface.singular_high_u() {
        u.max -= inset(u.length());
    }
    if surface.singular_low_v() {
        v.min += inset(v.length());
    }
    if surface.singular_high_v() {
        v.max -= inset(v.length());
    }
    Interval2D::new(u, v)
}

/// signed orientation of a uv loop, true = counter-clockwise
pub fn loop_orientation(piece: &[LoopNode]) -> bool {
    let n = piece.len();
    (0..n)
        .map(|i| {
            let p = piece[i].uv;
            let q = piece[(i + 1) % n].uv;
            (q.x + p.x) * (q.y - p.y)
        })
        .sum::<f64>()
        > 0.0
}

/// whether `uv` lies inside the region bounded by the loops, by a
/// jittered crossing ray
pub fn point_in_loops(loops: &[Vec<LoopNode>], uv: Point2) -> bool {
    use itertools::Itertools;
    let dir = lathe_base::hash::jitter_direction(uv);
    let mut counter = 0i32;
    for piece in loops {
        for (na, nb) in piece.iter().circular_tuple_windows() {
            let a = na.uv - uv;
            let b = nb.uv - uv;
            let s0 = dir.perp_dot(a);
            let s1 = dir.perp_dot(b);
            let s2 = a.perp_dot(b);
            if (s1 - s0).so_small() {
                continue;
            }
            let x = s2 / (s1 - s0);
            if x > 0.0 && s0 <= 0.0 && s1 > 0.0 {
                counter += 1;
            } else if x > 0.0 && s0 >= 0.0 && s1 < 0.0 {
                counter -= 1;
            }
        }
    }
    counter > 0
}

fn assemble_piece(
    thing: &Thing,
    surface: &Surface,
    cycle: &[(lathe_topology::EdgeId, EdgeSide)],
    options: &FacetOptions,
) -> Result<Vec<LoopNode>> {
    let mut nodes: Vec<LoopNode> = Vec::new();
    let mut previous: Option<Point2> = None;
    for &(edge_id, side) in cycle {
        let facets = facet_edge(thing, edge_id, options)?;
        let edge = thing.edge(edge_id)?;
        let m = facets.points.len();
        let forward = side != EdgeSide::Right;
        let order: Vec<usize> = match forward {
            true => (0..m).collect(),
            false => (0..m).rev().collect(),
        };
        let (head_vertex, _) = match forward {
            true => (edge.start(), edge.end()),
            false => (edge.end(), edge.start()),
        };
        for (k, &i) in order.iter().enumerate().take(m - 1) {
            let pos = facets.points[i];
            let (mut uv, _) = surface.inverse(pos, previous);
            if let Some(prev) = previous {
                uv = unwrap_uv(uv, prev, surface);
            }
            previous = Some(uv);
            let owner: EntityId = match (k, head_vertex) {
                (0, Some(v)) => v.into(),
                _ => edge_id.into(),
            };
            nodes.push(LoopNode { uv, pos, owner });
        }
    }
    // re-append the closing point so openness is measurable
    if let Some(&(edge_id, side)) = cycle.last() {
        let facets = facet_edge(thing, edge_id, options)?;
        let edge = thing.edge(edge_id)?;
        let forward = side != EdgeSide::Right;
        let i = match forward {
            true => facets.points.len() - 1,
            false => 0,
        };
        let pos = facets.points[i];
        let (mut uv, _) = surface.inverse(pos, previous);
        if let Some(prev) = previous {
            uv = unwrap_uv(uv, prev, surface);
        }
        let tail_vertex = match forward {
            true => edge.end(),
            false => edge.start(),
        };
        let owner: EntityId = match tail_vertex {
            Some(v) => v.into(),
            None => edge_id.into(),
        };
        nodes.push(LoopNode { uv, pos, owner });
    }
    Ok(nodes)
}

/// moves `uv` by whole periods to the representative closest to `prev`
fn unwrap_uv(uv: Point2, prev: Point2, surface: &Surface) -> Point2 {
    let mut uv = uv;
    if let Some(period) = surface.u_period() {
        uv.x = min_diff(uv.x, prev.x, period);
    }
    if let Some(period) = surface.v_period() {
        uv.y = min_diff(uv.y, prev.y, period);
    }
    uv
}

fn min_diff(x: f64, reference: f64, period: f64) -> f64 {
    (-2..=2)
        .map(|k| x + k as f64 * period)
        .min_by(|a, b| {
            f64::abs(a - reference)
                .partial_cmp(&f64::abs(b - reference))
                .unwrap()
        })
        .unwrap()
}

/// shifts a piece by whole periods so its centroid lies in the domain
fn normalize_piece(mut piece: Vec<LoopNode>, surface: &Surface) -> Vec<LoopNode> {
    let domain = surface.domain();
    let n = piece.len() as f64;
    let grav = piece
        .iter()
        .fold(Vector2::zero(), |acc, node| acc + node.uv.to_vec())
        / n;
    if let Some(period) = surface.u_period() {
        let quot = f64::floor((grav.x - domain.u.min) / period);
        piece.iter_mut().for_each(|node| node.uv.x -= quot * period);
    }
    if let Some(period) = surface.v_period() {
        let quot = f64::floor((grav.y - domain.v.min) / period);
        piece.iter_mut().for_each(|node| node.uv.y -= quot * period);
    }
    piece
}

/// Closes a single open piece around the parameter rectangle: the closure
/// runs along the domain boundary, crossing the seam and any singular
/// boundary lines (the artificial edges that keep the mesher off the
/// singularity).
fn close_single_piece(
    surface: &Surface,
    face_id: FaceId,
    piece: Vec<LoopNode>,
    domain: Interval2D,
    options: &FacetOptions,
) -> Result<Vec<LoopNode>> {
    let p = piece[0];
    let q = piece[piece.len() - 1];
    let (u0, u1) = (domain.u.min, domain.u.max);
    let (v0, v1) = (domain.v.min, domain.v.max);
    let tol = TOLERANCE;
    // pick the pair of corners the closure passes through; the open ends
    // differ by a period in u or in v
    let corners: [Point2; 2] = if p.uv.x < q.uv.x - tol {
        [Point2::new(u1, v1), Point2::new(u0, v1)]
    } else if q.uv.x < p.uv.x - tol {
        [Point2::new(u0, v0), Point2::new(u1, v0)]
    } else if p.uv.y < q.uv.y - tol {
        [Point2::new(u0, v1), Point2::new(u0, v0)]
    } else if q.uv.y < p.uv.y - tol {
        [Point2::new(u1, v0), Point2::new(u1, v1)]
    } else {
        return Err(Error::InconsistentPolygons(
            "an open boundary piece does not span a closed direction".into(),
        ));
    };
    let mut closed = piece;
    let from = q.uv;
    let mut chain = Vec::new();
    chain.extend(polyline_on_surface(surface, face_id, from, corners[0], options));
    chain.extend(polyline_on_surface(surface, face_id, corners[0], corners[1], options));
    chain.extend(polyline_on_surface(surface, face_id, corners[1], p.uv, options));
    // drop the duplicated junction nodes at both ends of the chain
    closed.extend(chain.into_iter().skip(1));
    closed.pop();
    Ok(closed)
}

/// Connects two open pieces into one loop: piece0, a boundary chain to the
/// start of piece1, piece1, and a chain back (the two sides of the seam).
fn connect_two_pieces(
    surface: &Surface,
    face_id: FaceId,
    piece0: Vec<LoopNode>,
    piece1: Vec<LoopNode>,
    options: &FacetOptions,
) -> Vec<LoopNode> {
    let p1 = piece0[piece0.len() - 1].uv;
    let q0 = piece1[0].uv;
    let q1 = piece1[piece1.len() - 1].uv;
    let p0 = piece0[0].uv;
    let mut out = piece0;
    out.extend(polyline_on_surface(surface, face_id, p1, q0, options).into_iter().skip(1));
    out.pop();
    out.extend(piece1);
    out.extend(polyline_on_surface(surface, face_id, q1, p0, options).into_iter().skip(1));
    out.pop();
    out
}

/// the whole parameter rectangle as a counter-clockwise loop
fn rectangle_loop(
    surface: &Surface,
    face_id: FaceId,
    domain: Interval2D,
    options: &FacetOptions,
) -> Vec<LoopNode> {
    let corners = [
        Point2::new(domain.u.min, domain.v.min),
        Point2::new(domain.u.max, domain.v.min),
        Point2::new(domain.u.max, domain.v.max),
        Point2::new(domain.u.min, domain.v.max),
    ];
    let mut out = Vec::new();
    for i in 0..4 {
        let mut side =
            polyline_on_surface(surface, face_id, corners[i], corners[(i + 1) % 4], options);
        side.pop();
        out.extend(side);
    }
    out
}

/// A straight uv chord sampled onto the surface, recursively refined while
/// the surface normal turns more than the face angle tolerance across a
/// sub-chord. Includes both end nodes.
fn polyline_on_surface(
    surface: &Surface,
    face_id: FaceId,
    from: Point2,
    to: Point2,
    options: &FacetOptions,
) -> Vec<LoopNode> {
    let owner: EntityId = face_id.into();
    let node = |uv: Point2| LoopNode {
        uv,
        pos: surface.subs(uv.x, uv.y),
        owner,
    };
    let mut out = vec![node(from)];
    refine(surface, from, to, options, 0, &mut |uv| out.push(node(uv)));
    out.push(node(to));
    out
}

/// recursive midpoint insertion while normals across the chord disagree
fn refine(
    surface: &Surface,
    from: Point2,
    to: Point2,
    options: &FacetOptions,
    depth: usize,
    emit: &mut impl FnMut(Point2),
) {
    if depth >= 8 {
        return;
    }
    let mid = Point2::new((from.x + to.x) * 0.5, (from.y + to.y) * 0.5);
    let n0 = surface.normal(from.x, from.y);
    let n1 = surface.normal(to.x, to.y);
    let nm = surface.normal(mid.x, mid.y);
    let cos_tol = f64::cos(options.face_angle_tol);
    let split = [n0, n1]
        .iter()
        .any(|n| !n.magnitude().so_small() && !nm.magnitude().so_small() && n.dot(nm) < cos_tol)
        || (!n0.magnitude().so_small() && !n1.magnitude().so_small() && n0.dot(n1) < cos_tol);
    if split {
        refine(surface, from, mid, options, depth + 1, emit);
        emit(mid);
        refine(surface, mid, to, options, depth + 1, emit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lathe_geometry::curves::Circle;
    use lathe_geometry::surfaces::{Cylinder, Sphere};
    use std::f64::consts::PI;

    fn cylinder_face(thing: &mut Thing) -> FaceId {
        let surface = thing.add_surface(
            Cylinder::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0), 1.0, None)
                .into(),
        );
        let face = thing.add_face(None).unwrap();
        thing.face_set_surface(face, surface).unwrap();
        let bottom = thing.add_curve(
            Circle::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0), 1.0, None)
                .into(),
        );
        let top = thing.add_curve(
            Circle::new(Point3::new(0.0, 0.0, 2.0), Vector3::new(0.0, 0.0, 1.0), 1.0, None)
                .into(),
        );
        let bottom_edge = thing.add_edge(bottom).unwrap();
        let top_edge = thing.add_edge(top).unwrap();
        thing
            .face_add_edge(face, bottom_edge, EdgeSide::Left)
            .unwrap();
        thing.face_add_edge(face, top_edge, EdgeSide::Right).unwrap();
        face
    }

    #[test]
    fn sphere_face_synthesizes_rectangle() {
        let mut thing = Thing::new();
        let surface =
            thing.add_surface(Sphere::new(Point3::new(0.0, 0.0, 0.0), 1.0).into());
        let face = thing.add_face(None).unwrap();
        thing.face_set_surface(face, surface).unwrap();
        let options = FacetOptions::default();
        let loops = facet_face_loops(&thing, face, &options).unwrap();
        assert_eq!(loops.len(), 1);
        assert!(loop_orientation(&loops[0]));
        // the loop traces the parameter rectangle, with the polar sides
        // pulled in to the singular ring lines
        let us: Vec<f64> = loops[0].iter().map(|n| n.uv.x).collect();
        let vs: Vec<f64> = loops[0].iter().map(|n| n.uv.y).collect();
        let span_u = us.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b))
            - us.iter().fold(f64::INFINITY, |a, &b| a.min(b));
        let span_v = vs.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b))
            - vs.iter().fold(f64::INFINITY, |a, &b| a.min(b));
        assert!((span_u - 2.0 * PI).abs() < 1.0e-9);
        assert!((span_v - (PI - 2.0 * options.edge_angle_tol)).abs() < 1.0e-9);
        // nothing on the loop sits on a singularity
        for node in &loops[0] {
            assert!(!thing
                .surface(thing.face(face).unwrap().surface().unwrap())
                .unwrap()
                .is_singularity(node.uv, 1.0e-6));
        }
    }

    #[test]
    fn cylinder_face_connects_open_pieces() {
        let mut thing = Thing::new();
        let face = cylinder_face(&mut thing);
        let loops = facet_face_loops(&thing, face, &FacetOptions::default()).unwrap();
        assert_eq!(loops.len(), 1);
        assert!(loop_orientation(&loops[0]), "outer loop must be counter-clockwise");
        // interior point is inside, exterior outside
        assert!(point_in_loops(&loops, Point2::new(PI, 1.0)));
        assert!(!point_in_loops(&loops, Point2::new(PI, 5.0)));
    }
}
