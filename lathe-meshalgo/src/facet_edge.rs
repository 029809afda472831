use crate::errors::Result;
use crate::facet_curve::facet_curve;
use crate::options::FacetOptions;
use lathe_base::prelude::*;
use lathe_geometry::curves::Curve;
use lathe_geometry::surfaces::Surface;
use lathe_topology::{EdgeFacets, EdgeId, Thing};
use std::sync::Arc;

/// Facets an edge: the curve polyline, split wherever it crosses a seam of
/// an adjoining surface and wherever adjoining surface normals turn more
/// than the edge angle tolerance. The polyline is cached on the edge.
pub fn facet_edge(thing: &Thing, edge_id: EdgeId, options: &FacetOptions) -> Result<Arc<EdgeFacets>> {
    let edge = thing.edge(edge_id)?;
    if let Some(facets) = edge.facets() {
        return Ok(facets);
    }
    let curve_id = edge.curve().ok_or_else(|| {
        lathe_topology::Error::TopologyCorrupt(format!("edge {edge_id:?} has no curve"))
    })?;
    let curve = thing.curve(curve_id)?;
    let (mut params, mut points) = facet_curve(curve, edge.domain(), options);

    // collect the surfaces of the faces using this edge
    let mut surfaces: Vec<&Surface> = Vec::new();
    for &face in edge.faces() {
        if let Some(surface) = thing.face(face)?.surface() {
            surfaces.push(thing.surface(surface)?);
        }
    }
    for surface in &surfaces {
        split_at_seams(curve, surface, &mut params, &mut points);
        split_with_surface_normals(curve, surface, options, &mut params, &mut points);
    }

    let facets = EdgeFacets { params, points };
    edge.set_facets(facets);
    Ok(edge.facets().expect("just stored"))
}

/// Inserts samples at seam crossings of `surface`: wherever consecutive
/// samples land more than half a period apart in u or v, the crossing
/// parameter is located and both sides get a sample just off the seam.
fn split_at_seams(
    curve: &Curve,
    surface: &Surface,
    params: &mut Vec<f64>,
    points: &mut Vec<Point3>,
) {
    let (u_period, v_period) = (surface.u_period(), surface.v_period());
    if u_period.is_none() && v_period.is_none() {
        return;
    }
    let mut idx = 0;
    let mut guard = 0;
    while idx + 1 < params.len() && guard < 10_000 {
        guard += 1;
        let (uv0, _) = surface.inverse(points[idx], None);
        let (uv1, _) = surface.inverse(points[idx + 1], None);
        let jump_u = u_period.map(|p| f64::abs(uv1.x - uv0.x) > 0.5 * p).unwrap_or(false);
        let jump_v = v_period.map(|p| f64::abs(uv1.y - uv0.y) > 0.5 * p).unwrap_or(false);
        if (jump_u || jump_v) && params[idx + 1] - params[idx] > TOLERANCE {
            let t = find_crossing_param(curve, surface, params[idx], params[idx + 1], jump_u);
            // keep strictly interior splits only
            if t - params[idx] > TOLERANCE && params[idx + 1] - t > TOLERANCE {
                params.insert(idx + 1, t);
                points.insert(idx + 1, curve.subs(t));
                continue;
            }
        }
        idx += 1;
    }
}

/// Bisection on the curve parameter for the point where the polyline
/// crosses the seam, classified by which side of the period the sample
/// falls on.
fn find_crossing_param(curve: &Curve, surface: &Surface, t0: f64, t1: f64, in_u: bool) -> f64 {
    let domain = surface.domain();
    let period = match in_u {
        true => domain.u,
        false => domain.v,
    };
    let side = |t: f64| -> bool {
        let (uv, _) = surface.inverse(curve.subs(t), None);
        let x = match in_u {
            true => uv.x,
            false => uv.y,
        };
        x - period.min > period.length() * 0.5
    };
    let side0 = side(t0);
    let (mut lo, mut hi) = (t0, t1);
    for _ in 0..50 {
        let mid = (lo + hi) * 0.5;
        if side(mid) == side0 {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    (lo + hi) * 0.5
}

/// Inserts midpoints wherever consecutive samples see the surface normal
/// turn by more than the edge angle tolerance.
fn split_with_surface_normals(
    curve: &Curve,
    surface: &Surface,
    options: &FacetOptions,
    params: &mut Vec<f64>,
    points: &mut Vec<Point3>,
) {
    let cos_tol = f64::cos(options.edge_angle_tol);
    let normal_at = |pos: Point3, guess: Option<Point2>| -> (Vector3, Point2) {
        let (uv, _) = surface.inverse(pos, guess);
        (surface.normal(uv.x, uv.y), uv)
    };
    let mut idx = 0;
    while idx + 1 < params.len() && params.len() < options.max_facets {
        let (n0, uv0) = normal_at(points[idx], None);
        let (n1, _) = normal_at(points[idx + 1], Some(uv0));
        let span = params[idx + 1] - params[idx];
        if n0.magnitude().so_small() || n1.magnitude().so_small() {
            idx += 1;
            continue;
        }
        if n0.dot(n1) < cos_tol && span > TOLERANCE {
            let t = (params[idx] + params[idx + 1]) * 0.5;
            params.insert(idx + 1, t);
            points.insert(idx + 1, curve.subs(t));
        } else {
            idx += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lathe_geometry::curves::Circle;
    use lathe_geometry::surfaces::Cylinder;

    #[test]
    fn seam_crossing_gets_split() {
        let mut thing = Thing::new();
        // circle around a cylinder, starting at the seam
        let cylinder: Surface =
            Cylinder::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0), 1.0, None)
                .into();
        let circle: Curve = Circle::new(
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            1.0,
            Some(Vector3::new(-1.0, 0.0, 0.0)),
        )
        .into();
        let surface = thing.add_surface(cylinder);
        let curve = thing.add_curve(circle);
        let face = thing.add_face(None).unwrap();
        thing.face_set_surface(face, surface).unwrap();
        let edge = thing.add_edge(curve).unwrap();
        thing
            .face_add_edge(face, edge, lathe_topology::EdgeSide::Left)
            .unwrap();

        let facets = facet_edge(&thing, edge, &FacetOptions::default()).unwrap();
        assert!(facets.points.len() > 3);
        // the polyline tracks the circle
        for p in &facets.points {
            assert!((f64::sqrt(p.x * p.x + p.y * p.y) - 1.0).abs() < 0.01);
        }
        // a sample lands within tolerance of the seam at x > 0, y = 0
        let min_angle = facets
            .points
            .iter()
            .map(|p| f64::abs(f64::atan2(p.y, p.x)))
            .fold(f64::INFINITY, f64::min);
        assert!(min_angle < 0.05, "closest sample angle {min_angle}");
    }
}
