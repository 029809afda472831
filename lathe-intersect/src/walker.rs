use crate::errors::{Error, Result};
use crate::types::InterruptFlag;
use lathe_base::prelude::*;
use lathe_base::segment::find_lengths;
use lathe_geometry::curves::Hermite;
use lathe_geometry::surfaces::Surface;
use log::{debug, warn};

/// the line of two non-parallel planes
pub(crate) fn intersect_non_parallel_planes(
    origin1: Point3,
    normal1: Vector3,
    origin2: Point3,
    normal2: Vector3,
) -> Option<(Point3, Vector3)> {
    let axis = normal1.cross(normal2);
    let m = axis.magnitude();
    if m < ZERO {
        return None;
    }
    let axis = axis / m;
    // solve for the point nearest the two origins on both planes
    let mat = Matrix3::from_cols(normal1, normal2, axis).transpose();
    let rhs = Vector3::new(
        origin1.to_vec().dot(normal1),
        origin2.to_vec().dot(normal2),
        origin1.midpoint(origin2).to_vec().dot(axis),
    );
    let inv = mat.invert()?;
    Some((Point3::from_vec(inv * rhs), axis))
}

/// Alternate tangent-plane projection: drives `pos` onto the intersection
/// of the two surfaces until consecutive estimates agree to the minimum
/// tolerance.
pub fn zoom_in(pos: Point3, surface1: &Surface, surface2: &Surface) -> Point3 {
    let mut answer = pos;
    let mut guess1 = None;
    let mut guess2 = None;
    for _ in 0..100 {
        let old = answer;
        let (uv1, pos1) = surface1.inverse(answer, guess1);
        let (uv2, pos2) = surface2.inverse(answer, guess2);
        guess1 = Some(uv1);
        guess2 = Some(uv2);
        let n1 = surface1.normal(uv1.x, uv1.y);
        let n2 = surface2.normal(uv2.x, uv2.y);
        let Some((origin, axis)) = intersect_non_parallel_planes(pos1, n1, pos2, n2) else {
            break;
        };
        let p1 = origin + axis * (pos1 - origin).dot(axis);
        let p2 = origin + axis * (pos2 - origin).dot(axis);
        answer = p1.midpoint(p2);
        if old.distance(answer) < ZERO {
            break;
        }
    }
    answer
}

#[derive(Clone, Copy, Debug)]
struct HermiteNode {
    param: f64,
    pos: Point3,
    tan: Vector3,
}

/// Whether the cubic midpoint of two hermite nodes strays from the exact
/// intersection; when it does, the exact midpoint node comes back for
/// insertion.
fn mid_point_is_off(
    node1: &HermiteNode,
    node2: &HermiteNode,
    surface1: &Surface,
    surface2: &Surface,
) -> Option<HermiteNode> {
    let (t1, t2) = (node1.param, node2.param);
    let t3 = (t1 + t2) * 0.5;
    let s = (t3 - t1) / (t2 - t1);
    let h1 = (s * s) * (2.0 * s - 3.0) + 1.0;
    let h2 = 1.0 - h1;
    let h3 = s * (s * (s - 2.0) + 1.0);
    let h4 = (s * s) * (s - 1.0);
    let v1 = node1.tan * (t2 - t1);
    let v2 = node2.tan * (t2 - t1);
    let mid = Point3::from_vec(
        node1.pos.to_vec() * h1 + node2.pos.to_vec() * h2 + v1 * h3 + v2 * h4,
    );
    let exact = zoom_in(mid, surface1, surface2);
    if exact.distance2(mid) <= FIT_SMALL {
        return None;
    }
    let (uv1, _) = surface1.inverse(exact, None);
    let (uv2, _) = surface2.inverse(exact, None);
    let tan = surface1
        .normal(uv1.x, uv1.y)
        .cross(surface2.normal(uv2.x, uv2.y));
    if tan.magnitude().so_small() {
        return None;
    }
    Some(HermiteNode {
        param: t3,
        pos: exact,
        tan: tan.normalize(),
    })
}

fn walk_direction(pos: Point3, surface1: &Surface, surface2: &Surface) -> Option<(Vector3, Point2, Point2)> {
    let (uv1, _) = surface1.inverse(pos, None);
    let (uv2, _) = surface2.inverse(pos, None);
    let dir = surface1
        .normal(uv1.x, uv1.y)
        .cross(surface2.normal(uv2.x, uv2.y));
    let m = dir.magnitude();
    match m < ZERO {
        true => None,
        false => Some((dir / m, uv1, uv2)),
    }
}

/// Traces the intersection curve of two surfaces from `start`: advance a
/// marker along the cross product of the two normals, the step sized by
/// the directional curvatures, halved on overshoot or direction flip, each
/// accepted position refined by [`zoom_in`]. The walk ends on rejoining
/// the start or passing an end candidate along the tangent. The samples
/// are refined into a hermite curve wherever the cubic midpoint strays
/// from the exact intersection.
pub fn walk_from_to(
    start: Point3,
    end_candidates: &[Point3],
    surface1: &Surface,
    surface2: &Surface,
    interrupt: InterruptFlag<'_>,
) -> Result<Hermite> {
    let curve = walk_from_to_sub(start, end_candidates, surface1, surface2, interrupt)?;
    if curve.is_closed() {
        return Ok(curve);
    }
    // the walk ran off one way; retrace with the surfaces swapped and glue
    // the halves together
    debug!("open walk, retracing the other way");
    let reversed = walk_from_to_sub(start, end_candidates, surface2, surface1, interrupt)?;
    let mut curve = curve;
    curve.negate();
    curve.concat(&reversed);
    Ok(curve)
}

fn walk_from_to_sub(
    start: Point3,
    end_candidates: &[Point3],
    surface1: &Surface,
    surface2: &Surface,
    interrupt: InterruptFlag<'_>,
) -> Result<Hermite> {
    let mut points: Vec<Point3> = Vec::new();
    let mut tangents: Vec<Vector3> = Vec::new();
    let mut current = zoom_in(start, surface1, surface2);
    let Some((mut walk_dir, mut uv1, mut uv2)) = walk_direction(current, surface1, surface2)
    else {
        return Err(Error::GeometryDegenerate(
            "the surfaces are tangent at the walk start".into(),
        ));
    };
    let walk_fraction = 0.5;

    let mut found = false;
    let mut iterations = 0usize;
    while !found {
        iterations += 1;
        if iterations > 10_000 {
            warn!("surface walk did not close after {iterations} steps");
            break;
        }
        if let Some(interrupt) = interrupt {
            if interrupt() {
                return Err(Error::Interrupted);
            }
        }
        // how far to walk: bounded by the tighter directional curvature
        let c1 = surface1.directional_curvature(uv1, walk_dir);
        let c2 = surface2.directional_curvature(uv2, walk_dir);
        let c_max = f64::max(c1.abs(), c2.abs());
        let radius = match c_max < ZERO {
            true => MAX_VALUE,
            false => 1.0 / c_max,
        };
        let mut walk_dist = radius * walk_fraction;

        points.push(current);
        tangents.push(walk_dir);

        // back off while the step would leave either surface
        let mut pos = current + walk_dir * walk_dist;
        for surface in [surface1, surface2] {
            loop {
                let (_, close) = surface.inverse(pos, None);
                let dist = pos.distance(close);
                if FIT < dist && 0.1 < dist / walk_dist {
                    walk_dist *= 0.5;
                    pos = current + walk_dir * walk_dist;
                } else {
                    break;
                }
            }
        }

        // back off while the step flips the walking direction
        loop {
            let test = zoom_in(pos, surface1, surface2);
            match walk_direction(test, surface1, surface2) {
                Some((new_dir, new_uv1, new_uv2)) if walk_dir.dot(new_dir) >= 0.0 => {
                    walk_dir = new_dir;
                    uv1 = new_uv1;
                    uv2 = new_uv2;
                    current = test;
                    break;
                }
                _ => {
                    walk_dist *= 0.5;
                    if walk_dist < TOLERANCE {
                        // stuck against a tangency; emit what we have
                        warn!("surface walk stalled at a tangency");
                        found = true;
                        break;
                    }
                    pos = current + walk_dir * walk_dist;
                }
            }
        }
        if found {
            points.push(current);
            tangents.push(walk_dir);
            break;
        }

        if walk_dist > 1000.0 {
            // the surfaces straightened out; the curve leaves every box
            found = true;
            points.push(current);
            tangents.push(walk_dir);
        } else if !end_candidates.is_empty() {
            let (end_pos, end_dist) = end_candidates
                .iter()
                .map(|&p| (p, p.distance(current)))
                .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
                .expect("candidates are non-empty");
            let mut found_end = false;
            if end_dist < walk_dist {
                let toward = end_pos - current;
                if toward.magnitude().so_small() || toward.dot(walk_dir) > 0.0 {
                    found_end = true;
                }
            } else if let Some(&last) = points.last() {
                // check whether the step walked over the end point
                if TOLERANCE < last.distance(end_pos) {
                    let seg = Segment3::new(last, current);
                    if seg.point_on_segment(end_pos, walk_dist * 0.1) {
                        found_end = true;
                    }
                }
            }
            if found_end {
                points.push(end_pos);
                if start.distance(end_pos) < ZERO {
                    tangents.push(tangents[0]);
                } else {
                    let tan = end_tangent(end_pos, &points, surface1, surface2);
                    tangents.push(tan);
                }
                found = true;
            }
        } else if points.len() > 2 && current.distance(points[0]) < walk_dist * 0.5 {
            // no end candidates: the walk rejoins its start
            let toward = points[0] - current;
            if toward.magnitude().so_small() || toward.dot(walk_dir) > 0.0 {
                points.push(points[0]);
                tangents.push(tangents[0]);
                found = true;
            }
        }
    }

    // zero-length spans would break the hermite parameterization
    let mut clean_points: Vec<Point3> = Vec::with_capacity(points.len());
    let mut clean_tangents: Vec<Vector3> = Vec::with_capacity(tangents.len());
    for (p, t) in points.into_iter().zip(tangents) {
        if clean_points
            .last()
            .map(|q| q.distance(p) < TOLERANCE)
            .unwrap_or(false)
        {
            continue;
        }
        clean_points.push(p);
        clean_tangents.push(t);
    }
    let (points, tangents) = (clean_points, clean_tangents);
    let params = find_lengths(&points);
    let mut nodes: Vec<HermiteNode> = params
        .iter()
        .zip(&points)
        .zip(&tangents)
        .map(|((&param, &pos), &tan)| HermiteNode { param, pos, tan })
        .collect();

    // refine until the cubic matches the exact intersection
    let mut idx = 0;
    let mut guard = 0;
    while idx + 1 < nodes.len() && guard < 100_000 {
        guard += 1;
        if nodes[idx + 1].param - nodes[idx].param < TOLERANCE {
            idx += 1;
            continue;
        }
        match mid_point_is_off(&nodes[idx], &nodes[idx + 1], surface1, surface2) {
            Some(node) => nodes.insert(idx + 1, node),
            None => idx += 1,
        }
    }

    let (params, points): (Vec<f64>, Vec<Point3>) =
        nodes.iter().map(|n| (n.param, n.pos)).unzip();
    let tangents: Vec<Vector3> = nodes.iter().map(|n| n.tan).collect();
    Hermite::new(params, points, tangents).map_err(|e| {
        Error::GeometryDegenerate(format!("walk produced no usable samples: {e}"))
    })
}

/// tangent at the walk end; steps back when the end sits on a singularity
fn end_tangent(
    end_pos: Point3,
    points: &[Point3],
    surface1: &Surface,
    surface2: &Surface,
) -> Vector3 {
    let (uv1, _) = surface1.inverse(end_pos, None);
    let (uv2, _) = surface2.inverse(end_pos, None);
    let singular =
        surface1.is_singularity(uv1, TOLERANCE) || surface2.is_singularity(uv2, TOLERANCE);
    let mut tan = surface1
        .normal(uv1.x, uv1.y)
        .cross(surface2.normal(uv2.x, uv2.y));
    if singular || tan.magnitude() < 0.005 {
        if points.len() >= 2 {
            let step_back = points[points.len() - 2].midpoint(end_pos) + (end_pos - points[points.len() - 2]) * 0.49;
            let (uv1, _) = surface1.inverse(step_back, None);
            let (uv2, _) = surface2.inverse(step_back, None);
            tan = surface1
                .normal(uv1.x, uv1.y)
                .cross(surface2.normal(uv2.x, uv2.y));
        }
    }
    match tan.magnitude().so_small() {
        true => (end_pos - points[points.len() - 2]).normalize(),
        false => tan.normalize(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lathe_base::assert_near;
    use lathe_geometry::curves::Curve;
    use lathe_geometry::surfaces::{Cylinder, Sphere};
    use lathe_base::geom_traits::{BoundedCurve, ParametricCurve};

    #[test]
    fn plane_pair_line() {
        let hit = intersect_non_parallel_planes(
            Point3::new(0.0, 0.0, 1.0),
            Vector3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
        )
        .unwrap();
        let (origin, axis) = hit;
        assert_near!(origin.z, 1.0);
        assert_near!(origin.x, 1.0);
        assert_near!(f64::abs(axis.y), 1.0);
    }

    #[test]
    fn zoom_lands_on_both_surfaces() {
        let sphere: Surface = Sphere::new(Point3::new(0.0, 0.0, 0.0), 2.0).into();
        let cylinder: Surface = Cylinder::new(
            Point3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            1.0,
            None,
        )
        .into();
        let p = zoom_in(Point3::new(1.8, 0.9, 0.5), &sphere, &cylinder);
        let (_, on_sphere) = sphere.inverse(p, None);
        let (_, on_cylinder) = cylinder.inverse(p, None);
        assert!(p.distance(on_sphere) < 1.0e-6);
        assert!(p.distance(on_cylinder) < 1.0e-6);
    }

    #[test]
    fn walks_sphere_cylinder_loop() {
        // an off-axis cylinder pierces the sphere transversally; the
        // upper intersection loop closes on itself
        let sphere: Surface = Sphere::new(Point3::new(0.0, 0.0, 0.0), 2.0).into();
        let cylinder: Surface = Cylinder::new(
            Point3::new(0.5, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            1.0,
            None,
        )
        .into();
        let start = zoom_in(Point3::new(1.5, 0.0, 1.3), &sphere, &cylinder);
        let curve = walk_from_to(start, &[], &sphere, &cylinder, None).unwrap();
        assert!(curve.is_closed(), "the upper loop must close");
        // every sample lies on both surfaces, and the tangent is orthogonal
        // to both normals
        let curve: Curve = curve.into();
        let domain = curve.domain();
        for i in 0..=32 {
            let t = domain.mid_point(i as f64 / 32.0);
            let p = curve.subs(t);
            let (uv1, on1) = sphere.inverse(p, None);
            let (uv2, on2) = cylinder.inverse(p, None);
            assert!(p.distance(on1) < 1.0e-4, "off sphere by {}", p.distance(on1));
            assert!(p.distance(on2) < 1.0e-4);
            let tan = curve.der(t);
            if tan.magnitude().so_small() {
                continue;
            }
            let tan = tan.normalize();
            assert!(tan.dot(sphere.normal(uv1.x, uv1.y)).abs() < FIT * 10.0);
            assert!(tan.dot(cylinder.normal(uv2.x, uv2.y)).abs() < FIT * 10.0);
        }
    }
}
