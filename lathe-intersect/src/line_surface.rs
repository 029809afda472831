use crate::types::{order_and_dedup, Hit, IntersectionKind};
use lathe_base::prelude::*;
use lathe_base::solvers;
use lathe_geometry::surfaces::{Surface, SurfaceKind};

/// Intersects the whole line `origin + t * axis` with a surface. Total:
/// closed forms for the analytic kinds, seed grids plus projection
/// iteration for the free-form kinds. Hits come back ordered along the
/// axis and deduplicated within `tol`.
pub fn intersect_line_and_surface(
    origin: Point3,
    axis: Vector3,
    surface: &Surface,
    tol: f64,
) -> Vec<Hit> {
    let axis = axis.normalize();
    let tol = f64::max(tol, TOLERANCE);
    let hits = match surface {
        Surface::Plane(_) => line_plane(origin, axis, surface, tol),
        Surface::Sphere(s) => line_sphere(origin, axis, s.center(), s.radius(), surface, tol),
        Surface::Cylinder(s) => {
            line_cylinder(origin, axis, s.origin(), s.axis(), s.radius(), surface, tol)
        }
        Surface::Cone(_) => line_cone(origin, axis, surface, tol),
        Surface::Torus(_) => line_torus(origin, axis, surface, tol),
        _ => line_parametric(origin, axis, surface, tol),
    };
    order_and_dedup(origin, axis, hits, tol)
}

/// classification shared by every kind: tangent where the axis lies in
/// the tangent plane, or the surface point is singular
fn classify(surface: &Surface, axis: Vector3, pos: Point3) -> Hit {
    let (uv, close) = surface.inverse(pos, None);
    let n = surface.normal(uv.x, uv.y);
    let kind = match n.magnitude().so_small() || axis.dot(n).abs() < 1.0e-4 {
        true => IntersectionKind::Tangent,
        false => IntersectionKind::Point,
    };
    (close, kind)
}

fn line_plane(origin: Point3, axis: Vector3, surface: &Surface, tol: f64) -> Vec<Hit> {
    let Surface::Plane(plane) = surface else { unreachable!() };
    let n = plane.unit_normal();
    let denom = axis.dot(n);
    let height = plane.signed_distance(origin);
    if denom.abs() < ZERO {
        // parallel: in the plane it is coincident, off it empty
        return match height.abs() <= tol {
            true => vec![(origin - n * height, IntersectionKind::Coincident)],
            false => Vec::new(),
        };
    }
    let t = -height / denom;
    vec![(origin + axis * t, IntersectionKind::Point)]
}

fn line_sphere(
    origin: Point3,
    axis: Vector3,
    center: Point3,
    radius: f64,
    surface: &Surface,
    _tol: f64,
) -> Vec<Hit> {
    let diff = origin - center;
    // t^2 + 2 t (d . a) + d . d - r^2 = 0
    let roots = solvers::solve_quadratic(1.0, 2.0 * diff.dot(axis), diff.magnitude2() - radius * radius);
    roots
        .into_iter()
        .map(|t| classify(surface, axis, origin + axis * t))
        .collect()
}

fn line_cylinder(
    origin: Point3,
    axis: Vector3,
    center: Point3,
    z_axis: Vector3,
    radius: f64,
    surface: &Surface,
    tol: f64,
) -> Vec<Hit> {
    let d = origin - center;
    let a_perp = axis - z_axis * axis.dot(z_axis);
    let d_perp = d - z_axis * d.dot(z_axis);
    if a_perp.magnitude().so_small() {
        // along the axis direction: a ruling or nothing
        return match (d_perp.magnitude() - radius).abs() <= tol {
            true => vec![(origin, IntersectionKind::Coincident)],
            false => Vec::new(),
        };
    }
    let roots = solvers::solve_quadratic(
        a_perp.magnitude2(),
        2.0 * a_perp.dot(d_perp),
        d_perp.magnitude2() - radius * radius,
    );
    roots
        .into_iter()
        .map(|t| classify(surface, axis, origin + axis * t))
        .collect()
}

fn line_cone(origin: Point3, axis: Vector3, surface: &Surface, tol: f64) -> Vec<Hit> {
    let Surface::Cone(cone) = surface else { unreachable!() };
    let apex = cone.apex();
    let w = -cone.axis(); // from the apex toward the base
    let cos2 = cone.cos_half_angle() * cone.cos_half_angle();
    let d = origin - apex;
    let (aw, dw) = (axis.dot(w), d.dot(w));
    // ((p - apex) . w)^2 = cos^2 |p - apex|^2 on the solid cone
    let ca = aw * aw - cos2;
    let cb = 2.0 * (aw * dw - cos2 * d.dot(axis));
    let cc = dw * dw - cos2 * d.magnitude2();
    if ca.abs() < ZERO && cb.abs() < ZERO && cc.abs() < ZERO {
        // the line is a ruling
        return vec![(origin, IntersectionKind::Coincident)];
    }
    let roots = solvers::solve_quadratic(ca, cb, cc);
    let mut hits: Vec<Hit> = roots
        .into_iter()
        .filter_map(|t| {
            let pos = origin + axis * t;
            // the apex meets every line through it tangentially
            if pos.distance(apex) <= tol {
                return Some((apex, IntersectionKind::Tangent));
            }
            // keep the single nappe of the surface
            match (pos - apex).dot(w) >= -tol {
                true => Some(classify(surface, axis, pos)),
                false => None,
            }
        })
        .collect();
    // a line through the apex along the axis only touches the apex
    if hits.is_empty() {
        let on_line = origin + axis * (apex - origin).dot(axis);
        if on_line.distance(apex) <= tol {
            hits.push((apex, IntersectionKind::Tangent));
        }
    }
    hits
}

fn line_torus(origin: Point3, axis: Vector3, surface: &Surface, _tol: f64) -> Vec<Hit> {
    let Surface::Torus(torus) = surface else { unreachable!() };
    // into the torus frame
    let x_axis = torus.x_axis();
    let z_axis = torus.axis();
    let y_axis = z_axis.cross(x_axis);
    let to_local = |p: Point3| -> Vector3 {
        let d = p - torus.center();
        Vector3::new(d.dot(x_axis), d.dot(y_axis), d.dot(z_axis))
    };
    let d = to_local(origin);
    let a = Vector3::new(axis.dot(x_axis), axis.dot(y_axis), axis.dot(z_axis));
    let (big_r, small_r) = (torus.major_radius(), torus.minor_radius());
    // (|p|^2 + R^2 - r^2)^2 = 4 R^2 (x^2 + y^2)
    let b = 2.0 * d.dot(a);
    let c = d.magnitude2() + big_r * big_r - small_r * small_r;
    let gxx = a.x * a.x + a.y * a.y;
    let gx = d.x * a.x + d.y * a.y;
    let g0 = d.x * d.x + d.y * d.y;
    let four_r2 = 4.0 * big_r * big_r;
    let roots = solvers::solve_quartic(
        1.0,
        2.0 * b,
        b * b + 2.0 * c - four_r2 * gxx,
        2.0 * b * c - 2.0 * four_r2 * gx,
        c * c - four_r2 * g0,
    );
    roots
        .into_iter()
        .map(|t| classify(surface, axis, origin + axis * t))
        .collect()
}

/// Free-form kinds: each seed-grid cell is treated as a pair of tangent
/// triangles; a line hit on a cell seeds alternating projection between
/// the line and the surface until the two agree.
fn line_parametric(origin: Point3, axis: Vector3, surface: &Surface, tol: f64) -> Vec<Hit> {
    let samples = parametric_samples(surface);
    let mut hits = Vec::new();
    for row in &samples {
        for &(uv, _) in row {
            if let Some(hit) = project_line_surface(origin, axis, surface, uv, tol) {
                hits.push(hit);
            }
        }
    }
    hits
}

fn parametric_samples(surface: &Surface) -> Vec<Vec<(Point2, Point3)>> {
    match surface {
        Surface::Nub(s) => {
            let grid = s.seed_grid();
            (0..grid.nv)
                .map(|j| (0..grid.nu).map(|i| grid.samples[j * grid.nu + i]).collect())
                .collect()
        }
        Surface::Nurb(s) => {
            let grid = s.seed_grid();
            (0..grid.nv)
                .map(|j| (0..grid.nu).map(|i| grid.samples[j * grid.nu + i]).collect())
                .collect()
        }
        _ => {
            // revolve and extrude: a synthesized grid over the domain,
            // unbounded directions clipped to a workable band
            let domain = surface.domain();
            let clip = |iv: Interval1D| match iv.is_bounded() {
                true => iv,
                false => Interval1D::new(-100.0, 100.0),
            };
            let (ud, vd) = (clip(domain.u), clip(domain.v));
            let n = 24;
            (0..=n)
                .map(|j| {
                    (0..=n)
                        .map(|i| {
                            let uv = Point2::new(
                                ud.mid_point(i as f64 / n as f64),
                                vd.mid_point(j as f64 / n as f64),
                            );
                            (uv, surface.subs(uv.x, uv.y))
                        })
                        .collect()
                })
                .collect()
        }
    }
}

/// alternating projection of a marker between the surface and the line
fn project_line_surface(
    origin: Point3,
    axis: Vector3,
    surface: &Surface,
    seed: Point2,
    tol: f64,
) -> Option<Hit> {
    let mut uv = seed;
    let mut pos = surface.subs(uv.x, uv.y);
    for _ in 0..100 {
        let on_line = origin + axis * (pos - origin).dot(axis);
        let (next_uv, on_surface) = surface.inverse(on_line, Some(uv));
        let dist = on_line.distance(on_surface);
        if dist <= tol && on_surface.distance(pos) < TOLERANCE {
            let n = surface.normal(next_uv.x, next_uv.y);
            let kind = match n.magnitude().so_small() || axis.dot(n).abs() < 1.0e-4 {
                true => IntersectionKind::Tangent,
                false => IntersectionKind::Point,
            };
            return Some((on_surface, kind));
        }
        if on_surface.distance(pos) < ZERO {
            // the projection stalled off the line: no intersection here
            return None;
        }
        uv = next_uv;
        pos = on_surface;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use lathe_base::assert_near;
    use lathe_geometry::surfaces::{Cone, Cylinder, Plane, Sphere, Torus};
    use std::f64::consts::PI;

    #[test]
    fn sphere_two_hits_and_tangent() {
        let sphere: Surface = Sphere::new(Point3::new(0.0, 0.0, 0.0), 2.0).into();
        let hits = intersect_line_and_surface(
            Point3::new(-5.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            &sphere,
            1.0e-6,
        );
        assert_eq!(hits.len(), 2);
        assert_near!(hits[0].0, Point3::new(-2.0, 0.0, 0.0));
        assert_near!(hits[1].0, Point3::new(2.0, 0.0, 0.0));
        assert_eq!(hits[0].1, IntersectionKind::Point);

        let hits = intersect_line_and_surface(
            Point3::new(-5.0, 2.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            &sphere,
            1.0e-6,
        );
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].1, IntersectionKind::Tangent);
        assert_near!(hits[0].0, Point3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn torus_four_hits() {
        // a line through a donut's equator plane
        let torus: Surface = Torus::new(
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            1.0,
            3.0,
        )
        .into();
        let hits = intersect_line_and_surface(
            Point3::new(-20.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            &torus,
            1.0e-6,
        );
        assert_eq!(hits.len(), 4);
        let expect = [-4.0, -2.0, 2.0, 4.0];
        for (hit, x) in hits.iter().zip(expect) {
            assert_near!(hit.0, Point3::new(x, 0.0, 0.0));
            assert_eq!(hit.1, IntersectionKind::Point);
        }
    }

    #[test]
    fn torus_tangent_line() {
        let torus: Surface = Torus::new(
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            1.0,
            3.0,
        )
        .into();
        let hits = intersect_line_and_surface(
            Point3::new(-20.0, 4.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            &torus,
            1.0e-6,
        );
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].1, IntersectionKind::Tangent);
        assert_near!(hits[0].0, Point3::new(0.0, 4.0, 0.0));
    }

    #[test]
    fn cone_apex_on_axis() {
        let cone: Surface = Cone::new(
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            1.0,
            PI / 4.0,
        )
        .into();
        // along the axis through the apex
        let hits = intersect_line_and_surface(
            Point3::new(0.0, 0.0, -5.0),
            Vector3::new(0.0, 0.0, 1.0),
            &cone,
            1.0e-6,
        );
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].1, IntersectionKind::Tangent);
        assert_near!(hits[0].0, Point3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn cylinder_side_hits() {
        let cylinder: Surface = Cylinder::new(
            Point3::new(0.0, 0.0, 1.0),
            Vector3::new(0.0, 0.0, 1.0),
            1.0,
            None,
        )
        .into();
        let hits = intersect_line_and_surface(
            Point3::new(-2.0, 0.0, 1.0),
            Vector3::new(1.0, 0.0, 0.0),
            &cylinder,
            1.0e-6,
        );
        assert_eq!(hits.len(), 2);
        assert_near!(hits[0].0, Point3::new(-1.0, 0.0, 1.0));
        assert_near!(hits[1].0, Point3::new(1.0, 0.0, 1.0));
    }

    #[test]
    fn plane_cases() {
        let plane: Surface =
            Plane::new(Point3::new(1.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0)).into();
        let hits = intersect_line_and_surface(
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            &plane,
            1.0e-6,
        );
        assert_eq!(hits.len(), 1);
        assert_near!(hits[0].0, Point3::new(1.0, 0.0, 0.0));
        // parallel off the plane: empty
        let hits = intersect_line_and_surface(
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            &plane,
            1.0e-6,
        );
        assert!(hits.is_empty());
        // in the plane: coincident
        let hits = intersect_line_and_surface(
            Point3::new(1.0, 5.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            &plane,
            1.0e-6,
        );
        assert_eq!(hits[0].1, IntersectionKind::Coincident);
    }
}
