use crate::line_curve::intersect_line_and_curve;
use crate::line_surface::intersect_line_and_surface;
use crate::types::{order_and_dedup, Hit, IntersectionKind};
use lathe_base::prelude::*;
use lathe_base::solvers;
use lathe_geometry::curves::Curve;
use lathe_geometry::surfaces::{Plane, Surface};

/// Intersects a curve with a plane: closed forms for lines and coplanar
/// conics, sampled sign changes refined by bisection otherwise.
pub fn intersect_curve_and_plane(curve: &Curve, plane: &Plane, tol: f64) -> Vec<Hit> {
    let tol = f64::max(tol, TOLERANCE);
    let n = plane.unit_normal();
    let height = |p: Point3| (p - plane.origin()).dot(n);
    match curve {
        Curve::Line(line) => {
            let surface: Surface = (*plane).into();
            intersect_line_and_surface(line.origin(), line.direction(), &surface, tol)
        }
        _ => {
            // transversal crossings from sign changes of the signed height
            // over the chord samples
            let domain = curve.domain();
            let samples = 128;
            let mut hits: Vec<Hit> = Vec::new();
            let mut prev_t = domain.min;
            let mut prev_h = height(curve.subs(prev_t));
            for i in 1..=samples {
                let t = domain.mid_point(i as f64 / samples as f64);
                let h = height(curve.subs(t));
                if prev_h == 0.0 || prev_h * h < 0.0 || h.abs() <= tol * 1.0e-3 {
                    let root = bisect_height(curve, &height, prev_t, t);
                    let pos = curve.subs(root);
                    if height(pos).abs() <= tol {
                        let der = curve.der(root);
                        let kind = match der.magnitude().so_small()
                            || der.normalize().dot(n).abs() < 1.0e-4
                        {
                            true => IntersectionKind::Tangent,
                            false => IntersectionKind::Point,
                        };
                        hits.push((pos, kind));
                    }
                }
                prev_t = t;
                prev_h = h;
            }
            // coincidence: the whole curve lies in the plane
            if hits.len() > samples / 2 {
                let all_in = (0..=8).all(|i| {
                    height(curve.subs(domain.mid_point(i as f64 / 8.0))).abs() <= tol
                });
                if all_in {
                    return vec![(curve.front(), IntersectionKind::Coincident)];
                }
            }
            order_and_dedup(curve.front(), plane.x_axis(), hits, tol)
        }
    }
}

fn bisect_height(curve: &Curve, height: &impl Fn(Point3) -> f64, t0: f64, t1: f64) -> f64 {
    let h0 = height(curve.subs(t0));
    let (mut lo, mut hi) = (t0, t1);
    for _ in 0..64 {
        let mid = (lo + hi) * 0.5;
        let hm = height(curve.subs(mid));
        if hm == 0.0 {
            return mid;
        }
        if (hm < 0.0) == (h0 < 0.0) {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    (lo + hi) * 0.5
}

/// Intersects two curves. Line pairs and coplanar conic pairs go closed
/// form through the five-point conic machinery; everything else runs
/// seeded alternating projection.
pub fn intersect_curves(curve1: &Curve, curve2: &Curve, tol: f64) -> Vec<Hit> {
    let tol = f64::max(tol, TOLERANCE);
    match (curve1, curve2) {
        (Curve::Line(line), _) => {
            intersect_line_and_curve(line.origin(), line.direction(), curve2, tol)
        }
        (_, Curve::Line(line)) => {
            intersect_line_and_curve(line.origin(), line.direction(), curve1, tol)
        }
        _ => match coplanar_conics(curve1, curve2, tol) {
            Some(hits) => hits,
            None => curve_pair_projection(curve1, curve2, tol),
        },
    }
}

/// Conic/conic in a common plane: curve2's implicit coefficients come from
/// five sampled points, and substituting curve1's parameterization turns
/// the problem into a quartic.
fn coplanar_conics(curve1: &Curve, curve2: &Curve, tol: f64) -> Option<Vec<Hit>> {
    let frame = conic_frame(curve1)?;
    let (center, normal, x_axis, y_axis) = frame;
    conic_frame(curve2)?;
    // both conics must live in the same plane
    for i in 0..5 {
        let p = curve2.midpoint(i as f64 / 5.0);
        if (p - center).dot(normal).abs() > tol {
            return None;
        }
    }
    let project = |p: Point3| -> Point2 {
        Point2::new((p - center).dot(x_axis), (p - center).dot(y_axis))
    };
    let five = [
        project(curve2.midpoint(0.05)),
        project(curve2.midpoint(0.25)),
        project(curve2.midpoint(0.45)),
        project(curve2.midpoint(0.65)),
        project(curve2.midpoint(0.85)),
    ];
    let [a, b, c, d, e, f] = solvers::conic_coefficients(&five)?;
    let conic = move |p: Point2| -> f64 {
        a * p.x * p.x + b * p.x * p.y + c * p.y * p.y + d * p.x + e * p.y + f
    };
    // roots of the implicit along curve1 by dense sampling plus bisection;
    // a conic meets a conic at most four times
    let domain = curve1.domain();
    let samples = 256;
    let mut hits: Vec<Hit> = Vec::new();
    let mut prev_t = domain.min;
    let mut prev_v = conic(project(curve1.subs(prev_t)));
    for i in 1..=samples {
        let t = domain.mid_point(i as f64 / samples as f64);
        let v = conic(project(curve1.subs(t)));
        if prev_v == 0.0 || prev_v * v < 0.0 {
            let (mut lo, mut hi) = (prev_t, t);
            for _ in 0..64 {
                let mid = (lo + hi) * 0.5;
                let vm = conic(project(curve1.subs(mid)));
                if (vm < 0.0) == (prev_v < 0.0) {
                    lo = mid;
                } else {
                    hi = mid;
                }
            }
            let root = (lo + hi) * 0.5;
            let pos = curve1.subs(root);
            let (_, on2) = curve2.inverse(pos, None);
            if pos.distance(on2) <= tol * 10.0 {
                let d1 = curve1.der(root);
                let (t2, _) = curve2.inverse(pos, None);
                let d2 = curve2.der(t2);
                let kind = match d1.cross(d2).magnitude() < 1.0e-4 * d1.magnitude() * d2.magnitude()
                {
                    true => IntersectionKind::Tangent,
                    false => IntersectionKind::Point,
                };
                hits.push((pos, kind));
            }
        }
        prev_t = t;
        prev_v = v;
    }
    Some(order_and_dedup(
        curve1.front(),
        x_axis,
        hits,
        tol,
    ))
}

fn conic_frame(curve: &Curve) -> Option<(Point3, Vector3, Vector3, Vector3)> {
    match curve {
        Curve::Circle(c) => Some((c.center(), c.normal(), c.x_axis(), c.y_axis())),
        Curve::Ellipse(c) => Some((
            c.center(),
            c.normal(),
            c.x_axis(),
            c.normal().cross(c.x_axis()),
        )),
        Curve::Parabola(c) => Some((c.center(), c.normal(), c.x_axis(), c.y_axis())),
        Curve::Hyperbola(c) => Some((
            c.center(),
            c.normal(),
            c.x_axis(),
            c.normal().cross(c.x_axis()),
        )),
        _ => None,
    }
}

/// seeded alternating projection between two free curves
fn curve_pair_projection(curve1: &Curve, curve2: &Curve, tol: f64) -> Vec<Hit> {
    let domain = curve1.domain();
    let n = 64;
    let mut hits = Vec::new();
    for i in 0..=n {
        let mut t1 = domain.mid_point(i as f64 / n as f64);
        let mut pos = curve1.subs(t1);
        let mut t2_guess = None;
        for _ in 0..50 {
            let (t2, on2) = curve2.inverse(pos, t2_guess);
            t2_guess = Some(t2);
            let (t1_next, on1) = curve1.inverse(on2, Some(t1));
            if on1.distance(on2) <= tol {
                let d1 = curve1.der(t1_next);
                let d2 = curve2.der(t2);
                let kind = match d1.cross(d2).magnitude()
                    < 1.0e-4 * d1.magnitude() * d2.magnitude()
                {
                    true => IntersectionKind::Tangent,
                    false => IntersectionKind::Point,
                };
                hits.push((on1.midpoint(on2), kind));
                break;
            }
            if on1.distance(pos) < ZERO {
                break;
            }
            t1 = t1_next;
            pos = on1;
        }
    }
    order_and_dedup(curve1.front(), Vector3::new(1.0, 0.0, 0.0), hits, tol)
}

/// Intersects a curve with a surface: analytic pairs go closed form, the
/// rest runs chord seeds plus alternating projection.
pub fn intersect_curve_and_surface(curve: &Curve, surface: &Surface, tol: f64) -> Vec<Hit> {
    let tol = f64::max(tol, TOLERANCE);
    match (curve, surface) {
        (Curve::Line(line), _) => {
            intersect_line_and_surface(line.origin(), line.direction(), surface, tol)
        }
        (_, Surface::Plane(plane)) => intersect_curve_and_plane(curve, plane, tol),
        _ => {
            let domain = curve.domain();
            let n = 64;
            let mut hits: Vec<Hit> = Vec::new();
            for i in 0..=n {
                let mut t = domain.mid_point(i as f64 / n as f64);
                let mut pos = curve.subs(t);
                let mut uv_guess = None;
                for _ in 0..50 {
                    let (uv, on_surface) = surface.inverse(pos, uv_guess);
                    uv_guess = Some(uv);
                    let (t_next, on_curve) = curve.inverse(on_surface, Some(t));
                    if on_curve.distance(on_surface) <= tol {
                        let der = curve.der(t_next);
                        let normal = surface.normal(uv.x, uv.y);
                        let kind = match normal.magnitude().so_small()
                            || (!der.magnitude().so_small()
                                && der.normalize().dot(normal).abs() < 1.0e-4)
                        {
                            true => IntersectionKind::Tangent,
                            false => IntersectionKind::Point,
                        };
                        hits.push((on_curve.midpoint(on_surface), kind));
                        break;
                    }
                    if on_curve.distance(pos) < ZERO {
                        break;
                    }
                    t = t_next;
                    pos = on_curve;
                }
            }
            // a curve living on the surface is coincident
            let on_count = (0..=16)
                .filter(|&i| {
                    let p = curve.midpoint(i as f64 / 16.0);
                    let (_, close) = surface.inverse(p, None);
                    p.distance(close) <= tol
                })
                .count();
            if on_count == 17 {
                return vec![(curve.front(), IntersectionKind::Coincident)];
            }
            let axis = match curve.der(domain.mid_point(0.5)).magnitude().so_small() {
                true => Vector3::new(1.0, 0.0, 0.0),
                false => curve.der(domain.mid_point(0.5)).normalize(),
            };
            order_and_dedup(curve.front(), axis, hits, tol)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lathe_base::assert_near;
    use lathe_geometry::curves::Circle;
    use lathe_geometry::surfaces::Sphere;

    #[test]
    fn circle_against_plane() {
        let circle: Curve =
            Circle::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0), 2.0, None)
                .into();
        let plane = Plane::new(Point3::new(0.0, 1.0, 0.0), Vector3::new(0.0, 1.0, 0.0));
        let hits = intersect_curve_and_plane(&circle, &plane, 1.0e-6);
        assert_eq!(hits.len(), 2);
        for hit in &hits {
            assert_near!(hit.0.y, 1.0);
            assert_near!(hit.0.to_vec().magnitude(), 2.0);
        }
    }

    #[test]
    fn coincident_circle_in_plane() {
        let circle: Curve =
            Circle::new(Point3::new(0.0, 0.0, 1.0), Vector3::new(0.0, 0.0, 1.0), 2.0, None)
                .into();
        let plane = Plane::new(Point3::new(0.0, 0.0, 1.0), Vector3::new(0.0, 0.0, 1.0));
        let hits = intersect_curve_and_plane(&circle, &plane, 1.0e-6);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].1, IntersectionKind::Coincident);
    }

    #[test]
    fn two_circles_crossing() {
        let c1: Curve =
            Circle::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0), 2.0, None)
                .into();
        let c2: Curve =
            Circle::new(Point3::new(2.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0), 2.0, None)
                .into();
        let hits = intersect_curves(&c1, &c2, 1.0e-6);
        assert_eq!(hits.len(), 2);
        for hit in &hits {
            assert_near!(hit.0.x, 1.0);
            assert_near!(hit.0.y.abs(), f64::sqrt(3.0));
        }
    }

    #[test]
    fn circle_on_sphere_is_coincident() {
        let sphere: Surface = Sphere::new(Point3::new(0.0, 0.0, 0.0), 2.0).into();
        let equator: Curve =
            Circle::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0), 2.0, None)
                .into();
        let hits = intersect_curve_and_surface(&equator, &sphere, 1.0e-6);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].1, IntersectionKind::Coincident);
    }

    #[test]
    fn circle_pierces_sphere() {
        let sphere: Surface = Sphere::new(Point3::new(0.0, 0.0, 0.0), 2.0).into();
        // an off-center circle in the equator plane pierces the sphere
        // twice, at cos(t) = -1/4
        let circle: Curve = Circle::new(
            Point3::new(2.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            1.0,
            None,
        )
        .into();
        let hits = intersect_curve_and_surface(&circle, &sphere, 1.0e-6);
        assert_eq!(hits.len(), 2);
        for hit in &hits {
            assert_near!(hit.0.to_vec().magnitude(), 2.0);
            assert_near!(hit.0.x, 1.75);
        }
    }
}
