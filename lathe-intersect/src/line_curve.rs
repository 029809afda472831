use crate::types::{order_and_dedup, Hit, IntersectionKind};
use lathe_base::prelude::*;
use lathe_base::solvers;
use lathe_geometry::curves::Curve;

/// Intersects the whole line `origin + t * axis` with a curve within
/// `tol`. Hits come back ordered along the axis and deduplicated.
pub fn intersect_line_and_curve(
    origin: Point3,
    axis: Vector3,
    curve: &Curve,
    tol: f64,
) -> Vec<Hit> {
    let axis = axis.normalize();
    let tol = f64::max(tol, TOLERANCE);
    let hits = match curve {
        Curve::Line(_) => line_line(origin, axis, curve, tol),
        Curve::Circle(_) | Curve::Ellipse(_) | Curve::Parabola(_) | Curve::Hyperbola(_) => {
            line_conic(origin, axis, curve, tol)
        }
        Curve::PointCurve(pc) => {
            let p = pc.position();
            let on_line = origin + axis * (p - origin).dot(axis);
            match on_line.distance(p) <= tol {
                true => vec![(p, IntersectionKind::Point)],
                false => Vec::new(),
            }
        }
        _ => line_free_curve(origin, axis, curve, tol),
    };
    order_and_dedup(origin, axis, hits, tol)
}

fn classify_curve_hit(curve: &Curve, axis: Vector3, pos: Point3) -> Hit {
    let (t, close) = curve.inverse(pos, None);
    let der = curve.der(t);
    let kind = match der.magnitude().so_small() {
        true => IntersectionKind::Point,
        false => match der.normalize().cross(axis).magnitude() < 1.0e-4 {
            true => IntersectionKind::Tangent,
            false => IntersectionKind::Point,
        },
    };
    (close, kind)
}

fn line_line(origin: Point3, axis: Vector3, curve: &Curve, tol: f64) -> Vec<Hit> {
    let Curve::Line(line) = curve else { unreachable!() };
    let (o2, a2) = (line.origin(), line.direction());
    let cross = axis.cross(a2);
    let diff = o2 - origin;
    if cross.magnitude().so_small() {
        // parallel: coincident when the offset lies along the line
        return match diff.cross(axis).magnitude() <= tol {
            true => vec![(origin, IntersectionKind::Coincident)],
            false => Vec::new(),
        };
    }
    // closest points of two skew lines
    let denom = cross.magnitude2();
    let t1 = diff.cross(a2).dot(cross) / denom;
    let t2 = diff.cross(axis).dot(cross) / denom;
    let p1 = origin + axis * t1;
    let p2 = o2 + a2 * t2;
    match p1.distance(p2) <= tol && line.domain().contains(t2) {
        true => vec![(p1.midpoint(p2), IntersectionKind::Point)],
        false => Vec::new(),
    }
}

/// Coplanar conics reduce to polynomials in the line parameter inside the
/// conic plane; a transversal line meets the plane once and is tested
/// against the conic there.
fn line_conic(origin: Point3, axis: Vector3, curve: &Curve, tol: f64) -> Vec<Hit> {
    let (center, normal, x_axis, y_axis) = conic_frame(curve);
    let height = (origin - center).dot(normal);
    let slope = axis.dot(normal);
    if slope.abs() > ZERO {
        // one plane crossing: on the conic or not
        let t = -height / slope;
        let pos = origin + axis * t;
        let (_, close) = curve.inverse(pos, None);
        return match close.distance(pos) <= tol {
            true => vec![classify_curve_hit(curve, axis, pos)],
            false => Vec::new(),
        };
    }
    if height.abs() > tol {
        return Vec::new();
    }
    // coplanar: work in the conic frame
    let o = Point2::new((origin - center).dot(x_axis), (origin - center).dot(y_axis));
    let a = Vector2::new(axis.dot(x_axis), axis.dot(y_axis));
    let [ca, cb, cc, cd, ce, cf] = conic_implicit(curve);
    // substitute (x, y) = o + t a
    let t2 = ca * a.x * a.x + cb * a.x * a.y + cc * a.y * a.y;
    let t1 = 2.0 * ca * o.x * a.x
        + cb * (o.x * a.y + o.y * a.x)
        + 2.0 * cc * o.y * a.y
        + cd * a.x
        + ce * a.y;
    let t0 = ca * o.x * o.x + cb * o.x * o.y + cc * o.y * o.y + cd * o.x + ce * o.y + cf;
    let roots = solvers::solve_quadratic(t2, t1, t0);
    roots
        .into_iter()
        .map(|t| classify_curve_hit(curve, axis, origin + axis * t))
        .collect()
}

fn conic_frame(curve: &Curve) -> (Point3, Vector3, Vector3, Vector3) {
    match curve {
        Curve::Circle(c) => (c.center(), c.normal(), c.x_axis(), c.y_axis()),
        Curve::Ellipse(c) => (
            c.center(),
            c.normal(),
            c.x_axis(),
            c.normal().cross(c.x_axis()),
        ),
        Curve::Parabola(c) => (c.center(), c.normal(), c.x_axis(), c.y_axis()),
        Curve::Hyperbola(c) => (
            c.center(),
            c.normal(),
            c.x_axis(),
            c.normal().cross(c.x_axis()),
        ),
        _ => unreachable!("not a conic"),
    }
}

/// implicit coefficients `[a, b, c, d, e, f]` of the conic in its frame
fn conic_implicit(curve: &Curve) -> [f64; 6] {
    match curve {
        Curve::Circle(c) => [1.0, 0.0, 1.0, 0.0, 0.0, -c.radius() * c.radius()],
        Curve::Ellipse(c) => {
            let (a, b) = (c.semi_major(), c.semi_minor());
            [1.0 / (a * a), 0.0, 1.0 / (b * b), 0.0, 0.0, -1.0]
        }
        // y = a x^2
        Curve::Parabola(c) => [c.coefficient(), 0.0, 0.0, 0.0, -1.0, 0.0],
        // x^2 / a^2 - y^2 / b^2 = 1
        Curve::Hyperbola(c) => {
            let (a, b) = (c.semi_major(), c.semi_minor());
            [1.0 / (a * a), 0.0, -1.0 / (b * b), 0.0, 0.0, -1.0]
        }
        _ => unreachable!("not a conic"),
    }
}

/// NUB, NURB, and hermite curves: chord seeds, then alternating projection
/// between the line and the curve.
fn line_free_curve(origin: Point3, axis: Vector3, curve: &Curve, tol: f64) -> Vec<Hit> {
    let domain = curve.domain();
    let n = 64;
    let mut hits = Vec::new();
    for i in 0..=n {
        let mut t = domain.mid_point(i as f64 / n as f64);
        let mut converged = false;
        let mut pos = curve.subs(t);
        for _ in 0..50 {
            let on_line = origin + axis * (pos - origin).dot(axis);
            let (t_next, on_curve) = curve.inverse(on_line, Some(t));
            if on_line.distance(on_curve) <= tol {
                converged = true;
                t = t_next;
                pos = on_curve;
                break;
            }
            if on_curve.distance(pos) < ZERO {
                break;
            }
            t = t_next;
            pos = on_curve;
        }
        if converged {
            hits.push(classify_curve_hit(curve, axis, pos));
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use lathe_base::assert_near;
    use lathe_geometry::curves::{Circle, Line, NubCurve, Parabola};
    use lathe_geometry::knot::KnotVec;

    #[test]
    fn crossing_lines() {
        let line: Curve =
            Line::new(Point3::new(0.0, -5.0, 0.0), Vector3::new(0.0, 1.0, 0.0)).into();
        let hits = intersect_line_and_curve(
            Point3::new(-5.0, 1.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            &line,
            1.0e-6,
        );
        assert_eq!(hits.len(), 1);
        assert_near!(hits[0].0, Point3::new(0.0, 1.0, 0.0));
        // skew lines miss
        let hits = intersect_line_and_curve(
            Point3::new(-5.0, 1.0, 1.0),
            Vector3::new(1.0, 0.0, 0.0),
            &line,
            1.0e-6,
        );
        assert!(hits.is_empty());
    }

    #[test]
    fn circle_secant_and_tangent() {
        let circle: Curve =
            Circle::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0), 2.0, None)
                .into();
        let hits = intersect_line_and_curve(
            Point3::new(-5.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            &circle,
            1.0e-6,
        );
        assert_eq!(hits.len(), 2);
        assert_near!(hits[0].0, Point3::new(-2.0, 0.0, 0.0));
        assert_near!(hits[1].0, Point3::new(2.0, 0.0, 0.0));

        let hits = intersect_line_and_curve(
            Point3::new(-5.0, 2.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            &circle,
            1.0e-6,
        );
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].1, IntersectionKind::Tangent);
    }

    #[test]
    fn parabola_crossings() {
        let parabola: Curve = Parabola::new(
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(1.0, 0.0, 0.0),
            1.0,
        )
        .into();
        // the horizontal line y = 4 crosses y = x^2 at x = -2 and 2
        let hits = intersect_line_and_curve(
            Point3::new(-10.0, 4.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            &parabola,
            1.0e-6,
        );
        assert_eq!(hits.len(), 2);
        assert_near!(hits[0].0, Point3::new(-2.0, 4.0, 0.0));
        assert_near!(hits[1].0, Point3::new(2.0, 4.0, 0.0));
    }

    #[test]
    fn spline_crossing() {
        let curve: Curve = NubCurve::new(
            KnotVec::clamped_uniform(4, 3),
            vec![
                Point3::new(0.0, -1.0, 0.0),
                Point3::new(1.0, -1.0, 0.0),
                Point3::new(2.0, 1.0, 0.0),
                Point3::new(3.0, 1.0, 0.0),
            ],
        )
        .unwrap()
        .into();
        // the spline crosses y = 0 once
        let hits = intersect_line_and_curve(
            Point3::new(-10.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            &curve,
            1.0e-6,
        );
        assert_eq!(hits.len(), 1);
        assert!(hits[0].0.y.abs() < 1.0e-6);
    }
}
