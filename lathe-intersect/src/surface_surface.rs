use crate::errors::{Error, Result};
use crate::types::InterruptFlag;
use crate::walker::{walk_from_to, zoom_in};
use lathe_base::prelude::*;
use lathe_base::solvers;
use lathe_geometry::curves::{Circle, Curve, Ellipse, Hyperbola, Line, Parabola, PointCurve};
use lathe_geometry::surfaces::{Surface, TorusKind};
use log::debug;

/// Intersects two surfaces into a list of parametric intersection curves:
/// lines, circles, ellipses, parabolas, hyperbolas, isolated tangent
/// points as point curves, or traced hermite curves from the walker when
/// no closed form applies. Coincident surfaces cannot be carried by the
/// return type and come back as `GeometryDegenerate`.
pub fn intersect_surfaces(
    surface1: &Surface,
    surface2: &Surface,
    tol: f64,
    interrupt: InterruptFlag<'_>,
) -> Result<Vec<Curve>> {
    let tol = f64::max(tol, TOLERANCE);
    if surface1.is_same(surface2, tol) {
        return Err(Error::GeometryDegenerate(
            "the surfaces are coincident".into(),
        ));
    }
    let closed_form = match (surface1, surface2) {
        (Surface::Plane(_), _) => plane_and_surface(surface1, surface2, tol),
        (_, Surface::Plane(_)) => plane_and_surface(surface2, surface1, tol),
        (Surface::Sphere(_), _) => sphere_and_surface(surface1, surface2, tol),
        (_, Surface::Sphere(_)) => sphere_and_surface(surface2, surface1, tol),
        (Surface::Cylinder(_), Surface::Cylinder(_)) => {
            cylinder_and_cylinder(surface1, surface2, tol)
        }
        (Surface::Cylinder(_), Surface::Cone(_)) => cylinder_and_cone(surface1, surface2, tol),
        (Surface::Cone(_), Surface::Cylinder(_)) => cylinder_and_cone(surface2, surface1, tol),
        (Surface::Cone(_), Surface::Cone(_)) => cone_and_cone(surface1, surface2, tol),
        (Surface::Cylinder(_), Surface::Torus(_)) => cylinder_and_torus(surface1, surface2, tol),
        (Surface::Torus(_), Surface::Cylinder(_)) => cylinder_and_torus(surface2, surface1, tol),
        _ => None,
    };
    match closed_form {
        Some(curves) => Ok(curves),
        None => walker_fallback(surface1, surface2, tol, interrupt),
    }
}

// ------------------------------------------------------------------ //
// plane cases

fn plane_and_surface(plane: &Surface, other: &Surface, tol: f64) -> Option<Vec<Curve>> {
    let Surface::Plane(p) = plane else { unreachable!() };
    let (origin, n) = (p.origin(), p.unit_normal());
    match other {
        Surface::Plane(q) => {
            let line = crate::walker::intersect_non_parallel_planes(
                origin,
                n,
                q.origin(),
                q.unit_normal(),
            )?;
            Some(vec![Line::new(line.0, line.1).into()])
        }
        Surface::Sphere(s) => {
            let h = (s.center() - origin).dot(n);
            if h.abs() > s.radius() + tol {
                return Some(Vec::new());
            }
            let center = s.center() - n * h;
            if near_equal(h.abs(), s.radius(), tol, false) {
                return Some(vec![PointCurve::new(center).into()]);
            }
            let radius = f64::sqrt(s.radius() * s.radius() - h * h);
            Some(vec![Circle::new(center, n, radius, None).into()])
        }
        Surface::Cylinder(c) => {
            let w = c.axis();
            let dot = n.dot(w);
            if dot.abs() < TOLERANCE {
                // parallel to the axis: rulings
                let h = (c.origin() - origin).dot(n);
                if h.abs() > c.radius() + tol {
                    return Some(Vec::new());
                }
                let foot = c.origin() - n * h;
                if near_equal(h.abs(), c.radius(), tol, false) {
                    return Some(vec![Line::new(foot, w).into()]);
                }
                let e = w.cross(n);
                let offset = f64::sqrt(c.radius() * c.radius() - h * h);
                Some(vec![
                    Line::new(foot + e * offset, w).into(),
                    Line::new(foot - e * offset, w).into(),
                ])
            } else {
                // the oblique section is an ellipse, a circle when the
                // plane cuts straight across
                let t = (origin - c.origin()).dot(n) / dot;
                let center = c.origin() + w * t;
                if near_equal(dot.abs(), 1.0, TOLERANCE, false) {
                    return Some(vec![Circle::new(center, n, c.radius(), None).into()]);
                }
                let major_dir = (w - n * dot).normalize();
                let major = c.radius() / dot.abs();
                Some(vec![
                    Ellipse::new(center, n, major_dir, major, c.radius()).into(),
                ])
            }
        }
        Surface::Cone(c) => plane_and_cone(p, c, tol),
        Surface::Torus(t) => plane_and_torus(p, t, tol),
        _ => None,
    }
}

fn plane_and_cone(
    p: &lathe_geometry::surfaces::Plane,
    c: &lathe_geometry::surfaces::Cone,
    tol: f64,
) -> Option<Vec<Curve>> {
    let (origin, n) = (p.origin(), p.unit_normal());
    let apex = c.apex();
    let w = -c.axis(); // from the apex toward the base
    let (sin_a, cos_a) = (c.sin_half_angle(), c.cos_half_angle());
    let apex_h = (apex - origin).dot(n);
    let dot = n.dot(w);
    if apex_h.abs() <= tol {
        // the plane passes through the apex: rulings or the apex alone
        let x = orthogonal_to(w);
        let y = w.cross(x);
        let (a, b) = (x.dot(n), y.dot(n));
        // ruling dir(theta) . n = 0 with dir = sin(a)(cos x + sin y) + cos(a) w
        let rhs = -cos_a * dot / sin_a;
        let thetas = solve_cos_sin(a, b, rhs);
        if thetas.is_empty() {
            return Some(vec![PointCurve::new(apex).into()]);
        }
        let lines = thetas
            .into_iter()
            .map(|theta| {
                let dir = (x * theta.cos() + y * theta.sin()) * sin_a + w * cos_a;
                Line::new(apex, dir).into()
            })
            .collect();
        return Some(lines);
    }
    if near_equal(dot.abs(), 1.0, TOLERANCE, false) {
        // straight across: a circle, or nothing on the empty side
        let below = (origin - apex).dot(w);
        if below < tol {
            return Some(Vec::new());
        }
        let radius = below * sin_a / cos_a;
        let center = apex + w * below;
        return Some(vec![Circle::new(center, n, radius, None).into()]);
    }
    // general conic: five section points through the rulings
    let x = orthogonal_to(w);
    let y = w.cross(x);
    let mut pts = Vec::new();
    let mut theta = 0.0f64;
    while pts.len() < 5 && theta < 12.0 {
        let dir = (x * theta.cos() + y * theta.sin()) * sin_a + w * cos_a;
        let denom = dir.dot(n);
        if denom.abs() > 1.0e-3 {
            let s = apex_h / denom;
            // only the nappe on the surface side
            if s > tol {
                pts.push(apex + dir * s);
            }
        }
        theta += 0.37;
    }
    if pts.len() < 5 {
        return Some(Vec::new());
    }
    let px = orthogonal_to(n);
    let py = n.cross(px);
    let plane_origin = pts[0];
    let to2d = |q: Point3| -> Point2 {
        Point2::new((q - plane_origin).dot(px), (q - plane_origin).dot(py))
    };
    let five = [to2d(pts[0]), to2d(pts[1]), to2d(pts[2]), to2d(pts[3]), to2d(pts[4])];
    let coef = solvers::conic_coefficients(&five)?;
    conic_curve_from_implicit(plane_origin, px, py, n, coef).map(|c| vec![c])
}

fn plane_and_torus(
    p: &lathe_geometry::surfaces::Plane,
    t: &lathe_geometry::surfaces::Torus,
    tol: f64,
) -> Option<Vec<Curve>> {
    if t.kind() != TorusKind::Donut {
        return None;
    }
    let (origin, n) = (p.origin(), p.unit_normal());
    let w = t.axis();
    let (big_r, small_r) = (t.major_radius(), t.minor_radius());
    let dot = n.dot(w).abs();
    let center_h = (t.center() - origin).dot(n);
    if near_equal(dot, 1.0, TOLERANCE, false) {
        // straight across the axis: one or two spindle circles
        if center_h.abs() > small_r + tol {
            return Some(Vec::new());
        }
        let center = t.center() - n * center_h;
        if near_equal(center_h.abs(), small_r, tol, false) {
            return Some(vec![Circle::new(center, w, big_r, None).into()]);
        }
        let bulge = f64::sqrt(small_r * small_r - center_h * center_h);
        return Some(vec![
            Circle::new(center, w, big_r + bulge, None).into(),
            Circle::new(center, w, big_r - bulge, None).into(),
        ]);
    }
    if dot < TOLERANCE && center_h.abs() <= tol {
        // through the axis: the two tube cross sections
        let e = w.cross(n);
        return Some(vec![
            Circle::new(t.center() + e * big_r, n, small_r, None).into(),
            Circle::new(t.center() - e * big_r, n, small_r, None).into(),
        ]);
    }
    // the Villarceau angle: the plane through the center tilted from the
    // equator by asin(r / R), so the normal keeps |n . w| = cos of that
    let villarceau_dot = f64::sqrt(1.0 - (small_r / big_r) * (small_r / big_r));
    if center_h.abs() <= tol && near_equal(dot, villarceau_dot, TOLERANCE * 10.0, false) {
        // two circles of the major radius, centered off the pivot axis
        let pivot = w.cross(n).normalize();
        return Some(vec![
            Circle::new(t.center() + pivot * small_r, n, big_r, None).into(),
            Circle::new(t.center() - pivot * small_r, n, big_r, None).into(),
        ]);
    }
    // oblique spiric sections walk
    None
}

// ------------------------------------------------------------------ //
// sphere cases

fn sphere_and_surface(sphere: &Surface, other: &Surface, tol: f64) -> Option<Vec<Curve>> {
    let Surface::Sphere(s) = sphere else { unreachable!() };
    let (center, radius) = (s.center(), s.radius());
    match other {
        Surface::Sphere(o) => {
            let diff = o.center() - center;
            let d = diff.magnitude();
            if d < TOLERANCE {
                return Some(Vec::new());
            }
            let u = diff / d;
            if d > radius + o.radius() + tol || d < (radius - o.radius()).abs() - tol {
                return Some(Vec::new());
            }
            if near_equal(d, radius + o.radius(), tol, false)
                || near_equal(d, (radius - o.radius()).abs(), tol, false)
            {
                return Some(vec![PointCurve::new(center + u * radius * f64::signum(d)).into()]);
            }
            let a = (d * d + radius * radius - o.radius() * o.radius()) / (2.0 * d);
            let ring = f64::sqrt(radius * radius - a * a);
            Some(vec![Circle::new(center + u * a, u, ring, None).into()])
        }
        Surface::Cylinder(c) => {
            let to_axis = center - c.origin();
            let off_axis = to_axis - c.axis() * to_axis.dot(c.axis());
            if off_axis.magnitude() > tol {
                return None;
            }
            // centered on the axis: latitude circles
            if radius < c.radius() - tol {
                return Some(Vec::new());
            }
            if near_equal(radius, c.radius(), tol, false) {
                return Some(vec![Circle::new(center, c.axis(), radius, None).into()]);
            }
            let h = f64::sqrt(radius * radius - c.radius() * c.radius());
            Some(vec![
                Circle::new(center + c.axis() * h, c.axis(), c.radius(), None).into(),
                Circle::new(center - c.axis() * h, c.axis(), c.radius(), None).into(),
            ])
        }
        Surface::Cone(c) => {
            let to_axis = center - c.origin();
            let off_axis = to_axis - c.axis() * to_axis.dot(c.axis());
            if off_axis.magnitude() > tol {
                return None;
            }
            // centered on the axis: solve for the cut heights
            let apex = c.apex();
            let w = -c.axis();
            let z_c = (center - apex).dot(w);
            // cone point at distance s from apex along a ruling:
            // height s cos(a), radial s sin(a)
            let (sin_a, cos_a) = (c.sin_half_angle(), c.cos_half_angle());
            // (s cos - z_c)^2 + s^2 sin^2 = r^2
            let roots = solvers::solve_quadratic(
                1.0,
                -2.0 * z_c * cos_a,
                z_c * z_c - radius * radius,
            );
            let mut curves: Vec<Curve> = Vec::new();
            for s in roots {
                if s < -tol {
                    continue;
                }
                if s.abs() <= tol {
                    curves.push(PointCurve::new(apex).into());
                    continue;
                }
                let ring = s * sin_a;
                let ring_center = apex + w * (s * cos_a);
                curves.push(Circle::new(ring_center, w, ring, None).into());
            }
            Some(curves)
        }
        Surface::Torus(t) => {
            if t.kind() != TorusKind::Donut {
                return None;
            }
            let to_axis = center - t.center();
            let off_axis = to_axis - t.axis() * to_axis.dot(t.axis());
            if off_axis.magnitude() > tol {
                return None;
            }
            let z_c = (center - t.center()).dot(t.axis());
            let (big_r, small_r) = (t.major_radius(), t.minor_radius());
            // (r sin v - z_c)^2 + (R + r cos v)^2 = rs^2 reduces to
            // a cos v + b sin v = c
            let a = 2.0 * big_r * small_r;
            let b = -2.0 * z_c * small_r;
            let c = radius * radius
                - small_r * small_r
                - z_c * z_c
                - big_r * big_r;
            let mut curves: Vec<Curve> = Vec::new();
            for v in solve_cos_sin(a, b, c) {
                let ring = big_r + small_r * v.cos();
                if ring < TOLERANCE {
                    continue;
                }
                let ring_center = t.center() + t.axis() * (small_r * v.sin());
                curves.push(Circle::new(ring_center, t.axis(), ring, None).into());
            }
            Some(curves)
        }
        _ => None,
    }
}

// ------------------------------------------------------------------ //
// quadric pairs

fn cylinder_and_cylinder(s1: &Surface, s2: &Surface, tol: f64) -> Option<Vec<Curve>> {
    let (Surface::Cylinder(c1), Surface::Cylinder(c2)) = (s1, s2) else { unreachable!() };
    let (w1, w2) = (c1.axis(), c2.axis());
    let cross = w1.cross(w2);
    if cross.magnitude().so_small() {
        // parallel axes: rulings from the 2D circle pair
        let diff = c2.origin() - c1.origin();
        let off = diff - w1 * diff.dot(w1);
        let d = off.magnitude();
        if d > c1.radius() + c2.radius() + tol
            || d < (c1.radius() - c2.radius()).abs() - tol
        {
            return Some(Vec::new());
        }
        if d < TOLERANCE {
            return Some(Vec::new());
        }
        let u = off / d;
        let e = w1.cross(u);
        let a = (d * d + c1.radius() * c1.radius() - c2.radius() * c2.radius()) / (2.0 * d);
        if near_equal(d, c1.radius() + c2.radius(), tol, false)
            || near_equal(d, (c1.radius() - c2.radius()).abs(), tol, false)
        {
            return Some(vec![Line::new(c1.origin() + u * a, w1).into()]);
        }
        let h = f64::sqrt(c1.radius() * c1.radius() - a * a);
        return Some(vec![
            Line::new(c1.origin() + u * a + e * h, w1).into(),
            Line::new(c1.origin() + u * a - e * h, w1).into(),
        ]);
    }
    // intersecting axes with equal radii: the two ellipse planes through
    // the bisectors
    if near_equal(c1.radius(), c2.radius(), tol, false) {
        let diff = c2.origin() - c1.origin();
        let gap = diff.dot(cross) / cross.magnitude();
        if gap.abs() <= tol {
            // meeting point of the axes
            let denom = cross.magnitude2();
            let t1 = diff.cross(w2).dot(cross) / denom;
            let meet = c1.origin() + w1 * t1;
            let r = c1.radius();
            let h1 = (w1 + w2).normalize();
            let h2 = (w1 - w2).normalize();
            let cos_g = w1.dot(h1); // cos of the half angle between axes
            let sin_g = f64::sqrt(f64::max(0.0, 1.0 - cos_g * cos_g));
            if sin_g < TOLERANCE {
                return Some(Vec::new());
            }
            return Some(vec![
                Ellipse::new(meet, h2, h1, r / sin_g, r).into(),
                Ellipse::new(meet, h1, h2, r / cos_g, r).into(),
            ]);
        }
    }
    None
}

fn cylinder_and_cone(s1: &Surface, s2: &Surface, tol: f64) -> Option<Vec<Curve>> {
    let (Surface::Cylinder(cyl), Surface::Cone(cone)) = (s1, s2) else { unreachable!() };
    // coaxial: one latitude circle where the cone reaches the radius
    let aligned = near_equal(cyl.axis().dot(cone.axis()).abs(), 1.0, TOLERANCE, false);
    let diff = cone.origin() - cyl.origin();
    let off = diff - cyl.axis() * diff.dot(cyl.axis());
    if !aligned || off.magnitude() > tol {
        return None;
    }
    let apex = cone.apex();
    let w = -cone.axis();
    let s = cyl.radius() / cone.sin_half_angle();
    let center = apex + w * (s * cone.cos_half_angle());
    Some(vec![Circle::new(center, w, cyl.radius(), None).into()])
}

fn cylinder_and_torus(s1: &Surface, s2: &Surface, tol: f64) -> Option<Vec<Curve>> {
    let (Surface::Cylinder(cyl), Surface::Torus(torus)) = (s1, s2) else { unreachable!() };
    if torus.kind() != TorusKind::Donut {
        return None;
    }
    // coaxial: latitude circles where the tube reaches the cylinder radius
    let aligned = near_equal(cyl.axis().dot(torus.axis()).abs(), 1.0, TOLERANCE, false);
    let diff = torus.center() - cyl.origin();
    let off = diff - cyl.axis() * diff.dot(cyl.axis());
    if !aligned || off.magnitude() > tol {
        return None;
    }
    let (big_r, small_r) = (torus.major_radius(), torus.minor_radius());
    // R + r cos(v) = rc fixes the tube angle of the cut
    let cos_v = (cyl.radius() - big_r) / small_r;
    if cos_v.abs() > 1.0 + tol / small_r {
        return Some(Vec::new());
    }
    let w = torus.axis();
    if near_equal(cos_v.abs(), 1.0, tol / small_r, false) {
        // grazing the outer or inner equator: one tangent circle
        return Some(vec![Circle::new(torus.center(), w, cyl.radius(), None).into()]);
    }
    let height = small_r * f64::sqrt(1.0 - cos_v * cos_v);
    Some(vec![
        Circle::new(torus.center() + w * height, w, cyl.radius(), None).into(),
        Circle::new(torus.center() - w * height, w, cyl.radius(), None).into(),
    ])
}

fn cone_and_cone(s1: &Surface, s2: &Surface, tol: f64) -> Option<Vec<Curve>> {
    let (Surface::Cone(c1), Surface::Cone(c2)) = (s1, s2) else { unreachable!() };
    let aligned = near_equal(c1.axis().dot(c2.axis()).abs(), 1.0, TOLERANCE, false);
    let diff = c2.apex() - c1.apex();
    let off = diff - c1.axis() * diff.dot(c1.axis());
    if !aligned || off.magnitude() > tol {
        return None;
    }
    let (a1, a2) = (c1.apex(), c2.apex());
    if a1.distance(a2) <= tol {
        // a shared apex: the cones only meet there unless the angles
        // match, which is the coincident case filtered above, or the
        // axes oppose, which the walker sorts out
        if c1.axis().dot(c2.axis()) > 0.0 {
            return Some(vec![PointCurve::new(a1).into()]);
        }
        return None;
    }
    // separated apexes on one axis: radii agree where
    // s1 tan(a1) = (s1 - gap) tan(a2) along the common axis
    let w = -c1.axis();
    let gap = (a2 - a1).dot(w);
    let (t1, t2) = (
        c1.sin_half_angle() / c1.cos_half_angle(),
        c2.sin_half_angle() / c2.cos_half_angle(),
    );
    let denom = t1 - t2 * f64::signum(c1.axis().dot(c2.axis()));
    if denom.abs() < ZERO {
        return Some(Vec::new());
    }
    let z = -gap * t2 / denom;
    let ring = z.abs() * t1;
    if z * t1 < tol || ring < tol {
        return Some(Vec::new());
    }
    Some(vec![Circle::new(a1 + w * z, w, ring, None).into()])
}

// ------------------------------------------------------------------ //
// helpers

fn orthogonal_to(v: Vector3) -> Vector3 { lathe_geometry::orthogonal(v) }

/// solutions of `a cos(t) + b sin(t) = c` in `[0, 2pi)`
fn solve_cos_sin(a: f64, b: f64, c: f64) -> Vec<f64> {
    let m = f64::sqrt(a * a + b * b);
    if m < ZERO {
        return Vec::new();
    }
    let ratio = c / m;
    if ratio.abs() > 1.0 + TOLERANCE {
        return Vec::new();
    }
    let phase = f64::atan2(b, a);
    let spread = f64::acos(f64::clamp(ratio, -1.0, 1.0));
    let wrap = |t: f64| -> f64 {
        let mut t = t % (2.0 * std::f64::consts::PI);
        if t < 0.0 {
            t += 2.0 * std::f64::consts::PI;
        }
        t
    };
    let t1 = wrap(phase + spread);
    let t2 = wrap(phase - spread);
    match near_equal(t1, t2, TOLERANCE, false) {
        true => vec![t1],
        false => vec![t1.min(t2), t1.max(t2)],
    }
}

/// Builds the parametric conic for implicit plane-frame coefficients
/// `[a, b, c, d, e, f]` of `a x^2 + b xy + c y^2 + d x + e y + f = 0`.
fn conic_curve_from_implicit(
    origin: Point3,
    x_axis: Vector3,
    y_axis: Vector3,
    normal: Vector3,
    coef: [f64; 6],
) -> Option<Curve> {
    let [a, b, c, d, e, f] = coef;
    let det = a * c - b * b / 4.0;
    // principal directions of the quadratic part
    let theta = 0.5 * safe_atan2(b, a - c);
    let (sin_t, cos_t) = theta.sin_cos();
    let l1 = a * cos_t * cos_t + b * cos_t * sin_t + c * sin_t * sin_t;
    let l2 = a * sin_t * sin_t - b * cos_t * sin_t + c * cos_t * cos_t;
    let dir1 = x_axis * cos_t + y_axis * sin_t;
    let dir2 = y_axis * cos_t - x_axis * sin_t;
    if det.abs() > 1.0e-10 {
        // central conic: translate to the center
        let cx = (b * e - 2.0 * c * d) / (4.0 * det);
        let cy = (b * d - 2.0 * a * e) / (4.0 * det);
        let f0 = f + 0.5 * (d * cx + e * cy);
        let center = origin + x_axis * cx + y_axis * cy;
        if det > 0.0 {
            // ellipse: l1 X^2 + l2 Y^2 = -f0
            if -f0 / l1 <= 0.0 || -f0 / l2 <= 0.0 {
                return None;
            }
            let r1 = f64::sqrt(-f0 / l1);
            let r2 = f64::sqrt(-f0 / l2);
            if near_equal(r1, r2, TOLERANCE, true) {
                return Some(Circle::new(center, normal, r1, Some(dir1)).into());
            }
            return Some(match r1 >= r2 {
                true => Ellipse::new(center, normal, dir1, r1, r2).into(),
                false => Ellipse::new(center, normal, dir2, r2, r1).into(),
            });
        }
        // hyperbola: the transverse axis has a positive squared radius
        let (lx, ly, dx) = match -f0 / l1 > 0.0 {
            true => (l1, l2, dir1),
            false => (l2, l1, dir2),
        };
        let major = f64::sqrt(-f0 / lx);
        let minor = f64::sqrt(f64::abs(f0 / ly));
        return Some(Hyperbola::new(center, normal, dx, major, minor).into());
    }
    // parabola: one vanishing eigenvalue; the other carries the square
    let (lq, sq_dir, lin_dir) = match l1.abs() > l2.abs() {
        true => (l1, dir1, dir2),
        false => (l2, dir2, dir1),
    };
    // rotated linear terms
    let (du, dv) = match l1.abs() > l2.abs() {
        true => (
            d * cos_t + e * sin_t,
            e * cos_t - d * sin_t,
        ),
        false => (
            e * cos_t - d * sin_t,
            d * cos_t + e * sin_t,
        ),
    };
    if dv.abs() < ZERO {
        return None;
    }
    // lq X^2 + du X + dv Y + f = 0, vertex at X0 = -du / (2 lq)
    let x0 = -du / (2.0 * lq);
    let y0 = -(f + lq * x0 * x0 + du * x0) / dv;
    let vertex = origin + sq_dir * x0 + lin_dir * y0;
    let a_coef = -lq / dv;
    let mut parabola = Parabola::new(vertex, normal, sq_dir, a_coef);
    // our parabola frame demands y = a x^2 with y along normal x sq_dir
    let y_dir = parabola.y_axis();
    if y_dir.dot(lin_dir) < 0.0 {
        parabola = Parabola::new(vertex, -normal, sq_dir, -a_coef);
    }
    Some(parabola.into())
}

// ------------------------------------------------------------------ //
// walking fallback

/// Seeds from a coarse sample sweep driven onto the intersection, then
/// walks each remaining seed into a hermite curve. An isolated tangency
/// that refuses to walk comes back as a point curve.
fn walker_fallback(
    surface1: &Surface,
    surface2: &Surface,
    tol: f64,
    interrupt: InterruptFlag<'_>,
) -> Result<Vec<Curve>> {
    let mut seeds = walker_seeds(surface1, surface2, tol);
    debug!("walking fallback with {} seeds", seeds.len());
    if seeds.is_empty() {
        // a free-form pair whose patches overlap but give the sweep no
        // purchase cannot be told apart from a miss; decline rather than
        // report empty
        let free_form = |s: &Surface| matches!(s, Surface::Nub(_) | Surface::Nurb(_));
        if free_form(surface1) && free_form(surface2) {
            let bb1 = surface1.bounding_box(surface1.domain());
            let bb2 = surface2.bounding_box(surface2.domain());
            if bb1.intersects(&bb2) {
                return Err(Error::NotImplemented(
                    "free-form surface pair with no walkable seed".into(),
                ));
            }
        }
        return Ok(Vec::new());
    }
    let mut curves: Vec<Curve> = Vec::new();
    let mut guard = 0;
    while let Some(seed) = seeds.pop() {
        guard += 1;
        if guard > 32 {
            break;
        }
        match walk_from_to(seed, &[], surface1, surface2, interrupt) {
            Ok(hermite) => {
                let curve: Curve = hermite.into();
                // seeds on the traced curve are spent
                seeds.retain(|&s| {
                    let (_, close) = curve.inverse(s, None);
                    close.distance(s) > tol * 100.0 && close.distance(s) > curve_spacing(&curve)
                });
                curves.push(curve);
            }
            Err(Error::Interrupted) => return Err(Error::Interrupted),
            Err(_) => {
                // an isolated tangent point
                curves.push(PointCurve::new(seed).into());
                seeds.retain(|&s| s.distance(seed) > tol * 100.0);
            }
        }
    }
    Ok(curves)
}

fn curve_spacing(curve: &Curve) -> f64 {
    let domain = curve.domain();
    curve.subs(domain.min).distance(curve.subs(domain.mid_point(0.1))) * 0.5
}

fn walker_seeds(surface1: &Surface, surface2: &Surface, tol: f64) -> Vec<Point3> {
    let domain = surface1.domain();
    let clip = |iv: Interval1D| match iv.is_bounded() {
        true => iv,
        false => Interval1D::new(-10.0, 10.0),
    };
    let (ud, vd) = (clip(domain.u), clip(domain.v));
    let n = 16;
    let mut seeds: Vec<Point3> = Vec::new();
    for i in 0..=n {
        for j in 0..=n {
            let uv = Point2::new(
                ud.mid_point(i as f64 / n as f64),
                vd.mid_point(j as f64 / n as f64),
            );
            let start = surface1.subs(uv.x, uv.y);
            let refined = zoom_in(start, surface1, surface2);
            let (_, on1) = surface1.inverse(refined, None);
            let (_, on2) = surface2.inverse(refined, None);
            if refined.distance(on1) > tol || refined.distance(on2) > tol {
                continue;
            }
            if seeds.iter().all(|s| s.distance(refined) > 100.0 * tol) {
                seeds.push(refined);
            }
        }
    }
    seeds
}

#[cfg(test)]
mod tests {
    use super::*;
    use lathe_base::assert_near;
    use lathe_base::geom_traits::ParametricCurve;
    use lathe_geometry::surfaces::{Cone, Cylinder, Plane, Sphere, Torus};
    use std::f64::consts::PI;

    #[test]
    fn plane_sphere_circle() {
        // plane x = 1 against the radius 2 sphere
        let plane: Surface =
            Plane::new(Point3::new(1.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0)).into();
        let sphere: Surface = Sphere::new(Point3::new(0.0, 0.0, 0.0), 2.0).into();
        let curves = intersect_surfaces(&plane, &sphere, 1.0e-6, None).unwrap();
        assert_eq!(curves.len(), 1);
        let Curve::Circle(circle) = &curves[0] else {
            panic!("expected a circle")
        };
        assert_near!(circle.center(), Point3::new(1.0, 0.0, 0.0));
        assert_near!(circle.radius(), f64::sqrt(3.0));
    }

    #[test]
    fn plane_cylinder_ellipse() {
        let cylinder: Surface = Cylinder::new(
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            1.0,
            None,
        )
        .into();
        let oblique: Surface = Plane::new(
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 1.0),
        )
        .into();
        let curves = intersect_surfaces(&oblique, &cylinder, 1.0e-6, None).unwrap();
        assert_eq!(curves.len(), 1);
        let Curve::Ellipse(e) = &curves[0] else {
            panic!("expected an ellipse")
        };
        assert_near!(e.semi_minor(), 1.0);
        assert_near!(e.semi_major(), f64::sqrt(2.0));
    }

    #[test]
    fn plane_torus_villarceau() {
        // the Villarceau angle yields two circles
        // lying on the torus
        let torus: Surface = Torus::new(
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            1.0,
            3.0,
        )
        .into();
        // the plane pivots about the x axis, tilted from the equator by
        // asin(r / R); its normal is (0, -sin, cos) of that angle
        let tilt = f64::asin(1.0 / 3.0);
        let n = Vector3::new(0.0, -tilt.sin(), tilt.cos());
        let plane: Surface = Plane::new(Point3::new(0.0, 0.0, 0.0), n).into();
        let curves = intersect_surfaces(&plane, &torus, 1.0e-6, None).unwrap();
        assert_eq!(curves.len(), 2);
        for curve in &curves {
            let Curve::Circle(circle) = curve else {
                panic!("expected circles")
            };
            assert_near!(circle.radius(), 3.0);
            // every point of the circle lies on the torus
            for i in 0..16 {
                let p = circle.subs(i as f64 * PI / 8.0);
                let (_, close) = torus.inverse(p, None);
                assert!(p.distance(close) < 1.0e-6, "off torus by {}", p.distance(close));
            }
        }
    }

    #[test]
    fn sphere_sphere_circle() {
        let s1: Surface = Sphere::new(Point3::new(0.0, 0.0, 0.0), 2.0).into();
        let s2: Surface = Sphere::new(Point3::new(2.0, 0.0, 0.0), 2.0).into();
        let curves = intersect_surfaces(&s1, &s2, 1.0e-6, None).unwrap();
        assert_eq!(curves.len(), 1);
        let Curve::Circle(circle) = &curves[0] else {
            panic!("expected a circle")
        };
        assert_near!(circle.center(), Point3::new(1.0, 0.0, 0.0));
        assert_near!(circle.radius(), f64::sqrt(3.0));
    }

    #[test]
    fn equal_cylinders_cross_in_ellipses() {
        let c1: Surface = Cylinder::new(
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            1.0,
            None,
        )
        .into();
        let c2: Surface = Cylinder::new(
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            1.0,
            None,
        )
        .into();
        let curves = intersect_surfaces(&c1, &c2, 1.0e-6, None).unwrap();
        assert_eq!(curves.len(), 2);
        for curve in &curves {
            let Curve::Ellipse(e) = curve else {
                panic!("expected ellipses")
            };
            assert_near!(e.semi_minor(), 1.0);
            assert_near!(e.semi_major(), f64::sqrt(2.0));
        }
    }

    #[test]
    fn coaxial_cone_circle() {
        let cyl: Surface = Cylinder::new(
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            0.5,
            None,
        )
        .into();
        let cone: Surface = Cone::new(
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            1.0,
            PI / 4.0,
        )
        .into();
        let curves = intersect_surfaces(&cyl, &cone, 1.0e-6, None).unwrap();
        assert_eq!(curves.len(), 1);
        let Curve::Circle(circle) = &curves[0] else {
            panic!("expected a circle")
        };
        assert_near!(circle.radius(), 0.5);
        assert_near!(circle.center(), Point3::new(0.0, 0.0, 0.5));
    }

    #[test]
    fn coaxial_cylinder_torus_circles() {
        let torus: Surface = Torus::new(
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            1.0,
            3.0,
        )
        .into();
        let cyl: Surface = Cylinder::new(
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            3.0,
            None,
        )
        .into();
        // the cylinder through the tube centers cuts the top and bottom
        let curves = intersect_surfaces(&cyl, &torus, 1.0e-6, None).unwrap();
        assert_eq!(curves.len(), 2);
        for (curve, z) in curves.iter().zip([1.0, -1.0]) {
            let Curve::Circle(circle) = curve else {
                panic!("expected circles")
            };
            assert_near!(circle.radius(), 3.0);
            assert_near!(circle.center(), Point3::new(0.0, 0.0, z));
        }
        // grazing the outer equator: one tangent circle
        let grazing: Surface = Cylinder::new(
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            4.0,
            None,
        )
        .into();
        let curves = intersect_surfaces(&torus, &grazing, 1.0e-6, None).unwrap();
        assert_eq!(curves.len(), 1);
        let Curve::Circle(circle) = &curves[0] else {
            panic!("expected a circle")
        };
        assert_near!(circle.radius(), 4.0);
        // clear of the tube entirely: empty
        let outside: Surface = Cylinder::new(
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            5.0,
            None,
        )
        .into();
        assert!(intersect_surfaces(&torus, &outside, 1.0e-6, None).unwrap().is_empty());
    }

    #[test]
    fn sphere_cylinder_off_axis_walks() {
        let sphere: Surface = Sphere::new(Point3::new(0.0, 0.0, 0.0), 2.0).into();
        let cylinder: Surface = Cylinder::new(
            Point3::new(0.5, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            1.0,
            None,
        )
        .into();
        let curves = intersect_surfaces(&sphere, &cylinder, 1.0e-6, None).unwrap();
        // the upper and lower intersection loops, traced
        let hermites: Vec<_> = curves
            .iter()
            .filter(|c| matches!(c, Curve::Hermite(_)))
            .collect();
        assert!(!hermites.is_empty(), "got {curves:?}");
        for curve in hermites {
            let domain = curve.domain();
            for i in 0..=16 {
                let p = curve.subs(domain.mid_point(i as f64 / 16.0));
                let (_, on1) = sphere.inverse(p, None);
                let (_, on2) = cylinder.inverse(p, None);
                assert!(p.distance(on1) < 1.0e-4);
                assert!(p.distance(on2) < 1.0e-4);
            }
        }
    }
}
