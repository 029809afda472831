//! One tagged variant per surface kind, dispatched in one place.

use crate::errors::{Error, Result};
use crate::knot::KnotVec;
use crate::orthogonal;
use crate::transform::{Transform3, Transformed};
use lathe_base::prelude::*;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::sync::Arc;

mod cone;
mod cylinder;
mod extrude;
mod nub;
mod nurb;
mod plane;
mod revolve;
mod sphere;
mod torus;

pub use cone::Cone;
pub use cylinder::Cylinder;
pub use extrude::Extrude;
pub use nub::{NubSurface, SeedGrid};
pub use nurb::NurbSurface;
pub use plane::Plane;
pub use revolve::Revolve;
pub use sphere::Sphere;
pub use torus::{Torus, TorusKind};

use crate::curves::{Circle, Curve, Line};

/// discriminant of the surface kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceKind {
    /// plane
    Plane,
    /// cylinder
    Cylinder,
    /// cone
    Cone,
    /// sphere
    Sphere,
    /// torus
    Torus,
    /// non-uniform B-spline surface
    Nub,
    /// non-uniform rational B-spline surface
    Nurb,
    /// surface of revolution
    Revolve,
    /// extruded curve
    Extrude,
}

/// 3-dimensional surfaces
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Surface {
    /// plane
    Plane(Plane),
    /// cylinder
    Cylinder(Cylinder),
    /// cone
    Cone(Cone),
    /// sphere
    Sphere(Sphere),
    /// torus
    Torus(Torus),
    /// non-uniform B-spline surface
    Nub(NubSurface),
    /// non-uniform rational B-spline surface
    Nurb(NurbSurface),
    /// surface of revolution
    Revolve(Revolve),
    /// extrusion
    Extrude(Extrude),
}

macro_rules! derive_surface_method {
    ($surface: expr, $method: expr, $($ver: expr),*) => {
        match $surface {
            Surface::Plane(got) => $method(got, $($ver), *),
            Surface::Cylinder(got) => $method(got, $($ver), *),
            Surface::Cone(got) => $method(got, $($ver), *),
            Surface::Sphere(got) => $method(got, $($ver), *),
            Surface::Torus(got) => $method(got, $($ver), *),
            Surface::Nub(got) => $method(got, $($ver), *),
            Surface::Nurb(got) => $method(got, $($ver), *),
            Surface::Revolve(got) => $method(got, $($ver), *),
            Surface::Extrude(got) => $method(got, $($ver), *),
        }
    };
}

impl ParametricSurface for Surface {
    #[inline]
    fn subs(&self, u: f64, v: f64) -> Point3 {
        derive_surface_method!(self, ParametricSurface::subs, u, v)
    }
    #[inline]
    fn uder(&self, u: f64, v: f64) -> Vector3 {
        derive_surface_method!(self, ParametricSurface::uder, u, v)
    }
    #[inline]
    fn vder(&self, u: f64, v: f64) -> Vector3 {
        derive_surface_method!(self, ParametricSurface::vder, u, v)
    }
    #[inline]
    fn uuder(&self, u: f64, v: f64) -> Vector3 {
        derive_surface_method!(self, ParametricSurface::uuder, u, v)
    }
    #[inline]
    fn uvder(&self, u: f64, v: f64) -> Vector3 {
        derive_surface_method!(self, ParametricSurface::uvder, u, v)
    }
    #[inline]
    fn vvder(&self, u: f64, v: f64) -> Vector3 {
        derive_surface_method!(self, ParametricSurface::vvder, u, v)
    }
    #[inline]
    fn normal(&self, u: f64, v: f64) -> Vector3 {
        derive_surface_method!(self, ParametricSurface::normal, u, v)
    }
}

impl BoundedSurface for Surface {
    #[inline]
    fn parameter_range(&self) -> Interval2D {
        derive_surface_method!(self, BoundedSurface::parameter_range,)
    }
}

impl Transformed for Surface {
    fn transform_by(&mut self, trans: &Transform3) {
        derive_surface_method!(self, Transformed::transform_by, trans)
    }
}

impl Surface {
    /// the discriminant of this surface
    pub fn kind(&self) -> SurfaceKind {
        match self {
            Surface::Plane(_) => SurfaceKind::Plane,
            Surface::Cylinder(_) => SurfaceKind::Cylinder,
            Surface::Cone(_) => SurfaceKind::Cone,
            Surface::Sphere(_) => SurfaceKind::Sphere,
            Surface::Torus(_) => SurfaceKind::Torus,
            Surface::Nub(_) => SurfaceKind::Nub,
            Surface::Nurb(_) => SurfaceKind::Nurb,
            Surface::Revolve(_) => SurfaceKind::Revolve,
            Surface::Extrude(_) => SurfaceKind::Extrude,
        }
    }

    /// the parameter rectangle
    #[inline]
    pub fn domain(&self) -> Interval2D { self.parameter_range() }

    /// whether the u parameterization wraps
    pub fn closed_u(&self) -> bool {
        match self {
            Surface::Cylinder(_) | Surface::Cone(_) | Surface::Sphere(_) | Surface::Torus(_) => {
                true
            }
            Surface::Revolve(_) => true,
            Surface::Nub(s) => s.closed_u(),
            Surface::Nurb(s) => s.closed_u(),
            _ => false,
        }
    }

    /// whether the v parameterization wraps
    pub fn closed_v(&self) -> bool {
        match self {
            Surface::Torus(t) => t.closed_v(),
            Surface::Nub(s) => s.closed_v(),
            Surface::Nurb(s) => s.closed_v(),
            Surface::Revolve(s) => s.closed_v(),
            Surface::Extrude(s) => s.closed_v(),
            _ => false,
        }
    }

    /// the u period of a closed u direction
    pub fn u_period(&self) -> Option<f64> {
        match self.closed_u() {
            true => Some(self.domain().u.length()),
            false => None,
        }
    }

    /// the v period of a closed v direction
    pub fn v_period(&self) -> Option<f64> {
        match self.closed_v() {
            true => Some(self.domain().v.length()),
            false => None,
        }
    }

    /// whether the surface degenerates along the `u = min` boundary
    pub fn singular_low_u(&self) -> bool { self.edge_singular(0) }

    /// whether the surface degenerates along the `u = max` boundary
    pub fn singular_high_u(&self) -> bool { self.edge_singular(1) }

    /// whether the surface degenerates along the `v = min` boundary
    pub fn singular_low_v(&self) -> bool {
        match self {
            Surface::Sphere(_) => true,
            Surface::Torus(t) => !t.closed_v(),
            _ => self.edge_singular(2),
        }
    }

    /// whether the surface degenerates along the `v = max` boundary
    pub fn singular_high_v(&self) -> bool {
        match self {
            Surface::Sphere(_) => true,
            Surface::Cone(_) => true,
            Surface::Torus(t) => !t.closed_v(),
            _ => self.edge_singular(3),
        }
    }

    // samples the middle of a domain edge for a vanishing derivative
    fn edge_singular(&self, side: usize) -> bool {
        let domain = self.domain();
        if (side < 2 && !domain.u.is_bounded()) || (side >= 2 && !domain.v.is_bounded()) {
            return false;
        }
        let (uv, der) = match side {
            0 => (Point2::new(domain.u.min, domain.v.mid_point(0.5)), 1),
            1 => (Point2::new(domain.u.max, domain.v.mid_point(0.5)), 1),
            2 => (Point2::new(domain.u.mid_point(0.5), domain.v.min), 0),
            _ => (Point2::new(domain.u.mid_point(0.5), domain.v.max), 0),
        };
        let d = match der {
            0 => self.uder(uv.x, uv.y),
            _ => self.vder(uv.x, uv.y),
        };
        d.magnitude() < TOLERANCE
    }

    /// whether the point `uv` sits on a parametric singularity
    pub fn is_singularity(&self, uv: Point2, tol: f64) -> bool {
        self.uder(uv.x, uv.y).magnitude() < tol || self.vder(uv.x, uv.y).magnitude() < tol
    }

    /// The uv parameters of the point on the surface nearest `pos`, and
    /// that point. Total; `guess` disambiguates seams and singularities.
    pub fn inverse(&self, pos: Point3, guess: Option<Point2>) -> (Point2, Point3) {
        let uv = match self {
            Surface::Plane(s) => s.project(pos),
            Surface::Cylinder(s) => s.inverse(pos, guess),
            Surface::Cone(s) => s.inverse(pos, guess),
            Surface::Sphere(s) => s.inverse(pos, guess),
            Surface::Torus(s) => s.inverse(pos, guess),
            Surface::Revolve(s) => s.inverse(pos, guess),
            Surface::Extrude(s) => s.inverse(pos, guess),
            Surface::Nub(s) => {
                let start = guess.unwrap_or_else(|| s.seed_grid().nearest(pos));
                self.newton_inverse(pos, start)
            }
            Surface::Nurb(s) => {
                let start = guess.unwrap_or_else(|| s.seed_grid().nearest(pos));
                self.newton_inverse(pos, start)
            }
        };
        (uv, self.subs(uv.x, uv.y))
    }

    /// Newton iteration on the closest point conditions, clamped into the
    /// domain; falls back to the start on divergence.
    fn newton_inverse(&self, pos: Point3, start: Point2) -> Point2 {
        let domain = self.domain();
        let mut uv = domain.clamp(start);
        for _ in 0..32 {
            let diff = self.subs(uv.x, uv.y) - pos;
            let (su, sv) = (self.uder(uv.x, uv.y), self.vder(uv.x, uv.y));
            let f = Vector2::new(su.dot(diff), sv.dot(diff));
            let (suu, suv, svv) = (
                self.uuder(uv.x, uv.y),
                self.uvder(uv.x, uv.y),
                self.vvder(uv.x, uv.y),
            );
            let jac = Matrix2::new(
                suu.dot(diff) + su.magnitude2(),
                suv.dot(diff) + su.dot(sv),
                suv.dot(diff) + su.dot(sv),
                svv.dot(diff) + sv.magnitude2(),
            );
            let Some(inv) = jac.invert() else { break };
            let step = inv * f;
            uv = domain.clamp(uv - step);
            if step.magnitude2() < TOLERANCE2 * TOLERANCE2 {
                return uv;
            }
        }
        // Newton stalled; keep the best of start and current
        let d_start = self.subs(start.x, start.y).distance2(pos);
        let d_uv = self.subs(uv.x, uv.y).distance2(pos);
        match d_uv <= d_start {
            true => uv,
            false => domain.clamp(start),
        }
    }

    /// Principal curvature directions and values at `uv`, ordered
    /// `k1 >= k2`, signed against the surface normal.
    pub fn principal_curvature(&self, uv: Point2) -> (Vector3, Vector3, f64, f64) {
        let (su, sv) = (self.uder(uv.x, uv.y), self.vder(uv.x, uv.y));
        let n = self.normal(uv.x, uv.y);
        let (e, f, g) = (su.magnitude2(), su.dot(sv), sv.magnitude2());
        let (l, m, nn) = (
            self.uuder(uv.x, uv.y).dot(n),
            self.uvder(uv.x, uv.y).dot(n),
            self.vvder(uv.x, uv.y).dot(n),
        );
        let det = e * g - f * f;
        if det.so_small2() {
            return (su, sv, 0.0, 0.0);
        }
        // Weingarten matrix I^-1 * II
        let a11 = (g * l - f * m) / det;
        let a12 = (g * m - f * nn) / det;
        let a21 = (e * m - f * l) / det;
        let a22 = (e * nn - f * m) / det;
        let tr = a11 + a22;
        let dt = a11 * a22 - a12 * a21;
        let disc = f64::max(tr * tr / 4.0 - dt, 0.0);
        let root = disc.sqrt();
        let k1 = tr / 2.0 + root;
        let k2 = tr / 2.0 - root;
        let dir_of = |k: f64| -> Vector3 {
            // eigenvector (a, b) of the Weingarten matrix for eigenvalue k
            let (a, b) = match f64::abs(a12) > f64::abs(a21) {
                true if !(k - a11).so_small() || !a12.so_small() => (a12, k - a11),
                _ if !(k - a22).so_small() || !a21.so_small() => (k - a22, a21),
                _ => (1.0, 0.0),
            };
            let d = su * a + sv * b;
            match d.magnitude().so_small() {
                true => su,
                false => d.normalize(),
            }
        };
        let dir1 = dir_of(k1);
        let mut dir2 = dir_of(k2);
        if near_equal(k1, k2, ZERO, true) {
            // umbilic point: any orthogonal pair works
            dir2 = n.cross(dir1);
        }
        (dir1, dir2, k1, k2)
    }

    /// normal curvature in the tangent direction `dir` at `uv`
    pub fn directional_curvature(&self, uv: Point2, dir: Vector3) -> f64 {
        let (su, sv) = (self.uder(uv.x, uv.y), self.vder(uv.x, uv.y));
        let n = self.normal(uv.x, uv.y);
        let (e, f, g) = (su.magnitude2(), su.dot(sv), sv.magnitude2());
        let det = e * g - f * f;
        if det.so_small2() {
            return 0.0;
        }
        // tangent coordinates of dir from the Gram system
        let (bu, bv) = (dir.dot(su), dir.dot(sv));
        let a = (g * bu - f * bv) / det;
        let b = (e * bv - f * bu) / det;
        let (l, m, nn) = (
            self.uuder(uv.x, uv.y).dot(n),
            self.uvder(uv.x, uv.y).dot(n),
            self.vvder(uv.x, uv.y).dot(n),
        );
        let denom = e * a * a + 2.0 * f * a * b + g * b * b;
        if denom.so_small() {
            return 0.0;
        }
        (l * a * a + 2.0 * m * a * b + nn * b * b) / denom
    }

    /// the iso-parameter curve at fixed `u`; `None` for degenerate rulings
    pub fn u_param_line(&self, u0: f64) -> Option<Curve> {
        match self {
            Surface::Plane(s) => Some(Line::new(s.subs(u0, 0.0), s.y_axis()).into()),
            Surface::Cylinder(s) => Some(Line::new(s.subs(u0, 0.0), s.axis()).into()),
            Surface::Cone(s) => {
                let base = s.subs(u0, 0.0);
                let apex = s.apex();
                Some(Line::new(base, apex - base).into())
            }
            Surface::Sphere(s) => {
                // the meridian great circle
                let equator = s.subs(u0, 0.0);
                let radial = (equator - s.center()) / s.radius();
                let normal = s.axis().cross(radial);
                Some(Circle::new(s.center(), normal, s.radius(), Some(radial)).into())
            }
            Surface::Torus(s) => {
                let (su, cu) = u0.sin_cos();
                let radial = s.x_axis() * cu + (s.axis().cross(s.x_axis())) * su;
                let center = s.center() + radial * s.major_radius();
                let normal = s.axis().cross(radial);
                Some(Circle::new(center, normal, s.minor_radius(), Some(radial)).into())
            }
            Surface::Revolve(s) => {
                let mut curve = s.curve().clone();
                curve.transform_by(&Transform3::rotate_about(s.origin(), s.axis(), Rad(u0)));
                Some(curve)
            }
            Surface::Extrude(s) => {
                let mut curve = s.curve().clone();
                curve.transform_by(&Transform3::translate(s.direction() * u0));
                Some(curve)
            }
            Surface::Nub(s) => {
                let nv = s.control_points()[0].len();
                let nu = s.control_points().len();
                let span = s.u_knots().span(s.u_degree(), nu, u0);
                let basis = s.u_knots().basis_functions(s.u_degree(), span, u0);
                let cps: Vec<Point3> = (0..nv)
                    .map(|j| {
                        let v = basis.iter().enumerate().fold(Vector3::zero(), |acc, (i, &b)| {
                            acc + s.control_points()[span - s.u_degree() + i][j].to_vec() * b
                        });
                        Point3::from_vec(v)
                    })
                    .collect();
                crate::curves::NubCurve::new(s.v_knots().clone(), cps)
                    .ok()
                    .map(Curve::Nub)
            }
            Surface::Nurb(s) => {
                let nv = s.control_points()[0].len();
                let nu = s.control_points().len();
                let span = s.u_knots().span(s.u_degree(), nu, u0);
                let basis = s.u_knots().basis_functions(s.u_degree(), span, u0);
                let cps: Vec<Vector4> = (0..nv)
                    .map(|j| {
                        basis.iter().enumerate().fold(Vector4::zero(), |acc, (i, &b)| {
                            acc + s.control_points()[span - s.u_degree() + i][j] * b
                        })
                    })
                    .collect();
                crate::curves::NurbCurve::new(s.v_knots().clone(), cps)
                    .ok()
                    .map(Curve::Nurb)
            }
        }
    }

    /// the iso-parameter curve at fixed `v`; `None` for degenerate rulings
    pub fn v_param_line(&self, v0: f64) -> Option<Curve> {
        match self {
            Surface::Plane(s) => Some(Line::new(s.subs(0.0, v0), s.x_axis()).into()),
            Surface::Cylinder(s) => {
                let center = s.origin() + s.axis() * (s.radius() * v0);
                Some(Circle::new(center, s.axis(), s.radius(), Some(s.x_axis())).into())
            }
            Surface::Cone(s) => {
                let rho = s.radius_at(v0);
                if rho.so_small() {
                    return None;
                }
                let center = s.origin() + s.axis() * (v0 * s.cos_half_angle() * s.radius());
                Some(Circle::new(center, s.axis(), rho, None).into())
            }
            Surface::Sphere(s) => {
                let (sv, cv) = v0.sin_cos();
                let rho = s.radius() * cv;
                if rho.so_small() {
                    return None;
                }
                let center = s.center() + s.axis() * (s.radius() * sv);
                Some(Circle::new(center, s.axis(), rho, None).into())
            }
            Surface::Torus(s) => {
                let (sv, cv) = v0.sin_cos();
                let rho = s.major_radius() + s.minor_radius() * cv;
                if rho.so_small() {
                    return None;
                }
                let center = s.center() + s.axis() * (s.minor_radius() * sv);
                Some(Circle::new(center, s.axis(), rho, Some(s.x_axis())).into())
            }
            Surface::Revolve(s) => {
                let q = s.subs(0.0, v0);
                let diff = q - s.origin();
                let axial = s.axis() * diff.dot(s.axis());
                let radial = diff - axial;
                let rho = radial.magnitude();
                if rho.so_small() {
                    return None;
                }
                let center = s.origin() + axial;
                Some(Circle::new(center, s.axis(), rho, Some(radial / rho)).into())
            }
            Surface::Extrude(s) => Some(Line::new(s.curve().subs(v0), s.direction()).into()),
            Surface::Nub(s) => {
                let nu = s.control_points().len();
                let nv = s.control_points()[0].len();
                let span = s.v_knots().span(s.v_degree(), nv, v0);
                let basis = s.v_knots().basis_functions(s.v_degree(), span, v0);
                let cps: Vec<Point3> = (0..nu)
                    .map(|i| {
                        let v = basis.iter().enumerate().fold(Vector3::zero(), |acc, (j, &b)| {
                            acc + s.control_points()[i][span - s.v_degree() + j].to_vec() * b
                        });
                        Point3::from_vec(v)
                    })
                    .collect();
                crate::curves::NubCurve::new(s.u_knots().clone(), cps)
                    .ok()
                    .map(Curve::Nub)
            }
            Surface::Nurb(s) => {
                let nu = s.control_points().len();
                let nv = s.control_points()[0].len();
                let span = s.v_knots().span(s.v_degree(), nv, v0);
                let basis = s.v_knots().basis_functions(s.v_degree(), span, v0);
                let cps: Vec<Vector4> = (0..nu)
                    .map(|i| {
                        basis.iter().enumerate().fold(Vector4::zero(), |acc, (j, &b)| {
                            acc + s.control_points()[i][span - s.v_degree() + j] * b
                        })
                    })
                    .collect();
                crate::curves::NurbCurve::new(s.u_knots().clone(), cps)
                    .ok()
                    .map(Curve::Nurb)
            }
        }
    }

    /// A conservative bounding box of the surface over `rect`, from grid
    /// sampling padded by a curvature bound. Both directions of `rect`
    /// must be bounded.
    pub fn bounding_box(&self, rect: Interval2D) -> BoundingBox {
        const N: usize = 16;
        let mut bb = BoundingBox::empty();
        let (du, dv) = (rect.u.length() / N as f64, rect.v.length() / N as f64);
        let mut max_der2: f64 = 0.0;
        for i in 0..=N {
            for j in 0..=N {
                let u = rect.u.mid_point(i as f64 / N as f64);
                let v = rect.v.mid_point(j as f64 / N as f64);
                bb.push(self.subs(u, v));
                let bend = self
                    .uuder(u, v)
                    .magnitude()
                    .max(self.vvder(u, v).magnitude())
                    .max(self.uvder(u, v).magnitude());
                max_der2 = f64::max(max_der2, bend);
            }
        }
        let h = f64::max(du, dv);
        bb.stretch(max_der2 * h * h / 8.0 * 1.5 + TOLERANCE)
    }

    /// whether `other` carries the same geometry within `tol`
    pub fn is_same(&self, other: &Surface, tol: f64) -> bool {
        match (self, other) {
            (Surface::Plane(a), Surface::Plane(b)) => a.is_same(b, tol),
            (Surface::Cylinder(a), Surface::Cylinder(b)) => a.is_same(b, tol),
            (Surface::Cone(a), Surface::Cone(b)) => a.is_same(b, tol),
            (Surface::Sphere(a), Surface::Sphere(b)) => a.is_same(b, tol),
            (Surface::Torus(a), Surface::Torus(b)) => a.is_same(b, tol),
            (Surface::Nub(a), Surface::Nub(b)) => a.is_same(b, tol),
            (Surface::Nurb(a), Surface::Nurb(b)) => a.is_same(b, tol),
            _ => false,
        }
    }
}

macro_rules! impl_from {
    ($($kind: ident => $strukt: ident),* $(,)?) => {
        $(impl From<$strukt> for Surface {
            fn from(s: $strukt) -> Self { Surface::$kind(s) }
        })*
    };
}
impl_from!(
    Plane => Plane,
    Cylinder => Cylinder,
    Cone => Cone,
    Sphere => Sphere,
    Torus => Torus,
    Nub => NubSurface,
    Nurb => NurbSurface,
    Revolve => Revolve,
    Extrude => Extrude,
);

#[cfg(test)]
mod tests {
    use super::*;
    use lathe_base::assert_near;

    #[test]
    fn sphere_principal_curvature() {
        let s: Surface = Sphere::new(Point3::new(0.0, 0.0, 0.0), 2.0).into();
        let (_, _, k1, k2) = s.principal_curvature(Point2::new(0.5, 0.3));
        assert_near!(k1, -0.5);
        assert_near!(k2, -0.5);
    }

    #[test]
    fn cylinder_directional_curvature() {
        let c: Surface =
            Cylinder::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0), 2.0, None)
                .into();
        let uv = Point2::new(0.7, 0.4);
        // along the ruling the surface is flat
        let axial = c.directional_curvature(uv, Vector3::new(0.0, 0.0, 1.0));
        assert!(axial.so_small());
        // around the circumference the curvature is -1/r against the
        // outward normal
        let around = c.directional_curvature(uv, c.uder(uv.x, uv.y).normalize());
        assert_near!(around, -0.5);
    }

    #[test]
    fn torus_param_lines() {
        let t: Surface = Torus::new(
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            1.0,
            3.0,
        )
        .into();
        let tube = t.u_param_line(0.0).unwrap();
        // the tube circle at u = 0 passes through (4, 0, 0) and (2, 0, 0)
        let (_, close) = tube.inverse(Point3::new(4.0, 0.0, 0.0), None);
        assert_near!(close, Point3::new(4.0, 0.0, 0.0));
        let ring = t.v_param_line(0.0).unwrap();
        let (_, close) = ring.inverse(Point3::new(0.0, 4.0, 0.0), None);
        assert_near!(close, Point3::new(0.0, 4.0, 0.0));
    }

    #[test]
    fn singularities() {
        let s: Surface = Sphere::new(Point3::new(0.0, 0.0, 0.0), 1.0).into();
        assert!(s.singular_low_v() && s.singular_high_v());
        assert!(!s.singular_low_u());
        assert!(s.is_singularity(Point2::new(0.3, PI / 2.0), TOLERANCE));
        assert!(!s.is_singularity(Point2::new(0.3, 0.0), TOLERANCE));
    }

    #[test]
    fn nub_inverse_round_trip() {
        let pts: Vec<Vec<Point3>> = (0..4)
            .map(|i| {
                (0..4)
                    .map(|j| Point3::new(i as f64, j as f64, ((i * j) as f64) * 0.1))
                    .collect()
            })
            .collect();
        let s: Surface = NubSurface::new(
            KnotVec::clamped_uniform(4, 3),
            KnotVec::clamped_uniform(4, 3),
            pts,
        )
        .unwrap()
        .into();
        let target = s.subs(0.4, 0.7);
        let (uv, close) = s.inverse(target, None);
        assert!(close.distance(target) < 1.0e-6, "uv = {uv:?}");
    }
}
