//! One tagged variant per curve kind, dispatched in one place.

use crate::errors::{Error, Result};
use crate::knot::KnotVec;
use crate::orthogonal;
use crate::transform::{Transform3, Transformed};
use lathe_base::prelude::*;
use lathe_base::quadrature;
use lathe_base::solvers;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::sync::Arc;

mod circle;
mod ellipse;
mod hermite;
mod hyperbola;
mod line;
mod nub;
mod nurb;
mod parabola;
mod point_curve;

pub use circle::Circle;
pub use ellipse::Ellipse;
pub use hermite::Hermite;
pub use hyperbola::Hyperbola;
pub use line::Line;
pub use nub::NubCurve;
pub use nurb::NurbCurve;
pub use parabola::Parabola;
pub use point_curve::PointCurve;

/// discriminant of the curve kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurveKind {
    /// straight line
    Line,
    /// circle
    Circle,
    /// ellipse
    Ellipse,
    /// parabola
    Parabola,
    /// hyperbola
    Hyperbola,
    /// non-uniform B-spline curve
    Nub,
    /// non-uniform rational B-spline curve
    Nurb,
    /// degenerate point curve
    PointCurve,
    /// piecewise cubic hermite curve
    Hermite,
}

/// 3-dimensional curve
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Curve {
    /// line
    Line(Line),
    /// circle
    Circle(Circle),
    /// ellipse
    Ellipse(Ellipse),
    /// parabola
    Parabola(Parabola),
    /// hyperbola
    Hyperbola(Hyperbola),
    /// non-uniform B-spline curve
    Nub(NubCurve),
    /// non-uniform rational B-spline curve
    Nurb(NurbCurve),
    /// point curve
    PointCurve(PointCurve),
    /// hermite curve
    Hermite(Hermite),
}

macro_rules! derive_curve_method {
    ($curve: expr, $method: expr, $($ver: expr),*) => {
        match $curve {
            Curve::Line(got) => $method(got, $($ver), *),
            Curve::Circle(got) => $method(got, $($ver), *),
            Curve::Ellipse(got) => $method(got, $($ver), *),
            Curve::Parabola(got) => $method(got, $($ver), *),
            Curve::Hyperbola(got) => $method(got, $($ver), *),
            Curve::Nub(got) => $method(got, $($ver), *),
            Curve::Nurb(got) => $method(got, $($ver), *),
            Curve::PointCurve(got) => $method(got, $($ver), *),
            Curve::Hermite(got) => $method(got, $($ver), *),
        }
    };
}

impl ParametricCurve for Curve {
    #[inline]
    fn subs(&self, t: f64) -> Point3 { derive_curve_method!(self, ParametricCurve::subs, t) }
    #[inline]
    fn der(&self, t: f64) -> Vector3 { derive_curve_method!(self, ParametricCurve::der, t) }
    #[inline]
    fn der2(&self, t: f64) -> Vector3 { derive_curve_method!(self, ParametricCurve::der2, t) }
}

impl BoundedCurve for Curve {
    #[inline]
    fn parameter_range(&self) -> Interval1D {
        derive_curve_method!(self, BoundedCurve::parameter_range,)
    }
}

impl Transformed for Curve {
    fn transform_by(&mut self, trans: &Transform3) {
        derive_curve_method!(self, Transformed::transform_by, trans)
    }
}

impl Curve {
    /// the discriminant of this curve
    pub fn kind(&self) -> CurveKind {
        match self {
            Curve::Line(_) => CurveKind::Line,
            Curve::Circle(_) => CurveKind::Circle,
            Curve::Ellipse(_) => CurveKind::Ellipse,
            Curve::Parabola(_) => CurveKind::Parabola,
            Curve::Hyperbola(_) => CurveKind::Hyperbola,
            Curve::Nub(_) => CurveKind::Nub,
            Curve::Nurb(_) => CurveKind::Nurb,
            Curve::PointCurve(_) => CurveKind::PointCurve,
            Curve::Hermite(_) => CurveKind::Hermite,
        }
    }

    /// whether the parameterization wraps around
    pub fn is_closed(&self) -> bool {
        match self {
            Curve::Circle(_) | Curve::Ellipse(_) => true,
            Curve::Nub(c) => c.is_closed(),
            Curve::Nurb(c) => c.is_closed(),
            Curve::Hermite(c) => c.is_closed(),
            _ => false,
        }
    }

    /// the parameter domain
    #[inline]
    pub fn domain(&self) -> Interval1D { self.parameter_range() }

    /// The parameter of the point on the curve nearest to `pos`, and that
    /// point. Total: any query point yields the closest parameter. For
    /// closed curves near the seam, `guess` chooses a side.
    pub fn inverse(&self, pos: Point3, guess: Option<f64>) -> (f64, Point3) {
        let t = derive_curve_method!(self, SearchNearestParameter::search_nearest_parameter, pos, guess, 32)
            .unwrap_or_else(|| self.presearch(pos));
        let t = match self.is_closed() {
            true => self.wrap(t),
            false => self.domain().clamp(t),
        };
        (t, self.subs(t))
    }

    /// wraps `t` into the domain of a closed curve
    fn wrap(&self, t: f64) -> f64 {
        let domain = self.domain();
        let len = domain.length();
        let mut t = t;
        while t < domain.min - TOLERANCE {
            t += len;
        }
        while t > domain.max + TOLERANCE {
            t -= len;
        }
        t
    }

    /// brute sampling fallback when Newton has nothing to offer
    fn presearch(&self, pos: Point3) -> f64 {
        let domain = self.domain();
        let division = 100;
        (0..=division)
            .map(|i| domain.mid_point(i as f64 / division as f64))
            .min_by(|&s, &t| {
                let ds = self.subs(s).distance2(pos);
                let dt = self.subs(t).distance2(pos);
                ds.partial_cmp(&dt).unwrap()
            })
            .unwrap_or(domain.min)
    }

    /// The curvature vector `(d1 x d2) x d1 / |d1|^4`: points toward the
    /// center of the osculating circle with magnitude `1/r`.
    pub fn curvature(&self, t: f64) -> Vector3 {
        let d1 = self.der(t);
        let d2 = self.der2(t);
        let m2 = d1.magnitude2();
        if m2.so_small2() {
            return Vector3::zero();
        }
        d1.cross(d2).cross(d1) / (m2 * m2)
    }

    /// arc length over `interval` by adaptive quadrature
    pub fn find_length(&self, interval: Interval1D, tol: f64) -> f64 {
        quadrature::integrate(
            &|t| self.der(t).magnitude(),
            interval.min,
            interval.max,
            tol,
        )
    }

    /// the front end point
    #[inline]
    pub fn front(&self) -> Point3 { BoundedCurve::front(self) }

    /// the back end point
    #[inline]
    pub fn back(&self) -> Point3 { BoundedCurve::back(self) }

    /// the point at the given domain fraction
    #[inline]
    pub fn midpoint(&self, fraction: f64) -> Point3 {
        self.subs(self.domain().mid_point(fraction))
    }

    /// A conservative bounding box of the curve over `interval`, from
    /// sampling padded by a sagitta bound.
    pub fn bounding_box(&self, interval: Interval1D) -> BoundingBox {
        const N: usize = 64;
        let mut bb = BoundingBox::empty();
        let dt = interval.length() / N as f64;
        let mut max_der2: f64 = 0.0;
        for i in 0..=N {
            let t = interval.mid_point(i as f64 / N as f64);
            bb.push(self.subs(t));
            max_der2 = f64::max(max_der2, self.der2(t).magnitude());
        }
        bb.stretch(max_der2 * dt * dt / 8.0 * 1.5 + TOLERANCE)
    }

    /// whether `other` traces the same geometry within `tol`
    pub fn is_same(&self, other: &Curve, tol: f64) -> bool {
        match (self, other) {
            (Curve::Line(a), Curve::Line(b)) => a.is_same(b, tol),
            (Curve::Circle(a), Curve::Circle(b)) => a.is_same(b, tol),
            (Curve::Ellipse(a), Curve::Ellipse(b)) => a.is_same(b, tol),
            (Curve::Parabola(a), Curve::Parabola(b)) => a.is_same(b, tol),
            (Curve::Hyperbola(a), Curve::Hyperbola(b)) => a.is_same(b, tol),
            (Curve::Nub(a), Curve::Nub(b)) => a.is_same(b, tol),
            (Curve::Nurb(a), Curve::Nurb(b)) => a.is_same(b, tol),
            (Curve::PointCurve(a), Curve::PointCurve(b)) => a.is_same(b, tol),
            (Curve::Hermite(a), Curve::Hermite(b)) => a.is_same(b, tol),
            _ => false,
        }
    }
}

macro_rules! impl_from {
    ($($kind: ident => $strukt: ident),* $(,)?) => {
        $(impl From<$strukt> for Curve {
            fn from(c: $strukt) -> Self { Curve::$kind(c) }
        })*
    };
}
impl_from!(
    Line => Line,
    Circle => Circle,
    Ellipse => Ellipse,
    Parabola => Parabola,
    Hyperbola => Hyperbola,
    Nub => NubCurve,
    Nurb => NurbCurve,
    PointCurve => PointCurve,
    Hermite => Hermite,
);

#[cfg(test)]
mod tests {
    use super::*;
    use lathe_base::assert_near;

    #[test]
    fn curvature_of_circle() {
        let c: Curve = Circle::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0), 2.0, None).into();
        let k = c.curvature(1.0);
        assert_near!(k.magnitude(), 0.5);
        // curvature points at the center
        let p = c.subs(1.0);
        assert_near!((p + k * 4.0), Point3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn circle_length() {
        let c: Curve = Circle::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0), 3.0, None).into();
        let len = c.find_length(c.domain(), 1.0e-10);
        assert_near!(len, 6.0 * PI);
    }

    #[test]
    fn inverse_is_total() {
        let c: Curve = Line::from_points(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)).into();
        // far away points still land on the closest parameter
        let (t, pos) = c.inverse(Point3::new(10.0, 5.0, 0.0), None);
        assert_near!(t, 1.0);
        assert_near!(pos, Point3::new(1.0, 0.0, 0.0));
    }
}
