use crate::bounding_box::{Interval1D, Interval2D};
use crate::cgmath64::*;

/// Parametric curves
pub trait ParametricCurve {
    /// Substitutes the parameter `t`.
    fn subs(&self, t: f64) -> Point3;
    /// Returns the derivation.
    fn der(&self, t: f64) -> Vector3;
    /// Returns the 2nd-order derivation.
    fn der2(&self, t: f64) -> Vector3;
}

/// Curve with a parameter range
pub trait BoundedCurve: ParametricCurve {
    /// The range of the parameter of the curve.
    fn parameter_range(&self) -> Interval1D;
    /// The front end point of the curve.
    fn front(&self) -> Point3 { self.subs(self.parameter_range().min) }
    /// The back end point of the curve.
    fn back(&self) -> Point3 { self.subs(self.parameter_range().max) }
}

/// Parametric surface
pub trait ParametricSurface {
    /// Substitutes the parameter `(u, v)`.
    fn subs(&self, u: f64, v: f64) -> Point3;
    /// Returns the derivation by `u`.
    fn uder(&self, u: f64, v: f64) -> Vector3;
    /// Returns the derivation by `v`.
    fn vder(&self, u: f64, v: f64) -> Vector3;
    /// Returns the 2nd-order derivation by `u`.
    fn uuder(&self, u: f64, v: f64) -> Vector3;
    /// Returns the 2nd-order derivation by both `u` and `v`.
    fn uvder(&self, u: f64, v: f64) -> Vector3;
    /// Returns the 2nd-order derivation by `v`.
    fn vvder(&self, u: f64, v: f64) -> Vector3;

    /// Returns the normal vector at `(u, v)`. Zero on singularities.
    fn normal(&self, u: f64, v: f64) -> Vector3 {
        let n = self.uder(u, v).cross(self.vder(u, v));
        let m = n.magnitude();
        match m < crate::tolerance::ZERO {
            true => Vector3::zero(),
            false => n / m,
        }
    }
}

/// Surface with a parameter rectangle
pub trait BoundedSurface: ParametricSurface {
    /// The range of the parameter of the surface.
    fn parameter_range(&self) -> Interval2D;
}

/// Searches the parameter of the nearest point by Newton iteration.
pub trait SearchNearestParameter {
    /// parameter type: `f64` for curves, `(f64, f64)` for surfaces
    type Parameter;
    /// Returns the parameter whose image is nearest to `point`, starting
    /// from `hint` when given. `None` when the iteration diverges.
    fn search_nearest_parameter(
        &self,
        point: Point3,
        hint: Option<Self::Parameter>,
        trials: usize,
    ) -> Option<Self::Parameter>;
}
