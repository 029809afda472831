use super::*;

/// degenerate curve evaluating to a fixed point regardless of the parameter
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointCurve {
    position: Point3,
}

impl PointCurve {
    /// constructor
    #[inline(always)]
    pub const fn new(position: Point3) -> Self { Self { position } }

    /// the fixed point
    #[inline(always)]
    pub const fn position(&self) -> Point3 { self.position }

    /// whether `other` is the same point within `tol`
    #[inline]
    pub fn is_same(&self, other: &Self, tol: f64) -> bool {
        self.position.distance(other.position) <= tol
    }
}

impl ParametricCurve for PointCurve {
    #[inline(always)]
    fn subs(&self, _: f64) -> Point3 { self.position }
    #[inline(always)]
    fn der(&self, _: f64) -> Vector3 { Vector3::zero() }
    #[inline(always)]
    fn der2(&self, _: f64) -> Vector3 { Vector3::zero() }
}

impl BoundedCurve for PointCurve {
    #[inline(always)]
    fn parameter_range(&self) -> Interval1D { Interval1D::new(0.0, 1.0) }
}

impl SearchNearestParameter for PointCurve {
    type Parameter = f64;
    #[inline(always)]
    fn search_nearest_parameter(&self, _: Point3, hint: Option<f64>, _: usize) -> Option<f64> {
        Some(hint.unwrap_or(0.0))
    }
}

impl Transformed for PointCurve {
    fn transform_by(&mut self, trans: &Transform3) {
        self.position = trans.transform_point(self.position);
    }
}
