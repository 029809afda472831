use super::*;

/// plane `p(u, v) = origin + u * x_axis + v * y_axis`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    origin: Point3,
    x_axis: Vector3,
    y_axis: Vector3,
    normal: Vector3,
}

impl Plane {
    /// Plane through `origin` with the given unit normal; the in-plane
    /// axes are derived.
    pub fn new(origin: Point3, normal: Vector3) -> Self {
        let normal = normal.normalize();
        let x_axis = orthogonal(normal);
        let y_axis = normal.cross(x_axis);
        Self { origin, x_axis, y_axis, normal }
    }

    /// Plane with explicit in-plane x axis.
    pub fn with_x_axis(origin: Point3, normal: Vector3, x_axis: Vector3) -> Self {
        let normal = normal.normalize();
        let x_axis = (x_axis - normal * x_axis.dot(normal)).normalize();
        let y_axis = normal.cross(x_axis);
        Self { origin, x_axis, y_axis, normal }
    }

    /// origin of the plane
    #[inline(always)]
    pub const fn origin(&self) -> Point3 { self.origin }

    /// unit normal
    #[inline(always)]
    pub const fn unit_normal(&self) -> Vector3 { self.normal }

    /// unit x axis
    #[inline(always)]
    pub const fn x_axis(&self) -> Vector3 { self.x_axis }

    /// unit y axis
    #[inline(always)]
    pub const fn y_axis(&self) -> Vector3 { self.y_axis }

    /// signed distance of `pos` above the plane
    #[inline]
    pub fn signed_distance(&self, pos: Point3) -> f64 { (pos - self.origin).dot(self.normal) }

    /// the uv parameters of the projection of `pos`
    #[inline]
    pub fn project(&self, pos: Point3) -> Point2 {
        let diff = pos - self.origin;
        Point2::new(diff.dot(self.x_axis), diff.dot(self.y_axis))
    }

    /// whether `other` spans the same plane within `tol`
    pub fn is_same(&self, other: &Self, tol: f64) -> bool {
        near_equal(f64::abs(self.normal.dot(other.normal)), 1.0, tol, false)
            && f64::abs(self.signed_distance(other.origin)) <= tol
    }
}

impl ParametricSurface for Plane {
    #[inline(always)]
    fn subs(&self, u: f64, v: f64) -> Point3 { self.origin + self.x_axis * u + self.y_axis * v }
    #[inline(always)]
    fn uder(&self, _: f64, _: f64) -> Vector3 { self.x_axis }
    #[inline(always)]
    fn vder(&self, _: f64, _: f64) -> Vector3 { self.y_axis }
    #[inline(always)]
    fn uuder(&self, _: f64, _: f64) -> Vector3 { Vector3::zero() }
    #[inline(always)]
    fn uvder(&self, _: f64, _: f64) -> Vector3 { Vector3::zero() }
    #[inline(always)]
    fn vvder(&self, _: f64, _: f64) -> Vector3 { Vector3::zero() }
    #[inline(always)]
    fn normal(&self, _: f64, _: f64) -> Vector3 { self.normal }
}

impl BoundedSurface for Plane {
    #[inline(always)]
    fn parameter_range(&self) -> Interval2D {
        Interval2D::new(Interval1D::unbounded(), Interval1D::unbounded())
    }
}

impl Transformed for Plane {
    fn transform_by(&mut self, trans: &Transform3) {
        self.origin = trans.transform_point(self.origin);
        self.x_axis = trans.transform_unit(self.x_axis);
        self.y_axis = trans.transform_unit(self.y_axis);
        self.normal = trans.transform_unit(self.normal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lathe_base::assert_near;

    #[test]
    fn projection() {
        let p = Plane::new(Point3::new(1.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
        let uv = p.project(Point3::new(5.0, 2.0, 3.0));
        assert_near!(ParametricSurface::subs(&p, uv.x, uv.y), Point3::new(1.0, 2.0, 3.0));
        assert_near!(p.signed_distance(Point3::new(5.0, 2.0, 3.0)), 4.0);
    }
}
