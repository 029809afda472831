use super::*;

/// infinite or bounded straight line `p(t) = origin + t * direction`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Line {
    origin: Point3,
    direction: Vector3,
    domain: Interval1D,
}

impl Line {
    /// Line through `origin` along the unit vector of `direction`, with an
    /// unbounded domain.
    #[inline]
    pub fn new(origin: Point3, direction: Vector3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
            domain: Interval1D::unbounded(),
        }
    }

    /// Bounded line from `start` to `end`; the parameter is arc length.
    #[inline]
    pub fn from_points(start: Point3, end: Point3) -> Self {
        let dir = end - start;
        Self {
            origin: start,
            direction: dir.normalize(),
            domain: Interval1D::new(0.0, dir.magnitude()),
        }
    }

    /// origin of the line
    #[inline(always)]
    pub const fn origin(&self) -> Point3 { self.origin }

    /// unit direction of the line
    #[inline(always)]
    pub const fn direction(&self) -> Vector3 { self.direction }

    /// restricts the parameter domain
    #[inline(always)]
    pub fn set_domain(&mut self, domain: Interval1D) { self.domain = domain; }

    /// the parameter domain
    #[inline(always)]
    pub const fn domain(&self) -> Interval1D { self.domain }

    /// The parameter of the orthogonal projection of `pos`, clamped into
    /// the domain.
    #[inline]
    pub fn project(&self, pos: Point3) -> f64 {
        self.domain.clamp((pos - self.origin).dot(self.direction))
    }

    /// whether `other` traces the same line within `tol`
    pub fn is_same(&self, other: &Self, tol: f64) -> bool {
        near_equal(f64::abs(self.direction.dot(other.direction)), 1.0, tol, false)
            && (other.origin - self.origin).cross(self.direction).magnitude() <= tol
    }
}

impl ParametricCurve for Line {
    #[inline(always)]
    fn subs(&self, t: f64) -> Point3 { self.origin + self.direction * t }
    #[inline(always)]
    fn der(&self, _: f64) -> Vector3 { self.direction }
    #[inline(always)]
    fn der2(&self, _: f64) -> Vector3 { Vector3::zero() }
}

impl BoundedCurve for Line {
    #[inline(always)]
    fn parameter_range(&self) -> Interval1D { self.domain }
}

impl SearchNearestParameter for Line {
    type Parameter = f64;
    #[inline]
    fn search_nearest_parameter(&self, point: Point3, _: Option<f64>, _: usize) -> Option<f64> {
        Some(self.project(point))
    }
}

impl Transformed for Line {
    fn transform_by(&mut self, trans: &Transform3) {
        self.origin = trans.transform_point(self.origin);
        self.direction = trans.transform_unit(self.direction);
        if self.domain.is_bounded() {
            self.domain = Interval1D::new(
                self.domain.min * trans.scale_factor(),
                self.domain.max * trans.scale_factor(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lathe_base::assert_near;

    #[test]
    fn projection_round_trip() {
        let line = Line::from_points(Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 4.0, 0.0));
        assert_near!(line.subs(2.0), Point3::new(1.0, 2.0, 0.0));
        let t = line.project(Point3::new(5.0, 3.0, 7.0));
        assert_near!(t, 3.0);
        assert_near!(line.project(Point3::new(0.0, -10.0, 0.0)), 0.0);
    }

    #[test]
    fn same_lines() {
        let a = Line::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
        let b = Line::new(Point3::new(5.0, 0.0, 0.0), Vector3::new(-1.0, 0.0, 0.0));
        let c = Line::new(Point3::new(0.0, 1.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
        assert!(a.is_same(&b, 1.0e-6));
        assert!(!a.is_same(&c, 1.0e-6));
    }
}
