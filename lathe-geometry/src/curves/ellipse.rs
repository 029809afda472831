use super::*;

/// ellipse `p(u) = center + a * cos(u) * x_axis + b * sin(u) * y_axis`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ellipse {
    center: Point3,
    x_axis: Vector3,
    y_axis: Vector3,
    normal: Vector3,
    a: f64,
    b: f64,
}

impl Ellipse {
    /// Ellipse in the plane of `normal`, major direction `x_axis`,
    /// semi-axes `a` along x and `b` along y.
    pub fn new(center: Point3, normal: Vector3, x_axis: Vector3, a: f64, b: f64) -> Self {
        let normal = normal.normalize();
        let x_axis = (x_axis - normal * x_axis.dot(normal)).normalize();
        let y_axis = normal.cross(x_axis);
        Self { center, x_axis, y_axis, normal, a, b }
    }

    /// center of the ellipse
    #[inline(always)]
    pub const fn center(&self) -> Point3 { self.center }

    /// semi-axis along x
    #[inline(always)]
    pub const fn semi_major(&self) -> f64 { self.a }

    /// semi-axis along y
    #[inline(always)]
    pub const fn semi_minor(&self) -> f64 { self.b }

    /// unit normal of the ellipse plane
    #[inline(always)]
    pub const fn normal(&self) -> Vector3 { self.normal }

    /// unit x axis
    #[inline(always)]
    pub const fn x_axis(&self) -> Vector3 { self.x_axis }

    /// whether `other` traces the same ellipse within `tol`
    pub fn is_same(&self, other: &Self, tol: f64) -> bool {
        near_equal(self.a, other.a, tol, false)
            && near_equal(self.b, other.b, tol, false)
            && self.center.distance(other.center) <= tol
            && near_equal(f64::abs(self.normal.dot(other.normal)), 1.0, tol, false)
            && near_equal(f64::abs(self.x_axis.dot(other.x_axis)), 1.0, tol, false)
    }
}

impl ParametricCurve for Ellipse {
    #[inline]
    fn subs(&self, t: f64) -> Point3 {
        let (s, c) = t.sin_cos();
        self.center + self.x_axis * (self.a * c) + self.y_axis * (self.b * s)
    }
    #[inline]
    fn der(&self, t: f64) -> Vector3 {
        let (s, c) = t.sin_cos();
        self.y_axis * (self.b * c) - self.x_axis * (self.a * s)
    }
    #[inline]
    fn der2(&self, t: f64) -> Vector3 {
        let (s, c) = t.sin_cos();
        -(self.x_axis * (self.a * c) + self.y_axis * (self.b * s))
    }
}

impl BoundedCurve for Ellipse {
    #[inline(always)]
    fn parameter_range(&self) -> Interval1D { Interval1D::new(0.0, 2.0 * PI) }
}

impl SearchNearestParameter for Ellipse {
    type Parameter = f64;
    fn search_nearest_parameter(
        &self,
        point: Point3,
        hint: Option<f64>,
        trials: usize,
    ) -> Option<f64> {
        let diff = point - self.center;
        let (x, y) = (diff.dot(self.x_axis), diff.dot(self.y_axis));
        if x.so_small() && y.so_small() {
            return Some(hint.unwrap_or(0.0));
        }
        // scaling to the circle gives a solid start, then Newton on the
        // closest point condition
        let mut t = safe_atan2(y * self.a, x * self.b);
        for _ in 0..usize::max(trials, 8) {
            let (s, c) = t.sin_cos();
            let f = (self.a * self.a - self.b * self.b) * c * s - x * self.a * s + y * self.b * c;
            let fp = (self.a * self.a - self.b * self.b) * (c * c - s * s) - x * self.a * c
                - y * self.b * s;
            if fp.so_small() {
                break;
            }
            let step = f / fp;
            t -= step;
            if step.so_small2() {
                break;
            }
        }
        let mut t = t % (2.0 * PI);
        if t < 0.0 {
            t += 2.0 * PI;
        }
        if let Some(guess) = hint {
            if t.so_small() && near_equal(guess, 2.0 * PI, TOLERANCE, false) {
                t = 2.0 * PI;
            }
        }
        Some(t)
    }
}

impl Transformed for Ellipse {
    fn transform_by(&mut self, trans: &Transform3) {
        self.center = trans.transform_point(self.center);
        self.x_axis = trans.transform_unit(self.x_axis);
        self.y_axis = trans.transform_unit(self.y_axis);
        self.normal = trans.transform_unit(self.normal);
        self.a *= trans.scale_factor();
        self.b *= trans.scale_factor();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lathe_base::assert_near;

    #[test]
    fn invert_on_curve() {
        let e = Ellipse::new(
            Point3::new(0.0, 0.0, 1.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(1.0, 0.0, 0.0),
            3.0,
            1.0,
        );
        for i in 1..8 {
            let t = i as f64 * PI / 4.0;
            let u = e.search_nearest_parameter(e.subs(t), None, 16).unwrap();
            assert_near!(e.subs(u), e.subs(t));
        }
    }

    #[test]
    fn nearest_off_curve() {
        let e = Ellipse::new(
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(1.0, 0.0, 0.0),
            2.0,
            1.0,
        );
        let u = e.search_nearest_parameter(Point3::new(5.0, 0.0, 0.0), None, 16).unwrap();
        assert_near!(e.subs(u), Point3::new(2.0, 0.0, 0.0));
    }
}
