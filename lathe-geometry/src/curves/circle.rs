use super::*;

/// circle `p(u) = center + radius * (cos(u) * x_axis + sin(u) * y_axis)`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    center: Point3,
    x_axis: Vector3,
    y_axis: Vector3,
    normal: Vector3,
    radius: f64,
}

impl Circle {
    /// Circle about `normal` with the given radius. The x axis is an
    /// arbitrary unit vector orthogonal to the normal unless given.
    pub fn new(center: Point3, normal: Vector3, radius: f64, x_axis: Option<Vector3>) -> Self {
        let normal = normal.normalize();
        let x_axis = match x_axis {
            Some(x) => (x - normal * x.dot(normal)).normalize(),
            None => orthogonal(normal),
        };
        let y_axis = normal.cross(x_axis);
        Self { center, x_axis, y_axis, normal, radius }
    }

    /// center of the circle
    #[inline(always)]
    pub const fn center(&self) -> Point3 { self.center }

    /// radius of the circle
    #[inline(always)]
    pub const fn radius(&self) -> f64 { self.radius }

    /// unit normal of the circle plane
    #[inline(always)]
    pub const fn normal(&self) -> Vector3 { self.normal }

    /// unit x axis, the direction of `subs(0.0)`
    #[inline(always)]
    pub const fn x_axis(&self) -> Vector3 { self.x_axis }

    /// unit y axis
    #[inline(always)]
    pub const fn y_axis(&self) -> Vector3 { self.y_axis }

    /// whether `other` traces the same circle within `tol`
    pub fn is_same(&self, other: &Self, tol: f64) -> bool {
        near_equal(self.radius, other.radius, tol, false)
            && self.center.distance(other.center) <= tol
            && near_equal(f64::abs(self.normal.dot(other.normal)), 1.0, tol, false)
    }
}

impl ParametricCurve for Circle {
    #[inline]
    fn subs(&self, t: f64) -> Point3 {
        let (s, c) = t.sin_cos();
        self.center + (self.x_axis * c + self.y_axis * s) * self.radius
    }
    #[inline]
    fn der(&self, t: f64) -> Vector3 {
        let (s, c) = t.sin_cos();
        (self.y_axis * c - self.x_axis * s) * self.radius
    }
    #[inline]
    fn der2(&self, t: f64) -> Vector3 {
        let (s, c) = t.sin_cos();
        (self.x_axis * c + self.y_axis * s) * -self.radius
    }
}

impl BoundedCurve for Circle {
    #[inline(always)]
    fn parameter_range(&self) -> Interval1D { Interval1D::new(0.0, 2.0 * PI) }
}

impl SearchNearestParameter for Circle {
    type Parameter = f64;
    fn search_nearest_parameter(&self, point: Point3, hint: Option<f64>, _: usize) -> Option<f64> {
        let diff = point - self.center;
        let (x, y) = (diff.dot(self.x_axis), diff.dot(self.y_axis));
        let mut u = safe_atan2(y, x);
        if u < 0.0 {
            u += 2.0 * PI;
        }
        // points on the axis have no preferred angle; follow the hint
        if x.so_small() && y.so_small() {
            return Some(hint.unwrap_or(0.0));
        }
        // near the seam, the hint chooses the side
        if let Some(guess) = hint {
            if u.so_small() && near_equal(guess, 2.0 * PI, TOLERANCE, false) {
                u = 2.0 * PI;
            } else if near_equal(u, 2.0 * PI, TOLERANCE, false) && guess.so_small() {
                u = 0.0;
            }
        }
        Some(u)
    }
}

impl Transformed for Circle {
    fn transform_by(&mut self, trans: &Transform3) {
        self.center = trans.transform_point(self.center);
        self.x_axis = trans.transform_unit(self.x_axis);
        self.y_axis = trans.transform_unit(self.y_axis);
        self.normal = trans.transform_unit(self.normal);
        self.radius *= trans.scale_factor();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lathe_base::assert_near;

    #[test]
    fn evaluate_and_invert() {
        let c = Circle::new(Point3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0), 2.0, None);
        for i in 0..8 {
            let t = i as f64 * PI / 4.0;
            let p = c.subs(t);
            assert_near!(p.distance(c.center()), 2.0);
            let u = c.search_nearest_parameter(p, None, 0).unwrap();
            assert_near!(u, t);
        }
    }

    #[test]
    fn seam_guess() {
        let c = Circle::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0), 1.0, None);
        let p = c.subs(0.0);
        let u = c.search_nearest_parameter(p, Some(2.0 * PI), 0).unwrap();
        assert_near!(u, 2.0 * PI);
        let u = c.search_nearest_parameter(p, None, 0).unwrap();
        assert_near!(u, 0.0);
    }
}
