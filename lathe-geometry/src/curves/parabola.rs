use super::*;

/// parabola `p(t) = center + t * x_axis + a * t^2 * y_axis`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parabola {
    center: Point3,
    x_axis: Vector3,
    y_axis: Vector3,
    normal: Vector3,
    a: f64,
}

impl Parabola {
    /// Parabola `y = a * x^2` in the local frame.
    pub fn new(center: Point3, normal: Vector3, x_axis: Vector3, a: f64) -> Self {
        let normal = normal.normalize();
        let x_axis = (x_axis - normal * x_axis.dot(normal)).normalize();
        let y_axis = normal.cross(x_axis);
        Self { center, x_axis, y_axis, normal, a }
    }

    /// vertex of the parabola
    #[inline(always)]
    pub const fn center(&self) -> Point3 { self.center }

    /// the coefficient of `y = a * x^2`
    #[inline(always)]
    pub const fn coefficient(&self) -> f64 { self.a }

    /// unit normal of the parabola plane
    #[inline(always)]
    pub const fn normal(&self) -> Vector3 { self.normal }

    /// unit x axis
    #[inline(always)]
    pub const fn x_axis(&self) -> Vector3 { self.x_axis }

    /// unit y axis
    #[inline(always)]
    pub const fn y_axis(&self) -> Vector3 { self.y_axis }

    /// whether `other` traces the same parabola within `tol`
    pub fn is_same(&self, other: &Self, tol: f64) -> bool {
        near_equal(self.a, other.a, tol, false)
            && self.center.distance(other.center) <= tol
            && near_equal(f64::abs(self.normal.dot(other.normal)), 1.0, tol, false)
            && near_equal(self.x_axis.dot(other.x_axis), 1.0, tol, false)
    }
}

impl ParametricCurve for Parabola {
    #[inline]
    fn subs(&self, t: f64) -> Point3 {
        self.center + self.x_axis * t + self.y_axis * (self.a * t * t)
    }
    #[inline]
    fn der(&self, t: f64) -> Vector3 { self.x_axis + self.y_axis * (2.0 * self.a * t) }
    #[inline]
    fn der2(&self, _: f64) -> Vector3 { self.y_axis * (2.0 * self.a) }
}

impl BoundedCurve for Parabola {
    #[inline(always)]
    fn parameter_range(&self) -> Interval1D { Interval1D::unbounded() }
}

impl SearchNearestParameter for Parabola {
    type Parameter = f64;
    fn search_nearest_parameter(&self, point: Point3, _: Option<f64>, _: usize) -> Option<f64> {
        let diff = point - self.center;
        let (x, y) = (diff.dot(self.x_axis), diff.dot(self.y_axis));
        // the closest point condition reduces to the cubic
        // 2 a^2 t^3 + (1 - 2 a y) t - x = 0
        let roots = solvers::solve_cubic(2.0 * self.a * self.a, 0.0, 1.0 - 2.0 * self.a * y, -x);
        let in_plane = Point3::new(x, y, 0.0);
        roots.into_iter().min_by(|&s, &t| {
            let ps = Point3::new(s, self.a * s * s, 0.0);
            let pt = Point3::new(t, self.a * t * t, 0.0);
            ps.distance2(in_plane).partial_cmp(&pt.distance2(in_plane)).unwrap()
        })
    }
}

impl Transformed for Parabola {
    fn transform_by(&mut self, trans: &Transform3) {
        self.center = trans.transform_point(self.center);
        self.x_axis = trans.transform_unit(self.x_axis);
        self.y_axis = trans.transform_unit(self.y_axis);
        self.normal = trans.transform_unit(self.normal);
        // y = a x^2 scales to y' = (a / s) x'^2
        self.a /= trans.scale_factor();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lathe_base::assert_near;

    fn sample() -> Parabola {
        Parabola::new(
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(1.0, 0.0, 0.0),
            0.5,
        )
    }

    #[test]
    fn invert_on_curve() {
        let p = sample();
        for i in -4..=4 {
            let t = i as f64 * 0.5;
            let found = p.search_nearest_parameter(p.subs(t), None, 0).unwrap();
            assert_near!(found, t);
        }
    }

    #[test]
    fn nearest_above_vertex() {
        let p = sample();
        // directly above the vertex the nearest point is the vertex while
        // the point is below the evolute center
        let t = p.search_nearest_parameter(Point3::new(0.0, 0.5, 0.0), None, 0).unwrap();
        assert_near!(t, 0.0);
    }
}
