use super::*;

/// right circular cylinder
/// `p(u, v) = origin + radius * (cos(u) * x_axis + sin(u) * y_axis + v * z_axis)`
///
/// The v parameter is scaled by the radius, so one v unit equals one radius
/// of height.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cylinder {
    origin: Point3,
    x_axis: Vector3,
    y_axis: Vector3,
    z_axis: Vector3,
    radius: f64,
}

impl Cylinder {
    /// Cylinder about the axis through `origin` along `axis`.
    pub fn new(origin: Point3, axis: Vector3, radius: f64, x_axis: Option<Vector3>) -> Self {
        let z_axis = axis.normalize();
        let x_axis = match x_axis {
            Some(x) => (x - z_axis * x.dot(z_axis)).normalize(),
            None => orthogonal(z_axis),
        };
        let y_axis = z_axis.cross(x_axis);
        Self { origin, x_axis, y_axis, z_axis, radius }
    }

    /// Cylinder with the origin midway between `bottom` and `top`.
    pub fn from_ends(bottom: Point3, top: Point3, radius: f64) -> Self {
        Self::new(bottom.midpoint(top), top - bottom, radius, None)
    }

    /// origin on the axis
    #[inline(always)]
    pub const fn origin(&self) -> Point3 { self.origin }

    /// unit axis
    #[inline(always)]
    pub const fn axis(&self) -> Vector3 { self.z_axis }

    /// unit x axis, the direction of the seam
    #[inline(always)]
    pub const fn x_axis(&self) -> Vector3 { self.x_axis }

    /// radius
    #[inline(always)]
    pub const fn radius(&self) -> f64 { self.radius }

    /// the v parameter of `pos` projected onto the axis
    #[inline]
    pub fn height_param(&self, pos: Point3) -> f64 {
        (pos - self.origin).dot(self.z_axis) / self.radius
    }

    /// whether `other` is the same cylinder within `tol`
    pub fn is_same(&self, other: &Self, tol: f64) -> bool {
        near_equal(self.radius, other.radius, tol, false)
            && near_equal(f64::abs(self.z_axis.dot(other.z_axis)), 1.0, tol, false)
            && (other.origin - self.origin).cross(self.z_axis).magnitude() <= tol
    }

    /// the closed-form inverse with seam and axis disambiguation
    pub fn inverse(&self, pos: Point3, guess: Option<Point2>) -> Point2 {
        let diff = pos - self.origin;
        let (dx, dy) = (diff.dot(self.x_axis), diff.dot(self.y_axis));
        let mut u = safe_atan2(dy, dx);
        if u < 0.0 {
            u += 2.0 * PI;
        }
        let v = diff.dot(self.z_axis) / self.radius;
        if let Some(guess) = guess {
            let udomain = Interval1D::new(0.0, 2.0 * PI);
            if udomain.on_boundary(u, TOLERANCE) {
                if near_equal(guess.x, 2.0 * PI, TOLERANCE, false) && u < PI {
                    u = 2.0 * PI;
                } else if guess.x.so_small() && u > PI {
                    u = 0.0;
                }
            } else if dx.so_small() && dy.so_small() {
                // points on the axis have no preferred angle
                u = guess.x;
            }
        }
        Point2::new(u, v)
    }
}

impl ParametricSurface for Cylinder {
    #[inline]
    fn subs(&self, u: f64, v: f64) -> Point3 {
        let (s, c) = u.sin_cos();
        self.origin + (self.x_axis * c + self.y_axis * s + self.z_axis * v) * self.radius
    }
    #[inline]
    fn uder(&self, u: f64, _: f64) -> Vector3 {
        let (s, c) = u.sin_cos();
        (self.y_axis * c - self.x_axis * s) * self.radius
    }
    #[inline]
    fn vder(&self, _: f64, _: f64) -> Vector3 { self.z_axis * self.radius }
    #[inline]
    fn uuder(&self, u: f64, _: f64) -> Vector3 {
        let (s, c) = u.sin_cos();
        (self.x_axis * c + self.y_axis * s) * -self.radius
    }
    #[inline(always)]
    fn uvder(&self, _: f64, _: f64) -> Vector3 { Vector3::zero() }
    #[inline(always)]
    fn vvder(&self, _: f64, _: f64) -> Vector3 { Vector3::zero() }
    #[inline]
    fn normal(&self, u: f64, _: f64) -> Vector3 {
        let (s, c) = u.sin_cos();
        self.x_axis * c + self.y_axis * s
    }
}

impl BoundedSurface for Cylinder {
    #[inline(always)]
    fn parameter_range(&self) -> Interval2D {
        Interval2D::new(Interval1D::new(0.0, 2.0 * PI), Interval1D::unbounded())
    }
}

impl Transformed for Cylinder {
    fn transform_by(&mut self, trans: &Transform3) {
        self.origin = trans.transform_point(self.origin);
        self.x_axis = trans.transform_unit(self.x_axis);
        self.y_axis = trans.transform_unit(self.y_axis);
        self.z_axis = trans.transform_unit(self.z_axis);
        self.radius *= trans.scale_factor();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lathe_base::assert_near;

    #[test]
    fn evaluate_inverse_round_trip() {
        let cyl = Cylinder::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0), 2.0, None);
        for i in 0..8 {
            for j in -2..=2 {
                let (u, v) = (i as f64 * PI / 4.0, j as f64 * 0.5);
                let uv = cyl.inverse(cyl.subs(u, v), None);
                assert_near!(cyl.subs(uv.x, uv.y), cyl.subs(u, v));
            }
        }
    }

    #[test]
    fn seam_guess() {
        let cyl = Cylinder::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0), 1.0, None);
        let pos = cyl.subs(0.0, 0.5);
        let uv = cyl.inverse(pos, Some(Point2::new(2.0 * PI, 0.5)));
        assert_near!(uv.x, 2.0 * PI);
    }

    #[test]
    fn normal_is_radial() {
        let cyl = Cylinder::new(Point3::new(1.0, 1.0, 0.0), Vector3::new(0.0, 0.0, 1.0), 3.0, None);
        let n = cyl.normal(0.7, 1.3);
        let expect = cyl.uder(0.7, 1.3).cross(cyl.vder(0.7, 1.3)).normalize();
        assert_near!(n, expect);
    }
}
