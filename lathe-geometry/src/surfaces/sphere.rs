use super::*;

/// sphere with azimuth `u` in `[0, 2pi)` and latitude `v` in
/// `[-pi/2, pi/2]`, singular at both poles
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    center: Point3,
    x_axis: Vector3,
    y_axis: Vector3,
    z_axis: Vector3,
    radius: f64,
}

impl Sphere {
    /// Sphere about `center` with the default frame.
    pub fn new(center: Point3, radius: f64) -> Self {
        Self::with_frame(center, radius, Vector3::new(0.0, 0.0, 1.0))
    }

    /// Sphere with the pole axis `axis`.
    pub fn with_frame(center: Point3, radius: f64, axis: Vector3) -> Self {
        let z_axis = axis.normalize();
        let x_axis = orthogonal(z_axis);
        let y_axis = z_axis.cross(x_axis);
        Self { center, x_axis, y_axis, z_axis, radius }
    }

    /// center of the sphere
    #[inline(always)]
    pub const fn center(&self) -> Point3 { self.center }

    /// radius of the sphere
    #[inline(always)]
    pub const fn radius(&self) -> f64 { self.radius }

    /// unit pole axis
    #[inline(always)]
    pub const fn axis(&self) -> Vector3 { self.z_axis }

    /// whether `other` is the same sphere within `tol`
    pub fn is_same(&self, other: &Self, tol: f64) -> bool {
        near_equal(self.radius, other.radius, tol, false)
            && self.center.distance(other.center) <= tol
    }

    /// the closed-form inverse with pole and seam disambiguation
    pub fn inverse(&self, pos: Point3, guess: Option<Point2>) -> Point2 {
        let diff = pos - self.center;
        let (dx, dy, dz) = (
            diff.dot(self.x_axis),
            diff.dot(self.y_axis),
            diff.dot(self.z_axis),
        );
        let radial = f64::sqrt(dx * dx + dy * dy);
        let v = safe_atan2(dz, radial);
        let mut u = safe_atan2(dy, dx);
        if u < 0.0 {
            u += 2.0 * PI;
        }
        if let Some(guess) = guess {
            if radial.so_small() {
                // at a pole every azimuth matches; keep the guess
                u = guess.x;
            } else if near_equal(guess.x, 2.0 * PI, TOLERANCE, false) && u < PI {
                u = 2.0 * PI;
            } else if guess.x.so_small() && near_equal(u, 2.0 * PI, TOLERANCE, false) {
                u = 0.0;
            }
        }
        Point2::new(u, v)
    }
}

impl ParametricSurface for Sphere {
    #[inline]
    fn subs(&self, u: f64, v: f64) -> Point3 {
        let ((su, cu), (sv, cv)) = (u.sin_cos(), v.sin_cos());
        self.center + ((self.x_axis * cu + self.y_axis * su) * cv + self.z_axis * sv) * self.radius
    }
    #[inline]
    fn uder(&self, u: f64, v: f64) -> Vector3 {
        let ((su, cu), (_, cv)) = (u.sin_cos(), v.sin_cos());
        (self.y_axis * cu - self.x_axis * su) * (cv * self.radius)
    }
    #[inline]
    fn vder(&self, u: f64, v: f64) -> Vector3 {
        let ((su, cu), (sv, cv)) = (u.sin_cos(), v.sin_cos());
        ((self.x_axis * cu + self.y_axis * su) * -sv + self.z_axis * cv) * self.radius
    }
    #[inline]
    fn uuder(&self, u: f64, v: f64) -> Vector3 {
        let ((su, cu), (_, cv)) = (u.sin_cos(), v.sin_cos());
        (self.x_axis * cu + self.y_axis * su) * (-cv * self.radius)
    }
    #[inline]
    fn uvder(&self, u: f64, v: f64) -> Vector3 {
        let ((su, cu), (sv, _)) = (u.sin_cos(), v.sin_cos());
        (self.y_axis * cu - self.x_axis * su) * (-sv * self.radius)
    }
    #[inline]
    fn vvder(&self, u: f64, v: f64) -> Vector3 {
        let ((su, cu), (sv, cv)) = (u.sin_cos(), v.sin_cos());
        ((self.x_axis * cu + self.y_axis * su) * cv + self.z_axis * sv) * -self.radius
    }
    #[inline]
    fn normal(&self, u: f64, v: f64) -> Vector3 {
        let ((su, cu), (sv, cv)) = (u.sin_cos(), v.sin_cos());
        (self.x_axis * cu + self.y_axis * su) * cv + self.z_axis * sv
    }
}

impl BoundedSurface for Sphere {
    #[inline(always)]
    fn parameter_range(&self) -> Interval2D {
        Interval2D::new(
            Interval1D::new(0.0, 2.0 * PI),
            Interval1D::new(-PI / 2.0, PI / 2.0),
        )
    }
}

impl Transformed for Sphere {
    fn transform_by(&mut self, trans: &Transform3) {
        self.center = trans.transform_point(self.center);
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
        let s = Sphere::new(Point3::new(1.0, -1.0, 2.0), 2.5);
        for i in 0..8 {
            for j in -3..=3 {
                let (u, v) = (i as f64 * PI / 4.0, j as f64 * PI / 8.0);
                let uv = s.inverse(s.subs(u, v), None);
                assert_near!(s.subs(uv.x, uv.y), s.subs(u, v));
            }
        }
    }

    #[test]
    fn pole_uses_guess() {
        let s = Sphere::new(Point3::new(0.0, 0.0, 0.0), 1.0);
        let north = Point3::new(0.0, 0.0, 1.0);
        let uv = s.inverse(north, Some(Point2::new(1.25, PI / 2.0)));
        assert_near!(uv.x, 1.25);
        assert_near!(uv.y, PI / 2.0);
    }

    #[test]
    fn derivatives_match_finite_difference() {
        let s = Sphere::new(Point3::new(0.0, 0.0, 0.0), 2.0);
        let (u, v) = (0.8, 0.3);
        let h = 1.0e-6;
        let fd_u = (s.subs(u + h, v) - s.subs(u - h, v)) / (2.0 * h);
        let fd_v = (s.subs(u, v + h) - s.subs(u, v - h)) / (2.0 * h);
        assert!((s.uder(u, v) - fd_u).magnitude() < 1.0e-5);
        assert!((s.vder(u, v) - fd_v).magnitude() < 1.0e-5);
        let fd_uv = (s.uder(u, v + h) - s.uder(u, v - h)) / (2.0 * h);
        assert!((s.uvder(u, v) - fd_uv).magnitude() < 1.0e-5);
    }
}
