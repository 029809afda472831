use super::*;

/// right circular cone
///
/// `p(u, v) = origin + radius * ((1 - v sin(a)) * (cos(u) x + sin(u) y) + v cos(a) z)`
/// where `a` is the half angle and `radius` the radius at `v = 0`. The apex
/// sits at `v = 1 / sin(a)` and is the only parametric singularity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cone {
    origin: Point3,
    x_axis: Vector3,
    y_axis: Vector3,
    z_axis: Vector3,
    radius: f64,
    sin_half_angle: f64,
    cos_half_angle: f64,
}

impl Cone {
    /// Cone about the axis through `origin` with the given radius at the
    /// origin and half angle.
    pub fn new(origin: Point3, axis: Vector3, radius: f64, half_angle: f64) -> Self {
        let z_axis = axis.normalize();
        let x_axis = orthogonal(z_axis);
        let y_axis = z_axis.cross(x_axis);
        Self {
            origin,
            x_axis,
            y_axis,
            z_axis,
            radius,
            sin_half_angle: half_angle.sin(),
            cos_half_angle: half_angle.cos(),
        }
    }

    /// origin on the axis, where the radius is `radius`
    #[inline(always)]
    pub const fn origin(&self) -> Point3 { self.origin }

    /// unit axis, pointing from the base toward the apex
    #[inline(always)]
    pub const fn axis(&self) -> Vector3 { self.z_axis }

    /// radius at `v = 0`
    #[inline(always)]
    pub const fn radius(&self) -> f64 { self.radius }

    /// sine of the half angle
    #[inline(always)]
    pub const fn sin_half_angle(&self) -> f64 { self.sin_half_angle }

    /// cosine of the half angle
    #[inline(always)]
    pub const fn cos_half_angle(&self) -> f64 { self.cos_half_angle }

    /// the apex point
    #[inline]
    pub fn apex(&self) -> Point3 {
        self.origin + self.z_axis * (self.radius * self.cos_half_angle / self.sin_half_angle)
    }

    /// the v parameter of the apex
    #[inline(always)]
    pub fn apex_v(&self) -> f64 { 1.0 / self.sin_half_angle }

    /// radius of the cross section at `v`
    #[inline]
    pub fn radius_at(&self, v: f64) -> f64 { self.radius * (1.0 - v * self.sin_half_angle) }

    /// whether `other` is the same cone within `tol`
    pub fn is_same(&self, other: &Self, tol: f64) -> bool {
        near_equal(self.sin_half_angle, other.sin_half_angle, tol, false)
            && near_equal(self.z_axis.dot(other.z_axis), 1.0, tol, false)
            && self.apex().distance(other.apex()) <= tol
    }

    /// the closed-form inverse with apex and seam disambiguation
    pub fn inverse(&self, pos: Point3, guess: Option<Point2>) -> Point2 {
        let diff = pos - self.origin;
        let (dx, dy, dz) = (
            diff.dot(self.x_axis),
            diff.dot(self.y_axis),
            diff.dot(self.z_axis),
        );
        let mut u = safe_atan2(dy, dx);
        if u < 0.0 {
            u += 2.0 * PI;
        }
        let v = dz / (self.radius * self.cos_half_angle);
        let v = f64::min(v, self.apex_v());
        if let Some(guess) = guess {
            if dx.so_small() && dy.so_small() {
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

impl ParametricSurface for Cone {
    #[inline]
    fn subs(&self, u: f64, v: f64) -> Point3 {
        let (s, c) = u.sin_cos();
        let rho = self.radius * (1.0 - v * self.sin_half_angle);
        self.origin
            + (self.x_axis * c + self.y_axis * s) * rho
            + self.z_axis * (v * self.cos_half_angle * self.radius)
    }
    #[inline]
    fn uder(&self, u: f64, v: f64) -> Vector3 {
        let (s, c) = u.sin_cos();
        let rho = self.radius * (1.0 - v * self.sin_half_angle);
        (self.y_axis * c - self.x_axis * s) * rho
    }
    #[inline]
    fn vder(&self, u: f64, _: f64) -> Vector3 {
        let (s, c) = u.sin_cos();
        ((self.x_axis * c + self.y_axis * s) * -self.sin_half_angle
            + self.z_axis * self.cos_half_angle)
            * self.radius
    }
    #[inline]
    fn uuder(&self, u: f64, v: f64) -> Vector3 {
        let (s, c) = u.sin_cos();
        let rho = self.radius * (1.0 - v * self.sin_half_angle);
        (self.x_axis * c + self.y_axis * s) * -rho
    }
    #[inline]
    fn uvder(&self, u: f64, _: f64) -> Vector3 {
        let (s, c) = u.sin_cos();
        (self.y_axis * c - self.x_axis * s) * (-self.radius * self.sin_half_angle)
    }
    #[inline(always)]
    fn vvder(&self, _: f64, _: f64) -> Vector3 { Vector3::zero() }
    #[inline]
    fn normal(&self, u: f64, _: f64) -> Vector3 {
        let (s, c) = u.sin_cos();
        (self.x_axis * c + self.y_axis * s) * self.cos_half_angle
            + self.z_axis * self.sin_half_angle
    }
}

impl BoundedSurface for Cone {
    #[inline]
    fn parameter_range(&self) -> Interval2D {
        Interval2D::new(
            Interval1D::new(0.0, 2.0 * PI),
            Interval1D::new(-MAX_VALUE, self.apex_v()),
        )
    }
}

impl Transformed for Cone {
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

    fn sample() -> Cone {
        Cone::new(
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            1.0,
            PI / 4.0,
        )
    }

    #[test]
    fn apex_is_singular() {
        let cone = sample();
        let apex = cone.apex();
        assert_near!(apex, Point3::new(0.0, 0.0, 1.0));
        assert!(cone.uder(0.3, cone.apex_v()).magnitude().so_small());
    }

    #[test]
    fn evaluate_inverse_round_trip() {
        let cone = sample();
        for i in 0..8 {
            for j in -2..=1 {
                let (u, v) = (i as f64 * PI / 4.0, j as f64 * 0.4);
                let uv = cone.inverse(cone.subs(u, v), None);
                assert_near!(cone.subs(uv.x, uv.y), cone.subs(u, v));
            }
        }
    }

    #[test]
    fn normal_is_unit_and_outward() {
        let cone = sample();
        let n = cone.normal(0.5, 0.2);
        assert_near!(n.magnitude(), 1.0);
        let expect = cone.uder(0.5, 0.2).cross(cone.vder(0.5, 0.2)).normalize();
        assert_near!(n, expect);
    }
}
