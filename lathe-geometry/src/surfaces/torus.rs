use super::*;

/// the four shapes a torus can take as the radii ratio changes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TorusKind {
    /// minor < major: the ordinary doubly closed donut
    Donut,
    /// minor > major, outer branch through the axis
    Apple,
    /// minor > major, inner branch
    Lemon,
    /// minor == major: pinched at a single axis point
    Pinched,
}

/// torus
/// `p(u, v) = center + (R + r cos(v)) * (cos(u) x + sin(u) y) + r sin(v) z`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Torus {
    center: Point3,
    x_axis: Vector3,
    y_axis: Vector3,
    z_axis: Vector3,
    minor_radius: f64,
    major_radius: f64,
    kind: TorusKind,
}

impl Torus {
    /// Torus about the axis through `center`. The kind follows from the
    /// radii unless the degenerate apple/lemon choice matters.
    pub fn new(center: Point3, axis: Vector3, minor_radius: f64, major_radius: f64) -> Self {
        let kind = match () {
            _ if minor_radius < major_radius - TOLERANCE => TorusKind::Donut,
            _ if near_equal(minor_radius, major_radius, TOLERANCE, false) => TorusKind::Pinched,
            _ => TorusKind::Apple,
        };
        Self::with_kind(center, axis, minor_radius, major_radius, kind)
    }

    /// Torus with an explicit kind.
    pub fn with_kind(
        center: Point3,
        axis: Vector3,
        minor_radius: f64,
        major_radius: f64,
        kind: TorusKind,
    ) -> Self {
        let z_axis = axis.normalize();
        let x_axis = orthogonal(z_axis);
        let y_axis = z_axis.cross(x_axis);
        Self {
            center,
            x_axis,
            y_axis,
            z_axis,
            minor_radius,
            major_radius,
            kind,
        }
    }

    /// center of the torus
    #[inline(always)]
    pub const fn center(&self) -> Point3 { self.center }

    /// unit axis
    #[inline(always)]
    pub const fn axis(&self) -> Vector3 { self.z_axis }

    /// unit x axis, the direction of `subs(0, 0)` from the center
    #[inline(always)]
    pub const fn x_axis(&self) -> Vector3 { self.x_axis }

    /// minor (tube) radius
    #[inline(always)]
    pub const fn minor_radius(&self) -> f64 { self.minor_radius }

    /// major (ring) radius
    #[inline(always)]
    pub const fn major_radius(&self) -> f64 { self.major_radius }

    /// the shape kind
    #[inline(always)]
    pub const fn kind(&self) -> TorusKind { self.kind }

    /// whether the v direction closes on itself
    #[inline(always)]
    pub fn closed_v(&self) -> bool { self.kind == TorusKind::Donut }

    /// the angle of the Villarceau circles, `asin(r / R)`
    #[inline]
    pub fn villarceau_angle(&self) -> f64 {
        f64::asin(self.minor_radius / self.major_radius)
    }

    /// whether `other` is the same torus within `tol`
    pub fn is_same(&self, other: &Self, tol: f64) -> bool {
        near_equal(self.minor_radius, other.minor_radius, tol, false)
            && near_equal(self.major_radius, other.major_radius, tol, false)
            && self.center.distance(other.center) <= tol
            && near_equal(f64::abs(self.z_axis.dot(other.z_axis)), 1.0, tol, false)
    }

    /// the closed-form inverse with seam disambiguation
    pub fn inverse(&self, pos: Point3, guess: Option<Point2>) -> Point2 {
        let diff = pos - self.center;
        let (dx, dy, dz) = (
            diff.dot(self.x_axis),
            diff.dot(self.y_axis),
            diff.dot(self.z_axis),
        );
        let radial = f64::sqrt(dx * dx + dy * dy);
        let mut u = safe_atan2(dy, dx);
        if u < 0.0 {
            u += 2.0 * PI;
        }
        let mut v = safe_atan2(dz, radial - self.major_radius);
        if v < 0.0 {
            v += 2.0 * PI;
        }
        let vdomain = self.parameter_range().v;
        while v > vdomain.max + TOLERANCE {
            v -= 2.0 * PI;
        }
        while v < vdomain.min - TOLERANCE {
            v += 2.0 * PI;
        }
        if let Some(guess) = guess {
            if radial.so_small() {
                u = guess.x;
            } else if near_equal(guess.x, 2.0 * PI, TOLERANCE, false) && u < PI {
                u = 2.0 * PI;
            } else if guess.x.so_small() && near_equal(u, 2.0 * PI, TOLERANCE, false) {
                u = 0.0;
            }
            if self.closed_v() {
                if near_equal(guess.y, 2.0 * PI, TOLERANCE, false) && v < PI {
                    v = 2.0 * PI;
                } else if guess.y.so_small() && near_equal(v, 2.0 * PI, TOLERANCE, false) {
                    v = 0.0;
                }
            }
        }
        Point2::new(u, v)
    }
}

impl ParametricSurface for Torus {
    #[inline]
    fn subs(&self, u: f64, v: f64) -> Point3 {
        let ((su, cu), (sv, cv)) = (u.sin_cos(), v.sin_cos());
        let ring = self.major_radius + self.minor_radius * cv;
        self.center
            + (self.x_axis * cu + self.y_axis * su) * ring
            + self.z_axis * (self.minor_radius * sv)
    }
    #[inline]
    fn uder(&self, u: f64, v: f64) -> Vector3 {
        let ((su, cu), (_, cv)) = (u.sin_cos(), v.sin_cos());
        let ring = self.major_radius + self.minor_radius * cv;
        (self.y_axis * cu - self.x_axis * su) * ring
    }
    #[inline]
    fn vder(&self, u: f64, v: f64) -> Vector3 {
        let ((su, cu), (sv, cv)) = (u.sin_cos(), v.sin_cos());
        ((self.x_axis * cu + self.y_axis * su) * -sv + self.z_axis * cv) * self.minor_radius
    }
    #[inline]
    fn uuder(&self, u: f64, v: f64) -> Vector3 {
        let ((su, cu), (_, cv)) = (u.sin_cos(), v.sin_cos());
        let ring = self.major_radius + self.minor_radius * cv;
        (self.x_axis * cu + self.y_axis * su) * -ring
    }
    #[inline]
    fn uvder(&self, u: f64, v: f64) -> Vector3 {
        let ((su, cu), (sv, _)) = (u.sin_cos(), v.sin_cos());
        (self.y_axis * cu - self.x_axis * su) * (-self.minor_radius * sv)
    }
    #[inline]
    fn vvder(&self, u: f64, v: f64) -> Vector3 {
        let ((su, cu), (sv, cv)) = (u.sin_cos(), v.sin_cos());
        ((self.x_axis * cu + self.y_axis * su) * cv + self.z_axis * sv) * -self.minor_radius
    }
    #[inline]
    fn normal(&self, u: f64, v: f64) -> Vector3 {
        let ((su, cu), (sv, cv)) = (u.sin_cos(), v.sin_cos());
        (self.x_axis * cu + self.y_axis * su) * cv + self.z_axis * sv
    }
}

impl BoundedSurface for Torus {
    fn parameter_range(&self) -> Interval2D {
        let u = Interval1D::new(0.0, 2.0 * PI);
        let v = match self.kind {
            TorusKind::Donut => Interval1D::new(0.0, 2.0 * PI),
            TorusKind::Pinched => Interval1D::new(-PI, PI),
            // the tube crosses the axis where R + r cos(v) = 0
            TorusKind::Apple => {
                let vc = PI - f64::acos(f64::min(self.major_radius / self.minor_radius, 1.0));
                Interval1D::new(-vc, vc)
            }
            TorusKind::Lemon => {
                let vc = f64::acos(f64::max(-self.major_radius / self.minor_radius, -1.0));
                Interval1D::new(vc, 2.0 * PI - vc)
            }
        };
        Interval2D::new(u, v)
    }
}

impl Transformed for Torus {
    fn transform_by(&mut self, trans: &Transform3) {
        self.center = trans.transform_point(self.center);
        self.x_axis = trans.transform_unit(self.x_axis);
        self.y_axis = trans.transform_unit(self.y_axis);
        self.z_axis = trans.transform_unit(self.z_axis);
        self.minor_radius *= trans.scale_factor();
        self.major_radius *= trans.scale_factor();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lathe_base::assert_near;

    fn donut() -> Torus {
        Torus::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0), 1.0, 3.0)
    }

    #[test]
    fn evaluate_inverse_round_trip() {
        let t = donut();
        assert_eq!(t.kind(), TorusKind::Donut);
        for i in 0..8 {
            for j in 0..8 {
                let (u, v) = (i as f64 * PI / 4.0, j as f64 * PI / 4.0);
                let uv = t.inverse(t.subs(u, v), None);
                assert_near!(t.subs(uv.x, uv.y), t.subs(u, v));
            }
        }
    }

    #[test]
    fn outermost_point() {
        let t = donut();
        assert_near!(t.subs(0.0, 0.0), Point3::new(4.0, 0.0, 0.0));
        assert_near!(t.normal(0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
        // innermost equator point
        assert_near!(t.subs(0.0, PI), Point3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn apple_has_bounded_v() {
        let apple = Torus::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0), 2.0, 1.0);
        assert_eq!(apple.kind(), TorusKind::Apple);
        assert!(!apple.closed_v());
        let vd = apple.parameter_range().v;
        // at the v bound the surface touches the axis
        let p = apple.subs(0.0, vd.max);
        assert!(f64::sqrt(p.x * p.x + p.y * p.y).so_small());
    }

    #[test]
    fn derivatives_match_finite_difference() {
        let t = donut();
        let (u, v) = (0.7, 1.9);
        let h = 1.0e-6;
        let fd_u = (t.subs(u + h, v) - t.subs(u - h, v)) / (2.0 * h);
        let fd_v = (t.subs(u, v + h) - t.subs(u, v - h)) / (2.0 * h);
        assert!((t.uder(u, v) - fd_u).magnitude() < 1.0e-5);
        assert!((t.vder(u, v) - fd_v).magnitude() < 1.0e-5);
    }
}
