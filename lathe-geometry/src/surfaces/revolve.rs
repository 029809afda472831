use super::*;
use crate::curves::Curve;

/// surface of revolution of a generator curve about an axis;
/// `u` is the angle in `[0, 2pi)`, `v` the generator curve parameter
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Revolve {
    origin: Point3,
    x_axis: Vector3,
    y_axis: Vector3,
    z_axis: Vector3,
    curve: Box<Curve>,
}

impl Revolve {
    /// Revolves `curve` about the axis through `origin` along `axis`. The
    /// x axis is chosen so the curve start lies in the xz half-plane.
    pub fn new(origin: Point3, axis: Vector3, curve: Curve) -> Self {
        let z_axis = axis.normalize();
        let start = curve.front();
        let radial = start - origin;
        let radial = radial - z_axis * radial.dot(z_axis);
        let x_axis = match radial.magnitude().so_small() {
            true => orthogonal(z_axis),
            false => radial.normalize(),
        };
        let y_axis = z_axis.cross(x_axis);
        Self {
            origin,
            x_axis,
            y_axis,
            z_axis,
            curve: Box::new(curve),
        }
    }

    /// origin on the axis
    #[inline(always)]
    pub const fn origin(&self) -> Point3 { self.origin }

    /// unit axis of revolution
    #[inline(always)]
    pub const fn axis(&self) -> Vector3 { self.z_axis }

    /// the generator curve
    #[inline(always)]
    pub fn curve(&self) -> &Curve { &self.curve }

    /// local frame coordinates of a space point
    fn local(&self, pos: Point3) -> Vector3 {
        let diff = pos - self.origin;
        Vector3::new(
            diff.dot(self.x_axis),
            diff.dot(self.y_axis),
            diff.dot(self.z_axis),
        )
    }

    /// rotates the local coordinates of a curve point by `u` into space
    fn place(&self, q: Vector3, u: f64) -> Vector3 {
        let (s, c) = u.sin_cos();
        self.x_axis * (q.x * c - q.y * s) + self.y_axis * (q.x * s + q.y * c) + self.z_axis * q.z
    }

    /// whether the generator closes, closing the v direction
    #[inline]
    pub fn closed_v(&self) -> bool { self.curve.is_closed() }

    /// whether the generator touches the axis at `v`
    pub fn on_axis(&self, v: f64, tol: f64) -> bool {
        let q = self.local(self.curve.subs(v));
        f64::sqrt(q.x * q.x + q.y * q.y) <= tol
    }

    /// the inverse: the angle from the xy projection, then the generator
    /// inverse of the de-rotated point, polished by a second pass
    pub fn inverse(&self, pos: Point3, guess: Option<Point2>) -> Point2 {
        let q = self.local(pos);
        let mut u = safe_atan2(q.y, q.x);
        if u < 0.0 {
            u += 2.0 * PI;
        }
        if q.x.so_small() && q.y.so_small() {
            u = guess.map(|g| g.x).unwrap_or(0.0);
        }
        let (s, c) = u.sin_cos();
        let derotated = Vector3::new(q.x * c + q.y * s, -q.x * s + q.y * c, q.z);
        let local_pos = self.origin
            + self.x_axis * derotated.x
            + self.y_axis * derotated.y
            + self.z_axis * derotated.z;
        let (v, _) = self.curve.inverse(local_pos, guess.map(|g| g.y));
        if let Some(guess) = guess {
            if near_equal(guess.x, 2.0 * PI, TOLERANCE, false) && u < PI {
                u += 2.0 * PI;
            }
        }
        Point2::new(u, v)
    }
}

impl ParametricSurface for Revolve {
    fn subs(&self, u: f64, v: f64) -> Point3 {
        let q = self.local(self.curve.subs(v));
        self.origin + self.place(q, u)
    }
    fn uder(&self, u: f64, v: f64) -> Vector3 {
        let q = self.local(self.curve.subs(v));
        let (s, c) = u.sin_cos();
        self.x_axis * (-q.x * s - q.y * c) + self.y_axis * (q.x * c - q.y * s)
    }
    fn vder(&self, u: f64, v: f64) -> Vector3 {
        let d = self.curve.der(v);
        let q = Vector3::new(d.dot(self.x_axis), d.dot(self.y_axis), d.dot(self.z_axis));
        self.place(q, u)
    }
    fn uuder(&self, u: f64, v: f64) -> Vector3 {
        let q = self.local(self.curve.subs(v));
        let (s, c) = u.sin_cos();
        self.x_axis * (-q.x * c + q.y * s) + self.y_axis * (-q.x * s - q.y * c)
    }
    fn uvder(&self, u: f64, v: f64) -> Vector3 {
        let d = self.curve.der(v);
        let q = Vector3::new(d.dot(self.x_axis), d.dot(self.y_axis), d.dot(self.z_axis));
        let (s, c) = u.sin_cos();
        self.x_axis * (-q.x * s - q.y * c) + self.y_axis * (q.x * c - q.y * s)
    }
    fn vvder(&self, u: f64, v: f64) -> Vector3 {
        let d = self.curve.der2(v);
        let q = Vector3::new(d.dot(self.x_axis), d.dot(self.y_axis), d.dot(self.z_axis));
        self.place(q, u)
    }
}

impl BoundedSurface for Revolve {
    fn parameter_range(&self) -> Interval2D {
        Interval2D::new(Interval1D::new(0.0, 2.0 * PI), self.curve.domain())
    }
}

impl Transformed for Revolve {
    fn transform_by(&mut self, trans: &Transform3) {
        self.origin = trans.transform_point(self.origin);
        self.x_axis = trans.transform_unit(self.x_axis);
        self.y_axis = trans.transform_unit(self.y_axis);
        self.z_axis = trans.transform_unit(self.z_axis);
        self.curve.transform_by(trans);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::Line;
    use lathe_base::assert_near;

    /// revolving a vertical line at distance 2 gives a cylinder of radius 2
    fn cylinder_by_revolve() -> Revolve {
        let line = Line::from_points(Point3::new(2.0, 0.0, 0.0), Point3::new(2.0, 0.0, 3.0));
        Revolve::new(
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            line.into(),
        )
    }

    #[test]
    fn traces_cylinder() {
        let rev = cylinder_by_revolve();
        for i in 0..8 {
            let u = i as f64 * PI / 4.0;
            let p = rev.subs(u, 1.5);
            assert_near!(f64::sqrt(p.x * p.x + p.y * p.y), 2.0);
            assert_near!(p.z, 1.5);
        }
    }

    #[test]
    fn inverse_round_trip() {
        let rev = cylinder_by_revolve();
        let (u, v) = (1.2, 0.7);
        let uv = rev.inverse(rev.subs(u, v), None);
        assert_near!(uv.x, u);
        assert_near!(uv.y, v);
    }

    #[test]
    fn derivatives_match_finite_difference() {
        let rev = cylinder_by_revolve();
        let (u, v) = (0.9, 1.1);
        let h = 1.0e-6;
        let fd_u = (rev.subs(u + h, v) - rev.subs(u - h, v)) / (2.0 * h);
        let fd_v = (rev.subs(u, v + h) - rev.subs(u, v - h)) / (2.0 * h);
        assert!((rev.uder(u, v) - fd_u).magnitude() < 1.0e-5);
        assert!((rev.vder(u, v) - fd_v).magnitude() < 1.0e-5);
    }
}
