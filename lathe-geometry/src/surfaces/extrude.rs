use super::*;
use crate::curves::Curve;

/// extrusion of a generator curve along a direction;
/// `u` runs along the extrusion direction, `v` is the curve parameter
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Extrude {
    curve: Box<Curve>,
    direction: Vector3,
}

impl Extrude {
    /// Extrudes `curve` along the unit vector of `direction`.
    pub fn new(curve: Curve, direction: Vector3) -> Self {
        Self {
            curve: Box::new(curve),
            direction: direction.normalize(),
        }
    }

    /// the generator curve
    #[inline(always)]
    pub fn curve(&self) -> &Curve { &self.curve }

    /// unit extrusion direction
    #[inline(always)]
    pub const fn direction(&self) -> Vector3 { self.direction }

    /// whether the generator closes, closing the v direction
    #[inline]
    pub fn closed_v(&self) -> bool { self.curve.is_closed() }

    /// the inverse by alternating curve inversion and axial projection
    pub fn inverse(&self, pos: Point3, guess: Option<Point2>) -> Point2 {
        let mut v = match guess {
            Some(g) => g.y,
            None => self.curve.inverse(pos, None).0,
        };
        let mut u = 0.0;
        for _ in 0..16 {
            u = (pos - self.curve.subs(v)).dot(self.direction);
            let (v_next, _) = self.curve.inverse(pos - self.direction * u, Some(v));
            if near_equal(v_next, v, TOLERANCE2, false) {
                v = v_next;
                break;
            }
            v = v_next;
        }
        Point2::new(u, v)
    }
}

impl ParametricSurface for Extrude {
    #[inline]
    fn subs(&self, u: f64, v: f64) -> Point3 { self.curve.subs(v) + self.direction * u }
    #[inline(always)]
    fn uder(&self, _: f64, _: f64) -> Vector3 { self.direction }
    #[inline]
    fn vder(&self, _: f64, v: f64) -> Vector3 { self.curve.der(v) }
    #[inline(always)]
    fn uuder(&self, _: f64, _: f64) -> Vector3 { Vector3::zero() }
    #[inline(always)]
    fn uvder(&self, _: f64, _: f64) -> Vector3 { Vector3::zero() }
    #[inline]
    fn vvder(&self, _: f64, v: f64) -> Vector3 { self.curve.der2(v) }
}

impl BoundedSurface for Extrude {
    fn parameter_range(&self) -> Interval2D {
        Interval2D::new(Interval1D::unbounded(), self.curve.domain())
    }
}

impl Transformed for Extrude {
    fn transform_by(&mut self, trans: &Transform3) {
        self.curve.transform_by(trans);
        self.direction = trans.transform_unit(self.direction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::Circle;
    use lathe_base::assert_near;

    fn tube() -> Extrude {
        let circle = Circle::new(
            Point3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            1.5,
            None,
        );
        Extrude::new(circle.into(), Vector3::new(0.0, 0.0, 1.0))
    }

    #[test]
    fn traces_cylinder() {
        let e = tube();
        let p = e.subs(2.0, PI / 2.0);
        assert_near!(p, Point3::new(0.0, 1.5, 2.0));
    }

    #[test]
    fn inverse_round_trip() {
        let e = tube();
        let (u, v) = (1.25, 2.5);
        let uv = e.inverse(e.subs(u, v), None);
        assert_near!(uv.x, u);
        assert_near!(uv.y, v);
    }
}
