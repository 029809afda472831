use super::*;

/// piecewise cubic hermite curve from parameter, position, tangent samples;
/// the representation of traced surface intersection curves
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hermite {
    params: Vec<f64>,
    points: Vec<Point3>,
    tangents: Vec<Vector3>,
}

impl Hermite {
    /// Creates a hermite curve. Parameters must strictly increase and the
    /// three arrays must agree in length, with at least two samples.
    pub fn new(params: Vec<f64>, points: Vec<Point3>, tangents: Vec<Vector3>) -> Result<Self> {
        if params.len() < 2 || params.len() != points.len() || params.len() != tangents.len() {
            return Err(Error::InvalidHermiteData);
        }
        if params.windows(2).any(|w| w[1] <= w[0]) {
            return Err(Error::InvalidHermiteData);
        }
        Ok(Self { params, points, tangents })
    }

    /// the parameter samples
    #[inline(always)]
    pub fn params(&self) -> &[f64] { &self.params }

    /// the position samples
    #[inline(always)]
    pub fn points(&self) -> &[Point3] { &self.points }

    /// the tangent samples
    #[inline(always)]
    pub fn tangents(&self) -> &[Vector3] { &self.tangents }

    /// whether the traced curve came back to its start
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.points[0].near(&self.points[self.points.len() - 1])
    }

    /// Reverses the curve in place, keeping the parameter range.
    pub fn negate(&mut self) {
        let t0 = self.params[0];
        let t1 = self.params[self.params.len() - 1];
        self.params.reverse();
        self.params.iter_mut().for_each(|t| *t = t0 + t1 - *t);
        self.points.reverse();
        self.tangents.reverse();
        self.tangents.iter_mut().for_each(|v| *v = -*v);
    }

    /// Concatenates `other` onto the back of `self`, shifting the
    /// parameters of `other` to continue seamlessly.
    pub fn concat(&mut self, other: &Self) {
        let offset = self.params[self.params.len() - 1] - other.params[0];
        let skip = match self.points[self.points.len() - 1].near(&other.points[0]) {
            true => 1,
            false => 0,
        };
        self.params.extend(other.params.iter().skip(skip).map(|t| t + offset));
        self.points.extend(other.points.iter().skip(skip));
        self.tangents.extend(other.tangents.iter().skip(skip));
    }

    /// the span index of `t`: the greatest `i` with `params[i] <= t`
    fn span(&self, t: f64) -> usize {
        match self.params.binary_search_by(|p| p.partial_cmp(&t).unwrap()) {
            Ok(i) => usize::min(i, self.params.len() - 2),
            Err(i) => i.saturating_sub(1).min(self.params.len() - 2),
        }
    }

    /// whether `other` interpolates the same samples within `tol`
    pub fn is_same(&self, other: &Self, tol: f64) -> bool {
        self.points.len() == other.points.len()
            && self
                .points
                .iter()
                .zip(&other.points)
                .all(|(a, b)| a.distance(*b) <= tol)
    }
}

impl ParametricCurve for Hermite {
    fn subs(&self, t: f64) -> Point3 {
        let t = self.parameter_range().clamp(t);
        let i = self.span(t);
        let (t0, t1) = (self.params[i], self.params[i + 1]);
        let dt = t1 - t0;
        let s = (t - t0) / dt;
        let h1 = (s * s) * (2.0 * s - 3.0) + 1.0;
        let h2 = 1.0 - h1;
        let h3 = s * (s * (s - 2.0) + 1.0);
        let h4 = (s * s) * (s - 1.0);
        let v1 = self.tangents[i] * dt;
        let v2 = self.tangents[i + 1] * dt;
        Point3::from_vec(
            self.points[i].to_vec() * h1 + self.points[i + 1].to_vec() * h2 + v1 * h3 + v2 * h4,
        )
    }
    fn der(&self, t: f64) -> Vector3 {
        let t = self.parameter_range().clamp(t);
        let i = self.span(t);
        let (t0, t1) = (self.params[i], self.params[i + 1]);
        let dt = t1 - t0;
        let s = (t - t0) / dt;
        let dh1 = 6.0 * s * (s - 1.0);
        let dh3 = 3.0 * s * s - 4.0 * s + 1.0;
        let dh4 = 3.0 * s * s - 2.0 * s;
        ((self.points[i + 1] - self.points[i]) * -dh1
            + (self.tangents[i] * dh3 + self.tangents[i + 1] * dh4) * dt)
            / dt
    }
    fn der2(&self, t: f64) -> Vector3 {
        let t = self.parameter_range().clamp(t);
        let i = self.span(t);
        let (t0, t1) = (self.params[i], self.params[i + 1]);
        let dt = t1 - t0;
        let s = (t - t0) / dt;
        let ddh1 = 12.0 * s - 6.0;
        let ddh3 = 6.0 * s - 4.0;
        let ddh4 = 6.0 * s - 2.0;
        ((self.points[i + 1] - self.points[i]) * -ddh1
            + (self.tangents[i] * ddh3 + self.tangents[i + 1] * ddh4) * dt)
            / (dt * dt)
    }
}

impl BoundedCurve for Hermite {
    #[inline]
    fn parameter_range(&self) -> Interval1D {
        Interval1D::new(self.params[0], self.params[self.params.len() - 1])
    }
}

impl SearchNearestParameter for Hermite {
    type Parameter = f64;
    fn search_nearest_parameter(
        &self,
        point: Point3,
        hint: Option<f64>,
        trials: usize,
    ) -> Option<f64> {
        let best_sample = self
            .params
            .iter()
            .zip(&self.points)
            .min_by(|(_, p), (_, q)| {
                p.distance2(point).partial_cmp(&q.distance2(point)).unwrap()
            })
            .map(|(t, _)| *t)?;
        let domain = self.parameter_range();
        let mut t = hint.unwrap_or(best_sample);
        for _ in 0..usize::max(trials, 16) {
            let diff = self.subs(t) - point;
            let d1 = self.der(t);
            let fp = self.der2(t).dot(diff) + d1.magnitude2();
            if fp.so_small() {
                break;
            }
            let step = d1.dot(diff) / fp;
            t = domain.clamp(t - step);
            if step.so_small2() {
                return Some(t);
            }
        }
        match self.subs(t).distance2(point) <= self.subs(best_sample).distance2(point) {
            true => Some(t),
            false => Some(best_sample),
        }
    }
}

impl Transformed for Hermite {
    fn transform_by(&mut self, trans: &Transform3) {
        self.points.iter_mut().for_each(|p| *p = trans.transform_point(*p));
        self.tangents.iter_mut().for_each(|v| *v = trans.transform_unit(*v));
        let s = trans.scale_factor();
        if s != 1.0 {
            self.params.iter_mut().for_each(|t| *t *= s);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lathe_base::assert_near;

    fn quarter_arc() -> Hermite {
        // hermite samples of the unit circle over [0, pi/2]
        let params: Vec<f64> = (0..=4).map(|i| i as f64 * PI / 8.0).collect();
        let points = params
            .iter()
            .map(|t| Point3::new(t.cos(), t.sin(), 0.0))
            .collect();
        let tangents = params
            .iter()
            .map(|t| Vector3::new(-t.sin(), t.cos(), 0.0))
            .collect();
        Hermite::new(params, points, tangents).unwrap()
    }

    #[test]
    fn interpolates_samples() {
        let h = quarter_arc();
        for (t, p) in h.params().iter().zip(h.points()) {
            assert_near!(h.subs(*t), *p);
        }
        // cubic spans track the circle closely
        let p = h.subs(PI / 16.0);
        assert!((p.to_vec().magnitude() - 1.0).abs() < 1.0e-4);
    }

    #[test]
    fn negate_and_concat() {
        let mut h = quarter_arc();
        let front = h.front();
        let back = h.back();
        h.negate();
        assert_near!(h.front(), back);
        assert_near!(h.back(), front);

        let mut a = quarter_arc();
        let b = {
            let mut c = quarter_arc();
            c.negate();
            c
        };
        let n = a.points().len();
        a.concat(&b);
        assert_eq!(a.points().len(), 2 * n - 1);
        assert!(a.is_closed());
    }

    #[test]
    fn inverse_round_trip() {
        let h = quarter_arc();
        let t = 0.9;
        let found = h.search_nearest_parameter(h.subs(t), None, 32).unwrap();
        assert!(h.subs(found).distance(h.subs(t)) < 1.0e-9);
    }
}
