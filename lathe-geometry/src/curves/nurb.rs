use super::*;

/// non-uniform rational B-spline curve with weighted homogeneous control
/// points `(w x, w y, w z, w)`
#[derive(Debug, Serialize, Deserialize)]
pub struct NurbCurve {
    knots: KnotVec,
    control_points: Vec<Vector4>,
    degree: usize,
    #[serde(skip)]
    seeds: RwLock<Option<Arc<Vec<(f64, Point3)>>>>,
}

impl NurbCurve {
    /// Creates a NURBS curve of degree `knots.len() - points.len() - 1`.
    pub fn new(knots: KnotVec, control_points: Vec<Vector4>) -> Result<Self> {
        if knots.len() <= control_points.len() + 1 {
            return Err(Error::TooShortKnotVector(knots.len(), control_points.len()));
        }
        let degree = knots.len() - control_points.len() - 1;
        knots.check_spline(control_points.len(), degree)?;
        Ok(Self {
            knots,
            control_points,
            degree,
            seeds: RwLock::new(None),
        })
    }

    /// the degree of the curve
    #[inline(always)]
    pub const fn degree(&self) -> usize { self.degree }

    /// the knot vector
    #[inline(always)]
    pub const fn knots(&self) -> &KnotVec { &self.knots }

    /// the weighted control points
    #[inline(always)]
    pub fn control_points(&self) -> &[Vector4] { &self.control_points }

    /// the dehomogenized control point at `idx`
    #[inline]
    pub fn control_point(&self, idx: usize) -> Point3 {
        let cp = self.control_points[idx];
        Point3::new(cp.x / cp.w, cp.y / cp.w, cp.z / cp.w)
    }

    /// whether the curve is closed: the end points coincide
    #[inline]
    pub fn is_closed(&self) -> bool { self.front().near(&self.back()) }

    /// seed samples for Newton inversion, cached on first use
    pub fn seed_points(&self) -> Arc<Vec<(f64, Point3)>> {
        if let Some(seeds) = self.seeds.read().as_ref() {
            return Arc::clone(seeds);
        }
        let mut seeds = Vec::new();
        let knots = self.knots.as_slice();
        let n = self.control_points.len();
        for i in self.degree..n {
            let (k0, k1) = (knots[i], knots[i + 1]);
            if (k1 - k0).so_small() {
                continue;
            }
            for j in 0..super::nub::SEEDS_PER_SPAN {
                let t = k0 + (k1 - k0) * j as f64 / super::nub::SEEDS_PER_SPAN as f64;
                seeds.push((t, self.subs(t)));
            }
        }
        let t1 = self.parameter_range().max;
        seeds.push((t1, self.subs(t1)));
        let seeds = Arc::new(seeds);
        *self.seeds.write() = Some(Arc::clone(&seeds));
        seeds
    }

    /// whether `other` has the same knots and control points within `tol`
    pub fn is_same(&self, other: &Self, tol: f64) -> bool {
        self.degree == other.degree
            && self.knots.len() == other.knots.len()
            && self.control_points.len() == other.control_points.len()
            && self
                .knots
                .as_slice()
                .iter()
                .zip(other.knots.as_slice())
                .all(|(a, b)| near_equal(*a, *b, tol, false))
            && (0..self.control_points.len())
                .all(|i| self.control_point(i).distance(other.control_point(i)) <= tol)
    }

    // homogeneous derivatives (A^(k), w^(k))
    fn homogeneous_ders(&self, t: f64, nders: usize) -> Vec<(Vector3, f64)> {
        let t = self.parameter_range().clamp(t);
        let n = self.control_points.len();
        let span = self.knots.span(self.degree, n, t);
        let ders = self.knots.basis_ders(self.degree, span, t, nders);
        (0..=nders)
            .map(|k| match ders.get(k) {
                Some(row) => row.iter().enumerate().fold(
                    (Vector3::zero(), 0.0),
                    |(acc, accw), (j, &basis)| {
                        let cp = self.control_points[span - self.degree + j];
                        (acc + Vector3::new(cp.x, cp.y, cp.z) * basis, accw + cp.w * basis)
                    },
                ),
                None => (Vector3::zero(), 0.0),
            })
            .collect()
    }
}

impl Clone for NurbCurve {
    fn clone(&self) -> Self {
        Self {
            knots: self.knots.clone(),
            control_points: self.control_points.clone(),
            degree: self.degree,
            seeds: RwLock::new(self.seeds.read().clone()),
        }
    }
}

impl PartialEq for NurbCurve {
    fn eq(&self, other: &Self) -> bool {
        self.knots == other.knots && self.control_points == other.control_points
    }
}

impl ParametricCurve for NurbCurve {
    fn subs(&self, t: f64) -> Point3 {
        let ders = self.homogeneous_ders(t, 0);
        let (a, w) = ders[0];
        Point3::from_vec(a / w)
    }
    fn der(&self, t: f64) -> Vector3 {
        let ders = self.homogeneous_ders(t, 1);
        let (a0, w0) = ders[0];
        let (a1, w1) = ders[1];
        (a1 - (a0 / w0) * w1) / w0
    }
    fn der2(&self, t: f64) -> Vector3 {
        if self.degree < 2 {
            return Vector3::zero();
        }
        let ders = self.homogeneous_ders(t, 2);
        let (a0, w0) = ders[0];
        let (a1, w1) = ders[1];
        let (a2, w2) = ders[2];
        let c = a0 / w0;
        let c1 = (a1 - c * w1) / w0;
        (a2 - c1 * (2.0 * w1) - c * w2) / w0
    }
}

impl BoundedCurve for NurbCurve {
    #[inline]
    fn parameter_range(&self) -> Interval1D {
        let (t0, t1) = self.knots.parameter_range(self.degree);
        Interval1D::new(t0, t1)
    }
}

impl SearchNearestParameter for NurbCurve {
    type Parameter = f64;
    fn search_nearest_parameter(
        &self,
        point: Point3,
        hint: Option<f64>,
        trials: usize,
    ) -> Option<f64> {
        let seeds = self.seed_points();
        let best_seed = seeds
            .iter()
            .min_by(|(_, p), (_, q)| {
                p.distance2(point).partial_cmp(&q.distance2(point)).unwrap()
            })
            .map(|(t, _)| *t)?;
        let domain = self.parameter_range();
        let mut t = hint.unwrap_or(best_seed);
        for _ in 0..usize::max(trials, 16) {
            let diff = self.subs(t) - point;
            let d1 = self.der(t);
            let d2 = self.der2(t);
            let f = d1.dot(diff);
            let fp = d2.dot(diff) + d1.magnitude2();
            if fp.so_small() {
                break;
            }
            let step = f / fp;
            t = domain.clamp(t - step);
            if step.so_small2() {
                return Some(t);
            }
        }
        let candidate = self.subs(t);
        match candidate.distance2(point) <= self.subs(best_seed).distance2(point) {
            true => Some(t),
            false => Some(best_seed),
        }
    }
}

impl Transformed for NurbCurve {
    fn transform_by(&mut self, trans: &Transform3) {
        self.control_points.iter_mut().for_each(|cp| {
            let p = trans.transform_point(Point3::new(cp.x / cp.w, cp.y / cp.w, cp.z / cp.w));
            *cp = Vector4::new(p.x * cp.w, p.y * cp.w, p.z * cp.w, cp.w);
        });
        *self.seeds.write() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lathe_base::assert_near;

    /// quarter circle as a quadratic rational Bezier
    fn quarter_circle() -> NurbCurve {
        let w = f64::sqrt(0.5);
        NurbCurve::new(
            KnotVec::new(vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]),
            vec![
                Vector4::new(1.0, 0.0, 0.0, 1.0),
                Vector4::new(w, w, 0.0, w),
                Vector4::new(0.0, 1.0, 0.0, 1.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn traces_unit_circle() {
        let c = quarter_circle();
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            let p = c.subs(t);
            assert_near!(p.to_vec().magnitude(), 1.0);
            assert!(p.z.so_small());
        }
    }

    #[test]
    fn derivative_matches_finite_difference() {
        let c = quarter_circle();
        let h = 1.0e-6;
        for i in 1..10 {
            let t = i as f64 / 10.0;
            let fd = (c.subs(t + h) - c.subs(t - h)) / (2.0 * h);
            assert!((c.der(t) - fd).magnitude() < 1.0e-5);
        }
    }

    #[test]
    fn inverse_round_trip() {
        let c = quarter_circle();
        let found = c.search_nearest_parameter(c.subs(0.3), None, 32).unwrap();
        assert!(c.subs(found).distance(c.subs(0.3)) < 1.0e-8);
    }
}
