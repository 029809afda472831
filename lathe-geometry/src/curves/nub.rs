use super::*;

/// non-uniform B-spline curve
#[derive(Debug, Serialize, Deserialize)]
pub struct NubCurve {
    knots: KnotVec,
    control_points: Vec<Point3>,
    degree: usize,
    #[serde(skip)]
    seeds: RwLock<Option<Arc<Vec<(f64, Point3)>>>>,
}

/// seed samples per knot span for inversion
pub(crate) const SEEDS_PER_SPAN: usize = 5;

impl NubCurve {
    /// Creates a B-spline curve of degree `knots.len() - points.len() - 1`.
    pub fn new(knots: KnotVec, control_points: Vec<Point3>) -> Result<Self> {
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

    /// the control points
    #[inline(always)]
    pub fn control_points(&self) -> &[Point3] { &self.control_points }

    /// whether the curve is closed: the end points coincide
    #[inline]
    pub fn is_closed(&self) -> bool { self.front().near(&self.back()) }

    /// The cached seed samples used to start Newton inversion; built on
    /// first use. Single-thread contract: a second thread holding the same
    /// curve is a programming error.
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
            for j in 0..SEEDS_PER_SPAN {
                let t = k0 + (k1 - k0) * j as f64 / SEEDS_PER_SPAN as f64;
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
            && self
                .control_points
                .iter()
                .zip(&other.control_points)
                .all(|(a, b)| a.distance(*b) <= tol)
    }

    fn ders(&self, t: f64, nders: usize) -> Vec<Vector3> {
        let t = self.parameter_range().clamp(t);
        let n = self.control_points.len();
        let span = self.knots.span(self.degree, n, t);
        let ders = self.knots.basis_ders(self.degree, span, t, nders);
        (0..=nders)
            .map(|k| match ders.get(k) {
                Some(row) => row
                    .iter()
                    .enumerate()
                    .fold(Vector3::zero(), |acc, (j, &basis)| {
                        acc + self.control_points[span - self.degree + j].to_vec() * basis
                    }),
                None => Vector3::zero(),
            })
            .collect()
    }
}

impl Clone for NubCurve {
    fn clone(&self) -> Self {
        Self {
            knots: self.knots.clone(),
            control_points: self.control_points.clone(),
            degree: self.degree,
            seeds: RwLock::new(self.seeds.read().clone()),
        }
    }
}

impl PartialEq for NubCurve {
    fn eq(&self, other: &Self) -> bool {
        self.knots == other.knots && self.control_points == other.control_points
    }
}

impl ParametricCurve for NubCurve {
    fn subs(&self, t: f64) -> Point3 {
        let t = self.parameter_range().clamp(t);
        let n = self.control_points.len();
        let span = self.knots.span(self.degree, n, t);
        let basis = self.knots.basis_functions(self.degree, span, t);
        let v = basis
            .iter()
            .enumerate()
            .fold(Vector3::zero(), |acc, (j, &b)| {
                acc + self.control_points[span - self.degree + j].to_vec() * b
            });
        Point3::from_vec(v)
    }
    fn der(&self, t: f64) -> Vector3 { self.ders(t, 1)[1] }
    fn der2(&self, t: f64) -> Vector3 {
        match self.degree >= 2 {
            true => self.ders(t, 2)[2],
            false => Vector3::zero(),
        }
    }
}

impl BoundedCurve for NubCurve {
    #[inline]
    fn parameter_range(&self) -> Interval1D {
        let (t0, t1) = self.knots.parameter_range(self.degree);
        Interval1D::new(t0, t1)
    }
}

impl SearchNearestParameter for NubCurve {
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
        let start = hint.unwrap_or(best_seed);
        let domain = self.parameter_range();
        let trials = usize::max(trials, 16);
        let mut t = start;
        for _ in 0..trials {
            let ders = self.ders(t, 2);
            let diff = self.subs(t) - point;
            let f = ders[1].dot(diff);
            let fp = ders[2].dot(diff) + ders[1].magnitude2();
            if fp.so_small() {
                break;
            }
            let step = f / fp;
            t = domain.clamp(t - step);
            if step.so_small2() {
                return Some(t);
            }
        }
        // Newton did not settle: fall back to the projection of the best
        // seed, still a valid nearest-point approximation
        let candidate = self.subs(t);
        match candidate.distance2(point) <= self.subs(best_seed).distance2(point) {
            true => Some(t),
            false => Some(best_seed),
        }
    }
}

impl Transformed for NubCurve {
    fn transform_by(&mut self, trans: &Transform3) {
        self.control_points
            .iter_mut()
            .for_each(|p| *p = trans.transform_point(*p));
        *self.seeds.write() = None;
    }
}
