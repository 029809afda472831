use super::*;

/// tensor-product non-uniform B-spline surface; `control_points[i][j]` is
/// the control point at u index `i`, v index `j`
#[derive(Debug, Serialize, Deserialize)]
pub struct NubSurface {
    u_knots: KnotVec,
    v_knots: KnotVec,
    control_points: Vec<Vec<Point3>>,
    u_degree: usize,
    v_degree: usize,
    #[serde(skip)]
    seeds: RwLock<Option<Arc<SeedGrid>>>,
}

/// coarse grid of `(uv, position)` samples caching Newton starts
#[derive(Clone, Debug)]
pub struct SeedGrid {
    /// samples in row-major order, u fastest
    pub samples: Vec<(Point2, Point3)>,
    /// number of samples along u
    pub nu: usize,
    /// number of samples along v
    pub nv: usize,
}

impl SeedGrid {
    /// the sample nearest to `pos`
    pub fn nearest(&self, pos: Point3) -> Point2 {
        self.samples
            .iter()
            .min_by(|(_, p), (_, q)| {
                p.distance2(pos).partial_cmp(&q.distance2(pos)).unwrap()
            })
            .map(|(uv, _)| *uv)
            .unwrap_or_else(|| Point2::new(0.0, 0.0))
    }

    /// the four corners of grid cell `(i, j)`
    pub fn cell(&self, i: usize, j: usize) -> [(Point2, Point3); 4] {
        [
            self.samples[j * self.nu + i],
            self.samples[j * self.nu + i + 1],
            self.samples[(j + 1) * self.nu + i],
            self.samples[(j + 1) * self.nu + i + 1],
        ]
    }
}

/// seed samples per knot span per direction
const SEEDS_PER_SPAN: usize = 3;

impl NubSurface {
    /// Creates a B-spline surface.
    pub fn new(
        u_knots: KnotVec,
        v_knots: KnotVec,
        control_points: Vec<Vec<Point3>>,
    ) -> Result<Self> {
        let nu = control_points.len();
        if nu == 0 {
            return Err(Error::EmptyControlPoints);
        }
        let nv = control_points[0].len();
        if control_points.iter().any(|row| row.len() != nv) {
            return Err(Error::IrregularControlPoints);
        }
        if u_knots.len() <= nu + 1 || v_knots.len() <= nv + 1 {
            return Err(Error::TooShortKnotVector(u_knots.len(), nu));
        }
        let u_degree = u_knots.len() - nu - 1;
        let v_degree = v_knots.len() - nv - 1;
        u_knots.check_spline(nu, u_degree)?;
        v_knots.check_spline(nv, v_degree)?;
        Ok(Self {
            u_knots,
            v_knots,
            control_points,
            u_degree,
            v_degree,
            seeds: RwLock::new(None),
        })
    }

    /// u knot vector
    #[inline(always)]
    pub const fn u_knots(&self) -> &KnotVec { &self.u_knots }

    /// v knot vector
    #[inline(always)]
    pub const fn v_knots(&self) -> &KnotVec { &self.v_knots }

    /// u degree
    #[inline(always)]
    pub const fn u_degree(&self) -> usize { self.u_degree }

    /// v degree
    #[inline(always)]
    pub const fn v_degree(&self) -> usize { self.v_degree }

    /// the control net
    #[inline(always)]
    pub fn control_points(&self) -> &Vec<Vec<Point3>> { &self.control_points }

    /// whether the surface closes in u: the edge rows coincide
    pub fn closed_u(&self) -> bool {
        let last = self.control_points.len() - 1;
        self.control_points[0]
            .iter()
            .zip(&self.control_points[last])
            .all(|(a, b)| a.near(b))
    }

    /// whether the surface closes in v: the edge columns coincide
    pub fn closed_v(&self) -> bool {
        let last = self.control_points[0].len() - 1;
        self.control_points
            .iter()
            .all(|row| row[0].near(&row[last]))
    }

    /// The cached seed grid used to start Newton inversion and line
    /// intersection; built on first use. Single-thread contract.
    pub fn seed_grid(&self) -> Arc<SeedGrid> {
        if let Some(seeds) = self.seeds.read().as_ref() {
            return Arc::clone(seeds);
        }
        let us = span_samples(&self.u_knots, self.u_degree, self.control_points.len());
        let vs = span_samples(&self.v_knots, self.v_degree, self.control_points[0].len());
        let mut samples = Vec::with_capacity(us.len() * vs.len());
        for &v in &vs {
            for &u in &us {
                samples.push((Point2::new(u, v), self.subs(u, v)));
            }
        }
        let grid = Arc::new(SeedGrid { samples, nu: us.len(), nv: vs.len() });
        *self.seeds.write() = Some(Arc::clone(&grid));
        grid
    }

    /// whether `other` has the same knots and control net within `tol`
    pub fn is_same(&self, other: &Self, tol: f64) -> bool {
        self.u_degree == other.u_degree
            && self.v_degree == other.v_degree
            && self.u_knots.len() == other.u_knots.len()
            && self.v_knots.len() == other.v_knots.len()
            && self.control_points.len() == other.control_points.len()
            && self
                .control_points
                .iter()
                .zip(&other.control_points)
                .all(|(ra, rb)| {
                    ra.len() == rb.len()
                        && ra.iter().zip(rb).all(|(a, b)| a.distance(*b) <= tol)
                })
    }

    /// partial derivatives up to total order 2: `[S, Su, Sv, Suu, Suv, Svv]`
    pub(crate) fn all_ders(&self, u: f64, v: f64) -> [Vector3; 6] {
        let domain = BoundedSurface::parameter_range(self);
        let (u, v) = (domain.u.clamp(u), domain.v.clamp(v));
        let nu = self.control_points.len();
        let nv = self.control_points[0].len();
        let uspan = self.u_knots.span(self.u_degree, nu, u);
        let vspan = self.v_knots.span(self.v_degree, nv, v);
        let uders = self.u_knots.basis_ders(self.u_degree, uspan, u, 2);
        let vders = self.v_knots.basis_ders(self.v_degree, vspan, v, 2);
        let mut out = [Vector3::zero(); 6];
        let pick = |ders: &Vec<Vec<f64>>, k: usize, j: usize| -> f64 {
            ders.get(k).map(|row| row[j]).unwrap_or(0.0)
        };
        for i in 0..=self.u_degree {
            for j in 0..=self.v_degree {
                let cp = self.control_points[uspan - self.u_degree + i]
                    [vspan - self.v_degree + j]
                    .to_vec();
                let (n0u, n1u, n2u) = (pick(&uders, 0, i), pick(&uders, 1, i), pick(&uders, 2, i));
                let (n0v, n1v, n2v) = (pick(&vders, 0, j), pick(&vders, 1, j), pick(&vders, 2, j));
                out[0] += cp * (n0u * n0v);
                out[1] += cp * (n1u * n0v);
                out[2] += cp * (n0u * n1v);
                out[3] += cp * (n2u * n0v);
                out[4] += cp * (n1u * n1v);
                out[5] += cp * (n0u * n2v);
            }
        }
        out
    }
}

fn span_samples(knots: &KnotVec, degree: usize, n: usize) -> Vec<f64> {
    let mut out = Vec::new();
    let k = knots.as_slice();
    for i in degree..n {
        let (k0, k1) = (k[i], k[i + 1]);
        if (k1 - k0).so_small() {
            continue;
        }
        for j in 0..SEEDS_PER_SPAN {
            out.push(k0 + (k1 - k0) * j as f64 / SEEDS_PER_SPAN as f64);
        }
    }
    out.push(knots.parameter_range(degree).1);
    out
}

impl Clone for NubSurface {
    fn clone(&self) -> Self {
        Self {
            u_knots: self.u_knots.clone(),
            v_knots: self.v_knots.clone(),
            control_points: self.control_points.clone(),
            u_degree: self.u_degree,
            v_degree: self.v_degree,
            seeds: RwLock::new(self.seeds.read().clone()),
        }
    }
}

impl PartialEq for NubSurface {
    fn eq(&self, other: &Self) -> bool {
        self.u_knots == other.u_knots
            && self.v_knots == other.v_knots
            && self.control_points == other.control_points
    }
}

impl ParametricSurface for NubSurface {
    fn subs(&self, u: f64, v: f64) -> Point3 { Point3::from_vec(self.all_ders(u, v)[0]) }
    fn uder(&self, u: f64, v: f64) -> Vector3 { self.all_ders(u, v)[1] }
    fn vder(&self, u: f64, v: f64) -> Vector3 { self.all_ders(u, v)[2] }
    fn uuder(&self, u: f64, v: f64) -> Vector3 { self.all_ders(u, v)[3] }
    fn uvder(&self, u: f64, v: f64) -> Vector3 { self.all_ders(u, v)[4] }
    fn vvder(&self, u: f64, v: f64) -> Vector3 { self.all_ders(u, v)[5] }
}

impl BoundedSurface for NubSurface {
    fn parameter_range(&self) -> Interval2D {
        let (u0, u1) = self.u_knots.parameter_range(self.u_degree);
        let (v0, v1) = self.v_knots.parameter_range(self.v_degree);
        Interval2D::new(Interval1D::new(u0, u1), Interval1D::new(v0, v1))
    }
}

impl Transformed for NubSurface {
    fn transform_by(&mut self, trans: &Transform3) {
        self.control_points
            .iter_mut()
            .flatten()
            .for_each(|p| *p = trans.transform_point(*p));
        *self.seeds.write() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lathe_base::assert_near;

    pub(crate) fn wavy() -> NubSurface {
        let pts: Vec<Vec<Point3>> = (0..5)
            .map(|i| {
                (0..5)
                    .map(|j| {
                        let (x, y) = (i as f64, j as f64);
                        Point3::new(x, y, f64::sin(x) * f64::cos(y) * 0.5)
                    })
                    .collect()
            })
            .collect();
        NubSurface::new(
            KnotVec::clamped_uniform(5, 3),
            KnotVec::clamped_uniform(5, 3),
            pts,
        )
        .unwrap()
    }

    #[test]
    fn corners_interpolate() {
        let s = wavy();
        let d = BoundedSurface::parameter_range(&s);
        assert_near!(s.subs(d.u.min, d.v.min), Point3::new(0.0, 0.0, 0.0));
        assert_near!(
            s.subs(d.u.max, d.v.max),
            Point3::new(4.0, 4.0, f64::sin(4.0) * f64::cos(4.0) * 0.5)
        );
    }

    #[test]
    fn derivatives_match_finite_difference() {
        let s = wavy();
        let (u, v) = (0.9, 1.4);
        let h = 1.0e-6;
        let fd_u = (s.subs(u + h, v) - s.subs(u - h, v)) / (2.0 * h);
        let fd_v = (s.subs(u, v + h) - s.subs(u, v - h)) / (2.0 * h);
        assert!((s.uder(u, v) - fd_u).magnitude() < 1.0e-5);
        assert!((s.vder(u, v) - fd_v).magnitude() < 1.0e-5);
        let fd_uu = (s.uder(u + h, v) - s.uder(u - h, v)) / (2.0 * h);
        assert!((s.uuder(u, v) - fd_uu).magnitude() < 1.0e-5);
    }

    #[test]
    fn seed_grid_covers_domain() {
        let s = wavy();
        let grid = s.seed_grid();
        assert_eq!(grid.samples.len(), grid.nu * grid.nv);
        let uv = grid.nearest(Point3::new(2.0, 2.0, 0.0));
        assert!(s.subs(uv.x, uv.y).distance(Point3::new(2.0, 2.0, 0.0)) < 1.5);
    }
}
