use super::*;
use super::nub::SeedGrid;

/// tensor-product rational B-spline surface with weighted homogeneous
/// control points `(w x, w y, w z, w)`
#[derive(Debug, Serialize, Deserialize)]
pub struct NurbSurface {
    u_knots: KnotVec,
    v_knots: KnotVec,
    control_points: Vec<Vec<Vector4>>,
    u_degree: usize,
    v_degree: usize,
    #[serde(skip)]
    seeds: RwLock<Option<Arc<SeedGrid>>>,
}

impl NurbSurface {
    /// Creates a NURBS surface.
    pub fn new(
        u_knots: KnotVec,
        v_knots: KnotVec,
        control_points: Vec<Vec<Vector4>>,
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

    /// the weighted control net
    #[inline(always)]
    pub fn control_points(&self) -> &Vec<Vec<Vector4>> { &self.control_points }

    /// the dehomogenized control point `(i, j)`
    #[inline]
    pub fn control_point(&self, i: usize, j: usize) -> Point3 {
        let cp = self.control_points[i][j];
        Point3::new(cp.x / cp.w, cp.y / cp.w, cp.z / cp.w)
    }

    /// whether the surface closes in u
    pub fn closed_u(&self) -> bool {
        let last = self.control_points.len() - 1;
        (0..self.control_points[0].len())
            .all(|j| self.control_point(0, j).near(&self.control_point(last, j)))
    }

    /// whether the surface closes in v
    pub fn closed_v(&self) -> bool {
        let last = self.control_points[0].len() - 1;
        (0..self.control_points.len())
            .all(|i| self.control_point(i, 0).near(&self.control_point(i, last)))
    }

    /// the cached seed grid; built on first use, single-thread contract
    pub fn seed_grid(&self) -> Arc<SeedGrid> {
        if let Some(seeds) = self.seeds.read().as_ref() {
            return Arc::clone(seeds);
        }
        let domain = BoundedSurface::parameter_range(self);
        let nu_spans = self.control_points.len();
        let nv_spans = self.control_points[0].len();
        let nu = usize::max(3 * nu_spans, 8);
        let nv = usize::max(3 * nv_spans, 8);
        let mut samples = Vec::with_capacity((nu + 1) * (nv + 1));
        for j in 0..=nv {
            let v = domain.v.mid_point(j as f64 / nv as f64);
            for i in 0..=nu {
                let u = domain.u.mid_point(i as f64 / nu as f64);
                samples.push((Point2::new(u, v), self.subs(u, v)));
            }
        }
        let grid = Arc::new(SeedGrid { samples, nu: nu + 1, nv: nv + 1 });
        *self.seeds.write() = Some(Arc::clone(&grid));
        grid
    }

    /// whether `other` has the same knots and control net within `tol`
    pub fn is_same(&self, other: &Self, tol: f64) -> bool {
        self.u_degree == other.u_degree
            && self.v_degree == other.v_degree
            && self.control_points.len() == other.control_points.len()
            && self.control_points[0].len() == other.control_points[0].len()
            && (0..self.control_points.len()).all(|i| {
                (0..self.control_points[0].len())
                    .all(|j| self.control_point(i, j).distance(other.control_point(i, j)) <= tol)
            })
    }

    // homogeneous partials [(A, w); 6] in the order [S, Su, Sv, Suu, Suv, Svv]
    fn homogeneous_ders(&self, u: f64, v: f64) -> [(Vector3, f64); 6] {
        let domain = BoundedSurface::parameter_range(self);
        let (u, v) = (domain.u.clamp(u), domain.v.clamp(v));
        let nu = self.control_points.len();
        let nv = self.control_points[0].len();
        let uspan = self.u_knots.span(self.u_degree, nu, u);
        let vspan = self.v_knots.span(self.v_degree, nv, v);
        let uders = self.u_knots.basis_ders(self.u_degree, uspan, u, 2);
        let vders = self.v_knots.basis_ders(self.v_degree, vspan, v, 2);
        let pick = |ders: &Vec<Vec<f64>>, k: usize, j: usize| -> f64 {
            ders.get(k).map(|row| row[j]).unwrap_or(0.0)
        };
        let mut out = [(Vector3::zero(), 0.0); 6];
        for i in 0..=self.u_degree {
            for j in 0..=self.v_degree {
                let cp = self.control_points[uspan - self.u_degree + i]
                    [vspan - self.v_degree + j];
                let a = Vector3::new(cp.x, cp.y, cp.z);
                let (n0u, n1u, n2u) = (pick(&uders, 0, i), pick(&uders, 1, i), pick(&uders, 2, i));
                let (n0v, n1v, n2v) = (pick(&vders, 0, j), pick(&vders, 1, j), pick(&vders, 2, j));
                let weights = [
                    n0u * n0v,
                    n1u * n0v,
                    n0u * n1v,
                    n2u * n0v,
                    n1u * n1v,
                    n0u * n2v,
                ];
                for (slot, w) in out.iter_mut().zip(weights) {
                    slot.0 += a * w;
                    slot.1 += cp.w * w;
                }
            }
        }
        out
    }
}

impl Clone for NurbSurface {
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

impl PartialEq for NurbSurface {
    fn eq(&self, other: &Self) -> bool {
        self.u_knots == other.u_knots
            && self.v_knots == other.v_knots
            && self.control_points == other.control_points
    }
}

impl ParametricSurface for NurbSurface {
    fn subs(&self, u: f64, v: f64) -> Point3 {
        let [(a, w), ..] = self.homogeneous_ders(u, v);
        Point3::from_vec(a / w)
    }
    fn uder(&self, u: f64, v: f64) -> Vector3 {
        let ders = self.homogeneous_ders(u, v);
        let (a0, w0) = ders[0];
        let (a1, w1) = ders[1];
        (a1 - (a0 / w0) * w1) / w0
    }
    fn vder(&self, u: f64, v: f64) -> Vector3 {
        let ders = self.homogeneous_ders(u, v);
        let (a0, w0) = ders[0];
        let (a2, w2) = ders[2];
        (a2 - (a0 / w0) * w2) / w0
    }
    fn uuder(&self, u: f64, v: f64) -> Vector3 {
        let ders = self.homogeneous_ders(u, v);
        let (a0, w0) = ders[0];
        let s = a0 / w0;
        let su = (ders[1].0 - s * ders[1].1) / w0;
        (ders[3].0 - su * (2.0 * ders[1].1) - s * ders[3].1) / w0
    }
    fn uvder(&self, u: f64, v: f64) -> Vector3 {
        let ders = self.homogeneous_ders(u, v);
        let (a0, w0) = ders[0];
        let s = a0 / w0;
        let su = (ders[1].0 - s * ders[1].1) / w0;
        let sv = (ders[2].0 - s * ders[2].1) / w0;
        (ders[4].0 - su * ders[2].1 - sv * ders[1].1 - s * ders[4].1) / w0
    }
    fn vvder(&self, u: f64, v: f64) -> Vector3 {
        let ders = self.homogeneous_ders(u, v);
        let (a0, w0) = ders[0];
        let s = a0 / w0;
        let sv = (ders[2].0 - s * ders[2].1) / w0;
        (ders[5].0 - sv * (2.0 * ders[2].1) - s * ders[5].1) / w0
    }
}

impl BoundedSurface for NurbSurface {
    fn parameter_range(&self) -> Interval2D {
        let (u0, u1) = self.u_knots.parameter_range(self.u_degree);
        let (v0, v1) = self.v_knots.parameter_range(self.v_degree);
        Interval2D::new(Interval1D::new(u0, u1), Interval1D::new(v0, v1))
    }
}

impl Transformed for NurbSurface {
    fn transform_by(&mut self, trans: &Transform3) {
        self.control_points.iter_mut().flatten().for_each(|cp| {
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

    /// a quarter cylinder shell as a rational surface
    fn quarter_cylinder() -> NurbSurface {
        let w = f64::sqrt(0.5);
        let arc = [
            Vector4::new(1.0, 0.0, 0.0, 1.0),
            Vector4::new(w, w, 0.0, w),
            Vector4::new(0.0, 1.0, 0.0, 1.0),
        ];
        let rows: Vec<Vec<Vector4>> = (0..2)
            .map(|i| {
                arc.iter()
                    .map(|cp| Vector4::new(cp.x, cp.y, cp.w * i as f64, cp.w))
                    .collect()
            })
            .collect();
        NurbSurface::new(
            KnotVec::new(vec![0.0, 0.0, 1.0, 1.0]),
            KnotVec::new(vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]),
            rows,
        )
        .unwrap()
    }

    #[test]
    fn lies_on_cylinder() {
        let s = quarter_cylinder();
        for i in 0..=4 {
            for j in 0..=4 {
                let (u, v) = (i as f64 / 4.0, j as f64 / 4.0);
                let p = s.subs(u, v);
                assert_near!(f64::sqrt(p.x * p.x + p.y * p.y), 1.0);
            }
        }
    }

    #[test]
    fn derivatives_match_finite_difference() {
        let s = quarter_cylinder();
        let (u, v) = (0.4, 0.6);
        let h = 1.0e-6;
        let fd_u = (s.subs(u + h, v) - s.subs(u - h, v)) / (2.0 * h);
        let fd_v = (s.subs(u, v + h) - s.subs(u, v - h)) / (2.0 * h);
        assert!((s.uder(u, v) - fd_u).magnitude() < 1.0e-5);
        assert!((s.vder(u, v) - fd_v).magnitude() < 1.0e-5);
        let fd_vv = (s.vder(u, v + h) - s.vder(u, v - h)) / (2.0 * h);
        assert!((s.vvder(u, v) - fd_vv).magnitude() < 1.0e-4);
    }
}
