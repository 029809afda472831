use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};

/// knot vector
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct KnotVec(Vec<f64>);

impl KnotVec {
    /// Creates a knot vector, sorting the values.
    pub fn new(mut knots: Vec<f64>) -> Self {
        knots.sort_by(|a, b| a.partial_cmp(b).unwrap());
        Self(knots)
    }

    /// the length of the knot vector
    #[inline(always)]
    pub fn len(&self) -> usize { self.0.len() }

    /// whether the knot vector is empty
    #[inline(always)]
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// the knots as a slice
    #[inline(always)]
    pub fn as_slice(&self) -> &[f64] { &self.0 }

    /// the front knot
    #[inline(always)]
    pub fn front(&self) -> f64 { self.0[0] }

    /// the back knot
    #[inline(always)]
    pub fn back(&self) -> f64 { self.0[self.0.len() - 1] }

    /// The parameter range `[k[degree], k[len - degree - 1]]` of a spline
    /// of the given degree over this knot vector.
    #[inline]
    pub fn parameter_range(&self, degree: usize) -> (f64, f64) {
        (self.0[degree], self.0[self.0.len() - degree - 1])
    }

    /// Clamped knot vector `[0, .., 0, 1, .., n, max, .., max]` for `n`
    /// control points of the given degree, uniformly spaced interior knots.
    pub fn clamped_uniform(n: usize, degree: usize) -> Self {
        let interior = n - degree - 1;
        let max = (interior + 1) as f64;
        let mut knots = vec![0.0; degree + 1];
        knots.extend((1..=interior).map(|i| i as f64));
        knots.extend(std::iter::repeat(max).take(degree + 1));
        Self(knots)
    }

    /// Clamped knot vector over the given interior parameters: parameter
    /// averaging as in spline interpolation.
    pub fn from_interpolation_params(params: &[f64], degree: usize) -> Self {
        let n = params.len();
        let mut knots = vec![params[0]; degree + 1];
        for i in 1..n - degree {
            let avg = params[i..i + degree].iter().sum::<f64>() / degree as f64;
            knots.push(avg);
        }
        knots.extend(std::iter::repeat(params[n - 1]).take(degree + 1));
        Self(knots)
    }

    /// Validates the pairing of this knot vector with `n` control points of
    /// the given degree.
    pub fn check_spline(&self, n: usize, degree: usize) -> Result<()> {
        if n == 0 {
            return Err(Error::EmptyControlPoints);
        }
        if self.len() != n + degree + 1 {
            return Err(Error::TooShortKnotVector(self.len(), n));
        }
        if (self.back() - self.front()).abs() < lathe_base::tolerance::ZERO {
            return Err(Error::ZeroRange);
        }
        Ok(())
    }

    /// The knot span index `i` with `k[i] <= t < k[i+1]`, clamped into
    /// `[degree, n - 1]` for `n` control points.
    pub fn span(&self, degree: usize, n: usize, t: f64) -> usize {
        if t >= self.0[n] {
            return n - 1;
        }
        if t <= self.0[degree] {
            return degree;
        }
        let mut low = degree;
        let mut high = n;
        while high - low > 1 {
            let mid = (low + high) / 2;
            if t < self.0[mid] {
                high = mid;
            } else {
                low = mid;
            }
        }
        low
    }

    /// The `degree + 1` nonzero B-spline basis functions
    /// `N[span-degree..=span]` at `t`, by the Cox-de Boor recursion.
    pub fn basis_functions(&self, degree: usize, span: usize, t: f64) -> Vec<f64> {
        let mut funcs = vec![0.0; degree + 1];
        let mut left = vec![0.0; degree + 1];
        let mut right = vec![0.0; degree + 1];
        funcs[0] = 1.0;
        for j in 1..=degree {
            left[j] = t - self.0[span + 1 - j];
            right[j] = self.0[span + j] - t;
            let mut saved = 0.0;
            for r in 0..j {
                let denom = right[r + 1] + left[j - r];
                let temp = match denom.abs() < lathe_base::tolerance::ZERO {
                    true => 0.0,
                    false => funcs[r] / denom,
                };
                funcs[r] = saved + right[r + 1] * temp;
                saved = left[j - r] * temp;
            }
            funcs[j] = saved;
        }
        funcs
    }

    /// The nonzero basis functions and their derivatives up to order
    /// `nders` at `t`. `result[k][j]` is the `k`-th derivative of
    /// `N[span-degree+j]`.
    pub fn basis_ders(&self, degree: usize, span: usize, t: f64, nders: usize) -> Vec<Vec<f64>> {
        let k = &self.0;
        let mut ndu = vec![vec![0.0; degree + 1]; degree + 1];
        let mut left = vec![0.0; degree + 1];
        let mut right = vec![0.0; degree + 1];
        ndu[0][0] = 1.0;
        for j in 1..=degree {
            left[j] = t - k[span + 1 - j];
            right[j] = k[span + j] - t;
            let mut saved = 0.0;
            for r in 0..j {
                ndu[j][r] = right[r + 1] + left[j - r];
                let temp = match ndu[j][r].abs() < lathe_base::tolerance::ZERO {
                    true => 0.0,
                    false => ndu[r][j - 1] / ndu[j][r],
                };
                ndu[r][j] = saved + right[r + 1] * temp;
                saved = left[j - r] * temp;
            }
            ndu[j][j] = saved;
        }
        let nders = usize::min(nders, degree);
        let mut ders = vec![vec![0.0; degree + 1]; nders + 1];
        for j in 0..=degree {
            ders[0][j] = ndu[j][degree];
        }
        let mut a = vec![vec![0.0; degree + 1]; 2];
        for r in 0..=degree {
            let (mut s1, mut s2) = (0, 1);
            a[0][0] = 1.0;
            for kk in 1..=nders {
                let mut d = 0.0;
                let rk = r as isize - kk as isize;
                let pk = degree - kk;
                if r >= kk {
                    a[s2][0] = match ndu[pk + 1][rk as usize].abs() < lathe_base::tolerance::ZERO {
                        true => 0.0,
                        false => a[s1][0] / ndu[pk + 1][rk as usize],
                    };
                    d = a[s2][0] * ndu[rk as usize][pk];
                }
                let j1 = if rk >= -1 { 1 } else { (-rk) as usize };
                let j2 = if r as isize - 1 <= pk as isize { kk - 1 } else { degree - r };
                for j in j1..=j2 {
                    let denom = ndu[pk + 1][(rk + j as isize) as usize];
                    a[s2][j] = match denom.abs() < lathe_base::tolerance::ZERO {
                        true => 0.0,
                        false => (a[s1][j] - a[s1][j - 1]) / denom,
                    };
                    d += a[s2][j] * ndu[(rk + j as isize) as usize][pk];
                }
                if r <= pk {
                    a[s2][kk] = match ndu[pk + 1][r].abs() < lathe_base::tolerance::ZERO {
                        true => 0.0,
                        false => -a[s1][kk - 1] / ndu[pk + 1][r],
                    };
                    d += a[s2][kk] * ndu[r][pk];
                }
                ders[kk][r] = d;
                std::mem::swap(&mut s1, &mut s2);
            }
        }
        let mut factor = degree as f64;
        for kk in 1..=nders {
            for j in 0..=degree {
                ders[kk][j] *= factor;
            }
            factor *= (degree - kk) as f64;
        }
        ders
    }
}

impl From<Vec<f64>> for KnotVec {
    fn from(knots: Vec<f64>) -> Self { Self::new(knots) }
}

impl AsRef<[f64]> for KnotVec {
    fn as_ref(&self) -> &[f64] { &self.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_of_unity() {
        let kv = KnotVec::new(vec![0.0, 0.0, 0.0, 0.0, 0.3, 0.5, 0.5, 0.8, 1.0, 1.0, 1.0, 1.0]);
        let degree = 3;
        let n = kv.len() - degree - 1;
        for i in 0..=20 {
            let t = i as f64 / 20.0;
            let span = kv.span(degree, n, t);
            let basis = kv.basis_functions(degree, span, t);
            let sum: f64 = basis.iter().sum();
            assert!((sum - 1.0).abs() < 1.0e-12, "t = {t}, sum = {sum}");
        }
    }

    #[test]
    fn derivative_matches_finite_difference() {
        let kv = KnotVec::new(vec![0.0, 0.0, 0.0, 0.5, 1.0, 1.0, 1.0]);
        let degree = 2;
        let n = kv.len() - degree - 1;
        let t = 0.3;
        let h = 1.0e-7;
        let span = kv.span(degree, n, t);
        let ders = kv.basis_ders(degree, span, t, 1);
        let below = kv.basis_functions(degree, kv.span(degree, n, t - h), t - h);
        let above = kv.basis_functions(degree, kv.span(degree, n, t + h), t + h);
        for j in 0..=degree {
            let fd = (above[j] - below[j]) / (2.0 * h);
            assert!((ders[1][j] - fd).abs() < 1.0e-5, "j = {j}");
        }
    }

    #[test]
    fn clamped_uniform_ranges() {
        let kv = KnotVec::clamped_uniform(6, 3);
        assert_eq!(kv.len(), 10);
        assert_eq!(kv.parameter_range(3), (0.0, 3.0));
        assert!(kv.check_spline(6, 3).is_ok());
        assert!(kv.check_spline(0, 3).is_err());
    }
}
