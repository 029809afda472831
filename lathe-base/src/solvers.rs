use crate::cgmath64::*;
use crate::tolerance::*;

/// Polishes a real root of the polynomial with coefficients
/// `coef[0] * x^n + ... + coef[n]` by a few Newton steps.
fn polish_root(coef: &[f64], mut x: f64) -> f64 {
    for _ in 0..3 {
        let mut p = 0.0;
        let mut dp = 0.0;
        for &c in coef {
            dp = dp * x + p;
            p = p * x + c;
        }
        if dp.so_small() {
            break;
        }
        let step = p / dp;
        x -= step;
        if step.so_small2() {
            break;
        }
    }
    x
}

/// Real roots of `a x^2 + b x + c = 0` in ascending order.
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> Vec<f64> {
    if a.so_small() {
        if b.so_small() {
            return Vec::new();
        }
        return vec![-c / b];
    }
    let disc = b * b - 4.0 * a * c;
    let scale = f64::max(b * b, f64::abs(4.0 * a * c));
    if disc < -ZERO * f64::max(scale, 1.0) {
        return Vec::new();
    }
    if disc <= ZERO * f64::max(scale, 1.0) {
        return vec![-b / (2.0 * a)];
    }
    // the numerically stable pairing
    let q = -0.5 * (b + f64::signum(b) * f64::sqrt(disc));
    let (mut x1, mut x2) = (q / a, c / q);
    if x2 < x1 {
        std::mem::swap(&mut x1, &mut x2);
    }
    vec![x1, x2]
}

/// Real roots of `a x^3 + b x^2 + c x + d = 0` in ascending order.
pub fn solve_cubic(a: f64, b: f64, c: f64, d: f64) -> Vec<f64> {
    if a.so_small() {
        return solve_quadratic(b, c, d);
    }
    let (b, c, d) = (b / a, c / a, d / a);
    // depressed cubic t^3 + p t + q with x = t - b/3
    let shift = b / 3.0;
    let p = c - b * b / 3.0;
    let q = 2.0 * b * b * b / 27.0 - b * c / 3.0 + d;
    let coef = [1.0, b, c, d];
    let mut roots = if p.so_small() && q.so_small() {
        vec![-shift]
    } else {
        let disc = q * q / 4.0 + p * p * p / 27.0;
        if disc > ZERO {
            let s = f64::sqrt(disc);
            let u = f64::cbrt(-q / 2.0 + s);
            let v = f64::cbrt(-q / 2.0 - s);
            vec![u + v - shift]
        } else if disc < -ZERO {
            // three real roots, trigonometric form
            let m = 2.0 * f64::sqrt(-p / 3.0);
            let theta = f64::acos(f64::clamp(3.0 * q / (p * m), -1.0, 1.0)) / 3.0;
            (0..3)
                .map(|k| m * f64::cos(theta - 2.0 * std::f64::consts::PI * k as f64 / 3.0) - shift)
                .collect()
        } else {
            let u = f64::cbrt(-q / 2.0);
            vec![2.0 * u - shift, -u - shift]
        }
    };
    roots = roots.into_iter().map(|r| polish_root(&coef, r)).collect();
    roots.sort_by(|x, y| x.partial_cmp(y).unwrap());
    roots.dedup_by(|x, y| near_equal(*x, *y, ZERO, true));
    roots
}

/// Real roots of `a x^4 + b x^3 + c x^2 + d x + e = 0` in ascending order,
/// by Ferrari's factorization into two quadratics.
pub fn solve_quartic(a: f64, b: f64, c: f64, d: f64, e: f64) -> Vec<f64> {
    if a.so_small() {
        return solve_cubic(b, c, d, e);
    }
    let (b, c, d, e) = (b / a, c / a, d / a, e / a);
    let coef = [1.0, b, c, d, e];
    // depressed quartic y^4 + p y^2 + q y + r with x = y - b/4
    let shift = b / 4.0;
    let b2 = b * b;
    let p = c - 3.0 * b2 / 8.0;
    let q = d - b * c / 2.0 + b2 * b / 8.0;
    let r = e - b * d / 4.0 + b2 * c / 16.0 - 3.0 * b2 * b2 / 256.0;
    let mut roots = Vec::with_capacity(4);
    if q.so_small() {
        // biquadratic
        for z in solve_quadratic(1.0, p, r) {
            if z > ZERO {
                let s = f64::sqrt(z);
                roots.push(s - shift);
                roots.push(-s - shift);
            } else if z > -ZERO {
                roots.push(-shift);
            }
        }
    } else {
        // resolvent cubic z^3 + 2 p z^2 + (p^2 - 4 r) z - q^2 = 0
        let zs = solve_cubic(1.0, 2.0 * p, p * p - 4.0 * r, -q * q);
        let z = zs.into_iter().fold(f64::NEG_INFINITY, f64::max);
        if z <= ZERO {
            return Vec::new();
        }
        let alpha = f64::sqrt(z);
        let beta = (p + z - q / alpha) / 2.0;
        let gamma = (p + z + q / alpha) / 2.0;
        for y in solve_quadratic(1.0, alpha, beta) {
            roots.push(y - shift);
        }
        for y in solve_quadratic(1.0, -alpha, gamma) {
            roots.push(y - shift);
        }
    }
    let mut roots: Vec<f64> = roots.into_iter().map(|x| polish_root(&coef, x)).collect();
    roots.sort_by(|x, y| x.partial_cmp(y).unwrap());
    roots.dedup_by(|x, y| near_equal(*x, *y, ZERO, true));
    roots
}

/// Solves the dense system `mat * x = rhs` by Gaussian elimination with
/// partial pivoting. `rhs` entries may be scalars or vectors.
pub fn solve_dense<V>(mut mat: Vec<Vec<f64>>, mut rhs: Vec<V>) -> Option<Vec<V>>
where
    V: VectorSpace<Scalar = f64> + Copy,
{
    let n = mat.len();
    for row in &mat {
        if row.len() != n {
            return None;
        }
    }
    for k in 0..n {
        let pivot = (k..n).max_by(|&i, &j| {
            f64::abs(mat[i][k]).partial_cmp(&f64::abs(mat[j][k])).unwrap()
        })?;
        if f64::abs(mat[pivot][k]) < ZERO {
            return None;
        }
        mat.swap(k, pivot);
        rhs.swap(k, pivot);
        for i in k + 1..n {
            let factor = mat[i][k] / mat[k][k];
            if factor == 0.0 {
                continue;
            }
            for j in k..n {
                mat[i][j] -= factor * mat[k][j];
            }
            let sub = rhs[k] * factor;
            rhs[i] = rhs[i] - sub;
        }
    }
    let mut x = rhs.clone();
    for k in (0..n).rev() {
        let mut acc = rhs[k];
        for j in k + 1..n {
            acc = acc - x[j] * mat[k][j];
        }
        x[k] = acc / mat[k][k];
    }
    Some(x)
}

/// Thomas algorithm for the tridiagonal system with sub-diagonal `a`,
/// diagonal `b`, super-diagonal `c`. The system must be diagonally dominant.
pub fn solve_tridiagonal<V>(a: &[f64], b: &[f64], c: &[f64], rhs: &[V]) -> Option<Vec<V>>
where
    V: VectorSpace<Scalar = f64> + Copy,
{
    let n = b.len();
    if a.len() != n || c.len() != n || rhs.len() != n || n == 0 {
        return None;
    }
    let mut cp = vec![0.0; n];
    let mut dp = rhs.to_vec();
    if b[0].so_small() {
        return None;
    }
    cp[0] = c[0] / b[0];
    dp[0] = rhs[0] / b[0];
    for i in 1..n {
        let m = b[i] - a[i] * cp[i - 1];
        if m.so_small() {
            return None;
        }
        cp[i] = c[i] / m;
        dp[i] = (rhs[i] - dp[i - 1] * a[i]) / m;
    }
    for i in (0..n - 1).rev() {
        let sub = dp[i + 1] * cp[i];
        dp[i] = dp[i] - sub;
    }
    Some(dp)
}

/// Least-squares plane of a point set: returns `(origin, x_axis, y_axis,
/// normal)` with the origin at the centroid. `None` when the points are
/// collinear or fewer than three.
pub fn least_squares_plane(points: &[Point3]) -> Option<(Point3, Vector3, Vector3, Vector3)> {
    if points.len() < 3 {
        return None;
    }
    let n = points.len() as f64;
    let centroid = points
        .iter()
        .fold(Vector3::zero(), |acc, p| acc + p.to_vec())
        / n;
    let mut cov = Matrix3::zero();
    for p in points {
        let d = p.to_vec() - centroid;
        cov = cov + Matrix3::from_cols(d * d.x, d * d.y, d * d.z);
    }
    let (vals, vecs) = jacobi_eigen(cov);
    // ascending eigenvalues: normal belongs to the smallest
    let mut order = [0, 1, 2];
    order.sort_by(|&i, &j| vals[i].partial_cmp(&vals[j]).unwrap());
    let normal = vecs[order[0]];
    let x_axis = vecs[order[2]];
    if vals[order[1]].so_small() {
        return None;
    }
    let y_axis = normal.cross(x_axis).normalize();
    Some((Point3::from_vec(centroid), x_axis, y_axis, normal))
}

/// Eigen-decomposition of a symmetric 3x3 matrix by cyclic Jacobi rotations.
/// Returns eigenvalues and unit eigenvectors, unordered.
fn jacobi_eigen(mut m: Matrix3) -> ([f64; 3], [Vector3; 3]) {
    let mut v = Matrix3::identity();
    for _ in 0..50 {
        let (mut p, mut q, mut off) = (0, 1, f64::abs(m[1][0]));
        if f64::abs(m[2][0]) > off {
            p = 0;
            q = 2;
            off = f64::abs(m[2][0]);
        }
        if f64::abs(m[2][1]) > off {
            p = 1;
            q = 2;
            off = f64::abs(m[2][1]);
        }
        if off < ZERO {
            break;
        }
        let app = m[p][p];
        let aqq = m[q][q];
        let apq = m[q][p];
        let theta = 0.5 * f64::atan2(2.0 * apq, aqq - app);
        let (s, c) = theta.sin_cos();
        let mut rot = Matrix3::identity();
        rot[p][p] = c;
        rot[q][q] = c;
        rot[q][p] = s;
        rot[p][q] = -s;
        m = rot.transpose() * m * rot;
        v = v * rot;
    }
    ([m[0][0], m[1][1], m[2][2]], [v[0], v[1], v[2]])
}

/// Coefficients `[a, b, c, d, e, f]` of the conic
/// `a x^2 + b xy + c y^2 + d x + e y + f = 0` through five points.
/// `None` when the points are degenerate.
pub fn conic_coefficients(points: &[Point2; 5]) -> Option<[f64; 6]> {
    // Solve the 5x6 homogeneous system for its null vector: eliminate with
    // partial pivoting, then back-substitute with the free column set to 1.
    let mut m: Vec<[f64; 6]> = points
        .iter()
        .map(|p| [p.x * p.x, p.x * p.y, p.y * p.y, p.x, p.y, 1.0])
        .collect();
    let mut pivot_col = [usize::MAX; 5];
    let mut row = 0;
    for col in 0..6 {
        if row == 5 {
            break;
        }
        let best = (row..5).max_by(|&i, &j| {
            f64::abs(m[i][col]).partial_cmp(&f64::abs(m[j][col])).unwrap()
        })?;
        if f64::abs(m[best][col]) < ZERO {
            continue;
        }
        m.swap(row, best);
        for i in 0..5 {
            if i != row {
                let factor = m[i][col] / m[row][col];
                for j in col..6 {
                    m[i][j] -= factor * m[row][j];
                }
            }
        }
        pivot_col[row] = col;
        row += 1;
    }
    if row < 5 {
        return None;
    }
    let free = (0..6).find(|c| !pivot_col.contains(c))?;
    let mut coef = [0.0; 6];
    coef[free] = 1.0;
    for r in 0..5 {
        let col = pivot_col[r];
        coef[col] = -m[r][free] / m[r][col];
    }
    // normalize so the largest coefficient is 1
    let scale = coef.iter().fold(0.0, |acc: f64, &c| acc.max(f64::abs(c)));
    coef.iter_mut().for_each(|c| *c /= scale);
    Some(coef)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quadratic_roots() {
        assert_eq!(solve_quadratic(1.0, -3.0, 2.0), vec![1.0, 2.0]);
        assert_eq!(solve_quadratic(1.0, 0.0, 1.0), Vec::<f64>::new());
        assert_eq!(solve_quadratic(0.0, 2.0, -4.0), vec![2.0]);
        let double = solve_quadratic(1.0, -2.0, 1.0);
        assert_eq!(double.len(), 1);
        assert!((double[0] - 1.0).abs() < 1.0e-10);
    }

    #[test]
    fn cubic_roots() {
        // (x - 1)(x - 2)(x - 3)
        let roots = solve_cubic(1.0, -6.0, 11.0, -6.0);
        assert_eq!(roots.len(), 3);
        for (r, e) in roots.iter().zip([1.0, 2.0, 3.0]) {
            assert!((r - e).abs() < 1.0e-9);
        }
        // single real root
        let roots = solve_cubic(1.0, 0.0, 0.0, -8.0);
        assert_eq!(roots.len(), 1);
        assert!((roots[0] - 2.0).abs() < 1.0e-9);
    }

    #[test]
    fn quartic_roots() {
        // (x^2 - 1)(x^2 - 4)
        let roots = solve_quartic(1.0, 0.0, -5.0, 0.0, 4.0);
        assert_eq!(roots.len(), 4);
        for (r, e) in roots.iter().zip([-2.0, -1.0, 1.0, 2.0]) {
            assert!((r - e).abs() < 1.0e-9);
        }
        // (x - 1)^2 (x + 2)(x + 3) with a double root
        let roots = solve_quartic(1.0, 3.0, -3.0, -7.0, 6.0);
        assert!(roots.iter().any(|r| (r - 1.0).abs() < 1.0e-6));
        assert!(roots.iter().any(|r| (r + 2.0).abs() < 1.0e-6));
        assert!(roots.iter().any(|r| (r + 3.0).abs() < 1.0e-6));
        // no real roots
        assert!(solve_quartic(1.0, 0.0, 2.0, 0.0, 1.0).is_empty());
    }

    #[test]
    fn dense_and_tridiagonal() {
        let mat = vec![vec![2.0, 1.0], vec![1.0, 3.0]];
        let x = solve_dense(mat, vec![Vector1::new(3.0), Vector1::new(4.0)]).unwrap();
        assert!((x[0].x - 1.0).abs() < 1.0e-12 && (x[1].x - 1.0).abs() < 1.0e-12);

        let x = solve_tridiagonal(
            &[0.0, 1.0, 1.0],
            &[4.0, 4.0, 4.0],
            &[1.0, 1.0, 0.0],
            &[Vector1::new(5.0), Vector1::new(6.0), Vector1::new(5.0)],
        )
        .unwrap();
        for v in x {
            assert!((v.x - 1.0).abs() < 1.0e-12);
        }
    }

    #[test]
    fn plane_fit() {
        let pts = [
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
        ];
        let (origin, _, _, normal) = least_squares_plane(&pts).unwrap();
        assert!((f64::abs(normal.z) - 1.0).abs() < 1.0e-9);
        assert!((origin.z - 1.0).abs() < 1.0e-12);
    }

    #[test]
    fn conic_through_circle_points() {
        // five points of the unit circle: x^2 + y^2 - 1 = 0
        let pts = [
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(-1.0, 0.0),
            Point2::new(0.0, -1.0),
            Point2::new(f64::sqrt(0.5), f64::sqrt(0.5)),
        ];
        let c = conic_coefficients(&pts).unwrap();
        // b, d, e vanish; a == c; f == -a
        assert!(c[1].abs() < 1.0e-9 && c[3].abs() < 1.0e-9 && c[4].abs() < 1.0e-9);
        assert!((c[0] - c[2]).abs() < 1.0e-9);
        assert!((c[0] + c[5]).abs() < 1.0e-9);
    }
}
