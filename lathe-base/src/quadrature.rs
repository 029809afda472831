//! Gauss-Legendre quadrature on intervals and uv rectangles.

/// 8-point Gauss-Legendre nodes on `[-1, 1]`.
const GAUSS8_X: [f64; 8] = [
    -0.960_289_856_497_536_2,
    -0.796_666_477_413_626_7,
    -0.525_532_409_916_329,
    -0.183_434_642_495_649_8,
    0.183_434_642_495_649_8,
    0.525_532_409_916_329,
    0.796_666_477_413_626_7,
    0.960_289_856_497_536_2,
];

/// 8-point Gauss-Legendre weights.
const GAUSS8_W: [f64; 8] = [
    0.101_228_536_290_376_26,
    0.222_381_034_453_374_47,
    0.313_706_645_877_887_2,
    0.362_683_783_378_362,
    0.362_683_783_378_362,
    0.313_706_645_877_887_2,
    0.222_381_034_453_374_47,
    0.101_228_536_290_376_26,
];

/// Fixed 8-point Gauss-Legendre rule on `[a, b]`.
pub fn gauss8(f: &impl Fn(f64) -> f64, a: f64, b: f64) -> f64 {
    let mid = (a + b) * 0.5;
    let half = (b - a) * 0.5;
    GAUSS8_X
        .iter()
        .zip(GAUSS8_W)
        .map(|(&x, w)| w * f(mid + half * x))
        .sum::<f64>()
        * half
}

/// Adaptive quadrature: bisects until the whole-interval estimate agrees
/// with the sum of the halves to `tol`, with a recursion depth cap.
pub fn integrate(f: &impl Fn(f64) -> f64, a: f64, b: f64, tol: f64) -> f64 {
    fn go(f: &impl Fn(f64) -> f64, a: f64, b: f64, whole: f64, tol: f64, depth: usize) -> f64 {
        let mid = (a + b) * 0.5;
        let left = gauss8(f, a, mid);
        let right = gauss8(f, mid, b);
        if depth == 0 || f64::abs(left + right - whole) <= tol {
            return left + right;
        }
        go(f, a, mid, left, tol * 0.5, depth - 1) + go(f, mid, b, right, tol * 0.5, depth - 1)
    }
    go(f, a, b, gauss8(f, a, b), tol, 20)
}

/// Fixed tensor-product Gauss rule on a uv rectangle.
pub fn gauss8_2d(f: &impl Fn(f64, f64) -> f64, urange: (f64, f64), vrange: (f64, f64)) -> f64 {
    gauss8(
        &|u| gauss8(&|v| f(u, v), vrange.0, vrange.1),
        urange.0,
        urange.1,
    )
}

/// Adaptive tensor quadrature on a uv rectangle: quadtree subdivision until
/// the four quadrants agree with the whole to `tol`.
pub fn integrate_2d(
    f: &impl Fn(f64, f64) -> f64,
    urange: (f64, f64),
    vrange: (f64, f64),
    tol: f64,
) -> f64 {
    fn go(
        f: &impl Fn(f64, f64) -> f64,
        ur: (f64, f64),
        vr: (f64, f64),
        whole: f64,
        tol: f64,
        depth: usize,
    ) -> f64 {
        let um = (ur.0 + ur.1) * 0.5;
        let vm = (vr.0 + vr.1) * 0.5;
        let quads = [
            ((ur.0, um), (vr.0, vm)),
            ((um, ur.1), (vr.0, vm)),
            ((ur.0, um), (vm, vr.1)),
            ((um, ur.1), (vm, vr.1)),
        ];
        let parts: Vec<f64> = quads.iter().map(|&(u, v)| gauss8_2d(f, u, v)).collect();
        let sum: f64 = parts.iter().sum();
        if depth == 0 || f64::abs(sum - whole) <= tol {
            return sum;
        }
        quads
            .iter()
            .zip(parts)
            .map(|(&(u, v), p)| go(f, u, v, p, tol * 0.25, depth - 1))
            .sum()
    }
    go(f, urange, vrange, gauss8_2d(f, urange, vrange), tol, 10)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn polynomial_exact() {
        // order 8 is exact up to degree 15
        let f = |x: f64| x * x * x - 2.0 * x + 1.0;
        assert!((gauss8(&f, 0.0, 2.0) - 2.0).abs() < 1.0e-12);
    }

    #[test]
    fn adaptive_sine() {
        let v = integrate(&f64::sin, 0.0, PI, 1.0e-12);
        assert!((v - 2.0).abs() < 1.0e-10);
    }

    #[test]
    fn adaptive_2d() {
        // area of the unit square under z = x*y
        let v = integrate_2d(&|x, y| x * y, (0.0, 1.0), (0.0, 1.0), 1.0e-12);
        assert!((v - 0.25).abs() < 1.0e-10);
        // sphere area by direct integration of the jacobian r^2 cos(v)
        let r: f64 = 2.0;
        let a = integrate_2d(
            &|_, v: f64| r * r * f64::cos(v),
            (0.0, 2.0 * PI),
            (-PI / 2.0, PI / 2.0),
            1.0e-10,
        );
        assert!((a - 4.0 * PI * r * r).abs() < 1.0e-6);
    }
}
