//! Implementation of Newton method

use crate::{cgmath64::*, tolerance::*};
use std::ops::{Mul, Sub};

/// the value and jacobian corresponding to parameter
#[derive(Clone, Debug)]
pub struct CalcOutput<V, M> {
    /// the value of function
    pub value: V,
    /// the jacobian of function
    pub derivation: M,
}

/// jacobian of function
pub trait Jacobian<V>: Mul<V, Output = V> + Sized {
    #[doc(hidden)]
    fn invert(self) -> Option<Self>;
}

impl Jacobian<f64> for f64 {
    #[inline(always)]
    fn invert(self) -> Option<Self> {
        match self.is_zero() {
            true => None,
            false => Some(1.0 / self),
        }
    }
}

impl Jacobian<Vector2> for Matrix2 {
    #[inline(always)]
    fn invert(self) -> Option<Self> { SquareMatrix::invert(&self) }
}

impl Jacobian<Vector3> for Matrix3 {
    #[inline(always)]
    fn invert(self) -> Option<Self> { SquareMatrix::invert(&self) }
}

/// Solve equation by Newton's method
/// # Examples
/// ```
/// use lathe_base::{newton::*, assert_near2};
///
/// let function = |x: f64| CalcOutput {
///     value: x * x - 2.0,
///     derivation: 2.0 * x,
/// };
/// let sqrt2 = solve(function, 1.0, 10).unwrap();
/// assert_near2!(sqrt2, f64::sqrt(2.0));
/// ```
pub fn solve<V, M>(
    function: impl Fn(V) -> CalcOutput<V, M>,
    mut hint: V,
    trials: usize,
) -> Option<V>
where
    V: Sub<Output = V> + Copy + Tolerance,
    M: Jacobian<V>,
{
    for _ in 0..=trials {
        let CalcOutput { value, derivation } = function(hint);
        let inv = derivation.invert()?;
        let next = hint - inv * value;
        if next.near2(&hint) {
            return Some(next);
        }
        hint = next;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_newton() {
        let function = |x: f64| CalcOutput {
            value: x * x - 2.0,
            derivation: 2.0 * x,
        };
        let sqrt2 = solve(function, 1.0, 10).unwrap();
        assert!((sqrt2 - f64::sqrt(2.0)).abs() < 1.0e-10);
    }

    #[test]
    fn vector_newton() {
        // x^2 + y^2 = 1, x = y
        let function = |v: Vector2| CalcOutput {
            value: Vector2::new(v.x * v.x + v.y * v.y - 1.0, v.x - v.y),
            derivation: Matrix2::new(2.0 * v.x, 1.0, 2.0 * v.y, -1.0),
        };
        let sol = solve(function, Vector2::new(1.0, 0.5), 20).unwrap();
        let r = 1.0 / f64::sqrt(2.0);
        assert!((sol.x - r).abs() < 1.0e-10 && (sol.y - r).abs() < 1.0e-10);
    }
}
