use crate::cgmath64::*;
use cgmath::AbsDiffEq;
use std::fmt::Debug;

/// the tightness for near-equality on normalized quantities
pub const ZERO: f64 = 1.0e-12;

/// general tolerance: the default intersection and snap tolerance
pub const TOLERANCE: f64 = 1.0e-6;

/// general tolerance of square order
pub const TOLERANCE2: f64 = TOLERANCE * TOLERANCE;

/// chord-fit fraction for seed sampling and refinement
pub const FIT: f64 = 1.0e-3;

/// square-order fit bound used by hermite refinement
pub const FIT_SMALL: f64 = 1.0e-9;

/// a large number standing in for an unbounded parameter
pub const MAX_VALUE: f64 = 1.0e12;

/// Defines a tolerance in the whole package
pub trait Tolerance: AbsDiffEq<Epsilon = f64> + Debug {
    /// The "distance" is less than `TOLERANCE`.
    fn near(&self, other: &Self) -> bool { self.abs_diff_eq(other, TOLERANCE) }

    /// The "distance" is less than `TOLERANCE2`.
    fn near2(&self, other: &Self) -> bool { self.abs_diff_eq(other, TOLERANCE2) }

    /// The "distance" is less than the given tolerance.
    fn near_tol(&self, other: &Self, tol: f64) -> bool { self.abs_diff_eq(other, tol) }
}

impl<T: AbsDiffEq<Epsilon = f64> + Debug> Tolerance for T {}

/// The structs defined the origin. `f64`, `Vector`, and so on.
pub trait Origin: Tolerance + Zero {
    /// near origin
    #[inline(always)]
    fn so_small(&self) -> bool { self.near(&Self::zero()) }

    /// near origin in square order
    #[inline(always)]
    fn so_small2(&self) -> bool { self.near2(&Self::zero()) }
}

impl<T: Tolerance + Zero> Origin for T {}

/// Asserts that `left.near(&right)` (using `Tolerance`).
#[macro_export]
macro_rules! assert_near {
    ($left: expr, $right: expr $(,)?) => {{
        let (left, right) = ($left, $right);
        assert!(
            $crate::tolerance::Tolerance::near(&left, &right),
            "assertion failed: `left` is near `right`\nleft: {left:?},\nright: {right:?}",
        )
    }};
    ($left: expr, $right: expr, $($arg: tt)+) => {{
        let (left, right) = ($left, $right);
        assert!(
            $crate::tolerance::Tolerance::near(&left, &right),
            "assertion failed: `left` is near `right`\nleft: {left:?},\nright: {right:?}: {}",
            format_args!($($arg)+),
        )
    }};
}

/// Asserts that `left.near2(&right)` (using `Tolerance`).
#[macro_export]
macro_rules! assert_near2 {
    ($left: expr, $right: expr $(,)?) => {{
        let (left, right) = ($left, $right);
        assert!(
            $crate::tolerance::Tolerance::near2(&left, &right),
            "assertion failed: `left` is near `right`\nleft: {left:?},\nright: {right:?}",
        )
    }};
    ($left: expr, $right: expr, $($arg: tt)+) => {{
        let (left, right) = ($left, $right);
        assert!(
            $crate::tolerance::Tolerance::near2(&left, &right),
            "assertion failed: `left` is near `right`\nleft: {left:?},\nright: {right:?}: {}",
            format_args!($($arg)+),
        )
    }};
}

/// Near-equality with an explicit tolerance, relative when `relative` is set.
#[inline]
pub fn near_equal(a: f64, b: f64, tol: f64, relative: bool) -> bool {
    match relative {
        true => {
            let scale = f64::max(f64::abs(a), f64::abs(b));
            f64::abs(a - b) <= tol * f64::max(scale, 1.0)
        }
        false => f64::abs(a - b) <= tol,
    }
}

/// `atan2` that tolerates both arguments vanishing.
#[inline]
pub fn safe_atan2(y: f64, x: f64) -> f64 {
    match y.so_small() && x.so_small() {
        true => 0.0,
        false => f64::atan2(y, x),
    }
}

#[test]
#[should_panic]
fn assert_near_without_msg() { assert_near!(1.0, 2.0) }

#[test]
fn near_equal_relative() {
    assert!(near_equal(1.0e6, 1.0e6 + 0.5, 1.0e-6, true));
    assert!(!near_equal(1.0e6, 1.0e6 + 0.5, 1.0e-6, false));
    assert_eq!(safe_atan2(0.0, 0.0), 0.0);
}
