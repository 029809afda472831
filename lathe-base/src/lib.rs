//! Basic structs and traits: importing cgmath, tolerance, intervals,
//! polynomial and linear solvers, quadrature, point ordering, and the box tree.

#![cfg_attr(not(debug_assertions), deny(warnings))]
#![deny(clippy::all, rust_2018_idioms)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications
)]

/// Defines bounding boxes and parameter intervals
pub mod bounding_box;
/// Redefines vectors, matrices or points with scalar = f64.
pub mod cgmath64;
/// Curve and surface traits
pub mod geom_traits;
/// Deterministic hash jitter
pub mod hash;
/// Newton's method helpers
pub mod newton;
/// Point ordering: lexicographic and Morton
pub mod order;
/// 1D and 2D Gauss-Legendre quadrature
pub mod quadrature;
/// Segments in 2 and 3 dimensions
pub mod segment;
/// Polynomial and linear solvers
pub mod solvers;
/// Setting Tolerance
pub mod tolerance;
/// Axis-aligned bounding box tree
pub mod box_tree;

/// re-exports the whole crate
pub mod prelude {
    pub use crate::bounding_box::*;
    pub use crate::cgmath64::*;
    pub use crate::geom_traits::*;
    pub use crate::segment::*;
    pub use crate::tolerance::*;
    pub use crate::{assert_near, assert_near2};
}
