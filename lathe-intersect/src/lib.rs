//! The intersection engine: line/curve, line/surface, curve/surface, and
//! surface/surface intersectors, the Newton-and-walk tracer for surface
//! pairs, and ray firing over topology.

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

/// curve against surface and curve against curve
pub mod curve_surface;
/// Enumerates `Error`.
pub mod errors;
/// line against curve
pub mod line_curve;
/// line against surface
pub mod line_surface;
/// ray firing over bodies, volumes, faces, edges, and complexes
pub mod ray_fire;
/// surface against surface
pub mod surface_surface;
/// intersection hit types and ordering
pub mod types;
/// the surface pair walker
pub mod walker;

pub use curve_surface::{intersect_curve_and_plane, intersect_curve_and_surface, intersect_curves};
pub use errors::{Error, Result};
pub use line_curve::intersect_line_and_curve;
pub use line_surface::intersect_line_and_surface;
pub use ray_fire::{intersect_segment, point_in_volume, ray_fire};
pub use surface_surface::intersect_surfaces;
pub use types::{order_and_dedup, Hit, IntersectionKind, InterruptFlag};
pub use walker::{walk_from_to, zoom_in};
