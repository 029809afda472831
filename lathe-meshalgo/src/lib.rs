//! The facetor: turns curves, edges, and faces into consistent polylines
//! and triangle meshes, respecting seams, singularities, and loop
//! orientation, with Delaunay flipping and curvature-driven refinement.

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

/// Delaunay edge flipping
pub mod delaunay;
/// Enumerates `Error`.
pub mod errors;
/// curve polylines
pub mod facet_curve;
/// edge polylines with seam and normal splits
pub mod facet_edge;
/// face tessellation
pub mod facet_face;
/// boundary loop assembly in parameter space
pub mod loops;
/// facet options
pub mod options;
mod refine;
/// polygon triangulation with holes
pub mod triangulate;

pub use errors::{Error, Result};
pub use facet_curve::facet_curve;
pub use facet_edge::facet_edge;
pub use facet_face::{facet_face, point_in_face};
pub use options::FacetOptions;
pub use triangulate::{build_adjacencies, triangulate_polygon, NO_NEIGHBOR};
