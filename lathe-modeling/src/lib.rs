//! Primitive construction and model queries: canonical bodies assembled
//! over prefabricated geometry, spline interpolation, exact areas and
//! volumes, containment, and proximity searches.

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

/// Enumerates `Error`.
pub mod errors;
/// spline interpolation through points
pub mod interpolate;
/// canonical body construction
pub mod primitive;
/// model queries: area, volume, containment, proximity
pub mod query;

pub use errors::{Error, Result};
pub use interpolate::{create_nub_curve, create_nub_curve_with_end_vectors};
pub use primitive::{
    create_block, create_complex, create_cone, create_cylinder, create_disk, create_edge,
    create_edge_between, create_edge_from_points, create_point_body, create_revolve,
    create_sheet_body, create_sphere, create_torus, create_wire_body, faces_of_body,
};
pub use query::{
    curve_inverse, evaluate_curve, evaluate_surface, find_area, find_close_edges,
    find_close_faces, find_similar_faces, find_volume, get_edge_facets, get_face_triangles,
    point_in_entity, surface_inverse, VolumeMethod,
};
