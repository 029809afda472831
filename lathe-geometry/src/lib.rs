//! Parametric geometry: every curve and surface kind of the kernel, with
//! evaluation, inversion, curvature, iso-parameter lines, and transforms.

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

use lathe_base::cgmath64::*;

/// Curve kinds and the `Curve` enum
pub mod curves;
/// Enumerates `Error`.
pub mod errors;
/// knot vectors
pub mod knot;
/// Surface kinds and the `Surface` enum
pub mod surfaces;
/// Similarity transforms
pub mod transform;

/// An arbitrary unit vector orthogonal to `v`.
pub fn orthogonal(v: Vector3) -> Vector3 {
    let cand = match v.x.abs() < 0.5 {
        true => Vector3::new(1.0, 0.0, 0.0),
        false => Vector3::new(0.0, 1.0, 0.0),
    };
    (cand - v * cand.dot(v)).normalize()
}

/// re-exports the whole crate and the base prelude
pub mod prelude {
    pub use crate::curves::*;
    pub use crate::errors::{Error as GeometryError, Result as GeometryResult};
    pub use crate::knot::KnotVec;
    pub use crate::orthogonal;
    pub use crate::surfaces::*;
    pub use crate::transform::{Transform3, Transformed};
    pub use lathe_base::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::*;
    use lathe_base::prelude::*;

    #[test]
    fn orthogonal_is_orthogonal() {
        for v in [
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.3, -0.8, 0.52),
        ] {
            let o = orthogonal(v.normalize());
            assert!(o.dot(v).so_small());
            assert!((o.magnitude() - 1.0).abs() < 1.0e-12);
        }
    }
}
