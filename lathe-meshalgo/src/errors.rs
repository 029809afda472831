use thiserror::Error;

/// Error handler for [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Facetting errors
#[derive(Clone, Debug, PartialEq, Error)]
pub enum Error {
    /// The boundary loops handed to the triangulator are not valid
    /// polygons. User topology is not repaired.
    #[error("inconsistent boundary polygons: {0}")]
    InconsistentPolygons(String),
    /// User cancellation observed between facetting stages.
    #[error("interrupted")]
    Interrupted,
    /// The underlying topology is broken.
    #[error(transparent)]
    Topology(#[from] lathe_topology::Error),
}
