use thiserror::Error;

/// Error handler for [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Modeling errors
#[derive(Clone, Debug, PartialEq, Error)]
pub enum Error {
    /// Not enough data was given to the construction.
    #[error("insufficient data: {0}")]
    InsufficientData(String),
    /// The underlying geometry construction failed.
    #[error(transparent)]
    Geometry(#[from] lathe_geometry::errors::Error),
    /// The underlying topology is broken.
    #[error(transparent)]
    Topology(#[from] lathe_topology::Error),
    /// The facetor failed.
    #[error(transparent)]
    Facet(#[from] lathe_meshalgo::Error),
    /// An intersection collaborator failed.
    #[error(transparent)]
    Intersect(#[from] lathe_intersect::Error),
}
