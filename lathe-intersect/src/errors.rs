use thiserror::Error;

/// Error handler for [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Intersection errors
#[derive(Clone, Debug, PartialEq, Error)]
pub enum Error {
    /// A closed-form routine met a configuration its return type cannot
    /// carry and had nothing sensible to return.
    #[error("degenerate geometric configuration: {0}")]
    GeometryDegenerate(String),
    /// The pair is outside the closed-form dispatch table and the walker
    /// declines it as well.
    #[error("intersection not implemented: {0}")]
    NotImplemented(String),
    /// User cancellation observed between outer iterations.
    #[error("interrupted")]
    Interrupted,
    /// The underlying topology is broken.
    #[error(transparent)]
    Topology(#[from] lathe_topology::Error),
    /// The facetor failed while preparing containment data.
    #[error(transparent)]
    Facet(#[from] lathe_meshalgo::Error),
}
