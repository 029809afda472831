use thiserror::Error;

/// Error handler for [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Geometrical Errors
#[derive(Clone, Debug, PartialEq, Error)]
pub enum Error {
    /// The parameter lies outside a bounded, non-closed domain and the
    /// caller demanded strict containment.
    #[error("the parameter {0} is out of the domain [{1}, {2}]")]
    DomainError(f64, f64, f64),
    /// The knot vector consists of a single value.
    #[error("this knot vector consists of a single value")]
    ZeroRange,
    /// The knot vector must be longer than the control points.
    #[error("the knot vector must be longer than the control points.
the length of the knot vector: {0}
the number of control points: {1}")]
    TooShortKnotVector(usize, usize),
    /// Empty vectors of points cannot construct splines.
    #[error("the control points must not be empty")]
    EmptyControlPoints,
    /// The rows of a surface control net have differing lengths.
    #[error("the number of control points is irregular")]
    IrregularControlPoints,
    /// Hermite data arrays must agree in length, with at least two samples.
    #[error("hermite data requires matching parameter, point, and tangent arrays of length >= 2")]
    InvalidHermiteData,
    /// Interpolation through fewer than two points is not defined.
    #[error("at least two points are required, got {0}")]
    InsufficientPoints(usize),
}
