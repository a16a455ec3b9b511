use thiserror::Error;

/// Errors raised by the comparison and congruence entry points.
///
/// A mismatch between two geometries is never an error: it is reported as a
/// non-empty difference list or a `false` verdict.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompareError {
    /// The xy tolerance is negative or not finite, or the z tolerance is
    /// negative or infinite. A NaN z tolerance is valid and disables Z.
    #[error("invalid tolerance (xy = {xy}, z = {z}): xy must be finite and >= 0, z must be >= 0 or NaN")]
    InvalidTolerance { xy: f64, z: f64 },

    /// The congruence tolerance factor is negative or not finite.
    #[error("invalid tolerance factor {0}: must be finite and >= 0")]
    InvalidToleranceFactor(f64),

    /// The geometry has no vertex representation, or is ill-formed for its kind.
    #[error("unsupported geometry kind: {0}")]
    UnsupportedGeometryKind(String),

    /// A vertex has a NaN or infinite X or Y coordinate.
    #[error("non-finite coordinate at part {part}, vertex {index}")]
    NonFiniteCoordinate { part: usize, index: usize },
}

pub type Result<T, E = CompareError> = std::result::Result<T, E>;
