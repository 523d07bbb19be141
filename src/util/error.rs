//! Error types for faceverify.

use thiserror::Error;

/// Result alias for faceverify operations.
pub type FaceResult<T> = std::result::Result<T, FaceError>;

/// Errors that can occur while detecting, aligning, or embedding faces.
///
/// Geometry and suppression never produce errors; "no face found" is an empty
/// result, not a failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FaceError {
    /// Image or tensor dimensions are zero or overflow.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Row stride is smaller than the packed row length.
    #[error("invalid stride {stride} for row length {row_len}")]
    InvalidStride { row_len: usize, stride: usize },
    /// Backing buffer is shorter than the declared layout.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// A detector or alignment parameter is out of range.
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: &'static str },
    /// The inference engine did not produce a named output.
    #[error("missing network output `{name}`")]
    MissingOutput { name: String },
    /// A network output has fewer values than the stage reads.
    #[error("output `{name}` has {got} values, expected at least {expected}")]
    TensorShape {
        name: String,
        expected: usize,
        got: usize,
    },
    /// Landmarks have no usable spread for a similarity fit.
    #[error("degenerate landmarks: {reason}")]
    DegenerateLandmarks { reason: &'static str },
    /// A feature vector with zero L2 norm cannot be normalized.
    #[error("feature vector has zero norm")]
    ZeroNorm,
    /// Two feature vectors of different length were compared.
    #[error("dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },
    /// A model file pair could not be loaded by the inference backend.
    #[error("failed to load model {path}: {reason}")]
    ModelLoad { path: String, reason: String },
    /// Image decoding or encoding failed.
    #[error("image io: {reason}")]
    ImageIo { reason: String },
}
