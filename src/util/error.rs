//! Error types for the MBIR core.

use thiserror::Error;

/// Result alias for MBIR operations.
pub type MbirResult<T> = std::result::Result<T, MbirError>;

/// Errors that can occur when building geometry, matrices, or running ICD.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MbirError {
    /// A command-line argument was missing, malformed, or unrecognized.
    #[error("argument error: {reason}")]
    ArgumentError { reason: String },
    /// A parameter file was missing a required key or carried an out-of-range value.
    #[error("parameter error in {context}: {reason}")]
    ParameterError { context: String, reason: String },
    /// Dimensions were invalid (must be non-zero, or must fit the addressable index space).
    #[error("invalid dimensions: {reason}")]
    InvalidDimensions { reason: String },
    /// The requested index is out of bounds for a collection.
    #[error("index out of bounds: {context} index={index} len={len}")]
    IndexOutOfBounds {
        index: usize,
        len: usize,
        context: &'static str,
    },
    /// A system-matrix profile index fell outside `[0, LEN_PIX)` during column construction.
    ///
    /// This signals that the supplied geometry parameters are mutually inconsistent
    /// (e.g. `Deltaxy`/`DeltaChannel` too far apart for the profile table's resolution).
    /// `context` names the parameter-file basenames the geometry was built from, when
    /// the caller has that information (the matrix builder itself only sees in-memory
    /// geometry, not filenames, so it reports `"<unknown parameter source>"` and leaves
    /// filling in the real basename to [`MbirError::with_source_context`]).
    #[error("geometry inconsistency building column {column} (from {context}): {reason}")]
    GeometryInconsistency {
        column: usize,
        context: String,
        reason: String,
    },
    /// The curvature coefficient theta2 was non-positive for a voxel whose column and
    /// prior coefficients were both non-degenerate; this can only happen if the weights
    /// or geometry are malformed.
    #[error("numeric error at voxel {voxel}: {reason}")]
    NumericError { voxel: usize, reason: String },
    /// An I/O failure occurred while reading or writing a parameter, sinogram, image, or
    /// system-matrix file.
    #[error("io error reading/writing {path}: {reason}")]
    Io { path: String, reason: String },
}

impl MbirError {
    /// Builds an [`MbirError::Io`] from a path and the underlying I/O error.
    pub fn io(path: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    /// The placeholder context a [`MbirError::GeometryInconsistency`] carries
    /// when raised from code that only sees in-memory geometry, not the
    /// parameter-file basenames it was built from.
    pub const UNKNOWN_SOURCE: &'static str = "<unknown parameter source>";

    /// Fills in the parameter-file basenames a [`MbirError::GeometryInconsistency`]
    /// was built from, for callers (typically a CLI front end) that know them but
    /// weren't the ones that raised the error. No-op for every other variant.
    pub fn with_source_context(self, context: impl Into<String>) -> Self {
        match self {
            Self::GeometryInconsistency { column, reason, .. } => Self::GeometryInconsistency {
                column,
                context: context.into(),
                reason,
            },
            other => other,
        }
    }
}
