//! Error types for facing-direction computations.

use thiserror::Error;

/// Result type alias for facing operations.
pub type FacingResult<T> = Result<T, FacingError>;

/// Errors that can occur while computing facing directions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FacingError {
    /// A direction or mean had (near) zero length and cannot be normalized.
    ///
    /// Raised for coincident start and end points, and for averages whose
    /// inputs cancel out.
    #[error("cannot normalize a zero-length vector")]
    DegenerateVector,

    /// An average was requested over an empty set of vectors.
    #[error("cannot average an empty set of directions")]
    EmptyInput,

    /// No vertex lies within the proximity tolerance of the target.
    #[error("no vertices within {tolerance} of the target point")]
    NoSurroundingVertices {
        /// Tolerance that was used for the search.
        tolerance: f64,
    },

    /// No triangle centroid lies within the proximity tolerance of the target.
    #[error("no triangle centroids within {tolerance} of the target point")]
    NoSurroundingFaces {
        /// Tolerance that was used for the search.
        tolerance: f64,
    },

    /// Vertex normals are not parallel to vertex positions.
    #[error("mesh has {positions} vertex positions but {normals} vertex normals")]
    MeshMismatch {
        /// Number of vertex positions.
        positions: usize,
        /// Number of vertex normals.
        normals: usize,
    },

    /// A triangle references a vertex that does not exist.
    #[error("triangle {face} references vertex {index}, but mesh has {vertex_count} vertices")]
    IndexOutOfBounds {
        /// Triangle index.
        face: usize,
        /// Offending vertex index.
        index: u32,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// Invalid parameters.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
}

impl FacingError {
    /// Create an invalid params error.
    #[must_use]
    pub fn invalid_params(details: impl Into<String>) -> Self {
        Self::InvalidParams(details.into())
    }

    /// Whether this error comes from averaging an empty set.
    ///
    /// True for [`FacingError::EmptyInput`] and for the mesh aggregate's
    /// "nothing within tolerance" variants.
    #[must_use]
    pub const fn is_empty_input(&self) -> bool {
        matches!(
            self,
            Self::EmptyInput | Self::NoSurroundingVertices { .. } | Self::NoSurroundingFaces { .. }
        )
    }
}
