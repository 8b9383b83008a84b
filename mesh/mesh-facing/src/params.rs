//! Parameters for surface-aware facing queries.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{FacingError, FacingResult};

/// Default world-space radius within which geometry counts as surrounding
/// the target point.
pub const DEFAULT_PROXIMITY_TOLERANCE: f64 = 0.1;

/// Coordinate space in which surrounding normals are averaged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NormalSpace {
    /// Average normals as stored on the mesh.
    #[default]
    Object,
    /// Map normals through the object-to-world transform before averaging.
    World,
}

/// Parameters for [`surface_aggregate`](crate::surface_aggregate) and
/// [`SurfaceIndex`](crate::SurfaceIndex).
///
/// # Example
///
/// ```
/// use mesh_facing::{FacingParams, NormalSpace};
///
/// let params = FacingParams::default();
/// assert!((params.proximity_tolerance - 0.1).abs() < 1e-12);
/// assert_eq!(params.normal_space, NormalSpace::Object);
///
/// let coarse = FacingParams::for_scale(10.0);
/// assert!((coarse.proximity_tolerance - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FacingParams {
    /// World-space distance below which a vertex or triangle centroid
    /// surrounds the target. The comparison is strict.
    pub proximity_tolerance: f64,

    /// Space in which normals are averaged.
    pub normal_space: NormalSpace,
}

impl Default for FacingParams {
    fn default() -> Self {
        Self {
            proximity_tolerance: DEFAULT_PROXIMITY_TOLERANCE,
            normal_space: NormalSpace::Object,
        }
    }
}

impl FacingParams {
    /// Create params with a custom proximity tolerance.
    #[must_use]
    pub const fn with_tolerance(proximity_tolerance: f64) -> Self {
        Self {
            proximity_tolerance,
            normal_space: NormalSpace::Object,
        }
    }

    /// Scale the default tolerance to a mesh whose unit is `scale` times
    /// larger than the reference scene unit.
    #[must_use]
    pub fn for_scale(scale: f64) -> Self {
        Self::with_tolerance(DEFAULT_PROXIMITY_TOLERANCE * scale)
    }

    /// Set the proximity tolerance.
    #[must_use]
    pub const fn proximity_tolerance(mut self, tolerance: f64) -> Self {
        self.proximity_tolerance = tolerance;
        self
    }

    /// Set the normal averaging space.
    #[must_use]
    pub const fn normal_space(mut self, space: NormalSpace) -> Self {
        self.normal_space = space;
        self
    }

    /// Check the parameters.
    ///
    /// # Errors
    ///
    /// [`FacingError::InvalidParams`] if the tolerance is not a positive,
    /// finite number.
    pub fn validate(&self) -> FacingResult<()> {
        if !self.proximity_tolerance.is_finite() || self.proximity_tolerance <= 0.0 {
            return Err(FacingError::invalid_params(format!(
                "proximity tolerance must be positive and finite, got {}",
                self.proximity_tolerance
            )));
        }
        Ok(())
    }
}
