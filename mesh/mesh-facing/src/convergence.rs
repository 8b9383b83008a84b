//! Convergence blending: bias a straight-line approach toward a structural
//! feature of the target.

use nalgebra::{Point3, Vector3};

use crate::direction::{Direction3, average_direction, direction_to_point};
use crate::error::FacingResult;

/// Sign of `value` as -1, 0 or +1.
///
/// Unlike [`f64::signum`], zero (of either sign) maps to zero.
fn axis_sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Octant-corner marker for a direction: the per-axis sign pattern.
///
/// Each component is -1, 0 or +1. The marker is not normalized; it only
/// tags which cuboid corner (or edge, or face, when components are zero)
/// the direction heads toward.
///
/// # Example
///
/// ```
/// use mesh_facing::{cuboid_marker, Direction3, Vector3};
///
/// let d = Direction3::new(Vector3::new(2.0, 3.0, -1.0)).unwrap();
/// assert_eq!(cuboid_marker(&d), Vector3::new(1.0, 1.0, -1.0));
/// ```
#[must_use]
pub fn cuboid_marker(direction: &Direction3) -> Vector3<f64> {
    direction.as_vector().map(axis_sign)
}

/// Blend the direction from `start` to `end` with the cuboid corner it
/// points toward.
///
/// Computes the primary direction, derives its [`cuboid_marker`], and
/// returns the average of the two. The result leans toward the nearest
/// box corner (or edge/face when the primary direction has zero
/// components), which suits docking against box-like targets.
///
/// # Errors
///
/// Returns [`FacingError::DegenerateVector`](crate::FacingError::DegenerateVector)
/// when `start == end`.
///
/// # Example
///
/// ```
/// use mesh_facing::{cuboid_convergence, Point3};
///
/// let result = cuboid_convergence(&Point3::origin(), &Point3::new(2.0, 3.0, -1.0)).unwrap();
/// assert!(result.x() > 0.0 && result.y() > 0.0 && result.z() < 0.0);
/// ```
pub fn cuboid_convergence(start: &Point3<f64>, end: &Point3<f64>) -> FacingResult<Direction3> {
    let primary = direction_to_point(start, end)?;
    let convergence = cuboid_marker(&primary);
    average_direction([primary.into_vector(), convergence])
}

/// Blend the direction from `start` to `end` with the average of
/// `surrounding` directions.
///
/// Generalizes [`cuboid_convergence`]: the convergence direction comes from
/// the caller, typically nearby vertex or face normals.
///
/// # Errors
///
/// - [`FacingError::DegenerateVector`](crate::FacingError::DegenerateVector)
///   when `start == end`, or when an average cancels out.
/// - [`FacingError::EmptyInput`](crate::FacingError::EmptyInput) when
///   `surrounding` is empty.
///
/// # Example
///
/// ```
/// use mesh_facing::{vertex_convergence, Point3, Vector3};
///
/// let result = vertex_convergence(
///     &Point3::origin(),
///     &Point3::new(1.0, 0.0, 0.0),
///     [Vector3::y(), Vector3::y()],
/// )
/// .unwrap();
/// let h = std::f64::consts::FRAC_1_SQRT_2;
/// assert!((result.x() - h).abs() < 1e-12);
/// assert!((result.y() - h).abs() < 1e-12);
/// ```
pub fn vertex_convergence<I>(
    start: &Point3<f64>,
    end: &Point3<f64>,
    surrounding: I,
) -> FacingResult<Direction3>
where
    I: IntoIterator,
    I::Item: Into<Vector3<f64>>,
{
    let primary = direction_to_point(start, end)?;
    let surround = average_direction(surrounding)?;
    average_direction([primary, surround])
}
