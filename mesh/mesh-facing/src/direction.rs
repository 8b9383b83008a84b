//! Unit directions and the two leaf operations everything else builds on.

use nalgebra::{Point3, Unit, Vector3};

use crate::error::{FacingError, FacingResult};

/// Vectors no longer than this are treated as having no direction.
pub const DEGENERATE_LENGTH: f64 = 1e-10;

/// A unit-length direction in 3D space.
///
/// Positions are [`Point3`]; directions are `Direction3`. The two cannot be
/// mixed up at call sites, and every `Direction3` is guaranteed to have
/// unit length.
///
/// # Example
///
/// ```
/// use mesh_facing::{Direction3, Vector3};
///
/// let d = Direction3::new(Vector3::new(0.0, 3.0, 4.0)).unwrap();
/// assert!((d.y() - 0.6).abs() < 1e-12);
/// assert!((d.as_vector().norm() - 1.0).abs() < 1e-12);
///
/// assert!(Direction3::new(Vector3::zeros()).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Direction3(Unit<Vector3<f64>>);

impl Direction3 {
    /// Normalize `vector` into a direction.
    ///
    /// # Errors
    ///
    /// Returns [`FacingError::DegenerateVector`] if the vector is shorter than
    /// [`DEGENERATE_LENGTH`] or has non-finite components.
    pub fn new(vector: Vector3<f64>) -> FacingResult<Self> {
        if !vector.iter().all(|c| c.is_finite()) {
            return Err(FacingError::DegenerateVector);
        }
        if !vector.norm().is_finite() {
            // Squared length overflowed; bring the largest component to 1.
            return Ok(Self(Unit::new_normalize(vector / vector.amax())));
        }
        Unit::try_new(vector, DEGENERATE_LENGTH)
            .map(Self)
            .ok_or(FacingError::DegenerateVector)
    }

    /// Wrap an already-normalized nalgebra unit vector.
    #[inline]
    #[must_use]
    pub const fn from_unit(unit: Unit<Vector3<f64>>) -> Self {
        Self(unit)
    }

    /// The +X axis.
    #[must_use]
    pub fn x_axis() -> Self {
        Self(Vector3::x_axis())
    }

    /// The +Y axis.
    #[must_use]
    pub fn y_axis() -> Self {
        Self(Vector3::y_axis())
    }

    /// The +Z axis.
    #[must_use]
    pub fn z_axis() -> Self {
        Self(Vector3::z_axis())
    }

    /// X component.
    #[inline]
    #[must_use]
    pub fn x(&self) -> f64 {
        self.0.x
    }

    /// Y component.
    #[inline]
    #[must_use]
    pub fn y(&self) -> f64 {
        self.0.y
    }

    /// Z component.
    #[inline]
    #[must_use]
    pub fn z(&self) -> f64 {
        self.0.z
    }

    /// Borrow the underlying unit-length vector.
    #[inline]
    #[must_use]
    pub fn as_vector(&self) -> &Vector3<f64> {
        self.0.as_ref()
    }

    /// Return the underlying unit-length vector.
    #[inline]
    #[must_use]
    pub fn into_vector(self) -> Vector3<f64> {
        self.0.into_inner()
    }

    /// Return the nalgebra unit vector, for use with rotation constructors.
    #[inline]
    #[must_use]
    pub const fn into_unit(self) -> Unit<Vector3<f64>> {
        self.0
    }

    /// Dot product with another direction (cosine of the angle between them).
    #[inline]
    #[must_use]
    pub fn dot(&self, other: &Self) -> f64 {
        self.0.dot(other.as_vector())
    }

    /// Angle to another direction in radians.
    #[must_use]
    pub fn angle(&self, other: &Self) -> f64 {
        self.0.angle(other.as_vector())
    }
}

impl std::ops::Neg for Direction3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl From<Direction3> for Vector3<f64> {
    fn from(direction: Direction3) -> Self {
        direction.into_vector()
    }
}

impl From<Direction3> for Unit<Vector3<f64>> {
    fn from(direction: Direction3) -> Self {
        direction.into_unit()
    }
}

/// Unit direction pointing from `start` toward `end`.
///
/// # Errors
///
/// Returns [`FacingError::DegenerateVector`] when the points coincide.
///
/// # Example
///
/// ```
/// use mesh_facing::{direction_to_point, Point3};
///
/// let d = direction_to_point(&Point3::origin(), &Point3::new(0.0, 0.0, 5.0)).unwrap();
/// assert!((d.z() - 1.0).abs() < 1e-12);
/// ```
pub fn direction_to_point(start: &Point3<f64>, end: &Point3<f64>) -> FacingResult<Direction3> {
    Direction3::new(end - start)
}

/// Mean of `directions`, renormalized to unit length.
///
/// Inputs are summed as given, without weighting by magnitude. For unit
/// inputs this is the normalized chord mean, a close approximation of the
/// spherical mean that is exact for uniform input and independent of
/// input order.
///
/// # Errors
///
/// - [`FacingError::EmptyInput`] if `directions` yields nothing.
/// - [`FacingError::DegenerateVector`] if the inputs cancel out, for
///   example two opposite unit vectors.
///
/// # Example
///
/// ```
/// use mesh_facing::{average_direction, Vector3};
///
/// let avg = average_direction([Vector3::x(), Vector3::y()]).unwrap();
/// let expected = std::f64::consts::FRAC_1_SQRT_2;
/// assert!((avg.x() - expected).abs() < 1e-12);
/// assert!((avg.y() - expected).abs() < 1e-12);
///
/// assert!(average_direction(Vec::<Vector3<f64>>::new()).is_err());
/// ```
#[allow(clippy::cast_precision_loss)]
pub fn average_direction<I>(directions: I) -> FacingResult<Direction3>
where
    I: IntoIterator,
    I::Item: Into<Vector3<f64>>,
{
    let mut sum = Vector3::zeros();
    let mut count = 0usize;
    for direction in directions {
        sum += direction.into();
        count += 1;
    }

    if count == 0 {
        return Err(FacingError::EmptyInput);
    }

    Direction3::new(sum / count as f64)
}
