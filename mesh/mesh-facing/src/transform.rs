//! Object-to-world mappings supplied by the host scene.

use nalgebra::{Isometry3, Matrix3, Matrix4, Point3, Similarity3, Vector3};

/// Maps object-space geometry into world space.
///
/// The host scene implements this for whatever transform representation it
/// keeps. Implementations are provided for the common nalgebra types and
/// for plain closures via [`FnTransform`].
pub trait ObjectToWorld {
    /// Transform an object-space position to world space.
    fn transform_point(&self, point: &Point3<f64>) -> Point3<f64>;

    /// Transform an object-space direction to world space (no translation).
    fn transform_vector(&self, vector: &Vector3<f64>) -> Vector3<f64>;

    /// Transform an object-space surface normal to world space.
    ///
    /// Normals map through the inverse transpose of the linear part, so they
    /// stay perpendicular to the surface under non-uniform scale and shear.
    /// The result is not renormalized. The default recovers the linear part
    /// from [`transform_vector`](Self::transform_vector) on the basis axes,
    /// which is exact for affine maps. A singular linear part leaves the
    /// normal unchanged.
    fn transform_normal(&self, normal: &Vector3<f64>) -> Vector3<f64> {
        let linear = Matrix3::from_columns(&[
            self.transform_vector(&Vector3::x()),
            self.transform_vector(&Vector3::y()),
            self.transform_vector(&Vector3::z()),
        ]);
        inverse_transpose_mul(linear, normal)
    }
}

fn inverse_transpose_mul(linear: Matrix3<f64>, normal: &Vector3<f64>) -> Vector3<f64> {
    linear
        .try_inverse()
        .map_or(*normal, |inv| inv.transpose() * normal)
}

/// Object space is world space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentityTransform;

impl ObjectToWorld for IdentityTransform {
    #[inline]
    fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        *point
    }

    #[inline]
    fn transform_vector(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        *vector
    }

    #[inline]
    fn transform_normal(&self, normal: &Vector3<f64>) -> Vector3<f64> {
        *normal
    }
}

impl ObjectToWorld for Isometry3<f64> {
    fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        Isometry3::transform_point(self, point)
    }

    fn transform_vector(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        Isometry3::transform_vector(self, vector)
    }

    fn transform_normal(&self, normal: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * normal
    }
}

impl ObjectToWorld for Similarity3<f64> {
    fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        Similarity3::transform_point(self, point)
    }

    fn transform_vector(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        Similarity3::transform_vector(self, vector)
    }

    // Uniform scale only changes length, except a negative factor flips.
    fn transform_normal(&self, normal: &Vector3<f64>) -> Vector3<f64> {
        self.isometry.rotation * normal * self.scaling().signum()
    }
}

/// Homogeneous 4x4 matrix, as kept by most scene graphs.
impl ObjectToWorld for Matrix4<f64> {
    fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        Matrix4::transform_point(self, point)
    }

    fn transform_vector(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        Matrix4::transform_vector(self, vector)
    }

    fn transform_normal(&self, normal: &Vector3<f64>) -> Vector3<f64> {
        inverse_transpose_mul(self.fixed_view::<3, 3>(0, 0).into_owned(), normal)
    }
}

impl<T: ObjectToWorld + ?Sized> ObjectToWorld for &T {
    fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        (**self).transform_point(point)
    }

    fn transform_vector(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        (**self).transform_vector(vector)
    }

    fn transform_normal(&self, normal: &Vector3<f64>) -> Vector3<f64> {
        (**self).transform_normal(normal)
    }
}

/// Adapter turning a point-mapping closure into an [`ObjectToWorld`].
///
/// Vectors are mapped as the difference of two mapped points, which is
/// exact for affine maps.
///
/// # Example
///
/// ```
/// use mesh_facing::{FnTransform, ObjectToWorld, Point3, Vector3};
///
/// let shift = FnTransform::new(|p: &Point3<f64>| p + Vector3::new(0.0, 0.0, 10.0));
/// assert!((shift.transform_point(&Point3::origin()).z - 10.0).abs() < 1e-12);
/// assert!(shift.transform_vector(&Vector3::x()).z.abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FnTransform<F>(F);

impl<F> FnTransform<F>
where
    F: Fn(&Point3<f64>) -> Point3<f64>,
{
    /// Wrap a point-mapping closure.
    pub const fn new(map: F) -> Self {
        Self(map)
    }
}

impl<F> ObjectToWorld for FnTransform<F>
where
    F: Fn(&Point3<f64>) -> Point3<f64>,
{
    fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        (self.0)(point)
    }

    fn transform_vector(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        let origin = (self.0)(&Point3::origin());
        (self.0)(&Point3::from(*vector)) - origin
    }
}
