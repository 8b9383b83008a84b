//! Mesh-surface aggregation: the direction to a target plus the averaged
//! normals of the geometry surrounding it.
//!
//! Every vertex and every triangle centroid is tested against the target by
//! brute force, so a query costs O(V + T). For repeated queries against the
//! same snapshot see [`SurfaceIndex`](crate::SurfaceIndex).

use nalgebra::{Point3, Vector3};
use tracing::{debug, warn};

use crate::direction::{DEGENERATE_LENGTH, Direction3, average_direction, direction_to_point};
use crate::error::{FacingError, FacingResult};
use crate::mesh::{MeshSource, validate_mesh};
use crate::params::{FacingParams, NormalSpace};
use crate::transform::ObjectToWorld;

/// Result of a mesh-surface query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceAggregate {
    /// Direction from the start point to the target.
    pub direction: Direction3,
    /// Average normal of the vertices surrounding the target.
    pub average_vertex_normal: Direction3,
    /// Average normal of the triangles whose centroid surrounds the target.
    pub average_face_normal: Direction3,
    /// Number of vertices within the tolerance.
    pub vertices_matched: usize,
    /// Number of triangle centroids within the tolerance.
    pub faces_matched: usize,
}

/// Resolve the corners of triangle `face`, reporting bad indices.
pub(crate) fn triangle_corners(
    positions: &[Point3<f64>],
    face: usize,
    triangle: [u32; 3],
) -> FacingResult<[Point3<f64>; 3]> {
    let corner = |index: u32| {
        positions
            .get(index as usize)
            .copied()
            .ok_or(FacingError::IndexOutOfBounds {
                face,
                index,
                vertex_count: positions.len(),
            })
    };
    Ok([corner(triangle[0])?, corner(triangle[1])?, corner(triangle[2])?])
}

/// Unit normal of a triangle by the right-hand rule, or zero if degenerate.
#[must_use]
pub fn face_normal(corners: &[Point3<f64>; 3]) -> Vector3<f64> {
    let [a, b, c] = corners;
    (b - a)
        .cross(&(c - a))
        .try_normalize(DEGENERATE_LENGTH)
        .unwrap_or_else(Vector3::zeros)
}

/// Centroid of a triangle.
#[must_use]
pub fn centroid(corners: &[Point3<f64>; 3]) -> Point3<f64> {
    let [a, b, c] = corners;
    Point3::from((a.coords + b.coords + c.coords) / 3.0)
}

/// Object-space unit normal of every triangle, in triangle order.
///
/// Degenerate (zero-area) triangles get the zero vector, so they contribute
/// nothing when summed into an average. The output always has one entry
/// per triangle.
///
/// # Errors
///
/// [`FacingError::IndexOutOfBounds`] if a triangle names a missing vertex.
///
/// # Example
///
/// ```
/// use mesh_facing::{face_normals, unit_cube};
///
/// let normals = face_normals(&unit_cube()).unwrap();
/// assert_eq!(normals.len(), 12);
/// // Right face (x = 1) is the last pair of triangles.
/// assert!((normals[10].x - 1.0).abs() < 1e-12);
/// ```
pub fn face_normals<M: MeshSource + ?Sized>(mesh: &M) -> FacingResult<Vec<Vector3<f64>>> {
    let positions = mesh.positions();
    let normals = mesh
        .triangles()
        .iter()
        .enumerate()
        .map(|(face, &triangle)| triangle_corners(positions, face, triangle).map(|c| face_normal(&c)))
        .collect::<FacingResult<Vec<_>>>()?;

    let degenerate = normals.iter().filter(|n| n.norm_squared() < f64::EPSILON).count();
    if degenerate > 0 {
        debug!(degenerate, faces = normals.len(), "Mesh has degenerate triangles");
    }

    Ok(normals)
}

/// World-space center of the mesh's axis-aligned bounds.
///
/// Hosts usually get this from their renderer; this is the equivalent for
/// callers that only have the mesh and its transform. Returns `None` for a
/// mesh without vertices.
///
/// # Example
///
/// ```
/// use mesh_facing::{unit_cube, world_bounds_center, IdentityTransform};
///
/// let center = world_bounds_center(&unit_cube(), &IdentityTransform).unwrap();
/// assert!((center.x - 0.5).abs() < 1e-12);
/// ```
#[must_use]
pub fn world_bounds_center<M, T>(mesh: &M, transform: &T) -> Option<Point3<f64>>
where
    M: MeshSource + ?Sized,
    T: ObjectToWorld + ?Sized,
{
    let mut points = mesh.positions().iter().map(|p| transform.transform_point(p));
    let first = points.next()?;
    let (min, max) = points.fold((first, first), |(min, max), p| (min.inf(&p), max.sup(&p)));
    Some(nalgebra::center(&min, &max))
}

/// Map a normal into the averaging space.
///
/// World-space normals are renormalized so scale in the transform does not
/// weight the average; a normal that collapses becomes zero.
pub(crate) fn in_space<T: ObjectToWorld + ?Sized>(
    normal: &Vector3<f64>,
    space: NormalSpace,
    transform: &T,
) -> Vector3<f64> {
    match space {
        NormalSpace::Object => *normal,
        NormalSpace::World => transform
            .transform_normal(normal)
            .try_normalize(DEGENERATE_LENGTH)
            .unwrap_or_else(Vector3::zeros),
    }
}

/// Build the final aggregate from the matched normals.
///
/// Both averages are computed before the direction, and an empty set is
/// reported with the variant naming which set was empty.
pub(crate) fn blend_matches(
    start: &Point3<f64>,
    target: &Point3<f64>,
    tolerance: f64,
    vertex_normals: &[Vector3<f64>],
    face_normals: &[Vector3<f64>],
) -> FacingResult<SurfaceAggregate> {
    debug!(
        vertices = vertex_normals.len(),
        faces = face_normals.len(),
        tolerance,
        "Matched surrounding geometry"
    );

    if vertex_normals.is_empty() {
        warn!(tolerance, "No vertices surround the target point");
        return Err(FacingError::NoSurroundingVertices { tolerance });
    }
    if face_normals.is_empty() {
        warn!(tolerance, "No triangle centroids surround the target point");
        return Err(FacingError::NoSurroundingFaces { tolerance });
    }

    let average_vertex_normal = average_direction(vertex_normals.iter().copied())?;
    let average_face_normal = average_direction(face_normals.iter().copied())?;

    Ok(SurfaceAggregate {
        direction: direction_to_point(start, target)?,
        average_vertex_normal,
        average_face_normal,
        vertices_matched: vertex_normals.len(),
        faces_matched: face_normals.len(),
    })
}

/// Direction from `start` to `target`, plus the averaged normals of the
/// mesh geometry surrounding `target`.
///
/// `target` is the world-space point the caller orients toward, usually the
/// center of the mesh's rendered bounds (see [`world_bounds_center`]).
///
/// A vertex surrounds the target when its world position lies strictly
/// closer than `params.proximity_tolerance`; a triangle surrounds it when
/// its world-space centroid does. Face normals come from the object-space
/// corners. Normals are averaged in object space unless
/// [`NormalSpace::World`] is selected, in which case they are mapped with
/// [`ObjectToWorld::transform_normal`] and renormalized, which keeps them
/// perpendicular to the world surface under non-uniform scale.
///
/// # Errors
///
/// - [`FacingError::InvalidParams`] for a non-positive tolerance.
/// - [`FacingError::MeshMismatch`] / [`FacingError::IndexOutOfBounds`] for a
///   malformed mesh.
/// - [`FacingError::NoSurroundingVertices`] / [`FacingError::NoSurroundingFaces`]
///   when nothing lies within the tolerance. This is common when the
///   tolerance does not match the mesh scale.
/// - [`FacingError::DegenerateVector`] when `start == target` or the
///   surrounding normals cancel out.
///
/// # Example
///
/// ```
/// use mesh_facing::{surface_aggregate, unit_cube, FacingParams, IdentityTransform, Point3};
///
/// let cube = unit_cube();
/// // A point just outside the +X face, with a tolerance that reaches its
/// // four corners but no others.
/// let target = Point3::new(1.5, 0.5, 0.5);
/// let params = FacingParams::with_tolerance(0.9);
///
/// let result = surface_aggregate(
///     &Point3::new(0.5, 0.5, 0.5),
///     &target,
///     &cube,
///     &IdentityTransform,
///     &params,
/// )
/// .unwrap();
///
/// assert_eq!(result.vertices_matched, 4);
/// assert_eq!(result.faces_matched, 2);
/// assert!((result.average_vertex_normal.x() - 1.0).abs() < 1e-12);
/// assert!((result.average_face_normal.x() - 1.0).abs() < 1e-12);
/// ```
pub fn surface_aggregate<M, T>(
    start: &Point3<f64>,
    target: &Point3<f64>,
    mesh: &M,
    transform: &T,
    params: &FacingParams,
) -> FacingResult<SurfaceAggregate>
where
    M: MeshSource + ?Sized,
    T: ObjectToWorld + ?Sized,
{
    params.validate()?;
    validate_mesh(mesh)?;

    let tolerance = params.proximity_tolerance;
    let positions = mesh.positions();
    let normals = face_normals(mesh)?;

    let surrounding_vertex_normals: Vec<Vector3<f64>> = positions
        .iter()
        .zip(mesh.normals())
        .filter(|(position, _)| {
            nalgebra::distance(&transform.transform_point(position), target) < tolerance
        })
        .map(|(_, normal)| in_space(normal, params.normal_space, transform))
        .collect();

    let mut surrounding_face_normals = Vec::new();
    for (face, (&triangle, normal)) in mesh.triangles().iter().zip(&normals).enumerate() {
        let corners = triangle_corners(positions, face, triangle)?;
        let world_centroid = transform.transform_point(&centroid(&corners));
        if nalgebra::distance(&world_centroid, target) < tolerance {
            surrounding_face_normals.push(in_space(normal, params.normal_space, transform));
        }
    }

    blend_matches(
        start,
        target,
        tolerance,
        &surrounding_vertex_normals,
        &surrounding_face_normals,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mesh::{MeshSnapshot, unit_cube};
    use crate::transform::{FnTransform, IdentityTransform};
    use approx::assert_relative_eq;
    use nalgebra::{Isometry3, Matrix4, Similarity3, Translation3, UnitQuaternion};
    use std::f64::consts::FRAC_PI_2;

    fn plus_x_query() -> (Point3<f64>, Point3<f64>, FacingParams) {
        (
            Point3::new(0.5, 0.5, 0.5),
            Point3::new(1.5, 0.5, 0.5),
            FacingParams::with_tolerance(0.9),
        )
    }

    #[test]
    fn test_face_normals_one_per_triangle() {
        let cube = unit_cube();
        let normals = face_normals(&cube).unwrap();
        assert_eq!(normals.len(), cube.face_count());

        let expected = [
            -Vector3::z(),
            Vector3::z(),
            -Vector3::y(),
            Vector3::y(),
            -Vector3::x(),
            Vector3::x(),
        ];
        for (i, n) in normals.iter().enumerate() {
            assert_relative_eq!(*n, expected[i / 2], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_degenerate_triangle_has_zero_normal() {
        let mesh = MeshSnapshot::new(
            vec![
                Point3::origin(),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
            ],
            vec![Vector3::z(); 3],
            vec![[0, 1, 2]],
        )
        .unwrap();
        let normals = face_normals(&mesh).unwrap();
        assert_eq!(normals, vec![Vector3::zeros()]);
    }

    #[test]
    fn test_cube_face_isolated() {
        let cube = unit_cube();
        let (start, target, params) = plus_x_query();
        let result = surface_aggregate(&start, &target, &cube, &IdentityTransform, &params).unwrap();

        assert_eq!(result.vertices_matched, 4);
        assert_eq!(result.faces_matched, 2);
        assert_relative_eq!(result.direction.into_vector(), Vector3::x(), epsilon = 1e-12);
        assert_relative_eq!(
            result.average_vertex_normal.into_vector(),
            Vector3::x(),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            result.average_face_normal.into_vector(),
            Vector3::x(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_default_tolerance_on_small_cube() {
        // A cube of side 0.1 centered on the origin, queried at a corner.
        let cube = unit_cube();
        let small = MeshSnapshot::new(
            cube.positions()
                .iter()
                .map(|p| Point3::from((p.coords - Vector3::repeat(0.5)) * 0.1))
                .collect(),
            cube.normals().to_vec(),
            cube.triangles().to_vec(),
        )
        .unwrap();

        let corner = Point3::new(0.05, 0.05, 0.05);
        let result = surface_aggregate(
            &Point3::origin(),
            &corner,
            &small,
            &IdentityTransform,
            &FacingParams::default(),
        )
        .unwrap();

        // Edge neighbours sit exactly 0.1 away and fail the strict test.
        assert_eq!(result.vertices_matched, 1);
        // Both triangles of each of the three faces meeting at the corner.
        assert_eq!(result.faces_matched, 6);

        let diagonal = Vector3::repeat(1.0).normalize();
        assert_relative_eq!(
            result.average_vertex_normal.into_vector(),
            diagonal,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            result.average_face_normal.into_vector(),
            diagonal,
            epsilon = 1e-12
        );
        assert_relative_eq!(result.direction.into_vector(), diagonal, epsilon = 1e-12);
    }

    #[test]
    fn test_no_surrounding_vertices() {
        let cube = unit_cube();
        let center = Point3::new(0.5, 0.5, 0.5);
        let err = surface_aggregate(
            &Point3::new(5.0, 0.0, 0.0),
            &center,
            &cube,
            &IdentityTransform,
            &FacingParams::default(),
        )
        .unwrap_err();
        assert_eq!(err, FacingError::NoSurroundingVertices { tolerance: 0.1 });
        assert!(err.is_empty_input());
    }

    #[test]
    fn test_no_surrounding_faces() {
        // Near a vertex but far from every centroid.
        let cube = unit_cube();
        let err = surface_aggregate(
            &Point3::new(5.0, 5.0, 5.0),
            &Point3::new(1.0, 1.0, 1.0),
            &cube,
            &IdentityTransform,
            &FacingParams::default(),
        )
        .unwrap_err();
        assert_eq!(err, FacingError::NoSurroundingFaces { tolerance: 0.1 });
    }

    #[test]
    fn test_translated_mesh_uses_world_space() {
        let cube = unit_cube();
        let offset = Vector3::new(10.0, -3.0, 2.0);
        let iso = Isometry3::from_parts(Translation3::from(offset), UnitQuaternion::identity());
        let (start, target, params) = plus_x_query();
        let world_target = target + offset;

        let result =
            surface_aggregate(&(start + offset), &world_target, &cube, &iso, &params).unwrap();
        assert_eq!(result.vertices_matched, 4);
        assert_relative_eq!(
            result.average_face_normal.into_vector(),
            Vector3::x(),
            epsilon = 1e-12
        );

        // Without the transform the target is far from everything.
        let miss = surface_aggregate(&start, &world_target, &cube, &IdentityTransform, &params);
        assert!(miss.unwrap_err().is_empty_input());
    }

    #[test]
    fn test_rotated_mesh_normal_space() {
        let cube = unit_cube();
        let rotation = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2);
        let iso = Isometry3::from_parts(Translation3::identity(), rotation);
        // Object +X face ends up facing world +Y.
        let target = Point3::new(-0.5, 1.5, 0.5);
        let start = Point3::new(-0.5, 0.5, 0.5);

        let object = surface_aggregate(&start, &target, &cube, &iso, &FacingParams::with_tolerance(0.9))
            .unwrap();
        assert_relative_eq!(
            object.average_face_normal.into_vector(),
            Vector3::x(),
            epsilon = 1e-12
        );

        let params = FacingParams::with_tolerance(0.9).normal_space(NormalSpace::World);
        let world = surface_aggregate(&start, &target, &cube, &iso, &params).unwrap();
        assert_relative_eq!(
            world.average_face_normal.into_vector(),
            Vector3::y(),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            world.average_vertex_normal.into_vector(),
            Vector3::y(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_world_normals_under_nonuniform_scale() {
        // Right triangle in the plane x + y = 1, tilted toward +X and +Y.
        let mesh = MeshSnapshot::new(
            vec![
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(1.0, 0.0, 1.0),
            ],
            vec![Vector3::new(1.0, 1.0, 0.0).normalize(); 3],
            vec![[0, 1, 2]],
        )
        .unwrap();
        let stretch = Matrix4::new_nonuniform_scaling(&Vector3::new(1.0, 4.0, 1.0));
        let world: Vec<Point3<f64>> = mesh
            .positions()
            .iter()
            .map(|p| ObjectToWorld::transform_point(&stretch, p))
            .collect();
        let world_edge = world[1] - world[0];
        let world_face = face_normal(&[world[0], world[1], world[2]]);

        let target = centroid(&[world[0], world[1], world[2]]);
        let params = FacingParams::with_tolerance(5.0).normal_space(NormalSpace::World);
        let result =
            surface_aggregate(&Point3::new(5.0, 5.0, 0.5), &target, &mesh, &stretch, &params)
                .unwrap();

        let faces = result.average_face_normal.into_vector();
        let vertices = result.average_vertex_normal.into_vector();
        assert_relative_eq!(faces.dot(&world_edge), 0.0, epsilon = 1e-12);
        assert_relative_eq!(vertices.dot(&world_edge), 0.0, epsilon = 1e-12);
        assert_relative_eq!(faces, world_face, epsilon = 1e-12);
        assert_relative_eq!(vertices, world_face, epsilon = 1e-12);
    }

    #[test]
    fn test_scaled_transform_closure() {
        let cube = unit_cube();
        let doubled = FnTransform::new(|p: &Point3<f64>| Point3::from(p.coords * 2.0));
        let sim = Similarity3::from_scaling(2.0);
        let target = Point3::new(3.0, 1.0, 1.0);
        let params = FacingParams::with_tolerance(1.8);

        let a = surface_aggregate(&Point3::origin(), &target, &cube, &doubled, &params).unwrap();
        let b = surface_aggregate(&Point3::origin(), &target, &cube, &sim, &params).unwrap();
        assert_eq!(a.vertices_matched, 4);
        assert_eq!(a.vertices_matched, b.vertices_matched);
        assert_eq!(a.faces_matched, b.faces_matched);
        assert_relative_eq!(
            a.average_vertex_normal.into_vector(),
            b.average_vertex_normal.into_vector(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_start_equals_target() {
        let cube = unit_cube();
        let (_, target, params) = plus_x_query();
        let err = surface_aggregate(&target, &target, &cube, &IdentityTransform, &params);
        assert_eq!(err, Err(FacingError::DegenerateVector));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let cube = unit_cube();
        let err = surface_aggregate(
            &Point3::origin(),
            &Point3::new(1.0, 0.0, 0.0),
            &cube,
            &IdentityTransform,
            &FacingParams::with_tolerance(-1.0),
        );
        assert!(matches!(err, Err(FacingError::InvalidParams(_))));
    }

    #[test]
    fn test_world_bounds_center() {
        let cube = unit_cube();
        let iso = Isometry3::translation(1.0, 2.0, 3.0);
        let center = world_bounds_center(&cube, &iso).unwrap();
        assert_relative_eq!(center, Point3::new(1.5, 2.5, 3.5), epsilon = 1e-12);
        assert!(world_bounds_center(&MeshSnapshot::default(), &iso).is_none());
    }

    #[test]
    fn test_centroid() {
        let c = centroid(&[
            Point3::origin(),
            Point3::new(3.0, 0.0, 0.0),
            Point3::new(0.0, 3.0, 0.0),
        ]);
        assert_relative_eq!(c, Point3::new(1.0, 1.0, 0.0), epsilon = 1e-12);
    }
}
