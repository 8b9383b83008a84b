//! Grid-accelerated surface queries for repeated lookups on one snapshot.
//!
//! [`surface_aggregate`](crate::surface_aggregate) transforms and tests every
//! vertex and centroid on each call. [`SurfaceIndex`] does the transform
//! once, buckets the world-space points into a uniform hash grid, and then
//! only tests points in the grid cells overlapping the query. Candidates are
//! re-checked with the same strict distance test and summed in index order,
//! so results are identical to the brute-force path.

// Grid coordinates are floored world coordinates; truncation is the point.
#![allow(clippy::cast_possible_truncation)]

use hashbrown::HashMap;
use nalgebra::{Point3, Vector3};
use tracing::info;

use crate::error::{FacingError, FacingResult};
use crate::mesh::{MeshSource, validate_mesh};
use crate::params::{FacingParams, NormalSpace};
use crate::surface::{
    SurfaceAggregate, blend_matches, centroid, face_normal, in_space, triangle_corners,
};
use crate::transform::ObjectToWorld;

type CellKey = [i64; 3];

/// Uniform hash grid over a fixed set of points.
#[derive(Debug, Clone)]
struct PointGrid {
    inv_cell_size: f64,
    cells: HashMap<CellKey, Vec<usize>>,
}

impl PointGrid {
    fn build(points: &[Point3<f64>], cell_size: f64) -> Self {
        let mut grid = Self {
            inv_cell_size: 1.0 / cell_size,
            cells: HashMap::new(),
        };
        for (i, p) in points.iter().enumerate() {
            let key = grid.cell_of(p);
            grid.cells.entry(key).or_default().push(i);
        }
        grid
    }

    fn cell_of(&self, p: &Point3<f64>) -> CellKey {
        [
            (p.x * self.inv_cell_size).floor() as i64,
            (p.y * self.inv_cell_size).floor() as i64,
            (p.z * self.inv_cell_size).floor() as i64,
        ]
    }

    /// Indices of all points that may lie within `radius` of `center`,
    /// in ascending order.
    fn candidates(&self, center: &Point3<f64>, radius: f64) -> Vec<usize> {
        let offset = Vector3::repeat(radius);
        // One cell of padding absorbs rounding at the range edges.
        let lo = self.cell_of(&(center - offset)).map(|c| c.saturating_sub(1));
        let hi = self.cell_of(&(center + offset)).map(|c| c.saturating_add(1));

        let span = |axis: usize| u128::from(hi[axis].abs_diff(lo[axis])) + 1;
        let range_cells = span(0).saturating_mul(span(1)).saturating_mul(span(2));

        let mut found = Vec::new();
        if range_cells > self.cells.len() as u128 {
            // Cheaper to scan the occupied cells than the query box.
            for (key, items) in &self.cells {
                if (0..3).all(|a| lo[a] <= key[a] && key[a] <= hi[a]) {
                    found.extend_from_slice(items);
                }
            }
        } else {
            for x in lo[0]..=hi[0] {
                for y in lo[1]..=hi[1] {
                    for z in lo[2]..=hi[2] {
                        if let Some(items) = self.cells.get(&[x, y, z]) {
                            found.extend_from_slice(items);
                        }
                    }
                }
            }
        }
        found.sort_unstable();
        found
    }
}

/// Precomputed world-space geometry of one mesh snapshot.
///
/// Build once per snapshot and transform, then query as often as needed.
/// The grid cell size is the build-time proximity tolerance; queries may use
/// any tolerance.
///
/// # Example
///
/// ```
/// use mesh_facing::{unit_cube, FacingParams, IdentityTransform, Point3, SurfaceIndex};
///
/// let params = FacingParams::with_tolerance(0.9);
/// let index = SurfaceIndex::build(&unit_cube(), &IdentityTransform, &params).unwrap();
///
/// let result = index
///     .aggregate(&Point3::new(0.5, 0.5, 0.5), &Point3::new(1.5, 0.5, 0.5), &params)
///     .unwrap();
/// assert_eq!(result.vertices_matched, 4);
/// assert!((result.average_face_normal.x() - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct SurfaceIndex {
    world_positions: Vec<Point3<f64>>,
    vertex_normals: Vec<Vector3<f64>>,
    world_centroids: Vec<Point3<f64>>,
    face_normals: Vec<Vector3<f64>>,
    vertex_grid: PointGrid,
    centroid_grid: PointGrid,
    normal_space: NormalSpace,
    cell_size: f64,
}

impl SurfaceIndex {
    /// Index `mesh` as placed by `transform`.
    ///
    /// Normals are stored in `params.normal_space`; later queries must ask
    /// for the same space.
    ///
    /// # Errors
    ///
    /// Invalid params or a malformed mesh, as for
    /// [`surface_aggregate`](crate::surface_aggregate).
    pub fn build<M, T>(mesh: &M, transform: &T, params: &FacingParams) -> FacingResult<Self>
    where
        M: MeshSource + ?Sized,
        T: ObjectToWorld + ?Sized,
    {
        params.validate()?;
        validate_mesh(mesh)?;

        let space = params.normal_space;
        let positions = mesh.positions();

        let world_positions: Vec<Point3<f64>> =
            positions.iter().map(|p| transform.transform_point(p)).collect();
        let vertex_normals = mesh
            .normals()
            .iter()
            .map(|n| in_space(n, space, transform))
            .collect();

        let mut world_centroids = Vec::with_capacity(mesh.face_count());
        let mut face_normals = Vec::with_capacity(mesh.face_count());
        for (face, &triangle) in mesh.triangles().iter().enumerate() {
            let corners = triangle_corners(positions, face, triangle)?;
            world_centroids.push(transform.transform_point(&centroid(&corners)));
            face_normals.push(in_space(&face_normal(&corners), space, transform));
        }

        let cell_size = params.proximity_tolerance;
        let vertex_grid = PointGrid::build(&world_positions, cell_size);
        let centroid_grid = PointGrid::build(&world_centroids, cell_size);

        info!(
            vertices = world_positions.len(),
            faces = world_centroids.len(),
            vertex_cells = vertex_grid.cells.len(),
            centroid_cells = centroid_grid.cells.len(),
            cell_size,
            "Built surface index"
        );

        Ok(Self {
            world_positions,
            vertex_normals,
            world_centroids,
            face_normals,
            vertex_grid,
            centroid_grid,
            normal_space: space,
            cell_size,
        })
    }

    /// Number of indexed vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.world_positions.len()
    }

    /// Number of indexed triangles.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.world_centroids.len()
    }

    /// Grid cell edge length in world units.
    #[must_use]
    pub const fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Space the stored normals are in.
    #[must_use]
    pub const fn normal_space(&self) -> NormalSpace {
        self.normal_space
    }

    /// Same query as [`surface_aggregate`](crate::surface_aggregate), on the
    /// indexed snapshot.
    ///
    /// # Errors
    ///
    /// As [`surface_aggregate`](crate::surface_aggregate), plus
    /// [`FacingError::InvalidParams`] if `params.normal_space` differs from
    /// the space the index was built with.
    pub fn aggregate(
        &self,
        start: &Point3<f64>,
        target: &Point3<f64>,
        params: &FacingParams,
    ) -> FacingResult<SurfaceAggregate> {
        params.validate()?;
        if params.normal_space != self.normal_space {
            return Err(FacingError::invalid_params(format!(
                "index holds {:?}-space normals, query asked for {:?}",
                self.normal_space, params.normal_space
            )));
        }

        let tolerance = params.proximity_tolerance;
        let vertex_normals: Vec<Vector3<f64>> = self
            .vertex_grid
            .candidates(target, tolerance)
            .into_iter()
            .filter(|&i| nalgebra::distance(&self.world_positions[i], target) < tolerance)
            .map(|i| self.vertex_normals[i])
            .collect();
        let face_normals: Vec<Vector3<f64>> = self
            .centroid_grid
            .candidates(target, tolerance)
            .into_iter()
            .filter(|&i| nalgebra::distance(&self.world_centroids[i], target) < tolerance)
            .map(|i| self.face_normals[i])
            .collect();

        blend_matches(start, target, tolerance, &vertex_normals, &face_normals)
    }
}
