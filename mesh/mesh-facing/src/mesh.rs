//! Read-only mesh data as handed over by the host scene.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{FacingError, FacingResult};

/// Read-only provider of mesh geometry in object space.
///
/// Any scene system can expose its meshes through this trait. Positions and
/// normals must be parallel arrays (same length, same vertex order);
/// triangles index into them.
pub trait MeshSource {
    /// Vertex positions in object space.
    fn positions(&self) -> &[Point3<f64>];

    /// Per-vertex normals in object space, parallel to [`positions`](Self::positions).
    fn normals(&self) -> &[Vector3<f64>];

    /// Triangles as vertex index triples.
    fn triangles(&self) -> &[[u32; 3]];

    /// Number of vertices.
    fn vertex_count(&self) -> usize {
        self.positions().len()
    }

    /// Number of triangles.
    fn face_count(&self) -> usize {
        self.triangles().len()
    }

    /// Resolve the corner positions of triangle `face`.
    ///
    /// Returns `None` if the face or any of its vertices is out of range.
    fn triangle(&self, face: usize) -> Option<[Point3<f64>; 3]> {
        let [a, b, c] = *self.triangles().get(face)?;
        let positions = self.positions();
        Some([
            *positions.get(a as usize)?,
            *positions.get(b as usize)?,
            *positions.get(c as usize)?,
        ])
    }
}

/// Check that `mesh` satisfies the [`MeshSource`] contract.
///
/// # Errors
///
/// - [`FacingError::MeshMismatch`] if normals and positions differ in length.
/// - [`FacingError::IndexOutOfBounds`] if a triangle names a missing vertex.
pub fn validate_mesh<M: MeshSource + ?Sized>(mesh: &M) -> FacingResult<()> {
    let vertex_count = mesh.positions().len();
    let normal_count = mesh.normals().len();
    if vertex_count != normal_count {
        return Err(FacingError::MeshMismatch {
            positions: vertex_count,
            normals: normal_count,
        });
    }

    for (face, triangle) in mesh.triangles().iter().enumerate() {
        if let Some(&index) = triangle.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(FacingError::IndexOutOfBounds {
                face,
                index,
                vertex_count,
            });
        }
    }

    Ok(())
}

/// An owned, validated mesh snapshot.
///
/// # Example
///
/// ```
/// use mesh_facing::{MeshSnapshot, MeshSource, Point3, Vector3};
///
/// let mesh = MeshSnapshot::new(
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///     ],
///     vec![Vector3::z(); 3],
///     vec![[0, 1, 2]],
/// )
/// .unwrap();
///
/// assert_eq!(mesh.vertex_count(), 3);
/// assert_eq!(mesh.face_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MeshSnapshot {
    positions: Vec<Point3<f64>>,
    normals: Vec<Vector3<f64>>,
    triangles: Vec<[u32; 3]>,
}

impl MeshSnapshot {
    /// Create a snapshot, checking that the parts fit together.
    ///
    /// # Errors
    ///
    /// See [`validate_mesh`].
    pub fn new(
        positions: Vec<Point3<f64>>,
        normals: Vec<Vector3<f64>>,
        triangles: Vec<[u32; 3]>,
    ) -> FacingResult<Self> {
        let mesh = Self {
            positions,
            normals,
            triangles,
        };
        validate_mesh(&mesh)?;
        Ok(mesh)
    }

    /// Create a snapshot from flat arrays, the layout most engines export.
    ///
    /// * `positions` - `[x0, y0, z0, x1, y1, z1, ...]`
    /// * `normals` - same layout as `positions`
    /// * `indices` - `[a0, b0, c0, a1, b1, c1, ...]`
    ///
    /// # Errors
    ///
    /// [`FacingError::InvalidParams`] if an array length is not a multiple of
    /// three, otherwise as [`MeshSnapshot::new`].
    pub fn from_raw(positions: &[f64], normals: &[f64], indices: &[u32]) -> FacingResult<Self> {
        if positions.len() % 3 != 0 || normals.len() % 3 != 0 || indices.len() % 3 != 0 {
            return Err(FacingError::invalid_params(
                "flat mesh arrays must have a length divisible by 3",
            ));
        }

        Self::new(
            positions
                .chunks_exact(3)
                .map(|c| Point3::new(c[0], c[1], c[2]))
                .collect(),
            normals
                .chunks_exact(3)
                .map(|c| Vector3::new(c[0], c[1], c[2]))
                .collect(),
            indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect(),
        )
    }

    /// Check if the snapshot has no vertices or no triangles.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.triangles.is_empty()
    }
}

impl MeshSource for MeshSnapshot {
    #[inline]
    fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    #[inline]
    fn normals(&self) -> &[Vector3<f64>] {
        &self.normals
    }

    #[inline]
    fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }
}

/// Create a unit cube snapshot from (0,0,0) to (1,1,1).
///
/// Eight shared corner vertices, twelve CCW triangles with outward face
/// normals. Each vertex normal points diagonally out of its corner, so the
/// four vertex normals of any face average to that face's normal.
///
/// # Example
///
/// ```
/// use mesh_facing::{unit_cube, MeshSource};
///
/// let cube = unit_cube();
/// assert_eq!(cube.vertex_count(), 8);
/// assert_eq!(cube.face_count(), 12);
/// ```
#[must_use]
pub fn unit_cube() -> MeshSnapshot {
    let positions: Vec<Point3<f64>> = vec![
        Point3::new(0.0, 0.0, 0.0), // 0
        Point3::new(1.0, 0.0, 0.0), // 1
        Point3::new(1.0, 1.0, 0.0), // 2
        Point3::new(0.0, 1.0, 0.0), // 3
        Point3::new(0.0, 0.0, 1.0), // 4
        Point3::new(1.0, 0.0, 1.0), // 5
        Point3::new(1.0, 1.0, 1.0), // 6
        Point3::new(0.0, 1.0, 1.0), // 7
    ];

    let center = Point3::new(0.5, 0.5, 0.5);
    let normals = positions.iter().map(|p| (p - center).normalize()).collect();

    let triangles = vec![
        // Bottom (z=0), -Z
        [0, 2, 1],
        [0, 3, 2],
        // Top (z=1), +Z
        [4, 5, 6],
        [4, 6, 7],
        // Front (y=0), -Y
        [0, 1, 5],
        [0, 5, 4],
        // Back (y=1), +Y
        [3, 7, 6],
        [3, 6, 2],
        // Left (x=0), -X
        [0, 4, 7],
        [0, 7, 3],
        // Right (x=1), +X
        [1, 2, 6],
        [1, 6, 5],
    ];

    MeshSnapshot {
        positions,
        normals,
        triangles,
    }
}
