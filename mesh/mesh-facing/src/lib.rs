//! Blended facing directions toward points and mesh surfaces.
//!
//! Answers "which way should something face to approach this target?",
//! taking the local geometry around the target into account:
//!
//! - **Direction**: [`direction_to_point`] and [`average_direction`], the
//!   unit-vector primitives everything else is built from
//! - **Cuboid convergence**: [`cuboid_convergence`] leans a straight-line
//!   approach toward the box corner it heads for
//! - **Vertex convergence**: [`vertex_convergence`] leans it toward a
//!   caller-supplied neighbourhood direction
//! - **Surface aggregate**: [`surface_aggregate`] finds the vertices and
//!   triangles surrounding a target point on a mesh and averages their
//!   normals; [`SurfaceIndex`] answers the same query faster for repeated
//!   lookups
//!
//! Rotating anything with the results is left to the caller; a
//! [`Direction3`] converts into a nalgebra unit vector for that.
//!
//! # Host integration
//!
//! Meshes come in through the read-only [`MeshSource`] trait and their
//! placement through [`ObjectToWorld`]. [`MeshSnapshot`] and the nalgebra
//! transform types implement these out of the box.
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**. It can be used in:
//! - CLI tools
//! - Web applications (WASM)
//! - Servers
//! - Other game engines
//!
//! # Example
//!
//! ```
//! use mesh_facing::{
//!     cuboid_convergence, surface_aggregate, unit_cube, FacingParams, IdentityTransform,
//!     Point3,
//! };
//!
//! // Approach a box so that we end up facing one of its corners.
//! let dir = cuboid_convergence(&Point3::origin(), &Point3::new(2.0, 3.0, -1.0)).unwrap();
//! assert!((dir.as_vector().norm() - 1.0).abs() < 1e-12);
//!
//! // Approach the +X face of a cube.
//! let cube = unit_cube();
//! let surface = surface_aggregate(
//!     &Point3::new(0.5, 0.5, 0.5),
//!     &Point3::new(1.5, 0.5, 0.5),
//!     &cube,
//!     &IdentityTransform,
//!     &FacingParams::with_tolerance(0.9),
//! )
//! .unwrap();
//! assert!((surface.average_vertex_normal.x() - 1.0).abs() < 1e-12);
//! ```
//!
//! # Errors
//!
//! Nothing here returns an undefined vector. Coincident points and inputs
//! that cancel out give [`FacingError::DegenerateVector`]; empty averages,
//! including "nothing within tolerance of the target", give an error for
//! which [`FacingError::is_empty_input`] is true.

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod convergence;
mod direction;
mod error;
mod index;
mod mesh;
mod params;
mod surface;
mod transform;

// Re-export main types and functions
pub use convergence::{cuboid_convergence, cuboid_marker, vertex_convergence};
pub use direction::{DEGENERATE_LENGTH, Direction3, average_direction, direction_to_point};
pub use error::{FacingError, FacingResult};
pub use index::SurfaceIndex;
pub use mesh::{MeshSnapshot, MeshSource, unit_cube, validate_mesh};
pub use params::{DEFAULT_PROXIMITY_TOLERANCE, FacingParams, NormalSpace};
pub use surface::{
    SurfaceAggregate, centroid, face_normal, face_normals, surface_aggregate, world_bounds_center,
};
pub use transform::{FnTransform, IdentityTransform, ObjectToWorld};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
