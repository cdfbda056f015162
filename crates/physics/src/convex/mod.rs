//! Convex collision shapes.
//!
//! This module provides rigid polyhedral volumes for level geometry and the
//! queries gameplay code needs against them.
//!
//! # Key Types
//!
//! - [`ConvexShape`]: Local point cloud + faces + transform, with a cached
//!   world-space copy and bounding box
//! - [`Transform`]: Position, orientation and per-axis scale
//!
//! # Queries
//!
//! - [`ConvexShape::find_closest_point`]: Closest point on the surface
//! - [`ConvexShape::collide_with_sphere`]: Minimum translation vector pushing a
//!   sphere out, via a separating-axis test over face normals
//!
//! The SAT only tests face normals, not edge cross products. That is exact
//! for box- and prism-dominated level geometry; some edge-on configurations
//! against irregular hulls can report a slightly wrong axis.

mod factory;
mod query;
mod shape;
mod transform;

pub use factory::{beam, cuboid, prism};
pub use shape::ConvexShape;
pub use transform::Transform;
