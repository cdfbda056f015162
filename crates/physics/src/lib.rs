//! Tether Physics
//!
//! Particle dynamics and convex collision for a frame-driven game loop.
//!
//! # Architecture
//!
//! The engine is split into two independent systems:
//!
//! - **Verlet**: Point masses connected by rigid distance constraints, advanced
//!   with position-based (Verlet) integration. Used for ropes, chains and
//!   character rigs.
//! - **Convex**: Polyhedral collision volumes with a position/orientation/scale
//!   transform. Answers closest-point and sphere-penetration queries for level
//!   geometry.
//!
//! A thin [`RigidBody`] wrapper combines a convex shape with linear and angular
//! state for callers that want simple moving props.
//!
//! # Design Principles
//!
//! 1. **Single-threaded**: Every object is owned by one frame loop, no locking
//! 2. **No allocation per tick**: Hot loops only touch `Copy` math types
//! 3. **Deterministic**: Same inputs always produce the same outputs
//! 4. **Fail fast on bad geometry**: Malformed input is rejected at build time

pub mod aabb;
pub mod convex;
pub mod error;
pub mod rigid;
pub mod verlet;

// Re-export commonly used types
pub use aabb::Aabb;
pub use convex::{beam, cuboid, prism, ConvexShape, Transform};
pub use error::BuildError;
pub use rigid::RigidBody;
pub use verlet::{
    chain_grid, humanoid, rope, Body, BodyConfig, Constraint, HumanoidJoint, Particle,
};
