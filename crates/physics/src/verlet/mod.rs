//! Particle dynamics with Verlet integration.
//!
//! This module implements position-based dynamics for ropes, chains and
//! character rigs:
//!
//! - Point masses with no explicit velocity (velocity is `position - previous`)
//! - Rigid distance constraints relaxed iteratively
//! - Gravity, air friction and an optional ground plane
//! - Pairwise collision between particles of the same body
//!
//! # Design
//!
//! A [`Body`] owns its particles and constraints outright. The caller drives it
//! once per fixed tick:
//!
//! ```
//! use glam::Vec3;
//! use tether_physics::{rope, BodyConfig};
//!
//! let anchor = Vec3::new(0.0, 10.0, 0.0);
//! let mut body = rope(anchor, Vec3::new(4.0, 10.0, 0.0), 8, 0.1, BodyConfig::rope())
//!     .expect("valid rope");
//!
//! for _ in 0..60 {
//!     // Anchors are placed before the update, never after.
//!     body.first_mut().place(Vec3::new(0.0, 10.0, 0.0));
//!     body.update();
//!     body.handle_internal_collisions();
//! }
//! ```

mod body;
mod builders;
mod config;
mod constraint;
mod particle;

pub use body::Body;
pub use builders::{chain_grid, humanoid, rope, HumanoidJoint};
pub use config::BodyConfig;
pub use constraint::Constraint;
pub use particle::Particle;
