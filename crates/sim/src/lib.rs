//! Tether Simulation
//!
//! A fixed-step driver built on `tether-physics`:
//!
//! - Level geometry loaded from JSON and built into convex shapes
//! - A player sphere pushed out of that geometry every tick
//! - Anchored ropes whose particles drape over the level
//!
//! # Architecture
//!
//! Everything runs on one thread in a fixed order, so two simulations fed the
//! same inputs stay bit-identical.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                        Simulation                         │
//! │  ┌─────────┐    ┌──────────────┐    ┌──────────────────┐  │
//! │  │ Input   │───►│ Player       │───►│ Level            │  │
//! │  │ (wish,  │    │ (sphere vs   │    │ (convex shapes,  │  │
//! │  │  jump)  │    │  level)      │    │  rope anchors)   │  │
//! │  └─────────┘    └──────────────┘    └──────────────────┘  │
//! │                 ┌──────────────┐            ▲             │
//! │                 │ Ropes        │────────────┘             │
//! │                 │ (Verlet)     │                          │
//! │                 └──────────────┘                          │
//! └───────────────────────────────────────────────────────────┘
//! ```

pub mod input;
pub mod level;
pub mod player;
pub mod rope;
pub mod simulation;

// Re-export main types
pub use input::{MovementInput, PlayerInput};
pub use level::{Level, LevelDef, LevelError, RopeDef, ShapeDef, SphereContact};
pub use player::{Player, PlayerConfig};
pub use rope::Rope;
pub use simulation::{Simulation, SimulationConfig};

// Re-export physics types for convenience
pub use tether_physics::{Body, BodyConfig, BuildError, ConvexShape};
