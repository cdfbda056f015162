//! Per-body tuning.
//!
//! All values are per tick: the integrator runs at a fixed step and never sees
//! a delta time.

use serde::{Deserialize, Serialize};

/// Tunable parameters for a [`Body`](super::Body).
///
/// Each body carries its own copy, so a rope and a ragdoll in the same scene
/// can be tuned independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyConfig {
    // ========================================================================
    // Forces
    // ========================================================================
    /// Downward velocity added every tick (units/tick²).
    pub gravity: f32,

    /// Fraction of velocity kept each tick in free flight (0-1).
    pub air_friction: f32,

    /// Fraction of tangential velocity kept on ground contact (0-1).
    pub ground_friction: f32,

    /// Height of the ground plane. `None` disables ground clamping.
    pub ground: Option<f32>,

    // ========================================================================
    // Solver
    // ========================================================================
    /// Constraint relaxation passes per update.
    pub constraint_iterations: usize,

    /// Pairwise collision passes per `handle_internal_collisions` call.
    pub collision_passes: usize,

    /// Restitution for internal particle collisions.
    pub restitution: f32,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            gravity: 0.02,
            air_friction: 0.99,
            ground_friction: 0.8,
            ground: None,

            // Two passes are enough for rope-like chains under impulse gravity
            constraint_iterations: 2,
            collision_passes: 1,
            restitution: 0.5,
        }
    }
}

impl BodyConfig {
    /// Ropes and chains: default forces, no ground.
    pub fn rope() -> Self {
        Self::default()
    }

    /// Character rigs: stiffer solve, a ground plane at zero, several
    /// collision passes so limbs don't sink into each other.
    pub fn ragdoll() -> Self {
        Self {
            air_friction: 0.98,
            ground_friction: 0.6,
            ground: Some(0.0),
            constraint_iterations: 6,
            collision_passes: 3,
            ..Default::default()
        }
    }

    /// No gravity and no damping. Useful for tests and floating debris.
    pub fn weightless() -> Self {
        Self {
            gravity: 0.0,
            air_friction: 1.0,
            ..Default::default()
        }
    }

    /// Same config with a ground plane at `height`.
    pub fn with_ground(mut self, height: f32) -> Self {
        self.ground = Some(height);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BodyConfig::default();
        assert!(config.gravity > 0.0);
        assert!(config.air_friction > 0.0 && config.air_friction <= 1.0);
        assert_eq!(config.constraint_iterations, 2);
        assert_eq!(config.restitution, 0.5);
        assert!(config.ground.is_none());
    }

    #[test]
    fn test_presets() {
        assert!(BodyConfig::ragdoll().ground.is_some());
        assert_eq!(BodyConfig::weightless().gravity, 0.0);
        assert_eq!(BodyConfig::rope().with_ground(-3.0).ground, Some(-3.0));
    }
}
