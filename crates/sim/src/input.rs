//! Player input for one tick.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Raw player input for a single tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Movement keys pressed.
    pub movement: MovementInput,

    /// Jump pressed this tick.
    pub jump: bool,
}

/// Movement key states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MovementInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl PlayerInput {
    /// Horizontal direction the player wants to move in.
    ///
    /// Forward is -Z and right is +X. Diagonals are normalized, so the
    /// length is either 0 or 1.
    pub fn wish_direction(&self) -> Vec3 {
        let mut wish = Vec3::ZERO;

        if self.movement.forward {
            wish.z -= 1.0;
        }
        if self.movement.backward {
            wish.z += 1.0;
        }
        if self.movement.right {
            wish.x += 1.0;
        }
        if self.movement.left {
            wish.x -= 1.0;
        }

        wish.normalize_or_zero()
    }
}
