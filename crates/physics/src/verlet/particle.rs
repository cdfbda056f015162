//! A single Verlet point mass.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A point mass integrated with position Verlet.
///
/// There is no velocity field. Velocity is implied by the difference between
/// [`position`](Self::position) and [`previous_position`](Self::previous_position),
/// so any change of momentum must be expressed as a change to the previous
/// position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// Current location.
    pub position: Vec3,

    /// Location one integration step ago.
    pub previous_position: Vec3,

    /// Collision radius, fixed at creation.
    radius: f32,
}

impl Particle {
    /// Create a particle at rest.
    ///
    /// Negative radii are clamped to zero.
    pub fn new(position: Vec3, radius: f32) -> Self {
        Self {
            position,
            previous_position: position,
            radius: radius.max(0.0),
        }
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.previous_position.is_finite() && self.radius.is_finite()
    }

    /// Implicit per-tick velocity.
    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.position - self.previous_position
    }

    /// Replace the implicit velocity without moving the particle.
    #[inline]
    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.previous_position = self.position - velocity;
    }

    /// Advance one Verlet step: `x' = 2x - x_prev`.
    #[inline]
    pub fn update(&mut self) {
        let current = self.position;
        self.position = current * 2.0 - self.previous_position;
        self.previous_position = current;
    }

    /// Add `impulse` to the implicit velocity without teleporting the particle.
    #[inline]
    pub fn apply_impulse(&mut self, impulse: Vec3) {
        self.previous_position -= impulse;
    }

    /// Move the particle and kill its velocity.
    ///
    /// Anchored particles (a rope's attachment point, say) are placed here every
    /// tick before the owning body is updated.
    #[inline]
    pub fn place(&mut self, at: Vec3) {
        self.position = at;
        self.previous_position = at;
    }

    /// Shift both positions, keeping the velocity unchanged.
    #[inline]
    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
        self.previous_position += offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_particle_at_rest() {
        let p = Particle::new(Vec3::new(1.0, 2.0, 3.0), 0.25);
        assert_eq!(p.velocity(), Vec3::ZERO);
        assert_eq!(p.radius(), 0.25);
    }

    #[test]
    fn test_negative_radius_clamped() {
        let p = Particle::new(Vec3::ZERO, -1.0);
        assert_eq!(p.radius(), 0.0);
    }

    #[test]
    fn test_update_keeps_velocity() {
        let mut p = Particle::new(Vec3::ZERO, 0.1);
        p.previous_position = Vec3::new(-1.0, 0.0, 0.0);

        p.update();
        assert_eq!(p.position, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(p.previous_position, Vec3::ZERO);

        p.update();
        assert_eq!(p.position, Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_impulse_changes_velocity_not_position() {
        let mut p = Particle::new(Vec3::new(5.0, 5.0, 5.0), 0.1);
        p.set_velocity(Vec3::new(0.5, 0.0, 0.0));
        let before = p.velocity();

        let impulse = Vec3::new(0.0, 1.25, -0.75);
        p.apply_impulse(impulse);

        assert_eq!(p.position, Vec3::new(5.0, 5.0, 5.0));
        assert_eq!(p.velocity(), before + impulse);
    }

    #[test]
    fn test_opposite_impulses_cancel() {
        let mut p = Particle::new(Vec3::new(1.0, 2.0, 3.0), 0.1);
        p.set_velocity(Vec3::new(0.25, -0.5, 0.0));
        let before = p.clone();

        p.apply_impulse(Vec3::new(0.5, 2.0, -1.0));
        p.apply_impulse(Vec3::new(-0.5, -2.0, 1.0));

        assert_eq!(p, before);
    }

    #[test]
    fn test_place_kills_velocity() {
        let mut p = Particle::new(Vec3::ZERO, 0.1);
        p.set_velocity(Vec3::ONE);
        p.place(Vec3::new(0.0, 10.0, 0.0));
        assert_eq!(p.position, Vec3::new(0.0, 10.0, 0.0));
        assert_eq!(p.velocity(), Vec3::ZERO);
    }
}
