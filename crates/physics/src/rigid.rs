//! Moving convex props.
//!
//! A [`RigidBody`] wraps a [`ConvexShape`] with linear and angular state so
//! gameplay code can toss crates around. It integrates itself and answers the
//! same sphere query as static geometry; there is no contact between rigid
//! bodies.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::convex::ConvexShape;

/// A convex shape with mass and per-tick velocities.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "RigidBodyData")]
pub struct RigidBody {
    /// Collision shape; its transform is the body's pose.
    pub shape: ConvexShape,

    /// Linear velocity (units/tick).
    pub velocity: Vec3,

    /// Angular velocity as a scaled axis (radians/tick).
    pub angular_velocity: Vec3,

    /// Downward velocity added every tick.
    pub gravity: f32,

    /// Fraction of linear and angular velocity kept each tick (0-1).
    pub damping: f32,

    mass: f32,
    #[serde(skip_serializing)]
    inv_mass: f32,
    #[serde(skip_serializing)]
    inv_inertia: f32,
}

/// Serialized form of a [`RigidBody`]; inverse mass and inertia are derived.
#[derive(Deserialize)]
struct RigidBodyData {
    shape: ConvexShape,
    velocity: Vec3,
    angular_velocity: Vec3,
    gravity: f32,
    damping: f32,
    mass: f32,
}

impl From<RigidBodyData> for RigidBody {
    fn from(data: RigidBodyData) -> Self {
        Self {
            velocity: data.velocity,
            angular_velocity: data.angular_velocity,
            gravity: data.gravity,
            damping: data.damping,
            ..Self::new(data.shape, data.mass)
        }
    }
}

impl RigidBody {
    /// Wrap `shape` with the given mass. Non-positive mass makes the body
    /// immovable by impulses.
    pub fn new(shape: ConvexShape, mass: f32) -> Self {
        let (inv_mass, inv_inertia) = if mass > 0.0 {
            // Solid-sphere inertia over the bounding radius
            let radius = shape.bounding_box().half_extents().length().max(f32::EPSILON);
            (1.0 / mass, 1.0 / (0.4 * mass * radius * radius))
        } else {
            (0.0, 0.0)
        };

        Self {
            shape,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            gravity: 0.0,
            damping: 1.0,
            mass,
            inv_mass,
            inv_inertia,
        }
    }

    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping.clamp(0.0, 1.0);
        self
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.shape.position()
    }

    #[inline]
    pub fn orientation(&self) -> Quat {
        self.shape.orientation()
    }

    /// Change linear velocity by `impulse / mass`.
    pub fn apply_impulse(&mut self, impulse: Vec3) {
        self.velocity += impulse * self.inv_mass;
    }

    /// Impulse applied at a world-space point, adding spin around the
    /// shape's position.
    pub fn apply_impulse_at(&mut self, point: Vec3, impulse: Vec3) {
        self.apply_impulse(impulse);
        let arm = point - self.shape.position();
        self.angular_velocity += arm.cross(impulse) * self.inv_inertia;
    }

    /// Velocity of a world-space point on the body.
    pub fn velocity_at(&self, point: Vec3) -> Vec3 {
        self.velocity + self.angular_velocity.cross(point - self.shape.position())
    }

    /// Advance one tick and commit the new pose in a single transform update.
    pub fn integrate(&mut self) {
        if self.inv_mass > 0.0 {
            self.velocity.y -= self.gravity;
        }
        self.velocity *= self.damping;
        self.angular_velocity *= self.damping;

        let velocity = self.velocity;
        let spin = Quat::from_scaled_axis(self.angular_velocity);
        self.shape.edit_transform(|t| {
            t.position += velocity;
            t.orientation = (spin * t.orientation).normalize();
        });
    }

    /// Push a sphere out of this body. See [`ConvexShape::collide_with_sphere`].
    pub fn push_sphere(&self, center: Vec3, radius: f32) -> Option<Vec3> {
        self.shape.collide_with_sphere(center, radius)
    }

    /// Check if the body has (almost) stopped moving.
    pub fn is_at_rest(&self, threshold: f32) -> bool {
        self.velocity.length_squared() < threshold * threshold
            && self.angular_velocity.length_squared() < threshold * threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convex::cuboid;

    #[test]
    fn test_integrate_moves_shape() {
        let mut body = RigidBody::new(cuboid(Vec3::splat(0.5)).unwrap(), 2.0);
        body.apply_impulse(Vec3::new(1.0, 0.0, 0.0));
        assert!((body.velocity.x - 0.5).abs() < 1e-6);

        body.integrate();
        body.integrate();

        assert!(body.position().abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), 1e-6));
        // World cache followed the pose
        assert!((body.shape.bounding_box().max.x - 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_gravity_and_damping() {
        let mut body = RigidBody::new(cuboid(Vec3::splat(0.5)).unwrap(), 1.0)
            .with_gravity(0.1)
            .with_damping(0.5);

        body.integrate();
        assert!((body.velocity.y + 0.05).abs() < 1e-6);
        assert!((body.position().y + 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_off_center_impulse_spins() {
        let mut body = RigidBody::new(cuboid(Vec3::splat(0.5)).unwrap(), 1.0);
        body.apply_impulse_at(Vec3::new(0.5, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0));

        // Arm +X, push +Z: spin about -Y
        assert!(body.angular_velocity.y < 0.0);

        let before = body.orientation();
        body.integrate();
        assert!(body.orientation().angle_between(before) > 0.0);
    }

    #[test]
    fn test_static_body_ignores_impulses() {
        let mut body = RigidBody::new(cuboid(Vec3::ONE).unwrap(), 0.0).with_gravity(1.0);
        body.apply_impulse_at(Vec3::ONE, Vec3::X);
        body.integrate();
        assert!(body.is_at_rest(1e-6));
        assert_eq!(body.position(), Vec3::ZERO);
    }

    #[test]
    fn test_push_sphere() {
        let mut body = RigidBody::new(cuboid(Vec3::splat(0.5)).unwrap(), 1.0);
        body.velocity = Vec3::new(0.0, 1.0, 0.0);
        body.integrate();

        let mtv = body.push_sphere(Vec3::new(0.0, 1.9, 0.0), 0.5).unwrap();
        assert!(mtv.abs_diff_eq(Vec3::new(0.0, 0.1, 0.0), 1e-5), "{mtv:?}");
    }

    #[test]
    fn test_json_recomputes_inverse_mass() {
        let mut body = RigidBody::new(cuboid(Vec3::splat(0.5)).unwrap(), 2.0).with_gravity(0.01);
        body.velocity = Vec3::new(0.1, 0.0, 0.0);

        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("inv_mass").is_none());

        let mut loaded: RigidBody = serde_json::from_value(json).unwrap();
        assert_eq!(loaded.velocity, body.velocity);
        assert_eq!(loaded.gravity, 0.01);

        loaded.apply_impulse(Vec3::new(1.0, 0.0, 0.0));
        assert!((loaded.velocity.x - 0.6).abs() < 1e-6);
    }
}
