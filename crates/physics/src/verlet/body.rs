//! The particle integrator.
//!
//! A [`Body`] is one simulated entity: a rope, a chain, a character rig. It
//! owns its particles and constraints and is advanced once per fixed tick.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::aabb::Aabb;
use crate::error::BuildError;

use super::config::BodyConfig;
use super::constraint::Constraint;
use super::particle::Particle;

/// Rest lengths below this are rejected as degenerate.
const MIN_REST_LENGTH: f32 = 1e-6;

/// Separations below this are treated as coincident during collision.
const COINCIDENT_EPSILON: f32 = 1e-6;

/// Push direction for exactly coincident particles.
const FALLBACK_AXIS: Vec3 = Vec3::X;

/// A set of Verlet particles held together by distance constraints.
///
/// Particle insertion order is preserved, so "first" and "last" are stable
/// handles for anchoring a rope's ends.
///
/// # Example
///
/// ```
/// use glam::Vec3;
/// use tether_physics::{Body, BodyConfig};
///
/// let mut body = Body::new(BodyConfig::default());
/// let top = body.add_particle(Vec3::new(0.0, 10.0, 0.0), 0.1);
/// let bottom = body.add_particle(Vec3::new(0.0, 5.0, 0.0), 0.1);
/// body.connect(top, bottom).unwrap();
///
/// // Each frame:
/// body.first_mut().place(Vec3::new(0.0, 10.0, 0.0));
/// body.update();
/// ```
///
/// Deserializing checks every constraint against the particle list and
/// recomputes the bounding box, so a loaded body is as sound as a built one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "BodyData")]
pub struct Body {
    /// Tunables, free to change between ticks.
    pub config: BodyConfig,

    particles: Vec<Particle>,
    constraints: Vec<Constraint>,
    #[serde(skip_serializing)]
    bounding_box: Aabb,
}

/// Serialized form of a [`Body`].
///
/// Particles keep their previous positions and constraints keep their rest
/// lengths, so a body saved mid-swing resumes with the same motion.
#[derive(Deserialize)]
struct BodyData {
    #[serde(default)]
    config: BodyConfig,
    particles: Vec<Particle>,
    #[serde(default)]
    constraints: Vec<Constraint>,
}

impl TryFrom<BodyData> for Body {
    type Error = BuildError;

    fn try_from(data: BodyData) -> Result<Self, Self::Error> {
        if data.particles.iter().any(|p| !p.is_finite()) {
            return Err(BuildError::NonFinite);
        }

        let count = data.particles.len();
        for c in &data.constraints {
            for index in [c.a, c.b] {
                if index >= count {
                    return Err(BuildError::ParticleOutOfRange { index, count });
                }
            }
            let rest_length = c.rest_length();
            if c.a == c.b || !rest_length.is_finite() || rest_length < MIN_REST_LENGTH {
                return Err(BuildError::DegenerateConstraint { a: c.a, b: c.b });
            }
        }

        let mut body = Self {
            config: data.config,
            particles: data.particles,
            constraints: data.constraints,
            bounding_box: Aabb::default(),
        };
        body.refresh_bounds();
        Ok(body)
    }
}

impl Body {
    /// Create an empty body.
    pub fn new(config: BodyConfig) -> Self {
        Self {
            config,
            particles: Vec::new(),
            constraints: Vec::new(),
            bounding_box: Aabb::default(),
        }
    }

    /// Build a body from particle `(position, radius)` pairs and index pairs
    /// to connect.
    ///
    /// Rest lengths are measured from the initial positions.
    pub fn from_parts(
        config: BodyConfig,
        particles: &[(Vec3, f32)],
        connections: &[(usize, usize)],
    ) -> Result<Self, BuildError> {
        let mut body = Self::new(config);

        for &(position, radius) in particles {
            if !position.is_finite() || !radius.is_finite() {
                return Err(BuildError::NonFinite);
            }
            body.add_particle(position, radius);
        }

        for &(a, b) in connections {
            body.connect(a, b)?;
        }

        Ok(body)
    }

    /// Add a particle at rest and return its index.
    pub fn add_particle(&mut self, position: Vec3, radius: f32) -> usize {
        let index = self.particles.len();
        self.particles.push(Particle::new(position, radius));
        self.refresh_bounds();
        index
    }

    /// Connect two particles at their current distance.
    ///
    /// Returns the constraint's index.
    pub fn connect(&mut self, a: usize, b: usize) -> Result<usize, BuildError> {
        let count = self.particles.len();
        for index in [a, b] {
            if index >= count {
                return Err(BuildError::ParticleOutOfRange { index, count });
            }
        }

        let rest_length = self.particles[a].position.distance(self.particles[b].position);
        if a == b || rest_length < MIN_REST_LENGTH {
            return Err(BuildError::DegenerateConstraint { a, b });
        }

        self.constraints.push(Constraint::new(a, b, rest_length));
        Ok(self.constraints.len() - 1)
    }

    // ========================================================================
    // Access
    // ========================================================================

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Mutable access for anchoring and external collision response.
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn particle(&self, index: usize) -> Option<&Particle> {
        self.particles.get(index)
    }

    pub fn particle_mut(&mut self, index: usize) -> Option<&mut Particle> {
        self.particles.get_mut(index)
    }

    /// The first particle added.
    ///
    /// # Panics
    ///
    /// Panics if the body has no particles.
    pub fn first(&self) -> &Particle {
        &self.particles[0]
    }

    /// The last particle added.
    ///
    /// # Panics
    ///
    /// Panics if the body has no particles.
    pub fn last(&self) -> &Particle {
        &self.particles[self.particles.len() - 1]
    }

    /// See [`first`](Self::first).
    pub fn first_mut(&mut self) -> &mut Particle {
        &mut self.particles[0]
    }

    /// See [`last`](Self::last).
    pub fn last_mut(&mut self) -> &mut Particle {
        let last = self.particles.len() - 1;
        &mut self.particles[last]
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Bounding box of particle positions as of the last update.
    pub fn bounding_box(&self) -> Aabb {
        self.bounding_box
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.particles.iter().map(|p| p.position)
    }

    /// Largest constraint length error, in absolute value.
    pub fn max_constraint_error(&self) -> f32 {
        self.constraints
            .iter()
            .map(|c| c.error(&self.particles).abs())
            .fold(0.0, f32::max)
    }

    // ========================================================================
    // Forces
    // ========================================================================

    /// Add an impulse to one particle. Out-of-range indices are ignored.
    pub fn apply_impulse(&mut self, index: usize, impulse: Vec3) {
        if let Some(p) = self.particles.get_mut(index) {
            p.apply_impulse(impulse);
        }
    }

    /// Add the same impulse to every particle.
    pub fn apply_impulse_all(&mut self, impulse: Vec3) {
        for p in &mut self.particles {
            p.apply_impulse(impulse);
        }
    }

    // ========================================================================
    // Simulation
    // ========================================================================

    /// Advance the body by one fixed tick.
    ///
    /// Gravity and air friction are applied as impulses, every particle takes
    /// a Verlet step, constraints are relaxed, the ground plane (if any) is
    /// enforced and the bounding box is refreshed.
    pub fn update(&mut self) {
        let gravity = Vec3::new(0.0, -self.config.gravity, 0.0);
        let air_friction = self.config.air_friction;

        for p in &mut self.particles {
            p.apply_impulse(gravity);
            p.set_velocity(p.velocity() * air_friction);
            p.update();
        }

        self.relax_constraints(self.config.constraint_iterations);

        if let Some(ground) = self.config.ground {
            self.clamp_to_ground(ground);
        }

        self.refresh_bounds();
    }

    /// Run `iterations` relaxation passes over every constraint.
    ///
    /// Each pass is a symmetric half-and-half projection. Convergence over
    /// long chains is approximate and improves with more passes.
    pub fn relax_constraints(&mut self, iterations: usize) {
        for _ in 0..iterations {
            for constraint in &self.constraints {
                constraint.relax(&mut self.particles);
            }
        }
    }

    /// Separate overlapping particles of this body.
    ///
    /// Every unordered pair is checked, so this is O(n²) and meant for bodies
    /// with tens of particles. Overlaps are split evenly (equal masses) and
    /// approaching pairs bounce with the configured restitution.
    pub fn handle_internal_collisions(&mut self) {
        let count = self.particles.len();
        let restitution = self.config.restitution;

        for _ in 0..self.config.collision_passes {
            let mut resolved = 0usize;

            for i in 0..count {
                for j in (i + 1)..count {
                    let (pi, pj) = (&self.particles[i], &self.particles[j]);
                    let min_distance = pi.radius() + pj.radius();
                    let delta = pj.position - pi.position;
                    let distance_sq = delta.length_squared();

                    if distance_sq >= min_distance * min_distance {
                        continue;
                    }

                    let distance = distance_sq.sqrt();
                    let normal = if distance < COINCIDENT_EPSILON {
                        FALLBACK_AXIS
                    } else {
                        delta / distance
                    };

                    // Positional split keeps each particle's velocity intact
                    let push = normal * ((min_distance - distance) * 0.5);
                    let approach = (pj.velocity() - pi.velocity()).dot(normal);

                    self.particles[i].translate(-push);
                    self.particles[j].translate(push);

                    if approach < 0.0 {
                        let impulse = normal * (-(1.0 + restitution) * approach * 0.5);
                        self.particles[i].apply_impulse(-impulse);
                        self.particles[j].apply_impulse(impulse);
                    }

                    resolved += 1;
                }
            }

            if resolved == 0 {
                break;
            }
            log::trace!("internal collisions: resolved {resolved} overlapping pairs");
        }

        self.refresh_bounds();
    }

    /// Push particles out of geometry the body does not own.
    ///
    /// `contact` sees each particle with its index and returns a position
    /// correction, if any. Only the current position moves, so whatever
    /// velocity pointed into the obstacle is cancelled on the next step.
    /// Returns the number of particles moved.
    pub fn resolve_contacts<F>(&mut self, mut contact: F) -> usize
    where
        F: FnMut(usize, &Particle) -> Option<Vec3>,
    {
        let mut moved = 0;
        for (index, p) in self.particles.iter_mut().enumerate() {
            if let Some(push) = contact(index, p) {
                p.position += push;
                moved += 1;
            }
        }

        if moved > 0 {
            self.refresh_bounds();
        }
        moved
    }

    fn clamp_to_ground(&mut self, ground: f32) {
        let friction = self.config.ground_friction;

        for p in &mut self.particles {
            let rest_height = ground + p.radius();
            if p.position.y >= rest_height {
                continue;
            }

            let velocity = p.velocity();
            p.position.y = rest_height;
            p.set_velocity(Vec3::new(velocity.x * friction, 0.0, velocity.z * friction));
        }
    }

    fn refresh_bounds(&mut self) {
        self.bounding_box = Aabb::from_points(self.particles.iter().map(|p| p.position));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_particles(distance: f32, radius: f32) -> Body {
        Body::from_parts(
            BodyConfig::weightless(),
            &[(Vec3::ZERO, radius), (Vec3::new(distance, 0.0, 0.0), radius)],
            &[],
        )
        .unwrap()
    }

    #[test]
    fn test_from_parts() {
        let body = Body::from_parts(
            BodyConfig::default(),
            &[(Vec3::ZERO, 0.1), (Vec3::Y, 0.1), (Vec3::new(0.0, 3.0, 0.0), 0.1)],
            &[(0, 1), (1, 2)],
        )
        .unwrap();

        assert_eq!(body.len(), 3);
        assert_eq!(body.constraints().len(), 2);
        assert!((body.constraints()[1].rest_length() - 2.0).abs() < 1e-6);
        assert_eq!(body.first().position, Vec3::ZERO);
        assert_eq!(body.last().position, Vec3::new(0.0, 3.0, 0.0));
    }

    #[test]
    fn test_connect_rejects_bad_input() {
        let mut body = Body::new(BodyConfig::default());
        let a = body.add_particle(Vec3::ZERO, 0.1);
        let b = body.add_particle(Vec3::ZERO, 0.1);

        assert_eq!(
            body.connect(a, b),
            Err(BuildError::DegenerateConstraint { a, b })
        );
        assert_eq!(
            body.connect(a, 7),
            Err(BuildError::ParticleOutOfRange { index: 7, count: 2 })
        );
        assert!(body.constraints().is_empty());
    }

    #[test]
    fn test_from_parts_rejects_nan() {
        let result = Body::from_parts(BodyConfig::default(), &[(Vec3::NAN, 0.1)], &[]);
        assert_eq!(result.unwrap_err(), BuildError::NonFinite);
    }

    #[test]
    fn test_gravity_accelerates() {
        let mut body = Body::new(BodyConfig {
            air_friction: 1.0,
            ..Default::default()
        });
        body.add_particle(Vec3::new(0.0, 100.0, 0.0), 0.1);
        let g = body.config.gravity;

        body.update();
        body.update();
        body.update();

        // Velocity grows by exactly g each tick
        let v = body.first().velocity();
        assert!((v.y + 3.0 * g).abs() < 1e-5, "velocity {v:?}");
        // Fell g + 2g + 3g
        assert!((body.first().position.y - (100.0 - 6.0 * g)).abs() < 1e-4);
    }

    #[test]
    fn test_air_friction_damps() {
        let mut body = Body::new(BodyConfig {
            gravity: 0.0,
            air_friction: 0.5,
            ..Default::default()
        });
        body.add_particle(Vec3::ZERO, 0.1);
        body.first_mut().set_velocity(Vec3::new(1.0, 0.0, 0.0));

        body.update();
        assert!((body.first().velocity().x - 0.5).abs() < 1e-6);
        assert!((body.first().position.x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_bounding_box_tracks_particles() {
        let mut body = Body::from_parts(
            BodyConfig::weightless(),
            &[(Vec3::new(-1.0, 0.0, 2.0), 0.1), (Vec3::new(3.0, 5.0, -2.0), 0.1)],
            &[],
        )
        .unwrap();
        body.update();

        let aabb = body.bounding_box();
        assert_eq!(aabb.min, Vec3::new(-1.0, 0.0, -2.0));
        assert_eq!(aabb.max, Vec3::new(3.0, 5.0, 2.0));
    }

    #[test]
    fn test_internal_collision_separates() {
        let mut body = two_particles(0.5, 0.5);

        body.handle_internal_collisions();

        let distance = body.particles()[0].position.distance(body.particles()[1].position);
        assert!(distance >= 1.0 - 1e-5, "distance {distance}");
        // Split evenly around the midpoint
        assert!((body.particles()[0].position.x + 0.25).abs() < 1e-5);
        assert!((body.particles()[1].position.x - 0.75).abs() < 1e-5);
    }

    #[test]
    fn test_internal_collision_coincident() {
        let mut body = two_particles(0.0, 0.5);

        body.handle_internal_collisions();

        let a = body.particles()[0].position;
        let b = body.particles()[1].position;
        assert!(a.is_finite() && b.is_finite());
        assert!((a.distance(b) - 1.0).abs() < 1e-5);
        assert_eq!((b - a).normalize(), FALLBACK_AXIS);
    }

    #[test]
    fn test_internal_collision_restitution() {
        let mut body = two_particles(0.9, 0.5);
        body.particles_mut()[0].set_velocity(Vec3::new(1.0, 0.0, 0.0));
        body.particles_mut()[1].set_velocity(Vec3::new(-1.0, 0.0, 0.0));

        body.handle_internal_collisions();

        // Closing speed 2 reflected with restitution 0.5
        let v0 = body.particles()[0].velocity();
        let v1 = body.particles()[1].velocity();
        assert!((v0.x + 0.5).abs() < 1e-5, "v0 {v0:?}");
        assert!((v1.x - 0.5).abs() < 1e-5, "v1 {v1:?}");
    }

    #[test]
    fn test_separating_pair_keeps_velocity() {
        let mut body = two_particles(0.9, 0.5);
        body.particles_mut()[0].set_velocity(Vec3::new(-1.0, 0.0, 0.0));
        body.particles_mut()[1].set_velocity(Vec3::new(1.0, 0.0, 0.0));

        body.handle_internal_collisions();

        assert!((body.particles()[0].velocity().x + 1.0).abs() < 1e-5);
        assert!((body.particles()[1].velocity().x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_resolve_contacts() {
        let mut body = two_particles(2.0, 0.5);
        body.update();

        // A wall at x = 1.8 pushes back only the particle past it
        let moved = body.resolve_contacts(|_, p| {
            let overlap = p.position.x + p.radius() - 1.8;
            (overlap > 0.0).then(|| Vec3::new(-overlap, 0.0, 0.0))
        });

        assert_eq!(moved, 1);
        assert!((body.particles()[1].position.x - 1.3).abs() < 1e-6);
        assert_eq!(body.particles()[0].position, Vec3::ZERO);
        assert!((body.bounding_box().max.x - 1.3).abs() < 1e-6);
        // Pushed particle now carries the correction as velocity
        assert!((body.particles()[1].velocity().x + 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_ground_clamp() {
        let mut body = Body::new(BodyConfig::default().with_ground(0.0));
        body.add_particle(Vec3::new(0.0, 0.05, 0.0), 0.1);
        body.first_mut().set_velocity(Vec3::new(1.0, -1.0, 0.0));

        body.update();

        let p = body.first();
        assert!((p.position.y - 0.1).abs() < 1e-6);
        let v = p.velocity();
        assert_eq!(v.y, 0.0);
        assert!(v.x < 1.0 && v.x > 0.0, "tangential velocity damped: {v:?}");
    }

    #[test]
    fn test_json_keeps_motion() {
        let mut body = Body::from_parts(
            BodyConfig::weightless(),
            &[(Vec3::ZERO, 0.1), (Vec3::X, 0.1)],
            &[(0, 1)],
        )
        .unwrap();
        body.last_mut().set_velocity(Vec3::new(0.0, 0.2, 0.0));

        let json = serde_json::to_string(&body).unwrap();
        let mut loaded: Body = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.particles(), body.particles());
        assert_eq!(loaded.constraints(), body.constraints());
        assert_eq!(loaded.bounding_box(), body.bounding_box());

        body.update();
        loaded.update();
        assert_eq!(loaded.particles(), body.particles());
    }

    #[test]
    fn test_json_rejects_bad_constraints() {
        let body = Body::from_parts(
            BodyConfig::default(),
            &[(Vec3::ZERO, 0.1), (Vec3::Y, 0.1)],
            &[(0, 1)],
        )
        .unwrap();
        let valid = serde_json::to_value(&body).unwrap();

        let mut json = valid.clone();
        json["constraints"][0]["b"] = serde_json::json!(9);
        let err = serde_json::from_value::<Body>(json).unwrap_err();
        assert!(err.to_string().contains("particle index 9"), "{err}");

        let mut json = valid.clone();
        json["constraints"][0]["b"] = serde_json::json!(0);
        assert!(serde_json::from_value::<Body>(json).is_err());

        let mut json = valid;
        json["constraints"][0]["rest_length"] = serde_json::json!(0.0);
        assert!(serde_json::from_value::<Body>(json).is_err());
    }
}
