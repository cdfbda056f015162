//! Rigid distance constraints between two particles.

use serde::{Deserialize, Serialize};

use super::particle::Particle;

/// Distances below this are treated as coincident.
const COINCIDENT_EPSILON: f32 = 1e-6;

/// Holds two particles of the same body at a fixed distance.
///
/// The rest length is measured once, when the constraint is created, and never
/// changes. This is a rod, not a spring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// Index of the first particle.
    pub a: usize,
    /// Index of the second particle.
    pub b: usize,
    rest_length: f32,
}

impl Constraint {
    /// Callers validate indices and rest length; see [`Body::connect`](super::Body::connect).
    pub(crate) fn new(a: usize, b: usize, rest_length: f32) -> Self {
        Self { a, b, rest_length }
    }

    #[inline]
    pub fn rest_length(&self) -> f32 {
        self.rest_length
    }

    /// Current length error (positive when stretched).
    pub fn error(&self, particles: &[Particle]) -> f32 {
        particles[self.a].position.distance(particles[self.b].position) - self.rest_length
    }

    /// Project both endpoints half the error toward the rest length.
    ///
    /// Only positions move. The correction therefore shows up as velocity on
    /// the next Verlet step, which is what lets chains swing.
    pub(crate) fn relax(&self, particles: &mut [Particle]) {
        let delta = particles[self.b].position - particles[self.a].position;
        let length = delta.length();
        if length < COINCIDENT_EPSILON {
            return;
        }

        let correction = delta * (0.5 * (length - self.rest_length) / length);
        particles[self.a].position += correction;
        particles[self.b].position -= correction;
    }
}
