//! Anchored ropes draped over level geometry.

use glam::Vec3;
use tether_physics::{rope, Body, BodyConfig, BuildError};

use crate::level::{Level, RopeDef};

/// A Verlet rope whose first particle is pinned to `anchor`.
#[derive(Debug, Clone)]
pub struct Rope {
    /// The particle chain.
    pub body: Body,

    /// World position the first particle is held at.
    pub anchor: Vec3,
}

impl Rope {
    /// Lay the rope out straight from the anchor to the definition's end.
    pub fn from_def(def: &RopeDef, config: BodyConfig) -> Result<Self, BuildError> {
        let body = rope(def.anchor, def.end, def.segments, def.radius, config)?;
        Ok(Self {
            body,
            anchor: def.anchor,
        })
    }

    /// Advance one tick.
    ///
    /// The anchor is placed before the body update so it never lags a frame.
    /// After the update every free particle is pushed out of the level.
    pub fn tick(&mut self, level: &Level, self_collision: bool) {
        self.body.first_mut().place(self.anchor);
        self.body.update();

        if self_collision {
            self.body.handle_internal_collisions();
        }

        let pushed = self.body.resolve_contacts(|index, particle| {
            if index == 0 {
                return None;
            }
            level.push_out(particle.position, particle.radius())
        });
        if pushed > 0 {
            log::trace!("rope at {:?}: {pushed} particles in contact", self.anchor);
        }
    }

    /// Position of the last particle.
    pub fn free_end(&self) -> Vec3 {
        self.body.last().position
    }
}
