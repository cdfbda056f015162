//! The fixed-step simulation loop.
//!
//! Each tick moves the player, then every rope, in a fixed order. Nothing
//! reads the clock or a random source, so replaying the same inputs gives the
//! same state bit for bit.

use serde::{Deserialize, Serialize};
use tether_physics::BodyConfig;

use crate::input::PlayerInput;
use crate::level::{Level, LevelError};
use crate::player::{Player, PlayerConfig};
use crate::rope::Rope;

/// Simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Simulation tick rate (ticks per second).
    pub tick_rate: u32,

    /// Player movement tunables.
    pub player: PlayerConfig,

    /// Integrator settings shared by every rope.
    pub rope: BodyConfig,

    /// Passes over the level when pushing a sphere out of geometry.
    pub collision_iterations: usize,

    /// Keep rope particles from overlapping each other.
    pub rope_self_collision: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            player: PlayerConfig::default(),
            rope: BodyConfig::rope(),
            collision_iterations: 4,
            rope_self_collision: false,
        }
    }
}

/// The whole simulated world.
#[derive(Debug, Clone)]
pub struct Simulation {
    /// Current frame/tick number.
    pub frame: u64,

    /// Simulation configuration.
    pub config: SimulationConfig,

    /// Static geometry.
    pub level: Level,

    /// The player sphere.
    pub player: Player,

    /// Ropes spawned from the level's definitions.
    pub ropes: Vec<Rope>,
}

impl Simulation {
    /// Spawn the player at the level's spawn point and hang its ropes.
    pub fn new(config: SimulationConfig, level: Level) -> Result<Self, LevelError> {
        let ropes = level
            .ropes
            .iter()
            .enumerate()
            .map(|(index, def)| {
                Rope::from_def(def, config.rope.clone())
                    .map_err(|source| LevelError::Rope { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let player = Player::new(level.spawn, config.player.radius);

        log::debug!(
            "Simulation ready: level '{}', {} ropes, {} Hz",
            level.name,
            ropes.len(),
            config.tick_rate
        );

        Ok(Self {
            frame: 0,
            config,
            level,
            player,
            ropes,
        })
    }

    /// Default configuration in the test arena.
    pub fn test() -> Result<Self, LevelError> {
        Self::new(SimulationConfig::default(), Level::test_arena()?)
    }

    /// Advance the simulation by one tick.
    pub fn tick(&mut self, input: &PlayerInput) {
        let iterations = self.config.collision_iterations;

        self.player
            .step(input, &self.config.player, &self.level, iterations);

        for rope in &mut self.ropes {
            rope.tick(&self.level, self.config.rope_self_collision);
        }

        self.frame += 1;
        log::trace!("frame {} player at {:?}", self.frame, self.player.position);
    }
}

// ============================================================================
// Tests
// ============================================================================
