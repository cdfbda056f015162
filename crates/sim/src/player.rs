//! The player: a sphere walking around level geometry.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::input::PlayerInput;
use crate::level::Level;

/// Player movement tunables. Speeds are per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Collision sphere radius.
    pub radius: f32,

    /// Target horizontal speed while walking.
    pub move_speed: f32,

    /// Upward speed given by a jump.
    pub jump_speed: f32,

    /// Downward speed added every tick.
    pub gravity: f32,

    /// Fall speed cap. Kept below the radius so the sphere can't skip
    /// through a floor in one tick.
    pub max_fall_speed: f32,

    /// Fraction of the speed difference corrected per tick while airborne
    /// (on the ground it is 1).
    pub air_control: f32,

    /// A push whose direction has at least this much +Y counts as standing
    /// on something.
    pub floor_threshold: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            radius: 0.5,
            move_speed: 0.15,
            jump_speed: 0.35,
            gravity: 0.02,
            max_fall_speed: 0.45,
            air_control: 0.1,
            floor_threshold: 0.7,
        }
    }
}

/// Player state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Sphere centre.
    pub position: Vec3,

    /// Velocity (units/tick).
    pub velocity: Vec3,

    /// Collision radius.
    pub radius: f32,

    /// Whether the last step ended resting on a floor.
    pub on_ground: bool,
}

impl Player {
    /// Create a player at rest, in the air until the first step says otherwise.
    pub fn new(position: Vec3, radius: f32) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            radius,
            on_ground: false,
        }
    }

    /// Advance one tick: steer, jump, fall, then push out of the level.
    pub fn step(
        &mut self,
        input: &PlayerInput,
        config: &PlayerConfig,
        level: &Level,
        iterations: usize,
    ) {
        let wish = input.wish_direction() * config.move_speed;
        let control = if self.on_ground { 1.0 } else { config.air_control };
        self.velocity.x += (wish.x - self.velocity.x) * control;
        self.velocity.z += (wish.z - self.velocity.z) * control;

        if input.jump && self.on_ground {
            self.velocity.y = config.jump_speed;
            log::debug!("Player jumped at {:?}", self.position);
        }
        self.velocity.y = (self.velocity.y - config.gravity).max(-config.max_fall_speed);

        self.position += self.velocity;

        let contact = level.resolve_sphere(self.position, self.radius, iterations);
        self.position = contact.center;

        // Drop the velocity component that drove into the geometry
        if let Some(normal) = contact.push.try_normalize() {
            let into = self.velocity.dot(normal);
            if into < 0.0 {
                self.velocity -= normal * into;
            }
        }

        let was_on_ground = self.on_ground;
        self.on_ground = contact.support >= config.floor_threshold;
        if self.on_ground && !was_on_ground {
            log::debug!("Player landed at {:?}", self.position);
        }
    }

    /// Horizontal speed (units/tick).
    pub fn ground_speed(&self) -> f32 {
        Vec3::new(self.velocity.x, 0.0, self.velocity.z).length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{LevelDef, ShapeDef};
    use approx::assert_abs_diff_eq;
    use glam::Quat;

    /// A floor with its top at y = 0 and a wall whose near face is at x = 4.5.
    fn room() -> Level {
        let solid = |center: Vec3, half_extents: Vec3| ShapeDef::Box {
            center,
            half_extents,
            rotation: Quat::IDENTITY,
        };
        Level::from_def(&LevelDef {
            name: "room".to_string(),
            spawn: Vec3::new(0.0, 3.0, 0.0),
            shapes: vec![
                solid(Vec3::new(0.0, -0.5, 0.0), Vec3::new(10.0, 0.5, 10.0)),
                solid(Vec3::new(5.0, 2.0, 0.0), Vec3::new(0.5, 2.0, 10.0)),
            ],
            ropes: Vec::new(),
        })
        .unwrap()
    }

    fn run(player: &mut Player, input: PlayerInput, ticks: usize, level: &Level) {
        let config = PlayerConfig::default();
        for _ in 0..ticks {
            player.step(&input, &config, level, 4);
        }
    }

    #[test]
    fn test_falls_and_lands() {
        let level = room();
        let mut player = Player::new(level.spawn, 0.5);

        run(&mut player, PlayerInput::default(), 120, &level);

        assert!(player.on_ground);
        assert_abs_diff_eq!(player.position.y, 0.5, epsilon = 1e-4);
        assert_abs_diff_eq!(player.velocity.y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_walks_and_stops_at_wall() {
        let level = room();
        let mut player = Player::new(Vec3::new(0.0, 0.5, 0.0), 0.5);
        run(&mut player, PlayerInput::default(), 5, &level);

        let mut input = PlayerInput::default();
        input.movement.right = true;
        run(&mut player, input, 200, &level);

        assert!(player.on_ground);
        assert!(player.position.x <= 4.0 + 1e-3, "{:?}", player.position);
        assert!(player.position.x > 3.5, "{:?}", player.position);
        // Pressing into the wall leaves no speed along it
        assert!(player.velocity.x.abs() < 1e-3, "{:?}", player.velocity);
    }

    #[test]
    fn test_jump_needs_ground() {
        let level = room();
        let mut player = Player::new(Vec3::new(0.0, 0.5, 0.0), 0.5);
        run(&mut player, PlayerInput::default(), 5, &level);
        assert!(player.on_ground);

        let jump = PlayerInput {
            jump: true,
            ..Default::default()
        };
        let config = PlayerConfig::default();
        player.step(&jump, &config, &level, 4);

        assert!(!player.on_ground);
        assert!(player.velocity.y > 0.0);
        let apex_speed = player.velocity.y;

        // No double jump in the air
        player.step(&jump, &config, &level, 4);
        assert!(player.velocity.y < apex_speed);
    }

    #[test]
    fn test_fall_speed_is_capped() {
        let level = Level::from_def(&LevelDef {
            name: "void".to_string(),
            spawn: Vec3::ZERO,
            shapes: Vec::new(),
            ropes: Vec::new(),
        })
        .unwrap();
        let mut player = Player::new(Vec3::ZERO, 0.5);

        run(&mut player, PlayerInput::default(), 500, &level);

        let config = PlayerConfig::default();
        assert_abs_diff_eq!(player.velocity.y, -config.max_fall_speed, epsilon = 1e-6);
        assert!(!player.on_ground);
    }
}
