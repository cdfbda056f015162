//! Tether - Headless Driver
//!
//! Runs the fixed-step simulation without a window and logs what happens.
//!
//! ```text
//! tether [LEVEL.json] [TICKS]
//! ```
//!
//! With no level file the built-in test arena is used. Progress is logged at
//! `info`, so run with `RUST_LOG=info` (or `debug`/`trace` for more).

use std::error::Error;
use std::process::ExitCode;

use glam::Vec3;
use tether_physics::{humanoid, BodyConfig, HumanoidJoint};
use tether_sim::{Level, LevelError, PlayerInput, Simulation, SimulationConfig};

const DEFAULT_TICKS: u64 = 600;

/// Scripted input: walk forward, strafe right while jumping, then stand still.
fn scripted_input(frame: u64, tick_rate: u64) -> PlayerInput {
    let second = frame / tick_rate;
    let mut input = PlayerInput::default();

    match second {
        0..=1 => input.movement.forward = true,
        2..=3 => {
            input.movement.right = true;
            input.jump = frame % (tick_rate / 2).max(1) == 0;
        }
        _ => {}
    }
    input
}

fn load_level(path: Option<&str>) -> Result<Level, LevelError> {
    match path {
        Some(path) => {
            log::info!("Loading level from {path}");
            Level::load(path)
        }
        None => Level::test_arena(),
    }
}

fn run(path: Option<&str>, ticks: u64) -> Result<(), Box<dyn Error>> {
    let level = load_level(path)?;
    let config = SimulationConfig::default();
    let tick_rate = u64::from(config.tick_rate).max(1);
    let mut sim = Simulation::new(config, level)?;

    // A ragdoll dropped next to the spawn, integrated alongside the level
    let mut ragdoll = humanoid(
        sim.level.spawn + Vec3::new(2.0, 4.0, 0.0),
        1.8,
        BodyConfig::ragdoll(),
    )?;

    log::info!(
        "Running '{}' for {ticks} ticks ({} shapes, {} ropes)",
        sim.level.name,
        sim.level.shape_count(),
        sim.ropes.len()
    );

    for _ in 0..ticks {
        let input = scripted_input(sim.frame, tick_rate);
        sim.tick(&input);

        ragdoll.handle_internal_collisions();
        ragdoll.update();

        if sim.frame % tick_rate == 0 {
            log::info!(
                "t={:>3}s player {:?} ground={} speed={:.3}",
                sim.frame / tick_rate,
                sim.player.position,
                sim.player.on_ground,
                sim.player.ground_speed()
            );
            for (i, rope) in sim.ropes.iter().enumerate() {
                log::info!("  rope {i} free end {:?}", rope.free_end());
            }
            log::info!(
                "  ragdoll head {:?}",
                ragdoll.particles()[HumanoidJoint::Head.index()].position
            );
        }
    }

    log::info!("Finished after {} ticks", sim.frame);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let path = args.next();
    let ticks = match args.next().map(|t| t.parse::<u64>()) {
        None => DEFAULT_TICKS,
        Some(Ok(ticks)) => ticks,
        Some(Err(e)) => {
            log::error!("Invalid tick count: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(path.as_deref(), ticks) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
