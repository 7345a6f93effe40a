//! Test fixtures and helpers.
//!
//! Pre-built simulations and scripted input for consistent testing.

use horde_core::components::{EntityId, Zombie};
use horde_core::config::SimulationConfig;
use horde_core::data::{GameData, WeaponId, ZombieKind};
use horde_core::input::FrameInput;
use horde_core::math::Vec2;
use horde_core::simulation::Simulation;
use horde_core::world::DEFAULT_VIEWPORT;

/// One 60 Hz frame.
pub const DT: f32 = 1.0 / 60.0;

/// Configuration with spawning switched off, for hand-placed scenarios.
#[must_use]
pub fn quiet_config() -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.spawn.max_zombies = 0;
    config
}

/// A simulation that never spawns on its own.
#[must_use]
pub fn quiet_sim(seed: u64) -> Simulation {
    Simulation::new(quiet_config(), GameData::default(), seed)
}

/// A quiet simulation with `weapon` equipped.
#[must_use]
pub fn armed_sim(seed: u64, weapon: WeaponId) -> Simulation {
    let mut sim = quiet_sim(seed);
    sim.switch_weapon(weapon);
    sim
}

/// Place a zombie relative to the player. `health` overrides the table value.
pub fn place_zombie(
    sim: &mut Simulation,
    kind: ZombieKind,
    offset: Vec2,
    health: Option<f32>,
) -> EntityId {
    let data = sim.data().zombies.get(kind);
    let world = sim.world_mut();
    let id = world.stores.next_id();
    let mut zombie = Zombie::new(id, &data, world.player.position + offset, 1.0);
    if let Some(health) = health {
        zombie.health = health;
        zombie.max_health = health;
    }
    world.stores.zombies.push(zombie);
    id
}

/// Screen point that aims the player along `direction` (the player sits at
/// the screen centre).
#[must_use]
pub fn aim_at(direction: Vec2) -> Vec2 {
    DEFAULT_VIEWPORT / 2.0 + direction.normalize_or_zero() * 200.0
}

/// Input that aims along `direction` and presses the trigger.
#[must_use]
pub fn fire_toward(direction: Vec2) -> FrameInput {
    FrameInput {
        aim_screen: aim_at(direction),
        fire_pressed: true,
        fire_held: true,
        ..FrameInput::default()
    }
}

/// A fixed, busy input script: strafing, periodic bursts, reloads,
/// dodges and grenades. Pure function of the frame index.
#[must_use]
pub fn scripted_input(frame: u64) -> FrameInput {
    let phase = frame % 240;
    let move_axis = match phase / 60 {
        0 => Vec2::X,
        1 => Vec2::Y,
        2 => -Vec2::X,
        _ => -Vec2::Y,
    };
    let angle = frame as f32 * 0.05;
    FrameInput {
        move_axis,
        aim_screen: DEFAULT_VIEWPORT / 2.0 + Vec2::new(angle.cos(), angle.sin()) * 250.0,
        fire_held: frame % 30 < 12,
        fire_pressed: frame % 30 == 0 || frame % 45 == 7,
        sprint_held: phase > 200,
        reload_pressed: frame % 170 == 90,
        dodge_pressed: frame % 211 == 100,
        grenade_pressed: frame % 300 == 150,
        pause_pressed: false,
    }
}

/// Advance `ticks` frames of [`scripted_input`].
pub fn run_scripted(sim: &mut Simulation, ticks: u64) {
    for frame in 0..ticks {
        sim.tick(DT, &scripted_input(frame));
        if sim.pending_upgrades() > 0 {
            sim.skip_upgrade();
        }
    }
}
