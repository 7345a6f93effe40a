//! Zombie spawning.
//!
//! Spawns happen on a timer that shortens each wave. Each spawn picks an
//! archetype by weight among those unlocked for the current wave and
//! places it on a ring around the player, outside the visible area.

use rand::Rng;

use crate::components::Zombie;
use crate::config::SpawnConfig;
use crate::data::{ZombieData, ZombieTable};
use crate::events::TickEvents;
use crate::math::{direction, Vec2};
use crate::world::{FrameContext, World};

/// Milliseconds between spawns on `wave`.
#[must_use]
pub fn spawn_interval_ms(config: &SpawnConfig, wave: u32) -> f32 {
    let reduction = config.interval_reduction_per_wave_ms * wave.saturating_sub(1) as f32;
    (config.base_interval_ms - reduction).max(config.min_interval_ms)
}

/// Health multiplier for zombies spawned on `wave`.
#[must_use]
pub fn health_scale(config: &SpawnConfig, wave: u32) -> f32 {
    1.0 + config.health_scale_per_wave * wave.saturating_sub(1) as f32
}

/// Weighted pick among archetypes unlocked on `wave`.
pub fn pick_archetype<'a, R: Rng + ?Sized>(
    table: &'a ZombieTable,
    wave: u32,
    rng: &mut R,
) -> Option<&'a ZombieData> {
    let total: f32 = table.available(wave).map(|z| z.spawn_weight).sum();
    if total <= 0.0 {
        return None;
    }
    let mut roll = rng.gen_range(0.0..total);
    let mut last = None;
    for z in table.available(wave) {
        if roll < z.spawn_weight {
            return Some(z);
        }
        roll -= z.spawn_weight;
        last = Some(z);
    }
    last
}

/// Random point on the spawn ring around `center`.
pub fn spawn_position<R: Rng + ?Sized>(config: &SpawnConfig, center: Vec2, rng: &mut R) -> Vec2 {
    let angle = rng.gen_range(0.0..std::f32::consts::TAU);
    let lo = config.min_distance.min(config.max_distance);
    let hi = config.min_distance.max(config.max_distance);
    let dist = if hi > lo { rng.gen_range(lo..hi) } else { lo };
    center + direction(angle) * dist
}

/// Spawn one zombie if the timer allows.
pub fn update_spawner(ctx: &FrameContext<'_>, world: &mut World, events: &mut TickEvents) {
    let config = &ctx.config.spawn;
    let interval = f64::from(spawn_interval_ms(config, world.wave));
    if world.time_ms - world.last_spawn_ms < interval {
        return;
    }
    if world.stores.living_zombies().count() >= config.max_zombies {
        return;
    }

    let Some(data) = pick_archetype(&ctx.data.zombies, world.wave, &mut world.rng) else {
        tracing::warn!(wave = world.wave, "no zombie archetype available");
        return;
    };
    let position = spawn_position(config, world.player.position, &mut world.rng);
    let id = world.stores.next_id();
    world.stores.zombies.push(Zombie::new(
        id,
        data,
        position,
        health_scale(config, world.wave),
    ));
    world.last_spawn_ms = world.time_ms;
    events.spawned.push(id);
}
