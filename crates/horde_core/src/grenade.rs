//! Grenades: throw, ballistic flight, rolling fuse, instant blast.
//!
//! A grenade copies its blast parameters when thrown, so levelling up while
//! one is in the air does not change it. Blast damage is applied in a
//! single pass on detonation; the shockwave rings are decoration only.

use rand::Rng;

use crate::combat::apply_knockback;
use crate::components::{ExplosionEffect, Grenade, GrenadeBlast, GrenadeState, Player, ShockRing};
use crate::config::GrenadeConfig;
use crate::effects;
use crate::events::{KillSource, SoundId, TickEvents};
use crate::math::{circle_within, direction, safe_normalize, tick_down, Vec2};
use crate::rewards::{next_max_xp, resolve_kill, take_kill, KillRecord};
use crate::world::{FrameContext, World};

/// Rings in the shockwave visual.
const RING_COUNT: usize = 3;
/// Delay between successive rings, as a fraction of the visual duration.
const RING_STAGGER: f32 = 0.15;

/// Blast parameters for a grenade level.
#[must_use]
pub fn grenade_blast(config: &GrenadeConfig, level: u32) -> GrenadeBlast {
    let steps = level.saturating_sub(1) as f32;
    GrenadeBlast {
        damage: config.base_damage + config.damage_per_level * steps,
        radius: config.base_radius + config.radius_per_level * steps,
        knockback: config.base_knockback + config.knockback_per_level * steps,
    }
}

/// Cooldown for a grenade level, never below the configured minimum.
#[must_use]
pub fn grenade_cooldown(config: &GrenadeConfig, level: u32) -> f32 {
    let steps = level.saturating_sub(1) as f32;
    (config.base_cooldown - config.cooldown_reduction_per_level * steps).max(config.min_cooldown)
}

/// Whether the player may throw now.
#[must_use]
pub fn can_throw(player: &Player) -> bool {
    player.grenade.cooldown <= 0.0 && !player.reload.is_reloading() && !player.dodge.active
}

/// Throw toward `target`. Returns whether a grenade left the hand.
pub fn throw_grenade(
    ctx: &FrameContext<'_>,
    world: &mut World,
    target: Vec2,
    events: &mut TickEvents,
) -> bool {
    let gc = &ctx.config.grenade;
    let player = &mut world.player;
    if !can_throw(player) {
        return false;
    }

    let offset = target - player.position;
    let dir = {
        let d = safe_normalize(offset);
        if d == Vec2::ZERO {
            direction(player.rotation)
        } else {
            d
        }
    };
    let speed = (offset.length() * gc.throw_speed_factor).min(gc.max_throw_speed);

    let id = world.stores.next_id();
    world.stores.grenades.push(Grenade {
        id,
        position: player.position,
        z: gc.launch_height,
        vz: gc.launch_vz,
        velocity: dir * speed,
        rotation: 0.0,
        life: gc.fuse,
        state: GrenadeState::Flying,
        blast: grenade_blast(gc, player.grenade.level),
        dead: false,
    });
    player.grenade.cooldown = player.grenade.max_cooldown;
    events.sound(SoundId::GrenadeThrow);
    tracing::debug!(level = player.grenade.level, "grenade thrown");
    true
}

/// Advance every grenade and detonate expired ones.
pub fn update_grenades(ctx: &FrameContext<'_>, world: &mut World, events: &mut TickEvents) {
    let gc = &ctx.config.grenade;
    let dt = ctx.dt;
    let mut detonations: Vec<(Vec2, GrenadeBlast)> = Vec::new();

    for g in world.stores.grenades.iter_mut().filter(|g| !g.dead) {
        g.position += g.velocity * dt;
        g.rotation += g.velocity.length() * dt * 0.05;
        match g.state {
            GrenadeState::Flying => {
                g.vz -= gc.gravity * dt;
                g.z += g.vz * dt;
                if g.z <= 0.0 {
                    g.z = 0.0;
                    let rebound = -g.vz * gc.bounciness;
                    g.velocity *= gc.ground_damping;
                    if rebound < gc.bounce_threshold {
                        g.vz = 0.0;
                        g.state = GrenadeState::Rolling;
                    } else {
                        g.vz = rebound;
                        events.sound(SoundId::GrenadeBounce);
                    }
                }
            }
            GrenadeState::Rolling => {
                g.velocity *= gc.rolling_friction.clamp(0.0, 1.0).powf(dt * 60.0);
                g.life = tick_down(g.life, dt);
                if g.life <= 0.0 {
                    g.dead = true;
                    detonations.push((g.position, g.blast));
                }
            }
        }
    }

    for (position, blast) in detonations {
        explode(ctx, world, position, blast, events);
    }
}

/// Apply a blast at `position` and stage its visual.
pub fn explode(
    ctx: &FrameContext<'_>,
    world: &mut World,
    position: Vec2,
    blast: GrenadeBlast,
    events: &mut TickEvents,
) {
    let gc = &ctx.config.grenade;
    let physics = &ctx.config.physics;
    let mut kills: Vec<KillRecord> = Vec::new();

    for zombie in world.stores.zombies.iter_mut().filter(|z| z.is_alive()) {
        if !circle_within(position, blast.radius, zombie.position, zombie.radius) {
            continue;
        }
        zombie.health -= blast.damage;
        zombie.hit_flash = physics.hit_flash;
        apply_knockback(
            zombie,
            zombie.position - position,
            blast.knockback,
            physics.knockback_duration,
        );
        if let Some(kill) = take_kill(zombie) {
            kills.push(kill);
        }
    }

    let kill_count = kills.len() as u32;
    for kill in kills {
        resolve_kill(ctx, world, kill, KillSource::Grenade, events);
    }
    grant_grenade_xp(gc, &mut world.player, kill_count * gc.xp_per_kill, events);

    let duration = gc.effect_duration.max(f32::EPSILON);
    let rings = (0..RING_COUNT)
        .map(|i| ShockRing {
            radius: 0.0,
            max_radius: blast.radius * (1.0 - 0.2 * i as f32),
            start_delay: duration * RING_STAGGER * i as f32,
            width: 6.0 - 1.5 * i as f32,
        })
        .collect();
    world.stores.explosions.push(ExplosionEffect {
        position,
        life: duration,
        max_life: duration,
        rings,
    });
    let debris = 12 + world.rng.gen_range(0..6);
    effects::burst(&mut world.stores, &mut world.rng, position, debris, 260.0, effects::SPARK);
    world.camera.add_shake(gc.shake);
    events.sound(SoundId::Explosion);
}

/// Grenade xp and its own level curve.
pub fn grant_grenade_xp(config: &GrenadeConfig, player: &mut Player, xp: u32, events: &mut TickEvents) {
    let g = &mut player.grenade;
    g.xp += xp;
    while g.max_xp > 0 && g.xp >= g.max_xp {
        g.xp -= g.max_xp;
        g.max_xp = next_max_xp(g.max_xp, config.xp_multiplier);
        g.level += 1;
        g.max_cooldown = grenade_cooldown(config, g.level);
        events.grenade_level_ups.push(g.level);
        tracing::info!(level = g.level, "grenade levelled up");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Zombie;
    use crate::config::SimulationConfig;
    use crate::data::{GameData, ItemTable, UpgradeLevels, WeaponId, ZombieKind};
    use crate::stats::{compute_stats, EffectiveStats};

    struct Env {
        config: SimulationConfig,
        data: GameData,
        stats: EffectiveStats,
    }

    impl Env {
        fn new() -> Self {
            let data = GameData {
                items: ItemTable { items: Vec::new() },
                ..GameData::default()
            };
            let stats = compute_stats(
                data.weapons.get(WeaponId::Pistol),
                &data.upgrades,
                &UpgradeLevels::new(),
                1,
                2.0,
            );
            Self {
                config: SimulationConfig::default(),
                data,
                stats,
            }
        }

        fn ctx(&self, dt: f32) -> FrameContext<'_> {
            FrameContext {
                config: &self.config,
                data: &self.data,
                stats: &self.stats,
                dt,
                now_ms: 0.0,
            }
        }
    }

    #[test]
    fn test_blast_scales_with_level() {
        let config = GrenadeConfig::default();
        let b1 = grenade_blast(&config, 1);
        let b3 = grenade_blast(&config, 3);
        assert_eq!(b1.damage, 80.0);
        assert_eq!(b3.damage, 120.0);
        assert_eq!(b3.radius, 150.0);
    }

    #[test]
    fn test_cooldown_floor() {
        let config = GrenadeConfig::default();
        assert_eq!(grenade_cooldown(&config, 1), 8.0);
        assert_eq!(grenade_cooldown(&config, 3), 6.5);
        assert_eq!(grenade_cooldown(&config, 50), 3.0);
    }

    #[test]
    fn test_throw_blocked_while_reloading_or_on_cooldown() {
        let env = Env::new();
        let mut world = World::new(&env.config, &env.data, 2);
        let mut events = TickEvents::default();
        world.player.grenade.cooldown = 1.0;
        assert!(!throw_grenade(&env.ctx(0.016), &mut world, Vec2::X * 100.0, &mut events));

        world.player.grenade.cooldown = 0.0;
        let qr = env.stats.quick_reload;
        world.player.reload.start(1.0, 1.0, &qr, &mut world.rng);
        assert!(!throw_grenade(&env.ctx(0.016), &mut world, Vec2::X * 100.0, &mut events));
        assert!(world.stores.grenades.is_empty());
    }

    #[test]
    fn test_in_flight_grenade_keeps_snapshot() {
        let env = Env::new();
        let mut world = World::new(&env.config, &env.data, 2);
        let mut events = TickEvents::default();
        assert!(throw_grenade(&env.ctx(0.016), &mut world, Vec2::new(200.0, 0.0), &mut events));
        let before = world.stores.grenades[0].blast;

        grant_grenade_xp(&env.config.grenade, &mut world.player, 100, &mut events);
        assert!(world.player.grenade.level > 1);
        assert_eq!(world.stores.grenades[0].blast, before);
    }

    #[test]
    fn test_grenade_lands_rolls_and_explodes() {
        let env = Env::new();
        let mut world = World::new(&env.config, &env.data, 2);
        let mut events = TickEvents::default();
        let target = Vec2::new(200.0, 0.0);
        throw_grenade(&env.ctx(0.016), &mut world, target, &mut events);

        let mut rolled = false;
        for _ in 0..600 {
            update_grenades(&env.ctx(0.016), &mut world, &mut events);
            if world.stores.grenades[0].state == GrenadeState::Rolling {
                rolled = true;
            }
            if world.stores.grenades[0].dead {
                break;
            }
        }
        assert!(rolled);
        assert!(world.stores.grenades[0].dead);
        assert_eq!(world.stores.explosions.len(), 1);
        assert!(events.sounds.contains(&SoundId::Explosion));
    }

    #[test]
    fn test_explosion_kills_through_reward_routine() {
        let env = Env::new();
        let mut world = World::new(&env.config, &env.data, 2);
        let data = env.data.zombies.get(ZombieKind::Walker);
        let center = Vec2::new(300.0, 0.0);
        for (i, offset) in [0.0_f32, 60.0, 500.0].into_iter().enumerate() {
            world
                .stores
                .zombies
                .push(Zombie::new(i as u64 + 1, &data, center + Vec2::X * offset, 1.0));
        }
        let mut events = TickEvents::default();
        let blast = grenade_blast(&env.config.grenade, 1);
        explode(&env.ctx(0.016), &mut world, center, blast, &mut events);

        assert_eq!(events.kills.len(), 2);
        assert!(events.kills.iter().all(|k| k.source == KillSource::Grenade));
        assert_eq!(world.player.kills, 2);
        assert_eq!(world.player.grenade.xp, 2);
        assert!(!world.stores.zombies[2].dead);
        let rings = &world.stores.explosions[0].rings;
        assert_eq!(rings.len(), RING_COUNT);
        assert!(rings.iter().all(|r| r.radius == 0.0));
    }

    #[test]
    fn test_blast_reaches_zombie_at_exact_edge() {
        let env = Env::new();
        let mut world = World::new(&env.config, &env.data, 2);
        let data = env.data.zombies.get(ZombieKind::Walker);
        let blast = grenade_blast(&env.config.grenade, 1);
        let edge = blast.radius + data.radius;
        world
            .stores
            .zombies
            .push(Zombie::new(1, &data, Vec2::new(edge, 0.0), 1.0));
        world
            .stores
            .zombies
            .push(Zombie::new(2, &data, Vec2::new(-(edge + 1.0), 0.0), 1.0));
        let mut events = TickEvents::default();
        explode(&env.ctx(0.016), &mut world, Vec2::ZERO, blast, &mut events);

        assert_eq!(events.kills.len(), 1);
        assert!(world.stores.zombies[0].dead);
        assert!(!world.stores.zombies[1].dead);
    }

    #[test]
    fn test_grenade_levels_reduce_cooldown() {
        let config = GrenadeConfig::default();
        let env = Env::new();
        let mut world = World::new(&env.config, &env.data, 2);
        let mut events = TickEvents::default();
        grant_grenade_xp(&config, &mut world.player, 5, &mut events);
        assert_eq!(world.player.grenade.level, 2);
        assert_eq!(world.player.grenade.max_cooldown, 7.25);
        assert_eq!(events.grenade_level_ups, vec![2]);
    }
}
