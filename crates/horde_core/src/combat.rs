//! Collisions and their immediate consequences.
//!
//! Bullet–zombie and player–zombie checks are plain circle overlaps over
//! every pair. Zombies killed here are marked dead on the spot so later
//! checks in the same frame skip them; rewards are handed out afterwards
//! through [`crate::rewards`].

use rand::Rng;

use crate::components::Zombie;
use crate::effects;
use crate::events::{KillSource, SoundId, TickEvents};
use crate::math::{circles_overlap, safe_normalize, Vec2};
use crate::rewards::{resolve_kill, take_kill, KillRecord};
use crate::world::{FrameContext, World};

/// Push a zombie by `distance` along `dir` over `duration` seconds.
///
/// The zombie's own knockback resistance scales the distance.
pub fn apply_knockback(zombie: &mut Zombie, dir: Vec2, distance: f32, duration: f32) {
    let dir = safe_normalize(dir);
    if dir == Vec2::ZERO || distance <= 0.0 {
        return;
    }
    let duration = duration.max(f32::EPSILON);
    zombie.knockback_velocity = dir * (distance * zombie.knockback_taken / duration);
    zombie.knockback_timer = duration;
}

/// Bullets against zombies.
pub fn resolve_bullet_hits(ctx: &FrameContext<'_>, world: &mut World, events: &mut TickEvents) {
    let physics = &ctx.config.physics;
    let mut kills: Vec<KillRecord> = Vec::new();
    let mut texts: Vec<(Vec2, String, bool)> = Vec::new();

    let stores = &mut world.stores;
    for bullet in stores.bullets.iter_mut().filter(|b| !b.dead) {
        for zombie in stores.zombies.iter_mut() {
            if !zombie.is_alive() || bullet.has_hit(zombie.id) {
                continue;
            }
            if !circles_overlap(
                bullet.position,
                physics.bullet_radius,
                zombie.position,
                zombie.radius,
            ) {
                continue;
            }

            let damage = bullet.hit_damage();
            zombie.health -= damage;
            zombie.hit_flash = physics.hit_flash;
            apply_knockback(
                zombie,
                bullet.velocity,
                bullet.knockback,
                physics.knockback_duration,
            );
            if let Some(slow) = bullet.slow {
                zombie.slow_factor = slow.factor;
                zombie.slow_timer = slow.duration;
            }
            texts.push((zombie.position, format!("{}", damage.round() as i32), bullet.is_critical));
            events.sound(SoundId::ZombieHit);

            if let Some(kill) = take_kill(zombie) {
                kills.push(kill);
            }

            let roll = world.rng.gen::<f32>();
            if !bullet.register_hit(zombie.id, roll) {
                break;
            }
        }
    }

    for (position, text, critical) in texts {
        let color = if critical {
            effects::CRIT_TEXT
        } else {
            effects::DAMAGE_TEXT
        };
        effects::text(&mut world.stores, physics, position, text, color);
        effects::burst(&mut world.stores, &mut world.rng, position, 3, 80.0, effects::BLOOD);
    }

    for kill in kills {
        resolve_kill(ctx, world, kill, KillSource::Bullet, events);
    }
}

/// Player against zombies: sprint shoves, otherwise contact damage.
pub fn resolve_contacts(ctx: &FrameContext<'_>, world: &mut World, events: &mut TickEvents) {
    let pc = &ctx.config.player;
    let physics = &ctx.config.physics;
    let player = &mut world.player;
    let invulnerable = player.is_invulnerable(pc.dodge_invuln_start, pc.dodge_invuln_end);

    let mut taken = 0.0;
    for zombie in world.stores.zombies.iter_mut().filter(|z| z.is_alive()) {
        if !circles_overlap(player.position, player.radius, zombie.position, zombie.radius) {
            continue;
        }
        if player.is_sprinting {
            apply_knockback(
                zombie,
                zombie.position - player.position,
                pc.sprint_knockback * physics.knockback_duration,
                physics.knockback_duration,
            );
        } else if !invulnerable {
            taken += zombie.damage;
        }
    }

    if taken <= 0.0 {
        return;
    }
    player.health -= taken;
    player.pending_damage_text += taken;
    events.damage_taken += taken;

    let threshold = pc.damage_text_threshold.max(f32::EPSILON);
    if player.pending_damage_text >= threshold {
        let shown = player.pending_damage_text.floor();
        player.pending_damage_text -= shown;
        let position = player.position;
        effects::text(
            &mut world.stores,
            physics,
            position,
            format!("-{}", shown as i32),
            effects::HURT_TEXT,
        );
        world.camera.add_shake(4.0);
        events.sound(SoundId::PlayerHurt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Bullet;
    use crate::config::SimulationConfig;
    use crate::data::{
        GameData, ItemTable, PenetrationStats, UpgradeLevels, WeaponId, ZombieKind,
    };
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

        fn ctx(&self) -> FrameContext<'_> {
            FrameContext {
                config: &self.config,
                data: &self.data,
                stats: &self.stats,
                dt: 0.016,
                now_ms: 0.0,
            }
        }

        fn world(&self) -> World {
            World::new(&self.config, &self.data, 5)
        }

        fn zombie(&self, world: &mut World, position: Vec2, health: f32) -> u64 {
            let data = self.data.zombies.get(ZombieKind::Walker);
            let id = world.stores.next_id();
            let mut z = Zombie::new(id, &data, position, 1.0);
            z.health = health;
            world.stores.zombies.push(z);
            id
        }
    }

    fn bullet(position: Vec2, count: u32) -> Bullet {
        Bullet {
            id: 999,
            position,
            velocity: Vec2::new(800.0, 0.0),
            damage: 25.0,
            is_critical: false,
            critical_multiplier: 2.0,
            distance_traveled: 0.0,
            max_distance: 1000.0,
            knockback: 10.0,
            slow: None,
            penetration: PenetrationStats {
                count,
                chance: 0.0,
                damage_drop: 0.2,
            },
            hit_count: 0,
            extended: false,
            hit_ids: Vec::new(),
            dead: false,
        }
    }

    #[test]
    fn test_lethal_hit_kills_once() {
        let env = Env::new();
        let mut world = env.world();
        let at = Vec2::new(100.0, 0.0);
        env.zombie(&mut world, at, 10.0);
        world.stores.bullets.push(bullet(at, 1));

        let mut events = TickEvents::default();
        resolve_bullet_hits(&env.ctx(), &mut world, &mut events);
        assert_eq!(world.stores.zombies[0].health, -15.0);
        assert!(world.stores.zombies[0].dead);
        assert_eq!(events.kills.len(), 1);
        assert!(world.stores.bullets[0].dead);

        world.stores.bullets.push(bullet(at, 1));
        let mut events = TickEvents::default();
        resolve_bullet_hits(&env.ctx(), &mut world, &mut events);
        assert!(events.kills.is_empty());
        assert_eq!(world.player.kills, 1);
    }

    #[test]
    fn test_bullet_never_hits_same_zombie_twice() {
        let env = Env::new();
        let mut world = env.world();
        let at = Vec2::new(100.0, 0.0);
        env.zombie(&mut world, at, 100.0);
        world.stores.bullets.push(bullet(at, 3));

        for _ in 0..5 {
            resolve_bullet_hits(&env.ctx(), &mut world, &mut TickEvents::default());
        }
        assert_eq!(world.stores.zombies[0].health, 75.0);
        assert_eq!(world.stores.bullets[0].hit_count, 1);
    }

    #[test]
    fn test_penetration_falloff_across_targets() {
        let env = Env::new();
        let mut world = env.world();
        let at = Vec2::new(100.0, 0.0);
        env.zombie(&mut world, at, 100.0);
        env.zombie(&mut world, at, 100.0);
        world.stores.bullets.push(bullet(at, 2));

        resolve_bullet_hits(&env.ctx(), &mut world, &mut TickEvents::default());
        assert_eq!(world.stores.zombies[0].health, 75.0);
        assert!((world.stores.zombies[1].health - 80.0).abs() < 1e-4);
        assert!(world.stores.bullets[0].dead);
    }

    #[test]
    fn test_hit_applies_knockback_and_slow() {
        let env = Env::new();
        let mut world = env.world();
        let at = Vec2::new(100.0, 0.0);
        env.zombie(&mut world, at, 100.0);
        let mut b = bullet(at, 1);
        b.slow = Some(crate::data::SlowEffect {
            factor: 0.5,
            duration: 1.0,
        });
        world.stores.bullets.push(b);
        resolve_bullet_hits(&env.ctx(), &mut world, &mut TickEvents::default());

        let z = &world.stores.zombies[0];
        assert!(z.knockback_velocity.x > 0.0);
        assert_eq!(z.slow_factor, 0.5);
        assert_eq!(z.slow_timer, 1.0);
    }

    #[test]
    fn test_contact_damage_accumulates_text() {
        let env = Env::new();
        let mut world = env.world();
        env.zombie(&mut world, Vec2::new(10.0, 0.0), 50.0);

        for _ in 0..9 {
            resolve_contacts(&env.ctx(), &mut world, &mut TickEvents::default());
        }
        assert!((world.player.health - 95.5).abs() < 1e-4);
        assert!(world.stores.texts.is_empty());

        resolve_contacts(&env.ctx(), &mut world, &mut TickEvents::default());
        assert_eq!(world.stores.texts.len(), 1);
        assert_eq!(world.stores.texts[0].text, "-5");
    }

    #[test]
    fn test_dodge_window_blocks_damage() {
        let env = Env::new();
        let mut world = env.world();
        env.zombie(&mut world, Vec2::new(10.0, 0.0), 50.0);
        world.player.dodge.active = true;
        world.player.dodge.elapsed = 0.1;
        let mut events = TickEvents::default();
        resolve_contacts(&env.ctx(), &mut world, &mut events);
        assert_eq!(world.player.health, world.player.max_health);
        assert_eq!(events.damage_taken, 0.0);
    }

    #[test]
    fn test_sprint_shoves_without_damage() {
        let env = Env::new();
        let mut world = env.world();
        env.zombie(&mut world, Vec2::new(10.0, 0.0), 50.0);
        world.player.is_sprinting = true;
        resolve_contacts(&env.ctx(), &mut world, &mut TickEvents::default());
        assert_eq!(world.player.health, world.player.max_health);
        assert!(world.stores.zombies[0].knockback_velocity.x > 0.0);
    }
}
