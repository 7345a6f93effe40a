//! Kill resolution, leveling, item drops and pickups.
//!
//! Every zombie death, whatever caused it, goes through [`take_kill`] and
//! then [`resolve_kill`]. `take_kill` flips the zombie to dead and hands
//! out a [`KillRecord`] only on the first call, so no death can be
//! rewarded twice.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::components::{EntityId, Item, Zombie};
use crate::data::{ItemKind, ZombieKind};
use crate::effects;
use crate::events::{KillEvent, KillSource, SoundId, TickEvents};
use crate::math::{circles_overlap, direction, Vec2};
use crate::world::{FrameContext, GamePhase, World};

/// Snapshot of a zombie at the moment it died.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KillRecord {
    /// Zombie id.
    pub id: EntityId,
    /// Archetype.
    pub kind: ZombieKind,
    /// Death position.
    pub position: Vec2,
    /// Score reward.
    pub score: u32,
    /// Xp reward.
    pub xp: u32,
    /// Drop multiplier.
    pub drop_multiplier: f32,
}

/// Mark a zombie dead if its health ran out. Returns a record only the
/// first time.
pub fn take_kill(zombie: &mut Zombie) -> Option<KillRecord> {
    if zombie.dead || zombie.health > 0.0 {
        return None;
    }
    zombie.dead = true;
    Some(KillRecord {
        id: zombie.id,
        kind: zombie.kind,
        position: zombie.position,
        score: zombie.score,
        xp: zombie.xp,
        drop_multiplier: zombie.drop_multiplier,
    })
}

/// Next xp threshold.
#[must_use]
pub fn next_max_xp(current: u32, multiplier: f32) -> u32 {
    ((current as f32 * multiplier).floor() as u32).max(current.saturating_add(1))
}

/// Award everything a kill is worth.
pub fn resolve_kill(
    ctx: &FrameContext<'_>,
    world: &mut World,
    kill: KillRecord,
    source: KillSource,
    events: &mut TickEvents,
) {
    let player = &mut world.player;
    player.score += u64::from(kill.score);
    player.kills += 1;
    player.xp += kill.xp;

    let leveling = &ctx.config.leveling;
    while player.max_xp > 0 && player.xp >= player.max_xp {
        player.xp -= player.max_xp;
        player.max_xp = next_max_xp(player.max_xp, leveling.xp_multiplier);
        player.level += 1;
        world.pending_upgrades += 1;
        world.phase = GamePhase::LevelUp;
        events.level_ups.push(player.level);
        events.sound(SoundId::LevelUp);
        tracing::info!(level = player.level, "player levelled up");
    }

    for item in &ctx.data.items.items {
        let chance = item.drop_chance * kill.drop_multiplier;
        if world.rng.gen::<f32>() < chance {
            let id = world.stores.next_id();
            let angle = world.rng.gen_range(0.0..std::f32::consts::TAU);
            world.stores.items.push(Item {
                id,
                kind: item.kind,
                position: kill.position,
                z: 0.0,
                vz: 150.0,
                velocity: direction(angle) * 40.0,
                life: item.lifetime,
                max_life: item.lifetime,
                radius: item.radius,
                value: item.value,
                color: item.color,
                dead: false,
            });
        }
    }

    world.wave_kills += 1;
    let per_wave = ctx.config.spawn.kills_per_wave;
    if per_wave > 0 && world.wave_kills >= per_wave {
        world.wave_kills = 0;
        world.wave += 1;
        events.wave_advanced = Some(world.wave);
        tracing::info!(wave = world.wave, "wave advanced");
    }

    effects::burst(
        &mut world.stores,
        &mut world.rng,
        kill.position,
        8,
        150.0,
        effects::BLOOD,
    );
    events.sound(SoundId::ZombieDeath);
    events.kills.push(KillEvent {
        zombie: kill.id,
        kind: kill.kind,
        position: kill.position,
        source,
        score: kill.score,
        xp: kill.xp,
    });
}

/// Collect items touching the player.
pub fn collect_items(ctx: &FrameContext<'_>, world: &mut World, events: &mut TickEvents) {
    let player = &mut world.player;
    let stores = &mut world.stores;
    let mut picked = Vec::new();

    for item in stores.items.iter_mut().filter(|i| !i.dead) {
        if !circles_overlap(player.position, player.radius, item.position, item.radius) {
            continue;
        }
        item.dead = true;
        match item.kind {
            ItemKind::Health => {
                player.health = (player.health + item.value).min(player.max_health);
            }
            ItemKind::Ammo => {
                player.ammo = player.max_ammo;
                player.reload.cancel();
            }
            ItemKind::Grenade => {
                player.grenade.cooldown = 0.0;
            }
        }
        picked.push((item.kind, item.position, item.value, item.color));
    }

    for (kind, position, value, color) in picked {
        let label = match kind {
            ItemKind::Health => format!("+{}", value.round() as i32),
            ItemKind::Ammo => "AMMO".to_string(),
            ItemKind::Grenade => "GRENADE".to_string(),
        };
        effects::text(stores, &ctx.config.physics, position, label, color);
        events.pickups.push(kind);
        events.sound(SoundId::Pickup);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::data::{GameData, ItemTable, UpgradeLevels, WeaponId};
    use crate::stats::{compute_stats, EffectiveStats};

    struct Env {
        config: SimulationConfig,
        data: GameData,
        stats: EffectiveStats,
    }

    impl Env {
        fn new(data: GameData) -> Self {
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
    }

    fn no_drops() -> GameData {
        GameData {
            items: ItemTable { items: Vec::new() },
            ..GameData::default()
        }
    }

    fn walker(env: &Env, health: f32) -> Zombie {
        let data = env.data.zombies.get(ZombieKind::Walker);
        let mut z = Zombie::new(7, &data, Vec2::new(50.0, 0.0), 1.0);
        z.health = health;
        z
    }

    #[test]
    fn test_take_kill_only_once() {
        let env = Env::new(no_drops());
        let mut z = walker(&env, -15.0);
        assert!(take_kill(&mut z).is_some());
        assert!(z.dead);
        assert!(take_kill(&mut z).is_none());
    }

    #[test]
    fn test_take_kill_ignores_living() {
        let env = Env::new(no_drops());
        let mut z = walker(&env, 1.0);
        assert!(take_kill(&mut z).is_none());
        assert!(!z.dead);
    }

    #[test]
    fn test_resolve_kill_awards_score_and_xp() {
        let env = Env::new(no_drops());
        let mut world = World::new(&env.config, &env.data, 1);
        let mut z = walker(&env, 0.0);
        let record = take_kill(&mut z).expect("dead");
        let mut events = TickEvents::default();
        resolve_kill(&env.ctx(), &mut world, record, KillSource::Bullet, &mut events);

        assert_eq!(world.player.kills, 1);
        assert_eq!(world.player.score, u64::from(record.score));
        assert_eq!(world.player.xp, record.xp);
        assert_eq!(events.kills.len(), 1);
        assert!(world.stores.items.is_empty());
    }

    #[test]
    fn test_level_up_carries_overflow_and_pauses() {
        let env = Env::new(no_drops());
        let mut world = World::new(&env.config, &env.data, 1);
        world.player.xp = 95;
        let mut z = walker(&env, 0.0);
        let record = take_kill(&mut z).expect("dead");
        let mut events = TickEvents::default();
        resolve_kill(&env.ctx(), &mut world, record, KillSource::Grenade, &mut events);

        assert_eq!(world.player.level, 2);
        assert_eq!(world.player.xp, 95 + record.xp - 100);
        assert_eq!(world.player.max_xp, 150);
        assert_eq!(world.phase, GamePhase::LevelUp);
        assert_eq!(world.pending_upgrades, 1);
        assert_eq!(events.level_ups, vec![2]);
    }

    #[test]
    fn test_wave_advances_every_n_kills() {
        let env = Env::new(no_drops());
        let mut world = World::new(&env.config, &env.data, 1);
        let mut events = TickEvents::default();
        for i in 0..env.config.spawn.kills_per_wave {
            let mut z = walker(&env, 0.0);
            z.id = u64::from(i);
            let record = take_kill(&mut z).expect("dead");
            resolve_kill(&env.ctx(), &mut world, record, KillSource::Bullet, &mut events);
        }
        assert_eq!(world.wave, 2);
        assert_eq!(events.wave_advanced, Some(2));
        assert_eq!(world.wave_kills, 0);
    }

    #[test]
    fn test_guaranteed_drop() {
        let mut data = GameData::default();
        for item in &mut data.items.items {
            item.drop_chance = if item.kind == ItemKind::Ammo { 1.0 } else { 0.0 };
        }
        let env = Env::new(data);
        let mut world = World::new(&env.config, &env.data, 1);
        let mut z = walker(&env, 0.0);
        let record = take_kill(&mut z).expect("dead");
        resolve_kill(
            &env.ctx(),
            &mut world,
            record,
            KillSource::Bullet,
            &mut TickEvents::default(),
        );
        assert_eq!(world.stores.items.len(), 1);
        assert_eq!(world.stores.items[0].kind, ItemKind::Ammo);
    }

    #[test]
    fn test_pickups_apply() {
        let env = Env::new(GameData::default());
        let mut world = World::new(&env.config, &env.data, 1);
        world.player.health = 50.0;
        world.player.ammo = 1;
        world.player.grenade.cooldown = 4.0;
        for kind in [ItemKind::Health, ItemKind::Ammo, ItemKind::Grenade] {
            let data = env.data.items.get(kind).expect("item").clone();
            let id = world.stores.next_id();
            world.stores.items.push(Item {
                id,
                kind,
                position: world.player.position,
                z: 0.0,
                vz: 0.0,
                velocity: Vec2::ZERO,
                life: data.lifetime,
                max_life: data.lifetime,
                radius: data.radius,
                value: data.value,
                color: data.color,
                dead: false,
            });
        }
        let mut events = TickEvents::default();
        collect_items(&env.ctx(), &mut world, &mut events);

        assert_eq!(events.pickups.len(), 3);
        assert_eq!(world.player.health, 75.0);
        assert_eq!(world.player.ammo, world.player.max_ammo);
        assert_eq!(world.player.grenade.cooldown, 0.0);
        assert!(world.stores.items.iter().all(|i| i.dead));
    }
}
