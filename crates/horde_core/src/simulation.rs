//! The simulation: owns all state and advances it one frame at a time.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::aim::update_aim;
use crate::combat;
use crate::components::Player;
use crate::config::SimulationConfig;
use crate::data::{GameData, WeaponId, WeaponPart};
use crate::events::{GameOverInfo, SoundId, StatsSnapshot, TickEvents};
use crate::grenade;
use crate::input::FrameInput;
use crate::math::Vec2;
use crate::physics;
use crate::rewards;
use crate::shooting::{self, RecoilState};
use crate::spawner;
use crate::stats::{EffectiveStats, StatsCache};
use crate::world::{FrameContext, GamePhase, World};

/// The core game simulation.
///
/// Owns configuration, static data, memoized weapon stats and the mutable
/// [`World`]. The host calls [`Simulation::tick`] once per frame with the
/// elapsed time and that frame's input.
///
/// # System Execution Order
///
/// Each tick, systems run in this order:
/// 1. **Player** - dodge, sprint, stamina, walking, camera follow
/// 2. **Aim** - delayed aim queue and turning
/// 3. **Grenade throw**
/// 4. **Weapon** - reload timers, reload key, trigger
/// 5. **Spawner**
/// 6. **Zombies** - chase, knockback, slow
/// 7. **Bullets** - integrate, then bullet-zombie hits
/// 8. **Grenades** - flight, fuse, blasts
/// 9. **Contacts** - player-zombie
/// 10. **Pickups**
/// 11. **Props** - shells, particles, texts, explosion visuals, shake
/// 12. **Cleanup** - cull distant zombies, death check, sweep
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
    data: GameData,
    cache: StatsCache,
    stats: EffectiveStats,
    world: World,
}

impl Simulation {
    /// A fresh run.
    #[must_use]
    pub fn new(config: SimulationConfig, data: GameData, seed: u64) -> Self {
        let world = World::new(&config, &data, seed);
        let mut cache = StatsCache::new();
        let stats = cache.get(
            &data,
            world.player.weapon,
            &world.upgrades,
            world.player.level,
            config.leveling.damage_per_level,
        );
        tracing::info!(seed, weapon = %world.player.weapon, "simulation started");
        let mut sim = Self {
            config,
            data,
            cache,
            stats,
            world,
        };
        sim.sync_magazine();
        sim.world.player.ammo = sim.world.player.max_ammo;
        sim
    }

    /// A fresh run with built-in tables.
    #[must_use]
    pub fn with_defaults(seed: u64) -> Self {
        Self::new(SimulationConfig::default(), GameData::default(), seed)
    }

    /// Tuning constants.
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Static tables.
    #[must_use]
    pub fn data(&self) -> &GameData {
        &self.data
    }

    /// All mutable state.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access for scenario setup and tests.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The player.
    #[must_use]
    pub fn player(&self) -> &Player {
        &self.world.player
    }

    /// Effective stats of the equipped weapon.
    #[must_use]
    pub fn stats(&self) -> &EffectiveStats {
        &self.stats
    }

    /// Lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> GamePhase {
        self.world.phase
    }

    /// Ticks advanced while playing.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.world.tick
    }

    /// Seed this run started from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.world.seed
    }

    /// Report the screen size used for aiming.
    pub fn set_viewport(&mut self, size: Vec2) {
        if size.x > 0.0 && size.y > 0.0 {
            self.world.camera.viewport = size;
        }
    }

    /// Freeze a running game.
    pub fn pause(&mut self) {
        if self.world.phase == GamePhase::Playing {
            self.world.phase = GamePhase::Paused;
        }
    }

    /// Unfreeze a paused game.
    pub fn resume(&mut self) {
        if self.world.phase == GamePhase::Paused {
            self.world.phase = GamePhase::Playing;
        }
    }

    fn refresh_stats(&mut self) {
        self.stats = self.cache.get(
            &self.data,
            self.world.player.weapon,
            &self.world.upgrades,
            self.world.player.level,
            self.config.leveling.damage_per_level,
        );
        self.sync_magazine();
    }

    fn sync_magazine(&mut self) {
        let player = &mut self.world.player;
        player.max_ammo = self.stats.max_ammo;
        player.ammo = player.ammo.min(player.max_ammo);
    }

    /// Advance one frame.
    ///
    /// `dt` is the wall-clock delta in seconds; it is clamped to the
    /// configured maximum. Nothing advances unless the phase is
    /// [`GamePhase::Playing`], but every call carries a stats snapshot.
    pub fn tick(&mut self, dt: f32, input: &FrameInput) -> TickEvents {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, self.config.physics.max_delta)
        } else {
            0.0
        };
        self.world.pointer = input.aim_screen;

        if input.pause_pressed {
            match self.world.phase {
                GamePhase::Playing => self.pause(),
                GamePhase::Paused => self.resume(),
                GamePhase::LevelUp | GamePhase::GameOver => {}
            }
        }
        if !self.world.is_playing() {
            return TickEvents {
                stats: Some(self.snapshot()),
                ..TickEvents::default()
            };
        }

        self.refresh_stats();
        self.world.tick += 1;
        self.world.time_ms += f64::from(dt) * 1000.0;

        let mut events = TickEvents::default();
        let ctx = FrameContext {
            config: &self.config,
            data: &self.data,
            stats: &self.stats,
            dt,
            now_ms: self.world.time_ms,
        };
        let world = &mut self.world;

        physics::update_player(&ctx, world, input, &mut events);
        update_aim(&ctx, world);
        if input.grenade_pressed {
            let target = world.camera.screen_to_world(world.pointer);
            grenade::throw_grenade(&ctx, world, target, &mut events);
        }
        shooting::update_weapon(&ctx, world, input, &mut events);
        spawner::update_spawner(&ctx, world, &mut events);
        physics::update_zombies(&ctx, world);
        physics::update_bullets(&ctx, world);
        combat::resolve_bullet_hits(&ctx, world, &mut events);
        grenade::update_grenades(&ctx, world, &mut events);
        combat::resolve_contacts(&ctx, world, &mut events);
        rewards::collect_items(&ctx, world, &mut events);
        physics::update_props(&ctx, world);
        physics::cull_distant_zombies(&ctx, world);

        let player = &mut world.player;
        player.health = player.health.clamp(0.0, player.max_health);
        if player.is_dead() {
            world.phase = GamePhase::GameOver;
            if !world.game_over_reported {
                world.game_over_reported = true;
                let info = GameOverInfo {
                    score: player.score,
                    kills: player.kills,
                    wave: world.wave,
                    level: player.level,
                };
                tracing::info!(
                    score = info.score,
                    kills = info.kills,
                    wave = info.wave,
                    tick = world.tick,
                    "game over"
                );
                events.game_over = Some(info);
                events.sound(SoundId::GameOver);
            }
        }

        world.stores.sweep();
        #[cfg(feature = "debug-validation")]
        self.check_invariants();
        events.stats = Some(self.snapshot());
        events
    }

    #[cfg(feature = "debug-validation")]
    fn check_invariants(&self) {
        let p = &self.world.player;
        assert!(p.ammo <= p.max_ammo, "ammo {} above capacity {}", p.ammo, p.max_ammo);
        assert!((0.0..=p.max_health).contains(&p.health), "health {} out of range", p.health);
        assert!(
            self.world.stores.zombies.iter().all(|z| !z.dead),
            "dead zombie survived the sweep"
        );
    }

    /// HUD numbers.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        let p = &self.world.player;
        StatsSnapshot {
            score: p.score,
            kills: p.kills,
            wave: self.world.wave,
            level: p.level,
            xp: p.xp,
            max_xp: p.max_xp,
            health: p.health,
            max_health: p.max_health,
            ammo: p.ammo,
            max_ammo: p.max_ammo,
            stamina: p.stamina,
            max_stamina: p.max_stamina,
            weapon: p.weapon,
            reloading: p.reload.is_reloading(),
            grenade_cooldown: p.grenade.cooldown,
            max_grenade_cooldown: p.grenade.max_cooldown,
            grenade_level: p.grenade.level,
            zombies: self.world.stores.living_zombies().count(),
        }
    }

    /// Upgrade choices still owed.
    #[must_use]
    pub fn pending_upgrades(&self) -> u32 {
        self.world.pending_upgrades
    }

    /// Raise one weapon part. Returns the new level, or `None` if the part
    /// is already at its maximum.
    ///
    /// During a level-up pause this spends one pending choice and resumes
    /// play once none are left.
    pub fn apply_upgrade(&mut self, part: WeaponPart) -> Option<u32> {
        let max_level = self.data.upgrades.max_level(part);
        let level = self.world.upgrades.raise(part, max_level)?;
        tracing::debug!(%part, level, "upgrade applied");

        if self.world.phase == GamePhase::LevelUp {
            self.world.pending_upgrades = self.world.pending_upgrades.saturating_sub(1);
            if self.world.pending_upgrades == 0 {
                self.world.phase = GamePhase::Playing;
            }
        }
        self.refresh_stats();
        Some(level)
    }

    /// Leave a level-up pause without choosing.
    pub fn skip_upgrade(&mut self) {
        if self.world.phase == GamePhase::LevelUp {
            self.world.pending_upgrades = 0;
            self.world.phase = GamePhase::Playing;
        }
    }

    /// Equip a weapon with a full magazine.
    pub fn switch_weapon(&mut self, weapon: WeaponId) {
        let weapon = if self.data.weapons.contains(weapon) {
            weapon
        } else {
            tracing::warn!(%weapon, "weapon not in table, using default");
            self.data.weapons.default_weapon()
        };
        let player = &mut self.world.player;
        player.weapon = weapon;
        player.reload.cancel();
        player.recoil = RecoilState::default();
        self.refresh_stats();
        let player = &mut self.world.player;
        player.ammo = player.max_ammo;
        tracing::debug!(%weapon, "weapon switched");
    }

    /// Equip a weapon by name; unknown names give the default weapon.
    pub fn switch_weapon_named(&mut self, name: &str) {
        let weapon = self.data.weapons.resolve(name);
        self.switch_weapon(weapon);
    }

    /// Start over with the same data and the next seed.
    pub fn reset(&mut self) {
        let viewport = self.world.camera.viewport;
        let seed = self.world.seed.wrapping_add(1);
        self.world = World::new(&self.config, &self.data, seed);
        self.world.camera.viewport = viewport;
        self.refresh_stats();
        self.world.player.ammo = self.world.player.max_ammo;
        tracing::info!(seed, "simulation reset");
    }

    /// Hash of the whole mutable state.
    ///
    /// Two simulations fed the same seed and inputs produce the same hash.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        match bincode::serialize(&self.world) {
            Ok(bytes) => bytes.hash(&mut hasher),
            Err(e) => {
                tracing::warn!(error = %e, "state encoding failed, hashing tick only");
                self.world.tick.hash(&mut hasher);
            }
        }
        let hash = hasher.finish();
        tracing::debug!(tick = self.world.tick, hash, "state hash");
        hash
    }
}
