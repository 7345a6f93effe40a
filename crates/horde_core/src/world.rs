//! Mutable simulation state and the per-frame context handed to systems.
//!
//! Entities live in flat per-kind stores. Systems never remove entries while
//! iterating; they set a `dead` flag (or let `life` run out) and
//! [`EntityStores::sweep`] compacts every store once at the end of a tick.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::aim::AimState;
use crate::components::{
    Bullet, DodgeState, EntityId, ExplosionEffect, FloatingText, Grenade, GrenadeProgress, Item,
    Particle, Player, Shell, Zombie,
};
use crate::config::SimulationConfig;
use crate::data::{GameData, UpgradeLevels, WeaponId};
use crate::math::Vec2;
use crate::reload::ReloadState;
use crate::shooting::RecoilState;
use crate::stats::{EffectiveStats, BASE_ZOOM};

/// Default viewport until the host reports one.
pub const DEFAULT_VIEWPORT: Vec2 = Vec2::new(1280.0, 720.0);

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// Simulation advances.
    #[default]
    Playing,
    /// Frozen by the host.
    Paused,
    /// Frozen until an upgrade is chosen.
    LevelUp,
    /// Player died. Frozen.
    GameOver,
}

/// Flat storage for every non-player entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityStores {
    /// Zombies.
    pub zombies: Vec<Zombie>,
    /// Bullets.
    pub bullets: Vec<Bullet>,
    /// Grenades.
    pub grenades: Vec<Grenade>,
    /// Explosion visuals.
    pub explosions: Vec<ExplosionEffect>,
    /// Shell casings.
    pub shells: Vec<Shell>,
    /// Particles.
    pub particles: Vec<Particle>,
    /// Floating text.
    pub texts: Vec<FloatingText>,
    /// Pickups.
    pub items: Vec<Item>,
    next_id: EntityId,
}

impl EntityStores {
    /// Allocate a fresh id. Ids are never reused within a run.
    pub fn next_id(&mut self) -> EntityId {
        self.next_id += 1;
        self.next_id
    }

    /// Zombies not yet marked dead.
    pub fn living_zombies(&self) -> impl Iterator<Item = &Zombie> {
        self.zombies.iter().filter(|z| z.is_alive())
    }

    /// Drop every marked or expired entity.
    pub fn sweep(&mut self) {
        self.zombies.retain(|z| !z.dead);
        self.bullets.retain(|b| !b.dead);
        self.grenades.retain(|g| !g.dead);
        self.items.retain(|i| !i.dead);
        self.explosions.retain(|e| e.life > 0.0);
        self.shells.retain(|s| s.life > 0.0);
        self.particles.retain(|p| p.life > 0.0);
        self.texts.retain(|t| t.life > 0.0);
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        *self = Self {
            next_id: self.next_id,
            ..Self::default()
        };
    }
}

/// World-to-screen mapping with screen shake.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// World point at the screen centre.
    pub position: Vec2,
    /// Scale factor; below 1 shows more of the world.
    pub zoom: f32,
    /// Screen size in pixels.
    pub viewport: Vec2,
    /// Current shake magnitude.
    pub shake: f32,
    /// Shake displacement applied this frame.
    pub shake_offset: Vec2,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            zoom: BASE_ZOOM,
            viewport: DEFAULT_VIEWPORT,
            shake: 0.0,
            shake_offset: Vec2::ZERO,
        }
    }
}

impl Camera {
    fn scale(&self) -> f32 {
        self.zoom.max(f32::EPSILON)
    }

    /// Map a world point to screen pixels, shake included.
    #[must_use]
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        (world - self.position) * self.scale() + self.viewport / 2.0 + self.shake_offset
    }

    /// Map screen pixels back to a world point, ignoring shake.
    #[must_use]
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        (screen - self.viewport / 2.0) / self.scale() + self.position
    }

    /// Add shake, keeping the larger of current and new.
    pub fn add_shake(&mut self, amount: f32) {
        self.shake = self.shake.max(amount);
    }
}

/// Everything that changes during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    /// Ticks advanced while playing.
    pub tick: u64,
    /// Simulation clock, milliseconds.
    pub time_ms: f64,
    /// Lifecycle.
    pub phase: GamePhase,
    /// The player.
    pub player: Player,
    /// Everything else.
    pub stores: EntityStores,
    /// Current wave, starting at 1.
    pub wave: u32,
    /// Kills since the wave began.
    pub wave_kills: u32,
    /// Clock time of the last spawn.
    pub last_spawn_ms: f64,
    /// Upgrade choices owed to the player.
    pub pending_upgrades: u32,
    /// Upgrade levels of the equipped weapon.
    pub upgrades: UpgradeLevels,
    /// Camera.
    pub camera: Camera,
    /// Last pointer position in screen pixels.
    pub pointer: Vec2,
    /// Seeded randomness. Every random draw goes through here.
    pub rng: ChaCha8Rng,
    /// Seed the run started from.
    pub seed: u64,
    /// Death already reported.
    pub game_over_reported: bool,
}

impl World {
    /// A fresh run.
    #[must_use]
    pub fn new(config: &SimulationConfig, data: &GameData, seed: u64) -> Self {
        let weapon = data.weapons.default_weapon();
        let base = data.weapons.get(weapon);
        Self {
            tick: 0,
            time_ms: 0.0,
            phase: GamePhase::Playing,
            player: spawn_player(config, weapon, base.max_ammo, base.handling.base_rotation_speed),
            stores: EntityStores::default(),
            wave: 1,
            wave_kills: 0,
            last_spawn_ms: 0.0,
            pending_upgrades: 0,
            upgrades: UpgradeLevels::new(),
            camera: Camera::default(),
            pointer: DEFAULT_VIEWPORT / 2.0,
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            game_over_reported: false,
        }
    }

    /// Whether systems should run.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }
}

fn spawn_player(
    config: &SimulationConfig,
    weapon: WeaponId,
    max_ammo: u32,
    base_rotation_speed: f32,
) -> Player {
    let pc = &config.player;
    let gc = &config.grenade;
    Player {
        position: Vec2::ZERO,
        velocity: Vec2::ZERO,
        rotation: 0.0,
        radius: pc.radius,
        health: pc.max_health,
        max_health: pc.max_health,
        speed: pc.speed,
        weapon,
        ammo: max_ammo,
        max_ammo,
        reload: ReloadState::default(),
        recoil: RecoilState::default(),
        aim: AimState::new(0.0, base_rotation_speed),
        score: 0,
        kills: 0,
        xp: 0,
        max_xp: config.leveling.initial_max_xp,
        level: 1,
        stamina: pc.max_stamina,
        max_stamina: pc.max_stamina,
        is_sprinting: false,
        dodge: DodgeState::default(),
        grenade: GrenadeProgress {
            cooldown: 0.0,
            max_cooldown: gc.base_cooldown,
            level: 1,
            xp: 0,
            max_xp: gc.initial_max_xp,
        },
        pending_damage_text: 0.0,
    }
}

/// Read-only inputs every system sees for one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    /// Tuning constants.
    pub config: &'a SimulationConfig,
    /// Static tables.
    pub data: &'a GameData,
    /// Effective stats of the equipped weapon.
    pub stats: &'a EffectiveStats,
    /// Clamped frame delta, seconds.
    pub dt: f32,
    /// Clock at the start of the frame, milliseconds.
    pub now_ms: f64,
}
