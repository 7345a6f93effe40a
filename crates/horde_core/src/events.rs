//! Per-tick outputs of the simulation.
//!
//! The core never plays audio or calls back into the host. Everything a
//! frontend reacts to is collected here and drained by [`crate::host`].

use serde::{Deserialize, Serialize};

use crate::components::EntityId;
use crate::data::{ItemKind, WeaponId, ZombieKind};
use crate::math::Vec2;
use crate::reload::QuickReloadOutcome;

/// Closed set of sound cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundId {
    /// A weapon fired.
    Shot(WeaponId),
    /// Trigger pulled on an empty magazine.
    DryFire,
    /// Reload began.
    ReloadStart,
    /// A shell was loaded.
    ShellLoad,
    /// Reload finished.
    ReloadComplete,
    /// Quick reload hit the window.
    QuickReloadSuccess,
    /// Quick reload missed.
    QuickReloadFail,
    /// A bullet hit a zombie.
    ZombieHit,
    /// A zombie died.
    ZombieDeath,
    /// The player took contact damage.
    PlayerHurt,
    /// Dodge roll.
    Dodge,
    /// Grenade thrown.
    GrenadeThrow,
    /// Grenade bounced.
    GrenadeBounce,
    /// Grenade detonated.
    Explosion,
    /// Item collected.
    Pickup,
    /// Player levelled up.
    LevelUp,
    /// Player died.
    GameOver,
}

/// One trigger pull that produced bullets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShotEvent {
    /// Weapon fired.
    pub weapon: WeaponId,
    /// Muzzle position.
    pub origin: Vec2,
    /// Facing at the time of the shot.
    pub angle: f32,
    /// Spread used for this shot.
    pub spread: f32,
    /// Pellets spawned.
    pub pellets: u32,
}

/// What killed a zombie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KillSource {
    /// A bullet.
    Bullet,
    /// A grenade blast.
    Grenade,
}

/// A resolved kill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KillEvent {
    /// Zombie id.
    pub zombie: EntityId,
    /// Archetype.
    pub kind: ZombieKind,
    /// Where it died.
    pub position: Vec2,
    /// Cause.
    pub source: KillSource,
    /// Score granted.
    pub score: u32,
    /// Xp granted.
    pub xp: u32,
}

/// Final result reported once when the player dies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOverInfo {
    /// Final score.
    pub score: u64,
    /// Total kills.
    pub kills: u32,
    /// Wave reached.
    pub wave: u32,
    /// Player level reached.
    pub level: u32,
}

/// HUD-facing numbers after a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Score.
    pub score: u64,
    /// Kills.
    pub kills: u32,
    /// Wave.
    pub wave: u32,
    /// Player level.
    pub level: u32,
    /// Xp toward next level.
    pub xp: u32,
    /// Xp threshold.
    pub max_xp: u32,
    /// Health.
    pub health: f32,
    /// Health cap.
    pub max_health: f32,
    /// Rounds loaded.
    pub ammo: u32,
    /// Magazine capacity.
    pub max_ammo: u32,
    /// Stamina.
    pub stamina: f32,
    /// Stamina cap.
    pub max_stamina: f32,
    /// Equipped weapon.
    pub weapon: WeaponId,
    /// Reloading now.
    pub reloading: bool,
    /// Grenade cooldown left, seconds.
    pub grenade_cooldown: f32,
    /// Full grenade cooldown at the current level.
    pub max_grenade_cooldown: f32,
    /// Grenade level.
    pub grenade_level: u32,
    /// Living zombies.
    pub zombies: usize,
}

/// Everything observable that happened during one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickEvents {
    /// Sound cues in emission order.
    pub sounds: Vec<SoundId>,
    /// Shots fired.
    pub shots: Vec<ShotEvent>,
    /// Kills resolved.
    pub kills: Vec<KillEvent>,
    /// Items collected.
    pub pickups: Vec<ItemKind>,
    /// Quick-reload presses that counted.
    pub quick_reloads: Vec<QuickReloadOutcome>,
    /// Player levels reached this tick.
    pub level_ups: Vec<u32>,
    /// Grenade levels reached this tick.
    pub grenade_level_ups: Vec<u32>,
    /// New wave number, if the wave advanced.
    pub wave_advanced: Option<u32>,
    /// Zombies spawned this tick.
    pub spawned: Vec<EntityId>,
    /// Contact damage taken by the player.
    pub damage_taken: f32,
    /// Set on the tick the player died.
    pub game_over: Option<GameOverInfo>,
    /// Dry-fire clicks.
    pub dry_fires: u32,
    /// HUD numbers, present only when the simulation advanced.
    pub stats: Option<StatsSnapshot>,
}

impl TickEvents {
    /// Queue a sound.
    pub fn sound(&mut self, id: SoundId) {
        self.sounds.push(id);
    }
}
