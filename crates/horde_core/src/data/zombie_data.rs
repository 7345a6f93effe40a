//! Zombie type table.

use serde::{Deserialize, Serialize};

/// Zombie archetypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ZombieKind {
    /// Baseline shambler.
    #[default]
    Walker,
    /// Fast, fragile.
    Runner,
    /// Slow, heavy, resists knockback.
    Tank,
}

/// Stats for one zombie archetype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZombieData {
    /// Archetype.
    pub kind: ZombieKind,
    /// Health at wave 1.
    pub health: f32,
    /// Walk speed, world units per second.
    pub speed: f32,
    /// Contact damage per frame of overlap.
    pub damage: f32,
    /// Collision radius.
    pub radius: f32,
    /// Score awarded on kill.
    pub score: u32,
    /// Player xp awarded on kill.
    pub xp: u32,
    /// Multiplier applied to every item drop chance.
    #[serde(default = "default_multiplier")]
    pub drop_multiplier: f32,
    /// Fraction of incoming knockback actually applied.
    #[serde(default = "default_multiplier")]
    pub knockback_taken: f32,
    /// Relative spawn weight once unlocked.
    pub spawn_weight: f32,
    /// First wave this archetype can spawn on.
    #[serde(default = "default_min_wave")]
    pub min_wave: u32,
    /// RGB colour.
    pub color: [u8; 3],
}

const fn default_multiplier() -> f32 {
    1.0
}

const fn default_min_wave() -> u32 {
    1
}

/// All zombie archetypes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZombieTable {
    /// Archetype records.
    pub zombies: Vec<ZombieData>,
}

impl ZombieTable {
    /// Record for a kind. Falls back to the first entry, then to a built-in walker.
    #[must_use]
    pub fn get(&self, kind: ZombieKind) -> ZombieData {
        self.zombies
            .iter()
            .find(|z| z.kind == kind)
            .or_else(|| self.zombies.first())
            .cloned()
            .unwrap_or_else(walker)
    }

    /// Archetypes allowed on `wave`, with their weights.
    pub fn available(&self, wave: u32) -> impl Iterator<Item = &ZombieData> {
        self.zombies
            .iter()
            .filter(move |z| z.min_wave <= wave && z.spawn_weight > 0.0)
    }
}

fn walker() -> ZombieData {
    ZombieData {
        kind: ZombieKind::Walker,
        health: 50.0,
        speed: 60.0,
        damage: 0.5,
        radius: 15.0,
        score: 10,
        xp: 10,
        drop_multiplier: 1.0,
        knockback_taken: 1.0,
        spawn_weight: 1.0,
        min_wave: 1,
        color: [90, 140, 80],
    }
}

impl Default for ZombieTable {
    fn default() -> Self {
        Self {
            zombies: vec![
                walker(),
                ZombieData {
                    kind: ZombieKind::Runner,
                    health: 30.0,
                    speed: 120.0,
                    damage: 0.5,
                    radius: 12.0,
                    score: 15,
                    xp: 15,
                    drop_multiplier: 0.8,
                    knockback_taken: 1.2,
                    spawn_weight: 0.35,
                    min_wave: 2,
                    color: [170, 160, 70],
                },
                ZombieData {
                    kind: ZombieKind::Tank,
                    health: 200.0,
                    speed: 40.0,
                    damage: 1.0,
                    radius: 24.0,
                    score: 50,
                    xp: 50,
                    drop_multiplier: 3.0,
                    knockback_taken: 0.3,
                    spawn_weight: 0.15,
                    min_wave: 3,
                    color: [110, 60, 60],
                },
            ],
        }
    }
}
