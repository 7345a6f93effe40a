//! Weapon definitions and the weapon database.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Closed set of weapon identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeaponId {
    /// Starting sidearm; also the fallback for unknown ids.
    #[default]
    Pistol,
    /// Automatic rifle.
    Rifle,
    /// Pump shotgun, loads shell by shell.
    Shotgun,
    /// Submachine gun.
    Smg,
    /// Bolt-action rifle with a laser sight.
    Sniper,
}

impl WeaponId {
    /// Every weapon id, in table order.
    pub const ALL: [WeaponId; 5] = [
        WeaponId::Pistol,
        WeaponId::Rifle,
        WeaponId::Shotgun,
        WeaponId::Smg,
        WeaponId::Sniper,
    ];

    /// Stable string key used in data files and the protocol.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            WeaponId::Pistol => "pistol",
            WeaponId::Rifle => "rifle",
            WeaponId::Shotgun => "shotgun",
            WeaponId::Smg => "smg",
            WeaponId::Sniper => "sniper",
        }
    }
}

impl fmt::Display for WeaponId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeaponId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WeaponId::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown weapon id '{s}'"))
    }
}

/// How a weapon refills its magazine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ReloadType {
    /// Single timer, magazine snaps to full.
    #[default]
    Magazine,
    /// One shell per reload interval.
    Shell,
}

/// Trigger behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FireMode {
    /// Fires once per trigger press; dry-fires when empty.
    #[default]
    Manual,
    /// Fires while the trigger is held; reloads itself when empty.
    Auto,
}

/// Penetration budget carried by every bullet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PenetrationStats {
    /// Confirmed hits before the bullet is destroyed.
    pub count: u32,
    /// Chance of one extra hit once `count` is reached.
    #[serde(default)]
    pub chance: f32,
    /// Damage fraction lost per previous hit.
    #[serde(default)]
    pub damage_drop: f32,
}

impl Default for PenetrationStats {
    fn default() -> Self {
        Self {
            count: 1,
            chance: 0.0,
            damage_drop: 0.0,
        }
    }
}

/// Slow applied to a zombie on hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlowEffect {
    /// Speed multiplier while slowed.
    pub factor: f32,
    /// Seconds the slow lasts.
    pub duration: f32,
}

/// Recoil and movement spread parameters, all angles in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpreadStats {
    /// Spread of the first shot.
    pub min_spread: f32,
    /// Spread once recoil is fully built up.
    pub max_spread: f32,
    /// Consecutive shots needed to reach `max_spread`.
    pub recoil_control: f32,
    /// Seconds without firing before recoil starts to recover.
    pub recoil_reset_time: f32,
    /// Consecutive-shot count recovered per second.
    pub recoil_recovery: f32,
    /// Extra spread when moving at full bloom.
    pub max_spread_moving: f32,
    /// Seconds of movement needed to reach `max_spread_moving`.
    pub movement_stability: f32,
}

impl Default for SpreadStats {
    fn default() -> Self {
        Self {
            min_spread: 0.02,
            max_spread: 0.12,
            recoil_control: 4.0,
            recoil_reset_time: 0.3,
            recoil_recovery: 8.0,
            max_spread_moving: 0.08,
            movement_stability: 0.5,
        }
    }
}

/// Aim and turn handling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandlingStats {
    /// Reaction lag applied to the aim target, seconds.
    pub aim_delay: f32,
    /// Turn rate at the start of a turn, rad/s.
    pub base_rotation_speed: f32,
    /// Turn rate cap, rad/s.
    pub max_rotation_speed: f32,
    /// Turn rate gain, rad/s².
    pub rotation_acceleration: f32,
    /// Multiplier on player walk speed while this weapon is equipped.
    pub move_speed_multiplier: f32,
}

impl Default for HandlingStats {
    fn default() -> Self {
        Self {
            aim_delay: 0.05,
            base_rotation_speed: 4.0,
            max_rotation_speed: 14.0,
            rotation_acceleration: 30.0,
            move_speed_multiplier: 1.0,
        }
    }
}

/// Quick-reload minigame tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuickReloadStats {
    /// Earliest sweet-spot centre, as a fraction of the reload.
    pub min_time_percent: f32,
    /// Latest sweet-spot centre.
    pub max_time_percent: f32,
    /// Full width of the hit window.
    pub difficulty_percent: f32,
    /// Inputs before this progress are ignored.
    pub min_progress: f32,
    /// Seconds firing stays blocked after a success.
    pub success_cooldown: f32,
    /// Shells granted by a success on shell-type weapons.
    pub bonus_shells: u32,
}

impl Default for QuickReloadStats {
    fn default() -> Self {
        Self {
            min_time_percent: 0.4,
            max_time_percent: 0.7,
            difficulty_percent: 0.1,
            min_progress: 0.15,
            success_cooldown: 0.15,
            bonus_shells: 2,
        }
    }
}

/// One drawable piece of the gun, in player-local space along the aim axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderPart {
    /// Distance from the player centre to the start of the part.
    pub offset_x: f32,
    /// Length along the aim axis.
    pub length: f32,
    /// Thickness.
    pub width: f32,
    /// RGB colour.
    pub color: [u8; 3],
}

/// Immutable base record for one weapon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponData {
    /// Identifier.
    pub id: WeaponId,
    /// Display name.
    pub name: String,
    /// Milliseconds between shots.
    pub fire_rate: f32,
    /// Base damage per pellet.
    pub damage: f32,
    /// Pellets per shot.
    #[serde(default = "default_pellets")]
    pub pellet_count: u32,
    /// Bullet speed, world units per second.
    pub bullet_speed: f32,
    /// Range before the bullet expires.
    pub max_distance: f32,
    /// Magazine capacity.
    pub max_ammo: u32,
    /// Seconds for a full reload (or per shell for shell weapons).
    pub reload_time: f32,
    /// Reload behaviour.
    #[serde(default)]
    pub reload_type: ReloadType,
    /// Trigger behaviour.
    #[serde(default)]
    pub fire_mode: FireMode,
    /// Per-pellet critical chance.
    #[serde(default)]
    pub critical_chance: f32,
    /// Damage multiplier on a critical hit.
    #[serde(default = "default_crit_multiplier")]
    pub critical_multiplier: f32,
    /// Knockback distance applied on hit.
    #[serde(default)]
    pub knockback: f32,
    /// Optional slow applied on hit.
    #[serde(default)]
    pub slow: Option<SlowEffect>,
    /// Penetration defaults.
    #[serde(default)]
    pub penetration: PenetrationStats,
    /// Spread model.
    #[serde(default)]
    pub spread: SpreadStats,
    /// Aim handling.
    #[serde(default)]
    pub handling: HandlingStats,
    /// Quick-reload tuning.
    #[serde(default)]
    pub quick_reload: QuickReloadStats,
    /// Screen shake per shot.
    #[serde(default)]
    pub shake: f32,
    /// Draws a laser sight.
    #[serde(default)]
    pub laser_sight: bool,
    /// Gun geometry.
    #[serde(default)]
    pub render_parts: Vec<RenderPart>,
}

const fn default_pellets() -> u32 {
    1
}

const fn default_crit_multiplier() -> f32 {
    2.0
}

const GUNMETAL: [u8; 3] = [70, 70, 78];
const WOOD: [u8; 3] = [120, 80, 40];

impl WeaponData {
    /// Built-in pistol. Always available as the last-resort fallback.
    #[must_use]
    pub fn pistol() -> Self {
        Self {
            id: WeaponId::Pistol,
            name: "Pistol".to_string(),
            fire_rate: 250.0,
            damage: 25.0,
            pellet_count: 1,
            bullet_speed: 900.0,
            max_distance: 700.0,
            max_ammo: 8,
            reload_time: 1.2,
            reload_type: ReloadType::Magazine,
            fire_mode: FireMode::Manual,
            critical_chance: 0.1,
            critical_multiplier: 2.0,
            knockback: 6.0,
            slow: None,
            penetration: PenetrationStats {
                count: 1,
                chance: 0.0,
                damage_drop: 0.2,
            },
            spread: SpreadStats::default(),
            handling: HandlingStats::default(),
            quick_reload: QuickReloadStats::default(),
            shake: 2.0,
            laser_sight: false,
            render_parts: vec![
                RenderPart { offset_x: 8.0, length: 8.0, width: 6.0, color: GUNMETAL },
                RenderPart { offset_x: 16.0, length: 8.0, width: 4.0, color: GUNMETAL },
            ],
        }
    }

    fn rifle() -> Self {
        Self {
            id: WeaponId::Rifle,
            name: "Assault Rifle".to_string(),
            fire_rate: 100.0,
            damage: 20.0,
            bullet_speed: 1100.0,
            max_distance: 900.0,
            max_ammo: 30,
            reload_time: 2.0,
            fire_mode: FireMode::Auto,
            critical_chance: 0.08,
            knockback: 4.0,
            penetration: PenetrationStats { count: 2, chance: 0.0, damage_drop: 0.3 },
            spread: SpreadStats {
                min_spread: 0.02,
                max_spread: 0.18,
                recoil_control: 8.0,
                recoil_reset_time: 0.25,
                recoil_recovery: 16.0,
                max_spread_moving: 0.1,
                movement_stability: 0.6,
            },
            handling: HandlingStats {
                aim_delay: 0.08,
                base_rotation_speed: 3.5,
                max_rotation_speed: 11.0,
                rotation_acceleration: 24.0,
                move_speed_multiplier: 0.9,
            },
            shake: 1.5,
            render_parts: vec![
                RenderPart { offset_x: 6.0, length: 10.0, width: 6.0, color: WOOD },
                RenderPart { offset_x: 16.0, length: 14.0, width: 5.0, color: GUNMETAL },
                RenderPart { offset_x: 30.0, length: 10.0, width: 3.0, color: GUNMETAL },
            ],
            ..Self::pistol()
        }
    }

    fn shotgun() -> Self {
        Self {
            id: WeaponId::Shotgun,
            name: "Pump Shotgun".to_string(),
            fire_rate: 700.0,
            damage: 12.0,
            pellet_count: 8,
            bullet_speed: 800.0,
            max_distance: 350.0,
            max_ammo: 6,
            reload_time: 0.5,
            reload_type: ReloadType::Shell,
            fire_mode: FireMode::Manual,
            critical_chance: 0.05,
            knockback: 10.0,
            slow: Some(SlowEffect { factor: 0.6, duration: 0.8 }),
            penetration: PenetrationStats { count: 1, chance: 0.0, damage_drop: 0.5 },
            spread: SpreadStats {
                min_spread: 0.25,
                max_spread: 0.35,
                recoil_control: 2.0,
                recoil_reset_time: 0.6,
                recoil_recovery: 4.0,
                max_spread_moving: 0.1,
                movement_stability: 0.4,
            },
            handling: HandlingStats {
                aim_delay: 0.1,
                move_speed_multiplier: 0.9,
                ..HandlingStats::default()
            },
            quick_reload: QuickReloadStats {
                difficulty_percent: 0.15,
                ..QuickReloadStats::default()
            },
            shake: 5.0,
            render_parts: vec![
                RenderPart { offset_x: 6.0, length: 10.0, width: 7.0, color: WOOD },
                RenderPart { offset_x: 16.0, length: 20.0, width: 5.0, color: GUNMETAL },
            ],
            ..Self::pistol()
        }
    }

    fn smg() -> Self {
        Self {
            id: WeaponId::Smg,
            name: "SMG".to_string(),
            fire_rate: 70.0,
            damage: 12.0,
            bullet_speed: 950.0,
            max_distance: 550.0,
            max_ammo: 40,
            reload_time: 1.6,
            fire_mode: FireMode::Auto,
            critical_chance: 0.05,
            knockback: 2.0,
            penetration: PenetrationStats { count: 1, chance: 0.1, damage_drop: 0.3 },
            spread: SpreadStats {
                min_spread: 0.05,
                max_spread: 0.25,
                recoil_control: 10.0,
                recoil_reset_time: 0.2,
                recoil_recovery: 25.0,
                max_spread_moving: 0.06,
                movement_stability: 0.8,
            },
            shake: 1.0,
            render_parts: vec![
                RenderPart { offset_x: 8.0, length: 12.0, width: 6.0, color: GUNMETAL },
                RenderPart { offset_x: 20.0, length: 8.0, width: 3.0, color: GUNMETAL },
            ],
            ..Self::pistol()
        }
    }

    fn sniper() -> Self {
        Self {
            id: WeaponId::Sniper,
            name: "Sniper Rifle".to_string(),
            fire_rate: 1200.0,
            damage: 120.0,
            bullet_speed: 1800.0,
            max_distance: 1600.0,
            max_ammo: 5,
            reload_time: 2.5,
            critical_chance: 0.25,
            critical_multiplier: 2.5,
            knockback: 14.0,
            penetration: PenetrationStats { count: 3, chance: 0.0, damage_drop: 0.15 },
            spread: SpreadStats {
                min_spread: 0.0,
                max_spread: 0.05,
                recoil_control: 1.0,
                recoil_reset_time: 1.0,
                recoil_recovery: 2.0,
                max_spread_moving: 0.2,
                movement_stability: 1.0,
            },
            handling: HandlingStats {
                aim_delay: 0.15,
                base_rotation_speed: 2.5,
                max_rotation_speed: 8.0,
                rotation_acceleration: 14.0,
                move_speed_multiplier: 0.8,
            },
            shake: 6.0,
            laser_sight: true,
            render_parts: vec![
                RenderPart { offset_x: 4.0, length: 12.0, width: 6.0, color: WOOD },
                RenderPart { offset_x: 16.0, length: 26.0, width: 4.0, color: GUNMETAL },
                RenderPart { offset_x: 20.0, length: 8.0, width: 7.0, color: [30, 30, 30] },
            ],
            ..Self::pistol()
        }
    }
}

/// Serialized form of the weapon table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponTable {
    /// Weapon used for unknown ids.
    #[serde(default)]
    pub default_weapon: WeaponId,
    /// All weapon records.
    pub weapons: Vec<WeaponData>,
}

impl Default for WeaponTable {
    fn default() -> Self {
        Self {
            default_weapon: WeaponId::Pistol,
            weapons: vec![
                WeaponData::pistol(),
                WeaponData::rifle(),
                WeaponData::shotgun(),
                WeaponData::smg(),
                WeaponData::sniper(),
            ],
        }
    }
}

/// Immutable weapon lookup with a guaranteed fallback.
#[derive(Debug, Clone)]
pub struct WeaponDb {
    weapons: BTreeMap<WeaponId, WeaponData>,
    default_weapon: WeaponId,
    builtin: WeaponData,
}

impl WeaponDb {
    /// Build the database from a table.
    #[must_use]
    pub fn new(table: WeaponTable) -> Self {
        let weapons = table.weapons.into_iter().map(|w| (w.id, w)).collect();
        Self {
            weapons,
            default_weapon: table.default_weapon,
            builtin: WeaponData::pistol(),
        }
    }

    /// Weapon record for `id`, falling back to the default weapon.
    #[must_use]
    pub fn get(&self, id: WeaponId) -> &WeaponData {
        if let Some(weapon) = self.weapons.get(&id) {
            return weapon;
        }
        tracing::warn!(weapon = %id, fallback = %self.default_weapon, "Weapon missing from table");
        self.weapons
            .get(&self.default_weapon)
            .unwrap_or(&self.builtin)
    }

    /// Resolve a string key to a weapon id, falling back to the default.
    #[must_use]
    pub fn resolve(&self, key: &str) -> WeaponId {
        match key.parse::<WeaponId>() {
            Ok(id) if self.weapons.contains_key(&id) => id,
            Ok(id) => {
                tracing::warn!(weapon = %id, "Weapon not loaded, using default");
                self.default_weapon
            }
            Err(e) => {
                tracing::warn!("{e}, using default weapon {}", self.default_weapon);
                self.default_weapon
            }
        }
    }

    /// Check if a weapon is loaded.
    #[must_use]
    pub fn contains(&self, id: WeaponId) -> bool {
        self.weapons.contains_key(&id)
    }

    /// Weapon used when lookups miss.
    #[must_use]
    pub const fn default_weapon(&self) -> WeaponId {
        self.default_weapon
    }

    /// Iterate over loaded weapons in id order.
    pub fn iter(&self) -> impl Iterator<Item = &WeaponData> {
        self.weapons.values()
    }

    /// Number of loaded weapons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.weapons.len()
    }

    /// Whether no weapons are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weapons.is_empty()
    }
}

impl Default for WeaponDb {
    fn default() -> Self {
        Self::new(WeaponTable::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weapon_db_load() {
        let db = WeaponDb::default();
        assert_eq!(db.len(), 5);
        assert_eq!(db.get(WeaponId::Shotgun).reload_type, ReloadType::Shell);
    }

    #[test]
    fn test_unknown_key_falls_back_to_default() {
        let db = WeaponDb::default();
        assert_eq!(db.resolve("railgun"), WeaponId::Pistol);
        assert_eq!(db.resolve(" SMG "), WeaponId::Smg);
    }

    #[test]
    fn test_missing_weapon_falls_back() {
        let db = WeaponDb::new(WeaponTable {
            default_weapon: WeaponId::Pistol,
            weapons: vec![WeaponData::pistol()],
        });
        assert_eq!(db.get(WeaponId::Sniper).id, WeaponId::Pistol);
        assert_eq!(db.resolve("sniper"), WeaponId::Pistol);
    }

    #[test]
    fn test_empty_table_uses_builtin() {
        let db = WeaponDb::new(WeaponTable {
            default_weapon: WeaponId::Rifle,
            weapons: Vec::new(),
        });
        assert_eq!(db.get(WeaponId::Rifle).id, WeaponId::Pistol);
    }

    #[test]
    fn test_weapon_data_integrity() {
        let db = WeaponDb::default();
        let pistol = db.get(WeaponId::Pistol);
        assert_eq!(pistol.max_ammo, 8);
        assert_eq!(pistol.damage, 25.0);
        assert_eq!(db.get(WeaponId::Shotgun).pellet_count, 8);
    }
}
