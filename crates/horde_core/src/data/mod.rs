//! Static configuration tables: weapons, zombies, items, upgrades.
//!
//! This module contains pure data structures deserialized from RON, plus
//! load-time validation. It performs no IO; file loading lives in the
//! hosting shell.

mod item_data;
mod upgrade_data;
mod weapon_data;
mod zombie_data;

pub use item_data::{ItemData, ItemKind, ItemTable};
pub use upgrade_data::{
    ModifierKind, StatKey, UpgradeEffect, UpgradeLevels, UpgradeTable, WeaponPart,
};
pub use weapon_data::{
    FireMode, HandlingStats, PenetrationStats, QuickReloadStats, ReloadType, RenderPart,
    SlowEffect, SpreadStats, WeaponData, WeaponDb, WeaponId, WeaponTable,
};
pub use zombie_data::{ZombieData, ZombieKind, ZombieTable};

use serde::de::DeserializeOwned;

use crate::error::{GameError, Result};

/// All read-only tables consumed by the simulation.
#[derive(Debug, Clone, Default)]
pub struct GameData {
    /// Weapon database.
    pub weapons: WeaponDb,
    /// Zombie archetypes.
    pub zombies: ZombieTable,
    /// Droppable items.
    pub items: ItemTable,
    /// Upgrade effects.
    pub upgrades: UpgradeTable,
}

/// Parse one RON table, naming the source on failure.
pub fn parse_table<T: DeserializeOwned>(source_name: &str, contents: &str) -> Result<T> {
    ron::from_str(contents).map_err(|e| GameError::DataParseError {
        source_name: source_name.to_string(),
        message: e.to_string(),
    })
}

impl GameData {
    /// Build from already-parsed tables.
    #[must_use]
    pub fn new(
        weapons: WeaponTable,
        zombies: ZombieTable,
        items: ItemTable,
        upgrades: UpgradeTable,
    ) -> Self {
        Self {
            weapons: WeaponDb::new(weapons),
            zombies,
            items,
            upgrades,
        }
    }

    /// Check cross-table and numeric invariants. Collects every problem.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if !self.weapons.contains(self.weapons.default_weapon()) {
            errors.push(format!(
                "default weapon '{}' is not in the weapon table",
                self.weapons.default_weapon()
            ));
        }
        for weapon in self.weapons.iter() {
            validate_weapon(weapon, &mut errors);
        }

        if self.zombies.zombies.is_empty() {
            errors.push("zombie table is empty".to_string());
        }
        if self.zombies.available(1).next().is_none() {
            errors.push("no zombie archetype can spawn on wave 1".to_string());
        }
        for z in &self.zombies.zombies {
            if z.health <= 0.0 || z.speed < 0.0 || z.radius <= 0.0 {
                errors.push(format!("zombie {:?}: health and radius must be positive", z.kind));
            }
        }

        for item in &self.items.items {
            if !(0.0..=1.0).contains(&item.drop_chance) {
                errors.push(format!("item {:?}: drop chance outside [0, 1]", item.kind));
            }
            if item.lifetime <= 0.0 {
                errors.push(format!("item {:?}: lifetime must be positive", item.kind));
            }
        }

        for part in WeaponPart::ALL {
            if self.upgrades.effect(part).is_none() {
                errors.push(format!("upgrade part '{part}' has no effect"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(GameError::InvalidData(errors))
        }
    }
}

fn validate_weapon(weapon: &WeaponData, errors: &mut Vec<String>) {
    let id = weapon.id;
    if weapon.pellet_count == 0 {
        errors.push(format!("weapon '{id}': pellet_count must be at least 1"));
    }
    if weapon.max_ammo == 0 {
        errors.push(format!("weapon '{id}': max_ammo must be at least 1"));
    }
    if weapon.fire_rate < 0.0 || weapon.reload_time < 0.0 {
        errors.push(format!("weapon '{id}': fire_rate and reload_time must be non-negative"));
    }
    if weapon.penetration.count == 0 {
        errors.push(format!("weapon '{id}': penetration count must be at least 1"));
    }
    let qr = &weapon.quick_reload;
    if qr.min_time_percent > qr.max_time_percent {
        errors.push(format!("weapon '{id}': quick reload min_time_percent > max_time_percent"));
    }
    for (name, v) in [
        ("min_time_percent", qr.min_time_percent),
        ("max_time_percent", qr.max_time_percent),
        ("difficulty_percent", qr.difficulty_percent),
        ("min_progress", qr.min_progress),
    ] {
        if !(0.0..=1.0).contains(&v) {
            errors.push(format!("weapon '{id}': quick reload {name} outside [0, 1]"));
        }
    }
    if weapon.spread.min_spread > weapon.spread.max_spread {
        errors.push(format!("weapon '{id}': min_spread > max_spread"));
    }
}
