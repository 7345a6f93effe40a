//! Weapon upgrade parts, their effects, and per-run upgrade levels.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The eight upgradeable weapon parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponPart {
    /// Range.
    Barrel,
    /// Recoil spread.
    Muzzle,
    /// Magazine capacity (non-linear).
    Magazine,
    /// Penetration (split into guaranteed and probabilistic hits).
    Ammo,
    /// Damage (at least +1 per level).
    Stock,
    /// Recoil spread.
    Grip,
    /// Camera zoom.
    Scope,
    /// Fire rate.
    Trigger,
}

impl WeaponPart {
    /// Every part.
    pub const ALL: [WeaponPart; 8] = [
        WeaponPart::Barrel,
        WeaponPart::Muzzle,
        WeaponPart::Magazine,
        WeaponPart::Ammo,
        WeaponPart::Stock,
        WeaponPart::Grip,
        WeaponPart::Scope,
        WeaponPart::Trigger,
    ];

    /// Parts that bypass the generic modifier path.
    #[must_use]
    pub const fn has_special_handling(self) -> bool {
        matches!(self, WeaponPart::Magazine | WeaponPart::Ammo | WeaponPart::Stock)
    }
}

impl fmt::Display for WeaponPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WeaponPart::Barrel => "barrel",
            WeaponPart::Muzzle => "muzzle",
            WeaponPart::Magazine => "magazine",
            WeaponPart::Ammo => "ammo",
            WeaponPart::Stock => "stock",
            WeaponPart::Grip => "grip",
            WeaponPart::Scope => "scope",
            WeaponPart::Trigger => "trigger",
        };
        f.write_str(name)
    }
}

/// Effective stats an upgrade can touch through the generic path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKey {
    /// Damage per pellet.
    Damage,
    /// Milliseconds between shots.
    FireRate,
    /// Magazine capacity.
    MaxAmmo,
    /// Penetration chance.
    Penetration,
    /// Bullet speed.
    BulletSpeed,
    /// Bullet range.
    MaxDistance,
    /// First-shot spread.
    MinSpread,
    /// Full-recoil spread.
    MaxSpread,
    /// Movement spread cap.
    MaxSpreadMoving,
    /// Critical chance.
    CriticalChance,
    /// Knockback.
    Knockback,
    /// Aim reaction lag.
    AimDelay,
    /// Reload duration.
    ReloadTime,
    /// Camera zoom.
    Zoom,
}

/// How an effect's value combines with the stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModifierKind {
    /// `stat += value * level`
    Add,
    /// `stat -= base * value * level`
    SubtractPercentBase,
    /// `stat += base * value * level`
    AddPercentBase,
}

/// The effect one part has per upgrade level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpgradeEffect {
    /// Part this effect belongs to.
    pub part: WeaponPart,
    /// Stat touched.
    pub stat: StatKey,
    /// Combination rule.
    pub kind: ModifierKind,
    /// Per-level value.
    pub value: f32,
    /// Highest purchasable level.
    #[serde(default = "default_max_level")]
    pub max_level: u32,
}

const fn default_max_level() -> u32 {
    5
}

/// Upgrade effect table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeTable {
    /// One effect per part.
    pub effects: Vec<UpgradeEffect>,
}

impl UpgradeTable {
    /// Effect for a part.
    #[must_use]
    pub fn effect(&self, part: WeaponPart) -> Option<&UpgradeEffect> {
        self.effects.iter().find(|e| e.part == part)
    }

    /// Max level for a part; parts missing from the table cannot be upgraded.
    #[must_use]
    pub fn max_level(&self, part: WeaponPart) -> u32 {
        self.effect(part).map_or(0, |e| e.max_level)
    }
}

impl Default for UpgradeTable {
    fn default() -> Self {
        use ModifierKind::{Add, AddPercentBase, SubtractPercentBase};
        let effect = |part, stat, kind, value| UpgradeEffect {
            part,
            stat,
            kind,
            value,
            max_level: default_max_level(),
        };
        Self {
            effects: vec![
                effect(WeaponPart::Barrel, StatKey::MaxDistance, AddPercentBase, 0.1),
                effect(WeaponPart::Muzzle, StatKey::MaxSpread, SubtractPercentBase, 0.08),
                effect(WeaponPart::Magazine, StatKey::MaxAmmo, AddPercentBase, 0.1),
                effect(WeaponPart::Ammo, StatKey::Penetration, Add, 0.25),
                effect(WeaponPart::Stock, StatKey::Damage, AddPercentBase, 0.05),
                effect(WeaponPart::Grip, StatKey::MaxSpread, SubtractPercentBase, 0.05),
                effect(WeaponPart::Scope, StatKey::Zoom, SubtractPercentBase, 0.05),
                effect(WeaponPart::Trigger, StatKey::FireRate, SubtractPercentBase, 0.05),
            ],
        }
    }
}

/// Upgrade level per part. Missing parts are level 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UpgradeLevels(BTreeMap<WeaponPart, u32>);

impl UpgradeLevels {
    /// All parts at level 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    #[must_use]
    pub fn with(mut self, part: WeaponPart, level: u32) -> Self {
        self.set(part, level);
        self
    }

    /// Current level of a part.
    #[must_use]
    pub fn level(&self, part: WeaponPart) -> u32 {
        self.0.get(&part).copied().unwrap_or(0)
    }

    /// Set a part's level. Level 0 removes the entry so equal states hash equally.
    pub fn set(&mut self, part: WeaponPart, level: u32) {
        if level == 0 {
            self.0.remove(&part);
        } else {
            self.0.insert(part, level);
        }
    }

    /// Raise a part by one level if below `max_level`. Returns the new level on success.
    pub fn raise(&mut self, part: WeaponPart, max_level: u32) -> Option<u32> {
        let current = self.level(part);
        if current >= max_level {
            return None;
        }
        self.set(part, current + 1);
        Some(current + 1)
    }

    /// Parts with a level above zero, in part order.
    pub fn iter(&self) -> impl Iterator<Item = (WeaponPart, u32)> + '_ {
        self.0.iter().map(|(p, l)| (*p, *l))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_covers_every_part() {
        let table = UpgradeTable::default();
        for part in WeaponPart::ALL {
            assert!(table.effect(part).is_some(), "missing {part}");
            assert_eq!(table.max_level(part), 5);
        }
    }

    #[test]
    fn test_raise_respects_max_level() {
        let mut levels = UpgradeLevels::new();
        assert_eq!(levels.raise(WeaponPart::Stock, 2), Some(1));
        assert_eq!(levels.raise(WeaponPart::Stock, 2), Some(2));
        assert_eq!(levels.raise(WeaponPart::Stock, 2), None);
        assert_eq!(levels.level(WeaponPart::Stock), 2);
    }

    #[test]
    fn test_zero_level_equals_missing() {
        let a = UpgradeLevels::new().with(WeaponPart::Grip, 0);
        assert_eq!(a, UpgradeLevels::new());
    }
}
