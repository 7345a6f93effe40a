//! Effective weapon stats: base record + player level + upgrade parts.
//!
//! Every percentage modifier reads the immutable base value, never the
//! running value, so the order parts are applied in cannot change the
//! result. Magazine, ammo and stock upgrades use dedicated rules.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::data::{
    FireMode, GameData, ModifierKind, PenetrationStats, QuickReloadStats, ReloadType, RenderPart,
    SlowEffect, StatKey, UpgradeEffect, UpgradeLevels, UpgradeTable, WeaponData, WeaponId,
    WeaponPart,
};

/// Base zoom before scope upgrades.
pub const BASE_ZOOM: f32 = 1.0;

/// Smallest zoom a scope can reach.
const MIN_ZOOM: f32 = 0.25;

/// Fully resolved weapon parameters for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveStats {
    /// Weapon these stats were built from.
    pub weapon: WeaponId,
    /// Display name.
    pub name: String,
    /// Damage per pellet.
    pub damage: f32,
    /// Milliseconds between shots.
    pub fire_rate: f32,
    /// Pellets per shot.
    pub pellet_count: u32,
    /// Bullet speed.
    pub bullet_speed: f32,
    /// Bullet range.
    pub max_distance: f32,
    /// Magazine capacity.
    pub max_ammo: u32,
    /// Reload seconds (per shell for shell weapons).
    pub reload_time: f32,
    /// Reload behaviour.
    pub reload_type: ReloadType,
    /// Trigger behaviour.
    pub fire_mode: FireMode,
    /// Per-pellet critical chance.
    pub critical_chance: f32,
    /// Critical damage multiplier.
    pub critical_multiplier: f32,
    /// Knockback on hit.
    pub knockback: f32,
    /// Slow on hit.
    pub slow: Option<SlowEffect>,
    /// Penetration budget.
    pub penetration: PenetrationStats,
    /// First-shot spread.
    pub min_spread: f32,
    /// Full-recoil spread.
    pub max_spread: f32,
    /// Shots to full recoil.
    pub recoil_control: f32,
    /// Idle seconds before recoil recovers.
    pub recoil_reset_time: f32,
    /// Recoil recovered per second.
    pub recoil_recovery: f32,
    /// Movement spread cap.
    pub max_spread_moving: f32,
    /// Seconds of movement to reach the cap.
    pub movement_stability: f32,
    /// Aim reaction lag, seconds.
    pub aim_delay: f32,
    /// Initial turn rate.
    pub base_rotation_speed: f32,
    /// Turn rate cap.
    pub max_rotation_speed: f32,
    /// Turn rate gain.
    pub rotation_acceleration: f32,
    /// Walk speed multiplier.
    pub move_speed_multiplier: f32,
    /// Quick-reload tuning.
    pub quick_reload: QuickReloadStats,
    /// Screen shake per shot.
    pub shake: f32,
    /// Whether a laser sight is drawn.
    pub laser_sight: bool,
    /// Gun geometry.
    pub render_parts: Vec<RenderPart>,
    /// Muzzle distance from the player centre.
    pub gun_length: f32,
    /// Camera zoom (1.0 = none, lower sees more).
    pub zoom: f32,
}

impl EffectiveStats {
    fn from_base(weapon: &WeaponData) -> Self {
        let gun_length = weapon
            .render_parts
            .iter()
            .map(|p| p.offset_x + p.length)
            .fold(0.0_f32, f32::max);

        Self {
            weapon: weapon.id,
            name: weapon.name.clone(),
            damage: weapon.damage,
            fire_rate: weapon.fire_rate,
            pellet_count: weapon.pellet_count.max(1),
            bullet_speed: weapon.bullet_speed,
            max_distance: weapon.max_distance,
            max_ammo: weapon.max_ammo,
            reload_time: weapon.reload_time,
            reload_type: weapon.reload_type,
            fire_mode: weapon.fire_mode,
            critical_chance: weapon.critical_chance,
            critical_multiplier: weapon.critical_multiplier,
            knockback: weapon.knockback,
            slow: weapon.slow,
            penetration: weapon.penetration,
            min_spread: weapon.spread.min_spread,
            max_spread: weapon.spread.max_spread,
            recoil_control: weapon.spread.recoil_control,
            recoil_reset_time: weapon.spread.recoil_reset_time,
            recoil_recovery: weapon.spread.recoil_recovery,
            max_spread_moving: weapon.spread.max_spread_moving,
            movement_stability: weapon.spread.movement_stability,
            aim_delay: weapon.handling.aim_delay,
            base_rotation_speed: weapon.handling.base_rotation_speed,
            max_rotation_speed: weapon.handling.max_rotation_speed,
            rotation_acceleration: weapon.handling.rotation_acceleration,
            move_speed_multiplier: weapon.handling.move_speed_multiplier,
            quick_reload: weapon.quick_reload,
            shake: weapon.shake,
            laser_sight: weapon.laser_sight,
            render_parts: weapon.render_parts.clone(),
            gun_length,
            zoom: BASE_ZOOM,
        }
    }

    fn get(&self, stat: StatKey) -> f32 {
        match stat {
            StatKey::Damage => self.damage,
            StatKey::FireRate => self.fire_rate,
            StatKey::MaxAmmo => self.max_ammo as f32,
            StatKey::Penetration => self.penetration.chance,
            StatKey::BulletSpeed => self.bullet_speed,
            StatKey::MaxDistance => self.max_distance,
            StatKey::MinSpread => self.min_spread,
            StatKey::MaxSpread => self.max_spread,
            StatKey::MaxSpreadMoving => self.max_spread_moving,
            StatKey::CriticalChance => self.critical_chance,
            StatKey::Knockback => self.knockback,
            StatKey::AimDelay => self.aim_delay,
            StatKey::ReloadTime => self.reload_time,
            StatKey::Zoom => self.zoom,
        }
    }

    fn set(&mut self, stat: StatKey, value: f32) {
        let value = value.max(0.0);
        match stat {
            StatKey::Damage => self.damage = value,
            StatKey::FireRate => self.fire_rate = value,
            StatKey::MaxAmmo => self.max_ammo = (value.round() as u32).max(1),
            StatKey::Penetration => self.penetration.chance = value.min(1.0),
            StatKey::BulletSpeed => self.bullet_speed = value,
            StatKey::MaxDistance => self.max_distance = value,
            StatKey::MinSpread => self.min_spread = value,
            StatKey::MaxSpread => self.max_spread = value,
            StatKey::MaxSpreadMoving => self.max_spread_moving = value,
            StatKey::CriticalChance => self.critical_chance = value.min(1.0),
            StatKey::Knockback => self.knockback = value,
            StatKey::AimDelay => self.aim_delay = value,
            StatKey::ReloadTime => self.reload_time = value,
            StatKey::Zoom => self.zoom = value.max(MIN_ZOOM),
        }
    }
}

/// Change one generic effect makes to a stat, measured against the base value.
#[must_use]
pub fn modifier_delta(base: f32, kind: ModifierKind, value: f32, level: u32) -> f32 {
    let level = level as f32;
    match kind {
        ModifierKind::Add => value * level,
        ModifierKind::SubtractPercentBase => -base * value * level,
        ModifierKind::AddPercentBase => base * value * level,
    }
}

/// Extra magazine rounds from a magazine upgrade.
///
/// `floor(base * fraction * level)`. When one level is worth less than a
/// round and the floored total is still zero, the upgrade grants `level`
/// rounds so the first purchases are never invisible.
#[must_use]
pub fn magazine_bonus(base_max_ammo: u32, fraction: f32, level: u32) -> u32 {
    if level == 0 {
        return 0;
    }
    let per_level = base_max_ammo as f32 * fraction;
    let bonus = (per_level * level as f32).floor().max(0.0) as u32;
    if per_level < 1.0 && bonus == 0 {
        level
    } else {
        bonus
    }
}

/// Extra damage from a stock upgrade: `floor(max(1, base * fraction) * level)`.
#[must_use]
pub fn stock_bonus(base_damage: f32, fraction: f32, level: u32) -> f32 {
    ((base_damage * fraction).max(1.0) * level as f32).floor()
}

/// Guaranteed extra penetration hits and the leftover chance from an ammo upgrade.
#[must_use]
pub fn penetration_bonus(chance_per_level: f32, level: u32) -> (u32, f32) {
    let total = chance_per_level * level as f32;
    let guaranteed = total.floor();
    (guaranteed as u32, total - guaranteed)
}

/// Compose effective stats for a weapon.
#[must_use]
pub fn compute_stats(
    weapon: &WeaponData,
    upgrades: &UpgradeTable,
    levels: &UpgradeLevels,
    player_level: u32,
    damage_per_level: f32,
) -> EffectiveStats {
    compose_stats(weapon, upgrades, levels.iter(), player_level, damage_per_level)
}

/// Fold `(part, level)` pairs onto a weapon in the order given.
///
/// Each part should appear at most once. The result does not depend on
/// the order of `parts` beyond float rounding.
#[must_use]
pub fn compose_stats<I>(
    weapon: &WeaponData,
    upgrades: &UpgradeTable,
    parts: I,
    player_level: u32,
    damage_per_level: f32,
) -> EffectiveStats
where
    I: IntoIterator<Item = (WeaponPart, u32)>,
{
    let base = EffectiveStats::from_base(weapon);
    let mut stats = base.clone();

    stats.damage += player_level.saturating_sub(1) as f32 * damage_per_level;

    let mut deltas: BTreeMap<StatKey, f32> = BTreeMap::new();
    for (part, level) in parts {
        let Some(effect) = upgrades.effect(part) else {
            continue;
        };
        let level = level.min(effect.max_level);
        if level == 0 {
            continue;
        }
        match part {
            WeaponPart::Magazine => apply_magazine(&mut stats, &base, effect, level),
            WeaponPart::Ammo => {
                let (extra, chance) = penetration_bonus(effect.value, level);
                stats.penetration.count += extra;
                stats.penetration.chance = (stats.penetration.chance + chance).min(1.0);
            }
            WeaponPart::Stock => {
                let fraction = match effect.kind {
                    ModifierKind::AddPercentBase => effect.value,
                    _ => effect.value / base.damage.max(f32::EPSILON),
                };
                stats.damage += stock_bonus(base.damage, fraction, level);
            }
            _ => {
                let delta = modifier_delta(base.get(effect.stat), effect.kind, effect.value, level);
                *deltas.entry(effect.stat).or_insert(0.0) += delta;
            }
        }
    }

    for (stat, delta) in deltas {
        let value = stats.get(stat) + delta;
        stats.set(stat, value);
    }

    if stats.min_spread > stats.max_spread {
        stats.min_spread = stats.max_spread;
    }
    stats
}

fn apply_magazine(
    stats: &mut EffectiveStats,
    base: &EffectiveStats,
    effect: &UpgradeEffect,
    level: u32,
) {
    let bonus = match effect.kind {
        ModifierKind::AddPercentBase => magazine_bonus(base.max_ammo, effect.value, level),
        ModifierKind::Add => (effect.value * level as f32).floor().max(0.0) as u32,
        ModifierKind::SubtractPercentBase => 0,
    };
    stats.max_ammo += bonus;
}

/// Memoizing front-end for [`compute_stats`].
///
/// Keyed on weapon id, upgrade levels and player level; the underlying
/// data is immutable for the lifetime of a simulation.
#[derive(Debug, Clone, Default)]
pub struct StatsCache {
    entries: HashMap<(WeaponId, UpgradeLevels, u32), EffectiveStats>,
}

/// Entries kept before the cache is flushed.
const CACHE_CAPACITY: usize = 64;

impl StatsCache {
    /// Empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Effective stats, computed on first use.
    pub fn get(
        &mut self,
        data: &GameData,
        weapon: WeaponId,
        levels: &UpgradeLevels,
        player_level: u32,
        damage_per_level: f32,
    ) -> EffectiveStats {
        let key = (weapon, levels.clone(), player_level);
        if let Some(stats) = self.entries.get(&key) {
            return stats.clone();
        }
        if self.entries.len() >= CACHE_CAPACITY {
            self.entries.clear();
        }
        let stats = compute_stats(
            data.weapons.get(weapon),
            &data.upgrades,
            levels,
            player_level,
            damage_per_level,
        );
        self.entries.insert(key, stats.clone());
        stats
    }

    /// Number of memoized entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is memoized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::WeaponDb;

    fn pistol() -> WeaponData {
        WeaponDb::default().get(WeaponId::Pistol).clone()
    }

    #[test]
    fn test_no_upgrades_matches_base() {
        let stats = compute_stats(&pistol(), &UpgradeTable::default(), &UpgradeLevels::new(), 1, 2.0);
        assert_eq!(stats.damage, 25.0);
        assert_eq!(stats.max_ammo, 8);
        assert_eq!(stats.zoom, 1.0);
        assert_eq!(stats.gun_length, 24.0);
    }

    #[test]
    fn test_level_damage_bonus() {
        let stats = compute_stats(&pistol(), &UpgradeTable::default(), &UpgradeLevels::new(), 4, 2.0);
        assert_eq!(stats.damage, 31.0);
    }

    #[test]
    fn test_magazine_and_stock_scenario() {
        let levels = UpgradeLevels::new()
            .with(WeaponPart::Magazine, 3)
            .with(WeaponPart::Stock, 2);
        let stats = compute_stats(&pistol(), &UpgradeTable::default(), &levels, 1, 2.0);
        assert_eq!(stats.max_ammo, 10);
        assert_eq!(stats.damage, 27.0);
    }

    #[test]
    fn test_magazine_bonus_never_zero_for_small_magazines() {
        assert_eq!(magazine_bonus(4, 0.1, 1), 1);
        assert_eq!(magazine_bonus(4, 0.1, 2), 2);
        assert_eq!(magazine_bonus(8, 0.1, 3), 2);
        assert_eq!(magazine_bonus(30, 0.1, 2), 6);
        assert_eq!(magazine_bonus(30, 0.1, 0), 0);
    }

    #[test]
    fn test_stock_bonus_at_least_one_per_level() {
        assert_eq!(stock_bonus(10.0, 0.05, 3), 3.0);
        assert_eq!(stock_bonus(120.0, 0.05, 2), 12.0);
    }

    #[test]
    fn test_ammo_splits_guaranteed_and_residual() {
        let (extra, chance) = penetration_bonus(0.25, 5);
        assert_eq!(extra, 1);
        assert!((chance - 0.25).abs() < 1e-6);

        let levels = UpgradeLevels::new().with(WeaponPart::Ammo, 5);
        let stats = compute_stats(&pistol(), &UpgradeTable::default(), &levels, 1, 2.0);
        assert_eq!(stats.penetration.count, 2);
        assert!((stats.penetration.chance - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_percent_modifiers_do_not_compound() {
        let levels = UpgradeLevels::new()
            .with(WeaponPart::Muzzle, 2)
            .with(WeaponPart::Grip, 3);
        let weapon = pistol();
        let stats = compute_stats(&weapon, &UpgradeTable::default(), &levels, 1, 2.0);
        let expected = weapon.spread.max_spread * (1.0 - 0.08 * 2.0 - 0.05 * 3.0);
        assert!((stats.max_spread - expected).abs() < 1e-6);
    }

    #[test]
    fn test_scope_reduces_zoom_and_trigger_fire_rate() {
        let levels = UpgradeLevels::new()
            .with(WeaponPart::Scope, 2)
            .with(WeaponPart::Trigger, 4);
        let stats = compute_stats(&pistol(), &UpgradeTable::default(), &levels, 1, 2.0);
        assert!((stats.zoom - 0.9).abs() < 1e-6);
        assert!((stats.fire_rate - 200.0).abs() < 1e-3);
    }

    #[test]
    fn test_levels_above_max_are_capped() {
        let capped = UpgradeLevels::new().with(WeaponPart::Barrel, 9);
        let max = UpgradeLevels::new().with(WeaponPart::Barrel, 5);
        let table = UpgradeTable::default();
        assert_eq!(
            compute_stats(&pistol(), &table, &capped, 1, 2.0),
            compute_stats(&pistol(), &table, &max, 1, 2.0)
        );
    }

    #[test]
    fn test_cache_memoizes() {
        let data = GameData::default();
        let mut cache = StatsCache::new();
        let levels = UpgradeLevels::new().with(WeaponPart::Stock, 1);
        let a = cache.get(&data, WeaponId::Rifle, &levels, 2, 2.0);
        let b = cache.get(&data, WeaponId::Rifle, &levels, 2, 2.0);
        assert_eq!(a, b);
        assert_eq!(cache.len(), 1);
        cache.get(&data, WeaponId::Rifle, &levels, 3, 2.0);
        assert_eq!(cache.len(), 2);
    }
}
