//! Scripted bot players for headless playtesting.
//!
//! A [`Strategy`] is a handful of tuning knobs plus an upgrade priority
//! list. Every frame it looks at the simulation and produces the input a
//! player would: aim at the nearest zombie, keep distance, reload when it
//! is safe, dodge when cornered, throw grenades into crowds.

use std::path::Path;

use horde_core::data::{FireMode, WeaponPart};
use horde_core::grenade::grenade_blast;
use horde_core::input::FrameInput;
use horde_core::math::{safe_normalize, Vec2};
use horde_core::simulation::Simulation;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for strategy operations.
#[derive(Error, Debug)]
pub enum StrategyError {
    /// File not found.
    #[error("Strategy file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read strategy file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse strategy: {0}")]
    ParseError(#[from] ron::error::SpannedError),
}

/// Bot tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Strategy {
    /// Strategy name.
    pub name: String,
    /// Back away when the nearest zombie is closer than this.
    pub kite_distance: f32,
    /// Close in when the nearest zombie is farther than this.
    pub engage_distance: f32,
    /// Fraction of weapon range at which the bot starts shooting.
    pub range_fraction: f32,
    /// Reload early when the magazine is below this fraction and nothing
    /// is in range.
    pub reload_fraction: f32,
    /// Press fire inside the quick-reload window.
    pub quick_reload: bool,
    /// Dodge when a zombie is this close.
    pub dodge_distance: f32,
    /// Zombies that must stand near the target before a grenade is thrown.
    pub grenade_cluster: usize,
    /// Circle the target while at a comfortable distance.
    pub strafe: bool,
    /// Upgrade parts in order of preference.
    pub upgrade_priority: Vec<WeaponPart>,
}

impl Default for Strategy {
    fn default() -> Self {
        Self {
            name: "Kiter".to_string(),
            kite_distance: 160.0,
            engage_distance: 320.0,
            range_fraction: 0.8,
            reload_fraction: 0.5,
            quick_reload: true,
            dodge_distance: 40.0,
            grenade_cluster: 4,
            strafe: true,
            upgrade_priority: vec![
                WeaponPart::Magazine,
                WeaponPart::Stock,
                WeaponPart::Trigger,
                WeaponPart::Ammo,
                WeaponPart::Grip,
                WeaponPart::Muzzle,
                WeaponPart::Barrel,
                WeaponPart::Scope,
            ],
        }
    }
}

impl Strategy {
    /// Load a strategy from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StrategyError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StrategyError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self, StrategyError> {
        Ok(ron::from_str(ron)?)
    }

    /// Stand still and shoot.
    #[must_use]
    pub fn turret() -> Self {
        Self {
            name: "Turret".to_string(),
            kite_distance: 0.0,
            engage_distance: f32::INFINITY,
            range_fraction: 1.0,
            quick_reload: false,
            dodge_distance: 0.0,
            grenade_cluster: 3,
            strafe: false,
            ..Self::default()
        }
    }

    /// Close range, damage first.
    #[must_use]
    pub fn aggressive() -> Self {
        Self {
            name: "Aggressive".to_string(),
            kite_distance: 60.0,
            engage_distance: 150.0,
            range_fraction: 0.6,
            reload_fraction: 0.25,
            grenade_cluster: 2,
            upgrade_priority: vec![
                WeaponPart::Stock,
                WeaponPart::Ammo,
                WeaponPart::Trigger,
                WeaponPart::Magazine,
                WeaponPart::Muzzle,
                WeaponPart::Grip,
                WeaponPart::Barrel,
                WeaponPart::Scope,
            ],
            ..Self::default()
        }
    }

    /// Preset by name; unknown names give the default.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "turret" => Self::turret(),
            "aggressive" | "rush" => Self::aggressive(),
            "kiter" | "default" => Self::default(),
            other => {
                tracing::warn!(strategy = other, "unknown strategy, using default");
                Self::default()
            }
        }
    }

    /// Input for this frame.
    pub fn decide(&self, sim: &Simulation, frame: u64) -> FrameInput {
        let world = sim.world();
        let player = sim.player();
        let stats = sim.stats();
        let camera = &world.camera;
        let mut input = FrameInput {
            aim_screen: world.pointer,
            ..FrameInput::default()
        };

        let nearest = world
            .stores
            .living_zombies()
            .map(|z| (z, z.position.distance(player.position)))
            .min_by(|a, b| a.1.total_cmp(&b.1));

        if player.reload.is_reloading() && self.quick_reload {
            let in_window = player
                .reload
                .progress()
                .is_some_and(|p| player.reload.window.contains(p));
            input.fire_pressed = in_window && !player.reload.attempted;
            input.fire_held = input.fire_pressed;
        }

        let Some((target, distance)) = nearest else {
            if !player.reload.is_reloading() && player.ammo < player.max_ammo {
                input.reload_pressed = true;
            }
            return input;
        };

        input.aim_screen = camera.world_to_screen(target.position);
        let away = safe_normalize(player.position - target.position);
        input.move_axis = if distance < self.kite_distance {
            away
        } else if distance > self.engage_distance {
            -away
        } else if self.strafe {
            Vec2::new(-away.y, away.x)
        } else {
            Vec2::ZERO
        };
        input.sprint_held = distance < self.kite_distance * 0.5;

        let in_range = distance - target.radius <= stats.max_distance * self.range_fraction;
        if !player.reload.is_reloading() {
            if in_range && player.ammo > 0 {
                input.fire_held = true;
                input.fire_pressed = match stats.fire_mode {
                    FireMode::Auto => true,
                    FireMode::Manual => frame % 2 == 0,
                };
            } else if player.ammo == 0
                || (!in_range
                    && (player.ammo as f32) < player.max_ammo as f32 * self.reload_fraction)
            {
                input.reload_pressed = true;
            }
        }

        input.dodge_pressed = distance - target.radius < self.dodge_distance
            && !player.reload.is_reloading()
            && player.stamina >= sim.config().player.dodge_cost;

        if self.grenade_cluster > 0 && player.grenade.cooldown <= 0.0 {
            let radius = grenade_blast(&sim.config().grenade, player.grenade.level).radius;
            let crowd = world
                .stores
                .living_zombies()
                .filter(|z| z.position.distance(target.position) <= radius)
                .count();
            if crowd >= self.grenade_cluster && distance > radius * 0.5 {
                input.grenade_pressed = true;
            }
        }

        input
    }

    /// First part in priority order that can still be raised.
    pub fn pick_upgrade(&self, sim: &Simulation) -> Option<WeaponPart> {
        self.upgrade_priority.iter().copied().find(|&part| {
            sim.world().upgrades.level(part) < sim.data().upgrades.max_level(part)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horde_core::components::Zombie;
    use horde_core::data::ZombieKind;

    fn sim_with_zombie(offset: Vec2) -> Simulation {
        let mut sim = Simulation::with_defaults(1);
        let data = sim.data().zombies.get(ZombieKind::Walker);
        let world = sim.world_mut();
        let id = world.stores.next_id();
        let pos = world.player.position + offset;
        world.stores.zombies.push(Zombie::new(id, &data, pos, 1.0));
        sim
    }

    #[test]
    fn test_shoots_zombie_in_range() {
        let sim = sim_with_zombie(Vec2::new(200.0, 0.0));
        let input = Strategy::default().decide(&sim, 0);
        assert!(input.fire_held && input.fire_pressed);
        assert!(input.aim_screen.x > sim.world().camera.viewport.x / 2.0);
    }

    #[test]
    fn test_backs_away_when_close() {
        let sim = sim_with_zombie(Vec2::new(100.0, 0.0));
        let input = Strategy::default().decide(&sim, 0);
        assert!(input.move_axis.x < 0.0);
    }

    #[test]
    fn test_turret_stays_put() {
        let sim = sim_with_zombie(Vec2::new(100.0, 0.0));
        let input = Strategy::turret().decide(&sim, 0);
        assert_eq!(input.move_axis, Vec2::ZERO);
        assert!(input.fire_held);
    }

    #[test]
    fn test_reloads_when_empty() {
        let mut sim = sim_with_zombie(Vec2::new(200.0, 0.0));
        sim.world_mut().player.ammo = 0;
        let input = Strategy::default().decide(&sim, 0);
        assert!(input.reload_pressed);
        assert!(!input.fire_held);
    }

    #[test]
    fn test_upgrade_priority_skips_maxed() {
        let mut sim = Simulation::with_defaults(1);
        let max = sim.data().upgrades.max_level(WeaponPart::Magazine);
        for _ in 0..max {
            sim.apply_upgrade(WeaponPart::Magazine);
        }
        assert_eq!(Strategy::default().pick_upgrade(&sim), Some(WeaponPart::Stock));
    }

    #[test]
    fn test_ron_strategy_with_defaults() {
        let s = Strategy::from_ron_str(r#"(name: "Coward", kite_distance: 400.0)"#).unwrap();
        assert_eq!(s.kite_distance, 400.0);
        assert_eq!(s.upgrade_priority, Strategy::default().upgrade_priority);
    }
}
