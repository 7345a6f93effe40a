//! Simulation tuning constants.
//!
//! Everything numeric that is not part of a weapon/zombie/item/upgrade
//! record lives here. The whole struct is RON-loadable; every section has
//! a `Default` so partial files are fine.

use serde::{Deserialize, Serialize};

/// Top-level simulation configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Player movement, stamina and dodge.
    pub player: PlayerConfig,
    /// Enemy spawning and wave pacing.
    pub spawn: SpawnConfig,
    /// Player xp curve.
    pub leveling: LevelingConfig,
    /// Grenade ballistics, damage and progression.
    pub grenade: GrenadeConfig,
    /// Frame clamping, knockback and transient effects.
    pub physics: PhysicsConfig,
}

/// Player constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Collision radius.
    pub radius: f32,
    /// Starting and maximum health.
    pub max_health: f32,
    /// Walk speed, world units per second.
    pub speed: f32,
    /// Speed multiplier while sprinting.
    pub sprint_multiplier: f32,
    /// Maximum stamina.
    pub max_stamina: f32,
    /// Stamina drained per second of sprinting.
    pub stamina_drain: f32,
    /// Stamina regained per second when not sprinting.
    pub stamina_regen: f32,
    /// Stamina spent per dodge.
    pub dodge_cost: f32,
    /// Dodge duration, seconds.
    pub dodge_duration: f32,
    /// Dodge speed, world units per second.
    pub dodge_speed: f32,
    /// Seconds into the dodge when invulnerability starts.
    pub dodge_invuln_start: f32,
    /// Seconds into the dodge when invulnerability ends.
    pub dodge_invuln_end: f32,
    /// Divides weapon reload time.
    pub reload_ability: f32,
    /// Knockback speed given to zombies the player sprints into.
    pub sprint_knockback: f32,
    /// Accumulated contact damage needed before a damage number is shown.
    pub damage_text_threshold: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            radius: 16.0,
            max_health: 100.0,
            speed: 200.0,
            sprint_multiplier: 1.6,
            max_stamina: 100.0,
            stamina_drain: 30.0,
            stamina_regen: 15.0,
            dodge_cost: 30.0,
            dodge_duration: 0.3,
            dodge_speed: 600.0,
            dodge_invuln_start: 0.0,
            dodge_invuln_end: 0.2,
            reload_ability: 1.0,
            sprint_knockback: 400.0,
            damage_text_threshold: 5.0,
        }
    }
}

/// Spawner and wave constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Milliseconds between spawns on wave 1.
    pub base_interval_ms: f32,
    /// Interval reduction per wave.
    pub interval_reduction_per_wave_ms: f32,
    /// Interval floor.
    pub min_interval_ms: f32,
    /// Closest spawn distance from the player.
    pub min_distance: f32,
    /// Farthest spawn distance from the player.
    pub max_distance: f32,
    /// Zombies farther than this from the player are removed without reward.
    pub cleanup_radius: f32,
    /// Live zombie cap.
    pub max_zombies: usize,
    /// Extra health fraction per wave past the first.
    pub health_scale_per_wave: f32,
    /// Kills needed to advance one wave.
    pub kills_per_wave: u32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            base_interval_ms: 1500.0,
            interval_reduction_per_wave_ms: 100.0,
            min_interval_ms: 300.0,
            min_distance: 600.0,
            max_distance: 800.0,
            cleanup_radius: 2000.0,
            max_zombies: 80,
            health_scale_per_wave: 0.1,
            kills_per_wave: 10,
        }
    }
}

/// Player xp curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelingConfig {
    /// Xp needed for level 2.
    pub initial_max_xp: u32,
    /// Threshold growth per level.
    pub xp_multiplier: f32,
    /// Flat weapon damage added per player level past the first.
    pub damage_per_level: f32,
}

impl Default for LevelingConfig {
    fn default() -> Self {
        Self {
            initial_max_xp: 100,
            xp_multiplier: 1.5,
            damage_per_level: 2.0,
        }
    }
}

/// Grenade constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrenadeConfig {
    /// Damage at grenade level 1.
    pub base_damage: f32,
    /// Damage gained per grenade level.
    pub damage_per_level: f32,
    /// Blast radius at level 1.
    pub base_radius: f32,
    /// Radius gained per level.
    pub radius_per_level: f32,
    /// Knockback distance at level 1.
    pub base_knockback: f32,
    /// Knockback gained per level.
    pub knockback_per_level: f32,
    /// Cooldown at level 1, seconds.
    pub base_cooldown: f32,
    /// Cooldown reduction per level.
    pub cooldown_reduction_per_level: f32,
    /// Cooldown floor.
    pub min_cooldown: f32,
    /// Grenade xp for level 2.
    pub initial_max_xp: u32,
    /// Grenade xp threshold growth per level.
    pub xp_multiplier: f32,
    /// Grenade xp per zombie killed by a blast.
    pub xp_per_kill: u32,
    /// Gravity on the z axis.
    pub gravity: f32,
    /// Vertical velocity kept on each bounce.
    pub bounciness: f32,
    /// Horizontal velocity kept on each bounce.
    pub ground_damping: f32,
    /// Bounce speed below which the grenade starts rolling.
    pub bounce_threshold: f32,
    /// Horizontal velocity kept per rolling frame.
    pub rolling_friction: f32,
    /// Fuse once rolling, seconds.
    pub fuse: f32,
    /// Launch height.
    pub launch_height: f32,
    /// Initial upward speed.
    pub launch_vz: f32,
    /// Horizontal speed per unit of distance to the aim point.
    pub throw_speed_factor: f32,
    /// Horizontal speed cap.
    pub max_throw_speed: f32,
    /// Shockwave visual duration.
    pub effect_duration: f32,
    /// Screen shake on detonation.
    pub shake: f32,
}

impl Default for GrenadeConfig {
    fn default() -> Self {
        Self {
            base_damage: 80.0,
            damage_per_level: 20.0,
            base_radius: 120.0,
            radius_per_level: 15.0,
            base_knockback: 60.0,
            knockback_per_level: 10.0,
            base_cooldown: 8.0,
            cooldown_reduction_per_level: 0.75,
            min_cooldown: 3.0,
            initial_max_xp: 5,
            xp_multiplier: 1.5,
            xp_per_kill: 1,
            gravity: 900.0,
            bounciness: 0.45,
            ground_damping: 0.7,
            bounce_threshold: 60.0,
            rolling_friction: 0.92,
            fuse: 0.8,
            launch_height: 10.0,
            launch_vz: 320.0,
            throw_speed_factor: 1.2,
            max_throw_speed: 520.0,
            effect_duration: 0.6,
            shake: 12.0,
        }
    }
}

/// Frame and transient-effect constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Largest delta a single tick integrates, seconds.
    pub max_delta: f32,
    /// Duration over which blast/sprint knockback velocity is spent.
    pub knockback_duration: f32,
    /// Knockback velocity kept per second (exponential decay base).
    pub knockback_decay: f32,
    /// Bullet collision radius.
    pub bullet_radius: f32,
    /// Zombie hit-flash duration.
    pub hit_flash: f32,
    /// Gravity for shells and dropped items.
    pub prop_gravity: f32,
    /// Shell casing lifetime.
    pub shell_lifetime: f32,
    /// Floating text lifetime.
    pub text_lifetime: f32,
    /// Floating text rise speed.
    pub text_rise_speed: f32,
    /// Screen shake decay per second.
    pub shake_decay: f32,
    /// Minimum gap between dry-fire clicks, milliseconds.
    pub dry_fire_interval_ms: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            max_delta: 0.1,
            knockback_duration: 0.2,
            knockback_decay: 0.02,
            bullet_radius: 3.0,
            hit_flash: 0.1,
            prop_gravity: 800.0,
            shell_lifetime: 3.0,
            text_lifetime: 1.0,
            text_rise_speed: 40.0,
            shake_decay: 30.0,
            dry_fire_interval_ms: 200.0,
        }
    }
}
