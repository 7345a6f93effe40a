//! Entity data.
//!
//! Components are pure data with no behavior beyond small bookkeeping
//! helpers. Systems in the other modules mutate them each tick.

use serde::{Deserialize, Serialize};

use crate::aim::AimState;
use crate::data::{ItemKind, PenetrationStats, SlowEffect, WeaponId, ZombieData, ZombieKind};
use crate::math::Vec2;
use crate::reload::ReloadState;
use crate::shooting::RecoilState;

/// Unique identifier for entities.
pub type EntityId = u64;

/// RGB colour.
pub type Rgb = [u8; 3];

// ============================================================================
// Player
// ============================================================================

/// Dodge roll state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DodgeState {
    /// A dodge is in progress.
    pub active: bool,
    /// Seconds left in the dodge.
    pub timer: f32,
    /// Seconds since the dodge started.
    pub elapsed: f32,
    /// Unit direction of travel.
    pub direction: Vec2,
}

/// Grenade cooldown and progression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrenadeProgress {
    /// Seconds until the next throw.
    pub cooldown: f32,
    /// Cooldown length at the current level.
    pub max_cooldown: f32,
    /// Grenade level, starting at 1.
    pub level: u32,
    /// Grenade xp toward the next level.
    pub xp: u32,
    /// Grenade xp threshold.
    pub max_xp: u32,
}

/// The player. One per simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// World position.
    pub position: Vec2,
    /// Velocity applied this frame.
    pub velocity: Vec2,
    /// Facing, radians.
    pub rotation: f32,
    /// Collision radius.
    pub radius: f32,
    /// Current health.
    pub health: f32,
    /// Health cap.
    pub max_health: f32,
    /// Walk speed.
    pub speed: f32,
    /// Equipped weapon.
    pub weapon: WeaponId,
    /// Rounds in the magazine.
    pub ammo: u32,
    /// Magazine capacity from the current effective stats.
    pub max_ammo: u32,
    /// Reload and quick-reload state.
    pub reload: ReloadState,
    /// Recoil and movement spread.
    pub recoil: RecoilState,
    /// Delayed aim.
    pub aim: AimState,
    /// Score.
    pub score: u64,
    /// Zombies killed.
    pub kills: u32,
    /// Xp toward next level.
    pub xp: u32,
    /// Xp threshold.
    pub max_xp: u32,
    /// Player level, starting at 1.
    pub level: u32,
    /// Current stamina.
    pub stamina: f32,
    /// Stamina cap.
    pub max_stamina: f32,
    /// Sprinting this frame.
    pub is_sprinting: bool,
    /// Dodge roll.
    pub dodge: DodgeState,
    /// Grenade cooldown and level.
    pub grenade: GrenadeProgress,
    /// Contact damage taken but not yet shown as text.
    pub pending_damage_text: f32,
}

impl Player {
    /// Whether the player is inside the invulnerable part of a dodge.
    #[must_use]
    pub fn is_invulnerable(&self, invuln_start: f32, invuln_end: f32) -> bool {
        self.dodge.active && self.dodge.elapsed >= invuln_start && self.dodge.elapsed <= invuln_end
    }

    /// Whether the player is dead.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }
}

// ============================================================================
// Zombies
// ============================================================================

/// A zombie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zombie {
    /// Entity id.
    pub id: EntityId,
    /// Archetype.
    pub kind: ZombieKind,
    /// World position.
    pub position: Vec2,
    /// Facing, radians.
    pub rotation: f32,
    /// Walk speed.
    pub speed: f32,
    /// Current health.
    pub health: f32,
    /// Health cap.
    pub max_health: f32,
    /// Contact damage per frame.
    pub damage: f32,
    /// Collision radius.
    pub radius: f32,
    /// Hit-flash seconds left.
    pub hit_flash: f32,
    /// Slow seconds left.
    pub slow_timer: f32,
    /// Speed multiplier while slowed.
    pub slow_factor: f32,
    /// Score reward.
    pub score: u32,
    /// Xp reward.
    pub xp: u32,
    /// Item drop multiplier.
    pub drop_multiplier: f32,
    /// Fraction of knockback applied.
    pub knockback_taken: f32,
    /// Knockback velocity.
    pub knockback_velocity: Vec2,
    /// Knockback seconds left.
    pub knockback_timer: f32,
    /// RGB colour.
    pub color: Rgb,
    /// Marked for deletion at the end of the frame.
    pub dead: bool,
}

impl Zombie {
    /// Spawn a zombie of an archetype with wave-scaled health.
    #[must_use]
    pub fn new(id: EntityId, data: &ZombieData, position: Vec2, health_scale: f32) -> Self {
        let health = data.health * health_scale.max(0.0);
        Self {
            id,
            kind: data.kind,
            position,
            rotation: 0.0,
            speed: data.speed,
            health,
            max_health: health,
            damage: data.damage,
            radius: data.radius,
            hit_flash: 0.0,
            slow_timer: 0.0,
            slow_factor: 1.0,
            score: data.score,
            xp: data.xp,
            drop_multiplier: data.drop_multiplier,
            knockback_taken: data.knockback_taken,
            knockback_velocity: Vec2::ZERO,
            knockback_timer: 0.0,
            color: data.color,
            dead: false,
        }
    }

    /// Whether collision checks should still consider this zombie.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        !self.dead && self.health > 0.0
    }

    /// Current movement speed including slow.
    #[must_use]
    pub fn effective_speed(&self) -> f32 {
        if self.slow_timer > 0.0 {
            self.speed * self.slow_factor
        } else {
            self.speed
        }
    }
}

// ============================================================================
// Projectiles
// ============================================================================

/// A bullet (one pellet).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    /// Entity id.
    pub id: EntityId,
    /// World position.
    pub position: Vec2,
    /// Velocity.
    pub velocity: Vec2,
    /// Damage before penetration falloff.
    pub damage: f32,
    /// Rolled a critical hit.
    pub is_critical: bool,
    /// Damage multiplier on a critical.
    pub critical_multiplier: f32,
    /// Distance flown so far.
    pub distance_traveled: f32,
    /// Range.
    pub max_distance: f32,
    /// Knockback distance on hit.
    pub knockback: f32,
    /// Slow applied on hit.
    pub slow: Option<SlowEffect>,
    /// Penetration budget.
    pub penetration: PenetrationStats,
    /// Confirmed hits.
    pub hit_count: u32,
    /// The probabilistic extra hit was granted.
    pub extended: bool,
    /// Zombies this bullet already damaged.
    pub hit_ids: Vec<EntityId>,
    /// Marked for deletion at the end of the frame.
    pub dead: bool,
}

impl Bullet {
    /// Whether this bullet already damaged `id`.
    #[must_use]
    pub fn has_hit(&self, id: EntityId) -> bool {
        self.hit_ids.contains(&id)
    }

    /// Damage dealt by the next hit.
    #[must_use]
    pub fn hit_damage(&self) -> f32 {
        let falloff = (1.0 - self.penetration.damage_drop * self.hit_count as f32).max(0.0);
        let damage = self.damage * falloff;
        if self.is_critical {
            damage * self.critical_multiplier
        } else {
            damage
        }
    }

    /// Record a confirmed hit on `id`. Returns whether the bullet survives.
    ///
    /// `roll` is a uniform sample in `[0, 1)` used only when the budget is
    /// exactly exhausted and the extension has not been used yet.
    pub fn register_hit(&mut self, id: EntityId, roll: f32) -> bool {
        self.hit_ids.push(id);
        self.hit_count += 1;

        let budget = self.penetration.count.max(1) + u32::from(self.extended);
        if self.hit_count < budget {
            return true;
        }
        if !self.extended
            && self.hit_count == self.penetration.count.max(1)
            && roll < self.penetration.chance
        {
            self.extended = true;
            return true;
        }
        self.dead = true;
        false
    }
}

/// Grenade flight phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrenadeState {
    /// Ballistic arc with bounces.
    Flying,
    /// On the ground, fuse burning.
    Rolling,
}

/// Blast parameters captured when the grenade leaves the hand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrenadeBlast {
    /// Damage to every zombie in range.
    pub damage: f32,
    /// Blast radius.
    pub radius: f32,
    /// Knockback distance.
    pub knockback: f32,
}

/// A thrown grenade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grenade {
    /// Entity id.
    pub id: EntityId,
    /// Ground-plane position.
    pub position: Vec2,
    /// Height above ground.
    pub z: f32,
    /// Vertical velocity.
    pub vz: f32,
    /// Ground-plane velocity.
    pub velocity: Vec2,
    /// Spin angle.
    pub rotation: f32,
    /// Fuse seconds left once rolling.
    pub life: f32,
    /// Flight phase.
    pub state: GrenadeState,
    /// Snapshotted blast.
    pub blast: GrenadeBlast,
    /// Exploded; removed at the end of the frame.
    pub dead: bool,
}

/// One ring of the shockwave visual.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShockRing {
    /// Current radius.
    pub radius: f32,
    /// Final radius.
    pub max_radius: f32,
    /// Seconds after detonation before this ring starts.
    pub start_delay: f32,
    /// Stroke width.
    pub width: f32,
}

/// Visual staging of one detonation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplosionEffect {
    /// Centre.
    pub position: Vec2,
    /// Seconds left.
    pub life: f32,
    /// Total duration.
    pub max_life: f32,
    /// Rings, innermost first.
    pub rings: Vec<ShockRing>,
}

// ============================================================================
// Transient props
// ============================================================================

/// Ejected shell casing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shell {
    /// Ground-plane position.
    pub position: Vec2,
    /// Height above ground.
    pub z: f32,
    /// Vertical velocity.
    pub vz: f32,
    /// Ground-plane velocity.
    pub velocity: Vec2,
    /// Angle.
    pub rotation: f32,
    /// Angular velocity.
    pub spin: f32,
    /// Seconds left.
    pub life: f32,
    /// Total lifetime.
    pub max_life: f32,
    /// RGB colour.
    pub color: Rgb,
}

/// A spark, blood drop or debris chip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// Position.
    pub position: Vec2,
    /// Velocity.
    pub velocity: Vec2,
    /// Seconds left.
    pub life: f32,
    /// Total lifetime.
    pub max_life: f32,
    /// Radius.
    pub size: f32,
    /// RGB colour.
    pub color: Rgb,
}

/// Rising text such as a damage number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatingText {
    /// Position.
    pub position: Vec2,
    /// Velocity.
    pub velocity: Vec2,
    /// Text.
    pub text: String,
    /// RGB colour.
    pub color: Rgb,
    /// Seconds left.
    pub life: f32,
    /// Total lifetime.
    pub max_life: f32,
}

/// A pickup lying on (or bouncing onto) the ground.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Entity id.
    pub id: EntityId,
    /// Kind.
    pub kind: ItemKind,
    /// Ground-plane position.
    pub position: Vec2,
    /// Height above ground.
    pub z: f32,
    /// Vertical velocity.
    pub vz: f32,
    /// Ground-plane velocity.
    pub velocity: Vec2,
    /// Seconds left.
    pub life: f32,
    /// Total lifetime.
    pub max_life: f32,
    /// Pickup radius.
    pub radius: f32,
    /// Kind-specific amount.
    pub value: f32,
    /// RGB colour.
    pub color: Rgb,
    /// Collected or expired.
    pub dead: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bullet(count: u32, chance: f32) -> Bullet {
        Bullet {
            id: 1,
            position: Vec2::ZERO,
            velocity: Vec2::X,
            damage: 25.0,
            is_critical: false,
            critical_multiplier: 2.0,
            distance_traveled: 0.0,
            max_distance: 100.0,
            knockback: 0.0,
            slow: None,
            penetration: PenetrationStats {
                count,
                chance,
                damage_drop: 0.2,
            },
            hit_count: 0,
            extended: false,
            hit_ids: Vec::new(),
            dead: false,
        }
    }

    #[test]
    fn test_hit_damage_falloff_and_crit() {
        let mut b = bullet(3, 0.0);
        assert_eq!(b.hit_damage(), 25.0);
        b.hit_count = 2;
        assert!((b.hit_damage() - 15.0).abs() < 1e-5);
        b.is_critical = true;
        assert!((b.hit_damage() - 30.0).abs() < 1e-5);
    }

    #[test]
    fn test_budget_exhausted_without_extension() {
        let mut b = bullet(2, 0.5);
        assert!(b.register_hit(10, 0.0));
        assert!(!b.register_hit(11, 0.9));
        assert!(b.dead);
        assert_eq!(b.hit_count, 2);
    }

    #[test]
    fn test_budget_extended_once_by_roll() {
        let mut b = bullet(2, 0.5);
        assert!(b.register_hit(10, 0.9));
        assert!(b.register_hit(11, 0.1));
        assert!(b.extended);
        assert!(!b.register_hit(12, 0.0));
        assert_eq!(b.hit_count, 3);
    }

    #[test]
    fn test_zombie_slow_speed() {
        let data = crate::data::ZombieTable::default().get(ZombieKind::Walker);
        let mut z = Zombie::new(1, &data, Vec2::ZERO, 1.0);
        assert_eq!(z.effective_speed(), 60.0);
        z.slow_timer = 0.5;
        z.slow_factor = 0.5;
        assert_eq!(z.effective_speed(), 30.0);
    }
}
