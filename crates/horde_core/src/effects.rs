//! Cosmetic spawners: particles, floating text, shell casings.
//!
//! These consume randomness from the simulation RNG so replays stay
//! bit-identical, but nothing in the game logic reads the entities back.

use std::f32::consts::{FRAC_PI_2, TAU};

use rand::Rng;

use crate::components::{FloatingText, Particle, Rgb, Shell};
use crate::config::PhysicsConfig;
use crate::math::{direction, Vec2};
use crate::world::EntityStores;

/// Blood splatter.
pub const BLOOD: Rgb = [150, 20, 20];
/// Muzzle sparks.
pub const SPARK: Rgb = [255, 210, 90];
/// Brass casing.
pub const BRASS: Rgb = [200, 160, 60];
/// Red shotgun hull.
pub const HULL: Rgb = [180, 40, 40];
/// Damage number on a zombie.
pub const DAMAGE_TEXT: Rgb = [255, 255, 255];
/// Critical damage number.
pub const CRIT_TEXT: Rgb = [255, 200, 0];
/// Damage number on the player.
pub const HURT_TEXT: Rgb = [255, 60, 60];
/// Healing or pickup text.
pub const HEAL_TEXT: Rgb = [80, 220, 100];

/// Burst of `count` particles flying out of `position`.
pub fn burst<R: Rng + ?Sized>(
    stores: &mut EntityStores,
    rng: &mut R,
    position: Vec2,
    count: u32,
    speed: f32,
    color: Rgb,
) {
    for _ in 0..count {
        let angle = rng.gen_range(0.0..TAU);
        let magnitude = speed * rng.gen_range(0.3..1.0_f32);
        let life = rng.gen_range(0.2..0.5_f32);
        stores.particles.push(Particle {
            position,
            velocity: direction(angle) * magnitude,
            life,
            max_life: life,
            size: rng.gen_range(1.5..3.5),
            color,
        });
    }
}

/// Cone of particles around `angle`.
pub fn spray<R: Rng + ?Sized>(
    stores: &mut EntityStores,
    rng: &mut R,
    position: Vec2,
    angle: f32,
    count: u32,
    speed: f32,
    color: Rgb,
) {
    for _ in 0..count {
        let a = angle + rng.gen_range(-0.4..0.4_f32);
        let life = rng.gen_range(0.05..0.15_f32);
        stores.particles.push(Particle {
            position,
            velocity: direction(a) * speed * rng.gen_range(0.5..1.0_f32),
            life,
            max_life: life,
            size: rng.gen_range(1.0..2.5),
            color,
        });
    }
}

/// Rising text.
pub fn text(
    stores: &mut EntityStores,
    config: &PhysicsConfig,
    position: Vec2,
    text: impl Into<String>,
    color: Rgb,
) {
    stores.texts.push(FloatingText {
        position,
        velocity: Vec2::new(0.0, -config.text_rise_speed),
        text: text.into(),
        color,
        life: config.text_lifetime,
        max_life: config.text_lifetime,
    });
}

/// Spent casing kicked out to the right of the gun.
pub fn eject_shell<R: Rng + ?Sized>(
    stores: &mut EntityStores,
    rng: &mut R,
    config: &PhysicsConfig,
    position: Vec2,
    facing: f32,
    color: Rgb,
) {
    let side = facing + FRAC_PI_2 + rng.gen_range(-0.3..0.3_f32);
    stores.shells.push(Shell {
        position,
        z: 10.0,
        vz: rng.gen_range(120.0..200.0),
        velocity: direction(side) * rng.gen_range(60.0..120.0_f32),
        rotation: facing,
        spin: rng.gen_range(-20.0..20.0),
        life: config.shell_lifetime,
        max_life: config.shell_lifetime,
        color,
    });
}
