//! Per-entity motion and timers.
//!
//! Everything here is integration only: positions, velocities, lifetimes
//! and cooldowns. Collisions and their consequences live in
//! [`crate::combat`] and [`crate::rewards`].

use rand::Rng;

use crate::components::Zombie;
use crate::config::PhysicsConfig;
use crate::events::{SoundId, TickEvents};
use crate::input::FrameInput;
use crate::math::{angle_between_points, direction, safe_normalize, tick_down, Vec2};
use crate::world::{FrameContext, World};

/// Bounce damping for shells and items hitting the ground.
const PROP_BOUNCE: f32 = 0.4;
/// Vertical speed below which a prop stops bouncing.
const PROP_REST_SPEED: f32 = 20.0;
/// Ground friction for settled props, per second.
const PROP_FRICTION: f32 = 5.0;
/// Air drag on particles, per second.
const PARTICLE_DRAG: f32 = 3.0;

/// Dodge, sprint, stamina and walking.
pub fn update_player(
    ctx: &FrameContext<'_>,
    world: &mut World,
    input: &FrameInput,
    events: &mut TickEvents,
) {
    let pc = &ctx.config.player;
    let dt = ctx.dt;
    let p = &mut world.player;

    if input.dodge_pressed
        && !p.dodge.active
        && !p.reload.is_reloading()
        && p.stamina >= pc.dodge_cost
    {
        let dir = if input.is_moving() {
            input.move_axis
        } else {
            direction(p.rotation)
        };
        p.stamina -= pc.dodge_cost;
        p.dodge.active = true;
        p.dodge.timer = pc.dodge_duration;
        p.dodge.elapsed = 0.0;
        p.dodge.direction = safe_normalize(dir);
        events.sound(SoundId::Dodge);
    }

    if p.dodge.active {
        p.is_sprinting = false;
        p.velocity = p.dodge.direction * pc.dodge_speed;
        p.dodge.elapsed += dt;
        p.dodge.timer = tick_down(p.dodge.timer, dt);
        if p.dodge.timer <= 0.0 {
            p.dodge.active = false;
        }
    } else {
        let moving = input.is_moving();
        p.is_sprinting = input.sprint_held && moving && p.stamina > 0.0;
        let mut speed = p.speed * ctx.stats.move_speed_multiplier;
        if p.is_sprinting {
            speed *= pc.sprint_multiplier;
            p.stamina = (p.stamina - pc.stamina_drain * dt).max(0.0);
        } else {
            p.stamina = (p.stamina + pc.stamina_regen * dt).min(p.max_stamina);
        }
        p.velocity = input.move_axis * speed;
    }

    p.position += p.velocity * dt;
    p.grenade.cooldown = tick_down(p.grenade.cooldown, dt);

    world.camera.position = p.position;
    world.camera.zoom = ctx.stats.zoom;
}

/// Chase the player, or slide while knocked back.
pub fn update_zombies(ctx: &FrameContext<'_>, world: &mut World) {
    let dt = ctx.dt;
    let target = world.player.position;
    let decay = ctx.config.physics.knockback_decay.clamp(0.0, 1.0);

    for z in world.stores.zombies.iter_mut().filter(|z| z.is_alive()) {
        z.hit_flash = tick_down(z.hit_flash, dt);
        z.slow_timer = tick_down(z.slow_timer, dt);
        if z.slow_timer <= 0.0 {
            z.slow_factor = 1.0;
        }

        if z.knockback_timer > 0.0 {
            z.position += z.knockback_velocity * dt;
            z.knockback_velocity *= decay.powf(dt);
            z.knockback_timer = tick_down(z.knockback_timer, dt);
            if z.knockback_timer <= 0.0 {
                z.knockback_velocity = Vec2::ZERO;
            }
            continue;
        }

        z.rotation = angle_between_points(z.position, target, z.rotation);
        z.position += safe_normalize(target - z.position) * z.effective_speed() * dt;
    }

    separate_zombies(&mut world.stores.zombies);
}

/// Push overlapping zombies apart, half the overlap each.
fn separate_zombies(zombies: &mut [Zombie]) {
    for i in 0..zombies.len() {
        let (head, tail) = zombies.split_at_mut(i + 1);
        let a = &mut head[i];
        if !a.is_alive() {
            continue;
        }
        for b in tail.iter_mut().filter(|b| b.is_alive()) {
            let delta = b.position - a.position;
            let min_dist = a.radius + b.radius;
            let dist_sq = delta.length_squared();
            if dist_sq >= min_dist * min_dist || dist_sq <= f32::EPSILON {
                continue;
            }
            let dist = dist_sq.sqrt();
            let push = delta / dist * ((min_dist - dist) / 2.0);
            a.position -= push;
            b.position += push;
        }
    }
}

/// Move bullets and retire spent ones.
pub fn update_bullets(ctx: &FrameContext<'_>, world: &mut World) {
    let dt = ctx.dt;
    for b in world.stores.bullets.iter_mut().filter(|b| !b.dead) {
        b.position += b.velocity * dt;
        b.distance_traveled += b.velocity.length() * dt;
        if b.distance_traveled >= b.max_distance {
            b.dead = true;
        }
    }
}

/// Arc with gravity and bounce; returns whether the prop is resting.
fn settle(
    z: &mut f32,
    vz: &mut f32,
    velocity: &mut Vec2,
    gravity: f32,
    dt: f32,
) -> bool {
    if *z > 0.0 || *vz > 0.0 {
        *vz -= gravity * dt;
        *z += *vz * dt;
        if *z <= 0.0 {
            *z = 0.0;
            let bounce = -*vz * PROP_BOUNCE;
            if bounce < PROP_REST_SPEED {
                *vz = 0.0;
            } else {
                *vz = bounce;
                *velocity *= 0.6;
            }
        }
        false
    } else {
        *velocity *= (1.0 - PROP_FRICTION * dt).max(0.0);
        true
    }
}

/// Shells, particles, text, items, explosion visuals and camera shake.
pub fn update_props(ctx: &FrameContext<'_>, world: &mut World) {
    let dt = ctx.dt;
    let pc: &PhysicsConfig = &ctx.config.physics;
    let stores = &mut world.stores;

    for s in &mut stores.shells {
        s.position += s.velocity * dt;
        if settle(&mut s.z, &mut s.vz, &mut s.velocity, pc.prop_gravity, dt) {
            s.spin *= (1.0 - PROP_FRICTION * dt).max(0.0);
        }
        s.rotation += s.spin * dt;
        s.life = tick_down(s.life, dt);
    }

    for p in &mut stores.particles {
        p.position += p.velocity * dt;
        p.velocity *= (1.0 - PARTICLE_DRAG * dt).max(0.0);
        p.life = tick_down(p.life, dt);
    }

    for t in &mut stores.texts {
        t.position += t.velocity * dt;
        t.life = tick_down(t.life, dt);
    }

    for i in stores.items.iter_mut().filter(|i| !i.dead) {
        i.position += i.velocity * dt;
        settle(&mut i.z, &mut i.vz, &mut i.velocity, pc.prop_gravity, dt);
        i.life = tick_down(i.life, dt);
        if i.life <= 0.0 {
            i.dead = true;
        }
    }

    for e in &mut stores.explosions {
        e.life = tick_down(e.life, dt);
        let age = e.max_life - e.life;
        for ring in &mut e.rings {
            let span = (e.max_life - ring.start_delay).max(f32::EPSILON);
            let t = ((age - ring.start_delay) / span).clamp(0.0, 1.0);
            ring.radius = ring.max_radius * t;
        }
    }

    let camera = &mut world.camera;
    camera.shake = tick_down(camera.shake, pc.shake_decay * dt);
    camera.shake_offset = if camera.shake > 0.0 {
        Vec2::new(
            world.rng.gen_range(-1.0..=1.0),
            world.rng.gen_range(-1.0..=1.0),
        ) * camera.shake
    } else {
        Vec2::ZERO
    };
}

/// Mark zombies that wandered too far from the player. No rewards.
pub fn cull_distant_zombies(ctx: &FrameContext<'_>, world: &mut World) {
    let radius = ctx.config.spawn.cleanup_radius;
    let center = world.player.position;
    for z in &mut world.stores.zombies {
        if z.position.distance_squared(center) > radius * radius {
            z.dead = true;
        }
    }
}
