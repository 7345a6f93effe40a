//! Trigger handling: fire-rate gate, spread, pellets, reload input.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::components::Bullet;
use crate::data::{FireMode, ReloadType};
use crate::effects;
use crate::events::{ShotEvent, SoundId, TickEvents};
use crate::input::FrameInput;
use crate::math::{direction, Vec2};
use crate::reload::{QuickReloadOutcome, ReloadEvent};
use crate::stats::EffectiveStats;
use crate::world::{FrameContext, World};

/// Spread from sustained fire alone.
///
/// A zero `control` means the weapon kicks to full spread at once.
#[must_use]
pub fn recoil_spread(consecutive: f32, control: f32, min_spread: f32, max_spread: f32) -> f32 {
    if control <= 0.0 {
        return max_spread;
    }
    let t = (consecutive / control).clamp(0.0, 1.0);
    min_spread + (max_spread - min_spread) * t
}

/// Recoil and movement spread of the equipped weapon.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RecoilState {
    /// Shots in the current burst, fractional while recovering.
    pub consecutive_shots: f32,
    /// Spread added by moving.
    pub movement_spread: f32,
    /// Clock time of the last shot.
    pub last_shot_ms: Option<f64>,
}

impl RecoilState {
    /// Total spread for the next shot.
    #[must_use]
    pub fn current_spread(&self, stats: &EffectiveStats) -> f32 {
        recoil_spread(
            self.consecutive_shots,
            stats.recoil_control,
            stats.min_spread,
            stats.max_spread,
        ) + self.movement_spread
    }

    /// Fire-rate gate.
    #[must_use]
    pub fn can_fire(&self, now_ms: f64, fire_rate_ms: f32) -> bool {
        self.last_shot_ms
            .map_or(true, |last| now_ms - last >= f64::from(fire_rate_ms))
    }

    /// Count a shot.
    pub fn register_shot(&mut self, now_ms: f64, recoil_control: f32) {
        self.consecutive_shots = (self.consecutive_shots + 1.0).min(recoil_control.max(0.0));
        self.last_shot_ms = Some(now_ms);
    }

    /// Recover recoil and ramp movement spread.
    pub fn update(&mut self, now_ms: f64, dt: f32, stats: &EffectiveStats, moving: bool) {
        if let Some(last) = self.last_shot_ms {
            let idle = ((now_ms - last) / 1000.0) as f32;
            if idle >= stats.recoil_reset_time {
                self.consecutive_shots =
                    (self.consecutive_shots - stats.recoil_recovery.max(0.0) * dt).max(0.0);
            }
        }

        let cap = stats.max_spread_moving.max(0.0);
        if stats.movement_stability <= 0.0 {
            self.movement_spread = if moving { cap } else { 0.0 };
        } else {
            let rate = cap / stats.movement_stability;
            let delta = if moving { rate * dt } else { -2.0 * rate * dt };
            self.movement_spread = (self.movement_spread + delta).clamp(0.0, cap);
        }
    }
}

/// Reload progress, reload key, and trigger for one frame.
pub fn update_weapon(
    ctx: &FrameContext<'_>,
    world: &mut World,
    input: &FrameInput,
    events: &mut TickEvents,
) {
    let stats = ctx.stats;
    let player = &mut world.player;

    let moving = player.velocity.length_squared() > 0.0;
    player.recoil.update(ctx.now_ms, ctx.dt, stats, moving);

    match player.reload.update(
        ctx.dt,
        &mut player.ammo,
        player.max_ammo,
        stats.reload_type,
        &stats.quick_reload,
        &mut world.rng,
    ) {
        Some(ReloadEvent::ShellLoaded) => events.sound(SoundId::ShellLoad),
        Some(ReloadEvent::Completed) => events.sound(SoundId::ReloadComplete),
        None => {}
    }

    if input.reload_pressed && start_reload(ctx, world) {
        events.sound(SoundId::ReloadStart);
    }

    handle_trigger(ctx, world, input, events);
}

/// Begin a reload if allowed. Returns whether one started.
pub fn start_reload(ctx: &FrameContext<'_>, world: &mut World) -> bool {
    let player = &mut world.player;
    if !player
        .reload
        .can_start(player.ammo, player.max_ammo, player.dodge.active)
    {
        return false;
    }
    player.reload.start(
        ctx.stats.reload_time,
        ctx.config.player.reload_ability,
        &ctx.stats.quick_reload,
        &mut world.rng,
    );
    tracing::trace!(weapon = %ctx.stats.weapon, ammo = player.ammo, "reload started");
    true
}

fn handle_trigger(
    ctx: &FrameContext<'_>,
    world: &mut World,
    input: &FrameInput,
    events: &mut TickEvents,
) {
    let stats = ctx.stats;
    let pulled = match stats.fire_mode {
        FireMode::Manual => input.fire_pressed,
        FireMode::Auto => input.fire_held,
    };
    if !pulled && !input.fire_pressed {
        return;
    }

    let player = &mut world.player;
    if player.dodge.active {
        return;
    }

    if player.reload.is_reloading() {
        if !input.fire_pressed {
            return;
        }
        if player.reload.failed_lock {
            if player.ammo == 0 {
                return;
            }
            player.reload.cancel();
        } else {
            let outcome = player.reload.attempt_quick_reload(
                &mut player.ammo,
                player.max_ammo,
                stats.reload_type,
                &stats.quick_reload,
                &mut world.rng,
            );
            if let Some(outcome) = outcome {
                events.quick_reloads.push(outcome);
                events.sound(match outcome {
                    QuickReloadOutcome::Success => SoundId::QuickReloadSuccess,
                    QuickReloadOutcome::Failure => SoundId::QuickReloadFail,
                });
                tracing::debug!(?outcome, ammo = player.ammo, "quick reload");
            }
            return;
        }
    }

    if !pulled || player.reload.blocks_firing() {
        return;
    }

    if player.ammo == 0 {
        match stats.fire_mode {
            FireMode::Manual => {
                let interval = ctx.config.physics.dry_fire_interval_ms;
                if player.reload.try_dry_fire(ctx.now_ms, interval) {
                    events.dry_fires += 1;
                    events.sound(SoundId::DryFire);
                }
            }
            FireMode::Auto => {
                if start_reload(ctx, world) {
                    events.sound(SoundId::ReloadStart);
                }
            }
        }
        return;
    }

    if player.recoil.can_fire(ctx.now_ms, stats.fire_rate) {
        fire(ctx, world, events);
    }
}

/// Spend one round and spawn the pellets.
pub fn fire(ctx: &FrameContext<'_>, world: &mut World, events: &mut TickEvents) {
    let stats = ctx.stats;
    let player = &mut world.player;

    let spread = player.recoil.current_spread(stats);
    let angle = player.rotation;
    let muzzle = player.position + direction(angle) * stats.gun_length;

    for _ in 0..stats.pellet_count.max(1) {
        let offset = world.rng.gen::<f32>() - 0.5;
        let pellet_angle = angle + spread * offset;
        let is_critical = world.rng.gen::<f32>() < stats.critical_chance;
        let id = world.stores.next_id();
        world.stores.bullets.push(Bullet {
            id,
            position: muzzle,
            velocity: direction(pellet_angle) * stats.bullet_speed,
            damage: stats.damage,
            is_critical,
            critical_multiplier: stats.critical_multiplier,
            distance_traveled: 0.0,
            max_distance: stats.max_distance,
            knockback: stats.knockback,
            slow: stats.slow,
            penetration: stats.penetration,
            hit_count: 0,
            extended: false,
            hit_ids: Vec::new(),
            dead: false,
        });
    }

    player.ammo = player.ammo.saturating_sub(1);
    player.recoil.register_shot(ctx.now_ms, stats.recoil_control);

    let casing = match stats.reload_type {
        ReloadType::Shell => effects::HULL,
        ReloadType::Magazine => effects::BRASS,
    };
    let ejection = player.position + direction(angle) * (stats.gun_length * 0.5);
    effects::eject_shell(
        &mut world.stores,
        &mut world.rng,
        &ctx.config.physics,
        ejection,
        angle,
        casing,
    );
    effects::spray(&mut world.stores, &mut world.rng, muzzle, angle, 4, 300.0, effects::SPARK);
    world.camera.add_shake(stats.shake);

    events.shots.push(ShotEvent {
        weapon: stats.weapon,
        origin: muzzle,
        angle,
        spread,
        pellets: stats.pellet_count.max(1),
    });
    events.sound(SoundId::Shot(stats.weapon));
}

/// Muzzle position for the current facing.
#[must_use]
pub fn muzzle_position(position: Vec2, rotation: f32, gun_length: f32) -> Vec2 {
    position + direction(rotation) * gun_length
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::data::{GameData, UpgradeLevels, WeaponId};
    use crate::stats::compute_stats;

    fn stats_for(id: WeaponId) -> EffectiveStats {
        let data = GameData::default();
        compute_stats(data.weapons.get(id), &data.upgrades, &UpgradeLevels::new(), 1, 2.0)
    }

    struct Fixture {
        config: SimulationConfig,
        data: GameData,
        stats: EffectiveStats,
        world: World,
    }

    impl Fixture {
        fn new(id: WeaponId) -> Self {
            let config = SimulationConfig::default();
            let data = GameData::default();
            let stats = stats_for(id);
            let mut world = World::new(&config, &data, 3);
            world.player.weapon = id;
            world.player.max_ammo = stats.max_ammo;
            world.player.ammo = stats.max_ammo;
            Self {
                config,
                data,
                stats,
                world,
            }
        }

        fn step(&mut self, now_ms: f64, input: &FrameInput) -> TickEvents {
            let ctx = FrameContext {
                config: &self.config,
                data: &self.data,
                stats: &self.stats,
                dt: 0.016,
                now_ms,
            };
            let mut events = TickEvents::default();
            update_weapon(&ctx, &mut self.world, input, &mut events);
            events
        }
    }

    fn recoil_stats() -> EffectiveStats {
        let mut stats = stats_for(WeaponId::Pistol);
        stats.min_spread = 0.02;
        stats.max_spread = 0.12;
        stats.recoil_control = 4.0;
        stats.recoil_reset_time = 0.5;
        stats.recoil_recovery = 2.0;
        stats
    }

    #[test]
    fn test_recoil_caps_at_control() {
        let stats = recoil_stats();
        let mut recoil = RecoilState::default();
        for i in 0..10 {
            recoil.register_shot(f64::from(i) * 100.0, stats.recoil_control);
        }
        assert_eq!(recoil.consecutive_shots, 4.0);
        assert!((recoil.current_spread(&stats) - 0.12).abs() < 1e-6);
    }

    #[test]
    fn test_recoil_holds_until_reset_time() {
        let stats = recoil_stats();
        let mut recoil = RecoilState::default();
        for t in [0.0, 100.0, 200.0] {
            recoil.register_shot(t, stats.recoil_control);
        }
        assert_eq!(recoil.consecutive_shots, 3.0);

        recoil.update(600.0, 0.1, &stats, false);
        assert_eq!(recoil.consecutive_shots, 3.0);
        assert!((recoil.current_spread(&stats) - 0.095).abs() < 1e-6);
    }

    #[test]
    fn test_recoil_recovers_after_reset_time() {
        let stats = recoil_stats();
        let mut recoil = RecoilState::default();
        for t in [0.0, 100.0, 200.0] {
            recoil.register_shot(t, stats.recoil_control);
        }

        recoil.update(800.0, 0.1, &stats, false);
        assert!((recoil.consecutive_shots - 2.8).abs() < 1e-5);
        assert!((recoil.current_spread(&stats) - 0.09).abs() < 1e-5);

        for _ in 0..20 {
            recoil.update(2000.0, 0.1, &stats, false);
        }
        assert_eq!(recoil.consecutive_shots, 0.0);
        assert!((recoil.current_spread(&stats) - 0.02).abs() < 1e-6);
    }

    fn press() -> FrameInput {
        FrameInput {
            fire_pressed: true,
            fire_held: true,
            ..FrameInput::default()
        }
    }

    #[test]
    fn test_recoil_spread_bounds() {
        assert_eq!(recoil_spread(0.0, 5.0, 0.1, 0.5), 0.1);
        assert_eq!(recoil_spread(10.0, 5.0, 0.1, 0.5), 0.5);
        assert_eq!(recoil_spread(0.0, 0.0, 0.1, 0.5), 0.5);
    }

    #[test]
    fn test_movement_spread_ramps_and_decays_twice_as_fast() {
        let mut stats = stats_for(WeaponId::Pistol);
        stats.max_spread_moving = 0.2;
        stats.movement_stability = 1.0;
        let mut recoil = RecoilState::default();
        recoil.update(0.0, 0.5, &stats, true);
        assert!((recoil.movement_spread - 0.1).abs() < 1e-6);
        recoil.update(0.0, 0.25, &stats, false);
        assert!(recoil.movement_spread.abs() < 1e-6);
        recoil.update(0.0, 5.0, &stats, true);
        assert!((recoil.movement_spread - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_zero_stability_is_instant() {
        let mut stats = stats_for(WeaponId::Pistol);
        stats.max_spread_moving = 0.2;
        stats.movement_stability = 0.0;
        let mut recoil = RecoilState::default();
        recoil.update(0.0, 0.016, &stats, true);
        assert_eq!(recoil.movement_spread, 0.2);
    }

    #[test]
    fn test_manual_fire_gated_by_rate() {
        let mut f = Fixture::new(WeaponId::Pistol);
        let events = f.step(1000.0, &press());
        assert_eq!(events.shots.len(), 1);
        assert_eq!(f.world.player.ammo, f.stats.max_ammo - 1);
        let events = f.step(1100.0, &press());
        assert!(events.shots.is_empty());
        let events = f.step(1000.0 + f64::from(f.stats.fire_rate), &press());
        assert_eq!(events.shots.len(), 1);
    }

    #[test]
    fn test_manual_needs_fresh_press() {
        let mut f = Fixture::new(WeaponId::Pistol);
        f.step(1000.0, &press());
        let held = FrameInput {
            fire_held: true,
            ..FrameInput::default()
        };
        assert!(f.step(5000.0, &held).shots.is_empty());
    }

    #[test]
    fn test_shotgun_spawns_pellets() {
        let mut f = Fixture::new(WeaponId::Shotgun);
        f.step(1000.0, &press());
        assert_eq!(f.world.stores.bullets.len(), f.stats.pellet_count as usize);
        assert_eq!(f.world.stores.shells.len(), 1);
    }

    #[test]
    fn test_manual_empty_dry_fires() {
        let mut f = Fixture::new(WeaponId::Shotgun);
        f.world.player.ammo = 0;
        let events = f.step(1000.0, &press());
        assert_eq!(events.dry_fires, 1);
        assert!(!f.world.player.reload.is_reloading());
        assert_eq!(f.step(1100.0, &press()).dry_fires, 0);
        assert_eq!(f.step(1300.0, &press()).dry_fires, 1);
    }

    #[test]
    fn test_auto_empty_starts_reload() {
        let mut f = Fixture::new(WeaponId::Rifle);
        f.world.player.ammo = 0;
        let events = f.step(1000.0, &press());
        assert!(events.sounds.contains(&SoundId::ReloadStart));
        assert!(f.world.player.reload.is_reloading());
    }

    #[test]
    fn test_fire_during_locked_shell_reload_cancels_and_fires() {
        let mut f = Fixture::new(WeaponId::Shotgun);
        f.world.player.ammo = 2;
        let ctx_stats = f.stats.clone();
        f.world.player.reload.start(
            ctx_stats.reload_time,
            1.0,
            &ctx_stats.quick_reload,
            &mut f.world.rng,
        );
        f.world.player.reload.failed_lock = true;

        let events = f.step(1000.0, &press());
        assert!(!f.world.player.reload.is_reloading());
        assert_eq!(events.shots.len(), 1);
        assert_eq!(f.world.player.ammo, 1);
    }

    #[test]
    fn test_fire_during_reload_is_a_quick_reload_attempt() {
        let mut f = Fixture::new(WeaponId::Pistol);
        f.world.player.ammo = 0;
        let stats = f.stats.clone();
        f.world
            .player
            .reload
            .start(stats.reload_time, 1.0, &stats.quick_reload, &mut f.world.rng);
        // Step into the reload past the minimum progress
        f.step(0.0, &FrameInput::default());
        if let crate::reload::ReloadPhase::Reloading { elapsed, .. } =
            &mut f.world.player.reload.phase
        {
            *elapsed = stats.reload_time * 0.9;
        }
        let events = f.step(100.0, &press());
        assert_eq!(events.quick_reloads, vec![QuickReloadOutcome::Failure]);
        assert!(events.shots.is_empty());
    }
}
