//! Delayed aim and acceleration-limited turning.
//!
//! Mouse angles are queued with their sample time and only become the
//! rotation target once older than the weapon's aim delay. The body then
//! turns toward the target with a turn rate that ramps while the error is
//! large and resets once the target is reached.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::math::{angle_between_points, angle_delta, wrap_angle};
use crate::world::{FrameContext, World};

/// Angular error below which the body counts as on target.
pub const ROTATION_EPSILON: f32 = 0.05;

/// Queue bound. Once reached, the newest sample replaces the back entry
/// so pending samples are never released early or skipped.
pub const MAX_QUEUED_SAMPLES: usize = 1024;

/// One timestamped aim sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AimSample {
    /// Simulation time of the sample, milliseconds.
    pub time_ms: f64,
    /// Desired facing, radians.
    pub angle: f32,
}

/// Aim queue plus turning state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AimState {
    queue: VecDeque<AimSample>,
    /// Current rotation target.
    pub target: f32,
    /// Current turn rate, radians per second.
    pub rotation_speed: f32,
}

impl AimState {
    /// Aim state already targeting `angle`.
    #[must_use]
    pub fn new(angle: f32, base_rotation_speed: f32) -> Self {
        Self {
            queue: VecDeque::new(),
            target: angle,
            rotation_speed: base_rotation_speed,
        }
    }

    /// Queue a desired facing. A full queue folds the sample into its back entry.
    pub fn push(&mut self, time_ms: f64, angle: f32) {
        let sample = AimSample { time_ms, angle };
        if self.queue.len() >= MAX_QUEUED_SAMPLES {
            if let Some(back) = self.queue.back_mut() {
                *back = sample;
                return;
            }
        }
        self.queue.push_back(sample);
    }

    /// Number of samples still waiting.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Promote every sample older than `aim_delay` seconds; the newest
    /// promoted sample becomes the target. Returns the target.
    ///
    /// A zero delay promotes everything immediately.
    pub fn release(&mut self, now_ms: f64, aim_delay: f32) -> f32 {
        if aim_delay <= 0.0 {
            if let Some(last) = self.queue.drain(..).last() {
                self.target = last.angle;
            }
            return self.target;
        }

        let delay_ms = f64::from(aim_delay) * 1000.0;
        while let Some(front) = self.queue.front() {
            if now_ms - front.time_ms > delay_ms {
                self.target = front.angle;
                self.queue.pop_front();
            } else {
                break;
            }
        }
        self.target
    }

    /// Turn `rotation` toward the target for one frame.
    pub fn rotate(
        &mut self,
        rotation: &mut f32,
        dt: f32,
        base_speed: f32,
        max_speed: f32,
        acceleration: f32,
    ) {
        let error = angle_delta(*rotation, self.target);
        if error.abs() <= ROTATION_EPSILON {
            *rotation = wrap_angle(self.target);
            self.rotation_speed = base_speed;
            return;
        }

        let cap = max_speed.max(base_speed);
        self.rotation_speed = (self.rotation_speed.max(base_speed) + acceleration * dt).min(cap);

        let step = self.rotation_speed * dt;
        if step >= error.abs() {
            *rotation = wrap_angle(self.target);
            self.rotation_speed = base_speed;
        } else {
            *rotation = wrap_angle(*rotation + step * error.signum());
        }
    }
}

/// Queue the pointer direction, release delayed samples, and turn.
pub fn update_aim(ctx: &FrameContext<'_>, world: &mut World) {
    let stats = ctx.stats;
    let aim_at = world.camera.screen_to_world(world.pointer);
    let player = &mut world.player;
    let desired = angle_between_points(player.position, aim_at, player.aim.target);

    player.aim.push(ctx.now_ms, desired);
    player.aim.release(ctx.now_ms, stats.aim_delay);
    player.aim.rotate(
        &mut player.rotation,
        ctx.dt,
        stats.base_rotation_speed,
        stats.max_rotation_speed,
        stats.rotation_acceleration,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_zero_delay_releases_newest() {
        let mut aim = AimState::default();
        aim.push(0.0, 0.5);
        aim.push(0.0, 1.0);
        assert_eq!(aim.release(0.0, 0.0), 1.0);
        assert_eq!(aim.pending(), 0);
    }

    #[test]
    fn test_delay_is_strict() {
        let mut aim = AimState::new(0.0, 10.0);
        aim.push(0.0, 1.0);
        assert_eq!(aim.release(100.0, 0.1), 0.0);
        assert_eq!(aim.release(100.5, 0.1), 1.0);
    }

    #[test]
    fn test_release_applies_all_expired_in_one_frame() {
        let mut aim = AimState::default();
        aim.push(0.0, 0.2);
        aim.push(10.0, 0.4);
        aim.push(500.0, 0.9);
        assert_eq!(aim.release(200.0, 0.1), 0.4);
        assert_eq!(aim.pending(), 1);
    }

    #[test]
    fn test_full_queue_keeps_oldest_samples() {
        let mut aim = AimState::default();
        let count = MAX_QUEUED_SAMPLES + 50;
        for i in 0..count {
            aim.push(i as f64 * 1000.0 / 60.0, (i + 1) as f32 * 0.001);
        }
        assert_eq!(aim.pending(), MAX_QUEUED_SAMPLES);

        assert_eq!(aim.release(5000.5, 5.0), 0.001);
        assert_eq!(aim.pending(), MAX_QUEUED_SAMPLES - 1);

        let newest = count as f32 * 0.001;
        assert_eq!(aim.release(1.0e9, 5.0), newest);
        assert_eq!(aim.pending(), 0);
    }

    #[test]
    fn test_rotation_ramps_then_snaps() {
        let mut aim = AimState::new(PI / 2.0, 2.0);
        let mut rotation = 0.0;
        aim.rotate(&mut rotation, 0.1, 2.0, 8.0, 20.0);
        assert!((aim.rotation_speed - 4.0).abs() < 1e-5);
        assert!((rotation - 0.4).abs() < 1e-5);

        for _ in 0..20 {
            aim.rotate(&mut rotation, 0.1, 2.0, 8.0, 20.0);
        }
        assert!((rotation - PI / 2.0).abs() < 1e-5);
        assert_eq!(aim.rotation_speed, 2.0);
    }

    #[test]
    fn test_rotation_takes_short_way_round() {
        let mut aim = AimState::new(-3.0, 1.0);
        let mut rotation = 3.0;
        aim.rotate(&mut rotation, 0.1, 1.0, 1.0, 0.0);
        assert!(rotation > 3.0 || rotation < -3.0);
    }
}
