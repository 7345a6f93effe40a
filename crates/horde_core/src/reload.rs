//! Reload state machine with the quick-reload minigame.
//!
//! ```text
//! Idle --start--> Reloading --progress >= 1--> Idle
//!                    |
//!                    +--fire in window--> Idle (magazine) / next shell
//!                    +--fire outside----> Reloading (magazine)
//!                                         QuickReloadLocked (shell)
//! ```
//!
//! Shell weapons load one shell per reload interval and roll a new sweet
//! spot for every shell. A failed press on a shell weapon locks further
//! attempts until the reload ends or the trigger cancels it.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::data::{QuickReloadStats, ReloadType};

/// Seconds the reload bar shakes after a missed press.
pub const FAIL_SHAKE_DURATION: f32 = 0.3;

/// Reload progress.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum ReloadPhase {
    /// Not reloading.
    #[default]
    Idle,
    /// Reloading; `total` is one full reload (or one shell).
    Reloading {
        /// Seconds into the current cycle.
        elapsed: f32,
        /// Cycle length.
        total: f32,
    },
}

/// Coarse state, as seen by the HUD and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadStatus {
    /// Not reloading.
    Idle,
    /// Reloading, quick reload already tried this cycle.
    Reloading,
    /// Reloading, quick reload still available.
    QuickReloadPending,
    /// Shell weapon after a missed press.
    QuickReloadLocked,
}

/// Sweet-spot window in reload progress units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct QuickReloadWindow {
    /// Inclusive start.
    pub start: f32,
    /// Inclusive end.
    pub end: f32,
}

impl QuickReloadWindow {
    /// Window of full width `difficulty` centred on `center`, clamped to `[0, 1]`.
    #[must_use]
    pub fn around(center: f32, difficulty: f32) -> Self {
        let half = difficulty.max(0.0) / 2.0;
        Self {
            start: (center - half).clamp(0.0, 1.0),
            end: (center + half).clamp(0.0, 1.0),
        }
    }

    /// Roll a fresh window from the weapon's tuning.
    pub fn roll<R: Rng + ?Sized>(qr: &QuickReloadStats, rng: &mut R) -> Self {
        let lo = qr.min_time_percent.min(qr.max_time_percent);
        let hi = qr.min_time_percent.max(qr.max_time_percent);
        let center = if hi > lo { rng.gen_range(lo..=hi) } else { lo };
        Self::around(center, qr.difficulty_percent)
    }

    /// Whether `progress` falls inside.
    #[must_use]
    pub fn contains(&self, progress: f32) -> bool {
        progress >= self.start && progress <= self.end
    }
}

/// Result of a quick-reload press that counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuickReloadOutcome {
    /// Press inside the window.
    Success,
    /// Press outside the window.
    Failure,
}

/// What a reload update did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadEvent {
    /// One shell went in; more to go.
    ShellLoaded,
    /// Reload finished.
    Completed,
}

/// Per-player reload state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReloadState {
    /// Progress.
    pub phase: ReloadPhase,
    /// Current sweet spot.
    pub window: QuickReloadWindow,
    /// A counted press already happened this cycle.
    pub attempted: bool,
    /// Shell weapon missed; attempts blocked.
    pub failed_lock: bool,
    /// Seconds of reload-bar shake left.
    pub fail_shake: f32,
    /// Seconds firing stays blocked after a success.
    pub success_cooldown: f32,
    /// Time of the last dry-fire click.
    pub last_dry_fire_ms: Option<f64>,
}

impl ReloadState {
    /// Whether a reload is running.
    #[must_use]
    pub fn is_reloading(&self) -> bool {
        matches!(self.phase, ReloadPhase::Reloading { .. })
    }

    /// Progress of the current cycle in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> Option<f32> {
        match self.phase {
            ReloadPhase::Idle => None,
            ReloadPhase::Reloading { elapsed, total } => {
                if total <= 0.0 {
                    Some(1.0)
                } else {
                    Some((elapsed / total).clamp(0.0, 1.0))
                }
            }
        }
    }

    /// Coarse state.
    #[must_use]
    pub fn status(&self) -> ReloadStatus {
        if !self.is_reloading() {
            ReloadStatus::Idle
        } else if self.failed_lock {
            ReloadStatus::QuickReloadLocked
        } else if self.attempted {
            ReloadStatus::Reloading
        } else {
            ReloadStatus::QuickReloadPending
        }
    }

    /// Whether a reload may begin.
    #[must_use]
    pub fn can_start(&self, ammo: u32, max_ammo: u32, dodging: bool) -> bool {
        !self.is_reloading() && !self.failed_lock && ammo < max_ammo && !dodging
    }

    /// Begin a reload cycle. `ability` divides the reload time.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        reload_time: f32,
        ability: f32,
        qr: &QuickReloadStats,
        rng: &mut R,
    ) {
        let total = if ability > 0.0 {
            reload_time.max(0.0) / ability
        } else {
            reload_time.max(0.0)
        };
        self.phase = ReloadPhase::Reloading {
            elapsed: 0.0,
            total,
        };
        self.window = QuickReloadWindow::roll(qr, rng);
        self.attempted = false;
        self.failed_lock = false;
    }

    /// Abort without loading anything more.
    pub fn cancel(&mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        self.phase = ReloadPhase::Idle;
        self.attempted = false;
        self.failed_lock = false;
    }

    fn next_shell<R: Rng + ?Sized>(&mut self, qr: &QuickReloadStats, rng: &mut R) {
        if let ReloadPhase::Reloading { elapsed, total } = &mut self.phase {
            *elapsed = (*elapsed - *total).max(0.0);
        }
        self.window = QuickReloadWindow::roll(qr, rng);
        self.attempted = false;
    }

    /// Advance timers and the reload by `dt`.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        ammo: &mut u32,
        max_ammo: u32,
        reload_type: ReloadType,
        qr: &QuickReloadStats,
        rng: &mut R,
    ) -> Option<ReloadEvent> {
        self.fail_shake = (self.fail_shake - dt).max(0.0);
        self.success_cooldown = (self.success_cooldown - dt).max(0.0);

        let ReloadPhase::Reloading { elapsed, total } = &mut self.phase else {
            return None;
        };
        *elapsed += dt;
        if *elapsed < *total {
            return None;
        }

        match reload_type {
            ReloadType::Magazine => {
                *ammo = max_ammo;
                self.finish();
                Some(ReloadEvent::Completed)
            }
            ReloadType::Shell => {
                *ammo = (*ammo + 1).min(max_ammo);
                if *ammo >= max_ammo {
                    self.finish();
                    Some(ReloadEvent::Completed)
                } else {
                    self.next_shell(qr, rng);
                    Some(ReloadEvent::ShellLoaded)
                }
            }
        }
    }

    /// Handle a trigger press during a reload.
    ///
    /// Returns `None` when the press does not count: not reloading, too
    /// early, already tried this cycle, or locked.
    pub fn attempt_quick_reload<R: Rng + ?Sized>(
        &mut self,
        ammo: &mut u32,
        max_ammo: u32,
        reload_type: ReloadType,
        qr: &QuickReloadStats,
        rng: &mut R,
    ) -> Option<QuickReloadOutcome> {
        let progress = self.progress()?;
        if self.failed_lock || self.attempted || progress < qr.min_progress {
            return None;
        }
        self.attempted = true;

        if self.window.contains(progress) {
            self.success_cooldown = qr.success_cooldown;
            match reload_type {
                ReloadType::Magazine => {
                    *ammo = max_ammo;
                    self.finish();
                }
                ReloadType::Shell => {
                    *ammo = (*ammo + qr.bonus_shells).min(max_ammo);
                    if *ammo >= max_ammo {
                        self.finish();
                    } else {
                        self.next_shell(qr, rng);
                        if let ReloadPhase::Reloading { elapsed, .. } = &mut self.phase {
                            *elapsed = 0.0;
                        }
                    }
                }
            }
            Some(QuickReloadOutcome::Success)
        } else {
            self.fail_shake = FAIL_SHAKE_DURATION;
            if reload_type == ReloadType::Shell {
                self.failed_lock = true;
            }
            Some(QuickReloadOutcome::Failure)
        }
    }

    /// Whether a recent success still blocks the trigger.
    #[must_use]
    pub fn blocks_firing(&self) -> bool {
        self.success_cooldown > 0.0
    }

    /// Rate-limit dry-fire clicks. Returns whether a click should play.
    pub fn try_dry_fire(&mut self, now_ms: f64, interval_ms: f32) -> bool {
        let ready = self
            .last_dry_fire_ms
            .map_or(true, |last| now_ms - last >= f64::from(interval_ms));
        if ready {
            self.last_dry_fire_ms = Some(now_ms);
        }
        ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    fn reloading_at(progress: f32, total: f32) -> ReloadState {
        ReloadState {
            phase: ReloadPhase::Reloading {
                elapsed: progress * total,
                total,
            },
            window: QuickReloadWindow::around(0.5, 0.1),
            ..ReloadState::default()
        }
    }

    #[test]
    fn test_window_clamped() {
        let w = QuickReloadWindow::around(0.98, 0.1);
        assert_eq!(w.end, 1.0);
        assert!((w.start - 0.93).abs() < 1e-5);
    }

    #[test]
    fn test_rolled_window_in_range() {
        let qr = QuickReloadStats::default();
        let mut r = rng();
        for _ in 0..100 {
            let w = QuickReloadWindow::roll(&qr, &mut r);
            let center = (w.start + w.end) / 2.0;
            assert!((0.4 - 1e-5..=0.7 + 1e-5).contains(&center));
        }
    }

    #[test]
    fn test_magazine_reload_completes() {
        let qr = QuickReloadStats::default();
        let mut r = rng();
        let mut state = ReloadState::default();
        let mut ammo = 2;
        assert!(state.can_start(ammo, 8, false));
        state.start(1.2, 1.0, &qr, &mut r);
        assert!(!state.can_start(ammo, 8, false));

        assert_eq!(state.update(1.0, &mut ammo, 8, ReloadType::Magazine, &qr, &mut r), None);
        assert_eq!(
            state.update(0.25, &mut ammo, 8, ReloadType::Magazine, &qr, &mut r),
            Some(ReloadEvent::Completed)
        );
        assert_eq!(ammo, 8);
        assert_eq!(state.status(), ReloadStatus::Idle);
    }

    #[test]
    fn test_cannot_start_full_or_dodging() {
        let state = ReloadState::default();
        assert!(!state.can_start(8, 8, false));
        assert!(!state.can_start(3, 8, true));
    }

    #[test]
    fn test_reload_ability_shortens_reload() {
        let qr = QuickReloadStats::default();
        let mut state = ReloadState::default();
        state.start(1.2, 2.0, &qr, &mut rng());
        assert_eq!(
            state.phase,
            ReloadPhase::Reloading {
                elapsed: 0.0,
                total: 0.6
            }
        );
    }

    #[test]
    fn test_quick_reload_success_on_magazine() {
        let qr = QuickReloadStats::default();
        let mut state = reloading_at(0.5, 1.2);
        let mut ammo = 0;
        let outcome =
            state.attempt_quick_reload(&mut ammo, 8, ReloadType::Magazine, &qr, &mut rng());
        assert_eq!(outcome, Some(QuickReloadOutcome::Success));
        assert_eq!(ammo, 8);
        assert!(!state.is_reloading());
        assert!(state.blocks_firing());
    }

    #[test]
    fn test_quick_reload_ignored_before_min_progress() {
        let qr = QuickReloadStats::default();
        let mut state = reloading_at(0.1, 1.2);
        let mut ammo = 0;
        let outcome =
            state.attempt_quick_reload(&mut ammo, 8, ReloadType::Magazine, &qr, &mut rng());
        assert_eq!(outcome, None);
        assert!(!state.attempted);
    }

    #[test]
    fn test_quick_reload_only_once_per_cycle() {
        let qr = QuickReloadStats::default();
        let mut state = reloading_at(0.3, 1.2);
        let mut ammo = 0;
        let mut r = rng();
        assert_eq!(
            state.attempt_quick_reload(&mut ammo, 8, ReloadType::Magazine, &qr, &mut r),
            Some(QuickReloadOutcome::Failure)
        );
        state.phase = ReloadPhase::Reloading {
            elapsed: 0.6,
            total: 1.2,
        };
        assert_eq!(
            state.attempt_quick_reload(&mut ammo, 8, ReloadType::Magazine, &qr, &mut r),
            None
        );
        assert_eq!(ammo, 0);
        assert_eq!(state.status(), ReloadStatus::Reloading);
    }

    #[test]
    fn test_shell_failure_locks() {
        let qr = QuickReloadStats::default();
        let mut state = reloading_at(0.9, 0.5);
        let mut ammo = 2;
        let outcome = state.attempt_quick_reload(&mut ammo, 6, ReloadType::Shell, &qr, &mut rng());
        assert_eq!(outcome, Some(QuickReloadOutcome::Failure));
        assert_eq!(state.status(), ReloadStatus::QuickReloadLocked);
        assert!(state.fail_shake > 0.0);
        assert_eq!(ammo, 2);
    }

    #[test]
    fn test_shell_success_adds_bonus_and_continues() {
        let qr = QuickReloadStats::default();
        let mut state = reloading_at(0.5, 0.5);
        let mut ammo = 1;
        let outcome = state.attempt_quick_reload(&mut ammo, 6, ReloadType::Shell, &qr, &mut rng());
        assert_eq!(outcome, Some(QuickReloadOutcome::Success));
        assert_eq!(ammo, 3);
        assert_eq!(state.status(), ReloadStatus::QuickReloadPending);
        assert_eq!(state.progress(), Some(0.0));
    }

    #[test]
    fn test_shell_bonus_capped() {
        let qr = QuickReloadStats::default();
        let mut state = reloading_at(0.5, 0.5);
        let mut ammo = 5;
        state.attempt_quick_reload(&mut ammo, 6, ReloadType::Shell, &qr, &mut rng());
        assert_eq!(ammo, 6);
        assert!(!state.is_reloading());
    }

    #[test]
    fn test_shells_load_one_per_interval() {
        let qr = QuickReloadStats::default();
        let mut r = rng();
        let mut state = ReloadState::default();
        let mut ammo = 4;
        state.start(0.5, 1.0, &qr, &mut r);
        assert_eq!(
            state.update(0.5, &mut ammo, 6, ReloadType::Shell, &qr, &mut r),
            Some(ReloadEvent::ShellLoaded)
        );
        assert_eq!(ammo, 5);
        assert!(state.is_reloading());
        assert_eq!(
            state.update(0.5, &mut ammo, 6, ReloadType::Shell, &qr, &mut r),
            Some(ReloadEvent::Completed)
        );
        assert_eq!(ammo, 6);
    }

    #[test]
    fn test_dry_fire_rate_limited() {
        let mut state = ReloadState::default();
        assert!(state.try_dry_fire(0.0, 200.0));
        assert!(!state.try_dry_fire(150.0, 200.0));
        assert!(state.try_dry_fire(200.0, 200.0));
    }
}
