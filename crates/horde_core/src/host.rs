//! The frame loop glue between a platform shell and the simulation.
//!
//! A [`GameHost`] owns the [`InputSampler`], the [`Simulation`] and two
//! collaborators: an [`AudioSink`] that plays sound cues and a set of
//! [`GameHooks`] that mirror the presentation callbacks. The platform
//! forwards raw input events to [`GameHost::input_mut`] and calls
//! [`GameHost::frame`] once per animation frame.

use crate::data::{WeaponId, WeaponPart};
use crate::error::Result;
use crate::events::{GameOverInfo, ShotEvent, SoundId, StatsSnapshot, TickEvents};
use crate::input::{InputBindings, InputSampler};
use crate::render::{draw_frame, Frame, Viewport};
use crate::replay::{Replay, ReplayAction};
use crate::simulation::Simulation;

/// Fire-and-forget sound output.
pub trait AudioSink {
    /// Called once before the first frame.
    ///
    /// # Errors
    /// A failed start leaves the game running without sound.
    fn init(&mut self) -> Result<()>;

    /// Play one cue.
    fn play(&mut self, sound: SoundId);
}

/// Audio that goes nowhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    fn play(&mut self, _sound: SoundId) {}
}

/// Presentation callbacks. All methods default to doing nothing.
pub trait GameHooks {
    /// HUD numbers, once per frame including paused ones.
    fn on_stats(&mut self, _stats: &StatsSnapshot) {}

    /// The player died. Called exactly once per run.
    fn on_game_over(&mut self, _info: &GameOverInfo) {}

    /// A shot left the barrel.
    fn on_shoot(&mut self, _shot: &ShotEvent) {}

    /// The trigger clicked on an empty magazine.
    fn on_dry_fire(&mut self) {}
}

/// Hooks that ignore everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl GameHooks for NoHooks {}

/// Drives a [`Simulation`] from platform input and feeds its outputs to
/// audio, hooks and the renderer.
#[derive(Debug)]
pub struct GameHost<A: AudioSink, H: GameHooks> {
    simulation: Simulation,
    input: InputSampler,
    audio: A,
    audio_ready: bool,
    hooks: H,
    game_over_sent: bool,
    recording: Option<Replay>,
    last_events: TickEvents,
}

impl<A: AudioSink, H: GameHooks> GameHost<A, H> {
    /// Wrap a simulation. Starts the audio sink.
    pub fn new(simulation: Simulation, bindings: InputBindings, mut audio: A, hooks: H) -> Self {
        let audio_ready = match audio.init() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "audio init failed, continuing without sound");
                false
            }
        };
        Self {
            simulation,
            input: InputSampler::new(bindings),
            audio,
            audio_ready,
            hooks,
            game_over_sent: false,
            recording: None,
            last_events: TickEvents::default(),
        }
    }

    /// Raw input entry point for the platform.
    pub fn input_mut(&mut self) -> &mut InputSampler {
        &mut self.input
    }

    /// The simulation.
    #[must_use]
    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    /// Audio sink.
    #[must_use]
    pub fn audio(&self) -> &A {
        &self.audio
    }

    /// Hooks.
    #[must_use]
    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    /// Events of the most recent frame.
    #[must_use]
    pub fn last_events(&self) -> &TickEvents {
        &self.last_events
    }

    /// Run one frame: sample input, tick, dispatch outputs, draw.
    ///
    /// Paused frames still draw.
    pub fn frame(&mut self, dt: f32, viewport: Viewport) -> Frame {
        let size = viewport.size();
        if self.simulation.world().camera.viewport != size {
            self.simulation.set_viewport(size);
            self.record(ReplayAction::Viewport(size));
        }

        let input = self.input.sample();
        let events = self.simulation.tick(dt, &input);
        self.record(ReplayAction::Tick { dt, input });
        self.dispatch(&events);
        self.last_events = events;

        draw_frame(&self.simulation, viewport)
    }

    fn dispatch(&mut self, events: &TickEvents) {
        if self.audio_ready {
            for &sound in &events.sounds {
                self.audio.play(sound);
            }
        }
        for shot in &events.shots {
            self.hooks.on_shoot(shot);
        }
        for _ in 0..events.dry_fires {
            self.hooks.on_dry_fire();
        }
        if let Some(stats) = &events.stats {
            self.hooks.on_stats(stats);
        }
        if let Some(info) = &events.game_over {
            if !self.game_over_sent {
                self.game_over_sent = true;
                self.hooks.on_game_over(info);
            }
        }
    }

    /// Spend a level-up choice.
    pub fn apply_upgrade(&mut self, part: WeaponPart) -> Option<u32> {
        let level = self.simulation.apply_upgrade(part)?;
        self.record(ReplayAction::Upgrade(part));
        Some(level)
    }

    /// Leave the level-up pause without choosing.
    pub fn skip_upgrade(&mut self) {
        self.simulation.skip_upgrade();
        self.record(ReplayAction::SkipUpgrade);
    }

    /// Equip a weapon.
    pub fn switch_weapon(&mut self, weapon: WeaponId) {
        self.simulation.switch_weapon(weapon);
        self.record(ReplayAction::SwitchWeapon(weapon));
    }

    /// Fresh run on the next seed. Any recording is discarded.
    pub fn restart(&mut self) {
        self.simulation.reset();
        self.input.release_all();
        self.game_over_sent = false;
        self.last_events = TickEvents::default();
        if self.recording.take().is_some() {
            tracing::debug!("recording dropped on restart");
        }
    }

    /// Start recording from the current state. Only valid at tick zero.
    pub fn start_recording(&mut self) -> bool {
        if self.simulation.tick_count() != 0 {
            tracing::warn!(
                tick = self.simulation.tick_count(),
                "recording must start before the first tick"
            );
            return false;
        }
        let mut replay = Replay::new(self.simulation.seed(), self.simulation.config().clone());
        let size = self.simulation.world().camera.viewport;
        replay.record(ReplayAction::Viewport(size));
        self.recording = Some(replay);
        true
    }

    /// Stop recording and take the finished replay.
    pub fn take_replay(&mut self) -> Option<Replay> {
        let mut replay = self.recording.take()?;
        replay.finalize(&self.simulation);
        Some(replay)
    }

    fn record(&mut self, action: ReplayAction) {
        if let Some(replay) = &mut self.recording {
            replay.record(action);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::GameData;
    use crate::error::GameError;
    use crate::input::Key;
    use crate::math::Vec2;

    const DT: f32 = 1.0 / 60.0;

    #[derive(Debug, Default)]
    struct CountingAudio {
        inits: u32,
        played: Vec<SoundId>,
        fail: bool,
    }

    impl AudioSink for CountingAudio {
        fn init(&mut self) -> Result<()> {
            self.inits += 1;
            if self.fail {
                return Err(GameError::AudioUnavailable("no device".into()));
            }
            Ok(())
        }

        fn play(&mut self, sound: SoundId) {
            self.played.push(sound);
        }
    }

    #[derive(Debug, Default)]
    struct Recorder {
        stats: u32,
        game_overs: u32,
        shots: u32,
        dry_fires: u32,
    }

    impl GameHooks for Recorder {
        fn on_stats(&mut self, _stats: &StatsSnapshot) {
            self.stats += 1;
        }
        fn on_game_over(&mut self, _info: &GameOverInfo) {
            self.game_overs += 1;
        }
        fn on_shoot(&mut self, _shot: &ShotEvent) {
            self.shots += 1;
        }
        fn on_dry_fire(&mut self) {
            self.dry_fires += 1;
        }
    }

    fn host(audio: CountingAudio) -> GameHost<CountingAudio, Recorder> {
        GameHost::new(
            Simulation::with_defaults(9),
            InputBindings::default(),
            audio,
            Recorder::default(),
        )
    }

    #[test]
    fn test_audio_init_once() {
        let mut host = host(CountingAudio::default());
        for _ in 0..5 {
            host.frame(DT, Viewport::default());
        }
        assert_eq!(host.audio().inits, 1);
        assert_eq!(host.hooks().stats, 5);
    }

    #[test]
    fn test_click_fires_and_plays_shot() {
        let mut host = host(CountingAudio::default());
        host.input_mut().pointer_moved(Vec2::new(900.0, 360.0));
        host.input_mut().pointer_down();
        host.frame(DT, Viewport::default());
        assert_eq!(host.hooks().shots, 1);
        assert!(host
            .audio()
            .played
            .iter()
            .any(|s| matches!(s, SoundId::Shot(_))));
    }

    #[test]
    fn test_failed_audio_is_silent() {
        let mut host = host(CountingAudio {
            fail: true,
            ..CountingAudio::default()
        });
        host.input_mut().pointer_down();
        host.frame(DT, Viewport::default());
        assert!(host.audio().played.is_empty());
        assert_eq!(host.hooks().shots, 1);
    }

    #[test]
    fn test_game_over_hook_fires_once() {
        let mut host = host(CountingAudio::default());
        host.simulation.world_mut().player.health = 0.0;
        for _ in 0..10 {
            host.frame(DT, Viewport::default());
        }
        assert_eq!(host.hooks().game_overs, 1);
    }

    #[test]
    fn test_paused_frame_still_draws() {
        let mut host = host(CountingAudio::default());
        host.input_mut().key_down(Key::Escape);
        host.frame(DT, Viewport::default());
        assert!(!host.simulation().world().is_playing());
        let frame = host.frame(DT, Viewport::default());
        assert!(!frame.commands.is_empty());
        assert!(!host.simulation().world().is_playing());
        assert_eq!(host.hooks().stats, 2);
    }

    #[test]
    fn test_recorded_session_verifies() {
        let mut host = host(CountingAudio::default());
        assert!(host.start_recording());
        host.input_mut().key_down(Key::D);
        for i in 0..120 {
            if i % 10 == 0 {
                host.input_mut().pointer_down();
            } else {
                host.input_mut().pointer_up();
            }
            host.frame(DT, Viewport::new(800.0, 600.0));
        }
        host.switch_weapon(WeaponId::Shotgun);
        for _ in 0..30 {
            host.frame(DT, Viewport::new(800.0, 600.0));
        }
        let replay = host.take_replay().expect("recording");
        replay.verify(&GameData::default()).expect("replay matches");
    }
}
