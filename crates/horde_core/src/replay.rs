//! Replays: a seed plus every host action, enough to re-run a game exactly.
//!
//! Replays stay in memory as bincode bytes. Playback builds a fresh
//! [`Simulation`] from the recorded seed and configuration and re-applies
//! each action in order.

use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::data::{GameData, WeaponId, WeaponPart};
use crate::error::{GameError, Result};
use crate::input::FrameInput;
use crate::math::Vec2;
use crate::simulation::Simulation;

/// Replay format version.
pub const REPLAY_VERSION: u32 = 1;

/// One thing the host did to the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReplayAction {
    /// A call to [`Simulation::tick`].
    Tick {
        /// Raw frame delta.
        dt: f32,
        /// Sampled input.
        input: FrameInput,
    },
    /// [`Simulation::apply_upgrade`].
    Upgrade(WeaponPart),
    /// [`Simulation::skip_upgrade`].
    SkipUpgrade,
    /// [`Simulation::switch_weapon`].
    SwitchWeapon(WeaponId),
    /// [`Simulation::set_viewport`].
    Viewport(Vec2),
}

/// A recorded game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Replay {
    /// Format version.
    pub version: u32,
    /// Seed the game started from.
    pub seed: u64,
    /// Configuration in effect.
    pub config: SimulationConfig,
    /// Host actions in order.
    pub actions: Vec<ReplayAction>,
    /// Tick count at the end.
    pub final_tick: u64,
    /// State hash at the end.
    pub final_hash: u64,
}

impl Replay {
    /// Start recording a game that begins from `seed`.
    #[must_use]
    pub fn new(seed: u64, config: SimulationConfig) -> Self {
        Self {
            version: REPLAY_VERSION,
            seed,
            config,
            actions: Vec::new(),
            final_tick: 0,
            final_hash: 0,
        }
    }

    /// Record an action.
    pub fn record(&mut self, action: ReplayAction) {
        self.actions.push(action);
    }

    /// Record a tick.
    pub fn record_tick(&mut self, dt: f32, input: FrameInput) {
        self.record(ReplayAction::Tick { dt, input });
    }

    /// Store the end state of the recorded simulation.
    pub fn finalize(&mut self, sim: &Simulation) {
        self.final_tick = sim.tick_count();
        self.final_hash = sim.state_hash();
    }

    /// Number of recorded ticks.
    #[must_use]
    pub fn tick_count(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| matches!(a, ReplayAction::Tick { .. }))
            .count()
    }

    /// Encode to bytes.
    ///
    /// # Errors
    /// Returns an error if encoding fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| GameError::ReplaySerialization(e.to_string()))
    }

    /// Decode from bytes.
    ///
    /// # Errors
    /// Returns an error for malformed bytes or a version mismatch.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let replay: Self = bincode::deserialize(bytes)
            .map_err(|e| GameError::ReplaySerialization(e.to_string()))?;
        if replay.version != REPLAY_VERSION {
            return Err(GameError::ReplaySerialization(format!(
                "replay version mismatch: expected {REPLAY_VERSION}, got {}",
                replay.version
            )));
        }
        Ok(replay)
    }

    /// Re-run the whole game.
    #[must_use]
    pub fn play(&self, data: &GameData) -> Simulation {
        let mut player = ReplayPlayer::new(self.clone(), data.clone());
        while player.advance() {}
        player.into_simulation()
    }

    /// Re-run and compare the end state with the recording.
    ///
    /// # Errors
    /// Returns [`GameError::ReplayDesync`] if the final hash differs.
    pub fn verify(&self, data: &GameData) -> Result<()> {
        let sim = self.play(data);
        let replayed = sim.state_hash();
        if replayed != self.final_hash || sim.tick_count() != self.final_tick {
            tracing::warn!(
                recorded = self.final_hash,
                replayed,
                tick = sim.tick_count(),
                "replay desync"
            );
            return Err(GameError::ReplayDesync {
                tick: sim.tick_count(),
                recorded: self.final_hash,
                replayed,
            });
        }
        Ok(())
    }
}

/// Step-by-step playback.
#[derive(Debug)]
pub struct ReplayPlayer {
    replay: Replay,
    simulation: Simulation,
    cursor: usize,
}

impl ReplayPlayer {
    /// Playback from the start.
    #[must_use]
    pub fn new(replay: Replay, data: GameData) -> Self {
        let simulation = Simulation::new(replay.config.clone(), data, replay.seed);
        Self {
            replay,
            simulation,
            cursor: 0,
        }
    }

    /// Apply actions up to and including the next tick. Returns whether
    /// anything is left.
    pub fn advance(&mut self) -> bool {
        while let Some(action) = self.replay.actions.get(self.cursor) {
            self.cursor += 1;
            match action {
                ReplayAction::Tick { dt, input } => {
                    self.simulation.tick(*dt, input);
                    break;
                }
                ReplayAction::Upgrade(part) => {
                    self.simulation.apply_upgrade(*part);
                }
                ReplayAction::SkipUpgrade => self.simulation.skip_upgrade(),
                ReplayAction::SwitchWeapon(id) => self.simulation.switch_weapon(*id),
                ReplayAction::Viewport(size) => self.simulation.set_viewport(*size),
            }
        }
        self.cursor < self.replay.actions.len()
    }

    /// Current simulation.
    #[must_use]
    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    /// Finish playback and take the simulation.
    #[must_use]
    pub fn into_simulation(self) -> Simulation {
        self.simulation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(seed: u64, ticks: usize) -> Replay {
        let config = SimulationConfig::default();
        let mut sim = Simulation::new(config.clone(), GameData::default(), seed);
        let mut replay = Replay::new(seed, config);
        for i in 0..ticks {
            let input = FrameInput {
                move_axis: if i % 40 < 20 { Vec2::X } else { -Vec2::Y },
                aim_screen: Vec2::new(200.0 + i as f32, 300.0),
                fire_pressed: i % 7 == 0,
                fire_held: i % 7 < 3,
                reload_pressed: i % 50 == 25,
                ..FrameInput::default()
            };
            sim.tick(1.0 / 60.0, &input);
            replay.record_tick(1.0 / 60.0, input);
            if i == 30 {
                sim.switch_weapon(WeaponId::Smg);
                replay.record(ReplayAction::SwitchWeapon(WeaponId::Smg));
            }
        }
        replay.finalize(&sim);
        replay
    }

    #[test]
    fn test_replay_verifies() {
        let replay = record(3, 240);
        replay.verify(&GameData::default()).expect("replay matches");
        assert_eq!(replay.tick_count(), 240);
    }

    #[test]
    fn test_replay_bytes_roundtrip() {
        let replay = record(5, 30);
        let bytes = replay.to_bytes().expect("encode");
        let decoded = Replay::from_bytes(&bytes).expect("decode");
        assert_eq!(decoded, replay);
    }

    #[test]
    fn test_tampered_replay_desyncs() {
        let mut replay = record(3, 120);
        replay.seed += 1;
        match replay.verify(&GameData::default()) {
            Err(GameError::ReplayDesync { .. }) => {}
            other => panic!("expected desync, got {other:?}"),
        }
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let mut replay = record(1, 1);
        replay.version = 99;
        let bytes = replay.to_bytes().expect("encode");
        assert!(Replay::from_bytes(&bytes).is_err());
    }
}
