//! # Horde Core
//!
//! Deterministic simulation core for a top-down zombie survival shooter.
//!
//! This crate contains **only** game logic:
//! - No rendering backend (the renderer emits a backend-agnostic draw list)
//! - No IO
//! - No system randomness (a seeded ChaCha RNG lives in the world)
//!
//! This separation enables:
//! - Headless runs and bot batches
//! - Replays and determinism testing
//! - Unit tests that call `tick` with synthetic deltas
//!
//! ## Crate Structure
//!
//! - [`data`] - Static weapon, zombie, item and upgrade tables
//! - [`stats`] - Effective weapon stats from base + level + upgrades
//! - [`components`] - Entity records
//! - [`world`] - Entity stores, camera and the per-frame context
//! - [`input`] - Raw input to per-frame intent
//! - [`aim`], [`reload`], [`shooting`] - Player weapon handling
//! - [`combat`], [`rewards`] - Hits, contact damage, kills, leveling, pickups
//! - [`spawner`] - Wave-scaled zombie spawning
//! - [`physics`] - Integration of every moving thing
//! - [`grenade`] - Throw, flight, fuse and blast
//! - [`render`] - Draw-list builder
//! - [`simulation`] - Core simulation loop
//! - [`host`] - Frame glue for platform shells: audio, hooks, drawing
//! - [`replay`] - Record and re-run games

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod aim;
pub mod combat;
pub mod components;
pub mod config;
pub mod data;
pub mod effects;
pub mod error;
pub mod events;
pub mod grenade;
pub mod host;
pub mod input;
pub mod math;
pub mod physics;
pub mod reload;
pub mod render;
pub mod replay;
pub mod rewards;
pub mod shooting;
pub mod simulation;
pub mod spawner;
pub mod stats;
pub mod world;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::components::*;
    pub use crate::config::SimulationConfig;
    pub use crate::data::{
        FireMode, GameData, ItemKind, ReloadType, UpgradeLevels, WeaponId, WeaponPart, ZombieKind,
    };
    pub use crate::error::{GameError, Result};
    pub use crate::events::{GameOverInfo, KillSource, SoundId, StatsSnapshot, TickEvents};
    pub use crate::host::{AudioSink, GameHooks, GameHost, NoHooks, NullAudio};
    pub use crate::input::{FrameInput, InputBindings, InputSampler, Key};
    pub use crate::math::Vec2;
    pub use crate::reload::{QuickReloadOutcome, ReloadStatus};
    pub use crate::render::{draw_frame, DrawCommand, Frame, Viewport};
    pub use crate::replay::{Replay, ReplayAction};
    pub use crate::simulation::Simulation;
    pub use crate::stats::EffectiveStats;
    pub use crate::world::{GamePhase, World};
}
