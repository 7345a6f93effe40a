//! Headless game runner for bot playtesting and CI verification.
//!
//! This crate runs the simulation without a window or audio. It enables:
//!
//! - **Scripted control**: a controller process plays through JSON lines
//! - **Balance runs**: many bot games in parallel with aggregated metrics
//! - **Determinism checks**: same seed, same hash; recorded replays verify
//!
//! # Protocol
//!
//! Communication uses JSON lines (one JSON object per line):
//!
//! - **stdin**: Commands from the controller (tick, query, upgrade, etc.)
//! - **stdout**: State updates and responses (JSON)
//! - **stderr**: Logs (human-readable)
//!
//! See the [`protocol`] module for the full command/response format.
//!
//! # Example
//!
//! ```bash
//! # Run interactively
//! echo '{"cmd":"tick","count":60}' | cargo run -p horde_headless
//!
//! # Balance batch
//! cargo run -p horde_headless -- batch --count 200 --strategy turret
//!
//! # Verify determinism
//! cargo run -p horde_headless -- verify --seed 42 --runs 5
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod ascii_visualizer;
pub mod batch;
pub mod data_loader;
pub mod game_runner;
pub mod metrics;
pub mod protocol;
pub mod runner;
pub mod strategies;

pub use ascii_visualizer::{rasterize, render_ascii, AsciiConfig};
pub use batch::{run_batch, BatchConfig, BatchResults};
pub use data_loader::{default_data_dir, load_data_dir, load_or_builtin, DataSet};
pub use game_runner::{run_game, GameConfig, GameResult};
pub use metrics::{BatchSummary, GameMetrics};
pub use protocol::{Command, Response};
pub use runner::{HeadlessConfig, HeadlessRunner};
pub use strategies::Strategy;
