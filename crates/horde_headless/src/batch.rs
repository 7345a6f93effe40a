//! Batch game runner for balance testing.
//!
//! Runs many bot games in parallel using rayon and aggregates their
//! metrics.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use horde_core::data::WeaponId;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::data_loader::DataSet;
use crate::game_runner::{run_game, GameConfig};
use crate::metrics::{BatchSummary, GameMetrics};
use crate::strategies::Strategy;

/// Configuration for a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of games to run.
    pub game_count: u32,
    /// Maximum parallel games (0 = use rayon default).
    pub parallel_games: u32,
    /// Output directory for results.
    pub output_dir: PathBuf,
    /// Starting seed; game `i` uses `seed_start + i`.
    pub seed_start: u64,
    /// Maximum ticks per game.
    pub max_ticks: u64,
    /// Bot strategy preset name.
    pub strategy: String,
    /// Starting weapon key.
    pub weapon: String,
    /// Record every game and check that its replay reproduces it.
    pub verify_replays: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            game_count: 100,
            parallel_games: 0,
            output_dir: PathBuf::from("results"),
            seed_start: 0,
            max_ticks: 36_000,
            strategy: "default".to_string(),
            weapon: "PISTOL".to_string(),
            verify_replays: false,
        }
    }
}

impl BatchConfig {
    /// Config for `game_count` games.
    #[must_use]
    pub fn new(game_count: u32) -> Self {
        Self {
            game_count,
            ..Default::default()
        }
    }

    /// Set output directory.
    #[must_use]
    pub fn with_output(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    /// Set seed start.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Set the bot.
    #[must_use]
    pub fn with_strategy(mut self, name: &str) -> Self {
        self.strategy = name.to_string();
        self
    }
}

/// Results from a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used.
    pub config: BatchConfig,
    /// Individual game metrics.
    pub games: Vec<GameMetrics>,
    /// Aggregate summary.
    pub summary: BatchSummary,
    /// Total runtime.
    pub duration_seconds: f64,
    /// Errors encountered.
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to a JSON file.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from a JSON file.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// A game that did not produce usable metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchError {
    /// Game index.
    pub game_index: u32,
    /// Seed used.
    pub seed: u64,
    /// Error message.
    pub message: String,
}

/// Progress tracking for batch runs.
#[derive(Debug)]
pub struct BatchProgress {
    /// Total games.
    pub total: u32,
    completed: AtomicU32,
    best_score: AtomicU64,
    start_time: Instant,
}

impl BatchProgress {
    /// New tracker for `total` games.
    #[must_use]
    pub fn new(total: u32) -> Self {
        Self {
            total,
            completed: AtomicU32::new(0),
            best_score: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a finished game.
    pub fn record_completion(&self, score: u64) {
        self.completed.fetch_add(1, Ordering::Relaxed);
        self.best_score.fetch_max(score, Ordering::Relaxed);
    }

    /// Games finished so far.
    #[must_use]
    pub fn current(&self) -> u32 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Best score so far.
    #[must_use]
    pub fn best_score(&self) -> u64 {
        self.best_score.load(Ordering::Relaxed)
    }

    /// Completion percentage.
    #[must_use]
    pub fn percentage(&self) -> f64 {
        f64::from(self.current()) / f64::from(self.total.max(1)) * 100.0
    }

    /// Estimated time remaining.
    #[must_use]
    pub fn eta(&self) -> Duration {
        let completed = self.current();
        if completed == 0 {
            return Duration::ZERO;
        }
        let per_game = self.start_time.elapsed().as_secs_f64() / f64::from(completed);
        let remaining = self.total.saturating_sub(completed);
        Duration::from_secs_f64(per_game * f64::from(remaining))
    }

    /// Print a progress line to stderr.
    pub fn display(&self) {
        let eta = self.eta();
        eprintln!(
            "batch {:>4}/{:<4} ({:>5.1}%) eta {}m {}s best score {}",
            self.current(),
            self.total,
            self.percentage(),
            eta.as_secs() / 60,
            eta.as_secs() % 60,
            self.best_score()
        );
    }
}

fn run_single_game(
    index: u32,
    config: &BatchConfig,
    strategy: &Strategy,
    weapon: WeaponId,
    dataset: &DataSet,
) -> Result<GameMetrics, String> {
    let seed = config.seed_start.wrapping_add(u64::from(index));
    let game = GameConfig {
        seed,
        max_ticks: config.max_ticks,
        strategy: strategy.clone(),
        weapon,
        record: config.verify_replays,
        game_id: format!("game_{index:04}_{seed}"),
    };
    let result = run_game(&game, &dataset.config, &dataset.data);
    if let Some(replay) = &result.replay {
        replay
            .verify(&dataset.data)
            .map_err(|e| format!("replay check failed: {e}"))?;
    }
    Ok(result.metrics)
}

/// Run a batch of games.
pub fn run_batch(config: BatchConfig, dataset: &DataSet) -> BatchResults {
    let start = Instant::now();
    let progress = BatchProgress::new(config.game_count);
    let strategy = Strategy::from_name(&config.strategy);
    let weapon = dataset.data.weapons.resolve(&config.weapon);

    info!(
        games = config.game_count,
        strategy = %strategy.name,
        %weapon,
        "starting batch run"
    );

    if config.parallel_games > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel_games as usize)
            .build_global()
            .ok(); // Ignore if already set
    }

    let results: Vec<Result<GameMetrics, BatchError>> = (0..config.game_count)
        .into_par_iter()
        .map(|i| match run_single_game(i, &config, &strategy, weapon, dataset) {
            Ok(metrics) => {
                progress.record_completion(metrics.score);
                let completed = progress.current();
                if completed % 10 == 0 {
                    debug!(completed, total = config.game_count, "batch progress");
                }
                if completed % 100 == 0 {
                    progress.display();
                }
                Ok(metrics)
            }
            Err(message) => {
                warn!(game = i, %message, "game failed");
                Err(BatchError {
                    game_index: i,
                    seed: config.seed_start.wrapping_add(u64::from(i)),
                    message,
                })
            }
        })
        .collect();

    let (games, errors): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    let games: Vec<GameMetrics> = games.into_iter().filter_map(Result::ok).collect();
    let errors: Vec<BatchError> = errors.into_iter().filter_map(Result::err).collect();

    let summary = BatchSummary::from_games(&games);
    let duration_seconds = start.elapsed().as_secs_f64();
    info!(
        games = games.len(),
        errors = errors.len(),
        seconds = duration_seconds,
        mean_score = summary.mean_score,
        "batch complete"
    );

    BatchResults {
        config,
        games,
        summary,
        duration_seconds,
        errors,
    }
}
