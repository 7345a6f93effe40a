//! Headless zombie survival runner.
//!
//! Runs the game without graphics, controlled via JSON on stdin/stdout,
//! or plays bot games for balance and determinism checks.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode - read commands from stdin
//! cargo run -p horde_headless
//!
//! # Batch balance test
//! cargo run -p horde_headless -- batch --count 1000 --output results/
//!
//! # Same seed several times, then replay it
//! cargo run -p horde_headless -- verify --seed 12345 --runs 5
//!
//! # Watch a bot play in the terminal
//! cargo run -p horde_headless -- watch --seed 3 --every 120
//! ```
//!
//! Logs go to stderr so stdout stays clean for the protocol.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use horde_core::simulation::Simulation;
use horde_headless::{
    ascii_visualizer::{render_ascii, AsciiConfig},
    batch::{run_batch, BatchConfig},
    data_loader::{load_or_builtin, DataSet},
    game_runner::{run_game, GameConfig, BOT_DT},
    runner::{HeadlessConfig, HeadlessRunner},
    strategies::Strategy,
};

const TICKS_PER_MINUTE: u64 = 60 * 60;

#[derive(Parser)]
#[command(name = "horde")]
#[command(about = "Headless zombie survival runner for bots and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Data directory with the RON tables (default: HORDE_DATA_DIR or assets/data)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single interactive game over stdin/stdout
    Run {
        /// Random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Starting weapon
        #[arg(short, long)]
        weapon: Option<String>,

        /// Output state after every tick command
        #[arg(long)]
        auto_state: bool,
    },

    /// Run a batch of bot games for balance testing
    Batch {
        /// Number of games to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Maximum parallel games (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Starting random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Bot strategy preset
        #[arg(short, long, default_value = "default")]
        strategy: String,

        /// Starting weapon
        #[arg(short, long, default_value = "PISTOL")]
        weapon: String,

        /// Maximum game duration in minutes of game time
        #[arg(long, default_value = "10")]
        duration_minutes: u32,

        /// Quick mode: 2-minute games
        #[arg(long, conflicts_with = "duration_minutes")]
        quick: bool,

        /// Record each game and check its replay
        #[arg(long)]
        verify_replays: bool,
    },

    /// Verify determinism by running the same seed multiple times
    Verify {
        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,

        /// Ticks per run
        #[arg(short, long, default_value = "7200")]
        ticks: u64,

        /// Bot strategy preset
        #[arg(short, long, default_value = "default")]
        strategy: String,
    },

    /// Watch a bot game as ASCII frames
    Watch {
        /// Random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Bot strategy preset
        #[arg(short, long, default_value = "default")]
        strategy: String,

        /// Starting weapon
        #[arg(short, long, default_value = "PISTOL")]
        weapon: String,

        /// Stop after this many ticks
        #[arg(short, long, default_value = "3600")]
        ticks: u64,

        /// Print a frame every N ticks
        #[arg(long, default_value = "60")]
        every: u64,

        /// Width of ASCII output
        #[arg(long, default_value = "80")]
        width: usize,

        /// Height of ASCII output
        #[arg(long, default_value = "24")]
        height: usize,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for protocol)
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    let dataset = match load_or_builtin(cli.data.as_deref()) {
        Ok(dataset) => dataset,
        Err(e) => {
            tracing::error!(error = %e, "failed to load game data");
            eprintln!("FATAL: {e}");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Some(Commands::Run {
            seed,
            weapon,
            auto_state,
        }) => cmd_run(dataset, seed, weapon, auto_state),
        Some(Commands::Batch {
            count,
            parallel,
            output,
            seed,
            strategy,
            weapon,
            duration_minutes,
            quick,
            verify_replays,
        }) => {
            let max_ticks = if quick {
                2 * TICKS_PER_MINUTE
            } else {
                u64::from(duration_minutes) * TICKS_PER_MINUTE
            };
            let config = BatchConfig {
                game_count: count,
                parallel_games: parallel,
                output_dir: output,
                seed_start: seed,
                max_ticks,
                strategy,
                weapon,
                verify_replays,
            };
            cmd_batch(config, &dataset)
        }
        Some(Commands::Verify {
            seed,
            runs,
            ticks,
            strategy,
        }) => cmd_verify(&dataset, seed, runs, ticks, &strategy),
        Some(Commands::Watch {
            seed,
            strategy,
            weapon,
            ticks,
            every,
            width,
            height,
        }) => {
            let config = AsciiConfig {
                width,
                height,
                ..AsciiConfig::default()
            };
            cmd_watch(dataset, seed, &strategy, &weapon, ticks, every.max(1), &config)
        }
        None => cmd_run(dataset, 0, None, false),
    }
}

/// Run a single interactive game
fn cmd_run(dataset: DataSet, seed: u64, weapon: Option<String>, auto_state: bool) -> ExitCode {
    tracing::info!(seed, "starting interactive session");
    let config = HeadlessConfig {
        seed,
        auto_state_output: auto_state,
        weapon,
        ..HeadlessConfig::default()
    };
    let mut runner = HeadlessRunner::new(config, dataset);
    let stdin = io::stdin();
    match runner.run(stdin.lock(), io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "session failed");
            ExitCode::FAILURE
        }
    }
}

/// Run batch of games for balance testing
fn cmd_batch(config: BatchConfig, dataset: &DataSet) -> ExitCode {
    let output = config.output_dir.clone();
    if let Err(e) = std::fs::create_dir_all(&output) {
        tracing::error!(error = %e, path = %output.display(), "failed to create output directory");
        eprintln!("FATAL: Cannot create output directory '{}': {e}", output.display());
        return ExitCode::FAILURE;
    }

    let results = run_batch(config, dataset);
    let results_path = output.join("batch_results.json");
    if let Err(e) = results.save(&results_path) {
        tracing::error!(error = %e, path = %results_path.display(), "failed to save results");
        eprintln!("FATAL: Failed to save results: {e}");
        return ExitCode::FAILURE;
    }

    let s = &results.summary;
    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BATCH COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Games played:      {}", s.games);
    eprintln!("Survived:          {}", s.survived);
    eprintln!("Mean score:        {:.1}", s.mean_score);
    eprintln!("Best score:        {}", s.best_score);
    eprintln!("Mean wave:         {:.2} (max {})", s.mean_wave, s.max_wave);
    eprintln!("Mean kills:        {:.1}", s.mean_kills);
    eprintln!("Quick reload rate: {:.1}%", s.quick_reload_rate * 100.0);
    for (kind, kills) in &s.kills_by_kind {
        eprintln!("  {kind:<10} {kills}");
    }
    if !results.errors.is_empty() {
        eprintln!("Errors:            {}", results.errors.len());
    }
    eprintln!("Results saved to {}", results_path.display());

    if results.errors.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Verify determinism by running the same seed multiple times
fn cmd_verify(dataset: &DataSet, seed: u64, runs: u32, ticks: u64, strategy: &str) -> ExitCode {
    let game = GameConfig {
        max_ticks: ticks,
        strategy: Strategy::from_name(strategy),
        record: true,
        ..GameConfig::new(seed)
    };
    tracing::info!(seed, runs, ticks, "verifying determinism");

    let mut reference: Option<u64> = None;
    for run in 0..runs.max(1) {
        let result = run_game(&game, &dataset.config, &dataset.data);
        let hash = result.metrics.final_state_hash;
        eprintln!("run {run}: tick {} hash {hash:016x}", result.metrics.duration_ticks);
        match reference {
            None => reference = Some(hash),
            Some(expected) if expected != hash => {
                eprintln!("FAIL: run {run} diverged ({hash:016x} != {expected:016x})");
                return ExitCode::FAILURE;
            }
            Some(_) => {}
        }
        if let Some(replay) = &result.replay {
            if let Err(e) = replay.verify(&dataset.data) {
                eprintln!("FAIL: replay of run {run}: {e}");
                return ExitCode::FAILURE;
            }
        }
    }
    eprintln!("OK: {} runs identical, replays verified", runs.max(1));
    ExitCode::SUCCESS
}

/// Watch a bot play
fn cmd_watch(
    dataset: DataSet,
    seed: u64,
    strategy: &str,
    weapon: &str,
    ticks: u64,
    every: u64,
    config: &AsciiConfig,
) -> ExitCode {
    let strategy = Strategy::from_name(strategy);
    let mut sim = Simulation::new(dataset.config, dataset.data, seed);
    sim.switch_weapon_named(weapon);

    let mut out = io::stdout().lock();
    let mut frame = 0u64;
    while sim.tick_count() < ticks && !sim.player().is_dead() {
        if sim.pending_upgrades() > 0 {
            match strategy.pick_upgrade(&sim) {
                Some(part) if sim.apply_upgrade(part).is_some() => {}
                _ => sim.skip_upgrade(),
            }
            continue;
        }
        let input = strategy.decide(&sim, frame);
        sim.tick(BOT_DT, &input);
        frame += 1;
        if frame % every == 0 && print_frame(&mut out, &sim, config).is_err() {
            return ExitCode::FAILURE;
        }
    }
    if print_frame(&mut out, &sim, config).is_err() {
        return ExitCode::FAILURE;
    }
    let s = sim.snapshot();
    eprintln!(
        "final: tick {} score {} kills {} wave {} level {}",
        sim.tick_count(),
        s.score,
        s.kills,
        s.wave,
        s.level
    );
    ExitCode::SUCCESS
}

fn print_frame(out: &mut impl Write, sim: &Simulation, config: &AsciiConfig) -> io::Result<()> {
    writeln!(out)?;
    for row in render_ascii(sim, config) {
        writeln!(out, "{row}")?;
    }
    out.flush()
}
