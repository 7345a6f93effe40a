//! One bot-played game from seed to death or tick limit.

use horde_core::config::SimulationConfig;
use horde_core::data::{GameData, WeaponId};
use horde_core::replay::{Replay, ReplayAction};
use horde_core::simulation::Simulation;

use crate::metrics::GameMetrics;
use crate::strategies::Strategy;

/// Fixed frame delta for bot games.
pub const BOT_DT: f32 = 1.0 / 60.0;

/// Settings for one game.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Seed.
    pub seed: u64,
    /// Tick limit.
    pub max_ticks: u64,
    /// Bot.
    pub strategy: Strategy,
    /// Starting weapon.
    pub weapon: WeaponId,
    /// Keep a replay of the game.
    pub record: bool,
    /// Identifier for metrics.
    pub game_id: String,
}

impl GameConfig {
    /// Default bot, pistol, ten minutes.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            max_ticks: 36_000,
            strategy: Strategy::default(),
            weapon: WeaponId::Pistol,
            record: false,
            game_id: format!("game_{seed}"),
        }
    }
}

/// Result of [`run_game`].
#[derive(Debug, Clone)]
pub struct GameResult {
    /// Metrics.
    pub metrics: GameMetrics,
    /// Replay, if recording was on.
    pub replay: Option<Replay>,
}

/// Play one game with the bot.
pub fn run_game(config: &GameConfig, sim_config: &SimulationConfig, data: &GameData) -> GameResult {
    let mut sim = Simulation::new(sim_config.clone(), data.clone(), config.seed);
    let mut replay = config
        .record
        .then(|| Replay::new(config.seed, sim_config.clone()));
    let mut metrics = GameMetrics::new(config.game_id.clone(), config.seed);
    metrics.strategy = config.strategy.name.clone();

    sim.switch_weapon(config.weapon);
    metrics.weapon = sim.player().weapon.to_string();
    if let Some(r) = &mut replay {
        r.record(ReplayAction::SwitchWeapon(config.weapon));
    }

    let mut frame = 0u64;
    while sim.tick_count() < config.max_ticks && !sim.player().is_dead() {
        if sim.pending_upgrades() > 0 {
            let applied = config
                .strategy
                .pick_upgrade(&sim)
                .and_then(|part| sim.apply_upgrade(part).map(|_| part));
            match applied {
                Some(part) => {
                    metrics.upgrades.push(part.to_string());
                    if let Some(r) = &mut replay {
                        r.record(ReplayAction::Upgrade(part));
                    }
                }
                None => {
                    sim.skip_upgrade();
                    if let Some(r) = &mut replay {
                        r.record(ReplayAction::SkipUpgrade);
                    }
                }
            }
            continue;
        }

        let input = config.strategy.decide(&sim, frame);
        let events = sim.tick(BOT_DT, &input);
        if let Some(r) = &mut replay {
            r.record_tick(BOT_DT, input);
        }
        metrics.record(&events);
        frame += 1;
    }

    metrics.finalize(&sim);
    if let Some(r) = &mut replay {
        r.finalize(&sim);
    }
    tracing::debug!(
        game = %metrics.game_id,
        ticks = metrics.duration_ticks,
        score = metrics.score,
        wave = metrics.wave,
        "game finished"
    );
    GameResult { metrics, replay }
}
