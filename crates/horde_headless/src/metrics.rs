//! Per-game metrics for balance analysis.

use std::collections::BTreeMap;

use horde_core::events::{KillSource, TickEvents};
use horde_core::reload::QuickReloadOutcome;
use horde_core::simulation::Simulation;
use serde::{Deserialize, Serialize};

/// Complete metrics for a single game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameMetrics {
    /// Unique game identifier.
    pub game_id: String,
    /// Random seed used.
    pub seed: u64,
    /// Bot strategy name.
    pub strategy: String,
    /// Starting weapon.
    pub weapon: String,
    /// Ticks played.
    pub duration_ticks: u64,
    /// Still alive when the tick limit hit.
    pub survived: bool,
    /// Final score.
    pub score: u64,
    /// Total kills.
    pub kills: u32,
    /// Kills by archetype.
    pub kills_by_kind: BTreeMap<String, u32>,
    /// Kills by grenade.
    pub grenade_kills: u32,
    /// Wave reached.
    pub wave: u32,
    /// Player level reached.
    pub level: u32,
    /// Shots fired.
    pub shots: u32,
    /// Dry-fire clicks.
    pub dry_fires: u32,
    /// Quick-reload hits.
    pub quick_reload_hits: u32,
    /// Quick-reload misses.
    pub quick_reload_misses: u32,
    /// Items collected.
    pub pickups: u32,
    /// Contact damage taken.
    pub damage_taken: f64,
    /// Upgrades bought, in order.
    pub upgrades: Vec<String>,
    /// Final simulation state hash (for determinism validation).
    pub final_state_hash: u64,
}

impl GameMetrics {
    /// Create a new game metrics instance.
    #[must_use]
    pub fn new(game_id: impl Into<String>, seed: u64) -> Self {
        Self {
            game_id: game_id.into(),
            seed,
            ..Default::default()
        }
    }

    /// Fold one tick's events in.
    pub fn record(&mut self, events: &TickEvents) {
        self.shots += events.shots.len() as u32;
        self.dry_fires += events.dry_fires;
        self.pickups += events.pickups.len() as u32;
        self.damage_taken += f64::from(events.damage_taken);
        for kill in &events.kills {
            *self.kills_by_kind.entry(format!("{:?}", kill.kind)).or_insert(0) += 1;
            if kill.source == KillSource::Grenade {
                self.grenade_kills += 1;
            }
        }
        for outcome in &events.quick_reloads {
            match outcome {
                QuickReloadOutcome::Success => self.quick_reload_hits += 1,
                QuickReloadOutcome::Failure => self.quick_reload_misses += 1,
            }
        }
    }

    /// Copy end-of-game totals from the simulation.
    pub fn finalize(&mut self, sim: &Simulation) {
        let s = sim.snapshot();
        self.duration_ticks = sim.tick_count();
        self.survived = sim.player().health > 0.0;
        self.score = s.score;
        self.kills = s.kills;
        self.wave = s.wave;
        self.level = s.level;
        self.final_state_hash = sim.state_hash();
    }

    /// Fraction of quick-reload presses that hit.
    #[must_use]
    pub fn quick_reload_rate(&self) -> f64 {
        let total = self.quick_reload_hits + self.quick_reload_misses;
        if total == 0 {
            0.0
        } else {
            f64::from(self.quick_reload_hits) / f64::from(total)
        }
    }
}

/// Aggregates over a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Games played.
    pub games: u32,
    /// Games that reached the tick limit alive.
    pub survived: u32,
    /// Mean survival, ticks.
    pub mean_duration_ticks: f64,
    /// Mean score.
    pub mean_score: f64,
    /// Best score.
    pub best_score: u64,
    /// Mean kills.
    pub mean_kills: f64,
    /// Mean wave reached.
    pub mean_wave: f64,
    /// Highest wave reached.
    pub max_wave: u32,
    /// Quick-reload hit rate over all presses.
    pub quick_reload_rate: f64,
    /// Kills by archetype over all games.
    pub kills_by_kind: BTreeMap<String, u32>,
}

impl BatchSummary {
    /// Summarize `games`.
    #[must_use]
    pub fn from_games(games: &[GameMetrics]) -> Self {
        if games.is_empty() {
            return Self::default();
        }
        let n = games.len() as f64;
        let mean = |f: fn(&GameMetrics) -> f64| games.iter().map(f).sum::<f64>() / n;

        let mut kills_by_kind = BTreeMap::new();
        let (mut hits, mut presses) = (0u32, 0u32);
        for g in games {
            for (kind, count) in &g.kills_by_kind {
                *kills_by_kind.entry(kind.clone()).or_insert(0) += count;
            }
            hits += g.quick_reload_hits;
            presses += g.quick_reload_hits + g.quick_reload_misses;
        }

        Self {
            games: games.len() as u32,
            survived: games.iter().filter(|g| g.survived).count() as u32,
            mean_duration_ticks: mean(|g| g.duration_ticks as f64),
            mean_score: mean(|g| g.score as f64),
            best_score: games.iter().map(|g| g.score).max().unwrap_or(0),
            mean_kills: mean(|g| f64::from(g.kills)),
            mean_wave: mean(|g| f64::from(g.wave)),
            max_wave: games.iter().map(|g| g.wave).max().unwrap_or(0),
            quick_reload_rate: if presses == 0 {
                0.0
            } else {
                f64::from(hits) / f64::from(presses)
            },
            kills_by_kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(score: u64, wave: u32, survived: bool) -> GameMetrics {
        GameMetrics {
            score,
            wave,
            survived,
            kills: wave * 10,
            quick_reload_hits: 1,
            quick_reload_misses: 1,
            ..GameMetrics::new("g", 0)
        }
    }

    #[test]
    fn test_summary_means() {
        let summary = BatchSummary::from_games(&[game(100, 2, false), game(300, 4, true)]);
        assert_eq!(summary.games, 2);
        assert_eq!(summary.survived, 1);
        assert_eq!(summary.mean_score, 200.0);
        assert_eq!(summary.best_score, 300);
        assert_eq!(summary.max_wave, 4);
        assert_eq!(summary.mean_kills, 30.0);
        assert_eq!(summary.quick_reload_rate, 0.5);
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(BatchSummary::from_games(&[]), BatchSummary::default());
    }
}
