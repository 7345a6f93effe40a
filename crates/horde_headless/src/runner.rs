//! Headless game runner implementation.
//!
//! Drives one [`Simulation`] from JSON-line commands. The runner owns no
//! window or audio; a controller process plays through stdin and stdout.

use std::io::{BufRead, Write};

use horde_core::events::TickEvents;
use horde_core::input::FrameInput;
use horde_core::math::Vec2;
use horde_core::reload::QuickReloadOutcome;
use horde_core::simulation::Simulation;
use horde_core::world::GamePhase;

use crate::ascii_visualizer::{render_ascii, AsciiConfig};
use crate::data_loader::DataSet;
use crate::protocol::{
    Command, GameState, InputCommand, PlayerState, Response, TickSummary, ZombieState,
};

/// Headless runner configuration.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// Seed for the first run.
    pub seed: u64,
    /// Frame delta when a `tick` command gives none.
    pub default_dt: f32,
    /// Append a `state` line after every `tick` command.
    pub auto_state_output: bool,
    /// Starting weapon key.
    pub weapon: Option<String>,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            default_dt: 1.0 / 60.0,
            auto_state_output: false,
            weapon: None,
        }
    }
}

/// JSON-lines session around one simulation.
pub struct HeadlessRunner {
    sim: Simulation,
    config: HeadlessConfig,
    aim_target: Option<Vec2>,
    game_over_sent: bool,
    quit: bool,
}

impl HeadlessRunner {
    /// Create a runner over `dataset`.
    #[must_use]
    pub fn new(config: HeadlessConfig, dataset: DataSet) -> Self {
        let mut sim = Simulation::new(dataset.config, dataset.data, config.seed);
        if let Some(weapon) = &config.weapon {
            sim.switch_weapon_named(weapon);
        }
        Self {
            sim,
            config,
            aim_target: None,
            game_over_sent: false,
            quit: false,
        }
    }

    /// The simulation being driven.
    #[must_use]
    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// A `quit` command was handled.
    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Line announcing the session.
    #[must_use]
    pub fn ready(&self) -> Response {
        Response::ready(self.sim.tick_count(), self.sim.seed())
    }

    /// Handle one command.
    pub fn handle(&mut self, command: Command) -> Vec<Response> {
        let name = command.name();
        tracing::debug!(cmd = name, "command");
        match command {
            Command::Tick { count, dt, input } => {
                let dt = dt.unwrap_or(self.config.default_dt);
                let mut out = vec![Response::Ticked(self.run_ticks(count, dt, &input))];
                if self.config.auto_state_output {
                    out.push(Response::State(self.state()));
                }
                if let Some(over) = self.game_over() {
                    out.push(over);
                }
                out
            }
            Command::Query => vec![Response::State(self.state())],
            Command::Upgrade { part } => {
                if self.sim.phase() == GamePhase::GameOver {
                    return vec![Response::error("game is over", Some(name))];
                }
                let level = self.sim.apply_upgrade(part);
                vec![Response::Upgraded { part, level }]
            }
            Command::SkipUpgrade => {
                self.sim.skip_upgrade();
                vec![Response::ack(name)]
            }
            Command::SwitchWeapon { weapon } => {
                self.sim.switch_weapon_named(&weapon);
                vec![Response::ack(name)]
            }
            Command::Pause => {
                self.sim.pause();
                vec![Response::ack(name)]
            }
            Command::Resume => {
                self.sim.resume();
                vec![Response::ack(name)]
            }
            Command::Reset => {
                self.sim.reset();
                self.aim_target = None;
                self.game_over_sent = false;
                vec![self.ready()]
            }
            Command::Hash => vec![Response::StateHash {
                tick: self.sim.tick_count(),
                hash: self.sim.state_hash(),
            }],
            Command::Render { width, height } => {
                let config = AsciiConfig {
                    width: width.clamp(8, 400),
                    height: height.clamp(4, 200),
                    ..AsciiConfig::default()
                };
                vec![Response::Frame {
                    tick: self.sim.tick_count(),
                    rows: render_ascii(&self.sim, &config),
                }]
            }
            Command::Quit => {
                self.quit = true;
                vec![Response::Bye]
            }
        }
    }

    /// Handle one raw line. Blank lines produce nothing.
    pub fn handle_line(&mut self, line: &str) -> Vec<Response> {
        let line = line.trim();
        if line.is_empty() {
            return Vec::new();
        }
        match Command::from_json(line) {
            Ok(command) => self.handle(command),
            Err(e) => {
                tracing::warn!(error = %e, "bad command");
                vec![Response::error(format!("invalid command: {e}"), None)]
            }
        }
    }

    /// Read commands until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> std::io::Result<()> {
        output.write_all(self.ready().to_json_line().as_bytes())?;
        output.flush()?;
        for line in input.lines() {
            for response in self.handle_line(&line?) {
                output.write_all(response.to_json_line().as_bytes())?;
            }
            output.flush()?;
            if self.quit {
                break;
            }
        }
        tracing::info!(tick = self.sim.tick_count(), "session ended");
        Ok(())
    }

    fn frame_input(&mut self, input: &InputCommand, first: bool) -> FrameInput {
        if let (Some(x), Some(y)) = (input.aim_x, input.aim_y) {
            self.aim_target = Some(Vec2::new(x, y));
        }
        let camera = &self.sim.world().camera;
        let aim_screen = match self.aim_target {
            Some(target) => camera.world_to_screen(target) - camera.shake_offset,
            None => self.sim.world().pointer,
        };
        let move_axis = Vec2::new(input.move_x, input.move_y).clamp_length_max(1.0);
        FrameInput {
            move_axis,
            aim_screen,
            fire_held: input.fire,
            fire_pressed: first && input.fire,
            sprint_held: input.sprint,
            reload_pressed: first && input.reload,
            dodge_pressed: first && input.dodge,
            grenade_pressed: first && input.grenade,
            pause_pressed: false,
        }
    }

    fn run_ticks(&mut self, count: u32, dt: f32, input: &InputCommand) -> TickSummary {
        let mut summary = TickSummary::default();
        for i in 0..count {
            if !self.sim.world().is_playing() {
                break;
            }
            let frame = self.frame_input(input, i == 0);
            let before = self.sim.tick_count();
            let events = self.sim.tick(dt, &frame);
            if self.sim.tick_count() > before {
                summary.advanced += 1;
            }
            accumulate(&mut summary, &events);
        }
        summary.tick = self.sim.tick_count();
        summary.phase = self.sim.phase();
        summary
    }

    fn game_over(&mut self) -> Option<Response> {
        if self.game_over_sent || self.sim.phase() != GamePhase::GameOver {
            return None;
        }
        self.game_over_sent = true;
        let s = self.sim.snapshot();
        Some(Response::GameOver {
            score: s.score,
            kills: s.kills,
            wave: s.wave,
            level: s.level,
            ticks: self.sim.tick_count(),
        })
    }

    fn state(&self) -> GameState {
        let world = self.sim.world();
        let player = self.sim.player();
        GameState {
            tick: self.sim.tick_count(),
            phase: self.sim.phase(),
            pending_upgrades: self.sim.pending_upgrades(),
            stats: self.sim.snapshot(),
            player: PlayerState {
                x: player.position.x,
                y: player.position.y,
                rotation: player.rotation,
                weapon: player.weapon,
                dodging: player.dodge.active,
            },
            zombies: world
                .stores
                .living_zombies()
                .map(|z| ZombieState {
                    id: z.id,
                    kind: z.kind,
                    x: z.position.x,
                    y: z.position.y,
                    health: z.health,
                    max_health: z.max_health,
                })
                .collect(),
            items: world.stores.items.len() as u32,
            hash: self.sim.state_hash(),
        }
    }
}

fn accumulate(summary: &mut TickSummary, events: &TickEvents) {
    summary.shots += events.shots.len() as u32;
    summary.dry_fires += events.dry_fires;
    summary.kills += events.kills.len() as u32;
    summary.spawned += events.spawned.len() as u32;
    summary.pickups += events.pickups.len() as u32;
    summary.damage_taken += events.damage_taken;
    summary.level_ups += events.level_ups.len() as u32;
    for outcome in &events.quick_reloads {
        match outcome {
            QuickReloadOutcome::Success => summary.quick_reload_hits += 1,
            QuickReloadOutcome::Failure => summary.quick_reload_misses += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horde_core::data::WeaponPart;

    fn runner() -> HeadlessRunner {
        HeadlessRunner::new(HeadlessConfig::default(), DataSet::default())
    }

    #[test]
    fn test_tick_advances() {
        let mut r = runner();
        let out = r.handle_line(r#"{"cmd":"tick","count":5}"#);
        match &out[0] {
            Response::Ticked(summary) => {
                assert_eq!(summary.tick, 5);
                assert_eq!(summary.advanced, 5);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_paused_tick_does_not_advance() {
        let mut r = runner();
        r.handle(Command::Pause);
        let out = r.handle(Command::Tick {
            count: 3,
            dt: None,
            input: InputCommand::default(),
        });
        assert!(matches!(&out[0], Response::Ticked(s) if s.advanced == 0 && s.tick == 0));
    }

    #[test]
    fn test_fire_command_shoots() {
        let mut r = runner();
        let p = r.simulation().player().position;
        let input = InputCommand {
            fire: true,
            aim_x: Some(p.x + 200.0),
            aim_y: Some(p.y),
            ..InputCommand::default()
        };
        let out = r.handle(Command::Tick {
            count: 1,
            dt: None,
            input,
        });
        assert!(matches!(&out[0], Response::Ticked(s) if s.shots == 1));
    }

    #[test]
    fn test_bad_line_reports_error() {
        let mut r = runner();
        let out = r.handle_line("{not json");
        assert!(matches!(&out[0], Response::Error { cmd: None, .. }));
        assert!(r.handle_line("   ").is_empty());
    }

    #[test]
    fn test_upgrade_outside_level_up() {
        let mut r = runner();
        let out = r.handle(Command::Upgrade {
            part: WeaponPart::Magazine,
        });
        assert_eq!(
            out,
            vec![Response::Upgraded {
                part: WeaponPart::Magazine,
                level: Some(1)
            }]
        );
    }

    #[test]
    fn test_session_until_quit() {
        let input = b"{\"cmd\":\"tick\",\"count\":2}\n{\"cmd\":\"hash\"}\n{\"cmd\":\"quit\"}\n{\"cmd\":\"tick\"}\n";
        let mut output = Vec::new();
        let mut r = runner();
        r.run(&input[..], &mut output).expect("session");
        let text = String::from_utf8(output).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("\"type\":\"ready\""));
        assert!(lines[3].contains("\"type\":\"bye\""));
        assert_eq!(r.simulation().tick_count(), 2);
    }
}
