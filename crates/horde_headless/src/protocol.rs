//! JSON protocol for headless game communication.
//!
//! The headless runner communicates via JSON lines (one JSON object per line):
//!
//! **Input (stdin):** Commands from the controller
//! **Output (stdout):** Game state updates and responses
//!
//! # Protocol Flow
//!
//! 1. Runner starts, outputs `{"type":"ready","version":"1.0",...}`
//! 2. Controller sends commands as JSON lines
//! 3. Runner answers each command; `tick` answers with a summary of what
//!    happened, `query` with the full state
//! 4. When the player dies, a `game_over` line follows the tick summary
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0","tick":0,"seed":7}
//! -> {"cmd":"tick","count":30,"input":{"move_x":1.0,"fire":true,"aim_x":300.0,"aim_y":0.0}}
//! <- {"type":"ticked","tick":30,"shots":8,"kills":0,...}
//! -> {"cmd":"upgrade","part":"magazine"}
//! <- {"type":"upgraded","part":"magazine","level":1}
//! -> {"cmd":"query"}
//! <- {"type":"state","tick":30,...}
//! ```

use horde_core::data::{WeaponId, WeaponPart, ZombieKind};
use horde_core::events::StatsSnapshot;
use horde_core::world::GamePhase;
use serde::{Deserialize, Serialize};

// ============================================================================
// Input Commands (controller -> runner)
// ============================================================================

/// Commands that can be sent to the headless runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Advance by `count` frames holding `input`.
    Tick {
        /// Frames to run.
        #[serde(default = "default_tick_count")]
        count: u32,
        /// Frame delta override, seconds.
        #[serde(default)]
        dt: Option<f32>,
        /// Controls held for every frame.
        #[serde(default)]
        input: InputCommand,
    },

    /// Query current game state without advancing time.
    Query,

    /// Spend a level-up choice.
    Upgrade {
        /// Part to raise.
        part: WeaponPart,
    },

    /// Leave the level-up pause without choosing.
    SkipUpgrade,

    /// Equip a weapon by name; unknown names give the default weapon.
    SwitchWeapon {
        /// Weapon name or id.
        weapon: String,
    },

    /// Freeze the simulation.
    Pause,

    /// Unfreeze the simulation.
    Resume,

    /// Start over on the next seed.
    Reset,

    /// Current state hash (for determinism verification).
    Hash,

    /// Render the current frame as ASCII.
    Render {
        /// Columns.
        #[serde(default = "default_render_width")]
        width: usize,
        /// Rows.
        #[serde(default = "default_render_height")]
        height: usize,
    },

    /// Quit the session.
    Quit,
}

fn default_tick_count() -> u32 {
    1
}

fn default_render_width() -> usize {
    80
}

fn default_render_height() -> usize {
    24
}

/// Controls for one or more frames. Aim is a world position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputCommand {
    /// Horizontal movement in `[-1, 1]`.
    pub move_x: f32,
    /// Vertical movement in `[-1, 1]`.
    pub move_y: f32,
    /// Aim target, world x. Absent keeps the previous aim.
    pub aim_x: Option<f32>,
    /// Aim target, world y.
    pub aim_y: Option<f32>,
    /// Trigger held. The first frame of a command counts as a press.
    pub fire: bool,
    /// Sprint held.
    pub sprint: bool,
    /// Reload pressed on the first frame.
    pub reload: bool,
    /// Dodge pressed on the first frame.
    pub dodge: bool,
    /// Grenade thrown on the first frame, toward the aim point.
    pub grenade: bool,
}

// ============================================================================
// Output Responses (runner -> controller)
// ============================================================================

/// Responses sent from the headless runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Runner is ready to accept commands.
    Ready {
        /// Protocol version.
        version: String,
        /// Current tick.
        tick: u64,
        /// Seed of the run.
        seed: u64,
    },

    /// Acknowledgment of a command.
    Ack {
        /// Command name.
        cmd: String,
    },

    /// Error processing a command.
    Error {
        /// Description.
        message: String,
        /// Command name, if it parsed.
        cmd: Option<String>,
    },

    /// Summary of a `tick` command.
    Ticked(TickSummary),

    /// Full state.
    State(GameState),

    /// Result of an `upgrade` command.
    Upgraded {
        /// Part raised.
        part: WeaponPart,
        /// New level, or `None` if already maxed.
        level: Option<u32>,
    },

    /// The player died.
    GameOver {
        /// Final score.
        score: u64,
        /// Total kills.
        kills: u32,
        /// Wave reached.
        wave: u32,
        /// Level reached.
        level: u32,
        /// Ticks survived.
        ticks: u64,
    },

    /// State hash for determinism verification.
    StateHash {
        /// Current tick.
        tick: u64,
        /// Hash.
        hash: u64,
    },

    /// ASCII frame.
    Frame {
        /// Current tick.
        tick: u64,
        /// One string per row.
        rows: Vec<String>,
    },

    /// Goodbye message before shutdown.
    Bye,
}

/// Aggregated events over the frames of one `tick` command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickSummary {
    /// Tick after the command.
    pub tick: u64,
    /// Frames that actually advanced.
    pub advanced: u32,
    /// Shots fired.
    pub shots: u32,
    /// Dry-fire clicks.
    pub dry_fires: u32,
    /// Kills.
    pub kills: u32,
    /// Zombies spawned.
    pub spawned: u32,
    /// Items picked up.
    pub pickups: u32,
    /// Contact damage taken.
    pub damage_taken: f32,
    /// Player levels gained.
    pub level_ups: u32,
    /// Quick-reload hits.
    pub quick_reload_hits: u32,
    /// Quick-reload misses.
    pub quick_reload_misses: u32,
    /// Phase after the command.
    pub phase: GamePhase,
}

/// State of one zombie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZombieState {
    /// Entity id.
    pub id: u64,
    /// Archetype.
    pub kind: ZombieKind,
    /// World x.
    pub x: f32,
    /// World y.
    pub y: f32,
    /// Health.
    pub health: f32,
    /// Health cap.
    pub max_health: f32,
}

/// Player position and facing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// World x.
    pub x: f32,
    /// World y.
    pub y: f32,
    /// Facing, radians.
    pub rotation: f32,
    /// Equipped weapon.
    pub weapon: WeaponId,
    /// Dodge in progress.
    pub dodging: bool,
}

/// Response body of `query`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Current tick.
    pub tick: u64,
    /// Lifecycle phase.
    pub phase: GamePhase,
    /// Level-up choices owed.
    pub pending_upgrades: u32,
    /// HUD numbers.
    pub stats: StatsSnapshot,
    /// Player.
    pub player: PlayerState,
    /// Living zombies.
    pub zombies: Vec<ZombieState>,
    /// Items on the ground.
    pub items: u32,
    /// State hash.
    pub hash: u64,
}

// ============================================================================
// Helpers
// ============================================================================

impl Response {
    /// Create a ready response.
    pub fn ready(tick: u64, seed: u64) -> Self {
        Self::Ready {
            version: "1.0".to_string(),
            tick,
            seed,
        }
    }

    /// Create an acknowledgment.
    pub fn ack(cmd: &str) -> Self {
        Self::Ack {
            cmd: cmd.to_string(),
        }
    }

    /// Create an error response.
    pub fn error(message: impl Into<String>, cmd: Option<&str>) -> Self {
        Self::Error {
            message: message.into(),
            cmd: cmd.map(String::from),
        }
    }

    /// Serialize to JSON line (with newline).
    pub fn to_json_line(&self) -> String {
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","message":"Serialization failed: {e}"}}"#)
        });
        json.push('\n');
        json
    }
}

impl Command {
    /// Parse from a JSON line.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Get command name for acknowledgment.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tick { .. } => "tick",
            Self::Query => "query",
            Self::Upgrade { .. } => "upgrade",
            Self::SkipUpgrade => "skip_upgrade",
            Self::SwitchWeapon { .. } => "switch_weapon",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Reset => "reset",
            Self::Hash => "hash",
            Self::Render { .. } => "render",
            Self::Quit => "quit",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tick_command() {
        let json = r#"{"cmd":"tick","count":60,"input":{"move_x":1.0,"fire":true}}"#;
        let cmd = Command::from_json(json).unwrap();
        match cmd {
            Command::Tick { count, dt, input } => {
                assert_eq!(count, 60);
                assert_eq!(dt, None);
                assert_eq!(input.move_x, 1.0);
                assert!(input.fire);
                assert_eq!(input.aim_x, None);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_default_tick_count() {
        let cmd = Command::from_json(r#"{"cmd":"tick"}"#).unwrap();
        assert!(matches!(cmd, Command::Tick { count: 1, .. }));
    }

    #[test]
    fn test_parse_upgrade_command() {
        let cmd = Command::from_json(r#"{"cmd":"upgrade","part":"magazine"}"#).unwrap();
        assert_eq!(
            cmd,
            Command::Upgrade {
                part: WeaponPart::Magazine
            }
        );
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(Command::from_json(r#"{"cmd":"spawn"}"#).is_err());
    }

    #[test]
    fn test_serialize_hash_response() {
        let json = Response::StateHash { tick: 100, hash: 5 }.to_json_line();
        assert!(json.contains(r#""type":"state_hash""#));
        assert!(json.contains(r#""tick":100"#));
        assert!(json.ends_with('\n'));
    }
}
