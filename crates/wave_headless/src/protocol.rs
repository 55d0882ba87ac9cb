//! JSON progress protocol for headless sessions.
//!
//! The runner writes one JSON object per line to stdout:
//!
//! ```text
//! <- {"type":"wave_started","wave":1,"monsters":["Goblin","Goblin"],"boss":false}
//! <- {"type":"round_completed","wave":1,"round":1,...}
//! <- {"type":"wave_finished","wave":1,"players_won":true,"rounds":3,...}
//! <- {"type":"upgrade_applied","wave":1,"player":"Player1","upgrade":"Weapon",...}
//! <- {"type":"session_over","waves_cleared":4,"final_hash":1234}
//! ```
//!
//! Logs go to stderr so stdout stays machine-readable.

use serde::{Deserialize, Serialize};
use wave_core::economy::UpgradeKind;
use wave_core::events::{HealthEntry, RosterSnapshot, RoundReport, Side};
use wave_core::materials::Inventory;
use wave_core::orchestrator::WaveResult;
use wave_core::wave::Wave;

/// Events emitted while a session runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// A wave was generated.
    WaveStarted {
        wave: u32,
        monsters: Vec<String>,
        boss: bool,
    },

    /// A round was resolved.
    RoundCompleted {
        wave: u32,
        round: u32,
        attacks: usize,
        player_damage: u32,
        monster_damage: u32,
        players: Vec<HealthEntry>,
        monsters: Vec<HealthEntry>,
    },

    /// A wave ended.
    WaveFinished {
        wave: u32,
        players_won: bool,
        rounds: u32,
        survivors: usize,
        drops: Inventory,
        share_per_player: Inventory,
        discarded: Inventory,
    },

    /// A player bought an upgrade during an intermission.
    UpgradeApplied {
        wave: u32,
        player: String,
        upgrade: UpgradeKind,
        attack: u32,
        defense: u32,
        health: u32,
    },

    /// The session ended.
    SessionOver {
        waves_cleared: u32,
        last_wave: u32,
        final_hash: u64,
    },
}

impl ProgressEvent {
    /// Event for a freshly generated wave.
    #[must_use]
    pub fn wave_started(wave: &Wave) -> Self {
        Self::WaveStarted {
            wave: wave.index,
            monsters: wave.monsters.iter().map(|m| m.name.clone()).collect(),
            boss: wave.has_boss(),
        }
    }

    /// Event for a resolved round.
    #[must_use]
    pub fn round_completed(wave: u32, report: &RoundReport, snapshot: &RosterSnapshot) -> Self {
        Self::RoundCompleted {
            wave,
            round: report.round,
            attacks: report.actions.len(),
            player_damage: report.damage_by(Side::Player),
            monster_damage: report.damage_by(Side::Monster),
            players: snapshot.players.clone(),
            monsters: snapshot.monsters.clone(),
        }
    }

    /// Event for a finished wave.
    #[must_use]
    pub fn wave_finished(result: &WaveResult) -> Self {
        Self::WaveFinished {
            wave: result.wave_index,
            players_won: result.players_won,
            rounds: result.rounds,
            survivors: result.survivors,
            drops: result.material_drops,
            share_per_player: result.share_per_player,
            discarded: result.discarded,
        }
    }

    /// Event name as it appears in the `type` field.
    pub fn name(&self) -> &'static str {
        match self {
            Self::WaveStarted { .. } => "wave_started",
            Self::RoundCompleted { .. } => "round_completed",
            Self::WaveFinished { .. } => "wave_finished",
            Self::UpgradeApplied { .. } => "upgrade_applied",
            Self::SessionOver { .. } => "session_over",
        }
    }

    /// Serialize to JSON line (with newline).
    pub fn to_json_line(&self) -> String {
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                r#"{{"type":"error","message":"Serialization failed: {}"}}"#,
                e
            )
        });
        json.push('\n');
        json
    }

    /// Parse from a JSON line.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
