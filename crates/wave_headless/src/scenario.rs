//! Scenario loading and configuration.
//!
//! Scenarios define the party, rule variant and seed for a headless session.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use wave_core::combatant::Player;
use wave_core::economy::GameVariant;
use wave_core::error::GameError;
use wave_core::orchestrator::{WaveConfig, DEFAULT_ROUND_LIMIT};
use wave_core::roles::{create_player, Role};
use wave_core::session::Session;

/// Smallest allowed party.
pub const MIN_PARTY_SIZE: usize = 2;

/// Largest allowed party.
pub const MAX_PARTY_SIZE: usize = 4;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// Party has too few or too many members.
    #[error("Party must have 2-4 members, got {0}")]
    InvalidPartySize(usize),
    /// A role choice did not match the catalog.
    #[error("Invalid role for seat {seat}: {source}")]
    InvalidRole {
        /// 1-based seat.
        seat: usize,
        /// Underlying lookup error.
        source: GameError,
    },
    /// The engine refused the configuration.
    #[error("Engine error: {0}")]
    Engine(#[from] GameError),
}

/// One party seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyMember {
    /// Player name. Blank names become `Player{seat}`.
    #[serde(default)]
    pub name: String,
    /// Chosen role.
    pub role: Role,
}

impl PartyMember {
    /// Create a new party member.
    #[must_use]
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }
}

/// A complete session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Default seed (the CLI can override it).
    #[serde(default)]
    pub seed: u64,
    /// Rule variant.
    #[serde(default)]
    pub variant: GameVariant,
    /// Party seats in roster order.
    pub party: Vec<PartyMember>,
    /// Stop after this many waves even if the party survives.
    #[serde(default)]
    pub max_waves: Option<u32>,
    /// Intermission strategy (built-in name or RON path).
    #[serde(default = "default_strategy")]
    pub strategy: String,
    /// Rounds after which a wave is abandoned as an error.
    #[serde(default = "default_round_limit")]
    pub round_limit: u32,
}

fn default_strategy() -> String {
    "demo".to_string()
}

fn default_round_limit() -> u32 {
    DEFAULT_ROUND_LIMIT
}

impl Default for Scenario {
    fn default() -> Self {
        Self::demo()
    }
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// The auto-play demo: Knight, Mage and Rogue with default names.
    #[must_use]
    pub fn demo() -> Self {
        Self {
            name: "Demo".to_string(),
            description: "Three auto-named players with the auto-craft policy".to_string(),
            seed: 0,
            variant: GameVariant::Classic,
            party: vec![
                PartyMember::new("", Role::Knight),
                PartyMember::new("", Role::Mage),
                PartyMember::new("", Role::Rogue),
            ],
            max_waves: None,
            strategy: default_strategy(),
            round_limit: DEFAULT_ROUND_LIMIT,
        }
    }

    /// The demo party playing the Builder variant.
    #[must_use]
    pub fn builder_demo() -> Self {
        Self {
            name: "Builder Demo".to_string(),
            description: "Demo party with building blocks enabled".to_string(),
            variant: GameVariant::Builder,
            strategy: "builder".to_string(),
            ..Self::demo()
        }
    }

    /// Build a party from menu-style input: `(name, role choice)` per seat.
    ///
    /// Role choices accept a menu key ("1"-"4") or a role name.
    pub fn party_from_choices(seats: &[(&str, &str)]) -> Result<Vec<PartyMember>, ScenarioError> {
        check_party_size(seats.len())?;
        seats
            .iter()
            .enumerate()
            .map(|(i, (name, choice))| {
                choice
                    .parse::<Role>()
                    .map(|role| PartyMember::new(*name, role))
                    .map_err(|source| ScenarioError::InvalidRole { seat: i + 1, source })
            })
            .collect()
    }

    /// Check party bounds.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        check_party_size(self.party.len())
    }

    /// Create the players for this scenario.
    #[must_use]
    pub fn build_party(&self) -> Vec<Player> {
        self.party
            .iter()
            .enumerate()
            .map(|(i, member)| create_player(member.role, &member.name, i + 1))
            .collect()
    }

    /// Start a session, using `seed` if given and the scenario seed otherwise.
    pub fn start_session(&self, seed: Option<u64>) -> Result<Session, ScenarioError> {
        self.validate()?;
        let session = Session::new(
            self.build_party(),
            seed.unwrap_or(self.seed),
            self.variant,
        )?
        .with_config(WaveConfig {
            round_limit: self.round_limit,
        });
        Ok(session)
    }
}

fn check_party_size(len: usize) -> Result<(), ScenarioError> {
    if (MIN_PARTY_SIZE..=MAX_PARTY_SIZE).contains(&len) {
        Ok(())
    } else {
        Err(ScenarioError::InvalidPartySize(len))
    }
}
