//! Scripted intermission strategies for headless playtesting.
//!
//! Between waves every living player may buy at most one upgrade. A
//! strategy is an ordered list of upgrade preferences; each player buys
//! the first one they can afford.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use wave_core::combatant::Player;
use wave_core::economy::{check_upgrade, AppliedUpgrade, GameVariant, UpgradeKind};
use wave_core::error::GameError;
use wave_core::session::Session;

/// Error type for strategy operations.
#[derive(Error, Debug)]
pub enum StrategyError {
    /// File not found.
    #[error("Strategy file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read strategy file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse strategy: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// No built-in strategy has this name.
    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),
}

/// Names of the built-in strategies.
pub const BUILT_IN: [&str; 4] = ["demo", "defensive", "hoarder", "builder"];

/// A complete intermission strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strategy {
    /// Strategy name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Upgrades in order of preference.
    pub priorities: Vec<UpgradeKind>,
}

impl Default for Strategy {
    fn default() -> Self {
        Self::demo()
    }
}

/// One purchase made during an intermission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Purchase {
    /// Roster index of the buyer.
    pub player: usize,
    /// What was bought.
    pub applied: AppliedUpgrade,
}

impl Strategy {
    /// Load a strategy from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StrategyError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StrategyError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let strategy: Strategy = ron::from_str(&contents)?;
        Ok(strategy)
    }

    /// Load from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self, StrategyError> {
        let strategy: Strategy = ron::from_str(ron)?;
        Ok(strategy)
    }

    /// Look up a built-in strategy by name (case-insensitive).
    pub fn by_name(name: &str) -> Result<Self, StrategyError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "demo" => Ok(Self::demo()),
            "defensive" => Ok(Self::defensive()),
            "hoarder" => Ok(Self::hoarder()),
            "builder" => Ok(Self::builder()),
            _ => Err(StrategyError::UnknownStrategy(name.to_string())),
        }
    }

    /// Resolve a built-in name, or load the file if `name_or_path` ends in `.ron`.
    pub fn resolve(name_or_path: &str) -> Result<Self, StrategyError> {
        if Path::new(name_or_path)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("ron"))
        {
            Self::load(name_or_path)
        } else {
            Self::by_name(name_or_path)
        }
    }

    /// Auto-craft policy: a weapon when there is wood for it, otherwise a
    /// healing draft.
    #[must_use]
    pub fn demo() -> Self {
        Self {
            name: "demo".to_string(),
            description: "Weapon if 2 wood, else healing draft".to_string(),
            priorities: vec![UpgradeKind::Weapon, UpgradeKind::HealingDraft],
        }
    }

    /// Shields first, then drafts, then weapons.
    #[must_use]
    pub fn defensive() -> Self {
        Self {
            name: "defensive".to_string(),
            description: "Shield, then healing draft, then weapon".to_string(),
            priorities: vec![
                UpgradeKind::Shield,
                UpgradeKind::HealingDraft,
                UpgradeKind::Weapon,
            ],
        }
    }

    /// Never spends anything.
    #[must_use]
    pub fn hoarder() -> Self {
        Self {
            name: "hoarder".to_string(),
            description: "Keeps every material".to_string(),
            priorities: Vec::new(),
        }
    }

    /// Building blocks first; falls back to the demo policy.
    #[must_use]
    pub fn builder() -> Self {
        Self {
            name: "builder".to_string(),
            description: "Building block, then weapon, then healing draft".to_string(),
            priorities: vec![
                UpgradeKind::BuildingBlock,
                UpgradeKind::Weapon,
                UpgradeKind::HealingDraft,
            ],
        }
    }

    /// The first upgrade `player` could buy right now, if any.
    #[must_use]
    pub fn choose(&self, player: &Player, variant: GameVariant) -> Option<UpgradeKind> {
        self.priorities
            .iter()
            .copied()
            .find(|&kind| check_upgrade(player, kind, variant).is_ok())
    }

    /// Give every living player one chance to buy an upgrade.
    ///
    /// Players with nothing affordable are skipped.
    pub fn run_intermission(&self, session: &mut Session) -> Result<Vec<Purchase>, GameError> {
        let variant = session.variant();
        let mut purchases = Vec::new();

        for index in 0..session.players().len() {
            let Some(kind) = self.choose(&session.players()[index], variant) else {
                continue;
            };
            match session.apply_upgrade(index, kind)? {
                Ok(applied) => purchases.push(Purchase {
                    player: index,
                    applied,
                }),
                Err(rejection) => {
                    tracing::warn!(player = index, upgrade = %kind, %rejection, "Chosen upgrade rejected");
                }
            }
        }

        tracing::debug!(
            strategy = %self.name,
            purchases = purchases.len(),
            "Intermission finished"
        );
        Ok(purchases)
    }
}
