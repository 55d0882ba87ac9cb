//! Error types for the combat engine.

use thiserror::Error;

use crate::materials::MaterialKind;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for engine precondition violations.
///
/// These are caller mistakes (bad wave index, empty roster), not rejected
/// player commands. Rejected upgrades are reported through
/// [`UpgradeRejection`] instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Waves are numbered from 1.
    #[error("Invalid wave index: {0} (waves start at 1)")]
    InvalidWaveIndex(u32),

    /// A wave was started without any players.
    #[error("Cannot run a wave with an empty party")]
    EmptyParty,

    /// A wave did not resolve within the configured number of rounds.
    #[error("Wave {wave} did not resolve within {limit} rounds")]
    RoundLimitExceeded {
        /// Wave index that ran away.
        wave: u32,
        /// Configured round limit.
        limit: u32,
    },

    /// Collaborator input did not name a known upgrade.
    #[error("Unknown upgrade choice: {0:?}")]
    UnknownUpgrade(String),

    /// Collaborator input did not name a known role.
    #[error("Unknown role choice: {0:?}")]
    UnknownRole(String),

    /// A player index was outside the roster.
    #[error("Player index {index} out of range (party of {len})")]
    InvalidPlayerIndex {
        /// Requested index.
        index: usize,
        /// Party size.
        len: usize,
    },

    /// The session already ended with a lost wave.
    #[error("Session is over after wave {0}")]
    SessionOver(u32),
}

/// Why an upgrade request was refused.
///
/// A rejection leaves the player untouched; the caller reports it and
/// carries on.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeRejection {
    /// Defeated players cannot craft.
    #[error("Player is defeated and cannot upgrade")]
    PlayerDefeated,

    /// Not enough of one material.
    #[error("Insufficient materials: need {required} {kind}, have {available}")]
    InsufficientMaterials {
        /// The first material that was short.
        kind: MaterialKind,
        /// Amount required.
        required: u32,
        /// Amount available.
        available: u32,
    },

    /// The upgrade exists only in another game variant.
    #[error("Upgrade is not available in this game variant")]
    UnavailableInVariant,
}
