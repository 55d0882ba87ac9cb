//! # Wave Core
//!
//! Turn-based party combat against escalating monster waves.
//!
//! This crate contains **only** the rules:
//! - No rendering
//! - No IO
//! - No system randomness (every random draw comes from an injected `Rng`)
//!
//! This separation enables:
//! - Headless batch runs
//! - Seeded replays
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`roles`] - Role catalog and player creation
//! - [`combatant`] - Players, monsters and shared combat stats
//! - [`damage`] - Damage formula
//! - [`wave`] - Wave generation
//! - [`combat`] - Turn order and round resolution
//! - [`orchestrator`] - Running a whole wave and paying out drops
//! - [`economy`] - Material upgrades
//! - [`session`] - Multi-wave sessions

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod combat;
pub mod combatant;
pub mod damage;
pub mod economy;
pub mod error;
pub mod events;
pub mod materials;
pub mod orchestrator;
pub mod roles;
pub mod session;
pub mod wave;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::combat::{run_round, turn_order};
    pub use crate::combatant::{CombatStats, Combatant, Monster, MonsterKind, Player};
    pub use crate::damage::compute_damage;
    pub use crate::economy::{apply_upgrade, AppliedUpgrade, GameVariant, UpgradeKind};
    pub use crate::error::{GameError, Result, UpgradeRejection};
    pub use crate::events::{
        NullObserver, RecordingObserver, RosterSnapshot, RoundOutcome, RoundReport, Side,
        WaveObserver,
    };
    pub use crate::materials::{Inventory, MaterialCost, MaterialKind};
    pub use crate::orchestrator::{run_wave, run_wave_with, WaveConfig, WaveResult};
    pub use crate::roles::{create_player, Role};
    pub use crate::session::{Session, UpgradeOutcome};
    pub use crate::wave::{generate_wave, Wave};
}
