//! A multi-wave session: one party, one seeded generator, waves in order.
//!
//! The session owns everything needed to replay a run from its seed. Waves
//! are fought in index order starting at 1; between waves the driver may
//! buy upgrades. The session ends the first time a wave is lost.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::combatant::{any_alive, Player};
use crate::economy::{apply_upgrade, AppliedUpgrade, GameVariant, UpgradeKind};
use crate::error::{GameError, Result, UpgradeRejection};
use crate::events::WaveObserver;
use crate::orchestrator::{run_wave_with, WaveConfig, WaveResult};

/// Outcome of a single upgrade request.
pub type UpgradeOutcome = std::result::Result<AppliedUpgrade, UpgradeRejection>;

/// A running game.
#[derive(Debug, Clone)]
pub struct Session {
    players: Vec<Player>,
    rng: ChaCha8Rng,
    seed: u64,
    variant: GameVariant,
    config: WaveConfig,
    next_wave: u32,
    over: bool,
    history: Vec<WaveResult>,
}

impl Session {
    /// Start a session for `party`, seeding the generator from `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::EmptyParty`] if `party` is empty.
    pub fn new(party: Vec<Player>, seed: u64, variant: GameVariant) -> Result<Self> {
        if party.is_empty() {
            return Err(GameError::EmptyParty);
        }
        Ok(Self {
            players: party,
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            variant,
            config: WaveConfig::default(),
            next_wave: 1,
            over: false,
            history: Vec::new(),
        })
    }

    /// Replace the wave configuration.
    #[must_use]
    pub fn with_config(mut self, config: WaveConfig) -> Self {
        self.config = config;
        self
    }

    /// Seed the session was started with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Rule set in play.
    #[must_use]
    pub const fn variant(&self) -> GameVariant {
        self.variant
    }

    /// Index of the wave that will be fought next.
    #[must_use]
    pub const fn next_wave(&self) -> u32 {
        self.next_wave
    }

    /// Number of waves the party has cleared.
    #[must_use]
    pub fn waves_cleared(&self) -> u32 {
        u32::try_from(self.history.iter().filter(|r| r.players_won).count()).unwrap_or(u32::MAX)
    }

    /// Check if the session has ended.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.over
    }

    /// The party, in roster order.
    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Results of every wave fought so far.
    #[must_use]
    pub fn history(&self) -> &[WaveResult] {
        &self.history
    }

    /// Fight the next wave.
    ///
    /// On a loss the session is marked over. A wave that errors (round
    /// limit) leaves the wave counter where it was.
    ///
    /// # Errors
    ///
    /// - [`GameError::SessionOver`] if the session already ended.
    /// - Any error from [`run_wave_with`].
    pub fn run_next_wave<O>(&mut self, observer: &mut O) -> Result<WaveResult>
    where
        O: WaveObserver + ?Sized,
    {
        if self.over {
            return Err(GameError::SessionOver(self.next_wave.saturating_sub(1)));
        }

        let result = run_wave_with(
            &mut self.players,
            self.next_wave,
            &self.config,
            &mut self.rng,
            observer,
        )?;

        self.next_wave += 1;
        if !result.players_won || !any_alive(&self.players) {
            self.over = true;
            tracing::info!(
                wave = result.wave_index,
                waves_cleared = self.waves_cleared(),
                "Session over"
            );
        }
        self.history.push(result.clone());
        Ok(result)
    }

    /// Buy an upgrade for the player at `index` under the session's variant.
    ///
    /// The outer error is for caller mistakes; the inner result carries the
    /// rejection of a legitimate but unaffordable request.
    ///
    /// # Errors
    ///
    /// - [`GameError::SessionOver`] once the session has ended.
    /// - [`GameError::InvalidPlayerIndex`] if `index` is outside the party.
    pub fn apply_upgrade(&mut self, index: usize, kind: UpgradeKind) -> Result<UpgradeOutcome> {
        if self.over {
            return Err(GameError::SessionOver(self.next_wave.saturating_sub(1)));
        }
        let len = self.players.len();
        let player = self
            .players
            .get_mut(index)
            .ok_or(GameError::InvalidPlayerIndex { index, len })?;
        Ok(apply_upgrade(player, kind, self.variant))
    }

    /// Hash of the full session state.
    ///
    /// Two sessions with the same seed and the same sequence of calls
    /// produce the same hash.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.next_wave.hash(&mut hasher);
        self.over.hash(&mut hasher);
        self.variant.hash(&mut hasher);

        self.players.len().hash(&mut hasher);
        for player in &self.players {
            player.hash(&mut hasher);
        }

        // Generator position covers every draw made so far.
        self.rng.get_word_pos().hash(&mut hasher);

        hasher.finish()
    }
}
