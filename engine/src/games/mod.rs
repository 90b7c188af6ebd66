//! The outcome-engine family.
//!
//! Every game implements [`CasinoGame`]: `init` samples the round's
//! random outcome (or deals the opening state) and `process_move`
//! advances it one player action at a time. Game state lives in the
//! session's `state_blob` as a compact byte encoding so a round can be
//! inspected, replayed, or resumed from the session record alone.
//!
//! Engines are money-blind: they see the session's `bet` and report
//! results, but debits and credits happen in the table driver.

pub mod blackjack;
mod blob;
pub mod cards;
pub mod cluster;
pub mod crash;
pub mod holdem;
mod logging;
pub mod mines;
pub mod payline;
pub mod penalty;
pub mod registry;
pub mod roulette;

use fortuna_types::constants::{MAX_PAYLOAD_LENGTH, MAX_STATE_BLOB_LENGTH};
use fortuna_types::{GameSession, GameType};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use registry::GameConfig;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors an engine can report. All are local and recoverable: a failed
/// action leaves the session untouched and the caller may reissue a
/// corrected one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GameError {
    /// Move payload malformed or out of range.
    #[error("invalid move payload")]
    InvalidPayload,
    /// Action not legal in the current round state.
    #[error("move not allowed in current state")]
    InvalidMove,
    /// State blob corrupt or arithmetic left the bounds the engine
    /// guarantees.
    #[error("session state invalid")]
    InvalidState,
    /// Terminal action on an already-resolved round.
    #[error("round already resolved")]
    RoundComplete,
    /// No cards left to draw.
    #[error("deck exhausted")]
    DeckExhausted,
}

/// Result of initializing or advancing a round.
///
/// `Win(amount)` carries the total credit due (stake included); the
/// original stake was already debited when the round started. A push is
/// `Win(bet)`. `ContinueWithDebit(extra)` asks the driver to commit an
/// additional stake (double down, hold'em call) before the round goes on.
///
/// Each variant carries log lines for the presentation layer: one
/// JSON-formatted string per notable event, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameResult {
    Continue(Vec<String>),
    ContinueWithDebit(u64, Vec<String>),
    Win(u64, Vec<String>),
    Loss(Vec<String>),
}

impl GameResult {
    /// True for the terminal variants.
    pub fn is_terminal(&self) -> bool {
        matches!(self, GameResult::Win(..) | GameResult::Loss(..))
    }

    /// Log lines attached to this result.
    pub fn logs(&self) -> &[String] {
        match self {
            GameResult::Continue(logs)
            | GameResult::ContinueWithDebit(_, logs)
            | GameResult::Win(_, logs)
            | GameResult::Loss(logs) => logs,
        }
    }
}

/// Deterministic per-move randomness.
///
/// Seeded from the round seed and a move index, so the same session
/// always replays to the same outcomes. The round seed itself comes from
/// the fairness layer (commit published at round start, revealed at
/// resolution).
pub struct GameRng {
    inner: ChaCha12Rng,
}

impl GameRng {
    /// Derive the RNG for one move of one round.
    ///
    /// Move index 0 is `init`; each subsequent move uses
    /// `session.move_count + 1` so a rejected action (which does not
    /// advance the count) re-derives the same stream on retry.
    pub fn new(round_seed: &[u8; 32], move_index: u32) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(round_seed);
        hasher.update(move_index.to_be_bytes());
        hasher.update(b"draw");
        let digest: [u8; 32] = hasher.finalize().into();
        Self {
            inner: ChaCha12Rng::from_seed(digest),
        }
    }

    /// Uniform draw from `[0, 1)`.
    pub fn next_unit(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    /// Uniform draw from `0..bound`. `bound` must be non-zero.
    pub fn next_below(&mut self, bound: u64) -> u64 {
        self.inner.gen_range(0..bound)
    }

    /// Build a shoe of `decks` standard 52-card decks, cards encoded
    /// `0..52` (see [`cards`]).
    pub fn create_shoe(&mut self, decks: u8) -> Vec<u8> {
        let mut shoe = Vec::with_capacity(52 * decks as usize);
        for _ in 0..decks {
            shoe.extend(0u8..cards::CARDS_PER_DECK);
        }
        shoe
    }

    /// Draw a uniformly random card from the shoe, removing it.
    pub fn draw_card(&mut self, shoe: &mut Vec<u8>) -> Option<u8> {
        if shoe.is_empty() {
            return None;
        }
        let idx = self.next_below(shoe.len() as u64) as usize;
        Some(shoe.swap_remove(idx))
    }
}

/// One game engine. Implementations are stateless; all round state lives
/// in the session.
pub trait CasinoGame {
    /// Start a round: sample the outcome (or deal the opening state) and
    /// write the initial state blob. May already resolve the round
    /// (e.g. a natural blackjack).
    fn init(
        session: &mut GameSession,
        config: &GameConfig,
        rng: &mut GameRng,
    ) -> Result<GameResult, GameError>;

    /// Advance the round by one player action. On error the session is
    /// left untouched.
    fn process_move(
        session: &mut GameSession,
        payload: &[u8],
        rng: &mut GameRng,
    ) -> Result<GameResult, GameError>;
}

/// Initialize a round for the session's game type.
pub fn init_game(
    session: &mut GameSession,
    config: &GameConfig,
    rng: &mut GameRng,
) -> Result<GameResult, GameError> {
    let result = match session.game_type {
        GameType::Crash => crash::Crash::init(session, config, rng),
        GameType::PaylineSlots => payline::PaylineSlots::init(session, config, rng),
        GameType::ClusterSlots => cluster::ClusterSlots::init(session, config, rng),
        GameType::Mines => mines::Mines::init(session, config, rng),
        GameType::Blackjack => blackjack::Blackjack::init(session, config, rng),
        GameType::Holdem => holdem::Holdem::init(session, config, rng),
        GameType::Roulette => roulette::Roulette::init(session, config, rng),
        GameType::Penalty => penalty::Penalty::init(session, config, rng),
    };
    debug_assert!(session.state_blob.len() <= MAX_STATE_BLOB_LENGTH);
    result
}

/// Process one move for the session's game type.
pub fn process_game_move(
    session: &mut GameSession,
    payload: &[u8],
    rng: &mut GameRng,
) -> Result<GameResult, GameError> {
    if payload.len() > MAX_PAYLOAD_LENGTH {
        return Err(GameError::InvalidPayload);
    }
    let result = match session.game_type {
        GameType::Crash => crash::Crash::process_move(session, payload, rng),
        GameType::PaylineSlots => payline::PaylineSlots::process_move(session, payload, rng),
        GameType::ClusterSlots => cluster::ClusterSlots::process_move(session, payload, rng),
        GameType::Mines => mines::Mines::process_move(session, payload, rng),
        GameType::Blackjack => blackjack::Blackjack::process_move(session, payload, rng),
        GameType::Holdem => holdem::Holdem::process_move(session, payload, rng),
        GameType::Roulette => roulette::Roulette::process_move(session, payload, rng),
        GameType::Penalty => penalty::Penalty::process_move(session, payload, rng),
    };
    debug_assert!(session.state_blob.len() <= MAX_STATE_BLOB_LENGTH);
    result
}
