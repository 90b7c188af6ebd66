//! The table driver: wallet ordering, round lifecycle, and history.
//!
//! Engines compute outcomes; the table owns the money. The ordering
//! rules it enforces:
//!
//! - the stake is debited before any outcome is sampled, so a player can
//!   never see a result they could not pay for;
//! - a mid-round stake increase (double down, hold'em call) is rolled
//!   back wholesale if the extra debit fails: the session snapshot taken
//!   before the move is restored and the round continues as if the
//!   action was never made;
//! - the settlement credit happens exactly once, at the move that
//!   resolves the round, and the bet-history record is emitted in the
//!   same step.
//!
//! One round at a time: `Idle -> Active -> Resolved -> Idle`. Starting a
//! round while another is active is an error; a `Resolved` table rolls
//! forward to `Idle` on the next start.

use crate::fairness::{compute_commit, derive_round_seed};
use crate::games::registry::{GameConfig, GameRegistry};
use crate::games::{init_game, process_game_move, GameError, GameResult, GameRng};
use fortuna_types::constants::{MAX_BET, MULTIPLIER_BASE};
use fortuna_types::{BetRecord, GameSession, GameType, RoundState, Settlement};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from the wallet collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Balance too low to cover the requested debit.
    #[error("insufficient funds")]
    InsufficientFunds,
    /// Wallet backend unavailable or rejected the operation.
    #[error("ledger unavailable")]
    Unavailable,
}

/// Wallet collaborator: the table debits stakes and credits settlements,
/// nothing else. Implementations decide what a balance is.
///
/// Credits are infallible: winnings and refunds are always accepted.
/// Only a debit can be refused.
pub trait WalletLedger {
    fn debit(&mut self, amount: u64) -> Result<(), LedgerError>;
    fn credit(&mut self, amount: u64);
}

/// Receives one record per resolved round. Delivery is fire-and-forget;
/// the table does not fail a settlement over a history error.
pub trait BetHistoryRecorder {
    fn record(&mut self, record: BetRecord);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum TableError {
    /// A round is already active at this table.
    #[error("a round is already active")]
    RoundActive,
    /// No round to act on.
    #[error("no active round")]
    NoActiveRound,
    /// Game disabled in the registry.
    #[error("game not active")]
    GameNotActive,
    /// Stake outside the game's table limits.
    #[error("bet outside table limits")]
    BetOutOfRange,
    /// Wallet refused a debit.
    #[error("ledger: {0}")]
    Ledger(#[from] LedgerError),
    /// Engine rejected the action.
    #[error("game: {0}")]
    Game(#[from] GameError),
}

/// What the caller gets back from starting a round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundStart {
    pub session_id: u64,
    /// Fairness commitment for the round, published up front.
    pub commit: [u8; 32],
    pub logs: Vec<String>,
    /// Present when init already resolved the round (an opening natural).
    pub settlement: Option<Settlement>,
}

/// What the caller gets back from one move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    pub logs: Vec<String>,
    /// Present once the move resolved the round.
    pub settlement: Option<Settlement>,
    /// Round seed, disclosed at resolution for commit verification.
    pub reveal: Option<[u8; 32]>,
}

struct ActiveRound {
    session: GameSession,
    seed: [u8; 32],
    commit: [u8; 32],
}

/// A single-player table over one wallet and one history feed.
pub struct Table<L: WalletLedger, H: BetHistoryRecorder> {
    master_seed: [u8; 32],
    ledger: L,
    history: H,
    registry: GameRegistry,
    state: RoundState,
    round: Option<ActiveRound>,
    next_session_id: u64,
}

impl<L: WalletLedger, H: BetHistoryRecorder> Table<L, H> {
    pub fn new(master_seed: [u8; 32], ledger: L, history: H) -> Self {
        Self {
            master_seed,
            ledger,
            history,
            registry: GameRegistry::new(),
            state: RoundState::Idle,
            round: None,
            next_session_id: 1,
        }
    }

    pub fn round_state(&self) -> RoundState {
        self.state
    }

    pub fn registry(&self) -> &GameRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut GameRegistry {
        &mut self.registry
    }

    /// Fairness commitment of the round in progress.
    pub fn current_commit(&self) -> Option<[u8; 32]> {
        self.round.as_ref().map(|r| r.commit)
    }

    /// Debit the stake, then sample and deal the opening state.
    pub fn start_round(
        &mut self,
        game_type: GameType,
        bet: u64,
        timestamp: u64,
    ) -> Result<RoundStart, TableError> {
        if self.state == RoundState::Active {
            return Err(TableError::RoundActive);
        }
        if !self.registry.is_active(game_type) {
            return Err(TableError::GameNotActive);
        }
        let info = GameRegistry::get_info(game_type);
        if bet < info.min_bet || bet > info.max_bet || bet > MAX_BET {
            return Err(TableError::BetOutOfRange);
        }
        let config = self
            .registry
            .get_config(game_type)
            .copied()
            .unwrap_or_else(|| GameConfig::default_for(game_type));

        // Stake committed before the first draw.
        self.ledger.debit(bet)?;

        let session_id = self.next_session_id;
        let seed = derive_round_seed(&self.master_seed, session_id);
        let commit = compute_commit(&seed);
        let mut session = GameSession::new(session_id, game_type, bet, timestamp);
        let mut rng = GameRng::new(&seed, 0);

        let result = match init_game(&mut session, &config, &mut rng) {
            Ok(result) => result,
            Err(err) => {
                // Nothing was sampled against the player; hand the stake back.
                warn!(?game_type, %err, "round init failed, refunding stake");
                self.ledger.credit(bet);
                return Err(err.into());
            }
        };

        self.next_session_id += 1;
        debug!(session_id, ?game_type, bet, "round started");

        let logs = result.logs().to_vec();
        let round = ActiveRound {
            session,
            seed,
            commit,
        };

        if result.is_terminal() {
            // An init-resolved round (opening natural) settles in place.
            let settlement = self.settle(&round, &result)?;
            self.state = RoundState::Resolved;
            return Ok(RoundStart {
                session_id,
                commit,
                logs,
                settlement: Some(settlement),
            });
        }

        self.state = RoundState::Active;
        self.round = Some(round);
        Ok(RoundStart {
            session_id,
            commit,
            logs,
            settlement: None,
        })
    }

    /// Advance the active round by one player action.
    pub fn play(&mut self, payload: &[u8]) -> Result<MoveOutcome, TableError> {
        let mut round = self.round.take().ok_or(TableError::NoActiveRound)?;

        // Snapshot for rollback: a failed mid-round debit must leave the
        // round exactly as it was.
        let snapshot = round.session.clone();
        let move_index = round.session.move_count + 1;
        let mut rng = GameRng::new(&round.seed, move_index);

        let result = match process_game_move(&mut round.session, payload, &mut rng) {
            Ok(result) => result,
            Err(err) => {
                self.round = Some(round);
                return Err(err.into());
            }
        };
        let logs = result.logs().to_vec();

        match &result {
            GameResult::Continue(_) => {
                self.round = Some(round);
                Ok(MoveOutcome {
                    logs,
                    settlement: None,
                    reveal: None,
                })
            }
            GameResult::ContinueWithDebit(extra, _) => {
                if let Err(err) = self.ledger.debit(*extra) {
                    debug!(extra, %err, "mid-round debit refused, rolling back");
                    round.session = snapshot;
                    self.round = Some(round);
                    return Err(err.into());
                }
                debug!(extra, total = round.session.bet, "mid-round stake committed");
                self.round = Some(round);
                Ok(MoveOutcome {
                    logs,
                    settlement: None,
                    reveal: None,
                })
            }
            GameResult::Win(..) | GameResult::Loss(..) => {
                let settlement = self.settle(&round, &result)?;
                self.state = RoundState::Resolved;
                Ok(MoveOutcome {
                    logs,
                    settlement: Some(settlement),
                    reveal: Some(round.seed),
                })
            }
        }
    }

    /// Forfeit the active round: the stake stays with the house and a
    /// loss record is emitted.
    pub fn abandon(&mut self) -> Result<(), TableError> {
        let round = self.round.take().ok_or(TableError::NoActiveRound)?;
        info!(session_id = round.session.id, "round abandoned");
        self.history.record(BetRecord::from_settlement(
            round.session.game_type,
            round.session.bet,
            0,
            round.session.created_at,
        ));
        self.state = RoundState::Resolved;
        Ok(())
    }

    /// Credit the settlement exactly once and emit the history record.
    fn settle(
        &mut self,
        round: &ActiveRound,
        result: &GameResult,
    ) -> Result<Settlement, TableError> {
        let session = &round.session;
        let settlement = match result {
            GameResult::Win(amount, _) => {
                self.ledger.credit(*amount);
                let multiplier_bps = if session.bet == 0 {
                    0
                } else {
                    ((*amount as u128 * MULTIPLIER_BASE as u128) / session.bet as u128) as u64
                };
                Settlement {
                    amount_won: *amount,
                    multiplier_bps,
                    terminal: true,
                }
            }
            GameResult::Loss(_) => Settlement::loss(),
            _ => return Err(GameError::InvalidState.into()),
        };
        info!(
            session_id = session.id,
            game_type = ?session.game_type,
            wagered = session.bet,
            won = settlement.amount_won,
            "round settled"
        );
        self.history.record(BetRecord::from_settlement(
            session.game_type,
            session.bet,
            settlement.amount_won,
            session.created_at,
        ));
        Ok(settlement)
    }
}
