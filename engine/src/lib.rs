//! Outcome and payout engines for the fortuna casino games.
//!
//! Each game is an independent engine behind the [`games::CasinoGame`]
//! trait: it samples a random outcome from an injected, seeded RNG,
//! evaluates it against a static payout table, and reports a
//! [`games::GameResult`]. Engines never touch balances; the [`table`]
//! driver owns the wallet debit/credit ordering, the one-active-round
//! rule, and the bet-history feed.
//!
//! Determinism: given a master seed, a session id, and a move index,
//! every draw is reproducible. Timing (tick cadence, spin animations,
//! tumble delays) is a presentation concern and only gates when results
//! are shown, never what they are.

pub mod fairness;
pub mod games;
pub mod table;

pub use games::{init_game, process_game_move, GameError, GameResult, GameRng};
pub use table::{BetHistoryRecorder, LedgerError, Table, TableError, WalletLedger};
