//! Common types shared by the fortuna outcome engines and their callers.
//!
//! The engine crate owns the game math; this crate owns the vocabulary:
//! game identifiers, the per-round session record, settlements, and the
//! bet-history record handed to external collaborators.

pub mod constants;
mod history;
mod session;

pub use history::{BetRecord, Outcome};
pub use session::{GameSession, GameType, RoundState, Settlement};
