//! Bet-history records delivered to the external recorder.

use crate::session::GameType;
use serde::{Deserialize, Serialize};

/// Win/loss classification of a resolved round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Loss,
}

/// One record per resolved round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetRecord {
    pub game: GameType,
    pub amount_wagered: u64,
    pub amount_won: u64,
    pub outcome: Outcome,
    pub timestamp: u64,
}

impl BetRecord {
    /// Build a record from settlement amounts. Any positive credit is a
    /// win; a zero credit is a loss by definition (a cash-out never pays
    /// zero).
    pub fn from_settlement(
        game: GameType,
        amount_wagered: u64,
        amount_won: u64,
        timestamp: u64,
    ) -> Self {
        let outcome = if amount_won > 0 {
            Outcome::Win
        } else {
            Outcome::Loss
        };
        Self {
            game,
            amount_wagered,
            amount_won,
            outcome,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_follows_credit() {
        let win = BetRecord::from_settlement(GameType::Roulette, 10, 360, 1);
        assert_eq!(win.outcome, Outcome::Win);

        let loss = BetRecord::from_settlement(GameType::Roulette, 10, 0, 1);
        assert_eq!(loss.outcome, Outcome::Loss);
    }
}
