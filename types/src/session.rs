//! Round lifecycle types.

use serde::{Deserialize, Serialize};

/// Identifies one of the supported outcome engines.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GameType {
    /// Continuous-multiplier crash game ("aviator").
    Crash = 0,
    /// 3x3 weighted-reel slots with fixed paylines.
    PaylineSlots = 1,
    /// 5x6 cluster-pays slots with tumble cascades.
    ClusterSlots = 2,
    /// Grid-risk reveal game over a 25-tile board.
    Mines = 3,
    /// Hit/stand/double blackjack against a 6-deck shoe.
    Blackjack = 4,
    /// Fold/call hold'em against the dealer.
    Holdem = 5,
    /// Single-zero roulette with a multi-bet sheet.
    Roulette = 6,
    /// Penalty shootout with a fixed multiplier ladder.
    Penalty = 7,
}

impl GameType {
    /// All supported game types, in wire order.
    pub const ALL: [GameType; 8] = [
        GameType::Crash,
        GameType::PaylineSlots,
        GameType::ClusterSlots,
        GameType::Mines,
        GameType::Blackjack,
        GameType::Holdem,
        GameType::Roulette,
        GameType::Penalty,
    ];

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(GameType::Crash),
            1 => Some(GameType::PaylineSlots),
            2 => Some(GameType::ClusterSlots),
            3 => Some(GameType::Mines),
            4 => Some(GameType::Blackjack),
            5 => Some(GameType::Holdem),
            6 => Some(GameType::Roulette),
            7 => Some(GameType::Penalty),
            _ => None,
        }
    }
}

/// Lifecycle stage of a single round.
///
/// Transitions are one-directional: `Idle -> Active -> Resolved -> Idle`.
/// A new round may not start until the previous one is back at `Idle`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundState {
    #[default]
    Idle,
    Active,
    Resolved,
}

/// State for one round of one game.
///
/// The `state_blob` is an engine-private byte encoding; callers treat it
/// as opaque. `bet` is the total stake committed so far (it grows on
/// double-down or call actions).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSession {
    pub id: u64,
    pub game_type: GameType,
    pub bet: u64,
    pub state_blob: Vec<u8>,
    pub move_count: u32,
    pub created_at: u64,
    pub is_complete: bool,
}

impl GameSession {
    pub fn new(id: u64, game_type: GameType, bet: u64, created_at: u64) -> Self {
        Self {
            id,
            game_type,
            bet,
            state_blob: Vec::new(),
            move_count: 0,
            created_at,
            is_complete: false,
        }
    }
}

/// Final outcome of a resolved round.
///
/// `amount_won` is the total credit due to the player: stake plus
/// winnings on a win, exactly the stake on a push, and zero on a loss.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub amount_won: u64,
    pub multiplier_bps: u64,
    pub terminal: bool,
}

impl Settlement {
    /// A zero-credit settlement for a lost round.
    pub fn loss() -> Self {
        Self {
            amount_won: 0,
            multiplier_bps: 0,
            terminal: true,
        }
    }
}
