//! Playing-card helpers shared by the card engines.
//!
//! Cards are encoded as `0..=51`:
//! - suit = card / 13 (0..=3)
//! - rank = card % 13, where 0 is Ace and 12 is King.
//!
//! Blackjack totals count Ace as 11 until the hand would bust; hold'em
//! comparisons treat Ace as high (14) except in the wheel straight.

/// Total cards in a standard deck.
pub const CARDS_PER_DECK: u8 = 52;

/// Ranks per suit.
pub const RANKS_PER_SUIT: u8 = 13;

/// Shoe size used by the blackjack engine.
pub const BLACKJACK_DECKS: u8 = 6;

/// Returns the 1-based rank (1..=13), where 1 is Ace and 13 is King.
pub fn rank_one_based(card: u8) -> u8 {
    card % RANKS_PER_SUIT + 1
}

/// Returns the rank for comparisons (2..=14), Ace high.
pub fn rank_ace_high(card: u8) -> u8 {
    let r = rank_one_based(card);
    if r == 1 {
        14
    } else {
        r
    }
}

/// Returns the suit (0..=3).
pub fn suit(card: u8) -> u8 {
    card / RANKS_PER_SUIT
}

/// Blackjack face value of a single card: Ace is 11 here (the hand total
/// demotes aces as needed), face cards are 10.
pub fn blackjack_value(card: u8) -> u8 {
    match rank_one_based(card) {
        1 => 11,
        r if r >= 10 => 10,
        r => r,
    }
}

/// Best blackjack total for a hand, demoting aces from 11 to 1 one at a
/// time while the total busts.
pub fn blackjack_total(hand: &[u8]) -> u8 {
    let mut total: u16 = hand.iter().map(|&c| blackjack_value(c) as u16).sum();
    let mut soft_aces = hand.iter().filter(|&&c| rank_one_based(c) == 1).count();
    while total > 21 && soft_aces > 0 {
        total -= 10;
        soft_aces -= 1;
    }
    total.min(u8::MAX as u16) as u8
}

/// True when the two-card hand is a natural blackjack.
pub fn is_natural(hand: &[u8]) -> bool {
    hand.len() == 2 && blackjack_total(hand) == 21
}
