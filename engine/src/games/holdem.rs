//! Heads-up casino hold'em: ante in, see two hole cards and the flop,
//! then fold or call. The call costs twice the ante; the showdown runs
//! the turn and river, deals the dealer's hand, and compares the best
//! five of seven on each side.
//!
//! A winning showdown pays double the total stake (ante plus call); a
//! tie refunds it. The dealer's cards are only drawn at showdown so the
//! state blob never holds a hand the player could peek at.
//!
//! State blob format:
//! [stage:u8] [call_multiple:u8] [player:2 cards] [board_count:u8]
//! [board cards...]
//!
//! Payload format:
//! [0] = Fold (forfeits the ante)
//! [1] = Call (driver debits 2x ante)
//! [2] = Showdown (only after the call is committed)

use super::blob::{BlobReader, BlobWriter};
use super::cards::{rank_ace_high, suit};
use super::logging::format_card_list;
use super::registry::GameConfig;
use super::{CasinoGame, GameError, GameResult, GameRng};
use fortuna_types::GameSession;

const STAGE_DECIDE: u8 = 0;
const STAGE_CALLED: u8 = 1;

/// Hand categories, weakest first. The derived ordering on
/// [`HandValue`] compares category, then kickers.
pub mod category {
    pub const HIGH_CARD: u8 = 0;
    pub const PAIR: u8 = 1;
    pub const TWO_PAIR: u8 = 2;
    pub const TRIPS: u8 = 3;
    pub const STRAIGHT: u8 = 4;
    pub const FLUSH: u8 = 5;
    pub const FULL_HOUSE: u8 = 6;
    pub const QUADS: u8 = 7;
    pub const STRAIGHT_FLUSH: u8 = 8;
}

/// Comparable strength of a five-card hand: category, then up to five
/// tiebreak ranks in significance order (ace high = 14).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct HandValue {
    pub category: u8,
    pub ranks: [u8; 5],
}

/// If the (descending, unique) ranks form a straight, its high card.
/// The wheel A-2-3-4-5 counts with high card 5.
fn straight_high(ranks_desc: &[u8]) -> Option<u8> {
    if ranks_desc.len() < 5 {
        return None;
    }
    for window in ranks_desc.windows(5) {
        if window[0] - window[4] == 4 {
            return Some(window[0]);
        }
    }
    // Wheel: ace plays low below the 5.
    if ranks_desc[0] == 14 && ranks_desc[ranks_desc.len() - 4..] == [5, 4, 3, 2] {
        return Some(5);
    }
    None
}

/// Evaluate exactly five cards.
pub fn eval_five(cards: &[u8; 5]) -> HandValue {
    let mut ranks: Vec<u8> = cards.iter().map(|&c| rank_ace_high(c)).collect();
    ranks.sort_unstable_by(|a, b| b.cmp(a));
    let is_flush = cards.iter().all(|&c| suit(c) == suit(cards[0]));

    let mut unique: Vec<u8> = ranks.clone();
    unique.dedup();
    let straight = straight_high(&unique);

    if let Some(high) = straight {
        if unique.len() == 5 {
            let category = if is_flush {
                category::STRAIGHT_FLUSH
            } else {
                category::STRAIGHT
            };
            return HandValue {
                category,
                ranks: [high, 0, 0, 0, 0],
            };
        }
    }

    // Group ranks by multiplicity, most copies first, then rank.
    let mut groups: Vec<(u8, u8)> = Vec::new(); // (count, rank)
    for &rank in &unique {
        let count = ranks.iter().filter(|&&r| r == rank).count() as u8;
        groups.push((count, rank));
    }
    groups.sort_unstable_by(|a, b| b.cmp(a));

    let mut tiebreak = [0u8; 5];
    let mut idx = 0;
    for &(count, rank) in &groups {
        for _ in 0..count {
            if idx < 5 {
                tiebreak[idx] = rank;
                idx += 1;
            }
        }
    }

    let category = match (groups[0].0, groups.get(1).map(|g| g.0).unwrap_or(0)) {
        (4, _) => category::QUADS,
        (3, 2) => category::FULL_HOUSE,
        _ if is_flush => category::FLUSH,
        (3, _) => category::TRIPS,
        (2, 2) => category::TWO_PAIR,
        (2, _) => category::PAIR,
        _ => category::HIGH_CARD,
    };

    HandValue {
        category,
        ranks: tiebreak,
    }
}

/// Best five-card hand out of seven cards.
pub fn best_of_seven(cards: &[u8; 7]) -> HandValue {
    let mut best: Option<HandValue> = None;
    // Drop every pair of indexes; 21 combinations.
    for skip_a in 0..7 {
        for skip_b in (skip_a + 1)..7 {
            let mut five = [0u8; 5];
            let mut idx = 0;
            for (pos, &card) in cards.iter().enumerate() {
                if pos != skip_a && pos != skip_b {
                    five[idx] = card;
                    idx += 1;
                }
            }
            let value = eval_five(&five);
            if best.map_or(true, |b| value > b) {
                best = Some(value);
            }
        }
    }
    best.unwrap_or(HandValue {
        category: category::HIGH_CARD,
        ranks: [0; 5],
    })
}

struct HoldemState {
    stage: u8,
    call_multiple: u8,
    player: [u8; 2],
    board: Vec<u8>,
}

impl HoldemState {
    fn parse(blob: &[u8]) -> Result<Self, GameError> {
        let mut reader = BlobReader::new(blob);
        let stage = reader.u8()?;
        let call_multiple = reader.u8()?;
        let player_cards = reader.bytes(2)?;
        let board_count = reader.u8()? as usize;
        let board = reader.bytes(board_count)?.to_vec();
        if stage > STAGE_CALLED || call_multiple == 0 || board.len() < 3 || board.len() > 5 {
            return Err(GameError::InvalidState);
        }
        Ok(Self {
            stage,
            call_multiple,
            player: [player_cards[0], player_cards[1]],
            board,
        })
    }

    fn serialize(&self) -> Vec<u8> {
        let mut writer = BlobWriter::with_capacity(5 + self.board.len());
        writer
            .u8(self.stage)
            .u8(self.call_multiple)
            .bytes(&self.player)
            .u8(self.board.len() as u8)
            .bytes(&self.board);
        writer.finish()
    }

    fn remaining_shoe(&self, rng: &mut GameRng) -> Vec<u8> {
        let mut shoe = rng.create_shoe(1);
        for &card in self.player.iter().chain(self.board.iter()) {
            if let Some(pos) = shoe.iter().position(|&c| c == card) {
                shoe.swap_remove(pos);
            }
        }
        shoe
    }
}

pub struct Holdem;

impl CasinoGame for Holdem {
    fn init(
        session: &mut GameSession,
        config: &GameConfig,
        rng: &mut GameRng,
    ) -> Result<GameResult, GameError> {
        let config = config.holdem();
        if config.call_multiple == 0 {
            return Err(GameError::InvalidState);
        }
        let mut shoe = rng.create_shoe(1);
        let mut draw = |rng: &mut GameRng, shoe: &mut Vec<u8>| {
            rng.draw_card(shoe).ok_or(GameError::DeckExhausted)
        };
        let player = [draw(rng, &mut shoe)?, draw(rng, &mut shoe)?];
        let board = vec![
            draw(rng, &mut shoe)?,
            draw(rng, &mut shoe)?,
            draw(rng, &mut shoe)?,
        ];
        let state = HoldemState {
            stage: STAGE_DECIDE,
            call_multiple: config.call_multiple,
            player,
            board,
        };
        let log = format!(
            r#"{{"event":"deal","player":[{}],"flop":[{}]}}"#,
            format_card_list(&state.player),
            format_card_list(&state.board)
        );
        session.state_blob = state.serialize();
        Ok(GameResult::Continue(vec![log]))
    }

    fn process_move(
        session: &mut GameSession,
        payload: &[u8],
        rng: &mut GameRng,
    ) -> Result<GameResult, GameError> {
        if session.is_complete {
            return Err(GameError::RoundComplete);
        }
        if payload.len() != 1 {
            return Err(GameError::InvalidPayload);
        }
        let mut state = HoldemState::parse(&session.state_blob)?;

        match payload[0] {
            0 => {
                if state.stage != STAGE_DECIDE {
                    return Err(GameError::InvalidMove);
                }
                session.move_count += 1;
                session.is_complete = true;
                Ok(GameResult::Loss(vec![format!(
                    r#"{{"event":"fold","player":[{}]}}"#,
                    format_card_list(&state.player)
                )]))
            }
            1 => {
                if state.stage != STAGE_DECIDE {
                    return Err(GameError::InvalidMove);
                }
                let ante = session.bet;
                let call = ante
                    .checked_mul(state.call_multiple as u64)
                    .ok_or(GameError::InvalidState)?;
                state.stage = STAGE_CALLED;
                session.move_count += 1;
                session.bet = ante.checked_add(call).ok_or(GameError::InvalidState)?;
                session.state_blob = state.serialize();
                Ok(GameResult::ContinueWithDebit(
                    call,
                    vec![format!(r#"{{"event":"call","amount":{}}}"#, call)],
                ))
            }
            2 => {
                if state.stage != STAGE_CALLED {
                    return Err(GameError::InvalidMove);
                }
                let mut shoe = state.remaining_shoe(rng);
                let mut draw = |rng: &mut GameRng, shoe: &mut Vec<u8>| {
                    rng.draw_card(shoe).ok_or(GameError::DeckExhausted)
                };
                while state.board.len() < 5 {
                    let card = draw(rng, &mut shoe)?;
                    state.board.push(card);
                }
                let dealer = [draw(rng, &mut shoe)?, draw(rng, &mut shoe)?];

                let mut player_seven = [0u8; 7];
                player_seven[..2].copy_from_slice(&state.player);
                player_seven[2..].copy_from_slice(&state.board);
                let mut dealer_seven = [0u8; 7];
                dealer_seven[..2].copy_from_slice(&dealer);
                dealer_seven[2..].copy_from_slice(&state.board);

                let player_value = best_of_seven(&player_seven);
                let dealer_value = best_of_seven(&dealer_seven);

                session.move_count += 1;
                session.state_blob = state.serialize();
                session.is_complete = true;

                let log = format!(
                    r#"{{"event":"showdown","board":[{}],"dealer":[{}],"player_category":{},"dealer_category":{}}}"#,
                    format_card_list(&state.board),
                    format_card_list(&dealer),
                    player_value.category,
                    dealer_value.category
                );

                if player_value > dealer_value {
                    let amount = session
                        .bet
                        .checked_mul(2)
                        .ok_or(GameError::InvalidState)?;
                    Ok(GameResult::Win(amount, vec![log]))
                } else if player_value == dealer_value {
                    Ok(GameResult::Win(session.bet, vec![log]))
                } else {
                    Ok(GameResult::Loss(vec![log]))
                }
            }
            _ => Err(GameError::InvalidPayload),
        }
    }
}
