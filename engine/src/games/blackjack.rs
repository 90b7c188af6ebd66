//! Six-deck blackjack against a dealer who stands on all 17s.
//!
//! The player is dealt two cards and the dealer one face-up card; the
//! dealer's hole card is only drawn when the hand resolves, so the state
//! blob never holds information the player should not have. A natural
//! on the opening deal resolves the round at init (3:2 payout, push if
//! the dealer also turns over a natural).
//!
//! Doubling down is a two-step exchange with the table driver: the
//! double move draws the one extra card and asks for the additional
//! stake via `ContinueWithDebit`; the follow-up stand resolves the hand.
//! A failed debit rolls the session back before the draw is ever seen.
//!
//! State blob format:
//! [decks:u8] [stage:u8] [player_count:u8] [player cards...]
//! [dealer_count:u8] [dealer cards...]
//!
//! Payload format:
//! [0] = Hit
//! [1] = Stand (also finishes a doubled hand)
//! [2] = Double down (first action only)

use super::blob::{BlobReader, BlobWriter};
use super::cards::{blackjack_total, is_natural};
use super::logging::format_card_list;
use super::registry::GameConfig;
use super::{CasinoGame, GameError, GameResult, GameRng};
use fortuna_types::GameSession;

const STAGE_PLAYER_TURN: u8 = 0;
const STAGE_DOUBLED: u8 = 1;

struct BlackjackState {
    decks: u8,
    stage: u8,
    player: Vec<u8>,
    dealer: Vec<u8>,
}

impl BlackjackState {
    fn parse(blob: &[u8]) -> Result<Self, GameError> {
        let mut reader = BlobReader::new(blob);
        let decks = reader.u8()?;
        let stage = reader.u8()?;
        let player_count = reader.u8()? as usize;
        let player = reader.bytes(player_count)?.to_vec();
        let dealer_count = reader.u8()? as usize;
        let dealer = reader.bytes(dealer_count)?.to_vec();
        if decks == 0 || stage > STAGE_DOUBLED || player.len() < 2 || dealer.is_empty() {
            return Err(GameError::InvalidState);
        }
        Ok(Self {
            decks,
            stage,
            player,
            dealer,
        })
    }

    fn serialize(&self) -> Vec<u8> {
        let mut writer =
            BlobWriter::with_capacity(4 + self.player.len() + self.dealer.len());
        writer
            .u8(self.decks)
            .u8(self.stage)
            .u8(self.player.len() as u8)
            .bytes(&self.player)
            .u8(self.dealer.len() as u8)
            .bytes(&self.dealer);
        writer.finish()
    }

    /// Rebuild the undealt portion of the shoe. Dealt cards are removed
    /// one instance each, so duplicates across decks stay drawable.
    fn remaining_shoe(&self, rng: &mut GameRng) -> Vec<u8> {
        let mut shoe = rng.create_shoe(self.decks);
        for &card in self.player.iter().chain(self.dealer.iter()) {
            if let Some(pos) = shoe.iter().position(|&c| c == card) {
                shoe.swap_remove(pos);
            }
        }
        shoe
    }

    fn draw(&self, shoe: &mut Vec<u8>, rng: &mut GameRng) -> Result<u8, GameError> {
        rng.draw_card(shoe).ok_or(GameError::DeckExhausted)
    }
}

fn payout_natural(bet: u64) -> u64 {
    ((bet as u128 * 5) / 2) as u64
}

fn payout_win(bet: u64) -> u64 {
    bet.saturating_mul(2)
}

/// Dealer draws to 17, standing on soft 17s as well.
fn dealer_play(
    state: &mut BlackjackState,
    shoe: &mut Vec<u8>,
    rng: &mut GameRng,
) -> Result<(), GameError> {
    while blackjack_total(&state.dealer) < 17 {
        let card = state.draw(shoe, rng)?;
        state.dealer.push(card);
    }
    Ok(())
}

fn settle(state: &BlackjackState, session: &mut GameSession) -> GameResult {
    let player_total = blackjack_total(&state.player);
    let dealer_total = blackjack_total(&state.dealer);
    let log = format!(
        r#"{{"event":"settle","player":[{}],"dealer":[{}],"player_total":{},"dealer_total":{}}}"#,
        format_card_list(&state.player),
        format_card_list(&state.dealer),
        player_total,
        dealer_total
    );
    session.is_complete = true;
    if dealer_total > 21 || player_total > dealer_total {
        GameResult::Win(payout_win(session.bet), vec![log])
    } else if player_total == dealer_total {
        GameResult::Win(session.bet, vec![log])
    } else {
        GameResult::Loss(vec![log])
    }
}

pub struct Blackjack;

impl CasinoGame for Blackjack {
    fn init(
        session: &mut GameSession,
        config: &GameConfig,
        rng: &mut GameRng,
    ) -> Result<GameResult, GameError> {
        let config = config.blackjack();
        if config.decks == 0 {
            return Err(GameError::InvalidState);
        }
        let mut shoe = rng.create_shoe(config.decks);
        let mut state = BlackjackState {
            decks: config.decks,
            stage: STAGE_PLAYER_TURN,
            player: Vec::with_capacity(8),
            dealer: Vec::with_capacity(8),
        };
        state.player.push(state.draw(&mut shoe, rng)?);
        state.player.push(state.draw(&mut shoe, rng)?);
        state.dealer.push(state.draw(&mut shoe, rng)?);

        if is_natural(&state.player) {
            // Turn the hole card at once; the round is decided either way.
            let hole = state.draw(&mut shoe, rng)?;
            state.dealer.push(hole);
            session.state_blob = state.serialize();
            session.is_complete = true;
            let log = format!(
                r#"{{"event":"natural","player":[{}],"dealer":[{}]}}"#,
                format_card_list(&state.player),
                format_card_list(&state.dealer)
            );
            return Ok(if is_natural(&state.dealer) {
                GameResult::Win(session.bet, vec![log])
            } else {
                GameResult::Win(payout_natural(session.bet), vec![log])
            });
        }

        let log = format!(
            r#"{{"event":"deal","player":[{}],"dealer":[{}]}}"#,
            format_card_list(&state.player),
            format_card_list(&state.dealer)
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
        let mut state = BlackjackState::parse(&session.state_blob)?;
        let mut shoe = state.remaining_shoe(rng);

        match payload[0] {
            0 => {
                if state.stage != STAGE_PLAYER_TURN {
                    return Err(GameError::InvalidMove);
                }
                let card = state.draw(&mut shoe, rng)?;
                state.player.push(card);
                session.move_count += 1;
                let total = blackjack_total(&state.player);
                session.state_blob = state.serialize();
                if total > 21 {
                    session.is_complete = true;
                    Ok(GameResult::Loss(vec![format!(
                        r#"{{"event":"bust","card":{},"total":{}}}"#,
                        card, total
                    )]))
                } else {
                    Ok(GameResult::Continue(vec![format!(
                        r#"{{"event":"hit","card":{},"total":{}}}"#,
                        card, total
                    )]))
                }
            }
            1 => {
                if blackjack_total(&state.player) > 21 {
                    // A doubled hand that busted still has to be closed out;
                    // the dealer does not play into a dead hand.
                    session.move_count += 1;
                    session.state_blob = state.serialize();
                    session.is_complete = true;
                    return Ok(GameResult::Loss(vec![format!(
                        r#"{{"event":"bust","card":{},"total":{}}}"#,
                        state.player[state.player.len() - 1],
                        blackjack_total(&state.player)
                    )]));
                }
                dealer_play(&mut state, &mut shoe, rng)?;
                session.move_count += 1;
                session.state_blob = state.serialize();
                Ok(settle(&state, session))
            }
            2 => {
                if state.stage != STAGE_PLAYER_TURN || state.player.len() != 2 {
                    return Err(GameError::InvalidMove);
                }
                let extra = session.bet;
                let card = state.draw(&mut shoe, rng)?;
                state.player.push(card);
                state.stage = STAGE_DOUBLED;
                session.move_count += 1;
                session.bet = session.bet.checked_mul(2).ok_or(GameError::InvalidState)?;
                session.state_blob = state.serialize();
                Ok(GameResult::ContinueWithDebit(
                    extra,
                    vec![format!(
                        r#"{{"event":"double","card":{},"total":{}}}"#,
                        card,
                        blackjack_total(&state.player)
                    )],
                ))
            }
            _ => Err(GameError::InvalidPayload),
        }
    }
}
