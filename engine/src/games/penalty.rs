//! Penalty shootout ladder: pick a corner, beat the keeper, climb.
//!
//! The keeper dives to one of five spots uniformly; a shot scores
//! whenever the spots differ, so each rung is an 80% climb. The
//! multiplier ladder runs 1.92x, 3.84x, 7.68x, 15.36x, 30.72x; a save
//! forfeits everything, cashing out banks the current rung. Converting
//! the fifth shot force-banks the top rung (there is nothing left to
//! climb).
//!
//! State blob format:
//! [auto_cashout:u8] [goals:u8]
//!
//! Payload format:
//! [0, spot:u8] = Shoot at spot (0..5)
//! [1]          = Cash out (rejected before the first goal)

use super::blob::{BlobReader, BlobWriter};
use super::registry::GameConfig;
use super::{CasinoGame, GameError, GameResult, GameRng};
use fortuna_types::constants::MULTIPLIER_BASE;
use fortuna_types::GameSession;

/// Shot target spots.
pub const SPOTS: u8 = 5;

/// Multiplier after each converted shot, in basis points.
pub const LADDER_BPS: [u64; 5] = [19_200, 38_400, 76_800, 153_600, 307_200];

/// Keeper dive for one shot. Returns true when the shot is saved.
fn keeper_saves(rng: &mut GameRng, spot: u8) -> bool {
    rng.next_below(SPOTS as u64) as u8 == spot
}

fn ladder_payout(goals: u8, bet: u64) -> Result<u64, GameError> {
    let bps = LADDER_BPS
        .get(goals as usize - 1)
        .ok_or(GameError::InvalidState)?;
    let amount = (bet as u128)
        .checked_mul(*bps as u128)
        .ok_or(GameError::InvalidState)?
        / MULTIPLIER_BASE as u128;
    u64::try_from(amount).map_err(|_| GameError::InvalidState)
}

struct PenaltyState {
    auto_cashout: bool,
    goals: u8,
}

impl PenaltyState {
    fn parse(blob: &[u8]) -> Result<Self, GameError> {
        let mut reader = BlobReader::new(blob);
        let auto_cashout = reader.u8()? != 0;
        let goals = reader.u8()?;
        if goals as usize > LADDER_BPS.len() {
            return Err(GameError::InvalidState);
        }
        Ok(Self {
            auto_cashout,
            goals,
        })
    }

    fn serialize(&self) -> Vec<u8> {
        let mut writer = BlobWriter::with_capacity(2);
        writer.u8(self.auto_cashout as u8).u8(self.goals);
        writer.finish()
    }
}

pub struct Penalty;

impl CasinoGame for Penalty {
    fn init(
        session: &mut GameSession,
        config: &GameConfig,
        _rng: &mut GameRng,
    ) -> Result<GameResult, GameError> {
        let config = config.penalty();
        let state = PenaltyState {
            auto_cashout: config.auto_cashout_at_ladder_end,
            goals: 0,
        };
        session.state_blob = state.serialize();
        Ok(GameResult::Continue(vec![]))
    }

    fn process_move(
        session: &mut GameSession,
        payload: &[u8],
        rng: &mut GameRng,
    ) -> Result<GameResult, GameError> {
        if session.is_complete {
            return Err(GameError::RoundComplete);
        }
        let mut state = PenaltyState::parse(&session.state_blob)?;

        match payload {
            [0, spot] => {
                let spot = *spot;
                if spot >= SPOTS {
                    return Err(GameError::InvalidPayload);
                }
                if state.goals as usize >= LADDER_BPS.len() {
                    // Top of the ladder; only cashing out remains.
                    return Err(GameError::InvalidMove);
                }
                session.move_count += 1;

                if keeper_saves(rng, spot) {
                    session.state_blob = state.serialize();
                    session.is_complete = true;
                    return Ok(GameResult::Loss(vec![format!(
                        r#"{{"event":"saved","spot":{},"goals":{}}}"#,
                        spot, state.goals
                    )]));
                }

                state.goals += 1;
                let bps = LADDER_BPS[state.goals as usize - 1];

                if state.goals as usize == LADDER_BPS.len() && state.auto_cashout {
                    let amount = ladder_payout(state.goals, session.bet)?;
                    session.state_blob = state.serialize();
                    session.is_complete = true;
                    return Ok(GameResult::Win(
                        amount,
                        vec![format!(
                            r#"{{"event":"goal","spot":{},"goals":{},"multiplier_bps":{},"auto_cashout_payout":{}}}"#,
                            spot, state.goals, bps, amount
                        )],
                    ));
                }

                session.state_blob = state.serialize();
                Ok(GameResult::Continue(vec![format!(
                    r#"{{"event":"goal","spot":{},"goals":{},"multiplier_bps":{}}}"#,
                    spot, state.goals, bps
                )]))
            }
            [1] => {
                if state.goals == 0 {
                    return Err(GameError::InvalidMove);
                }
                session.move_count += 1;
                let amount = ladder_payout(state.goals, session.bet)?;
                session.is_complete = true;
                Ok(GameResult::Win(
                    amount,
                    vec![format!(
                        r#"{{"event":"cashout","goals":{},"payout":{}}}"#,
                        state.goals, amount
                    )],
                ))
            }
            _ => Err(GameError::InvalidPayload),
        }
    }
}
