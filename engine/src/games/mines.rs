//! Grid-risk game on a 5x5 board: a fixed set of bombs is hidden at
//! round start, the player reveals tiles one by one, and may cash out
//! after any safe reveal. Each safe reveal raises the multiplier to
//! `house_edge / P(k)`, where `P(k)` is the probability of surviving
//! `k` picks. Revealing every safe tile forces the cash-out at the top
//! multiplier.
//!
//! State blob format:
//! [house_edge_bps:u32] [bombs:u8] [bomb_mask:u32] [revealed_mask:u32]
//!
//! Payload format:
//! [0, tile:u8] = Reveal tile (0..25)
//! [1]          = Cash out (rejected before the first reveal)

use super::blob::{BlobReader, BlobWriter};
use super::logging::format_index_list;
use super::registry::GameConfig;
use super::{CasinoGame, GameError, GameResult, GameRng};
use fortuna_types::constants::{MINES_GRID_SIZE, MULTIPLIER_BASE};
use fortuna_types::GameSession;

const TILES: u8 = MINES_GRID_SIZE;

/// Multiplier after `revealed` safe picks with `bombs` bombs hidden, in
/// basis points. Zero picks is exactly 1.00x: nothing has been risked.
///
/// The fair multiplier is `1 / P(k)` with
/// `P(k) = C(25 - b, k) / C(25, k)`; the house keeps `1 -
/// house_edge_bps / 10_000` of it. Computed as a running product so no
/// factorial overflows. The ladder must be strictly increasing in `k`:
/// on a one-bomb board the edge pushes the raw first rung below even
/// money (0.95 * 25/24 = 0.9895), so each rung is floored one step per
/// reveal above the base.
pub fn multiplier_bps(revealed: u32, bombs: u8, house_edge_bps: u16) -> u64 {
    if revealed == 0 {
        return MULTIPLIER_BASE;
    }
    let safe_tiles = MINES_GRID_SIZE as u32 - bombs as u32;
    let mut ratio = 1.0f64;
    for i in 0..revealed.min(safe_tiles) {
        ratio *= (MINES_GRID_SIZE as u32 - i) as f64 / (safe_tiles - i) as f64;
    }
    let bps = (house_edge_bps as f64 * ratio).floor() as u64;
    bps.max(MULTIPLIER_BASE + revealed as u64)
}

struct MinesState {
    house_edge_bps: u16,
    bombs: u8,
    bomb_mask: u32,
    revealed_mask: u32,
}

impl MinesState {
    fn parse(blob: &[u8]) -> Result<Self, GameError> {
        let mut reader = BlobReader::new(blob);
        let state = Self {
            house_edge_bps: reader.u32()? as u16,
            bombs: reader.u8()?,
            bomb_mask: reader.u32()?,
            revealed_mask: reader.u32()?,
        };
        if state.bombs == 0 || state.bombs >= TILES {
            return Err(GameError::InvalidState);
        }
        Ok(state)
    }

    fn serialize(&self) -> Vec<u8> {
        let mut writer = BlobWriter::with_capacity(13);
        writer
            .u32(self.house_edge_bps as u32)
            .u8(self.bombs)
            .u32(self.bomb_mask)
            .u32(self.revealed_mask);
        writer.finish()
    }

    fn revealed_count(&self) -> u32 {
        self.revealed_mask.count_ones()
    }

    fn safe_tiles(&self) -> u32 {
        MINES_GRID_SIZE as u32 - self.bombs as u32
    }
}

/// Sample `bombs` distinct tiles by partial Fisher-Yates shuffle.
fn sample_bomb_mask(rng: &mut GameRng, bombs: u8) -> u32 {
    let mut tiles: Vec<u8> = (0..TILES).collect();
    let mut mask = 0u32;
    for i in 0..bombs as usize {
        let remaining = (tiles.len() - i) as u64;
        let pick = i + rng.next_below(remaining) as usize;
        tiles.swap(i, pick);
        mask |= 1 << tiles[i];
    }
    mask
}

fn settle(state: &MinesState, bet: u64) -> Result<u64, GameError> {
    let bps = multiplier_bps(state.revealed_count(), state.bombs, state.house_edge_bps);
    let amount = (bet as u128)
        .checked_mul(bps as u128)
        .ok_or(GameError::InvalidState)?
        / MULTIPLIER_BASE as u128;
    u64::try_from(amount).map_err(|_| GameError::InvalidState)
}

pub struct Mines;

impl CasinoGame for Mines {
    fn init(
        session: &mut GameSession,
        config: &GameConfig,
        rng: &mut GameRng,
    ) -> Result<GameResult, GameError> {
        let config = config.mines();
        if config.default_bombs == 0 || config.default_bombs >= TILES {
            return Err(GameError::InvalidState);
        }
        let state = MinesState {
            house_edge_bps: config.house_edge_bps,
            bombs: config.default_bombs,
            bomb_mask: sample_bomb_mask(rng, config.default_bombs),
            revealed_mask: 0,
        };
        session.state_blob = state.serialize();
        Ok(GameResult::Continue(vec![format!(
            r#"{{"event":"armed","bombs":{}}}"#,
            config.default_bombs
        )]))
    }

    fn process_move(
        session: &mut GameSession,
        payload: &[u8],
        _rng: &mut GameRng, // board is fixed at init; moves draw nothing
    ) -> Result<GameResult, GameError> {
        if session.is_complete {
            return Err(GameError::RoundComplete);
        }
        let mut state = MinesState::parse(&session.state_blob)?;

        match payload {
            [0, tile] => {
                let tile = *tile;
                if tile >= TILES {
                    return Err(GameError::InvalidPayload);
                }
                let bit = 1u32 << tile;
                if state.revealed_mask & bit != 0 {
                    return Err(GameError::InvalidMove);
                }
                session.move_count += 1;

                if state.bomb_mask & bit != 0 {
                    state.revealed_mask |= bit;
                    session.state_blob = state.serialize();
                    session.is_complete = true;
                    let bombs: Vec<usize> = (0..TILES)
                        .filter(|&t| state.bomb_mask & (1 << t) != 0)
                        .map(|t| t as usize)
                        .collect();
                    return Ok(GameResult::Loss(vec![format!(
                        r#"{{"event":"boom","tile":{},"bombs":[{}]}}"#,
                        tile,
                        format_index_list(&bombs)
                    )]));
                }

                state.revealed_mask |= bit;
                let revealed = state.revealed_count();
                let bps = multiplier_bps(revealed, state.bombs, state.house_edge_bps);

                if revealed == state.safe_tiles() {
                    // Board cleared: forced cash-out at the top rung.
                    let amount = settle(&state, session.bet)?;
                    session.state_blob = state.serialize();
                    session.is_complete = true;
                    return Ok(GameResult::Win(
                        amount,
                        vec![format!(
                            r#"{{"event":"cleared","tile":{},"multiplier_bps":{},"payout":{}}}"#,
                            tile, bps, amount
                        )],
                    ));
                }

                session.state_blob = state.serialize();
                Ok(GameResult::Continue(vec![format!(
                    r#"{{"event":"safe","tile":{},"revealed":{},"multiplier_bps":{}}}"#,
                    tile, revealed, bps
                )]))
            }
            [1] => {
                if state.revealed_count() == 0 {
                    // Nothing risked yet; a refund here would be a free
                    // round-trip through the ledger.
                    return Err(GameError::InvalidMove);
                }
                session.move_count += 1;
                let bps =
                    multiplier_bps(state.revealed_count(), state.bombs, state.house_edge_bps);
                let amount = settle(&state, session.bet)?;
                session.is_complete = true;
                Ok(GameResult::Win(
                    amount,
                    vec![format!(
                        r#"{{"event":"cashout","revealed":{},"multiplier_bps":{},"payout":{}}}"#,
                        state.revealed_count(),
                        bps,
                        amount
                    )],
                ))
            }
            _ => Err(GameError::InvalidPayload),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil::*;
    use super::*;
    use fortuna_types::GameType;

    fn forced_session(bombs: u8, bomb_mask: u32, revealed_mask: u32, bet: u64) -> GameSession {
        let mut session = test_session(GameType::Mines, bet);
        session.state_blob = MinesState {
            house_edge_bps: 9_500,
            bombs,
            bomb_mask,
            revealed_mask,
        }
        .serialize();
        session
    }

    #[test]
    fn zero_reveals_is_even_money() {
        assert_eq!(multiplier_bps(0, 3, 9_500), MULTIPLIER_BASE);
    }

    #[test]
    fn first_reveal_multiplier_exact() {
        // 3 bombs: 0.95 * 25/22 = 1.0795.. -> 10_795 bps.
        assert_eq!(multiplier_bps(1, 3, 9_500), 10_795);
    }

    #[test]
    fn one_bomb_first_rung_beats_even_money() {
        // Raw 0.95 * 25/24 lands at 9_895 bps; the floor keeps the first
        // rung above the pre-reveal base.
        assert!(multiplier_bps(1, 1, 9_500) > multiplier_bps(0, 1, 9_500));
        assert_eq!(multiplier_bps(1, 1, 9_500), MULTIPLIER_BASE + 1);
        // The second rung clears the floor on its own: 0.95 * 25/23.
        assert_eq!(multiplier_bps(2, 1, 9_500), 10_326);
    }

    #[test]
    fn multiplier_strictly_increases() {
        for bombs in [1u8, 3, 10, 24] {
            let safe = MINES_GRID_SIZE as u32 - bombs as u32;
            let mut previous = multiplier_bps(0, bombs, 9_500);
            for k in 1..=safe {
                let current = multiplier_bps(k, bombs, 9_500);
                assert!(
                    current > previous,
                    "bombs={} k={}: {} <= {}",
                    bombs,
                    k,
                    current,
                    previous
                );
                previous = current;
            }
        }
    }

    #[test]
    fn init_hides_requested_bomb_count() {
        let seed = test_seed(40);
        let mut session = test_session(GameType::Mines, 100);
        let mut rng = GameRng::new(&seed, 0);
        Mines::init(&mut session, &GameConfig::default_for(GameType::Mines), &mut rng)
            .expect("init");
        let state = MinesState::parse(&session.state_blob).expect("state");
        assert_eq!(state.bombs, 3);
        assert_eq!(state.bomb_mask.count_ones(), 3);
        assert_eq!(state.revealed_mask, 0);
    }

    #[test]
    fn cashout_before_any_reveal_rejected() {
        let mut session = forced_session(3, 0b111, 0, 100);
        let seed = test_seed(41);
        let mut rng = GameRng::new(&seed, 1);
        assert_eq!(
            Mines::process_move(&mut session, &[1], &mut rng),
            Err(GameError::InvalidMove)
        );
        assert!(!session.is_complete);
    }

    #[test]
    fn revealing_a_bomb_loses() {
        let mut session = forced_session(3, 0b111, 0, 100);
        let seed = test_seed(42);
        let mut rng = GameRng::new(&seed, 1);
        let result = Mines::process_move(&mut session, &[0, 1], &mut rng).expect("reveal");
        assert!(matches!(result, GameResult::Loss(_)));
        assert!(session.is_complete);
    }

    #[test]
    fn safe_reveal_then_cashout_pays_table_value() {
        // Bombs on tiles 0..3; reveal tile 5, then cash out.
        let mut session = forced_session(3, 0b111, 0, 100);
        let seed = test_seed(43);
        let mut rng = GameRng::new(&seed, 1);
        let result = Mines::process_move(&mut session, &[0, 5], &mut rng).expect("reveal");
        assert!(matches!(result, GameResult::Continue(_)));

        let mut rng = GameRng::new(&seed, 2);
        let result = Mines::process_move(&mut session, &[1], &mut rng).expect("cashout");
        // 100 * 10_795 / 10_000 = 107.
        match result {
            GameResult::Win(amount, _) => assert_eq!(amount, 107),
            other => panic!("expected win, got {:?}", other),
        }
        assert!(session.is_complete);
    }

    #[test]
    fn clearing_the_board_forces_top_cashout() {
        // 23 bombs, tiles 0 and 1 safe.
        let bomb_mask = ((1u64 << 25) - 1) as u32 & !0b11;
        let mut session = forced_session(23, bomb_mask, 0, 10);
        let seed = test_seed(44);

        let mut rng = GameRng::new(&seed, 1);
        let result = Mines::process_move(&mut session, &[0, 0], &mut rng).expect("reveal");
        assert!(matches!(result, GameResult::Continue(_)));

        let mut rng = GameRng::new(&seed, 2);
        let result = Mines::process_move(&mut session, &[0, 1], &mut rng).expect("reveal");
        let expected_bps = multiplier_bps(2, 23, 9_500);
        let expected = 10u64 * expected_bps / MULTIPLIER_BASE;
        match result {
            GameResult::Win(amount, _) => assert_eq!(amount, expected),
            other => panic!("expected forced cash-out, got {:?}", other),
        }
        assert!(session.is_complete);
    }

    #[test]
    fn double_reveal_rejected() {
        let mut session = forced_session(3, 0b111, 0, 100);
        let seed = test_seed(45);
        let mut rng = GameRng::new(&seed, 1);
        Mines::process_move(&mut session, &[0, 5], &mut rng).expect("reveal");
        let mut rng = GameRng::new(&seed, 2);
        assert_eq!(
            Mines::process_move(&mut session, &[0, 5], &mut rng),
            Err(GameError::InvalidMove)
        );
    }
}
