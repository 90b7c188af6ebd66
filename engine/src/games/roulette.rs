//! Single-zero roulette over a multi-bet sheet.
//!
//! One move carries the whole sheet; the wheel is spun once and every
//! bet settles independently against the same pocket. The sheet's
//! amounts must sum exactly to the session's stake, so the driver's
//! single debit covers all of it. Zero defeats every outside bet; only
//! a straight bet on 0 covers it.
//!
//! State blob format:
//! [max_bets:u8] before the spin, [max_bets:u8] [pocket:u8] after.
//!
//! Payload format (one move, resolves the round):
//! [count:u8] then `count` entries of
//! [kind:u8] [number:u8] [amount:u64]
//!
//! Bet kinds:
//! 0 = Straight on `number` (0..=36), pays 36x
//! 1 = Red, 2 = Black, 3 = Odd, 4 = Even, 5 = Low (1-18),
//! 6 = High (19-36), all pay 2x; `number` must be 0
//! 7 = Dozen (`number` 0..=2), pays 3x

use super::blob::{BlobReader, BlobWriter};
use super::registry::GameConfig;
use super::{CasinoGame, GameError, GameResult, GameRng};
use fortuna_types::constants::ROULETTE_POCKETS;
use fortuna_types::GameSession;

/// Red pockets on the standard European wheel.
pub const RED_NUMBERS: [u8; 18] = [
    1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BetKind {
    Straight,
    Red,
    Black,
    Odd,
    Even,
    Low,
    High,
    Dozen,
}

impl BetKind {
    fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => Self::Straight,
            1 => Self::Red,
            2 => Self::Black,
            3 => Self::Odd,
            4 => Self::Even,
            5 => Self::Low,
            6 => Self::High,
            7 => Self::Dozen,
            _ => return None,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bet {
    pub kind: BetKind,
    pub number: u8,
    pub amount: u64,
}

impl Bet {
    fn validate(&self) -> Result<(), GameError> {
        if self.amount == 0 {
            return Err(GameError::InvalidPayload);
        }
        let number_ok = match self.kind {
            BetKind::Straight => self.number < ROULETTE_POCKETS,
            BetKind::Dozen => self.number < 3,
            _ => self.number == 0,
        };
        if number_ok {
            Ok(())
        } else {
            Err(GameError::InvalidPayload)
        }
    }

    /// Credit due if `pocket` comes up, stake included. Zero for a miss.
    pub fn payout(&self, pocket: u8) -> u64 {
        let hit = match self.kind {
            BetKind::Straight => pocket == self.number,
            BetKind::Red => RED_NUMBERS.contains(&pocket),
            BetKind::Black => pocket != 0 && !RED_NUMBERS.contains(&pocket),
            BetKind::Odd => pocket != 0 && pocket % 2 == 1,
            BetKind::Even => pocket != 0 && pocket % 2 == 0,
            BetKind::Low => (1..=18).contains(&pocket),
            BetKind::High => (19..=36).contains(&pocket),
            BetKind::Dozen => pocket != 0 && (pocket - 1) / 12 == self.number,
        };
        if !hit {
            return 0;
        }
        let multiple: u64 = match self.kind {
            BetKind::Straight => 36,
            BetKind::Dozen => 3,
            _ => 2,
        };
        self.amount.saturating_mul(multiple)
    }
}

fn parse_sheet(payload: &[u8], max_bets: u8) -> Result<Vec<Bet>, GameError> {
    let mut reader = BlobReader::new(payload);
    let count = reader.u8().map_err(|_| GameError::InvalidPayload)? as usize;
    if count == 0 || count > max_bets as usize {
        return Err(GameError::InvalidPayload);
    }
    let mut bets = Vec::with_capacity(count);
    for _ in 0..count {
        let kind = BetKind::from_u8(reader.u8().map_err(|_| GameError::InvalidPayload)?)
            .ok_or(GameError::InvalidPayload)?;
        let number = reader.u8().map_err(|_| GameError::InvalidPayload)?;
        let amount = reader.u64().map_err(|_| GameError::InvalidPayload)?;
        let bet = Bet {
            kind,
            number,
            amount,
        };
        bet.validate()?;
        bets.push(bet);
    }
    if reader.bytes(1).is_ok() {
        // Trailing garbage after the declared sheet.
        return Err(GameError::InvalidPayload);
    }
    Ok(bets)
}

/// Settle a full sheet against one pocket.
pub fn settle_sheet(bets: &[Bet], pocket: u8) -> u64 {
    bets.iter()
        .fold(0u64, |total, bet| total.saturating_add(bet.payout(pocket)))
}

pub struct Roulette;

impl CasinoGame for Roulette {
    fn init(
        session: &mut GameSession,
        config: &GameConfig,
        _rng: &mut GameRng,
    ) -> Result<GameResult, GameError> {
        let config = config.roulette();
        if config.max_bets == 0 {
            return Err(GameError::InvalidState);
        }
        session.state_blob = vec![config.max_bets];
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
        let mut reader = BlobReader::new(&session.state_blob);
        let max_bets = reader.u8()?;

        let bets = parse_sheet(payload, max_bets)?;
        let wagered: u64 = bets
            .iter()
            .try_fold(0u64, |total, bet| total.checked_add(bet.amount))
            .ok_or(GameError::InvalidPayload)?;
        if wagered != session.bet {
            return Err(GameError::InvalidPayload);
        }

        let pocket = rng.next_below(ROULETTE_POCKETS as u64) as u8;
        let total = settle_sheet(&bets, pocket);

        let mut writer = BlobWriter::with_capacity(2);
        writer.u8(max_bets).u8(pocket);
        session.state_blob = writer.finish();
        session.move_count += 1;
        session.is_complete = true;

        let log = format!(
            r#"{{"event":"spin","pocket":{},"bets":{},"payout":{}}}"#,
            pocket,
            bets.len(),
            total
        );
        if total > 0 {
            Ok(GameResult::Win(total, vec![log]))
        } else {
            Ok(GameResult::Loss(vec![log]))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil::*;
    use super::*;
    use fortuna_types::GameType;

    fn sheet_bytes(bets: &[(u8, u8, u64)]) -> Vec<u8> {
        let mut writer = BlobWriter::with_capacity(1 + bets.len() * 10);
        writer.u8(bets.len() as u8);
        for &(kind, number, amount) in bets {
            writer.u8(kind).u8(number).u64(amount);
        }
        writer.finish()
    }

    #[test]
    fn straight_hit_pays_thirty_six_total() {
        let bet = Bet {
            kind: BetKind::Straight,
            number: 7,
            amount: 10,
        };
        assert_eq!(bet.payout(7), 360);
        assert_eq!(bet.payout(8), 0);
    }

    #[test]
    fn sheet_settles_additively() {
        // Pocket 7 is red and odd: 360 + 20 + 20.
        let bets = [
            Bet {
                kind: BetKind::Straight,
                number: 7,
                amount: 10,
            },
            Bet {
                kind: BetKind::Red,
                number: 0,
                amount: 10,
            },
            Bet {
                kind: BetKind::Odd,
                number: 0,
                amount: 10,
            },
        ];
        assert_eq!(settle_sheet(&bets, 7), 400);
    }

    #[test]
    fn zero_defeats_outside_bets() {
        for kind in [
            BetKind::Red,
            BetKind::Black,
            BetKind::Odd,
            BetKind::Even,
            BetKind::Low,
            BetKind::High,
        ] {
            let bet = Bet {
                kind,
                number: 0,
                amount: 10,
            };
            assert_eq!(bet.payout(0), 0, "{:?} should lose on zero", kind);
        }
        for dozen in 0..3 {
            let bet = Bet {
                kind: BetKind::Dozen,
                number: dozen,
                amount: 10,
            };
            assert_eq!(bet.payout(0), 0);
        }
        let straight_zero = Bet {
            kind: BetKind::Straight,
            number: 0,
            amount: 10,
        };
        assert_eq!(straight_zero.payout(0), 360);
    }

    #[test]
    fn dozens_partition_the_board() {
        for pocket in 1..=36u8 {
            let hits = (0..3)
                .filter(|&d| {
                    Bet {
                        kind: BetKind::Dozen,
                        number: d,
                        amount: 1,
                    }
                    .payout(pocket)
                        > 0
                })
                .count();
            assert_eq!(hits, 1, "pocket {} in exactly one dozen", pocket);
        }
    }

    #[test]
    fn red_and_black_partition_nonzero_pockets() {
        for pocket in 1..=36u8 {
            let red = Bet {
                kind: BetKind::Red,
                number: 0,
                amount: 1,
            }
            .payout(pocket)
                > 0;
            let black = Bet {
                kind: BetKind::Black,
                number: 0,
                amount: 1,
            }
            .payout(pocket)
                > 0;
            assert!(red != black, "pocket {} exactly one color", pocket);
        }
    }

    #[test]
    fn sheet_must_cover_the_stake_exactly() {
        let seed = test_seed(70);
        let mut session = test_session(GameType::Roulette, 30);
        let mut rng = GameRng::new(&seed, 0);
        Roulette::init(&mut session, &GameConfig::default_for(GameType::Roulette), &mut rng)
            .expect("init");

        // 20 wagered against a 30 stake.
        let mut rng = GameRng::new(&seed, 1);
        let short = sheet_bytes(&[(1, 0, 10), (3, 0, 10)]);
        assert_eq!(
            Roulette::process_move(&mut session, &short, &mut rng),
            Err(GameError::InvalidPayload)
        );
        assert!(!session.is_complete);

        let mut rng = GameRng::new(&seed, 1);
        let exact = sheet_bytes(&[(0, 7, 10), (1, 0, 10), (3, 0, 10)]);
        let result = Roulette::process_move(&mut session, &exact, &mut rng).expect("spin");
        assert!(result.is_terminal());
        assert!(session.is_complete);

        // Reported amount matches re-settling against the stored pocket.
        let pocket = session.state_blob[1];
        let bets = [
            Bet {
                kind: BetKind::Straight,
                number: 7,
                amount: 10,
            },
            Bet {
                kind: BetKind::Red,
                number: 0,
                amount: 10,
            },
            Bet {
                kind: BetKind::Odd,
                number: 0,
                amount: 10,
            },
        ];
        let expected = settle_sheet(&bets, pocket);
        match result {
            GameResult::Win(amount, _) => assert_eq!(amount, expected),
            GameResult::Loss(_) => assert_eq!(expected, 0),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn malformed_sheets_rejected() {
        let seed = test_seed(71);
        let mut session = test_session(GameType::Roulette, 10);
        let mut rng = GameRng::new(&seed, 0);
        Roulette::init(&mut session, &GameConfig::default_for(GameType::Roulette), &mut rng)
            .expect("init");

        let cases: Vec<Vec<u8>> = vec![
            vec![],                                 // no count
            sheet_bytes(&[]),                       // zero bets
            sheet_bytes(&[(0, 37, 10)]),            // pocket out of range
            sheet_bytes(&[(7, 3, 10)]),             // dozen out of range
            sheet_bytes(&[(1, 5, 10)]),             // color bet with a number
            sheet_bytes(&[(8, 0, 10)]),             // unknown kind
            sheet_bytes(&[(0, 7, 0)]),              // zero amount
            {
                let mut bytes = sheet_bytes(&[(0, 7, 10)]);
                bytes.push(0); // trailing garbage
                bytes
            },
        ];
        for case in cases {
            let mut rng = GameRng::new(&seed, 1);
            assert_eq!(
                Roulette::process_move(&mut session, &case, &mut rng),
                Err(GameError::InvalidPayload),
                "sheet {:?} should be rejected",
                case
            );
        }
        assert!(!session.is_complete);
    }
}
