//! Crash game ("aviator") implementation.
//!
//! The crash point is sampled once at init and never resampled. The
//! multiplier grows as `e^(k*t)`; the round busts the instant the live
//! multiplier reaches the crash point, and a single cash-out strictly
//! before that settles at the live multiplier.
//!
//! State blob format:
//! [growthRateBps:u32 BE] [crashBps:u64 BE] [lastElapsedMs:u32 BE]
//!
//! Payload format:
//! [0] [elapsedMs:u32 BE] = Observe (tick; advances the clock)
//! [1] [elapsedMs:u32 BE] = CashOut
//!
//! Elapsed time is monotonic within a round; a move with an earlier
//! timestamp than one already processed is rejected.

use super::blob::{BlobReader, BlobWriter};
use super::registry::{CrashConfig, GameConfig};
use super::{CasinoGame, GameError, GameResult, GameRng};
use fortuna_types::constants::MULTIPLIER_BASE;
use fortuna_types::GameSession;

/// Crash move types.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Move {
    Observe = 0,
    CashOut = 1,
}

impl TryFrom<u8> for Move {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Move::Observe),
            1 => Ok(Move::CashOut),
            _ => Err(GameError::InvalidPayload),
        }
    }
}

struct CrashState {
    growth_rate_bps: u32,
    crash_bps: u64,
    last_elapsed_ms: u32,
}

/// Map a uniform draw to a crash point in basis points.
///
/// `r < p_instant` yields exactly 1.00x (instant bust); otherwise the
/// heavy-tailed `numerator / (1 - r)`, floored to two decimals and
/// clamped to `[1.00x, max]`.
pub fn crash_point_from_unit(r: f64, config: &CrashConfig) -> u64 {
    let p_instant = config.instant_bust_bps as f64 / MULTIPLIER_BASE as f64;
    if r < p_instant {
        return MULTIPLIER_BASE;
    }
    let numerator = config.payout_numerator_bps as f64 / MULTIPLIER_BASE as f64;
    let raw = numerator / (1.0 - r);
    let capped = raw.min(config.max_crash_bps as f64 / MULTIPLIER_BASE as f64);
    // Floor to two decimals, so 1.0206.. becomes 1.02x = 10_200 bps. The
    // tiny offset absorbs division noise (0.99/0.25 computes as
    // 3.9599999999999996) without admitting genuinely smaller values.
    let bps = (capped * 100.0 + 1e-9).floor() as u64 * 100;
    bps.clamp(MULTIPLIER_BASE, config.max_crash_bps)
}

/// Live multiplier `e^(k*t)` in basis points at `elapsed_ms`.
pub fn multiplier_at(elapsed_ms: u32, growth_rate_bps: u32) -> u64 {
    let k = growth_rate_bps as f64 / MULTIPLIER_BASE as f64;
    let t = elapsed_ms as f64 / 1_000.0;
    let value = (k * t).exp();
    // Bound before the cast; e^(k*t) overflows f64->u64 for large t.
    let capped = (value * MULTIPLIER_BASE as f64).min(u64::MAX as f64 / 2.0);
    capped.floor() as u64
}

fn parse_state(state: &[u8]) -> Result<CrashState, GameError> {
    let mut reader = BlobReader::new(state);
    Ok(CrashState {
        growth_rate_bps: reader.u32()?,
        crash_bps: reader.u64()?,
        last_elapsed_ms: reader.u32()?,
    })
}

fn serialize_state(state: &CrashState) -> Vec<u8> {
    let mut writer = BlobWriter::with_capacity(16);
    writer
        .u32(state.growth_rate_bps)
        .u64(state.crash_bps)
        .u32(state.last_elapsed_ms);
    writer.finish()
}

fn bust(session: &mut GameSession, state: &CrashState, elapsed_ms: u32) -> GameResult {
    session.is_complete = true;
    let logs = vec![format!(
        r#"{{"event":"crash","crashBps":{},"elapsedMs":{}}}"#,
        state.crash_bps, elapsed_ms
    )];
    GameResult::Loss(logs)
}

pub struct Crash;

impl CasinoGame for Crash {
    fn init(
        session: &mut GameSession,
        config: &GameConfig,
        rng: &mut GameRng,
    ) -> Result<GameResult, GameError> {
        let config = config.crash();
        let crash_bps = crash_point_from_unit(rng.next_unit(), &config);
        let state = CrashState {
            growth_rate_bps: config.growth_rate_bps as u32,
            crash_bps,
            last_elapsed_ms: 0,
        };
        session.state_blob = serialize_state(&state);
        Ok(GameResult::Continue(vec![]))
    }

    fn process_move(
        session: &mut GameSession,
        payload: &[u8],
        _rng: &mut GameRng,
    ) -> Result<GameResult, GameError> {
        if session.is_complete {
            return Err(GameError::RoundComplete);
        }
        if payload.len() != 5 {
            return Err(GameError::InvalidPayload);
        }
        let mv = Move::try_from(payload[0])?;
        let elapsed_ms = u32::from_be_bytes([payload[1], payload[2], payload[3], payload[4]]);

        let mut state = parse_state(&session.state_blob)?;
        if elapsed_ms < state.last_elapsed_ms {
            return Err(GameError::InvalidMove);
        }

        let live_bps = multiplier_at(elapsed_ms, state.growth_rate_bps);
        session.move_count += 1;

        if live_bps >= state.crash_bps {
            return Ok(bust(session, &state, elapsed_ms));
        }

        match mv {
            Move::Observe => {
                state.last_elapsed_ms = elapsed_ms;
                session.state_blob = serialize_state(&state);
                let logs = vec![format!(
                    r#"{{"event":"tick","multiplierBps":{},"elapsedMs":{}}}"#,
                    live_bps, elapsed_ms
                )];
                Ok(GameResult::Continue(logs))
            }
            Move::CashOut => {
                session.is_complete = true;
                let amount = (session.bet as u128)
                    .checked_mul(live_bps as u128)
                    .map(|v| v / MULTIPLIER_BASE as u128)
                    .ok_or(GameError::InvalidState)?;
                let amount = u64::try_from(amount).map_err(|_| GameError::InvalidState)?;
                let logs = vec![format!(
                    r#"{{"event":"cashout","multiplierBps":{},"elapsedMs":{},"payout":{}}}"#,
                    live_bps, elapsed_ms, amount
                )];
                Ok(GameResult::Win(amount, logs))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil::*;
    use super::*;
    use fortuna_types::GameType;

    fn default_config() -> GameConfig {
        GameConfig::Crash(CrashConfig::default())
    }

    fn observe(elapsed_ms: u32) -> Vec<u8> {
        let mut p = vec![0u8];
        p.extend_from_slice(&elapsed_ms.to_be_bytes());
        p
    }

    fn cash_out(elapsed_ms: u32) -> Vec<u8> {
        let mut p = vec![1u8];
        p.extend_from_slice(&elapsed_ms.to_be_bytes());
        p
    }

    #[test]
    fn instant_bust_is_exactly_one() {
        let config = CrashConfig::default();
        // Any draw below 0.03 must produce exactly 1.00x.
        assert_eq!(crash_point_from_unit(0.0, &config), 10_000);
        assert_eq!(crash_point_from_unit(0.01, &config), 10_000);
        assert_eq!(crash_point_from_unit(0.029_999, &config), 10_000);
    }

    #[test]
    fn crash_point_matches_formula() {
        let config = CrashConfig::default();
        // 0.99 / (1 - 0.5) = 1.98 -> 19_800 bps
        assert_eq!(crash_point_from_unit(0.5, &config), 19_800);
        // 0.99 / (1 - 0.9) = 9.9 -> 99_000 bps
        assert_eq!(crash_point_from_unit(0.9, &config), 99_000);
        // Just past the instant-bust band: 0.99 / 0.97 = 1.0206.. -> 1.02x
        assert_eq!(crash_point_from_unit(0.03, &config), 10_200);
    }

    #[test]
    fn crash_point_respects_cap() {
        let config = CrashConfig::default();
        let near_one = 1.0 - 1e-12;
        assert_eq!(crash_point_from_unit(near_one, &config), config.max_crash_bps);
    }

    #[test]
    fn multiplier_growth() {
        // t = 0 -> exactly 1.00x
        assert_eq!(multiplier_at(0, 800), 10_000);
        // e^0.08 = 1.08328.. -> 10_832 bps at one second
        assert_eq!(multiplier_at(1_000, 800), 10_832);
        assert!(multiplier_at(10_000, 800) > multiplier_at(5_000, 800));
    }

    #[test]
    fn immediate_cashout_wins_or_instant_busts() {
        // At t=0 the live multiplier is 1.00x: the round either pays the
        // stake back (crash point above 1.00x) or was an instant bust.
        for tag in 0..32u8 {
            let seed = test_seed(tag);
            let mut session = test_session(GameType::Crash, 100);
            let mut rng = GameRng::new(&seed, 0);
            Crash::init(&mut session, &default_config(), &mut rng).expect("init");

            let mut rng = GameRng::new(&seed, 1);
            match Crash::process_move(&mut session, &cash_out(0), &mut rng).expect("move") {
                GameResult::Win(amount, _) => assert_eq!(amount, 100),
                GameResult::Loss(_) => {
                    let state = parse_state(&session.state_blob).expect("state");
                    assert_eq!(state.crash_bps, 10_000, "loss at t=0 must be instant bust");
                }
                other => panic!("unexpected result: {:?}", other),
            }
            assert!(session.is_complete);
        }
    }

    #[test]
    fn late_observation_busts() {
        let seed = test_seed(9);
        let mut session = test_session(GameType::Crash, 100);
        let mut rng = GameRng::new(&seed, 0);
        Crash::init(&mut session, &default_config(), &mut rng).expect("init");

        // 20 minutes at k=0.08/s is e^96, far past any capped crash point.
        let mut rng = GameRng::new(&seed, 1);
        let result =
            Crash::process_move(&mut session, &observe(1_200_000), &mut rng).expect("move");
        assert!(matches!(result, GameResult::Loss(_)));
        assert!(session.is_complete);
    }

    #[test]
    fn elapsed_time_is_monotonic() {
        let seed = test_seed(10);
        let mut session = test_session(GameType::Crash, 100);
        let mut rng = GameRng::new(&seed, 0);
        Crash::init(&mut session, &default_config(), &mut rng).expect("init");

        // Force a high crash point so the observation cannot bust.
        let state = CrashState {
            growth_rate_bps: 800,
            crash_bps: 1_000_000,
            last_elapsed_ms: 0,
        };
        session.state_blob = serialize_state(&state);

        let mut rng = GameRng::new(&seed, 1);
        let result = Crash::process_move(&mut session, &observe(5_000), &mut rng).expect("move");
        assert!(matches!(result, GameResult::Continue(_)));

        let mut rng = GameRng::new(&seed, 2);
        assert_eq!(
            Crash::process_move(&mut session, &cash_out(1_000), &mut rng),
            Err(GameError::InvalidMove)
        );
    }

    #[test]
    fn cashout_settles_at_live_multiplier() {
        let seed = test_seed(11);
        let mut session = test_session(GameType::Crash, 1_000);
        let mut rng = GameRng::new(&seed, 0);
        Crash::init(&mut session, &default_config(), &mut rng).expect("init");

        let state = CrashState {
            growth_rate_bps: 800,
            crash_bps: 1_000_000,
            last_elapsed_ms: 0,
        };
        session.state_blob = serialize_state(&state);

        let mut rng = GameRng::new(&seed, 1);
        match Crash::process_move(&mut session, &cash_out(1_000), &mut rng).expect("move") {
            // 1_000 * 10_832 / 10_000
            GameResult::Win(amount, _) => assert_eq!(amount, 1_083),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    proptest::proptest! {
        #[test]
        fn crash_point_always_in_bounds(r in 0.0f64..1.0) {
            let config = CrashConfig::default();
            let bps = crash_point_from_unit(r, &config);
            proptest::prop_assert!(bps >= MULTIPLIER_BASE);
            proptest::prop_assert!(bps <= config.max_crash_bps);
            // Two-decimal flooring keeps every point on a whole cent.
            proptest::prop_assert_eq!(bps % 100, 0);
        }
    }

    #[test]
    fn trailing_payload_bytes_rejected() {
        let seed = test_seed(13);
        let mut session = test_session(GameType::Crash, 100);
        let mut rng = GameRng::new(&seed, 0);
        Crash::init(&mut session, &default_config(), &mut rng).expect("init");

        let mut padded = cash_out(0);
        padded.push(0);
        let mut rng = GameRng::new(&seed, 1);
        assert_eq!(
            Crash::process_move(&mut session, &padded, &mut rng),
            Err(GameError::InvalidPayload)
        );
        assert!(!session.is_complete);
    }

    #[test]
    fn second_terminal_action_rejected() {
        let seed = test_seed(12);
        let mut session = test_session(GameType::Crash, 100);
        let mut rng = GameRng::new(&seed, 0);
        Crash::init(&mut session, &default_config(), &mut rng).expect("init");

        let state = CrashState {
            growth_rate_bps: 800,
            crash_bps: 1_000_000,
            last_elapsed_ms: 0,
        };
        session.state_blob = serialize_state(&state);

        let mut rng = GameRng::new(&seed, 1);
        Crash::process_move(&mut session, &cash_out(0), &mut rng).expect("first cashout");

        let mut rng = GameRng::new(&seed, 2);
        assert_eq!(
            Crash::process_move(&mut session, &cash_out(0), &mut rng),
            Err(GameError::RoundComplete)
        );
    }
}
