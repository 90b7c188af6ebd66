//! 3x3 weighted-reel slots with fixed paylines (Fortune Tiger / Fortune
//! Mouse variants).
//!
//! Each cell is an independent draw from the variant's categorical
//! distribution; weights decrease strictly as payouts rise. Five lines
//! are checked (three rows, two diagonals); the wild substitutes for any
//! symbol, and an all-wild line pays the wild itself.
//!
//! State blob format:
//! [variant:u8] before the spin, [variant:u8] [grid:9 bytes] after.
//! Grid cells are column-major: index = col * 3 + row.
//!
//! Payload format:
//! [0] = Spin (resolves the round in one move)

use super::blob::{BlobReader, BlobWriter};
use super::logging::format_index_list;
use super::registry::{GameConfig, PaylineVariant};
use super::{CasinoGame, GameError, GameResult, GameRng};
use fortuna_types::GameSession;

/// Cells per grid (3 columns x 3 rows).
pub const GRID_CELLS: usize = 9;

/// The five fixed lines, as cell indexes (column-major).
const LINES: [[usize; 3]; 5] = [
    [0, 3, 6], // top row
    [1, 4, 7], // middle row
    [2, 5, 8], // bottom row
    [0, 4, 8], // main diagonal
    [2, 4, 6], // anti diagonal
];

/// Wild symbol id in both variants.
const WILD: u8 = 0;

struct SymbolTable {
    /// Cumulative sampling weights out of 10_000, one per symbol.
    cumulative_weights: &'static [u16],
    /// Line payout per symbol, as a multiple of the stake unit.
    payouts: &'static [u64],
    /// Stake unit divisor: a winning line pays
    /// `payout * bet / stake_divisor`.
    stake_divisor: u64,
}

// Weights and payouts follow the observed source distributions: the
// 250x wild lands 4% of the time, the 2x scroll 25%.
const TIGER: SymbolTable = SymbolTable {
    cumulative_weights: &[400, 1_200, 2_200, 3_500, 5_500, 7_500, 10_000],
    payouts: &[250, 100, 50, 10, 5, 3, 2],
    stake_divisor: 10,
};

const MOUSE: SymbolTable = SymbolTable {
    cumulative_weights: &[500, 1_500, 3_000, 5_000, 7_500, 10_000],
    payouts: &[30, 15, 10, 5, 3, 2],
    stake_divisor: 1,
};

fn table_for(variant: PaylineVariant) -> &'static SymbolTable {
    match variant {
        PaylineVariant::FortuneTiger => &TIGER,
        PaylineVariant::FortuneMouse => &MOUSE,
    }
}

/// Sample one symbol id from the variant's categorical distribution.
fn sample_symbol(rng: &mut GameRng, table: &SymbolTable) -> u8 {
    let r = rng.next_below(10_000) as u16;
    for (id, &bound) in table.cumulative_weights.iter().enumerate() {
        if r < bound {
            return id as u8;
        }
    }
    // Unreachable: the last cumulative weight is 10_000.
    (table.cumulative_weights.len() - 1) as u8
}

fn sample_grid(rng: &mut GameRng, table: &SymbolTable) -> [u8; GRID_CELLS] {
    let mut grid = [0u8; GRID_CELLS];
    for cell in grid.iter_mut() {
        *cell = sample_symbol(rng, table);
    }
    grid
}

/// Evaluate all five lines. Returns the summed payout multiple (in stake
/// units) and the indexes of winning lines.
pub fn evaluate_grid(grid: &[u8; GRID_CELLS], variant: PaylineVariant) -> (u64, Vec<usize>) {
    let table = table_for(variant);
    let mut total = 0u64;
    let mut winning_lines = Vec::new();

    for (line_idx, line) in LINES.iter().enumerate() {
        let symbols = [grid[line[0]], grid[line[1]], grid[line[2]]];
        let mut line_symbol = None;
        let mut matched = true;
        for &s in &symbols {
            if s == WILD {
                continue;
            }
            match line_symbol {
                None => line_symbol = Some(s),
                Some(existing) if existing == s => {}
                Some(_) => {
                    matched = false;
                    break;
                }
            }
        }
        if matched {
            // An all-wild line pays the wild itself.
            let paying = line_symbol.unwrap_or(WILD);
            total += table.payouts[paying as usize];
            winning_lines.push(line_idx);
        }
    }

    (total, winning_lines)
}

/// Win amount for a summed payout multiple at a given bet.
pub fn win_amount(payout_sum: u64, bet: u64, variant: PaylineVariant) -> u64 {
    let divisor = table_for(variant).stake_divisor;
    ((payout_sum as u128 * bet as u128) / divisor as u128) as u64
}

pub struct PaylineSlots;

impl CasinoGame for PaylineSlots {
    fn init(
        session: &mut GameSession,
        config: &GameConfig,
        _rng: &mut GameRng,
    ) -> Result<GameResult, GameError> {
        let config = config.payline();
        session.state_blob = vec![config.variant as u8];
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
        if payload.len() != 1 || payload[0] != 0 {
            return Err(GameError::InvalidPayload);
        }

        let mut reader = BlobReader::new(&session.state_blob);
        let variant =
            PaylineVariant::from_u8(reader.u8()?).ok_or(GameError::InvalidState)?;
        let table = table_for(variant);

        let grid = sample_grid(rng, table);
        let (payout_sum, winning_lines) = evaluate_grid(&grid, variant);

        let mut writer = BlobWriter::with_capacity(1 + GRID_CELLS);
        writer.u8(variant as u8).bytes(&grid);
        session.state_blob = writer.finish();
        session.move_count += 1;
        session.is_complete = true;

        let grid_log = format_index_list(&grid.iter().map(|&s| s as usize).collect::<Vec<_>>());
        if payout_sum > 0 {
            let amount = win_amount(payout_sum, session.bet, variant);
            let logs = vec![format!(
                r#"{{"event":"spin","grid":[{}],"lines":[{}],"payout":{}}}"#,
                grid_log,
                format_index_list(&winning_lines),
                amount
            )];
            Ok(GameResult::Win(amount, logs))
        } else {
            let logs = vec![format!(
                r#"{{"event":"spin","grid":[{}],"lines":[],"payout":0}}"#,
                grid_log
            )];
            Ok(GameResult::Loss(logs))
        }
    }
}
