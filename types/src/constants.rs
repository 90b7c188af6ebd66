//! Shared numeric constants for the engine family.

/// Fixed-point base for multipliers: `10_000` basis points = 1.00x.
pub const MULTIPLIER_BASE: u64 = 10_000;

/// Maximum payload length for game moves.
pub const MAX_PAYLOAD_LENGTH: usize = 256;

/// Maximum state blob length a session may carry.
pub const MAX_STATE_BLOB_LENGTH: usize = 1024;

/// Maximum bet accepted by any table (keeps i64-safe payout math).
pub const MAX_BET: u64 = i64::MAX as u64 / 100_000;

/// Mines grid size (5x5).
pub const MINES_GRID_SIZE: u8 = 25;

/// Number of pockets on a single-zero roulette wheel.
pub const ROULETTE_POCKETS: u8 = 37;
