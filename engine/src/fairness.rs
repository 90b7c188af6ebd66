//! Commit-reveal fairness pipeline.
//!
//! Each round's randomness is derived from a table-wide master seed and
//! the session id. The table publishes `commit = H(reveal)` when the
//! round starts and discloses `reveal` once it resolves; anyone holding
//! both can check the hash and replay every draw with [`crate::GameRng`].

use sha2::{Digest, Sha256};

/// Seed bytes for one round: `H(master_seed || session_id || "round")`.
///
/// Doubles as the reveal value, since knowing it reconstructs all of the
/// round's draws and nothing from any other round.
pub fn derive_round_seed(master_seed: &[u8; 32], session_id: u64) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(master_seed);
    hasher.update(session_id.to_be_bytes());
    hasher.update(b"round");
    hasher.finalize().into()
}

/// Commitment published at round start: `H(reveal)`.
pub fn compute_commit(reveal: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(reveal);
    hasher.finalize().into()
}

/// Check a disclosed reveal against its earlier commitment.
pub fn verify_commit_reveal(commit: &[u8; 32], reveal: &[u8; 32]) -> bool {
    compute_commit(reveal) == *commit
}
