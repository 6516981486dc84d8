pub mod block;
pub mod model;

pub use block::Block;
pub use model::Chain;

use crate::error::{LedgerError, Result};

/// Default Proof-of-Work difficulty (number of leading zero hex digits).
pub const DEFAULT_DIFFICULTY: u32 = 3;

/// Hex length of a SHA-256 digest; no zero prefix can be longer.
pub const MAX_DIFFICULTY: usize = 64;

/// Digest placed on the genesis block instead of mining it.
pub const GENESIS_DIGEST: &str = "0";

/// Accept a raw difficulty only if some digest could ever satisfy it.
pub fn checked_difficulty(raw: i64) -> Result<u32> {
    match u32::try_from(raw) {
        Ok(d) if d as usize <= MAX_DIFFICULTY => Ok(d),
        _ => Err(LedgerError::invalid_difficulty(raw)),
    }
}
