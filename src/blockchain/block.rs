use chrono::{DateTime, Utc};
use log::debug;
use sha2::{Digest, Sha256};

use super::GENESIS_DIGEST;
use crate::clock;
use crate::payload::{Payload, canonical_json};

/// A single block in the ledger holding one payload record.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub(crate) payload: Payload,
    pub(crate) digest: String, // empty until mined
    pub(crate) previous_digest: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) proof_of_work: u64,
}

impl Block {
    /// The first block of every chain. Its digest is the sentinel and is never mined.
    pub fn genesis(created_at: DateTime<Utc>) -> Self {
        Self {
            payload: Payload::new(),
            digest: String::from(GENESIS_DIGEST),
            previous_digest: String::new(),
            created_at,
            proof_of_work: 0,
        }
    }

    /// Create a new block (not mined yet). Call `mine()` to perform PoW.
    pub fn new(previous_digest: String, payload: Payload, created_at: DateTime<Utc>) -> Self {
        Self {
            payload,
            digest: String::new(),
            previous_digest,
            created_at,
            proof_of_work: 0,
        }
    }

    /// SHA-256 over previous digest, canonical payload JSON, creation time
    /// and the decimal proof-of-work, in that order. Lowercase hex.
    pub fn calculate_digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.previous_digest.as_bytes());
        hasher.update(canonical_json(&self.payload).as_bytes());
        hasher.update(clock::render(&self.created_at).as_bytes());
        hasher.update(self.proof_of_work.to_string().as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Perform Proof-of-Work: search upward from the current counter until
    /// the digest starts with `difficulty` zero hex digits, and return the
    /// mined block. Never returns if `difficulty` exceeds the digest length.
    pub fn mine(mut self, difficulty: u32) -> Self {
        let target_prefix = "0".repeat(difficulty as usize);
        let mut attempts: u64 = 0;
        loop {
            let digest = self.calculate_digest();
            attempts += 1;
            if digest.starts_with(&target_prefix) {
                self.digest = digest;
                break;
            }
            self.proof_of_work = self.proof_of_work.wrapping_add(1);
        }
        debug!(
            "mined digest={} pow={} attempts={} difficulty={}",
            self.digest, self.proof_of_work, attempts, difficulty
        );
        self
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }
}
