use log::{info, warn};
use thiserror::Error;

use super::{Block, checked_difficulty};
use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::payload::Payload;

/// Why a chain failed verification, with the height of the offending block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("block {index}: stored digest does not match its content")]
    DigestMismatch { index: usize },
    #[error("block {index}: previous digest does not match the block before it")]
    BrokenLink { index: usize },
}

/// Append-only in-memory ledger with Proof-of-Work.
#[derive(Debug)]
pub struct Chain<C: Clock = SystemClock> {
    blocks: Vec<Block>,
    difficulty: u32,
    clock: C,
}

impl Chain<SystemClock> {
    /// Initialize a new chain with a genesis block stamped with the current time.
    pub fn new(difficulty: u32) -> Result<Self> {
        Self::with_clock(difficulty, SystemClock)
    }
}

impl<C: Clock> Chain<C> {
    /// Like [`Chain::new`], with creation times taken from `clock`.
    pub fn with_clock(difficulty: u32, clock: C) -> Result<Self> {
        let difficulty = checked_difficulty(i64::from(difficulty))?;
        let genesis = Block::genesis(clock.now());
        Ok(Self {
            blocks: vec![genesis],
            difficulty,
            clock,
        })
    }

    /// Return the last block in the chain.
    pub fn last_block(&self) -> &Block {
        self.blocks
            .last()
            .expect("chain always holds at least the genesis block")
    }

    /// Mine a block carrying `payload` on top of the current tail and append it.
    /// Blocks until a qualifying digest is found.
    pub fn append(&mut self, payload: Payload) -> &Block {
        let previous_digest = self.last_block().digest.clone();
        let block = Block::new(previous_digest, payload, self.clock.now()).mine(self.difficulty);

        info!(
            "appended block height={} pow={} digest={}",
            self.blocks.len(),
            block.proof_of_work,
            block.digest
        );
        self.blocks.push(block);
        self.last_block()
    }

    /// Re-check every block after genesis against its own content and its predecessor.
    pub fn verify(&self) -> std::result::Result<(), Violation> {
        for (offset, pair) in self.blocks.windows(2).enumerate() {
            let (previous, current) = (&pair[0], &pair[1]);
            let index = offset + 1;

            if current.digest != current.calculate_digest() {
                return Err(Violation::DigestMismatch { index });
            }
            if current.previous_digest != previous.digest {
                return Err(Violation::BrokenLink { index });
            }
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        match self.verify() {
            Ok(()) => true,
            Err(violation) => {
                warn!("chain invalid: {violation}");
                false
            }
        }
    }

    /// Digests of every non-genesis block, oldest first.
    pub fn digests(&self) -> impl Iterator<Item = &str> + '_ {
        self.blocks.iter().skip(1).map(Block::digest)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }
}

#[cfg(test)]
mod tests {
    use super::{Chain, Violation};
    use crate::blockchain::{Block, GENESIS_DIGEST, MAX_DIFFICULTY};
    use crate::clock::FixedClock;
    use crate::error::LedgerError;
    use crate::payload::model::Value;
    use crate::payload::transfer;
    use chrono::{Duration, TimeZone, Utc};

    fn fixed() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap())
    }

    fn populated(difficulty: u32) -> Chain<FixedClock> {
        let mut chain = Chain::with_clock(difficulty, fixed()).unwrap();
        chain.append(transfer("Alice", "Bob", 5.0).unwrap());
        chain.append(transfer("John", "Bob", 2.0).unwrap());
        chain.append(transfer("Dani", "Bob", 27.0).unwrap());
        chain.append(transfer("Bob", "Dani", 50.0).unwrap());
        chain
    }

    #[test]
    fn new_chain_holds_only_genesis() {
        let chain = Chain::new(2).unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.difficulty(), 2);
        assert_eq!(chain.blocks[0].digest(), GENESIS_DIGEST);
        assert_eq!(chain.last_block(), &chain.blocks[0]);
        assert_eq!(chain.digests().count(), 0);
        assert!(chain.is_valid());
    }

    #[test]
    fn rejects_unreachable_difficulty() {
        let err = Chain::new(65).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InvalidDifficulty {
                requested: 65,
                max: MAX_DIFFICULTY
            }
        );
        assert!(Chain::new(64).is_ok());
    }

    #[test]
    fn alice_pays_bob_at_difficulty_two() {
        let mut chain = Chain::new(2).unwrap();
        let block = chain.append(transfer("Alice", "Bob", 5.0).unwrap()).clone();

        assert!(block.digest().starts_with("00"));
        assert_eq!(block.digest().len(), 64);
        assert!(
            block
                .digest()
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        );
        assert_eq!(block.previous_digest, "0");
        assert_eq!(block.previous_digest, chain.blocks[0].digest);
        assert!(chain.is_valid());
    }

    #[test]
    fn difficulty_zero_accepts_first_candidate() {
        let mut chain = Chain::with_clock(0, fixed()).unwrap();
        let block = chain.append(transfer("Alice", "Bob", 5.0).unwrap());
        assert_eq!(block.proof_of_work, 0);
        assert_eq!(block.digest(), block.calculate_digest());
    }

    #[test]
    fn append_grows_by_one_and_links_to_tail() {
        let chain = populated(1);
        assert_eq!(chain.len(), 5);
        for pair in chain.blocks.windows(2) {
            assert_eq!(pair[1].previous_digest, pair[0].digest);
        }
        for block in &chain.blocks[1..] {
            assert!(block.digest.starts_with('0'));
            assert_eq!(block.digest(), block.calculate_digest());
        }
    }

    #[test]
    fn genesis_is_exempt_from_difficulty() {
        let chain = populated(2);
        assert!(!chain.blocks[0].digest.starts_with("00"));
        assert_eq!(chain.verify(), Ok(()));
    }

    #[test]
    fn digests_enumerate_non_genesis_in_order() {
        let chain = populated(1);
        let first: Vec<&str> = chain.digests().collect();
        let second: Vec<&str> = chain.digests().collect();

        assert_eq!(first.len(), 4);
        assert_eq!(first, second);
        let expected: Vec<&str> = chain.blocks[1..].iter().map(Block::digest).collect();
        assert_eq!(first, expected);
    }

    #[test]
    fn fixed_clock_makes_chains_reproducible() {
        let a: Vec<String> = populated(1).digests().map(String::from).collect();
        let b: Vec<String> = populated(1).digests().map(String::from).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn tampered_payload_is_detected() {
        let mut chain = populated(1);
        chain.blocks[2]
            .payload
            .insert("amount".into(), Value::try_from(2000.0).unwrap());

        assert_eq!(chain.verify(), Err(Violation::DigestMismatch { index: 2 }));
        assert!(!chain.is_valid());
    }

    #[test]
    fn amounts_cannot_be_swapped_between_non_finite_values() {
        let mut chain = Chain::with_clock(1, fixed()).unwrap();
        assert!(transfer("Alice", "Bob", f64::NAN).is_err());
        assert!(Value::try_from(f64::INFINITY).is_err());
        assert_eq!(chain.len(), 1);

        chain.append(transfer("Alice", "Bob", f64::MAX).unwrap());
        chain.blocks[1]
            .payload
            .insert("amount".into(), Value::try_from(f64::MIN).unwrap());
        assert_eq!(chain.verify(), Err(Violation::DigestMismatch { index: 1 }));
    }

    #[test]
    fn tampered_timestamp_is_detected() {
        let mut chain = populated(1);
        chain.blocks[1].created_at = chain.blocks[1].created_at + Duration::seconds(1);
        assert_eq!(chain.verify(), Err(Violation::DigestMismatch { index: 1 }));
    }

    #[test]
    fn overwritten_link_is_detected() {
        let mut chain = populated(1);
        chain.blocks[3].previous_digest = "deadbeef".into();
        assert!(!chain.is_valid());
    }

    #[test]
    fn remined_block_with_foreign_link_is_detected() {
        let mut chain = populated(1);
        let forged = Block::new(
            "deadbeef".into(),
            chain.blocks[3].payload.clone(),
            chain.blocks[3].created_at,
        )
        .mine(1);
        chain.blocks[3] = forged;

        assert_eq!(chain.verify(), Err(Violation::BrokenLink { index: 3 }));
        assert!(!chain.is_valid());
    }

    #[test]
    fn reordering_is_detected() {
        let mut chain = populated(1);
        chain.blocks.swap(1, 2);
        assert!(!chain.is_valid());
    }
}
