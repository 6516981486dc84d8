use thiserror::Error;

use crate::blockchain::MAX_DIFFICULTY;

/// Failures surfaced to the caller before any chain state is touched.
#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    #[error("difficulty {requested} is out of range (0..={max})")]
    InvalidDifficulty { requested: i64, max: usize },

    #[error("environment variable {var} has an unparsable value {value:?}")]
    InvalidEnv { var: &'static str, value: String },

    #[error("payload number {0} is not finite")]
    NonFiniteNumber(f64),
}

impl LedgerError {
    pub fn invalid_difficulty(requested: i64) -> Self {
        LedgerError::InvalidDifficulty {
            requested,
            max: MAX_DIFFICULTY,
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
