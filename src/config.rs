use std::env;

use crate::blockchain::{DEFAULT_DIFFICULTY, checked_difficulty};
use crate::error::{LedgerError, Result};

/// Process settings read from the environment (after `.env` is loaded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub difficulty: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let difficulty = match lookup("DIFFICULTY") {
            Some(raw) => parse_difficulty(&raw)?,
            None => DEFAULT_DIFFICULTY,
        };
        Ok(Self { difficulty })
    }
}

fn parse_difficulty(raw: &str) -> Result<u32> {
    let value: i64 = raw.trim().parse().map_err(|_| LedgerError::InvalidEnv {
        var: "DIFFICULTY",
        value: raw.to_string(),
    })?;
    checked_difficulty(value)
}
