use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{LedgerError, Result};

/// Record data carried by a block. Keys iterate in lexicographic order,
/// which is what makes the serialized form canonical.
pub type Payload = BTreeMap<String, Value>;

/// A finite floating point number. NaN and the infinities have no JSON
/// encoding of their own, so they are refused at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Number(f64);

impl Number {
    pub fn new(v: f64) -> Result<Self> {
        if v.is_finite() {
            Ok(Number(v))
        } else {
            Err(LedgerError::NonFiniteNumber(v))
        }
    }
}

/// A single payload value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Integer(i64),
    Float(Number),
    Text(String),
    Map(Payload),
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<Payload> for Value {
    fn from(v: Payload) -> Self {
        Value::Map(v)
    }
}

impl TryFrom<f64> for Value {
    type Error = LedgerError;

    fn try_from(v: f64) -> Result<Self> {
        Number::new(v).map(Value::Float)
    }
}

/// Compact JSON with keys sorted at every level.
pub fn canonical_json(payload: &Payload) -> String {
    serde_json::to_string(payload).expect("string-keyed map always serializes")
}

/// A value transfer record: who sent how much to whom.
pub fn transfer(from: &str, to: &str, amount: f64) -> Result<Payload> {
    let mut payload = Payload::new();
    payload.insert("from".into(), from.into());
    payload.insert("to".into(), to.into());
    payload.insert("amount".into(), Value::try_from(amount)?);
    Ok(payload)
}
