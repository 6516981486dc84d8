pub mod model;

pub use model::{Payload, canonical_json, transfer};
