use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Human-readable order number handed to customers in chat, e.g. `FFC-83921`.
///
/// Five random digits keeps the number short enough to read back over a
/// phone call; collisions across the shop's volume are handled at insert
/// time by regenerating.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Generate a fresh order number in the `FFC-NNNNN` format.
    pub fn generate() -> Self {
        let digits: u32 = rand::thread_rng().gen_range(0..100_000);
        Self(format!("FFC-{:05}", digits))
    }

    /// Wrap an existing order number (e.g. read back from the store).
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for OrderId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}
