use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// A wrapper for customer chat identifiers (phone numbers on most gateways)
/// that masks the value in Debug/Display output so log macros never leak a
/// full number. Serialization passes the real value through: dashboard
/// responses need it, logs go through `{:?}`.
#[derive(Clone, Deserialize)]
pub struct Masked<T>(pub T);

impl<T: fmt::Display> Masked<T> {
    /// Last three characters of the value, enough for an operator to tell
    /// customers apart in a log stream.
    fn tail(&self) -> String {
        let raw = self.0.to_string();
        let tail: String = raw
            .chars()
            .rev()
            .take(3)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("***{}", tail)
    }
}

impl<T: fmt::Display> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tail())
    }
}

impl<T: fmt::Display> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tail())
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<T> Masked<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_masks_all_but_tail() {
        let id = Masked("15551234567".to_string());
        assert_eq!(format!("{:?}", id), "***567");
    }
}
