//! Opaque proposal values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A value a client asks the cluster to agree on.
///
/// The protocol never looks inside a value; it only copies and compares it.
/// Scripts carry values as text, so the text form is what is stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Value(String);

impl Value {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Interpret the value as an integer, if it is one.
    pub fn as_i64(&self) -> Option<i64> {
        self.0.trim().parse().ok()
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_values() {
        assert_eq!(Value::from(42).as_i64(), Some(42));
        assert_eq!(Value::from("-7").as_i64(), Some(-7));
        assert_eq!(Value::from("forty-two").as_i64(), None);
    }
}
