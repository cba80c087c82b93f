//! Token newtypes for the two fields carried by a frame.
//!
//! The reader firmware sends both fields as opaque text. They are stored
//! verbatim, so the newtypes only keep the two columns from being swapped.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the scanned member (first token of a frame).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    /// Wrap a raw token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Borrow the raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Allow flag reported by the reader (second token of a frame).
///
/// Usually `1` or `0`, but any token the reader emits is kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllowFlag(String);

impl AllowFlag {
    /// Wrap a raw token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Borrow the raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AllowFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_id_display() {
        assert_eq!(MemberId::new("42").to_string(), "42");
    }

    #[test]
    fn test_tokens_serialize_transparently() {
        let json = serde_json::to_string(&AllowFlag::new("1")).unwrap();
        assert_eq!(json, "\"1\"");
    }
}
