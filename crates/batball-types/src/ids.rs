//! Identifiers used throughout batball.
//!
//! Deliveries and matches use UUIDv7 so that ids sort by creation time.
//! Players and teams keep the opaque string ids handed over by the setup
//! layer, which owns roster persistence.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// DeliveryId
// ---------------------------------------------------------------------------

/// Unique identifier of one recorded delivery. Uses UUIDv7 for time-ordered sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct DeliveryId(pub Uuid);

impl DeliveryId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }
}

impl Default for DeliveryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DeliveryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// MatchId
// ---------------------------------------------------------------------------

/// Identifier of one match; scopes the persisted snapshot and registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct MatchId(pub Uuid);

impl MatchId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }
}

impl Default for MatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "match:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// PlayerId
// ---------------------------------------------------------------------------

/// Opaque player identifier assigned at squad setup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct PlayerId(pub String);

impl PlayerId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// TeamId
// ---------------------------------------------------------------------------

/// Opaque team identifier assigned at match setup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TeamId(pub String);

impl TeamId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl From<&str> for TeamId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "team:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivery_id_uniqueness() {
        let a = DeliveryId::new();
        let b = DeliveryId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn delivery_id_ordering() {
        let a = DeliveryId::new();
        let b = DeliveryId::new();
        assert!(a < b);
    }

    #[test]
    fn player_id_display_is_raw() {
        let id = PlayerId::new("p-7");
        assert_eq!(id.to_string(), "p-7");
        assert_eq!(id.as_str(), "p-7");
        assert_eq!(PlayerId::from("p-7"), id);
    }

    #[test]
    fn match_id_display_prefix() {
        let id = MatchId::from_bytes([0; 16]);
        assert!(id.to_string().starts_with("match:"));
    }

    #[test]
    fn player_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&PlayerId::new("abc")).unwrap();
        assert_eq!(json, "\"abc\"");
        let back: PlayerId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, PlayerId::new("abc"));
    }
}
