//! Error types for the batball scoring engine.
//!
//! All errors use the `BB_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Delivery construction errors
//! - 2xx: Selection errors
//! - 3xx: Run-out flow errors
//! - 4xx: Innings errors
//! - 5xx: Settings errors
//! - 6xx: Persistence errors
//! - 9xx: General / internal errors
//!
//! Missing crease occupants or bowler are **not** errors: the scoring core
//! reports them as selection requests so the caller can resolve and retry.

use thiserror::Error;

use crate::{Innings, MatchId, PlayerId};

/// Central error enum for all batball operations.
#[derive(Debug, Error)]
pub enum BatballError {
    // =================================================================
    // Delivery Errors (1xx)
    // =================================================================
    /// Runs off the bat exceed what one delivery can carry.
    #[error("BB_ERR_100: Runs off bat out of range: {runs} (max {max})")]
    RunsOutOfRange { runs: u32, max: u32 },

    /// A retirement marker must be a legal, scoreless delivery.
    #[error("BB_ERR_101: Invalid retirement marker: {reason}")]
    InvalidRetirement { reason: String },

    /// The player asked to retire is not at the crease.
    #[error("BB_ERR_102: Player not at the crease: {0}")]
    NotAtCrease(PlayerId),

    // =================================================================
    // Selection Errors (2xx)
    // =================================================================
    /// The player cannot take this slot (wrong team, dismissed, already in).
    #[error("BB_ERR_200: Player not eligible: {player}: {reason}")]
    PlayerNotEligible { player: PlayerId, reason: String },

    /// A resolution call arrived for a selection nobody asked for.
    #[error("BB_ERR_201: No pending selection of kind {expected}")]
    NoSelectionPending { expected: String },

    // =================================================================
    // Run-out Errors (3xx)
    // =================================================================
    /// A run-out step was resolved out of order.
    #[error("BB_ERR_300: Run-out step mismatch: expected {expected}, got {actual}")]
    RunOutStepMismatch { expected: String, actual: String },

    // =================================================================
    // Innings Errors (4xx)
    // =================================================================
    /// Innings transition requested from an innings that has no successor.
    #[error("BB_ERR_400: No innings follows {0}")]
    NoFollowingInnings(Innings),

    /// Finalization requested before the match has ended.
    #[error("BB_ERR_401: Match not complete")]
    MatchNotComplete,

    // =================================================================
    // Settings Errors (5xx)
    // =================================================================
    /// Match settings failed validation.
    #[error("BB_ERR_500: Invalid settings: {reason}")]
    InvalidSettings { reason: String },

    /// A team is smaller than the minimum squad.
    #[error("BB_ERR_501: Squad too small: {size} players (min {min})")]
    SquadTooSmall { size: u32, min: u32 },

    // =================================================================
    // Persistence Errors (6xx)
    // =================================================================
    /// Snapshot is structurally readable but violates a state invariant.
    #[error("BB_ERR_600: Snapshot invariant violated: {reason}")]
    SnapshotInvariant { reason: String },

    /// Snapshot history digest does not match its recorded root.
    #[error("BB_ERR_601: Snapshot digest mismatch: expected {expected}, got {actual}")]
    SnapshotDigestMismatch { expected: String, actual: String },

    /// Snapshot belongs to another match.
    #[error("BB_ERR_602: Snapshot belongs to {found}, expected {expected}")]
    SnapshotMatchMismatch { expected: MatchId, found: MatchId },

    /// Snapshot was written by an unknown schema version.
    #[error("BB_ERR_603: Unsupported snapshot schema version {0}")]
    UnsupportedSchema(u32),

    /// The key-value store rejected an operation.
    #[error("BB_ERR_604: Store error: {0}")]
    Store(String),

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("BB_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("BB_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// I/O error (script files, stores backed by disk).
    #[error("BB_ERR_903: I/O error: {0}")]
    Io(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, BatballError>;

impl From<std::io::Error> for BatballError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BatballError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_contains_prefix() {
        let err = BatballError::NotAtCrease(PlayerId::new("p1"));
        let msg = format!("{err}");
        assert!(msg.starts_with("BB_ERR_102"), "Got: {msg}");
        assert!(msg.contains("p1"));
    }

    #[test]
    fn runs_out_of_range_display() {
        let err = BatballError::RunsOutOfRange { runs: 9, max: 7 };
        let msg = format!("{err}");
        assert!(msg.contains("BB_ERR_100"));
        assert!(msg.contains('9'));
        assert!(msg.contains('7'));
    }

    #[test]
    fn innings_error_names_innings() {
        let msg = format!("{}", BatballError::NoFollowingInnings(Innings::Second));
        assert!(msg.contains("BB_ERR_400"));
        assert!(msg.contains("SECOND"));
    }

    #[test]
    fn all_errors_have_bb_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(BatballError::MatchNotComplete),
            Box::new(BatballError::UnsupportedSchema(9)),
            Box::new(BatballError::Internal("test".into())),
            Box::new(BatballError::SnapshotDigestMismatch {
                expected: "a".into(),
                actual: "b".into(),
            }),
            Box::new(BatballError::SquadTooSmall { size: 1, min: 2 }),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("BB_ERR_"),
                "Error missing BB_ERR_ prefix: {msg}"
            );
        }
    }

    #[test]
    fn serde_json_error_converts() {
        let parse: std::result::Result<u32, _> = serde_json::from_str("not json");
        let err: BatballError = parse.unwrap_err().into();
        assert!(matches!(err, BatballError::Serialization(_)));
    }
}
