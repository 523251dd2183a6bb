//! Persisted snapshot envelope and rehydration.
//!
//! The active match is written under a single key as a versioned envelope:
//!
//! ```text
//! { schema_version, match_id, state, pending, history_root, saved_at }
//! ```
//!
//! On resume the envelope is checked in order: schema version, match id,
//! history digest, then the state invariants. Any failure discards the
//! snapshot and the session starts fresh; the caller learns about it through
//! [`Recovery::Discarded`].

use batball_scoring::{SelectionPrompt, history_root_hex, required_selections, verify_history_root};
use batball_types::{
    BatballError, MatchId, MatchSettings, MatchState, Result, SessionConfig, constants,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::KeyValueStore;

/// Versioned, self-verifying wrapper around a persisted [`MatchState`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEnvelope {
    pub schema_version: u32,
    pub match_id: MatchId,
    pub state: MatchState,
    /// Selections outstanding when the snapshot was taken, including any
    /// run-out flow in progress.
    #[serde(default)]
    pub pending: Vec<SelectionPrompt>,
    /// Hex SHA-256 root over `state.history`.
    pub history_root: String,
    pub saved_at: DateTime<Utc>,
}

impl SnapshotEnvelope {
    #[must_use]
    pub fn capture(match_id: MatchId, state: &MatchState, pending: &[SelectionPrompt]) -> Self {
        Self {
            schema_version: constants::SNAPSHOT_SCHEMA_VERSION,
            match_id,
            state: state.clone(),
            pending: pending.to_vec(),
            history_root: history_root_hex(&state.history),
            saved_at: Utc::now(),
        }
    }

    /// Check the envelope against the match it is being loaded into.
    ///
    /// # Errors
    /// - [`BatballError::UnsupportedSchema`]
    /// - [`BatballError::SnapshotMatchMismatch`]
    /// - [`BatballError::SnapshotDigestMismatch`]
    /// - [`BatballError::SnapshotInvariant`]
    pub fn verify(&self, settings: &MatchSettings) -> Result<()> {
        if self.schema_version != constants::SNAPSHOT_SCHEMA_VERSION {
            return Err(BatballError::UnsupportedSchema(self.schema_version));
        }
        if self.match_id != settings.match_id {
            return Err(BatballError::SnapshotMatchMismatch {
                expected: settings.match_id,
                found: self.match_id,
            });
        }
        if !verify_history_root(&self.state.history, &self.history_root) {
            return Err(BatballError::SnapshotDigestMismatch {
                expected: self.history_root.clone(),
                actual: history_root_hex(&self.state.history),
            });
        }
        self.state.check_invariants(settings.players_per_team)
    }
}

/// How a resumed session obtained its state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recovery {
    /// Nothing was persisted.
    Fresh,
    /// The snapshot passed every check.
    Restored,
    /// A snapshot existed but could not be used.
    Discarded { reason: String },
}

/// State and outstanding selections recovered from the store.
#[derive(Debug, Clone)]
pub struct Rehydrated {
    pub state: MatchState,
    pub pending: Vec<SelectionPrompt>,
    pub recovery: Recovery,
}

fn decode(raw: &str, settings: &MatchSettings) -> Result<SnapshotEnvelope> {
    let envelope: SnapshotEnvelope = serde_json::from_str(raw)?;
    envelope.verify(settings)?;
    Ok(envelope)
}

/// Load the active snapshot, falling back to a fresh state on any failure.
pub fn rehydrate<S: KeyValueStore + ?Sized>(
    store: &S,
    config: &SessionConfig,
    settings: &MatchSettings,
) -> Rehydrated {
    let fresh = |recovery: Recovery| {
        let state = MatchState::new();
        let pending = required_selections(&state, settings);
        Rehydrated {
            state,
            pending,
            recovery,
        }
    };

    let raw = match store.get(&config.active_state_key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return fresh(Recovery::Fresh),
        Err(e) => {
            tracing::warn!(error = %e, "Snapshot read failed, starting fresh");
            return fresh(Recovery::Discarded {
                reason: e.to_string(),
            });
        }
    };

    match decode(&raw, settings) {
        Ok(envelope) => {
            let pending = if envelope.pending.is_empty() {
                required_selections(&envelope.state, settings)
            } else {
                envelope.pending
            };
            tracing::info!(
                match_id = %envelope.match_id,
                deliveries = envelope.state.history.len(),
                saved_at = %envelope.saved_at,
                "Snapshot restored"
            );
            Rehydrated {
                state: envelope.state,
                pending,
                recovery: Recovery::Restored,
            }
        }
        Err(e) => {
            tracing::warn!(
                key = %config.active_state_key,
                error = %e,
                "Snapshot discarded, starting fresh"
            );
            fresh(Recovery::Discarded {
                reason: e.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use batball_scoring::{DeliveryIntent, DeliveryOutcome, apply_delivery};

    use super::*;
    use crate::store::MemoryStore;

    fn played() -> (MatchSettings, MatchState) {
        let settings = MatchSettings::dummy(5, 2);
        let mut state = MatchState::dummy_ready();
        for runs in [1, 4, 0] {
            match apply_delivery(&state, &settings, &DeliveryIntent::legal(runs)).unwrap() {
                DeliveryOutcome::Applied(a) => state = a.state,
                other => panic!("unexpected {other:?}"),
            }
        }
        (settings, state)
    }

    fn stored(envelope: &SnapshotEnvelope) -> (MemoryStore, SessionConfig) {
        let store = MemoryStore::new();
        let config = SessionConfig::default();
        store
            .put(
                &config.active_state_key,
                serde_json::to_string(envelope).unwrap(),
            )
            .unwrap();
        (store, config)
    }

    #[test]
    fn missing_snapshot_is_fresh() {
        let settings = MatchSettings::dummy(5, 2);
        let r = rehydrate(&MemoryStore::new(), &SessionConfig::default(), &settings);
        assert_eq!(r.recovery, Recovery::Fresh);
        assert_eq!(r.pending.len(), 3);
    }

    #[test]
    fn valid_snapshot_restores() {
        let (settings, state) = played();
        let (store, config) = stored(&SnapshotEnvelope::capture(settings.match_id, &state, &[]));
        let r = rehydrate(&store, &config, &settings);
        assert_eq!(r.recovery, Recovery::Restored);
        assert_eq!(r.state, state);
        assert!(r.pending.is_empty());
    }

    #[test]
    fn truncated_history_is_discarded() {
        let (settings, state) = played();
        let mut envelope = SnapshotEnvelope::capture(settings.match_id, &state, &[]);
        envelope.state.history.pop();
        let (store, config) = stored(&envelope);
        let r = rehydrate(&store, &config, &settings);
        assert!(matches!(r.recovery, Recovery::Discarded { .. }));
        assert_eq!(r.state, MatchState::new());
    }

    #[test]
    fn counter_drift_is_discarded() {
        let (settings, state) = played();
        let mut envelope = SnapshotEnvelope::capture(settings.match_id, &state, &[]);
        envelope.state.runs += 1;
        let (store, config) = stored(&envelope);
        let Recovery::Discarded { reason } = rehydrate(&store, &config, &settings).recovery else {
            panic!("expected discard");
        };
        assert!(reason.contains("BB_ERR_600"));
    }

    #[test]
    fn other_match_is_discarded() {
        let (settings, state) = played();
        let envelope = SnapshotEnvelope::capture(MatchId::from_bytes([9; 16]), &state, &[]);
        let (store, config) = stored(&envelope);
        let Recovery::Discarded { reason } = rehydrate(&store, &config, &settings).recovery else {
            panic!("expected discard");
        };
        assert!(reason.contains("BB_ERR_602"));
    }

    #[test]
    fn unknown_schema_is_discarded() {
        let (settings, state) = played();
        let mut envelope = SnapshotEnvelope::capture(settings.match_id, &state, &[]);
        envelope.schema_version = 99;
        let (store, config) = stored(&envelope);
        assert!(matches!(
            rehydrate(&store, &config, &settings).recovery,
            Recovery::Discarded { .. }
        ));
    }

    #[test]
    fn garbage_is_discarded() {
        let settings = MatchSettings::dummy(5, 2);
        let store = MemoryStore::new();
        let config = SessionConfig::default();
        store.put(&config.active_state_key, "][".to_string()).unwrap();
        assert!(matches!(
            rehydrate(&store, &config, &settings).recovery,
            Recovery::Discarded { .. }
        ));
    }
}
