//! Publishing the session's state to the store.
//!
//! Publishing is fire-and-forget from the session's point of view: a store
//! failure is logged and never rolls back a scoring operation.
//!
//! ```text
//!  ScoringSession ──publish──▶ StorePublisher ──▶ KeyValueStore      (inline)
//!  ScoringSession ──publish──▶ ChannelPublisher ──mpsc──▶ run_store_writer ──▶ KeyValueStore
//! ```

use batball_types::{MatchId, RegistryEntry, Result, SessionConfig};
use tokio::sync::mpsc;

use crate::{
    registry::{remove_entry, upsert_entry},
    snapshot::SnapshotEnvelope,
    store::KeyValueStore,
};

/// Receives every state change of a session.
pub trait SnapshotPublisher {
    /// Persist the latest snapshot and its registry projection.
    fn publish(&self, envelope: &SnapshotEnvelope, entry: &RegistryEntry);
    /// Forget the active match after finalization.
    fn clear(&self, match_id: MatchId);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPublisher;

impl SnapshotPublisher for NullPublisher {
    fn publish(&self, _envelope: &SnapshotEnvelope, _entry: &RegistryEntry) {}
    fn clear(&self, _match_id: MatchId) {}
}

/// Write a snapshot and upsert its registry entry.
pub fn write_snapshot<S: KeyValueStore + ?Sized>(
    store: &S,
    config: &SessionConfig,
    envelope: &SnapshotEnvelope,
    entry: RegistryEntry,
) -> Result<()> {
    store.put(&config.active_state_key, serde_json::to_string(envelope)?)?;
    upsert_entry(store, &config.registry_key, entry)
}

/// Remove the active snapshot and the match's registry entry.
pub fn clear_snapshot<S: KeyValueStore + ?Sized>(
    store: &S,
    config: &SessionConfig,
    match_id: MatchId,
) -> Result<()> {
    store.remove(&config.active_state_key)?;
    remove_entry(store, &config.registry_key, match_id)
}

/// Writes straight to a store on the caller's thread.
#[derive(Debug, Clone)]
pub struct StorePublisher<S> {
    store: S,
    config: SessionConfig,
}

impl<S: KeyValueStore> StorePublisher<S> {
    pub fn new(store: S, config: SessionConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: KeyValueStore> SnapshotPublisher for StorePublisher<S> {
    fn publish(&self, envelope: &SnapshotEnvelope, entry: &RegistryEntry) {
        if let Err(e) = write_snapshot(&self.store, &self.config, envelope, entry.clone()) {
            tracing::warn!(match_id = %envelope.match_id, error = %e, "Snapshot publish failed");
        }
    }

    fn clear(&self, match_id: MatchId) {
        if let Err(e) = clear_snapshot(&self.store, &self.config, match_id) {
            tracing::warn!(match_id = %match_id, error = %e, "Snapshot clear failed");
        }
    }
}

/// Command sent from a session to the store writer task.
#[derive(Debug, Clone)]
pub enum SyncCommand {
    Publish {
        envelope: Box<SnapshotEnvelope>,
        entry: RegistryEntry,
    },
    Clear {
        match_id: MatchId,
    },
}

/// Hands snapshots to a background writer over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelPublisher {
    tx: mpsc::UnboundedSender<SyncCommand>,
}

impl ChannelPublisher {
    /// Create the publisher and the receiver to pass to [`run_store_writer`].
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SyncCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, command: SyncCommand) {
        if self.tx.send(command).is_err() {
            tracing::warn!("Store writer gone, snapshot dropped");
        }
    }
}

impl SnapshotPublisher for ChannelPublisher {
    fn publish(&self, envelope: &SnapshotEnvelope, entry: &RegistryEntry) {
        self.send(SyncCommand::Publish {
            envelope: Box::new(envelope.clone()),
            entry: entry.clone(),
        });
    }

    fn clear(&self, match_id: MatchId) {
        self.send(SyncCommand::Clear { match_id });
    }
}

/// Drain commands into `store` until every sender is dropped.
///
/// Returns the number of commands applied.
pub async fn run_store_writer<S: KeyValueStore>(
    mut rx: mpsc::UnboundedReceiver<SyncCommand>,
    store: S,
    config: SessionConfig,
) -> usize {
    let mut applied = 0;
    while let Some(command) = rx.recv().await {
        let result = match command {
            SyncCommand::Publish { envelope, entry } => {
                write_snapshot(&store, &config, &envelope, entry)
            }
            SyncCommand::Clear { match_id } => clear_snapshot(&store, &config, match_id),
        };
        match result {
            Ok(()) => applied += 1,
            Err(e) => tracing::warn!(error = %e, "Store writer command failed"),
        }
    }
    tracing::debug!(applied, "Store writer stopped");
    applied
}
