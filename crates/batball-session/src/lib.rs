//! # batball-session
//!
//! **Single-writer scoring session with snapshot persistence.**
//!
//! [`ScoringSession`] owns the authoritative [`MatchState`](batball_types::MatchState)
//! of one match and is the only thing that mutates it. After every change
//! it publishes a versioned [`SnapshotEnvelope`] and a
//! [`RegistryEntry`](batball_types::RegistryEntry) through a
//! [`SnapshotPublisher`]:
//!
//! - [`StorePublisher`]: inline writes to a [`KeyValueStore`]
//! - [`ChannelPublisher`]: fire-and-forget over a tokio channel, drained by
//!   [`run_store_writer`]
//! - [`NullPublisher`]: no persistence
//!
//! On startup [`ScoringSession::resume`] rehydrates the last snapshot,
//! verifying schema, match id, history digest and state invariants.

pub mod publisher;
pub mod registry;
pub mod session;
pub mod snapshot;
pub mod store;

pub use publisher::{
    ChannelPublisher, NullPublisher, SnapshotPublisher, StorePublisher, SyncCommand,
    clear_snapshot, run_store_writer, write_snapshot,
};
pub use registry::{load_registry, remove_entry, upsert_entry};
pub use session::ScoringSession;
pub use snapshot::{Recovery, Rehydrated, SnapshotEnvelope, rehydrate};
pub use store::{KeyValueStore, MemoryStore};
