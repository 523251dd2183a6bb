//! The shared match registry: a JSON list of [`RegistryEntry`] under one key.
//!
//! Every session upserts its own entry on each publish and removes it when
//! the match is finalized. Other sessions only read the list.

use batball_types::{MatchId, RegistryEntry, Result};

use crate::store::KeyValueStore;

/// Read the registry list. A missing or unreadable list reads as empty.
pub fn load_registry<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Result<Vec<RegistryEntry>> {
    let Some(raw) = store.get(key)? else {
        return Ok(Vec::new());
    };
    match serde_json::from_str(&raw) {
        Ok(entries) => Ok(entries),
        Err(e) => {
            tracing::warn!(key, error = %e, "Registry unreadable, starting a new list");
            Ok(Vec::new())
        }
    }
}

/// Insert or replace the entry for `entry.match_id`.
pub fn upsert_entry<S: KeyValueStore + ?Sized>(
    store: &S,
    key: &str,
    entry: RegistryEntry,
) -> Result<()> {
    let mut entries = load_registry(store, key)?;
    match entries.iter_mut().find(|e| e.match_id == entry.match_id) {
        Some(existing) => *existing = entry,
        None => entries.push(entry),
    }
    store.put(key, serde_json::to_string(&entries)?)
}

/// Drop the entry for `match_id`, if present.
pub fn remove_entry<S: KeyValueStore + ?Sized>(store: &S, key: &str, match_id: MatchId) -> Result<()> {
    let mut entries = load_registry(store, key)?;
    let before = entries.len();
    entries.retain(|e| e.match_id != match_id);
    if entries.len() != before {
        store.put(key, serde_json::to_string(&entries)?)?;
    }
    Ok(())
}
