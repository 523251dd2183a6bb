//! Configuration for a scoring session's storage boundary.

use serde::{Deserialize, Serialize};

use crate::constants;

/// Where a session writes its snapshot and registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Key of the active match snapshot.
    pub active_state_key: String,
    /// Key of the registry list shared by all sessions.
    pub registry_key: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            active_state_key: constants::DEFAULT_ACTIVE_STATE_KEY.to_string(),
            registry_key: constants::DEFAULT_REGISTRY_KEY.to_string(),
        }
    }
}
