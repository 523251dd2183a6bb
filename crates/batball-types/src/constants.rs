//! System-wide constants for the batball scoring engine.

/// Legal deliveries in one over.
pub const BALLS_PER_OVER: u32 = 6;

/// Highest number of runs a single delivery may carry off the bat
/// (six plus an overthrow boundary is the practical ceiling).
pub const MAX_RUNS_OFF_BAT: u32 = 7;

/// Runs awarded to the batting side for a wide or no-ball, on top of any
/// runs taken.
pub const EXTRA_RUN_PENALTY: u32 = 1;

/// Longest innings, in overs, a match may be configured with.
pub const MAX_TOTAL_OVERS: u32 = 1_000;

/// Smallest squad that can still field two batters at the crease.
pub const MIN_SQUAD_SIZE: u32 = 2;

/// Default number of balls faced after which a batter is flagged as due to retire.
pub const DEFAULT_RETIREMENT_LIMIT: u32 = 8;

/// Store key under which the active match snapshot is written.
pub const DEFAULT_ACTIVE_STATE_KEY: &str = "active_match_state";

/// Store key under which the match registry list is written.
pub const DEFAULT_REGISTRY_KEY: &str = "match_registry";

/// Schema version stamped into every persisted snapshot envelope.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "Batball";
