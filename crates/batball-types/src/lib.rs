//! # batball-types
//!
//! Shared types, errors, and configuration for the **batball** scoring engine.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`DeliveryId`], [`MatchId`], [`PlayerId`], [`TeamId`]
//! - **Delivery model**: [`Delivery`], [`DeliveryKind`], [`WicketKind`], [`Innings`], [`CreaseSnapshot`]
//! - **Match state**: [`MatchState`], [`InningsSummary`]
//! - **Settings**: [`MatchSettings`], [`Team`], [`Player`], [`Toss`]
//! - **Configuration**: [`SessionConfig`]
//! - **Projections**: [`RegistryEntry`], [`MatchRecord`], [`FinalScore`], [`MatchResult`]
//! - **Errors**: [`BatballError`] with `BB_ERR_` prefix codes
//! - **Constants**: format limits and storage defaults

pub mod config;
pub mod constants;
pub mod delivery;
pub mod error;
pub mod ids;
pub mod record;
pub mod settings;
pub mod state;

// Re-export all primary types at crate root for ergonomic imports:
//   use batball_types::{Delivery, MatchState, MatchSettings, ...};

pub use config::*;
pub use delivery::*;
pub use error::*;
pub use ids::*;
pub use record::*;
pub use settings::*;
pub use state::*;

// Constants are accessed via `batball_types::constants::FOO`
// (not re-exported to avoid name collisions).
