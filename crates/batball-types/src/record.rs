//! Outward-facing projections: the registry entry published on every
//! mutation and the finalized record handed to archival on completion.
//!
//! Neither is ever read back by the scoring core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Delivery, Innings, MatchId, MatchSettings, MatchState, TeamId};

/// Team identity as shown in discovery lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRef {
    pub id: TeamId,
    pub name: String,
}

/// Lightweight projection of a live match for discovery by other sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub match_id: MatchId,
    pub team_a: TeamRef,
    pub team_b: TeamRef,
    pub runs: u32,
    pub wickets_down: u32,
    pub overs_label: String,
    pub innings: Innings,
    pub target: Option<u32>,
    pub last_updated: DateTime<Utc>,
}

impl RegistryEntry {
    /// Project the current state into a registry entry.
    #[must_use]
    pub fn project(settings: &MatchSettings, state: &MatchState) -> Self {
        Self {
            match_id: settings.match_id,
            team_a: TeamRef {
                id: settings.team_a.id.clone(),
                name: settings.team_a.name.clone(),
            },
            team_b: TeamRef {
                id: settings.team_b.id.clone(),
                name: settings.team_b.name.clone(),
            },
            runs: state.runs,
            wickets_down: state.wickets_down,
            overs_label: state.overs_label(),
            innings: state.innings,
            target: state.target(),
            last_updated: Utc::now(),
        }
    }
}

/// Score line of one innings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InningsScore {
    pub team_id: TeamId,
    pub runs: u32,
    pub wickets: u32,
    pub overs_label: String,
}

/// How a finished match was decided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchResult {
    Won { winner: TeamId, margin: Margin },
    Tied,
}

/// Winning margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Margin {
    /// Defending side won by this many runs.
    Runs(u32),
    /// Chasing side won with this many wickets in hand.
    Wickets(u32),
}

fn plural(n: u32) -> &'static str {
    if n == 1 { "" } else { "s" }
}

impl std::fmt::Display for MatchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tied => write!(f, "match tied"),
            Self::Won {
                winner,
                margin: Margin::Runs(n),
            } => write!(f, "{winner} won by {n} run{}", plural(*n)),
            Self::Won {
                winner,
                margin: Margin::Wickets(n),
            } => write!(f, "{winner} won by {n} wicket{}", plural(*n)),
        }
    }
}

/// Final score of both innings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalScore {
    pub first: InningsScore,
    pub second: InningsScore,
    pub target: u32,
    pub result: MatchResult,
}

/// Permanent record of a completed match, handed to archival/export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: MatchId,
    pub date: DateTime<Utc>,
    pub settings: MatchSettings,
    pub history: Vec<Delivery>,
    pub final_score: FinalScore,
    /// Hex SHA-256 root over `history`.
    pub history_root: String,
}
