//! Match settings handed over by the setup layer.
//!
//! Squads are built and persisted elsewhere; the scoring engine only needs
//! the two rosters, the format (overs, squad size) and the toss outcome
//! that decides who bats first.

use serde::{Deserialize, Serialize};

use crate::{BatballError, Innings, MatchId, PlayerId, Result, TeamId, constants};

/// A rostered player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

impl Player {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: PlayerId::new(id),
            name: name.into(),
        }
    }
}

/// A team and its match-day squad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub players: Vec<Player>,
}

impl Team {
    #[must_use]
    pub fn has_player(&self, player: &PlayerId) -> bool {
        self.players.iter().any(|p| &p.id == player)
    }

    #[must_use]
    pub fn player(&self, player: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == player)
    }
}

/// What the toss winner chose to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TossDecision {
    Bat,
    Bowl,
}

/// Toss outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toss {
    pub winner: TeamId,
    pub decision: TossDecision,
}

fn default_retirement_limit() -> u32 {
    constants::DEFAULT_RETIREMENT_LIMIT
}

/// Format and participants of one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSettings {
    pub match_id: MatchId,
    /// Overs per innings.
    pub total_overs: u32,
    /// Squad size; an innings ends once `players_per_team - 1` wickets fall.
    pub players_per_team: u32,
    /// Balls faced after which a batter is flagged as due to retire.
    #[serde(default = "default_retirement_limit")]
    pub retirement_limit: u32,
    pub team_a: Team,
    pub team_b: Team,
    #[serde(default)]
    pub toss: Option<Toss>,
}

impl MatchSettings {
    /// Check the format and squads.
    ///
    /// Team composition beyond the minimum squad size is the setup layer's
    /// concern and is not checked here.
    ///
    /// # Errors
    /// - [`BatballError::InvalidSettings`] for zero overs, more than
    ///   [`constants::MAX_TOTAL_OVERS`], shared team ids or a toss won by
    ///   neither team
    /// - [`BatballError::SquadTooSmall`] if the format or either roster is
    ///   below [`constants::MIN_SQUAD_SIZE`]
    pub fn validate(&self) -> Result<()> {
        if self.total_overs == 0 {
            return Err(BatballError::InvalidSettings {
                reason: "total_overs must be at least 1".to_string(),
            });
        }
        if self.total_overs > constants::MAX_TOTAL_OVERS {
            return Err(BatballError::InvalidSettings {
                reason: format!(
                    "total_overs {} exceeds {}",
                    self.total_overs,
                    constants::MAX_TOTAL_OVERS
                ),
            });
        }
        if self.players_per_team < constants::MIN_SQUAD_SIZE {
            return Err(BatballError::SquadTooSmall {
                size: self.players_per_team,
                min: constants::MIN_SQUAD_SIZE,
            });
        }
        for team in [&self.team_a, &self.team_b] {
            let size = u32::try_from(team.players.len()).unwrap_or(u32::MAX);
            if size < constants::MIN_SQUAD_SIZE {
                return Err(BatballError::SquadTooSmall {
                    size,
                    min: constants::MIN_SQUAD_SIZE,
                });
            }
        }
        if self.team_a.id == self.team_b.id {
            return Err(BatballError::InvalidSettings {
                reason: format!("both teams share id {}", self.team_a.id),
            });
        }
        if let Some(toss) = &self.toss {
            if toss.winner != self.team_a.id && toss.winner != self.team_b.id {
                return Err(BatballError::InvalidSettings {
                    reason: format!("toss winner {} is not playing", toss.winner),
                });
            }
        }
        Ok(())
    }

    /// Whether team A bats first. Without a recorded toss, team A does.
    #[must_use]
    pub fn team_a_bats_first(&self) -> bool {
        match &self.toss {
            None => true,
            Some(toss) => {
                let a_won = toss.winner == self.team_a.id;
                match toss.decision {
                    TossDecision::Bat => a_won,
                    TossDecision::Bowl => !a_won,
                }
            }
        }
    }

    /// The batting side for the given innings.
    #[must_use]
    pub fn batting_team(&self, innings: Innings) -> &Team {
        let a_first = self.team_a_bats_first();
        match (innings, a_first) {
            (Innings::First, true) | (Innings::Second, false) => &self.team_a,
            (Innings::First, false) | (Innings::Second, true) => &self.team_b,
        }
    }

    /// The fielding side for the given innings.
    #[must_use]
    pub fn bowling_team(&self, innings: Innings) -> &Team {
        if self.batting_team(innings).id == self.team_a.id {
            &self.team_b
        } else {
            &self.team_a
        }
    }

    /// Legal balls available in one innings.
    #[must_use]
    pub fn balls_per_innings(&self) -> u32 {
        self.total_overs.saturating_mul(constants::BALLS_PER_OVER)
    }

    /// Wickets after which an innings is over.
    #[must_use]
    pub fn wickets_cap(&self) -> u32 {
        self.players_per_team.saturating_sub(1)
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl MatchSettings {
    /// Two squads of `players` named `a1..aN` / `b1..bN`; team A bats first.
    pub fn dummy(players: u32, total_overs: u32) -> Self {
        let squad = |prefix: &str| -> Vec<Player> {
            (1..=players)
                .map(|i| Player::new(format!("{prefix}{i}"), format!("Player {prefix}{i}")))
                .collect()
        };
        Self {
            match_id: MatchId::from_bytes([7; 16]),
            total_overs,
            players_per_team: players,
            retirement_limit: constants::DEFAULT_RETIREMENT_LIMIT,
            team_a: Team {
                id: TeamId::new("A"),
                name: "Team A".to_string(),
                players: squad("a"),
            },
            team_b: Team {
                id: TeamId::new("B"),
                name: "Team B".to_string(),
                players: squad("b"),
            },
            toss: None,
        }
    }
}
