//! Per-innings scorecard projection.
//!
//! A read-only view derived from the delivery history. Nothing here is
//! stored; rebuilding after an undo gives the corrected card.
//!
//! Crediting rules:
//!
//! - the batter is credited with runs off the bat on legal balls and
//!   no-balls; runs taken on a wide are extras
//! - balls faced count legal balls only
//! - the bowler concedes every run including extras, and is credited with
//!   every dismissal except a run-out
//! - a maiden is a completed six-ball over by one bowler conceding nothing

use std::collections::BTreeMap;

use batball_types::{
    Delivery, DeliveryKind, Innings, MatchSettings, MatchState, PlayerId, WicketKind, constants,
    format_overs,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a batter's innings currently stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dismissal {
    NotOut,
    Retired,
    Out {
        kind: WicketKind,
        bowler_id: PlayerId,
    },
}

impl Dismissal {
    /// Scorecard text, e.g. `lbw b Smith`.
    #[must_use]
    pub fn describe(&self, bowler_name: &str) -> String {
        match self {
            Self::NotOut => "not out".to_string(),
            Self::Retired => "ret.".to_string(),
            Self::Out { kind, .. } => match kind {
                WicketKind::Bowled => format!("b {bowler_name}"),
                WicketKind::Lbw => format!("lbw b {bowler_name}"),
                WicketKind::Caught => format!("c & b {bowler_name}"),
                WicketKind::Stumped => format!("st b {bowler_name}"),
                WicketKind::RunOut => "run out".to_string(),
                WicketKind::None | WicketKind::Retired => "out".to_string(),
            },
        }
    }

    #[must_use]
    pub fn is_out(&self) -> bool {
        matches!(self, Self::Out { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattingLine {
    pub player_id: PlayerId,
    pub runs: u32,
    pub balls: u32,
    pub fours: u32,
    pub sixes: u32,
    pub dismissal: Dismissal,
}

impl BattingLine {
    fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            runs: 0,
            balls: 0,
            fours: 0,
            sixes: 0,
            dismissal: Dismissal::NotOut,
        }
    }

    /// Runs per hundred balls, one decimal place. Zero before the first ball.
    #[must_use]
    pub fn strike_rate(&self) -> Decimal {
        if self.balls == 0 {
            return Decimal::ZERO;
        }
        (Decimal::from(self.runs) * Decimal::ONE_HUNDRED / Decimal::from(self.balls)).round_dp(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BowlingLine {
    pub bowler_id: PlayerId,
    pub legal_balls: u32,
    pub runs_conceded: u32,
    pub wickets: u32,
    pub maidens: u32,
}

impl BowlingLine {
    fn new(bowler_id: PlayerId) -> Self {
        Self {
            bowler_id,
            legal_balls: 0,
            runs_conceded: 0,
            wickets: 0,
            maidens: 0,
        }
    }

    #[must_use]
    pub fn overs_label(&self) -> String {
        format_overs(self.legal_balls)
    }

    /// Runs conceded per six legal balls, two decimal places.
    #[must_use]
    pub fn economy(&self) -> Decimal {
        run_rate(self.runs_conceded, self.legal_balls)
    }
}

/// Runs not credited to a batter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extras {
    /// Wide penalties plus runs taken on wides.
    pub wides: u32,
    /// No-ball penalties.
    pub no_balls: u32,
}

impl Extras {
    #[must_use]
    pub fn total(&self) -> u32 {
        self.wides + self.no_balls
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InningsScorecard {
    pub innings: Innings,
    /// In order of first appearance at the crease.
    pub batting: Vec<BattingLine>,
    /// In order of first delivery bowled.
    pub bowling: Vec<BowlingLine>,
    pub extras: Extras,
    pub runs: u32,
    pub wickets: u32,
    pub legal_balls: u32,
}

impl InningsScorecard {
    #[must_use]
    pub fn overs_label(&self) -> String {
        format_overs(self.legal_balls)
    }

    #[must_use]
    pub fn run_rate(&self) -> Decimal {
        run_rate(self.runs, self.legal_balls)
    }

    #[must_use]
    pub fn batter(&self, player: &PlayerId) -> Option<&BattingLine> {
        self.batting.iter().find(|l| &l.player_id == player)
    }

    #[must_use]
    pub fn bowler(&self, player: &PlayerId) -> Option<&BowlingLine> {
        self.bowling.iter().find(|l| &l.bowler_id == player)
    }
}

/// Runs per six legal balls, rounded to two places.
///
/// Before the first legal ball the divisor is one whole over, so extras
/// alone give a rate equal to the runs scored.
#[must_use]
pub fn run_rate(runs: u32, legal_balls: u32) -> Decimal {
    if legal_balls == 0 {
        return Decimal::from(runs);
    }
    (Decimal::from(runs) * Decimal::from(constants::BALLS_PER_OVER) / Decimal::from(legal_balls))
        .round_dp(2)
}

/// Project the scorecard of one innings from the match history.
#[must_use]
pub fn build_scorecard(history: &[Delivery], innings: Innings) -> InningsScorecard {
    let mut batting: Vec<BattingLine> = Vec::new();
    let mut bowling: Vec<BowlingLine> = Vec::new();
    let mut extras = Extras::default();
    let (mut runs, mut wickets, mut legal_balls) = (0, 0, 0);
    // (bowler, over) -> (legal balls, runs conceded)
    let mut overs: BTreeMap<(PlayerId, u32), (u32, u32)> = BTreeMap::new();

    for d in history.iter().filter(|d| d.innings == innings) {
        if let Some(before) = &d.crease_before {
            for occupant in [&before.striker_id, &before.non_striker_id]
                .into_iter()
                .flatten()
            {
                let line = batting_line(&mut batting, occupant);
                if line.dismissal == Dismissal::Retired {
                    line.dismissal = Dismissal::NotOut;
                }
            }
        }

        let batter = batting_line(&mut batting, &d.striker_id);
        if d.is_retirement() {
            batter.dismissal = Dismissal::Retired;
        } else if d.kind != DeliveryKind::Wide {
            batter.runs += d.runs_off_bat;
            match d.runs_off_bat {
                4 => batter.fours += 1,
                6 => batter.sixes += 1,
                _ => {}
            }
            if d.is_legal_ball() {
                batter.balls += 1;
            }
        }

        if let Some(victim) = d.dismissed_player() {
            batting_line(&mut batting, victim).dismissal = Dismissal::Out {
                kind: d.wicket,
                bowler_id: d.bowler_id.clone(),
            };
            wickets += 1;
        }

        match d.kind {
            DeliveryKind::Wide => extras.wides += d.team_runs(),
            DeliveryKind::NoBall => extras.no_balls += constants::EXTRA_RUN_PENALTY,
            DeliveryKind::Legal => {}
        }
        runs += d.team_runs();

        if d.is_retirement() {
            continue;
        }
        let bowler = bowling_line(&mut bowling, &d.bowler_id);
        bowler.runs_conceded += d.team_runs();
        if d.wicket.credits_bowler() {
            bowler.wickets += 1;
        }
        let over = overs.entry((d.bowler_id.clone(), d.over_index)).or_default();
        over.1 += d.team_runs();
        if d.is_legal_ball() {
            bowler.legal_balls += 1;
            legal_balls += 1;
            over.0 += 1;
        }
    }

    for ((bowler_id, _), (balls, conceded)) in overs {
        if balls == constants::BALLS_PER_OVER && conceded == 0 {
            bowling_line(&mut bowling, &bowler_id).maidens += 1;
        }
    }

    InningsScorecard {
        innings,
        batting,
        bowling,
        extras,
        runs,
        wickets,
        legal_balls,
    }
}

fn batting_line<'a>(lines: &'a mut Vec<BattingLine>, player: &PlayerId) -> &'a mut BattingLine {
    let idx = match lines.iter().position(|l| &l.player_id == player) {
        Some(idx) => idx,
        None => {
            lines.push(BattingLine::new(player.clone()));
            lines.len() - 1
        }
    };
    &mut lines[idx]
}

fn bowling_line<'a>(lines: &'a mut Vec<BowlingLine>, bowler: &PlayerId) -> &'a mut BowlingLine {
    let idx = match lines.iter().position(|l| &l.bowler_id == bowler) {
        Some(idx) => idx,
        None => {
            lines.push(BowlingLine::new(bowler.clone()));
            lines.len() - 1
        }
    };
    &mut lines[idx]
}

/// Crease occupants who have faced at least `retirement_limit` balls this
/// innings.
#[must_use]
pub fn retirement_due(state: &MatchState, settings: &MatchSettings) -> Vec<PlayerId> {
    [&state.striker_id, &state.non_striker_id]
        .into_iter()
        .flatten()
        .filter(|player| {
            let faced = state
                .innings_deliveries()
                .filter(|d| &d.striker_id == *player && d.is_legal_ball())
                .count();
            u32::try_from(faced).unwrap_or(u32::MAX) >= settings.retirement_limit
        })
        .cloned()
        .collect()
}
