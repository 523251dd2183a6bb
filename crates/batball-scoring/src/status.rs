//! Innings completion rules.
//!
//! An innings ends when the legal balls run out, when `squad - 1` wickets
//! have fallen, or (second innings only) when the chasing side reaches the
//! target. The delivery processor consults this after every ball; in the
//! second innings an ended innings means the match is complete.

use batball_types::{Innings, MatchSettings, MatchState};
use serde::{Deserialize, Serialize};

/// Why an innings closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InningsEnd {
    OversComplete,
    AllOut,
    TargetReached,
}

/// Whether the innings in progress can take further deliveries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InningsStatus {
    InProgress,
    Ended(InningsEnd),
}

impl InningsStatus {
    #[must_use]
    pub fn is_ended(self) -> bool {
        matches!(self, Self::Ended(_))
    }
}

/// Evaluate the innings in progress.
///
/// When several limits are hit by the same ball, the chase takes
/// precedence over wickets, and wickets over overs.
#[must_use]
pub fn innings_status(state: &MatchState, settings: &MatchSettings) -> InningsStatus {
    if state.innings == Innings::Second {
        if let Some(target) = state.target() {
            if state.runs >= target {
                return InningsStatus::Ended(InningsEnd::TargetReached);
            }
        }
    }
    if state.wickets_down >= settings.wickets_cap() {
        return InningsStatus::Ended(InningsEnd::AllOut);
    }
    if state.legal_balls_total >= settings.balls_per_innings() {
        return InningsStatus::Ended(InningsEnd::OversComplete);
    }
    InningsStatus::InProgress
}

#[cfg(test)]
mod tests {
    use batball_types::InningsSummary;

    use super::*;

    fn chasing(first_runs: u32) -> MatchState {
        let mut state = MatchState::dummy_ready();
        state.innings = Innings::Second;
        state.first_innings = Some(InningsSummary {
            runs: first_runs,
            wickets: 2,
            overs_label: "2.0".into(),
        });
        state
    }

    #[test]
    fn fresh_innings_in_progress() {
        let settings = MatchSettings::dummy(5, 2);
        assert_eq!(
            innings_status(&MatchState::dummy_ready(), &settings),
            InningsStatus::InProgress
        );
    }

    #[test]
    fn overs_exhausted() {
        let settings = MatchSettings::dummy(5, 2);
        let mut state = MatchState::dummy_ready();
        state.legal_balls_total = 12;
        assert_eq!(
            innings_status(&state, &settings),
            InningsStatus::Ended(InningsEnd::OversComplete)
        );
    }

    #[test]
    fn all_out_at_squad_minus_one() {
        let settings = MatchSettings::dummy(5, 2);
        let mut state = MatchState::dummy_ready();
        state.wickets_down = 3;
        assert!(!innings_status(&state, &settings).is_ended());
        state.wickets_down = 4;
        assert_eq!(
            innings_status(&state, &settings),
            InningsStatus::Ended(InningsEnd::AllOut)
        );
    }

    #[test]
    fn target_only_counts_in_second_innings() {
        let settings = MatchSettings::dummy(5, 20);
        let mut state = chasing(120);
        state.runs = 120;
        assert!(!innings_status(&state, &settings).is_ended());
        state.runs = 121;
        assert_eq!(
            innings_status(&state, &settings),
            InningsStatus::Ended(InningsEnd::TargetReached)
        );
    }

    #[test]
    fn chase_wins_over_last_ball() {
        let settings = MatchSettings::dummy(5, 1);
        let mut state = chasing(10);
        state.runs = 11;
        state.legal_balls_total = 6;
        assert_eq!(
            innings_status(&state, &settings),
            InningsStatus::Ended(InningsEnd::TargetReached)
        );
    }
}
