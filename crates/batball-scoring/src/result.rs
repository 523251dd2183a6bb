//! Match result and final score.

use batball_types::{
    BatballError, FinalScore, Innings, InningsScore, Margin, MatchResult, MatchSettings,
    MatchState, Result,
};

/// Decide the match from both innings totals.
///
/// `chasing_wickets` is the wickets the chasing side lost; a successful
/// chase wins by the wickets it had in hand.
#[must_use]
pub fn compute_result(
    settings: &MatchSettings,
    first_runs: u32,
    second_runs: u32,
    chasing_wickets: u32,
) -> MatchResult {
    use std::cmp::Ordering;

    match second_runs.cmp(&first_runs) {
        Ordering::Greater => MatchResult::Won {
            winner: settings.batting_team(Innings::Second).id.clone(),
            margin: Margin::Wickets(settings.wickets_cap().saturating_sub(chasing_wickets)),
        },
        Ordering::Equal => MatchResult::Tied,
        Ordering::Less => MatchResult::Won {
            winner: settings.batting_team(Innings::First).id.clone(),
            margin: Margin::Runs(first_runs - second_runs),
        },
    }
}

/// Final score of a completed match.
///
/// # Errors
/// [`BatballError::MatchNotComplete`] unless the second innings has closed.
pub fn final_score(state: &MatchState, settings: &MatchSettings) -> Result<FinalScore> {
    let (Innings::Second, Some(first)) = (state.innings, &state.first_innings) else {
        return Err(BatballError::MatchNotComplete);
    };
    if !state.is_match_complete {
        return Err(BatballError::MatchNotComplete);
    }

    Ok(FinalScore {
        first: InningsScore {
            team_id: settings.batting_team(Innings::First).id.clone(),
            runs: first.runs,
            wickets: first.wickets,
            overs_label: first.overs_label.clone(),
        },
        second: InningsScore {
            team_id: settings.batting_team(Innings::Second).id.clone(),
            runs: state.runs,
            wickets: state.wickets_down,
            overs_label: state.overs_label(),
        },
        target: first.runs + 1,
        result: compute_result(settings, first.runs, state.runs, state.wickets_down),
    })
}
