//! Transition from the first innings to the second.

use batball_types::{BatballError, InningsSummary, MatchState, Result};

use crate::selection::{CreaseSlot, SelectionPrompt};

/// The second innings, ready for openers and a bowler.
#[derive(Debug, Clone, PartialEq)]
pub struct InningsTransition {
    pub state: MatchState,
    pub prompts: Vec<SelectionPrompt>,
}

/// Close the first innings and open the second.
///
/// The first-innings totals are frozen into [`InningsSummary`], which sets
/// the target. Counters, crease and retirements reset; history is kept so
/// the full match remains on record.
///
/// # Errors
/// [`BatballError::NoFollowingInnings`] when already in the second innings.
pub fn transition_innings(state: &MatchState) -> Result<InningsTransition> {
    let Some(innings) = state.innings.next() else {
        return Err(BatballError::NoFollowingInnings(state.innings));
    };

    let summary = InningsSummary {
        runs: state.runs,
        wickets: state.wickets_down,
        overs_label: state.overs_label(),
    };

    let next = MatchState {
        innings,
        history: state.history.clone(),
        first_innings: Some(summary),
        ..MatchState::new()
    };

    tracing::info!(
        runs = state.runs,
        wickets = state.wickets_down,
        overs = %state.overs_label(),
        target = ?next.target(),
        "Innings transition"
    );

    Ok(InningsTransition {
        state: next,
        prompts: vec![
            SelectionPrompt::Batter {
                slot: CreaseSlot::Striker,
            },
            SelectionPrompt::Batter {
                slot: CreaseSlot::NonStriker,
            },
            SelectionPrompt::Bowler,
        ],
    })
}
