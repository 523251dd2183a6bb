//! Undo of the most recent delivery.
//!
//! Counters are reversed arithmetically from the popped delivery. The
//! crease and the retired set are restored from the snapshot the delivery
//! carries; deliveries without one (recovered from older snapshots) fall
//! back to a heuristic that puts the acting batter back into an empty slot.
//!
//! Undo never crosses an innings boundary: once the innings has turned,
//! the previous innings' deliveries are frozen.

use batball_types::{Delivery, MatchState, constants};

/// Remove the most recent delivery of the innings in progress.
///
/// Returns the state unchanged when there is nothing to undo.
#[must_use]
pub fn undo_last(state: &MatchState) -> MatchState {
    let Some(last) = state.history.last() else {
        return state.clone();
    };
    if last.innings != state.innings {
        tracing::debug!(innings = %state.innings, "Nothing to undo in this innings");
        return state.clone();
    }

    let mut next = state.clone();
    let Some(delivery) = next.history.pop() else {
        return next;
    };

    next.runs = next.runs.saturating_sub(delivery.team_runs());
    if delivery.wicket.is_dismissal() {
        next.wickets_down = next.wickets_down.saturating_sub(1);
    }
    if delivery.is_legal_ball() {
        next.legal_balls_total = next.legal_balls_total.saturating_sub(1);
        next.legal_balls_in_over = if next.legal_balls_in_over == 0 {
            constants::BALLS_PER_OVER - 1
        } else {
            next.legal_balls_in_over - 1
        };
    }
    if delivery.is_retirement() {
        next.retired_ids.remove(&delivery.striker_id);
    }

    restore_crease(&mut next, &delivery);

    // Whoever is back at the crease is batting, not retired.
    for occupant in [next.striker_id.clone(), next.non_striker_id.clone()]
        .into_iter()
        .flatten()
    {
        next.retired_ids.remove(&occupant);
    }
    next.is_match_complete = false;

    tracing::debug!(
        kind = %delivery.kind,
        wicket = %delivery.wicket,
        score = next.runs,
        wickets = next.wickets_down,
        exact = delivery.crease_before.is_some(),
        "Delivery undone"
    );
    next
}

fn restore_crease(state: &mut MatchState, delivery: &Delivery) {
    if let Some(before) = &delivery.crease_before {
        state.striker_id.clone_from(&before.striker_id);
        state.non_striker_id.clone_from(&before.non_striker_id);
        state.bowler_id.clone_from(&before.bowler_id);
        if let Some(retired) = &before.retired_ids {
            state.retired_ids.clone_from(retired);
        }
        return;
    }

    let subject = &delivery.striker_id;
    if state.is_at_crease(subject) {
        return;
    }
    if state.striker_id.is_none() {
        state.striker_id = Some(subject.clone());
    } else if state.non_striker_id.is_none() {
        state.non_striker_id = Some(subject.clone());
    }
}
