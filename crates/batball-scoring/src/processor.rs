//! Pure delivery processor.
//!
//! The core transition: takes the current state and one delivery intent,
//! produces the next state plus the selections the caller must make.
//!
//! ```text
//! apply_delivery(&MatchState, &MatchSettings, &DeliveryIntent) -> DeliveryOutcome
//! ```
//!
//! The input state is never modified. A missing batter or bowler is not an
//! error: the outcome is [`DeliveryOutcome::SelectionRequired`] and the
//! caller retries the same intent once it is resolved. Submissions after
//! the innings or match has closed are ignored.

use batball_types::{
    BatballError, Delivery, DeliveryKind, Innings, MatchSettings, MatchState, PlayerId, Result,
    WicketKind, constants,
};

use crate::{
    RunOutFlow,
    selection::{CreaseSlot, SelectionPrompt, vacancy_prompts},
    status::{InningsEnd, InningsStatus, innings_status},
};

/// What the scorer entered for one ball.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryIntent {
    pub runs: u32,
    pub kind: DeliveryKind,
    pub wicket: WicketKind,
    /// Crease occupant retiring; only meaningful with [`WicketKind::Retired`].
    pub retiring: Option<PlayerId>,
}

impl DeliveryIntent {
    /// A legal ball with `runs` off the bat.
    #[must_use]
    pub fn legal(runs: u32) -> Self {
        Self {
            runs,
            kind: DeliveryKind::Legal,
            wicket: WicketKind::None,
            retiring: None,
        }
    }

    /// A wide; `runs` are taken on top of the one-run extra.
    #[must_use]
    pub fn wide(runs: u32) -> Self {
        Self {
            kind: DeliveryKind::Wide,
            ..Self::legal(runs)
        }
    }

    /// A no-ball; `runs` are taken on top of the one-run extra.
    #[must_use]
    pub fn no_ball(runs: u32) -> Self {
        Self {
            kind: DeliveryKind::NoBall,
            ..Self::legal(runs)
        }
    }

    /// A scoreless legal ball on which a wicket fell.
    #[must_use]
    pub fn wicket(kind: WicketKind) -> Self {
        Self::legal(0).with_wicket(kind)
    }

    /// Retirement marker for a crease occupant.
    #[must_use]
    pub fn retire(player: PlayerId) -> Self {
        Self {
            retiring: Some(player),
            ..Self::wicket(WicketKind::Retired)
        }
    }

    #[must_use]
    pub fn with_wicket(mut self, wicket: WicketKind) -> Self {
        self.wicket = wicket;
        self
    }

    /// A ball that would count towards the over. Retirement markers never do.
    fn is_legal_attempt(&self) -> bool {
        self.kind == DeliveryKind::Legal && self.wicket != WicketKind::Retired
    }
}

/// Why a submission was dropped without effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    MatchComplete,
    OversComplete,
    InningsComplete,
}

/// A delivery that was recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub state: MatchState,
    /// Copy of the delivery appended to the history.
    pub delivery: Delivery,
    /// Selections required before the next ball, in resolution order.
    pub prompts: Vec<SelectionPrompt>,
    pub over_completed: bool,
    /// Set when this ball closed the innings.
    pub innings_end: Option<InningsEnd>,
}

/// Result of submitting one delivery intent.
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryOutcome {
    Applied(Box<Applied>),
    Ignored(IgnoreReason),
    /// Resolve this selection, then resubmit the same intent.
    SelectionRequired(SelectionPrompt),
}

/// Apply one delivery intent to the match state.
///
/// ## Algorithm
///
/// 1. Drop the intent if the match or innings is over, or if it is a
///    legal ball and the overs are exhausted
/// 2. Require striker, non-striker and bowler
/// 3. Build the delivery, stamping the pre-ball crease assignment
/// 4. Add team runs (extras included), count dismissals, advance the legal
///    ball counters unless the ball is an extra or a retirement marker
/// 5. Rotate strike on odd runs off the bat when no wicket fell
/// 6. On the sixth legal ball wrap the over counter, change ends when no
///    wicket fell, and ask for a new bowler
/// 7. Vacate the slot of a retiree or a dismissed striker; a run-out leaves
///    the crease alone and opens a [`RunOutFlow`]
/// 8. Close the match if the second innings ended
///
/// # Errors
/// - [`BatballError::RunsOutOfRange`] / [`BatballError::InvalidRetirement`]
///   for intents no delivery can represent
/// - [`BatballError::NotAtCrease`] when retiring someone who is not batting
#[allow(clippy::too_many_lines)]
pub fn apply_delivery(
    state: &MatchState,
    settings: &MatchSettings,
    intent: &DeliveryIntent,
) -> Result<DeliveryOutcome> {
    // 1. Closed innings / match guards
    if state.is_match_complete {
        return Ok(DeliveryOutcome::Ignored(IgnoreReason::MatchComplete));
    }
    if intent.is_legal_attempt() && state.legal_balls_total >= settings.balls_per_innings() {
        return Ok(DeliveryOutcome::Ignored(IgnoreReason::OversComplete));
    }
    if let InningsStatus::Ended(InningsEnd::AllOut | InningsEnd::TargetReached) =
        innings_status(state, settings)
    {
        return Ok(DeliveryOutcome::Ignored(IgnoreReason::InningsComplete));
    }

    // 2. Preconditions become selection requests
    let (Some(striker), Some(non_striker), Some(bowler)) =
        (&state.striker_id, &state.non_striker_id, &state.bowler_id)
    else {
        let prompt = if state.striker_id.is_none() {
            SelectionPrompt::Batter {
                slot: CreaseSlot::Striker,
            }
        } else if state.non_striker_id.is_none() {
            SelectionPrompt::Batter {
                slot: CreaseSlot::NonStriker,
            }
        } else {
            SelectionPrompt::Bowler
        };
        return Ok(DeliveryOutcome::SelectionRequired(prompt));
    };

    // 3. Acting batter and the delivery record
    let subject = match &intent.retiring {
        Some(player) if intent.wicket != WicketKind::Retired => {
            return Err(BatballError::InvalidRetirement {
                reason: format!("{player} named as retiring on a {} delivery", intent.wicket),
            });
        }
        Some(player) if player != striker && player != non_striker => {
            return Err(BatballError::NotAtCrease(player.clone()));
        }
        Some(player) => player.clone(),
        None => striker.clone(),
    };

    let delivery = Delivery::new(
        intent.runs,
        intent.kind,
        intent.wicket,
        subject.clone(),
        bowler.clone(),
        state.innings,
        state.current_over_index(),
    )?
    .with_crease_before(state.crease_snapshot());

    let mut next = state.clone();

    // 4. Score, wickets, ball counters
    next.runs += delivery.team_runs();
    if delivery.wicket.is_dismissal() {
        next.wickets_down += 1;
    }
    if delivery.is_legal_ball() {
        next.legal_balls_in_over += 1;
        next.legal_balls_total += 1;
    }

    // 5. Strike rotation on odd runs
    if delivery.runs_off_bat % 2 == 1 && delivery.wicket == WicketKind::None {
        next.swap_strike();
    }

    // 6. Over completion
    let over_completed = next.legal_balls_in_over == constants::BALLS_PER_OVER;
    if over_completed {
        next.legal_balls_in_over = 0;
        if delivery.wicket == WicketKind::None {
            next.swap_strike();
        }
    }

    // 7. Crease consequences of the wicket
    match delivery.wicket {
        WicketKind::None | WicketKind::RunOut => {}
        WicketKind::Retired => {
            next.retired_ids.insert(subject.clone());
            if next.striker_id.as_ref() == Some(&subject) {
                next.striker_id = None;
            } else if next.non_striker_id.as_ref() == Some(&subject) {
                next.non_striker_id = None;
            }
        }
        WicketKind::Bowled | WicketKind::Caught | WicketKind::Lbw | WicketKind::Stumped => {
            next.striker_id = None;
        }
    }

    next.history.push(delivery.clone());

    // 8. Innings / match completion
    let status = innings_status(&next, settings);
    let innings_end = match status {
        InningsStatus::Ended(end) => Some(end),
        InningsStatus::InProgress => None,
    };
    if let Some(end) = innings_end {
        if next.innings == Innings::Second {
            next.is_match_complete = true;
            tracing::info!(
                runs = next.runs,
                wickets = next.wickets_down,
                overs = %next.overs_label(),
                reason = ?end,
                "Match complete"
            );
        } else {
            tracing::info!(
                runs = next.runs,
                wickets = next.wickets_down,
                overs = %next.overs_label(),
                reason = ?end,
                "First innings closed"
            );
        }
    }

    // Selections required before the next ball
    let mut prompts = Vec::new();
    if innings_end.is_none() {
        if delivery.wicket == WicketKind::RunOut {
            prompts.push(SelectionPrompt::RunOut(RunOutFlow::new()));
        }
        prompts.extend(vacancy_prompts(&next, settings));
        if over_completed {
            prompts.push(SelectionPrompt::Bowler);
        }
    }

    tracing::debug!(
        innings = next.innings.number(),
        over = delivery.over_index,
        kind = %delivery.kind,
        wicket = %delivery.wicket,
        runs = delivery.runs_off_bat,
        score = next.runs,
        wickets = next.wickets_down,
        "Delivery applied"
    );

    Ok(DeliveryOutcome::Applied(Box::new(Applied {
        state: next,
        delivery,
        prompts,
        over_completed,
        innings_end,
    })))
}
