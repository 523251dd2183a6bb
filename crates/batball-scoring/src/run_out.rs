//! Run-out adjudication.
//!
//! Recording a `RunOut` wicket only counts the wicket; the crease is left
//! untouched until the caller walks this three-step flow:
//!
//! ```text
//!   AwaitingDismissed ──choose_dismissed──▶ AwaitingReplacement
//!                                              │ choose_replacement
//!                                              ▼
//!                                          AwaitingEnd ──assign_end──▶ MatchState
//! ```
//!
//! Each step returns a new flow value, so the flow is plain data the
//! caller can render, persist, and resume.
//!
//! ## End assignment
//!
//! The replacement takes the chosen end; the surviving batter takes the
//! other one. If the replacement is sent to the end the survivor already
//! holds, the survivor crosses over.

use batball_types::{BatballError, MatchSettings, MatchState, PlayerId, Result, WicketKind};
use serde::{Deserialize, Serialize};

use crate::selection::{CreaseSlot, ensure_batter_eligible};

/// Progress of one run-out adjudication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutFlow {
    /// Step 1: which crease occupant was run out.
    AwaitingDismissed,
    /// Step 2: who comes in.
    AwaitingReplacement { dismissed: PlayerId },
    /// Step 3: which end the newcomer takes.
    AwaitingEnd {
        dismissed: PlayerId,
        replacement: PlayerId,
    },
}

impl Default for RunOutFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl RunOutFlow {
    #[must_use]
    pub fn new() -> Self {
        Self::AwaitingDismissed
    }

    #[must_use]
    pub fn step_name(&self) -> &'static str {
        match self {
            Self::AwaitingDismissed => "dismissed",
            Self::AwaitingReplacement { .. } => "replacement",
            Self::AwaitingEnd { .. } => "end",
        }
    }

    fn mismatch(&self, expected: &str) -> BatballError {
        BatballError::RunOutStepMismatch {
            expected: expected.to_string(),
            actual: self.step_name().to_string(),
        }
    }

    /// Step 1: record which batter was run out.
    ///
    /// # Errors
    /// - [`BatballError::RunOutStepMismatch`] outside step 1
    /// - [`BatballError::NotAtCrease`] if `player` is neither striker nor non-striker
    pub fn choose_dismissed(&self, state: &MatchState, player: &PlayerId) -> Result<Self> {
        if *self != Self::AwaitingDismissed {
            return Err(self.mismatch("dismissed"));
        }
        if !state.is_at_crease(player) {
            return Err(BatballError::NotAtCrease(player.clone()));
        }
        Ok(Self::AwaitingReplacement {
            dismissed: player.clone(),
        })
    }

    /// Step 2: record the incoming batter.
    ///
    /// # Errors
    /// - [`BatballError::RunOutStepMismatch`] outside step 2
    /// - [`BatballError::PlayerNotEligible`] if `player` may not bat now
    pub fn choose_replacement(
        &self,
        state: &MatchState,
        settings: &MatchSettings,
        player: &PlayerId,
    ) -> Result<Self> {
        let Self::AwaitingReplacement { dismissed } = self else {
            return Err(self.mismatch("replacement"));
        };
        ensure_batter_eligible(state, settings, player)?;
        Ok(Self::AwaitingEnd {
            dismissed: dismissed.clone(),
            replacement: player.clone(),
        })
    }

    /// Step 3: place the replacement and fold the victim into the run-out
    /// delivery. Consumes the flow.
    ///
    /// # Errors
    /// - [`BatballError::RunOutStepMismatch`] outside step 3, or if the last
    ///   delivery is not a run-out
    /// - [`BatballError::NotAtCrease`] if the dismissed batter has since left
    pub fn assign_end(self, state: &MatchState, end: CreaseSlot) -> Result<MatchState> {
        let (dismissed, replacement) = match self {
            Self::AwaitingEnd {
                dismissed,
                replacement,
            } => (dismissed, replacement),
            other => return Err(other.mismatch("end")),
        };

        let survivor = if state.striker_id.as_ref() == Some(&dismissed) {
            state.non_striker_id.clone()
        } else if state.non_striker_id.as_ref() == Some(&dismissed) {
            state.striker_id.clone()
        } else {
            return Err(BatballError::NotAtCrease(dismissed));
        };

        let mut next = state.clone();
        let last = next
            .history
            .pop()
            .filter(|d| d.wicket == WicketKind::RunOut)
            .ok_or_else(|| BatballError::RunOutStepMismatch {
                expected: "run-out delivery".to_string(),
                actual: state
                    .history
                    .last()
                    .map_or_else(|| "empty history".to_string(), |d| d.wicket.to_string()),
            })?;
        next.history.push(last.with_dismissed(dismissed.clone()));

        match end {
            CreaseSlot::Striker => {
                next.striker_id = Some(replacement.clone());
                next.non_striker_id = survivor;
            }
            CreaseSlot::NonStriker => {
                next.striker_id = survivor;
                next.non_striker_id = Some(replacement.clone());
            }
        }
        next.retired_ids.remove(&replacement);

        tracing::debug!(
            dismissed = %dismissed,
            replacement = %replacement,
            end = %end,
            "Run-out resolved"
        );
        Ok(next)
    }
}
