//! Crease and bowler selection.
//!
//! The scoring core never picks players. Whenever a slot is vacant it
//! emits a [`SelectionPrompt`]; the caller answers with exactly one
//! resolution call ([`assign_batter`], [`assign_bowler`], or the
//! [`RunOutFlow`] steps).
//!
//! Eligibility for a crease slot: a member of the batting side who is not
//! at the crease and has not been dismissed this innings. Retired batters
//! are eligible; selecting one resumes their innings.

use batball_types::{BatballError, MatchSettings, MatchState, Player, PlayerId, Result};
use serde::{Deserialize, Serialize};

use crate::{RunOutFlow, status::innings_status};

/// One of the two crease positions (also used for the end a batter takes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreaseSlot {
    Striker,
    NonStriker,
}

impl std::fmt::Display for CreaseSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Striker => write!(f, "STRIKER"),
            Self::NonStriker => write!(f, "NON_STRIKER"),
        }
    }
}

/// Input the caller must supply before scoring can continue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionPrompt {
    /// A batter is needed for the named slot.
    Batter { slot: CreaseSlot },
    /// A bowler is needed (new over or innings start).
    Bowler,
    /// A run-out is being adjudicated; the flow carries its current step.
    RunOut(RunOutFlow),
}

impl SelectionPrompt {
    /// Short name used in logs and error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Batter {
                slot: CreaseSlot::Striker,
            } => "batter:striker",
            Self::Batter {
                slot: CreaseSlot::NonStriker,
            } => "batter:non_striker",
            Self::Bowler => "bowler",
            Self::RunOut(_) => "run_out",
        }
    }
}

/// Batters who may be sent to the crease now.
#[must_use]
pub fn eligible_batters<'a>(state: &MatchState, settings: &'a MatchSettings) -> Vec<&'a Player> {
    let dismissed = state.dismissed_players();
    settings
        .batting_team(state.innings)
        .players
        .iter()
        .filter(|p| !state.is_at_crease(&p.id) && !dismissed.contains(&p.id))
        .collect()
}

/// Bowlers who may take the next over. No rotation rules are enforced.
#[must_use]
pub fn eligible_bowlers<'a>(state: &MatchState, settings: &'a MatchSettings) -> Vec<&'a Player> {
    settings.bowling_team(state.innings).players.iter().collect()
}

/// Check that `player` may take a crease slot.
pub(crate) fn ensure_batter_eligible(
    state: &MatchState,
    settings: &MatchSettings,
    player: &PlayerId,
) -> Result<()> {
    let reason = if !settings.batting_team(state.innings).has_player(player) {
        "not in the batting side"
    } else if state.is_at_crease(player) {
        "already at the crease"
    } else if state.dismissed_players().contains(player) {
        "already dismissed this innings"
    } else {
        return Ok(());
    };
    Err(BatballError::PlayerNotEligible {
        player: player.clone(),
        reason: reason.to_string(),
    })
}

/// Send `player` to the given crease slot.
///
/// A retired batter returning this way leaves the retired set.
pub fn assign_batter(
    state: &MatchState,
    settings: &MatchSettings,
    slot: CreaseSlot,
    player: &PlayerId,
) -> Result<MatchState> {
    ensure_batter_eligible(state, settings, player)?;

    let mut next = state.clone();
    match slot {
        CreaseSlot::Striker => next.striker_id = Some(player.clone()),
        CreaseSlot::NonStriker => next.non_striker_id = Some(player.clone()),
    }
    let resumed = next.retired_ids.remove(player);

    tracing::debug!(player = %player, slot = %slot, resumed, "Batter assigned");
    Ok(next)
}

/// Hand the ball to `player`.
pub fn assign_bowler(
    state: &MatchState,
    settings: &MatchSettings,
    player: &PlayerId,
) -> Result<MatchState> {
    if !settings.bowling_team(state.innings).has_player(player) {
        return Err(BatballError::PlayerNotEligible {
            player: player.clone(),
            reason: "not in the fielding side".to_string(),
        });
    }
    let mut next = state.clone();
    next.bowler_id = Some(player.clone());
    tracing::debug!(player = %player, "Bowler assigned");
    Ok(next)
}

/// Batter prompts for vacant crease slots, limited to the batters left.
pub(crate) fn vacancy_prompts(state: &MatchState, settings: &MatchSettings) -> Vec<SelectionPrompt> {
    let mut available = eligible_batters(state, settings).len();
    let mut prompts = Vec::new();
    for (slot, occupant) in [
        (CreaseSlot::Striker, &state.striker_id),
        (CreaseSlot::NonStriker, &state.non_striker_id),
    ] {
        if occupant.is_none() && available > 0 {
            prompts.push(SelectionPrompt::Batter { slot });
            available -= 1;
        }
    }
    prompts
}

/// Every selection the state currently needs, derived from the state alone.
///
/// Used at innings start and after rehydration, when no transition has
/// produced prompts. Nothing is required once the innings has ended.
#[must_use]
pub fn required_selections(state: &MatchState, settings: &MatchSettings) -> Vec<SelectionPrompt> {
    if state.is_match_complete || innings_status(state, settings).is_ended() {
        return Vec::new();
    }
    let mut prompts = vacancy_prompts(state, settings);
    if state.bowler_id.is_none() {
        prompts.push(SelectionPrompt::Bowler);
    }
    prompts
}
