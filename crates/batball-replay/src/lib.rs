//! # batball-replay
//!
//! Replays a scripted match through a [`ScoringSession`].
//!
//! A script is JSON: the match settings plus an ordered list of steps, each
//! tagged by `op`:
//!
//! ```json
//! {
//!   "settings": { ... },
//!   "steps": [
//!     { "op": "batter", "slot": "Striker", "player": "a1" },
//!     { "op": "bowler", "player": "b1" },
//!     { "op": "ball", "runs": 4 },
//!     { "op": "wide" },
//!     { "op": "wicket", "kind": "RunOut" },
//!     { "op": "run_out_dismissed", "player": "a2" },
//!     { "op": "undo" }
//!   ]
//! }
//! ```
//!
//! A delivery submitted while a selection is outstanding stops the replay;
//! deliveries after the innings or match closed are counted and skipped.

use batball_scoring::{CreaseSlot, DeliveryIntent, DeliveryOutcome, InningsScorecard, SelectionPrompt};
use batball_session::{NullPublisher, ScoringSession, SnapshotPublisher};
use batball_types::{
    BatballError, Innings, MatchRecord, MatchSettings, MatchState, PlayerId, WicketKind,
};
use serde::{Deserialize, Serialize};

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Batter { slot: CreaseSlot, player: PlayerId },
    Bowler { player: PlayerId },
    Ball { runs: u32 },
    Wide {
        #[serde(default)]
        runs: u32,
    },
    NoBall {
        #[serde(default)]
        runs: u32,
    },
    Wicket {
        kind: WicketKind,
        #[serde(default)]
        runs: u32,
    },
    Retire { player: PlayerId },
    RunOutDismissed { player: PlayerId },
    RunOutReplacement { player: PlayerId },
    RunOutEnd { end: CreaseSlot },
    Undo,
    NextInnings,
    Finish,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    pub settings: MatchSettings,
    pub steps: Vec<Step>,
}

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("step {index}: {source}")]
    Step {
        index: usize,
        #[source]
        source: BatballError,
    },
    #[error("step {index}: delivery blocked, {prompt} selection outstanding")]
    Blocked { index: usize, prompt: String },
    #[error(transparent)]
    Setup(#[from] BatballError),
}

/// Outcome of a replay.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub state: MatchState,
    pub pending: Vec<SelectionPrompt>,
    /// Deliveries dropped because the innings or match had closed.
    pub ignored: usize,
    pub scorecards: Vec<InningsScorecard>,
    /// Present when the script ended with `finish`.
    pub record: Option<MatchRecord>,
}

/// Replay without persistence.
pub fn replay(script: &Script) -> Result<ReplayReport, ReplayError> {
    replay_with(script, NullPublisher)
}

/// Replay, publishing every change through `publisher`.
pub fn replay_with<P: SnapshotPublisher>(
    script: &Script,
    publisher: P,
) -> Result<ReplayReport, ReplayError> {
    let mut session = ScoringSession::new(script.settings.clone(), publisher)?;
    let mut ignored = 0;
    let mut record = None;

    for (index, step) in script.steps.iter().enumerate() {
        let at = |source: BatballError| ReplayError::Step { index, source };
        let intent = match step {
            Step::Batter { slot, player } => {
                session.select_batter(*slot, player).map_err(at)?;
                None
            }
            Step::Bowler { player } => {
                session.select_bowler(player).map_err(at)?;
                None
            }
            Step::Ball { runs } => Some(DeliveryIntent::legal(*runs)),
            Step::Wide { runs } => Some(DeliveryIntent::wide(*runs)),
            Step::NoBall { runs } => Some(DeliveryIntent::no_ball(*runs)),
            Step::Wicket { kind, runs } => Some(DeliveryIntent::legal(*runs).with_wicket(*kind)),
            Step::Retire { player } => Some(DeliveryIntent::retire(player.clone())),
            Step::RunOutDismissed { player } => {
                session.run_out_dismissed(player).map_err(at)?;
                None
            }
            Step::RunOutReplacement { player } => {
                session.run_out_replacement(player).map_err(at)?;
                None
            }
            Step::RunOutEnd { end } => {
                session.run_out_end(*end).map_err(at)?;
                None
            }
            Step::Undo => {
                if !session.undo() {
                    tracing::debug!(index, "Nothing to undo");
                }
                None
            }
            Step::NextInnings => {
                session.next_innings().map_err(at)?;
                None
            }
            Step::Finish => {
                record = Some(session.finish().map_err(at)?);
                None
            }
        };

        let Some(intent) = intent else { continue };
        match session.submit(&intent).map_err(at)? {
            DeliveryOutcome::Applied(_) => {}
            DeliveryOutcome::Ignored(reason) => {
                tracing::debug!(index, ?reason, "Scripted delivery ignored");
                ignored += 1;
            }
            DeliveryOutcome::SelectionRequired(prompt) => {
                return Err(ReplayError::Blocked {
                    index,
                    prompt: prompt.kind().to_string(),
                });
            }
        }
    }

    let state = session.state().clone();
    let mut scorecards = vec![session.scorecard(Innings::First)];
    if state.innings == Innings::Second {
        scorecards.push(session.scorecard(Innings::Second));
    }
    tracing::info!(
        steps = script.steps.len(),
        runs = state.runs,
        wickets = state.wickets_down,
        overs = %state.overs_label(),
        ignored,
        finished = record.is_some(),
        "Replay complete"
    );

    Ok(ReplayReport {
        pending: session.pending().to_vec(),
        state,
        ignored,
        scorecards,
        record,
    })
}
