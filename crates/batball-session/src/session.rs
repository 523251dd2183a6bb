//! The scoring session: sole owner of one match's state.
//!
//! ```text
//!  caller ──submit / select / undo──▶ ScoringSession ──▶ batball-scoring (pure)
//!                                          │
//!                                          └──publish──▶ SnapshotPublisher
//! ```
//!
//! The session serializes every mutation, keeps the queue of selections the
//! core asked for, and publishes after each change. While any selection is
//! pending, scoring input is refused with the first outstanding prompt.

use batball_scoring::{
    CreaseSlot, DeliveryIntent, DeliveryOutcome, InningsScorecard, InningsStatus, RunOutFlow,
    SelectionPrompt, assign_batter, assign_bowler, build_scorecard, final_score, history_root_hex,
    innings_status, required_selections, retirement_due, transition_innings, undo_last,
};
use batball_types::{
    BatballError, Innings, MatchRecord, MatchSettings, MatchState, PlayerId, RegistryEntry,
    Result, SessionConfig,
};
use chrono::Utc;

use crate::{
    publisher::SnapshotPublisher,
    snapshot::{Recovery, SnapshotEnvelope, rehydrate},
    store::KeyValueStore,
};

/// Single-writer owner of a match in progress.
#[derive(Debug)]
pub struct ScoringSession<P> {
    settings: MatchSettings,
    state: MatchState,
    pending: Vec<SelectionPrompt>,
    publisher: P,
}

impl<P: SnapshotPublisher> ScoringSession<P> {
    /// Start a new match.
    ///
    /// # Errors
    /// Settings that fail [`MatchSettings::validate`].
    pub fn new(settings: MatchSettings, publisher: P) -> Result<Self> {
        settings.validate()?;
        let state = MatchState::new();
        let pending = required_selections(&state, &settings);
        let session = Self {
            settings,
            state,
            pending,
            publisher,
        };
        tracing::info!(
            match_id = %session.settings.match_id,
            overs = session.settings.total_overs,
            squad = session.settings.players_per_team,
            "Scoring session started"
        );
        session.publish();
        Ok(session)
    }

    /// Resume the match persisted in `store`, or start fresh.
    ///
    /// # Errors
    /// Settings that fail [`MatchSettings::validate`]. An unusable snapshot
    /// is not an error; it is reported as [`Recovery::Discarded`].
    pub fn resume<S: KeyValueStore + ?Sized>(
        settings: MatchSettings,
        store: &S,
        config: &SessionConfig,
        publisher: P,
    ) -> Result<(Self, Recovery)> {
        settings.validate()?;
        let rehydrated = rehydrate(store, config, &settings);
        let session = Self {
            settings,
            state: rehydrated.state,
            pending: rehydrated.pending,
            publisher,
        };
        if rehydrated.recovery != Recovery::Fresh {
            tracing::info!(
                match_id = %session.settings.match_id,
                recovery = ?rehydrated.recovery,
                score = session.state.runs,
                "Scoring session resumed"
            );
        }
        session.publish();
        Ok((session, rehydrated.recovery))
    }

    // -----------------------------------------------------------------
    // Scoring input
    // -----------------------------------------------------------------

    /// Submit one delivery.
    ///
    /// # Errors
    /// Malformed intents, see [`batball_scoring::apply_delivery`].
    pub fn submit(&mut self, intent: &DeliveryIntent) -> Result<DeliveryOutcome> {
        if let Some(front) = self.pending.first() {
            return Ok(DeliveryOutcome::SelectionRequired(front.clone()));
        }

        let outcome = batball_scoring::apply_delivery(&self.state, &self.settings, intent)?;
        match &outcome {
            DeliveryOutcome::Applied(applied) => {
                self.state = applied.state.clone();
                self.pending.clone_from(&applied.prompts);
                self.publish();
            }
            DeliveryOutcome::SelectionRequired(prompt) => {
                self.pending.push(prompt.clone());
            }
            DeliveryOutcome::Ignored(reason) => {
                tracing::debug!(?reason, "Delivery ignored");
            }
        }
        Ok(outcome)
    }

    /// Undo the last delivery of the innings in progress.
    ///
    /// Returns `false` when there was nothing to undo. Any outstanding
    /// selections are replaced by what the restored state needs.
    pub fn undo(&mut self) -> bool {
        let next = undo_last(&self.state);
        if next.history.len() == self.state.history.len() {
            return false;
        }
        self.state = next;
        self.pending = required_selections(&self.state, &self.settings);
        self.publish();
        true
    }

    // -----------------------------------------------------------------
    // Selection resolution
    // -----------------------------------------------------------------

    fn take_pending(&self, wanted: impl Fn(&SelectionPrompt) -> bool, name: &str) -> Result<usize> {
        self.pending
            .iter()
            .position(wanted)
            .ok_or_else(|| BatballError::NoSelectionPending {
                expected: name.to_string(),
            })
    }

    /// Send a batter to a vacant crease slot.
    ///
    /// # Errors
    /// - [`BatballError::NoSelectionPending`] if that slot was not requested
    /// - [`BatballError::PlayerNotEligible`]
    pub fn select_batter(&mut self, slot: CreaseSlot, player: &PlayerId) -> Result<()> {
        let wanted = SelectionPrompt::Batter { slot };
        let idx = self.take_pending(|p| *p == wanted, wanted.kind())?;
        self.state = assign_batter(&self.state, &self.settings, slot, player)?;
        self.pending.remove(idx);
        self.publish();
        Ok(())
    }

    /// Hand the ball to a bowler.
    ///
    /// # Errors
    /// - [`BatballError::NoSelectionPending`] if no bowler was requested
    /// - [`BatballError::PlayerNotEligible`]
    pub fn select_bowler(&mut self, player: &PlayerId) -> Result<()> {
        let idx = self.take_pending(|p| *p == SelectionPrompt::Bowler, "bowler")?;
        self.state = assign_bowler(&self.state, &self.settings, player)?;
        self.pending.remove(idx);
        self.publish();
        Ok(())
    }

    fn run_out_flow(&self) -> Result<(usize, RunOutFlow)> {
        let idx = self.take_pending(|p| matches!(p, SelectionPrompt::RunOut(_)), "run_out")?;
        match &self.pending[idx] {
            SelectionPrompt::RunOut(flow) => Ok((idx, flow.clone())),
            _ => Err(BatballError::Internal(
                "run-out prompt changed shape".to_string(),
            )),
        }
    }

    /// Run-out step 1: which batter is out.
    ///
    /// # Errors
    /// No run-out pending, the wrong step, or a player not at the crease.
    pub fn run_out_dismissed(&mut self, player: &PlayerId) -> Result<()> {
        let (idx, flow) = self.run_out_flow()?;
        self.pending[idx] = SelectionPrompt::RunOut(flow.choose_dismissed(&self.state, player)?);
        self.publish();
        Ok(())
    }

    /// Run-out step 2: who replaces them.
    ///
    /// # Errors
    /// No run-out pending, the wrong step, or an ineligible batter.
    pub fn run_out_replacement(&mut self, player: &PlayerId) -> Result<()> {
        let (idx, flow) = self.run_out_flow()?;
        self.pending[idx] =
            SelectionPrompt::RunOut(flow.choose_replacement(&self.state, &self.settings, player)?);
        self.publish();
        Ok(())
    }

    /// Run-out step 3: the end the replacement takes. Completes the flow.
    ///
    /// # Errors
    /// No run-out pending or the wrong step.
    pub fn run_out_end(&mut self, end: CreaseSlot) -> Result<()> {
        let (idx, flow) = self.run_out_flow()?;
        self.state = flow.assign_end(&self.state, end)?;
        self.pending.remove(idx);
        self.publish();
        Ok(())
    }

    // -----------------------------------------------------------------
    // Innings and match lifecycle
    // -----------------------------------------------------------------

    /// Close the first innings and open the chase.
    ///
    /// # Errors
    /// [`BatballError::NoFollowingInnings`] in the second innings.
    pub fn next_innings(&mut self) -> Result<()> {
        let transition = transition_innings(&self.state)?;
        self.state = transition.state;
        self.pending = transition.prompts;
        self.publish();
        Ok(())
    }

    /// Finalize a completed match into its permanent record and clear the
    /// active snapshot.
    ///
    /// # Errors
    /// [`BatballError::MatchNotComplete`] while the chase is still on.
    pub fn finish(&mut self) -> Result<MatchRecord> {
        let final_score = final_score(&self.state, &self.settings)?;
        let record = MatchRecord {
            id: self.settings.match_id,
            date: Utc::now(),
            settings: self.settings.clone(),
            history: self.state.history.clone(),
            final_score,
            history_root: history_root_hex(&self.state.history),
        };
        self.publisher.clear(self.settings.match_id);
        tracing::info!(
            match_id = %record.id,
            result = %record.final_score.result,
            deliveries = record.history.len(),
            "Match finalized"
        );
        Ok(record)
    }

    // -----------------------------------------------------------------
    // Read side
    // -----------------------------------------------------------------

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    /// Selections outstanding, in the order they should be resolved.
    pub fn pending(&self) -> &[SelectionPrompt] {
        &self.pending
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub fn status(&self) -> InningsStatus {
        innings_status(&self.state, &self.settings)
    }

    pub fn scorecard(&self, innings: Innings) -> InningsScorecard {
        build_scorecard(&self.state.history, innings)
    }

    /// Batters at the crease who have reached the retirement limit.
    pub fn retirement_due(&self) -> Vec<PlayerId> {
        retirement_due(&self.state, &self.settings)
    }

    fn publish(&self) {
        let envelope = SnapshotEnvelope::capture(self.settings.match_id, &self.state, &self.pending);
        let entry = RegistryEntry::project(&self.settings, &self.state);
        self.publisher.publish(&envelope, &entry);
    }
}
