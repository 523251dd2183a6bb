//! The derived, mutable match snapshot.
//!
//! [`MatchState`] is owned by exactly one scoring session. It is mutated
//! only by the delivery processor, the undo processor, selection
//! resolution and the innings transition; everything else reads it.
//!
//! ## Invariants
//!
//! - `legal_balls_in_over < 6`
//! - `legal_balls_total == 6 * completed_overs + legal_balls_in_over`
//! - `wickets_down <= squad_size - 1`
//! - striker and non-striker differ whenever both are set
//! - nobody at the crease is also in `retired_ids`
//! - `runs`, `wickets_down` and `legal_balls_total` agree with the
//!   current-innings deliveries in `history`

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{BatballError, CreaseSnapshot, Delivery, Innings, PlayerId, Result, constants};

/// Format a legal-ball count as `completed.balls` (e.g. 27 balls → "4.3").
#[must_use]
pub fn format_overs(legal_balls: u32) -> String {
    format!(
        "{}.{}",
        legal_balls / constants::BALLS_PER_OVER,
        legal_balls % constants::BALLS_PER_OVER
    )
}

/// Totals captured when the first innings closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InningsSummary {
    pub runs: u32,
    pub wickets: u32,
    pub overs_label: String,
}

/// Running state of a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    pub innings: Innings,
    pub runs: u32,
    pub wickets_down: u32,
    pub legal_balls_in_over: u32,
    pub legal_balls_total: u32,
    pub striker_id: Option<PlayerId>,
    pub non_striker_id: Option<PlayerId>,
    pub bowler_id: Option<PlayerId>,
    /// Every delivery of the match, both innings, in bowling order.
    pub history: Vec<Delivery>,
    pub is_match_complete: bool,
    pub first_innings: Option<InningsSummary>,
    pub retired_ids: BTreeSet<PlayerId>,
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchState {
    /// Empty first-innings state with nobody at the crease.
    #[must_use]
    pub fn new() -> Self {
        Self {
            innings: Innings::First,
            runs: 0,
            wickets_down: 0,
            legal_balls_in_over: 0,
            legal_balls_total: 0,
            striker_id: None,
            non_striker_id: None,
            bowler_id: None,
            history: Vec::new(),
            is_match_complete: false,
            first_innings: None,
            retired_ids: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn overs_label(&self) -> String {
        format_overs(self.legal_balls_total)
    }

    #[must_use]
    pub fn completed_overs(&self) -> u32 {
        self.legal_balls_total / constants::BALLS_PER_OVER
    }

    /// 0-based index of the over the next legal ball belongs to.
    #[must_use]
    pub fn current_over_index(&self) -> u32 {
        self.completed_overs()
    }

    /// Score the chasing side must reach: first-innings runs + 1.
    #[must_use]
    pub fn target(&self) -> Option<u32> {
        self.first_innings.as_ref().map(|s| s.runs + 1)
    }

    #[must_use]
    pub fn crease_snapshot(&self) -> CreaseSnapshot {
        CreaseSnapshot {
            striker_id: self.striker_id.clone(),
            non_striker_id: self.non_striker_id.clone(),
            bowler_id: self.bowler_id.clone(),
            retired_ids: Some(self.retired_ids.clone()),
        }
    }

    #[must_use]
    pub fn is_at_crease(&self, player: &PlayerId) -> bool {
        self.striker_id.as_ref() == Some(player) || self.non_striker_id.as_ref() == Some(player)
    }

    /// Both batters and the bowler are assigned.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.striker_id.is_some() && self.non_striker_id.is_some() && self.bowler_id.is_some()
    }

    pub fn swap_strike(&mut self) {
        std::mem::swap(&mut self.striker_id, &mut self.non_striker_id);
    }

    /// Deliveries of the innings in progress.
    pub fn innings_deliveries(&self) -> impl Iterator<Item = &Delivery> {
        let innings = self.innings;
        self.history.iter().filter(move |d| d.innings == innings)
    }

    /// Deliveries of the over in progress, retirement markers excluded.
    ///
    /// Derived from history on every call; nothing caches it.
    #[must_use]
    pub fn current_over_deliveries(&self) -> Vec<&Delivery> {
        let over = self.current_over_index();
        self.innings_deliveries()
            .filter(|d| d.over_index == over && !d.is_retirement())
            .collect()
    }

    /// Batters dismissed so far in the innings in progress.
    #[must_use]
    pub fn dismissed_players(&self) -> BTreeSet<PlayerId> {
        self.innings_deliveries()
            .filter_map(Delivery::dismissed_player)
            .cloned()
            .collect()
    }

    /// Check every structural invariant against the given squad size.
    ///
    /// Used when rehydrating a persisted snapshot; a state produced by the
    /// scoring core always passes.
    ///
    /// # Errors
    /// Returns [`BatballError::SnapshotInvariant`] naming the first violation.
    pub fn check_invariants(&self, squad_size: u32) -> Result<()> {
        let fail = |reason: String| Err(BatballError::SnapshotInvariant { reason });

        if self.legal_balls_in_over >= constants::BALLS_PER_OVER {
            return fail(format!(
                "legal_balls_in_over = {} (max {})",
                self.legal_balls_in_over,
                constants::BALLS_PER_OVER - 1
            ));
        }
        if self.legal_balls_total % constants::BALLS_PER_OVER != self.legal_balls_in_over {
            return fail(format!(
                "legal_balls_total = {} disagrees with legal_balls_in_over = {}",
                self.legal_balls_total, self.legal_balls_in_over
            ));
        }
        if self.wickets_down > squad_size.saturating_sub(1) {
            return fail(format!(
                "wickets_down = {} exceeds squad cap {}",
                self.wickets_down,
                squad_size.saturating_sub(1)
            ));
        }
        if let (Some(s), Some(n)) = (&self.striker_id, &self.non_striker_id) {
            if s == n {
                return fail(format!("{s} is both striker and non-striker"));
            }
        }
        for occupant in [&self.striker_id, &self.non_striker_id].into_iter().flatten() {
            if self.retired_ids.contains(occupant) {
                return fail(format!("{occupant} is at the crease and retired"));
            }
        }
        if self.innings == Innings::Second && self.first_innings.is_none() {
            return fail("second innings without a first-innings summary".to_string());
        }

        let (runs, wickets, balls) =
            self.innings_deliveries()
                .fold((0u32, 0u32, 0u32), |(r, w, b), d| {
                    (
                        r + d.team_runs(),
                        w + u32::from(d.wicket.is_dismissal()),
                        b + u32::from(d.is_legal_ball()),
                    )
                });
        if (runs, wickets, balls) != (self.runs, self.wickets_down, self.legal_balls_total) {
            return fail(format!(
                "counters ({}, {}, {}) disagree with history ({runs}, {wickets}, {balls})",
                self.runs, self.wickets_down, self.legal_balls_total
            ));
        }
        Ok(())
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl MatchState {
    /// Fresh first innings with `a1` on strike, `a2` at the other end and
    /// `b1` bowling (matches [`crate::MatchSettings::dummy`] rosters).
    pub fn dummy_ready() -> Self {
        Self {
            striker_id: Some(PlayerId::new("a1")),
            non_striker_id: Some(PlayerId::new("a2")),
            bowler_id: Some(PlayerId::new("b1")),
            ..Self::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DeliveryKind, WicketKind};

    #[test]
    fn overs_label_formats_completed_dot_balls() {
        assert_eq!(format_overs(0), "0.0");
        assert_eq!(format_overs(27), "4.3");
        assert_eq!(format_overs(30), "5.0");
    }

    #[test]
    fn fresh_state_is_consistent() {
        let s = MatchState::new();
        assert!(s.check_invariants(11).is_ok());
        assert!(!s.is_ready());
        assert!(s.target().is_none());
    }

    #[test]
    fn ready_state_has_everyone() {
        let s = MatchState::dummy_ready();
        assert!(s.is_ready());
        assert!(s.is_at_crease(&PlayerId::new("a2")));
        assert!(!s.is_at_crease(&PlayerId::new("b1")));
    }

    #[test]
    fn swap_strike_exchanges_ends() {
        let mut s = MatchState::dummy_ready();
        s.swap_strike();
        assert_eq!(s.striker_id, Some(PlayerId::new("a2")));
        assert_eq!(s.non_striker_id, Some(PlayerId::new("a1")));
    }

    #[test]
    fn target_is_first_innings_plus_one() {
        let mut s = MatchState::new();
        s.first_innings = Some(InningsSummary {
            runs: 120,
            wickets: 4,
            overs_label: "20.0".to_string(),
        });
        assert_eq!(s.target(), Some(121));
    }

    #[test]
    fn invariant_catches_over_counter_drift() {
        let mut s = MatchState::new();
        s.legal_balls_in_over = 2;
        assert!(matches!(
            s.check_invariants(11).unwrap_err(),
            BatballError::SnapshotInvariant { .. }
        ));
    }

    #[test]
    fn invariant_catches_same_batter_both_ends() {
        let mut s = MatchState::dummy_ready();
        s.non_striker_id = s.striker_id.clone();
        assert!(s.check_invariants(11).is_err());
    }

    #[test]
    fn invariant_catches_retired_batter_at_crease() {
        let mut s = MatchState::dummy_ready();
        s.retired_ids.insert(PlayerId::new("a1"));
        assert!(s.check_invariants(11).is_err());
    }

    #[test]
    fn invariant_catches_counters_disagreeing_with_history() {
        let mut s = MatchState::dummy_ready();
        s.history
            .push(Delivery::dummy(4, DeliveryKind::Legal, WicketKind::None));
        assert!(s.check_invariants(11).is_err());

        s.runs = 4;
        s.legal_balls_total = 1;
        s.legal_balls_in_over = 1;
        assert!(s.check_invariants(11).is_ok());
    }

    #[test]
    fn current_over_skips_retirements_and_old_overs() {
        let mut s = MatchState::dummy_ready();
        let mut old = Delivery::dummy(1, DeliveryKind::Legal, WicketKind::None);
        old.over_index = 0;
        let mut now = Delivery::dummy(2, DeliveryKind::Legal, WicketKind::None);
        now.over_index = 1;
        let mut marker = Delivery::dummy(0, DeliveryKind::Legal, WicketKind::Retired);
        marker.over_index = 1;
        s.history = vec![old, now, marker];
        s.legal_balls_total = 7;
        s.legal_balls_in_over = 1;

        let over = s.current_over_deliveries();
        assert_eq!(over.len(), 1);
        assert_eq!(over[0].runs_off_bat, 2);
    }
}
