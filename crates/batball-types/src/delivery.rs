//! The delivery event model: one ball bowled.
//!
//! A [`Delivery`] is immutable once appended to the match history. Its
//! classification decides everything the scoring core does with it:
//!
//! | kind     | team runs      | legal ball? | batter credited? |
//! |----------|----------------|-------------|------------------|
//! | `Legal`  | runs           | yes¹        | runs             |
//! | `Wide`   | runs + 1 extra | no          | nothing          |
//! | `NoBall` | runs + 1 extra | no          | runs             |
//!
//! ¹ except a `Retired` marker, which never consumes a ball.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{BatballError, DeliveryId, PlayerId, Result, constants};

/// Which innings a delivery or state belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Innings {
    First,
    Second,
}

impl Innings {
    /// 1-based innings number.
    #[must_use]
    pub fn number(self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
        }
    }

    /// The innings that follows, if any.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            Self::First => Some(Self::Second),
            Self::Second => None,
        }
    }
}

impl std::fmt::Display for Innings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::First => write!(f, "FIRST"),
            Self::Second => write!(f, "SECOND"),
        }
    }
}

/// How the ball was delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryKind {
    Legal,
    Wide,
    NoBall,
}

impl DeliveryKind {
    /// Wides and no-balls award one extra run and never count toward the over.
    #[must_use]
    pub fn is_extra(self) -> bool {
        matches!(self, Self::Wide | Self::NoBall)
    }
}

impl std::fmt::Display for DeliveryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Legal => write!(f, "LEGAL"),
            Self::Wide => write!(f, "WIDE"),
            Self::NoBall => write!(f, "NO_BALL"),
        }
    }
}

/// Wicket outcome of a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WicketKind {
    None,
    Bowled,
    Caught,
    Lbw,
    RunOut,
    Stumped,
    /// Voluntary pause. Never a dismissal.
    Retired,
}

impl WicketKind {
    /// Whether this outcome counts toward the wickets-fallen total.
    #[must_use]
    pub fn is_dismissal(self) -> bool {
        !matches!(self, Self::None | Self::Retired)
    }

    /// Whether the bowler is credited with the wicket.
    #[must_use]
    pub fn credits_bowler(self) -> bool {
        self.is_dismissal() && self != Self::RunOut
    }
}

impl std::fmt::Display for WicketKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "NONE"),
            Self::Bowled => write!(f, "BOWLED"),
            Self::Caught => write!(f, "CAUGHT"),
            Self::Lbw => write!(f, "LBW"),
            Self::RunOut => write!(f, "RUN_OUT"),
            Self::Stumped => write!(f, "STUMPED"),
            Self::Retired => write!(f, "RETIRED"),
        }
    }
}

/// Crease assignment captured immediately before a delivery was applied.
///
/// Undo restores it verbatim, so strike rotations, retirements, returns from
/// retirement and run-out end assignments all reverse exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreaseSnapshot {
    pub striker_id: Option<PlayerId>,
    pub non_striker_id: Option<PlayerId>,
    pub bowler_id: Option<PlayerId>,
    /// Retired batters at that moment. `None` on deliveries recorded
    /// without it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retired_ids: Option<BTreeSet<PlayerId>>,
}

/// One ball bowled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    pub id: DeliveryId,
    pub runs_off_bat: u32,
    pub kind: DeliveryKind,
    pub wicket: WicketKind,
    /// The acting batter: the striker, or the retiring occupant for a
    /// retirement marker.
    pub striker_id: PlayerId,
    pub bowler_id: PlayerId,
    pub innings: Innings,
    /// 0-based over in which the ball was bowled.
    pub over_index: u32,
    pub timestamp: DateTime<Utc>,
    /// Batter actually dismissed. Set at construction for every dismissal
    /// except a run-out, whose victim is folded in once the flow resolves.
    #[serde(default)]
    pub dismissed_id: Option<PlayerId>,
    /// Absent on deliveries recovered from snapshots that predate it.
    #[serde(default)]
    pub crease_before: Option<CreaseSnapshot>,
}

impl Delivery {
    /// Build a delivery, rejecting values no scorer could legitimately enter.
    ///
    /// # Errors
    /// - [`BatballError::RunsOutOfRange`] if `runs_off_bat` exceeds [`constants::MAX_RUNS_OFF_BAT`]
    /// - [`BatballError::InvalidRetirement`] if a `Retired` marker carries runs
    ///   or is not a legal delivery
    pub fn new(
        runs_off_bat: u32,
        kind: DeliveryKind,
        wicket: WicketKind,
        striker_id: PlayerId,
        bowler_id: PlayerId,
        innings: Innings,
        over_index: u32,
    ) -> Result<Self> {
        if runs_off_bat > constants::MAX_RUNS_OFF_BAT {
            return Err(BatballError::RunsOutOfRange {
                runs: runs_off_bat,
                max: constants::MAX_RUNS_OFF_BAT,
            });
        }
        if wicket == WicketKind::Retired {
            if runs_off_bat != 0 {
                return Err(BatballError::InvalidRetirement {
                    reason: format!("retirement carries {runs_off_bat} runs"),
                });
            }
            if kind != DeliveryKind::Legal {
                return Err(BatballError::InvalidRetirement {
                    reason: format!("retirement recorded as {kind}"),
                });
            }
        }

        let dismissed_id = (wicket.is_dismissal() && wicket != WicketKind::RunOut)
            .then(|| striker_id.clone());

        Ok(Self {
            id: DeliveryId::new(),
            runs_off_bat,
            kind,
            wicket,
            striker_id,
            bowler_id,
            innings,
            over_index,
            timestamp: Utc::now(),
            dismissed_id,
            crease_before: None,
        })
    }

    /// Attach the pre-delivery crease assignment.
    #[must_use]
    pub fn with_crease_before(mut self, snapshot: CreaseSnapshot) -> Self {
        self.crease_before = Some(snapshot);
        self
    }

    /// Fold the resolved run-out victim into the delivery.
    #[must_use]
    pub fn with_dismissed(mut self, player: PlayerId) -> Self {
        self.dismissed_id = Some(player);
        self
    }

    /// Runs added to the team total, including the extra for wides and no-balls.
    #[must_use]
    pub fn team_runs(&self) -> u32 {
        if self.kind.is_extra() {
            self.runs_off_bat + constants::EXTRA_RUN_PENALTY
        } else {
            self.runs_off_bat
        }
    }

    /// Whether this delivery consumes one of the six balls of an over.
    #[must_use]
    pub fn is_legal_ball(&self) -> bool {
        self.kind == DeliveryKind::Legal && self.wicket != WicketKind::Retired
    }

    /// Whether this delivery is a pure retirement marker.
    #[must_use]
    pub fn is_retirement(&self) -> bool {
        self.wicket == WicketKind::Retired
    }

    /// The batter dismissed by this delivery, if it was a dismissal.
    ///
    /// An unresolved run-out falls back to the striker.
    #[must_use]
    pub fn dismissed_player(&self) -> Option<&PlayerId> {
        if !self.wicket.is_dismissal() {
            return None;
        }
        Some(self.dismissed_id.as_ref().unwrap_or(&self.striker_id))
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Delivery {
    pub fn dummy(runs_off_bat: u32, kind: DeliveryKind, wicket: WicketKind) -> Self {
        Self::new(
            runs_off_bat,
            kind,
            wicket,
            PlayerId::new("striker"),
            PlayerId::new("bowler"),
            Innings::First,
            0,
        )
        .expect("dummy delivery must be valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extras_add_one_run() {
        let wide = Delivery::dummy(2, DeliveryKind::Wide, WicketKind::None);
        assert_eq!(wide.team_runs(), 3);
        assert!(!wide.is_legal_ball());

        let no_ball = Delivery::dummy(0, DeliveryKind::NoBall, WicketKind::None);
        assert_eq!(no_ball.team_runs(), 1);
        assert!(!no_ball.is_legal_ball());
    }

    #[test]
    fn legal_runs_are_unchanged() {
        let four = Delivery::dummy(4, DeliveryKind::Legal, WicketKind::None);
        assert_eq!(four.team_runs(), 4);
        assert!(four.is_legal_ball());
    }

    #[test]
    fn retirement_never_consumes_a_ball() {
        let marker = Delivery::dummy(0, DeliveryKind::Legal, WicketKind::Retired);
        assert!(!marker.is_legal_ball());
        assert!(marker.is_retirement());
        assert!(marker.dismissed_player().is_none());
    }

    #[test]
    fn runs_above_limit_rejected() {
        let err = Delivery::new(
            constants::MAX_RUNS_OFF_BAT + 1,
            DeliveryKind::Legal,
            WicketKind::None,
            PlayerId::new("a"),
            PlayerId::new("b"),
            Innings::First,
            0,
        )
        .unwrap_err();
        assert!(matches!(err, BatballError::RunsOutOfRange { .. }));
    }

    #[test]
    fn retirement_with_runs_rejected() {
        let err = Delivery::new(
            1,
            DeliveryKind::Legal,
            WicketKind::Retired,
            PlayerId::new("a"),
            PlayerId::new("b"),
            Innings::First,
            0,
        )
        .unwrap_err();
        assert!(matches!(err, BatballError::InvalidRetirement { .. }));
    }

    #[test]
    fn retirement_on_wide_rejected() {
        let err = Delivery::new(
            0,
            DeliveryKind::Wide,
            WicketKind::Retired,
            PlayerId::new("a"),
            PlayerId::new("b"),
            Innings::First,
            0,
        )
        .unwrap_err();
        assert!(matches!(err, BatballError::InvalidRetirement { .. }));
    }

    #[test]
    fn bowled_dismisses_striker() {
        let d = Delivery::dummy(0, DeliveryKind::Legal, WicketKind::Bowled);
        assert_eq!(d.dismissed_player(), Some(&PlayerId::new("striker")));
    }

    #[test]
    fn run_out_victim_folds_in() {
        let d = Delivery::dummy(1, DeliveryKind::Legal, WicketKind::RunOut);
        assert!(d.dismissed_id.is_none());
        assert_eq!(d.dismissed_player(), Some(&PlayerId::new("striker")));

        let folded = d.with_dismissed(PlayerId::new("partner"));
        assert_eq!(folded.dismissed_player(), Some(&PlayerId::new("partner")));
    }

    #[test]
    fn wicket_classification() {
        assert!(!WicketKind::None.is_dismissal());
        assert!(!WicketKind::Retired.is_dismissal());
        assert!(WicketKind::RunOut.is_dismissal());
        assert!(!WicketKind::RunOut.credits_bowler());
        assert!(WicketKind::Stumped.credits_bowler());
    }

    #[test]
    fn innings_numbering() {
        assert_eq!(Innings::First.number(), 1);
        assert_eq!(Innings::Second.number(), 2);
        assert_eq!(Innings::First.next(), Some(Innings::Second));
        assert_eq!(Innings::Second.next(), None);
    }

    #[test]
    fn snapshot_fields_default_when_missing() {
        let d = Delivery::dummy(3, DeliveryKind::Legal, WicketKind::None);
        let mut value = serde_json::to_value(&d).unwrap();
        let obj = value.as_object_mut().unwrap();
        obj.remove("crease_before");
        obj.remove("dismissed_id");
        let back: Delivery = serde_json::from_value(value).unwrap();
        assert!(back.crease_before.is_none());
        assert_eq!(back.runs_off_bat, 3);
    }
}
