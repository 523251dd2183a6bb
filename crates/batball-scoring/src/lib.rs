//! # batball-scoring
//!
//! **Pure ball-by-ball scoring state machine.**
//!
//! Every operation takes the current [`MatchState`](batball_types::MatchState)
//! by reference and returns a new one. There is no I/O and no shared state;
//! the session layer owns the single authoritative state and publishes it.
//!
//! - **Delivery processor**: runs, extras, wickets, over accounting, strike rotation
//! - **Undo**: exact inverse of the last delivery via the stored crease snapshot
//! - **Run-out flow**: dismissed batter, replacement, end
//! - **Selections**: prompts for vacant crease slots and bowlers
//! - **Innings transition** and completion rules
//! - **Projections**: scorecard, result, history digest

pub mod digest;
pub mod innings;
pub mod processor;
pub mod result;
pub mod run_out;
pub mod scorecard;
pub mod selection;
pub mod status;
pub mod undo;

pub use digest::{compute_history_root, history_root_hex, verify_history_root};
pub use innings::{InningsTransition, transition_innings};
pub use processor::{Applied, DeliveryIntent, DeliveryOutcome, IgnoreReason, apply_delivery};
pub use result::{compute_result, final_score};
pub use run_out::RunOutFlow;
pub use scorecard::{
    BattingLine, BowlingLine, Dismissal, Extras, InningsScorecard, build_scorecard,
    retirement_due, run_rate,
};
pub use selection::{
    CreaseSlot, SelectionPrompt, assign_batter, assign_bowler, eligible_batters,
    eligible_bowlers, required_selections,
};
pub use status::{InningsEnd, InningsStatus, innings_status};
pub use undo::undo_last;
