//! End-to-end scoring through a session.
//!
//! Every scenario drives the public session API only: open the innings,
//! score deliveries, resolve selections, undo, turn the innings and
//! finalize. Persistence tests go through a real store.

use batball_scoring::{
    CreaseSlot, DeliveryIntent, DeliveryOutcome, IgnoreReason, InningsEnd, InningsStatus,
    SelectionPrompt,
};
use batball_session::{
    ChannelPublisher, KeyValueStore, MemoryStore, NullPublisher, Recovery, ScoringSession,
    SnapshotPublisher, StorePublisher, load_registry, run_store_writer,
};
use batball_types::{
    Innings, Margin, MatchResult, MatchSettings, PlayerId, SessionConfig, TeamId, WicketKind,
};

fn p(id: &str) -> PlayerId {
    PlayerId::new(id)
}

/// A session with `a1` on strike, `a2` at the other end and `b1` bowling.
fn opened<P: SnapshotPublisher>(
    settings: MatchSettings,
    publisher: P,
) -> ScoringSession<P> {
    let mut s = ScoringSession::new(settings, publisher).unwrap();
    s.select_batter(CreaseSlot::Striker, &p("a1")).unwrap();
    s.select_batter(CreaseSlot::NonStriker, &p("a2")).unwrap();
    s.select_bowler(&p("b1")).unwrap();
    s
}

fn applied(outcome: DeliveryOutcome) {
    assert!(
        matches!(outcome, DeliveryOutcome::Applied(_)),
        "expected Applied, got {outcome:?}"
    );
}

#[test]
fn six_singles_complete_the_over_with_ends_changed() {
    let mut s = opened(MatchSettings::dummy(11, 20), NullPublisher);
    for _ in 0..6 {
        applied(s.submit(&DeliveryIntent::legal(1)).unwrap());
    }
    let state = s.state();
    assert_eq!(state.runs, 6);
    assert_eq!(state.wickets_down, 0);
    assert_eq!(state.legal_balls_in_over, 0);
    assert_eq!(state.legal_balls_total, 6);
    // Six odd-run swaps cancel out; the change of ends leaves a2 on strike.
    assert_eq!(state.striker_id, Some(p("a2")));
    assert_eq!(state.non_striker_id, Some(p("a1")));
    assert_eq!(s.pending(), &[SelectionPrompt::Bowler]);
}

#[test]
fn boundary_wide_run_out_six() {
    let mut s = opened(MatchSettings::dummy(11, 20), NullPublisher);
    applied(s.submit(&DeliveryIntent::legal(4)).unwrap());
    applied(s.submit(&DeliveryIntent::wide(0)).unwrap());
    applied(s.submit(&DeliveryIntent::wicket(WicketKind::RunOut)).unwrap());

    assert!(matches!(s.pending(), [SelectionPrompt::RunOut(_)]));
    s.run_out_dismissed(&p("a2")).unwrap();
    s.run_out_replacement(&p("a3")).unwrap();
    s.run_out_end(CreaseSlot::NonStriker).unwrap();
    assert!(s.pending().is_empty());
    assert_eq!(s.state().non_striker_id, Some(p("a3")));

    applied(s.submit(&DeliveryIntent::legal(6)).unwrap());
    assert_eq!(s.state().runs, 11);
    assert_eq!(s.state().wickets_down, 1);

    let card = s.scorecard(Innings::First);
    assert!(card.batter(&p("a2")).unwrap().dismissal.is_out());
    assert_eq!(card.batter(&p("a1")).unwrap().runs, 10);
    assert_eq!(card.extras.total(), 1);
}

#[test]
fn undo_after_run_out_restores_crease() {
    let mut s = opened(MatchSettings::dummy(11, 20), NullPublisher);
    applied(s.submit(&DeliveryIntent::legal(4)).unwrap());
    applied(s.submit(&DeliveryIntent::wide(0)).unwrap());
    applied(s.submit(&DeliveryIntent::wicket(WicketKind::RunOut)).unwrap());
    s.run_out_dismissed(&p("a2")).unwrap();
    s.run_out_replacement(&p("a3")).unwrap();
    s.run_out_end(CreaseSlot::NonStriker).unwrap();

    assert!(s.undo());
    let state = s.state();
    assert_eq!(state.wickets_down, 0);
    assert_eq!(state.runs, 5);
    assert_eq!(state.striker_id, Some(p("a1")));
    assert_eq!(state.non_striker_id, Some(p("a2")));
    assert!(s.pending().is_empty());
}

#[test]
fn undo_mid_run_out_drops_the_flow() {
    let mut s = opened(MatchSettings::dummy(11, 20), NullPublisher);
    applied(s.submit(&DeliveryIntent::wicket(WicketKind::RunOut)).unwrap());
    s.run_out_dismissed(&p("a1")).unwrap();

    assert!(s.undo());
    assert!(s.pending().is_empty());
    assert_eq!(s.state().wickets_down, 0);
    applied(s.submit(&DeliveryIntent::legal(2)).unwrap());
}

#[test]
fn extras_never_consume_balls() {
    let mut s = opened(MatchSettings::dummy(11, 20), NullPublisher);
    for r in 0..=4 {
        let before = s.state().runs;
        applied(s.submit(&DeliveryIntent::wide(r)).unwrap());
        applied(s.submit(&DeliveryIntent::no_ball(r)).unwrap());
        assert_eq!(s.state().runs, before + 2 * (r + 1));
        assert_eq!(s.state().legal_balls_total, 0);
    }
}

#[test]
fn wickets_cap_closes_the_innings() {
    let mut s = opened(MatchSettings::dummy(3, 20), NullPublisher);
    applied(s.submit(&DeliveryIntent::wicket(WicketKind::Bowled)).unwrap());
    s.select_batter(CreaseSlot::Striker, &p("a3")).unwrap();
    applied(s.submit(&DeliveryIntent::wicket(WicketKind::Caught)).unwrap());

    assert_eq!(s.state().wickets_down, 2);
    assert_eq!(s.status(), InningsStatus::Ended(InningsEnd::AllOut));
    assert!(s.pending().is_empty());
    assert_eq!(
        s.submit(&DeliveryIntent::legal(4)).unwrap(),
        DeliveryOutcome::Ignored(IgnoreReason::InningsComplete)
    );
}

#[test]
fn retired_batter_can_return() {
    let mut s = opened(MatchSettings::dummy(4, 20), NullPublisher);
    applied(s.submit(&DeliveryIntent::retire(p("a1"))).unwrap());
    assert_eq!(s.state().wickets_down, 0);
    assert_eq!(s.state().legal_balls_total, 0);
    assert!(s.state().retired_ids.contains(&p("a1")));
    assert_eq!(
        s.pending(),
        &[SelectionPrompt::Batter {
            slot: CreaseSlot::Striker
        }]
    );

    s.select_batter(CreaseSlot::Striker, &p("a3")).unwrap();
    applied(s.submit(&DeliveryIntent::wicket(WicketKind::Stumped)).unwrap());
    s.select_batter(CreaseSlot::Striker, &p("a1")).unwrap();
    assert!(s.state().retired_ids.is_empty());
    assert_eq!(s.state().striker_id, Some(p("a1")));
}

#[test]
fn full_match_chase_and_finalize() {
    let store = MemoryStore::new();
    let config = SessionConfig::default();
    let mut s = opened(
        MatchSettings::dummy(5, 1),
        StorePublisher::new(store.clone(), config.clone()),
    );

    // First innings: 6 balls, 10 runs.
    for runs in [4, 0, 2, 0, 4, 0] {
        applied(s.submit(&DeliveryIntent::legal(runs)).unwrap());
    }
    assert_eq!(s.status(), InningsStatus::Ended(InningsEnd::OversComplete));
    assert!(s.pending().is_empty());
    assert!(s.finish().is_err());

    s.next_innings().unwrap();
    assert_eq!(s.state().target(), Some(11));
    assert_eq!(s.pending().len(), 3);
    s.select_batter(CreaseSlot::Striker, &p("b1")).unwrap();
    s.select_batter(CreaseSlot::NonStriker, &p("b2")).unwrap();
    s.select_bowler(&p("a5")).unwrap();

    applied(s.submit(&DeliveryIntent::legal(6)).unwrap());
    applied(s.submit(&DeliveryIntent::wicket(WicketKind::Lbw)).unwrap());
    s.select_batter(CreaseSlot::Striker, &p("b3")).unwrap();
    applied(s.submit(&DeliveryIntent::legal(4)).unwrap());
    assert!(!s.state().is_match_complete);
    applied(s.submit(&DeliveryIntent::legal(1)).unwrap());
    assert!(s.state().is_match_complete);
    assert_eq!(s.state().runs, 11);
    assert_eq!(
        s.submit(&DeliveryIntent::legal(1)).unwrap(),
        DeliveryOutcome::Ignored(IgnoreReason::MatchComplete)
    );

    assert_eq!(load_registry(&store, &config.registry_key).unwrap().len(), 1);
    let record = s.finish().unwrap();
    assert_eq!(
        record.final_score.result,
        MatchResult::Won {
            winner: TeamId::new("B"),
            margin: Margin::Wickets(3),
        }
    );
    assert_eq!(record.history.len(), 10);
    assert!(batball_scoring::verify_history_root(
        &record.history,
        &record.history_root
    ));
    assert!(load_registry(&store, &config.registry_key).unwrap().is_empty());
}

#[test]
fn resume_continues_a_run_out_in_progress() {
    let store = MemoryStore::new();
    let config = SessionConfig::default();
    let settings = MatchSettings::dummy(11, 20);
    let mut s = opened(
        settings.clone(),
        StorePublisher::new(store.clone(), config.clone()),
    );
    applied(s.submit(&DeliveryIntent::legal(3)).unwrap());
    applied(s.submit(&DeliveryIntent::wicket(WicketKind::RunOut)).unwrap());
    s.run_out_dismissed(&p("a1")).unwrap();
    drop(s);

    let (mut resumed, recovery) =
        ScoringSession::resume(settings, &store, &config, NullPublisher).unwrap();
    assert_eq!(recovery, Recovery::Restored);
    assert_eq!(resumed.state().runs, 3);
    resumed.run_out_replacement(&p("a3")).unwrap();
    resumed.run_out_end(CreaseSlot::Striker).unwrap();
    assert_eq!(resumed.state().striker_id, Some(p("a3")));
    assert_eq!(resumed.state().non_striker_id, Some(p("a2")));
}

#[test]
fn corrupt_snapshot_falls_back_to_fresh() {
    let store = MemoryStore::new();
    let config = SessionConfig::default();
    store
        .put(&config.active_state_key, "{\"schema_version\":1".to_string())
        .unwrap();

    let (s, recovery) =
        ScoringSession::resume(MatchSettings::dummy(5, 2), &store, &config, NullPublisher)
            .unwrap();
    assert!(matches!(recovery, Recovery::Discarded { .. }));
    assert_eq!(s.state().runs, 0);
    assert_eq!(s.pending().len(), 3);
}

#[tokio::test]
async fn channel_publisher_persists_in_background() {
    let store = MemoryStore::new();
    let config = SessionConfig::default();
    let (publisher, rx) = ChannelPublisher::new();
    let writer = tokio::spawn(run_store_writer(rx, store.clone(), config.clone()));

    let settings = MatchSettings::dummy(5, 2);
    let mut s = opened(settings.clone(), publisher);
    applied(s.submit(&DeliveryIntent::legal(4)).unwrap());
    drop(s);
    writer.await.unwrap();

    let (resumed, recovery) =
        ScoringSession::resume(settings, &store, &config, NullPublisher).unwrap();
    assert_eq!(recovery, Recovery::Restored);
    assert_eq!(resumed.state().runs, 4);
}
