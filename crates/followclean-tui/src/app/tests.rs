use super::*;
use crate::action::Action;
use followclean_core::{
    CoreEvent, Effect, FailureReason, OrderMode, RunSummary, UnfollowOutcome,
};

/// A minimal App for testing (no backend, no terminal).
fn test_app(animate: bool) -> App {
    let config = ReviewConfig {
        default_order: OrderMode::Oldest,
        animate,
        seed: Some(7),
    };
    App::new(config, Theme::hacker(), "test")
}

fn accounts(handles: &[&str]) -> Vec<Account> {
    handles
        .iter()
        .map(|h| Account::new(*h, h.trim_start_matches('@')))
        .collect()
}

/// Run a scan that finds `handles`, leaving the app on the first card.
fn scanned(animate: bool, handles: &[&str]) -> App {
    let mut app = test_app(animate);
    app.update(Action::StartScan);
    assert_eq!(app.take_effects(), vec![Effect::StartScan]);
    app.update(Action::Backend(CoreEvent::ScanComplete {
        accounts: accounts(handles),
    }));
    app
}

fn current_handle(app: &App) -> Option<String> {
    app.review
        .as_ref()
        .and_then(|r| r.current.as_ref())
        .map(|a| a.handle.clone())
}

// ── Idle & scanning ─────────────────────────────────────────────

#[test]
fn enter_on_idle_starts_scan() {
    let mut app = test_app(false);
    app.update(Action::Confirm);
    assert_eq!(app.phase(), Phase::Scanning);
    assert_eq!(app.take_effects(), vec![Effect::StartScan]);
    assert!(app.take_effects().is_empty(), "outbox drains");
}

#[test]
fn scan_progress_updates_count() {
    let mut app = test_app(false);
    app.update(Action::StartScan);
    app.update(Action::Backend(CoreEvent::ScanProgress { count: 17 }));
    assert_eq!(app.workflow.scan_count(), 17);
    assert!(app.review.is_none());
}

#[test]
fn refused_scan_can_be_retried() {
    let mut app = test_app(false);
    app.update(Action::StartScan);
    app.take_effects();
    app.update(Action::Backend(CoreEvent::ScanRefused));
    assert_eq!(app.phase(), Phase::Idle);

    app.update(Action::StartScan);
    assert_eq!(app.take_effects(), vec![Effect::StartScan]);
}

#[test]
fn scan_complete_shows_first_card() {
    let app = scanned(false, &["@a", "@b"]);
    assert_eq!(app.phase(), Phase::Swiping);
    assert_eq!(current_handle(&app).as_deref(), Some("@a"));
}

// ── Swiping ─────────────────────────────────────────────────────

#[test]
fn swipes_sort_cards() {
    let mut app = scanned(false, &["@a", "@b", "@c"]);
    app.update(Action::SwipeLeft);
    app.update(Action::SwipeRight);

    let review = app.review.as_ref().unwrap();
    assert_eq!(review.unfollowed, accounts(&["@a"]));
    assert_eq!(review.kept, accounts(&["@b"]));
    assert_eq!(current_handle(&app).as_deref(), Some("@c"));
    assert!(app.animation.is_none(), "animation disabled");
}

#[test]
fn undo_restores_previous_card() {
    let mut app = scanned(false, &["@a", "@b"]);
    app.update(Action::SwipeLeft);
    app.update(Action::Undo);
    assert_eq!(current_handle(&app).as_deref(), Some("@a"));
    assert_eq!(app.unfollow_count(), 0);
}

#[test]
fn animation_locks_input_until_it_finishes() {
    let mut app = scanned(true, &["@a", "@b", "@c"]);
    app.update(Action::SwipeLeft);
    let animation = app.animation.as_ref().unwrap();
    assert_eq!(animation.account.handle, "@a");
    assert_eq!(animation.direction, SwipeDirection::Left);

    // Locked: neither swipe nor undo lands.
    app.update(Action::SwipeRight);
    app.update(Action::Undo);
    assert_eq!(current_handle(&app).as_deref(), Some("@b"));
    assert_eq!(app.review.as_ref().unwrap().kept.len(), 0);

    for _ in 0..ANIMATION_TICKS {
        app.update(Action::Tick);
    }
    assert!(app.animation.is_none());
    assert!(!app.review.as_ref().unwrap().animating);

    app.update(Action::SwipeRight);
    assert_eq!(app.review.as_ref().unwrap().kept, accounts(&["@b"]));
}

#[test]
fn toggle_order_reports_mode() {
    let mut app = scanned(false, &["@a", "@b", "@c", "@d"]);
    app.update(Action::ToggleOrder);
    assert_eq!(app.review.as_ref().unwrap().order_mode, OrderMode::Random);
    app.update(Action::ToggleOrder);
    let review = app.review.as_ref().unwrap();
    assert_eq!(review.order_mode, OrderMode::Oldest);
    assert_eq!(review.display_order, accounts(&["@a", "@b", "@c", "@d"]));
}

// ── Results ─────────────────────────────────────────────────────

#[test]
fn results_tabs_and_move() {
    let mut app = scanned(false, &["@a", "@b", "@c"]);
    app.update(Action::SwipeLeft);
    app.update(Action::SwipeLeft);
    app.update(Action::SwipeRight);

    app.update(Action::ToggleResults);
    assert_eq!(app.phase(), Phase::Results);
    assert_eq!(app.results_tab, Bucket::Unfollow);
    assert_eq!(app.results_list(), accounts(&["@a", "@b"]).as_slice());

    app.update(Action::MoveDown);
    app.update(Action::MoveSelected);
    assert_eq!(app.results_list(), accounts(&["@a"]).as_slice());
    assert_eq!(app.results_cursor, 0, "cursor clamps after the list shrinks");

    app.update(Action::SwipeRight);
    assert_eq!(app.results_tab, Bucket::Keep);
    assert_eq!(app.results_list(), accounts(&["@c", "@b"]).as_slice());

    app.update(Action::NavigateBack);
    assert_eq!(app.phase(), Phase::Swiping);
}

#[test]
fn cursor_stops_at_list_end() {
    let mut app = scanned(false, &["@a", "@b"]);
    app.update(Action::SwipeLeft);
    app.update(Action::ToggleResults);
    app.update(Action::MoveDown);
    app.update(Action::MoveDown);
    assert_eq!(app.results_cursor, 0);
}

// ── Execution ───────────────────────────────────────────────────

#[test]
fn execute_requires_confirmation() {
    let mut app = scanned(false, &["@a", "@b"]);
    app.update(Action::SwipeLeft);
    app.update(Action::Execute);
    assert_eq!(app.overlay, Overlay::ExecuteConfirm);
    assert!(app.take_effects().is_empty());

    app.update(Action::NavigateBack);
    assert_eq!(app.overlay, Overlay::None);
    assert_eq!(app.phase(), Phase::Swiping);

    app.update(Action::Execute);
    app.update(Action::Confirm);
    assert_eq!(app.phase(), Phase::Unfollowing);
    assert_eq!(app.take_effects(), vec![Effect::Execute(accounts(&["@a"]))]);
}

#[test]
fn execute_with_nothing_rejected_is_ignored() {
    let mut app = scanned(false, &["@a"]);
    app.update(Action::SwipeRight);
    app.update(Action::Execute);
    assert_eq!(app.overlay, Overlay::None);
}

#[test]
fn run_progress_cancel_and_dismiss() {
    let mut app = scanned(false, &["@a", "@b"]);
    app.update(Action::SwipeLeft);
    app.update(Action::SwipeLeft);
    app.update(Action::Execute);
    app.update(Action::Confirm);
    app.take_effects();

    let a = Account::new("@a", "a");
    app.update(Action::Backend(CoreEvent::UnfollowStarted {
        index: 0,
        total: 2,
        account: a.clone(),
    }));
    app.update(Action::Backend(CoreEvent::UnfollowProgress {
        index: 0,
        total: 2,
        account: a,
        outcome: UnfollowOutcome::Failed(FailureReason::TriggerMissing),
    }));
    assert_eq!(app.workflow.run().unwrap().processed, 1);

    app.update(Action::Confirm);
    assert_eq!(app.phase(), Phase::Unfollowing, "live run cannot be dismissed");

    app.update(Action::CancelRun);
    assert_eq!(app.take_effects(), vec![Effect::Cancel]);

    app.update(Action::Backend(CoreEvent::UnfollowSummary(RunSummary {
        succeeded: 0,
        failed: 1,
        stopped_early: true,
        total: 2,
    })));
    app.update(Action::Confirm);
    assert_eq!(app.phase(), Phase::Idle);
    assert!(app.review.is_none());
}

// ── Overlays ────────────────────────────────────────────────────

#[test]
fn quit_from_idle_is_immediate() {
    let mut app = test_app(false);
    assert!(app.update(Action::Quit));
}

#[test]
fn quit_mid_review_asks_first() {
    let mut app = scanned(false, &["@a"]);
    assert!(!app.update(Action::Quit));
    assert_eq!(app.overlay, Overlay::QuitConfirm);

    app.update(Action::NavigateBack);
    assert_eq!(app.overlay, Overlay::None);
    assert!(!app.should_quit);

    app.update(Action::Quit);
    assert!(app.update(Action::Quit));
}

#[test]
fn quitting_during_run_cancels_it() {
    let mut app = scanned(false, &["@a"]);
    app.update(Action::SwipeLeft);
    app.update(Action::Execute);
    app.update(Action::Confirm);
    app.take_effects();

    app.update(Action::Quit);
    app.update(Action::Confirm);
    assert!(app.should_quit);
    assert_eq!(app.take_effects(), vec![Effect::Cancel]);
}

#[test]
fn help_swallows_keys() {
    let mut app = scanned(false, &["@a", "@b"]);
    app.update(Action::ToggleHelp);
    app.update(Action::SwipeLeft);
    assert_eq!(app.unfollow_count(), 0);
    app.update(Action::ToggleHelp);
    assert_eq!(app.overlay, Overlay::None);
}
