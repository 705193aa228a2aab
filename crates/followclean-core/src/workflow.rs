//! Phase bookkeeping shared by every front end.
//!
//! A [`Workflow`] turns user commands into review-session operations and
//! tells the caller which side effects to perform on the backend. It never
//! touches the page itself.

use tracing::{debug, info};

use crate::executor::{RunLog, RunSummary};
use crate::session::{Bucket, OrderMode, ReviewSession, ReviewSnapshot, SwipeDirection};
use crate::{Account, CoreEvent, ReviewConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Scanning,
    Swiping,
    Results,
    Unfollowing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    StartScan,
    Swipe(SwipeDirection),
    Undo,
    SetOrder(OrderMode),
    ToggleOrder,
    MoveDecision { handle: String, to: Bucket },
    OpenResults,
    BackToReview,
    StartExecution,
    CancelExecution,
    FinishAnimation,
    /// Leave the finished run view.
    Dismiss,
    /// Drop the review session without unfollowing anyone.
    Abandon,
}

/// Work the caller must carry out after a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// The review state changed; re-render from this.
    Review(Box<ReviewSnapshot>),
    StartScan,
    /// Unfollow these accounts, in this order.
    Execute(Vec<Account>),
    Cancel,
}

/// Progress of the current (or last) unfollow run.
#[derive(Debug, Clone, Default)]
pub struct RunView {
    pub total: usize,
    pub processed: usize,
    pub current: Option<Account>,
    pub log: RunLog,
    pub summary: Option<RunSummary>,
    pub cancel_requested: bool,
}

impl RunView {
    fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn is_finished(&self) -> bool {
        self.summary.is_some()
    }

    /// `"i of n: name (handle)"` while running, the summary line after.
    pub fn status_line(&self) -> String {
        if let Some(summary) = &self.summary {
            return summary.status_line();
        }
        match &self.current {
            Some(account) => format!(
                "{} of {}: {} ({})",
                self.processed + 1,
                self.total,
                account.display_name,
                account.handle
            ),
            None => format!("Starting {} unfollows", self.total),
        }
    }

    /// Fraction of accounts processed, in `0.0..=1.0`.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.processed as f64 / self.total as f64
        }
    }
}

pub struct Workflow {
    phase: Phase,
    config: ReviewConfig,
    session: Option<ReviewSession>,
    scan_count: usize,
    run: Option<RunView>,
}

impl Workflow {
    pub fn new(config: ReviewConfig) -> Self {
        Self {
            phase: Phase::Idle,
            config,
            session: None,
            scan_count: 0,
            run: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn session(&self) -> Option<&ReviewSession> {
        self.session.as_ref()
    }

    /// Accounts found so far by the running scan.
    pub fn scan_count(&self) -> usize {
        self.scan_count
    }

    pub fn run(&self) -> Option<&RunView> {
        self.run.as_ref()
    }

    /// Every card has been swiped; the swipe view shows the summary instead.
    pub fn all_reviewed(&self) -> bool {
        self.session.as_ref().is_some_and(ReviewSession::is_complete)
    }

    fn review_effect(&self) -> Option<Effect> {
        self.session
            .as_ref()
            .map(|s| Effect::Review(Box::new(s.snapshot())))
    }

    /// Apply a command. Commands that make no sense in the current phase are
    /// ignored and yield `None`.
    pub fn handle(&mut self, command: Command) -> Option<Effect> {
        debug!(?command, phase = ?self.phase, "workflow command");
        match (self.phase, command) {
            (Phase::Idle, Command::StartScan) => {
                self.phase = Phase::Scanning;
                self.scan_count = 0;
                self.run = None;
                Some(Effect::StartScan)
            }
            (Phase::Swiping, Command::Swipe(direction)) => {
                self.session.as_mut()?.swipe(direction)?;
                self.review_effect()
            }
            (Phase::Swiping, Command::Undo) => {
                self.session.as_mut()?.undo()?;
                self.review_effect()
            }
            (Phase::Swiping, Command::SetOrder(mode)) => {
                self.session.as_mut()?.set_order(mode);
                self.review_effect()
            }
            (Phase::Swiping, Command::ToggleOrder) => {
                self.session.as_mut()?.toggle_order();
                self.review_effect()
            }
            (Phase::Swiping | Phase::Results, Command::FinishAnimation) => {
                self.session.as_mut()?.finish_animation();
                None
            }
            (Phase::Swiping, Command::OpenResults) => {
                self.session.as_ref()?;
                self.phase = Phase::Results;
                None
            }
            (Phase::Results, Command::BackToReview) => {
                self.phase = Phase::Swiping;
                None
            }
            (Phase::Results, Command::MoveDecision { handle, to }) => {
                if self.session.as_mut()?.move_decision(&handle, to) {
                    self.review_effect()
                } else {
                    None
                }
            }
            (Phase::Swiping | Phase::Results, Command::StartExecution) => {
                let accounts: Vec<Account> = self
                    .session
                    .as_ref()?
                    .unfollowed_accounts()
                    .cloned()
                    .collect();
                if accounts.is_empty() {
                    return None;
                }
                info!(count = accounts.len(), "starting execution");
                self.phase = Phase::Unfollowing;
                self.run = Some(RunView::new(accounts.len()));
                Some(Effect::Execute(accounts))
            }
            (Phase::Unfollowing, Command::CancelExecution) => {
                let run = self.run.as_mut()?;
                if run.is_finished() || run.cancel_requested {
                    return None;
                }
                run.cancel_requested = true;
                Some(Effect::Cancel)
            }
            (Phase::Unfollowing, Command::Dismiss) => {
                if !self.run.as_ref().is_some_and(RunView::is_finished) {
                    return None;
                }
                self.phase = Phase::Idle;
                self.session = None;
                None
            }
            (Phase::Swiping | Phase::Results, Command::Abandon) => {
                info!("review abandoned");
                self.phase = Phase::Idle;
                self.session = None;
                None
            }
            _ => None,
        }
    }

    /// Fold a backend event into the state.
    pub fn on_event(&mut self, event: &CoreEvent) {
        match event {
            CoreEvent::ScanProgress { count } if self.phase == Phase::Scanning => {
                self.scan_count = *count;
            }
            CoreEvent::ScanComplete { accounts } if self.phase == Phase::Scanning => {
                self.scan_count = accounts.len();
                self.session = Some(ReviewSession::new(accounts.clone(), &self.config));
                self.phase = Phase::Swiping;
            }
            CoreEvent::ScanRefused if self.phase == Phase::Scanning => {
                debug!("scan refused, back to idle");
                self.phase = Phase::Idle;
                self.scan_count = 0;
            }
            CoreEvent::UnfollowStarted { account, index, .. } => {
                if let Some(run) = self.run.as_mut() {
                    run.current = Some(account.clone());
                    run.processed = *index;
                }
            }
            CoreEvent::UnfollowProgress {
                index,
                account,
                outcome,
                ..
            } => {
                if let Some(run) = self.run.as_mut() {
                    run.processed = index + 1;
                    run.log.push(account.clone(), outcome.clone());
                }
            }
            CoreEvent::UnfollowSummary(summary) => {
                if let Some(run) = self.run.as_mut() {
                    run.summary = Some(*summary);
                    run.current = None;
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{FailureReason, UnfollowOutcome};

    fn config() -> ReviewConfig {
        ReviewConfig {
            default_order: OrderMode::Oldest,
            animate: false,
            seed: Some(1),
        }
    }

    fn scanned(handles: &[&str]) -> Workflow {
        let mut wf = Workflow::new(config());
        assert_eq!(wf.handle(Command::StartScan), Some(Effect::StartScan));
        let accounts = handles.iter().map(|h| Account::new(*h, *h)).collect();
        wf.on_event(&CoreEvent::ScanComplete { accounts });
        wf
    }

    #[test]
    fn scan_moves_idle_to_swiping() {
        let mut wf = Workflow::new(config());
        wf.handle(Command::StartScan);
        assert_eq!(wf.phase(), Phase::Scanning);
        assert_eq!(wf.handle(Command::StartScan), None, "no second scan");

        wf.on_event(&CoreEvent::ScanProgress { count: 4 });
        assert_eq!(wf.scan_count(), 4);

        wf.on_event(&CoreEvent::ScanComplete {
            accounts: vec![Account::new("@a", "A")],
        });
        assert_eq!(wf.phase(), Phase::Swiping);
        assert_eq!(wf.session().unwrap().len(), 1);
    }

    #[test]
    fn refused_scan_returns_to_idle() {
        let mut wf = Workflow::new(config());
        wf.handle(Command::StartScan);
        wf.on_event(&CoreEvent::ScanRefused);
        assert_eq!(wf.phase(), Phase::Idle);
        assert_eq!(wf.handle(Command::StartScan), Some(Effect::StartScan));

        let mut wf = scanned(&["@a"]);
        wf.on_event(&CoreEvent::ScanRefused);
        assert_eq!(wf.phase(), Phase::Swiping, "only a pending scan is undone");
    }

    #[test]
    fn swipes_emit_review_state() {
        let mut wf = scanned(&["@a", "@b"]);
        let Some(Effect::Review(snapshot)) = wf.handle(Command::Swipe(SwipeDirection::Left)) else {
            panic!("expected review effect");
        };
        assert_eq!(snapshot.current_index, 1);
        assert_eq!(snapshot.unfollowed.len(), 1);
        assert_eq!(wf.handle(Command::Undo).map(|_| ()), Some(()));
        assert_eq!(wf.handle(Command::Undo), None, "nothing left to undo");
    }

    #[test]
    fn completing_the_queue_keeps_phase() {
        let mut wf = scanned(&["@a"]);
        wf.handle(Command::Swipe(SwipeDirection::Right));
        assert!(wf.all_reviewed());
        assert_eq!(wf.phase(), Phase::Swiping);
    }

    #[test]
    fn results_round_trip_and_move() {
        let mut wf = scanned(&["@a", "@b"]);
        wf.handle(Command::Swipe(SwipeDirection::Right));
        wf.handle(Command::OpenResults);
        assert_eq!(wf.phase(), Phase::Results);
        assert_eq!(wf.handle(Command::Swipe(SwipeDirection::Left)), None);

        let moved = wf.handle(Command::MoveDecision {
            handle: "@a".into(),
            to: Bucket::Unfollow,
        });
        assert!(matches!(moved, Some(Effect::Review(_))));
        assert_eq!(wf.session().unwrap().unfollowed_count(), 1);

        wf.handle(Command::BackToReview);
        assert_eq!(wf.phase(), Phase::Swiping);
    }

    #[test]
    fn execution_needs_rejects() {
        let mut wf = scanned(&["@a", "@b"]);
        wf.handle(Command::Swipe(SwipeDirection::Right));
        assert_eq!(wf.handle(Command::StartExecution), None);
        assert_eq!(wf.phase(), Phase::Swiping);
    }

    #[test]
    fn execution_lifecycle() {
        let mut wf = scanned(&["@a", "@b", "@c"]);
        wf.handle(Command::Swipe(SwipeDirection::Left));
        wf.handle(Command::Swipe(SwipeDirection::Right));
        wf.handle(Command::Swipe(SwipeDirection::Left));

        let Some(Effect::Execute(accounts)) = wf.handle(Command::StartExecution) else {
            panic!("expected execute effect");
        };
        let handles: Vec<&str> = accounts.iter().map(|a| a.handle.as_str()).collect();
        assert_eq!(handles, vec!["@a", "@c"]);
        assert_eq!(wf.phase(), Phase::Unfollowing);
        assert_eq!(wf.handle(Command::Dismiss), None);
        assert_eq!(wf.phase(), Phase::Unfollowing, "cannot dismiss a live run");

        wf.on_event(&CoreEvent::UnfollowStarted {
            index: 0,
            total: 2,
            account: accounts[0].clone(),
        });
        assert_eq!(wf.run().unwrap().status_line(), "1 of 2: @a (@a)");
        wf.on_event(&CoreEvent::UnfollowProgress {
            index: 0,
            total: 2,
            account: accounts[0].clone(),
            outcome: UnfollowOutcome::Failed(FailureReason::TriggerMissing),
        });
        assert_eq!(wf.run().unwrap().processed, 1);

        assert_eq!(wf.handle(Command::CancelExecution), Some(Effect::Cancel));
        assert_eq!(wf.handle(Command::CancelExecution), None, "cancel is sent once");

        let summary = RunSummary {
            succeeded: 0,
            failed: 1,
            stopped_early: true,
            total: 2,
        };
        wf.on_event(&CoreEvent::UnfollowSummary(summary));
        let run = wf.run().unwrap();
        assert_eq!(run.status_line(), "0 unfollowed, 1 failed (stopped at 1/2)");
        assert_eq!(run.log.len(), 1);

        wf.handle(Command::Dismiss);
        assert_eq!(wf.phase(), Phase::Idle);
        assert!(wf.session().is_none());
    }

    #[test]
    fn abandon_drops_session() {
        let mut wf = scanned(&["@a"]);
        wf.handle(Command::Abandon);
        assert_eq!(wf.phase(), Phase::Idle);
        assert!(wf.session().is_none());
        assert_eq!(wf.handle(Command::StartScan), Some(Effect::StartScan));
    }

    #[test]
    fn late_scan_events_are_ignored_outside_scanning() {
        let mut wf = scanned(&["@a"]);
        wf.on_event(&CoreEvent::ScanComplete {
            accounts: vec![Account::new("@x", "X"), Account::new("@y", "Y")],
        });
        assert_eq!(wf.session().unwrap().len(), 1);
    }
}
