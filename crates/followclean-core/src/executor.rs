//! Sequential, throttled, cancellable unfollow runs.

use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::page::{HostPage, PageError};
use crate::poll::BoundedPoll;
use crate::throttle::Throttle;
use crate::{Account, CoreEvent, ExecuteConfig};

/// Why one account could not be unfollowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The row never showed up within the scroll budget.
    NotFound { steps: usize },
    /// The row was found but carried no unfollow control.
    TriggerMissing,
    /// The unfollow dialog never offered a confirm button.
    ConfirmationMissing,
    /// The page itself failed mid-protocol.
    Page(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::NotFound { steps } => {
                write!(f, "not found after {} scroll steps", steps)
            }
            FailureReason::TriggerMissing => write!(f, "unfollow button not found"),
            FailureReason::ConfirmationMissing => write!(f, "confirmation dialog did not appear"),
            FailureReason::Page(msg) => write!(f, "page error: {}", msg),
        }
    }
}

impl From<PageError> for FailureReason {
    fn from(e: PageError) -> Self {
        FailureReason::Page(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnfollowOutcome {
    Succeeded,
    Failed(FailureReason),
}

impl UnfollowOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UnfollowOutcome::Succeeded)
    }
}

/// Totals for one run. Only accounts actually attempted are counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub stopped_early: bool,
    /// Accounts the run was asked to process.
    pub total: usize,
}

impl RunSummary {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn processed(&self) -> usize {
        self.succeeded + self.failed
    }

    /// `"S unfollowed, F failed"`, with `(stopped at k/n)` after a cancel.
    pub fn status_line(&self) -> String {
        let mut line = format!("{} unfollowed, {} failed", self.succeeded, self.failed);
        if self.stopped_early {
            line.push_str(&format!(" (stopped at {}/{})", self.processed(), self.total));
        }
        line
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub account: Account,
    pub outcome: UnfollowOutcome,
}

impl LogEntry {
    pub fn message(&self) -> String {
        let who = format!("{} ({})", self.account.display_name, self.account.handle);
        match &self.outcome {
            UnfollowOutcome::Succeeded => format!("Unfollowed {}", who),
            UnfollowOutcome::Failed(reason) => format!("Failed {}: {}", who, reason),
        }
    }
}

/// Append-only record of a run, read back newest first.
#[derive(Debug, Clone, Default)]
pub struct RunLog {
    entries: Vec<LogEntry>,
}

impl RunLog {
    pub fn push(&mut self, account: Account, outcome: UnfollowOutcome) {
        self.entries.push(LogEntry { account, outcome });
    }

    pub fn iter_recent_first(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Drives the per-account unfollow protocol against a [`HostPage`].
pub struct UnfollowExecutor<P> {
    page: Arc<P>,
    config: ExecuteConfig,
    throttle: Throttle,
}

impl<P: HostPage> UnfollowExecutor<P> {
    /// Attempt budgets below one are raised to one.
    pub fn new(page: Arc<P>, mut config: ExecuteConfig) -> Self {
        config.locate_budget = config.locate_budget.max(1);
        config.confirm_attempts = config.confirm_attempts.max(1);
        let throttle = Throttle::new(config.throttle);
        Self {
            page,
            config,
            throttle,
        }
    }

    /// Unfollow `accounts` strictly in order.
    ///
    /// `cancel` is checked before each account; an account already in
    /// progress always finishes. `progress` sees a started and a finished
    /// event per account, then the summary.
    pub async fn run<F>(
        &self,
        accounts: &[Account],
        cancel: &CancellationToken,
        progress: F,
    ) -> RunSummary
    where
        F: Fn(CoreEvent) + Send + Sync,
    {
        let total = accounts.len();
        let mut summary = RunSummary::new(total);
        info!(total, "unfollow run started");

        for (index, account) in accounts.iter().enumerate() {
            if cancel.is_cancelled() {
                info!(processed = summary.processed(), total, "unfollow run cancelled");
                summary.stopped_early = true;
                break;
            }

            progress(CoreEvent::UnfollowStarted {
                index,
                total,
                account: account.clone(),
            });

            let outcome = self.unfollow_one(account).await;
            match &outcome {
                UnfollowOutcome::Succeeded => {
                    summary.succeeded += 1;
                    info!(handle = %account.handle, index, total, "unfollowed");
                }
                UnfollowOutcome::Failed(reason) => {
                    summary.failed += 1;
                    warn!(handle = %account.handle, index, total, %reason, "unfollow failed");
                }
            }
            progress(CoreEvent::UnfollowProgress {
                index,
                total,
                account: account.clone(),
                outcome,
            });

            let is_last = index + 1 == total;
            if !is_last && !cancel.is_cancelled() {
                let wait = self.throttle.next_wait();
                debug!(wait_ms = wait.as_millis() as u64, "throttling");
                tokio::time::sleep(wait).await;
            }
        }

        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            stopped_early = summary.stopped_early,
            "unfollow run finished"
        );
        progress(CoreEvent::UnfollowSummary(summary));
        summary
    }

    /// Run the full locate → trigger → confirm protocol for one account.
    pub async fn unfollow_one(&self, account: &Account) -> UnfollowOutcome {
        match self.try_unfollow(account).await {
            Ok(()) => UnfollowOutcome::Succeeded,
            Err(reason) => UnfollowOutcome::Failed(reason),
        }
    }

    async fn try_unfollow(&self, account: &Account) -> Result<(), FailureReason> {
        let row = self.locate_row(account).await?;

        let trigger = self
            .page
            .locate_trigger(&row)
            .await?
            .ok_or(FailureReason::TriggerMissing)?;
        self.page.activate(&trigger).await?;
        tokio::time::sleep(self.config.trigger_delay).await;

        let page = &self.page;
        let confirm = BoundedPoll::new(self.config.confirm_attempts, self.config.trigger_delay)
            .until(|attempt| async move {
                match page.locate_confirmation().await {
                    Ok(Some(control)) => Some(Ok(control)),
                    Ok(None) => {
                        debug!(attempt, "confirmation not showing yet");
                        None
                    }
                    Err(e) => Some(Err(e)),
                }
            })
            .await
            .transpose()?
            .ok_or(FailureReason::ConfirmationMissing)?;

        self.page.activate(&confirm).await?;
        tokio::time::sleep(self.config.confirm_delay).await;
        Ok(())
    }

    /// Scroll from the top until a row resolves to `account`'s handle.
    async fn locate_row(&self, account: &Account) -> Result<P::Row, FailureReason> {
        self.page.scroll_to(0).await?;
        tokio::time::sleep(self.config.reset_delay).await;

        let poll = BoundedPoll::new(self.config.locate_budget, self.config.locate_delay);
        let mut attempts = poll.attempts();
        while let Some(step) = attempts.next().await {
            for row in self.page.visible_rows().await? {
                match self.page.extract(&row).await {
                    Ok(Some(candidate)) if candidate.same_handle(&account.handle) => {
                        debug!(handle = %account.handle, step, "row located");
                        return Ok(row);
                    }
                    Ok(_) => {}
                    // An unreadable row is not the row we want.
                    Err(e) => debug!(error = %e, step, "skipping unreadable row"),
                }
            }
            self.page.scroll_by(self.config.locate_scroll_px).await?;
        }

        Err(FailureReason::NotFound {
            steps: attempts.used(),
        })
    }
}
