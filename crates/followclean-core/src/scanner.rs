//! Discovering every followed account by scrolling the list to convergence.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use crate::page::HostPage;
use crate::poll::BoundedPoll;
use crate::{Account, ScanConfig};

/// Accumulated state of one scan pass.
///
/// Accounts are kept in first-seen order, which on the following page is
/// newest-first. [`ScanState::into_accounts`] flips that once.
#[derive(Debug)]
pub struct ScanState {
    accounts: Vec<Account>,
    seen: HashSet<String>,
    last_count: usize,
    stable_iterations: u32,
    threshold: u32,
}

impl ScanState {
    pub fn new(threshold: u32) -> Self {
        Self {
            accounts: Vec::new(),
            seen: HashSet::new(),
            last_count: 0,
            stable_iterations: 0,
            threshold: threshold.max(1),
        }
    }

    /// Record a candidate. Returns `false` for an empty or already-seen handle.
    pub fn observe(&mut self, account: Account) -> bool {
        if account.handle.trim().is_empty() {
            return false;
        }
        if !self.seen.insert(account.handle_key()) {
            return false;
        }
        self.accounts.push(account);
        true
    }

    /// Close out one iteration. Returns `true` once the distinct count has
    /// stayed flat for `threshold` consecutive iterations.
    pub fn end_iteration(&mut self) -> bool {
        if self.accounts.len() == self.last_count {
            self.stable_iterations += 1;
        } else {
            self.stable_iterations = 0;
            self.last_count = self.accounts.len();
        }
        self.stable_iterations >= self.threshold
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn stable_iterations(&self) -> u32 {
        self.stable_iterations
    }

    /// Oldest-first account list.
    pub fn into_accounts(mut self) -> Vec<Account> {
        self.accounts.reverse();
        self.accounts
    }
}

/// Scrolls the page, extracting cards until no new ones appear.
pub struct AccountScanner<P> {
    page: Arc<P>,
    config: ScanConfig,
    scanning: AtomicBool,
}

/// Clears the in-progress flag however the scan future ends, including when
/// it is dropped mid-flight.
struct ScanGuard<'a>(&'a AtomicBool);

impl Drop for ScanGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<P: HostPage> AccountScanner<P> {
    pub fn new(page: Arc<P>, config: ScanConfig) -> Self {
        Self {
            page,
            config,
            scanning: AtomicBool::new(false),
        }
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning.load(Ordering::SeqCst)
    }

    /// Run one full scan. `progress` receives the distinct count after every
    /// iteration.
    ///
    /// Returns `None` without touching the page if a scan is already running.
    pub async fn scan<F>(&self, progress: F) -> Option<Vec<Account>>
    where
        F: Fn(usize) + Send + Sync,
    {
        if self.scanning.swap(true, Ordering::SeqCst) {
            debug!("scan already in progress, ignoring request");
            return None;
        }
        let _guard = ScanGuard(&self.scanning);

        info!("scan started");
        self.reset_viewport().await;
        tokio::time::sleep(self.config.initial_delay).await;

        let poll = match self.config.max_iterations {
            Some(max) => BoundedPoll::new(max, self.config.settle_delay),
            None => BoundedPoll::unbounded(self.config.settle_delay),
        };
        let mut attempts = poll.attempts();
        let mut state = ScanState::new(self.config.stability_threshold);

        while let Some(iteration) = attempts.next().await {
            let added = self.collect_visible(&mut state).await;
            progress(state.len());
            debug!(iteration, added, count = state.len(), "scan iteration");

            if state.end_iteration() {
                break;
            }
            if let Err(e) = self.page.scroll_by(self.config.scroll_step_px).await {
                warn!(error = %e, "scroll failed, treating iteration as idle");
            }
        }

        let accounts = state.into_accounts();
        info!(count = accounts.len(), iterations = attempts.used(), "scan finished");

        self.reset_viewport().await;
        tokio::time::sleep(self.config.return_delay).await;
        Some(accounts)
    }

    async fn reset_viewport(&self) {
        if let Err(e) = self.page.scroll_to(0).await {
            warn!(error = %e, "could not scroll to top");
        }
    }

    /// Extract every rendered card into `state`, returning how many were new.
    async fn collect_visible(&self, state: &mut ScanState) -> usize {
        let rows = match self.page.visible_rows().await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "could not enumerate cards");
                return 0;
            }
        };

        let mut added = 0;
        for row in &rows {
            match self.page.extract(row).await {
                Ok(Some(account)) => {
                    if state.observe(account) {
                        added += 1;
                    }
                }
                Ok(None) => {}
                Err(e) => debug!(error = %e, "skipping card"),
            }
        }
        added
    }
}
