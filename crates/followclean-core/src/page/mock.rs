//! Mock host page for testing.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{HostPage, PageError, Viewport};
use crate::Account;

/// One rendered card in a [`MockPage`].
#[derive(Clone, Debug)]
pub struct MockCard {
    /// `None` simulates a card whose profile link cannot be resolved.
    pub account: Option<Account>,
    pub trigger: bool,
}

impl MockCard {
    pub fn account(handle: &str) -> Self {
        let name = handle.trim_start_matches('@').to_string();
        Self {
            account: Some(Account::new(handle, name)),
            trigger: true,
        }
    }

    pub fn unresolvable() -> Self {
        Self {
            account: None,
            trigger: false,
        }
    }

    pub fn without_trigger(mut self) -> Self {
        self.trigger = false;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MockControl {
    Trigger(usize),
    Confirm(usize),
}

struct MockState {
    /// Cards keyed by a stable id so rows survive list churn.
    cards: Vec<(usize, MockCard)>,
    viewport: Viewport,
    pending_confirmation: Option<usize>,
    unfollowed: Vec<String>,
}

/// A hand-rolled [`HostPage`] over a vector of cards.
///
/// Supports:
/// - A fixed-row-height viewport (10 rows of 100 px by default).
/// - Cards with no resolvable account or no unfollow trigger.
/// - A dialog that never shows its confirmation control.
/// - Rows that vanish on unfollow (default) or stay rendered.
/// - Extraction failures for chosen handles.
/// - Call counting.
pub struct MockPage {
    state: Mutex<MockState>,
    confirmation: bool,
    remove_on_unfollow: bool,
    failing: HashSet<String>,
    scroll_calls: AtomicUsize,
    activate_calls: AtomicUsize,
}

impl MockPage {
    pub fn new(cards: Vec<MockCard>) -> Self {
        Self {
            state: Mutex::new(MockState {
                cards: cards.into_iter().enumerate().collect(),
                viewport: Viewport::new(100, 1000),
                pending_confirmation: None,
                unfollowed: Vec::new(),
            }),
            confirmation: true,
            remove_on_unfollow: true,
            failing: HashSet::new(),
            scroll_calls: AtomicUsize::new(0),
            activate_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_viewport(self, row_height: u32, height: u32) -> Self {
        self.lock().viewport = Viewport::new(row_height, height);
        self
    }

    /// Clicking a trigger never brings up a confirmation control.
    pub fn without_confirmation(mut self) -> Self {
        self.confirmation = false;
        self
    }

    pub fn keep_rows_on_unfollow(mut self) -> Self {
        self.remove_on_unfollow = false;
        self
    }

    /// Extraction of this handle's card fails with a transport error.
    pub fn fail_extraction_for(mut self, handle: &str) -> Self {
        self.failing.insert(handle.to_ascii_lowercase());
        self
    }

    /// Handles confirmed so far, in order.
    pub fn unfollowed(&self) -> Vec<String> {
        self.lock().unfollowed.clone()
    }

    pub fn card_count(&self) -> usize {
        self.lock().cards.len()
    }

    pub fn scroll_position(&self) -> u32 {
        self.lock().viewport.scroll_y
    }

    pub fn scroll_calls(&self) -> usize {
        self.scroll_calls.load(Ordering::SeqCst)
    }

    pub fn activate_calls(&self) -> usize {
        self.activate_calls.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MockState {
    fn card(&self, id: usize) -> Option<&MockCard> {
        self.cards.iter().find(|(i, _)| *i == id).map(|(_, c)| c)
    }
}

impl HostPage for MockPage {
    type Row = usize;
    type Control = MockControl;

    async fn scroll_to(&self, y: u32) -> Result<(), PageError> {
        self.scroll_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.lock();
        let len = state.cards.len();
        state.viewport.scroll_to(y, len);
        Ok(())
    }

    async fn scroll_by(&self, dy: u32) -> Result<(), PageError> {
        self.scroll_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.lock();
        let len = state.cards.len();
        state.viewport.scroll_by(dy, len);
        Ok(())
    }

    async fn visible_rows(&self) -> Result<Vec<usize>, PageError> {
        let state = self.lock();
        let range = state.viewport.visible_range(state.cards.len());
        Ok(state.cards[range].iter().map(|(id, _)| *id).collect())
    }

    async fn extract(&self, row: &usize) -> Result<Option<Account>, PageError> {
        let state = self.lock();
        let card = state.card(*row).ok_or(PageError::StaleElement)?;
        if let Some(account) = &card.account
            && self.failing.contains(&account.handle_key())
        {
            return Err(PageError::Transport("connection reset".into()));
        }
        Ok(card.account.clone())
    }

    async fn locate_trigger(&self, row: &usize) -> Result<Option<MockControl>, PageError> {
        let state = self.lock();
        let card = state.card(*row).ok_or(PageError::StaleElement)?;
        Ok(card.trigger.then_some(MockControl::Trigger(*row)))
    }

    async fn activate(&self, control: &MockControl) -> Result<(), PageError> {
        self.activate_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.lock();
        match *control {
            MockControl::Trigger(id) => {
                state.card(id).ok_or(PageError::StaleElement)?;
                if self.confirmation {
                    state.pending_confirmation = Some(id);
                }
            }
            MockControl::Confirm(id) => {
                state.pending_confirmation = None;
                let handle = state
                    .card(id)
                    .and_then(|c| c.account.as_ref())
                    .map(|a| a.handle.clone())
                    .ok_or(PageError::StaleElement)?;
                state.unfollowed.push(handle);
                if self.remove_on_unfollow {
                    state.cards.retain(|(i, _)| *i != id);
                    let len = state.cards.len();
                    state.viewport.clamp(len);
                }
            }
        }
        Ok(())
    }

    async fn locate_confirmation(&self) -> Result<Option<MockControl>, PageError> {
        Ok(self.lock().pending_confirmation.map(MockControl::Confirm))
    }
}
