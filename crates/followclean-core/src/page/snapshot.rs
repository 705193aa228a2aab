//! A [`HostPage`] over a saved copy of the following page.
//!
//! Cards are laid out at a fixed row height and only the ones intersecting
//! the rendered window are returned by `visible_rows`, which mimics the
//! virtualized list closely enough to exercise the scroll loops offline.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::debug;

use super::{HostPage, PageError, Viewport};
use crate::extract::{CARD_SELECTOR, Extractor, TRIGGER_SELECTOR, XCardExtractor};
use crate::{Account, CoreError};

static CARD_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse(CARD_SELECTOR).unwrap());
static TRIGGER_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse(TRIGGER_SELECTOR).unwrap());

/// Geometry of the simulated list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotLayout {
    pub row_height: u32,
    /// Height of the window of rows kept rendered. x.com renders well past
    /// the visible area, so this is larger than a screen.
    pub rendered_height: u32,
}

impl Default for SnapshotLayout {
    fn default() -> Self {
        Self {
            row_height: 80,
            rendered_height: 2400,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotRow {
    id: usize,
}

impl SnapshotRow {
    pub fn id(&self) -> usize {
        self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotControl {
    Trigger(usize),
    Confirm(usize),
}

struct Card {
    id: usize,
    html: String,
    has_trigger: bool,
}

struct SnapshotState {
    cards: Vec<Card>,
    viewport: Viewport,
    pending_confirmation: Option<usize>,
    unfollowed: Vec<String>,
}

pub struct SnapshotPage {
    state: Mutex<SnapshotState>,
    extractor: Arc<dyn Extractor>,
}

impl SnapshotPage {
    /// Build a page from a full HTML document (or fragment) containing
    /// `UserCell` cards.
    pub fn from_html(html: &str) -> Self {
        let document = Html::parse_document(html);
        let cards: Vec<Card> = document
            .select(&CARD_SEL)
            .enumerate()
            .map(|(id, el)| Card {
                id,
                html: el.html(),
                has_trigger: el.select(&TRIGGER_SEL).next().is_some(),
            })
            .collect();
        debug!(cards = cards.len(), "loaded snapshot");

        let layout = SnapshotLayout::default();
        Self {
            state: Mutex::new(SnapshotState {
                cards,
                viewport: Viewport::new(layout.row_height, layout.rendered_height),
                pending_confirmation: None,
                unfollowed: Vec::new(),
            }),
            extractor: Arc::new(XCardExtractor),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, CoreError> {
        let html = std::fs::read_to_string(path)?;
        Ok(Self::from_html(&html))
    }

    pub fn with_layout(self, layout: SnapshotLayout) -> Self {
        self.lock().viewport = Viewport::new(layout.row_height, layout.rendered_height);
        self
    }

    /// Cards still on the page.
    pub fn card_count(&self) -> usize {
        self.lock().cards.len()
    }

    /// Handles confirmed so far, in order.
    pub fn unfollowed_handles(&self) -> Vec<String> {
        self.lock().unfollowed.clone()
    }

    pub fn scroll_position(&self) -> u32 {
        self.lock().viewport.scroll_y
    }

    fn lock(&self) -> MutexGuard<'_, SnapshotState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn card_html(&self, id: usize) -> Result<String, PageError> {
        self.lock()
            .cards
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.html.clone())
            .ok_or(PageError::StaleElement)
    }
}

impl HostPage for SnapshotPage {
    type Row = SnapshotRow;
    type Control = SnapshotControl;

    async fn scroll_to(&self, y: u32) -> Result<(), PageError> {
        let mut state = self.lock();
        let len = state.cards.len();
        state.viewport.scroll_to(y, len);
        Ok(())
    }

    async fn scroll_by(&self, dy: u32) -> Result<(), PageError> {
        let mut state = self.lock();
        let len = state.cards.len();
        state.viewport.scroll_by(dy, len);
        Ok(())
    }

    async fn visible_rows(&self) -> Result<Vec<SnapshotRow>, PageError> {
        let state = self.lock();
        let range = state.viewport.visible_range(state.cards.len());
        Ok(state.cards[range]
            .iter()
            .map(|c| SnapshotRow { id: c.id })
            .collect())
    }

    async fn extract(&self, row: &SnapshotRow) -> Result<Option<Account>, PageError> {
        let html = self.card_html(row.id)?;
        Ok(self.extractor.extract(&html))
    }

    async fn locate_trigger(&self, row: &SnapshotRow) -> Result<Option<SnapshotControl>, PageError> {
        let state = self.lock();
        let card = state
            .cards
            .iter()
            .find(|c| c.id == row.id)
            .ok_or(PageError::StaleElement)?;
        Ok(card.has_trigger.then_some(SnapshotControl::Trigger(row.id)))
    }

    async fn activate(&self, control: &SnapshotControl) -> Result<(), PageError> {
        match *control {
            SnapshotControl::Trigger(id) => {
                let mut state = self.lock();
                if !state.cards.iter().any(|c| c.id == id) {
                    return Err(PageError::StaleElement);
                }
                state.pending_confirmation = Some(id);
            }
            SnapshotControl::Confirm(id) => {
                let html = self.card_html(id)?;
                let handle = self
                    .extractor
                    .extract(&html)
                    .map(|a| a.handle)
                    .unwrap_or_default();
                let mut state = self.lock();
                state.pending_confirmation = None;
                state.cards.retain(|c| c.id != id);
                let len = state.cards.len();
                state.viewport.clamp(len);
                debug!(handle = %handle, remaining = len, "card removed");
                state.unfollowed.push(handle);
            }
        }
        Ok(())
    }

    async fn locate_confirmation(&self) -> Result<Option<SnapshotControl>, PageError> {
        Ok(self.lock().pending_confirmation.map(SnapshotControl::Confirm))
    }
}
