//! The host page surface: the single scrollable list of account rows that
//! both the scanner and the executor read and scroll.

#[cfg(test)]
pub(crate) mod mock;
pub mod snapshot;

use std::future::Future;
use std::ops::Range;

use thiserror::Error;

use crate::Account;

/// Failure talking to the page. These never abort a scan or a run; callers
/// fold them into skipped cards or per-account failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    #[error("page transport error: {0}")]
    Transport(String),
    /// The row or control no longer exists (the list re-rendered under us).
    #[error("stale element reference")]
    StaleElement,
    #[error("script error: {0}")]
    Script(String),
    #[error("{0}")]
    Other(String),
}

/// Automation actions the core needs from the page.
///
/// Rows and controls are opaque handles owned by the implementation. All
/// methods take `&self`; implementations keep whatever interior state they
/// need behind their own locks.
pub trait HostPage: Send + Sync {
    type Row: Send + Sync;
    type Control: Send + Sync;

    /// Scroll the list so that `y` pixels are above the viewport.
    fn scroll_to(&self, y: u32) -> impl Future<Output = Result<(), PageError>> + Send;

    /// Advance the viewport by `dy` pixels.
    fn scroll_by(&self, dy: u32) -> impl Future<Output = Result<(), PageError>> + Send;

    /// Rows currently rendered in the viewport, top to bottom.
    fn visible_rows(&self) -> impl Future<Output = Result<Vec<Self::Row>, PageError>> + Send;

    /// Run the extraction rule over a row. `Ok(None)` is an extraction miss.
    fn extract(
        &self,
        row: &Self::Row,
    ) -> impl Future<Output = Result<Option<Account>, PageError>> + Send;

    /// The row's unfollow trigger, if it has one.
    fn locate_trigger(
        &self,
        row: &Self::Row,
    ) -> impl Future<Output = Result<Option<Self::Control>, PageError>> + Send;

    /// Click a control.
    fn activate(&self, control: &Self::Control)
    -> impl Future<Output = Result<(), PageError>> + Send;

    /// The confirmation control of an open unfollow dialog, if one is showing.
    fn locate_confirmation(
        &self,
    ) -> impl Future<Output = Result<Option<Self::Control>, PageError>> + Send;
}

/// Fixed-row-height viewport over a list of `len` rows, shared by the
/// in-memory page implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub row_height: u32,
    pub height: u32,
    pub scroll_y: u32,
}

impl Viewport {
    pub fn new(row_height: u32, height: u32) -> Self {
        Self {
            row_height: row_height.max(1),
            height: height.max(1),
            scroll_y: 0,
        }
    }

    fn max_scroll(&self, len: usize) -> u32 {
        let content = (len as u64 * self.row_height as u64).min(u32::MAX as u64) as u32;
        content.saturating_sub(self.height)
    }

    pub fn scroll_to(&mut self, y: u32, len: usize) {
        self.scroll_y = y.min(self.max_scroll(len));
    }

    pub fn scroll_by(&mut self, dy: u32, len: usize) {
        self.scroll_to(self.scroll_y.saturating_add(dy), len);
    }

    /// Re-clamp after the list shrank.
    pub fn clamp(&mut self, len: usize) {
        self.scroll_to(self.scroll_y, len);
    }

    /// Indices of the rows intersecting the viewport.
    pub fn visible_range(&self, len: usize) -> Range<usize> {
        let first = (self.scroll_y / self.row_height) as usize;
        let last = self.scroll_y.saturating_add(self.height).div_ceil(self.row_height) as usize;
        first.min(len)..last.min(len)
    }

    pub fn at_end(&self, len: usize) -> bool {
        self.scroll_y >= self.max_scroll(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visible_range_covers_partial_rows() {
        let mut vp = Viewport::new(100, 250);
        assert_eq!(vp.visible_range(10), 0..3);
        vp.scroll_by(150, 10);
        assert_eq!(vp.visible_range(10), 1..4);
    }

    #[test]
    fn scroll_clamps_to_content() {
        let mut vp = Viewport::new(100, 300);
        vp.scroll_by(10_000, 5);
        assert_eq!(vp.scroll_y, 200);
        assert!(vp.at_end(5));
        assert_eq!(vp.visible_range(5), 2..5);
    }

    #[test]
    fn short_list_never_scrolls() {
        let mut vp = Viewport::new(100, 1000);
        vp.scroll_by(400, 3);
        assert_eq!(vp.scroll_y, 0);
        assert_eq!(vp.visible_range(3), 0..3);
    }

    #[test]
    fn clamp_after_shrink() {
        let mut vp = Viewport::new(100, 200);
        vp.scroll_to(800, 10);
        assert_eq!(vp.scroll_y, 800);
        vp.clamp(4);
        assert_eq!(vp.scroll_y, 200);
    }
}
