mod update;

use followclean_core::{
    Account, Bucket, Command, Effect, Phase, ReviewConfig, ReviewSnapshot, SwipeDirection,
    Workflow,
};
use ratatui::Frame;

use crate::theme::Theme;
use crate::view;

/// Ticks a swiped card spends sliding off screen.
pub const ANIMATION_TICKS: u8 = 3;

/// Modal drawn on top of the current screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    Help,
    QuitConfirm,
    ExecuteConfirm,
}

/// The card that was just swiped, sliding out in `direction`.
#[derive(Debug, Clone)]
pub struct Animation {
    pub account: Account,
    pub direction: SwipeDirection,
    pub ticks_left: u8,
}

impl Animation {
    /// How far the card has travelled, in `0.0..1.0`.
    pub fn progress(&self) -> f64 {
        1.0 - self.ticks_left as f64 / ANIMATION_TICKS as f64
    }
}

pub struct App {
    pub workflow: Workflow,
    pub theme: Theme,
    /// Latest review state pushed by the workflow.
    pub review: Option<ReviewSnapshot>,
    pub overlay: Overlay,
    pub results_tab: Bucket,
    pub results_cursor: usize,
    pub animation: Option<Animation>,
    pub tick: usize,
    pub should_quit: bool,
    /// Where accounts come from, shown in the header.
    pub source_label: String,
    outbox: Vec<Effect>,
}

impl App {
    pub fn new(config: ReviewConfig, theme: Theme, source_label: impl Into<String>) -> Self {
        Self {
            workflow: Workflow::new(config),
            theme,
            review: None,
            overlay: Overlay::None,
            results_tab: Bucket::Unfollow,
            results_cursor: 0,
            animation: None,
            tick: 0,
            should_quit: false,
            source_label: source_label.into(),
            outbox: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.workflow.phase()
    }

    /// Backend work queued by the last updates, oldest first.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.outbox)
    }

    /// Accounts listed under the active results tab.
    pub fn results_list(&self) -> &[Account] {
        match (&self.review, self.results_tab) {
            (Some(review), Bucket::Keep) => &review.kept,
            (Some(review), Bucket::Unfollow) => &review.unfollowed,
            (None, _) => &[],
        }
    }

    pub fn unfollow_count(&self) -> usize {
        self.review.as_ref().map_or(0, |r| r.unfollowed.len())
    }

    fn command(&mut self, command: Command) {
        self.try_command(command);
    }

    /// Like [`App::command`], reporting whether the workflow accepted it.
    fn try_command(&mut self, command: Command) -> bool {
        match self.workflow.handle(command) {
            Some(effect) => {
                self.dispatch(effect);
                true
            }
            None => false,
        }
    }

    fn dispatch(&mut self, effect: Effect) {
        match effect {
            Effect::Review(snapshot) => self.review = Some(*snapshot),
            other => self.outbox.push(other),
        }
    }

    /// Re-read the review state after changes that produce no effect.
    fn sync_review(&mut self) {
        self.review = self.workflow.session().map(|s| s.snapshot());
    }

    pub fn view(&self, f: &mut Frame) {
        view::render(f, self);
    }
}

#[cfg(test)]
mod tests;
