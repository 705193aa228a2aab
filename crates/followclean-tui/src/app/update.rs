use followclean_core::{Bucket, Command, CoreEvent, Phase, SwipeDirection};
use tracing::{debug, info};

use super::{ANIMATION_TICKS, Animation, App, Overlay};
use crate::action::Action;

impl App {
    /// Process an action and update state. Returns true if the app should quit.
    pub fn update(&mut self, action: Action) -> bool {
        match action {
            Action::Tick => {
                self.tick = self.tick.wrapping_add(1);
                self.advance_animation();
                return false;
            }
            Action::Backend(event) => {
                self.on_backend_event(event);
                return false;
            }
            Action::None | Action::Resize(..) => return false,
            _ => {}
        }

        match self.overlay {
            Overlay::QuitConfirm => {
                match action {
                    Action::Quit | Action::Confirm => {
                        // Stop a live run before the runtime goes away.
                        self.command(Command::CancelExecution);
                        self.should_quit = true;
                    }
                    Action::NavigateBack => self.overlay = Overlay::None,
                    _ => {}
                }
                return self.should_quit;
            }
            Overlay::ExecuteConfirm => {
                match action {
                    Action::Confirm => {
                        self.overlay = Overlay::None;
                        self.command(Command::StartExecution);
                    }
                    Action::NavigateBack | Action::Quit => self.overlay = Overlay::None,
                    _ => {}
                }
                return false;
            }
            Overlay::Help => {
                match action {
                    Action::ToggleHelp | Action::NavigateBack => self.overlay = Overlay::None,
                    Action::Quit => self.request_quit(),
                    _ => {}
                }
                return self.should_quit;
            }
            Overlay::None => {}
        }

        let phase = self.phase();
        match (phase, action) {
            (_, Action::Quit) => self.request_quit(),
            (_, Action::ToggleHelp) => self.overlay = Overlay::Help,

            (Phase::Idle, Action::StartScan | Action::Confirm) => self.command(Command::StartScan),

            (Phase::Swiping, Action::SwipeLeft) => self.swipe(SwipeDirection::Left),
            (Phase::Swiping, Action::SwipeRight) => self.swipe(SwipeDirection::Right),
            (Phase::Swiping, Action::Undo) => self.command(Command::Undo),
            (Phase::Swiping, Action::ToggleOrder) => self.command(Command::ToggleOrder),
            (Phase::Swiping, Action::ToggleResults) => {
                self.command(Command::OpenResults);
                self.results_cursor = 0;
            }

            (Phase::Results, Action::ToggleResults | Action::NavigateBack) => {
                self.command(Command::BackToReview)
            }
            (Phase::Results, Action::SwipeLeft) => self.select_tab(Bucket::Unfollow),
            (Phase::Results, Action::SwipeRight) => self.select_tab(Bucket::Keep),
            (Phase::Results, Action::MoveUp) => {
                self.results_cursor = self.results_cursor.saturating_sub(1);
            }
            (Phase::Results, Action::MoveDown) => {
                let last = self.results_list().len().saturating_sub(1);
                self.results_cursor = (self.results_cursor + 1).min(last);
            }
            (Phase::Results, Action::MoveSelected | Action::Confirm) => self.move_selected(),

            (Phase::Swiping | Phase::Results, Action::Execute) => {
                if self.unfollow_count() > 0 {
                    self.overlay = Overlay::ExecuteConfirm;
                }
            }

            (Phase::Unfollowing, Action::CancelRun) => self.command(Command::CancelExecution),
            (Phase::Unfollowing, Action::Confirm | Action::NavigateBack) => {
                self.command(Command::Dismiss);
                if self.phase() == Phase::Idle {
                    self.review = None;
                }
            }

            (_, other) => debug!(?other, ?phase, "action ignored"),
        }
        self.should_quit
    }

    /// Quitting from the idle screen is immediate; anywhere else it asks.
    fn request_quit(&mut self) {
        if self.phase() == Phase::Idle {
            self.should_quit = true;
        } else {
            self.overlay = Overlay::QuitConfirm;
        }
    }

    fn swipe(&mut self, direction: SwipeDirection) {
        let Some(account) = self.review.as_ref().and_then(|r| r.current.clone()) else {
            return;
        };
        if self.try_command(Command::Swipe(direction))
            && self.review.as_ref().is_some_and(|r| r.animating)
        {
            self.animation = Some(Animation {
                account,
                direction,
                ticks_left: ANIMATION_TICKS,
            });
        }
    }

    fn advance_animation(&mut self) {
        let Some(animation) = self.animation.as_mut() else {
            return;
        };
        animation.ticks_left = animation.ticks_left.saturating_sub(1);
        if animation.ticks_left == 0 {
            self.animation = None;
            self.command(Command::FinishAnimation);
            self.sync_review();
        }
    }

    fn select_tab(&mut self, tab: Bucket) {
        if self.results_tab != tab {
            self.results_tab = tab;
            self.results_cursor = 0;
        }
    }

    fn move_selected(&mut self) {
        let Some(account) = self.results_list().get(self.results_cursor).cloned() else {
            return;
        };
        self.command(Command::MoveDecision {
            handle: account.handle,
            to: self.results_tab.other(),
        });
        let last = self.results_list().len().saturating_sub(1);
        self.results_cursor = self.results_cursor.min(last);
    }

    fn on_backend_event(&mut self, event: CoreEvent) {
        self.workflow.on_event(&event);
        match event {
            CoreEvent::ScanComplete { accounts } => {
                info!(count = accounts.len(), "scan complete");
                self.sync_review();
                self.animation = None;
                self.results_cursor = 0;
            }
            CoreEvent::UnfollowSummary(summary) => {
                info!(summary = %summary.status_line(), "run finished");
            }
            _ => {}
        }
    }
}
