use followclean_core::CoreEvent;

/// Everything that can change the UI state: key presses mapped by
/// [`crate::input`], timer ticks and backend events.
#[derive(Debug, Clone)]
pub enum Action {
    None,
    Quit,
    Tick,
    Resize(u16, u16),

    StartScan,
    SwipeLeft,
    SwipeRight,
    Undo,
    ToggleOrder,
    /// Open the results view, or go back to the cards from it.
    ToggleResults,
    MoveUp,
    MoveDown,
    /// Move the highlighted account to the other bucket.
    MoveSelected,
    Execute,
    CancelRun,
    Confirm,
    NavigateBack,
    ToggleHelp,

    Backend(CoreEvent),
}
