use ratatui::crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::action::Action;

/// Map a crossterm terminal event to an action. Keys are screen-agnostic;
/// the app decides what an action means in the current phase.
pub fn map_event(event: &Event) -> Action {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            // Ctrl+C always quits
            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                return Action::Quit;
            }
            map_key(key)
        }
        Event::Resize(w, h) => Action::Resize(*w, *h),
        _ => Action::None,
    }
}

fn map_key(key: &KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Left | KeyCode::Char('a') => Action::SwipeLeft,
        KeyCode::Right | KeyCode::Char('d') => Action::SwipeRight,
        KeyCode::Char('z') | KeyCode::Backspace => Action::Undo,
        KeyCode::Char('o') => Action::ToggleOrder,
        KeyCode::Tab | KeyCode::Char('r') => Action::ToggleResults,
        KeyCode::Char('j') | KeyCode::Down => Action::MoveDown,
        KeyCode::Char('k') | KeyCode::Up => Action::MoveUp,
        KeyCode::Char(' ') => Action::MoveSelected,
        KeyCode::Enter | KeyCode::Char('y') => Action::Confirm,
        KeyCode::Char('s') => Action::StartScan,
        KeyCode::Char('x') => Action::Execute,
        KeyCode::Char('c') => Action::CancelRun,
        KeyCode::Esc => Action::NavigateBack,
        KeyCode::Char('?') => Action::ToggleHelp,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyEventState;

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn arrows_and_letters_swipe() {
        assert!(matches!(map_event(&press(KeyCode::Left)), Action::SwipeLeft));
        assert!(matches!(map_event(&press(KeyCode::Char('a'))), Action::SwipeLeft));
        assert!(matches!(map_event(&press(KeyCode::Right)), Action::SwipeRight));
        assert!(matches!(map_event(&press(KeyCode::Char('d'))), Action::SwipeRight));
        assert!(matches!(map_event(&press(KeyCode::Backspace)), Action::Undo));
    }

    #[test]
    fn ctrl_c_quits() {
        let event = Event::Key(KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        });
        assert!(matches!(map_event(&event), Action::Quit));
        assert!(matches!(map_event(&press(KeyCode::Char('c'))), Action::CancelRun));
    }

    #[test]
    fn releases_are_ignored() {
        let event = Event::Key(KeyEvent {
            code: KeyCode::Left,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        });
        assert!(matches!(map_event(&event), Action::None));
    }
}
