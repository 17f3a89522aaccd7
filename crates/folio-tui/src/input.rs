use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Input action that can be performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    NextSection,
    PrevSection,
    FirstSection,
    LastSection,
    /// Zero-based section index
    GoTo(usize),
    ToggleNav,
    TogglePause,
    None,
}

/// Handle a key event and return the corresponding action
pub fn handle_key_event(key: KeyEvent) -> Action {
    match (key.code, key.modifiers) {
        // Quit
        (KeyCode::Char('q'), KeyModifiers::NONE) => Action::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,
        (KeyCode::Esc, _) => Action::Quit,

        // Step like a scroll notch
        (KeyCode::Char('j'), KeyModifiers::NONE)
        | (KeyCode::Down, _)
        | (KeyCode::PageDown, _)
        | (KeyCode::Char(' '), KeyModifiers::NONE) => Action::NextSection,
        (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, _) | (KeyCode::PageUp, _) => {
            Action::PrevSection
        }

        // Jump
        (KeyCode::Char('g'), KeyModifiers::NONE) | (KeyCode::Home, _) => Action::FirstSection,
        (KeyCode::Char('G'), _) | (KeyCode::End, _) => Action::LastSection,
        (KeyCode::Char(c @ '1'..='9'), KeyModifiers::NONE) => {
            Action::GoTo(c as usize - '1' as usize)
        }
        (KeyCode::Char('0'), KeyModifiers::NONE) => Action::GoTo(9),

        (KeyCode::Tab, _) => Action::ToggleNav,
        (KeyCode::Char('p'), KeyModifiers::NONE) => Action::TogglePause,

        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_quit_keys() {
        assert_eq!(handle_key_event(key(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(
            handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
        // Plain 'c' is not bound
        assert_eq!(handle_key_event(key(KeyCode::Char('c'))), Action::None);
    }

    #[test]
    fn test_step_keys() {
        for code in [KeyCode::Char('j'), KeyCode::Down, KeyCode::PageDown, KeyCode::Char(' ')] {
            assert_eq!(handle_key_event(key(code)), Action::NextSection);
        }
        for code in [KeyCode::Char('k'), KeyCode::Up, KeyCode::PageUp] {
            assert_eq!(handle_key_event(key(code)), Action::PrevSection);
        }
    }

    #[test]
    fn test_jump_keys() {
        assert_eq!(handle_key_event(key(KeyCode::Char('g'))), Action::FirstSection);
        assert_eq!(
            handle_key_event(KeyEvent::new(KeyCode::Char('G'), KeyModifiers::SHIFT)),
            Action::LastSection
        );
        assert_eq!(handle_key_event(key(KeyCode::End)), Action::LastSection);
        assert_eq!(handle_key_event(key(KeyCode::Char('1'))), Action::GoTo(0));
        assert_eq!(handle_key_event(key(KeyCode::Char('9'))), Action::GoTo(8));
        assert_eq!(handle_key_event(key(KeyCode::Char('0'))), Action::GoTo(9));
        assert_eq!(handle_key_event(key(KeyCode::Char('p'))), Action::TogglePause);
    }
}
