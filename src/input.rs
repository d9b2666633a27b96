use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Result of routing a key event into the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResult {
    /// Nothing in the grid reacted to the key
    Ignored,
    /// Exactly one handler acted on the key
    Consumed,
}

impl KeyResult {
    pub fn is_consumed(&self) -> bool {
        matches!(self, KeyResult::Consumed)
    }
}

/// Check for escape key (Esc or Ctrl+[)
pub fn is_escape(key: KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('[') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Keys the host application keeps for itself
pub fn is_quit(key: KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
}

/// Terminals with keyboard enhancement report releases too; only presses count
pub fn is_press(key: KeyEvent) -> bool {
    key.kind != KeyEventKind::Release
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_variants() {
        assert!(is_escape(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(is_escape(KeyEvent::new(KeyCode::Char('['), KeyModifiers::CONTROL)));
        assert!(!is_escape(KeyEvent::new(KeyCode::Char('['), KeyModifiers::NONE)));
    }

    #[test]
    fn test_quit_keys() {
        assert!(is_quit(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL)));
        assert!(is_quit(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!is_quit(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)));
    }
}
