use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::util::{char_count, insert_char_at, remove_char_at};

#[derive(PartialEq, Clone, Copy)]
enum CharType {
    Whitespace,
    Numeric,
    Punctuation,
    Alphabetic,
}

impl CharType {
    fn of(c: char) -> CharType {
        if c.is_whitespace() {
            CharType::Whitespace
        } else if c.is_numeric() {
            CharType::Numeric
        } else if c.is_alphabetic() {
            CharType::Alphabetic
        } else {
            CharType::Punctuation
        }
    }
}

/// Start of the word before `idx` (skips whitespace first)
pub fn word_start(s: &str, idx: usize) -> usize {
    let chars: Vec<char> = s.chars().take(idx).collect();
    let mut i = chars.len();
    while i > 0 && CharType::of(chars[i - 1]) == CharType::Whitespace {
        i -= 1;
    }
    if i == 0 {
        return 0;
    }
    let kind = CharType::of(chars[i - 1]);
    while i > 0 && CharType::of(chars[i - 1]) == kind {
        i -= 1;
    }
    i
}

/// End of the word after `idx` (skips whitespace first)
pub fn word_end(s: &str, idx: usize) -> usize {
    let chars: Vec<char> = s.chars().collect();
    let mut i = idx.min(chars.len());
    while i < chars.len() && CharType::of(chars[i]) == CharType::Whitespace {
        i += 1;
    }
    if i == chars.len() {
        return i;
    }
    let kind = CharType::of(chars[i]);
    while i < chars.len() && CharType::of(chars[i]) == kind {
        i += 1;
    }
    i
}

/// Single-line text buffer
/// Note: cursor is a CHARACTER index, not a byte index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDraft {
    pub buffer: String,
    pub cursor: usize,
}

impl TextDraft {
    pub fn new(initial: String) -> Self {
        let cursor = char_count(&initial);
        Self { buffer: initial, cursor }
    }

    /// Apply an editing key. Returns false for keys a text buffer ignores.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char(c) if !ctrl => {
                insert_char_at(&mut self.buffer, self.cursor, c);
                self.cursor += 1;
            }
            KeyCode::Char('u') if ctrl => {
                self.buffer.clear();
                self.cursor = 0;
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    remove_char_at(&mut self.buffer, self.cursor);
                }
            }
            KeyCode::Delete => {
                remove_char_at(&mut self.buffer, self.cursor);
            }
            KeyCode::Left if ctrl => {
                self.cursor = word_start(&self.buffer, self.cursor);
            }
            KeyCode::Right if ctrl => {
                self.cursor = word_end(&self.buffer, self.cursor);
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(char_count(&self.buffer));
            }
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = char_count(&self.buffer),
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::CONTROL)
    }

    #[test]
    fn test_word_motion() {
        let s = "hello big world";
        assert_eq!(word_start(s, 15), 10);
        assert_eq!(word_start(s, 10), 6);
        assert_eq!(word_start(s, 3), 0);
        assert_eq!(word_end(s, 0), 5);
        assert_eq!(word_end(s, 5), 9);
        assert_eq!(word_end(s, 15), 15);
    }

    #[test]
    fn test_insert_and_delete() {
        let mut d = TextDraft::new("ac".to_string());
        assert_eq!(d.cursor, 2);
        d.handle_key(key(KeyCode::Left));
        d.handle_key(key(KeyCode::Char('b')));
        assert_eq!(d.buffer, "abc");
        assert_eq!(d.cursor, 2);
        d.handle_key(key(KeyCode::Backspace));
        assert_eq!(d.buffer, "ac");
        d.handle_key(key(KeyCode::Home));
        d.handle_key(key(KeyCode::Delete));
        assert_eq!(d.buffer, "c");
        assert_eq!(d.cursor, 0);
    }

    #[test]
    fn test_cursor_stays_in_range() {
        let mut d = TextDraft::new("é".to_string());
        d.handle_key(key(KeyCode::Right));
        assert_eq!(d.cursor, 1);
        d.handle_key(key(KeyCode::Left));
        d.handle_key(key(KeyCode::Left));
        assert_eq!(d.cursor, 0);
        d.handle_key(key(KeyCode::Backspace));
        assert_eq!(d.buffer, "é");
    }

    #[test]
    fn test_ctrl_keys() {
        let mut d = TextDraft::new("one two".to_string());
        d.handle_key(ctrl(KeyCode::Left));
        assert_eq!(d.cursor, 4);
        d.handle_key(ctrl(KeyCode::Char('u')));
        assert_eq!(d.buffer, "");
        assert!(!d.handle_key(key(KeyCode::F(2))));
    }
}
