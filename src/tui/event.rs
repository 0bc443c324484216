use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::core::line::{DELETE, INTERRUPT};

/// Source of raw keystrokes, one character at a time.
pub trait KeySource: Send {
    /// Returns the next pending character, or `None` right away if there is none.
    fn poll_char(&mut self) -> io::Result<Option<char>>;
}

/// Reads keystrokes from the controlling terminal via crossterm.
#[derive(Debug, Default)]
pub struct CrosstermKeys;

impl KeySource for CrosstermKeys {
    fn poll_char(&mut self) -> io::Result<Option<char>> {
        // Skip over events that carry no character (resize, focus, releases).
        while event::poll(Duration::ZERO)? {
            if let Some(c) = event_to_char(&event::read()?) {
                log::debug!("Key: {:?}", c);
                return Ok(Some(c));
            }
        }
        Ok(None)
    }
}

/// Translates a crossterm event back into the byte a cooked-off terminal
/// would have delivered.
pub fn event_to_char(event: &Event) -> Option<char> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => key_to_char(key),
        _ => None,
    }
}

fn key_to_char(key: &KeyEvent) -> Option<char> {
    match (key.modifiers, key.code) {
        (m, KeyCode::Char(c)) if m.contains(KeyModifiers::CONTROL) => control_code(c),
        (_, KeyCode::Char(c)) => Some(c),
        (_, KeyCode::Enter) => Some('\r'),
        (_, KeyCode::Backspace | KeyCode::Delete) => Some(DELETE),
        (_, KeyCode::Tab) => Some('\t'),
        (_, KeyCode::Esc) => Some('\u{1b}'),
        _ => None,
    }
}

/// Ctrl+letter → ASCII control code (Ctrl+C → 0x03).
fn control_code(c: char) -> Option<char> {
    let lower = c.to_ascii_lowercase();
    if lower.is_ascii_lowercase() {
        Some(char::from(lower as u8 - b'a' + 1))
    } else {
        None
    }
}

/// True if `c` is the interrupt character.
pub fn is_interrupt(c: char) -> bool {
    c == INTERRUPT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn test_plain_characters() {
        assert_eq!(event_to_char(&key(KeyCode::Char('y'), KeyModifiers::NONE)), Some('y'));
        assert_eq!(event_to_char(&key(KeyCode::Char('Y'), KeyModifiers::SHIFT)), Some('Y'));
    }

    #[test]
    fn test_ctrl_c_is_interrupt() {
        let c = event_to_char(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)).unwrap();
        assert!(is_interrupt(c));
    }

    #[test]
    fn test_enter_and_backspace() {
        assert_eq!(event_to_char(&key(KeyCode::Enter, KeyModifiers::NONE)), Some('\r'));
        assert_eq!(event_to_char(&key(KeyCode::Backspace, KeyModifiers::NONE)), Some(DELETE));
    }

    #[test]
    fn test_releases_and_non_key_events_are_skipped() {
        let release = Event::Key(KeyEvent {
            code: KeyCode::Char('x'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        });
        assert_eq!(event_to_char(&release), None);
        assert_eq!(event_to_char(&Event::Resize(80, 24)), None);
        assert_eq!(event_to_char(&key(KeyCode::F(1), KeyModifiers::NONE)), None);
    }

    #[test]
    fn test_control_code_mapping() {
        assert_eq!(control_code('a'), Some('\u{1}'));
        assert_eq!(control_code('C'), Some('\u{3}'));
        assert_eq!(control_code('1'), None);
    }
}
