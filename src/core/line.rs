//! # Line Editor
//!
//! Character-level state machine behind the raw input capture. Characters
//! arrive one at a time from an uncooked terminal; this assembles them into
//! a line.
//!
//! | Input                    | Effect                                   |
//! |--------------------------|------------------------------------------|
//! | `\r` or `\n`             | completes the buffer as a line           |
//! | `0x08` or `0x7f`         | removes the last character, if any       |
//! | `0x03` (Ctrl+C)          | interrupt, whatever the buffer holds     |
//! | any other code >= 32     | appended                                 |
//! | any other control code   | ignored                                  |

pub const INTERRUPT: char = '\u{3}';
pub const BACKSPACE: char = '\u{8}';
pub const DELETE: char = '\u{7f}';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keystroke {
    /// The buffer changed (or not); no line yet.
    Pending,
    Line(String),
    Interrupt,
}

#[derive(Debug, Default, Clone)]
pub struct LineEditor {
    buffer: String,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn feed(&mut self, c: char) -> Keystroke {
        match c {
            '\r' | '\n' => Keystroke::Line(std::mem::take(&mut self.buffer)),
            BACKSPACE | DELETE => {
                self.buffer.pop();
                Keystroke::Pending
            }
            INTERRUPT => Keystroke::Interrupt,
            c if u32::from(c) >= 32 => {
                self.buffer.push(c);
                Keystroke::Pending
            }
            _ => Keystroke::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(editor: &mut LineEditor, input: &[char]) -> Vec<Keystroke> {
        input.iter().map(|&c| editor.feed(c)).collect()
    }

    #[test]
    fn test_hello_enter_completes_line() {
        let mut editor = LineEditor::new();
        let results = feed_all(&mut editor, &['h', 'e', 'l', 'l', 'o', '\r']);
        assert_eq!(results.last(), Some(&Keystroke::Line("hello".into())));
        assert_eq!(editor.buffer(), "");
    }

    #[test]
    fn test_backspace_removes_last_char() {
        let mut editor = LineEditor::new();
        let results = feed_all(&mut editor, &['h', 'i', BACKSPACE, '\r']);
        assert_eq!(results.last(), Some(&Keystroke::Line("h".into())));
    }

    #[test]
    fn test_delete_acts_like_backspace() {
        let mut editor = LineEditor::new();
        feed_all(&mut editor, &['n', 'o', DELETE]);
        assert_eq!(editor.buffer(), "n");
    }

    #[test]
    fn test_backspace_on_empty_buffer_is_harmless() {
        let mut editor = LineEditor::new();
        assert_eq!(editor.feed(BACKSPACE), Keystroke::Pending);
        assert_eq!(editor.feed('\n'), Keystroke::Line(String::new()));
    }

    #[test]
    fn test_interrupt_regardless_of_buffer() {
        let mut editor = LineEditor::new();
        assert_eq!(editor.feed(INTERRUPT), Keystroke::Interrupt);

        feed_all(&mut editor, &['y', 'e', 's']);
        assert_eq!(editor.feed(INTERRUPT), Keystroke::Interrupt);
    }

    #[test]
    fn test_unlisted_control_codes_are_ignored() {
        let mut editor = LineEditor::new();
        feed_all(&mut editor, &['\u{1}', 'Y', '\u{1b}', '\t']);
        assert_eq!(editor.buffer(), "Y");
    }

    #[test]
    fn test_unicode_is_appended() {
        let mut editor = LineEditor::new();
        feed_all(&mut editor, &['j', 'ä']);
        assert_eq!(editor.feed('\r'), Keystroke::Line("jä".into()));
    }
}
