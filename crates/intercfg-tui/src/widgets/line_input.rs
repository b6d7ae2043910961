//! Single-line text entry for search bars and inline cell edits.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::style::Style;
use ratatui::text::{Line, Span};

use crate::theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    None,
    Changed,
    Submit,
    Cancel,
}

#[derive(Debug, Clone, Default)]
pub struct LineInput {
    value: String,
    digits_only: bool,
    max_len: Option<usize>,
}

impl LineInput {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            value: initial.into(),
            ..Self::default()
        }
    }

    pub fn digits(mut self, max_len: usize) -> Self {
        self.digits_only = true;
        self.max_len = Some(max_len);
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> InputEvent {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return InputEvent::None;
        }
        match key.code {
            KeyCode::Esc => InputEvent::Cancel,
            KeyCode::Enter => InputEvent::Submit,
            KeyCode::Backspace => {
                if self.value.pop().is_some() {
                    InputEvent::Changed
                } else {
                    InputEvent::None
                }
            }
            KeyCode::Char(c) => {
                let full = self
                    .max_len
                    .is_some_and(|max| self.value.chars().count() >= max);
                if full || (self.digits_only && !c.is_ascii_digit()) {
                    return InputEvent::None;
                }
                self.value.push(c);
                InputEvent::Changed
            }
            _ => InputEvent::None,
        }
    }

    /// `label value▏` with the cursor drawn at the end.
    pub fn line(&self, label: &str) -> Line<'static> {
        Line::from(vec![
            Span::styled(format!("{label} "), theme::key_hint_key()),
            Span::styled(self.value.clone(), Style::default().fg(theme::NEON_CYAN)),
            Span::styled("▏", Style::default().fg(theme::ELECTRIC_PURPLE)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn digit_input_rejects_letters_and_overflow() {
        let mut input = LineInput::new("").digits(3);
        for c in ['1', 'x', '2', '3', '4'] {
            input.handle_key(key(KeyCode::Char(c)));
        }
        assert_eq!(input.value(), "123");
        assert_eq!(input.handle_key(key(KeyCode::Backspace)), InputEvent::Changed);
        assert_eq!(input.value(), "12");
        assert_eq!(input.handle_key(key(KeyCode::Enter)), InputEvent::Submit);
    }
}
