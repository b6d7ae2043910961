//! Keyboard-driven form used by the settings screens.
//!
//! A form is a flat list of [`Field`]s addressed by a static key. Arrow keys
//! and Tab move focus, `◂ ▸` change choices and levels, Space flips toggles,
//! Enter presses buttons, Ctrl+S submits and Esc cancels. Screens read the
//! values back by key when the user submits.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::theme;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Heading,
    Text {
        value: String,
        masked: bool,
        max_chars: Option<usize>,
    },
    Number {
        value: String,
        decimal: bool,
    },
    Toggle(bool),
    Choice {
        options: Vec<String>,
        index: usize,
    },
    Level {
        value: u8,
        max: u8,
    },
    Static(String),
    Button,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    key: &'static str,
    label: String,
    kind: FieldKind,
    visible: bool,
}

impl Field {
    fn new(key: &'static str, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            key,
            label: label.into(),
            kind,
            visible: true,
        }
    }

    pub fn heading(label: impl Into<String>) -> Self {
        Self::new("", label, FieldKind::Heading)
    }

    pub fn text(key: &'static str, label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(
            key,
            label,
            FieldKind::Text {
                value: value.into(),
                masked: false,
                max_chars: None,
            },
        )
    }

    pub fn masked(key: &'static str, label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(
            key,
            label,
            FieldKind::Text {
                value: value.into(),
                masked: true,
                max_chars: None,
            },
        )
    }

    /// Digits only.
    pub fn number(key: &'static str, label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(
            key,
            label,
            FieldKind::Number {
                value: value.into(),
                decimal: false,
            },
        )
    }

    /// Digits plus one decimal separator (`.` or `,`).
    pub fn decimal(key: &'static str, label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(
            key,
            label,
            FieldKind::Number {
                value: value.into(),
                decimal: true,
            },
        )
    }

    pub fn toggle(key: &'static str, label: impl Into<String>, on: bool) -> Self {
        Self::new(key, label, FieldKind::Toggle(on))
    }

    pub fn choice<I, S>(key: &'static str, label: impl Into<String>, options: I, index: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        let options: Vec<String> = options.into_iter().map(|o| o.to_string()).collect();
        let index = index.min(options.len().saturating_sub(1));
        Self::new(key, label, FieldKind::Choice { options, index })
    }

    pub fn level(key: &'static str, label: impl Into<String>, value: u8, max: u8) -> Self {
        Self::new(
            key,
            label,
            FieldKind::Level {
                value: value.min(max),
                max,
            },
        )
    }

    pub fn readonly(key: &'static str, label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, label, FieldKind::Static(value.into()))
    }

    pub fn button(key: &'static str, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldKind::Button)
    }

    /// Cap a text field's length and show a `n/max` counter.
    pub fn max_chars(mut self, limit: usize) -> Self {
        if let FieldKind::Text { max_chars, .. } = &mut self.kind {
            *max_chars = Some(limit);
        }
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    fn focusable(&self) -> bool {
        self.visible && !matches!(self.kind, FieldKind::Heading | FieldKind::Static(_))
    }
}

/// Outcome of feeding a key to the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEvent {
    None,
    Edited(&'static str),
    Pressed(&'static str),
    Submit,
    Cancel,
}

#[derive(Debug, Clone, Default)]
pub struct Form {
    fields: Vec<Field>,
    focus: usize,
    error: Option<String>,
}

impl Form {
    pub fn new(fields: Vec<Field>) -> Self {
        let mut form = Self {
            fields,
            focus: 0,
            error: None,
        };
        form.focus = form.first_focusable().unwrap_or(0);
        form
    }

    // ── Reads ────────────────────────────────────────────────────────

    fn field(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.key == key)
    }

    fn field_mut(&mut self, key: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.key == key)
    }

    pub fn text(&self, key: &str) -> &str {
        match self.field(key).map(|f| &f.kind) {
            Some(FieldKind::Text { value, .. } | FieldKind::Number { value, .. }) => value,
            Some(FieldKind::Static(value)) => value,
            _ => "",
        }
    }

    pub fn toggle(&self, key: &str) -> bool {
        matches!(self.field(key).map(|f| &f.kind), Some(FieldKind::Toggle(true)))
    }

    pub fn choice(&self, key: &str) -> usize {
        match self.field(key).map(|f| &f.kind) {
            Some(FieldKind::Choice { index, .. }) => *index,
            _ => 0,
        }
    }

    pub fn level(&self, key: &str) -> u8 {
        match self.field(key).map(|f| &f.kind) {
            Some(FieldKind::Level { value, .. }) => *value,
            _ => 0,
        }
    }

    pub fn focused_key(&self) -> Option<&'static str> {
        self.fields.get(self.focus).map(|f| f.key)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    // ── Writes ───────────────────────────────────────────────────────

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    pub fn set_text(&mut self, key: &str, new: impl Into<String>) {
        if let Some(field) = self.field_mut(key) {
            match &mut field.kind {
                FieldKind::Text { value, .. }
                | FieldKind::Number { value, .. }
                | FieldKind::Static(value) => *value = new.into(),
                _ => {}
            }
        }
    }

    pub fn set_visible(&mut self, key: &str, visible: bool) {
        if let Some(field) = self.field_mut(key) {
            field.visible = visible;
        }
        if !self.fields.get(self.focus).is_some_and(Field::focusable) {
            self.focus = self.first_focusable().unwrap_or(0);
        }
    }

    // ── Focus ────────────────────────────────────────────────────────

    fn first_focusable(&self) -> Option<usize> {
        self.fields.iter().position(Field::focusable)
    }

    fn focus_next(&mut self) {
        let len = self.fields.len();
        if let Some(next) = (1..=len)
            .map(|step| (self.focus + step) % len)
            .find(|&i| self.fields[i].focusable())
        {
            self.focus = next;
        }
    }

    fn focus_prev(&mut self) {
        let len = self.fields.len();
        if let Some(prev) = (1..=len)
            .map(|step| (self.focus + len - step) % len)
            .find(|&i| self.fields[i].focusable())
        {
            self.focus = prev;
        }
    }

    // ── Input ────────────────────────────────────────────────────────

    pub fn handle_key(&mut self, key: KeyEvent) -> FormEvent {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return FormEvent::Cancel,
            KeyCode::Char('s') if ctrl => return FormEvent::Submit,
            KeyCode::Tab | KeyCode::Down => {
                self.focus_next();
                return FormEvent::None;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus_prev();
                return FormEvent::None;
            }
            _ => {}
        }

        let Some(field) = self.fields.get_mut(self.focus) else {
            return FormEvent::None;
        };
        let key_name = field.key;

        let edited = match (&mut field.kind, key.code) {
            (FieldKind::Text { value, max_chars, .. }, KeyCode::Char(c)) if !ctrl => {
                if max_chars.is_some_and(|max| value.chars().count() >= max) {
                    false
                } else {
                    value.push(c);
                    true
                }
            }
            (FieldKind::Number { value, decimal }, KeyCode::Char(c)) if !ctrl => {
                let separator = matches!(c, '.' | ',');
                let accepted = c.is_ascii_digit()
                    || (*decimal && separator && !value.contains(['.', ',']));
                if accepted {
                    value.push(c);
                }
                accepted
            }
            (
                FieldKind::Text { value, .. } | FieldKind::Number { value, .. },
                KeyCode::Backspace,
            ) => value.pop().is_some(),
            (FieldKind::Text { .. } | FieldKind::Number { .. }, KeyCode::Enter) => {
                self.focus_next();
                false
            }
            (FieldKind::Toggle(on), KeyCode::Char(' ') | KeyCode::Enter) => {
                *on = !*on;
                true
            }
            (FieldKind::Choice { options, index }, KeyCode::Right | KeyCode::Char(' '))
                if !options.is_empty() =>
            {
                *index = (*index + 1) % options.len();
                true
            }
            (FieldKind::Choice { options, index }, KeyCode::Left) if !options.is_empty() => {
                *index = (*index + options.len() - 1) % options.len();
                true
            }
            (FieldKind::Level { value, max }, KeyCode::Right) if *value < *max => {
                *value += 1;
                true
            }
            (FieldKind::Level { value, .. }, KeyCode::Left) if *value > 0 => {
                *value -= 1;
                true
            }
            (FieldKind::Button, KeyCode::Enter | KeyCode::Char(' ')) => {
                return FormEvent::Pressed(key_name);
            }
            _ => false,
        };

        if edited {
            self.error = None;
            FormEvent::Edited(key_name)
        } else {
            FormEvent::None
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let layout = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(area);
        let body = layout[0];

        let label_width = self
            .fields
            .iter()
            .filter(|f| f.visible && f.kind != FieldKind::Button)
            .map(|f| f.label.chars().count())
            .max()
            .unwrap_or(0)
            .min(32)
            + 2;

        let mut focus_row = 0;
        let mut lines = Vec::new();
        for (i, field) in self.fields.iter().enumerate() {
            if !field.visible {
                continue;
            }
            if i == self.focus {
                focus_row = lines.len();
            }
            lines.push(render_field(field, i == self.focus, label_width));
        }

        let height = usize::from(body.height).max(1);
        let offset = (focus_row + 1).saturating_sub(height);
        let visible: Vec<Line> = lines.into_iter().skip(offset).collect();
        frame.render_widget(Paragraph::new(visible), body);

        if let Some(err) = &self.error {
            frame.render_widget(
                Paragraph::new(Span::styled(format!("  ✗ {err}"), theme::error_text())),
                layout[1],
            );
        }
    }
}

fn render_field(field: &Field, focused: bool, label_width: usize) -> Line<'static> {
    if field.kind == FieldKind::Heading {
        return Line::from(Span::styled(
            format!("  ── {} ──", field.label),
            Style::default()
                .fg(theme::LIGHT_BLUE)
                .add_modifier(Modifier::BOLD),
        ));
    }

    let marker = if focused {
        Span::styled(" ▸ ", Style::default().fg(theme::ELECTRIC_PURPLE))
    } else {
        Span::raw("   ")
    };
    let label_style = if focused {
        Style::default().fg(theme::NEON_CYAN)
    } else {
        Style::default().fg(theme::DIM_WHITE)
    };
    let value_style = if focused {
        Style::default()
            .fg(theme::NEON_CYAN)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme::DIM_WHITE)
    };
    let arrow_style = if focused {
        Style::default().fg(theme::ELECTRIC_PURPLE)
    } else {
        Style::default().fg(theme::BORDER_GRAY)
    };

    if field.kind == FieldKind::Button {
        let style = if focused {
            theme::table_selected()
        } else {
            Style::default().fg(theme::CORAL)
        };
        return Line::from(vec![marker, Span::styled(format!("[ {} ]", field.label), style)]);
    }

    let mut spans = vec![
        marker,
        Span::styled(format!("{:<label_width$}", field.label), label_style),
    ];

    match &field.kind {
        FieldKind::Text {
            value,
            masked,
            max_chars,
        } => {
            let shown = if *masked {
                "●".repeat(value.chars().count())
            } else {
                value.clone()
            };
            spans.push(Span::styled(shown, value_style));
            if focused {
                spans.push(Span::styled("█", Style::default().fg(theme::NEON_CYAN)));
            }
            if let Some(max) = max_chars {
                spans.push(Span::styled(
                    format!("  {}/{max}", value.chars().count()),
                    theme::key_hint(),
                ));
            }
        }
        FieldKind::Number { value, .. } => {
            spans.push(Span::styled(value.clone(), value_style));
            if focused {
                spans.push(Span::styled("█", Style::default().fg(theme::NEON_CYAN)));
            }
        }
        FieldKind::Toggle(on) => {
            let (marker, style) = if *on {
                ("[✓] On", theme::success_text())
            } else {
                ("[ ] Off", theme::key_hint())
            };
            spans.push(Span::styled(marker, style));
        }
        FieldKind::Choice { options, index } => {
            let current = options.get(*index).map_or("—", String::as_str);
            spans.push(Span::styled("◂ ", arrow_style));
            spans.push(Span::styled(current.to_owned(), value_style));
            spans.push(Span::styled(" ▸", arrow_style));
        }
        FieldKind::Level { value, max } => {
            let filled = usize::from(*value);
            let empty = usize::from(max.saturating_sub(*value));
            spans.push(Span::styled("◂ ", arrow_style));
            spans.push(Span::styled(
                "■".repeat(filled),
                Style::default().fg(theme::ELECTRIC_PURPLE),
            ));
            spans.push(Span::styled("·".repeat(empty), theme::key_hint()));
            spans.push(Span::styled(" ▸ ", arrow_style));
            spans.push(Span::styled(format!("{value:>2}/{max}"), value_style));
        }
        FieldKind::Static(value) => {
            spans.push(Span::styled(value.clone(), Style::default().fg(theme::CORAL)));
        }
        FieldKind::Heading | FieldKind::Button => {}
    }

    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;
    use pretty_assertions::assert_eq;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn sample() -> Form {
        Form::new(vec![
            Field::heading("Server"),
            Field::text("host", "Host", "pool.ntp.org"),
            Field::readonly("codec", "Codec", "H264"),
            Field::number("port", "Port", "123"),
            Field::toggle("on", "Enabled", false),
            Field::choice("speed", "Speed", ["Slow", "Normal", "Fast"], 1),
            Field::level("vol", "Volume", 15, 16),
            Field::button("save", "Save"),
        ])
    }

    #[test]
    fn focus_starts_on_first_input_and_skips_static_rows() {
        let mut form = sample();
        assert_eq!(form.focused_key(), Some("host"));
        form.handle_key(press(KeyCode::Tab));
        assert_eq!(form.focused_key(), Some("port"));
        form.handle_key(press(KeyCode::BackTab));
        form.handle_key(press(KeyCode::BackTab));
        assert_eq!(form.focused_key(), Some("save"));
    }

    #[test]
    fn number_fields_reject_letters() {
        let mut form = sample();
        form.handle_key(press(KeyCode::Down));
        assert_eq!(form.handle_key(press(KeyCode::Char('x'))), FormEvent::None);
        assert_eq!(
            form.handle_key(press(KeyCode::Char('4'))),
            FormEvent::Edited("port")
        );
        assert_eq!(form.text("port"), "1234");
    }

    #[test]
    fn choice_wraps_and_level_clamps() {
        let mut form = sample();
        for _ in 0..3 {
            form.handle_key(press(KeyCode::Tab));
        }
        assert_eq!(form.focused_key(), Some("speed"));
        form.handle_key(press(KeyCode::Right));
        form.handle_key(press(KeyCode::Right));
        assert_eq!(form.choice("speed"), 0);

        form.handle_key(press(KeyCode::Tab));
        form.handle_key(press(KeyCode::Right));
        form.handle_key(press(KeyCode::Right));
        assert_eq!(form.level("vol"), 16);
    }

    #[test]
    fn buttons_and_shortcuts() {
        let mut form = sample();
        form.handle_key(press(KeyCode::Up));
        assert_eq!(form.handle_key(press(KeyCode::Enter)), FormEvent::Pressed("save"));
        let save = KeyEvent {
            code: KeyCode::Char('s'),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: crossterm::event::KeyEventState::NONE,
        };
        assert_eq!(form.handle_key(save), FormEvent::Submit);
        assert_eq!(form.handle_key(press(KeyCode::Esc)), FormEvent::Cancel);
    }

    #[test]
    fn text_limit_and_editing_clears_error() {
        let mut form = Form::new(vec![Field::text("t", "Text", "ab").max_chars(3)]);
        form.set_error(Some("bad".into()));
        form.handle_key(press(KeyCode::Char('c')));
        assert_eq!(form.error(), None);
        assert_eq!(form.handle_key(press(KeyCode::Char('d'))), FormEvent::None);
        assert_eq!(form.text("t"), "abc");
    }

    #[test]
    fn hiding_the_focused_field_moves_focus() {
        let mut form = sample();
        form.set_visible("host", false);
        assert_eq!(form.focused_key(), Some("port"));
    }
}
