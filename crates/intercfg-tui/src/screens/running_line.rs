//! Scrolling text on the panel display, with a live preview.

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::Span;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use intercfg_core::PanelUpdate;
use intercfg_core::settings::{RunningLine, ScrollSpeed};

use crate::action::Action;
use crate::component::Component;
use crate::context::ScreenContext;
use crate::theme;
use crate::widgets::form::{Field, Form, FormEvent};
use crate::widgets::hints::{FORM_HINTS, hint_line};
use crate::widgets::popup::render_screen_block;

pub struct RunningLineScreen {
    form: Form,
    speeds: Vec<ScrollSpeed>,
    /// Preview scroll position in characters.
    offset: usize,
}

impl RunningLineScreen {
    pub fn new(ctx: &ScreenContext<'_>) -> Self {
        let line = &ctx.panel.running_line;
        let speeds = ScrollSpeed::all();
        let speed_idx = speeds.iter().position(|s| *s == line.speed).unwrap_or(0);
        Self {
            form: Form::new(vec![
                Field::toggle("enabled", "Show running line", line.enabled),
                Field::choice(
                    "speed",
                    "Scroll speed",
                    speeds.iter().map(|s| s.label()),
                    speed_idx,
                ),
                Field::text("text", "Text", line.text.clone()).max_chars(RunningLine::MAX_CHARS),
                Field::button("save", "Save"),
            ]),
            speeds,
            offset: 0,
        }
    }

    fn draft(&self) -> RunningLine {
        RunningLine {
            enabled: self.form.toggle("enabled"),
            speed: self
                .speeds
                .get(self.form.choice("speed"))
                .copied()
                .unwrap_or_default(),
            text: self.form.text("text").to_owned(),
        }
    }

    fn submit(&mut self) -> Option<Action> {
        let draft = self.draft();
        match draft.validate() {
            Ok(()) => Some(Action::save(PanelUpdate::RunningLine(draft))),
            Err(e) => {
                self.form.set_error(Some(e.to_string()));
                None
            }
        }
    }

    /// Characters the preview advances per tick.
    fn step(&self) -> usize {
        match self.draft().speed {
            ScrollSpeed::Slow => 1,
            ScrollSpeed::Normal => 2,
            ScrollSpeed::Fast => 3,
            ScrollSpeed::VeryFast => 4,
        }
    }

    fn preview(&self, width: usize) -> String {
        let text = self.form.text("text");
        if text.is_empty() {
            return String::new();
        }
        let padded: Vec<char> = format!("{text}   ").chars().collect();
        padded
            .iter()
            .cycle()
            .skip(self.offset % padded.len())
            .take(width)
            .collect()
    }
}

impl Component for RunningLineScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        Ok(match self.form.handle_key(key) {
            FormEvent::Submit | FormEvent::Pressed("save") => self.submit(),
            FormEvent::Cancel => Some(Action::GoBack),
            FormEvent::Edited("text") => {
                self.offset = 0;
                None
            }
            _ => None,
        })
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if matches!(action, Action::Tick) && self.form.toggle("enabled") {
            self.offset = self.offset.wrapping_add(self.step());
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let inner = render_screen_block(frame, area, "Running line");
        let layout = Layout::vertical([
            Constraint::Min(6),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(inner);

        self.form.render(frame, layout[0]);

        let block = Block::default()
            .title(" Preview ")
            .title_style(theme::key_hint())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let preview_area = block.inner(layout[1]);
        frame.render_widget(block, layout[1]);
        let content = if self.form.toggle("enabled") {
            Span::styled(
                self.preview(usize::from(preview_area.width)),
                Style::default().fg(theme::ELECTRIC_YELLOW),
            )
        } else {
            Span::styled("(disabled)", theme::key_hint())
        };
        frame.render_widget(Paragraph::new(content), preview_area);

        frame.render_widget(Paragraph::new(hint_line(FORM_HINTS)), layout[2]);
    }

    fn captures_input(&self) -> bool {
        true
    }

    fn id(&self) -> &'static str {
        "Running line"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyCode;
    use pretty_assertions::assert_eq;

    use crate::screens::testing::{Harness, ctrl, key};

    #[test]
    fn empty_text_is_rejected_while_enabled() {
        let mut harness = Harness::default();
        harness.panel.running_line = RunningLine {
            enabled: true,
            speed: ScrollSpeed::Normal,
            text: String::new(),
        };
        let mut screen = RunningLineScreen::new(&harness.ctx());

        assert!(screen.handle_key_event(ctrl('s')).ok().flatten().is_none());
        assert!(screen.form.error().is_some());

        for _ in 0..2 {
            screen.handle_key_event(key(KeyCode::Tab)).ok();
        }
        screen.handle_key_event(key(KeyCode::Char('H'))).ok();
        screen.handle_key_event(key(KeyCode::Char('i'))).ok();
        let saved = screen.handle_key_event(ctrl('s')).ok().flatten();
        assert!(matches!(saved, Some(Action::SavePanel(_))));
        assert_eq!(screen.draft().text, "Hi");
    }

    #[test]
    fn preview_scrolls_on_tick() {
        let mut harness = Harness::default();
        harness.panel.running_line = RunningLine {
            enabled: true,
            speed: ScrollSpeed::Slow,
            text: "ABC".into(),
        };
        let mut screen = RunningLineScreen::new(&harness.ctx());
        assert_eq!(screen.preview(4), "ABC ");
        screen.update(&Action::Tick).ok();
        assert_eq!(screen.preview(4), "BC  ");
    }
}
