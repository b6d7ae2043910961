//! Landing screen: guided auto-configuration or panel diagnostics.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, TableState};

use crate::action::Action;
use crate::component::Component;
use crate::screen::ScreenId;
use crate::theme;
use crate::widgets::hints::hint_line;
use crate::widgets::option_list::render_option_list;
use crate::widgets::popup::render_screen_block;
use crate::widgets::selection;

const MODES: [(&str, &str, ScreenId); 2] = [
    (
        "Auto-configuration",
        "Pick devices, a switch and a port, then push the configuration",
        ScreenId::DeviceType,
    ),
    (
        "Diagnostics",
        "Inspect and change the settings of the call panel",
        ScreenId::DiagnosticMain,
    ),
];

pub struct ModeSelectionScreen {
    table_state: TableState,
}

impl Default for ModeSelectionScreen {
    fn default() -> Self {
        Self {
            table_state: TableState::default().with_selected(Some(0)),
        }
    }
}

impl ModeSelectionScreen {
    fn target(&self) -> ScreenId {
        let idx = self.table_state.selected().unwrap_or(0);
        MODES.get(idx).map_or(ScreenId::DeviceType, |(_, _, id)| *id)
    }
}

impl Component for ModeSelectionScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => selection::select_next(&mut self.table_state, MODES.len()),
            KeyCode::Char('k') | KeyCode::Up => selection::select_prev(&mut self.table_state, MODES.len()),
            KeyCode::Char('1') => return Ok(Some(Action::Navigate(ScreenId::DeviceType))),
            KeyCode::Char('2') => return Ok(Some(Action::Navigate(ScreenId::DiagnosticMain))),
            KeyCode::Enter => return Ok(Some(Action::Navigate(self.target()))),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let inner = render_screen_block(frame, area, "Intercom configurator");
        let layout = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

        let intro = vec![
            Line::from(""),
            Line::from(Span::styled(
                "  Choose how to work with the panel",
                Style::default()
                    .fg(theme::ELECTRIC_PURPLE)
                    .add_modifier(Modifier::BOLD),
            )),
        ];
        frame.render_widget(Paragraph::new(intro), layout[0]);

        let options: Vec<(String, String)> = MODES
            .iter()
            .map(|(label, detail, _)| ((*label).to_owned(), (*detail).to_owned()))
            .collect();
        render_option_list(
            frame,
            layout[1],
            &options,
            self.table_state.selected().unwrap_or(0),
        );

        frame.render_widget(
            Paragraph::new(hint_line(&[("j/k", "move"), ("Enter", "open"), ("1/2", "jump")])),
            layout[2],
        );
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!("intercfg v{}  ", env!("CARGO_PKG_VERSION")),
                theme::key_hint(),
            ))
            .alignment(Alignment::Right),
            layout[3],
        );
    }

    fn id(&self) -> &'static str {
        "Mode selection"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::testing::key;

    #[test]
    fn enter_opens_the_highlighted_mode() {
        let mut screen = ModeSelectionScreen::default();
        let action = screen.handle_key_event(key(KeyCode::Enter)).ok().flatten();
        assert!(matches!(action, Some(Action::Navigate(ScreenId::DeviceType))));

        screen.handle_key_event(key(KeyCode::Down)).ok();
        let action = screen.handle_key_event(key(KeyCode::Enter)).ok().flatten();
        assert!(matches!(action, Some(Action::Navigate(ScreenId::DiagnosticMain))));
    }
}
