//! Diagnostics home: an accordion of settings groups, one open at a time.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use intercfg_core::settings::system::CURRENT_FIRMWARE;

use crate::action::Action;
use crate::component::Component;
use crate::context::ScreenContext;
use crate::screen::ScreenId;
use crate::theme;
use crate::widgets::hints::hint_line;
use crate::widgets::popup::render_screen_block;

enum Entry {
    Link(ScreenId),
    Group(&'static str, &'static [ScreenId]),
}

const MENU: [Entry; 7] = [
    Entry::Link(ScreenId::Main),
    Entry::Group(
        "Intercom",
        &[
            ScreenId::Keys,
            ScreenId::Apartments,
            ScreenId::Matrix,
            ScreenId::Entrance,
            ScreenId::RunningLine,
        ],
    ),
    Entry::Group("Audio", &[ScreenId::Sound, ScreenId::Equalizer]),
    Entry::Group("SIP", &[ScreenId::SipAccount]),
    Entry::Group("Video", &[ScreenId::VideoStream]),
    Entry::Group(
        "Network",
        &[ScreenId::Ddns, ScreenId::NetworkSettings, ScreenId::Syslog],
    ),
    Entry::Group(
        "System",
        &[
            ScreenId::Update,
            ScreenId::DateTime,
            ScreenId::Reboot,
            ScreenId::Reset,
        ],
    ),
];

/// One visible line of the accordion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuRow {
    Entry(usize),
    Item(usize, ScreenId),
}

pub struct DiagnosticMainScreen {
    expanded: Option<usize>,
    cursor: usize,
    panel_model: String,
}

impl DiagnosticMainScreen {
    pub fn new(ctx: &ScreenContext<'_>) -> Self {
        Self {
            expanded: None,
            cursor: 0,
            panel_model: ctx.panel.info.panel_model.clone(),
        }
    }

    fn rows(&self) -> Vec<MenuRow> {
        let mut rows = Vec::new();
        for (i, entry) in MENU.iter().enumerate() {
            rows.push(MenuRow::Entry(i));
            let open: &[ScreenId] = match entry {
                Entry::Group(_, items) if self.expanded == Some(i) => items,
                _ => &[],
            };
            rows.extend(open.iter().map(|id| MenuRow::Item(i, *id)));
        }
        rows
    }

    fn current(&self) -> Option<MenuRow> {
        self.rows().get(self.cursor).copied()
    }

    fn move_cursor(&mut self, down: bool) {
        let len = self.rows().len();
        self.cursor = if down {
            (self.cursor + 1).min(len.saturating_sub(1))
        } else {
            self.cursor.saturating_sub(1)
        };
    }

    /// Open `group` (closing any other) and keep the cursor on its header.
    fn set_expanded(&mut self, group: Option<usize>) {
        let anchor = match self.current() {
            Some(MenuRow::Entry(i) | MenuRow::Item(i, _)) => i,
            None => 0,
        };
        self.expanded = group;
        self.cursor = self
            .rows()
            .iter()
            .position(|r| *r == MenuRow::Entry(anchor))
            .unwrap_or(0);
    }

    fn activate(&mut self) -> Option<Action> {
        match self.current()? {
            MenuRow::Item(_, id) => Some(Action::Navigate(id)),
            MenuRow::Entry(i) => match MENU.get(i)? {
                Entry::Link(id) => Some(Action::Navigate(*id)),
                Entry::Group(..) => {
                    let next = if self.expanded == Some(i) { None } else { Some(i) };
                    self.set_expanded(next);
                    None
                }
            },
        }
    }

    fn collapse(&mut self) {
        if self.expanded.is_some() {
            self.set_expanded(None);
        }
    }
}

impl Component for DiagnosticMainScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.move_cursor(true),
            KeyCode::Char('k') | KeyCode::Up => self.move_cursor(false),
            KeyCode::Enter | KeyCode::Char(' ' | 'l') | KeyCode::Right => {
                return Ok(self.activate());
            }
            KeyCode::Char('h') | KeyCode::Left => self.collapse(),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let inner = render_screen_block(frame, area, "Diagnostics");
        let layout = Layout::vertical([
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(inner);

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(format!("  {}", self.panel_model), theme::title_style()),
                Span::styled(format!("   firmware {CURRENT_FIRMWARE}"), theme::key_hint()),
            ])),
            layout[0],
        );

        let lines: Vec<Line> = self
            .rows()
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let active = i == self.cursor;
                let marker = if active {
                    Span::styled(" ▸ ", Style::default().fg(theme::ELECTRIC_PURPLE))
                } else {
                    Span::raw("   ")
                };
                match row {
                    MenuRow::Entry(idx) => {
                        let (glyph, label) = match &MENU[*idx] {
                            Entry::Link(id) => ("•", id.label()),
                            Entry::Group(title, _) if self.expanded == Some(*idx) => ("▾", *title),
                            Entry::Group(title, _) => ("▸", *title),
                        };
                        let style = if active {
                            Style::default()
                                .fg(theme::NEON_CYAN)
                                .add_modifier(Modifier::BOLD)
                        } else {
                            Style::default()
                                .fg(theme::ELECTRIC_PURPLE)
                                .add_modifier(Modifier::BOLD)
                        };
                        Line::from(vec![
                            marker,
                            Span::styled(format!("{glyph} "), theme::key_hint()),
                            Span::styled(label, style),
                        ])
                    }
                    MenuRow::Item(_, id) => {
                        let style = if active {
                            Style::default().fg(theme::NEON_CYAN)
                        } else {
                            Style::default().fg(theme::DIM_WHITE)
                        };
                        Line::from(vec![
                            marker,
                            Span::styled("    ", Style::default()),
                            Span::styled(id.label(), style),
                        ])
                    }
                }
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), layout[1]);

        frame.render_widget(
            Paragraph::new(hint_line(&[
                ("j/k", "move"),
                ("Enter", "open"),
                ("h", "collapse"),
                ("Esc", "back"),
            ])),
            layout[2],
        );
    }

    fn id(&self) -> &'static str {
        "Diagnostics"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::screens::testing::{Harness, key};

    #[test]
    fn panel_info_is_a_direct_link() {
        let harness = Harness::default();
        let mut screen = DiagnosticMainScreen::new(&harness.ctx());
        let nav = screen.handle_key_event(key(KeyCode::Enter)).ok().flatten();
        assert!(matches!(nav, Some(Action::Navigate(ScreenId::Main))));
    }

    #[test]
    fn only_one_group_is_open() {
        let harness = Harness::default();
        let mut screen = DiagnosticMainScreen::new(&harness.ctx());

        screen.handle_key_event(key(KeyCode::Down)).ok();
        screen.handle_key_event(key(KeyCode::Enter)).ok();
        assert_eq!(screen.expanded, Some(1));
        assert_eq!(screen.rows().len(), MENU.len() + 5);

        // Down past the five intercom items onto "Audio".
        for _ in 0..6 {
            screen.handle_key_event(key(KeyCode::Down)).ok();
        }
        screen.handle_key_event(key(KeyCode::Enter)).ok();
        assert_eq!(screen.expanded, Some(2));
        assert_eq!(screen.current(), Some(MenuRow::Entry(2)));
        assert_eq!(screen.rows().len(), MENU.len() + 2);
    }

    #[test]
    fn items_open_their_screen() {
        let harness = Harness::default();
        let mut screen = DiagnosticMainScreen::new(&harness.ctx());

        for _ in 0..6 {
            screen.handle_key_event(key(KeyCode::Down)).ok();
        }
        screen.handle_key_event(key(KeyCode::Enter)).ok();
        assert_eq!(screen.expanded, Some(6));
        screen.handle_key_event(key(KeyCode::Down)).ok();
        screen.handle_key_event(key(KeyCode::Down)).ok();
        let nav = screen.handle_key_event(key(KeyCode::Enter)).ok().flatten();
        assert!(matches!(nav, Some(Action::Navigate(ScreenId::DateTime))));
    }
}
