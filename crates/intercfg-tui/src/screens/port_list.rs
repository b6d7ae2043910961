//! Wizard step 5: scan the chosen switch and pick a free port.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table, TableState};
use tracing::debug;

use intercfg_core::{Commutator, Port, StoreCommand};

use crate::action::Action;
use crate::component::Component;
use crate::context::ScreenContext;
use crate::screen::ScreenId;
use crate::theme;
use crate::widgets::hints::hint_line;
use crate::widgets::popup::render_screen_block;
use crate::widgets::selection;

pub struct PortListScreen {
    commutator: Option<Commutator>,
    ports: Vec<Port>,
    chosen: Option<u16>,
    table_state: TableState,
    error: Option<String>,
}

impl PortListScreen {
    pub fn new(ctx: &ScreenContext<'_>) -> Self {
        let commutator = ctx.store.selection.commutator.clone();
        let ports = commutator
            .as_ref()
            .map(|c| ctx.sources.ports.scan(c))
            .unwrap_or_default();
        if let Some(c) = &commutator {
            debug!(
                commutator = %c.id,
                available = ports.iter().filter(|p| p.is_available).count(),
                "scanned ports"
            );
        }
        let chosen = ctx
            .store
            .selection
            .port
            .as_ref()
            .map(|p| p.id)
            .filter(|id| ports.iter().any(|p| p.id == *id && p.is_available));
        let mut table_state = TableState::default();
        selection::clamp(&mut table_state, ports.len());
        Self {
            commutator,
            ports,
            chosen,
            table_state,
            error: None,
        }
    }

    fn choose(&mut self) -> Option<Action> {
        let port = self.ports.get(self.table_state.selected()?)?;
        if !port.is_available {
            self.error = Some(format!("{} is not available", port.name));
            return None;
        }
        self.error = None;
        self.chosen = Some(port.id);
        Some(Action::Store(StoreCommand::SetPort(port.clone())))
    }

    fn configure(&mut self) -> Option<Action> {
        if self.chosen.is_none() {
            self.error = Some("Select a port".into());
            return None;
        }
        Some(Action::Navigate(ScreenId::ConfigurationConfirm))
    }
}

impl Component for PortListScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let len = self.ports.len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => selection::select_next(&mut self.table_state, len),
            KeyCode::Char('k') | KeyCode::Up => selection::select_prev(&mut self.table_state, len),
            KeyCode::Char(' ') | KeyCode::Enter => return Ok(self.choose()),
            KeyCode::Char('c') => return Ok(self.configure()),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let title = self
            .commutator
            .as_ref()
            .map_or_else(|| "Ports".to_owned(), |c| format!("Ports · {}", c.name));
        let inner = render_screen_block(frame, area, &title);
        let layout = Layout::vertical([
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

        if self.ports.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled("Select a switch first", theme::key_hint()))
                    .alignment(Alignment::Center),
                layout[0],
            );
        } else {
            let cursor = self.table_state.selected().unwrap_or(0);
            let header = Row::new(vec![
                Cell::from(" "),
                Cell::from(" "),
                Cell::from("Port"),
                Cell::from("State"),
                Cell::from("Link"),
            ])
            .style(theme::table_header());

            let rows: Vec<Row> = self
                .ports
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    let is_cursor = i == cursor;
                    let mark = if self.chosen == Some(p.id) { "●" } else { " " };
                    let (state, state_style) = if p.is_available {
                        ("Free", Style::default().fg(theme::SUCCESS_GREEN))
                    } else {
                        ("Busy", theme::row_disabled())
                    };
                    let (link, link_style) = if p.is_disconnected {
                        ("Disconnected", Style::default().fg(theme::ERROR_RED))
                    } else {
                        ("Connected", theme::table_row())
                    };
                    let style = if is_cursor {
                        theme::table_selected()
                    } else if p.is_available {
                        theme::table_row()
                    } else {
                        theme::row_disabled()
                    };
                    Row::new(vec![
                        Cell::from(if is_cursor { "▸" } else { " " }),
                        Cell::from(Span::styled(mark, Style::default().fg(theme::NEON_CYAN))),
                        Cell::from(p.name.clone()),
                        Cell::from(Span::styled(state, state_style)),
                        Cell::from(Span::styled(link, link_style)),
                    ])
                    .style(style)
                })
                .collect();

            let widths = [
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Fill(1),
                Constraint::Length(6),
                Constraint::Length(13),
            ];
            let table = Table::new(rows, widths)
                .header(header)
                .row_highlight_style(theme::table_selected());
            let mut state = self.table_state;
            frame.render_stateful_widget(table, layout[0], &mut state);
        }

        let status = match (&self.error, self.chosen) {
            (Some(err), _) => Line::from(Span::styled(format!("  ✗ {err}"), theme::error_text())),
            (None, Some(id)) => Line::from(Span::styled(
                format!("  Port {id} selected"),
                theme::success_text(),
            )),
            (None, None) => Line::from(""),
        };
        frame.render_widget(Paragraph::new(status), layout[1]);

        frame.render_widget(
            Paragraph::new(hint_line(&[
                ("j/k", "move"),
                ("Space", "select"),
                ("c", "configure"),
                ("Esc", "back"),
            ])),
            layout[2],
        );
    }

    fn id(&self) -> &'static str {
        "Ports"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intercfg_core::store::catalog;

    use crate::screens::testing::{Harness, key};

    fn harness() -> Harness {
        let mut harness = Harness::default();
        let switch = catalog::seed_commutators().remove(0);
        harness.store.apply(StoreCommand::SetCommutator(switch));
        harness
    }

    #[test]
    fn busy_ports_cannot_be_selected() {
        let harness = harness();
        let mut screen = PortListScreen::new(&harness.ctx());
        assert_eq!(screen.ports.len(), 3);

        screen.handle_key_event(key(KeyCode::Down)).ok();
        assert!(screen.handle_key_event(key(KeyCode::Enter)).ok().flatten().is_none());
        assert_eq!(screen.error.as_deref(), Some("Port 2 is not available"));
        assert_eq!(screen.chosen, None);
    }

    #[test]
    fn configure_needs_a_port() {
        let harness = harness();
        let mut screen = PortListScreen::new(&harness.ctx());

        assert!(screen.handle_key_event(key(KeyCode::Char('c'))).ok().flatten().is_none());

        let chosen = screen.handle_key_event(key(KeyCode::Enter)).ok().flatten();
        assert!(matches!(chosen, Some(Action::Store(StoreCommand::SetPort(ref p))) if p.id == 1));
        let nav = screen.handle_key_event(key(KeyCode::Char('c'))).ok().flatten();
        assert!(matches!(nav, Some(Action::Navigate(ScreenId::ConfigurationConfirm))));
    }
}
