//! Wizard step 4: the switch the devices are cabled to.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table, TableState};
use tokio::sync::mpsc::UnboundedSender;

use intercfg_core::{Commutator, StoreCommand};

use super::emit;
use crate::action::Action;
use crate::component::Component;
use crate::context::ScreenContext;
use crate::screen::ScreenId;
use crate::theme;
use crate::widgets::hints::hint_line;
use crate::widgets::popup::render_screen_block;
use crate::widgets::selection;

pub struct CommutatorListScreen {
    commutators: Vec<Commutator>,
    /// Names of the devices picked in the previous step.
    picked: Vec<String>,
    table_state: TableState,
    action_tx: Option<UnboundedSender<Action>>,
}

impl CommutatorListScreen {
    pub fn new(ctx: &ScreenContext<'_>) -> Self {
        let commutators = ctx.store.commutators.clone();
        let current = ctx
            .store
            .selection
            .commutator
            .as_ref()
            .and_then(|c| commutators.iter().position(|x| x.id == c.id))
            .unwrap_or(0);
        let mut table_state = TableState::default().with_selected(Some(current));
        selection::clamp(&mut table_state, commutators.len());
        Self {
            commutators,
            picked: ctx
                .store
                .selection
                .devices
                .values()
                .map(|d| d.name.clone())
                .collect(),
            table_state,
            action_tx: None,
        }
    }

    fn choose(&self) -> Option<Action> {
        let commutator = self.commutators.get(self.table_state.selected()?)?;
        emit(
            self.action_tx.as_ref(),
            Action::Store(StoreCommand::SetCommutator(commutator.clone())),
        );
        Some(Action::Navigate(ScreenId::PortList))
    }
}

impl Component for CommutatorListScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let len = self.commutators.len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => selection::select_next(&mut self.table_state, len),
            KeyCode::Char('k') | KeyCode::Up => selection::select_prev(&mut self.table_state, len),
            KeyCode::Enter | KeyCode::Char(' ') => return Ok(self.choose()),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let inner = render_screen_block(frame, area, "Select switch");
        let layout = Layout::vertical([
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(inner);

        let picked = if self.picked.is_empty() {
            "none".to_owned()
        } else {
            self.picked.join(", ")
        };
        frame.render_widget(
            Paragraph::new(vec![
                Line::from(vec![
                    Span::styled("  Devices: ", theme::key_hint()),
                    Span::styled(picked, theme::table_row()),
                ]),
            ]),
            layout[0],
        );

        let cursor = self.table_state.selected().unwrap_or(0);
        let header = Row::new(vec![Cell::from(" "), Cell::from("Switch"), Cell::from("Ports")])
            .style(theme::table_header());
        let rows: Vec<Row> = self
            .commutators
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let is_cursor = i == cursor;
                let style = if is_cursor {
                    theme::table_selected()
                } else {
                    theme::table_row()
                };
                Row::new(vec![
                    Cell::from(if is_cursor { "▸" } else { " " }),
                    Cell::from(c.name.clone()),
                    Cell::from(c.available_ports.to_string()),
                ])
                .style(style)
            })
            .collect();
        let widths = [Constraint::Length(1), Constraint::Fill(1), Constraint::Length(6)];
        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(theme::table_selected());
        let mut state = self.table_state;
        frame.render_stateful_widget(table, layout[1], &mut state);

        frame.render_widget(
            Paragraph::new(hint_line(&[("j/k", "move"), ("Enter", "select"), ("Esc", "back")])),
            layout[2],
        );
    }

    fn id(&self) -> &'static str {
        "Switches"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::testing::{Harness, drain, key, mount};

    #[test]
    fn choosing_a_switch_sets_it_then_opens_ports() {
        let harness = Harness::default();
        let mut screen = CommutatorListScreen::new(&harness.ctx());
        let mut rx = mount(&mut screen);

        screen.handle_key_event(key(KeyCode::Char('j'))).ok();
        let nav = screen.handle_key_event(key(KeyCode::Enter)).ok().flatten();

        let queued = drain(&mut rx);
        assert!(matches!(
            queued.as_slice(),
            [Action::Store(StoreCommand::SetCommutator(c))] if c.name == "Switch 2"
        ));
        assert!(matches!(nav, Some(Action::Navigate(ScreenId::PortList))));
    }
}
