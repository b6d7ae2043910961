//! Panel clock, timezone and NTP servers.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Row, Table, TableState};
use tracing::debug;

use intercfg_core::settings::DateTimeSettings;
use intercfg_core::settings::system::TIMEZONES;
use intercfg_core::{Clipboard, Clock, PanelUpdate, format_panel_time};

use crate::action::{Action, ConfirmAction, Notification};
use crate::component::Component;
use crate::context::ScreenContext;
use crate::theme;
use crate::widgets::hints::hint_line;
use crate::widgets::line_input::{InputEvent, LineInput};
use crate::widgets::popup::render_screen_block;
use crate::widgets::selection;

pub struct DateTimeScreen {
    draft: DateTimeSettings,
    clock: Arc<dyn Clock>,
    clipboard: Arc<dyn Clipboard>,
    now: String,
    /// Row 0 is the timezone, rows 1.. are NTP servers.
    table_state: TableState,
    editing: Option<(u32, LineInput)>,
    error: Option<String>,
}

impl DateTimeScreen {
    pub fn new(ctx: &ScreenContext<'_>) -> Self {
        let clock = Arc::clone(&ctx.sources.clock);
        let now = format_panel_time(&clock.now());
        Self {
            draft: ctx.panel.date_time.clone(),
            clock,
            clipboard: Arc::clone(&ctx.sources.clipboard),
            now,
            table_state: TableState::default().with_selected(Some(0)),
            editing: None,
            error: None,
        }
    }

    fn row_count(&self) -> usize {
        self.draft.ntp_servers().len() + 1
    }

    fn selected_server(&self) -> Option<u32> {
        let row = self.table_state.selected()?;
        let index = row.checked_sub(1)?;
        self.draft.ntp_servers().get(index).map(|s| s.id)
    }

    fn cycle_timezone(&mut self, forward: bool) {
        let len = TIMEZONES.len();
        let current = TIMEZONES
            .iter()
            .position(|tz| *tz == self.draft.timezone)
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
        if let Err(e) = self.draft.set_timezone(TIMEZONES[next]) {
            self.error = Some(e.to_string());
        }
    }

    fn begin_edit(&mut self, id: u32) {
        let current = self
            .draft
            .ntp_servers()
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.address.clone())
            .unwrap_or_default();
        self.editing = Some((id, LineInput::new(current)));
    }

    fn add_server(&mut self) {
        let id = self.draft.add_ntp_server();
        self.table_state.select(Some(self.row_count() - 1));
        self.begin_edit(id);
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        let Some((id, input)) = self.editing.as_mut() else {
            return;
        };
        let id = *id;
        match input.handle_key(key) {
            InputEvent::Submit => {
                let address = input.value().trim().to_owned();
                self.editing = None;
                if let Err(e) = self.draft.set_ntp_address(id, &address) {
                    self.error = Some(e.to_string());
                }
            }
            InputEvent::Cancel => {
                self.editing = None;
                // A server added and abandoned before it got an address goes away.
                let blank = self
                    .draft
                    .ntp_servers()
                    .iter()
                    .any(|s| s.id == id && s.address.is_empty());
                if blank && self.draft.remove_ntp_server(id).is_ok() {
                    let rows = self.row_count();
                    selection::clamp(&mut self.table_state, rows);
                }
            }
            InputEvent::Changed | InputEvent::None => {}
        }
    }

    fn copy(&self) -> Option<Action> {
        let id = self.selected_server()?;
        Some(Action::Notify(
            match self.draft.copy_ntp_server(id, self.clipboard.as_ref()) {
                Ok(address) => Notification::success(format!("Copied {address}")),
                Err(e) => Notification::error(e.to_string()),
            },
        ))
    }

    fn save(&mut self) -> Option<Action> {
        match self.draft.validate() {
            Ok(()) => Some(Action::save(PanelUpdate::DateTime(self.draft.clone()))),
            Err(e) => {
                self.error = Some(e.to_string());
                None
            }
        }
    }
}

impl Component for DateTimeScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.editing.is_some() {
            self.handle_edit_key(key);
            return Ok(None);
        }

        let len = self.row_count();
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        self.error = None;
        match key.code {
            KeyCode::Char('s') => return Ok(self.save()),
            KeyCode::Char('j') | KeyCode::Down => selection::select_next(&mut self.table_state, len),
            KeyCode::Char('k') | KeyCode::Up => selection::select_prev(&mut self.table_state, len),
            KeyCode::Left | KeyCode::Char('h') if self.table_state.selected() == Some(0) => {
                self.cycle_timezone(false);
            }
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Enter
                if self.table_state.selected() == Some(0) =>
            {
                self.cycle_timezone(true);
            }
            KeyCode::Enter => {
                if let Some(id) = self.selected_server() {
                    self.begin_edit(id);
                }
            }
            KeyCode::Char('a') if !ctrl => self.add_server(),
            KeyCode::Char('d') => {
                if let Some(id) = self.selected_server() {
                    return Ok(Some(Action::ShowConfirm(ConfirmAction::RemoveNtpServer { id })));
                }
            }
            KeyCode::Char('c') if !ctrl => return Ok(self.copy()),
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::Tick => self.now = format_panel_time(&self.clock.now()),
            Action::Confirmed(ConfirmAction::RemoveNtpServer { id }) => {
                if let Err(e) = self.draft.remove_ntp_server(*id) {
                    return Ok(Some(Action::Notify(Notification::error(e.to_string()))));
                }
                debug!(id, "ntp server removed from draft");
                let rows = self.row_count();
                selection::clamp(&mut self.table_state, rows);
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let inner = render_screen_block(frame, area, "Date & time");
        let layout = Layout::vertical([
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("  Panel time  ", theme::key_hint()),
                Span::styled(
                    self.now.clone(),
                    Style::default()
                        .fg(theme::NEON_CYAN)
                        .add_modifier(Modifier::BOLD),
                ),
            ])),
            layout[0],
        );

        let cursor = self.table_state.selected().unwrap_or(0);
        let mut rows = vec![Row::new(vec![
            "Timezone".to_owned(),
            format!("◂ {} ▸", self.draft.timezone),
        ])];
        for (i, server) in self.draft.ntp_servers().iter().enumerate() {
            let value = match &self.editing {
                Some((id, input)) if *id == server.id => format!("{}▏", input.value()),
                _ if server.address.is_empty() => "(empty)".to_owned(),
                _ => server.address.clone(),
            };
            rows.push(Row::new(vec![format!("NTP server {}", i + 1), value]));
        }
        let rows: Vec<Row> = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                row.style(if i == cursor {
                    theme::table_selected()
                } else {
                    theme::table_row()
                })
            })
            .collect();
        let table = Table::new(rows, [Constraint::Length(16), Constraint::Fill(1)])
            .row_highlight_style(theme::table_selected());
        let mut state = self.table_state;
        frame.render_stateful_widget(table, layout[1], &mut state);

        if let Some(err) = &self.error {
            frame.render_widget(
                Paragraph::new(Span::styled(format!("  ✗ {err}"), theme::error_text())),
                layout[2],
            );
        }

        let hints = if self.editing.is_some() {
            hint_line(&[("Enter", "apply"), ("Esc", "cancel")])
        } else {
            hint_line(&[
                ("j/k", "move"),
                ("◂/▸", "timezone"),
                ("Enter", "edit"),
                ("a", "add"),
                ("d", "remove"),
                ("c", "copy"),
                ("s", "save"),
            ])
        };
        frame.render_widget(Paragraph::new(hints), layout[3]);
    }

    fn captures_input(&self) -> bool {
        self.editing.is_some()
    }

    fn id(&self) -> &'static str {
        "Date & time"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::screens::testing::{Harness, key};

    fn type_text(screen: &mut DateTimeScreen, text: &str) {
        for c in text.chars() {
            screen.handle_key_event(key(KeyCode::Char(c))).ok();
        }
    }

    #[test]
    fn clock_uses_the_panel_format() {
        let harness = Harness::default();
        let screen = DateTimeScreen::new(&harness.ctx());
        assert_eq!(screen.now, "19.06.2025 — 12:30:05");
    }

    #[test]
    fn added_server_must_be_filled_before_saving() {
        let harness = Harness::default();
        let mut screen = DateTimeScreen::new(&harness.ctx());

        screen.handle_key_event(key(KeyCode::Char('a'))).ok();
        assert!(screen.captures_input());
        screen.handle_key_event(key(KeyCode::Enter)).ok();
        assert!(screen.handle_key_event(key(KeyCode::Char('s'))).ok().flatten().is_none());
        assert_eq!(
            screen.error.as_deref(),
            Some("Fill in the addresses of all NTP servers")
        );

        screen.handle_key_event(key(KeyCode::Enter)).ok();
        type_text(&mut screen, "pool.ntp.org");
        screen.handle_key_event(key(KeyCode::Enter)).ok();

        let Some(Action::SavePanel(update)) =
            screen.handle_key_event(key(KeyCode::Char('s'))).ok().flatten()
        else {
            panic!("expected a save");
        };
        let PanelUpdate::DateTime(saved) = *update else {
            panic!("expected date & time");
        };
        assert_eq!(saved.ntp_servers()[1].address, "pool.ntp.org");
        assert_eq!(saved.ntp_servers()[1].id, 2);
    }

    #[test]
    fn last_server_cannot_be_removed() {
        let harness = Harness::default();
        let mut screen = DateTimeScreen::new(&harness.ctx());
        screen.handle_key_event(key(KeyCode::Down)).ok();

        let confirm = screen.handle_key_event(key(KeyCode::Char('d'))).ok().flatten();
        assert!(matches!(
            confirm,
            Some(Action::ShowConfirm(ConfirmAction::RemoveNtpServer { id: 1 }))
        ));
        let notice = screen
            .update(&Action::Confirmed(ConfirmAction::RemoveNtpServer { id: 1 }))
            .ok()
            .flatten();
        assert!(matches!(
            notice,
            Some(Action::Notify(ref n)) if n.message == "At least one NTP server is required"
        ));
    }

    #[test]
    fn timezone_cycles_through_the_list() {
        let harness = Harness::default();
        let mut screen = DateTimeScreen::new(&harness.ctx());
        screen.handle_key_event(key(KeyCode::Right)).ok();
        assert_eq!(screen.draft.timezone, "Asia/Irkutsk");
        screen.handle_key_event(key(KeyCode::Left)).ok();
        screen.handle_key_event(key(KeyCode::Left)).ok();
        assert_eq!(screen.draft.timezone, "Asia/Omsk");
    }
}
