//! Wizard step 3: tick the unconfigured devices to include.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table, TableState};
use tracing::debug;

use intercfg_core::{Device, StoreCommand, StoreSnapshot};

use crate::action::Action;
use crate::component::Component;
use crate::context::ScreenContext;
use crate::screen::ScreenId;
use crate::theme;
use crate::widgets::popup::render_screen_block;
use crate::widgets::selection;

pub struct DeviceListScreen {
    snapshot: Arc<StoreSnapshot>,
    devices: Vec<Device>,
    table_state: TableState,
    error: Option<String>,
}

impl DeviceListScreen {
    pub fn new(ctx: &ScreenContext<'_>) -> Self {
        let devices = ctx.store.devices_for_selection();
        let mut table_state = TableState::default();
        selection::clamp(&mut table_state, devices.len());
        Self {
            snapshot: Arc::clone(&ctx.store),
            devices,
            table_state,
            error: None,
        }
    }

    fn selected_count(&self) -> usize {
        self.snapshot.selection.devices.len()
    }

    fn toggle(&mut self) -> Option<Action> {
        let device = self.devices.get(self.table_state.selected()?)?;
        if device.is_configured {
            self.error = Some(format!("{} is already configured", device.name));
            return None;
        }
        self.error = None;
        debug!(device = %device.id, "toggling device");
        Some(Action::Store(StoreCommand::ToggleDevice(device.clone())))
    }

    fn next(&mut self) -> Option<Action> {
        if self.selected_count() == 0 {
            self.error = Some("Select at least one device".into());
            return None;
        }
        Some(Action::Navigate(ScreenId::CommutatorList))
    }
}

impl Component for DeviceListScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let len = self.devices.len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => selection::select_next(&mut self.table_state, len),
            KeyCode::Char('k') | KeyCode::Up => selection::select_prev(&mut self.table_state, len),
            KeyCode::Char(' ') | KeyCode::Enter => return Ok(self.toggle()),
            KeyCode::Char('n') => return Ok(self.next()),
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::StoreUpdated(snapshot) = action {
            self.snapshot = Arc::clone(snapshot);
            self.devices = snapshot.devices_for_selection();
            selection::clamp(&mut self.table_state, self.devices.len());
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let sel = &self.snapshot.selection;
        let title = match (sel.device_type, sel.device_subtype) {
            (Some(t), Some(s)) => format!("Devices · {} · {}", t.label(), s.label()),
            _ => "Devices".to_owned(),
        };
        let inner = render_screen_block(frame, area, &title);
        let layout = Layout::vertical([
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

        if self.devices.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "No devices match this type and subtype",
                    theme::key_hint(),
                ))
                .alignment(Alignment::Center),
                layout[0],
            );
        } else {
            let cursor = self.table_state.selected().unwrap_or(0);
            let header = Row::new(vec![
                Cell::from(" "),
                Cell::from("Sel"),
                Cell::from("Name"),
                Cell::from("Subtype"),
                Cell::from("Status"),
            ])
            .style(theme::table_header());

            let rows: Vec<Row> = self
                .devices
                .iter()
                .enumerate()
                .map(|(i, d)| {
                    let is_cursor = i == cursor;
                    let prefix = if is_cursor { "▸" } else { " " };
                    let checked = self.snapshot.is_device_selected(&d.id);
                    let (status, status_style) = if d.is_configured {
                        ("Configured", theme::row_disabled())
                    } else {
                        ("New", Style::default().fg(theme::SUCCESS_GREEN))
                    };
                    let style = if is_cursor {
                        theme::table_selected()
                    } else if d.is_configured {
                        theme::row_disabled()
                    } else {
                        theme::table_row()
                    };
                    Row::new(vec![
                        Cell::from(prefix),
                        Cell::from(if checked { "[✓]" } else { "[ ]" }),
                        Cell::from(d.name.clone()),
                        Cell::from(d.subtype.label()),
                        Cell::from(Span::styled(status, status_style)),
                    ])
                    .style(style)
                })
                .collect();

            let widths = [
                Constraint::Length(1),
                Constraint::Length(4),
                Constraint::Fill(2),
                Constraint::Fill(1),
                Constraint::Length(11),
            ];
            let table = Table::new(rows, widths)
                .header(header)
                .row_highlight_style(theme::table_selected());
            let mut state = self.table_state;
            frame.render_stateful_widget(table, layout[0], &mut state);
        }

        if let Some(err) = &self.error {
            frame.render_widget(
                Paragraph::new(Span::styled(format!("  ✗ {err}"), theme::error_text())),
                layout[1],
            );
        }

        let count = self.selected_count();
        let hints = Line::from(vec![
            Span::styled("  j/k ", theme::key_hint_key()),
            Span::styled("move  ", theme::key_hint()),
            Span::styled("Space ", theme::key_hint_key()),
            Span::styled("toggle  ", theme::key_hint()),
            Span::styled("n ", theme::key_hint_key()),
            Span::styled(
                format!("Next ({count})  "),
                if count > 0 {
                    theme::success_text()
                } else {
                    theme::key_hint()
                },
            ),
            Span::styled("Esc ", theme::key_hint_key()),
            Span::styled("back", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), layout[2]);
    }

    fn id(&self) -> &'static str {
        "Devices"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intercfg_core::{DeviceStore, DeviceSubtype, DeviceType};
    use intercfg_core::store::catalog;

    use crate::screens::testing::{Harness, key};

    fn harness_with(devices: Vec<Device>) -> Harness {
        let mut store = DeviceStore::new(devices, catalog::seed_commutators());
        store.apply(StoreCommand::SetDeviceType(DeviceType::CallPanel));
        store.apply(StoreCommand::SetDeviceSubtype(DeviceSubtype::MainEntrance));
        Harness {
            store,
            ..Harness::default()
        }
    }

    #[test]
    fn configured_devices_do_not_toggle() {
        let mut done = Device::new("9", "Entrance No. 9", DeviceType::CallPanel, DeviceSubtype::MainEntrance);
        done.is_configured = true;
        let mut devices = catalog::seed_devices();
        devices.push(done);
        let harness = harness_with(devices);
        let mut screen = DeviceListScreen::new(&harness.ctx());

        // Unconfigured devices sort first: 1, 2, then the configured 9.
        assert_eq!(screen.devices.len(), 3);
        screen.handle_key_event(key(KeyCode::Down)).ok();
        screen.handle_key_event(key(KeyCode::Down)).ok();
        assert!(screen.handle_key_event(key(KeyCode::Char(' '))).ok().flatten().is_none());
        assert_eq!(screen.error.as_deref(), Some("Entrance No. 9 is already configured"));
    }

    #[test]
    fn next_requires_a_selection() {
        let mut harness = harness_with(catalog::seed_devices());
        let mut screen = DeviceListScreen::new(&harness.ctx());

        assert!(screen.handle_key_event(key(KeyCode::Char('n'))).ok().flatten().is_none());
        assert_eq!(screen.error.as_deref(), Some("Select at least one device"));

        let Some(Action::Store(cmd)) = screen.handle_key_event(key(KeyCode::Enter)).ok().flatten()
        else {
            panic!("expected a store command");
        };
        harness.store.apply(cmd);
        screen
            .update(&Action::StoreUpdated(harness.snapshot()))
            .ok();

        let nav = screen.handle_key_event(key(KeyCode::Char('n'))).ok().flatten();
        assert!(matches!(nav, Some(Action::Navigate(ScreenId::CommutatorList))));
    }
}
