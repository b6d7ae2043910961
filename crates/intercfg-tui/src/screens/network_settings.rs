//! IP addressing: a list of dynamic or static addresses.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::Span;
use ratatui::widgets::{Cell, Paragraph, Row, Table, TableState};
use strum::IntoEnumIterator;

use intercfg_core::PanelUpdate;
use intercfg_core::settings::{AddressKind, NetworkAddress, NetworkSettings};

use crate::action::{Action, ConfirmAction, Notification};
use crate::component::Component;
use crate::context::ScreenContext;
use crate::theme;
use crate::widgets::form::{Field, Form, FormEvent};
use crate::widgets::hints::{FORM_HINTS, hint_line};
use crate::widgets::popup::{centered, render_modal, render_screen_block};
use crate::widgets::selection;

const STATIC_FIELDS: [&str; 5] = ["ip", "mask", "gateway", "dns1", "dns2"];

struct AddressEditor {
    id: u32,
    form: Form,
}

impl AddressEditor {
    fn new(address: &NetworkAddress) -> Self {
        let kinds: Vec<&str> = AddressKind::iter().map(AddressKind::label).collect();
        let kind_idx = AddressKind::iter()
            .position(|k| k == address.kind)
            .unwrap_or(0);
        let mut editor = Self {
            id: address.id,
            form: Form::new(vec![
                Field::choice("kind", "Type", kinds, kind_idx),
                Field::text("ip", "IP address", address.ip.clone()),
                Field::text("mask", "Subnet mask", address.mask.clone()),
                Field::text("gateway", "Gateway", address.gateway.clone()),
                Field::text("dns1", "DNS 1", address.dns1.clone()),
                Field::text("dns2", "DNS 2 (optional)", address.dns2.clone()),
                Field::button("apply", "Apply"),
            ]),
        };
        editor.sync_kind();
        editor
    }

    fn kind(&self) -> AddressKind {
        AddressKind::iter()
            .nth(self.form.choice("kind"))
            .unwrap_or(AddressKind::Dynamic)
    }

    fn sync_kind(&mut self) {
        let fixed = self.kind() == AddressKind::Static;
        for key in STATIC_FIELDS {
            self.form.set_visible(key, fixed);
        }
    }

    fn write_into(&self, address: &mut NetworkAddress) {
        address.set_kind(self.kind());
        if address.kind == AddressKind::Static {
            address.ip = self.form.text("ip").trim().to_owned();
            address.mask = self.form.text("mask").trim().to_owned();
            address.gateway = self.form.text("gateway").trim().to_owned();
            address.dns1 = self.form.text("dns1").trim().to_owned();
            address.dns2 = self.form.text("dns2").trim().to_owned();
        }
    }
}

pub struct NetworkSettingsScreen {
    draft: NetworkSettings,
    table_state: TableState,
    editor: Option<AddressEditor>,
    error: Option<String>,
}

impl NetworkSettingsScreen {
    pub fn new(ctx: &ScreenContext<'_>) -> Self {
        let draft = ctx.panel.network.clone();
        let mut table_state = TableState::default();
        selection::clamp(&mut table_state, draft.addresses().len());
        Self {
            draft,
            table_state,
            editor: None,
            error: None,
        }
    }

    fn selected(&self) -> Option<&NetworkAddress> {
        self.draft.addresses().get(self.table_state.selected()?)
    }

    fn open_editor(&mut self) {
        self.editor = self.selected().map(AddressEditor::new);
    }

    fn handle_editor_key(&mut self, key: KeyEvent) {
        let Some(editor) = self.editor.as_mut() else {
            return;
        };
        match editor.form.handle_key(key) {
            FormEvent::Edited("kind") => editor.sync_kind(),
            FormEvent::Submit | FormEvent::Pressed("apply") => {
                if let Some(address) = self.draft.get_mut(editor.id) {
                    editor.write_into(address);
                }
                self.editor = None;
            }
            FormEvent::Cancel => self.editor = None,
            _ => {}
        }
    }

    fn save(&mut self) -> Option<Action> {
        match self.draft.validate() {
            Ok(()) => Some(Action::save(PanelUpdate::Network(self.draft.clone()))),
            Err(e) => {
                self.error = Some(e.to_string());
                None
            }
        }
    }
}

impl Component for NetworkSettingsScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.editor.is_some() {
            self.handle_editor_key(key);
            return Ok(None);
        }

        let len = self.draft.addresses().len();
        self.error = None;
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => selection::select_next(&mut self.table_state, len),
            KeyCode::Char('k') | KeyCode::Up => selection::select_prev(&mut self.table_state, len),
            KeyCode::Enter | KeyCode::Char('e') => self.open_editor(),
            KeyCode::Char('a') => {
                self.draft.add();
                self.table_state.select(Some(len));
                self.open_editor();
            }
            KeyCode::Char('d') => {
                if let Some(address) = self.selected() {
                    return Ok(Some(Action::ShowConfirm(
                        ConfirmAction::RemoveNetworkAddress { id: address.id },
                    )));
                }
            }
            KeyCode::Char('s') => return Ok(self.save()),
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::Confirmed(ConfirmAction::RemoveNetworkAddress { id }) = action {
            if let Err(e) = self.draft.remove(*id) {
                return Ok(Some(Action::Notify(Notification::error(e.to_string()))));
            }
            selection::clamp(&mut self.table_state, self.draft.addresses().len());
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let inner = render_screen_block(frame, area, "Network settings");
        let layout = Layout::vertical([
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

        let cursor = self.table_state.selected().unwrap_or(0);
        let header = Row::new(vec!["#", "Type", "IP address", "Mask", "Gateway", "DNS"])
            .style(theme::table_header());
        let rows: Vec<Row> = self
            .draft
            .addresses()
            .iter()
            .enumerate()
            .map(|(i, a)| {
                let dns = if a.dns2.is_empty() {
                    a.dns1.clone()
                } else {
                    format!("{}, {}", a.dns1, a.dns2)
                };
                Row::new(vec![
                    Cell::from(a.id.to_string()),
                    Cell::from(a.kind.label()),
                    Cell::from(a.ip.clone()),
                    Cell::from(a.mask.clone()),
                    Cell::from(a.gateway.clone()),
                    Cell::from(dns),
                ])
                .style(if i == cursor {
                    theme::table_selected()
                } else {
                    theme::table_row()
                })
            })
            .collect();
        let widths = [
            Constraint::Length(3),
            Constraint::Length(8),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Fill(2),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(theme::table_selected());
        let mut state = self.table_state;
        frame.render_stateful_widget(table, layout[0], &mut state);

        if let Some(err) = &self.error {
            frame.render_widget(
                Paragraph::new(Span::styled(format!("  ✗ {err}"), theme::error_text())),
                layout[1],
            );
        }
        frame.render_widget(
            Paragraph::new(hint_line(&[
                ("j/k", "move"),
                ("Enter", "edit"),
                ("a", "add"),
                ("d", "remove"),
                ("s", "save"),
                ("Esc", "back"),
            ])),
            layout[2],
        );

        if let Some(editor) = &self.editor {
            let modal = centered(area, 60, 14);
            let body = render_modal(frame, modal, &format!("Address #{}", editor.id));
            let parts =
                Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).split(body);
            editor.form.render(frame, parts[0]);
            frame.render_widget(Paragraph::new(hint_line(FORM_HINTS)), parts[1]);
        }
    }

    fn captures_input(&self) -> bool {
        self.editor.is_some()
    }

    fn id(&self) -> &'static str {
        "Network settings"
    }
}
