//! Apartment list, per-apartment settings and building-wide handset levels.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table, TableState};
use strum::IntoEnumIterator;
use tokio::sync::mpsc::UnboundedSender;

use intercfg_core::intercom::{
    Apartment, ApartmentAudio, ApartmentRegistry, ApartmentSettings, AudioLevel, HandsetLevels,
    SettingsTab,
};
use intercfg_core::settings::LEVEL_MAX;
use intercfg_core::{PanelUpdate, Paginator};

use super::emit;
use crate::action::{Action, ConfirmAction, Notification};
use crate::component::Component;
use crate::context::ScreenContext;
use crate::theme;
use crate::widgets::form::{Field, Form, FormEvent};
use crate::widgets::hints::{FORM_HINTS, hint_line};
use crate::widgets::line_input::{InputEvent, LineInput};
use crate::widgets::pager::pager_line;
use crate::widgets::popup::{centered, render_modal, render_screen_block};
use crate::widgets::selection;
use crate::widgets::sub_tabs::render_sub_tabs;

/// `(level key, "use default" key, label)` for the six audio levels.
const AUDIO_FIELDS: [(&str, &str, &str); 6] = [
    ("ring", "ring_common", "Ringing volume"),
    ("conversation", "conversation_common", "Conversation volume"),
    ("panel", "panel_common", "Panel volume"),
    ("sip_panel", "sip_panel_common", "Panel volume (SIP)"),
    ("gate_ring", "gate_ring_common", "Gate ringing volume"),
    ("mic_gain", "mic_gain_common", "Microphone gain"),
];

fn audio_levels(audio: &ApartmentAudio) -> [&AudioLevel; 6] {
    [
        &audio.ring,
        &audio.conversation,
        &audio.panel,
        &audio.sip_panel,
        &audio.gate_ring,
        &audio.mic_gain,
    ]
}

fn audio_levels_mut(audio: &mut ApartmentAudio) -> [&mut AudioLevel; 6] {
    [
        &mut audio.ring,
        &mut audio.conversation,
        &mut audio.panel,
        &mut audio.sip_panel,
        &mut audio.gate_ring,
        &mut audio.mic_gain,
    ]
}

// ── Settings modal ───────────────────────────────────────────────────

struct SettingsModal {
    apartment: Apartment,
    tab: SettingsTab,
    draft: ApartmentSettings,
    /// Identifiers bound to this apartment, shown on the Keys tab.
    keys: Vec<String>,
    form: Form,
}

impl SettingsModal {
    fn new(apartment: Apartment, draft: ApartmentSettings, keys: Vec<String>) -> Self {
        let tab = SettingsTab::Basic;
        let form = tab_form(tab, &draft, &keys);
        Self {
            apartment,
            tab,
            draft,
            keys,
            form,
        }
    }

    fn switch(&mut self, tab: SettingsTab) {
        if tab == self.tab {
            return;
        }
        store_tab(self.tab, &self.form, &mut self.draft);
        self.tab = tab;
        self.form = tab_form(tab, &self.draft, &self.keys);
    }

    fn finish(&mut self) -> ApartmentSettings {
        store_tab(self.tab, &self.form, &mut self.draft);
        self.draft.clone()
    }

    fn sync_visibility(&mut self) {
        if self.tab == SettingsTab::Diagnostic {
            let custom = !self.form.toggle("standard_levels");
            self.form.set_visible("lift_voltage", custom);
            self.form.set_visible("door_open_voltage", custom);
        }
    }
}

fn tab_form(tab: SettingsTab, s: &ApartmentSettings, keys: &[String]) -> Form {
    let fields = match tab {
        SettingsTab::Basic => vec![
            Field::toggle("voice_guided_opening", "Voice-guided opening", s.voice_guided_opening),
            Field::toggle("analog_ringing", "Analog handset ringing", s.analog_ringing),
            Field::toggle("sip_ringing", "SIP ringing", s.sip_ringing),
        ],
        SettingsTab::Audio => AUDIO_FIELDS
            .iter()
            .zip(audio_levels(&s.audio))
            .flat_map(|(&(key, common_key, label), level)| {
                [
                    Field::heading(label),
                    Field::toggle(common_key, "Use building default", level.use_common),
                    Field::level(key, "Level", level.value, LEVEL_MAX),
                ]
            })
            .collect(),
        SettingsTab::Keys if keys.is_empty() => {
            vec![Field::readonly("keys", "Keys", "No keys bound to this apartment")]
        }
        SettingsTab::Keys => keys
            .iter()
            .enumerate()
            .map(|(i, id)| Field::readonly("key", format!("Key {}", i + 1), id.clone()))
            .collect(),
        SettingsTab::Codes => vec![Field::readonly(
            "codes",
            "Door codes",
            "Codes are issued by the management company",
        )],
        SettingsTab::Sip => vec![Field::readonly("sip", "SIP number", "Not assigned")],
        SettingsTab::Diagnostic => vec![
            Field::toggle("standard_levels", "Standard levels", s.standard_levels),
            Field::decimal("lift_voltage", "Handset lift voltage (V)", s.lift_voltage.clone()),
            Field::decimal(
                "door_open_voltage",
                "Door-open voltage (V)",
                s.door_open_voltage.clone(),
            ),
        ],
    };
    let mut form = Form::new(fields);
    if tab == SettingsTab::Diagnostic && s.standard_levels {
        form.set_visible("lift_voltage", false);
        form.set_visible("door_open_voltage", false);
    }
    form
}

fn store_tab(tab: SettingsTab, form: &Form, s: &mut ApartmentSettings) {
    match tab {
        SettingsTab::Basic => {
            s.voice_guided_opening = form.toggle("voice_guided_opening");
            s.analog_ringing = form.toggle("analog_ringing");
            s.sip_ringing = form.toggle("sip_ringing");
        }
        SettingsTab::Audio => {
            for (&(key, common_key, _), level) in
                AUDIO_FIELDS.iter().zip(audio_levels_mut(&mut s.audio))
            {
                level.use_common = form.toggle(common_key);
                level.set(form.level(key));
            }
        }
        SettingsTab::Diagnostic => {
            s.standard_levels = form.toggle("standard_levels");
            form.text("lift_voltage").clone_into(&mut s.lift_voltage);
            form.text("door_open_voltage").clone_into(&mut s.door_open_voltage);
        }
        SettingsTab::Keys | SettingsTab::Codes | SettingsTab::Sip => {}
    }
}

fn handset_form(levels: &HandsetLevels) -> Form {
    let mut form = Form::new(vec![
        Field::toggle("standard_levels", "Standard levels", levels.standard_levels),
        Field::decimal("pickup", "Pickup (V)", levels.pickup.clone()),
        Field::decimal("malfunction", "Malfunction (V)", levels.malfunction.clone()),
        Field::decimal("lifting", "Lifting (V)", levels.lifting.clone()),
        Field::decimal("door_open", "Door open (V)", levels.door_open.clone()),
        Field::button("save", "Save"),
    ]);
    sync_handset(&mut form);
    form
}

fn sync_handset(form: &mut Form) {
    let custom = !form.toggle("standard_levels");
    for key in ["pickup", "malfunction", "lifting", "door_open"] {
        form.set_visible(key, custom);
    }
}

// ── Screen ───────────────────────────────────────────────────────────

enum Modal {
    /// Add (`id: None`) or renumber an apartment.
    Number { id: Option<u32>, form: Form },
    Settings(SettingsModal),
    Handset(Form),
}

pub struct ApartmentsScreen {
    registry: ApartmentRegistry,
    /// `(apartment, identifier)` for every key, for the Keys tab.
    key_bindings: Vec<(String, String)>,
    query: String,
    search_input: Option<LineInput>,
    filtered: Vec<Apartment>,
    paginator: Paginator,
    table_state: TableState,
    modal: Option<Modal>,
    action_tx: Option<UnboundedSender<Action>>,
}

impl ApartmentsScreen {
    pub fn new(ctx: &ScreenContext<'_>) -> Self {
        let mut screen = Self {
            registry: ctx.panel.apartments.clone(),
            key_bindings: ctx
                .panel
                .keys
                .keys()
                .iter()
                .map(|k| (k.apartment.clone(), k.identifier.clone()))
                .collect(),
            query: String::new(),
            search_input: None,
            filtered: Vec::new(),
            paginator: Paginator::new(ctx.timings.page_size),
            table_state: TableState::default(),
            modal: None,
            action_tx: None,
        };
        screen.refilter();
        screen
    }

    fn refilter(&mut self) {
        self.filtered = self.registry.filter(&self.query);
        self.paginator.clamp(self.filtered.len());
        let on_page = self.paginator.slice(&self.filtered).len();
        selection::clamp(&mut self.table_state, on_page);
    }

    fn page_items(&self) -> &[Apartment] {
        self.paginator.slice(&self.filtered)
    }

    fn selected(&self) -> Option<&Apartment> {
        self.page_items().get(self.table_state.selected()?)
    }

    fn saved(&mut self) -> Action {
        self.refilter();
        Action::save(PanelUpdate::Apartments(self.registry.clone()))
    }

    /// Save first, then show `message` over the "saved" toast.
    fn saved_with_notice(&mut self, message: String) -> Action {
        let save = self.saved();
        emit(self.action_tx.as_ref(), save);
        Action::Notify(Notification::success(message))
    }

    fn open_number_form(&mut self, apartment: Option<&Apartment>) {
        let number = apartment.map_or("", |a| a.number.as_str());
        self.modal = Some(Modal::Number {
            id: apartment.map(|a| a.id),
            form: Form::new(vec![
                Field::text("number", "Apartment number", number),
                Field::button("save", "Save"),
            ]),
        });
    }

    fn open_settings(&mut self) {
        let Some(apartment) = self.selected().cloned() else {
            return;
        };
        let keys = self
            .key_bindings
            .iter()
            .filter(|(apt, _)| *apt == apartment.number)
            .map(|(_, id)| id.clone())
            .collect();
        let draft = self.registry.settings(apartment.id);
        self.modal = Some(Modal::Settings(SettingsModal::new(apartment, draft, keys)));
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        let Some(input) = self.search_input.as_mut() else {
            return;
        };
        match input.handle_key(key) {
            InputEvent::Changed => {
                input.value().clone_into(&mut self.query);
                self.paginator.reset();
                self.refilter();
            }
            InputEvent::Submit => self.search_input = None,
            InputEvent::Cancel => {
                self.search_input = None;
                self.query.clear();
                self.paginator.reset();
                self.refilter();
            }
            InputEvent::None => {}
        }
    }

    fn handle_modal_key(&mut self, key: KeyEvent) -> Option<Action> {
        let modal = self.modal.as_mut()?;
        match modal {
            Modal::Number { id, form } => match form.handle_key(key) {
                FormEvent::Submit | FormEvent::Pressed("save") => {
                    let number = form.text("number").to_owned();
                    match self.registry.save(*id, &number) {
                        Ok(_) => {
                            self.modal = None;
                            return Some(self.saved());
                        }
                        Err(e) => form.set_error(Some(e.to_string())),
                    }
                }
                FormEvent::Cancel => self.modal = None,
                _ => {}
            },
            Modal::Settings(settings) => match key.code {
                KeyCode::PageDown => settings.switch(settings.tab.next()),
                KeyCode::PageUp => settings.switch(settings.tab.prev()),
                _ => match settings.form.handle_key(key) {
                    FormEvent::Edited("standard_levels") => settings.sync_visibility(),
                    FormEvent::Submit => {
                        let id = settings.apartment.id;
                        let number = settings.apartment.number.clone();
                        let draft = settings.finish();
                        match self.registry.save_settings(id, draft) {
                            Ok(()) => {
                                self.modal = None;
                                let notice = format!("Apartment {number} settings saved");
                                return Some(self.saved_with_notice(notice));
                            }
                            Err(e) => settings.form.set_error(Some(e.to_string())),
                        }
                    }
                    FormEvent::Cancel => self.modal = None,
                    _ => {}
                },
            },
            Modal::Handset(form) => match form.handle_key(key) {
                FormEvent::Edited("standard_levels") => sync_handset(form),
                FormEvent::Submit | FormEvent::Pressed("save") => {
                    let levels = HandsetLevels {
                        standard_levels: form.toggle("standard_levels"),
                        pickup: form.text("pickup").to_owned(),
                        malfunction: form.text("malfunction").to_owned(),
                        lifting: form.text("lifting").to_owned(),
                        door_open: form.text("door_open").to_owned(),
                    };
                    match self.registry.save_handset_levels(levels) {
                        Ok(()) => {
                            self.modal = None;
                            return Some(self.saved());
                        }
                        Err(e) => form.set_error(Some(e.to_string())),
                    }
                }
                FormEvent::Cancel => self.modal = None,
                _ => {}
            },
        }
        None
    }
}

impl Component for ApartmentsScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.modal.is_some() {
            return Ok(self.handle_modal_key(key));
        }
        if self.search_input.is_some() {
            self.handle_search_key(key);
            return Ok(None);
        }

        let on_page = self.page_items().len();
        let total = self.filtered.len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => selection::select_next(&mut self.table_state, on_page),
            KeyCode::Char('k') | KeyCode::Up => selection::select_prev(&mut self.table_state, on_page),
            KeyCode::Char('l') | KeyCode::Right => {
                self.paginator.next(total);
                self.table_state.select(Some(0));
            }
            KeyCode::Char('h') | KeyCode::Left => {
                self.paginator.prev();
                self.table_state.select(Some(0));
            }
            KeyCode::Char('g') => {
                self.paginator.go_to(1, total);
                self.table_state.select(Some(0));
            }
            KeyCode::Char('G') => {
                self.paginator.go_to(self.paginator.total_pages(total), total);
                self.table_state.select(Some(0));
            }
            KeyCode::Char('/') => self.search_input = Some(LineInput::new(self.query.clone())),
            KeyCode::Char('a') => self.open_number_form(None),
            KeyCode::Char('e') => {
                if let Some(apartment) = self.selected().cloned() {
                    self.open_number_form(Some(&apartment));
                }
            }
            KeyCode::Enter | KeyCode::Char('s') => self.open_settings(),
            KeyCode::Char('H') => {
                self.modal = Some(Modal::Handset(handset_form(&self.registry.handset_levels)));
            }
            KeyCode::Char('d') => {
                if let Some(a) = self.selected() {
                    return Ok(Some(Action::ShowConfirm(ConfirmAction::DeleteApartment {
                        id: a.id,
                        number: a.number.clone(),
                    })));
                }
            }
            KeyCode::Char('D') => {
                return Ok(Some(Action::ShowConfirm(ConfirmAction::DeleteAllApartments)));
            }
            KeyCode::Char('R') => {
                return Ok(Some(Action::ShowConfirm(ConfirmAction::ResetPersonalSettings)));
            }
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        let Action::Confirmed(confirm) = action else {
            return Ok(None);
        };
        Ok(match confirm {
            ConfirmAction::DeleteApartment { id, number } => match self.registry.delete(*id) {
                Ok(()) => Some(self.saved_with_notice(format!("Apartment {number} deleted"))),
                Err(e) => Some(Action::Notify(Notification::error(e.to_string()))),
            },
            ConfirmAction::DeleteAllApartments => {
                self.registry.delete_all();
                Some(self.saved_with_notice("All apartments deleted".into()))
            }
            ConfirmAction::ResetPersonalSettings => {
                self.registry.reset_personal_settings();
                Some(self.saved_with_notice("Personal settings reset".into()))
            }
            _ => None,
        })
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let inner = render_screen_block(frame, area, "Apartments");
        let layout = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

        let search = match &self.search_input {
            Some(input) => input.line("  Search:"),
            None => Line::from(vec![
                Span::styled("  Search: ", theme::key_hint()),
                Span::styled(
                    if self.query.is_empty() {
                        "(all)".to_owned()
                    } else {
                        self.query.clone()
                    },
                    Style::default().fg(theme::NEON_CYAN),
                ),
            ]),
        };
        frame.render_widget(Paragraph::new(search), layout[0]);

        let cursor = self.table_state.selected().unwrap_or(0);
        let header = Row::new(vec!["Apartment", "Settings"]).style(theme::table_header());
        let rows: Vec<Row> = self
            .page_items()
            .iter()
            .enumerate()
            .map(|(i, a)| {
                let custom = self.registry.settings(a.id) != ApartmentSettings::default();
                Row::new(vec![
                    Cell::from(a.number.clone()),
                    Cell::from(if custom { "Personal" } else { "Default" }),
                ])
                .style(if i == cursor {
                    theme::table_selected()
                } else {
                    theme::table_row()
                })
            })
            .collect();
        let table = Table::new(rows, [Constraint::Length(12), Constraint::Fill(1)])
            .header(header)
            .row_highlight_style(theme::table_selected());
        let mut state = self.table_state;
        frame.render_stateful_widget(table, layout[1], &mut state);

        frame.render_widget(
            Paragraph::new(pager_line(&self.paginator, self.filtered.len())),
            layout[2],
        );
        frame.render_widget(
            Paragraph::new(hint_line(&[
                ("/", "search"),
                ("h/l g/G", "page"),
                ("Enter", "settings"),
                ("a", "add"),
                ("e", "edit"),
                ("d/D", "delete/all"),
                ("R", "reset"),
                ("H", "handset levels"),
            ])),
            layout[3],
        );

        match &self.modal {
            Some(Modal::Number { id, form }) => {
                let title = if id.is_some() { "Edit apartment" } else { "Add apartment" };
                render_form_modal(frame, centered(area, 50, 7), title, form, None);
            }
            Some(Modal::Settings(settings)) => {
                let labels: Vec<&str> = SettingsTab::iter().map(SettingsTab::label).collect();
                let mut header = render_sub_tabs(&labels, settings.tab.index());
                header.spans.push(Span::styled(
                    format!("  {}", settings.tab.position()),
                    theme::key_hint(),
                ));
                render_form_modal(
                    frame,
                    centered(area, 72, 26),
                    &format!("Apartment {}", settings.apartment.number),
                    &settings.form,
                    Some(header),
                );
            }
            Some(Modal::Handset(form)) => {
                render_form_modal(frame, centered(area, 56, 11), "Handset levels", form, None);
            }
            None => {}
        }
    }

    fn captures_input(&self) -> bool {
        self.modal.is_some() || self.search_input.is_some()
    }

    fn id(&self) -> &'static str {
        "Apartments"
    }
}

fn render_form_modal(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    form: &Form,
    header: Option<Line<'static>>,
) {
    let body = render_modal(frame, area, title);
    let parts = Layout::vertical([
        Constraint::Length(u16::from(header.is_some()) * 2),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .split(body);
    if let Some(header) = header {
        frame.render_widget(Paragraph::new(header), parts[0]);
    }
    form.render(frame, parts[1]);
    frame.render_widget(Paragraph::new(hint_line(FORM_HINTS)), parts[2]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::screens::testing::{Harness, ctrl, drain, key, mount};

    #[test]
    fn duplicate_number_is_rejected() {
        let harness = Harness::default();
        let mut screen = ApartmentsScreen::new(&harness.ctx());
        screen.handle_key_event(key(KeyCode::Char('a'))).ok();
        screen.handle_key_event(key(KeyCode::Char('7'))).ok();

        assert!(screen.handle_key_event(ctrl('s')).ok().flatten().is_none());
        let Some(Modal::Number { form, .. }) = &screen.modal else {
            panic!("expected the number form");
        };
        assert_eq!(form.error(), Some("Apartment 7 already exists"));

        screen.handle_key_event(key(KeyCode::Char('0'))).ok();
        screen.handle_key_event(key(KeyCode::Char('0'))).ok();
        let saved = screen.handle_key_event(ctrl('s')).ok().flatten();
        assert!(matches!(saved, Some(Action::SavePanel(_))));
        assert_eq!(screen.registry.apartments().len(), 101);
    }

    #[test]
    fn settings_keep_edits_across_tabs() {
        let harness = Harness::default();
        let mut screen = ApartmentsScreen::new(&harness.ctx());
        let mut rx = mount(&mut screen);

        screen.handle_key_event(key(KeyCode::Enter)).ok();
        // Basic: switch analog ringing on.
        screen.handle_key_event(key(KeyCode::Tab)).ok();
        screen.handle_key_event(key(KeyCode::Char(' '))).ok();
        // Audio: raise the ringing level by one.
        screen.handle_key_event(key(KeyCode::PageDown)).ok();
        screen.handle_key_event(key(KeyCode::Tab)).ok();
        screen.handle_key_event(key(KeyCode::Right)).ok();
        screen.handle_key_event(key(KeyCode::PageUp)).ok();

        let notice = screen.handle_key_event(ctrl('s')).ok().flatten();
        assert!(matches!(
            notice,
            Some(Action::Notify(ref n)) if n.message == "Apartment 1 settings saved"
        ));
        assert!(matches!(drain(&mut rx).as_slice(), [Action::SavePanel(_)]));

        let saved = screen.registry.settings(1);
        assert!(saved.analog_ringing);
        assert_eq!(saved.audio.ring.value, 2);
    }

    #[test]
    fn handset_levels_must_be_numeric() {
        let harness = Harness::default();
        let mut screen = ApartmentsScreen::new(&harness.ctx());
        screen.handle_key_event(key(KeyCode::Char('H'))).ok();
        screen.handle_key_event(key(KeyCode::Tab)).ok();
        for _ in 0..3 {
            screen.handle_key_event(key(KeyCode::Backspace)).ok();
        }

        assert!(screen.handle_key_event(ctrl('s')).ok().flatten().is_none());
        let Some(Modal::Handset(form)) = &screen.modal else {
            panic!("expected the handset form");
        };
        assert_eq!(form.error(), Some("Pickup voltage must be a number"));
    }

    #[test]
    fn delete_all_then_notice() {
        let harness = Harness::default();
        let mut screen = ApartmentsScreen::new(&harness.ctx());
        let mut rx = mount(&mut screen);

        let confirm = screen.handle_key_event(key(KeyCode::Char('D'))).ok().flatten();
        assert!(matches!(
            confirm,
            Some(Action::ShowConfirm(ConfirmAction::DeleteAllApartments))
        ));
        let notice = screen
            .update(&Action::Confirmed(ConfirmAction::DeleteAllApartments))
            .ok()
            .flatten();
        assert!(matches!(
            notice,
            Some(Action::Notify(ref n)) if n.message == "All apartments deleted"
        ));
        assert!(screen.filtered.is_empty());
        assert_eq!(drain(&mut rx).len(), 1);
    }
}
