//! Access keys: search, paging, manual edits and the guided NFC add flow.

use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table, TableState};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use intercfg_core::intercom::keys::{APARTMENTS_PER_PICKER, ENTRANCE_COUNT};
use intercfg_core::intercom::{AddKeyFlow, AddKeyStep, Key, KeyRegistry, KeySearch, NfcState};
use intercfg_core::{CoreError, KeyReader, PanelUpdate, Paginator};

use super::emit;
use crate::action::{Action, ConfirmAction, Notification};
use crate::component::Component;
use crate::context::ScreenContext;
use crate::theme;
use crate::widgets::form::{Field, Form, FormEvent};
use crate::widgets::hints::{FORM_HINTS, hint_line};
use crate::widgets::line_input::{InputEvent, LineInput};
use crate::widgets::option_list::render_option_list;
use crate::widgets::pager::pager_line;
use crate::widgets::popup::{centered, render_modal, render_screen_block};
use crate::widgets::selection;

/// Apartment picker columns.
const PICKER_COLUMNS: u16 = 10;

/// Guided add: entrance → apartment → NFC read → name.
struct AddKeyModal {
    flow: AddKeyFlow,
    entrance_cursor: usize,
    apartment_cursor: u16,
    name: LineInput,
    error: Option<String>,
}

impl Default for AddKeyModal {
    fn default() -> Self {
        Self {
            flow: AddKeyFlow::default(),
            entrance_cursor: 0,
            apartment_cursor: 1,
            name: LineInput::default(),
            error: None,
        }
    }
}

enum Modal {
    /// Manual add (`id: None`) or edit of an existing key.
    Edit { id: Option<u32>, form: Form },
    Add(AddKeyModal),
}

pub struct KeysScreen {
    keys: KeyRegistry,
    search: KeySearch,
    query: String,
    search_input: Option<LineInput>,
    filtered: Vec<Key>,
    paginator: Paginator,
    table_state: TableState,
    modal: Option<Modal>,
    reader: Arc<dyn KeyReader>,
    nfc_delay: Duration,
    action_tx: Option<UnboundedSender<Action>>,
    read_cancel: CancellationToken,
}

impl KeysScreen {
    pub fn new(ctx: &ScreenContext<'_>) -> Self {
        let keys = ctx.panel.keys.clone();
        let mut screen = Self {
            filtered: Vec::new(),
            keys,
            search: KeySearch::default(),
            query: String::new(),
            search_input: None,
            paginator: Paginator::new(ctx.timings.page_size),
            table_state: TableState::default(),
            modal: None,
            reader: Arc::clone(&ctx.sources.keys),
            nfc_delay: ctx.timings.nfc_read_delay,
            action_tx: None,
            read_cancel: CancellationToken::new(),
        };
        screen.refilter();
        screen
    }

    fn refilter(&mut self) {
        self.filtered = self.keys.filter(&self.query, self.search);
        self.paginator.clamp(self.filtered.len());
        let on_page = self.paginator.slice(&self.filtered).len();
        selection::clamp(&mut self.table_state, on_page);
    }

    fn page_items(&self) -> &[Key] {
        self.paginator.slice(&self.filtered)
    }

    fn selected_key(&self) -> Option<&Key> {
        self.page_items().get(self.table_state.selected()?)
    }

    fn saved(&mut self) -> Action {
        self.refilter();
        Action::save(PanelUpdate::Keys(self.keys.clone()))
    }

    fn open_form(&mut self, key: Option<&Key>) {
        let (id, apartment, identifier) = key.map_or((None, "", ""), |k| {
            (Some(k.id), k.apartment.as_str(), k.identifier.as_str())
        });
        let form = Form::new(vec![
            Field::text("apartment", "Apartment", apartment),
            Field::text("identifier", "Identifier", identifier),
            Field::button("save", "Save"),
        ]);
        self.modal = Some(Modal::Edit { id, form });
    }

    fn close_modal(&mut self) {
        self.modal = None;
        self.read_cancel.cancel();
        self.read_cancel = CancellationToken::new();
    }

    fn start_read(&mut self) {
        let Some(Modal::Add(modal)) = self.modal.as_mut() else {
            return;
        };
        if !modal.flow.begin_read() {
            return;
        }
        modal.error = None;
        if let Some(tx) = self.action_tx.clone() {
            debug!(delay_ms = self.nfc_delay.as_millis(), "waiting for a key");
            spawn_key_read(
                Arc::clone(&self.reader),
                self.nfc_delay,
                tx,
                self.read_cancel.child_token(),
            );
        }
    }

    // ── Key handling ─────────────────────────────────────────────────

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

    fn handle_form_key(&mut self, key: KeyEvent) -> Option<Action> {
        let Some(Modal::Edit { id, form }) = self.modal.as_mut() else {
            return None;
        };
        match form.handle_key(key) {
            FormEvent::Submit | FormEvent::Pressed("save") => {
                let apartment = form.text("apartment").to_owned();
                let identifier = form.text("identifier").to_owned();
                let outcome = match *id {
                    Some(id) => self.keys.edit(id, &apartment, &identifier),
                    None => self.keys.add_manual(&apartment, &identifier).map(|_| ()),
                };
                match outcome {
                    Ok(()) => {
                        self.modal = None;
                        Some(self.saved())
                    }
                    Err(e) => {
                        form.set_error(Some(e.to_string()));
                        None
                    }
                }
            }
            FormEvent::Cancel => {
                self.modal = None;
                None
            }
            _ => None,
        }
    }

    fn handle_add_key(&mut self, key: KeyEvent) -> Option<Action> {
        let Some(Modal::Add(modal)) = self.modal.as_mut() else {
            return None;
        };
        if key.code == KeyCode::Esc {
            if !modal.flow.back() {
                self.close_modal();
            }
            return None;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let mut read = false;
        match modal.flow.step() {
            AddKeyStep::Entrance => match key.code {
                KeyCode::Char('j') | KeyCode::Down => {
                    modal.entrance_cursor = (modal.entrance_cursor + 1).min(ENTRANCE_COUNT - 1);
                }
                KeyCode::Char('k') | KeyCode::Up => {
                    modal.entrance_cursor = modal.entrance_cursor.saturating_sub(1);
                }
                KeyCode::Enter => modal.flow.select_entrance(modal.entrance_cursor + 1),
                KeyCode::Char(c) => {
                    if let Some(index) = c.to_digit(10).and_then(|d| usize::try_from(d).ok()) {
                        modal.flow.select_entrance(index);
                    }
                }
                _ => {}
            },
            AddKeyStep::Apartment => {
                let cursor = modal.apartment_cursor;
                modal.apartment_cursor = match key.code {
                    KeyCode::Char('l') | KeyCode::Right => cursor + 1,
                    KeyCode::Char('h') | KeyCode::Left => cursor.saturating_sub(1),
                    KeyCode::Char('j') | KeyCode::Down => cursor + PICKER_COLUMNS,
                    KeyCode::Char('k') | KeyCode::Up => cursor.saturating_sub(PICKER_COLUMNS),
                    _ => cursor,
                }
                .clamp(1, APARTMENTS_PER_PICKER);
                if key.code == KeyCode::Enter {
                    modal.flow.select_apartment(modal.apartment_cursor);
                    read = true;
                }
            }
            AddKeyStep::Nfc => {
                read = matches!(key.code, KeyCode::Enter | KeyCode::Char('r'));
            }
            AddKeyStep::Name if ctrl && key.code == KeyCode::Char('r') => {
                modal.flow.rescan();
                modal.name = LineInput::default();
                read = true;
            }
            AddKeyStep::Name => {
                if modal.name.handle_key(key) == InputEvent::Submit {
                    modal.flow.name = modal.name.value().to_owned();
                    match modal.flow.register(&mut self.keys) {
                        Ok(_) => {
                            let notice = format!("Key {} added", modal.flow.name.trim());
                            self.close_modal();
                            let save = self.saved();
                            emit(self.action_tx.as_ref(), save);
                            return Some(Action::Notify(Notification::success(notice)));
                        }
                        Err(e) => modal.error = Some(e.to_string()),
                    }
                }
            }
        }
        if read {
            self.start_read();
        }
        None
    }
}

/// Wait out the simulated read delay, then report the reader's outcome.
fn spawn_key_read(
    reader: Arc<dyn KeyReader>,
    delay: Duration,
    tx: UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    tokio::spawn(async move {
        tokio::select! {
            () = cancel.cancelled() => debug!("key read cancelled"),
            () = tokio::time::sleep(delay) => {
                let outcome = reader.read_key();
                if let Err(e) = &outcome {
                    debug!(error = %e, "key read failed");
                }
                let _ = tx.send(Action::KeyRead(outcome));
            }
        }
    });
}

impl Drop for KeysScreen {
    fn drop(&mut self) {
        self.read_cancel.cancel();
    }
}

impl Component for KeysScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match self.modal {
            Some(Modal::Edit { .. }) => return Ok(self.handle_form_key(key)),
            Some(Modal::Add(_)) => return Ok(self.handle_add_key(key)),
            None => {}
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
            KeyCode::Char('f') => {
                self.search = self.search.toggle();
                self.paginator.reset();
                self.refilter();
            }
            KeyCode::Enter | KeyCode::Char('e') => {
                if let Some(key) = self.selected_key().cloned() {
                    self.open_form(Some(&key));
                }
            }
            KeyCode::Char('m') => self.open_form(None),
            KeyCode::Char('a') => self.modal = Some(Modal::Add(AddKeyModal::default())),
            KeyCode::Char('d') => {
                if let Some(key) = self.selected_key() {
                    return Ok(Some(Action::ShowConfirm(ConfirmAction::DeleteKey {
                        id: key.id,
                        identifier: key.identifier.clone(),
                    })));
                }
            }
            KeyCode::Char('r') => {
                self.keys.reverse_identifier_check = !self.keys.reverse_identifier_check;
                return Ok(Some(self.saved()));
            }
            KeyCode::Char('i') => {
                return Ok(Some(Action::Notify(Notification::info(
                    "Import reads a CSV of apartment,identifier rows on the panel",
                ))));
            }
            KeyCode::Char('x') => {
                return Ok(Some(Action::Notify(Notification::info(format!(
                    "Export writes {} keys to CSV on the panel",
                    self.keys.keys().len()
                )))));
            }
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::KeyRead(outcome) => {
                if let Some(Modal::Add(modal)) = self.modal.as_mut() {
                    modal.flow.finish_read(outcome.clone());
                    if *modal.flow.nfc() == NfcState::Failed {
                        modal.error = Some(CoreError::KeyReadFailed.to_string());
                    }
                }
            }
            Action::Confirmed(ConfirmAction::DeleteKey { id, identifier }) => {
                return Ok(Some(match self.keys.delete(*id) {
                    Ok(_) => {
                        let save = self.saved();
                        emit(self.action_tx.as_ref(), save);
                        Action::Notify(Notification::success(format!("Key {identifier} deleted")))
                    }
                    Err(e) => Action::Notify(Notification::error(e.to_string())),
                }));
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let inner = render_screen_block(frame, area, "Keys");
        let layout = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

        let search = match &self.search_input {
            Some(input) => input.line(&format!("  {}:", self.search.label())),
            None => Line::from(vec![
                Span::styled(format!("  {}: ", self.search.label()), theme::key_hint()),
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

        let reverse = if self.keys.reverse_identifier_check {
            Span::styled("On", theme::success_text())
        } else {
            Span::styled("Off", theme::key_hint())
        };
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("  Reverse identifier check: ", theme::key_hint()),
                reverse,
            ])),
            layout[1],
        );

        let cursor = self.table_state.selected().unwrap_or(0);
        let offset = self.paginator.offset();
        let header =
            Row::new(vec!["#", "Apartment", "Identifier", "Name"]).style(theme::table_header());
        let rows: Vec<Row> = self
            .page_items()
            .iter()
            .enumerate()
            .map(|(i, k)| {
                Row::new(vec![
                    Cell::from((offset + i + 1).to_string()),
                    Cell::from(k.apartment.clone()),
                    Cell::from(k.identifier.clone()),
                    Cell::from(k.name.clone().unwrap_or_default()),
                ])
                .style(if i == cursor {
                    theme::table_selected()
                } else {
                    theme::table_row()
                })
            })
            .collect();
        let widths = [
            Constraint::Length(5),
            Constraint::Length(11),
            Constraint::Fill(2),
            Constraint::Fill(1),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(theme::table_selected());
        let mut state = self.table_state;
        frame.render_stateful_widget(table, layout[2], &mut state);

        frame.render_widget(
            Paragraph::new(pager_line(&self.paginator, self.filtered.len())),
            layout[3],
        );
        frame.render_widget(
            Paragraph::new(hint_line(&[
                ("/", "search"),
                ("f", "field"),
                ("h/l g/G", "page"),
                ("e", "edit"),
                ("m", "manual"),
                ("a", "add"),
                ("d", "delete"),
                ("r", "reverse"),
                ("i/x", "CSV"),
            ])),
            layout[4],
        );

        match &self.modal {
            Some(Modal::Edit { id, form }) => {
                let title = if id.is_some() { "Edit key" } else { "Add key" };
                let body = render_modal(frame, centered(area, 56, 9), title);
                let parts =
                    Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).split(body);
                form.render(frame, parts[0]);
                frame.render_widget(Paragraph::new(hint_line(FORM_HINTS)), parts[1]);
            }
            Some(Modal::Add(modal)) => render_add_modal(frame, area, modal),
            None => {}
        }
    }

    fn captures_input(&self) -> bool {
        self.modal.is_some() || self.search_input.is_some()
    }

    fn id(&self) -> &'static str {
        "Keys"
    }
}

fn render_add_modal(frame: &mut Frame, area: Rect, modal: &AddKeyModal) {
    let step = modal.flow.step();
    let body = render_modal(frame, centered(area, 64, 18), step.title());
    let parts = Layout::vertical([
        Constraint::Min(3),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .split(body);

    match step {
        AddKeyStep::Entrance => {
            let options: Vec<(String, String)> = AddKeyFlow::entrances()
                .map(|e| (e, String::new()))
                .collect();
            render_option_list(frame, parts[0], &options, modal.entrance_cursor);
        }
        AddKeyStep::Apartment => {
            let lines: Vec<Line> = AddKeyFlow::apartments()
                .collect::<Vec<_>>()
                .chunks(usize::from(PICKER_COLUMNS))
                .map(|row| {
                    Line::from(
                        row.iter()
                            .map(|n| {
                                let style = if *n == modal.apartment_cursor {
                                    theme::tab_active()
                                } else {
                                    theme::tab_inactive()
                                };
                                Span::styled(format!(" {n:>3} "), style)
                            })
                            .collect::<Vec<_>>(),
                    )
                })
                .collect();
            frame.render_widget(Paragraph::new(lines), parts[0]);
        }
        AddKeyStep::Nfc => {
            let (text, style) = match modal.flow.nfc() {
                NfcState::Idle => ("Press Enter and hold the key to the reader", theme::key_hint()),
                NfcState::Reading => (
                    "Reading… hold the key to the reader",
                    Style::default()
                        .fg(theme::ELECTRIC_YELLOW)
                        .add_modifier(Modifier::BOLD),
                ),
                NfcState::Failed => ("Read failed. Press r to try again", theme::error_text()),
                NfcState::Read(_) => ("Key read", theme::success_text()),
            };
            frame.render_widget(
                Paragraph::new(vec![Line::from(""), Line::from(Span::styled(text, style))])
                    .alignment(Alignment::Center),
                parts[0],
            );
        }
        AddKeyStep::Name => {
            let identifier = modal.flow.scanned_identifier().unwrap_or_default();
            frame.render_widget(
                Paragraph::new(vec![
                    Line::from(vec![
                        Span::styled("  Identifier ", theme::key_hint()),
                        Span::styled(identifier.to_owned(), Style::default().fg(theme::NEON_CYAN)),
                    ]),
                    Line::from(""),
                    modal.name.line("  Name"),
                ]),
                parts[0],
            );
        }
    }

    if let Some(err) = &modal.error {
        frame.render_widget(
            Paragraph::new(Span::styled(format!("  ✗ {err}"), theme::error_text())),
            parts[1],
        );
    }
    let hints = match step {
        AddKeyStep::Entrance => hint_line(&[("j/k", "move"), ("Enter", "select"), ("Esc", "close")]),
        AddKeyStep::Apartment => hint_line(&[("hjkl", "move"), ("Enter", "select"), ("Esc", "back")]),
        AddKeyStep::Nfc => hint_line(&[("Enter", "read"), ("Esc", "back")]),
        AddKeyStep::Name => hint_line(&[("Enter", "save"), ("Ctrl+R", "rescan"), ("Esc", "back")]),
    };
    frame.render_widget(Paragraph::new(hints), parts[2]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::screens::testing::{Harness, ctrl, drain, key, mount};

    fn type_text(screen: &mut KeysScreen, text: &str) {
        for c in text.chars() {
            screen.handle_key_event(key(KeyCode::Char(c))).ok();
        }
    }

    #[test]
    fn search_follows_the_selected_field() {
        let harness = Harness::default();
        let mut screen = KeysScreen::new(&harness.ctx());
        assert_eq!(screen.filtered.len(), 8);

        screen.handle_key_event(key(KeyCode::Char('/'))).ok();
        type_text(&mut screen, "d1");
        assert_eq!(screen.filtered.len(), 2);

        screen.handle_key_event(key(KeyCode::Enter)).ok();
        screen.handle_key_event(key(KeyCode::Char('f'))).ok();
        assert_eq!(screen.search, KeySearch::Apartment);
        assert!(screen.filtered.is_empty());

        screen.handle_key_event(key(KeyCode::Char('/'))).ok();
        screen.handle_key_event(key(KeyCode::Esc)).ok();
        assert_eq!(screen.filtered.len(), 8);
    }

    #[test]
    fn manual_add_requires_both_fields() {
        let harness = Harness::default();
        let mut screen = KeysScreen::new(&harness.ctx());
        screen.handle_key_event(key(KeyCode::Char('m'))).ok();
        type_text(&mut screen, "12");

        assert!(screen.handle_key_event(ctrl('s')).ok().flatten().is_none());
        let Some(Modal::Edit { form, .. }) = &screen.modal else {
            panic!("expected the key form");
        };
        assert_eq!(form.error(), Some("Fill in all fields"));

        screen.handle_key_event(key(KeyCode::Tab)).ok();
        type_text(&mut screen, "0000ABCDEF");
        let saved = screen.handle_key_event(ctrl('s')).ok().flatten();
        assert!(matches!(saved, Some(Action::SavePanel(_))));
        assert!(screen.modal.is_none());
        assert_eq!(screen.keys.keys().len(), 9);
    }

    #[test]
    fn delete_saves_then_notifies() {
        let harness = Harness::default();
        let mut screen = KeysScreen::new(&harness.ctx());
        let mut rx = mount(&mut screen);

        let Some(Action::ShowConfirm(confirm)) =
            screen.handle_key_event(key(KeyCode::Char('d'))).ok().flatten()
        else {
            panic!("expected a confirmation");
        };
        let notice = screen.update(&Action::Confirmed(confirm)).ok().flatten();

        assert!(matches!(
            notice,
            Some(Action::Notify(ref n)) if n.message == "Key 00000030F5304E deleted"
        ));
        assert!(matches!(drain(&mut rx).as_slice(), [Action::SavePanel(_)]));
        assert_eq!(screen.filtered.len(), 7);
    }

    #[tokio::test]
    async fn guided_add_reads_and_registers_a_key() {
        let harness = Harness::default();
        let mut screen = KeysScreen::new(&harness.ctx());
        let mut rx = mount(&mut screen);

        screen.handle_key_event(key(KeyCode::Char('a'))).ok();
        screen.handle_key_event(key(KeyCode::Char('2'))).ok();
        screen.handle_key_event(key(KeyCode::Right)).ok();
        screen.handle_key_event(key(KeyCode::Down)).ok();
        screen.handle_key_event(key(KeyCode::Enter)).ok();

        let Some(Modal::Add(modal)) = &screen.modal else {
            panic!("expected the add flow");
        };
        assert_eq!(modal.flow.entrance(), Some(2));
        assert_eq!(modal.flow.apartment(), Some(12));
        assert_eq!(*modal.flow.nfc(), NfcState::Reading);

        let read = rx.recv().await;
        let Some(read @ Action::KeyRead(_)) = read else {
            panic!("expected a key read");
        };
        screen.update(&read).ok();

        type_text(&mut screen, "Front door");
        let notice = screen.handle_key_event(key(KeyCode::Enter)).ok().flatten();
        assert!(matches!(
            notice,
            Some(Action::Notify(ref n)) if n.message == "Key Front door added"
        ));
        assert!(screen.modal.is_none());

        let added = screen.keys.keys().last().cloned();
        assert_eq!(
            added.map(|k| (k.apartment, k.identifier, k.name)),
            Some(("12".into(), "04A1B2C3D4E5F6".into(), Some("Front door".into())))
        );
        assert!(matches!(drain(&mut rx).as_slice(), [Action::SavePanel(_)]));
    }
}
