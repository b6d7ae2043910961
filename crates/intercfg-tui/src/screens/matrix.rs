//! Coordinate switching matrix, one 10×10 grid per analog switch.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table};
use tracing::info;

use intercfg_core::PanelUpdate;
use intercfg_core::intercom::matrix::{GRID, SWITCH_COUNT};
use intercfg_core::intercom::{ApartmentRange, Matrix, MatrixBoard};

use crate::action::{Action, Notification};
use crate::component::Component;
use crate::context::ScreenContext;
use crate::theme;
use crate::widgets::form::{Field, Form, FormEvent};
use crate::widgets::hints::{FORM_HINTS, hint_line};
use crate::widgets::line_input::{InputEvent, LineInput};
use crate::widgets::popup::{centered, render_modal, render_screen_block};
use crate::widgets::sub_tabs::render_sub_tabs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RangeOp {
    HandsetCheck,
    AutoSetup,
}

impl RangeOp {
    fn title(self) -> &'static str {
        match self {
            Self::HandsetCheck => "Analog handset check",
            Self::AutoSetup => "Auto-setup",
        }
    }

    fn started(self, range: ApartmentRange) -> String {
        match self {
            Self::HandsetCheck => {
                format!("Analog handset check started for apartments {range}")
            }
            Self::AutoSetup => format!("Auto-setup started for apartments {range}"),
        }
    }
}

struct RangeModal {
    op: RangeOp,
    form: Form,
}

pub struct MatrixScreen {
    board: MatrixBoard,
    row: usize,
    col: usize,
    editing: Option<LineInput>,
    range: Option<RangeModal>,
    error: Option<String>,
}

impl MatrixScreen {
    pub fn new(ctx: &ScreenContext<'_>) -> Self {
        Self {
            board: ctx.panel.matrix.clone(),
            row: 0,
            col: 0,
            editing: None,
            range: None,
            error: None,
        }
    }

    fn open_range(&mut self, op: RangeOp) {
        self.range = Some(RangeModal {
            op,
            form: Form::new(vec![
                Field::number("first", "First apartment", ""),
                Field::number("last", "Last apartment", ""),
                Field::button("start", "Start"),
            ]),
        });
    }

    fn handle_range_key(&mut self, key: KeyEvent) -> Option<Action> {
        let modal = self.range.as_mut()?;
        match modal.form.handle_key(key) {
            FormEvent::Submit | FormEvent::Pressed("start") => {
                match ApartmentRange::parse(modal.form.text("first"), modal.form.text("last")) {
                    Ok(range) => {
                        let op = modal.op;
                        self.range = None;
                        info!(operation = op.title(), %range, "analog operation started");
                        return Some(Action::Notify(Notification::info(op.started(range))));
                    }
                    Err(e) => modal.form.set_error(Some(e.to_string())),
                }
            }
            FormEvent::Cancel => self.range = None,
            _ => {}
        }
        None
    }

    fn handle_cell_key(&mut self, key: KeyEvent) -> Option<Action> {
        let input = self.editing.as_mut()?;
        match input.handle_key(key) {
            InputEvent::Submit => {
                let value = input.value().to_owned();
                self.editing = None;
                match self.board.edit_cell(self.row, self.col, &value) {
                    Ok(()) => return Some(Action::save(PanelUpdate::Matrix(self.board.clone()))),
                    Err(e) => self.error = Some(e.to_string()),
                }
            }
            InputEvent::Cancel => self.editing = None,
            InputEvent::Changed | InputEvent::None => {}
        }
        None
    }
}

impl Component for MatrixScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.range.is_some() {
            return Ok(self.handle_range_key(key));
        }
        if self.editing.is_some() {
            return Ok(self.handle_cell_key(key));
        }

        self.error = None;
        match key.code {
            KeyCode::Char('h') | KeyCode::Left => self.col = self.col.saturating_sub(1),
            KeyCode::Char('l') | KeyCode::Right => self.col = (self.col + 1).min(GRID - 1),
            KeyCode::Char('k') | KeyCode::Up => self.row = self.row.saturating_sub(1),
            KeyCode::Char('j') | KeyCode::Down => self.row = (self.row + 1).min(GRID - 1),
            KeyCode::Char(c @ '1'..='9') => {
                if let Some(n) = c.to_digit(10).and_then(|d| usize::try_from(d).ok()) {
                    self.board.select_switch(n);
                }
            }
            KeyCode::Char('e') => {
                self.board.edit_mode = !self.board.edit_mode;
                return Ok(Some(Action::save(PanelUpdate::Matrix(self.board.clone()))));
            }
            KeyCode::Enter => {
                if self.board.edit_mode {
                    let current = self.board.current().cell(self.row, self.col).unwrap_or_default();
                    self.editing = Some(LineInput::new(current).digits(4));
                } else {
                    self.error = Some("Enable edit mode to change cells".into());
                }
            }
            KeyCode::Char('c') => self.open_range(RangeOp::HandsetCheck),
            KeyCode::Char('u') => self.open_range(RangeOp::AutoSetup),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let inner = render_screen_block(frame, area, "Matrix");
        let layout = Layout::vertical([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Min(12),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

        let labels: Vec<String> = (1..=SWITCH_COUNT).map(|n| format!("Switch {n}")).collect();
        frame.render_widget(
            Paragraph::new(render_sub_tabs(&labels, self.board.selected_switch() - 1)),
            layout[0],
        );

        let mode = if self.board.edit_mode {
            Span::styled("Editing", theme::success_text())
        } else {
            Span::styled("View only", theme::key_hint())
        };
        frame.render_widget(
            Paragraph::new(Line::from(vec![Span::styled("  Mode: ", theme::key_hint()), mode])),
            layout[1],
        );

        let matrix = self.board.current();
        let mut header = vec![Cell::from("")];
        header.extend((0..GRID).map(|c| Cell::from(Matrix::col_label(c))));
        let cursor_style = Style::default()
            .fg(theme::BG_DARK)
            .bg(theme::NEON_CYAN)
            .add_modifier(Modifier::BOLD);
        let rows: Vec<Row> = matrix
            .rows()
            .enumerate()
            .map(|(r, cells)| {
                let mut row = vec![Cell::from(Matrix::row_label(r)).style(theme::table_header())];
                row.extend(cells.iter().enumerate().map(|(c, value)| {
                    let at_cursor = (r, c) == (self.row, self.col);
                    match &self.editing {
                        Some(input) if at_cursor => {
                            Cell::from(format!("{}▏", input.value())).style(cursor_style)
                        }
                        _ if at_cursor => Cell::from(value.clone()).style(cursor_style),
                        _ => Cell::from(value.clone()).style(theme::table_row()),
                    }
                }));
                Row::new(row)
            })
            .collect();
        let widths = std::iter::once(Constraint::Length(4))
            .chain(std::iter::repeat_n(Constraint::Length(5), GRID));
        frame.render_widget(
            Table::new(rows, widths).header(Row::new(header).style(theme::table_header())),
            layout[2],
        );

        if let Some(err) = &self.error {
            frame.render_widget(
                Paragraph::new(Span::styled(format!("  ✗ {err}"), theme::error_text())),
                layout[3],
            );
        }
        let hints = if self.editing.is_some() {
            hint_line(&[("0-9", "number"), ("Enter", "apply"), ("Esc", "cancel")])
        } else {
            hint_line(&[
                ("1-4", "switch"),
                ("hjkl", "move"),
                ("e", "edit mode"),
                ("Enter", "edit cell"),
                ("c", "handset check"),
                ("u", "auto-setup"),
            ])
        };
        frame.render_widget(Paragraph::new(hints), layout[4]);

        if let Some(modal) = &self.range {
            let body = render_modal(frame, centered(area, 50, 8), modal.op.title());
            let parts =
                Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).split(body);
            modal.form.render(frame, parts[0]);
            frame.render_widget(Paragraph::new(hint_line(FORM_HINTS)), parts[1]);
        }
    }

    fn captures_input(&self) -> bool {
        self.editing.is_some() || self.range.is_some()
    }

    fn id(&self) -> &'static str {
        "Matrix"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::screens::testing::{Harness, ctrl, key};

    #[test]
    fn cells_edit_only_in_edit_mode() {
        let harness = Harness::default();
        let mut screen = MatrixScreen::new(&harness.ctx());
        screen.handle_key_event(key(KeyCode::Char('2'))).ok();
        screen.handle_key_event(key(KeyCode::Down)).ok();

        screen.handle_key_event(key(KeyCode::Enter)).ok();
        assert!(screen.editing.is_none());
        assert_eq!(screen.error.as_deref(), Some("Enable edit mode to change cells"));

        screen.handle_key_event(key(KeyCode::Char('e'))).ok();
        screen.handle_key_event(key(KeyCode::Enter)).ok();
        screen.handle_key_event(key(KeyCode::Backspace)).ok();
        screen.handle_key_event(key(KeyCode::Char('5'))).ok();
        screen.handle_key_event(key(KeyCode::Char('x'))).ok();
        let saved = screen.handle_key_event(key(KeyCode::Enter)).ok().flatten();

        assert!(matches!(saved, Some(Action::SavePanel(_))));
        assert_eq!(screen.board.selected_switch(), 2);
        assert_eq!(screen.board.current().cell(1, 0), Some("5"));
        screen.handle_key_event(key(KeyCode::Char('1'))).ok();
        assert_eq!(screen.board.current().cell(1, 0), Some("1"));
    }

    #[test]
    fn range_must_be_ordered() {
        let harness = Harness::default();
        let mut screen = MatrixScreen::new(&harness.ctx());
        screen.handle_key_event(key(KeyCode::Char('u'))).ok();
        screen.handle_key_event(key(KeyCode::Char('9'))).ok();
        screen.handle_key_event(key(KeyCode::Tab)).ok();
        screen.handle_key_event(key(KeyCode::Char('3'))).ok();

        assert!(screen.handle_key_event(ctrl('s')).ok().flatten().is_none());
        assert_eq!(
            screen.range.as_ref().and_then(|m| m.form.error()),
            Some("The first apartment must not exceed the last")
        );

        screen.handle_key_event(key(KeyCode::Char('0'))).ok();
        let notice = screen.handle_key_event(ctrl('s')).ok().flatten();
        assert!(matches!(
            notice,
            Some(Action::Notify(ref n)) if n.message == "Auto-setup started for apartments 9-30"
        ));
        assert!(screen.range.is_none());
    }
}
