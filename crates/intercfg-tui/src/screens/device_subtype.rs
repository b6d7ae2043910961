//! Wizard step 2: mounting position within the chosen device type.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::text::Span;
use ratatui::widgets::{Paragraph, TableState};
use tokio::sync::mpsc::UnboundedSender;

use intercfg_core::{DeviceSubtype, DeviceType, StoreCommand};

use super::emit;
use crate::action::Action;
use crate::component::Component;
use crate::context::ScreenContext;
use crate::screen::ScreenId;
use crate::theme;
use crate::widgets::hints::hint_line;
use crate::widgets::option_list::render_option_list;
use crate::widgets::popup::render_screen_block;
use crate::widgets::selection;

pub struct DeviceSubtypeScreen {
    device_type: Option<DeviceType>,
    subtypes: &'static [DeviceSubtype],
    /// Devices in the catalog per subtype, for the detail line.
    counts: Vec<usize>,
    table_state: TableState,
    action_tx: Option<UnboundedSender<Action>>,
}

impl DeviceSubtypeScreen {
    pub fn new(ctx: &ScreenContext<'_>) -> Self {
        let device_type = ctx.store.selection.device_type;
        let subtypes = device_type.map_or(&[][..], DeviceType::subtypes);
        let counts = subtypes
            .iter()
            .map(|s| ctx.store.devices.iter().filter(|d| d.subtype == *s).count())
            .collect();
        let current = ctx
            .store
            .selection
            .device_subtype
            .and_then(|s| subtypes.iter().position(|x| *x == s))
            .unwrap_or(0);
        Self {
            device_type,
            subtypes,
            counts,
            table_state: TableState::default().with_selected(Some(current)),
            action_tx: None,
        }
    }

    fn choose(&self) -> Option<Action> {
        let subtype = *self.subtypes.get(self.table_state.selected()?)?;
        emit(
            self.action_tx.as_ref(),
            Action::Store(StoreCommand::SetDeviceSubtype(subtype)),
        );
        Some(Action::Navigate(ScreenId::DeviceList))
    }
}

impl Component for DeviceSubtypeScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let len = self.subtypes.len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => selection::select_next(&mut self.table_state, len),
            KeyCode::Char('k') | KeyCode::Up => selection::select_prev(&mut self.table_state, len),
            KeyCode::Enter | KeyCode::Char(' ') => return Ok(self.choose()),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let title = self.device_type.map_or_else(
            || "Select subtype".to_owned(),
            |t| format!("Select subtype · {}", t.label()),
        );
        let inner = render_screen_block(frame, area, &title);
        let layout = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(inner);

        if self.subtypes.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled("Select a device type first", theme::key_hint()))
                    .alignment(Alignment::Center),
                layout[1],
            );
        } else {
            let options: Vec<(String, String)> = self
                .subtypes
                .iter()
                .zip(&self.counts)
                .map(|(s, n)| (s.label().to_owned(), format!("{n} devices in the catalog")))
                .collect();
            render_option_list(
                frame,
                layout[1],
                &options,
                self.table_state.selected().unwrap_or(0),
            );
        }

        frame.render_widget(
            Paragraph::new(hint_line(&[("j/k", "move"), ("Enter", "select"), ("Esc", "back")])),
            layout[2],
        );
    }

    fn id(&self) -> &'static str {
        "Device subtype"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::testing::{Harness, drain, key, mount};

    #[test]
    fn offers_only_subtypes_of_the_chosen_type() {
        let mut harness = Harness::default();
        harness
            .store
            .apply(StoreCommand::SetDeviceType(DeviceType::Camera));
        let mut screen = DeviceSubtypeScreen::new(&harness.ctx());
        let mut rx = mount(&mut screen);

        assert_eq!(
            screen.subtypes,
            &[DeviceSubtype::External, DeviceSubtype::Internal]
        );
        let nav = screen.handle_key_event(key(KeyCode::Enter)).ok().flatten();
        assert!(matches!(
            drain(&mut rx).as_slice(),
            [Action::Store(StoreCommand::SetDeviceSubtype(DeviceSubtype::External))]
        ));
        assert!(matches!(nav, Some(Action::Navigate(ScreenId::DeviceList))));
    }

    #[test]
    fn nothing_to_choose_without_a_type() {
        let harness = Harness::default();
        let mut screen = DeviceSubtypeScreen::new(&harness.ctx());
        assert!(screen.handle_key_event(key(KeyCode::Enter)).ok().flatten().is_none());
    }
}
