//! Wizard step 1: the kind of device to configure.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::widgets::{Paragraph, TableState};
use strum::IntoEnumIterator;
use tokio::sync::mpsc::UnboundedSender;

use intercfg_core::{DeviceType, StoreCommand};

use super::emit;
use crate::action::Action;
use crate::component::Component;
use crate::context::ScreenContext;
use crate::screen::ScreenId;
use crate::widgets::hints::hint_line;
use crate::widgets::option_list::render_option_list;
use crate::widgets::popup::render_screen_block;
use crate::widgets::selection;

pub struct DeviceTypeScreen {
    types: Vec<DeviceType>,
    table_state: TableState,
    action_tx: Option<UnboundedSender<Action>>,
}

impl DeviceTypeScreen {
    pub fn new(ctx: &ScreenContext<'_>) -> Self {
        let types: Vec<DeviceType> = DeviceType::iter().collect();
        let current = ctx
            .store
            .selection
            .device_type
            .and_then(|t| types.iter().position(|x| *x == t))
            .unwrap_or(0);
        Self {
            types,
            table_state: TableState::default().with_selected(Some(current)),
            action_tx: None,
        }
    }

    fn choose(&self) -> Option<Action> {
        let ty = *self.types.get(self.table_state.selected()?)?;
        emit(
            self.action_tx.as_ref(),
            Action::Store(StoreCommand::SetDeviceType(ty)),
        );
        Some(Action::Navigate(ScreenId::DeviceSubtype))
    }
}

impl Component for DeviceTypeScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let len = self.types.len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => selection::select_next(&mut self.table_state, len),
            KeyCode::Char('k') | KeyCode::Up => selection::select_prev(&mut self.table_state, len),
            KeyCode::Enter | KeyCode::Char(' ') => return Ok(self.choose()),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let inner = render_screen_block(frame, area, "Select device type");
        let layout = Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).split(inner);

        let options: Vec<(String, String)> = self
            .types
            .iter()
            .map(|t| {
                let subtypes: Vec<&str> = t.subtypes().iter().map(|s| s.label()).collect();
                (t.label().to_owned(), subtypes.join(", "))
            })
            .collect();
        let mut list_area = layout[0];
        list_area.y = list_area.y.saturating_add(1);
        list_area.height = list_area.height.saturating_sub(1);
        render_option_list(
            frame,
            list_area,
            &options,
            self.table_state.selected().unwrap_or(0),
        );

        frame.render_widget(
            Paragraph::new(hint_line(&[("j/k", "move"), ("Enter", "select"), ("Esc", "back")])),
            layout[1],
        );
    }

    fn id(&self) -> &'static str {
        "Device type"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::testing::{Harness, drain, key, mount};

    #[test]
    fn choosing_queues_the_store_command_before_navigating() {
        let harness = Harness::default();
        let mut screen = DeviceTypeScreen::new(&harness.ctx());
        let mut rx = mount(&mut screen);

        screen.handle_key_event(key(KeyCode::Down)).ok();
        let nav = screen.handle_key_event(key(KeyCode::Enter)).ok().flatten();

        let queued = drain(&mut rx);
        assert!(matches!(
            queued.as_slice(),
            [Action::Store(StoreCommand::SetDeviceType(DeviceType::Camera))]
        ));
        assert!(matches!(nav, Some(Action::Navigate(ScreenId::DeviceSubtype))));
    }

    #[test]
    fn cursor_starts_on_the_current_selection() {
        let mut harness = Harness::default();
        harness
            .store
            .apply(StoreCommand::SetDeviceType(DeviceType::Camera));
        let screen = DeviceTypeScreen::new(&harness.ctx());
        assert_eq!(screen.table_state.selected(), Some(1));
    }
}
