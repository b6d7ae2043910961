//! Door behaviour at the entrance.

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;

use intercfg_core::PanelUpdate;
use intercfg_core::settings::EntranceSettings;

use super::render_form_screen;
use crate::action::Action;
use crate::component::Component;
use crate::context::ScreenContext;
use crate::widgets::form::{Field, Form, FormEvent};

pub struct EntranceScreen {
    form: Form,
}

impl EntranceScreen {
    pub fn new(ctx: &ScreenContext<'_>) -> Self {
        let s = ctx.panel.entrance;
        Self {
            form: Form::new(vec![
                Field::toggle("always_open", "Doors always open", s.doors_always_open),
                Field::toggle(
                    "network_failure",
                    "Open doors on network failure",
                    s.open_on_network_failure,
                ),
                Field::button("save", "Save"),
            ]),
        }
    }

    fn draft(&self) -> EntranceSettings {
        EntranceSettings {
            doors_always_open: self.form.toggle("always_open"),
            open_on_network_failure: self.form.toggle("network_failure"),
        }
    }
}

impl Component for EntranceScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        Ok(match self.form.handle_key(key) {
            FormEvent::Submit | FormEvent::Pressed("save") => {
                Some(Action::save(PanelUpdate::Entrance(self.draft())))
            }
            FormEvent::Cancel => Some(Action::GoBack),
            _ => None,
        })
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        render_form_screen(frame, area, "Entrance", &self.form);
    }

    fn captures_input(&self) -> bool {
        true
    }

    fn id(&self) -> &'static str {
        "Entrance"
    }
}
