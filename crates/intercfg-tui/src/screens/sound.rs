//! Panel-wide volumes for the analog and SIP paths.

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;

use intercfg_core::PanelUpdate;
use intercfg_core::settings::{LEVEL_MAX, SoundSettings};

use super::render_form_screen;
use crate::action::Action;
use crate::component::Component;
use crate::context::ScreenContext;
use crate::widgets::form::{Field, Form, FormEvent};

pub struct SoundScreen {
    form: Form,
}

impl SoundScreen {
    pub fn new(ctx: &ScreenContext<'_>) -> Self {
        let s = &ctx.panel.sound;
        Self {
            form: Form::new(vec![
                Field::heading("System"),
                Field::level("system", "System volume", s.system_volume, LEVEL_MAX),
                Field::toggle("door_sounds", "Door open sounds", s.door_sounds),
                Field::heading("Analog handset"),
                Field::level("analog_ring", "Ring volume", s.analog_ring_volume, LEVEL_MAX),
                Field::level(
                    "analog_conversation",
                    "Conversation volume",
                    s.analog_conversation_volume,
                    LEVEL_MAX,
                ),
                Field::level("analog_panel", "Panel volume", s.analog_panel_volume, LEVEL_MAX),
                Field::heading("SIP"),
                Field::level("sip_mic", "Microphone gain", s.sip_mic_gain, LEVEL_MAX),
                Field::level("sip_panel", "Panel volume", s.sip_panel_volume, LEVEL_MAX),
                Field::level("sip_gate", "Gate volume", s.sip_gate_volume, LEVEL_MAX),
                Field::button("save", "Save"),
            ]),
        }
    }

    fn draft(&self) -> SoundSettings {
        SoundSettings {
            system_volume: self.form.level("system"),
            door_sounds: self.form.toggle("door_sounds"),
            analog_ring_volume: self.form.level("analog_ring"),
            analog_conversation_volume: self.form.level("analog_conversation"),
            analog_panel_volume: self.form.level("analog_panel"),
            sip_mic_gain: self.form.level("sip_mic"),
            sip_panel_volume: self.form.level("sip_panel"),
            sip_gate_volume: self.form.level("sip_gate"),
        }
    }
}

impl Component for SoundScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        Ok(match self.form.handle_key(key) {
            FormEvent::Submit | FormEvent::Pressed("save") => {
                Some(Action::save(PanelUpdate::Sound(self.draft())))
            }
            FormEvent::Cancel => Some(Action::GoBack),
            _ => None,
        })
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        render_form_screen(frame, area, "Sound", &self.form);
    }

    fn captures_input(&self) -> bool {
        true
    }

    fn id(&self) -> &'static str {
        "Sound"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyCode;
    use pretty_assertions::assert_eq;

    use crate::screens::testing::{Harness, key};

    #[test]
    fn levels_round_trip_through_the_form() {
        let harness = Harness::default();
        let mut screen = SoundScreen::new(&harness.ctx());
        assert_eq!(screen.draft(), harness.panel.sound);

        screen.handle_key_event(key(KeyCode::Left)).ok();
        assert_eq!(
            screen.draft().system_volume,
            harness.panel.sound.system_volume.saturating_sub(1)
        );
    }
}
