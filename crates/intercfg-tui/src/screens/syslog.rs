//! Remote syslog target.

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use strum::IntoEnumIterator;

use intercfg_core::PanelUpdate;
use intercfg_core::settings::{LogLevel, SyslogProtocol, SyslogSettings};

use super::render_form_screen;
use crate::action::Action;
use crate::component::Component;
use crate::context::ScreenContext;
use crate::widgets::form::{Field, Form, FormEvent};

pub struct SyslogScreen {
    form: Form,
    protocols: Vec<SyslogProtocol>,
    levels: Vec<LogLevel>,
}

impl SyslogScreen {
    pub fn new(ctx: &ScreenContext<'_>) -> Self {
        let s = &ctx.panel.syslog;
        let protocols: Vec<SyslogProtocol> = SyslogProtocol::iter().collect();
        let levels = LogLevel::all();
        let protocol_idx = protocols.iter().position(|p| *p == s.protocol).unwrap_or(0);
        let level_idx = levels.iter().position(|l| *l == s.level).unwrap_or(0);
        Self {
            form: Form::new(vec![
                Field::text("server", "Server address", s.server.clone()),
                Field::number("port", "Server port", s.port.clone()),
                Field::choice("protocol", "Protocol", &protocols, protocol_idx),
                Field::choice("level", "Log level", &levels, level_idx),
                Field::button("save", "Save"),
            ]),
            protocols,
            levels,
        }
    }

    fn draft(&self) -> SyslogSettings {
        let defaults = SyslogSettings::default();
        SyslogSettings {
            server: self.form.text("server").to_owned(),
            port: self.form.text("port").to_owned(),
            protocol: self
                .protocols
                .get(self.form.choice("protocol"))
                .copied()
                .unwrap_or(defaults.protocol),
            level: self
                .levels
                .get(self.form.choice("level"))
                .copied()
                .unwrap_or(defaults.level),
        }
    }

    fn submit(&mut self) -> Option<Action> {
        let draft = self.draft();
        match draft.validate() {
            Ok(()) => Some(Action::save(PanelUpdate::Syslog(draft))),
            Err(e) => {
                self.form.set_error(Some(e.to_string()));
                None
            }
        }
    }
}

impl Component for SyslogScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        Ok(match self.form.handle_key(key) {
            FormEvent::Submit | FormEvent::Pressed("save") => self.submit(),
            FormEvent::Cancel => Some(Action::GoBack),
            _ => None,
        })
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        render_form_screen(frame, area, "Syslog", &self.form);
    }

    fn captures_input(&self) -> bool {
        true
    }

    fn id(&self) -> &'static str {
        "Syslog"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyCode;
    use pretty_assertions::assert_eq;

    use crate::screens::testing::{Harness, ctrl, key};

    #[test]
    fn port_must_be_in_range() {
        let harness = Harness::default();
        let mut screen = SyslogScreen::new(&harness.ctx());
        screen.handle_key_event(key(KeyCode::Tab)).ok();
        for _ in 0..4 {
            screen.handle_key_event(key(KeyCode::Backspace)).ok();
        }
        screen.handle_key_event(key(KeyCode::Char('0'))).ok();

        assert!(screen.handle_key_event(ctrl('s')).ok().flatten().is_none());
        assert_eq!(screen.form.error(), Some("Server port must be between 1 and 65535"));
    }

    #[test]
    fn protocol_and_level_come_back_typed() {
        let harness = Harness::default();
        let mut screen = SyslogScreen::new(&harness.ctx());
        screen.handle_key_event(key(KeyCode::Tab)).ok();
        screen.handle_key_event(key(KeyCode::Tab)).ok();
        screen.handle_key_event(key(KeyCode::Right)).ok();
        screen.handle_key_event(key(KeyCode::Tab)).ok();
        screen.handle_key_event(key(KeyCode::Left)).ok();

        let draft = screen.draft();
        assert_eq!(draft.protocol, SyslogProtocol::Udp);
        assert_eq!(draft.level, LogLevel::Info);
    }
}
