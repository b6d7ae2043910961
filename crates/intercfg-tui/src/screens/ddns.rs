//! Dynamic DNS client settings.

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use secrecy::{ExposeSecret, SecretString};

use intercfg_core::PanelUpdate;
use intercfg_core::settings::DdnsSettings;

use super::render_form_screen;
use crate::action::Action;
use crate::component::Component;
use crate::context::ScreenContext;
use crate::widgets::form::{Field, Form, FormEvent};

/// Fields shown only while DDNS is enabled.
const DETAIL_FIELDS: [&str; 6] = ["interval", "port", "server", "login", "password", "hostname"];

pub struct DdnsScreen {
    form: Form,
}

impl DdnsScreen {
    pub fn new(ctx: &ScreenContext<'_>) -> Self {
        let d = &ctx.panel.ddns;
        let mut screen = Self {
            form: Form::new(vec![
                Field::toggle("enabled", "DDNS enabled", d.enabled),
                Field::number("interval", "Request interval (s)", d.interval_secs.clone()),
                Field::number("port", "Port", d.port.clone()),
                Field::text("server", "Server address", d.server.clone()),
                Field::text("login", "Login", d.login.clone()),
                Field::masked("password", "Password", d.password.expose_secret()),
                Field::text("hostname", "Hostname", d.hostname.clone()),
                Field::button("save", "Save"),
            ]),
        };
        screen.sync_visibility();
        screen
    }

    fn sync_visibility(&mut self) {
        let enabled = self.form.toggle("enabled");
        for key in DETAIL_FIELDS {
            self.form.set_visible(key, enabled);
        }
    }

    fn draft(&self) -> DdnsSettings {
        DdnsSettings {
            enabled: self.form.toggle("enabled"),
            interval_secs: self.form.text("interval").to_owned(),
            port: self.form.text("port").to_owned(),
            server: self.form.text("server").to_owned(),
            login: self.form.text("login").to_owned(),
            password: SecretString::from(self.form.text("password").to_owned()),
            hostname: self.form.text("hostname").to_owned(),
        }
    }

    fn submit(&mut self) -> Option<Action> {
        let draft = self.draft();
        match draft.validate() {
            Ok(()) => Some(Action::save(PanelUpdate::Ddns(draft))),
            Err(e) => {
                self.form.set_error(Some(e.to_string()));
                None
            }
        }
    }
}

impl Component for DdnsScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        Ok(match self.form.handle_key(key) {
            FormEvent::Submit | FormEvent::Pressed("save") => self.submit(),
            FormEvent::Cancel => Some(Action::GoBack),
            FormEvent::Edited("enabled") => {
                self.sync_visibility();
                None
            }
            _ => None,
        })
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        render_form_screen(frame, area, "DDNS", &self.form);
    }

    fn captures_input(&self) -> bool {
        true
    }

    fn id(&self) -> &'static str {
        "DDNS"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyCode;
    use pretty_assertions::assert_eq;

    use crate::screens::testing::{Harness, ctrl, key};

    #[test]
    fn enabling_reveals_fields_and_requires_a_password() {
        let harness = Harness::default();
        let mut screen = DdnsScreen::new(&harness.ctx());

        // Disabled by default: Tab jumps straight to Save.
        screen.handle_key_event(key(KeyCode::Tab)).ok();
        assert_eq!(screen.form.focused_key(), Some("save"));
        screen.handle_key_event(key(KeyCode::BackTab)).ok();

        screen.handle_key_event(key(KeyCode::Char(' '))).ok();
        screen.handle_key_event(key(KeyCode::Tab)).ok();
        assert_eq!(screen.form.focused_key(), Some("interval"));

        assert!(screen.handle_key_event(ctrl('s')).ok().flatten().is_none());
        assert_eq!(screen.form.error(), Some("Password is required"));
    }
}
