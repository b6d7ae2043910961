//! Firmware update from an HTTP or FTP server.

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use secrecy::SecretString;
use strum::IntoEnumIterator;
use tracing::info;

use intercfg_core::settings::system::CURRENT_FIRMWARE;
use intercfg_core::settings::{FirmwareUpdate, UpdateMethod};

use super::render_form_screen;
use crate::action::{Action, ConfirmAction, Notification};
use crate::component::Component;
use crate::widgets::form::{Field, Form, FormEvent};

pub struct UpdateScreen {
    form: Form,
    methods: Vec<UpdateMethod>,
}

impl Default for UpdateScreen {
    fn default() -> Self {
        let methods: Vec<UpdateMethod> = UpdateMethod::iter().collect();
        let request = FirmwareUpdate::default();
        let mut screen = Self {
            form: Form::new(vec![
                Field::readonly("current", "Current firmware", CURRENT_FIRMWARE),
                Field::choice("method", "Method", &methods, 0),
                Field::readonly("template", "Path format", request.method.template()),
                Field::text("path", "Server folder path", request.server_path),
                Field::text("file", "File name", request.file_name),
                Field::text("login", "Login", request.login),
                Field::masked("password", "Password", ""),
                Field::button("start", "Start update"),
            ]),
            methods,
        };
        screen.sync_method();
        screen
    }
}

impl UpdateScreen {
    fn method(&self) -> UpdateMethod {
        self.methods
            .get(self.form.choice("method"))
            .copied()
            .unwrap_or_default()
    }

    /// Credentials only apply to FTP; the path hint follows the method.
    fn sync_method(&mut self) {
        let method = self.method();
        self.form.set_text("template", method.template());
        let ftp = method == UpdateMethod::Ftp;
        self.form.set_visible("login", ftp);
        self.form.set_visible("password", ftp);
    }

    fn request(&self) -> FirmwareUpdate {
        FirmwareUpdate {
            method: self.method(),
            server_path: self.form.text("path").to_owned(),
            file_name: self.form.text("file").to_owned(),
            login: self.form.text("login").to_owned(),
            password: SecretString::from(self.form.text("password").to_owned()),
        }
    }

    fn start(&mut self) -> Option<Action> {
        match self.request().validate() {
            Ok(()) => Some(Action::ShowConfirm(ConfirmAction::StartFirmwareUpdate)),
            Err(e) => {
                self.form.set_error(Some(e.to_string()));
                None
            }
        }
    }
}

impl Component for UpdateScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        Ok(match self.form.handle_key(key) {
            FormEvent::Submit | FormEvent::Pressed("start") => self.start(),
            FormEvent::Cancel => Some(Action::GoBack),
            FormEvent::Edited("method") => {
                self.sync_method();
                None
            }
            _ => None,
        })
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::Confirmed(ConfirmAction::StartFirmwareUpdate) = action {
            let request = self.request();
            info!(
                method = %request.method,
                path = %request.server_path,
                file = %request.file_name,
                "firmware update started"
            );
            return Ok(Some(Action::Notify(Notification::info(
                "Firmware update started",
            ))));
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        render_form_screen(frame, area, "Firmware update", &self.form);
    }

    fn captures_input(&self) -> bool {
        true
    }

    fn id(&self) -> &'static str {
        "Firmware update"
    }
}
