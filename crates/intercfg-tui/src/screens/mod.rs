//! Screen implementations. Each screen is a top-level Component.

pub mod apartments;
pub mod commutator_list;
pub mod configuration_confirm;
pub mod date_time;
pub mod ddns;
pub mod device_list;
pub mod device_subtype;
pub mod device_type;
pub mod diagnostic_main;
pub mod entrance;
pub mod equalizer;
pub mod keys;
pub mod main_info;
pub mod matrix;
pub mod mode_selection;
pub mod network_settings;
pub mod port_list;
pub mod power;
pub mod running_line;
pub mod sip_account;
pub mod sound;
pub mod syslog;
pub mod update;
pub mod video_stream;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::widgets::Paragraph;
use tokio::sync::mpsc::UnboundedSender;

use crate::action::Action;
use crate::component::Component;
use crate::context::ScreenContext;
use crate::screen::ScreenId;
use crate::widgets::form::Form;
use crate::widgets::hints::{FORM_HINTS, hint_line};
use crate::widgets::popup::render_screen_block;

/// Build a fresh component for `id` from the current app state.
pub fn create_screen(id: ScreenId, ctx: &ScreenContext<'_>) -> Box<dyn Component> {
    match id {
        ScreenId::ModeSelection => Box::new(mode_selection::ModeSelectionScreen::default()),
        ScreenId::DeviceType => Box::new(device_type::DeviceTypeScreen::new(ctx)),
        ScreenId::DeviceSubtype => Box::new(device_subtype::DeviceSubtypeScreen::new(ctx)),
        ScreenId::DeviceList => Box::new(device_list::DeviceListScreen::new(ctx)),
        ScreenId::CommutatorList => Box::new(commutator_list::CommutatorListScreen::new(ctx)),
        ScreenId::PortList => Box::new(port_list::PortListScreen::new(ctx)),
        ScreenId::ConfigurationConfirm => {
            Box::new(configuration_confirm::ConfigurationConfirmScreen::new(ctx))
        }
        ScreenId::DiagnosticMain => Box::new(diagnostic_main::DiagnosticMainScreen::new(ctx)),
        ScreenId::Main => Box::new(main_info::MainInfoScreen::new(ctx)),
        ScreenId::Keys => Box::new(keys::KeysScreen::new(ctx)),
        ScreenId::Apartments => Box::new(apartments::ApartmentsScreen::new(ctx)),
        ScreenId::Matrix => Box::new(matrix::MatrixScreen::new(ctx)),
        ScreenId::Entrance => Box::new(entrance::EntranceScreen::new(ctx)),
        ScreenId::RunningLine => Box::new(running_line::RunningLineScreen::new(ctx)),
        ScreenId::Sound => Box::new(sound::SoundScreen::new(ctx)),
        ScreenId::Equalizer => Box::new(equalizer::EqualizerScreen::new(ctx)),
        ScreenId::SipAccount => Box::new(sip_account::SipAccountScreen::new(ctx)),
        ScreenId::VideoStream => Box::new(video_stream::VideoStreamScreen::new(ctx)),
        ScreenId::Ddns => Box::new(ddns::DdnsScreen::new(ctx)),
        ScreenId::NetworkSettings => {
            Box::new(network_settings::NetworkSettingsScreen::new(ctx))
        }
        ScreenId::Syslog => Box::new(syslog::SyslogScreen::new(ctx)),
        ScreenId::Update => Box::new(update::UpdateScreen::default()),
        ScreenId::DateTime => Box::new(date_time::DateTimeScreen::new(ctx)),
        ScreenId::Reboot => Box::new(power::PowerScreen::new(power::PowerAction::Reboot)),
        ScreenId::Reset => Box::new(power::PowerScreen::new(power::PowerAction::FactoryReset)),
    }
}

/// Queue `action` ahead of whatever the caller returns.
fn emit(tx: Option<&UnboundedSender<Action>>, action: Action) {
    if let Some(tx) = tx {
        let _ = tx.send(action);
    }
}

/// Titled block, the form, and the shared form hints underneath.
fn render_form_screen(frame: &mut Frame, area: Rect, title: &str, form: &Form) {
    let inner = render_screen_block(frame, area, title);
    let layout = Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).split(inner);
    form.render(frame, layout[0]);
    frame.render_widget(Paragraph::new(hint_line(FORM_HINTS)), layout[1]);
}

#[cfg(test)]
pub(crate) mod testing {
    //! Helpers shared by the screen tests.

    use std::sync::Arc;

    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use intercfg_core::{DeviceStore, PanelState, StoreSnapshot};
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    use super::*;
    use crate::context::{Sources, Timings, fixtures};

    pub fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    pub fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    /// Owned pieces a `ScreenContext` borrows from.
    pub struct Harness {
        pub store: DeviceStore,
        pub panel: PanelState,
        pub sources: Sources,
        pub timings: Timings,
    }

    impl Default for Harness {
        fn default() -> Self {
            Self {
                store: DeviceStore::default(),
                panel: PanelState::default(),
                sources: fixtures::sources(),
                timings: fixtures::timings(),
            }
        }
    }

    impl Harness {
        pub fn snapshot(&self) -> Arc<StoreSnapshot> {
            self.store.snapshot()
        }

        pub fn ctx(&self) -> ScreenContext<'_> {
            ScreenContext {
                store: self.store.snapshot(),
                panel: &self.panel,
                sources: &self.sources,
                timings: self.timings,
            }
        }
    }

    /// Mount `component` on a fresh channel and hand back the receiver.
    pub fn mount(component: &mut dyn Component) -> UnboundedReceiver<Action> {
        let (tx, rx) = mpsc::unbounded_channel();
        component.init(tx).ok();
        rx
    }

    pub fn drain(rx: &mut UnboundedReceiver<Action>) -> Vec<Action> {
        let mut out = Vec::new();
        while let Ok(action) = rx.try_recv() {
            out.push(action);
        }
        out
    }
}
