//! Application core — event loop, screen stack, action dispatch.

use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use intercfg_config::Config;
use intercfg_core::{DeviceStore, PanelState};

use crate::action::{Action, ConfirmAction, Notification, NotificationLevel};
use crate::component::Component;
use crate::context::{ScreenContext, Sources, Timings};
use crate::data_bridge;
use crate::event::{Event, EventReader};
use crate::navigation::{NavStack, Transition};
use crate::screen::ScreenId;
use crate::screens::create_screen;
use crate::theme;
use crate::tui::Tui;
use crate::widgets::popup::{centered, render_modal};

const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

/// Top-level application state and event loop.
pub struct App {
    store: DeviceStore,
    /// Panel settings edited during this session.
    panel: PanelState,
    sources: Sources,
    timings: Timings,
    config: Config,
    nav: NavStack,
    /// One component per entry of `nav`, root first.
    screens: Vec<Box<dyn Component>>,
    running: bool,
    help_visible: bool,
    pending_confirm: Option<ConfirmAction>,
    notification: Option<(Notification, Instant)>,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    data_cancel: CancellationToken,
}

impl App {
    pub fn new(config: Config, sources: Sources) -> Result<Self> {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let root = config
            .ui
            .initial_screen
            .parse::<ScreenId>()
            .unwrap_or_else(|_| {
                warn!(screen = %config.ui.initial_screen, "unknown initial screen, using default");
                ScreenId::default()
            });

        let mut app = Self {
            store: DeviceStore::default(),
            panel: PanelState::default(),
            sources,
            timings: Timings::from(&config),
            config,
            nav: NavStack::new(root),
            screens: Vec::new(),
            running: true,
            help_visible: false,
            pending_confirm: None,
            notification: None,
            action_tx,
            action_rx,
            data_cancel: CancellationToken::new(),
        };
        app.mount(root)?;
        Ok(app)
    }

    fn context(&self) -> ScreenContext<'_> {
        ScreenContext {
            store: self.store.snapshot(),
            panel: &self.panel,
            sources: &self.sources,
            timings: self.timings,
        }
    }

    /// Build, initialize and push the component for `id`.
    fn mount(&mut self, id: ScreenId) -> Result<()> {
        let mut screen = create_screen(id, &self.context());
        screen.init(self.action_tx.clone())?;
        self.screens.push(screen);
        debug!(screen = %id, depth = self.screens.len(), "screen mounted");
        Ok(())
    }

    fn apply_transition(&mut self, transition: Transition) -> Result<()> {
        match transition {
            Transition::Stay => {}
            Transition::Push(id) => self.mount(id)?,
            Transition::Pop(n) => {
                let keep = self.screens.len().saturating_sub(n).max(1);
                self.screens.truncate(keep);
            }
        }
        Ok(())
    }

    fn active(&mut self) -> Option<&mut Box<dyn Component>> {
        self.screens.last_mut()
    }

    /// Run the main event loop.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;

        let mut events = EventReader::new(self.config.ui.tick_rate(), self.config.ui.render_rate());
        tokio::spawn(data_bridge::spawn_store_bridge(
            self.store.subscribe(),
            self.action_tx.clone(),
            self.data_cancel.clone(),
        ));

        info!(screen = %self.nav.current(), "TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.data_cancel.cancel();
        events.stop();
        tui.exit();
        info!("TUI event loop ended");
        Ok(())
    }

    /// Global keys first, then the active screen.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if self.pending_confirm.is_some() {
            return Ok(match key.code {
                KeyCode::Char('y' | 'Y') => Some(Action::ConfirmYes),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(Action::ConfirmNo),
                _ => None,
            });
        }

        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::F(1) => Some(Action::ToggleHelp),
                _ => None,
            });
        }

        if key.code == KeyCode::F(1) {
            return Ok(Some(Action::ToggleHelp));
        }

        let captures = self.screens.last().is_some_and(|s| s.captures_input());
        if !captures && key.modifiers.difference(KeyModifiers::SHIFT).is_empty() {
            match key.code {
                KeyCode::Char('q') => return Ok(Some(Action::Quit)),
                KeyCode::Char('?') => return Ok(Some(Action::ToggleHelp)),
                KeyCode::Esc => return Ok(Some(Action::GoBack)),
                _ => {}
            }
        }

        match self.active() {
            Some(screen) => screen.handle_key_event(key),
            None => Ok(None),
        }
    }

    /// Update app state and route the action to the screens that need it.
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => {
                info!("quit requested");
                self.running = false;
            }

            Action::Render => {}

            Action::Resize(w, h) => debug!(width = w, height = h, "terminal resized"),

            Action::Navigate(target) => {
                let transition = self.nav.navigate(*target);
                self.apply_transition(transition)?;
            }

            Action::GoBack => {
                let transition = self.nav.back();
                self.apply_transition(transition)?;
            }

            Action::Store(command) => self.store.apply(command.clone()),

            Action::StoreUpdated(_) => {
                for screen in &mut self.screens {
                    if let Some(follow_up) = screen.update(action)? {
                        self.action_tx.send(follow_up)?;
                    }
                }
            }

            Action::SavePanel(update) => {
                let section = update.section();
                let notice = match self.panel.apply((**update).clone()) {
                    Ok(()) => {
                        info!(section, "panel settings saved");
                        Notification::success(format!("{section} saved"))
                    }
                    Err(e) => {
                        warn!(section, error = %e, "panel settings rejected");
                        Notification::error(e.to_string())
                    }
                };
                // Set directly so a screen's own follow-up notice replaces it.
                self.notification = Some((notice, Instant::now()));
            }

            Action::ShowConfirm(confirm) => self.pending_confirm = Some(confirm.clone()),

            Action::ConfirmYes => {
                if let Some(confirm) = self.pending_confirm.take() {
                    self.action_tx.send(Action::Confirmed(confirm))?;
                }
            }

            Action::ConfirmNo => {
                if let Some(confirm) = self.pending_confirm.take() {
                    self.action_tx.send(Action::Cancelled(confirm))?;
                }
            }

            Action::ToggleHelp => self.help_visible = !self.help_visible,

            Action::Notify(notification) => {
                self.notification = Some((notification.clone(), Instant::now()));
            }

            Action::DismissNotification => self.notification = None,

            Action::Tick => {
                if self
                    .notification
                    .as_ref()
                    .is_some_and(|(_, shown)| shown.elapsed() >= NOTIFICATION_TTL)
                {
                    self.notification = None;
                }
                self.forward_to_active(action)?;
            }

            Action::KeyRead(_) | Action::Confirmed(_) | Action::Cancelled(_) => {
                self.forward_to_active(action)?;
            }
        }

        Ok(())
    }

    fn forward_to_active(&mut self, action: &Action) -> Result<()> {
        let follow_up = match self.active() {
            Some(screen) => screen.update(action)?,
            None => None,
        };
        if let Some(follow_up) = follow_up {
            self.action_tx.send(follow_up)?;
        }
        Ok(())
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let layout = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

        self.render_breadcrumbs(frame, layout[0]);
        if let Some(screen) = self.screens.last() {
            screen.render(frame, layout[1]);
        }
        self.render_status_bar(frame, layout[2]);

        if self.help_visible {
            render_help_overlay(frame, area);
        }
        if let Some(confirm) = &self.pending_confirm {
            render_confirm_dialog(frame, area, confirm);
        }
        if let Some((notification, _)) = &self.notification {
            render_notification(frame, area, notification);
        }
    }

    fn render_breadcrumbs(&self, frame: &mut Frame, area: Rect) {
        let path = self.nav.path();
        let mut spans = vec![Span::raw(" ")];
        for (i, id) in path.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" › ", theme::key_hint()));
            }
            let style = if i + 1 == path.len() {
                theme::title_style()
            } else {
                theme::key_hint()
            };
            spans.push(Span::styled(id.label(), style));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let current = self.nav.current();
        let mut spans = vec![Span::styled(
            format!(" {current} "),
            Style::default()
                .fg(theme::NEON_CYAN)
                .add_modifier(Modifier::BOLD),
        )];
        if let Some((step, of)) = current.wizard_step() {
            spans.push(Span::styled(
                format!("step {step}/{of} "),
                Style::default().fg(theme::ELECTRIC_YELLOW),
            ));
        }
        spans.push(Span::styled("│ ? help  Esc back  q quit", theme::key_hint()));
        frame.render_widget(
            Paragraph::new(Line::from(spans)).style(theme::status_bar()),
            area,
        );
    }
}

fn help_row(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {key:<10}"), theme::key_hint_key()),
        Span::styled(desc, theme::key_hint()),
    ])
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let inner = render_modal(frame, centered(area, 56, 21), "Keyboard Shortcuts");
    let heading =
        |text: &'static str| Line::from(Span::styled(text, Style::default().fg(theme::NEON_CYAN)));

    let help_text = vec![
        Line::from(""),
        heading("  Navigation"),
        Line::from(Span::styled("  ──────────", theme::key_hint())),
        help_row("j/k ↑/↓", "Move up/down"),
        help_row("Enter", "Open / select"),
        help_row("Esc", "Back / close"),
        help_row("h/l", "Previous / next page"),
        help_row("g/G", "First / last page"),
        Line::from(""),
        heading("  Forms"),
        Line::from(Span::styled("  ─────", theme::key_hint())),
        help_row("Tab ↑/↓", "Next / previous field"),
        help_row("◂/▸", "Change choice or level"),
        help_row("Ctrl+S", "Save"),
        Line::from(""),
        heading("  Global"),
        Line::from(Span::styled("  ──────", theme::key_hint())),
        help_row("? F1", "This help"),
        help_row("q Ctrl+C", "Quit"),
        Line::from(""),
        Line::from(Span::styled(
            "                     Esc or ? to close",
            theme::key_hint(),
        )),
    ];
    frame.render_widget(Paragraph::new(help_text), inner);
}

fn render_confirm_dialog(frame: &mut Frame, area: Rect, confirm: &ConfirmAction) {
    let message = confirm.to_string();
    let wanted = u16::try_from(message.chars().count())
        .unwrap_or(u16::MAX)
        .saturating_add(6);
    let width = wanted.clamp(40, 72).min(area.width.saturating_sub(4));
    let height = 5u16;

    let x = area.width.saturating_sub(width) / 2;
    let y = area.height.saturating_sub(height) / 2;
    let dialog_area = Rect::new(area.x + x, area.y + y, width, height);

    frame.render_widget(
        Block::default().style(Style::default().bg(theme::BG_DARK)),
        dialog_area,
    );
    let block = Block::default()
        .title(" Confirm ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme::ELECTRIC_YELLOW));
    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);

    let text = vec![
        Line::from(Span::styled(
            format!("  {message}"),
            Style::default().fg(theme::DIM_WHITE),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("  y ", theme::key_hint_key()),
            Span::styled("confirm    ", theme::key_hint()),
            Span::styled("n ", theme::key_hint_key()),
            Span::styled("cancel", theme::key_hint()),
        ]),
    ];
    frame.render_widget(Paragraph::new(text), inner);
}

fn render_notification(frame: &mut Frame, area: Rect, notif: &Notification) {
    let msg_len = u16::try_from(notif.message.chars().count()).unwrap_or(u16::MAX);
    let width = msg_len.saturating_add(6).clamp(20, 60);
    let height = 3u16;

    let x = area.width.saturating_sub(width + 1);
    let y = area.height.saturating_sub(height + 1);
    let toast_area = Rect::new(area.x + x, area.y + y, width.min(area.width), height);

    let (border_color, icon) = match notif.level {
        NotificationLevel::Success => (theme::SUCCESS_GREEN, "✓"),
        NotificationLevel::Error => (theme::ERROR_RED, "✗"),
        NotificationLevel::Warning => (theme::ELECTRIC_YELLOW, "!"),
        NotificationLevel::Info => (theme::NEON_CYAN, "·"),
    };

    frame.render_widget(
        Block::default().style(Style::default().bg(theme::BG_DARK)),
        toast_area,
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(toast_area);
    frame.render_widget(block, toast_area);

    let line = Line::from(vec![
        Span::styled(format!(" {icon} "), Style::default().fg(border_color)),
        Span::styled(notif.message.as_str(), Style::default().fg(theme::DIM_WHITE)),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use intercfg_core::settings::SyslogSettings;
    use intercfg_core::{DeviceType, PanelUpdate, StoreCommand};

    use crate::context::fixtures;
    use crate::screens::testing::{ctrl, key};

    fn app_at(screen: &str) -> App {
        let mut config = Config::default();
        config.ui.initial_screen = screen.into();
        App::new(config, fixtures::sources()).unwrap()
    }

    /// Process everything currently queued, including follow-ups.
    fn pump(app: &mut App) {
        while let Ok(action) = app.action_rx.try_recv() {
            app.process_action(&action).unwrap();
        }
    }

    fn press(app: &mut App, event: KeyEvent) {
        if let Some(action) = app.handle_key_event(event).unwrap() {
            app.action_tx.send(action).unwrap();
        }
        pump(app);
    }

    #[test]
    fn unknown_initial_screen_falls_back_to_mode_selection() {
        let app = app_at("Dashboard");
        assert_eq!(app.nav.current(), ScreenId::ModeSelection);
        assert_eq!(app.screens.len(), 1);
    }

    #[test]
    fn screens_follow_the_navigation_stack() {
        let mut app = app_at("DiagnosticMain");
        app.process_action(&Action::Navigate(ScreenId::Syslog)).unwrap();
        assert_eq!(app.screens.len(), 2);
        assert_eq!(app.screens[1].id(), "Syslog");

        app.process_action(&Action::Navigate(ScreenId::DiagnosticMain))
            .unwrap();
        assert_eq!(app.screens.len(), 1);

        app.process_action(&Action::GoBack).unwrap();
        assert_eq!(app.screens.len(), 1);
        assert_eq!(app.nav.current(), ScreenId::DiagnosticMain);
    }

    #[test]
    fn esc_goes_back_and_q_quits() {
        let mut app = app_at("DiagnosticMain");
        app.process_action(&Action::Navigate(ScreenId::Reboot)).unwrap();
        press(&mut app, key(KeyCode::Esc));
        assert_eq!(app.nav.current(), ScreenId::DiagnosticMain);

        press(&mut app, key(KeyCode::Char('q')));
        assert!(!app.running);
    }

    #[test]
    fn help_swallows_keys_until_closed() {
        let mut app = app_at("DiagnosticMain");
        press(&mut app, key(KeyCode::Char('?')));
        assert!(app.help_visible);

        press(&mut app, key(KeyCode::Char('q')));
        assert!(app.running);

        press(&mut app, key(KeyCode::Esc));
        assert!(!app.help_visible);
    }

    #[test]
    fn capturing_screen_receives_q_but_not_ctrl_c() {
        let mut app = app_at("Syslog");
        press(&mut app, key(KeyCode::Char('q')));
        assert!(app.running);

        press(&mut app, ctrl('c'));
        assert!(!app.running);
    }

    #[test]
    fn saving_stores_the_section_and_notifies() {
        let mut app = app_at("DiagnosticMain");
        let mut syslog = SyslogSettings::default();
        syslog.server = "10.0.0.9".into();
        app.process_action(&Action::save(PanelUpdate::Syslog(syslog.clone())))
            .unwrap();

        assert_eq!(app.panel.syslog, syslog);
        let (notice, _) = app.notification.clone().unwrap();
        assert_eq!(notice, Notification::success("Syslog saved"));
    }

    #[test]
    fn invalid_save_is_rejected() {
        let mut app = app_at("DiagnosticMain");
        let mut syslog = SyslogSettings::default();
        syslog.server = String::new();
        let before = app.panel.syslog.clone();
        app.process_action(&Action::save(PanelUpdate::Syslog(syslog)))
            .unwrap();

        assert_eq!(app.panel.syslog, before);
        let (notice, _) = app.notification.clone().unwrap();
        assert_eq!(notice.level, NotificationLevel::Error);
    }

    #[test]
    fn confirmation_round_trip_reaches_the_screen() {
        let mut app = app_at("Reboot");
        press(&mut app, key(KeyCode::Enter));
        assert_eq!(app.pending_confirm, Some(ConfirmAction::RebootFirst));

        // Global keys are blocked while the dialog is open.
        press(&mut app, key(KeyCode::Char('q')));
        assert!(app.running);

        press(&mut app, key(KeyCode::Char('y')));
        assert_eq!(app.pending_confirm, Some(ConfirmAction::RebootFinal));

        press(&mut app, key(KeyCode::Char('y')));
        assert_eq!(app.pending_confirm, None);
        let (notice, _) = app.notification.clone().unwrap();
        assert_eq!(notice.message, "Reboot command sent to the panel");
    }

    #[test]
    fn store_commands_update_the_store() {
        let mut app = app_at("ModeSelection");
        app.process_action(&Action::Store(StoreCommand::SetDeviceType(DeviceType::Camera)))
            .unwrap();
        assert_eq!(
            app.store.selection().device_type,
            Some(DeviceType::Camera)
        );
    }

    #[test]
    fn notification_expires_on_tick() {
        let mut app = app_at("DiagnosticMain");
        app.notification = Some((
            Notification::info("hello"),
            Instant::now().checked_sub(NOTIFICATION_TTL).unwrap(),
        ));
        app.process_action(&Action::Tick).unwrap();
        assert!(app.notification.is_none());
    }
}
