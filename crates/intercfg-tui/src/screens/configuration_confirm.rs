//! Wizard step 6: review the selection, run the simulated push, commit.

use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Gauge, Paragraph};
use throbber_widgets_tui::ThrobberState;
use tokio::sync::mpsc::UnboundedSender;
use tracing::info;

use intercfg_core::{Selection, StoreCommand};

use super::emit;
use crate::action::{Action, Notification};
use crate::component::Component;
use crate::context::ScreenContext;
use crate::screen::ScreenId;
use crate::theme;
use crate::widgets::hints::hint_line;
use crate::widgets::popup::render_screen_block;

pub struct ConfigurationConfirmScreen {
    selection: Selection,
    started: Instant,
    duration: Duration,
    throbber_state: ThrobberState,
    action_tx: Option<UnboundedSender<Action>>,
}

impl ConfigurationConfirmScreen {
    pub fn new(ctx: &ScreenContext<'_>) -> Self {
        info!(
            devices = ctx.store.selection.devices.len(),
            "configuration started"
        );
        Self {
            selection: ctx.store.selection.clone(),
            started: Instant::now(),
            duration: ctx.timings.configure_duration,
            throbber_state: ThrobberState::default(),
            action_tx: None,
        }
    }

    fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.started.elapsed().as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    fn done(&self) -> bool {
        self.started.elapsed() >= self.duration
    }

    fn complete(&self) -> Option<Action> {
        if !self.done() {
            return None;
        }
        let count = self.selection.devices.len();
        emit(
            self.action_tx.as_ref(),
            Action::Store(StoreCommand::CompleteConfiguration),
        );
        emit(
            self.action_tx.as_ref(),
            Action::Notify(Notification::success(format!(
                "Configuration complete: {count} device(s)"
            ))),
        );
        Some(Action::Navigate(ScreenId::ModeSelection))
    }

    fn summary_lines(&self) -> Vec<Line<'static>> {
        let label = Style::default().fg(theme::DIM_WHITE);
        let value = Style::default().fg(theme::NEON_CYAN);
        let or_dash = |v: Option<String>| v.unwrap_or_else(|| "—".into());
        let devices: Vec<String> = self
            .selection
            .devices
            .values()
            .map(|d| d.name.clone())
            .collect();

        let row = |name: &str, v: String| {
            Line::from(vec![
                Span::styled(format!("  {name:<10}"), label),
                Span::styled(v, value),
            ])
        };

        vec![
            Line::from(Span::styled(
                " Summary",
                Style::default()
                    .fg(theme::ELECTRIC_PURPLE)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                " ─────────────────────────────────────────",
                Style::default().fg(theme::BORDER_GRAY),
            )),
            row(
                "Type",
                or_dash(self.selection.device_type.map(|t| t.label().to_owned())),
            ),
            row(
                "Subtype",
                or_dash(self.selection.device_subtype.map(|s| s.label().to_owned())),
            ),
            row(
                "Devices",
                if devices.is_empty() {
                    "—".into()
                } else {
                    devices.join(", ")
                },
            ),
            row(
                "Switch",
                or_dash(self.selection.commutator.as_ref().map(|c| c.name.clone())),
            ),
            row(
                "Port",
                or_dash(self.selection.port.as_ref().map(|p| p.name.clone())),
            ),
        ]
    }
}

impl Component for ConfigurationConfirmScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Enter => Ok(self.complete()),
            KeyCode::Char('r') => Ok(Some(Action::Navigate(ScreenId::DeviceType))),
            _ => Ok(None),
        }
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if matches!(action, Action::Tick) && !self.done() {
            self.throbber_state.calc_next();
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let inner = render_screen_block(frame, area, "Configuration");
        let layout = Layout::vertical([
            Constraint::Length(8),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(inner);

        frame.render_widget(Paragraph::new(self.summary_lines()), layout[0]);

        let done = self.done();
        if done {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "  ✓ Configuration ready. Press Enter to complete.",
                    theme::success_text(),
                )),
                layout[1],
            );
        } else {
            let throbber = throbber_widgets_tui::Throbber::default()
                .label("Configuring devices…")
                .style(Style::default().fg(theme::DIM_WHITE))
                .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));
            frame.render_stateful_widget(throbber, layout[1], &mut self.throbber_state.clone());
        }

        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(theme::ELECTRIC_PURPLE).bg(theme::BG_HIGHLIGHT))
            .ratio(self.progress());
        frame.render_widget(gauge, layout[3]);

        let hints: &[(&str, &str)] = if done {
            &[("Enter", "complete"), ("r", "reconfigure"), ("Esc", "back")]
        } else {
            &[("r", "reconfigure"), ("Esc", "back")]
        };
        frame.render_widget(Paragraph::new(hint_line(hints)), layout[5]);
    }

    fn id(&self) -> &'static str {
        "Configuration"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::testing::{Harness, drain, key, mount};

    #[test]
    fn complete_is_ignored_while_running() {
        let mut harness = Harness::default();
        harness.timings.configure_duration = Duration::from_secs(3600);
        let mut screen = ConfigurationConfirmScreen::new(&harness.ctx());
        let mut rx = mount(&mut screen);

        assert!(screen.handle_key_event(key(KeyCode::Enter)).ok().flatten().is_none());
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn complete_commits_then_returns_home() {
        let mut harness = Harness::default();
        harness.timings.configure_duration = Duration::ZERO;
        let mut screen = ConfigurationConfirmScreen::new(&harness.ctx());
        let mut rx = mount(&mut screen);

        let nav = screen.handle_key_event(key(KeyCode::Enter)).ok().flatten();
        let queued = drain(&mut rx);
        assert!(matches!(
            queued.first(),
            Some(Action::Store(StoreCommand::CompleteConfiguration))
        ));
        assert!(matches!(nav, Some(Action::Navigate(ScreenId::ModeSelection))));
    }

    #[test]
    fn reconfigure_goes_back_to_the_first_step() {
        let harness = Harness::default();
        let mut screen = ConfigurationConfirmScreen::new(&harness.ctx());
        let nav = screen.handle_key_event(key(KeyCode::Char('r'))).ok().flatten();
        assert!(matches!(nav, Some(Action::Navigate(ScreenId::DeviceType))));
    }
}
