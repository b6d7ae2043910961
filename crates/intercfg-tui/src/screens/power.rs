//! Reboot and factory reset, each behind two confirmations.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use tracing::{info, warn};

use intercfg_core::settings::{ConfirmStage, DoubleConfirm};

use crate::action::{Action, ConfirmAction, Notification};
use crate::component::Component;
use crate::theme;
use crate::widgets::hints::hint_line;
use crate::widgets::popup::render_screen_block;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerAction {
    Reboot,
    FactoryReset,
}

impl PowerAction {
    fn title(self) -> &'static str {
        match self {
            Self::Reboot => "Reboot",
            Self::FactoryReset => "Factory reset",
        }
    }

    fn description(self) -> &'static str {
        match self {
            Self::Reboot => "Restart the panel. Calls in progress are dropped.",
            Self::FactoryReset => {
                "Erase every setting, key and apartment and restore the factory configuration."
            }
        }
    }

    fn first(self) -> ConfirmAction {
        match self {
            Self::Reboot => ConfirmAction::RebootFirst,
            Self::FactoryReset => ConfirmAction::FactoryResetFirst,
        }
    }

    fn last(self) -> ConfirmAction {
        match self {
            Self::Reboot => ConfirmAction::RebootFinal,
            Self::FactoryReset => ConfirmAction::FactoryResetFinal,
        }
    }

    fn done(self) -> &'static str {
        match self {
            Self::Reboot => "Reboot command sent to the panel",
            Self::FactoryReset => "Factory reset command sent to the panel",
        }
    }
}

pub struct PowerScreen {
    kind: PowerAction,
    confirm: DoubleConfirm,
}

impl PowerScreen {
    pub fn new(kind: PowerAction) -> Self {
        Self {
            kind,
            confirm: DoubleConfirm::default(),
        }
    }

    fn owns(&self, action: &ConfirmAction) -> bool {
        *action == self.kind.first() || *action == self.kind.last()
    }
}

impl Component for PowerScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.code == KeyCode::Enter && self.confirm.stage() == ConfirmStage::Idle {
            self.confirm.confirm();
            return Ok(Some(Action::ShowConfirm(self.kind.first())));
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::Confirmed(c) if self.owns(c) => {
                if self.confirm.confirm() {
                    self.confirm.cancel();
                    info!(action = self.kind.title(), "power action confirmed");
                    let notice = match self.kind {
                        PowerAction::Reboot => Notification::info(self.kind.done()),
                        PowerAction::FactoryReset => Notification::warning(self.kind.done()),
                    };
                    return Ok(Some(Action::Notify(notice)));
                }
                return Ok(Some(Action::ShowConfirm(self.kind.last())));
            }
            Action::Cancelled(c) if self.owns(c) => {
                warn!(action = self.kind.title(), "power action cancelled");
                self.confirm.cancel();
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let inner = render_screen_block(frame, area, self.kind.title());
        let layout = Layout::vertical([
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(inner);

        let stage = match self.confirm.stage() {
            ConfirmStage::Idle | ConfirmStage::Done => "",
            ConfirmStage::First => "Waiting for the first confirmation",
            ConfirmStage::Second => "Waiting for the final confirmation",
        };
        frame.render_widget(
            Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(self.kind.description(), theme::table_row())),
                Line::from(""),
                Line::from(Span::styled(stage, theme::key_hint())),
            ])
            .alignment(Alignment::Center),
            layout[1],
        );
        frame.render_widget(
            Paragraph::new(hint_line(&[("Enter", "start"), ("Esc", "back")])),
            layout[2],
        );
    }

    fn id(&self) -> &'static str {
        self.kind.title()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::screens::testing::key;

    #[test]
    fn reboot_needs_two_confirmations() {
        let mut screen = PowerScreen::new(PowerAction::Reboot);
        let first = screen.handle_key_event(key(KeyCode::Enter)).ok().flatten();
        assert!(matches!(first, Some(Action::ShowConfirm(ConfirmAction::RebootFirst))));

        let second = screen
            .update(&Action::Confirmed(ConfirmAction::RebootFirst))
            .ok()
            .flatten();
        assert!(matches!(second, Some(Action::ShowConfirm(ConfirmAction::RebootFinal))));
        assert_eq!(screen.confirm.stage(), ConfirmStage::Second);

        let done = screen
            .update(&Action::Confirmed(ConfirmAction::RebootFinal))
            .ok()
            .flatten();
        assert!(matches!(
            done,
            Some(Action::Notify(ref n)) if n.message == "Reboot command sent to the panel"
        ));
        assert_eq!(screen.confirm.stage(), ConfirmStage::Idle);
    }

    #[test]
    fn cancel_at_the_second_step_starts_over() {
        let mut screen = PowerScreen::new(PowerAction::FactoryReset);
        screen.handle_key_event(key(KeyCode::Enter)).ok();
        screen
            .update(&Action::Confirmed(ConfirmAction::FactoryResetFirst))
            .ok();
        screen
            .update(&Action::Cancelled(ConfirmAction::FactoryResetFinal))
            .ok();
        assert_eq!(screen.confirm.stage(), ConfirmStage::Idle);

        // Confirmations meant for another screen are ignored.
        let other = screen
            .update(&Action::Confirmed(ConfirmAction::RebootFirst))
            .ok()
            .flatten();
        assert!(other.is_none());
    }
}
