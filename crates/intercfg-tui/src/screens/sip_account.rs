//! SIP registration status with troubleshooting hints.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use intercfg_core::settings::SipStatus;

use crate::component::Component;
use crate::context::ScreenContext;
use crate::theme;
use crate::widgets::popup::render_screen_block;

pub struct SipAccountScreen {
    status: SipStatus,
}

impl SipAccountScreen {
    pub fn new(ctx: &ScreenContext<'_>) -> Self {
        Self {
            status: ctx.panel.sip,
        }
    }
}

impl Component for SipAccountScreen {
    fn render(&self, frame: &mut Frame, area: Rect) {
        let inner = render_screen_block(frame, area, "SIP account");

        let (icon, style) = if self.status.registered {
            ("✓", theme::success_text())
        } else {
            ("✗", theme::error_text())
        };
        let mut lines = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("  Status  ", Style::default().fg(theme::DIM_WHITE)),
                Span::styled(
                    format!("{icon} {}", self.status.label()),
                    style.add_modifier(Modifier::BOLD),
                ),
            ]),
        ];

        let checklist = self.status.checklist();
        if !checklist.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "  Check the following:",
                Style::default().fg(theme::ELECTRIC_YELLOW),
            )));
            lines.extend(checklist.iter().map(|item| {
                Line::from(vec![
                    Span::styled("    · ", theme::key_hint()),
                    Span::styled(*item, theme::table_row()),
                ])
            }));
        }
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn id(&self) -> &'static str {
        "SIP account"
    }
}
