//! Read-only panel readout: models, identifiers, firmware parts.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use intercfg_core::settings::PanelInfo;

use crate::component::Component;
use crate::context::ScreenContext;
use crate::theme;
use crate::widgets::popup::render_screen_block;

/// Rows after which a section break is drawn.
const SECTIONS: [(&str, usize); 3] = [("Hardware", 0), ("Firmware", 7), ("Services", 10)];

pub struct MainInfoScreen {
    info: PanelInfo,
}

impl MainInfoScreen {
    pub fn new(ctx: &ScreenContext<'_>) -> Self {
        Self {
            info: ctx.panel.info.clone(),
        }
    }
}

impl Component for MainInfoScreen {
    fn render(&self, frame: &mut Frame, area: Rect) {
        let inner = render_screen_block(frame, area, "Panel info");
        let label = Style::default().fg(theme::DIM_WHITE);
        let value = Style::default().fg(theme::NEON_CYAN);

        let mut lines = Vec::new();
        for (i, (name, v)) in self.info.rows().into_iter().enumerate() {
            if let Some((title, _)) = SECTIONS.iter().find(|(_, at)| *at == i) {
                if i > 0 {
                    lines.push(Line::from(""));
                }
                lines.push(Line::from(Span::styled(
                    format!(" {title}"),
                    Style::default()
                        .fg(theme::ELECTRIC_PURPLE)
                        .add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(Span::styled(
                    " ─────────────────────────────────────────",
                    Style::default().fg(theme::BORDER_GRAY),
                )));
            }
            let value_style = match (name, v.as_str()) {
                ("SIP registration", "Registered") => theme::success_text(),
                ("SIP registration", _) => theme::error_text(),
                _ => value,
            };
            lines.push(Line::from(vec![
                Span::styled(format!("  {name:<20}"), label),
                Span::styled(v, value_style),
            ]));
        }
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn id(&self) -> &'static str {
        "Panel info"
    }
}
