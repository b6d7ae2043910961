//! Two-line option cards used by the mode picker and the first wizard steps.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::theme;

/// `(label, detail)` pairs, the cursor on `selected`.
pub fn render_option_list(
    frame: &mut Frame,
    area: Rect,
    options: &[(String, String)],
    selected: usize,
) {
    let mut lines = Vec::with_capacity(options.len() * 3);
    for (i, (label, detail)) in options.iter().enumerate() {
        let active = i == selected;
        let (marker, label_style) = if active {
            (
                Span::styled("  ▸ ", Style::default().fg(theme::ELECTRIC_PURPLE)),
                Style::default()
                    .fg(theme::NEON_CYAN)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            (Span::raw("    "), Style::default().fg(theme::DIM_WHITE))
        };
        lines.push(Line::from(vec![
            marker,
            Span::styled(format!("{}. ", i + 1), theme::key_hint()),
            Span::styled(label.clone(), label_style),
        ]));
        lines.push(Line::from(Span::styled(
            format!("       {detail}"),
            theme::key_hint(),
        )));
        lines.push(Line::from(""));
    }
    frame.render_widget(Paragraph::new(lines), area);
}
