//! Key hint line rendered at the bottom of each screen.

use ratatui::text::{Line, Span};

use crate::theme;

/// `[("j/k", "move"), ("Enter", "open")]` → `  j/k move  Enter open`.
pub fn hint_line(hints: &[(&'static str, &'static str)]) -> Line<'static> {
    let mut spans = Vec::with_capacity(hints.len() * 2 + 1);
    spans.push(Span::raw("  "));
    for (key, desc) in hints {
        spans.push(Span::styled(format!("{key} "), theme::key_hint_key()));
        spans.push(Span::styled(format!("{desc}  "), theme::key_hint()));
    }
    Line::from(spans)
}

/// Hints shared by every form screen.
pub const FORM_HINTS: &[(&str, &str)] = &[
    ("↑/↓", "field"),
    ("◂/▸", "change"),
    ("Space", "toggle"),
    ("Ctrl+S", "save"),
    ("Esc", "back"),
];
