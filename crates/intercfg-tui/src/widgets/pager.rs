//! Page selector line for paginated lists.

use ratatui::style::Style;
use ratatui::text::{Line, Span};

use intercfg_core::Paginator;

use crate::theme;

/// `‹  1 … 4 [5] 6 … 12  ›   120 items`
pub fn pager_line(paginator: &Paginator, len: usize) -> Line<'static> {
    let window = paginator.window(len);
    let current = paginator.page();
    let total = paginator.total_pages(len);

    let arrow = |enabled: bool, glyph: &'static str| {
        let style = if enabled {
            Style::default().fg(theme::ELECTRIC_PURPLE)
        } else {
            theme::key_hint()
        };
        Span::styled(glyph, style)
    };

    let mut spans = vec![Span::raw("  "), arrow(current > 1, "‹ "), Span::raw(" ")];
    if window.leading_ellipsis {
        spans.push(Span::styled("1 … ", theme::key_hint()));
    }
    for page in &window.pages {
        if *page == current {
            spans.push(Span::styled(format!("[{page}] "), theme::tab_active()));
        } else {
            spans.push(Span::styled(format!("{page} "), theme::tab_inactive()));
        }
    }
    if window.trailing_ellipsis {
        spans.push(Span::styled(format!("… {total} "), theme::key_hint()));
    }
    spans.push(arrow(current < total, " ›"));
    spans.push(Span::styled(format!("   {len} items"), theme::key_hint()));
    Line::from(spans)
}
