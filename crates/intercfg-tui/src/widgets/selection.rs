//! Cursor movement over a `TableState`, clamped to the list length.

use ratatui::widgets::TableState;

pub fn select_next(state: &mut TableState, len: usize) {
    if len == 0 {
        state.select(None);
        return;
    }
    let next = state.selected().map_or(0, |i| (i + 1).min(len - 1));
    state.select(Some(next));
}

pub fn select_prev(state: &mut TableState, len: usize) {
    if len == 0 {
        state.select(None);
        return;
    }
    let prev = state.selected().map_or(0, |i| i.saturating_sub(1).min(len - 1));
    state.select(Some(prev));
}

/// Keep the cursor inside `0..len` after the list shrank.
pub fn clamp(state: &mut TableState, len: usize) {
    match (state.selected(), len) {
        (_, 0) => state.select(None),
        (None, _) => state.select(Some(0)),
        (Some(i), _) if i >= len => state.select(Some(len - 1)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn movement_stops_at_the_ends() {
        let mut state = TableState::default();
        select_prev(&mut state, 3);
        assert_eq!(state.selected(), Some(0));
        for _ in 0..5 {
            select_next(&mut state, 3);
        }
        assert_eq!(state.selected(), Some(2));
        clamp(&mut state, 1);
        assert_eq!(state.selected(), Some(0));
        clamp(&mut state, 0);
        assert_eq!(state.selected(), None);
    }
}
