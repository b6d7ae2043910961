//! Component trait — the building block for every screen.

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};
use tokio::sync::mpsc::UnboundedSender;

use crate::action::Action;

/// Every screen implements Component.
///
/// Lifecycle: `init` → (`handle_key_event` | `update` | `render`)* → drop.
/// Screens are created when pushed on the navigation stack and dropped
/// when popped, so local state never outlives a visit.
pub trait Component: Send {
    /// Called once when the component is mounted.
    fn init(&mut self, _action_tx: UnboundedSender<Action>) -> Result<()> {
        Ok(())
    }

    /// Handle a keyboard event. Return an Action to dispatch, or None.
    fn handle_key_event(&mut self, _key: KeyEvent) -> Result<Option<Action>> {
        Ok(None)
    }

    /// Process a dispatched action. May return a follow-up action.
    fn update(&mut self, _action: &Action) -> Result<Option<Action>> {
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect);

    /// While true the app forwards every key except Ctrl+C and F1 to the
    /// component, so text fields can receive `q`, `?` and Esc.
    fn captures_input(&self) -> bool {
        false
    }

    fn id(&self) -> &'static str;
}
