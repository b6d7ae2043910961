//! Screen stack.
//!
//! `navigate` pops back to a screen that is already open instead of
//! opening a second copy of it; `back` never removes the root.

use tracing::debug;

use crate::screen::ScreenId;

/// What the app has to do to its screen components after a stack change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Target is already on top.
    Stay,
    /// Create the target and push it.
    Push(ScreenId),
    /// Drop this many screens from the top.
    Pop(usize),
}

#[derive(Debug, Clone)]
pub struct NavStack {
    stack: Vec<ScreenId>,
}

impl NavStack {
    pub fn new(root: ScreenId) -> Self {
        Self { stack: vec![root] }
    }

    pub fn current(&self) -> ScreenId {
        self.stack.last().copied().unwrap_or_default()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Screens from root to top.
    pub fn path(&self) -> &[ScreenId] {
        &self.stack
    }

    pub fn navigate(&mut self, target: ScreenId) -> Transition {
        if let Some(pos) = self.stack.iter().position(|&s| s == target) {
            let popped = self.stack.len() - pos - 1;
            if popped == 0 {
                return Transition::Stay;
            }
            self.stack.truncate(pos + 1);
            debug!(%target, popped, "navigate: popped back");
            return Transition::Pop(popped);
        }
        self.stack.push(target);
        debug!(%target, depth = self.stack.len(), "navigate: pushed");
        Transition::Push(target)
    }

    pub fn back(&mut self) -> Transition {
        if self.stack.len() <= 1 {
            return Transition::Stay;
        }
        self.stack.pop();
        Transition::Pop(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn pushes_new_screens() {
        let mut nav = NavStack::new(ScreenId::ModeSelection);
        assert_eq!(
            nav.navigate(ScreenId::DeviceType),
            Transition::Push(ScreenId::DeviceType)
        );
        assert_eq!(nav.current(), ScreenId::DeviceType);
        assert_eq!(nav.depth(), 2);
    }

    #[test]
    fn navigating_to_open_screen_pops_to_it() {
        let mut nav = NavStack::new(ScreenId::ModeSelection);
        for id in [
            ScreenId::DeviceType,
            ScreenId::DeviceSubtype,
            ScreenId::DeviceList,
            ScreenId::CommutatorList,
            ScreenId::PortList,
            ScreenId::ConfigurationConfirm,
        ] {
            nav.navigate(id);
        }
        assert_eq!(nav.navigate(ScreenId::DeviceType), Transition::Pop(5));
        assert_eq!(
            nav.path(),
            &[ScreenId::ModeSelection, ScreenId::DeviceType]
        );
        assert_eq!(nav.navigate(ScreenId::ModeSelection), Transition::Pop(1));
    }

    #[test]
    fn navigating_to_current_stays() {
        let mut nav = NavStack::new(ScreenId::DiagnosticMain);
        assert_eq!(nav.navigate(ScreenId::DiagnosticMain), Transition::Stay);
        assert_eq!(nav.depth(), 1);
    }

    #[test]
    fn back_keeps_root() {
        let mut nav = NavStack::new(ScreenId::DiagnosticMain);
        nav.navigate(ScreenId::Keys);
        assert_eq!(nav.back(), Transition::Pop(1));
        assert_eq!(nav.back(), Transition::Stay);
        assert_eq!(nav.current(), ScreenId::DiagnosticMain);
    }
}
