// History stack - back/forward lists of navigation targets
use crate::target::NavigationTarget;

/// Two stacks of targets. Once anything has been shown, the top of `back`
/// names the currently displayed target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryStack {
    back: Vec<NavigationTarget>,
    forward: Vec<NavigationTarget>,
}

impl HistoryStack {
    pub fn new(initial: NavigationTarget) -> Self {
        Self {
            back: vec![initial],
            forward: Vec::new(),
        }
    }

    pub fn back(&self) -> &[NavigationTarget] {
        &self.back
    }

    pub fn forward(&self) -> &[NavigationTarget] {
        &self.forward
    }

    pub fn current(&self) -> Option<&NavigationTarget> {
        self.back.last()
    }

    /// Record a committed navigation. A forward navigation invalidates
    /// the redo path.
    pub fn record(&mut self, target: NavigationTarget, reverse_direction: bool) {
        self.back.push(target);
        if !reverse_direction {
            self.forward.clear();
        }
    }

    /// Move the current target onto the forward list and return the one
    /// below it, which stays on `back` as the new current target.
    ///
    /// With fewer than two entries there is nothing to go back to; the stack
    /// is reset to `[fallback]` and `None` is returned.
    pub fn step_back(&mut self, fallback: &NavigationTarget) -> Option<NavigationTarget> {
        let Some(current) = self.back.pop() else {
            tracing::warn!(%fallback, "back history empty, resetting");
            self.reset(fallback.clone());
            return None;
        };
        self.forward.push(current);

        match self.back.last() {
            Some(previous) => Some(previous.clone()),
            None => {
                // Nothing below the current entry: undo the move.
                self.forward.pop();
                self.reset(fallback.clone());
                None
            }
        }
    }

    /// Pop the most recent redo entry and make it current.
    pub fn step_forward(&mut self) -> Option<NavigationTarget> {
        let next = self.forward.pop()?;
        self.back.push(next.clone());
        Some(next)
    }

    pub fn reset(&mut self, target: NavigationTarget) {
        self.back = vec![target];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn t(raw: &str) -> NavigationTarget {
        NavigationTarget::parse(raw).unwrap()
    }

    #[test]
    fn test_record_forward_clears_redo() {
        let mut history = HistoryStack::new(t("/home"));
        history.record(t("/files"), false);
        assert_eq!(history.step_back(&t("/files")), Some(t("/home")));
        assert_eq!(history.forward(), &[t("/files")]);

        history.record(t("/settings"), false);
        assert!(history.forward().is_empty());
        assert_eq!(history.back(), &[t("/home"), t("/settings")]);
    }

    #[test]
    fn test_record_reverse_keeps_redo() {
        let mut history = HistoryStack::new(t("/home"));
        history.record(t("/files"), false);
        history.step_back(&t("/files"));
        history.record(t("/other"), true);
        assert_eq!(history.forward(), &[t("/files")]);
    }

    #[test]
    fn test_step_back_keeps_previous_as_current() {
        let mut history = HistoryStack::new(t("/home"));
        history.record(t("/files"), false);
        let previous = history.step_back(&t("/files"));
        assert_eq!(previous, Some(t("/home")));
        assert_eq!(history.back(), &[t("/home")]);
        assert_eq!(history.current(), Some(&t("/home")));
    }

    #[test]
    fn test_step_back_at_root_resets_without_leaking_redo() {
        let mut history = HistoryStack::new(t("/home"));
        assert_eq!(history.step_back(&t("/home")), None);
        assert_eq!(history.back(), &[t("/home")]);
        assert!(history.forward().is_empty());
    }

    #[test]
    fn test_step_forward() {
        let mut history = HistoryStack::new(t("/home"));
        history.record(t("/files"), false);
        history.step_back(&t("/files"));
        assert_eq!(history.step_forward(), Some(t("/files")));
        assert_eq!(history.back(), &[t("/home"), t("/files")]);
        assert_eq!(history.step_forward(), None);
    }
}
