// Transition controller - the busy-gated fade/fetch/fade sequence for the mainframe
//
// A transition moves through FadingOut -> Fetching -> Settling (animated) or
// straight to Fetching (seamless). `busy` is set before the first deferred
// step and cleared only when the transition finishes or fails, so at most one
// transition is ever in flight. Requests arriving while busy are dropped.

use crate::config::{FailurePolicy, TransitionConfig};
use crate::error::FetchError;
use crate::fetch::FetchRequest;
use crate::fragment::Fragment;
use crate::history::HistoryStack;
use crate::message::{FetchPurpose, Message};
use crate::page::{Page, Region, VisualState};
use crate::target::NavigationTarget;
use crate::task::Task;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationState {
    pub busy: bool,
    pub last_access: NavigationTarget,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    FadingOut,
    Fetching,
    Settling,
}

struct Pending {
    seq: u64,
    target: NavigationTarget,
    reverse_direction: bool,
    animated: bool,
    phase: Phase,
    previous_access: NavigationTarget,
    history_before: HistoryStack,
}

/// How a fetch completion was handled.
#[derive(Debug)]
pub enum Completion {
    /// Stale or unexpected completion, nothing changed.
    Ignored,
    /// New content is in the mainframe.
    Loaded(Task),
    /// The transition was abandoned and busy cleared.
    Failed { error_rendered: bool },
}

pub struct TransitionController {
    state: NavigationState,
    history: HistoryStack,
    config: TransitionConfig,
    pending: Option<Pending>,
    next_seq: u64,
}

impl TransitionController {
    pub fn new(initial: NavigationTarget, config: TransitionConfig) -> Self {
        Self {
            state: NavigationState {
                busy: false,
                last_access: initial.clone(),
            },
            history: HistoryStack::new(initial),
            config,
            pending: None,
            next_seq: 0,
        }
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn is_busy(&self) -> bool {
        self.state.busy
    }

    pub fn last_access(&self) -> &NavigationTarget {
        &self.state.last_access
    }

    /// Animated navigation. Dropped silently while another transition runs.
    pub fn navigate(
        &mut self,
        page: &mut dyn Page,
        target: NavigationTarget,
        reverse_direction: bool,
        record_history: bool,
    ) -> Task {
        if self.state.busy {
            tracing::debug!(nav_target = %target, "navigation dropped, transition in progress");
            return Task::none();
        }
        let history_before = self.history.clone();
        if record_history {
            self.history.record(target.clone(), reverse_direction);
        }
        self.begin(page, target, reverse_direction, true, history_before)
    }

    /// Reload without animation and without touching history.
    pub fn navigate_seamless(&mut self, page: &mut dyn Page, target: NavigationTarget) -> Task {
        if self.state.busy {
            tracing::debug!(nav_target = %target, "seamless load dropped, transition in progress");
            return Task::none();
        }
        let history_before = self.history.clone();
        self.begin(page, target, false, false, history_before)
    }

    pub fn navigate_refresh(&mut self, page: &mut dyn Page) -> Task {
        let target = self.state.last_access.clone();
        self.navigate_seamless(page, target)
    }

    /// Go back one entry. Returns `None` when busy or there is nothing to go
    /// back to.
    pub fn rollback(&mut self, page: &mut dyn Page) -> Option<Task> {
        if self.state.busy {
            return None;
        }
        let history_before = self.history.clone();
        let target = self.history.step_back(&self.state.last_access)?;
        Some(self.begin(page, target, true, true, history_before))
    }

    /// Go forward one entry. Returns `None` when busy or the redo list is empty.
    pub fn rollfront(&mut self, page: &mut dyn Page) -> Option<Task> {
        if self.state.busy {
            return None;
        }
        let history_before = self.history.clone();
        let target = self.history.step_forward()?;
        Some(self.begin(page, target, false, true, history_before))
    }

    fn begin(
        &mut self,
        page: &mut dyn Page,
        target: NavigationTarget,
        reverse_direction: bool,
        animated: bool,
        history_before: HistoryStack,
    ) -> Task {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.state.busy = true;
        let previous_access = std::mem::replace(&mut self.state.last_access, target.clone());
        tracing::debug!(nav_target = %target, seq, reverse_direction, animated, "transition started");

        let phase = if animated {
            animate(page, VisualState::fade_out(reverse_direction));
            Phase::FadingOut
        } else {
            Phase::Fetching
        };
        self.pending = Some(Pending {
            seq,
            target,
            reverse_direction,
            animated,
            phase,
            previous_access,
            history_before,
        });

        match phase {
            Phase::FadingOut => Task::delay(self.config.fade_out(), Message::FadeOutElapsed { seq }),
            _ => self.issue_fetch(),
        }
    }

    fn issue_fetch(&self) -> Task {
        let Some(pending) = &self.pending else {
            return Task::none();
        };
        let seq = pending.seq;
        Task::batch([
            Task::fetch(FetchRequest::get(&pending.target), FetchPurpose::Mainframe { seq }),
            Task::delay(self.config.fetch_timeout(), Message::WatchdogElapsed { seq }),
        ])
    }

    fn pending_in(&self, seq: u64, phase: Phase) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|pending| pending.seq == seq && pending.phase == phase)
    }

    /// Whether a timer message can still affect the transition in flight.
    /// Messages that are not transition timers always count.
    pub fn awaits(&self, message: &Message) -> bool {
        match message {
            Message::FadeOutElapsed { seq } => self.pending_in(*seq, Phase::FadingOut),
            Message::WatchdogElapsed { seq } => self.pending_in(*seq, Phase::Fetching),
            Message::SettleElapsed { seq } => self.pending_in(*seq, Phase::Settling),
            _ => true,
        }
    }

    pub fn fade_out_elapsed(&mut self, seq: u64) -> Task {
        if !self.pending_in(seq, Phase::FadingOut) {
            return Task::none();
        }
        if let Some(pending) = self.pending.as_mut() {
            pending.phase = Phase::Fetching;
        }
        self.issue_fetch()
    }

    pub fn fetched(
        &mut self,
        page: &mut dyn Page,
        seq: u64,
        result: Result<Fragment, FetchError>,
    ) -> Completion {
        if !self.pending_in(seq, Phase::Fetching) {
            tracing::debug!(seq, "stale fetch completion ignored");
            return Completion::Ignored;
        }
        match result {
            Ok(fragment) => self.commit(page, fragment),
            Err(error) => self.fail(page, error),
        }
    }

    /// The fetch took too long: give up on it so busy does not stay set.
    pub fn watchdog_elapsed(&mut self, page: &mut dyn Page, seq: u64) -> Completion {
        if !self.pending_in(seq, Phase::Fetching) {
            return Completion::Ignored;
        }
        let timeout = self.config.fetch_timeout();
        self.fail(page, FetchError::TimedOut(timeout))
    }

    pub fn settle_elapsed(&mut self, seq: u64) {
        if self.pending_in(seq, Phase::Settling) {
            self.pending = None;
            self.state.busy = false;
            tracing::debug!(seq, "transition settled");
        }
    }

    fn commit(&mut self, page: &mut dyn Page, fragment: Fragment) -> Completion {
        let Some(pending) = self.pending.as_mut() else {
            return Completion::Ignored;
        };
        page.replace_region(Region::Mainframe, fragment.html());
        tracing::info!(nav_target = %pending.target, "mainframe loaded");

        if pending.animated {
            animate(page, VisualState::fade_in(pending.reverse_direction));
            pending.phase = Phase::Settling;
            let seq = pending.seq;
            Completion::Loaded(Task::delay(self.config.settle(), Message::SettleElapsed { seq }))
        } else {
            self.pending = None;
            self.state.busy = false;
            Completion::Loaded(Task::none())
        }
    }

    fn fail(&mut self, page: &mut dyn Page, error: FetchError) -> Completion {
        let Some(pending) = self.pending.take() else {
            return Completion::Ignored;
        };
        tracing::warn!(nav_target = %pending.target, %error, "mainframe load failed");

        self.state.busy = false;
        self.state.last_access = pending.previous_access;
        self.history = pending.history_before;

        match self.config.failure_policy {
            FailurePolicy::KeepStale => {
                if pending.animated {
                    animate(page, VisualState::fade_in(pending.reverse_direction));
                }
                Completion::Failed {
                    error_rendered: false,
                }
            }
            FailurePolicy::ErrorFragment => {
                page.replace_region(Region::Mainframe, &self.config.error_fragment);
                if pending.animated {
                    animate(page, VisualState::fade_in(pending.reverse_direction));
                }
                Completion::Failed {
                    error_rendered: true,
                }
            }
        }
    }
}

fn animate(page: &mut dyn Page, state: VisualState) {
    tracing::trace!(visual_state = state.class_name(), "mainframe animated");
    page.apply_visual_state(state);
}
