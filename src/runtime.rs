// Runtime - executes shell tasks for native hosts
//
// Fetches go to the background worker, delays wait in a timer heap, and every
// completion is fed back through `Shell::update` on the caller's thread.

use crate::app::Shell;
use crate::error::FetchError;
use crate::fetch::Fetcher;
use crate::io::{spawn_worker, IoCommand};
use crate::message::Message;
use crate::page::Page;
use crate::task::Task;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

struct Timer {
    deadline: Instant,
    order: u64,
    message: Message,
}

impl PartialEq for Timer {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.order == other.order
    }
}

impl Eq for Timer {}

impl PartialOrd for Timer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timer {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.deadline, self.order).cmp(&(other.deadline, other.order))
    }
}

pub struct Runtime<P: Page> {
    shell: Shell<P>,
    commands: Sender<IoCommand>,
    results: Receiver<Message>,
    timers: BinaryHeap<Reverse<Timer>>,
    timer_order: u64,
    in_flight: usize,
}

impl<P: Page> Runtime<P> {
    pub fn new<F>(shell: Shell<P>, fetcher: F) -> Self
    where
        F: Fetcher + 'static,
    {
        let (commands, results) = spawn_worker(fetcher);
        Self {
            shell,
            commands,
            results,
            timers: BinaryHeap::new(),
            timer_order: 0,
            in_flight: 0,
        }
    }

    pub fn shell(&self) -> &Shell<P> {
        &self.shell
    }

    pub fn shell_mut(&mut self) -> &mut Shell<P> {
        &mut self.shell
    }

    pub fn start(&mut self) {
        let task = self.shell.start();
        self.schedule(task);
        self.drop_stale_timers();
    }

    pub fn dispatch(&mut self, message: Message) {
        let task = self.shell.update(message);
        self.schedule(task);
        self.drop_stale_timers();
    }

    /// Number of timers still waiting to fire.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// True when no timer or fetch is outstanding.
    pub fn is_idle(&self) -> bool {
        self.timers.is_empty() && self.in_flight == 0
    }

    fn schedule(&mut self, task: Task) {
        for task in task.into_vec() {
            match task {
                Task::Delay { after, message } => {
                    self.timers.push(Reverse(Timer {
                        deadline: Instant::now() + after,
                        order: self.timer_order,
                        message,
                    }));
                    self.timer_order += 1;
                }
                Task::Fetch { request, purpose } => {
                    match self.commands.send(IoCommand::Fetch { request, purpose }) {
                        Ok(()) => self.in_flight += 1,
                        Err(err) => {
                            let IoCommand::Fetch { purpose, .. } = err.0;
                            let result = Err(FetchError::Network("fetch worker stopped".to_string()));
                            self.dispatch(Message::Fetched { purpose, result });
                        }
                    }
                }
                Task::None | Task::Batch(_) => {}
            }
        }
    }

    // A finished transition leaves its watchdog behind; it must not hold the
    // runtime busy until the fetch timeout runs out.
    fn drop_stale_timers(&mut self) {
        let transitions = self.shell.transitions();
        self.timers.retain(|Reverse(timer)| transitions.awaits(&timer.message));
    }

    fn fire_due_timers(&mut self) {
        let now = Instant::now();
        while self
            .timers
            .peek()
            .is_some_and(|Reverse(timer)| timer.deadline <= now)
        {
            if let Some(Reverse(timer)) = self.timers.pop() {
                self.dispatch(timer.message);
            }
        }
    }

    /// Process completions until nothing is outstanding or `limit` passes.
    /// Returns whether the runtime went idle.
    pub fn run_until_idle(&mut self, limit: Duration) -> bool {
        let give_up = Instant::now() + limit;
        loop {
            self.fire_due_timers();
            if self.is_idle() {
                return true;
            }
            let now = Instant::now();
            if now >= give_up {
                return false;
            }

            let mut wake = give_up;
            if let Some(Reverse(timer)) = self.timers.peek() {
                wake = wake.min(timer.deadline);
            }
            if self.in_flight == 0 {
                std::thread::sleep(wake.saturating_duration_since(now));
                continue;
            }
            match self.results.recv_timeout(wake.saturating_duration_since(now)) {
                Ok(message) => {
                    self.in_flight -= 1;
                    self.dispatch(message);
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::warn!(in_flight = self.in_flight, "fetch worker disconnected");
                    self.in_flight = 0;
                }
            }
        }
    }
}
