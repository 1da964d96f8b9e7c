// Tasks - deferred work the host performs on behalf of the shell
use crate::fetch::FetchRequest;
use crate::message::{FetchPurpose, Message};
use std::time::Duration;

#[derive(Debug, Default)]
pub enum Task {
    #[default]
    None,
    /// Deliver `message` after `after` has passed.
    Delay { after: Duration, message: Message },
    /// Perform `request` and deliver the result as `Message::Fetched`.
    Fetch {
        request: FetchRequest,
        purpose: FetchPurpose,
    },
    Batch(Vec<Task>),
}

impl Task {
    pub fn none() -> Self {
        Task::None
    }

    pub fn delay(after: Duration, message: Message) -> Self {
        Task::Delay { after, message }
    }

    pub fn fetch(request: FetchRequest, purpose: FetchPurpose) -> Self {
        Task::Fetch { request, purpose }
    }

    pub fn batch(tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut flat = Vec::new();
        for task in tasks {
            match task {
                Task::None => {}
                Task::Batch(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => Task::None,
            1 => flat.pop().unwrap_or_default(),
            _ => Task::Batch(flat),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Task::None)
    }

    /// Flatten into a list of leaf tasks.
    pub fn into_vec(self) -> Vec<Task> {
        match self {
            Task::None => Vec::new(),
            Task::Batch(tasks) => tasks.into_iter().flat_map(Task::into_vec).collect(),
            other => vec![other],
        }
    }
}
