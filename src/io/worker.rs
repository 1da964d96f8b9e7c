use crate::fetch::{fetch_fragment, FetchRequest, Fetcher};
use crate::message::{FetchPurpose, Message};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;

pub enum IoCommand {
    Fetch {
        request: FetchRequest,
        purpose: FetchPurpose,
    },
}

/// Run fetches on a background thread. Every command produces exactly one
/// `Message::Fetched` on the returned receiver.
pub fn spawn_worker<F>(fetcher: F) -> (Sender<IoCommand>, Receiver<Message>)
where
    F: Fetcher + 'static,
{
    let (cmd_tx, cmd_rx) = channel();
    let (res_tx, res_rx) = channel();

    thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                IoCommand::Fetch { request, purpose } => {
                    let result = fetch_fragment(&fetcher, &request);
                    if res_tx.send(Message::Fetched { purpose, result }).is_err() {
                        break;
                    }
                }
            }
        }
        tracing::debug!("fetch worker stopped");
    });

    (cmd_tx, res_rx)
}
