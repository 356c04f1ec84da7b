use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use tracing::{debug, info, warn};

use crate::engine::llm_client::Responder;
use crate::engine::protocol::{DialogueCommand, DialogueEvent};
use crate::engine::world::DialogueRequest;

/// Owns the responder on its own thread so slow completions never stall a frame.
pub struct DialogueWorker<R: Responder> {
    rx: Receiver<DialogueCommand>,
    tx: Sender<DialogueEvent>,
    responder: R,
}

impl<R: Responder> DialogueWorker<R> {
    pub fn new(rx: Receiver<DialogueCommand>, tx: Sender<DialogueEvent>, responder: R) -> Self {
        Self { rx, tx, responder }
    }

    pub fn run(&mut self) {
        while let Ok(cmd) = self.rx.recv() {
            match cmd {
                DialogueCommand::Respond {
                    villager,
                    conversation,
                    utterance,
                    context,
                } => {
                    debug!(villager, "requesting dialogue");
                    let text = self.responder.respond(&utterance, &context);

                    let reply = DialogueEvent::Reply {
                        villager,
                        conversation,
                        text,
                    };
                    if self.tx.send(reply).is_err() {
                        break;
                    }
                }

                DialogueCommand::Shutdown => break,
            }
        }
        info!("dialogue worker stopped");
    }
}

/// Simulation-side end of the worker channels.
pub struct DialogueHandle {
    cmd_tx: Sender<DialogueCommand>,
    resp_rx: Receiver<DialogueEvent>,
}

impl DialogueHandle {
    pub fn spawn<R: Responder + 'static>(responder: R) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();

        let spawned = thread::Builder::new()
            .name("dialogue".into())
            .spawn(move || {
                let mut worker = DialogueWorker::new(cmd_rx, resp_tx, responder);
                worker.run();
            });

        // Without a worker every request fails and callers fall back.
        if let Err(err) = spawned {
            warn!(error = %err, "could not start dialogue worker");
        }

        Self { cmd_tx, resp_rx }
    }

    /// Queues a request. Returns false if the worker is gone.
    pub fn request(&self, request: DialogueRequest) -> bool {
        let DialogueRequest {
            villager,
            conversation,
            utterance,
            context,
        } = request;

        self.cmd_tx
            .send(DialogueCommand::Respond {
                villager,
                conversation,
                utterance,
                context,
            })
            .is_ok()
    }

    /// Non-blocking poll for a finished reply.
    pub fn try_next(&self) -> Option<DialogueEvent> {
        match self.resp_rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

/// The worker is not joined: an in-flight completion may hold it for the full timeout.
impl Drop for DialogueHandle {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(DialogueCommand::Shutdown);
    }
}
