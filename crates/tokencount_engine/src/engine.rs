use std::sync::{mpsc, Arc};
use std::thread;

use engine_logging::{engine_debug, engine_warn};
use tokio_util::sync::CancellationToken;

use crate::{CountFailure, CountJob, EngineError, EngineEvent, Generation, TokenCounter};

/// Called after every emitted event, from a worker thread.
///
/// Hosts use it to queue a pump of the event channel on their UI thread.
pub trait EventNotifier: Send + Sync {
    fn notify(&self);
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
    notifier: Option<Arc<dyn EventNotifier>>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>, notifier: Option<Arc<dyn EventNotifier>>) -> Self {
        Self { tx, notifier }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        if self.tx.send(event).is_ok() {
            if let Some(notifier) = &self.notifier {
                notifier.notify();
            }
        }
    }
}

/// Handle to a scheduled count. Cancelling is cooperative: the task observes it
/// after the debounce wait and again before reporting.
#[derive(Debug, Clone)]
pub struct CountTicket {
    generation: Generation,
    token: CancellationToken,
}

impl CountTicket {
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

enum EngineCommand {
    Count {
        job: CountJob,
        token: CancellationToken,
    },
}

pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(
        counter: Arc<dyn TokenCounter>,
        notifier: Option<Arc<dyn EventNotifier>>,
    ) -> Result<Self, EngineError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .thread_name("tokencount-worker")
            .enable_time()
            .build()
            .map_err(EngineError::Runtime)?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let sink: Arc<dyn EventSink> = Arc::new(ChannelEventSink::new(event_tx, notifier));

        thread::Builder::new()
            .name("tokencount-engine".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    let counter = counter.clone();
                    let sink = sink.clone();
                    runtime.spawn(async move {
                        handle_command(counter, command, sink).await;
                    });
                }
                // Superseded counts may still be running; let them finish detached.
                runtime.shutdown_background();
            })
            .map_err(EngineError::Spawn)?;

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn schedule(&self, job: CountJob) -> CountTicket {
        let token = CancellationToken::new();
        let ticket = CountTicket {
            generation: job.generation,
            token: token.clone(),
        };
        engine_debug!("Scheduling count {}", job);
        if self.cmd_tx.send(EngineCommand::Count { job, token }).is_err() {
            engine_warn!("Engine thread is gone; count {} dropped", ticket.generation);
        }
        ticket
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_command(
    counter: Arc<dyn TokenCounter>,
    command: EngineCommand,
    sink: Arc<dyn EventSink>,
) {
    match command {
        EngineCommand::Count { job, token } => {
            let CountJob {
                view,
                generation,
                text,
                debounce,
            } = job;

            tokio::select! {
                _ = token.cancelled() => {
                    engine_debug!("Count {} superseded during debounce", generation);
                    return;
                }
                _ = tokio::time::sleep(debounce) => {}
            }
            if token.is_cancelled() {
                engine_debug!("Count {} superseded during debounce", generation);
                return;
            }

            let result = tokio::task::spawn_blocking(move || counter.count(&text))
                .await
                .map_err(|err| {
                    if err.is_panic() {
                        CountFailure::Panicked(panic_message(err.into_panic()))
                    } else {
                        CountFailure::Aborted
                    }
                });

            if token.is_cancelled() {
                engine_debug!("Count {} superseded while counting", generation);
                return;
            }
            if let Err(failure) = &result {
                engine_warn!("Count {} for view {} failed: {}", generation, view, failure);
            }
            sink.emit(EngineEvent::CountCompleted {
                view,
                generation,
                result,
            });
        }
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
