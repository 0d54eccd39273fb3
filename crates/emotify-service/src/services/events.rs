//! Outbound event channel of a run

use emotify_core::{Notice, NoticeKind, Progress, RunEvent};
use tokio::sync::mpsc;
use tracing::debug;

use super::cancel::CancelFlag;

/// Sending half of a run's event stream
///
/// Progress is lossy: when the buffer is full the update is dropped, since a
/// newer one follows after the next reaction call. Every other event waits
/// for room until the run is cancelled; from then on a full buffer drops it.
/// A closed receiver never stops the run.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::Sender<RunEvent>,
    cancel: CancelFlag,
}

impl EventSink {
    pub fn new(tx: mpsc::Sender<RunEvent>, cancel: CancelFlag) -> Self {
        Self { tx, cancel }
    }

    /// Create a sink with its receiving half
    pub fn channel(buffer: usize, cancel: CancelFlag) -> (Self, mpsc::Receiver<RunEvent>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (Self::new(tx, cancel), rx)
    }

    async fn emit(&self, event: RunEvent) {
        if self.cancel.is_cancelled() {
            if self.tx.try_send(event).is_err() {
                debug!("Event dropped after cancel");
            }
            return;
        }

        tokio::select! {
            sent = self.tx.send(event) => {
                if sent.is_err() {
                    debug!("Event receiver dropped");
                }
            }
            () = self.cancel.cancelled() => debug!("Event dropped after cancel"),
        }
    }

    pub async fn status(&self, text: impl Into<String>) {
        self.emit(RunEvent::Status(text.into())).await;
    }

    pub async fn running(&self, running: bool) {
        self.emit(RunEvent::Running(running)).await;
    }

    pub async fn notice(&self, kind: NoticeKind, detail: impl Into<String>) {
        self.emit(RunEvent::Notice(Notice::new(kind, detail))).await;
    }

    pub fn progress(&self, messages: u64, reactions: u64) {
        // Dropped when full
        let _ = self.tx.try_send(RunEvent::Progress(Progress {
            messages,
            reactions,
        }));
    }
}
