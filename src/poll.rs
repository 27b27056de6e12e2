//! Recurring quiet-refresh schedule tied to one open issue dialog.

use crate::chat_thread::{NoteSource, ThreadSync};
use crate::relay::RelaySink;
use log::debug;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Fixed refresh period for open comment threads.
pub const COMMENT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Two-state lifecycle: inactive until started, active until stopped,
/// and terminal afterwards. The task sleeps a full period before its
/// first refresh, so a session stopped early never fires. Stopping
/// (or dropping the session) only interrupts the waiting period; a
/// refresh that is mid-walk at that moment runs to completion before
/// the task exits.
pub struct PollSession {
    period: Duration,
    handle: Option<JoinHandle<()>>,
    stop_tx: Option<watch::Sender<()>>,
    stopped: bool,
}

impl PollSession {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            handle: None,
            stop_tx: None,
            stopped: false,
        }
    }

    /// Arms the recurring refresh. No-op when already active or after
    /// the session has been stopped.
    pub fn start<S: NoteSource, R: RelaySink>(&mut self, sync: Arc<ThreadSync<S, R>>) {
        if self.stopped || self.handle.is_some() {
            return;
        }
        let period = self.period;
        let (stop_tx, mut stop_rx) = watch::channel(());
        debug!("starting comment poll for issue {}", sync.issue().iid);
        self.stop_tx = Some(stop_tx);
        self.handle = Some(tokio::spawn(async move {
            loop {
                // The stop signal only preempts the sleep, never the
                // refresh itself. changed() also fires when the sender
                // is dropped, so a dropped session ends the task too.
                tokio::select! {
                    biased;
                    _ = stop_rx.changed() => break,
                    _ = tokio::time::sleep(period) => {}
                }
                sync.refresh_quietly().await;
            }
        }));
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some() && !self.stopped
    }

    /// Cancels the recurring refresh synchronously; the session cannot
    /// be restarted afterwards. An already in-flight walk is not
    /// interrupted, only future firings are.
    pub fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        self.handle = None;
        self.stopped = true;
    }
}
