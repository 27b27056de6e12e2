//! Transient user-facing notification channel.
//!
//! The sync engine reports outcomes as toasts; the presentation layer
//! drains the receiving end and renders them. Codes are stable per
//! failure site so the frontend can dedupe or test against them.

use log::debug;
use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Comment history load completed.
pub const TOAST_NOTES_LOADED: u16 = 99;
/// Comment history load produced nothing; placeholder installed.
pub const TOAST_NOTES_LOAD_FAILED: u16 = 100;
/// A single page fetch failed during a foreground load.
pub const TOAST_NOTES_PAGE_ERROR: u16 = 101;
/// Quiet refresh found new comments.
pub const TOAST_NOTES_NEW: u16 = 102;
/// A single page fetch failed during a quiet refresh.
pub const TOAST_NOTES_REFRESH_ERROR: u16 = 103;
/// Outbound comment submission failed.
pub const TOAST_NOTE_SEND_FAILED: u16 = 106;
/// Outbound comment submitted.
pub const TOAST_NOTE_SENT: u16 = 107;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Error,
}

/// A single notification popup, serialized as-is to the frontend.
#[derive(Clone, Debug, Serialize)]
pub struct Toast {
    pub code: u16,
    pub message: String,
    pub severity: Severity,
    pub duration_ms: u64,
}

/// Clonable sending half of the notification channel. Showing a toast
/// after the receiving side is gone is a silent no-op; the dialog that
/// would have displayed it no longer exists.
#[derive(Clone)]
pub struct Toasts {
    tx: UnboundedSender<Toast>,
}

impl Toasts {
    pub fn channel() -> (Self, UnboundedReceiver<Toast>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn show(&self, code: u16, message: impl Into<String>, severity: Severity, duration_ms: u64) {
        let toast = Toast {
            code,
            message: message.into(),
            severity,
            duration_ms,
        };
        if self.tx.send(toast).is_err() {
            debug!("toast receiver dropped; notification discarded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Severity, Toasts, TOAST_NOTES_LOADED};

    #[tokio::test]
    async fn show_delivers_toast_with_code_and_severity() {
        let (toasts, mut rx) = Toasts::channel();
        toasts.show(TOAST_NOTES_LOADED, "Fetched 5 comments", Severity::Success, 3000);

        let toast = rx.recv().await.expect("toast should arrive");
        assert_eq!(toast.code, TOAST_NOTES_LOADED);
        assert_eq!(toast.severity, Severity::Success);
        assert_eq!(toast.duration_ms, 3000);
    }

    #[test]
    fn show_after_receiver_dropped_is_a_no_op() {
        let (toasts, rx) = Toasts::channel();
        drop(rx);
        toasts.show(TOAST_NOTES_LOADED, "late", Severity::Info, 1000);
    }
}
