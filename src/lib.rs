//! Backend for the GitLab issue dashboard.
//!
//! The interesting part lives in [`chat_thread`]: per-dialog comment
//! thread synchronization with full-history pagination, a quiet
//! background refresh and mention relay on outbound sends. The stores
//! hold the issue/member snapshots the dialog reads, [`relay`] and
//! [`config`] carry the chat webhook table, and [`toast`] is the
//! notification side channel to the presentation layer.

pub mod chat_thread;
pub mod config;
pub mod dialog;
pub mod issue_store;
pub mod member_store;
pub mod poll;
pub mod relay;
pub mod toast;

pub use chat_thread::{ChatMessage, NoteSource, ThreadSync, UiSignals};
pub use config::RelayConfigManager;
pub use dialog::IssueDialog;
pub use issue_store::IssueStore;
pub use member_store::{MemberStore, UNKNOWN_AUTHOR};
pub use poll::{PollSession, COMMENT_POLL_INTERVAL};
pub use relay::{ChatMember, ChatSpace, HttpRelay, RelayConfig, RelaySink};
pub use toast::{Severity, Toast, Toasts};
