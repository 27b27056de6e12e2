//! Issue dialog lifecycle: owns the thread synchronizer and its poll
//! session for as long as the dialog stays open.

use crate::chat_thread::{NoteSource, ThreadSync};
use crate::issue_store::IssueStore;
use crate::member_store::MemberStore;
use crate::poll::{PollSession, COMMENT_POLL_INTERVAL};
use crate::relay::{RelayConfig, RelaySink};
use crate::toast::Toasts;
use log::warn;
use std::sync::Arc;
use std::time::Duration;

/// An open issue detail dialog. Opening resolves the issue context,
/// runs the initial foreground load and arms the comment poll; closing
/// tears the poll down. A walk still in flight at close time finishes
/// against a state nobody reads anymore, which is a safe no-op.
pub struct IssueDialog<S: NoteSource, R: RelaySink> {
    sync: Arc<ThreadSync<S, R>>,
    poll: PollSession,
}

impl<S: NoteSource, R: RelaySink> IssueDialog<S, R> {
    /// Opens the dialog for a cached issue. Returns `None` when the
    /// issue id is not in the store; an unresolved issue context is a
    /// silent no-op, not an error.
    pub async fn open(
        issue_id: i64,
        issues: &IssueStore,
        source: S,
        members: MemberStore,
        relay_config: RelayConfig,
        relay: R,
        toasts: Toasts,
    ) -> Option<Self> {
        Self::open_with_poll_period(
            issue_id,
            issues,
            source,
            members,
            relay_config,
            relay,
            toasts,
            COMMENT_POLL_INTERVAL,
        )
        .await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn open_with_poll_period(
        issue_id: i64,
        issues: &IssueStore,
        source: S,
        members: MemberStore,
        relay_config: RelayConfig,
        relay: R,
        toasts: Toasts,
        poll_period: Duration,
    ) -> Option<Self> {
        let Some(issue) = issues.find(issue_id) else {
            warn!("dialog requested for unknown issue {}", issue_id);
            return None;
        };

        let sync = Arc::new(ThreadSync::new(
            issue,
            source,
            members,
            relay_config,
            relay,
            toasts,
        ));
        sync.load().await;

        let mut poll = PollSession::new(poll_period);
        poll.start(Arc::clone(&sync));

        Some(Self { sync, poll })
    }

    /// The dialog's thread synchronizer, shared with the presentation
    /// layer for reads and outbound sends.
    pub fn thread(&self) -> &Arc<ThreadSync<S, R>> {
        &self.sync
    }

    /// Closes the dialog, cancelling the poll session.
    pub fn close(mut self) {
        self.poll.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::IssueDialog;
    use crate::chat_thread::testutil::{note, page, test_issue, RecordingRelay, ScriptedSource};
    use crate::issue_store::IssueStore;
    use crate::member_store::MemberStore;
    use crate::relay::RelayConfig;
    use crate::toast::Toasts;
    use std::time::Duration;

    fn store_with_issue() -> IssueStore {
        let store = IssueStore::default();
        store.set(vec![test_issue()]);
        store
    }

    #[tokio::test]
    async fn open_unknown_issue_is_a_silent_no_op() {
        let (toasts, mut rx) = Toasts::channel();
        let dialog = IssueDialog::open(
            999,
            &IssueStore::default(),
            ScriptedSource::default(),
            MemberStore::default(),
            RelayConfig::default(),
            RecordingRelay::default(),
            toasts,
        )
        .await;

        assert!(dialog.is_none());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn open_runs_initial_load_and_arms_polling() {
        let source = ScriptedSource::with_pages(vec![page(
            vec![note(11, 1, "first", "2026-01-05T09:00:00Z")],
            false,
        )]);
        let (toasts, _rx) = Toasts::channel();

        let dialog = IssueDialog::open_with_poll_period(
            100,
            &store_with_issue(),
            source.clone(),
            MemberStore::default(),
            RelayConfig::default(),
            RecordingRelay::default(),
            toasts,
            Duration::from_millis(20),
        )
        .await
        .expect("dialog should open");

        assert_eq!(dialog.thread().message_count(), 1);
        let after_load = source.fetches();

        tokio::time::sleep(Duration::from_millis(70)).await;
        assert!(source.fetches() > after_load);

        dialog.close();
    }

    #[tokio::test]
    async fn close_stops_the_poll_session() {
        let source = ScriptedSource::with_pages(vec![page(vec![], false)]);
        let (toasts, _rx) = Toasts::channel();

        let dialog = IssueDialog::open_with_poll_period(
            100,
            &store_with_issue(),
            source.clone(),
            MemberStore::default(),
            RelayConfig::default(),
            RecordingRelay::default(),
            toasts,
            Duration::from_millis(20),
        )
        .await
        .expect("dialog should open");

        let after_load = source.fetches();
        dialog.close();

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(source.fetches(), after_load);
    }
}
