//! Comment-thread synchronization engine for the issue dialog.
//!
//! One [`ThreadSync`] exists per open dialog. It owns the visible thread
//! state and keeps it in sync with the server three ways: a foreground
//! load with a loading indicator, a quiet background refresh driven by
//! the poll session, and a re-fetch after every outbound send. All
//! three rebuild the thread from a full pagination walk and replace the
//! state wholesale, so no partial update can corrupt message order.

use crate::member_store::MemberStore;
use crate::relay::{rewrite_mentions, RelayConfig, RelaySink};
use crate::toast::{
    Severity, Toasts, TOAST_NOTES_LOADED, TOAST_NOTES_LOAD_FAILED, TOAST_NOTES_NEW,
    TOAST_NOTES_PAGE_ERROR, TOAST_NOTES_REFRESH_ERROR, TOAST_NOTE_SEND_FAILED, TOAST_NOTE_SENT,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gitlab_api::{GitLabClient, Issue, Note, NotePage, SortOrder};
use log::{debug, warn};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Body of the placeholder installed when a foreground load yields
/// nothing at all.
const FALLBACK_MESSAGE: &str = "Failed to load comments from the server.";
const FALLBACK_AUTHOR: &str = "System";

/// Read side of the notes API consumed by the sync engine. Production
/// code uses [`GitLabClient`]; tests script pages in memory.
#[async_trait]
pub trait NoteSource: Send + Sync + 'static {
    async fn fetch_issue_notes(
        &self,
        project_id: &str,
        issue_iid: i64,
        page: u32,
        sort: SortOrder,
    ) -> gitlab_api::Result<NotePage>;

    async fn create_issue_note(
        &self,
        project_id: &str,
        issue_iid: i64,
        body: &str,
    ) -> gitlab_api::Result<Note>;
}

#[async_trait]
impl NoteSource for GitLabClient {
    async fn fetch_issue_notes(
        &self,
        project_id: &str,
        issue_iid: i64,
        page: u32,
        sort: SortOrder,
    ) -> gitlab_api::Result<NotePage> {
        GitLabClient::fetch_issue_notes(self, project_id, issue_iid, page, sort).await
    }

    async fn create_issue_note(
        &self,
        project_id: &str,
        issue_iid: i64,
        body: &str,
    ) -> gitlab_api::Result<Note> {
        GitLabClient::post_issue_note(self, project_id, issue_iid, body).await
    }
}

/// A note projected for display: author id resolved to a name through
/// the member directory. Always regenerable from the wire record.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: i64,
    pub author: String,
    pub body: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn from_note(note: &Note, members: &MemberStore) -> Self {
        Self {
            id: note.id,
            author: members.display_name(note.author.id),
            body: note.body.clone(),
            timestamp: note.created_at_utc().unwrap_or(DateTime::UNIX_EPOCH),
        }
    }

    fn fallback() -> Self {
        Self {
            id: 0,
            author: FALLBACK_AUTHOR.to_string(),
            body: FALLBACK_MESSAGE.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Visible thread for one issue. `applied_walk` tags the walk whose
/// result currently populates `messages`; completions of older walks
/// are discarded instead of clobbering newer ones.
#[derive(Debug, Default)]
struct ThreadState {
    messages: Vec<ChatMessage>,
    is_loading: bool,
    applied_walk: u64,
}

/// One-shot flags consumed by the presentation layer after each change
/// that should move the viewport or reset the composer.
#[derive(Clone, Default)]
pub struct UiSignals {
    scroll_to_bottom: Arc<AtomicBool>,
    reset_composer: Arc<AtomicBool>,
}

impl UiSignals {
    fn request_scroll_to_bottom(&self) {
        self.scroll_to_bottom.store(true, Ordering::SeqCst);
    }

    fn request_reset_composer(&self) {
        self.reset_composer.store(true, Ordering::SeqCst);
    }

    /// Consumes the scroll request, clearing it.
    pub fn take_scroll_to_bottom(&self) -> bool {
        self.scroll_to_bottom.swap(false, Ordering::SeqCst)
    }

    /// Consumes the composer-reset request, clearing it.
    pub fn take_reset_composer(&self) -> bool {
        self.reset_composer.swap(false, Ordering::SeqCst)
    }
}

enum WalkKind {
    Foreground,
    Quiet,
}

/// Synchronizes one issue's comment thread with the server.
pub struct ThreadSync<S: NoteSource, R: RelaySink> {
    issue: Issue,
    source: S,
    members: MemberStore,
    relay_config: RelayConfig,
    relay: R,
    toasts: Toasts,
    signals: UiSignals,
    state: Mutex<ThreadState>,
    refresh_in_flight: AtomicBool,
    walk_counter: AtomicU64,
}

impl<S: NoteSource, R: RelaySink> ThreadSync<S, R> {
    pub fn new(
        issue: Issue,
        source: S,
        members: MemberStore,
        relay_config: RelayConfig,
        relay: R,
        toasts: Toasts,
    ) -> Self {
        Self {
            issue,
            source,
            members,
            relay_config,
            relay,
            toasts,
            signals: UiSignals::default(),
            state: Mutex::new(ThreadState::default()),
            refresh_in_flight: AtomicBool::new(false),
            walk_counter: AtomicU64::new(0),
        }
    }

    pub fn issue(&self) -> &Issue {
        &self.issue
    }

    pub fn signals(&self) -> &UiSignals {
        &self.signals
    }

    /// Returns a cloned snapshot of the visible thread.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.state.lock().unwrap().messages.clone()
    }

    pub fn message_count(&self) -> usize {
        self.state.lock().unwrap().messages.len()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().unwrap().is_loading
    }

    fn next_walk_id(&self) -> u64 {
        self.walk_counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Fetches the complete note history as one ordered sequence,
    /// requesting pages strictly in increasing index order. Page N+1 is
    /// never requested before page N's response arrives, which is what
    /// keeps the assembled sequence in server order. A page failure
    /// aborts the walk and returns the prefix accumulated so far.
    async fn walk_notes(&self, kind: WalkKind) -> (Vec<ChatMessage>, bool) {
        let project_id = self.issue.project_id.to_string();
        let mut messages: Vec<ChatMessage> = Vec::new();
        let mut page: u32 = 0;

        loop {
            let result = self
                .source
                .fetch_issue_notes(&project_id, self.issue.iid, page, SortOrder::Ascending)
                .await;
            match result {
                Ok(note_page) => {
                    messages.extend(
                        note_page
                            .notes
                            .iter()
                            .map(|note| ChatMessage::from_note(note, &self.members)),
                    );
                    if !note_page.has_next_page {
                        return (messages, false);
                    }
                    page += 1;
                }
                Err(err) => {
                    warn!("note page {} fetch failed: {}", page, err);
                    let (code, action) = match kind {
                        WalkKind::Foreground => (TOAST_NOTES_PAGE_ERROR, "fetching"),
                        WalkKind::Quiet => (TOAST_NOTES_REFRESH_ERROR, "refreshing"),
                    };
                    self.toasts.show(
                        code,
                        format!("Network error while {} comments (page {})", action, page),
                        Severity::Error,
                        5000,
                    );
                    return (messages, true);
                }
            }
        }
    }

    /// Full user-visible load: clears the thread, shows the loading
    /// indicator, walks every page and publishes the result. A walk that
    /// produced nothing because of failures installs a single
    /// placeholder instead of leaving the thread empty.
    pub async fn load(&self) {
        let walk_id = self.next_walk_id();
        {
            let mut state = self.state.lock().unwrap();
            state.messages.clear();
            state.is_loading = true;
        }

        let (messages, failed) = self.walk_notes(WalkKind::Foreground).await;
        let count = messages.len();

        if failed && count == 0 {
            if self.finish_load(walk_id, vec![ChatMessage::fallback()]) {
                self.toasts.show(
                    TOAST_NOTES_LOAD_FAILED,
                    "Failed to fetch comments",
                    Severity::Error,
                    5000,
                );
            }
            return;
        }

        if self.finish_load(walk_id, messages) {
            self.signals.request_scroll_to_bottom();
            self.toasts.show(
                TOAST_NOTES_LOADED,
                format!("Fetched {} comments", count),
                Severity::Success,
                3000,
            );
        }
    }

    /// Unsets the loading flag and publishes the walk result unless a
    /// newer walk already published. The flag clears even for a stale
    /// walk; the indicator belongs to whichever load ran last, not to
    /// this walk.
    fn finish_load(&self, walk_id: u64, messages: Vec<ChatMessage>) -> bool {
        let mut state = self.state.lock().unwrap();
        state.is_loading = false;
        if walk_id <= state.applied_walk {
            debug!("discarding stale foreground walk {}", walk_id);
            return false;
        }
        state.applied_walk = walk_id;
        state.messages = messages;
        true
    }

    /// Background resynchronization without a loading indicator.
    /// Single-flight: a poll tick arriving while a previous quiet walk
    /// is still in flight returns immediately and lets that walk finish.
    /// The visible thread is replaced only when the fresh walk came back
    /// strictly longer; shorter results, including transient fetch
    /// shortfalls, leave it untouched.
    pub async fn refresh_quietly(&self) {
        if self.refresh_in_flight.swap(true, Ordering::SeqCst) {
            debug!("quiet refresh already in flight; skipping");
            return;
        }

        let walk_id = self.next_walk_id();
        let previous_count = self.message_count();
        let (scratch, _failed) = self.walk_notes(WalkKind::Quiet).await;

        if scratch.len() > previous_count {
            let new_count = scratch.len() - previous_count;
            let applied = {
                let mut state = self.state.lock().unwrap();
                if walk_id > state.applied_walk && scratch.len() > state.messages.len() {
                    state.applied_walk = walk_id;
                    state.messages = scratch;
                    true
                } else {
                    false
                }
            };
            if applied {
                self.signals.request_scroll_to_bottom();
                self.toasts.show(
                    TOAST_NOTES_NEW,
                    format!("{} new comments", new_count),
                    Severity::Info,
                    3000,
                );
            }
        }

        self.refresh_in_flight.store(false, Ordering::SeqCst);
    }

    /// Submits a new comment. Whitespace-only drafts are dropped without
    /// contacting the server. Mentions matching the project's relay
    /// aliases trigger one fire-and-forget webhook delivery with the
    /// rewritten text; the note itself is submitted with the original
    /// body. On success the thread is reloaded so the server-assigned
    /// record becomes the source of truth instead of a local echo.
    pub async fn send_message(&self, draft: &str) {
        let body = draft.trim();
        if body.is_empty() {
            return;
        }

        // Optimistic composer feedback, independent of network outcome.
        self.signals.request_reset_composer();
        self.signals.request_scroll_to_bottom();

        if let Some(space) = self.relay_config.find_space(self.issue.project_id) {
            if let Some(text) = rewrite_mentions(body, space) {
                self.relay.deliver(&space.webhook_url, text);
            }
        }

        let project_id = self.issue.project_id.to_string();
        match self
            .source
            .create_issue_note(&project_id, self.issue.iid, body)
            .await
        {
            Ok(note) => {
                debug!("note {} created on issue {}", note.id, self.issue.iid);
                self.toasts
                    .show(TOAST_NOTE_SENT, "Comment sent", Severity::Success, 2500);
                self.load().await;
            }
            Err(err) => {
                self.toasts.show(
                    TOAST_NOTE_SEND_FAILED,
                    format!("Failed to send comment: {}", err),
                    Severity::Error,
                    5000,
                );
            }
        }
    }
}
