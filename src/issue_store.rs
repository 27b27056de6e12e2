//! In-memory issue cache mirrored from the tracker.

use gitlab_api::Issue;
use std::sync::{Arc, Mutex};

/// Thread-safe in-memory store for currently mirrored issues, giving
/// dialogs quick access to issue context without repeated API calls.
#[derive(Clone, Default)]
pub struct IssueStore {
    issues: Arc<Mutex<Vec<Issue>>>,
}

impl IssueStore {
    /// Replaces the current in-memory issue snapshot.
    pub fn set(&self, items: Vec<Issue>) {
        let mut issues = self.issues.lock().unwrap();
        *issues = items;
    }

    /// Returns a cloned snapshot of currently cached issues.
    pub fn snapshot(&self) -> Vec<Issue> {
        self.issues.lock().unwrap().clone()
    }

    /// Finds an issue by global id in the current cache.
    pub fn find(&self, id: i64) -> Option<Issue> {
        self.issues
            .lock()
            .unwrap()
            .iter()
            .find(|issue| issue.id == id)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::IssueStore;
    use gitlab_api::Issue;

    fn issue(id: i64, iid: i64) -> Issue {
        Issue {
            id,
            iid,
            project_id: 42,
            title: format!("Issue {iid}"),
            description: None,
            state: Some("opened".to_string()),
            labels: Vec::new(),
            web_url: None,
            milestone: None,
        }
    }

    #[test]
    fn find_locates_issue_by_global_id() {
        let store = IssueStore::default();
        store.set(vec![issue(100, 1), issue(101, 2)]);

        assert_eq!(store.find(101).map(|i| i.iid), Some(2));
        assert!(store.find(999).is_none());
    }

    #[test]
    fn set_replaces_snapshot_wholesale() {
        let store = IssueStore::default();
        store.set(vec![issue(100, 1)]);
        store.set(vec![issue(200, 5)]);

        assert!(store.find(100).is_none());
        assert_eq!(store.snapshot().len(), 1);
    }
}
