//! In-memory member directory used to resolve comment authors.

use gitlab_api::Member;
use std::sync::{Arc, Mutex};

/// Display name used when an author id has no directory entry.
pub const UNKNOWN_AUTHOR: &str = "Unknown user";

/// Thread-safe snapshot of the project member directory, refreshed from
/// the members endpoint and read synchronously during thread assembly.
#[derive(Clone, Default)]
pub struct MemberStore {
    members: Arc<Mutex<Vec<Member>>>,
}

impl MemberStore {
    /// Replaces the current member snapshot.
    pub fn set(&self, items: Vec<Member>) {
        let mut members = self.members.lock().unwrap();
        *members = items;
    }

    /// Returns a cloned snapshot of the directory.
    pub fn snapshot(&self) -> Vec<Member> {
        self.members.lock().unwrap().clone()
    }

    /// Finds a member by numeric id.
    pub fn find_by_id(&self, id: i64) -> Option<Member> {
        self.members
            .lock()
            .unwrap()
            .iter()
            .find(|member| member.id == id)
            .cloned()
    }

    /// Resolves an author id to a display name, falling back to the
    /// unknown-user sentinel.
    pub fn display_name(&self, id: i64) -> String {
        self.find_by_id(id)
            .map(|member| member.name)
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{MemberStore, UNKNOWN_AUTHOR};
    use gitlab_api::Member;

    fn member(id: i64, name: &str) -> Member {
        Member {
            id,
            name: name.to_string(),
            username: None,
            avatar_url: None,
        }
    }

    #[test]
    fn find_by_id_returns_matching_member() {
        let store = MemberStore::default();
        store.set(vec![member(1, "Alice"), member(2, "Bob")]);

        assert_eq!(store.find_by_id(2).map(|m| m.name).as_deref(), Some("Bob"));
        assert!(store.find_by_id(3).is_none());
    }

    #[test]
    fn display_name_falls_back_to_unknown_sentinel() {
        let store = MemberStore::default();
        store.set(vec![member(1, "Alice")]);

        assert_eq!(store.display_name(1), "Alice");
        assert_eq!(store.display_name(99), UNKNOWN_AUTHOR);
    }

    #[test]
    fn set_replaces_previous_snapshot() {
        let store = MemberStore::default();
        store.set(vec![member(1, "Alice")]);
        store.set(vec![member(2, "Bob")]);

        assert!(store.find_by_id(1).is_none());
        assert_eq!(store.snapshot().len(), 1);
    }
}
