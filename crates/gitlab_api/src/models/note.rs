//! Note (issue comment) models returned by GitLab notes endpoints.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A single comment attached to an issue. Server-assigned id, immutable
/// once created; server "oldest first" order is `(created_at, id)`
/// ascending.
#[derive(Debug, Deserialize, Clone)]
pub struct Note {
    pub id: i64,
    pub body: String,
    pub author: NoteAuthor,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    #[serde(default)]
    pub system: bool,
}

impl Note {
    /// Parses the server timestamp; GitLab emits RFC3339 with a
    /// fractional-seconds variant that older instances format without a
    /// colon in the offset.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        let raw = self.created_at.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .or_else(|| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z").ok())
            .map(|dt| dt.with_timezone(&Utc))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct NoteAuthor {
    pub id: i64,
    pub name: Option<String>,
    pub username: Option<String>,
}

/// One page of a paginated notes listing plus the has-more flag derived
/// from the server's pagination headers.
#[derive(Debug, Clone)]
pub struct NotePage {
    pub has_next_page: bool,
    pub notes: Vec<Note>,
}

#[cfg(test)]
mod tests {
    use super::{Note, NoteAuthor};

    fn note_with_created_at(created_at: Option<&str>) -> Note {
        Note {
            id: 1,
            body: "hi".to_string(),
            author: NoteAuthor {
                id: 2,
                name: Some("Alice".to_string()),
                username: Some("alice".to_string()),
            },
            created_at: created_at.map(ToOwned::to_owned),
            updated_at: None,
            system: false,
        }
    }

    #[test]
    fn created_at_utc_parses_rfc3339() {
        let note = note_with_created_at(Some("2026-01-05T09:00:00.123Z"));
        let parsed = note.created_at_utc().expect("timestamp should parse");
        assert_eq!(parsed.timestamp(), 1767603600);
    }

    #[test]
    fn created_at_utc_handles_missing_and_garbage() {
        assert!(note_with_created_at(None).created_at_utc().is_none());
        assert!(note_with_created_at(Some("yesterday"))
            .created_at_utc()
            .is_none());
    }
}
