//! Project member models returned by GitLab membership endpoints.

use serde::{Deserialize, Serialize};

/// Represents a project member as returned by the members and current
/// user endpoints, including id, display name and login.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Member {
    pub id: i64,
    pub name: String,
    pub username: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}
