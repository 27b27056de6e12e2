//! Issue models returned by GitLab issue endpoints.

use serde::{Deserialize, Serialize};

/// Represents an issue mirrored into the dashboard, carrying the
/// project-scoped `iid` used by note endpoints alongside the global id.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Issue {
    pub id: i64,
    pub iid: i64,
    pub project_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub state: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    pub web_url: Option<String>,
    #[serde(default)]
    pub milestone: Option<MilestoneRef>,
}

/// Minimal milestone reference embedded in issue payloads.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MilestoneRef {
    pub id: i64,
    pub title: Option<String>,
}
