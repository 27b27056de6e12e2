//! Typed GitLab REST API client crate used by the dashboard backend.

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod rate_limiter;

pub use client::GitLabClient;
pub use config::{GitLabConfig, SortOrder};
pub use error::{GitLabError, Result};
pub use models::{Issue, Member, MilestoneRef, Note, NoteAuthor, NotePage};
