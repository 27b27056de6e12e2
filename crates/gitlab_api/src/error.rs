//! Failure modes of the GitLab REST client.
//!
//! Every public client call returns [`Result`]. Transport failures are
//! split by cause so callers can tell a rejected token apart from a flaky
//! network or a GitLab-side rejection.

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GitLabError>;

#[derive(Debug, Error)]
pub enum GitLabError {
    /// Non-success HTTP response. `code` carries the `message`/`error`
    /// field GitLab puts in its JSON error payloads, when present.
    #[error("http {status}: {message}")]
    Http {
        status: StatusCode,
        code: Option<String>,
        message: String,
    },
    /// 401 or 403, typically an invalid or expired private token.
    #[error("authentication error: {0}")]
    Authentication(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("network error: {0}")]
    Network(String),
    /// Response body did not match the expected shape.
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("unexpected error: {0}")]
    Other(String),
}

impl GitLabError {
    pub fn http(status: StatusCode, code: Option<String>, message: impl Into<String>) -> Self {
        GitLabError::Http {
            status,
            code,
            message: message.into(),
        }
    }

    /// True when retrying with the same credentials cannot succeed.
    pub fn is_authentication(&self) -> bool {
        matches!(self, GitLabError::Authentication(_))
    }
}

impl From<reqwest::Error> for GitLabError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GitLabError::Timeout(err.to_string())
        } else if err.is_connect() {
            GitLabError::Network(err.to_string())
        } else if err.is_decode() {
            GitLabError::Serialization(err.to_string())
        } else if let Some(status) = err.status() {
            GitLabError::Http {
                status,
                code: None,
                message: err.to_string(),
            }
        } else {
            GitLabError::Other(err.to_string())
        }
    }
}

impl From<serde_json::Error> for GitLabError {
    fn from(err: serde_json::Error) -> Self {
        GitLabError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_constructor_keeps_status_and_payload_code() {
        let err = GitLabError::http(
            StatusCode::NOT_FOUND,
            Some("404 Project Not Found".to_string()),
            "not found",
        );
        match err {
            GitLabError::Http { status, code, .. } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(code.as_deref(), Some("404 Project Not Found"));
            }
            other => panic!("expected http error, got {other:?}"),
        }
    }

    #[test]
    fn json_decode_failures_become_serialization_errors() {
        let decode_err = serde_json::from_str::<Vec<i64>>("not json").unwrap_err();
        let err = GitLabError::from(decode_err);
        assert!(matches!(err, GitLabError::Serialization(_)));
    }

    #[test]
    fn only_auth_errors_are_flagged_unretryable() {
        assert!(GitLabError::Authentication("denied".into()).is_authentication());
        assert!(!GitLabError::Network("reset".into()).is_authentication());
    }
}
