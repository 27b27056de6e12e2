//! Chat relay: per-project webhook configuration, mention rewriting and
//! the fire-and-forget delivery sink.
//!
//! A comment that mentions a configured alias is additionally relayed to
//! the chat webhook of the issue's owning project, with each mention
//! token rewritten to the chat system's addressed form. Relay delivery
//! never gates the comment submission itself.

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

static MENTION_TOKEN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@([A-Za-z0-9_.\-]+)").expect("invalid mention regex"));

/// One `(alias, chat user id)` pair; an `@alias` token in an outbound
/// comment is rewritten to `<users/{chat_user_id}>` before relay.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChatMember {
    pub alias: String,
    pub chat_user_id: String,
}

/// Webhook endpoint and mention aliases for one project.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChatSpace {
    pub project_id: i64,
    pub webhook_url: String,
    #[serde(default)]
    pub members: Vec<ChatMember>,
}

/// Immutable process-scoped relay lookup table, loaded once at startup.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RelayConfig {
    #[serde(default)]
    pub spaces: Vec<ChatSpace>,
}

impl RelayConfig {
    pub fn find_space(&self, project_id: i64) -> Option<&ChatSpace> {
        self.spaces
            .iter()
            .find(|space| space.project_id == project_id)
    }
}

/// Rewrites every `@alias` token matching a configured member to the
/// chat-addressed form. Returns `None` when no token matched, in which
/// case nothing is relayed.
pub fn rewrite_mentions(body: &str, space: &ChatSpace) -> Option<String> {
    let mut matched = 0usize;
    let rewritten = MENTION_TOKEN_REGEX.replace_all(body, |caps: &Captures<'_>| {
        let token = &caps[1];
        match space.members.iter().find(|member| member.alias == token) {
            Some(member) => {
                matched += 1;
                format!("<users/{}>", member.chat_user_id)
            }
            None => caps[0].to_string(),
        }
    });

    if matched > 0 {
        Some(rewritten.into_owned())
    } else {
        None
    }
}

/// Delivery sink for relayed messages. The production sink posts to the
/// webhook without awaiting the response; tests swap in a recorder.
pub trait RelaySink: Send + Sync + 'static {
    fn deliver(&self, webhook_url: &str, text: String);
}

/// Posts `{"text": …}` to the chat webhook on a detached task. Transport
/// errors are logged, never surfaced.
#[derive(Clone)]
pub struct HttpRelay {
    http: reqwest::Client,
}

impl HttpRelay {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }
}

impl Default for HttpRelay {
    fn default() -> Self {
        Self::new()
    }
}

impl RelaySink for HttpRelay {
    fn deliver(&self, webhook_url: &str, text: String) {
        let http = self.http.clone();
        let url = webhook_url.to_string();
        tokio::spawn(async move {
            let result = http
                .post(&url)
                .json(&serde_json::json!({ "text": text }))
                .send()
                .await;
            match result {
                Ok(response) if response.status().is_success() => {
                    debug!("relay delivery accepted");
                }
                Ok(response) => {
                    warn!("relay delivery rejected: {}", response.status());
                }
                Err(err) => {
                    warn!("relay delivery failed: {}", err);
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::{rewrite_mentions, ChatMember, ChatSpace, RelayConfig};

    fn space() -> ChatSpace {
        ChatSpace {
            project_id: 42,
            webhook_url: "https://chat.example.com/hook".to_string(),
            members: vec![
                ChatMember {
                    alias: "alice".to_string(),
                    chat_user_id: "1001".to_string(),
                },
                ChatMember {
                    alias: "bob".to_string(),
                    chat_user_id: "1002".to_string(),
                },
            ],
        }
    }

    #[test]
    fn rewrites_configured_alias_to_addressed_form() {
        let rewritten = rewrite_mentions("hello @alice", &space());
        assert_eq!(rewritten.as_deref(), Some("hello <users/1001>"));
    }

    #[test]
    fn rewrites_multiple_distinct_aliases() {
        let rewritten = rewrite_mentions("@alice please sync with @bob", &space());
        assert_eq!(
            rewritten.as_deref(),
            Some("<users/1001> please sync with <users/1002>")
        );
    }

    #[test]
    fn unknown_tokens_are_left_untouched_and_do_not_trigger_relay() {
        assert!(rewrite_mentions("hello @mallory", &space()).is_none());
        assert!(rewrite_mentions("no mentions here", &space()).is_none());
    }

    #[test]
    fn alias_must_match_the_whole_token() {
        // "@al" is a prefix of a configured alias but not an alias itself.
        let members = vec![ChatMember {
            alias: "al".to_string(),
            chat_user_id: "2000".to_string(),
        }];
        let space = ChatSpace {
            members,
            ..space()
        };
        assert!(rewrite_mentions("ping @alice", &space).is_none());
    }

    #[test]
    fn find_space_matches_by_project_id() {
        let config = RelayConfig {
            spaces: vec![space()],
        };
        assert!(config.find_space(42).is_some());
        assert!(config.find_space(7).is_none());
    }
}
