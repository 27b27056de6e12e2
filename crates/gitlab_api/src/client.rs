use crate::config::{GitLabConfig, SortOrder};
use crate::error::{GitLabError, Result};
use crate::models::{Issue, Member, Note, NotePage};
use crate::rate_limiter::RateLimiter;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Client as HttpClient, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

const PRIVATE_TOKEN_HEADER: &str = "PRIVATE-TOKEN";
const NEXT_PAGE_HEADER: &str = "x-next-page";
const NOTES_PER_PAGE: u32 = 100;
const MEMBERS_PER_PAGE: u32 = 100;
const ISSUES_PER_PAGE: u32 = 100;

#[derive(Clone)]
pub struct GitLabClient {
    http: HttpClient,
    config: GitLabConfig,
    limiter: RateLimiter,
}

impl GitLabClient {
    pub fn new(config: GitLabConfig) -> Result<Self> {
        let http = build_http_client(&config)?;
        let limiter = RateLimiter::new(config.cooldown);
        Ok(Self {
            http,
            config,
            limiter,
        })
    }

    async fn get<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.limiter.acquire().await;
        let mut request = self.http.get(self.url_for(path));
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = request.send().await?;
        Self::parse_json(response).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.limiter.acquire().await;
        let response = self.http.post(self.url_for(path)).json(body).send().await?;
        Self::parse_json(response).await
    }

    fn url_for(&self, path: &str) -> String {
        let mut base = self.config.api_root();
        let trimmed = path.trim_start_matches('/');
        base.push_str(trimmed);
        base
    }

    async fn parse_json<T>(response: Response) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = Self::ensure_success(response).await?;
        response.json::<T>().await.map_err(GitLabError::from)
    }

    /// Maps auth rejections and non-success statuses to semantic errors,
    /// passing the response through untouched otherwise.
    async fn ensure_success(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            Err(GitLabError::Authentication(format!(
                "Access denied ({}) - {}",
                status, body
            )))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(build_http_error(status, &body))
        }
    }

    /// Fetches one page of an issue's notes. `page` is zero-based as the
    /// sync engine counts pages; GitLab counts from 1. The has-more flag
    /// comes from the server's `x-next-page` pagination header.
    pub async fn fetch_issue_notes(
        &self,
        project_id: &str,
        issue_iid: i64,
        page: u32,
        sort: SortOrder,
    ) -> Result<NotePage> {
        self.limiter.acquire().await;
        let path = format!("projects/{}/issues/{}/notes", project_id, issue_iid);
        let query = [
            ("page", (page + 1).to_string()),
            ("per_page", NOTES_PER_PAGE.to_string()),
            ("sort", sort.as_str().to_string()),
            ("order_by", "created_at".to_string()),
        ];
        let response = self
            .http
            .get(self.url_for(&path))
            .query(&query)
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;

        let has_next_page = response
            .headers()
            .get(NEXT_PAGE_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(|value| !value.trim().is_empty())
            .unwrap_or(false);
        let notes = response.json::<Vec<Note>>().await?;
        debug!(
            page,
            count = notes.len(),
            has_next_page,
            "fetched issue notes page"
        );

        Ok(NotePage {
            has_next_page,
            notes,
        })
    }

    /// Creates a new note on an issue and returns the server-assigned
    /// record.
    pub async fn post_issue_note(
        &self,
        project_id: &str,
        issue_iid: i64,
        body: &str,
    ) -> Result<Note> {
        let path = format!("projects/{}/issues/{}/notes", project_id, issue_iid);
        let payload = NoteCreateRequest { body };
        self.post(&path, &payload).await
    }

    /// Lists all members of a project, including inherited ones.
    pub async fn fetch_project_members(&self, project_id: &str) -> Result<Vec<Member>> {
        let path = format!("projects/{}/members/all", project_id);
        self.get(&path, &[("per_page", MEMBERS_PER_PAGE.to_string())])
            .await
    }

    /// Lists issues of a project, optionally filtered by state.
    pub async fn fetch_project_issues(
        &self,
        project_id: &str,
        state: Option<&str>,
    ) -> Result<Vec<Issue>> {
        let path = format!("projects/{}/issues", project_id);
        let mut query = vec![("per_page", ISSUES_PER_PAGE.to_string())];
        if let Some(state) = state {
            query.push(("state", state.to_string()));
        }
        self.get(&path, &query).await
    }

    /// Fetches the profile of the authenticated user.
    pub async fn fetch_current_user(&self) -> Result<Member> {
        self.get("user", &[]).await
    }
}

fn build_http_client(config: &GitLabConfig) -> Result<HttpClient> {
    let mut headers = HeaderMap::new();

    let token_name = HeaderName::from_bytes(PRIVATE_TOKEN_HEADER.as_bytes())
        .map_err(|err| GitLabError::Other(err.to_string()))?;
    headers.insert(token_name, header_value(config.token.clone())?);
    headers.insert(USER_AGENT, header_value(config.user_agent.clone())?);

    HttpClient::builder()
        .default_headers(headers)
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .build()
        .map_err(|err| GitLabError::Other(err.to_string()))
}

fn header_value(value: String) -> Result<HeaderValue> {
    HeaderValue::from_str(&value).map_err(|err| GitLabError::Other(err.to_string()))
}

fn build_http_error(status: StatusCode, body: &str) -> GitLabError {
    let code = extract_error_message(body);
    GitLabError::http(status, code, body.to_string())
}

/// GitLab error payloads carry either a `message` or an `error` field.
fn extract_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body).ok().and_then(|value| {
        value
            .get("message")
            .or_else(|| value.get("error"))
            .and_then(|m| m.as_str())
            .map(|s| s.to_string())
    })
}

#[derive(Debug, Serialize)]
struct NoteCreateRequest<'a> {
    body: &'a str,
}
