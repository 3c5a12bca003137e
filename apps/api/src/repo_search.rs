/// Repository Search — popularity-sorted code repository lookup for a role.
///
/// Single best-effort attempt per call, no retries. Every failure (rate limit,
/// non-2xx status, timeout, unreachable host, malformed body) degrades to an
/// empty repository list plus a user-visible notice; it never fails the caller.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const GITHUB_API_URL: &str = "https://api.github.com";
const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
pub const RATE_LIMIT_MESSAGE: &str = "GitHub rate limit exceeded. Try again later.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub full_name: String,
    pub html_url: String,
    pub stargazers_count: u64,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    RateLimited,
    UpstreamError,
    Unreachable,
}

/// Why a lookup came back empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepoNotice {
    pub kind: NoticeKind,
    pub message: String,
}

/// Outcome of one lookup. `notice` is set only when the search failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepoLookup {
    pub query: String,
    pub repositories: Vec<Repository>,
    pub notice: Option<RepoNotice>,
}

impl RepoLookup {
    pub fn found(query: &str, repositories: Vec<Repository>) -> Self {
        Self {
            query: query.to_string(),
            repositories,
            notice: None,
        }
    }

    pub fn degraded(query: &str, notice: RepoNotice) -> Self {
        Self {
            query: query.to_string(),
            repositories: Vec::new(),
            notice: Some(notice),
        }
    }
}

/// Pluggable repository search backend.
///
/// Carried in the pipeline as `Arc<dyn RepositorySearch>`.
#[async_trait]
pub trait RepositorySearch: Send + Sync {
    async fn search(&self, query: &str) -> RepoLookup;
}

/// Search text for repositories related to a role.
pub fn role_query(role: &str) -> String {
    format!("{role} in:name,description")
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    items: Vec<Repository>,
}

#[derive(Debug, Deserialize)]
struct GithubErrorBody {
    message: String,
}

/// GitHub repository search client.
#[derive(Clone)]
pub struct GithubClient {
    client: Client,
    base_url: String,
    per_page: u32,
}

impl GithubClient {
    pub fn new(base_url: &str, per_page: u32, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            per_page,
        })
    }

    async fn fetch(&self, query: &str) -> Result<Vec<Repository>, RepoNotice> {
        let url = format!("{}/search/repositories", self.base_url);
        let per_page = self.per_page.to_string();

        let response = self
            .client
            .get(&url)
            .header("Accept", GITHUB_ACCEPT)
            .query(&[
                ("q", query),
                ("sort", "stars"),
                ("order", "desc"),
                ("per_page", per_page.as_str()),
            ])
            .send()
            .await
            .map_err(|e| RepoNotice {
                kind: NoticeKind::Unreachable,
                message: if e.is_timeout() {
                    "GitHub search timed out.".to_string()
                } else {
                    format!("GitHub search is unreachable: {e}")
                },
            })?;

        let status = response.status();

        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(RepoNotice {
                kind: NoticeKind::RateLimited,
                message: RATE_LIMIT_MESSAGE.to_string(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GithubErrorBody>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(RepoNotice {
                kind: NoticeKind::UpstreamError,
                message: format!("Error: {}, {}", status.as_u16(), message),
            });
        }

        let parsed: SearchResponse = response.json().await.map_err(|e| RepoNotice {
            kind: NoticeKind::UpstreamError,
            message: format!("GitHub returned an unreadable response: {e}"),
        })?;

        Ok(parsed.items)
    }
}

#[async_trait]
impl RepositorySearch for GithubClient {
    async fn search(&self, query: &str) -> RepoLookup {
        match self.fetch(query).await {
            Ok(repositories) => {
                debug!("GitHub search '{}' returned {} repositories", query, repositories.len());
                RepoLookup::found(query, repositories)
            }
            Err(notice) => {
                warn!("GitHub search '{}' degraded: {}", query, notice.message);
                RepoLookup::degraded(query, notice)
            }
        }
    }
}
