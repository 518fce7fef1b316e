//! `reqwest`-backed implementation of [`RepoApi`] for the GitHub REST API

use super::api::{ContentResponse, RepoApi, RepositoryRef, TreeListing};
use super::error::ApiError;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, RETRY_AFTER, USER_AGENT};
use reqwest::{Client, Response, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
const GITHUB_MEDIA_TYPE: &str = "application/vnd.github.v3+json";

#[derive(Debug, Deserialize)]
struct RepositoryMetadata {
    #[serde(default)]
    default_branch: Option<String>,
}

/// GitHub REST client
///
/// The bearer token travels with each [`RepositoryRef`], so one client can
/// serve authenticated and anonymous scans alike.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    base_url: Url,
    user_agent: String,
}

impl GitHubClient {
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::Transport(format!("invalid API url '{base_url}': {e}")))?;
        let http = Client::builder()
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url,
            user_agent: user_agent.to_string(),
        })
    }

    fn endpoint<'a, I>(&self, segments: I) -> Result<Url, ApiError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Transport(format!("API url cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        repo: &RepositoryRef,
    ) -> Result<T, ApiError> {
        tracing::trace!("GET {}", url);
        let mut request = self
            .http
            .get(url.clone())
            .header(ACCEPT, GITHUB_MEDIA_TYPE)
            .header(USER_AGENT, &self.user_agent);
        if let Some(token) = &repo.auth_token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let response = request.send().await?;
        let response = check_status(response, url.path()).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl RepoApi for GitHubClient {
    async fn default_branch(&self, repo: &RepositoryRef) -> Result<Option<String>, ApiError> {
        let url = self.endpoint(["repos", repo.owner.as_str(), repo.name.as_str()])?;
        let metadata: RepositoryMetadata = self.get_json(url, repo).await?;
        Ok(metadata.default_branch)
    }

    async fn tree(&self, repo: &RepositoryRef, branch: &str) -> Result<TreeListing, ApiError> {
        let mut url = self.endpoint([
            "repos",
            repo.owner.as_str(),
            repo.name.as_str(),
            "git",
            "trees",
            branch,
        ])?;
        url.query_pairs_mut().append_pair("recursive", "1");
        self.get_json(url, repo).await
    }

    async fn content(
        &self,
        repo: &RepositoryRef,
        git_ref: &str,
        path: &str,
    ) -> Result<ContentResponse, ApiError> {
        let mut url = self.endpoint(
            ["repos", repo.owner.as_str(), repo.name.as_str(), "contents"]
                .into_iter()
                .chain(path.split('/').filter(|s| !s.is_empty())),
        )?;
        url.query_pairs_mut().append_pair("ref", git_ref);
        self.get_json(url, repo).await
    }
}

/// Map non-2xx responses onto [`ApiError`]
async fn check_status(response: Response, what: &str) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let headers = response.headers().clone();
    match status {
        StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
        StatusCode::NOT_FOUND => Err(ApiError::NotFound(what.to_string())),
        StatusCode::TOO_MANY_REQUESTS => Err(ApiError::RateLimited {
            retry_after: retry_hint(&headers),
        }),
        StatusCode::FORBIDDEN if rate_budget_exhausted(&headers) => Err(ApiError::RateLimited {
            retry_after: retry_hint(&headers),
        }),
        _ => {
            let message = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(200)
                .collect();
            Err(ApiError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

fn rate_budget_exhausted(headers: &HeaderMap) -> bool {
    header_u64(headers, "x-ratelimit-remaining") == Some(0) || headers.contains_key(RETRY_AFTER)
}

/// `retry-after` seconds, else time until `x-ratelimit-reset`
fn retry_hint(headers: &HeaderMap) -> Option<Duration> {
    if let Some(seconds) = header_u64(headers, RETRY_AFTER.as_str()) {
        return Some(Duration::from_secs(seconds));
    }
    let reset_at = header_u64(headers, "x-ratelimit-reset")?;
    let now = SystemTime::now().duration_since(UNIX_EPOCH).ok()?.as_secs();
    Some(Duration::from_secs(reset_at.saturating_sub(now)))
}
