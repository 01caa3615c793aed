//! Pull request evidence from the GitHub REST API.

use crate::error::{Result, ReviewError};
use crate::http::{build_client, send_json};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::header::ACCEPT;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

const SERVICE: &str = "GitHub";
const FILES_PER_PAGE: usize = 100;
const MAX_FILE_PAGES: usize = 10;

/// `owner/repo#number` parsed out of a pull request URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl PullRequestRef {
    /// Finds `<owner>/<repo>/pull/<number>` anywhere in the URL path, so tab
    /// links such as `/pull/42/files` and query or fragment suffixes resolve
    /// to the same pull request.
    pub fn parse(url: &str) -> Result<Self> {
        let path = url.trim().split(&['?', '#'][..]).next().unwrap_or_default();
        let segments: Vec<&str> = path.trim_end_matches('/').split('/').collect();

        segments
            .windows(4)
            .find_map(|window| match window {
                [owner, repo, "pull", number] if !owner.is_empty() && !repo.is_empty() => {
                    number.parse::<u64>().ok().map(|number| Self {
                        owner: owner.to_string(),
                        repo: repo.to_string(),
                        number,
                    })
                }
                _ => None,
            })
            .ok_or_else(|| ReviewError::InvalidProof(format!("not a pull request URL: {}", url)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BranchRef {
    #[serde(rename = "ref")]
    pub name: String,
    pub sha: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequest {
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub state: String,
    pub head: BranchRef,
    pub base: BranchRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequestFile {
    pub filename: String,
    pub status: String,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
}

#[async_trait]
pub trait GithubSource: Send + Sync {
    async fn pull_request(&self, pr: &PullRequestRef) -> Result<PullRequest>;

    async fn pull_request_files(&self, pr: &PullRequestRef) -> Result<Vec<PullRequestFile>>;

    /// Decoded file text at `git_ref`; `None` when GitHub serves no inline
    /// content (binary or oversized files).
    async fn file_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        git_ref: &str,
    ) -> Result<Option<String>>;
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

pub struct GithubClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let parsed = Url::parse(base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ReviewError::Transport {
                service: SERVICE,
                reason: format!("invalid API URL: {}", base_url),
            })?;

        Ok(Self {
            client: build_client(SERVICE, timeout)?,
            base_url: parsed,
            token: token.filter(|t| !t.is_empty()),
        })
    }

    /// API root joined with `segments`, each percent-encoded as one path
    /// segment.
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn contents_url(&self, owner: &str, repo: &str, path: &str) -> Url {
        let file = path.split('/').filter(|segment| !segment.is_empty());
        self.endpoint(["repos", owner, repo, "contents"].into_iter().chain(file))
    }

    fn get(&self, url: Url) -> reqwest::RequestBuilder {
        let request = self
            .client
            .get(url)
            .header(ACCEPT, "application/vnd.github.v3+json");
        match self.token {
            Some(ref token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl GithubSource for GithubClient {
    async fn pull_request(&self, pr: &PullRequestRef) -> Result<PullRequest> {
        let number = pr.number.to_string();
        let url = self.endpoint([
            "repos",
            pr.owner.as_str(),
            pr.repo.as_str(),
            "pulls",
            number.as_str(),
        ]);
        send_json(SERVICE, self.get(url)).await
    }

    async fn pull_request_files(&self, pr: &PullRequestRef) -> Result<Vec<PullRequestFile>> {
        let number = pr.number.to_string();
        let url = self.endpoint([
            "repos",
            pr.owner.as_str(),
            pr.repo.as_str(),
            "pulls",
            number.as_str(),
            "files",
        ]);
        let mut files = Vec::new();

        for page in 1..=MAX_FILE_PAGES {
            let request = self.get(url.clone()).query(&[
                ("per_page", FILES_PER_PAGE.to_string()),
                ("page", page.to_string()),
            ]);
            let batch: Vec<PullRequestFile> = send_json(SERVICE, request).await?;
            let done = batch.len() < FILES_PER_PAGE;
            files.extend(batch);
            if done {
                break;
            }
        }

        Ok(files)
    }

    async fn file_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        git_ref: &str,
    ) -> Result<Option<String>> {
        let request = self
            .get(self.contents_url(owner, repo, path))
            .query(&[("ref", git_ref)]);
        let response: ContentResponse = send_json(SERVICE, request).await?;

        match (response.content, response.encoding.as_deref()) {
            (Some(content), Some("base64") | None) if !content.is_empty() => {
                decode_content(&content).map(Some)
            }
            _ => Ok(None),
        }
    }
}

/// GitHub wraps base64 payloads at 60 columns.
fn decode_content(encoded: &str) -> Result<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = general_purpose::STANDARD
        .decode(compact)
        .map_err(|e| ReviewError::InvalidResponse {
            service: SERVICE,
            reason: format!("file content is not base64: {}", e),
        })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
