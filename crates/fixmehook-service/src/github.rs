use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use fixmehook_core::{CommitDetail, CreatedIssue, HookError, IssuePayload};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_USER_AGENT: &str = "FIXME helper";

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response body: {0}")]
    Decode(String),
}

/// The two remote calls the hook makes.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// `GET` a single commit, including its per-file patches.
    async fn fetch_commit(&self, url: &str) -> Result<CommitDetail, ApiError>;

    /// `POST` a new issue and return the API's response.
    async fn create_issue(&self, url: &str, issue: &IssuePayload)
        -> Result<CreatedIssue, ApiError>;
}

/// Outbound request options, built once per invocation and only read
/// afterwards.
#[derive(Clone)]
pub struct RequestOptions {
    pub api_key: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl RequestOptions {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("api_key", &"[REDACTED]")
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// reqwest-backed client for the GitHub REST API.
#[derive(Debug, Clone)]
pub struct HttpGitHub {
    client: Client,
}

impl HttpGitHub {
    pub fn new(options: &RequestOptions) -> Result<Self, HookError> {
        let mut auth = HeaderValue::from_str(&format!("token {}", options.api_key))
            .map_err(|_| HookError::ClientInit("API key is not a valid header value".into()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .user_agent(options.user_agent.as_str())
            .default_headers(headers)
            .timeout(options.timeout)
            .build()
            .map_err(|e| HookError::ClientInit(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl GitHubApi for HttpGitHub {
    async fn fetch_commit(&self, url: &str) -> Result<CommitDetail, ApiError> {
        debug!("GET {url}");
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        decode(resp).await
    }

    async fn create_issue(
        &self,
        url: &str,
        issue: &IssuePayload,
    ) -> Result<CreatedIssue, ApiError> {
        debug!("POST {url}");
        let resp = self
            .client
            .post(url)
            .json(issue)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        decode(resp).await
    }
}

async fn decode<T: serde::de::DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ApiError::Status {
            status: status.as_u16(),
            body,
        });
    }
    let bytes = resp
        .bytes()
        .await
        .map_err(|e| ApiError::Request(format!("read body: {e}")))?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}
