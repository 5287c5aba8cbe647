use std::time::Duration;

use fixmehook_core::{
    commits_endpoint, issues_endpoint, CommitDetail, CommitRef, CommitsEndpoint, CreatedIssue,
    DiffScanner, HookError, IssueFormatter, IssuePayload, MarkerSet, PushEvent, PushOutcome,
};
use futures::future::try_join_all;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::github::{GitHubApi, HttpGitHub, RequestOptions, DEFAULT_USER_AGENT};

/// Everything an invocation needs besides the event and the API key.
#[derive(Debug, Clone)]
pub struct HookSettings {
    pub markers: MarkerSet,
    pub formatter: IssueFormatter,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for HookSettings {
    fn default() -> Self {
        Self {
            markers: MarkerSet::default(),
            formatter: IssueFormatter::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl HookSettings {
    pub fn request_options(&self, api_key: &str) -> RequestOptions {
        RequestOptions {
            api_key: api_key.to_string(),
            user_agent: self.user_agent.clone(),
            timeout: self.timeout,
        }
    }
}

/// Run one webhook invocation end to end.
///
/// Checks run in order: payload present, API key configured, payload well
/// formed. Any failure aborts the whole invocation; no partial result is
/// returned.
pub async fn invoke(
    raw: Option<&[u8]>,
    api_key: Option<&str>,
    settings: &HookSettings,
) -> Result<PushOutcome, HookError> {
    let value = parse_payload(raw)?;
    let api_key = api_key
        .filter(|k| !k.trim().is_empty())
        .ok_or(HookError::MissingCredential)?;
    let event = into_event(value)?;

    let api = HttpGitHub::new(&settings.request_options(api_key))?;
    PushHandler::new(&api, settings).handle(&event).await
}

/// Like [`invoke`], against an already constructed API client.
pub async fn invoke_with(
    api: &dyn GitHubApi,
    raw: Option<&[u8]>,
    settings: &HookSettings,
) -> Result<PushOutcome, HookError> {
    let event = parse_event(raw)?;
    PushHandler::new(api, settings).handle(&event).await
}

/// Decode a raw webhook body into a [`PushEvent`].
pub fn parse_event(raw: Option<&[u8]>) -> Result<PushEvent, HookError> {
    into_event(parse_payload(raw)?)
}

fn parse_payload(raw: Option<&[u8]>) -> Result<Value, HookError> {
    let raw = raw
        .filter(|r| !r.trim_ascii().is_empty())
        .ok_or(HookError::MissingPayload)?;
    debug!("received {} byte payload", raw.len());
    match serde_json::from_slice(raw) {
        Ok(value) if is_blank(&value) => Err(HookError::MissingPayload),
        Ok(value) => Ok(value),
        Err(e) => Err(HookError::InvalidPayload(e.to_string())),
    }
}

/// JSON values that stand for "no event": `null`, `false`, `0` and `""`.
/// An empty object is still an event and fails on its missing fields.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn into_event(value: Value) -> Result<PushEvent, HookError> {
    serde_json::from_value(value).map_err(|e| HookError::InvalidPayload(e.to_string()))
}

/// Fetch, scan, format and submit for every commit of a push.
pub struct PushHandler<'a> {
    api: &'a dyn GitHubApi,
    scanner: DiffScanner,
    formatter: IssueFormatter,
}

impl<'a> PushHandler<'a> {
    pub fn new(api: &'a dyn GitHubApi, settings: &HookSettings) -> Self {
        Self {
            api,
            scanner: DiffScanner::new(settings.markers.clone()),
            formatter: settings.formatter.clone(),
        }
    }

    pub async fn handle(&self, event: &PushEvent) -> Result<PushOutcome, HookError> {
        let endpoint = commits_endpoint(event)?;
        let issues_url = issues_endpoint(event)?;

        let commits = match event.commits.as_deref() {
            Some(commits) if !commits.is_empty() => commits,
            _ => {
                info!("push event carries no commits");
                return Ok(Vec::new());
            }
        };
        info!("processing {} commit(s)", commits.len());

        // Fails as soon as any commit fails; the other results are dropped.
        try_join_all(
            commits
                .iter()
                .map(|commit| self.process_commit(&endpoint, &issues_url, commit)),
        )
        .await
    }

    /// Same as [`handle`](Self::handle) but stops before creating issues.
    pub async fn preview(&self, event: &PushEvent) -> Result<Vec<Vec<IssuePayload>>, HookError> {
        let endpoint = commits_endpoint(event)?;
        issues_endpoint(event)?;

        let endpoint = &endpoint;
        let commits = event.commits.as_deref().unwrap_or_default();
        try_join_all(commits.iter().map(|commit| async move {
            let detail = self.fetch(endpoint, commit).await?;
            Ok::<_, HookError>(self.build_issues(&detail))
        }))
        .await
    }

    pub async fn process_commit(
        &self,
        endpoint: &CommitsEndpoint,
        issues_url: &str,
        commit: &CommitRef,
    ) -> Result<Vec<CreatedIssue>, HookError> {
        let detail = self.fetch(endpoint, commit).await?;
        let issues = self.build_issues(&detail);
        info!(
            "commit {}: {} file(s), {} new task comment(s)",
            detail.sha,
            detail.files.len(),
            issues.len()
        );
        self.submit_issues(issues_url, &issues).await
    }

    async fn fetch(
        &self,
        endpoint: &CommitsEndpoint,
        commit: &CommitRef,
    ) -> Result<CommitDetail, HookError> {
        let url = endpoint.commit_url(commit);
        self.api.fetch_commit(&url).await.map_err(|e| {
            warn!("fetch commit {} failed: {e}", commit.id);
            HookError::CommitFetchFailed {
                sha: commit.id.clone(),
                reason: e.to_string(),
            }
        })
    }

    /// One payload per matched line, in file order then line order.
    pub fn build_issues(&self, detail: &CommitDetail) -> Vec<IssuePayload> {
        detail
            .files
            .iter()
            .flat_map(|file| {
                self.scanner
                    .scan(file)
                    .map(move |line| self.formatter.format(line, file, detail))
            })
            .collect()
    }

    /// Create all issues concurrently; the first failure fails the batch.
    pub async fn submit_issues(
        &self,
        issues_url: &str,
        issues: &[IssuePayload],
    ) -> Result<Vec<CreatedIssue>, HookError> {
        try_join_all(issues.iter().map(|issue| async move {
            self.api.create_issue(issues_url, issue).await.map_err(|e| {
                warn!("create issue {:?} failed: {e}", issue.title);
                HookError::IssueSubmitFailed {
                    reason: e.to_string(),
                }
            })
        }))
        .await
    }
}
