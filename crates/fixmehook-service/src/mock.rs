use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use fixmehook_core::{CommitDetail, CreatedIssue, IssuePayload};
use serde_json::json;

use crate::{ApiError, GitHubApi};

/// An in-memory GitHub for tests: serves canned commits by URL and
/// records every issue it is asked to create.
pub struct MockGitHub {
    commits: HashMap<String, CommitDetail>,
    created: Mutex<Vec<(String, IssuePayload)>>,
    issue_counter: AtomicU64,
    fetches: AtomicUsize,
    issue_fail: bool,
}

impl Default for MockGitHub {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGitHub {
    pub fn new() -> Self {
        Self {
            commits: HashMap::new(),
            created: Mutex::new(Vec::new()),
            issue_counter: AtomicU64::new(1),
            fetches: AtomicUsize::new(0),
            issue_fail: false,
        }
    }

    pub fn with_commit(mut self, url: impl Into<String>, commit: CommitDetail) -> Self {
        self.commits.insert(url.into(), commit);
        self
    }

    pub fn with_issue_fail(mut self) -> Self {
        self.issue_fail = true;
        self
    }

    /// Number of commit fetches attempted, successful or not.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// `(url, payload)` of every issue created so far.
    pub fn created(&self) -> Vec<(String, IssuePayload)> {
        self.created
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl GitHubApi for MockGitHub {
    async fn fetch_commit(&self, url: &str) -> Result<CommitDetail, ApiError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.commits.get(url).cloned().ok_or_else(|| ApiError::Status {
            status: 404,
            body: format!("no commit at {url}"),
        })
    }

    async fn create_issue(
        &self,
        url: &str,
        issue: &IssuePayload,
    ) -> Result<CreatedIssue, ApiError> {
        if self.issue_fail {
            return Err(ApiError::Status {
                status: 422,
                body: "mock issue failure".into(),
            });
        }
        let number = self.issue_counter.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut created) = self.created.lock() {
            created.push((url.to_string(), issue.clone()));
        }
        Ok(json!({
            "number": number,
            "title": issue.title,
            "labels": issue.labels,
        }))
    }
}
