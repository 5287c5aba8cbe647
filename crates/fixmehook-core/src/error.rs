use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HookError {
    #[error("empty push event")]
    MissingPayload,

    #[error("You must define the GITHUB_API_KEY secret")]
    MissingCredential,

    #[error("invalid push event: {0}")]
    InvalidPayload(String),

    #[error("HTTP client init: {0}")]
    ClientInit(String),

    #[error("Invalid repository commits_url")]
    InvalidCommitsUrl,

    #[error("Invalid repository issues_url")]
    InvalidIssuesUrl,

    #[error("fetching commit {sha} failed: {reason}")]
    CommitFetchFailed { sha: String, reason: String },

    #[error("creating issue failed: {reason}")]
    IssueSubmitFailed { reason: String },
}

impl HookError {
    /// True when the invocation was rejected on its input and retrying the
    /// same delivery cannot succeed.
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self,
            HookError::CommitFetchFailed { .. } | HookError::IssueSubmitFailed { .. }
        )
    }

    /// The error object handed to the completion callback.
    pub fn to_response(&self) -> Value {
        json!({ "error": self.to_string() })
    }
}
