use serde::{Deserialize, Serialize};

/// A repository push as delivered by the webhook.
///
/// Only the fields the hook reads are modelled; everything else in the
/// payload is ignored. Both fields are optional so that a partial payload
/// still deserializes and fails later with a precise error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushEvent {
    #[serde(default)]
    pub repository: Option<Repository>,
    #[serde(default)]
    pub commits: Option<Vec<CommitRef>>,
}

/// URL templates of the pushed repository, e.g.
/// `https://api.github.com/repos/owner/repo/commits{/sha}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    #[serde(default)]
    pub commits_url: Option<String>,
    #[serde(default)]
    pub issues_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRef {
    pub id: String,
}

/// A single commit as returned by `GET /repos/{owner}/{repo}/commits/{sha}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitDetail {
    pub sha: String,
    pub commit: CommitInfo,
    #[serde(default)]
    pub files: Vec<FileChange>,
}

impl CommitDetail {
    pub fn author_name(&self) -> &str {
        &self.commit.author.name
    }

    /// Author timestamp, verbatim as the API returned it.
    pub fn author_date(&self) -> &str {
        &self.commit.author.date
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub author: CommitAuthor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitAuthor {
    pub name: String,
    pub date: String,
}

/// One changed file of a commit. `patch` is absent for binary files and
/// for diffs too large for the API to inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    pub filename: String,
    pub blob_url: String,
    #[serde(default)]
    pub patch: Option<String>,
}

/// Request body for issue creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuePayload {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
}

/// The remote API's response to an issue creation, kept opaque.
pub type CreatedIssue = serde_json::Value;

/// Created issues, one inner vector per commit of the push.
pub type PushOutcome = Vec<Vec<CreatedIssue>>;
