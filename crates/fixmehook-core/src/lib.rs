pub mod endpoints;
pub mod error;
pub mod formatter;
pub mod model;
pub mod scanner;

pub use endpoints::{commits_endpoint, issues_endpoint, CommitsEndpoint};
pub use error::HookError;
pub use formatter::IssueFormatter;
pub use model::{
    CommitAuthor, CommitDetail, CommitInfo, CommitRef, CreatedIssue, FileChange, IssuePayload,
    PushEvent, PushOutcome, Repository,
};
pub use scanner::{DiffScanner, MarkerSet};
