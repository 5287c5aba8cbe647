use crate::error::HookError;
use crate::model::{CommitRef, PushEvent};

const SHA_PLACEHOLDER: &str = "{/sha}";
const NUMBER_PLACEHOLDER: &str = "{/number}";

/// The repository's `commits_url` template, known to contain `{/sha}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitsEndpoint {
    template: String,
}

impl CommitsEndpoint {
    /// URL of a single commit, e.g. `.../commits/abc123`.
    pub fn commit_url(&self, commit: &CommitRef) -> String {
        self.template
            .replacen(SHA_PLACEHOLDER, &format!("/{}", commit.id), 1)
    }
}

/// Extract the commits URL template from a push event.
pub fn commits_endpoint(event: &PushEvent) -> Result<CommitsEndpoint, HookError> {
    let template = event
        .repository
        .as_ref()
        .and_then(|r| r.commits_url.as_deref())
        .filter(|url| url.contains(SHA_PLACEHOLDER))
        .ok_or(HookError::InvalidCommitsUrl)?;
    Ok(CommitsEndpoint {
        template: template.to_string(),
    })
}

/// Extract the issue-creation URL from a push event by dropping the
/// `{/number}` placeholder of the repository's `issues_url`.
pub fn issues_endpoint(event: &PushEvent) -> Result<String, HookError> {
    let template = event
        .repository
        .as_ref()
        .and_then(|r| r.issues_url.as_deref())
        .filter(|url| url.contains(NUMBER_PLACEHOLDER))
        .ok_or(HookError::InvalidIssuesUrl)?;
    Ok(template.replacen(NUMBER_PLACEHOLDER, "", 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Repository;

    fn event(commits_url: Option<&str>, issues_url: Option<&str>) -> PushEvent {
        PushEvent {
            repository: Some(Repository {
                commits_url: commits_url.map(String::from),
                issues_url: issues_url.map(String::from),
            }),
            commits: None,
        }
    }

    #[test]
    fn commit_url_substitutes_sha() {
        let ev = event(
            Some("https://api.github.com/repos/octo/hello/commits{/sha}"),
            None,
        );
        let endpoint = commits_endpoint(&ev).unwrap();
        let url = endpoint.commit_url(&CommitRef {
            id: "abc123".into(),
        });
        assert_eq!(url, "https://api.github.com/repos/octo/hello/commits/abc123");
    }

    #[test]
    fn commits_url_without_placeholder() {
        let ev = event(Some("https://api.github.com/repos/octo/hello/commits"), None);
        assert!(matches!(
            commits_endpoint(&ev),
            Err(HookError::InvalidCommitsUrl)
        ));
    }

    #[test]
    fn commits_url_missing_entirely() {
        assert!(matches!(
            commits_endpoint(&event(None, None)),
            Err(HookError::InvalidCommitsUrl)
        ));
        assert!(matches!(
            commits_endpoint(&PushEvent::default()),
            Err(HookError::InvalidCommitsUrl)
        ));
    }

    #[test]
    fn issues_url_strips_placeholder() {
        let ev = event(
            None,
            Some("https://api.github.com/repos/octo/hello/issues{/number}"),
        );
        assert_eq!(
            issues_endpoint(&ev).unwrap(),
            "https://api.github.com/repos/octo/hello/issues"
        );
    }

    #[test]
    fn issues_url_without_placeholder() {
        let ev = event(None, Some("https://api.github.com/repos/octo/hello/issues"));
        assert!(matches!(
            issues_endpoint(&ev),
            Err(HookError::InvalidIssuesUrl)
        ));
        assert!(matches!(
            issues_endpoint(&PushEvent::default()),
            Err(HookError::InvalidIssuesUrl)
        ));
    }
}
