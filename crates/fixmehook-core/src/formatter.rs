use crate::model::{CommitDetail, FileChange, IssuePayload};

pub const DEFAULT_MAX_TITLE_LEN: usize = 50;
pub const DEFAULT_LABEL: &str = "FIXME";

const COMMENT_OPENER: &str = "//";

/// Turns a matched diff line into an issue payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueFormatter {
    pub max_title_len: usize,
    pub label: String,
}

impl Default for IssueFormatter {
    fn default() -> Self {
        Self {
            max_title_len: DEFAULT_MAX_TITLE_LEN,
            label: DEFAULT_LABEL.to_string(),
        }
    }
}

impl IssueFormatter {
    /// Strip one leading `+` and one leading `//`, trimming after each,
    /// then cap to `max_title_len` characters.
    pub fn title(&self, line: &str) -> String {
        let text = line.strip_prefix('+').unwrap_or(line).trim();
        let text = text.strip_prefix(COMMENT_OPENER).unwrap_or(text).trim();
        text.chars().take(self.max_title_len).collect()
    }

    pub fn body(&self, file: &FileChange, commit: &CommitDetail) -> String {
        format!(
            "File: [{}]({})\nCommit: {}\nAuthor name: {} on {}",
            file.filename,
            file.blob_url,
            commit.sha,
            commit.author_name(),
            commit.author_date(),
        )
    }

    pub fn format(&self, line: &str, file: &FileChange, commit: &CommitDetail) -> IssuePayload {
        IssuePayload {
            title: self.title(line),
            body: self.body(file, commit),
            labels: vec![self.label.clone()],
        }
    }
}
