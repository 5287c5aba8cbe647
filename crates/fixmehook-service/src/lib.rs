mod github;
pub mod mock;
mod pipeline;

pub use github::{ApiError, GitHubApi, HttpGitHub, RequestOptions, DEFAULT_USER_AGENT};
pub use pipeline::{invoke, invoke_with, parse_event, HookSettings, PushHandler};
