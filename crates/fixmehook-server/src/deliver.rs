//! One-shot delivery of a push event read from a file or stdin.

use std::path::Path;

use fixmehook_core::HookError;
use fixmehook_service::{parse_event, HookSettings, HttpGitHub, PushHandler};
use serde_json::{json, Value};
use tokio::io::AsyncReadExt;

/// Read a payload from `path`, or from stdin when `path` is `-`.
pub async fn read_event(path: &Path) -> std::io::Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut buf = Vec::new();
        tokio::io::stdin().read_to_end(&mut buf).await?;
        Ok(buf)
    } else {
        tokio::fs::read(path).await
    }
}

/// Process one delivery and return the JSON to report.
///
/// With `dry_run` the formatted issues are returned instead of being created.
pub async fn run(
    raw: &[u8],
    api_key: Option<&str>,
    settings: &HookSettings,
    dry_run: bool,
) -> Result<Value, HookError> {
    if !dry_run {
        let outcome = fixmehook_service::invoke(Some(raw), api_key, settings).await?;
        return Ok(json!(outcome));
    }

    let event = parse_event(Some(raw))?;
    let api_key = api_key
        .filter(|k| !k.trim().is_empty())
        .ok_or(HookError::MissingCredential)?;
    let api = HttpGitHub::new(&settings.request_options(api_key))?;
    let preview = PushHandler::new(&api, settings).preview(&event).await?;
    Ok(json!(preview))
}
