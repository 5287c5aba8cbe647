use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use fixmehook_service::HookSettings;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crate::routes::{build_router, InnerAppState};

pub const OWNER: &str = "octo";
pub const REPO: &str = "hello";

/// Build the webhook router with default settings and the given token.
pub fn test_router(api_key: Option<&str>) -> Router {
    test_router_with(api_key, HookSettings::default())
}

pub fn test_router_with(api_key: Option<&str>, settings: HookSettings) -> Router {
    build_router(Arc::new(InnerAppState {
        settings,
        api_key: api_key.map(String::from),
    }))
}

/// A running test server with base_url and background task handle.
pub struct TestServer {
    pub base_url: String,
    _handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub fn push_url(&self) -> String {
        format!("{}/api/webhooks/push", self.base_url)
    }
}

/// Spawn the webhook server on a random port.
pub async fn spawn_test_server(api_key: Option<&str>) -> TestServer {
    spawn_router(test_router(api_key)).await
}

/// Spawn the webhook server with custom hook settings.
pub async fn spawn_test_server_with(api_key: Option<&str>, settings: HookSettings) -> TestServer {
    spawn_router(test_router_with(api_key, settings)).await
}

async fn spawn_router(app: Router) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}");
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestServer {
        base_url,
        _handle: handle,
    }
}

/// One request seen by the fake GitHub API.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub path: String,
    pub authorization: Option<String>,
    pub accept: Option<String>,
    pub user_agent: Option<String>,
    pub body: Option<Value>,
}

#[derive(Default)]
struct FakeState {
    commits: Mutex<HashMap<String, Value>>,
    issues: Mutex<Vec<Value>>,
    requests: Mutex<Vec<RecordedRequest>>,
    issue_counter: AtomicU64,
    fail_issues: AtomicBool,
}

type Shared = Arc<FakeState>;

/// In-process stand-in for the GitHub REST API, serving the commit and
/// issue endpoints of a single repository.
pub struct FakeGitHub {
    pub base_url: String,
    state: Shared,
    _server: TestServer,
}

impl FakeGitHub {
    pub async fn spawn() -> Self {
        let state: Shared = Arc::default();
        let app = Router::new()
            .route("/repos/{owner}/{repo}/commits/{sha}", get(get_commit))
            .route("/repos/{owner}/{repo}/issues", post(create_issue))
            .with_state(state.clone());
        let server = spawn_router(app).await;
        Self {
            base_url: server.base_url.clone(),
            state,
            _server: server,
        }
    }

    /// `commits_url` template as it appears in a push event.
    pub fn commits_url(&self) -> String {
        format!("{}/repos/{OWNER}/{REPO}/commits{{/sha}}", self.base_url)
    }

    /// `issues_url` template as it appears in a push event.
    pub fn issues_url(&self) -> String {
        format!("{}/repos/{OWNER}/{REPO}/issues{{/number}}", self.base_url)
    }

    pub fn add_commit(&self, commit: Value) {
        let sha = commit["sha"].as_str().unwrap_or_default().to_string();
        self.state.commits.lock().unwrap().insert(sha, commit);
    }

    pub fn fail_issue_creation(&self) {
        self.state.fail_issues.store(true, Ordering::SeqCst);
    }

    /// Bodies of every issue created so far, in arrival order.
    pub fn created_issues(&self) -> Vec<Value> {
        self.state.issues.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// A push event for this repository listing the given commit ids.
    pub fn push_event(&self, shas: &[&str]) -> Value {
        json!({
            "ref": "refs/heads/main",
            "repository": {
                "full_name": format!("{OWNER}/{REPO}"),
                "commits_url": self.commits_url(),
                "issues_url": self.issues_url(),
            },
            "commits": shas.iter().map(|id| json!({ "id": id })).collect::<Vec<_>>(),
        })
    }
}

/// A commit object shaped like `GET /repos/{owner}/{repo}/commits/{sha}`.
/// `files` is a list of `(filename, patch)`.
pub fn commit_json(sha: &str, author: &str, date: &str, files: &[(&str, Option<&str>)]) -> Value {
    let files: Vec<Value> = files
        .iter()
        .map(|(name, patch)| {
            json!({
                "filename": name,
                "blob_url": format!("https://github.com/{OWNER}/{REPO}/blob/{sha}/{name}"),
                "patch": patch,
            })
        })
        .collect();
    json!({
        "sha": sha,
        "commit": { "author": { "name": author, "email": "dev@example.com", "date": date } },
        "files": files,
    })
}

fn record(
    state: &FakeState,
    method: &'static str,
    path: String,
    headers: &HeaderMap,
    body: Option<Value>,
) {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    };
    state.requests.lock().unwrap().push(RecordedRequest {
        method,
        path,
        authorization: header("authorization"),
        accept: header("accept"),
        user_agent: header("user-agent"),
        body,
    });
}

async fn get_commit(
    State(state): State<Shared>,
    Path((owner, repo, sha)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    record(
        &state,
        "GET",
        format!("/repos/{owner}/{repo}/commits/{sha}"),
        &headers,
        None,
    );
    state
        .commits
        .lock()
        .unwrap()
        .get(&sha)
        .cloned()
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, Json(json!({ "message": "Not Found" }))))
}

async fn create_issue(
    State(state): State<Shared>,
    Path((owner, repo)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    record(
        &state,
        "POST",
        format!("/repos/{owner}/{repo}/issues"),
        &headers,
        Some(body.clone()),
    );
    if state.fail_issues.load(Ordering::SeqCst) {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "message": "Validation Failed" })),
        ));
    }
    let number = state.issue_counter.fetch_add(1, Ordering::SeqCst) + 1;
    state.issues.lock().unwrap().push(body.clone());
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "number": number,
            "html_url": format!("https://github.com/{owner}/{repo}/issues/{number}"),
            "title": body["title"],
            "body": body["body"],
            "labels": body["labels"],
        })),
    ))
}
