//! Integration tests for HttpGitHub and the push pipeline against an
//! in-process fake of the GitHub REST API.

use std::time::{Duration, Instant};

use fixmehook_core::{HookError, IssuePayload};
use fixmehook_server::test_helpers::{commit_json, FakeGitHub};
use fixmehook_service::{
    invoke, ApiError, GitHubApi, HookSettings, HttpGitHub, PushHandler, RequestOptions,
};

const DATE: &str = "2024-03-01T10:00:00Z";

fn client() -> HttpGitHub {
    HttpGitHub::new(&RequestOptions::new("ghp_test_token")).unwrap()
}

#[tokio::test]
async fn fetch_commit_sends_github_headers() {
    let gh = FakeGitHub::spawn().await;
    gh.add_commit(commit_json("abc123", "Ada", DATE, &[("a.rs", Some("+// TODO a"))]));

    let url = format!("{}/repos/octo/hello/commits/abc123", gh.base_url);
    let detail = client().fetch_commit(&url).await.unwrap();
    assert_eq!(detail.sha, "abc123");
    assert_eq!(detail.author_name(), "Ada");
    assert_eq!(detail.files[0].patch.as_deref(), Some("+// TODO a"));

    let requests = gh.requests();
    assert_eq!(requests.len(), 1);
    let req = &requests[0];
    assert_eq!(req.method, "GET");
    assert_eq!(req.authorization.as_deref(), Some("token ghp_test_token"));
    assert_eq!(req.accept.as_deref(), Some("application/vnd.github.v3+json"));
    assert_eq!(req.user_agent.as_deref(), Some("FIXME helper"));
}

#[tokio::test]
async fn fetch_missing_commit_is_status_error() {
    let gh = FakeGitHub::spawn().await;
    let url = format!("{}/repos/octo/hello/commits/nope", gh.base_url);
    let err = client().fetch_commit(&url).await.unwrap_err();
    match err {
        ApiError::Status { status, body } => {
            assert_eq!(status, 404);
            assert!(body.contains("Not Found"));
        }
        other => panic!("expected Status error, got {other:?}"),
    }
}

#[tokio::test]
async fn fetch_from_unreachable_host_is_request_error() {
    let opts = RequestOptions {
        timeout: Duration::from_secs(2),
        ..RequestOptions::new("ghp_test_token")
    };
    let api = HttpGitHub::new(&opts).unwrap();
    // Port 9 (discard) is almost never listening locally.
    let err = api
        .fetch_commit("http://127.0.0.1:9/repos/octo/hello/commits/abc")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Request(_)), "got {err:?}");
}

#[tokio::test]
async fn silent_server_hits_request_timeout() {
    // Accepts connections but never writes a response.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let _hold = tokio::spawn(async move {
        let mut open = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            open.push(socket);
        }
    });

    let opts = RequestOptions {
        timeout: Duration::from_millis(300),
        ..RequestOptions::new("ghp_test_token")
    };
    let api = HttpGitHub::new(&opts).unwrap();
    let started = Instant::now();
    let err = api
        .fetch_commit(&format!("http://{addr}/repos/octo/hello/commits/abc"))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Request(_)), "got {err:?}");
    assert!(
        started.elapsed() < Duration::from_secs(5),
        "took {:?}",
        started.elapsed()
    );
}

#[tokio::test]
async fn create_issue_posts_payload() {
    let gh = FakeGitHub::spawn().await;
    let payload = IssuePayload {
        title: "TODO wire it up".into(),
        body: "File: [a.rs](x)".into(),
        labels: vec!["FIXME".into()],
    };
    let url = format!("{}/repos/octo/hello/issues", gh.base_url);
    let created = client().create_issue(&url, &payload).await.unwrap();

    assert_eq!(created["number"], 1);
    assert_eq!(created["title"], "TODO wire it up");
    assert_eq!(
        gh.created_issues(),
        vec![serde_json::to_value(&payload).unwrap()]
    );
    let req = &gh.requests()[0];
    assert_eq!(req.method, "POST");
    assert_eq!(req.authorization.as_deref(), Some("token ghp_test_token"));
}

#[tokio::test]
async fn create_issue_rejection_is_status_error() {
    let gh = FakeGitHub::spawn().await;
    gh.fail_issue_creation();
    let payload = IssuePayload {
        title: "t".into(),
        body: "b".into(),
        labels: vec!["FIXME".into()],
    };
    let url = format!("{}/repos/octo/hello/issues", gh.base_url);
    let err = client().create_issue(&url, &payload).await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 422, .. }), "got {err:?}");
}

#[tokio::test]
async fn custom_user_agent_is_sent() {
    let gh = FakeGitHub::spawn().await;
    gh.add_commit(commit_json("abc123", "Ada", DATE, &[]));
    let opts = RequestOptions {
        user_agent: "fixmehook-tests".into(),
        ..RequestOptions::new("ghp_test_token")
    };
    let url = format!("{}/repos/octo/hello/commits/abc123", gh.base_url);
    HttpGitHub::new(&opts)
        .unwrap()
        .fetch_commit(&url)
        .await
        .unwrap();
    assert_eq!(gh.requests()[0].user_agent.as_deref(), Some("fixmehook-tests"));
}

#[tokio::test]
async fn invoke_end_to_end() {
    let gh = FakeGitHub::spawn().await;
    gh.add_commit(commit_json(
        "c0ffee",
        "Grace Hopper",
        DATE,
        &[
            (
                "src/scheduler.rs",
                Some("@@ -10,3 +10,4 @@\n fn tick() {\n+    // TODO fix race condition in scheduler\n }"),
            ),
            ("assets/logo.png", None),
        ],
    ));

    let body = serde_json::to_vec(&gh.push_event(&["c0ffee"])).unwrap();
    let outcome = invoke(Some(body.as_slice()), Some("ghp_test_token"), &HookSettings::default())
        .await
        .unwrap();

    assert_eq!(outcome.len(), 1);
    assert_eq!(outcome[0].len(), 1);

    let issues = gh.created_issues();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0]["title"], "TODO fix race condition in scheduler");
    assert_eq!(issues[0]["labels"], serde_json::json!(["FIXME"]));
    let text = issues[0]["body"].as_str().unwrap();
    assert!(text.contains("https://github.com/octo/hello/blob/c0ffee/src/scheduler.rs"));
    assert!(text.contains("c0ffee"));
    assert!(text.contains("Grace Hopper"));
    assert!(text.contains(DATE));
}

#[tokio::test]
async fn substring_markers_are_matched() {
    let gh = FakeGitHub::spawn().await;
    gh.add_commit(commit_json("c1", "Ada", DATE, &[("a.rs", Some("+some code XXXyz"))]));

    let body = serde_json::to_vec(&gh.push_event(&["c1"])).unwrap();
    invoke(Some(body.as_slice()), Some("ghp_test_token"), &HookSettings::default())
        .await
        .unwrap();

    let issues = gh.created_issues();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0]["title"], "some code XXXyz");
}

#[tokio::test]
async fn missing_commit_aborts_whole_push() {
    let gh = FakeGitHub::spawn().await;
    gh.add_commit(commit_json("c1", "Ada", DATE, &[("a.rs", Some("+// TODO a"))]));

    let body = serde_json::to_vec(&gh.push_event(&["c1", "gone"])).unwrap();
    let err = invoke(Some(body.as_slice()), Some("ghp_test_token"), &HookSettings::default())
        .await
        .unwrap_err();
    assert!(
        matches!(&err, HookError::CommitFetchFailed { sha, .. } if sha == "gone"),
        "got {err:?}"
    );
}

#[tokio::test]
async fn preview_does_not_create_issues() {
    let gh = FakeGitHub::spawn().await;
    gh.add_commit(commit_json("c1", "Ada", DATE, &[("a.rs", Some("+// FIXME a\n+// XXX b"))]));

    let api = client();
    let settings = HookSettings::default();
    let event = fixmehook_service::parse_event(Some(
        serde_json::to_vec(&gh.push_event(&["c1"])).unwrap().as_slice(),
    ))
    .unwrap();
    let preview = PushHandler::new(&api, &settings)
        .preview(&event)
        .await
        .unwrap();

    let titles: Vec<&str> = preview[0].iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["FIXME a", "XXX b"]);
    assert!(gh.created_issues().is_empty());
}
