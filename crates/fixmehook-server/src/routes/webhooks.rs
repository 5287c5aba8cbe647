use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use fixmehook_core::HookError;
use serde_json::{json, Value};
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use super::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/webhooks/push", post(receive_push))
}

type Reply = (StatusCode, Json<Value>);

async fn receive_push(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Reply, Reply> {
    let delivery = header(&headers, "x-github-delivery")
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    if let Some(kind) = header(&headers, "x-github-event").filter(|k| *k != "push") {
        info!(delivery = %delivery, "ignoring {kind} event");
        return Ok((StatusCode::ACCEPTED, Json(json!({ "ignored": kind }))));
    }

    let span = info_span!("delivery", id = %delivery);
    let raw = (!body.is_empty()).then_some(&body[..]);
    fixmehook_service::invoke(raw, state.api_key.as_deref(), &state.settings)
        .instrument(span)
        .await
        .map(|outcome| {
            info!(delivery = %delivery, "created issues for {} commit(s)", outcome.len());
            (StatusCode::OK, Json(json!(outcome)))
        })
        .map_err(|e| {
            error!(delivery = %delivery, "push delivery failed: {e}");
            to_error(e)
        })
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn to_error(e: HookError) -> Reply {
    let status = if !e.is_rejection() {
        StatusCode::BAD_GATEWAY
    } else if matches!(e, HookError::MissingCredential | HookError::ClientInit(_)) {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::BAD_REQUEST
    };
    (status, Json(e.to_response()))
}
