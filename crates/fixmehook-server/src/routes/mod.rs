pub mod health;
pub mod webhooks;

use std::sync::Arc;

use axum::Router;
use fixmehook_service::HookSettings;
use tower_http::trace::TraceLayer;

pub struct InnerAppState {
    pub settings: HookSettings,
    /// Token used for every outbound GitHub call.
    pub api_key: Option<String>,
}

pub type AppState = Arc<InnerAppState>;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(webhooks::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
