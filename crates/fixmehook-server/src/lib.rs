pub mod config;
pub mod deliver;
mod routes;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

use std::sync::Arc;

use anyhow::Result;
use fixmehook_service::HookSettings;
use tokio::net::TcpListener;

pub use routes::{build_router, AppState, InnerAppState};

pub async fn serve(listener: TcpListener, settings: HookSettings, api_key: String) -> Result<()> {
    let state = Arc::new(InnerAppState {
        settings,
        api_key: Some(api_key),
    });
    let app = build_router(state);
    axum::serve(listener, app).await?;
    Ok(())
}
