mod availability;
pub mod error;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::ui;
use crate::AppState;

pub use availability::{AvailabilityRequest, AvailabilityResponse};
pub use error::{ApiError, ErrorCode};

pub fn create_router(state: Arc<AppState>) -> Router {
    let session_layer = ui::session::session_layer(&state.config, state.sessions.clone());
    let static_files = ServeDir::new(&state.config.server.static_dir);

    Router::new()
        .route("/health", get(health_check))
        .route(
            "/search-availability-json",
            post(availability::availability_json),
        )
        .merge(ui::create_router())
        .nest_service("/static", static_files)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
