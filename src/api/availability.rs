// Room availability lookups for client-side scripts.

use axum::{extract::State, Form, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use super::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AvailabilityRequest {
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    #[serde(default)]
    pub room_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub ok: bool,
    pub message: String,
    pub room_id: String,
    pub start_date: String,
    pub end_date: String,
}

/// Check whether one room is free for a stay
///
/// POST /search-availability-json
pub async fn availability_json(
    State(state): State<Arc<AppState>>,
    Form(req): Form<AvailabilityRequest>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    let result = state
        .workflow
        .check_room_availability(&req.start, &req.end, &req.room_id)
        .await?;

    debug!(room_id = result.room_id, available = result.available, "Availability checked");

    let message = if result.available {
        String::new()
    } else {
        "Not available for these dates".to_string()
    };

    Ok(Json(AvailabilityResponse {
        ok: result.available,
        message,
        room_id: result.room_id.to_string(),
        start_date: req.start,
        end_date: req.end,
    }))
}
