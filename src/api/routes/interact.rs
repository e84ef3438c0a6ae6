//! Interaction Routes
//!
//! - POST /api/v1/legend/:category/toggle - Legend click
//! - POST /api/v1/markers/:index/enter - Pointer entered a marker
//! - POST /api/v1/markers/leave - Pointer left the marker
//! - GET /api/v1/tooltip - Current tooltip state

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use std::time::Instant;

use crate::api::dto::{ToggleResponse, TooltipResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::dataset::Category;

/// POST /api/v1/legend/:category/toggle
pub async fn toggle_legend(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
) -> ApiResult<Json<ToggleResponse>> {
    let category = Category::parse(&category)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown category '{}'", category)))?;

    let mut session = state.session.lock().await;
    let toggle = session
        .toggle_category(category)
        .ok_or_else(|| ApiError::Conflict("No legend on the page".to_string()))?;

    tracing::debug!(category = %category, active = toggle.active, "Legend toggled");
    Ok(Json(toggle.into()))
}

/// POST /api/v1/markers/:index/enter
pub async fn pointer_enter(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> ApiResult<Json<TooltipResponse>> {
    let now = Instant::now();
    let mut session = state.session.lock().await;
    session.tick(now);
    session.pointer_enter(index, now)?;

    Ok(Json(TooltipResponse::from_state(session.interaction(), now)))
}

/// POST /api/v1/markers/leave
pub async fn pointer_leave(State(state): State<Arc<AppState>>) -> Json<TooltipResponse> {
    let now = Instant::now();
    let mut session = state.session.lock().await;
    session.pointer_leave(now);

    Json(TooltipResponse::from_state(session.interaction(), now))
}

/// GET /api/v1/tooltip
pub async fn tooltip(State(state): State<Arc<AppState>>) -> Json<TooltipResponse> {
    let now = Instant::now();
    let mut session = state.session.lock().await;
    session.tick(now);

    Json(TooltipResponse::from_state(session.interaction(), now))
}
